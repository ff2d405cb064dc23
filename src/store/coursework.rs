use super::Store;
use crate::db::now_us;
use crate::entity::{coursework_categories, coursework_templates};
use anyhow::Result;
use sea_orm::*;
use tracing::info;

#[derive(Debug, Clone, Default)]
pub struct NewCourseworkCategory {
    pub name: String,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub sort_order: i32,
    pub is_active: bool,
}

#[derive(Debug, Clone, Default)]
pub struct NewTemplate {
    pub name: String,
    pub slug: String,
    pub ai_prompt: String,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub category: Option<String>,
    /// JSON text of the form schema.
    pub form_fields: String,
    pub is_active: bool,
    pub sort_order: i32,
    pub created_by: String,
}

/// Partial update; `None` leaves a column untouched.
#[derive(Debug, Clone, Default)]
pub struct TemplateChanges {
    pub name: Option<String>,
    pub slug: Option<String>,
    pub ai_prompt: Option<String>,
    pub description: Option<Option<String>>,
    pub icon: Option<Option<String>>,
    pub category: Option<Option<String>>,
    pub form_fields: Option<String>,
    pub is_active: Option<bool>,
    pub sort_order: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateWrite {
    Saved(coursework_templates::Model),
    NotFound,
    SlugTaken,
}

impl Store {
    pub async fn list_coursework_categories(&self) -> Result<Vec<coursework_categories::Model>> {
        self.db
            .run(|db| {
                Ok(coursework_categories::Entity::find()
                    .order_by_asc(coursework_categories::Column::SortOrder)
                    .all(db)?)
            })
            .await
    }

    pub async fn create_coursework_category(
        &self,
        new: NewCourseworkCategory,
    ) -> Result<coursework_categories::Model> {
        let record = coursework_categories::ActiveModel {
            id: NotSet,
            name: Set(new.name),
            description: Set(new.description),
            icon: Set(new.icon),
            sort_order: Set(new.sort_order),
            is_active: Set(new.is_active),
            created_at_us: Set(now_us()),
        };
        self.db.run(move |db| Ok(record.insert(db)?)).await
    }

    /// Every template, active or not, by sort order.
    pub async fn list_templates(&self) -> Result<Vec<coursework_templates::Model>> {
        self.db
            .run(|db| {
                Ok(coursework_templates::Entity::find()
                    .order_by_asc(coursework_templates::Column::SortOrder)
                    .all(db)?)
            })
            .await
    }

    pub async fn list_active_templates(&self) -> Result<Vec<coursework_templates::Model>> {
        self.db
            .run(|db| {
                Ok(coursework_templates::Entity::find()
                    .filter(coursework_templates::Column::IsActive.eq(true))
                    .order_by_asc(coursework_templates::Column::SortOrder)
                    .all(db)?)
            })
            .await
    }

    pub async fn find_template(&self, id: i64) -> Result<Option<coursework_templates::Model>> {
        self.db
            .run(move |db| Ok(coursework_templates::Entity::find_by_id(id).one(db)?))
            .await
    }

    pub async fn find_template_by_slug(
        &self,
        slug: &str,
    ) -> Result<Option<coursework_templates::Model>> {
        let slug = slug.to_string();
        self.db
            .run(move |db| {
                Ok(coursework_templates::Entity::find()
                    .filter(coursework_templates::Column::Slug.eq(slug))
                    .one(db)?)
            })
            .await
    }

    pub async fn create_template(&self, new: NewTemplate) -> Result<TemplateWrite> {
        let outcome = self
            .db
            .run(move |db| {
                let taken = coursework_templates::Entity::find()
                    .filter(coursework_templates::Column::Slug.eq(new.slug.as_str()))
                    .one(db)?;
                if taken.is_some() {
                    return Ok(TemplateWrite::SlugTaken);
                }

                let now = now_us();
                let record = coursework_templates::ActiveModel {
                    id: NotSet,
                    slug: Set(new.slug),
                    name: Set(new.name),
                    description: Set(new.description),
                    icon: Set(new.icon),
                    category: Set(new.category),
                    ai_prompt: Set(new.ai_prompt),
                    form_fields: Set(new.form_fields),
                    is_active: Set(new.is_active),
                    sort_order: Set(new.sort_order),
                    created_by: Set(new.created_by),
                    created_at_us: Set(now),
                    updated_at_us: Set(now),
                };
                Ok(TemplateWrite::Saved(record.insert(db)?))
            })
            .await?;

        if let TemplateWrite::Saved(template) = &outcome {
            info!("Created template {} ({})", template.slug, template.id);
        }
        Ok(outcome)
    }

    pub async fn update_template(&self, id: i64, changes: TemplateChanges) -> Result<TemplateWrite> {
        self.db
            .run(move |db| {
                let Some(existing) = coursework_templates::Entity::find_by_id(id).one(db)? else {
                    return Ok(TemplateWrite::NotFound);
                };

                if let Some(slug) = &changes.slug
                    && *slug != existing.slug
                {
                    let taken = coursework_templates::Entity::find()
                        .filter(coursework_templates::Column::Slug.eq(slug.as_str()))
                        .one(db)?;
                    if taken.is_some() {
                        return Ok(TemplateWrite::SlugTaken);
                    }
                }

                let mut record: coursework_templates::ActiveModel = existing.into();
                if let Some(name) = changes.name {
                    record.name = Set(name);
                }
                if let Some(slug) = changes.slug {
                    record.slug = Set(slug);
                }
                if let Some(ai_prompt) = changes.ai_prompt {
                    record.ai_prompt = Set(ai_prompt);
                }
                if let Some(description) = changes.description {
                    record.description = Set(description);
                }
                if let Some(icon) = changes.icon {
                    record.icon = Set(icon);
                }
                if let Some(category) = changes.category {
                    record.category = Set(category);
                }
                if let Some(form_fields) = changes.form_fields {
                    record.form_fields = Set(form_fields);
                }
                if let Some(is_active) = changes.is_active {
                    record.is_active = Set(is_active);
                }
                if let Some(sort_order) = changes.sort_order {
                    record.sort_order = Set(sort_order);
                }
                record.updated_at_us = Set(now_us());

                Ok(TemplateWrite::Saved(record.update(db)?))
            })
            .await
    }

    pub async fn delete_template(&self, id: i64) -> Result<bool> {
        self.db
            .run(move |db| {
                let result = coursework_templates::Entity::delete_by_id(id).exec(db)?;
                Ok(result.rows_affected > 0)
            })
            .await
    }
}
