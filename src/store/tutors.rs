use super::Store;
use crate::db::now_us;
use crate::entity::{categories, messages, tutors};
use anyhow::Result;
use sea_orm::*;
use std::collections::HashMap;
use tracing::info;

#[derive(Debug, Clone, Default)]
pub struct NewTutor {
    pub user_id: String,
    pub user_name: String,
    pub src: String,
    pub name: String,
    pub description: String,
    pub instructions: String,
    pub seed: String,
    pub category_id: Option<String>,
}

/// Partial update. `category_id: Some(None)` clears the category.
#[derive(Debug, Clone, Default)]
pub struct TutorChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category_id: Option<Option<String>>,
}

#[derive(Debug, Clone)]
pub struct TutorWithCategory {
    pub tutor: tutors::Model,
    pub category_name: Option<String>,
}

impl Store {
    pub async fn create_tutor(&self, new: NewTutor) -> Result<tutors::Model> {
        let now = now_us();
        let record = tutors::ActiveModel {
            id: Set(uuid::Uuid::new_v4().to_string()),
            user_id: Set(new.user_id),
            user_name: Set(new.user_name),
            src: Set(new.src),
            name: Set(new.name),
            description: Set(new.description),
            instructions: Set(new.instructions),
            seed: Set(new.seed),
            category_id: Set(new.category_id),
            created_at_us: Set(now),
            updated_at_us: Set(now),
        };

        let tutor = self.db.run(move |db| Ok(record.insert(db)?)).await?;
        info!("Created tutor {} ({})", tutor.name, tutor.id);
        Ok(tutor)
    }

    pub async fn find_tutor(&self, id: &str) -> Result<Option<tutors::Model>> {
        let id = id.to_string();
        self.db
            .run(move |db| Ok(tutors::Entity::find_by_id(id).one(db)?))
            .await
    }

    pub async fn find_tutor_with_category(&self, id: &str) -> Result<Option<TutorWithCategory>> {
        let id = id.to_string();
        self.db
            .run(move |db| {
                let Some(tutor) = tutors::Entity::find_by_id(id).one(db)? else {
                    return Ok(None);
                };
                let category_name = match tutor.category_id.clone() {
                    Some(category_id) => categories::Entity::find_by_id(category_id)
                        .one(db)?
                        .map(|c| c.name),
                    None => None,
                };
                Ok(Some(TutorWithCategory {
                    tutor,
                    category_name,
                }))
            })
            .await
    }

    /// All tutors, newest first, with their category name resolved.
    pub async fn list_tutors(&self) -> Result<Vec<TutorWithCategory>> {
        self.db
            .run(|db| {
                let names: HashMap<String, String> = categories::Entity::find()
                    .all(db)?
                    .into_iter()
                    .map(|c| (c.id, c.name))
                    .collect();

                let rows = tutors::Entity::find()
                    .order_by_desc(tutors::Column::CreatedAtUs)
                    .all(db)?;

                Ok(rows
                    .into_iter()
                    .map(|tutor| {
                        let category_name = tutor
                            .category_id
                            .as_ref()
                            .and_then(|id| names.get(id).cloned());
                        TutorWithCategory {
                            tutor,
                            category_name,
                        }
                    })
                    .collect())
            })
            .await
    }

    pub async fn update_tutor(
        &self,
        id: &str,
        changes: TutorChanges,
    ) -> Result<Option<tutors::Model>> {
        let id = id.to_string();
        self.db
            .run(move |db| {
                let Some(existing) = tutors::Entity::find_by_id(id).one(db)? else {
                    return Ok(None);
                };

                let mut record: tutors::ActiveModel = existing.into();
                if let Some(name) = changes.name {
                    record.name = Set(name);
                }
                if let Some(description) = changes.description {
                    record.description = Set(description);
                }
                if let Some(category_id) = changes.category_id {
                    record.category_id = Set(category_id);
                }
                record.updated_at_us = Set(now_us());

                Ok(Some(record.update(db)?))
            })
            .await
    }

    /// Deletes the tutor and its message log. Returns whether the tutor existed.
    pub async fn delete_tutor(&self, id: &str) -> Result<bool> {
        let id = id.to_string();
        let removed = self
            .db
            .run({
                let id = id.clone();
                move |db| {
                    messages::Entity::delete_many()
                        .filter(messages::Column::TutorId.eq(id.as_str()))
                        .exec(db)?;
                    let result = tutors::Entity::delete_by_id(id).exec(db)?;
                    Ok(result.rows_affected > 0)
                }
            })
            .await?;

        if removed {
            info!("Deleted tutor {}", id);
        }
        Ok(removed)
    }

    pub async fn count_tutors_in_category(&self, category_id: &str) -> Result<u64> {
        let category_id = category_id.to_string();
        self.db
            .run(move |db| {
                Ok(tutors::Entity::find()
                    .filter(tutors::Column::CategoryId.eq(category_id))
                    .count(db)?)
            })
            .await
    }
}
