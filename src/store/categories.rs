use super::Store;
use crate::entity::{categories, tutors};
use anyhow::Result;
use sea_orm::*;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryDeletion {
    Deleted,
    NotFound,
    /// Refused: at least one tutor still references the category.
    InUse,
}

impl Store {
    pub async fn list_categories(&self) -> Result<Vec<categories::Model>> {
        self.db
            .run(|db| {
                Ok(categories::Entity::find()
                    .order_by_asc(categories::Column::Name)
                    .all(db)?)
            })
            .await
    }

    pub async fn create_category(&self, name: &str) -> Result<categories::Model> {
        let record = categories::ActiveModel {
            id: Set(uuid::Uuid::new_v4().to_string()),
            name: Set(name.to_string()),
        };
        let category = self.db.run(move |db| Ok(record.insert(db)?)).await?;
        info!("Created category {} ({})", category.name, category.id);
        Ok(category)
    }

    pub async fn find_category(&self, id: &str) -> Result<Option<categories::Model>> {
        let id = id.to_string();
        self.db
            .run(move |db| Ok(categories::Entity::find_by_id(id).one(db)?))
            .await
    }

    pub async fn rename_category(&self, id: &str, name: &str) -> Result<Option<categories::Model>> {
        let id = id.to_string();
        let name = name.to_string();
        self.db
            .run(move |db| {
                let Some(existing) = categories::Entity::find_by_id(id).one(db)? else {
                    return Ok(None);
                };
                let mut record: categories::ActiveModel = existing.into();
                record.name = Set(name);
                Ok(Some(record.update(db)?))
            })
            .await
    }

    pub async fn delete_category(&self, id: &str) -> Result<CategoryDeletion> {
        let id = id.to_string();
        let outcome = self
            .db
            .run({
                let id = id.clone();
                move |db| {
                    let referenced = tutors::Entity::find()
                        .filter(tutors::Column::CategoryId.eq(id.as_str()))
                        .one(db)?;
                    if referenced.is_some() {
                        return Ok(CategoryDeletion::InUse);
                    }

                    let result = categories::Entity::delete_by_id(id).exec(db)?;
                    Ok(if result.rows_affected > 0 {
                        CategoryDeletion::Deleted
                    } else {
                        CategoryDeletion::NotFound
                    })
                }
            })
            .await?;

        if outcome == CategoryDeletion::Deleted {
            info!("Deleted category {}", id);
        }
        Ok(outcome)
    }
}
