use super::Store;
use crate::db::now_us;
use crate::entity::admin_users;
use anyhow::Result;
use sea_orm::*;
use tracing::info;

impl Store {
    /// Allow-list lookup: presence of a row is the whole authorization model.
    pub async fn is_admin(&self, user_id: &str) -> Result<bool> {
        let user_id = user_id.to_string();
        self.db
            .run(move |db| {
                let row = admin_users::Entity::find()
                    .filter(admin_users::Column::UserId.eq(user_id))
                    .one(db)?;
                Ok(row.is_some())
            })
            .await
    }

    /// Adds `user_id` to the allow-list. Returns false when it was already present.
    pub async fn grant_admin(&self, user_id: &str) -> Result<bool> {
        let user_id = user_id.to_string();
        let granted = self
            .db
            .run({
                let user_id = user_id.clone();
                move |db| {
                    let existing = admin_users::Entity::find()
                        .filter(admin_users::Column::UserId.eq(user_id.as_str()))
                        .one(db)?;
                    if existing.is_some() {
                        return Ok(false);
                    }

                    admin_users::ActiveModel {
                        id: NotSet,
                        user_id: Set(user_id),
                        created_at_us: Set(now_us()),
                    }
                    .insert(db)?;
                    Ok(true)
                }
            })
            .await?;

        if granted {
            info!("Granted admin access to {}", user_id);
        }
        Ok(granted)
    }
}
