use super::Store;
use crate::db::now_us;
use crate::entity::users;
use anyhow::Result;
use sea_orm::*;

/// Profile fields mirrored from the identity provider.
#[derive(Debug, Clone, Default)]
pub struct ProfileSync {
    pub clerk_id: String,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub image_url: Option<String>,
}

impl Store {
    /// Inserts or refreshes the mirrored profile for `clerk_id`.
    pub async fn sync_profile(&self, profile: ProfileSync) -> Result<users::Model> {
        self.db
            .run(move |db| {
                let existing = users::Entity::find()
                    .filter(users::Column::ClerkId.eq(profile.clerk_id.as_str()))
                    .one(db)?;

                let model = match existing {
                    Some(existing) => {
                        let mut record: users::ActiveModel = existing.into();
                        record.email = Set(profile.email);
                        if profile.first_name.is_some() {
                            record.first_name = Set(profile.first_name);
                        }
                        if profile.last_name.is_some() {
                            record.last_name = Set(profile.last_name);
                        }
                        if profile.image_url.is_some() {
                            record.image_url = Set(profile.image_url);
                        }
                        record.updated_at_us = Set(now_us());
                        record.update(db)?
                    }
                    None => users::ActiveModel {
                        id: NotSet,
                        clerk_id: Set(profile.clerk_id),
                        email: Set(profile.email),
                        first_name: Set(profile.first_name),
                        last_name: Set(profile.last_name),
                        image_url: Set(profile.image_url),
                        updated_at_us: Set(now_us()),
                    }
                    .insert(db)?,
                };
                Ok(model)
            })
            .await
    }
}
