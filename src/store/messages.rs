use super::Store;
use crate::db::now_us;
use crate::entity::{messages, tutors};
use anyhow::Result;
use sea_orm::*;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageRole {
    User,
    System,
}

impl MessageRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::System => "system",
        }
    }
}

#[derive(Debug, Clone)]
pub struct MessageWithTutor {
    pub message: messages::Model,
    pub tutor_name: Option<String>,
}

impl Store {
    /// Appends to the message log. Messages are never updated.
    pub async fn insert_message(
        &self,
        tutor_id: &str,
        user_id: &str,
        role: MessageRole,
        content: &str,
    ) -> Result<messages::Model> {
        let record = messages::ActiveModel {
            id: Set(uuid::Uuid::new_v4().to_string()),
            tutor_id: Set(tutor_id.to_string()),
            user_id: Set(user_id.to_string()),
            role: Set(role.as_str().to_string()),
            content: Set(content.to_string()),
            created_at_us: Set(now_us()),
        };
        self.db.run(move |db| Ok(record.insert(db)?)).await
    }

    pub async fn list_recent_messages(&self, limit: u64) -> Result<Vec<MessageWithTutor>> {
        self.db
            .run(move |db| {
                let rows = messages::Entity::find()
                    .order_by_desc(messages::Column::CreatedAtUs)
                    .limit(limit)
                    .all(db)?;

                let tutor_ids: Vec<String> = rows.iter().map(|m| m.tutor_id.clone()).collect();
                let names: HashMap<String, String> = tutors::Entity::find()
                    .filter(tutors::Column::Id.is_in(tutor_ids))
                    .all(db)?
                    .into_iter()
                    .map(|t| (t.id, t.name))
                    .collect();

                Ok(rows
                    .into_iter()
                    .map(|message| {
                        let tutor_name = names.get(&message.tutor_id).cloned();
                        MessageWithTutor {
                            message,
                            tutor_name,
                        }
                    })
                    .collect())
            })
            .await
    }

    /// Conversation between one user and one tutor, oldest first.
    pub async fn list_conversation(
        &self,
        tutor_id: &str,
        user_id: &str,
    ) -> Result<Vec<messages::Model>> {
        let tutor_id = tutor_id.to_string();
        let user_id = user_id.to_string();
        self.db
            .run(move |db| {
                Ok(messages::Entity::find()
                    .filter(messages::Column::TutorId.eq(tutor_id))
                    .filter(messages::Column::UserId.eq(user_id))
                    .order_by_asc(messages::Column::CreatedAtUs)
                    .all(db)?)
            })
            .await
    }

    pub async fn count_messages_for_tutor(&self, tutor_id: &str) -> Result<u64> {
        let tutor_id = tutor_id.to_string();
        self.db
            .run(move |db| {
                Ok(messages::Entity::find()
                    .filter(messages::Column::TutorId.eq(tutor_id))
                    .count(db)?)
            })
            .await
    }
}
