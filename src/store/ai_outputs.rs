use super::Store;
use crate::db::now_us;
use crate::entity::ai_outputs;
use anyhow::Result;
use sea_orm::*;

impl Store {
    pub async fn record_ai_output(
        &self,
        template_slug: &str,
        form_data: &str,
        ai_response: &str,
        created_by: &str,
    ) -> Result<ai_outputs::Model> {
        let record = ai_outputs::ActiveModel {
            id: NotSet,
            form_data: Set(form_data.to_string()),
            ai_response: Set(ai_response.to_string()),
            template_slug: Set(template_slug.to_string()),
            created_by: Set(created_by.to_string()),
            created_at_us: Set(now_us()),
        };
        self.db.run(move |db| Ok(record.insert(db)?)).await
    }

    /// Newest first.
    pub async fn list_recent_ai_outputs(&self, limit: u64) -> Result<Vec<ai_outputs::Model>> {
        self.db
            .run(move |db| {
                Ok(ai_outputs::Entity::find()
                    .order_by_desc(ai_outputs::Column::Id)
                    .limit(limit)
                    .all(db)?)
            })
            .await
    }

    pub async fn list_ai_outputs_by_creator(
        &self,
        created_by: &str,
    ) -> Result<Vec<ai_outputs::Model>> {
        let created_by = created_by.to_string();
        self.db
            .run(move |db| {
                Ok(ai_outputs::Entity::find()
                    .filter(ai_outputs::Column::CreatedBy.eq(created_by))
                    .order_by_desc(ai_outputs::Column::Id)
                    .all(db)?)
            })
            .await
    }
}
