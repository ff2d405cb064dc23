use sea_orm::entity::prelude::*;

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "ai_outputs")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub form_data: String,
    pub ai_response: String,
    pub template_slug: String,
    pub created_by: String,
    pub created_at_us: i64,
}

impl ActiveModelBehavior for ActiveModel {}
