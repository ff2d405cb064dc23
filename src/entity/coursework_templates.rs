use sea_orm::entity::prelude::*;

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "coursework_templates")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub slug: String,
    pub name: String,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub category: Option<String>,
    pub ai_prompt: String,
    pub form_fields: String,
    pub is_active: bool,
    pub sort_order: i32,
    pub created_by: String,
    pub created_at_us: i64,
    pub updated_at_us: i64,
}

impl ActiveModelBehavior for ActiveModel {}
