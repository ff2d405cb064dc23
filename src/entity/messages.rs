use sea_orm::entity::prelude::*;

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "messages")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub tutor_id: String,
    pub user_id: String,
    pub role: String,
    pub content: String,
    pub created_at_us: i64,
}

impl ActiveModelBehavior for ActiveModel {}
