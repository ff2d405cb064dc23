use sea_orm::entity::prelude::*;

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "chat_history")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub history_key: String,
    pub line: String,
    pub created_at_us: i64,
}

impl ActiveModelBehavior for ActiveModel {}
