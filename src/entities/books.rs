use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "books")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// Username of the owning account
    pub owner: String,

    pub title: String,

    pub author: String,

    /// ISO date (YYYY-MM-DD) the book was finished
    pub read_on: String,

    /// 1-5 when present
    pub rating: Option<i32>,

    pub review: Option<String>,

    pub created_at: String,

    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
