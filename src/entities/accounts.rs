use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "accounts")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(unique)]
    pub username: String,

    /// Argon2id password hash (PHC string)
    pub password_hash: String,

    pub display_name: String,

    /// Role code: "0" = admin, anything else = regular
    pub role: String,

    /// Status code: "A" = active, "I" = inactive, "B" = blocked
    pub status: String,

    /// Consecutive failed password checks since the last success
    pub failed_attempts: i32,

    /// Successful logins, informational only
    pub access_count: i32,

    pub created_at: String,

    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
