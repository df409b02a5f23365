use sea_orm::entity::prelude::*;

/// Link between one external identity and one local user.
/// `(provider_slug, provider_user_id)` carries a unique index; that index is
/// the correctness backstop when two logins race for the same external
/// identity.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "identity_relations")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub provider_slug: String,
    pub provider_user_id: String,
    pub provider_service: String,
    pub user_id: Uuid,
    pub linked_at: chrono::DateTime<chrono::Utc>,
    pub used_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id"
    )]
    User,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
