use sea_orm::entity::prelude::*;

/// Local account record. Enum-ish columns (`role`, `status`) are stored as
/// snake_case strings and parsed into domain enums at the repository
/// boundary; set-valued columns are jsonb arrays.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub second_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub avatar: Option<String>,
    pub region_id: Option<String>,
    pub tg_id: Option<String>,
    pub role: String,
    pub status: String,
    #[sea_orm(column_type = "JsonBinary")]
    pub required: Json,
    #[sea_orm(column_type = "JsonBinary")]
    pub notification_ways: Json,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub last_login_at: Option<chrono::DateTime<chrono::Utc>>,
    #[sea_orm(column_type = "JsonBinary")]
    pub other_data: Json,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::identity_relations::Entity")]
    IdentityRelations,
}

impl Related<super::identity_relations::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::IdentityRelations.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
