use anyhow::Context as _;
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, TransactionError, TransactionTrait,
};
use serde_json::Value;
use uuid::Uuid;

use passway_domain::user::{Role, Status};
use passway_identity_schema::{identity_relations, users};

use crate::domain::repository::{RelationRepository, UserRepository};
use crate::domain::types::{AccountPatch, IdentityRelation, User, UserFilters};
use crate::error::IdentityServiceError;

// ── User repository ──────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbUserRepository {
    pub db: DatabaseConnection,
}

impl UserRepository for DbUserRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, IdentityServiceError> {
        let model = users::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find user by id")?;
        Ok(model.map(user_from_model).transpose()?)
    }

    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<User>, IdentityServiceError> {
        let models = users::Entity::find()
            .filter(users::Column::Id.is_in(ids.iter().copied()))
            .all(&self.db)
            .await
            .context("find users by ids")?;
        let users = models
            .into_iter()
            .map(user_from_model)
            .collect::<anyhow::Result<Vec<_>>>()?;
        Ok(users)
    }

    async fn find_by_filters(
        &self,
        filters: &UserFilters,
    ) -> Result<Vec<User>, IdentityServiceError> {
        let mut query = users::Entity::find();
        if let Some(cutoff) = filters.date_filter_cutoff(Utc::now()) {
            query = query.filter(users::Column::CreatedAt.gte(cutoff));
        }
        if let Some(created_after) = filters.created_after {
            query = query.filter(users::Column::CreatedAt.gte(created_after));
        }
        if let Some(region_id) = &filters.region_id {
            query = query.filter(users::Column::RegionId.eq(region_id.as_str()));
        }
        if let Some(role) = filters.role {
            query = query.filter(users::Column::Role.eq(role.as_str()));
        }
        if let Some(status) = filters.status {
            query = query.filter(users::Column::Status.eq(status.as_str()));
        }
        let models = query
            .order_by_desc(users::Column::CreatedAt)
            .all(&self.db)
            .await
            .context("find users by filters")?;
        let users = models
            .into_iter()
            .map(user_from_model)
            .collect::<anyhow::Result<Vec<_>>>()?;
        Ok(users)
    }

    async fn insert(&self, user: &User) -> Result<(), IdentityServiceError> {
        user_active_model(user)
            .insert(&self.db)
            .await
            .context("insert user")?;
        Ok(())
    }

    async fn update_partial(
        &self,
        id: Uuid,
        patch: &AccountPatch,
    ) -> Result<(), IdentityServiceError> {
        let mut am = users::ActiveModel {
            id: Set(id),
            ..Default::default()
        };
        if let Some(first_name) = &patch.first_name {
            am.first_name = Set(Some(first_name.clone()));
        }
        if let Some(last_name) = &patch.last_name {
            am.last_name = Set(Some(last_name.clone()));
        }
        if let Some(second_name) = &patch.second_name {
            am.second_name = Set(Some(second_name.clone()));
        }
        if let Some(phone) = &patch.phone {
            am.phone = Set(Some(phone.clone()));
        }
        if let Some(tg_id) = &patch.tg_id {
            am.tg_id = Set(Some(tg_id.clone()));
        }
        if let Some(ways) = &patch.notification_ways {
            am.notification_ways = Set(json_string_list(ways));
        }
        am.update(&self.db).await.context("update user fields")?;
        Ok(())
    }

    async fn touch_last_login(
        &self,
        id: Uuid,
        at: DateTime<Utc>,
    ) -> Result<(), IdentityServiceError> {
        users::ActiveModel {
            id: Set(id),
            last_login_at: Set(Some(at)),
            ..Default::default()
        }
        .update(&self.db)
        .await
        .context("touch last login")?;
        Ok(())
    }
}

fn user_active_model(user: &User) -> users::ActiveModel {
    users::ActiveModel {
        id: Set(user.id),
        first_name: Set(user.first_name.clone()),
        last_name: Set(user.last_name.clone()),
        second_name: Set(user.second_name.clone()),
        email: Set(user.email.clone()),
        phone: Set(user.phone.clone()),
        avatar: Set(user.avatar.clone()),
        region_id: Set(user.region_id.clone()),
        tg_id: Set(user.tg_id.clone()),
        role: Set(user.role.as_str().to_owned()),
        status: Set(user.status.as_str().to_owned()),
        required: Set(json_string_list(&user.required)),
        notification_ways: Set(json_string_list(&user.notification_ways)),
        created_at: Set(user.created_at),
        last_login_at: Set(user.last_login_at),
        other_data: Set(Value::Object(user.other_data.clone())),
    }
}

fn user_from_model(model: users::Model) -> anyhow::Result<User> {
    let role = model.role.parse::<Role>().context("parse stored role")?;
    let status = model
        .status
        .parse::<Status>()
        .context("parse stored status")?;
    Ok(User {
        id: model.id,
        first_name: model.first_name,
        last_name: model.last_name,
        second_name: model.second_name,
        email: model.email,
        phone: model.phone,
        avatar: model.avatar,
        region_id: model.region_id,
        tg_id: model.tg_id,
        role,
        status,
        required: serde_json::from_value(model.required).context("decode required set")?,
        notification_ways: serde_json::from_value(model.notification_ways)
            .context("decode notification ways")?,
        created_at: model.created_at,
        last_login_at: model.last_login_at,
        other_data: serde_json::from_value(model.other_data).context("decode other data")?,
    })
}

fn json_string_list(items: &[String]) -> Value {
    Value::Array(items.iter().cloned().map(Value::String).collect())
}

// ── Identity relation repository ─────────────────────────────────────────────

#[derive(Clone)]
pub struct DbRelationRepository {
    pub db: DatabaseConnection,
}

impl RelationRepository for DbRelationRepository {
    async fn find_by_provider_and_subject(
        &self,
        provider_slug: &str,
        provider_user_id: &str,
    ) -> Result<Option<IdentityRelation>, IdentityServiceError> {
        let model = identity_relations::Entity::find()
            .filter(identity_relations::Column::ProviderSlug.eq(provider_slug))
            .filter(identity_relations::Column::ProviderUserId.eq(provider_user_id))
            .one(&self.db)
            .await
            .context("find identity relation")?;
        Ok(model.map(relation_from_model))
    }

    async fn insert(&self, relation: &IdentityRelation) -> Result<(), IdentityServiceError> {
        match relation_active_model(relation).insert(&self.db).await {
            Ok(_) => Ok(()),
            Err(e) if is_unique_violation(&e) => Err(IdentityServiceError::RelationConflict),
            Err(e) => Err(anyhow::Error::new(e)
                .context("insert identity relation")
                .into()),
        }
    }

    async fn create_user_and_relation(
        &self,
        user: &User,
        relation: &IdentityRelation,
    ) -> Result<(), IdentityServiceError> {
        let result = self
            .db
            .transaction::<_, (), sea_orm::DbErr>(|txn| {
                let user = user.clone();
                let relation = relation.clone();
                Box::pin(async move {
                    user_active_model(&user).insert(txn).await?;
                    relation_active_model(&relation).insert(txn).await?;
                    Ok(())
                })
            })
            .await;
        match result {
            Ok(()) => Ok(()),
            Err(TransactionError::Transaction(e)) if is_unique_violation(&e) => {
                Err(IdentityServiceError::RelationConflict)
            }
            Err(e) => Err(anyhow::Error::new(e)
                .context("create user with identity relation")
                .into()),
        }
    }

    async fn touch_used_at(
        &self,
        id: Uuid,
        at: DateTime<Utc>,
    ) -> Result<(), IdentityServiceError> {
        identity_relations::ActiveModel {
            id: Set(id),
            used_at: Set(at),
            ..Default::default()
        }
        .update(&self.db)
        .await
        .context("touch relation used_at")?;
        Ok(())
    }
}

fn relation_active_model(relation: &IdentityRelation) -> identity_relations::ActiveModel {
    identity_relations::ActiveModel {
        id: Set(relation.id),
        provider_slug: Set(relation.provider_slug.clone()),
        provider_user_id: Set(relation.provider_user_id.clone()),
        provider_service: Set(relation.provider_service.clone()),
        user_id: Set(relation.user_id),
        linked_at: Set(relation.linked_at),
        used_at: Set(relation.used_at),
    }
}

fn relation_from_model(model: identity_relations::Model) -> IdentityRelation {
    IdentityRelation {
        id: model.id,
        provider_slug: model.provider_slug,
        provider_user_id: model.provider_user_id,
        provider_service: model.provider_service,
        user_id: model.user_id,
        linked_at: model.linked_at,
        used_at: model.used_at,
    }
}

fn is_unique_violation(err: &sea_orm::DbErr) -> bool {
    matches!(
        err.sql_err(),
        Some(sea_orm::SqlErr::UniqueConstraintViolation(_))
    )
}
