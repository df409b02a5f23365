#![allow(async_fn_in_trait)]

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::types::{AccountPatch, IdentityRelation, User, UserFilters};
use crate::error::IdentityServiceError;

/// Repository for local accounts.
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, IdentityServiceError>;

    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<User>, IdentityServiceError>;

    /// Filtered listing for bulk export, ordered by created_at descending.
    async fn find_by_filters(
        &self,
        filters: &UserFilters,
    ) -> Result<Vec<User>, IdentityServiceError>;

    async fn insert(&self, user: &User) -> Result<(), IdentityServiceError>;

    /// Overwrite only the fields present in the patch. A no-op patch is the
    /// caller's problem; passing one is not an error here.
    async fn update_partial(
        &self,
        id: Uuid,
        patch: &AccountPatch,
    ) -> Result<(), IdentityServiceError>;

    async fn touch_last_login(
        &self,
        id: Uuid,
        at: DateTime<Utc>,
    ) -> Result<(), IdentityServiceError>;
}

/// Repository for external-identity links.
pub trait RelationRepository: Send + Sync {
    /// Point lookup on the unique (provider_slug, provider_user_id) key.
    async fn find_by_provider_and_subject(
        &self,
        provider_slug: &str,
        provider_user_id: &str,
    ) -> Result<Option<IdentityRelation>, IdentityServiceError>;

    /// Insert one relation. A unique-key collision surfaces as
    /// `RelationConflict`, which callers treat as "someone else just linked
    /// it" and re-query.
    async fn insert(&self, relation: &IdentityRelation) -> Result<(), IdentityServiceError>;

    /// Insert a new user and its first relation in one transaction. Rolls
    /// back both on a relation conflict, so the race loser leaves nothing
    /// behind.
    async fn create_user_and_relation(
        &self,
        user: &User,
        relation: &IdentityRelation,
    ) -> Result<(), IdentityServiceError>;

    async fn touch_used_at(&self, id: Uuid, at: DateTime<Utc>)
    -> Result<(), IdentityServiceError>;
}
