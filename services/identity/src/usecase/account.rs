//! Account self-service and service-to-service account reads.

use std::sync::Arc;

use uuid::Uuid;

use crate::domain::repository::UserRepository;
use crate::domain::types::{AccountPatch, User, UserFilters};
use crate::error::IdentityServiceError;
use crate::signer::TokenSigner;

// ── UpdateAccount ─────────────────────────────────────────────────────────────

pub struct UpdateAccountInput {
    pub user_id: Uuid,
    pub patch: AccountPatch,
}

pub struct UpdateAccountUseCase<U: UserRepository> {
    pub users: U,
}

impl<U: UserRepository> UpdateAccountUseCase<U> {
    pub async fn execute(&self, input: UpdateAccountInput) -> Result<(), IdentityServiceError> {
        self.users
            .find_by_id(input.user_id)
            .await?
            .ok_or(IdentityServiceError::UserNotFound)?;

        if input.patch.is_empty() {
            return Ok(());
        }
        self.users.update_partial(input.user_id, &input.patch).await
    }
}

// ── RefreshToken ─────────────────────────────────────────────────────────────

#[derive(Debug)]
pub struct RefreshTokenOutput {
    pub user: User,
    pub access_token: String,
}

/// Re-derives claims from the current User record and re-signs, so a refresh
/// after a role or status change carries the new values.
pub struct RefreshTokenUseCase<U: UserRepository> {
    pub users: U,
    pub signer: Arc<TokenSigner>,
}

impl<U: UserRepository> RefreshTokenUseCase<U> {
    pub async fn execute(&self, user_id: Uuid) -> Result<RefreshTokenOutput, IdentityServiceError> {
        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or(IdentityServiceError::UserNotFound)?;

        let access_token = self.signer.mint(&user)?;
        Ok(RefreshTokenOutput { user, access_token })
    }
}

// ── Bulk reads (service-to-service) ──────────────────────────────────────────

pub struct GetAccountsUseCase<U: UserRepository> {
    pub users: U,
}

impl<U: UserRepository> GetAccountsUseCase<U> {
    /// Missing ids are skipped, not errors; callers diff the result.
    pub async fn execute(&self, ids: &[Uuid]) -> Result<Vec<User>, IdentityServiceError> {
        self.users.find_by_ids(ids).await
    }
}

pub struct DownloadAccountsUseCase<U: UserRepository> {
    pub users: U,
}

impl<U: UserRepository> DownloadAccountsUseCase<U> {
    pub async fn execute(&self, filters: &UserFilters) -> Result<Vec<User>, IdentityServiceError> {
        self.users.find_by_filters(filters).await
    }
}
