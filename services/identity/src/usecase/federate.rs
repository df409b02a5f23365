//! Federated login: authorization code in, signed token out.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use uuid::Uuid;

use passway_domain::provider::Provider;
use passway_domain::user::{Role, Status};

use crate::domain::provider::{CodeGrant, ProviderAdapter, ProviderToken};
use crate::domain::repository::{RelationRepository, UserRepository};
use crate::domain::types::{IdentityRelation, NOTIFY_EMAIL, REQUIRED_REGISTRATION, User};
use crate::error::IdentityServiceError;
use crate::registry::ProviderRegistry;
use crate::signer::TokenSigner;

pub struct FederateLoginInput {
    pub provider_slug: String,
    pub grant: CodeGrant,
}

#[derive(Debug)]
pub struct FederateLoginOutput {
    pub user: User,
    pub access_token: String,
    /// True when this login created the account.
    pub created: bool,
}

/// Orchestrates exchange → subject resolution → relation lookup →
/// (create-and-link | load) → token mint. Written purely against the
/// repository ports and the adapter capability; no provider-specific code.
pub struct FederateLoginUseCase<U: UserRepository, R: RelationRepository> {
    pub users: U,
    pub relations: R,
    pub registry: Arc<ProviderRegistry>,
    pub signer: Arc<TokenSigner>,
}

impl<U: UserRepository, R: RelationRepository> FederateLoginUseCase<U, R> {
    pub async fn execute(
        &self,
        input: FederateLoginInput,
    ) -> Result<FederateLoginOutput, IdentityServiceError> {
        // Inactive providers are indistinguishable from unknown ones.
        let provider = self
            .registry
            .lookup(&input.provider_slug)
            .filter(|p| p.is_active())
            .ok_or(IdentityServiceError::ProviderNotFound)?;

        let adapter = self
            .registry
            .adapter(&provider.slug)
            .ok_or(IdentityServiceError::UnsupportedProviderType)?;

        // Codes are single-use; never retried.
        let token = match adapter.exchange_code(&input.grant).await {
            Ok(token) => token,
            Err(e) => {
                tracing::warn!(
                    provider = %provider.slug,
                    stage = "exchange",
                    error = %e,
                    "authorization code exchange failed"
                );
                return Err(IdentityServiceError::ExchangeFailed);
            }
        };

        let provider_user_id = match adapter.resolve_user_id(&token) {
            Ok(id) => id,
            Err(e) => {
                tracing::warn!(
                    provider = %provider.slug,
                    stage = "resolve",
                    error = %e,
                    "external user id resolution failed"
                );
                return Err(IdentityServiceError::ResolutionFailed);
            }
        };

        let profile = fetch_profile(provider, adapter.as_ref(), &token).await;

        let existing = self
            .relations
            .find_by_provider_and_subject(&provider.slug, &provider_user_id)
            .await?;

        let now = Utc::now();
        match existing {
            Some(relation) => self.login_existing(relation, now).await,
            None => {
                self.register_new(provider, &provider_user_id, profile, now)
                    .await
            }
        }
    }

    async fn login_existing(
        &self,
        relation: IdentityRelation,
        now: DateTime<Utc>,
    ) -> Result<FederateLoginOutput, IdentityServiceError> {
        // A relation pointing at a missing user is corrupted data, not a
        // client error.
        let mut user = self
            .users
            .find_by_id(relation.user_id)
            .await?
            .ok_or(IdentityServiceError::IntegrityViolation)?;

        self.relations.touch_used_at(relation.id, now).await?;
        self.users.touch_last_login(user.id, now).await?;
        user.last_login_at = Some(now);

        let access_token = self.signer.mint(&user)?;
        Ok(FederateLoginOutput {
            user,
            access_token,
            created: false,
        })
    }

    async fn register_new(
        &self,
        provider: &Provider,
        provider_user_id: &str,
        profile: Map<String, Value>,
        now: DateTime<Utc>,
    ) -> Result<FederateLoginOutput, IdentityServiceError> {
        let user = new_user_from_profile(profile, now);
        let relation = IdentityRelation {
            id: Uuid::now_v7(),
            provider_slug: provider.slug.clone(),
            provider_user_id: provider_user_id.to_owned(),
            provider_service: provider.service.clone(),
            user_id: user.id,
            linked_at: now,
            used_at: now,
        };

        match self.relations.create_user_and_relation(&user, &relation).await {
            Ok(()) => {
                let access_token = self.signer.mint(&user)?;
                Ok(FederateLoginOutput {
                    user,
                    access_token,
                    created: true,
                })
            }
            // Lost the race: another request linked this external identity
            // between our lookup and insert. Nothing was persisted for us;
            // re-read the winner's relation and log in as that user.
            Err(IdentityServiceError::RelationConflict) => {
                let relation = self
                    .relations
                    .find_by_provider_and_subject(&provider.slug, provider_user_id)
                    .await?
                    .ok_or(IdentityServiceError::IntegrityViolation)?;
                self.login_existing(relation, now).await
            }
            Err(e) => Err(e),
        }
    }
}

/// Best-effort profile fetch: one retry, then an empty map. Never fails the
/// login.
async fn fetch_profile(
    provider: &Provider,
    adapter: &dyn ProviderAdapter,
    token: &ProviderToken,
) -> Map<String, Value> {
    match adapter.fetch_user_info(token).await {
        Ok(profile) => profile,
        Err(first) => {
            tracing::warn!(
                provider = %provider.slug,
                stage = "profile",
                error = %first,
                "profile fetch failed, retrying once"
            );
            match adapter.fetch_user_info(token).await {
                Ok(profile) => profile,
                Err(second) => {
                    tracing::warn!(
                        provider = %provider.slug,
                        stage = "profile",
                        error = %second,
                        "profile fetch failed again, continuing without profile"
                    );
                    Map::new()
                }
            }
        }
    }
}

fn new_user_from_profile(profile: Map<String, Value>, now: DateTime<Utc>) -> User {
    let email = profile_string(&profile, "email");
    let notification_ways = if email.is_some() {
        vec![NOTIFY_EMAIL.to_owned()]
    } else {
        Vec::new()
    };
    User {
        id: Uuid::now_v7(),
        first_name: profile_string(&profile, "first_name"),
        last_name: profile_string(&profile, "last_name"),
        second_name: None,
        email,
        phone: None,
        avatar: None,
        region_id: None,
        tg_id: None,
        role: Role::User,
        status: Status::Active,
        required: vec![REQUIRED_REGISTRATION.to_owned()],
        notification_ways,
        created_at: now,
        last_login_at: Some(now),
        other_data: profile,
    }
}

fn profile_string(profile: &Map<String, Value>, key: &str) -> Option<String> {
    profile.get(key).and_then(Value::as_str).map(str::to_owned)
}
