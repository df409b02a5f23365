use serde_json::{Map, Value, json};

use passway_domain::provider::ProviderStatus;
use passway_domain::user::{Role, Status};
use passway_identity::error::IdentityServiceError;
use passway_identity::usecase::federate::{FederateLoginInput, FederateLoginUseCase};

use crate::helpers::{
    MockRelationRepo, MockUserRepo, StaticAdapter, oauth2_provider, other_provider, test_grant,
    test_registry, test_relation, test_signer, test_user,
};

fn vk_profile() -> Map<String, Value> {
    let mut profile = Map::new();
    profile.insert("email".to_owned(), json!("user@example.com"));
    profile.insert("first_name".to_owned(), json!("Ivan"));
    profile.insert("last_name".to_owned(), json!("Petrov"));
    profile
}

// ── First login ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_create_account_and_relation_on_first_login() {
    let relations = MockRelationRepo::empty();
    let relations_handle = relations.relations_handle();
    let created_users = relations.created_users_handle();
    let signer = test_signer();

    let uc = FederateLoginUseCase {
        users: MockUserRepo::empty(),
        relations,
        registry: test_registry(
            oauth2_provider("vk"),
            StaticAdapter::returning("987654321", vk_profile()),
        ),
        signer: signer.clone(),
    };

    let output = uc
        .execute(FederateLoginInput {
            provider_slug: "vk".to_owned(),
            grant: test_grant("good-code"),
        })
        .await
        .unwrap();

    assert!(output.created, "first login should create the account");

    let users = created_users.lock().unwrap();
    assert_eq!(users.len(), 1, "expected exactly one user to be created");
    let user = &users[0];
    assert_eq!(user.email.as_deref(), Some("user@example.com"));
    assert_eq!(user.first_name.as_deref(), Some("Ivan"));
    assert_eq!(user.role, Role::User);
    assert_eq!(user.status, Status::Active);
    assert_eq!(user.required, vec!["registration"]);
    assert_eq!(user.notification_ways, vec!["email"]);
    assert!(user.last_login_at.is_some());

    let relations = relations_handle.lock().unwrap();
    assert_eq!(relations.len(), 1, "expected exactly one relation");
    let relation = &relations[0];
    assert_eq!(relation.provider_slug, "vk");
    assert_eq!(relation.provider_user_id, "987654321");
    assert_eq!(relation.provider_service, "vk");
    assert_eq!(relation.user_id, user.id);

    // The token must be verifiable and must point at the created account.
    let claims = signer.verify(&output.access_token).unwrap();
    assert_eq!(claims.sub, user.id.to_string());
    assert_eq!(claims.role, Role::User);
}

#[tokio::test]
async fn should_create_account_without_profile_when_fetch_keeps_failing() {
    let relations = MockRelationRepo::empty();
    let created_users = relations.created_users_handle();
    let adapter = StaticAdapter::failing_profile("987654321");
    let profile_calls = adapter.profile_calls_handle();

    let uc = FederateLoginUseCase {
        users: MockUserRepo::empty(),
        relations,
        registry: test_registry(oauth2_provider("vk"), adapter),
        signer: test_signer(),
    };

    let output = uc
        .execute(FederateLoginInput {
            provider_slug: "vk".to_owned(),
            grant: test_grant("good-code"),
        })
        .await
        .unwrap();

    assert!(output.created);
    assert_eq!(
        *profile_calls.lock().unwrap(),
        2,
        "profile fetch should be retried exactly once"
    );

    let users = created_users.lock().unwrap();
    assert_eq!(users.len(), 1);
    assert!(users[0].email.is_none(), "no profile means no email");
    assert!(users[0].notification_ways.is_empty());
    assert!(users[0].other_data.is_empty());
    assert_eq!(users[0].required, vec!["registration"]);
}

// ── Returning login ──────────────────────────────────────────────────────────

#[tokio::test]
async fn should_log_in_existing_user_without_creating_rows() {
    let user = test_user();
    let relation = test_relation(user.id);
    let old_used_at = relation.used_at;

    let relations = MockRelationRepo::new(vec![relation]);
    let relations_handle = relations.relations_handle();
    let created_users = relations.created_users_handle();
    let signer = test_signer();

    let uc = FederateLoginUseCase {
        users: MockUserRepo::new(vec![user.clone()]),
        relations,
        registry: test_registry(
            oauth2_provider("vk"),
            StaticAdapter::returning("987654321", vk_profile()),
        ),
        signer: signer.clone(),
    };

    let output = uc
        .execute(FederateLoginInput {
            provider_slug: "vk".to_owned(),
            grant: test_grant("good-code"),
        })
        .await
        .unwrap();

    assert!(!output.created, "returning login must not create an account");
    assert_eq!(output.user.id, user.id);
    assert!(created_users.lock().unwrap().is_empty());

    let relations = relations_handle.lock().unwrap();
    assert_eq!(relations.len(), 1, "no second relation for the same identity");
    assert!(
        relations[0].used_at > old_used_at,
        "used_at should be refreshed on login"
    );
    assert!(
        output.user.last_login_at.is_some(),
        "last_login_at should be refreshed on login"
    );

    let claims = signer.verify(&output.access_token).unwrap();
    assert_eq!(claims.sub, user.id.to_string());
}

#[tokio::test]
async fn should_recover_when_losing_registration_race() {
    let winner = test_user();
    let winner_relation = test_relation(winner.id);

    let relations = MockRelationRepo::losing_race_to(winner_relation);
    let created_users = relations.created_users_handle();

    let uc = FederateLoginUseCase {
        users: MockUserRepo::new(vec![winner.clone()]),
        relations,
        registry: test_registry(
            oauth2_provider("vk"),
            StaticAdapter::returning("987654321", vk_profile()),
        ),
        signer: test_signer(),
    };

    let output = uc
        .execute(FederateLoginInput {
            provider_slug: "vk".to_owned(),
            grant: test_grant("good-code"),
        })
        .await
        .unwrap();

    // The loser signs in as the winner's account and leaves nothing behind.
    assert!(!output.created);
    assert_eq!(output.user.id, winner.id);
    assert!(
        created_users.lock().unwrap().is_empty(),
        "losing transaction must not persist a user"
    );
}

// ── Corrupted store ──────────────────────────────────────────────────────────

#[tokio::test]
async fn should_fail_with_integrity_violation_on_dangling_relation() {
    // Relation kept, user row gone.
    let relation = test_relation(test_user().id);

    let uc = FederateLoginUseCase {
        users: MockUserRepo::empty(),
        relations: MockRelationRepo::new(vec![relation]),
        registry: test_registry(
            oauth2_provider("vk"),
            StaticAdapter::returning("987654321", vk_profile()),
        ),
        signer: test_signer(),
    };

    let result = uc
        .execute(FederateLoginInput {
            provider_slug: "vk".to_owned(),
            grant: test_grant("good-code"),
        })
        .await;

    assert!(
        matches!(result, Err(IdentityServiceError::IntegrityViolation)),
        "expected IntegrityViolation, got {result:?}"
    );
}

#[tokio::test]
async fn should_fail_with_integrity_violation_when_conflict_winner_is_missing() {
    // A conflict with no winning relation to re-read means the store
    // contradicts itself.
    let relations = MockRelationRepo::conflicting_without_winner();
    let created_users = relations.created_users_handle();

    let uc = FederateLoginUseCase {
        users: MockUserRepo::empty(),
        relations,
        registry: test_registry(
            oauth2_provider("vk"),
            StaticAdapter::returning("987654321", vk_profile()),
        ),
        signer: test_signer(),
    };

    let result = uc
        .execute(FederateLoginInput {
            provider_slug: "vk".to_owned(),
            grant: test_grant("good-code"),
        })
        .await;

    assert!(
        matches!(result, Err(IdentityServiceError::IntegrityViolation)),
        "expected IntegrityViolation, got {result:?}"
    );
    assert!(created_users.lock().unwrap().is_empty());
}

// ── Failure stages ───────────────────────────────────────────────────────────

#[tokio::test]
async fn should_reject_unknown_provider() {
    let uc = FederateLoginUseCase {
        users: MockUserRepo::empty(),
        relations: MockRelationRepo::empty(),
        registry: test_registry(
            oauth2_provider("vk"),
            StaticAdapter::returning("987654321", Map::new()),
        ),
        signer: test_signer(),
    };

    let result = uc
        .execute(FederateLoginInput {
            provider_slug: "ghost".to_owned(),
            grant: test_grant("good-code"),
        })
        .await;

    assert!(
        matches!(result, Err(IdentityServiceError::ProviderNotFound)),
        "expected ProviderNotFound, got {result:?}"
    );
}

#[tokio::test]
async fn should_reject_inactive_provider_as_unknown() {
    let mut provider = oauth2_provider("vk");
    provider.status = ProviderStatus::Inactive;

    let uc = FederateLoginUseCase {
        users: MockUserRepo::empty(),
        relations: MockRelationRepo::empty(),
        registry: test_registry(provider, StaticAdapter::returning("987654321", Map::new())),
        signer: test_signer(),
    };

    let result = uc
        .execute(FederateLoginInput {
            provider_slug: "vk".to_owned(),
            grant: test_grant("good-code"),
        })
        .await;

    assert!(
        matches!(result, Err(IdentityServiceError::ProviderNotFound)),
        "expected ProviderNotFound for inactive provider, got {result:?}"
    );
}

#[tokio::test]
async fn should_reject_provider_without_exchange_support() {
    let registry = std::sync::Arc::new(
        passway_identity::registry::ProviderRegistry::from_config(
            vec![other_provider("telegram")],
            reqwest::Client::new(),
        )
        .unwrap(),
    );

    let uc = FederateLoginUseCase {
        users: MockUserRepo::empty(),
        relations: MockRelationRepo::empty(),
        registry,
        signer: test_signer(),
    };

    let result = uc
        .execute(FederateLoginInput {
            provider_slug: "telegram".to_owned(),
            grant: test_grant("good-code"),
        })
        .await;

    assert!(
        matches!(result, Err(IdentityServiceError::UnsupportedProviderType)),
        "expected UnsupportedProviderType, got {result:?}"
    );
}

#[tokio::test]
async fn should_fail_login_when_code_exchange_fails() {
    let relations = MockRelationRepo::empty();
    let created_users = relations.created_users_handle();

    let uc = FederateLoginUseCase {
        users: MockUserRepo::empty(),
        relations,
        registry: test_registry(oauth2_provider("vk"), StaticAdapter::failing_exchange()),
        signer: test_signer(),
    };

    let result = uc
        .execute(FederateLoginInput {
            provider_slug: "vk".to_owned(),
            grant: test_grant("used-or-bogus-code"),
        })
        .await;

    assert!(
        matches!(result, Err(IdentityServiceError::ExchangeFailed)),
        "expected ExchangeFailed, got {result:?}"
    );
    assert!(
        created_users.lock().unwrap().is_empty(),
        "failed exchange must not create accounts"
    );
}

#[tokio::test]
async fn should_fail_login_when_subject_cannot_be_resolved() {
    let uc = FederateLoginUseCase {
        users: MockUserRepo::empty(),
        relations: MockRelationRepo::empty(),
        registry: test_registry(oauth2_provider("vk"), StaticAdapter::failing_resolve()),
        signer: test_signer(),
    };

    let result = uc
        .execute(FederateLoginInput {
            provider_slug: "vk".to_owned(),
            grant: test_grant("good-code"),
        })
        .await;

    assert!(
        matches!(result, Err(IdentityServiceError::ResolutionFailed)),
        "expected ResolutionFailed, got {result:?}"
    );
}
