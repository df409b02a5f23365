use chrono::Utc;
use uuid::Uuid;

use passway_domain::user::{Role, Status};
use passway_identity::domain::types::{AccountPatch, UserFilters};
use passway_identity::error::IdentityServiceError;
use passway_identity::usecase::account::{
    DownloadAccountsUseCase, GetAccountsUseCase, RefreshTokenUseCase, UpdateAccountInput,
    UpdateAccountUseCase,
};

use crate::helpers::{MockUserRepo, test_signer, test_user};

// ── UpdateAccountUseCase ─────────────────────────────────────────────────────

#[tokio::test]
async fn should_update_only_patched_fields() {
    let user = test_user();
    let repo = MockUserRepo::new(vec![user.clone()]);
    let users_handle = repo.users_handle();

    let uc = UpdateAccountUseCase { users: repo };
    uc.execute(UpdateAccountInput {
        user_id: user.id,
        patch: AccountPatch {
            first_name: Some("Anna".to_owned()),
            phone: Some("+79990001122".to_owned()),
            ..Default::default()
        },
    })
    .await
    .unwrap();

    let users = users_handle.lock().unwrap();
    assert_eq!(users[0].first_name.as_deref(), Some("Anna"));
    assert_eq!(users[0].phone.as_deref(), Some("+79990001122"));
    assert_eq!(
        users[0].last_name.as_deref(),
        Some("Petrov"),
        "untouched fields must survive a partial update"
    );
    assert_eq!(users[0].email.as_deref(), Some("user@example.com"));
}

#[tokio::test]
async fn should_skip_repository_write_for_empty_patch() {
    let user = test_user();
    let repo = MockUserRepo::new(vec![user.clone()]);
    let update_calls = repo.update_calls_handle();

    let uc = UpdateAccountUseCase { users: repo };
    uc.execute(UpdateAccountInput {
        user_id: user.id,
        patch: AccountPatch::default(),
    })
    .await
    .unwrap();

    assert_eq!(
        *update_calls.lock().unwrap(),
        0,
        "an all-None patch should not reach the repository"
    );
}

#[tokio::test]
async fn should_return_not_found_when_updating_missing_account() {
    let uc = UpdateAccountUseCase {
        users: MockUserRepo::empty(),
    };

    let result = uc
        .execute(UpdateAccountInput {
            user_id: Uuid::new_v4(),
            patch: AccountPatch {
                first_name: Some("Anna".to_owned()),
                ..Default::default()
            },
        })
        .await;

    assert!(
        matches!(result, Err(IdentityServiceError::UserNotFound)),
        "expected UserNotFound, got {result:?}"
    );
}

// ── RefreshTokenUseCase ──────────────────────────────────────────────────────

#[tokio::test]
async fn should_refresh_token_for_existing_user() {
    let user = test_user();
    let signer = test_signer();

    let uc = RefreshTokenUseCase {
        users: MockUserRepo::new(vec![user.clone()]),
        signer: signer.clone(),
    };

    let output = uc.execute(user.id).await.unwrap();
    assert_eq!(output.user.id, user.id);

    let claims = signer.verify(&output.access_token).unwrap();
    assert_eq!(claims.sub, user.id.to_string());
    assert_eq!(claims.email.as_deref(), Some("user@example.com"));
}

#[tokio::test]
async fn should_carry_current_role_in_refreshed_token() {
    let mut user = test_user();
    user.role = Role::Editor;
    let signer = test_signer();

    let uc = RefreshTokenUseCase {
        users: MockUserRepo::new(vec![user.clone()]),
        signer: signer.clone(),
    };

    let output = uc.execute(user.id).await.unwrap();

    // Claims come from the stored record, so a promotion granted after the
    // original login shows up on the next refresh.
    let claims = signer.verify(&output.access_token).unwrap();
    assert_eq!(claims.role, Role::Editor);
}

#[tokio::test]
async fn should_return_not_found_when_refreshing_for_vanished_user() {
    let uc = RefreshTokenUseCase {
        users: MockUserRepo::empty(),
        signer: test_signer(),
    };

    let result = uc.execute(Uuid::new_v4()).await;
    assert!(
        matches!(result, Err(IdentityServiceError::UserNotFound)),
        "expected UserNotFound, got {result:?}"
    );
}

// ── Bulk reads ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_fetch_accounts_by_ids_skipping_missing() {
    let first = test_user();
    let mut second = test_user();
    second.id = Uuid::parse_str("00000000-0000-0000-0000-000000000002").unwrap();

    let uc = GetAccountsUseCase {
        users: MockUserRepo::new(vec![first.clone(), second.clone()]),
    };

    let found = uc
        .execute(&[first.id, second.id, Uuid::new_v4()])
        .await
        .unwrap();

    assert_eq!(found.len(), 2, "unknown ids are skipped, not errors");
}

#[tokio::test]
async fn should_filter_download_by_role_and_status() {
    let regular = test_user();

    let mut editor = test_user();
    editor.id = Uuid::parse_str("00000000-0000-0000-0000-000000000002").unwrap();
    editor.role = Role::Editor;

    let mut blocked = test_user();
    blocked.id = Uuid::parse_str("00000000-0000-0000-0000-000000000003").unwrap();
    blocked.status = Status::Blocked;

    let uc = DownloadAccountsUseCase {
        users: MockUserRepo::new(vec![regular.clone(), editor.clone(), blocked.clone()]),
    };

    let editors = uc
        .execute(&UserFilters {
            role: Some(Role::Editor),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(editors.len(), 1);
    assert_eq!(editors[0].id, editor.id);

    let active = uc
        .execute(&UserFilters {
            status: Some(Status::Active),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(active.len(), 2, "blocked account must be filtered out");
}

#[tokio::test]
async fn should_apply_relative_date_window_on_download() {
    let recent = test_user();

    let mut old = test_user();
    old.id = Uuid::parse_str("00000000-0000-0000-0000-000000000002").unwrap();
    old.created_at = Utc::now() - chrono::Duration::days(90);

    let uc = DownloadAccountsUseCase {
        users: MockUserRepo::new(vec![recent.clone(), old]),
    };

    let found = uc
        .execute(&UserFilters {
            date_filter: Some("last_30".to_owned()),
            ..Default::default()
        })
        .await
        .unwrap();

    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, recent.id);
}
