use std::sync::Arc;

use axum::{
    Json,
    extract::{Query, State},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use uuid::Uuid;

use passway_domain::user::{Role, Status};

use crate::domain::types::{AccountPatch, User, UserFilters};
use crate::error::IdentityServiceError;
use crate::handlers::TokenResponse;
use crate::identity::CurrentUser;
use crate::state::AppState;
use crate::usecase::account::{
    DownloadAccountsUseCase, GetAccountsUseCase, RefreshTokenUseCase, UpdateAccountInput,
    UpdateAccountUseCase,
};

// ── PUT /account/update ──────────────────────────────────────────────────────

/// Absent and `null` both mean "leave the field as it is".
#[derive(Deserialize)]
pub struct UpdateAccountRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub second_name: Option<String>,
    pub phone: Option<String>,
    pub tg_id: Option<String>,
    pub notification_ways: Option<Vec<String>>,
}

pub async fn update_account(
    current: CurrentUser,
    State(state): State<AppState>,
    Json(body): Json<UpdateAccountRequest>,
) -> Result<Json<Value>, IdentityServiceError> {
    let usecase = UpdateAccountUseCase {
        users: state.user_repo(),
    };
    usecase
        .execute(UpdateAccountInput {
            user_id: current.id,
            patch: AccountPatch {
                first_name: body.first_name,
                last_name: body.last_name,
                second_name: body.second_name,
                phone: body.phone,
                tg_id: body.tg_id,
                notification_ways: body.notification_ways,
            },
        })
        .await?;
    Ok(Json(json!({ "status": "ok" })))
}

// ── GET /account/token ───────────────────────────────────────────────────────

pub async fn refresh_token(
    current: CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<TokenResponse>, IdentityServiceError> {
    let usecase = RefreshTokenUseCase {
        users: state.user_repo(),
        signer: Arc::clone(&state.signer),
    };
    let output = usecase.execute(current.id).await?;
    Ok(Json(TokenResponse::bearer(output.access_token)))
}

// ── POST /accounts/get ───────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct AccountSummary {
    pub id: String,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

pub async fn get_accounts(
    State(state): State<AppState>,
    Json(ids): Json<Vec<Uuid>>,
) -> Result<Json<Vec<AccountSummary>>, IdentityServiceError> {
    let usecase = GetAccountsUseCase {
        users: state.user_repo(),
    };
    let users = usecase.execute(&ids).await?;
    Ok(Json(users.into_iter().map(account_summary).collect()))
}

// ── GET /accounts/download ───────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct DownloadQuery {
    /// `last_<days>` window, e.g. `last_30`.
    pub date_filter: Option<String>,
    pub created_after: Option<DateTime<Utc>>,
    pub region_id: Option<String>,
    pub role: Option<Role>,
    pub status: Option<Status>,
}

pub async fn download_accounts(
    State(state): State<AppState>,
    Query(query): Query<DownloadQuery>,
) -> Result<Json<Vec<AccountSummary>>, IdentityServiceError> {
    let usecase = DownloadAccountsUseCase {
        users: state.user_repo(),
    };
    let users = usecase
        .execute(&UserFilters {
            date_filter: query.date_filter,
            created_after: query.created_after,
            region_id: query.region_id,
            role: query.role,
            status: query.status,
        })
        .await?;
    Ok(Json(users.into_iter().map(account_summary).collect()))
}

fn account_summary(user: User) -> AccountSummary {
    AccountSummary {
        id: user.id.to_string(),
        email: user.email,
        first_name: user.first_name,
        last_name: user.last_name,
    }
}
