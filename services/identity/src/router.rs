use axum::{
    Router,
    routing::{get, post, put},
};
use tower_http::trace::TraceLayer;

use passway_core::health::{healthz, readyz};
use passway_core::middleware::{propagate_request_id_layer, request_id_layer};

use crate::handlers::{
    account::{download_accounts, get_accounts, refresh_token, update_account},
    jwks::jwks,
    providers::{authorize_oauth_code, list_providers},
};
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Health
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        // Providers
        .route("/providers", get(list_providers))
        .route("/providers/{slug}/authorize/oauth_code", post(authorize_oauth_code))
        // Keys
        .route("/.well-known/jwks.json", get(jwks))
        // Account
        .route("/account/update", put(update_account))
        .route("/account/token", get(refresh_token))
        // Accounts
        .route("/accounts/get", post(get_accounts))
        .route("/accounts/download", get(download_accounts))
        .layer(propagate_request_id_layer())
        .layer(TraceLayer::new_for_http())
        .layer(request_id_layer())
        .with_state(state)
}
