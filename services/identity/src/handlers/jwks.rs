use axum::{Json, extract::State};

use crate::signer::JwkSet;
use crate::state::AppState;

// ── GET /.well-known/jwks.json ───────────────────────────────────────────────

/// Public verification material. Pure read, safe unauthenticated.
pub async fn jwks(State(state): State<AppState>) -> Json<JwkSet> {
    Json(state.signer.jwks())
}
