//! Bearer-token identity extractor.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum_extra::headers::authorization::Bearer;
use axum_extra::headers::{Authorization, HeaderMapExt as _};
use uuid::Uuid;

use passway_domain::user::Role;

use crate::error::IdentityServiceError;
use crate::state::AppState;

/// Authenticated subject of the current request, taken from the
/// `Authorization: Bearer` header and verified against the signer.
///
/// Rejects with 401 `INVALID_TOKEN` when the header is absent or the token
/// does not verify. Whether the account still exists is checked by the use
/// cases, not here.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: Uuid,
    pub role: Role,
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = IdentityServiceError;

    // axum-core 0.5 defines this as `fn -> impl Future + Send` (not `async fn`).
    // In Rust 1.82+ precise capturing, `async fn` captures lifetimes differently,
    // causing E0195. Fix: extract values synchronously, return a 'static async move block.
    fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        let bearer = parts
            .headers
            .typed_get::<Authorization<Bearer>>()
            .map(|auth| auth.token().to_owned());
        let signer = state.signer.clone();

        async move {
            let token = bearer.ok_or(IdentityServiceError::InvalidToken)?;
            let claims = signer.verify(&token)?;
            let id = claims
                .sub
                .parse::<Uuid>()
                .map_err(|_| IdentityServiceError::InvalidToken)?;
            Ok(Self {
                id,
                role: claims.role,
            })
        }
    }
}
