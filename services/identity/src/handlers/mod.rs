pub mod account;
pub mod jwks;
pub mod providers;

use serde::Serialize;

/// Token reply shared by login and refresh.
#[derive(Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: &'static str,
}

impl TokenResponse {
    pub fn bearer(access_token: String) -> Self {
        Self {
            access_token,
            token_type: "Bearer",
        }
    }
}
