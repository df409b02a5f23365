//! Identity provider configuration model.
//!
//! Providers are declared in a JSON file loaded once at startup and are
//! read-only afterwards. The registry in the identity service indexes them
//! by slug.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// How a provider participates in login.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderType {
    /// Server-side authorization-code exchange.
    Oauth2,
    /// Listed for clients (e.g. Telegram login widgets) but not usable
    /// through the code-exchange endpoint.
    Other,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderStatus {
    #[default]
    Active,
    Inactive,
}

/// PKCE requirements advertised to clients building the authorize redirect.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PkceSettings {
    #[serde(default)]
    pub required: bool,
    /// Code-challenge method, normally `S256`.
    #[serde(default)]
    pub method: Option<String>,
}

/// Where the external user identifier lives in the provider's token reply.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SubjectSource {
    /// Top-level field of the token-response JSON (VK style `user_id`).
    TokenField { field: String },
    /// Claim inside the returned `id_token` (OIDC style `sub`).
    IdTokenClaim { claim: String },
}

impl Default for SubjectSource {
    fn default() -> Self {
        Self::TokenField {
            field: "user_id".to_owned(),
        }
    }
}

/// OAuth2 connection settings for one provider.
#[derive(Debug, Clone, Deserialize)]
pub struct OAuth2Settings {
    /// Authorization endpoint, published to clients for redirect construction.
    pub authorize_url: String,
    /// Token endpoint the service exchanges codes against. Never published.
    pub token_url: String,
    /// Optional userinfo endpoint for the best-effort profile fetch.
    #[serde(default)]
    pub userinfo_url: Option<String>,
    pub client_id: String,
    /// Confidential-client secret. Absent for public PKCE clients.
    #[serde(default)]
    pub client_secret: Option<String>,
    #[serde(default = "default_response_type")]
    pub response_type: String,
    #[serde(default)]
    pub scopes: Vec<String>,
    #[serde(default)]
    pub pkce: PkceSettings,
    /// Providers that sign the user in without an intermediate consent hop.
    #[serde(default)]
    pub instant_authorization: bool,
    #[serde(default)]
    pub subject: SubjectSource,
}

fn default_response_type() -> String {
    "code".to_owned()
}

/// One configured identity source.
#[derive(Debug, Clone, Deserialize)]
pub struct Provider {
    /// Unique immutable key, used in routes and stored on relations.
    pub slug: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ProviderType,
    /// Origin label recorded on relations (`provider_service`).
    pub service: String,
    #[serde(default)]
    pub status: ProviderStatus,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
    /// Present iff `type` is `oauth2`.
    #[serde(default)]
    pub oauth2: Option<OAuth2Settings>,
    /// Provider-specific extras surfaced verbatim in the public listing
    /// (Telegram bot name and so on).
    #[serde(default)]
    pub other_data: Map<String, Value>,
}

impl Provider {
    pub fn is_active(&self) -> bool {
        self.status == ProviderStatus::Active
    }
}
