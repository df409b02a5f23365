use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Map, Value};

/// Inbound authorization-code grant, as delivered by the routing layer.
#[derive(Debug, Clone)]
pub struct CodeGrant {
    pub code: String,
    pub redirect_uri: Option<String>,
    pub state: Option<String>,
}

/// Raw reply from a provider's token endpoint. Well-known OAuth2 fields are
/// lifted out; everything else stays in `extra` for subject resolution
/// (VK-style providers return `user_id` and `email` alongside the token).
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderToken {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub expires_in: Option<u64>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub id_token: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ProviderToken {
    pub fn bearer(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            token_type: None,
            expires_in: None,
            refresh_token: None,
            id_token: None,
            extra: Map::new(),
        }
    }
}

/// Failure taxonomy of a provider adapter. The orchestrator flattens these
/// into its own error kinds per stage; the variant matters only for logs.
#[derive(Debug, thiserror::Error)]
pub enum AdapterError {
    /// Transport failure or timeout talking to the provider.
    #[error("provider request failed")]
    Network(#[from] anyhow::Error),
    /// Provider answered with a non-success status (invalid or reused code,
    /// bad client credentials). The body is kept for diagnostics.
    #[error("provider rejected the request: {0}")]
    Rejected(String),
    /// The reply parsed but does not carry what we need.
    #[error("provider token unusable: {0}")]
    Unusable(String),
}

/// Capability set one identity provider implements. The federation use case
/// is written against this trait only; concrete providers are registered in
/// the provider registry by slug and resolved per request.
#[async_trait]
pub trait ProviderAdapter: Send + Sync {
    /// Exchange an authorization code at the provider's token endpoint.
    /// Codes are single-use, so this is never retried.
    async fn exchange_code(&self, grant: &CodeGrant) -> Result<ProviderToken, AdapterError>;

    /// Extract the provider-side user identifier from the token reply.
    fn resolve_user_id(&self, token: &ProviderToken) -> Result<String, AdapterError>;

    /// Fetch the user's profile. Best effort: the caller treats failure as
    /// an empty profile, never as a failed login.
    async fn fetch_user_info(
        &self,
        token: &ProviderToken,
    ) -> Result<Map<String, Value>, AdapterError>;
}
