//! HTTP adapter for OAuth2 authorization-code providers.

use anyhow::Context as _;
use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde_json::{Map, Value};

use passway_domain::provider::{OAuth2Settings, SubjectSource};

use crate::domain::provider::{AdapterError, CodeGrant, ProviderAdapter, ProviderToken};

/// Generic adapter driven entirely by `OAuth2Settings`; one instance per
/// configured provider, all sharing the service-wide HTTP client.
pub struct HttpOAuthAdapter {
    settings: OAuth2Settings,
    http: reqwest::Client,
}

impl HttpOAuthAdapter {
    pub fn new(settings: OAuth2Settings, http: reqwest::Client) -> Self {
        Self { settings, http }
    }

    fn exchange_params<'a>(&'a self, grant: &'a CodeGrant) -> Vec<(&'static str, &'a str)> {
        let mut params = vec![
            ("grant_type", "authorization_code"),
            ("code", grant.code.as_str()),
            ("client_id", self.settings.client_id.as_str()),
        ];
        if let Some(secret) = &self.settings.client_secret {
            params.push(("client_secret", secret.as_str()));
        }
        if let Some(redirect_uri) = &grant.redirect_uri {
            params.push(("redirect_uri", redirect_uri.as_str()));
        }
        params
    }
}

#[async_trait]
impl ProviderAdapter for HttpOAuthAdapter {
    async fn exchange_code(&self, grant: &CodeGrant) -> Result<ProviderToken, AdapterError> {
        let response = self
            .http
            .post(&self.settings.token_url)
            .form(&self.exchange_params(grant))
            .send()
            .await
            .context("token endpoint request")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AdapterError::Rejected(format!("HTTP {status} - {body}")));
        }

        let token: ProviderToken = response.json().await.context("decode token response")?;
        Ok(token)
    }

    fn resolve_user_id(&self, token: &ProviderToken) -> Result<String, AdapterError> {
        match &self.settings.subject {
            SubjectSource::TokenField { field } => {
                let value = token
                    .extra
                    .get(field)
                    .ok_or_else(|| AdapterError::Unusable(format!("token reply missing `{field}`")))?;
                subject_to_string(value).ok_or_else(|| {
                    AdapterError::Unusable(format!("token field `{field}` is not a scalar"))
                })
            }
            SubjectSource::IdTokenClaim { claim } => {
                let id_token = token
                    .id_token
                    .as_deref()
                    .ok_or_else(|| AdapterError::Unusable("token reply missing id_token".to_owned()))?;
                let claims = decode_id_token_payload(id_token)?;
                let value = claims
                    .get(claim)
                    .ok_or_else(|| AdapterError::Unusable(format!("id_token missing claim `{claim}`")))?;
                subject_to_string(value).ok_or_else(|| {
                    AdapterError::Unusable(format!("id_token claim `{claim}` is not a scalar"))
                })
            }
        }
    }

    async fn fetch_user_info(
        &self,
        token: &ProviderToken,
    ) -> Result<Map<String, Value>, AdapterError> {
        let Some(url) = &self.settings.userinfo_url else {
            return Ok(Map::new());
        };
        let response = self
            .http
            .get(url)
            .bearer_auth(&token.access_token)
            .send()
            .await
            .context("userinfo request")?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AdapterError::Rejected(format!("HTTP {status} - {body}")));
        }
        let profile: Map<String, Value> =
            response.json().await.context("decode userinfo response")?;
        Ok(profile)
    }
}

/// External ids arrive as strings or bare numbers (VK sends `user_id` as a
/// number); numbers are stored in their decimal form.
fn subject_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Pull claims out of an id_token without checking its signature. The token
/// came over TLS straight from the provider's token endpoint, the one channel
/// OIDC permits to be trusted as-is.
fn decode_id_token_payload(id_token: &str) -> Result<Map<String, Value>, AdapterError> {
    let mut segments = id_token.split('.');
    let payload = match (
        segments.next(),
        segments.next(),
        segments.next(),
        segments.next(),
    ) {
        (Some(_), Some(payload), Some(_), None) => payload,
        _ => {
            return Err(AdapterError::Unusable(
                "id_token is not a three-part JWT".to_owned(),
            ));
        }
    };
    let bytes = URL_SAFE_NO_PAD
        .decode(payload)
        .map_err(|_| AdapterError::Unusable("id_token payload is not base64url".to_owned()))?;
    serde_json::from_slice(&bytes)
        .map_err(|_| AdapterError::Unusable("id_token payload is not a JSON object".to_owned()))
}
