use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use passway_domain::provider::{PkceSettings, Provider, ProviderType};

use crate::domain::provider::CodeGrant;
use crate::error::IdentityServiceError;
use crate::handlers::TokenResponse;
use crate::state::AppState;
use crate::usecase::federate::{FederateLoginInput, FederateLoginUseCase};

// ── POST /providers/{slug}/authorize/oauth_code ──────────────────────────────

#[derive(Deserialize)]
pub struct OAuthCodeRequest {
    pub code: String,
    pub state: Option<String>,
    pub redirect_uri: Option<String>,
}

pub async fn authorize_oauth_code(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Json(body): Json<OAuthCodeRequest>,
) -> Result<Json<TokenResponse>, IdentityServiceError> {
    let usecase = FederateLoginUseCase {
        users: state.user_repo(),
        relations: state.relation_repo(),
        registry: Arc::clone(&state.registry),
        signer: Arc::clone(&state.signer),
    };
    let output = usecase
        .execute(FederateLoginInput {
            provider_slug: slug,
            grant: CodeGrant {
                code: body.code,
                redirect_uri: body.redirect_uri,
                state: body.state,
            },
        })
        .await?;
    Ok(Json(TokenResponse::bearer(output.access_token)))
}

// ── GET /providers ───────────────────────────────────────────────────────────

/// Public provider metadata: everything a client needs to build the
/// authorize redirect, and nothing it must not see (no token endpoint, no
/// client secret).
#[derive(Serialize)]
pub struct ProviderResponse {
    pub slug: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ProviderType,
    pub service: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub oauth2: Option<OAuth2Response>,
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub other_data: Map<String, Value>,
}

#[derive(Serialize)]
pub struct OAuth2Response {
    pub authorize: AuthorizeResponse,
    pub instant_authorization: bool,
}

#[derive(Serialize)]
pub struct AuthorizeResponse {
    pub url: String,
    pub params: AuthorizeParams,
    pub pkce: PkceSettings,
}

#[derive(Serialize)]
pub struct AuthorizeParams {
    pub client_id: String,
    pub response_type: String,
    pub scope: String,
}

pub async fn list_providers(State(state): State<AppState>) -> Json<Vec<ProviderResponse>> {
    let providers = state
        .registry
        .list_active()
        .map(provider_response)
        .collect();
    Json(providers)
}

fn provider_response(provider: &Provider) -> ProviderResponse {
    let oauth2 = provider.oauth2.as_ref().map(|settings| OAuth2Response {
        authorize: AuthorizeResponse {
            url: settings.authorize_url.clone(),
            params: AuthorizeParams {
                client_id: settings.client_id.clone(),
                response_type: settings.response_type.clone(),
                scope: settings.scopes.join(" "),
            },
            pkce: settings.pkce.clone(),
        },
        instant_authorization: settings.instant_authorization,
    });
    ProviderResponse {
        slug: provider.slug.clone(),
        name: provider.name.clone(),
        kind: provider.kind,
        service: provider.service.clone(),
        description: provider.description.clone(),
        icon: provider.icon.clone(),
        oauth2,
        other_data: provider.other_data.clone(),
    }
}
