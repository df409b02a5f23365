use std::sync::Arc;
use std::time::Duration;

use sea_orm::Database;
use tracing::info;

use passway_core::tracing::init_tracing;
use passway_identity::config::{IdentityConfig, load_providers};
use passway_identity::registry::ProviderRegistry;
use passway_identity::router::build_router;
use passway_identity::signer::TokenSigner;
use passway_identity::state::AppState;

#[tokio::main]
async fn main() {
    init_tracing();

    let config = IdentityConfig::from_env();

    let db = Database::connect(&config.database_url)
        .await
        .expect("failed to connect to database");

    let private_pem = std::fs::read_to_string(&config.jwt_private_key_path)
        .expect("failed to read JWT private key");
    let public_pem = std::fs::read_to_string(&config.jwt_public_key_path)
        .expect("failed to read JWT public key");
    let signer = TokenSigner::from_pem(
        &private_pem,
        &public_pem,
        config.jwt_issuer.as_str(),
        config.jwt_key_id.as_str(),
        config.token_ttl_secs,
    )
    .expect("failed to build token signer");

    let providers = load_providers(&config.providers_path).expect("failed to load providers");
    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.provider_http_timeout_secs))
        .build()
        .expect("failed to build HTTP client");
    let registry =
        ProviderRegistry::from_config(providers, http).expect("invalid provider configuration");

    let state = AppState {
        db,
        registry: Arc::new(registry),
        signer: Arc::new(signer),
    };

    let router = build_router(state);
    let addr = format!("0.0.0.0:{}", config.identity_port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind");

    info!("identity service listening on {addr}");
    axum::serve(listener, router).await.expect("server error");
}
