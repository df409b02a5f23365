use passway_domain::provider::Provider;

/// Identity service configuration loaded from environment variables.
#[derive(Debug)]
pub struct IdentityConfig {
    /// PostgreSQL connection URL.
    pub database_url: String,
    /// Path to the provider definitions file (JSON array of providers).
    /// Env var: `PROVIDERS_PATH`, default `providers.json`.
    pub providers_path: String,
    /// Path to the ES256 private key (PKCS#8 PEM) used for token signing.
    pub jwt_private_key_path: String,
    /// Path to the matching public key (SPKI PEM), also exported as JWKS.
    pub jwt_public_key_path: String,
    /// `iss` claim and JWKS key-set owner. Env var: `JWT_ISSUER`, default `passway`.
    pub jwt_issuer: String,
    /// `kid` advertised in the JWKS. Env var: `JWT_KEY_ID`, default `passway-es256`.
    pub jwt_key_id: String,
    /// Access-token lifetime in seconds (default 43200, 12 hours).
    pub token_ttl_secs: u64,
    /// Timeout for provider token/userinfo calls in seconds (default 10).
    pub provider_http_timeout_secs: u64,
    /// TCP port to listen on (default 3114). Env var: `IDENTITY_PORT`.
    pub identity_port: u16,
}

impl IdentityConfig {
    pub fn from_env() -> Self {
        Self {
            database_url: std::env::var("DATABASE_URL").expect("DATABASE_URL"),
            providers_path: std::env::var("PROVIDERS_PATH")
                .unwrap_or_else(|_| "providers.json".to_owned()),
            jwt_private_key_path: std::env::var("JWT_PRIVATE_KEY_PATH")
                .expect("JWT_PRIVATE_KEY_PATH"),
            jwt_public_key_path: std::env::var("JWT_PUBLIC_KEY_PATH")
                .expect("JWT_PUBLIC_KEY_PATH"),
            jwt_issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "passway".to_owned()),
            jwt_key_id: std::env::var("JWT_KEY_ID")
                .unwrap_or_else(|_| "passway-es256".to_owned()),
            token_ttl_secs: std::env::var("TOKEN_TTL_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(43_200),
            provider_http_timeout_secs: std::env::var("PROVIDER_HTTP_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(10),
            identity_port: std::env::var("IDENTITY_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3114),
        }
    }
}

/// Read and parse the provider definitions file.
pub fn load_providers(path: &str) -> anyhow::Result<Vec<Provider>> {
    use anyhow::Context as _;

    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("read providers file `{path}`"))?;
    let providers: Vec<Provider> =
        serde_json::from_str(&raw).with_context(|| format!("parse providers file `{path}`"))?;
    Ok(providers)
}
