use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Identity service domain error variants.
///
/// Exchange and resolution failures deliberately carry no provider detail in
/// their display text; the federation use case logs the underlying adapter
/// error before surfacing these, and clients get the generic message only.
#[derive(Debug, thiserror::Error)]
pub enum IdentityServiceError {
    #[error("provider not found")]
    ProviderNotFound,
    #[error("provider does not support code exchange")]
    UnsupportedProviderType,
    #[error("failed to exchange authorization code")]
    ExchangeFailed,
    #[error("failed to resolve external user id")]
    ResolutionFailed,
    #[error("external identity already linked")]
    RelationConflict,
    #[error("user not found")]
    UserNotFound,
    #[error("invalid token")]
    InvalidToken,
    #[error("identity relation references a missing user")]
    IntegrityViolation,
    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

impl IdentityServiceError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ProviderNotFound => "PROVIDER_NOT_FOUND",
            Self::UnsupportedProviderType => "UNSUPPORTED_PROVIDER_TYPE",
            Self::ExchangeFailed => "EXCHANGE_FAILED",
            Self::ResolutionFailed => "RESOLUTION_FAILED",
            Self::RelationConflict => "RELATION_CONFLICT",
            Self::UserNotFound => "USER_NOT_FOUND",
            Self::InvalidToken => "INVALID_TOKEN",
            Self::IntegrityViolation => "INTEGRITY_VIOLATION",
            Self::Internal(_) => "INTERNAL",
        }
    }
}

impl IntoResponse for IdentityServiceError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::ProviderNotFound | Self::UserNotFound => StatusCode::NOT_FOUND,
            Self::UnsupportedProviderType | Self::ExchangeFailed | Self::ResolutionFailed => {
                StatusCode::BAD_REQUEST
            }
            Self::RelationConflict => StatusCode::CONFLICT,
            Self::InvalidToken => StatusCode::UNAUTHORIZED,
            Self::IntegrityViolation | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        // Log 500s only — tower-http TraceLayer already records method/uri/status for all
        // requests. 4xx are expected client errors; logging them here would be noise.
        // Internal errors need the anyhow chain logged so the root cause is traceable.
        match &self {
            Self::Internal(e) => {
                tracing::error!(error = %e, kind = "INTERNAL", "internal error");
            }
            Self::IntegrityViolation => {
                tracing::error!(kind = "INTEGRITY_VIOLATION", "dangling identity relation");
            }
            _ => {}
        }
        let body = serde_json::json!({
            "kind": self.kind(),
            "message": self.to_string(),
        });
        (status, axum::Json(body)).into_response()
    }
}
