use axum::http::StatusCode;

/// `GET /healthz` — process is up.
pub async fn healthz() -> StatusCode {
    StatusCode::OK
}

/// `GET /readyz` — process is ready for traffic. Services that need a deeper
/// check (database reachable etc.) mount their own handler instead.
pub async fn readyz() -> StatusCode {
    StatusCode::OK
}
