use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};

use notekeep_auth::Principal;

pub async fn health() -> StatusCode {
    StatusCode::OK
}

/// The caller's identity and permission claims, as the gate sees them.
pub async fn whoami(Extension(principal): Extension<Principal>) -> impl IntoResponse {
    Json(principal)
}
