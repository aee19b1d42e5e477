use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};
use chrono::Utc;

use notekeep_auth::{AuthnError, TokenValidator};

use crate::app::errors::json_error;

#[derive(Clone)]
pub struct AuthState {
    pub validator: Arc<dyn TokenValidator>,
}

/// Resolve the bearer credential into a [`Principal`](notekeep_auth::Principal)
/// request extension, or answer 401 without running the handler.
pub async fn auth_middleware(
    State(state): State<AuthState>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Response {
    let principal = match extract_bearer(req.headers()).and_then(|token| state.validator.validate(token, Utc::now())) {
        Ok(principal) => principal,
        Err(e) => {
            tracing::debug!(error = %e, path = %req.uri().path(), "authentication failed");
            return json_error(StatusCode::UNAUTHORIZED, "unauthenticated", e.to_string());
        }
    };

    req.extensions_mut().insert(principal);
    next.run(req).await
}

fn extract_bearer(headers: &HeaderMap) -> Result<&str, AuthnError> {
    let header = headers
        .get(axum::http::header::AUTHORIZATION)
        .ok_or(AuthnError::MissingToken)?;

    let header = header
        .to_str()
        .map_err(|_| AuthnError::Malformed("authorization header is not ASCII".to_string()))?;

    let header = header
        .strip_prefix("Bearer ")
        .ok_or_else(|| AuthnError::Malformed("expected a Bearer credential".to_string()))?;

    let token = header.trim();
    if token.is_empty() {
        return Err(AuthnError::MissingToken);
    }

    Ok(token)
}
