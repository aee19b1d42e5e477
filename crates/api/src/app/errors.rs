use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use notekeep_auth::IssueError;
use notekeep_core::DomainError;

use crate::store::LoginError;
use crate::telegram::InitDataError;

pub fn domain_error_to_response(err: DomainError) -> axum::response::Response {
    match err {
        DomainError::Validation(msg) => json_error(StatusCode::BAD_REQUEST, "validation_error", msg),
        DomainError::InvalidId(msg) => json_error(StatusCode::BAD_REQUEST, "invalid_id", msg),
        DomainError::NotFound(_) => json_error(StatusCode::NOT_FOUND, "not_found", err.to_string()),
        DomainError::Conflict(msg) => json_error(StatusCode::CONFLICT, "conflict", msg),
        DomainError::Internal(msg) => {
            tracing::error!(error = %msg, "internal error");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "internal_error", "internal error")
        }
    }
}

/// Unknown user and wrong password are reported separately (404 vs 401).
pub fn login_error_to_response(err: LoginError) -> axum::response::Response {
    match err {
        LoginError::UnknownUser => json_error(StatusCode::NOT_FOUND, "not_found", err.to_string()),
        LoginError::InvalidPassword => json_error(StatusCode::UNAUTHORIZED, "unauthenticated", err.to_string()),
        LoginError::Domain(e) => domain_error_to_response(e),
    }
}

pub fn issue_error_to_response(err: IssueError) -> axum::response::Response {
    tracing::error!(error = %err, "token issuance failed");
    json_error(StatusCode::INTERNAL_SERVER_ERROR, "token_error", "could not issue token")
}

pub fn init_data_error_to_response(err: InitDataError) -> axum::response::Response {
    json_error(StatusCode::UNAUTHORIZED, "unauthenticated", err.to_string())
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
