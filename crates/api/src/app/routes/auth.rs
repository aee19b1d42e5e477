use std::sync::Arc;

use axum::{
    extract::Extension,
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use notekeep_auth::{Principal, VerifiedIdentity};
use notekeep_core::DomainError;

use crate::app::{dto, errors, services::AppServices};
use crate::telegram;

/// POST /api/auth/login
pub async fn login(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::LoginRequest>,
) -> axum::response::Response {
    // Argon2 verification is CPU-bound; keep it off the async workers.
    let svc = Arc::clone(&services);
    let verified =
        tokio::task::spawn_blocking(move || svc.users.verify_credentials(&body.name, &body.password)).await;

    let identity = match verified {
        Ok(Ok(identity)) => identity,
        Ok(Err(e)) => {
            tracing::info!(error = %e, "login rejected");
            return errors::login_error_to_response(e);
        }
        Err(e) => return errors::domain_error_to_response(DomainError::internal(e.to_string())),
    };

    issue_for(&services, identity)
}

/// POST /api/auth/login/telegram
pub async fn login_telegram(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::TelegramLoginRequest>,
) -> axum::response::Response {
    let Some(bot_token) = services.telegram_bot_token.as_deref() else {
        return errors::json_error(
            StatusCode::SERVICE_UNAVAILABLE,
            "telegram_disabled",
            "telegram login is not configured",
        );
    };

    let username = match telegram::verify_init_data(&body.init_data, bot_token)
        .and_then(|user| user.username().map(str::to_string))
    {
        Ok(u) => u,
        Err(e) => {
            tracing::info!(error = %e, "telegram init data rejected");
            return errors::init_data_error_to_response(e);
        }
    };

    let user = match services.users.find_by_telegram(&username) {
        Ok(Some(user)) => user,
        Ok(None) => {
            return errors::json_error(
                StatusCode::NOT_FOUND,
                "not_found",
                "no account is linked to this telegram user",
            );
        }
        Err(e) => return errors::domain_error_to_response(e),
    };

    issue_for(&services, user.identity())
}

/// POST /api/auth/register
pub async fn register(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::RegisterRequest>,
) -> axum::response::Response {
    let svc = Arc::clone(&services);
    let created = tokio::task::spawn_blocking(move || svc.users.create(&body.name, &body.password, body.role))
        .await
        .unwrap_or_else(|e| Err(DomainError::internal(e.to_string())));

    match created {
        Ok(user) => {
            tracing::info!(user_id = %user.id, role = %user.role, "user registered");
            (StatusCode::CREATED, Json(user)).into_response()
        }
        Err(e) => errors::domain_error_to_response(e),
    }
}

/// POST /api/auth/link-telegram
pub async fn link_telegram(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
    Json(body): Json<dto::LinkTelegramRequest>,
) -> axum::response::Response {
    match services.users.link_telegram(principal.user_id, &body.username) {
        Ok(user) => (StatusCode::OK, Json(user)).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

fn issue_for(services: &AppServices, identity: VerifiedIdentity) -> axum::response::Response {
    match services.issuer.issue_now(&identity) {
        Ok(token) => (StatusCode::OK, Json(dto::LoginResponse::new(token, identity))).into_response(),
        Err(e) => errors::issue_error_to_response(e),
    }
}
