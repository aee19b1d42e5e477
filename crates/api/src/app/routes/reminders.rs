use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post, put},
    Json, Router,
};

use notekeep_auth::{Access, Principal, permissions::reminders};
use notekeep_core::ReminderId;

use crate::app::{errors, services::AppServices};
use crate::authz::guard;
use crate::store::{NewReminder, ReminderFilter, ReminderUpdate};

pub fn router() -> Router {
    Router::new()
        .route(
            "/",
            guard(Access::permission(reminders::VIEW), get(list_reminders))
                .merge(guard(Access::permission(reminders::MANAGE), post(create_reminder))),
        )
        .route(
            "/:id",
            guard(Access::permission(reminders::VIEW), get(get_reminder))
                .merge(guard(Access::permission(reminders::MANAGE), put(update_reminder)))
                .merge(guard(Access::permission(reminders::MANAGE), delete(delete_reminder))),
        )
}

pub async fn list_reminders(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
    Query(filter): Query<ReminderFilter>,
) -> axum::response::Response {
    match services.reminders.list(principal.user_id, &filter) {
        Ok(page) => (StatusCode::OK, Json(page)).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn get_reminder(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
) -> axum::response::Response {
    match id
        .parse::<ReminderId>()
        .and_then(|id| services.reminders.get(principal.user_id, id))
    {
        Ok(reminder) => (StatusCode::OK, Json(reminder)).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn create_reminder(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
    Json(body): Json<NewReminder>,
) -> axum::response::Response {
    match services.reminders.create(principal.user_id, body) {
        Ok(reminder) => (StatusCode::CREATED, Json(reminder)).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn update_reminder(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
    Json(body): Json<ReminderUpdate>,
) -> axum::response::Response {
    match id
        .parse::<ReminderId>()
        .and_then(|id| services.reminders.update(principal.user_id, id, body))
    {
        Ok(reminder) => (StatusCode::OK, Json(reminder)).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn delete_reminder(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
) -> axum::response::Response {
    match id
        .parse::<ReminderId>()
        .and_then(|id| services.reminders.delete(principal.user_id, id))
    {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}
