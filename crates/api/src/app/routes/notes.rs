use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post, put},
    Json, Router,
};
use chrono::Utc;

use notekeep_auth::{Access, Principal, permissions::notes};
use notekeep_core::NoteId;

use crate::app::{errors, services::AppServices};
use crate::authz::guard;
use crate::store::{NewNote, NoteFilter, NoteUpdate};

pub fn router() -> Router {
    Router::new()
        .route(
            "/",
            guard(Access::permission(notes::VIEW), get(list_notes))
                .merge(guard(Access::permission(notes::MANAGE), post(create_note))),
        )
        .route(
            "/:id",
            guard(Access::permission(notes::VIEW), get(get_note))
                .merge(guard(Access::permission(notes::MANAGE), put(update_note)))
                .merge(guard(Access::permission(notes::MANAGE), delete(delete_note))),
        )
}

pub async fn list_notes(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
    Query(filter): Query<NoteFilter>,
) -> axum::response::Response {
    match services.notes.list(principal.user_id, &filter) {
        Ok(page) => (StatusCode::OK, Json(page)).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn get_note(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
) -> axum::response::Response {
    match id.parse::<NoteId>().and_then(|id| services.notes.get(principal.user_id, id)) {
        Ok(note) => (StatusCode::OK, Json(note)).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn create_note(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
    Json(body): Json<NewNote>,
) -> axum::response::Response {
    match services.notes.create(principal.user_id, body, Utc::now()) {
        Ok(note) => (StatusCode::CREATED, Json(note)).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn update_note(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
    Json(body): Json<NoteUpdate>,
) -> axum::response::Response {
    match id
        .parse::<NoteId>()
        .and_then(|id| services.notes.update(principal.user_id, id, body))
    {
        Ok(note) => (StatusCode::OK, Json(note)).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn delete_note(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
) -> axum::response::Response {
    match id.parse::<NoteId>().and_then(|id| services.notes.delete(principal.user_id, id)) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}
