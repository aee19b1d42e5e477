use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, put},
    Json, Router,
};

use notekeep_auth::{Access, Principal, permissions::users};
use notekeep_core::{DomainError, UserId};

use crate::app::{dto, errors, services::AppServices};
use crate::authz::guard;
use crate::store::UserFilter;

pub fn router() -> Router {
    Router::new()
        .route("/", guard(Access::permission(users::VIEW), get(list_users)))
        .route(
            "/:id",
            guard(Access::permission(users::VIEW), get(get_user))
                .merge(guard(Access::permission(users::MANAGE), delete(delete_user))),
        )
        .route("/:id/role", guard(Access::permission(users::MANAGE), put(set_role)))
}

pub async fn list_users(
    Extension(services): Extension<Arc<AppServices>>,
    Query(filter): Query<UserFilter>,
) -> axum::response::Response {
    match services.users.list(&filter) {
        Ok(page) => (StatusCode::OK, Json(page)).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn get_user(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    match id.parse::<UserId>().and_then(|id| services.users.get(id)) {
        Ok(user) => (StatusCode::OK, Json(user)).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

/// PUT /api/users/:id/role
///
/// Tokens already issued to the user keep their old claims until expiry.
pub async fn set_role(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
    Json(body): Json<dto::SetRoleRequest>,
) -> axum::response::Response {
    match id.parse::<UserId>().and_then(|id| services.users.set_role(id, body.role)) {
        Ok(user) => {
            tracing::info!(
                user_id = %user.id,
                role = %user.role,
                changed_by = %principal.user_id,
                "user role changed"
            );
            (StatusCode::OK, Json(user)).into_response()
        }
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn delete_user(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match id.parse::<UserId>() {
        Ok(id) => id,
        Err(e) => return errors::domain_error_to_response(e),
    };
    if id == principal.user_id {
        return errors::domain_error_to_response(DomainError::conflict("cannot delete your own account"));
    }

    let removed = match services.users.delete(id) {
        Ok(user) => user,
        Err(e) => return errors::domain_error_to_response(e),
    };
    let owned = services
        .notes
        .delete_owned_by(removed.id)
        .and_then(|notes| Ok((notes, services.reminders.delete_owned_by(removed.id)?)));
    match owned {
        Ok((notes, reminders)) => {
            tracing::info!(
                user_id = %removed.id,
                notes,
                reminders,
                deleted_by = %principal.user_id,
                "user deleted"
            );
            StatusCode::NO_CONTENT.into_response()
        }
        Err(e) => errors::domain_error_to_response(e),
    }
}
