//! RBAC audit endpoints.
//!
//! `roles` shows the live role table; `explain` answers "would my current
//! credential pass this permission check, and if not, why?".

use std::sync::Arc;

use axum::{
    extract::{Extension, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};

use notekeep_auth::{Access, Permission, Principal, explain_authorization, permissions::users};

use crate::app::{dto, errors, services::AppServices};
use crate::authz::guard;

pub fn router() -> Router {
    Router::new()
        .route("/roles", guard(Access::permission(users::VIEW), get(list_roles)))
        .route("/explain", guard(Access::Authenticated, get(explain)))
}

/// GET /api/rbac/roles
pub async fn list_roles(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    let roles = services.mapping.definitions();
    (StatusCode::OK, Json(serde_json::json!({ "roles": roles }))).into_response()
}

/// GET /api/rbac/explain?permission=Permissions.Notes.View
pub async fn explain(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
    Query(query): Query<dto::ExplainQuery>,
) -> axum::response::Response {
    let permission = query.permission.trim();
    if permission.is_empty() {
        return errors::json_error(StatusCode::BAD_REQUEST, "validation_error", "permission must not be empty");
    }

    let explanation = explain_authorization(&principal, &Permission::new(permission.to_string()), &services.mapping);
    (StatusCode::OK, Json(explanation)).into_response()
}
