//! API-side permission gate.
//!
//! Each protected route is wrapped with [`guard`], which declares its
//! [`Access`] requirement and enforces it before the handler runs. The
//! principal comes from [`auth_middleware`](crate::middleware::auth_middleware).

use axum::{
    extract::State,
    http::StatusCode,
    middleware::Next,
    response::Response,
    routing::MethodRouter,
};

use notekeep_auth::{Access, Principal, check_access};

use crate::app::errors::json_error;

pub async fn enforce(
    State(access): State<Access>,
    req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Response {
    let Some(principal) = req.extensions().get::<Principal>() else {
        return json_error(StatusCode::UNAUTHORIZED, "unauthenticated", "missing bearer token");
    };

    if let Err(e) = check_access(principal, &access) {
        tracing::info!(
            user_id = %principal.user_id,
            role = %principal.role,
            required = %access,
            path = %req.uri().path(),
            "access denied"
        );
        return json_error(StatusCode::FORBIDDEN, "forbidden", e.to_string());
    }

    next.run(req).await
}

/// Attach an access requirement to a method router.
pub fn guard(access: Access, route: MethodRouter) -> MethodRouter {
    route.route_layer(axum::middleware::from_fn_with_state(access, enforce))
}
