use axum::{
    routing::{get, post},
    Router,
};

use notekeep_auth::Access;

use crate::authz::guard;

pub mod auth;
pub mod notes;
pub mod rbac;
pub mod reminders;
pub mod system;
pub mod users;

/// Routes reachable without a credential (mounted under `/api`).
pub fn public_router() -> Router {
    Router::new()
        .route("/auth/login", post(auth::login))
        .route("/auth/login/telegram", post(auth::login_telegram))
}

/// Routes behind the bearer credential (mounted under `/api`).
///
/// Every route declares its access requirement through [`guard`].
pub fn router() -> Router {
    Router::new()
        .route("/whoami", guard(Access::Authenticated, get(system::whoami)))
        .route(
            "/auth/register",
            guard(Access::permission(notekeep_auth::permissions::users::MANAGE), post(auth::register)),
        )
        .route("/auth/link-telegram", guard(Access::Authenticated, post(auth::link_telegram)))
        .nest("/users", users::router())
        .nest("/notes", notes::router())
        .nest("/reminders", reminders::router())
        .nest("/rbac", rbac::router())
}
