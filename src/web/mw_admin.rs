// src/web/mw_admin.rs
use crate::{
    services::access_service::{self, GuardDecision, RouteRequirements},
    web::mw_auth::{self, CurrentUser},
};
use axum::{
    extract::{Extension, Request},
    middleware::Next,
    response::Response,
};

/// Admin-only routes. Runs after `require_auth`, which provides the snapshot.
/// Signed-in non-admins are sent to the alumni dashboard.
pub async fn require_admin(
    Extension(user): Extension<CurrentUser>, // snapshot left by require_auth
    request: Request,
    next: Next,
) -> Response {
    // The admin flag comes from user_roles, read once by require_auth.
    let decision = access_service::decide(user.access(), RouteRequirements::ADMIN_ONLY);
    match decision {
        GuardDecision::Render => tracing::debug!("Admin MW: access granted for {}", user.id()),
        _ => tracing::warn!("Admin MW: access denied for {} (not an admin).", user.id()),
    }
    mw_auth::apply(decision, request, next).await
}
