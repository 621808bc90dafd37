// src/web/mw_profile.rs
use crate::{
    services::access_service::{self, GuardDecision, RouteRequirements},
    web::mw_auth::{self, CurrentUser},
};
use axum::{
    extract::{Extension, Request},
    middleware::Next,
    response::Response,
};

/// Routes that need a finished profile. Admins pass regardless.
pub async fn require_complete_profile(
    Extension(user): Extension<CurrentUser>, // snapshot left by require_auth
    request: Request,
    next: Next,
) -> Response {
    // Admins pass this gate inside decide().
    let decision = access_service::decide(user.access(), RouteRequirements::COMPLETE_PROFILE);
    if decision == GuardDecision::RedirectToProfile {
        tracing::debug!(
            "Profile MW: {} is {}% complete, sending to profile.",
            user.id(),
            user.state.completion_percentage
        );
    }
    mw_auth::apply(decision, request, next).await
}
