// src/web/mw_auth.rs
use crate::{
    error::AppError,
    models::profile::{Profile, ProfileState},
    services::{
        access_service::{self, AccessContext, GuardDecision, RouteRequirements},
        profile_service,
    },
    state::AppState,
};
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

pub const SESSION_USER_KEY: &str = "user_id";

/// Per-request snapshot of the signed-in user, read by later middleware and handlers.
#[derive(Clone, Debug)]
pub struct CurrentUser {
    pub profile: Profile,
    pub state: ProfileState,
}

impl CurrentUser {
    pub fn new(profile: Profile) -> Self {
        let state = ProfileState::resolve(Some(&profile));
        Self { profile, state }
    }

    pub fn id(&self) -> &str {
        &self.profile.id
    }

    pub fn is_admin(&self) -> bool {
        self.profile.is_admin
    }

    pub fn access(&self) -> AccessContext {
        AccessContext::for_profile(&self.profile, &self.state)
    }
}

/// Turns a guard decision into either the next handler's response or a redirect.
pub(crate) async fn apply(decision: GuardDecision, request: Request, next: Next) -> Response {
    match decision.redirect_target() {
        // Render: hand over to the handler untouched.
        None => next.run(request).await,
        Some(target) => Redirect::to(target).into_response(),
    }
}

/// Requires a session whose user still has a profile row.
/// Must run before `require_admin` and `require_complete_profile`, which read the snapshot.
pub async fn require_auth(
    State(state): State<AppState>, // db_pool for the profile lookup
    session: Session,              // current session, possibly empty
    mut request: Request,          // mutable so the snapshot can be attached
    next: Next,
) -> Result<Response, AppError> {
    // A broken session store is a server error, not a logged-out visitor.
    let user_id = session
        .get::<String>(SESSION_USER_KEY)
        .await
        .map_err(|e| {
            tracing::error!("Auth MW: failed to read session: {:?}", e);
            AppError::SessionError(format!("Failed to read session: {e}"))
        })?;

    // No id in the session means no lookup at all.
    let lookup = match user_id.as_deref() {
        Some(id) => profile_service::find_profile(&state.db_pool, id).await,
        None => Ok(None),
    };
    // A failed or empty lookup counts as signed out.
    let ctx = AccessContext::from_lookup(user_id.as_deref(), &lookup);
    let decision = access_service::decide(ctx, RouteRequirements::SIGNED_IN);

    match (decision, lookup) {
        (GuardDecision::Render, Ok(Some(profile))) => {
            tracing::debug!("Auth MW: '{}' authenticated.", profile.id);
            // One snapshot per request; edits show up on the next navigation.
            request.extensions_mut().insert(CurrentUser::new(profile));
            Ok(next.run(request).await)
        }
        (decision, _) => {
            tracing::debug!("Auth MW: not authenticated, redirecting ({:?}).", decision);
            Ok(Redirect::to(access_service::LOGIN_PATH).into_response())
        }
    }
}
