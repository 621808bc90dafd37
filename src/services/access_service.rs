// src/services/access_service.rs
//! Route guard: decides whether a page renders or where the visitor goes instead.
use crate::{
    error::AppResult,
    models::profile::{Profile, ProfileState},
};

pub const LOGIN_PATH: &str = "/login";
pub const ALUMNI_DASHBOARD_PATH: &str = "/alumni/dashboard";
pub const PROFILE_PATH: &str = "/alumni/profile";

/// What a route demands from the visitor beyond being signed in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RouteRequirements {
    pub admin_only: bool,
    pub require_complete_profile: bool,
}

impl RouteRequirements {
    pub const SIGNED_IN: Self = Self { admin_only: false, require_complete_profile: false };
    pub const ADMIN_ONLY: Self = Self { admin_only: true, require_complete_profile: false };
    pub const COMPLETE_PROFILE: Self = Self { admin_only: false, require_complete_profile: true };
}

/// Everything the guard looks at. A session without a profile row counts as no session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AccessContext {
    pub authenticated: bool,
    pub is_admin: bool,
    pub profile_complete: bool,
}

impl AccessContext {
    pub const ANONYMOUS: Self = Self { authenticated: false, is_admin: false, profile_complete: false };

    pub fn for_profile(profile: &Profile, state: &ProfileState) -> Self {
        Self { authenticated: true, is_admin: profile.is_admin, profile_complete: state.is_complete }
    }

    /// Builds the context from a profile lookup. Lookup failures fail closed.
    pub fn from_lookup(session_user: Option<&str>, lookup: &AppResult<Option<Profile>>) -> Self {
        let Some(user_id) = session_user else {
            return Self::ANONYMOUS;
        };
        match lookup {
            Ok(Some(profile)) => Self::for_profile(profile, &ProfileState::resolve(Some(profile))),
            Ok(None) => {
                tracing::warn!("Guard: session for '{}' has no profile row, treating as signed out.", user_id);
                Self::ANONYMOUS
            }
            Err(e) => {
                tracing::error!("Guard: profile lookup for '{}' failed, denying access: {:?}", user_id, e);
                Self::ANONYMOUS
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    Render,
    RedirectToLogin,
    RedirectToAlumniDashboard,
    RedirectToProfile,
}

impl GuardDecision {
    pub fn redirect_target(self) -> Option<&'static str> {
        match self {
            GuardDecision::Render => None,
            GuardDecision::RedirectToLogin => Some(LOGIN_PATH),
            GuardDecision::RedirectToAlumniDashboard => Some(ALUMNI_DASHBOARD_PATH),
            GuardDecision::RedirectToProfile => Some(PROFILE_PATH),
        }
    }
}

/// Checks run in a fixed order; the first failing one wins.
/// Admins are exempt from the completeness check on every route.
pub fn decide(ctx: AccessContext, requirements: RouteRequirements) -> GuardDecision {
    // Checked in order; the first failing check picks the redirect.
    if !ctx.authenticated {
        return GuardDecision::RedirectToLogin;
    }
    if requirements.admin_only && !ctx.is_admin {
        return GuardDecision::RedirectToAlumniDashboard;
    }
    // Admins are never held back by their own profile.
    if requirements.require_complete_profile && !ctx.profile_complete && !ctx.is_admin {
        return GuardDecision::RedirectToProfile;
    }
    GuardDecision::Render
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{error::AppError, models::profile::blank_profile};

    const ALUMNUS: AccessContext = AccessContext { authenticated: true, is_admin: false, profile_complete: true };
    const NEW_ALUMNUS: AccessContext = AccessContext { authenticated: true, is_admin: false, profile_complete: false };
    const ADMIN_INCOMPLETE: AccessContext = AccessContext { authenticated: true, is_admin: true, profile_complete: false };

    #[test]
    fn anonymous_visitor_goes_to_login_before_profile() {
        let decision = decide(AccessContext::ANONYMOUS, RouteRequirements::COMPLETE_PROFILE);
        assert_eq!(decision, GuardDecision::RedirectToLogin);
        assert_eq!(decision.redirect_target(), Some("/login"));
    }

    #[test]
    fn non_admin_on_admin_route_goes_to_alumni_dashboard() {
        assert_eq!(
            decide(ALUMNUS, RouteRequirements::ADMIN_ONLY),
            GuardDecision::RedirectToAlumniDashboard
        );
    }

    #[test]
    fn incomplete_profile_is_sent_to_profile_page() {
        assert_eq!(
            decide(NEW_ALUMNUS, RouteRequirements::COMPLETE_PROFILE),
            GuardDecision::RedirectToProfile
        );
        assert_eq!(decide(NEW_ALUMNUS, RouteRequirements::SIGNED_IN), GuardDecision::Render);
    }

    #[test]
    fn admins_skip_the_completeness_gate() {
        assert_eq!(decide(ADMIN_INCOMPLETE, RouteRequirements::COMPLETE_PROFILE), GuardDecision::Render);
        assert_eq!(decide(ADMIN_INCOMPLETE, RouteRequirements::ADMIN_ONLY), GuardDecision::Render);
    }

    #[test]
    fn decision_is_a_pure_function_of_its_inputs() {
        for authenticated in [false, true] {
            for is_admin in [false, true] {
                for profile_complete in [false, true] {
                    for admin_only in [false, true] {
                        for require_complete_profile in [false, true] {
                            let ctx = AccessContext { authenticated, is_admin, profile_complete };
                            let req = RouteRequirements { admin_only, require_complete_profile };
                            assert_eq!(decide(ctx, req), decide(ctx, req));
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn lookup_failure_fails_closed() {
        let failed: AppResult<Option<Profile>> = Err(AppError::InternalServerError);
        let ctx = AccessContext::from_lookup(Some("u1"), &failed);
        assert_eq!(ctx, AccessContext::ANONYMOUS);
        assert_eq!(decide(ctx, RouteRequirements::SIGNED_IN), GuardDecision::RedirectToLogin);
    }

    #[test]
    fn session_without_profile_row_is_anonymous() {
        let ctx = AccessContext::from_lookup(Some("u1"), &Ok(None));
        assert!(!ctx.authenticated);
    }

    #[test]
    fn admin_flag_comes_from_the_profile() {
        let profile = Profile { is_admin: true, ..blank_profile("root") };
        let ctx = AccessContext::from_lookup(Some("root"), &Ok(Some(profile)));
        assert!(ctx.authenticated && ctx.is_admin && !ctx.profile_complete);
    }
}
