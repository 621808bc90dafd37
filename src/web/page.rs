// src/web/page.rs
//! Layout data every page needs: who is looking and the pending flash message.
use crate::{
    error::AppError,
    services::profile_service,
    state::AppState,
    web::{
        flash::{self, Flash},
        mw_auth::{CurrentUser, SESSION_USER_KEY},
    },
};
use axum::{extract::FromRequestParts, http::request::Parts};
use tower_cookies::Cookies;
use tower_sessions::Session;

#[derive(Debug, Clone, Default)]
pub struct NavContext {
    pub signed_in: bool,
    pub is_admin: bool,
    pub user_name: String,
    pub flash: Option<Flash>,
}

impl NavContext {
    fn for_user(user: &CurrentUser) -> Self {
        Self {
            signed_in: true,
            is_admin: user.is_admin(),
            user_name: user.profile.display_name(),
            flash: None,
        }
    }
}

impl FromRequestParts<AppState> for NavContext {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let mut nav = match parts.extensions.get::<CurrentUser>() {
            Some(user) => NavContext::for_user(user),
            // Public pages run without the auth middleware, so look the session up here.
            None => {
                let session = Session::from_request_parts(parts, state)
                    .await
                    .map_err(|(_, msg)| AppError::SessionError(msg.to_string()))?;
                let user_id = session.get::<String>(SESSION_USER_KEY).await.ok().flatten();
                match user_id {
                    Some(id) => match profile_service::find_profile(&state.db_pool, &id).await {
                        Ok(Some(profile)) => NavContext::for_user(&CurrentUser::new(profile)),
                        Ok(None) => NavContext::default(),
                        Err(e) => {
                            tracing::warn!("Nav: profile lookup for {} failed: {:?}", id, e);
                            NavContext::default()
                        }
                    },
                    None => NavContext::default(),
                }
            }
        };

        let cookies = Cookies::from_request_parts(parts, state)
            .await
            .map_err(|(_, msg)| AppError::SessionError(msg.to_string()))?;
        nav.flash = flash::take(&cookies, &state.cookie_key);
        Ok(nav)
    }
}
