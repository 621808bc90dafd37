// src/web/auth_handlers.rs
use crate::{
    error::{AppError, AppResult},
    models::profile::{LoginForm, RegisterForm},
    services::{access_service, auth_service, profile_service},
    state::{AppState, AuthEvent},
    templates::{self, LoginPage, RegisterPage, VerificationPage},
    web::{
        flash::{self, Flash},
        mw_auth::SESSION_USER_KEY,
        page::NavContext,
    },
};
use axum::{
    extract::{Form, State},
    response::{IntoResponse, Redirect, Response},
};
use tower_cookies::Cookies;
use tower_sessions::Session;

const ADMIN_DASHBOARD_PATH: &str = "/admin/dashboard";
const ADMIN_ONLY_MESSAGE: &str = "Access denied. Admin authentication required.";

fn home_for(is_admin: bool) -> &'static str {
    if is_admin { ADMIN_DASHBOARD_PATH } else { access_service::ALUMNI_DASHBOARD_PATH }
}

/// Rotates the session id and stores the user in it.
async fn start_session(session: &Session, user_id: &str) -> AppResult<()> {
    session
        .cycle_id()
        .await
        .map_err(|e| AppError::SessionError(format!("Failed to cycle session id: {e}")))?;
    session
        .insert(SESSION_USER_KEY, user_id)
        .await
        .map_err(|e| AppError::SessionError(format!("Failed to write session: {e}")))?;
    Ok(())
}

// GET /login and GET /admin/login
async fn show_login(nav: NavContext, admin: bool) -> AppResult<Response> {
    if nav.signed_in && (nav.is_admin || !admin) {
        tracing::debug!("GET login: already signed in, redirecting.");
        return Ok(Redirect::to(home_for(nav.is_admin)).into_response());
    }
    Ok(templates::render(&LoginPage::new(nav, admin))?.into_response())
}

pub async fn show_login_form(nav: NavContext) -> AppResult<Response> {
    show_login(nav, false).await
}

pub async fn show_admin_login_form(nav: NavContext) -> AppResult<Response> {
    show_login(nav, true).await
}

// POST /login and POST /admin/login
async fn login(state: AppState, session: Session, form: LoginForm, admin: bool) -> AppResult<Response> {
    tracing::info!("Login attempt for {} (admin: {})", form.email, admin);

    let user_id = match auth_service::authenticate(&state.db_pool, &form.email, &form.password).await {
        Ok(id) => id,
        Err(AppError::InvalidCredentials) => {
            let page = LoginPage {
                email: form.email,
                error: Some("Invalid email or password".into()),
                ..LoginPage::new(NavContext::default(), admin)
            };
            return Ok(templates::render(&page)?.into_response());
        }
        Err(e) => return Err(e),
    };

    let is_admin = profile_service::find_profile(&state.db_pool, &user_id)
        .await?
        .is_some_and(|p| p.is_admin);

    if admin && !is_admin {
        tracing::warn!("Admin login refused for non-admin {}", user_id);
        session
            .delete()
            .await
            .map_err(|e| AppError::SessionError(format!("Failed to clear session: {e}")))?;
        let page = LoginPage {
            email: form.email,
            error: Some(ADMIN_ONLY_MESSAGE.into()),
            ..LoginPage::new(NavContext::default(), true)
        };
        return Ok(templates::render(&page)?.into_response());
    }

    start_session(&session, &user_id).await?;
    state.auth_events.publish(AuthEvent::SignedIn { user_id: user_id.clone() });
    tracing::info!("✅ Login successful for {}", user_id);
    Ok(Redirect::to(home_for(is_admin)).into_response())
}

pub async fn handle_login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> AppResult<Response> {
    login(state, session, form, false).await
}

pub async fn handle_admin_login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> AppResult<Response> {
    login(state, session, form, true).await
}

// GET /register
pub async fn show_register_form(nav: NavContext) -> AppResult<Response> {
    if nav.signed_in {
        return Ok(Redirect::to(home_for(nav.is_admin)).into_response());
    }
    Ok(templates::render(&RegisterPage { nav, ..RegisterPage::default() })?.into_response())
}

// POST /register
pub async fn handle_register(
    State(state): State<AppState>,
    session: Session,
    cookies: Cookies,
    Form(form): Form<RegisterForm>,
) -> AppResult<Response> {
    let refill = |error: String| RegisterPage {
        nav: NavContext::default(),
        error: Some(error),
        email: form.email.clone(),
        first_name: form.first_name.clone(),
        last_name: form.last_name.clone(),
        matriculation_number: form.matriculation_number.clone(),
        graduation_date: form.graduation_date.clone(),
    };

    let registration = match form.validate() {
        Ok(r) => r,
        Err(msg) => {
            tracing::warn!("Registration rejected: {}", msg);
            return Ok(templates::render(&refill(msg))?.into_response());
        }
    };

    let user_id = match auth_service::register(&state.db_pool, &registration).await {
        Ok(id) => id,
        Err(AppError::Validation(msg)) => return Ok(templates::render(&refill(msg))?.into_response()),
        Err(e) => return Err(e),
    };

    start_session(&session, &user_id).await?;
    state.auth_events.publish(AuthEvent::SignedIn { user_id });
    Ok(flash::redirect(
        &cookies,
        &state.cookie_key,
        Flash::success("Registration successful! Please complete your profile."),
        access_service::PROFILE_PATH,
    )
    .into_response())
}

// GET /verification
pub async fn show_verification(nav: NavContext) -> AppResult<Response> {
    Ok(templates::render(&VerificationPage { nav })?.into_response())
}

// GET /logout
pub async fn handle_logout(
    State(state): State<AppState>,
    session: Session,
    cookies: Cookies,
) -> AppResult<Redirect> {
    let user_id: Option<String> = session.get(SESSION_USER_KEY).await.ok().flatten();

    session
        .delete()
        .await
        .map_err(|e| AppError::SessionError(format!("Failed to delete session: {e}")))?;

    match user_id {
        Some(id) => {
            tracing::info!("🚪 User '{}' signed out.", id);
            state.auth_events.publish(AuthEvent::SignedOut { user_id: id });
        }
        None => tracing::info!("🚪 Anonymous session closed."),
    }

    Ok(flash::redirect(&cookies, &state.cookie_key, Flash::success("Signed out."), access_service::LOGIN_PATH))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admins_land_on_the_admin_dashboard() {
        assert_eq!(home_for(true), "/admin/dashboard");
        assert_eq!(home_for(false), "/alumni/dashboard");
    }
}
