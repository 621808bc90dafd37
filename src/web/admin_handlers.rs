// src/web/admin_handlers.rs
use crate::{
    error::{AppError, AppResult},
    models::profile::{NewAlumniForm, ProfileForm},
    services::{
        directory_service, event_service, news_service, payment_service, profile_service, DeleteOutcome,
    },
    state::{AppState, AuthEvent},
    templates::{
        self, AdminAlumniEditPage, AdminAlumniPage, AdminDashboardPage, AdminPanelPage, ConfirmDeletePage,
        FacultyGroup, SelectOption,
    },
    web::{
        flash::{self, Flash},
        mw_auth::CurrentUser,
        page::NavContext,
    },
};
use axum::{
    extract::{Extension, Form, Path, Query, State},
    response::{Html, Redirect},
};
use serde::Deserialize;
use tower_cookies::Cookies;

pub(crate) const ALUMNI_PANEL_PATH: &str = "/admin/panel/alumni";
const DASHBOARD_ROWS: usize = 5;

/// Body of every delete form. Only `confirm=yes` lets a delete through.
#[derive(Debug, Default, Deserialize)]
pub struct ConfirmForm {
    #[serde(default)]
    pub confirm: String,
}

impl ConfirmForm {
    pub fn confirmed(&self) -> bool {
        self.confirm == "yes"
    }
}

/// Flash for a finished delete; partial deletes surface their own warning.
pub(crate) fn delete_flash(outcome: DeleteOutcome, what: &str) -> Flash {
    match outcome {
        DeleteOutcome::Deleted => Flash::success(format!("{what} deleted successfully.")),
        DeleteOutcome::PartiallyDeleted { warning } => Flash::warning(warning),
    }
}

pub(crate) fn not_confirmed() -> Flash {
    Flash::error("Deletion was not confirmed. Nothing was deleted.")
}

// GET /admin/dashboard
pub async fn dashboard(nav: NavContext, State(state): State<AppState>) -> AppResult<Html<String>> {
    let alumni = profile_service::list_alumni(&state.db_pool).await?;
    let events_count = event_service::list_events(&state.db_pool).await?.len();
    let news_count = news_service::list_news(&state.db_pool).await?.len();
    let payments_count = payment_service::count_payments(&state.db_pool).await?;
    let recent_payments = payment_service::list_recent(&state.db_pool, DASHBOARD_ROWS as i64).await?;

    let alumni_count = alumni.len();
    let mut latest_alumni = alumni;
    latest_alumni.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    latest_alumni.truncate(DASHBOARD_ROWS);

    templates::render(&AdminDashboardPage {
        nav,
        alumni_count,
        events_count,
        news_count,
        payments_count,
        latest_alumni,
        recent_payments,
    })
}

// GET /admin/panel
pub async fn panel(nav: NavContext) -> AppResult<Html<String>> {
    templates::render(&AdminPanelPage { nav })
}

#[derive(Debug, Default, Deserialize)]
pub struct AlumniSearch {
    #[serde(default)]
    pub q: String,
}

// GET /admin/panel/alumni
pub async fn list_alumni(
    nav: NavContext,
    State(state): State<AppState>,
    Query(search): Query<AlumniSearch>,
) -> AppResult<Html<String>> {
    let alumni = profile_service::list_alumni(&state.db_pool).await?;
    let matching = directory_service::search(&alumni, &search.q).into_iter().cloned().collect();
    templates::render(&AdminAlumniPage {
        nav,
        alumni: matching,
        q: search.q,
        faculties: SelectOption::faculties(None),
        department_groups: FacultyGroup::all(None, None),
    })
}

// POST /admin/panel/alumni
pub async fn create_alumni(
    State(state): State<AppState>,
    cookies: Cookies,
    Extension(admin): Extension<CurrentUser>,
    Form(form): Form<NewAlumniForm>,
) -> AppResult<Redirect> {
    let key = &state.cookie_key;
    let alumni = match form.validate() {
        Ok(a) => a,
        Err(msg) => return Ok(flash::redirect(&cookies, key, Flash::error(msg), ALUMNI_PANEL_PATH)),
    };

    let flash = match profile_service::create_alumni(&state.db_pool, admin.id(), &alumni).await {
        Ok(_) => Flash::success("Alumni created successfully."),
        Err(AppError::Validation(msg)) => Flash::error(msg),
        Err(e) => {
            tracing::error!("Admin {} failed to create alumni: {:?}", admin.id(), e);
            Flash::error("Failed to create alumni.")
        }
    };
    Ok(flash::redirect(&cookies, key, flash, ALUMNI_PANEL_PATH))
}

// GET /admin/panel/alumni/{id}
pub async fn edit_alumni(
    nav: NavContext,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Html<String>> {
    let profile = profile_service::find_profile(&state.db_pool, &id)
        .await?
        .ok_or_else(|| AppError::NotFound("Alumni".into()))?;
    let faculty = profile.faculty.as_deref();
    let page = AdminAlumniEditPage {
        faculties: SelectOption::faculties(faculty),
        department_groups: FacultyGroup::all(profile.department.as_deref(), faculty),
        nav,
        profile,
    };
    templates::render(&page)
}

// POST /admin/panel/alumni/{id}
pub async fn update_alumni(
    State(state): State<AppState>,
    cookies: Cookies,
    Path(id): Path<String>,
    Form(form): Form<ProfileForm>,
) -> AppResult<Redirect> {
    let key = &state.cookie_key;
    let update = match form.validate() {
        Ok(u) => u,
        Err(msg) => {
            let back = format!("{ALUMNI_PANEL_PATH}/{id}");
            return Ok(flash::redirect(&cookies, key, Flash::error(msg), &back));
        }
    };

    let flash = match profile_service::update_profile(&state.db_pool, &id, &update).await {
        Ok(()) => {
            state.auth_events.publish(AuthEvent::ProfileUpdated { user_id: id });
            Flash::success("Alumni updated successfully.")
        }
        Err(AppError::NotFound(_)) => Flash::error("That alumni record no longer exists."),
        Err(e) => {
            tracing::error!("Alumni update for {} failed: {:?}", id, e);
            Flash::error("Failed to update alumni.")
        }
    };
    Ok(flash::redirect(&cookies, key, flash, ALUMNI_PANEL_PATH))
}

// GET /admin/panel/alumni/{id}/delete
pub async fn confirm_delete_alumni(
    nav: NavContext,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Html<String>> {
    let profile = profile_service::find_profile(&state.db_pool, &id)
        .await?
        .ok_or_else(|| AppError::NotFound("Alumni".into()))?;
    templates::render(&ConfirmDeletePage {
        nav,
        kind: "alumni",
        label: format!("{} ({})", profile.display_name(), profile.email),
        action: format!("{ALUMNI_PANEL_PATH}/{id}/delete"),
        cancel: ALUMNI_PANEL_PATH,
    })
}

// POST /admin/panel/alumni/{id}/delete
pub async fn delete_alumni(
    State(state): State<AppState>,
    cookies: Cookies,
    Extension(admin): Extension<CurrentUser>,
    Path(id): Path<String>,
    Form(form): Form<ConfirmForm>,
) -> AppResult<Redirect> {
    let key = &state.cookie_key;
    if !form.confirmed() {
        tracing::warn!("Delete of alumni {} posted without confirmation.", id);
        return Ok(flash::redirect(&cookies, key, not_confirmed(), ALUMNI_PANEL_PATH));
    }
    if id == admin.id() {
        return Ok(flash::redirect(
            &cookies,
            key,
            Flash::error("You cannot delete your own account."),
            ALUMNI_PANEL_PATH,
        ));
    }

    let flash = match profile_service::delete_alumni(&state.db_pool, &state.avatar_store, &id).await {
        Ok(outcome) => delete_flash(outcome, "Alumni"),
        Err(AppError::NotFound(_)) => Flash::error("That alumni record no longer exists."),
        Err(e) => {
            tracing::error!("Alumni delete for {} failed: {:?}", id, e);
            Flash::error("Failed to delete alumni.")
        }
    };
    Ok(flash::redirect(&cookies, key, flash, ALUMNI_PANEL_PATH))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::web::flash::FlashKind;
    use axum::{body::Body, extract::FromRequest, http::Request};

    async fn parse_confirm(body: &'static str) -> ConfirmForm {
        let request = Request::post("/")
            .header("content-type", "application/x-www-form-urlencoded")
            .body(Body::from(body))
            .unwrap();
        let Form(form) = Form::<ConfirmForm>::from_request(request, &()).await.unwrap();
        form
    }

    #[tokio::test]
    async fn only_an_explicit_yes_confirms() {
        assert!(parse_confirm("confirm=yes").await.confirmed());
        assert!(!parse_confirm("confirm=no").await.confirmed());
        assert!(!parse_confirm("confirm=YES").await.confirmed());
        assert!(!parse_confirm("").await.confirmed());
    }

    #[test]
    fn partial_delete_is_a_warning_not_a_success() {
        let ok = delete_flash(DeleteOutcome::Deleted, "Event");
        assert_eq!(ok.kind, FlashKind::Success);
        assert_eq!(ok.message, "Event deleted successfully.");

        let partial = delete_flash(DeleteOutcome::PartiallyDeleted { warning: "image left".into() }, "Alumni");
        assert_eq!(partial.kind, FlashKind::Warning);
        assert_eq!(partial.message, "image left");
    }
}
