// src/web/admin_content_handlers.rs
//! Events and news panels. Every mutation redirects back to the list, which re-fetches.
use crate::{
    error::{AppError, AppResult},
    models::content::{EventForm, NewsForm},
    services::{event_service, news_service},
    state::AppState,
    templates::{self, AdminEventsPage, AdminNewsPage, ConfirmDeletePage},
    web::{
        admin_handlers::{delete_flash, not_confirmed, ConfirmForm},
        flash::{self, Flash},
        mw_auth::CurrentUser,
        page::NavContext,
    },
};
use axum::{
    extract::{Extension, Form, Path, State},
    response::{Html, Redirect},
};
use tower_cookies::Cookies;

const EVENTS_PANEL_PATH: &str = "/admin/panel/events";
const NEWS_PANEL_PATH: &str = "/admin/panel/news";

fn failed(action: &str, what: &str, e: AppError) -> Flash {
    match e {
        AppError::NotFound(_) => Flash::error(format!("That {what} no longer exists.")),
        e => {
            tracing::error!("Failed to {} {}: {:?}", action, what, e);
            Flash::error(format!("Failed to {action} {what}."))
        }
    }
}

// --- Events ---

// GET /admin/panel/events
pub async fn list_events(nav: NavContext, State(state): State<AppState>) -> AppResult<Html<String>> {
    let events = event_service::list_events(&state.db_pool).await?;
    templates::render(&AdminEventsPage { nav, events, editing: None })
}

// GET /admin/panel/events/{id}
pub async fn edit_event(
    nav: NavContext,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Html<String>> {
    let editing = event_service::find_event(&state.db_pool, &id)
        .await?
        .ok_or_else(|| AppError::NotFound("Event".into()))?;
    let events = event_service::list_events(&state.db_pool).await?;
    templates::render(&AdminEventsPage { nav, events, editing: Some(editing) })
}

// POST /admin/panel/events
pub async fn create_event(
    State(state): State<AppState>,
    cookies: Cookies,
    Extension(admin): Extension<CurrentUser>,
    Form(form): Form<EventForm>,
) -> AppResult<Redirect> {
    let flash = match form.validate() {
        Err(msg) => Flash::error(msg),
        Ok(draft) => match event_service::create_event(&state.db_pool, admin.id(), &draft).await {
            Ok(_) => Flash::success("Event created successfully."),
            Err(e) => failed("create", "event", e),
        },
    };
    Ok(flash::redirect(&cookies, &state.cookie_key, flash, EVENTS_PANEL_PATH))
}

// POST /admin/panel/events/{id}
pub async fn update_event(
    State(state): State<AppState>,
    cookies: Cookies,
    Path(id): Path<String>,
    Form(form): Form<EventForm>,
) -> AppResult<Redirect> {
    let flash = match form.validate() {
        Err(msg) => {
            let back = format!("{EVENTS_PANEL_PATH}/{id}");
            return Ok(flash::redirect(&cookies, &state.cookie_key, Flash::error(msg), &back));
        }
        Ok(draft) => match event_service::update_event(&state.db_pool, &id, &draft).await {
            Ok(()) => Flash::success("Event updated successfully."),
            Err(e) => failed("update", "event", e),
        },
    };
    Ok(flash::redirect(&cookies, &state.cookie_key, flash, EVENTS_PANEL_PATH))
}

// GET /admin/panel/events/{id}/delete
pub async fn confirm_delete_event(
    nav: NavContext,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Html<String>> {
    let event = event_service::find_event(&state.db_pool, &id)
        .await?
        .ok_or_else(|| AppError::NotFound("Event".into()))?;
    templates::render(&ConfirmDeletePage {
        nav,
        kind: "event",
        label: format!("{} ({})", event.title, event.date_text()),
        action: format!("{EVENTS_PANEL_PATH}/{id}/delete"),
        cancel: EVENTS_PANEL_PATH,
    })
}

// POST /admin/panel/events/{id}/delete
pub async fn delete_event(
    State(state): State<AppState>,
    cookies: Cookies,
    Path(id): Path<String>,
    Form(form): Form<ConfirmForm>,
) -> AppResult<Redirect> {
    let flash = if !form.confirmed() {
        tracing::warn!("Delete of event {} posted without confirmation.", id);
        not_confirmed()
    } else {
        match event_service::delete_event(&state.db_pool, &id).await {
            Ok(outcome) => delete_flash(outcome, "Event"),
            Err(e) => failed("delete", "event", e),
        }
    };
    Ok(flash::redirect(&cookies, &state.cookie_key, flash, EVENTS_PANEL_PATH))
}

// --- News ---

// GET /admin/panel/news
pub async fn list_news(nav: NavContext, State(state): State<AppState>) -> AppResult<Html<String>> {
    let articles = news_service::list_news(&state.db_pool).await?;
    templates::render(&AdminNewsPage { nav, articles, editing: None })
}

// GET /admin/panel/news/{id}
pub async fn edit_news(
    nav: NavContext,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Html<String>> {
    let editing = news_service::find_news(&state.db_pool, &id)
        .await?
        .ok_or_else(|| AppError::NotFound("News article".into()))?;
    let articles = news_service::list_news(&state.db_pool).await?;
    templates::render(&AdminNewsPage { nav, articles, editing: Some(editing) })
}

// POST /admin/panel/news
pub async fn create_news(
    State(state): State<AppState>,
    cookies: Cookies,
    Extension(admin): Extension<CurrentUser>,
    Form(form): Form<NewsForm>,
) -> AppResult<Redirect> {
    let flash = match form.validate() {
        Err(msg) => Flash::error(msg),
        Ok(draft) => match news_service::create_news(&state.db_pool, admin.id(), &draft).await {
            Ok(_) => Flash::success("News article created successfully."),
            Err(e) => failed("create", "news article", e),
        },
    };
    Ok(flash::redirect(&cookies, &state.cookie_key, flash, NEWS_PANEL_PATH))
}

// POST /admin/panel/news/{id}
pub async fn update_news(
    State(state): State<AppState>,
    cookies: Cookies,
    Path(id): Path<String>,
    Form(form): Form<NewsForm>,
) -> AppResult<Redirect> {
    let flash = match form.validate() {
        Err(msg) => {
            let back = format!("{NEWS_PANEL_PATH}/{id}");
            return Ok(flash::redirect(&cookies, &state.cookie_key, Flash::error(msg), &back));
        }
        Ok(draft) => match news_service::update_news(&state.db_pool, &id, &draft).await {
            Ok(()) => Flash::success("News article updated successfully."),
            Err(e) => failed("update", "news article", e),
        },
    };
    Ok(flash::redirect(&cookies, &state.cookie_key, flash, NEWS_PANEL_PATH))
}

// GET /admin/panel/news/{id}/delete
pub async fn confirm_delete_news(
    nav: NavContext,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Html<String>> {
    let article = news_service::find_news(&state.db_pool, &id)
        .await?
        .ok_or_else(|| AppError::NotFound("News article".into()))?;
    templates::render(&ConfirmDeletePage {
        nav,
        kind: "news article",
        label: format!("{} ({})", article.title, article.date_text()),
        action: format!("{NEWS_PANEL_PATH}/{id}/delete"),
        cancel: NEWS_PANEL_PATH,
    })
}

// POST /admin/panel/news/{id}/delete
pub async fn delete_news(
    State(state): State<AppState>,
    cookies: Cookies,
    Path(id): Path<String>,
    Form(form): Form<ConfirmForm>,
) -> AppResult<Redirect> {
    let flash = if !form.confirmed() {
        tracing::warn!("Delete of news {} posted without confirmation.", id);
        not_confirmed()
    } else {
        match news_service::delete_news(&state.db_pool, &id).await {
            Ok(outcome) => delete_flash(outcome, "News article"),
            Err(e) => failed("delete", "news article", e),
        }
    };
    Ok(flash::redirect(&cookies, &state.cookie_key, flash, NEWS_PANEL_PATH))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::web::flash::FlashKind;

    #[test]
    fn missing_rows_read_differently_from_backend_failures() {
        let gone = failed("delete", "event", AppError::NotFound("Event".into()));
        assert_eq!(gone.message, "That event no longer exists.");

        let broken = failed("update", "news article", AppError::InternalServerError);
        assert_eq!(broken.kind, FlashKind::Error);
        assert_eq!(broken.message, "Failed to update news article.");
    }
}
