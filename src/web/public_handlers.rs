// src/web/public_handlers.rs
use crate::{
    error::AppResult,
    services::{event_service, news_service},
    state::AppState,
    templates::{self, EventsPage, IndexPage, NewsPage, NotFoundPage},
    web::page::NavContext,
};
use axum::{
    extract::State,
    http::{StatusCode, Uri},
    response::{Html, IntoResponse, Response},
};
use chrono::Local;

const LANDING_ITEMS: usize = 3;

// GET /
pub async fn index(nav: NavContext, State(state): State<AppState>) -> AppResult<Html<String>> {
    let mut events = event_service::list_events(&state.db_pool).await?;
    events.truncate(LANDING_ITEMS);
    let mut news = news_service::list_news(&state.db_pool).await?;
    news.truncate(LANDING_ITEMS);

    templates::render(&IndexPage { nav, events, news })
}

// GET /events
pub async fn events(nav: NavContext, State(state): State<AppState>) -> AppResult<Html<String>> {
    let events = event_service::list_events(&state.db_pool).await?;
    let (upcoming, past) = event_service::split_upcoming(events, Local::now().date_naive());
    templates::render(&EventsPage { nav, upcoming, past })
}

// GET /news
pub async fn news(nav: NavContext, State(state): State<AppState>) -> AppResult<Html<String>> {
    let articles = news_service::list_news(&state.db_pool).await?;
    templates::render(&NewsPage { nav, articles })
}

/// Fallback for every unmatched path.
pub async fn not_found(nav: NavContext, uri: Uri) -> AppResult<Response> {
    tracing::debug!("404 for {}", uri.path());
    let page = templates::render(&NotFoundPage { nav, path: uri.path().to_string() })?;
    Ok((StatusCode::NOT_FOUND, page).into_response())
}
