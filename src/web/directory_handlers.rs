// src/web/directory_handlers.rs
use crate::{
    error::AppResult,
    models::faculty,
    services::{
        directory_service::{self, DirectoryFilter, DirectoryQuery},
        profile_service,
    },
    state::AppState,
    templates::{self, DirectoryPage, SelectOption},
    web::page::NavContext,
};
use axum::{
    extract::{Query, State},
    response::Html,
    Json,
};
use serde::Deserialize;

// GET /alumni/directory
pub async fn directory(
    nav: NavContext,
    State(state): State<AppState>,
    Query(query): Query<DirectoryQuery>,
) -> AppResult<Html<String>> {
    let alumni = profile_service::list_alumni(&state.db_pool).await?;
    let filter = DirectoryFilter::from(&query);
    let matching: Vec<_> = directory_service::filter(&alumni, &filter).into_iter().cloned().collect();
    if filter.is_empty() {
        tracing::debug!("Directory: no filters, listing all {} alumni", alumni.len());
    } else {
        tracing::debug!("Directory: {} of {} alumni match {:?}", matching.len(), alumni.len(), filter);
    }

    let page = DirectoryPage {
        nav,
        total: alumni.len(),
        alumni: matching,
        faculties: SelectOption::faculties(filter.faculty.as_deref()),
        departments: SelectOption::departments(filter.faculty.as_deref(), filter.department.as_deref()),
        name: filter.name.clone().unwrap_or_default(),
        graduation_year: filter.graduation_year.clone().unwrap_or_default(),
    };
    templates::render(&page)
}

#[derive(Debug, Default, Deserialize)]
pub struct DepartmentsQuery {
    #[serde(default)]
    pub faculty: String,
}

// GET /alumni/directory/departments?faculty=
pub async fn departments(Query(query): Query<DepartmentsQuery>) -> Json<Vec<&'static str>> {
    Json(faculty::departments_of(query.faculty.trim()).to_vec())
}
