// src/services/event_service.rs
use crate::{
    error::{AppError, AppResult},
    models::content::{Event, EventDraft},
    services::DeleteOutcome,
};
use chrono::{NaiveDate, Utc};
use sqlx::SqlitePool;
use uuid::Uuid;

const EVENT_COLUMNS: &str =
    "id, title, description, event_date, location, image_url, created_by, created_at, updated_at";

/// Newest event date first.
pub async fn list_events(db_pool: &SqlitePool) -> AppResult<Vec<Event>> {
    let events = sqlx::query_as::<_, Event>(&format!(
        "SELECT {EVENT_COLUMNS} FROM events ORDER BY event_date DESC, created_at DESC"
    ))
    .fetch_all(db_pool)
    .await?;
    tracing::debug!("Loaded {} events.", events.len());
    Ok(events)
}

pub async fn find_event(db_pool: &SqlitePool, id: &str) -> AppResult<Option<Event>> {
    let event = sqlx::query_as::<_, Event>(&format!("SELECT {EVENT_COLUMNS} FROM events WHERE id = ?1"))
        .bind(id)
        .fetch_optional(db_pool)
        .await?;
    Ok(event)
}

/// Splits a date-descending list into (upcoming soonest first, past newest first).
pub fn split_upcoming(events: Vec<Event>, today: NaiveDate) -> (Vec<Event>, Vec<Event>) {
    let (mut upcoming, past): (Vec<Event>, Vec<Event>) =
        events.into_iter().partition(|e| e.event_date >= today);
    upcoming.reverse();
    (upcoming, past)
}

pub async fn create_event(db_pool: &SqlitePool, admin_id: &str, draft: &EventDraft) -> AppResult<String> {
    let id = Uuid::new_v4().to_string();
    sqlx::query(
        r#"
        INSERT INTO events (id, title, description, event_date, location, image_url, created_by, created_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
        "#,
    )
    .bind(&id)
    .bind(&draft.title)
    .bind(&draft.description)
    .bind(draft.event_date)
    .bind(&draft.location)
    .bind(&draft.image_url)
    .bind(admin_id)
    .bind(Utc::now().naive_utc())
    .execute(db_pool)
    .await?;
    tracing::info!("✅ Event '{}' ({}) created by {}.", draft.title, id, admin_id);
    Ok(id)
}

pub async fn update_event(db_pool: &SqlitePool, id: &str, draft: &EventDraft) -> AppResult<()> {
    let rows_affected = sqlx::query(
        r#"
        UPDATE events
        SET title = ?1, description = ?2, event_date = ?3, location = ?4, image_url = ?5, updated_at = ?6
        WHERE id = ?7
        "#,
    )
    .bind(&draft.title)
    .bind(&draft.description)
    .bind(draft.event_date)
    .bind(&draft.location)
    .bind(&draft.image_url)
    .bind(Utc::now().naive_utc())
    .bind(id)
    .execute(db_pool)
    .await?
    .rows_affected();

    if rows_affected == 0 {
        tracing::warn!("Event update failed: {} not found.", id);
        return Err(AppError::NotFound("Event".into()));
    }
    tracing::info!("✅ Event {} updated.", id);
    Ok(())
}

pub async fn delete_event(db_pool: &SqlitePool, id: &str) -> AppResult<DeleteOutcome> {
    let rows_affected = sqlx::query("DELETE FROM events WHERE id = ?1")
        .bind(id)
        .execute(db_pool)
        .await?
        .rows_affected();
    if rows_affected == 0 {
        return Err(AppError::NotFound("Event".into()));
    }
    tracing::info!("🗑️ Event {} deleted.", id);
    Ok(DeleteOutcome::Deleted)
}
