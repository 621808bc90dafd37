// src/services/news_service.rs
use crate::{
    error::{AppError, AppResult},
    models::content::{NewsArticle, NewsDraft},
    services::DeleteOutcome,
};
use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

const NEWS_COLUMNS: &str = "id, title, content, published_date, image_url, created_by, created_at, updated_at";

/// Most recently published first.
pub async fn list_news(db_pool: &SqlitePool) -> AppResult<Vec<NewsArticle>> {
    let articles = sqlx::query_as::<_, NewsArticle>(&format!(
        "SELECT {NEWS_COLUMNS} FROM news ORDER BY published_date DESC, created_at DESC"
    ))
    .fetch_all(db_pool)
    .await?;
    tracing::debug!("Loaded {} news articles.", articles.len());
    Ok(articles)
}

pub async fn find_news(db_pool: &SqlitePool, id: &str) -> AppResult<Option<NewsArticle>> {
    let article = sqlx::query_as::<_, NewsArticle>(&format!("SELECT {NEWS_COLUMNS} FROM news WHERE id = ?1"))
        .bind(id)
        .fetch_optional(db_pool)
        .await?;
    Ok(article)
}

pub async fn create_news(db_pool: &SqlitePool, admin_id: &str, draft: &NewsDraft) -> AppResult<String> {
    let id = Uuid::new_v4().to_string();
    sqlx::query(
        r#"
        INSERT INTO news (id, title, content, published_date, image_url, created_by, created_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
        "#,
    )
    .bind(&id)
    .bind(&draft.title)
    .bind(&draft.content)
    .bind(draft.published_date)
    .bind(&draft.image_url)
    .bind(admin_id)
    .bind(Utc::now().naive_utc())
    .execute(db_pool)
    .await?;
    tracing::info!("✅ News '{}' ({}) created by {}.", draft.title, id, admin_id);
    Ok(id)
}

pub async fn update_news(db_pool: &SqlitePool, id: &str, draft: &NewsDraft) -> AppResult<()> {
    let rows_affected = sqlx::query(
        r#"
        UPDATE news
        SET title = ?1, content = ?2, published_date = ?3, image_url = ?4, updated_at = ?5
        WHERE id = ?6
        "#,
    )
    .bind(&draft.title)
    .bind(&draft.content)
    .bind(draft.published_date)
    .bind(&draft.image_url)
    .bind(Utc::now().naive_utc())
    .bind(id)
    .execute(db_pool)
    .await?
    .rows_affected();

    if rows_affected == 0 {
        tracing::warn!("News update failed: {} not found.", id);
        return Err(AppError::NotFound("News article".into()));
    }
    tracing::info!("✅ News {} updated.", id);
    Ok(())
}

pub async fn delete_news(db_pool: &SqlitePool, id: &str) -> AppResult<DeleteOutcome> {
    let rows_affected = sqlx::query("DELETE FROM news WHERE id = ?1")
        .bind(id)
        .execute(db_pool)
        .await?
        .rows_affected();
    if rows_affected == 0 {
        return Err(AppError::NotFound("News article".into()));
    }
    tracing::info!("🗑️ News {} deleted.", id);
    Ok(DeleteOutcome::Deleted)
}
