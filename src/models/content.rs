// src/models/content.rs
//! Admin-managed content: events and news articles.
use chrono::{NaiveDate, NaiveDateTime};
use serde::Deserialize;
use sqlx::FromRow;

use crate::models::non_empty;

#[derive(Debug, Clone, FromRow)]
pub struct Event {
    pub id: String,
    pub title: String,
    pub description: String,
    pub event_date: NaiveDate,
    pub location: Option<String>,
    pub image_url: Option<String>,
    pub created_by: Option<String>,
    pub created_at: Option<NaiveDateTime>,
    pub updated_at: Option<NaiveDateTime>,
}

impl Event {
    pub fn date_text(&self) -> String {
        self.event_date.format("%d %b %Y").to_string()
    }

    pub fn date_input(&self) -> String {
        self.event_date.format("%Y-%m-%d").to_string()
    }

    pub fn location_or_empty(&self) -> &str {
        self.location.as_deref().unwrap_or("")
    }

    pub fn image_or_empty(&self) -> &str {
        self.image_url.as_deref().unwrap_or("")
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct NewsArticle {
    pub id: String,
    pub title: String,
    pub content: String,
    pub published_date: NaiveDate,
    pub image_url: Option<String>,
    pub created_by: Option<String>,
    pub created_at: Option<NaiveDateTime>,
    pub updated_at: Option<NaiveDateTime>,
}

impl NewsArticle {
    pub fn date_text(&self) -> String {
        self.published_date.format("%d %b %Y").to_string()
    }

    pub fn date_input(&self) -> String {
        self.published_date.format("%Y-%m-%d").to_string()
    }

    pub fn image_or_empty(&self) -> &str {
        self.image_url.as_deref().unwrap_or("")
    }

    /// First 160 characters for list views.
    pub fn excerpt(&self) -> String {
        let mut chars = self.content.chars();
        let head: String = chars.by_ref().take(160).collect();
        if chars.next().is_some() { format!("{head}…") } else { head }
    }
}

fn parse_date(raw: &str, label: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| format!("{label} must be a valid date (YYYY-MM-DD)."))
}

fn check_image_url(raw: &str) -> Result<Option<String>, String> {
    match non_empty(raw) {
        Some(url) if url.starts_with("https://") || url.starts_with("http://") || url.starts_with('/') => {
            Ok(Some(url))
        }
        Some(_) => Err("Image URL must be an http(s) URL or a site path.".into()),
        None => Ok(None),
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EventForm {
    pub title: String,
    pub description: String,
    pub event_date: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub image_url: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EventDraft {
    pub title: String,
    pub description: String,
    pub event_date: NaiveDate,
    pub location: Option<String>,
    pub image_url: Option<String>,
}

impl EventForm {
    pub fn validate(&self) -> Result<EventDraft, String> {
        let title = non_empty(&self.title).ok_or("Title is required.")?;
        let description = non_empty(&self.description).ok_or("Description is required.")?;
        Ok(EventDraft {
            title,
            description,
            event_date: parse_date(&self.event_date, "Event date")?,
            location: non_empty(&self.location),
            image_url: check_image_url(&self.image_url)?,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewsForm {
    pub title: String,
    pub content: String,
    pub published_date: String,
    #[serde(default)]
    pub image_url: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewsDraft {
    pub title: String,
    pub content: String,
    pub published_date: NaiveDate,
    pub image_url: Option<String>,
}

impl NewsForm {
    pub fn validate(&self) -> Result<NewsDraft, String> {
        let title = non_empty(&self.title).ok_or("Title is required.")?;
        let content = non_empty(&self.content).ok_or("Content is required.")?;
        Ok(NewsDraft {
            title,
            content,
            published_date: parse_date(&self.published_date, "Published date")?,
            image_url: check_image_url(&self.image_url)?,
        })
    }
}
