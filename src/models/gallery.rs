// src/models/gallery.rs
use chrono::NaiveDate;
use serde::Deserialize;
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow)]
pub struct GalleryImage {
    pub id: i64,
    pub url: String,
    pub title: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub image_date: Option<NaiveDate>,
}

impl GalleryImage {
    pub fn description_or_empty(&self) -> &str {
        self.description.as_deref().unwrap_or("")
    }

    pub fn category_or_empty(&self) -> &str {
        self.category.as_deref().unwrap_or("")
    }

    pub fn date_text(&self) -> String {
        self.image_date.map(|d| d.format("%b %Y").to_string()).unwrap_or_default()
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct GalleryQuery {
    #[serde(default)]
    pub q: String,
    #[serde(default)]
    pub category: String,
}
