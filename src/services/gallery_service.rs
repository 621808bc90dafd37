// src/services/gallery_service.rs
use crate::{error::AppResult, models::gallery::GalleryImage};
use sqlx::SqlitePool;

pub async fn list_images(db_pool: &SqlitePool) -> AppResult<Vec<GalleryImage>> {
    let images = sqlx::query_as::<_, GalleryImage>(
        "SELECT id, url, title, description, category, image_date FROM gallery_images ORDER BY image_date DESC, id DESC",
    )
    .fetch_all(db_pool)
    .await?;
    Ok(images)
}

/// Distinct categories in first-seen order.
pub fn categories(images: &[GalleryImage]) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    for category in images.iter().filter_map(|i| i.category.as_deref()) {
        if !seen.iter().any(|c| c == category) {
            seen.push(category.to_string());
        }
    }
    seen
}

/// `term` matches title, description or category (case-insensitive); `category` is exact.
pub fn search<'a>(images: &'a [GalleryImage], term: &str, category: Option<&str>) -> Vec<&'a GalleryImage> {
    let term = term.trim().to_lowercase();
    images
        .iter()
        .filter(|image| category.map_or(true, |c| image.category.as_deref() == Some(c)))
        .filter(|image| {
            term.is_empty()
                || image.title.to_lowercase().contains(&term)
                || image.description_or_empty().to_lowercase().contains(&term)
                || image.category_or_empty().to_lowercase().contains(&term)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_pool;

    #[tokio::test]
    async fn seeded_gallery_is_searchable() {
        let pool = test_pool().await;
        let images = list_images(&pool).await.unwrap();
        assert!(!images.is_empty());

        let cats = categories(&images);
        assert!(cats.contains(&"Campus".to_string()));

        let campus = search(&images, "", Some("Campus"));
        assert!(!campus.is_empty());
        assert!(campus.iter().all(|i| i.category.as_deref() == Some("Campus")));

        let reunion = search(&images, "REUNION", None);
        assert!(reunion.iter().any(|i| i.title == "Alumni Reunion"));
        assert!(search(&images, "no-such-photo", None).is_empty());
    }
}
