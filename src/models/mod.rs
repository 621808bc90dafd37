// src/models/mod.rs
pub mod content;
pub mod faculty;
pub mod gallery;
pub mod payment;
pub mod profile;

/// Trimmed value, or `None` for blank form input.
pub fn non_empty(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
