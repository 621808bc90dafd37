// src/services/mod.rs
pub mod access_service;
pub mod auth_service;
pub mod directory_service;
pub mod event_service;
pub mod gallery_service;
pub mod news_service;
pub mod payment_service;
pub mod profile_service;
pub mod storage_service;

/// Result of an admin delete. A partial delete succeeded on the record but left
/// a dependent resource behind that needs manual follow-up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    PartiallyDeleted { warning: String },
}
