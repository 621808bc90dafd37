// src/web/mod.rs
pub mod admin_content_handlers;
pub mod admin_handlers;
pub mod alumni_handlers;
pub mod auth_handlers;
pub mod directory_handlers;
pub mod flash;
pub mod mw_admin;
pub mod mw_auth;
pub mod mw_profile;
pub mod page;
pub mod public_handlers;
pub mod routes;
