// src/main.rs

// --- Modules ---
mod config;
mod db;
mod error;
mod models;
mod services;
mod state;
mod templates;
mod web;

// --- Imports ---
use crate::{
    config::Config,
    services::{auth_service, storage_service::AvatarStore},
    state::{AppState, AuthEvent, AuthEvents},
};
use axum::serve;
use std::env;
use time::Duration;
use tokio::{net::TcpListener, sync::broadcast::error::RecvError};
use tower::ServiceBuilder;
use tower_cookies::{CookieManagerLayer, Key};
use tower_http::trace::TraceLayer;
use tower_sessions::{ExpiredDeletion, Expiry, SessionManagerLayer};
use tower_sessions_sqlx_store::SqliteStore;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Logs every auth event until the channel closes.
fn spawn_auth_event_logger(events: &AuthEvents) {
    let mut rx = events.subscribe();
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(AuthEvent::SignedIn { user_id }) => tracing::info!("🔓 Auth event: {} signed in", user_id),
                Ok(AuthEvent::SignedOut { user_id }) => tracing::info!("🔒 Auth event: {} signed out", user_id),
                Ok(AuthEvent::ProfileUpdated { user_id }) => {
                    tracing::info!("📝 Auth event: profile of {} updated", user_id)
                }
                Err(RecvError::Lagged(skipped)) => tracing::warn!("Auth event logger skipped {} events", skipped),
                Err(RecvError::Closed) => break,
            }
        }
    });
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // --- Logging ---
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            env::var("RUST_LOG")
                .unwrap_or_else(|_| "alumni_portal=debug,tower_http=info,sqlx=warn,tower_sessions=info".into())
                .into()
        }))
        .with(fmt::layer())
        .init();

    tracing::info!("🚀 Starting alumni portal...");

    let config = Config::from_env().map_err(|e| anyhow::anyhow!("Invalid configuration: {}", e))?;
    tracing::debug!(
        "Configuration loaded (uploads in {}, avatar limit {} bytes, admin seed: {}).",
        config.upload_dir.display(),
        config.max_avatar_bytes,
        config.admin_seed.is_some()
    );

    // --- Database ---
    let db_pool = match db::create_db_pool(&config.database_url).await {
        Ok(pool) => pool,
        Err(e) => {
            tracing::error!("❌ Failed to initialise the database: {}", e);
            return Err(anyhow::anyhow!("Failed to connect/migrate database: {}", e));
        }
    };

    if let Some(seed) = &config.admin_seed {
        auth_service::seed_admin(&db_pool, seed)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to seed admin account: {}", e))?;
    }

    // --- Sessions ---
    let session_store = SqliteStore::new(db_pool.clone())
        .with_table_name("sessions")
        .map_err(|e| anyhow::anyhow!("Failed to create session store: {}", e))?;
    session_store
        .migrate()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to migrate session store: {}", e))?;

    let deletion_store = session_store.clone();
    tokio::spawn(async move {
        if let Err(e) = deletion_store
            .continuously_delete_expired(tokio::time::Duration::from_secs(60 * 60))
            .await
        {
            tracing::error!("Expired session cleanup stopped: {:?}", e);
        }
    });
    tracing::info!("🧹 Expired session cleanup started.");

    let session_layer = SessionManagerLayer::new(session_store)
        .with_secure(false)
        .with_http_only(true)
        .with_expiry(Expiry::OnInactivity(Duration::days(1)));

    let cookie_key = Key::try_from(config.session_secret.as_bytes())
        .map_err(|e| anyhow::anyhow!("SESSION_SECRET cannot be used as a signing key: {:?}", e))?;
    tracing::info!("🔑 Session layer configured.");

    // --- Application state ---
    tokio::fs::create_dir_all(&config.upload_dir).await?;
    let auth_events = AuthEvents::default();
    spawn_auth_event_logger(&auth_events);

    let app_state = AppState {
        db_pool,
        avatar_store: AvatarStore::new(config.upload_dir.clone(), config.max_avatar_bytes),
        cookie_key,
        auth_events,
    };

    // --- Listener ---
    let listener = match TcpListener::bind(config.bind_addr).await {
        Ok(l) => l,
        Err(e) => {
            tracing::error!("❌ Failed to bind {}: {}", config.bind_addr, e);
            return Err(e.into());
        }
    };
    tracing::info!("📡 Listening on http://{}", config.bind_addr);

    // --- Router and layers ---
    let app = web::routes::create_router(app_state).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(CookieManagerLayer::new())
            .layer(session_layer),
    );

    if let Err(e) = serve(listener, app.into_make_service()).await {
        tracing::error!("❌ Server error: {}", e);
        return Err(e.into());
    }

    Ok(())
}
