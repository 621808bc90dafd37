// src/config.rs
use crate::error::{AppError, AppResult};
use std::{env, net::SocketAddr, path::PathBuf};

/// Minimum length the cookie signing key accepts.
const MIN_SECRET_LEN: usize = 64;

/// Credentials used to seed the bootstrap admin at startup.
#[derive(Clone)]
pub struct AdminSeed {
    pub email: String,
    pub password: String,
}

// Hand-written so the password never ends up in a log line.
impl std::fmt::Debug for AdminSeed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminSeed").field("email", &self.email).finish_non_exhaustive()
    }
}

/// Server configuration loaded from environment variables.
///
/// | Env Var            | Default          |
/// |--------------------|------------------|
/// | `DATABASE_URL`     | required         |
/// | `SESSION_SECRET`   | required         |
/// | `BIND_ADDR`        | `0.0.0.0:3000`   |
/// | `UPLOAD_DIR`       | `./uploads`      |
/// | `MAX_AVATAR_BYTES` | `512000`         |
/// | `ADMIN_EMAIL`      | unset            |
/// | `ADMIN_PASSWORD`   | unset            |
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub session_secret: String,
    pub bind_addr: SocketAddr,
    pub upload_dir: PathBuf,
    pub max_avatar_bytes: usize,
    pub admin_seed: Option<AdminSeed>,
}

impl Config {
    pub fn from_env() -> AppResult<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL")?;

        let session_secret = env::var("SESSION_SECRET")?;
        if session_secret.len() < MIN_SECRET_LEN {
            return Err(AppError::ConfigError(format!(
                "SESSION_SECRET must be at least {MIN_SECRET_LEN} bytes long"
            )));
        }

        let bind_addr = env::var("BIND_ADDR")
            .unwrap_or_else(|_| "0.0.0.0:3000".into())
            .parse()
            .map_err(|e| AppError::ConfigError(format!("BIND_ADDR is invalid: {e}")))?;

        let upload_dir = env::var("UPLOAD_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./uploads"));

        let max_avatar_bytes = env::var("MAX_AVATAR_BYTES")
            .unwrap_or_else(|_| (500 * 1024).to_string())
            .parse()
            .map_err(|e| AppError::ConfigError(format!("MAX_AVATAR_BYTES is invalid: {e}")))?;

        let admin_seed = match (env::var("ADMIN_EMAIL"), env::var("ADMIN_PASSWORD")) {
            (Ok(email), Ok(password)) if !email.trim().is_empty() && !password.is_empty() => {
                Some(AdminSeed { email: email.trim().to_string(), password })
            }
            (Ok(_), Err(_)) | (Err(_), Ok(_)) => {
                tracing::warn!("⚠️ Only one of ADMIN_EMAIL / ADMIN_PASSWORD is set, skipping admin seed.");
                None
            }
            _ => None,
        };

        Ok(Self {
            database_url,
            session_secret,
            bind_addr,
            upload_dir,
            max_avatar_bytes,
            admin_seed,
        })
    }
}
