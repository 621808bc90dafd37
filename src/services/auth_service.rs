// src/services/auth_service.rs
use crate::{
    config::AdminSeed,
    error::{AppError, AppResult},
    models::profile::Registration,
};
use sqlx::{FromRow, SqlitePool};
use uuid::Uuid;

pub const ADMIN_ROLE: &str = "admin";

#[derive(Debug, Clone, FromRow)]
pub struct Account {
    pub id: String,
    pub email: String,
    pub password_hash: String,
}

/// Checks a password against the stored hash.
pub async fn verify_password(password: &str, stored_hash: &str) -> AppResult<bool> {
    let password = password.to_string();
    let stored_hash = stored_hash.to_string();
    tokio::task::spawn_blocking(move || {
        tracing::debug!("Verifying bcrypt hash...");
        bcrypt::verify(&password, &stored_hash)
    })
    .await
    .map_err(|e| {
        tracing::error!("spawn_blocking task failed (verify_password): {:?}", e);
        AppError::InternalServerError
    })?
    .map_err(|e| {
        tracing::error!("bcrypt error while verifying password: {:?}", e);
        AppError::PasswordHashingError
    })
}

/// Hashes a password with bcrypt on the blocking pool.
pub async fn hash_password(password: &str) -> AppResult<String> {
    let password = password.to_string();
    tokio::task::spawn_blocking(move || {
        tracing::debug!("Generating bcrypt hash...");
        bcrypt::hash(&password, bcrypt::DEFAULT_COST)
    })
    .await
    .map_err(|e| {
        tracing::error!("spawn_blocking task failed (hash_password): {:?}", e);
        AppError::InternalServerError
    })?
    .map_err(|e| {
        tracing::error!("bcrypt error while hashing password: {:?}", e);
        AppError::PasswordHashingError
    })
}

pub async fn find_account_by_email(db_pool: &SqlitePool, email: &str) -> AppResult<Option<Account>> {
    let account = sqlx::query_as::<_, Account>(
        "SELECT id, email, password_hash FROM accounts WHERE email = ?1",
    )
    .bind(email.trim())
    .fetch_optional(db_pool)
    .await?;
    Ok(account)
}

/// Returns the account id when email and password match.
pub async fn authenticate(db_pool: &SqlitePool, email: &str, password: &str) -> AppResult<String> {
    let Some(account) = find_account_by_email(db_pool, email).await? else {
        tracing::warn!("Login: unknown email {}", email);
        return Err(AppError::InvalidCredentials);
    };
    if verify_password(password, &account.password_hash).await? {
        Ok(account.id)
    } else {
        tracing::warn!("Login: wrong password for {}", email);
        Err(AppError::InvalidCredentials)
    }
}

fn duplicate_email(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db_err) if db_err.is_unique_violation())
}

/// Creates the account and its profile row together. Returns the new user id.
pub async fn register(db_pool: &SqlitePool, registration: &Registration) -> AppResult<String> {
    tracing::info!("Registering account for {}", registration.email);
    let password_hash = hash_password(&registration.password).await?;
    let user_id = Uuid::new_v4().to_string();

    let mut tx = db_pool.begin().await?;

    let inserted = sqlx::query("INSERT INTO accounts (id, email, password_hash) VALUES (?1, ?2, ?3)")
        .bind(&user_id)
        .bind(&registration.email)
        .bind(&password_hash)
        .execute(&mut *tx)
        .await;
    if let Err(e) = inserted {
        if duplicate_email(&e) {
            tracing::warn!("Registration refused: {} already has an account.", registration.email);
            tx.rollback().await?;
            return Err(AppError::Validation("An account with this email already exists.".into()));
        }
        return Err(e.into());
    }

    sqlx::query(
        r#"
        INSERT INTO profiles (id, email, first_name, last_name, alumni_id, graduation_year)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6)
        "#,
    )
    .bind(&user_id)
    .bind(&registration.email)
    .bind(&registration.first_name)
    .bind(&registration.last_name)
    .bind(&registration.alumni_id)
    .bind(registration.graduation_year)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    tracing::info!("✅ Account {} registered.", user_id);
    Ok(user_id)
}

/// Creates or promotes the bootstrap admin. Runs at startup only, never from a request.
pub async fn seed_admin(db_pool: &SqlitePool, seed: &AdminSeed) -> AppResult<String> {
    let email = seed.email.to_lowercase();
    let mut tx = db_pool.begin().await?;

    let existing: Option<String> = sqlx::query_scalar("SELECT id FROM accounts WHERE email = ?1")
        .bind(&email)
        .fetch_optional(&mut *tx)
        .await?;

    let user_id = match existing {
        Some(id) => {
            tracing::info!("Admin seed: account {} already exists, ensuring role.", email);
            id
        }
        None => {
            let id = Uuid::new_v4().to_string();
            let password_hash = hash_password(&seed.password).await?;
            sqlx::query("INSERT INTO accounts (id, email, password_hash) VALUES (?1, ?2, ?3)")
                .bind(&id)
                .bind(&email)
                .bind(&password_hash)
                .execute(&mut *tx)
                .await?;
            tracing::info!("Admin seed: created account {}.", email);
            id
        }
    };

    sqlx::query(
        r#"
        INSERT OR IGNORE INTO profiles (id, email, first_name, last_name)
        VALUES (?1, ?2, 'Admin', 'User')
        "#,
    )
    .bind(&user_id)
    .bind(&email)
    .execute(&mut *tx)
    .await?;

    sqlx::query("INSERT OR IGNORE INTO user_roles (user_id, role) VALUES (?1, ?2)")
        .bind(&user_id)
        .bind(ADMIN_ROLE)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    tracing::info!("🔐 Admin account {} is ready.", email);
    Ok(user_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{db::test_pool, services::profile_service};

    fn registration(email: &str) -> Registration {
        Registration {
            email: email.into(),
            password: "secret1".into(),
            first_name: "Amina".into(),
            last_name: "Ibrahim".into(),
            alumni_id: "FUD/16/001".into(),
            graduation_year: 2020,
        }
    }

    #[tokio::test]
    async fn register_then_authenticate() {
        let pool = test_pool().await;
        let id = register(&pool, &registration("amina@example.com")).await.unwrap();

        assert_eq!(authenticate(&pool, "amina@example.com", "secret1").await.unwrap(), id);
        assert!(matches!(
            authenticate(&pool, "amina@example.com", "wrong").await,
            Err(AppError::InvalidCredentials)
        ));
        assert!(matches!(
            authenticate(&pool, "nobody@example.com", "secret1").await,
            Err(AppError::InvalidCredentials)
        ));

        let profile = profile_service::find_profile(&pool, &id).await.unwrap().unwrap();
        assert_eq!(profile.first_name.as_deref(), Some("Amina"));
        assert_eq!(profile.graduation_year, Some(2020));
        assert!(!profile.is_admin);
    }

    #[tokio::test]
    async fn duplicate_email_is_a_validation_error() {
        let pool = test_pool().await;
        register(&pool, &registration("amina@example.com")).await.unwrap();
        let second = register(&pool, &registration("AMINA@example.com")).await;
        assert!(matches!(second, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn seeding_admin_is_idempotent() {
        let pool = test_pool().await;
        let seed = AdminSeed { email: "Admin@Fud.edu.ng".into(), password: "changeme-now".into() };

        let first = seed_admin(&pool, &seed).await.unwrap();
        let second = seed_admin(&pool, &seed).await.unwrap();
        assert_eq!(first, second);

        let profile = profile_service::find_profile(&pool, &first).await.unwrap().unwrap();
        assert!(profile.is_admin);
        assert_eq!(profile.full_name(), "Admin User");
        assert_eq!(authenticate(&pool, "admin@fud.edu.ng", "changeme-now").await.unwrap(), first);
    }
}
