// src/services/profile_service.rs
use crate::{
    error::{AppError, AppResult},
    models::profile::{NewAlumni, Profile, ProfileUpdate},
    services::{auth_service, storage_service::AvatarStore, DeleteOutcome},
};
use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

const PROFILE_SELECT: &str = r#"
    SELECT
        p.id, p.email, p.first_name, p.last_name, p.faculty, p.department,
        p.graduation_year, p.alumni_id, p.phone, p.address, p.city, p.state,
        p.profile_image_url,
        EXISTS (
            SELECT 1 FROM user_roles r WHERE r.user_id = p.id AND r.role = 'admin'
        ) AS is_admin,
        p.created_at, p.updated_at
    FROM profiles p
"#;

pub async fn find_profile(db_pool: &SqlitePool, user_id: &str) -> AppResult<Option<Profile>> {
    tracing::debug!("Loading profile {}", user_id);
    let profile = sqlx::query_as::<_, Profile>(&format!("{PROFILE_SELECT} WHERE p.id = ?1"))
        .bind(user_id)
        .fetch_optional(db_pool)
        .await?;
    if profile.is_none() {
        tracing::debug!("Profile {} not found.", user_id);
    }
    Ok(profile)
}

/// All profiles ordered by first name.
pub async fn list_profiles(db_pool: &SqlitePool) -> AppResult<Vec<Profile>> {
    let profiles = sqlx::query_as::<_, Profile>(&format!(
        "{PROFILE_SELECT} ORDER BY p.first_name COLLATE NOCASE ASC, p.last_name COLLATE NOCASE ASC"
    ))
    .fetch_all(db_pool)
    .await?;
    tracing::debug!("Loaded {} profiles.", profiles.len());
    Ok(profiles)
}

/// Directory listing: alumni only, admins are not listed.
pub async fn list_alumni(db_pool: &SqlitePool) -> AppResult<Vec<Profile>> {
    Ok(list_profiles(db_pool).await?.into_iter().filter(|p| !p.is_admin).collect())
}

pub async fn update_profile(db_pool: &SqlitePool, user_id: &str, update: &ProfileUpdate) -> AppResult<()> {
    tracing::info!("Updating profile {}", user_id);
    let rows_affected = sqlx::query(
        r#"
        UPDATE profiles
        SET first_name = ?1, last_name = ?2, phone = ?3, address = ?4, city = ?5, state = ?6,
            alumni_id = ?7, graduation_year = ?8, faculty = ?9, department = ?10, updated_at = ?11
        WHERE id = ?12
        "#,
    )
    .bind(&update.first_name)
    .bind(&update.last_name)
    .bind(&update.phone)
    .bind(&update.address)
    .bind(&update.city)
    .bind(&update.state)
    .bind(&update.alumni_id)
    .bind(update.graduation_year)
    .bind(&update.faculty)
    .bind(&update.department)
    .bind(Utc::now().naive_utc())
    .bind(user_id)
    .execute(db_pool)
    .await?
    .rows_affected();

    if rows_affected == 0 {
        tracing::warn!("Profile update failed: {} not found.", user_id);
        return Err(AppError::NotFound("Profile".into()));
    }
    tracing::info!("✅ Profile {} updated.", user_id);
    Ok(())
}

/// Points the profile at a new image and returns the one it replaced.
pub async fn set_profile_image(db_pool: &SqlitePool, user_id: &str, url: &str) -> AppResult<Option<String>> {
    let mut tx = db_pool.begin().await?;
    let previous: Option<Option<String>> =
        sqlx::query_scalar("SELECT profile_image_url FROM profiles WHERE id = ?1")
            .bind(user_id)
            .fetch_optional(&mut *tx)
            .await?;
    let Some(previous) = previous else {
        return Err(AppError::NotFound("Profile".into()));
    };

    sqlx::query("UPDATE profiles SET profile_image_url = ?1, updated_at = ?2 WHERE id = ?3")
        .bind(url)
        .bind(Utc::now().naive_utc())
        .bind(user_id)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;
    Ok(previous)
}

/// Admin create: account plus profile, stamped with the acting admin.
pub async fn create_alumni(db_pool: &SqlitePool, admin_id: &str, alumni: &NewAlumni) -> AppResult<String> {
    tracing::info!("Admin {} creating alumni account {}", admin_id, alumni.email);
    let password_hash = auth_service::hash_password(&alumni.password).await?;
    let user_id = Uuid::new_v4().to_string();

    let mut tx = db_pool.begin().await?;
    let inserted = sqlx::query("INSERT INTO accounts (id, email, password_hash) VALUES (?1, ?2, ?3)")
        .bind(&user_id)
        .bind(&alumni.email)
        .bind(&password_hash)
        .execute(&mut *tx)
        .await;
    if let Err(e) = inserted {
        if matches!(&e, sqlx::Error::Database(db_err) if db_err.is_unique_violation()) {
            tx.rollback().await?;
            return Err(AppError::Validation(format!("An account for {} already exists.", alumni.email)));
        }
        return Err(e.into());
    }

    sqlx::query(
        r#"
        INSERT INTO profiles
            (id, email, first_name, last_name, faculty, department, graduation_year, alumni_id, created_by)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
        "#,
    )
    .bind(&user_id)
    .bind(&alumni.email)
    .bind(&alumni.first_name)
    .bind(&alumni.last_name)
    .bind(&alumni.faculty)
    .bind(&alumni.department)
    .bind(alumni.graduation_year)
    .bind(&alumni.alumni_id)
    .bind(admin_id)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    tracing::info!("✅ Alumni {} created by {}.", user_id, admin_id);
    Ok(user_id)
}

/// Deletes profile, roles and account together, then the stored image.
/// An image that cannot be removed yields `PartiallyDeleted`, not an error.
pub async fn delete_alumni(db_pool: &SqlitePool, store: &AvatarStore, user_id: &str) -> AppResult<DeleteOutcome> {
    tracing::info!("Deleting alumni {}", user_id);
    let mut tx = db_pool.begin().await?;

    let image: Option<Option<String>> =
        sqlx::query_scalar("SELECT profile_image_url FROM profiles WHERE id = ?1")
            .bind(user_id)
            .fetch_optional(&mut *tx)
            .await?;
    let Some(image) = image else {
        return Err(AppError::NotFound("Alumni".into()));
    };

    sqlx::query("DELETE FROM profiles WHERE id = ?1").bind(user_id).execute(&mut *tx).await?;
    sqlx::query("DELETE FROM user_roles WHERE user_id = ?1").bind(user_id).execute(&mut *tx).await?;
    sqlx::query("DELETE FROM payments WHERE user_id = ?1").bind(user_id).execute(&mut *tx).await?;
    sqlx::query("DELETE FROM accounts WHERE id = ?1").bind(user_id).execute(&mut *tx).await?;
    tx.commit().await?;

    if let Some(url) = image {
        if let Err(e) = store.remove(&url).await {
            tracing::error!("Alumni {} deleted but image {} remains: {:?}", user_id, url, e);
            return Ok(DeleteOutcome::PartiallyDeleted {
                warning: "Alumni deleted, but their profile image could not be removed. Remove it manually."
                    .into(),
            });
        }
    }

    tracing::info!("✅ Alumni {} deleted.", user_id);
    Ok(DeleteOutcome::Deleted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::AdminSeed,
        db::test_pool,
        services::storage_service::temp_store,
    };

    fn new_alumni(email: &str, first: &str) -> NewAlumni {
        NewAlumni {
            email: email.into(),
            password: "secret1".into(),
            first_name: first.into(),
            last_name: "Test".into(),
            faculty: Some("Faculty of Computing".into()),
            department: Some("Computer Science".into()),
            graduation_year: Some(2019),
            alumni_id: None,
        }
    }

    fn update() -> ProfileUpdate {
        ProfileUpdate {
            first_name: "Amina".into(),
            last_name: "Ibrahim".into(),
            phone: "08030000000".into(),
            address: None,
            city: Some("Kano".into()),
            state: None,
            alumni_id: "FUD/16/001".into(),
            graduation_year: 2020,
            faculty: "Faculty of Computing".into(),
            department: "Computer Science".into(),
        }
    }

    #[tokio::test]
    async fn admin_create_is_stamped_and_listed_in_name_order() {
        let pool = test_pool().await;
        let admin = auth_service::seed_admin(
            &pool,
            &AdminSeed { email: "admin@example.com".into(), password: "changeme".into() },
        )
        .await
        .unwrap();

        let zainab = create_alumni(&pool, &admin, &new_alumni("z@example.com", "Zainab")).await.unwrap();
        create_alumni(&pool, &admin, &new_alumni("b@example.com", "bello")).await.unwrap();

        let created_by: Option<String> = sqlx::query_scalar("SELECT created_by FROM profiles WHERE id = ?1")
            .bind(&zainab)
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(created_by.as_deref(), Some(admin.as_str()));

        let names: Vec<String> = list_profiles(&pool).await.unwrap().iter().map(|p| p.full_name()).collect();
        assert_eq!(names, vec!["Admin User", "bello Test", "Zainab Test"]);

        let alumni = list_alumni(&pool).await.unwrap();
        assert_eq!(alumni.len(), 2);
        assert!(alumni.iter().all(|p| !p.is_admin));
    }

    #[tokio::test]
    async fn update_stamps_updated_at_and_missing_row_is_not_found() {
        let pool = test_pool().await;
        let id = create_alumni(&pool, "admin", &new_alumni("a@example.com", "A")).await.unwrap();

        update_profile(&pool, &id, &update()).await.unwrap();
        let profile = find_profile(&pool, &id).await.unwrap().unwrap();
        assert_eq!(profile.city.as_deref(), Some("Kano"));
        assert!(profile.updated_at.is_some());

        assert!(matches!(
            update_profile(&pool, "missing", &update()).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn set_image_returns_previous_url() {
        let pool = test_pool().await;
        let id = create_alumni(&pool, "admin", &new_alumni("a@example.com", "A")).await.unwrap();

        assert_eq!(set_profile_image(&pool, &id, "/uploads/one.png").await.unwrap(), None);
        assert_eq!(
            set_profile_image(&pool, &id, "/uploads/two.png").await.unwrap().as_deref(),
            Some("/uploads/one.png")
        );
    }

    #[tokio::test]
    async fn delete_removes_account_and_image() {
        let pool = test_pool().await;
        let store = temp_store();
        let id = create_alumni(&pool, "admin", &new_alumni("a@example.com", "A")).await.unwrap();
        let url = store.store_avatar(&id, Some("image/png"), b"\x89PNG\r\n\x1a\n").await.unwrap();
        set_profile_image(&pool, &id, &url).await.unwrap();

        assert_eq!(delete_alumni(&pool, &store, &id).await.unwrap(), DeleteOutcome::Deleted);
        assert!(find_profile(&pool, &id).await.unwrap().is_none());
        assert!(auth_service::find_account_by_email(&pool, "a@example.com").await.unwrap().is_none());

        assert!(matches!(
            delete_alumni(&pool, &store, &id).await,
            Err(AppError::NotFound(_))
        ));
        let _ = std::fs::remove_dir_all(store.dir());
    }

    #[tokio::test]
    async fn image_cleanup_failure_is_a_partial_delete() {
        let pool = test_pool().await;
        let store = temp_store();
        let id = create_alumni(&pool, "admin", &new_alumni("a@example.com", "A")).await.unwrap();
        // Points into the store but cannot be removed safely.
        set_profile_image(&pool, &id, "/uploads/../escape.png").await.unwrap();

        let outcome = delete_alumni(&pool, &store, &id).await.unwrap();
        assert!(matches!(outcome, DeleteOutcome::PartiallyDeleted { .. }));
        assert!(find_profile(&pool, &id).await.unwrap().is_none());
    }
}
