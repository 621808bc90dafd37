// src/services/payment_service.rs
//! Membership payments. There is no gateway: new payments stay `pending`.
use crate::{
    error::AppResult,
    models::payment::{Payment, PaymentRequest},
};
use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

const PAYMENT_COLUMNS: &str = "id, user_id, payment_type, amount, status, payment_date, reference";

pub async fn list_for_user(db_pool: &SqlitePool, user_id: &str) -> AppResult<Vec<Payment>> {
    let payments = sqlx::query_as::<_, Payment>(&format!(
        "SELECT {PAYMENT_COLUMNS} FROM payments WHERE user_id = ?1 ORDER BY payment_date DESC"
    ))
    .bind(user_id)
    .fetch_all(db_pool)
    .await?;
    Ok(payments)
}

pub async fn list_recent(db_pool: &SqlitePool, limit: i64) -> AppResult<Vec<Payment>> {
    let payments = sqlx::query_as::<_, Payment>(&format!(
        "SELECT {PAYMENT_COLUMNS} FROM payments ORDER BY payment_date DESC LIMIT ?1"
    ))
    .bind(limit)
    .fetch_all(db_pool)
    .await?;
    Ok(payments)
}

pub async fn count_payments(db_pool: &SqlitePool) -> AppResult<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM payments").fetch_one(db_pool).await?;
    Ok(count)
}

fn new_reference() -> String {
    let raw = Uuid::new_v4().simple().to_string();
    format!("PAY-{}", raw[..8].to_uppercase())
}

/// Records a pending payment and returns it.
pub async fn initiate(db_pool: &SqlitePool, user_id: &str, request: &PaymentRequest) -> AppResult<Payment> {
    let payment = Payment {
        id: Uuid::new_v4().to_string(),
        user_id: user_id.to_string(),
        payment_type: request.payment_type.to_string(),
        amount: request.amount,
        status: "pending".to_string(),
        payment_date: Utc::now().naive_utc(),
        reference: new_reference(),
    };

    sqlx::query(
        r#"
        INSERT INTO payments (id, user_id, payment_type, amount, status, payment_date, reference)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
        "#,
    )
    .bind(&payment.id)
    .bind(&payment.user_id)
    .bind(&payment.payment_type)
    .bind(payment.amount)
    .bind(&payment.status)
    .bind(payment.payment_date)
    .bind(&payment.reference)
    .execute(db_pool)
    .await?;

    tracing::info!(
        "💳 Payment {} initiated by {}: {} {}",
        payment.reference, user_id, payment.payment_type, payment.amount
    );
    Ok(payment)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{db::test_pool, models::profile::Registration, services::auth_service};

    #[tokio::test]
    async fn initiated_payments_are_pending_and_scoped_to_user() {
        let pool = test_pool().await;
        let user = auth_service::register(
            &pool,
            &Registration {
                email: "amina@example.com".into(),
                password: "secret1".into(),
                first_name: "Amina".into(),
                last_name: "Ibrahim".into(),
                alumni_id: "FUD/1".into(),
                graduation_year: 2020,
            },
        )
        .await
        .unwrap();

        let payment = initiate(&pool, &user, &PaymentRequest { payment_type: "Donation", amount: 10_000 })
            .await
            .unwrap();
        assert_eq!(payment.status, "pending");
        assert!(payment.reference.starts_with("PAY-"));
        assert_eq!(payment.reference.len(), 12);

        let mine = list_for_user(&pool, &user).await.unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].reference, payment.reference);
        assert!(list_for_user(&pool, "someone-else").await.unwrap().is_empty());
        assert_eq!(count_payments(&pool).await.unwrap(), 1);
    }
}
