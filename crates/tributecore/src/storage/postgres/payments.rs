use async_trait::async_trait;
use sqlx::PgPool;

use crate::error::{AppError, AppResult};
use crate::models::Payment;
use crate::storage::repositories::PaymentRepository;

#[derive(Clone)]
pub struct PgPaymentRepository {
    pool: PgPool,
}

impl PgPaymentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PaymentRepository for PgPaymentRepository {
    async fn find_by_user_id(&self, user_id: i64) -> AppResult<Vec<Payment>> {
        let payments = sqlx::query_as::<_, Payment>(
            "SELECT id, user_id, description, amount, created_date FROM payments \
             WHERE user_id = $1 ORDER BY created_date DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(payments)
    }

    async fn record_subscription(&self, payment: &Payment, creator_id: i64) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("INSERT INTO payments (id, user_id, description, amount, created_date) VALUES ($1, $2, $3, $4, $5)")
            .bind(payment.id)
            .bind(payment.user_id)
            .bind(&payment.description)
            .bind(payment.amount)
            .bind(payment.created_date)
            .execute(&mut *tx)
            .await?;

        let credited = sqlx::query("UPDATE users SET earned = earned + $2 WHERE user_id = $1")
            .bind(creator_id)
            .bind(payment.amount)
            .execute(&mut *tx)
            .await?;
        if credited.rows_affected() == 0 {
            // Dropping `tx` rolls the payment back
            return Err(AppError::Database(sqlx::Error::RowNotFound));
        }

        tx.commit().await?;
        Ok(())
    }
}
