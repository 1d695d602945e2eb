//! # Payment Repository
//!
//! Database operations for payments received against sales orders.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::{debug, warn};
use uuid::Uuid;

use atlas_core::validation::{validate_date_range, validate_entity_id};
use atlas_core::{Payment, ValidationError};

use crate::error::DbResult;
use crate::repository::base::{self, Table};
use crate::retry::{self, RetryPolicy};

/// Table configuration for payments.
const PAYMENTS: Table = Table {
    name: "payments",
    id_column: "id",
    select_columns:
        "id, order_id, method, amount_cents, reference, received_at, is_active, created_at, updated_at",
};

/// Repository for payment database operations.
#[derive(Debug, Clone)]
pub struct PaymentRepository {
    pool: SqlitePool,
    retry: RetryPolicy,
}

impl PaymentRepository {
    /// Creates a new PaymentRepository.
    pub fn new(pool: SqlitePool, retry: RetryPolicy) -> Self {
        PaymentRepository { pool, retry }
    }

    fn validate(payment: &Payment) -> DbResult<()> {
        validate_entity_id(&payment.id)?;
        validate_entity_id(&payment.order_id)?;
        // A zero or negative payment is always a caller bug.
        if payment.amount_cents <= 0 {
            return Err(ValidationError::MustBePositive {
                field: "amount".to_string(),
            }
            .into());
        }
        Ok(())
    }

    /// Records a payment against an order.
    pub async fn insert(&self, payment: &Payment) -> DbResult<Payment> {
        Self::validate(payment)?;

        debug!(
            id = %payment.id,
            order_id = %payment.order_id,
            amount = %payment.amount(),
            "Inserting payment"
        );

        let pool = &self.pool;
        retry::execute("payment.insert", &self.retry, || async move {
            sqlx::query(
                r#"
                INSERT INTO payments (
                    id, order_id, method, amount_cents, reference,
                    received_at, is_active, created_at, updated_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
                "#,
            )
            .bind(&payment.id)
            .bind(&payment.order_id)
            .bind(payment.method)
            .bind(payment.amount_cents)
            .bind(&payment.reference)
            .bind(payment.received_at)
            .bind(payment.is_active)
            .bind(payment.created_at)
            .bind(payment.updated_at)
            .execute(pool)
            .await?;
            Ok(())
        })
        .await?;

        Ok(payment.clone())
    }

    /// Updates an existing payment's mutable columns.
    pub async fn update(&self, payment: &Payment) -> DbResult<Payment> {
        Self::validate(payment)?;

        debug!(id = %payment.id, "Updating payment");

        let now = Utc::now();
        let pool = &self.pool;
        let affected = retry::execute("payment.update", &self.retry, || async move {
            let result = sqlx::query(
                r#"
                UPDATE payments SET
                    method = ?2,
                    amount_cents = ?3,
                    reference = ?4,
                    received_at = ?5,
                    updated_at = ?6
                WHERE id = ?1 AND is_active = 1
                "#,
            )
            .bind(&payment.id)
            .bind(payment.method)
            .bind(payment.amount_cents)
            .bind(&payment.reference)
            .bind(payment.received_at)
            .bind(now)
            .execute(pool)
            .await?;
            Ok(result.rows_affected())
        })
        .await?;

        if affected == 0 {
            warn!(id = %payment.id, "Payment update affected no rows (missing or inactive)");
        }

        let mut updated = payment.clone();
        updated.updated_at = now;
        Ok(updated)
    }

    /// Soft-deletes a payment (e.g., recorded against the wrong order).
    pub async fn soft_delete(&self, id: &str) -> DbResult<bool> {
        base::soft_delete(&self.pool, &PAYMENTS, &self.retry, id).await
    }

    /// True if an active payment with this id exists.
    pub async fn exists(&self, id: &str) -> DbResult<bool> {
        base::exists(&self.pool, &PAYMENTS, &self.retry, id).await
    }

    /// Lists all active payments, newest first.
    pub async fn list(&self) -> DbResult<Vec<Payment>> {
        base::list_all(&self.pool, &PAYMENTS, &self.retry, "received_at DESC").await
    }

    /// Gets a payment by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Payment>> {
        base::get_by_id(&self.pool, &PAYMENTS, &self.retry, id).await
    }

    /// Gets all active payments for an order, oldest first.
    pub async fn get_by_order(&self, order_id: &str) -> DbResult<Vec<Payment>> {
        validate_entity_id(order_id)?;

        let pool = &self.pool;
        retry::execute("payment.get_by_order", &self.retry, || async move {
            let rows = sqlx::query_as::<_, Payment>(
                r#"
                SELECT id, order_id, method, amount_cents, reference,
                       received_at, is_active, created_at, updated_at
                FROM payments
                WHERE order_id = ?1 AND is_active = 1
                ORDER BY received_at
                "#,
            )
            .bind(order_id)
            .fetch_all(pool)
            .await?;
            Ok(rows)
        })
        .await
    }

    /// Gets payments received in the half-open range `[from, until)`.
    pub async fn get_received_between(
        &self,
        from: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> DbResult<Vec<Payment>> {
        validate_date_range(from, until)?;

        let pool = &self.pool;
        retry::execute("payment.get_received_between", &self.retry, || async move {
            let rows = sqlx::query_as::<_, Payment>(
                r#"
                SELECT id, order_id, method, amount_cents, reference,
                       received_at, is_active, created_at, updated_at
                FROM payments
                WHERE received_at >= ?1 AND received_at < ?2 AND is_active = 1
                ORDER BY received_at
                "#,
            )
            .bind(from)
            .bind(until)
            .fetch_all(pool)
            .await?;
            Ok(rows)
        })
        .await
    }

    /// Total cents received against an order (active payments only).
    pub async fn total_received_for_order(&self, order_id: &str) -> DbResult<i64> {
        validate_entity_id(order_id)?;

        let pool = &self.pool;
        retry::execute(
            "payment.total_received_for_order",
            &self.retry,
            || async move {
                let total: i64 = sqlx::query_scalar(
                    r#"
                    SELECT COALESCE(SUM(amount_cents), 0)
                    FROM payments
                    WHERE order_id = ?1 AND is_active = 1
                    "#,
                )
                .bind(order_id)
                .fetch_one(pool)
                .await?;
                Ok(total)
            },
        )
        .await
    }

    /// Counts active payments (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        base::count(&self.pool, &PAYMENTS, &self.retry).await
    }
}

/// Helper to generate a new payment ID.
pub fn generate_payment_id() -> String {
    Uuid::new_v4().to_string()
}
