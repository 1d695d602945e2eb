//! # Call Repository
//!
//! Database operations for the call log.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::{debug, warn};
use uuid::Uuid;

use atlas_core::validation::{validate_date_range, validate_entity_id};
use atlas_core::{Call, CallDirection, ValidationError};

use crate::error::DbResult;
use crate::repository::base::{self, Table};
use crate::retry::{self, RetryPolicy};

/// Table configuration for calls.
const CALLS: Table = Table {
    name: "calls",
    id_column: "id",
    select_columns:
        "id, person_id, direction, outcome, subject, notes, started_at, duration_secs, is_active, created_at, updated_at",
};

/// Repository for call database operations.
#[derive(Debug, Clone)]
pub struct CallRepository {
    pool: SqlitePool,
    retry: RetryPolicy,
}

impl CallRepository {
    /// Creates a new CallRepository.
    pub fn new(pool: SqlitePool, retry: RetryPolicy) -> Self {
        CallRepository { pool, retry }
    }

    fn validate(call: &Call) -> DbResult<()> {
        validate_entity_id(&call.id)?;
        validate_entity_id(&call.person_id)?;
        if call.duration_secs < 0 {
            return Err(ValidationError::MustBePositive {
                field: "duration_secs".to_string(),
            }
            .into());
        }
        Ok(())
    }

    /// Inserts a new call record.
    pub async fn insert(&self, call: &Call) -> DbResult<Call> {
        Self::validate(call)?;

        debug!(id = %call.id, person_id = %call.person_id, "Inserting call");

        let pool = &self.pool;
        retry::execute("call.insert", &self.retry, || async move {
            sqlx::query(
                r#"
                INSERT INTO calls (
                    id, person_id, direction, outcome, subject, notes,
                    started_at, duration_secs, is_active, created_at, updated_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
                "#,
            )
            .bind(&call.id)
            .bind(&call.person_id)
            .bind(call.direction)
            .bind(call.outcome)
            .bind(&call.subject)
            .bind(&call.notes)
            .bind(call.started_at)
            .bind(call.duration_secs)
            .bind(call.is_active)
            .bind(call.created_at)
            .bind(call.updated_at)
            .execute(pool)
            .await?;
            Ok(())
        })
        .await?;

        Ok(call.clone())
    }

    /// Updates an existing call record's mutable columns.
    pub async fn update(&self, call: &Call) -> DbResult<Call> {
        Self::validate(call)?;

        debug!(id = %call.id, "Updating call");

        let now = Utc::now();
        let pool = &self.pool;
        let affected = retry::execute("call.update", &self.retry, || async move {
            let result = sqlx::query(
                r#"
                UPDATE calls SET
                    direction = ?2,
                    outcome = ?3,
                    subject = ?4,
                    notes = ?5,
                    started_at = ?6,
                    duration_secs = ?7,
                    updated_at = ?8
                WHERE id = ?1 AND is_active = 1
                "#,
            )
            .bind(&call.id)
            .bind(call.direction)
            .bind(call.outcome)
            .bind(&call.subject)
            .bind(&call.notes)
            .bind(call.started_at)
            .bind(call.duration_secs)
            .bind(now)
            .execute(pool)
            .await?;
            Ok(result.rows_affected())
        })
        .await?;

        if affected == 0 {
            warn!(id = %call.id, "Call update affected no rows (missing or inactive)");
        }

        let mut updated = call.clone();
        updated.updated_at = now;
        Ok(updated)
    }

    /// Soft-deletes a call record.
    pub async fn soft_delete(&self, id: &str) -> DbResult<bool> {
        base::soft_delete(&self.pool, &CALLS, &self.retry, id).await
    }

    /// True if an active call with this id exists.
    pub async fn exists(&self, id: &str) -> DbResult<bool> {
        base::exists(&self.pool, &CALLS, &self.retry, id).await
    }

    /// Lists all active calls, newest first.
    pub async fn list(&self) -> DbResult<Vec<Call>> {
        base::list_all(&self.pool, &CALLS, &self.retry, "started_at DESC").await
    }

    /// Gets a call by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Call>> {
        base::get_by_id(&self.pool, &CALLS, &self.retry, id).await
    }

    /// Gets all active calls for a person, newest first.
    pub async fn get_by_person(&self, person_id: &str) -> DbResult<Vec<Call>> {
        validate_entity_id(person_id)?;

        let pool = &self.pool;
        retry::execute("call.get_by_person", &self.retry, || async move {
            let rows = sqlx::query_as::<_, Call>(
                r#"
                SELECT id, person_id, direction, outcome, subject, notes,
                       started_at, duration_secs, is_active, created_at, updated_at
                FROM calls
                WHERE person_id = ?1 AND is_active = 1
                ORDER BY started_at DESC
                "#,
            )
            .bind(person_id)
            .fetch_all(pool)
            .await?;
            Ok(rows)
        })
        .await
    }

    /// Gets all active calls in a direction, newest first.
    pub async fn get_by_direction(&self, direction: CallDirection) -> DbResult<Vec<Call>> {
        let pool = &self.pool;
        retry::execute("call.get_by_direction", &self.retry, || async move {
            let rows = sqlx::query_as::<_, Call>(
                r#"
                SELECT id, person_id, direction, outcome, subject, notes,
                       started_at, duration_secs, is_active, created_at, updated_at
                FROM calls
                WHERE direction = ?1 AND is_active = 1
                ORDER BY started_at DESC
                "#,
            )
            .bind(direction)
            .fetch_all(pool)
            .await?;
            Ok(rows)
        })
        .await
    }

    /// Gets calls started in the half-open range `[from, until)`.
    pub async fn get_between(
        &self,
        from: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> DbResult<Vec<Call>> {
        validate_date_range(from, until)?;

        let pool = &self.pool;
        retry::execute("call.get_between", &self.retry, || async move {
            let rows = sqlx::query_as::<_, Call>(
                r#"
                SELECT id, person_id, direction, outcome, subject, notes,
                       started_at, duration_secs, is_active, created_at, updated_at
                FROM calls
                WHERE started_at >= ?1 AND started_at < ?2 AND is_active = 1
                ORDER BY started_at
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

    /// Counts active calls (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        base::count(&self.pool, &CALLS, &self.retry).await
    }
}

/// Helper to generate a new call ID.
pub fn generate_call_id() -> String {
    Uuid::new_v4().to_string()
}
