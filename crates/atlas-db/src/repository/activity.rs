//! # Activity Repository
//!
//! Database operations for activities (tasks, meetings, follow-ups, demos).
//!
//! ## Activity Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Activity Lifecycle                                │
//! │                                                                         │
//! │  1. CREATE                                                             │
//! │     └── insert() → Activity { status: Open }                           │
//! │                                                                         │
//! │  2. WORK IT                                                            │
//! │     └── shows up in get_open() / get_due_between()                     │
//! │                                                                         │
//! │  3. CLOSE                                                              │
//! │     └── complete() → { status: Completed, completed_at: now }          │
//! │     └── cancel()   → { status: Canceled }                              │
//! │                                                                         │
//! │  Both transitions are guarded UPDATEs: they only fire while the        │
//! │  activity is still Open, and report NotFound otherwise.                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::{debug, warn};
use uuid::Uuid;

use atlas_core::validation::{validate_date_range, validate_entity_id, validate_name};
use atlas_core::Activity;

use crate::error::{DbError, DbResult};
use crate::repository::base::{self, Table};
use crate::retry::{self, RetryPolicy};

/// Table configuration for activities.
const ACTIVITIES: Table = Table {
    name: "activities",
    id_column: "id",
    select_columns:
        "id, person_id, kind, status, subject, detail, due_at, completed_at, is_active, created_at, updated_at",
};

/// Repository for activity database operations.
#[derive(Debug, Clone)]
pub struct ActivityRepository {
    pool: SqlitePool,
    retry: RetryPolicy,
}

impl ActivityRepository {
    /// Creates a new ActivityRepository.
    pub fn new(pool: SqlitePool, retry: RetryPolicy) -> Self {
        ActivityRepository { pool, retry }
    }

    /// Inserts a new activity.
    pub async fn insert(&self, activity: &Activity) -> DbResult<Activity> {
        validate_entity_id(&activity.id)?;
        validate_entity_id(&activity.person_id)?;
        validate_name("subject", &activity.subject)?;

        debug!(id = %activity.id, subject = %activity.subject, "Inserting activity");

        let pool = &self.pool;
        retry::execute("activity.insert", &self.retry, || async move {
            sqlx::query(
                r#"
                INSERT INTO activities (
                    id, person_id, kind, status, subject, detail,
                    due_at, completed_at, is_active, created_at, updated_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
                "#,
            )
            .bind(&activity.id)
            .bind(&activity.person_id)
            .bind(activity.kind)
            .bind(activity.status)
            .bind(&activity.subject)
            .bind(&activity.detail)
            .bind(activity.due_at)
            .bind(activity.completed_at)
            .bind(activity.is_active)
            .bind(activity.created_at)
            .bind(activity.updated_at)
            .execute(pool)
            .await?;
            Ok(())
        })
        .await?;

        Ok(activity.clone())
    }

    /// Updates an existing activity's mutable columns.
    ///
    /// Status is NOT updated here; use [`complete`](Self::complete) /
    /// [`cancel`](Self::cancel) for transitions.
    pub async fn update(&self, activity: &Activity) -> DbResult<Activity> {
        validate_entity_id(&activity.id)?;
        validate_name("subject", &activity.subject)?;

        debug!(id = %activity.id, "Updating activity");

        let now = Utc::now();
        let pool = &self.pool;
        let affected = retry::execute("activity.update", &self.retry, || async move {
            let result = sqlx::query(
                r#"
                UPDATE activities SET
                    kind = ?2,
                    subject = ?3,
                    detail = ?4,
                    due_at = ?5,
                    updated_at = ?6
                WHERE id = ?1 AND is_active = 1
                "#,
            )
            .bind(&activity.id)
            .bind(activity.kind)
            .bind(&activity.subject)
            .bind(&activity.detail)
            .bind(activity.due_at)
            .bind(now)
            .execute(pool)
            .await?;
            Ok(result.rows_affected())
        })
        .await?;

        if affected == 0 {
            warn!(id = %activity.id, "Activity update affected no rows (missing or inactive)");
        }

        let mut updated = activity.clone();
        updated.updated_at = now;
        Ok(updated)
    }

    /// Soft-deletes an activity.
    pub async fn soft_delete(&self, id: &str) -> DbResult<bool> {
        base::soft_delete(&self.pool, &ACTIVITIES, &self.retry, id).await
    }

    /// True if an active activity with this id exists.
    pub async fn exists(&self, id: &str) -> DbResult<bool> {
        base::exists(&self.pool, &ACTIVITIES, &self.retry, id).await
    }

    /// Lists all active activities, scheduled ones first.
    pub async fn list(&self) -> DbResult<Vec<Activity>> {
        base::list_all(
            &self.pool,
            &ACTIVITIES,
            &self.retry,
            "due_at IS NULL, due_at, created_at",
        )
        .await
    }

    /// Gets an activity by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Activity>> {
        base::get_by_id(&self.pool, &ACTIVITIES, &self.retry, id).await
    }

    /// Gets all active activities for a person.
    pub async fn get_by_person(&self, person_id: &str) -> DbResult<Vec<Activity>> {
        validate_entity_id(person_id)?;

        let pool = &self.pool;
        retry::execute("activity.get_by_person", &self.retry, || async move {
            let rows = sqlx::query_as::<_, Activity>(
                r#"
                SELECT id, person_id, kind, status, subject, detail, due_at,
                       completed_at, is_active, created_at, updated_at
                FROM activities
                WHERE person_id = ?1 AND is_active = 1
                ORDER BY due_at IS NULL, due_at, created_at
                "#,
            )
            .bind(person_id)
            .fetch_all(pool)
            .await?;
            Ok(rows)
        })
        .await
    }

    /// Gets all active activities for a company, joined through its people.
    ///
    /// Activities of deactivated people are excluded: the join filters
    /// `is_active = 1` on both tables.
    pub async fn get_by_company(&self, company_id: &str) -> DbResult<Vec<Activity>> {
        validate_entity_id(company_id)?;

        let pool = &self.pool;
        retry::execute("activity.get_by_company", &self.retry, || async move {
            let rows = sqlx::query_as::<_, Activity>(
                r#"
                SELECT a.id, a.person_id, a.kind, a.status, a.subject, a.detail,
                       a.due_at, a.completed_at, a.is_active, a.created_at, a.updated_at
                FROM activities a
                INNER JOIN people p ON p.id = a.person_id
                WHERE p.company_id = ?1 AND a.is_active = 1 AND p.is_active = 1
                ORDER BY a.due_at IS NULL, a.due_at, a.created_at
                "#,
            )
            .bind(company_id)
            .fetch_all(pool)
            .await?;
            Ok(rows)
        })
        .await
    }

    /// Gets all open activities, most urgent first.
    pub async fn get_open(&self) -> DbResult<Vec<Activity>> {
        let pool = &self.pool;
        retry::execute("activity.get_open", &self.retry, || async move {
            let rows = sqlx::query_as::<_, Activity>(
                r#"
                SELECT id, person_id, kind, status, subject, detail, due_at,
                       completed_at, is_active, created_at, updated_at
                FROM activities
                WHERE status = 'open' AND is_active = 1
                ORDER BY due_at IS NULL, due_at, created_at
                "#,
            )
            .fetch_all(pool)
            .await?;
            Ok(rows)
        })
        .await
    }

    /// Gets activities due in the half-open range `[from, until)`.
    pub async fn get_due_between(
        &self,
        from: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> DbResult<Vec<Activity>> {
        validate_date_range(from, until)?;

        let pool = &self.pool;
        retry::execute("activity.get_due_between", &self.retry, || async move {
            let rows = sqlx::query_as::<_, Activity>(
                r#"
                SELECT id, person_id, kind, status, subject, detail, due_at,
                       completed_at, is_active, created_at, updated_at
                FROM activities
                WHERE due_at >= ?1 AND due_at < ?2 AND is_active = 1
                ORDER BY due_at
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

    /// Marks an open activity completed and stamps `completed_at`.
    ///
    /// ## Returns
    /// * `Err(DbError::NotFound)` - No open, active activity matched
    pub async fn complete(&self, id: &str) -> DbResult<()> {
        validate_entity_id(id)?;

        debug!(id = %id, "Completing activity");

        let now = Utc::now();
        let pool = &self.pool;
        let affected = retry::execute("activity.complete", &self.retry, || async move {
            let result = sqlx::query(
                r#"
                UPDATE activities SET
                    status = 'completed',
                    completed_at = ?2,
                    updated_at = ?2
                WHERE id = ?1 AND status = 'open' AND is_active = 1
                "#,
            )
            .bind(id)
            .bind(now)
            .execute(pool)
            .await?;
            Ok(result.rows_affected())
        })
        .await?;

        if affected == 0 {
            return Err(DbError::not_found("Activity (open)", id));
        }

        Ok(())
    }

    /// Cancels an open activity.
    ///
    /// ## Returns
    /// * `Err(DbError::NotFound)` - No open, active activity matched
    pub async fn cancel(&self, id: &str) -> DbResult<()> {
        validate_entity_id(id)?;

        debug!(id = %id, "Canceling activity");

        let now = Utc::now();
        let pool = &self.pool;
        let affected = retry::execute("activity.cancel", &self.retry, || async move {
            let result = sqlx::query(
                r#"
                UPDATE activities SET
                    status = 'canceled',
                    updated_at = ?2
                WHERE id = ?1 AND status = 'open' AND is_active = 1
                "#,
            )
            .bind(id)
            .bind(now)
            .execute(pool)
            .await?;
            Ok(result.rows_affected())
        })
        .await?;

        if affected == 0 {
            return Err(DbError::not_found("Activity (open)", id));
        }

        Ok(())
    }

    /// Counts active activities (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        base::count(&self.pool, &ACTIVITIES, &self.retry).await
    }
}

/// Helper to generate a new activity ID.
pub fn generate_activity_id() -> String {
    Uuid::new_v4().to_string()
}
