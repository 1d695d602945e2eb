//! # Email Repository
//!
//! Database operations for email addresses.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, warn};
use uuid::Uuid;

use atlas_core::validation::{validate_email_address, validate_entity_id};
use atlas_core::Email;

use crate::error::DbResult;
use crate::repository::base::{self, Table};
use crate::retry::{self, RetryPolicy};

/// Table configuration for emails.
const EMAILS: Table = Table {
    name: "emails",
    id_column: "id",
    select_columns: "id, person_id, address, label, is_primary, is_active, created_at, updated_at",
};

/// Repository for email database operations.
#[derive(Debug, Clone)]
pub struct EmailRepository {
    pool: SqlitePool,
    retry: RetryPolicy,
}

impl EmailRepository {
    /// Creates a new EmailRepository.
    pub fn new(pool: SqlitePool, retry: RetryPolicy) -> Self {
        EmailRepository { pool, retry }
    }

    /// Inserts a new email address.
    pub async fn insert(&self, email: &Email) -> DbResult<Email> {
        validate_entity_id(&email.id)?;
        validate_entity_id(&email.person_id)?;
        validate_email_address(&email.address)?;

        debug!(id = %email.id, person_id = %email.person_id, "Inserting email");

        let pool = &self.pool;
        retry::execute("email.insert", &self.retry, || async move {
            sqlx::query(
                r#"
                INSERT INTO emails (
                    id, person_id, address, label, is_primary,
                    is_active, created_at, updated_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                "#,
            )
            .bind(&email.id)
            .bind(&email.person_id)
            .bind(&email.address)
            .bind(&email.label)
            .bind(email.is_primary)
            .bind(email.is_active)
            .bind(email.created_at)
            .bind(email.updated_at)
            .execute(pool)
            .await?;
            Ok(())
        })
        .await?;

        Ok(email.clone())
    }

    /// Updates an existing email's mutable columns.
    pub async fn update(&self, email: &Email) -> DbResult<Email> {
        validate_entity_id(&email.id)?;
        validate_email_address(&email.address)?;

        debug!(id = %email.id, "Updating email");

        let now = Utc::now();
        let pool = &self.pool;
        let affected = retry::execute("email.update", &self.retry, || async move {
            let result = sqlx::query(
                r#"
                UPDATE emails SET
                    address = ?2,
                    label = ?3,
                    is_primary = ?4,
                    updated_at = ?5
                WHERE id = ?1 AND is_active = 1
                "#,
            )
            .bind(&email.id)
            .bind(&email.address)
            .bind(&email.label)
            .bind(email.is_primary)
            .bind(now)
            .execute(pool)
            .await?;
            Ok(result.rows_affected())
        })
        .await?;

        if affected == 0 {
            warn!(id = %email.id, "Email update affected no rows (missing or inactive)");
        }

        let mut updated = email.clone();
        updated.updated_at = now;
        Ok(updated)
    }

    /// Soft-deletes an email address.
    pub async fn soft_delete(&self, id: &str) -> DbResult<bool> {
        base::soft_delete(&self.pool, &EMAILS, &self.retry, id).await
    }

    /// True if an active email with this id exists.
    pub async fn exists(&self, id: &str) -> DbResult<bool> {
        base::exists(&self.pool, &EMAILS, &self.retry, id).await
    }

    /// Lists all active email addresses.
    pub async fn list(&self) -> DbResult<Vec<Email>> {
        base::list_all(&self.pool, &EMAILS, &self.retry, "created_at").await
    }

    /// Gets an email by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Email>> {
        base::get_by_id(&self.pool, &EMAILS, &self.retry, id).await
    }

    /// Gets all active emails for a person, primary first.
    pub async fn get_by_person(&self, person_id: &str) -> DbResult<Vec<Email>> {
        validate_entity_id(person_id)?;

        let pool = &self.pool;
        retry::execute("email.get_by_person", &self.retry, || async move {
            let rows = sqlx::query_as::<_, Email>(
                r#"
                SELECT id, person_id, address, label, is_primary,
                       is_active, created_at, updated_at
                FROM emails
                WHERE person_id = ?1 AND is_active = 1
                ORDER BY is_primary DESC, created_at
                "#,
            )
            .bind(person_id)
            .fetch_all(pool)
            .await?;
            Ok(rows)
        })
        .await
    }

    /// Gets the person's primary email, if they have one.
    pub async fn get_primary_for_person(&self, person_id: &str) -> DbResult<Option<Email>> {
        validate_entity_id(person_id)?;

        let pool = &self.pool;
        retry::execute("email.get_primary_for_person", &self.retry, || async move {
            let row = sqlx::query_as::<_, Email>(
                r#"
                SELECT id, person_id, address, label, is_primary,
                       is_active, created_at, updated_at
                FROM emails
                WHERE person_id = ?1 AND is_primary = 1 AND is_active = 1
                ORDER BY created_at
                LIMIT 1
                "#,
            )
            .bind(person_id)
            .fetch_optional(pool)
            .await?;
            Ok(row)
        })
        .await
    }

    /// Finds active emails matching an exact address.
    ///
    /// Addresses belonging to deactivated people are excluded via the join.
    pub async fn find_by_address(&self, address: &str) -> DbResult<Vec<Email>> {
        validate_email_address(address)?;

        let pool = &self.pool;
        retry::execute("email.find_by_address", &self.retry, || async move {
            let rows = sqlx::query_as::<_, Email>(
                r#"
                SELECT e.id, e.person_id, e.address, e.label, e.is_primary,
                       e.is_active, e.created_at, e.updated_at
                FROM emails e
                INNER JOIN people p ON p.id = e.person_id
                WHERE e.address = ?1 AND e.is_active = 1 AND p.is_active = 1
                ORDER BY e.created_at
                "#,
            )
            .bind(address)
            .fetch_all(pool)
            .await?;
            Ok(rows)
        })
        .await
    }

    /// Counts active email addresses (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        base::count(&self.pool, &EMAILS, &self.retry).await
    }
}

/// Helper to generate a new email ID.
pub fn generate_email_id() -> String {
    Uuid::new_v4().to_string()
}
