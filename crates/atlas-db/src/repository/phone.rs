//! # Phone Repository
//!
//! Database operations for phone numbers.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, warn};
use uuid::Uuid;

use atlas_core::validation::{validate_entity_id, validate_phone_number};
use atlas_core::Phone;

use crate::error::DbResult;
use crate::repository::base::{self, Table};
use crate::retry::{self, RetryPolicy};

/// Table configuration for phones.
const PHONES: Table = Table {
    name: "phones",
    id_column: "id",
    select_columns: "id, person_id, number, label, is_primary, is_active, created_at, updated_at",
};

/// Repository for phone database operations.
#[derive(Debug, Clone)]
pub struct PhoneRepository {
    pool: SqlitePool,
    retry: RetryPolicy,
}

impl PhoneRepository {
    /// Creates a new PhoneRepository.
    pub fn new(pool: SqlitePool, retry: RetryPolicy) -> Self {
        PhoneRepository { pool, retry }
    }

    /// Inserts a new phone number.
    pub async fn insert(&self, phone: &Phone) -> DbResult<Phone> {
        validate_entity_id(&phone.id)?;
        validate_entity_id(&phone.person_id)?;
        validate_phone_number(&phone.number)?;

        debug!(id = %phone.id, person_id = %phone.person_id, "Inserting phone");

        let pool = &self.pool;
        retry::execute("phone.insert", &self.retry, || async move {
            sqlx::query(
                r#"
                INSERT INTO phones (
                    id, person_id, number, label, is_primary,
                    is_active, created_at, updated_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                "#,
            )
            .bind(&phone.id)
            .bind(&phone.person_id)
            .bind(&phone.number)
            .bind(&phone.label)
            .bind(phone.is_primary)
            .bind(phone.is_active)
            .bind(phone.created_at)
            .bind(phone.updated_at)
            .execute(pool)
            .await?;
            Ok(())
        })
        .await?;

        Ok(phone.clone())
    }

    /// Updates an existing phone number's mutable columns.
    pub async fn update(&self, phone: &Phone) -> DbResult<Phone> {
        validate_entity_id(&phone.id)?;
        validate_phone_number(&phone.number)?;

        debug!(id = %phone.id, "Updating phone");

        let now = Utc::now();
        let pool = &self.pool;
        let affected = retry::execute("phone.update", &self.retry, || async move {
            let result = sqlx::query(
                r#"
                UPDATE phones SET
                    number = ?2,
                    label = ?3,
                    is_primary = ?4,
                    updated_at = ?5
                WHERE id = ?1 AND is_active = 1
                "#,
            )
            .bind(&phone.id)
            .bind(&phone.number)
            .bind(&phone.label)
            .bind(phone.is_primary)
            .bind(now)
            .execute(pool)
            .await?;
            Ok(result.rows_affected())
        })
        .await?;

        if affected == 0 {
            warn!(id = %phone.id, "Phone update affected no rows (missing or inactive)");
        }

        let mut updated = phone.clone();
        updated.updated_at = now;
        Ok(updated)
    }

    /// Soft-deletes a phone number.
    pub async fn soft_delete(&self, id: &str) -> DbResult<bool> {
        base::soft_delete(&self.pool, &PHONES, &self.retry, id).await
    }

    /// True if an active phone with this id exists.
    pub async fn exists(&self, id: &str) -> DbResult<bool> {
        base::exists(&self.pool, &PHONES, &self.retry, id).await
    }

    /// Lists all active phone numbers.
    pub async fn list(&self) -> DbResult<Vec<Phone>> {
        base::list_all(&self.pool, &PHONES, &self.retry, "created_at").await
    }

    /// Gets a phone by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Phone>> {
        base::get_by_id(&self.pool, &PHONES, &self.retry, id).await
    }

    /// Gets all active phones for a person, primary first.
    pub async fn get_by_person(&self, person_id: &str) -> DbResult<Vec<Phone>> {
        validate_entity_id(person_id)?;

        let pool = &self.pool;
        retry::execute("phone.get_by_person", &self.retry, || async move {
            let rows = sqlx::query_as::<_, Phone>(
                r#"
                SELECT id, person_id, number, label, is_primary,
                       is_active, created_at, updated_at
                FROM phones
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

    /// Gets the person's primary phone, if they have one.
    pub async fn get_primary_for_person(&self, person_id: &str) -> DbResult<Option<Phone>> {
        validate_entity_id(person_id)?;

        let pool = &self.pool;
        retry::execute("phone.get_primary_for_person", &self.retry, || async move {
            let row = sqlx::query_as::<_, Phone>(
                r#"
                SELECT id, person_id, number, label, is_primary,
                       is_active, created_at, updated_at
                FROM phones
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

    /// Finds active phones matching an exact number.
    ///
    /// Numbers belonging to deactivated people are excluded via the join.
    pub async fn find_by_number(&self, number: &str) -> DbResult<Vec<Phone>> {
        validate_phone_number(number)?;

        let pool = &self.pool;
        retry::execute("phone.find_by_number", &self.retry, || async move {
            let rows = sqlx::query_as::<_, Phone>(
                r#"
                SELECT ph.id, ph.person_id, ph.number, ph.label, ph.is_primary,
                       ph.is_active, ph.created_at, ph.updated_at
                FROM phones ph
                INNER JOIN people p ON p.id = ph.person_id
                WHERE ph.number = ?1 AND ph.is_active = 1 AND p.is_active = 1
                ORDER BY ph.created_at
                "#,
            )
            .bind(number)
            .fetch_all(pool)
            .await?;
            Ok(rows)
        })
        .await
    }

    /// Counts active phone numbers (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        base::count(&self.pool, &PHONES, &self.retry).await
    }
}

/// Helper to generate a new phone ID.
pub fn generate_phone_id() -> String {
    Uuid::new_v4().to_string()
}
