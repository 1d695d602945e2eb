//! # Person Repository
//!
//! Database operations for people and their contact card.
//!
//! ## Aggregate Assembly
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │              Building a full contact card                               │
//! │                                                                         │
//! │  get_by_id(id) ─────────────► Person { ..., addresses: [], ... }       │
//! │       │                                                                 │
//! │       ├── load_addresses(&mut p) ──► p.addresses filled                │
//! │       ├── load_phones(&mut p)    ──► p.phones filled                   │
//! │       ├── load_emails(&mut p)    ──► p.emails filled                   │
//! │       ├── load_activities(&mut p)──► p.activities filled               │
//! │       └── load_calls(&mut p)     ──► p.calls filled                    │
//! │                                                                         │
//! │  Each load is one secondary query; there is no query planner and no    │
//! │  lazy loading. Callers fetch exactly what the view needs.              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, warn};
use uuid::Uuid;

use atlas_core::validation::{
    validate_email_address, validate_entity_id, validate_name, validate_search_query,
};
use atlas_core::{Activity, Address, Call, Email, Person, Phone};

use crate::error::DbResult;
use crate::repository::base::{self, Table};
use crate::retry::{self, RetryPolicy};

/// Table configuration for people.
const PEOPLE: Table = Table {
    name: "people",
    id_column: "id",
    select_columns:
        "id, company_id, first_name, last_name, title, department, notes, is_active, created_at, updated_at",
};

/// Repository for person database operations.
#[derive(Debug, Clone)]
pub struct PersonRepository {
    pool: SqlitePool,
    retry: RetryPolicy,
}

impl PersonRepository {
    /// Creates a new PersonRepository.
    pub fn new(pool: SqlitePool, retry: RetryPolicy) -> Self {
        PersonRepository { pool, retry }
    }

    /// Inserts a new person.
    pub async fn insert(&self, person: &Person) -> DbResult<Person> {
        validate_entity_id(&person.id)?;
        validate_name("first_name", &person.first_name)?;
        validate_name("last_name", &person.last_name)?;
        if let Some(company_id) = &person.company_id {
            validate_entity_id(company_id)?;
        }

        debug!(id = %person.id, name = %person.full_name(), "Inserting person");

        let pool = &self.pool;
        retry::execute("person.insert", &self.retry, || async move {
            sqlx::query(
                r#"
                INSERT INTO people (
                    id, company_id, first_name, last_name, title, department,
                    notes, is_active, created_at, updated_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
                "#,
            )
            .bind(&person.id)
            .bind(&person.company_id)
            .bind(&person.first_name)
            .bind(&person.last_name)
            .bind(&person.title)
            .bind(&person.department)
            .bind(&person.notes)
            .bind(person.is_active)
            .bind(person.created_at)
            .bind(person.updated_at)
            .execute(pool)
            .await?;
            Ok(())
        })
        .await?;

        Ok(person.clone())
    }

    /// Updates an existing person's mutable columns.
    ///
    /// Zero affected rows logs a warning but does not fail.
    pub async fn update(&self, person: &Person) -> DbResult<Person> {
        validate_entity_id(&person.id)?;
        validate_name("first_name", &person.first_name)?;
        validate_name("last_name", &person.last_name)?;
        if let Some(company_id) = &person.company_id {
            validate_entity_id(company_id)?;
        }

        debug!(id = %person.id, "Updating person");

        let now = Utc::now();
        let pool = &self.pool;
        let affected = retry::execute("person.update", &self.retry, || async move {
            let result = sqlx::query(
                r#"
                UPDATE people SET
                    company_id = ?2,
                    first_name = ?3,
                    last_name = ?4,
                    title = ?5,
                    department = ?6,
                    notes = ?7,
                    updated_at = ?8
                WHERE id = ?1 AND is_active = 1
                "#,
            )
            .bind(&person.id)
            .bind(&person.company_id)
            .bind(&person.first_name)
            .bind(&person.last_name)
            .bind(&person.title)
            .bind(&person.department)
            .bind(&person.notes)
            .bind(now)
            .execute(pool)
            .await?;
            Ok(result.rows_affected())
        })
        .await?;

        if affected == 0 {
            warn!(id = %person.id, "Person update affected no rows (missing or inactive)");
        }

        let mut updated = person.clone();
        updated.updated_at = now;
        Ok(updated)
    }

    /// Soft-deletes a person.
    pub async fn soft_delete(&self, id: &str) -> DbResult<bool> {
        base::soft_delete(&self.pool, &PEOPLE, &self.retry, id).await
    }

    /// True if an active person with this id exists.
    pub async fn exists(&self, id: &str) -> DbResult<bool> {
        base::exists(&self.pool, &PEOPLE, &self.retry, id).await
    }

    /// Lists all active people, ordered by last then first name.
    pub async fn list(&self) -> DbResult<Vec<Person>> {
        base::list_all(&self.pool, &PEOPLE, &self.retry, "last_name, first_name").await
    }

    /// Gets a person by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Person>> {
        base::get_by_id(&self.pool, &PEOPLE, &self.retry, id).await
    }

    /// Gets all active people at a company.
    pub async fn get_by_company(&self, company_id: &str) -> DbResult<Vec<Person>> {
        validate_entity_id(company_id)?;

        let pool = &self.pool;
        retry::execute("person.get_by_company", &self.retry, || async move {
            let people = sqlx::query_as::<_, Person>(
                r#"
                SELECT id, company_id, first_name, last_name, title, department,
                       notes, is_active, created_at, updated_at
                FROM people
                WHERE company_id = ?1 AND is_active = 1
                ORDER BY last_name, first_name
                "#,
            )
            .bind(company_id)
            .fetch_all(pool)
            .await?;
            Ok(people)
        })
        .await
    }

    /// Searches people by name substring, matching first or last name.
    pub async fn search_by_name(&self, query: &str, limit: u32) -> DbResult<Vec<Person>> {
        let query = validate_search_query(query)?;

        debug!(query = %query, limit = %limit, "Searching people");

        let pattern = format!("%{}%", query);
        let pattern = pattern.as_str();
        let pool = &self.pool;
        retry::execute("person.search_by_name", &self.retry, || async move {
            let people = sqlx::query_as::<_, Person>(
                r#"
                SELECT id, company_id, first_name, last_name, title, department,
                       notes, is_active, created_at, updated_at
                FROM people
                WHERE (first_name LIKE ?1 OR last_name LIKE ?1) AND is_active = 1
                ORDER BY last_name, first_name
                LIMIT ?2
                "#,
            )
            .bind(pattern)
            .bind(limit)
            .fetch_all(pool)
            .await?;
            Ok(people)
        })
        .await
    }

    /// Finds people by an exact email address.
    ///
    /// Joins through `emails`; both the person and the email row must be
    /// active, so deactivating either side removes the match.
    pub async fn get_by_email_address(&self, address: &str) -> DbResult<Vec<Person>> {
        validate_email_address(address)?;

        let pool = &self.pool;
        retry::execute("person.get_by_email_address", &self.retry, || async move {
            let people = sqlx::query_as::<_, Person>(
                r#"
                SELECT DISTINCT p.id, p.company_id, p.first_name, p.last_name,
                       p.title, p.department, p.notes, p.is_active,
                       p.created_at, p.updated_at
                FROM people p
                INNER JOIN emails e ON e.person_id = p.id
                WHERE e.address = ?1 AND p.is_active = 1 AND e.is_active = 1
                ORDER BY p.last_name, p.first_name
                "#,
            )
            .bind(address)
            .fetch_all(pool)
            .await?;
            Ok(people)
        })
        .await
    }

    /// Loads the person's active addresses into `person.addresses`.
    pub async fn load_addresses(&self, person: &mut Person) -> DbResult<()> {
        validate_entity_id(&person.id)?;

        let id = person.id.as_str();
        let pool = &self.pool;
        let addresses = retry::execute("person.load_addresses", &self.retry, || async move {
            let rows = sqlx::query_as::<_, Address>(
                r#"
                SELECT id, person_id, company_id, kind, street1, street2, city,
                       region, postal_code, country, is_active, created_at, updated_at
                FROM addresses
                WHERE person_id = ?1 AND is_active = 1
                ORDER BY kind, city
                "#,
            )
            .bind(id)
            .fetch_all(pool)
            .await?;
            Ok(rows)
        })
        .await?;

        person.addresses = addresses;
        Ok(())
    }

    /// Loads the person's active phones into `person.phones`.
    ///
    /// Primary numbers sort first.
    pub async fn load_phones(&self, person: &mut Person) -> DbResult<()> {
        validate_entity_id(&person.id)?;

        let id = person.id.as_str();
        let pool = &self.pool;
        let phones = retry::execute("person.load_phones", &self.retry, || async move {
            let rows = sqlx::query_as::<_, Phone>(
                r#"
                SELECT id, person_id, number, label, is_primary,
                       is_active, created_at, updated_at
                FROM phones
                WHERE person_id = ?1 AND is_active = 1
                ORDER BY is_primary DESC, created_at
                "#,
            )
            .bind(id)
            .fetch_all(pool)
            .await?;
            Ok(rows)
        })
        .await?;

        person.phones = phones;
        Ok(())
    }

    /// Loads the person's active emails into `person.emails`.
    ///
    /// Primary addresses sort first.
    pub async fn load_emails(&self, person: &mut Person) -> DbResult<()> {
        validate_entity_id(&person.id)?;

        let id = person.id.as_str();
        let pool = &self.pool;
        let emails = retry::execute("person.load_emails", &self.retry, || async move {
            let rows = sqlx::query_as::<_, Email>(
                r#"
                SELECT id, person_id, address, label, is_primary,
                       is_active, created_at, updated_at
                FROM emails
                WHERE person_id = ?1 AND is_active = 1
                ORDER BY is_primary DESC, created_at
                "#,
            )
            .bind(id)
            .fetch_all(pool)
            .await?;
            Ok(rows)
        })
        .await?;

        person.emails = emails;
        Ok(())
    }

    /// Loads the person's active activities into `person.activities`.
    pub async fn load_activities(&self, person: &mut Person) -> DbResult<()> {
        validate_entity_id(&person.id)?;

        let id = person.id.as_str();
        let pool = &self.pool;
        let activities = retry::execute("person.load_activities", &self.retry, || async move {
            let rows = sqlx::query_as::<_, Activity>(
                r#"
                SELECT id, person_id, kind, status, subject, detail, due_at,
                       completed_at, is_active, created_at, updated_at
                FROM activities
                WHERE person_id = ?1 AND is_active = 1
                ORDER BY due_at IS NULL, due_at, created_at
                "#,
            )
            .bind(id)
            .fetch_all(pool)
            .await?;
            Ok(rows)
        })
        .await?;

        person.activities = activities;
        Ok(())
    }

    /// Loads the person's active call log into `person.calls`, newest first.
    pub async fn load_calls(&self, person: &mut Person) -> DbResult<()> {
        validate_entity_id(&person.id)?;

        let id = person.id.as_str();
        let pool = &self.pool;
        let calls = retry::execute("person.load_calls", &self.retry, || async move {
            let rows = sqlx::query_as::<_, Call>(
                r#"
                SELECT id, person_id, direction, outcome, subject, notes,
                       started_at, duration_secs, is_active, created_at, updated_at
                FROM calls
                WHERE person_id = ?1 AND is_active = 1
                ORDER BY started_at DESC
                "#,
            )
            .bind(id)
            .fetch_all(pool)
            .await?;
            Ok(rows)
        })
        .await?;

        person.calls = calls;
        Ok(())
    }

    /// Counts active people (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        base::count(&self.pool, &PEOPLE, &self.retry).await
    }
}

/// Helper to generate a new person ID.
pub fn generate_person_id() -> String {
    Uuid::new_v4().to_string()
}
