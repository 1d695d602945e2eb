//! # Address Repository
//!
//! Database operations for postal addresses. An address belongs to a person,
//! a company, or both; inserting one with neither owner is rejected before
//! any SQL runs.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, warn};
use uuid::Uuid;

use atlas_core::validation::{validate_entity_id, validate_required};
use atlas_core::{Address, AddressKind, ValidationError};

use crate::error::DbResult;
use crate::repository::base::{self, Table};
use crate::retry::{self, RetryPolicy};

/// Table configuration for addresses.
const ADDRESSES: Table = Table {
    name: "addresses",
    id_column: "id",
    select_columns:
        "id, person_id, company_id, kind, street1, street2, city, region, postal_code, country, is_active, created_at, updated_at",
};

/// Repository for address database operations.
#[derive(Debug, Clone)]
pub struct AddressRepository {
    pool: SqlitePool,
    retry: RetryPolicy,
}

impl AddressRepository {
    /// Creates a new AddressRepository.
    pub fn new(pool: SqlitePool, retry: RetryPolicy) -> Self {
        AddressRepository { pool, retry }
    }

    fn validate(address: &Address) -> DbResult<()> {
        validate_entity_id(&address.id)?;
        validate_required("street1", &address.street1)?;
        validate_required("city", &address.city)?;
        validate_required("country", &address.country)?;

        if address.person_id.is_none() && address.company_id.is_none() {
            return Err(ValidationError::Required {
                field: "person_id or company_id".to_string(),
            }
            .into());
        }
        if let Some(person_id) = &address.person_id {
            validate_entity_id(person_id)?;
        }
        if let Some(company_id) = &address.company_id {
            validate_entity_id(company_id)?;
        }
        Ok(())
    }

    /// Inserts a new address.
    pub async fn insert(&self, address: &Address) -> DbResult<Address> {
        Self::validate(address)?;

        debug!(id = %address.id, city = %address.city, "Inserting address");

        let pool = &self.pool;
        retry::execute("address.insert", &self.retry, || async move {
            sqlx::query(
                r#"
                INSERT INTO addresses (
                    id, person_id, company_id, kind, street1, street2, city,
                    region, postal_code, country, is_active, created_at, updated_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
                "#,
            )
            .bind(&address.id)
            .bind(&address.person_id)
            .bind(&address.company_id)
            .bind(address.kind)
            .bind(&address.street1)
            .bind(&address.street2)
            .bind(&address.city)
            .bind(&address.region)
            .bind(&address.postal_code)
            .bind(&address.country)
            .bind(address.is_active)
            .bind(address.created_at)
            .bind(address.updated_at)
            .execute(pool)
            .await?;
            Ok(())
        })
        .await?;

        Ok(address.clone())
    }

    /// Updates an existing address's mutable columns.
    pub async fn update(&self, address: &Address) -> DbResult<Address> {
        Self::validate(address)?;

        debug!(id = %address.id, "Updating address");

        let now = Utc::now();
        let pool = &self.pool;
        let affected = retry::execute("address.update", &self.retry, || async move {
            let result = sqlx::query(
                r#"
                UPDATE addresses SET
                    person_id = ?2,
                    company_id = ?3,
                    kind = ?4,
                    street1 = ?5,
                    street2 = ?6,
                    city = ?7,
                    region = ?8,
                    postal_code = ?9,
                    country = ?10,
                    updated_at = ?11
                WHERE id = ?1 AND is_active = 1
                "#,
            )
            .bind(&address.id)
            .bind(&address.person_id)
            .bind(&address.company_id)
            .bind(address.kind)
            .bind(&address.street1)
            .bind(&address.street2)
            .bind(&address.city)
            .bind(&address.region)
            .bind(&address.postal_code)
            .bind(&address.country)
            .bind(now)
            .execute(pool)
            .await?;
            Ok(result.rows_affected())
        })
        .await?;

        if affected == 0 {
            warn!(id = %address.id, "Address update affected no rows (missing or inactive)");
        }

        let mut updated = address.clone();
        updated.updated_at = now;
        Ok(updated)
    }

    /// Soft-deletes an address.
    pub async fn soft_delete(&self, id: &str) -> DbResult<bool> {
        base::soft_delete(&self.pool, &ADDRESSES, &self.retry, id).await
    }

    /// True if an active address with this id exists.
    pub async fn exists(&self, id: &str) -> DbResult<bool> {
        base::exists(&self.pool, &ADDRESSES, &self.retry, id).await
    }

    /// Lists all active addresses.
    pub async fn list(&self) -> DbResult<Vec<Address>> {
        base::list_all(&self.pool, &ADDRESSES, &self.retry, "country, city").await
    }

    /// Gets an address by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Address>> {
        base::get_by_id(&self.pool, &ADDRESSES, &self.retry, id).await
    }

    /// Gets all active addresses for a person.
    pub async fn get_by_person(&self, person_id: &str) -> DbResult<Vec<Address>> {
        validate_entity_id(person_id)?;

        let pool = &self.pool;
        retry::execute("address.get_by_person", &self.retry, || async move {
            let rows = sqlx::query_as::<_, Address>(
                r#"
                SELECT id, person_id, company_id, kind, street1, street2, city,
                       region, postal_code, country, is_active, created_at, updated_at
                FROM addresses
                WHERE person_id = ?1 AND is_active = 1
                ORDER BY kind, city
                "#,
            )
            .bind(person_id)
            .fetch_all(pool)
            .await?;
            Ok(rows)
        })
        .await
    }

    /// Gets all active addresses for a company.
    pub async fn get_by_company(&self, company_id: &str) -> DbResult<Vec<Address>> {
        validate_entity_id(company_id)?;

        let pool = &self.pool;
        retry::execute("address.get_by_company", &self.retry, || async move {
            let rows = sqlx::query_as::<_, Address>(
                r#"
                SELECT id, person_id, company_id, kind, street1, street2, city,
                       region, postal_code, country, is_active, created_at, updated_at
                FROM addresses
                WHERE company_id = ?1 AND is_active = 1
                ORDER BY kind, city
                "#,
            )
            .bind(company_id)
            .fetch_all(pool)
            .await?;
            Ok(rows)
        })
        .await
    }

    /// Gets all active addresses of a given kind.
    pub async fn get_by_kind(&self, kind: AddressKind) -> DbResult<Vec<Address>> {
        let pool = &self.pool;
        retry::execute("address.get_by_kind", &self.retry, || async move {
            let rows = sqlx::query_as::<_, Address>(
                r#"
                SELECT id, person_id, company_id, kind, street1, street2, city,
                       region, postal_code, country, is_active, created_at, updated_at
                FROM addresses
                WHERE kind = ?1 AND is_active = 1
                ORDER BY country, city
                "#,
            )
            .bind(kind)
            .fetch_all(pool)
            .await?;
            Ok(rows)
        })
        .await
    }

    /// Counts active addresses (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        base::count(&self.pool, &ADDRESSES, &self.retry).await
    }
}

/// Helper to generate a new address ID.
pub fn generate_address_id() -> String {
    Uuid::new_v4().to_string()
}
