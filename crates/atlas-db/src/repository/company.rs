//! # Company Repository
//!
//! Database operations for companies.
//!
//! ## Key Operations
//! - Uniform CRUD with soft delete
//! - LIKE-based name search
//! - Industry filter
//! - Navigation loads: addresses, people
//!
//! ## Name Search
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    How Name Search Works                                │
//! │                                                                         │
//! │  User types: "ini"                                                     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  WHERE name LIKE '%ini%' AND is_active = 1                             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────┐                           │
//! │  │ companies                               │                           │
//! │  │                                         │                           │
//! │  │ Initech Ltd        | Manufacturing     │ ← MATCH!                  │
//! │  │ Infinity Partners  | Finance           │ ← MATCH!                  │
//! │  │ Acme Corp          | Wholesale         │                           │
//! │  └─────────────────────────────────────────┘                           │
//! │                                                                         │
//! │  Soft-deleted companies never appear, whatever the pattern.            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, warn};
use uuid::Uuid;

use atlas_core::validation::{validate_entity_id, validate_name, validate_required};
use atlas_core::{Address, Company, Person};

use crate::error::DbResult;
use crate::repository::base::{self, Table};
use crate::retry::{self, RetryPolicy};

/// Table configuration for companies.
const COMPANIES: Table = Table {
    name: "companies",
    id_column: "id",
    select_columns: "id, name, industry, website, phone, notes, is_active, created_at, updated_at",
};

/// Repository for company database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = db.companies();
///
/// // Search companies
/// let hits = repo.search_by_name("initech", 20).await?;
///
/// // Assemble an aggregate view
/// let mut company = repo.get_by_id(&id).await?.unwrap();
/// repo.load_people(&mut company).await?;
/// ```
#[derive(Debug, Clone)]
pub struct CompanyRepository {
    pool: SqlitePool,
    retry: RetryPolicy,
}

impl CompanyRepository {
    /// Creates a new CompanyRepository.
    pub fn new(pool: SqlitePool, retry: RetryPolicy) -> Self {
        CompanyRepository { pool, retry }
    }

    /// Inserts a new company.
    ///
    /// The caller supplies every field, timestamps included; nothing is
    /// generated server-side.
    ///
    /// ## Returns
    /// * `Ok(Company)` - The entity as given
    /// * `Err(DbError::Validation)` - Missing/invalid id or name
    pub async fn insert(&self, company: &Company) -> DbResult<Company> {
        validate_entity_id(&company.id)?;
        validate_name("name", &company.name)?;

        debug!(id = %company.id, name = %company.name, "Inserting company");

        let pool = &self.pool;
        retry::execute("company.insert", &self.retry, || async move {
            sqlx::query(
                r#"
                INSERT INTO companies (
                    id, name, industry, website, phone, notes,
                    is_active, created_at, updated_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
                "#,
            )
            .bind(&company.id)
            .bind(&company.name)
            .bind(&company.industry)
            .bind(&company.website)
            .bind(&company.phone)
            .bind(&company.notes)
            .bind(company.is_active)
            .bind(company.created_at)
            .bind(company.updated_at)
            .execute(pool)
            .await?;
            Ok(())
        })
        .await?;

        Ok(company.clone())
    }

    /// Updates an existing company's mutable columns.
    ///
    /// Only live rows are touched (`is_active = 1`). If nothing matched, a
    /// warning is logged and the call still succeeds; callers that care use
    /// `exists` first.
    pub async fn update(&self, company: &Company) -> DbResult<Company> {
        validate_entity_id(&company.id)?;
        validate_name("name", &company.name)?;

        debug!(id = %company.id, "Updating company");

        let now = Utc::now();
        let pool = &self.pool;
        let affected = retry::execute("company.update", &self.retry, || async move {
            let result = sqlx::query(
                r#"
                UPDATE companies SET
                    name = ?2,
                    industry = ?3,
                    website = ?4,
                    phone = ?5,
                    notes = ?6,
                    updated_at = ?7
                WHERE id = ?1 AND is_active = 1
                "#,
            )
            .bind(&company.id)
            .bind(&company.name)
            .bind(&company.industry)
            .bind(&company.website)
            .bind(&company.phone)
            .bind(&company.notes)
            .bind(now)
            .execute(pool)
            .await?;
            Ok(result.rows_affected())
        })
        .await?;

        if affected == 0 {
            warn!(id = %company.id, "Company update affected no rows (missing or inactive)");
        }

        let mut updated = company.clone();
        updated.updated_at = now;
        Ok(updated)
    }

    /// Soft-deletes a company.
    ///
    /// ## Why Soft Delete?
    /// - Quotes and orders still reference this company
    /// - Can be restored if deleted by mistake
    pub async fn soft_delete(&self, id: &str) -> DbResult<bool> {
        base::soft_delete(&self.pool, &COMPANIES, &self.retry, id).await
    }

    /// True if an active company with this id exists.
    pub async fn exists(&self, id: &str) -> DbResult<bool> {
        base::exists(&self.pool, &COMPANIES, &self.retry, id).await
    }

    /// Lists all active companies, ordered by name.
    pub async fn list(&self) -> DbResult<Vec<Company>> {
        base::list_all(&self.pool, &COMPANIES, &self.retry, "name").await
    }

    /// Gets a company by its ID.
    ///
    /// ## Returns
    /// * `Ok(Some(Company))` - Active company found
    /// * `Ok(None)` - Unknown or soft-deleted
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Company>> {
        base::get_by_id(&self.pool, &COMPANIES, &self.retry, id).await
    }

    /// Searches companies by name substring.
    ///
    /// ## Arguments
    /// * `query` - Search term (can be partial); empty lists all
    /// * `limit` - Maximum results to return
    pub async fn search_by_name(&self, query: &str, limit: u32) -> DbResult<Vec<Company>> {
        let query = atlas_core::validation::validate_search_query(query)?;

        debug!(query = %query, limit = %limit, "Searching companies");

        let pattern = format!("%{}%", query);
        let pattern = pattern.as_str();
        let pool = &self.pool;
        retry::execute("company.search_by_name", &self.retry, || async move {
            let companies = sqlx::query_as::<_, Company>(
                r#"
                SELECT id, name, industry, website, phone, notes,
                       is_active, created_at, updated_at
                FROM companies
                WHERE name LIKE ?1 AND is_active = 1
                ORDER BY name
                LIMIT ?2
                "#,
            )
            .bind(pattern)
            .bind(limit)
            .fetch_all(pool)
            .await?;
            Ok(companies)
        })
        .await
    }

    /// Gets all active companies in an industry.
    pub async fn get_by_industry(&self, industry: &str) -> DbResult<Vec<Company>> {
        validate_required("industry", industry)?;

        let pool = &self.pool;
        retry::execute("company.get_by_industry", &self.retry, || async move {
            let companies = sqlx::query_as::<_, Company>(
                r#"
                SELECT id, name, industry, website, phone, notes,
                       is_active, created_at, updated_at
                FROM companies
                WHERE industry = ?1 AND is_active = 1
                ORDER BY name
                "#,
            )
            .bind(industry)
            .fetch_all(pool)
            .await?;
            Ok(companies)
        })
        .await
    }

    /// Loads the company's active addresses into `company.addresses`.
    pub async fn load_addresses(&self, company: &mut Company) -> DbResult<()> {
        validate_entity_id(&company.id)?;

        let id = company.id.as_str();
        let pool = &self.pool;
        let addresses = retry::execute("company.load_addresses", &self.retry, || async move {
            let rows = sqlx::query_as::<_, Address>(
                r#"
                SELECT id, person_id, company_id, kind, street1, street2, city,
                       region, postal_code, country, is_active, created_at, updated_at
                FROM addresses
                WHERE company_id = ?1 AND is_active = 1
                ORDER BY kind, city
                "#,
            )
            .bind(id)
            .fetch_all(pool)
            .await?;
            Ok(rows)
        })
        .await?;

        company.addresses = addresses;
        Ok(())
    }

    /// Loads the company's active people into `company.people`.
    pub async fn load_people(&self, company: &mut Company) -> DbResult<()> {
        validate_entity_id(&company.id)?;

        let id = company.id.as_str();
        let pool = &self.pool;
        let people = retry::execute("company.load_people", &self.retry, || async move {
            let rows = sqlx::query_as::<_, Person>(
                r#"
                SELECT id, company_id, first_name, last_name, title, department,
                       notes, is_active, created_at, updated_at
                FROM people
                WHERE company_id = ?1 AND is_active = 1
                ORDER BY last_name, first_name
                "#,
            )
            .bind(id)
            .fetch_all(pool)
            .await?;
            Ok(rows)
        })
        .await?;

        company.people = people;
        Ok(())
    }

    /// Counts active companies (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        base::count(&self.pool, &COMPANIES, &self.retry).await
    }
}

/// Helper to generate a new company ID.
pub fn generate_company_id() -> String {
    Uuid::new_v4().to_string()
}
