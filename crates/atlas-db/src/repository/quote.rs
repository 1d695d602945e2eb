//! # Quote Repository
//!
//! Database operations for quotes and their line items.
//!
//! ## Quote Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Quote Lifecycle                                   │
//! │                                                                         │
//! │  1. CREATE DRAFT                                                       │
//! │     └── insert() → Quote { status: Draft }                             │
//! │                                                                         │
//! │  2. ADD ITEMS                                                          │
//! │     └── add_item() → QuoteItem                                         │
//! │     └── add_item() → QuoteItem                                         │
//! │     └── update_totals() → Recalculate subtotal, discount, total        │
//! │                                                                         │
//! │  3. SEND                                                               │
//! │     └── mark_sent() → Quote { status: Sent }                           │
//! │                                                                         │
//! │  4. DECIDE                                                             │
//! │     └── mark_accepted() → Accepted (eligible to become an order)       │
//! │     └── mark_rejected() → Rejected                                     │
//! │                                                                         │
//! │  Every transition is a guarded UPDATE on the expected prior status;    │
//! │  zero affected rows means the quote was not in that state.             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::{debug, warn};
use uuid::Uuid;

use atlas_core::validation::{
    validate_amount_cents, validate_date_range, validate_entity_id, validate_name,
    validate_quantity, validate_required,
};
use atlas_core::{Quote, QuoteItem, QuoteStatus};

use crate::error::{DbError, DbResult};
use crate::repository::base::{self, Table};
use crate::retry::{self, RetryPolicy};

/// Table configuration for quotes.
const QUOTES: Table = Table {
    name: "quotes",
    id_column: "id",
    select_columns:
        "id, company_id, person_id, quote_number, status, subtotal_cents, discount_cents, total_cents, issued_at, expires_at, notes, is_active, created_at, updated_at",
};

/// Repository for quote database operations.
#[derive(Debug, Clone)]
pub struct QuoteRepository {
    pool: SqlitePool,
    retry: RetryPolicy,
}

impl QuoteRepository {
    /// Creates a new QuoteRepository.
    pub fn new(pool: SqlitePool, retry: RetryPolicy) -> Self {
        QuoteRepository { pool, retry }
    }

    /// Inserts a new quote.
    ///
    /// ## Returns
    /// * `Err(DbError::UniqueViolation)` - quote_number already exists
    pub async fn insert(&self, quote: &Quote) -> DbResult<Quote> {
        validate_entity_id(&quote.id)?;
        validate_entity_id(&quote.company_id)?;
        if let Some(person_id) = &quote.person_id {
            validate_entity_id(person_id)?;
        }
        validate_required("quote_number", &quote.quote_number)?;
        validate_amount_cents("subtotal", quote.subtotal_cents)?;
        validate_amount_cents("discount", quote.discount_cents)?;
        validate_amount_cents("total", quote.total_cents)?;

        debug!(id = %quote.id, quote_number = %quote.quote_number, "Inserting quote");

        let pool = &self.pool;
        retry::execute("quote.insert", &self.retry, || async move {
            sqlx::query(
                r#"
                INSERT INTO quotes (
                    id, company_id, person_id, quote_number, status,
                    subtotal_cents, discount_cents, total_cents,
                    issued_at, expires_at, notes,
                    is_active, created_at, updated_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)
                "#,
            )
            .bind(&quote.id)
            .bind(&quote.company_id)
            .bind(&quote.person_id)
            .bind(&quote.quote_number)
            .bind(quote.status)
            .bind(quote.subtotal_cents)
            .bind(quote.discount_cents)
            .bind(quote.total_cents)
            .bind(quote.issued_at)
            .bind(quote.expires_at)
            .bind(&quote.notes)
            .bind(quote.is_active)
            .bind(quote.created_at)
            .bind(quote.updated_at)
            .execute(pool)
            .await?;
            Ok(())
        })
        .await?;

        Ok(quote.clone())
    }

    /// Updates a quote's mutable header columns.
    ///
    /// Status and totals are NOT updated here; transitions go through the
    /// `mark_*` methods and totals through `update_totals`.
    pub async fn update(&self, quote: &Quote) -> DbResult<Quote> {
        validate_entity_id(&quote.id)?;
        if let Some(person_id) = &quote.person_id {
            validate_entity_id(person_id)?;
        }

        debug!(id = %quote.id, "Updating quote");

        let now = Utc::now();
        let pool = &self.pool;
        let affected = retry::execute("quote.update", &self.retry, || async move {
            let result = sqlx::query(
                r#"
                UPDATE quotes SET
                    person_id = ?2,
                    expires_at = ?3,
                    notes = ?4,
                    updated_at = ?5
                WHERE id = ?1 AND is_active = 1
                "#,
            )
            .bind(&quote.id)
            .bind(&quote.person_id)
            .bind(quote.expires_at)
            .bind(&quote.notes)
            .bind(now)
            .execute(pool)
            .await?;
            Ok(result.rows_affected())
        })
        .await?;

        if affected == 0 {
            warn!(id = %quote.id, "Quote update affected no rows (missing or inactive)");
        }

        let mut updated = quote.clone();
        updated.updated_at = now;
        Ok(updated)
    }

    /// Soft-deletes a quote.
    pub async fn soft_delete(&self, id: &str) -> DbResult<bool> {
        base::soft_delete(&self.pool, &QUOTES, &self.retry, id).await
    }

    /// True if an active quote with this id exists.
    pub async fn exists(&self, id: &str) -> DbResult<bool> {
        base::exists(&self.pool, &QUOTES, &self.retry, id).await
    }

    /// Lists all active quotes, newest first.
    pub async fn list(&self) -> DbResult<Vec<Quote>> {
        base::list_all(&self.pool, &QUOTES, &self.retry, "issued_at DESC").await
    }

    /// Gets a quote by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Quote>> {
        base::get_by_id(&self.pool, &QUOTES, &self.retry, id).await
    }

    /// Gets all active quotes for a company, newest first.
    pub async fn get_by_company(&self, company_id: &str) -> DbResult<Vec<Quote>> {
        validate_entity_id(company_id)?;

        let pool = &self.pool;
        retry::execute("quote.get_by_company", &self.retry, || async move {
            let rows = sqlx::query_as::<_, Quote>(
                r#"
                SELECT id, company_id, person_id, quote_number, status,
                       subtotal_cents, discount_cents, total_cents,
                       issued_at, expires_at, notes, is_active, created_at, updated_at
                FROM quotes
                WHERE company_id = ?1 AND is_active = 1
                ORDER BY issued_at DESC
                "#,
            )
            .bind(company_id)
            .fetch_all(pool)
            .await?;
            Ok(rows)
        })
        .await
    }

    /// Gets all active quotes addressed to a person, newest first.
    pub async fn get_by_person(&self, person_id: &str) -> DbResult<Vec<Quote>> {
        validate_entity_id(person_id)?;

        let pool = &self.pool;
        retry::execute("quote.get_by_person", &self.retry, || async move {
            let rows = sqlx::query_as::<_, Quote>(
                r#"
                SELECT id, company_id, person_id, quote_number, status,
                       subtotal_cents, discount_cents, total_cents,
                       issued_at, expires_at, notes, is_active, created_at, updated_at
                FROM quotes
                WHERE person_id = ?1 AND is_active = 1
                ORDER BY issued_at DESC
                "#,
            )
            .bind(person_id)
            .fetch_all(pool)
            .await?;
            Ok(rows)
        })
        .await
    }

    /// Gets all active quotes in a status, newest first.
    pub async fn get_by_status(&self, status: QuoteStatus) -> DbResult<Vec<Quote>> {
        let pool = &self.pool;
        retry::execute("quote.get_by_status", &self.retry, || async move {
            let rows = sqlx::query_as::<_, Quote>(
                r#"
                SELECT id, company_id, person_id, quote_number, status,
                       subtotal_cents, discount_cents, total_cents,
                       issued_at, expires_at, notes, is_active, created_at, updated_at
                FROM quotes
                WHERE status = ?1 AND is_active = 1
                ORDER BY issued_at DESC
                "#,
            )
            .bind(status)
            .fetch_all(pool)
            .await?;
            Ok(rows)
        })
        .await
    }

    /// Gets quotes issued in the half-open range `[from, until)`.
    pub async fn get_issued_between(
        &self,
        from: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> DbResult<Vec<Quote>> {
        validate_date_range(from, until)?;

        let pool = &self.pool;
        retry::execute("quote.get_issued_between", &self.retry, || async move {
            let rows = sqlx::query_as::<_, Quote>(
                r#"
                SELECT id, company_id, person_id, quote_number, status,
                       subtotal_cents, discount_cents, total_cents,
                       issued_at, expires_at, notes, is_active, created_at, updated_at
                FROM quotes
                WHERE issued_at >= ?1 AND issued_at < ?2 AND is_active = 1
                ORDER BY issued_at
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

    /// Adds a line item to a quote.
    pub async fn add_item(&self, item: &QuoteItem) -> DbResult<QuoteItem> {
        validate_entity_id(&item.id)?;
        validate_entity_id(&item.quote_id)?;
        validate_name("description", &item.description)?;
        validate_amount_cents("unit_price", item.unit_price_cents)?;
        validate_quantity(item.quantity)?;
        validate_amount_cents("line_total", item.line_total_cents)?;

        debug!(quote_id = %item.quote_id, description = %item.description, "Adding quote item");

        let pool = &self.pool;
        retry::execute("quote.add_item", &self.retry, || async move {
            sqlx::query(
                r#"
                INSERT INTO quote_items (
                    id, quote_id, description, unit_price_cents, quantity,
                    line_total_cents, is_active, created_at, updated_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
                "#,
            )
            .bind(&item.id)
            .bind(&item.quote_id)
            .bind(&item.description)
            .bind(item.unit_price_cents)
            .bind(item.quantity)
            .bind(item.line_total_cents)
            .bind(item.is_active)
            .bind(item.created_at)
            .bind(item.updated_at)
            .execute(pool)
            .await?;
            Ok(())
        })
        .await?;

        Ok(item.clone())
    }

    /// Soft-deletes a line item.
    ///
    /// Same convention as every other row: the item stays for history,
    /// `update_totals` is the caller's next move.
    pub async fn remove_item(&self, item_id: &str) -> DbResult<bool> {
        const QUOTE_ITEMS: Table = Table {
            name: "quote_items",
            id_column: "id",
            select_columns: "id",
        };
        base::soft_delete(&self.pool, &QUOTE_ITEMS, &self.retry, item_id).await
    }

    /// Loads the quote's active items into `quote.items`.
    pub async fn load_items(&self, quote: &mut Quote) -> DbResult<()> {
        validate_entity_id(&quote.id)?;

        let id = quote.id.as_str();
        let pool = &self.pool;
        let items = retry::execute("quote.load_items", &self.retry, || async move {
            let rows = sqlx::query_as::<_, QuoteItem>(
                r#"
                SELECT id, quote_id, description, unit_price_cents, quantity,
                       line_total_cents, is_active, created_at, updated_at
                FROM quote_items
                WHERE quote_id = ?1 AND is_active = 1
                ORDER BY created_at
                "#,
            )
            .bind(id)
            .fetch_all(pool)
            .await?;
            Ok(rows)
        })
        .await?;

        quote.items = items;
        Ok(())
    }

    /// Updates quote totals.
    ///
    /// ## When To Call
    /// After adding/removing items on a draft quote.
    ///
    /// ## Returns
    /// * `Err(DbError::NotFound)` - Quote is not an active draft
    pub async fn update_totals(
        &self,
        quote_id: &str,
        subtotal_cents: i64,
        discount_cents: i64,
        total_cents: i64,
    ) -> DbResult<()> {
        validate_entity_id(quote_id)?;
        validate_amount_cents("subtotal", subtotal_cents)?;
        validate_amount_cents("discount", discount_cents)?;
        validate_amount_cents("total", total_cents)?;

        let now = Utc::now();
        let pool = &self.pool;
        let affected = retry::execute("quote.update_totals", &self.retry, || async move {
            let result = sqlx::query(
                r#"
                UPDATE quotes SET
                    subtotal_cents = ?2,
                    discount_cents = ?3,
                    total_cents = ?4,
                    updated_at = ?5
                WHERE id = ?1 AND status = 'draft' AND is_active = 1
                "#,
            )
            .bind(quote_id)
            .bind(subtotal_cents)
            .bind(discount_cents)
            .bind(total_cents)
            .bind(now)
            .execute(pool)
            .await?;
            Ok(result.rows_affected())
        })
        .await?;

        if affected == 0 {
            return Err(DbError::not_found("Quote (draft)", quote_id));
        }

        Ok(())
    }

    /// Marks a draft quote as sent.
    pub async fn mark_sent(&self, id: &str) -> DbResult<()> {
        self.transition(id, "sent", &["draft"], "Quote (draft)").await
    }

    /// Marks a sent quote as accepted.
    pub async fn mark_accepted(&self, id: &str) -> DbResult<()> {
        self.transition(id, "accepted", &["sent"], "Quote (sent)").await
    }

    /// Marks a sent quote as rejected.
    pub async fn mark_rejected(&self, id: &str) -> DbResult<()> {
        self.transition(id, "rejected", &["sent"], "Quote (sent)").await
    }

    /// Marks a draft or sent quote as expired.
    pub async fn mark_expired(&self, id: &str) -> DbResult<()> {
        self.transition(id, "expired", &["draft", "sent"], "Quote (open)")
            .await
    }

    /// Guarded status transition shared by the `mark_*` methods.
    ///
    /// `to` and `from` are compile-time literals, never caller input.
    async fn transition(
        &self,
        id: &str,
        to: &'static str,
        from: &[&'static str],
        entity_label: &'static str,
    ) -> DbResult<()> {
        validate_entity_id(id)?;

        debug!(id = %id, to = to, "Transitioning quote status");

        let placeholders = from
            .iter()
            .map(|s| format!("'{}'", s))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "UPDATE quotes SET status = '{}', updated_at = ?2 WHERE id = ?1 AND status IN ({}) AND is_active = 1",
            to, placeholders
        );
        let sql = sql.as_str();

        let now = Utc::now();
        let pool = &self.pool;
        let affected = retry::execute("quote.transition", &self.retry, || async move {
            let result = sqlx::query(sql).bind(id).bind(now).execute(pool).await?;
            Ok(result.rows_affected())
        })
        .await?;

        if affected == 0 {
            return Err(DbError::not_found(entity_label, id));
        }

        Ok(())
    }

    /// Counts active quotes (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        base::count(&self.pool, &QUOTES, &self.retry).await
    }
}

/// Generates a quote number in format: Q-YYYYMMDD-NNNN
///
/// ## Format
/// - YYYYMMDD: Issue date
/// - NNNN: Pseudo-sequential number (padded to 4 digits)
///
/// ## Example
/// `Q-20260312-0041`
pub fn generate_quote_number() -> String {
    let now = Utc::now();
    let seq = (now.timestamp_millis() % 10_000) as u32;
    format!("Q-{}-{:04}", now.format("%Y%m%d"), seq)
}

/// Helper to generate a new quote ID.
pub fn generate_quote_id() -> String {
    Uuid::new_v4().to_string()
}

/// Helper to generate a new quote item ID.
pub fn generate_quote_item_id() -> String {
    Uuid::new_v4().to_string()
}
