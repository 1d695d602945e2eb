//! # Sales Order Repository
//!
//! Database operations for sales orders, their line items, and the payments
//! view over them.
//!
//! An order optionally originates from an accepted quote (`quote_id`); the
//! link is informational, there is no cross-repository transaction when an
//! order is created from a quote.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::{debug, warn};
use uuid::Uuid;

use atlas_core::validation::{
    validate_amount_cents, validate_date_range, validate_entity_id, validate_name,
    validate_quantity, validate_required,
};
use atlas_core::{OrderItem, OrderStatus, Payment, SalesOrder};

use crate::error::{DbError, DbResult};
use crate::repository::base::{self, Table};
use crate::retry::{self, RetryPolicy};

/// Table configuration for sales orders.
const SALES_ORDERS: Table = Table {
    name: "sales_orders",
    id_column: "id",
    select_columns:
        "id, company_id, quote_id, order_number, status, subtotal_cents, discount_cents, total_cents, ordered_at, fulfilled_at, notes, is_active, created_at, updated_at",
};

/// Repository for sales order database operations.
#[derive(Debug, Clone)]
pub struct SalesOrderRepository {
    pool: SqlitePool,
    retry: RetryPolicy,
}

impl SalesOrderRepository {
    /// Creates a new SalesOrderRepository.
    pub fn new(pool: SqlitePool, retry: RetryPolicy) -> Self {
        SalesOrderRepository { pool, retry }
    }

    /// Inserts a new sales order.
    ///
    /// ## Returns
    /// * `Err(DbError::UniqueViolation)` - order_number already exists
    pub async fn insert(&self, order: &SalesOrder) -> DbResult<SalesOrder> {
        validate_entity_id(&order.id)?;
        validate_entity_id(&order.company_id)?;
        if let Some(quote_id) = &order.quote_id {
            validate_entity_id(quote_id)?;
        }
        validate_required("order_number", &order.order_number)?;
        validate_amount_cents("subtotal", order.subtotal_cents)?;
        validate_amount_cents("discount", order.discount_cents)?;
        validate_amount_cents("total", order.total_cents)?;

        debug!(id = %order.id, order_number = %order.order_number, "Inserting sales order");

        let pool = &self.pool;
        retry::execute("sales_order.insert", &self.retry, || async move {
            sqlx::query(
                r#"
                INSERT INTO sales_orders (
                    id, company_id, quote_id, order_number, status,
                    subtotal_cents, discount_cents, total_cents,
                    ordered_at, fulfilled_at, notes,
                    is_active, created_at, updated_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)
                "#,
            )
            .bind(&order.id)
            .bind(&order.company_id)
            .bind(&order.quote_id)
            .bind(&order.order_number)
            .bind(order.status)
            .bind(order.subtotal_cents)
            .bind(order.discount_cents)
            .bind(order.total_cents)
            .bind(order.ordered_at)
            .bind(order.fulfilled_at)
            .bind(&order.notes)
            .bind(order.is_active)
            .bind(order.created_at)
            .bind(order.updated_at)
            .execute(pool)
            .await?;
            Ok(())
        })
        .await?;

        Ok(order.clone())
    }

    /// Updates an order's mutable header columns.
    ///
    /// Status and totals go through `confirm`/`fulfill`/`cancel` and
    /// `update_totals`.
    pub async fn update(&self, order: &SalesOrder) -> DbResult<SalesOrder> {
        validate_entity_id(&order.id)?;

        debug!(id = %order.id, "Updating sales order");

        let now = Utc::now();
        let pool = &self.pool;
        let affected = retry::execute("sales_order.update", &self.retry, || async move {
            let result = sqlx::query(
                r#"
                UPDATE sales_orders SET
                    notes = ?2,
                    updated_at = ?3
                WHERE id = ?1 AND is_active = 1
                "#,
            )
            .bind(&order.id)
            .bind(&order.notes)
            .bind(now)
            .execute(pool)
            .await?;
            Ok(result.rows_affected())
        })
        .await?;

        if affected == 0 {
            warn!(id = %order.id, "Sales order update affected no rows (missing or inactive)");
        }

        let mut updated = order.clone();
        updated.updated_at = now;
        Ok(updated)
    }

    /// Soft-deletes a sales order.
    pub async fn soft_delete(&self, id: &str) -> DbResult<bool> {
        base::soft_delete(&self.pool, &SALES_ORDERS, &self.retry, id).await
    }

    /// True if an active order with this id exists.
    pub async fn exists(&self, id: &str) -> DbResult<bool> {
        base::exists(&self.pool, &SALES_ORDERS, &self.retry, id).await
    }

    /// Lists all active orders, newest first.
    pub async fn list(&self) -> DbResult<Vec<SalesOrder>> {
        base::list_all(&self.pool, &SALES_ORDERS, &self.retry, "ordered_at DESC").await
    }

    /// Gets an order by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<SalesOrder>> {
        base::get_by_id(&self.pool, &SALES_ORDERS, &self.retry, id).await
    }

    /// Gets all active orders for a company, newest first.
    pub async fn get_by_company(&self, company_id: &str) -> DbResult<Vec<SalesOrder>> {
        validate_entity_id(company_id)?;

        let pool = &self.pool;
        retry::execute("sales_order.get_by_company", &self.retry, || async move {
            let rows = sqlx::query_as::<_, SalesOrder>(
                r#"
                SELECT id, company_id, quote_id, order_number, status,
                       subtotal_cents, discount_cents, total_cents,
                       ordered_at, fulfilled_at, notes, is_active, created_at, updated_at
                FROM sales_orders
                WHERE company_id = ?1 AND is_active = 1
                ORDER BY ordered_at DESC
                "#,
            )
            .bind(company_id)
            .fetch_all(pool)
            .await?;
            Ok(rows)
        })
        .await
    }

    /// Gets active orders created from a quote.
    pub async fn get_by_quote(&self, quote_id: &str) -> DbResult<Vec<SalesOrder>> {
        validate_entity_id(quote_id)?;

        let pool = &self.pool;
        retry::execute("sales_order.get_by_quote", &self.retry, || async move {
            let rows = sqlx::query_as::<_, SalesOrder>(
                r#"
                SELECT id, company_id, quote_id, order_number, status,
                       subtotal_cents, discount_cents, total_cents,
                       ordered_at, fulfilled_at, notes, is_active, created_at, updated_at
                FROM sales_orders
                WHERE quote_id = ?1 AND is_active = 1
                ORDER BY ordered_at DESC
                "#,
            )
            .bind(quote_id)
            .fetch_all(pool)
            .await?;
            Ok(rows)
        })
        .await
    }

    /// Gets all active orders in a status, newest first.
    pub async fn get_by_status(&self, status: OrderStatus) -> DbResult<Vec<SalesOrder>> {
        let pool = &self.pool;
        retry::execute("sales_order.get_by_status", &self.retry, || async move {
            let rows = sqlx::query_as::<_, SalesOrder>(
                r#"
                SELECT id, company_id, quote_id, order_number, status,
                       subtotal_cents, discount_cents, total_cents,
                       ordered_at, fulfilled_at, notes, is_active, created_at, updated_at
                FROM sales_orders
                WHERE status = ?1 AND is_active = 1
                ORDER BY ordered_at DESC
                "#,
            )
            .bind(status)
            .fetch_all(pool)
            .await?;
            Ok(rows)
        })
        .await
    }

    /// Gets orders placed in the half-open range `[from, until)`.
    pub async fn get_ordered_between(
        &self,
        from: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> DbResult<Vec<SalesOrder>> {
        validate_date_range(from, until)?;

        let pool = &self.pool;
        retry::execute(
            "sales_order.get_ordered_between",
            &self.retry,
            || async move {
                let rows = sqlx::query_as::<_, SalesOrder>(
                    r#"
                    SELECT id, company_id, quote_id, order_number, status,
                           subtotal_cents, discount_cents, total_cents,
                           ordered_at, fulfilled_at, notes, is_active, created_at, updated_at
                    FROM sales_orders
                    WHERE ordered_at >= ?1 AND ordered_at < ?2 AND is_active = 1
                    ORDER BY ordered_at
                    "#,
                )
                .bind(from)
                .bind(until)
                .fetch_all(pool)
                .await?;
                Ok(rows)
            },
        )
        .await
    }

    /// Adds a line item to an order.
    pub async fn add_item(&self, item: &OrderItem) -> DbResult<OrderItem> {
        validate_entity_id(&item.id)?;
        validate_entity_id(&item.order_id)?;
        validate_name("description", &item.description)?;
        validate_amount_cents("unit_price", item.unit_price_cents)?;
        validate_quantity(item.quantity)?;
        validate_amount_cents("line_total", item.line_total_cents)?;

        debug!(order_id = %item.order_id, description = %item.description, "Adding order item");

        let pool = &self.pool;
        retry::execute("sales_order.add_item", &self.retry, || async move {
            sqlx::query(
                r#"
                INSERT INTO order_items (
                    id, order_id, description, unit_price_cents, quantity,
                    line_total_cents, is_active, created_at, updated_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
                "#,
            )
            .bind(&item.id)
            .bind(&item.order_id)
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

    /// Loads the order's active items into `order.items`.
    pub async fn load_items(&self, order: &mut SalesOrder) -> DbResult<()> {
        validate_entity_id(&order.id)?;

        let id = order.id.as_str();
        let pool = &self.pool;
        let items = retry::execute("sales_order.load_items", &self.retry, || async move {
            let rows = sqlx::query_as::<_, OrderItem>(
                r#"
                SELECT id, order_id, description, unit_price_cents, quantity,
                       line_total_cents, is_active, created_at, updated_at
                FROM order_items
                WHERE order_id = ?1 AND is_active = 1
                ORDER BY created_at
                "#,
            )
            .bind(id)
            .fetch_all(pool)
            .await?;
            Ok(rows)
        })
        .await?;

        order.items = items;
        Ok(())
    }

    /// Loads the order's active payments into `order.payments`.
    pub async fn load_payments(&self, order: &mut SalesOrder) -> DbResult<()> {
        validate_entity_id(&order.id)?;

        let id = order.id.as_str();
        let pool = &self.pool;
        let payments = retry::execute("sales_order.load_payments", &self.retry, || async move {
            let rows = sqlx::query_as::<_, Payment>(
                r#"
                SELECT id, order_id, method, amount_cents, reference,
                       received_at, is_active, created_at, updated_at
                FROM payments
                WHERE order_id = ?1 AND is_active = 1
                ORDER BY received_at
                "#,
            )
            .bind(id)
            .fetch_all(pool)
            .await?;
            Ok(rows)
        })
        .await?;

        order.payments = payments;
        Ok(())
    }

    /// Updates order totals while the order is still pending.
    ///
    /// ## Returns
    /// * `Err(DbError::NotFound)` - Order is not an active pending order
    pub async fn update_totals(
        &self,
        order_id: &str,
        subtotal_cents: i64,
        discount_cents: i64,
        total_cents: i64,
    ) -> DbResult<()> {
        validate_entity_id(order_id)?;
        validate_amount_cents("subtotal", subtotal_cents)?;
        validate_amount_cents("discount", discount_cents)?;
        validate_amount_cents("total", total_cents)?;

        let now = Utc::now();
        let pool = &self.pool;
        let affected = retry::execute("sales_order.update_totals", &self.retry, || async move {
            let result = sqlx::query(
                r#"
                UPDATE sales_orders SET
                    subtotal_cents = ?2,
                    discount_cents = ?3,
                    total_cents = ?4,
                    updated_at = ?5
                WHERE id = ?1 AND status = 'pending' AND is_active = 1
                "#,
            )
            .bind(order_id)
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
            return Err(DbError::not_found("Sales order (pending)", order_id));
        }

        Ok(())
    }

    /// Confirms a pending order.
    pub async fn confirm(&self, id: &str) -> DbResult<()> {
        validate_entity_id(id)?;

        debug!(id = %id, "Confirming sales order");

        let now = Utc::now();
        let pool = &self.pool;
        let affected = retry::execute("sales_order.confirm", &self.retry, || async move {
            let result = sqlx::query(
                r#"
                UPDATE sales_orders SET
                    status = 'confirmed',
                    updated_at = ?2
                WHERE id = ?1 AND status = 'pending' AND is_active = 1
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
            return Err(DbError::not_found("Sales order (pending)", id));
        }

        Ok(())
    }

    /// Marks a confirmed order fulfilled and stamps `fulfilled_at`.
    pub async fn fulfill(&self, id: &str) -> DbResult<()> {
        validate_entity_id(id)?;

        debug!(id = %id, "Fulfilling sales order");

        let now = Utc::now();
        let pool = &self.pool;
        let affected = retry::execute("sales_order.fulfill", &self.retry, || async move {
            let result = sqlx::query(
                r#"
                UPDATE sales_orders SET
                    status = 'fulfilled',
                    fulfilled_at = ?2,
                    updated_at = ?2
                WHERE id = ?1 AND status = 'confirmed' AND is_active = 1
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
            return Err(DbError::not_found("Sales order (confirmed)", id));
        }

        Ok(())
    }

    /// Cancels a pending or confirmed order.
    pub async fn cancel(&self, id: &str) -> DbResult<()> {
        validate_entity_id(id)?;

        debug!(id = %id, "Canceling sales order");

        let now = Utc::now();
        let pool = &self.pool;
        let affected = retry::execute("sales_order.cancel", &self.retry, || async move {
            let result = sqlx::query(
                r#"
                UPDATE sales_orders SET
                    status = 'canceled',
                    updated_at = ?2
                WHERE id = ?1 AND status IN ('pending', 'confirmed') AND is_active = 1
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
            return Err(DbError::not_found("Sales order", id));
        }

        Ok(())
    }

    /// Counts active orders (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        base::count(&self.pool, &SALES_ORDERS, &self.retry).await
    }
}

/// Generates an order number in format: SO-YYYYMMDD-NNNN
///
/// ## Example
/// `SO-20260312-0007`
pub fn generate_order_number() -> String {
    let now = Utc::now();
    let seq = (now.timestamp_millis() % 10_000) as u32;
    format!("SO-{}-{:04}", now.format("%Y%m%d"), seq)
}

/// Helper to generate a new sales order ID.
pub fn generate_order_id() -> String {
    Uuid::new_v4().to_string()
}

/// Helper to generate a new order item ID.
pub fn generate_order_item_id() -> String {
    Uuid::new_v4().to_string()
}
