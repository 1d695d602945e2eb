//! # Base Repository
//!
//! The shared half of the uniform repository contract.
//!
//! Each concrete repository contributes a [`Table`] descriptor (table name,
//! id column, select column list) plus its entity-specific SQL; the
//! operations whose SQL is identical across every entity (`get_by_id`,
//! `list_all`, `exists`, `soft_delete`, `count`) live here and are generated
//! from the descriptor.
//!
//! The descriptor values are compile-time constants, never caller input, so
//! splicing them into SQL text is safe; all runtime values go through bind
//! parameters.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use atlas_core::validation::validate_entity_id;

use crate::error::DbResult;
use crate::retry::{self, RetryPolicy};

/// Static description of an entity table.
///
/// One `const` per repository file; the base helpers and the repository's
/// own queries both read from it so the column list exists in exactly one
/// place.
pub(crate) struct Table {
    /// SQL table name.
    pub name: &'static str,

    /// Primary key column.
    pub id_column: &'static str,

    /// Comma-separated column list matching the entity's row mapping.
    pub select_columns: &'static str,
}

/// Gets one active row by id, mapped into the entity type.
///
/// ## Returns
/// * `Ok(Some(T))` - Active row found
/// * `Ok(None)` - Unknown id, or soft-deleted row
pub(crate) async fn get_by_id<T>(
    pool: &SqlitePool,
    table: &Table,
    retry_policy: &RetryPolicy,
    id: &str,
) -> DbResult<Option<T>>
where
    T: Send + Unpin + for<'r> sqlx::FromRow<'r, sqlx::sqlite::SqliteRow>,
{
    validate_entity_id(id)?;

    let sql = format!(
        "SELECT {} FROM {} WHERE {} = ?1 AND is_active = 1",
        table.select_columns, table.name, table.id_column
    );
    let sql = sql.as_str();

    retry::execute("base.get_by_id", retry_policy, || async move {
        let row = sqlx::query_as::<_, T>(sql)
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(row)
    })
    .await
}

/// Lists every active row, mapped into the entity type.
///
/// `order_by` is a compile-time constant from the calling repository, never
/// caller input.
pub(crate) async fn list_all<T>(
    pool: &SqlitePool,
    table: &Table,
    retry_policy: &RetryPolicy,
    order_by: &'static str,
) -> DbResult<Vec<T>>
where
    T: Send + Unpin + for<'r> sqlx::FromRow<'r, sqlx::sqlite::SqliteRow>,
{
    let sql = format!(
        "SELECT {} FROM {} WHERE is_active = 1 ORDER BY {}",
        table.select_columns, table.name, order_by
    );
    let sql = sql.as_str();

    retry::execute("base.list", retry_policy, || async move {
        let rows = sqlx::query_as::<_, T>(sql).fetch_all(pool).await?;
        Ok(rows)
    })
    .await
}

/// True if an active row with this id exists.
///
/// `COUNT(1)` against the id and `is_active = 1`; soft-deleted rows count
/// as absent.
pub(crate) async fn exists(
    pool: &SqlitePool,
    table: &Table,
    retry_policy: &RetryPolicy,
    id: &str,
) -> DbResult<bool> {
    validate_entity_id(id)?;

    debug!(table = table.name, id = %id, "Checking existence");

    let sql = format!(
        "SELECT COUNT(1) FROM {} WHERE {} = ?1 AND is_active = 1",
        table.name, table.id_column
    );
    let sql = sql.as_str();

    let count = retry::execute("base.exists", retry_policy, || async move {
        let count: i64 = sqlx::query_scalar(sql).bind(id).fetch_one(pool).await?;
        Ok(count)
    })
    .await?;

    Ok(count > 0)
}

/// Soft-deletes a row by flipping `is_active` to 0 and bumping `updated_at`.
///
/// ## Returns
/// * `Ok(true)` - A live row was deactivated
/// * `Ok(false)` - No live row matched (already deleted, or never existed)
pub(crate) async fn soft_delete(
    pool: &SqlitePool,
    table: &Table,
    retry_policy: &RetryPolicy,
    id: &str,
) -> DbResult<bool> {
    validate_entity_id(id)?;

    debug!(table = table.name, id = %id, "Soft-deleting row");

    let now = Utc::now();
    let sql = format!(
        "UPDATE {} SET is_active = 0, updated_at = ?2 WHERE {} = ?1 AND is_active = 1",
        table.name, table.id_column
    );
    let sql = sql.as_str();

    let affected = retry::execute("base.soft_delete", retry_policy, || async move {
        let result = sqlx::query(sql).bind(id).bind(now).execute(pool).await?;
        Ok(result.rows_affected())
    })
    .await?;

    Ok(affected > 0)
}

/// Counts active rows (for diagnostics).
pub(crate) async fn count(
    pool: &SqlitePool,
    table: &Table,
    retry_policy: &RetryPolicy,
) -> DbResult<i64> {
    let sql = format!("SELECT COUNT(*) FROM {} WHERE is_active = 1", table.name);
    let sql = sql.as_str();

    retry::execute("base.count", retry_policy, || async move {
        let count: i64 = sqlx::query_scalar(sql).fetch_one(pool).await?;
        Ok(count)
    })
    .await
}
