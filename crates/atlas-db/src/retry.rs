//! # Retry Wrapper
//!
//! Shared resilience wrapper for database operations.
//!
//! ## How It Works
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Retry Flow                                           │
//! │                                                                         │
//! │  repository method                                                      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  retry::execute("quote.insert", policy, closure)                       │
//! │       │                                                                 │
//! │       ├── run closure ──► Ok(value) ──────────────► return Ok          │
//! │       │                                                                 │
//! │       ├── Err, retryable, attempts left                                │
//! │       │        │                                                        │
//! │       │        ▼                                                        │
//! │       │   warn! + sleep(backoff) ── backoff doubles, capped ──┐        │
//! │       │        ▲                                               │        │
//! │       │        └───────────────────────────────────────────────┘        │
//! │       │                                                                 │
//! │       └── Err, permanent or exhausted ──► error! ──► return Err        │
//! │                                                                         │
//! │  BACKOFF STRATEGY (Exponential)                                        │
//! │  ─────────────────────────────                                          │
//! │  Attempt 1: 50ms                                                        │
//! │  Attempt 2: 100ms                                                       │
//! │  Attempt 3: 200ms                                                       │
//! │  Max: 1s                                                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Only errors classified transient by [`DbError::is_retryable`] are
//! re-run; constraint and validation failures surface immediately.

use std::future::Future;
use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, error, warn};

use crate::error::{DbError, DbResult};

// =============================================================================
// Retry Policy
// =============================================================================

/// Retry configuration shared by every repository.
///
/// ## Example
/// ```rust,ignore
/// let policy = RetryPolicy::default().max_attempts(5);
/// let config = DbConfig::new("./atlas.db").retry(policy);
/// ```
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts, including the first one. 1 disables retries.
    pub max_attempts: u32,

    /// Backoff before the first retry.
    pub initial_backoff: Duration,

    /// Ceiling for the doubling backoff.
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            max_attempts: 3,
            initial_backoff: Duration::from_millis(50),
            max_backoff: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    /// A policy that never retries; useful in tests asserting error paths.
    pub fn no_retries() -> Self {
        RetryPolicy {
            max_attempts: 1,
            ..RetryPolicy::default()
        }
    }

    /// Sets the total number of attempts.
    pub fn max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }

    /// Sets the backoff before the first retry.
    pub fn initial_backoff(mut self, backoff: Duration) -> Self {
        self.initial_backoff = backoff;
        self
    }

    /// Sets the backoff ceiling.
    pub fn max_backoff(mut self, backoff: Duration) -> Self {
        self.max_backoff = backoff;
        self
    }
}

// =============================================================================
// Execute With Retry
// =============================================================================

/// Runs a database closure, retrying transient failures with backoff.
///
/// The closure is re-invoked from scratch on each attempt, so it must build
/// its query fresh every time (bind parameters are cheap references).
///
/// ## Arguments
/// * `op` - Stable operation label for logs ("company.insert")
/// * `policy` - Attempt count and backoff shape
/// * `run` - The database work; returns `DbResult<T>`
pub(crate) async fn execute<T, F, Fut>(
    op: &'static str,
    policy: &RetryPolicy,
    mut run: F,
) -> DbResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = DbResult<T>>,
{
    let mut backoff = policy.initial_backoff;
    let mut attempt: u32 = 1;

    loop {
        match run().await {
            Ok(value) => {
                if attempt > 1 {
                    debug!(op, attempt, "operation succeeded after retry");
                }
                return Ok(value);
            }

            Err(err) if err.is_retryable() && attempt < policy.max_attempts => {
                warn!(
                    op,
                    attempt,
                    backoff_ms = backoff.as_millis() as u64,
                    error = %err,
                    "transient database error, retrying"
                );
                sleep(backoff).await;
                backoff = (backoff * 2).min(policy.max_backoff);
                attempt += 1;
            }

            Err(err) => {
                if err.is_retryable() {
                    error!(op, attempt, error = %err, "transient database error, attempts exhausted");
                } else {
                    error!(op, error = %err, "database operation failed");
                }
                return Err(err);
            }
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn fast_policy() -> RetryPolicy {
        RetryPolicy::default()
            .initial_backoff(Duration::from_millis(1))
            .max_backoff(Duration::from_millis(2))
    }

    #[tokio::test]
    async fn test_success_passes_through() {
        let result = execute("test.ok", &fast_policy(), || async { Ok(7) }).await;
        assert_eq!(result.unwrap(), 7);
    }

    #[tokio::test]
    async fn test_transient_error_is_retried() {
        let attempts = Cell::new(0u32);
        let result = execute("test.transient", &fast_policy(), || {
            attempts.set(attempts.get() + 1);
            let n = attempts.get();
            async move {
                if n < 3 {
                    Err(DbError::Busy("database is locked".into()))
                } else {
                    Ok(42)
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(attempts.get(), 3);
    }

    #[tokio::test]
    async fn test_permanent_error_fails_immediately() {
        let attempts = Cell::new(0u32);
        let result: DbResult<()> = execute("test.permanent", &fast_policy(), || {
            attempts.set(attempts.get() + 1);
            async { Err(DbError::duplicate("quote_number", "Q-1")) }
        })
        .await;

        assert!(matches!(result, Err(DbError::UniqueViolation { .. })));
        assert_eq!(attempts.get(), 1);
    }

    #[tokio::test]
    async fn test_attempts_are_exhausted() {
        let attempts = Cell::new(0u32);
        let result: DbResult<()> = execute("test.exhausted", &fast_policy(), || {
            attempts.set(attempts.get() + 1);
            async { Err(DbError::PoolExhausted) }
        })
        .await;

        assert!(matches!(result, Err(DbError::PoolExhausted)));
        assert_eq!(attempts.get(), 3);
    }

    #[tokio::test]
    async fn test_no_retries_policy() {
        let attempts = Cell::new(0u32);
        let result: DbResult<()> = execute("test.noretry", &RetryPolicy::no_retries(), || {
            attempts.set(attempts.get() + 1);
            async { Err(DbError::Busy("database is locked".into())) }
        })
        .await;

        assert!(matches!(result, Err(DbError::Busy(_))));
        assert_eq!(attempts.get(), 1);
    }
}
