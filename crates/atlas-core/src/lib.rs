//! # atlas-core: Pure Domain Types for Atlas CRM
//!
//! This crate is the foundation of Atlas CRM. It contains the entity model
//! and the guard-clause validation the data layer runs before touching SQL,
//! with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Atlas CRM Data Flow                              │
//! │                                                                         │
//! │  Caller (API layer, importer, report job)                              │
//! │       │                                                                 │
//! │  ┌────▼────────────────────────────────────────────────────────────┐   │
//! │  │               ★ atlas-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌────────────┐                 │   │
//! │  │   │   types   │  │   money   │  │ validation │                 │   │
//! │  │   │  Company  │  │   Money   │  │   guards   │                 │   │
//! │  │   │  Person   │  │ cents i64 │  │  id/email  │                 │   │
//! │  │   │  Quote …  │  └───────────┘  └────────────┘                 │   │
//! │  │   └───────────┘                                                 │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └────┬────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │  ┌────▼────────────────────────────────────────────────────────────┐   │
//! │  │                    atlas-db (Database Layer)                    │   │
//! │  │              SQLite queries, migrations, repositories           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Entity types (Company, Person, Quote, SalesOrder, etc.)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`error`] - Domain error types
//! - [`validation`] - Guard-clause input validation
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic - same input = same output
//! 2. **No I/O**: Database, network, file system access is FORBIDDEN here
//! 3. **Integer Money**: All monetary values are in cents (i64) to avoid float errors
//! 4. **Explicit Errors**: All errors are typed, never strings or panics

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod money;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use atlas_core::Money` instead of
// `use atlas_core::money::Money`

pub use error::ValidationError;
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum length for display names (company names, person names, subjects).
///
/// ## Business Reason
/// Keeps list views and exports well-behaved; anything longer is almost
/// certainly pasted garbage rather than a real name.
pub const MAX_NAME_LEN: usize = 200;

/// Maximum length for free-text notes columns.
pub const MAX_NOTES_LEN: usize = 4000;

/// Maximum length accepted for LIKE-based search queries.
pub const MAX_SEARCH_QUERY_LEN: usize = 100;

/// Maximum quantity on a single quote/order line.
///
/// ## Business Reason
/// Prevents accidental over-ordering (e.g., typing 10000 instead of 10).
pub const MAX_LINE_QUANTITY: i64 = 9999;
