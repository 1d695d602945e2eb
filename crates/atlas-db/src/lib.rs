//! # atlas-db: Database Layer for Atlas CRM
//!
//! This crate provides database access for the Atlas CRM system.
//! It uses SQLite for storage with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Atlas CRM Data Flow                              │
//! │                                                                         │
//! │  Caller (API layer, importer, report job)                              │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     atlas-db (THIS CRATE)                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │ (one/entity)  │    │  (embedded)  │  │   │
//! │  │   │               │    │               │    │              │  │   │
//! │  │   │ SqlitePool    │◄───│ CompanyRepo   │    │ 001_init.sql │  │   │
//! │  │   │ RetryPolicy   │    │ PersonRepo    │    │ 002_idx.sql  │  │   │
//! │  │   │               │    │ QuoteRepo ... │    │              │  │   │
//! │  │   └───────────────┘    └───────┬───────┘    └──────────────┘  │   │
//! │  │                                │                               │   │
//! │  │                        ┌───────▼───────┐                       │   │
//! │  │                        │ retry wrapper │  every SQL call       │   │
//! │  │                        │  (retry.rs)   │  funnels through here │   │
//! │  │                        └───────────────┘                       │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite Database (WAL mode, foreign keys on)                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`retry`] - Transient-failure retry wrapper
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations (company, person, quote, ...)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use atlas_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("path/to/atlas.db")).await?;
//!
//! let hits = db.companies().search_by_name("initech", 20).await?;
//! let mut person = db.people().get_by_id(&person_id).await?.unwrap();
//! db.people().load_emails(&mut person).await?;
//! ```
//!
//! ## Conventions
//!
//! Every repository implements the same contract: guarded `insert`/`update`,
//! soft `soft_delete` (sets `is_active = 0`, never a hard DELETE), `exists`,
//! `list`, `get_by_id`, entity-specific filtered lookups, and `load_*`
//! methods that fill navigation collections with a secondary query. All read
//! paths exclude soft-deleted rows on the primary table and on every joined
//! table.

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod retry;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};
pub use retry::RetryPolicy;

// Repository re-exports for convenience
pub use repository::activity::ActivityRepository;
pub use repository::address::AddressRepository;
pub use repository::call::CallRepository;
pub use repository::company::CompanyRepository;
pub use repository::email::EmailRepository;
pub use repository::payment::PaymentRepository;
pub use repository::person::PersonRepository;
pub use repository::phone::PhoneRepository;
pub use repository::quote::QuoteRepository;
pub use repository::sales_order::SalesOrderRepository;
