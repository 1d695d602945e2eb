//! # Repository Module
//!
//! Database repository implementations for Atlas CRM.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern Explained                         │
//! │                                                                         │
//! │  The Repository pattern abstracts database access behind a clean API.  │
//! │                                                                         │
//! │  Caller                                                                │
//! │       │                                                                 │
//! │       │  db.companies().search_by_name("acme", 20)                     │
//! │       ▼                                                                 │
//! │  CompanyRepository                                                     │
//! │  ├── insert / update / soft_delete / exists / list / get_by_id         │
//! │  ├── search_by_name / get_by_industry                                  │
//! │  └── load_addresses / load_people                                      │
//! │       │                                                                 │
//! │       │  guard clauses → retry wrapper → parameterized SQL             │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! │                                                                         │
//! │  Benefits:                                                              │
//! │  • Clean separation of concerns                                        │
//! │  • SQL is isolated in one place per entity                             │
//! │  • The uniform contract is enforced by shared base helpers             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Soft Delete
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Soft Delete Lifecycle                                │
//! │                                                                         │
//! │  insert ──► row { is_active = 1 } ──► visible to every read            │
//! │                     │                                                   │
//! │            soft_delete(id)                                              │
//! │                     ▼                                                   │
//! │             row { is_active = 0 } ──► invisible to every read,         │
//! │                                       but history and FKs survive      │
//! │                                                                         │
//! │  There is NO hard DELETE anywhere in this crate.                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`company::CompanyRepository`] - Companies and their rollups
//! - [`person::PersonRepository`] - People and their contact card
//! - [`address::AddressRepository`] - Postal addresses
//! - [`phone::PhoneRepository`] / [`email::EmailRepository`] - Contact channels
//! - [`activity::ActivityRepository`] - Tasks, meetings, follow-ups
//! - [`call::CallRepository`] - Logged phone calls
//! - [`quote::QuoteRepository`] - Quotes and their line items
//! - [`sales_order::SalesOrderRepository`] - Orders, items, fulfilment
//! - [`payment::PaymentRepository`] - Payments against orders

pub(crate) mod base;

pub mod activity;
pub mod address;
pub mod call;
pub mod company;
pub mod email;
pub mod payment;
pub mod person;
pub mod phone;
pub mod quote;
pub mod sales_order;
