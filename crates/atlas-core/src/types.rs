//! # Domain Types
//!
//! Entity types for the Atlas CRM schema.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Entity Model                                    │
//! │                                                                         │
//! │  ┌───────────┐ 1    * ┌───────────┐ 1    * ┌──────────┬──────┬───────┐ │
//! │  │  Company  │────────│  Person   │────────│ Address  │Phone │ Email │ │
//! │  └─────┬─────┘        └─────┬─────┘        └──────────┴──────┴───────┘ │
//! │        │                    │ 1                                        │
//! │        │ 1                  │    * ┌──────────┬──────┐                 │
//! │        │                    └──────│ Activity │ Call │                 │
//! │        │ *                         └──────────┴──────┘                 │
//! │  ┌─────┴─────┐ 1    * ┌───────────┐                                    │
//! │  │   Quote   │────────│ QuoteItem │                                    │
//! │  └─────┬─────┘        └───────────┘                                    │
//! │        │ 0..1                                                          │
//! │  ┌─────┴──────┐ 1   * ┌───────────┐  1   * ┌─────────┐                 │
//! │  │ SalesOrder │───────│ OrderItem │────────│ Payment │ (on the order)  │
//! │  └────────────┘       └───────────┘        └─────────┘                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Conventions
//! Every entity has:
//! - `id`: UUID v4 stored as TEXT - immutable, used for relations
//! - `is_active`: soft-delete flag - rows are never physically removed
//! - `created_at` / `updated_at`: audit timestamps in UTC
//!
//! Navigation collections (`Person::phones`, `Quote::items`, ...) are NOT
//! mapped from rows; they start empty and are filled by the repository
//! `load_*` methods with a secondary query.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::money::Money;

// =============================================================================
// Company
// =============================================================================

/// An organization we sell to.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Company {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Legal or trading name.
    pub name: String,

    /// Free-form industry label ("Manufacturing", "Healthcare", ...).
    pub industry: Option<String>,

    /// Company website URL.
    pub website: Option<String>,

    /// Main switchboard number.
    pub phone: Option<String>,

    /// Free-text notes.
    pub notes: Option<String>,

    /// Whether the company is active (soft delete).
    pub is_active: bool,

    /// When the row was created.
    pub created_at: DateTime<Utc>,

    /// When the row was last updated.
    pub updated_at: DateTime<Utc>,

    /// Addresses on file; filled by `CompanyRepository::load_addresses`.
    #[serde(default)]
    #[cfg_attr(feature = "sqlx", sqlx(skip))]
    pub addresses: Vec<Address>,

    /// People working here; filled by `CompanyRepository::load_people`.
    #[serde(default)]
    #[cfg_attr(feature = "sqlx", sqlx(skip))]
    pub people: Vec<Person>,
}

// =============================================================================
// Person
// =============================================================================

/// A contact person, usually attached to a company.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Person {
    pub id: String,

    /// Employer, if known.
    pub company_id: Option<String>,

    pub first_name: String,
    pub last_name: String,

    /// Job title ("VP Operations").
    pub title: Option<String>,

    pub department: Option<String>,

    pub notes: Option<String>,

    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,

    /// Filled by `PersonRepository::load_addresses`.
    #[serde(default)]
    #[cfg_attr(feature = "sqlx", sqlx(skip))]
    pub addresses: Vec<Address>,

    /// Filled by `PersonRepository::load_phones`.
    #[serde(default)]
    #[cfg_attr(feature = "sqlx", sqlx(skip))]
    pub phones: Vec<Phone>,

    /// Filled by `PersonRepository::load_emails`.
    #[serde(default)]
    #[cfg_attr(feature = "sqlx", sqlx(skip))]
    pub emails: Vec<Email>,

    /// Filled by `PersonRepository::load_activities`.
    #[serde(default)]
    #[cfg_attr(feature = "sqlx", sqlx(skip))]
    pub activities: Vec<Activity>,

    /// Filled by `PersonRepository::load_calls`.
    #[serde(default)]
    #[cfg_attr(feature = "sqlx", sqlx(skip))]
    pub calls: Vec<Call>,
}

impl Person {
    /// Display name in "First Last" form.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

// =============================================================================
// Address
// =============================================================================

/// What an address is used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum AddressKind {
    Billing,
    Shipping,
    Office,
    Home,
}

/// A postal address, attached to a person or a company (or both).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Address {
    pub id: String,

    /// Owning person, if this is a personal address.
    pub person_id: Option<String>,

    /// Owning company, if this is a company address.
    pub company_id: Option<String>,

    pub kind: AddressKind,

    pub street1: String,
    pub street2: Option<String>,
    pub city: String,

    /// State/province/county.
    pub region: Option<String>,

    pub postal_code: Option<String>,

    /// ISO 3166 alpha-2 country code.
    pub country: String,

    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Contact Channels
// =============================================================================

/// A phone number belonging to a person.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Phone {
    pub id: String,
    pub person_id: String,

    /// Digits as entered; no canonical formatting is applied.
    pub number: String,

    /// Freeform label ("mobile", "desk").
    pub label: Option<String>,

    /// At most one active phone per person should be primary.
    pub is_primary: bool,

    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// An email address belonging to a person.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Email {
    pub id: String,
    pub person_id: String,

    pub address: String,

    /// Freeform label ("work", "personal").
    pub label: Option<String>,

    /// At most one active email per person should be primary.
    pub is_primary: bool,

    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Activity
// =============================================================================

/// What kind of follow-up an activity is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    Task,
    Meeting,
    FollowUp,
    Demo,
}

/// Lifecycle of an activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum ActivityStatus {
    /// Not yet done.
    Open,
    /// Done; `completed_at` is set.
    Completed,
    /// Abandoned without being done.
    Canceled,
}

impl Default for ActivityStatus {
    fn default() -> Self {
        ActivityStatus::Open
    }
}

/// A scheduled or completed piece of work against a contact.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Activity {
    pub id: String,

    /// The person this activity is about. Company-level views join through
    /// the person.
    pub person_id: String,

    pub kind: ActivityKind,
    pub status: ActivityStatus,

    /// Short summary line.
    pub subject: String,

    pub detail: Option<String>,

    /// When the activity is due, if scheduled.
    pub due_at: Option<DateTime<Utc>>,

    /// Set when the activity transitions to `Completed`.
    pub completed_at: Option<DateTime<Utc>>,

    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Activity {
    /// True while the activity still needs attention.
    #[inline]
    pub fn is_open(&self) -> bool {
        self.status == ActivityStatus::Open
    }
}

// =============================================================================
// Call
// =============================================================================

/// Who initiated the call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum CallDirection {
    Inbound,
    Outbound,
}

/// How the call ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum CallOutcome {
    Connected,
    Voicemail,
    NoAnswer,
}

/// A logged phone call with a person.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Call {
    pub id: String,
    pub person_id: String,

    pub direction: CallDirection,
    pub outcome: CallOutcome,

    pub subject: Option<String>,
    pub notes: Option<String>,

    /// When the call started.
    pub started_at: DateTime<Utc>,

    /// Call length in seconds; zero for unanswered calls.
    pub duration_secs: i64,

    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Quote
// =============================================================================

/// Lifecycle of a quote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum QuoteStatus {
    /// Being assembled; items may still change.
    Draft,
    /// Sent to the customer; awaiting a decision.
    Sent,
    /// Customer accepted; eligible to become an order.
    Accepted,
    /// Customer declined.
    Rejected,
    /// Lapsed past its expiry date.
    Expired,
}

impl Default for QuoteStatus {
    fn default() -> Self {
        QuoteStatus::Draft
    }
}

/// A priced offer to a company.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Quote {
    pub id: String,
    pub company_id: String,

    /// Contact person the quote was addressed to, if any.
    pub person_id: Option<String>,

    /// Human-readable business identifier ("Q-20260312-0041").
    pub quote_number: String,

    pub status: QuoteStatus,

    /// Sum of line totals before discount.
    pub subtotal_cents: i64,
    /// Whole-quote discount.
    pub discount_cents: i64,
    /// `subtotal - discount`.
    pub total_cents: i64,

    pub issued_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,

    pub notes: Option<String>,

    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,

    /// Filled by `QuoteRepository::load_items`.
    #[serde(default)]
    #[cfg_attr(feature = "sqlx", sqlx(skip))]
    pub items: Vec<QuoteItem>,
}

impl Quote {
    /// Returns the subtotal as Money.
    #[inline]
    pub fn subtotal(&self) -> Money {
        Money::from_cents(self.subtotal_cents)
    }

    /// Returns the quote total as Money.
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }
}

/// A line on a quote.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct QuoteItem {
    pub id: String,
    pub quote_id: String,

    /// What is being offered; free text, there is no product catalog here.
    pub description: String,

    pub unit_price_cents: i64,
    pub quantity: i64,

    /// `unit_price × quantity`.
    pub line_total_cents: i64,

    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl QuoteItem {
    /// Returns the unit price as Money.
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }

    /// Returns the line total as Money.
    #[inline]
    pub fn line_total(&self) -> Money {
        Money::from_cents(self.line_total_cents)
    }

    /// Computes the expected line total from unit price and quantity.
    pub fn compute_line_total(unit_price_cents: i64, quantity: i64) -> i64 {
        Money::from_cents(unit_price_cents)
            .multiply_quantity(quantity)
            .cents()
    }
}

// =============================================================================
// Sales Order
// =============================================================================

/// Lifecycle of a sales order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Captured but not yet confirmed.
    Pending,
    /// Confirmed; goods/services committed.
    Confirmed,
    /// Delivered in full; `fulfilled_at` is set.
    Fulfilled,
    /// Canceled before fulfilment.
    Canceled,
}

impl Default for OrderStatus {
    fn default() -> Self {
        OrderStatus::Pending
    }
}

/// A confirmed (or in-flight) order, optionally originating from a quote.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct SalesOrder {
    pub id: String,
    pub company_id: String,

    /// The accepted quote this order was created from, if any.
    pub quote_id: Option<String>,

    /// Human-readable business identifier ("SO-20260312-0007").
    pub order_number: String,

    pub status: OrderStatus,

    pub subtotal_cents: i64,
    pub discount_cents: i64,
    pub total_cents: i64,

    pub ordered_at: DateTime<Utc>,
    pub fulfilled_at: Option<DateTime<Utc>>,

    pub notes: Option<String>,

    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,

    /// Filled by `SalesOrderRepository::load_items`.
    #[serde(default)]
    #[cfg_attr(feature = "sqlx", sqlx(skip))]
    pub items: Vec<OrderItem>,

    /// Filled by `SalesOrderRepository::load_payments`.
    #[serde(default)]
    #[cfg_attr(feature = "sqlx", sqlx(skip))]
    pub payments: Vec<Payment>,
}

impl SalesOrder {
    /// Returns the order total as Money.
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }

    /// Sum of payments already loaded onto this order.
    pub fn paid(&self) -> Money {
        self.payments.iter().map(Payment::amount).sum()
    }

    /// Remaining balance given the loaded payments.
    pub fn balance(&self) -> Money {
        self.total() - self.paid()
    }
}

/// A line on a sales order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct OrderItem {
    pub id: String,
    pub order_id: String,

    pub description: String,

    pub unit_price_cents: i64,
    pub quantity: i64,
    pub line_total_cents: i64,

    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl OrderItem {
    /// Returns the line total as Money.
    #[inline]
    pub fn line_total(&self) -> Money {
        Money::from_cents(self.line_total_cents)
    }
}

// =============================================================================
// Payment
// =============================================================================

/// How a payment was made.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    Card,
    BankTransfer,
    Check,
}

/// A payment received against a sales order.
/// An order can have multiple payments (deposits, installments).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Payment {
    pub id: String,
    pub order_id: String,

    pub method: PaymentMethod,

    /// Amount received in cents.
    pub amount_cents: i64,

    /// External reference (bank transaction id, check number).
    pub reference: Option<String>,

    pub received_at: DateTime<Utc>,

    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Payment {
    /// Returns the payment amount as Money.
    #[inline]
    pub fn amount(&self) -> Money {
        Money::from_cents(self.amount_cents)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn person(first: &str, last: &str) -> Person {
        let now = Utc::now();
        Person {
            id: uuid::Uuid::new_v4().to_string(),
            company_id: None,
            first_name: first.to_string(),
            last_name: last.to_string(),
            title: None,
            department: None,
            notes: None,
            is_active: true,
            created_at: now,
            updated_at: now,
            addresses: Vec::new(),
            phones: Vec::new(),
            emails: Vec::new(),
            activities: Vec::new(),
            calls: Vec::new(),
        }
    }

    #[test]
    fn test_full_name() {
        assert_eq!(person("Ada", "Lovelace").full_name(), "Ada Lovelace");
    }

    #[test]
    fn test_status_defaults() {
        assert_eq!(ActivityStatus::default(), ActivityStatus::Open);
        assert_eq!(QuoteStatus::default(), QuoteStatus::Draft);
        assert_eq!(OrderStatus::default(), OrderStatus::Pending);
    }

    #[test]
    fn test_compute_line_total() {
        assert_eq!(QuoteItem::compute_line_total(250, 4), 1000);
        assert_eq!(QuoteItem::compute_line_total(999, 0), 0);
    }

    #[test]
    fn test_order_balance() {
        let now = Utc::now();
        let mut order = SalesOrder {
            id: uuid::Uuid::new_v4().to_string(),
            company_id: uuid::Uuid::new_v4().to_string(),
            quote_id: None,
            order_number: "SO-TEST-0001".to_string(),
            status: OrderStatus::Confirmed,
            subtotal_cents: 10_000,
            discount_cents: 0,
            total_cents: 10_000,
            ordered_at: now,
            fulfilled_at: None,
            notes: None,
            is_active: true,
            created_at: now,
            updated_at: now,
            items: Vec::new(),
            payments: Vec::new(),
        };
        assert_eq!(order.balance().cents(), 10_000);

        order.payments.push(Payment {
            id: uuid::Uuid::new_v4().to_string(),
            order_id: order.id.clone(),
            method: PaymentMethod::BankTransfer,
            amount_cents: 4_000,
            reference: None,
            received_at: now,
            is_active: true,
            created_at: now,
            updated_at: now,
        });
        assert_eq!(order.paid().cents(), 4_000);
        assert_eq!(order.balance().cents(), 6_000);
    }

    #[test]
    fn test_enum_serde_names() {
        assert_eq!(
            serde_json::to_string(&PaymentMethod::BankTransfer).unwrap(),
            "\"bank_transfer\""
        );
        assert_eq!(
            serde_json::to_string(&ActivityKind::FollowUp).unwrap(),
            "\"follow_up\""
        );
        assert_eq!(
            serde_json::to_string(&CallOutcome::NoAnswer).unwrap(),
            "\"no_answer\""
        );
    }
}
