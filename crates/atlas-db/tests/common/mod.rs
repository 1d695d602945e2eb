//! Shared helpers for atlas-db integration tests.
//!
//! Every test runs against its own in-memory database with migrations
//! applied, so tests are fully isolated and need no cleanup.

// Each test binary compiles this module separately and uses a subset.
#![allow(dead_code)]

use chrono::Utc;
use uuid::Uuid;

use atlas_core::{
    Activity, ActivityKind, ActivityStatus, Address, AddressKind, Call, CallDirection,
    CallOutcome, Company, Email, OrderItem, OrderStatus, Payment, PaymentMethod, Person, Phone,
    Quote, QuoteItem, QuoteStatus, SalesOrder,
};
use atlas_db::{Database, DbConfig};

/// Opens a fresh in-memory database with the schema applied.
pub async fn test_db() -> Database {
    // Ignore the error when a previous test already installed a subscriber.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_test_writer()
        .try_init();

    Database::new(DbConfig::in_memory())
        .await
        .expect("in-memory database")
}

pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

pub fn company(name: &str) -> Company {
    let now = Utc::now();
    Company {
        id: new_id(),
        name: name.to_string(),
        industry: Some("Software".to_string()),
        website: None,
        phone: None,
        notes: None,
        is_active: true,
        created_at: now,
        updated_at: now,
        addresses: Vec::new(),
        people: Vec::new(),
    }
}

pub fn person(company_id: Option<&str>, first: &str, last: &str) -> Person {
    let now = Utc::now();
    Person {
        id: new_id(),
        company_id: company_id.map(str::to_string),
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

pub fn address_for_person(person_id: &str) -> Address {
    let now = Utc::now();
    Address {
        id: new_id(),
        person_id: Some(person_id.to_string()),
        company_id: None,
        kind: AddressKind::Home,
        street1: "1 Example Way".to_string(),
        street2: None,
        city: "Springfield".to_string(),
        region: Some("IL".to_string()),
        postal_code: Some("62701".to_string()),
        country: "US".to_string(),
        is_active: true,
        created_at: now,
        updated_at: now,
    }
}

pub fn phone(person_id: &str, number: &str, primary: bool) -> Phone {
    let now = Utc::now();
    Phone {
        id: new_id(),
        person_id: person_id.to_string(),
        number: number.to_string(),
        label: Some("mobile".to_string()),
        is_primary: primary,
        is_active: true,
        created_at: now,
        updated_at: now,
    }
}

pub fn email(person_id: &str, addr: &str, primary: bool) -> Email {
    let now = Utc::now();
    Email {
        id: new_id(),
        person_id: person_id.to_string(),
        address: addr.to_string(),
        label: Some("work".to_string()),
        is_primary: primary,
        is_active: true,
        created_at: now,
        updated_at: now,
    }
}

pub fn activity(person_id: &str, subject: &str) -> Activity {
    let now = Utc::now();
    Activity {
        id: new_id(),
        person_id: person_id.to_string(),
        kind: ActivityKind::Task,
        status: ActivityStatus::Open,
        subject: subject.to_string(),
        detail: None,
        due_at: None,
        completed_at: None,
        is_active: true,
        created_at: now,
        updated_at: now,
    }
}

pub fn call(person_id: &str) -> Call {
    let now = Utc::now();
    Call {
        id: new_id(),
        person_id: person_id.to_string(),
        direction: CallDirection::Outbound,
        outcome: CallOutcome::Connected,
        subject: Some("Intro call".to_string()),
        notes: None,
        started_at: now,
        duration_secs: 300,
        is_active: true,
        created_at: now,
        updated_at: now,
    }
}

pub fn quote(company_id: &str, number: &str) -> Quote {
    let now = Utc::now();
    Quote {
        id: new_id(),
        company_id: company_id.to_string(),
        person_id: None,
        quote_number: number.to_string(),
        status: QuoteStatus::Draft,
        subtotal_cents: 0,
        discount_cents: 0,
        total_cents: 0,
        issued_at: now,
        expires_at: None,
        notes: None,
        is_active: true,
        created_at: now,
        updated_at: now,
        items: Vec::new(),
    }
}

pub fn quote_item(quote_id: &str, description: &str, unit_price: i64, qty: i64) -> QuoteItem {
    let now = Utc::now();
    QuoteItem {
        id: new_id(),
        quote_id: quote_id.to_string(),
        description: description.to_string(),
        unit_price_cents: unit_price,
        quantity: qty,
        line_total_cents: QuoteItem::compute_line_total(unit_price, qty),
        is_active: true,
        created_at: now,
        updated_at: now,
    }
}

pub fn sales_order(company_id: &str, quote_id: Option<&str>, number: &str) -> SalesOrder {
    let now = Utc::now();
    SalesOrder {
        id: new_id(),
        company_id: company_id.to_string(),
        quote_id: quote_id.map(str::to_string),
        order_number: number.to_string(),
        status: OrderStatus::Pending,
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
    }
}

pub fn order_item(order_id: &str, description: &str, unit_price: i64, qty: i64) -> OrderItem {
    let now = Utc::now();
    OrderItem {
        id: new_id(),
        order_id: order_id.to_string(),
        description: description.to_string(),
        unit_price_cents: unit_price,
        quantity: qty,
        line_total_cents: unit_price * qty,
        is_active: true,
        created_at: now,
        updated_at: now,
    }
}

pub fn payment(order_id: &str, amount_cents: i64) -> Payment {
    let now = Utc::now();
    Payment {
        id: new_id(),
        order_id: order_id.to_string(),
        method: PaymentMethod::BankTransfer,
        amount_cents,
        reference: None,
        received_at: now,
        is_active: true,
        created_at: now,
        updated_at: now,
    }
}
