//! # Seed Data Generator
//!
//! Populates the database with demo CRM data for development.
//!
//! ## Usage
//! ```bash
//! # Generate 50 companies (default)
//! cargo run -p atlas-db --bin seed
//!
//! # Generate custom amount
//! cargo run -p atlas-db --bin seed -- --count 200
//!
//! # Specify database path
//! cargo run -p atlas-db --bin seed -- --db ./data/atlas.db
//! ```
//!
//! ## Generated Data
//! For each company: one to three people with phones and emails, an open
//! activity and a logged call per person. Every third company gets a quote
//! with two lines; every sixth gets the full pipeline: quote accepted,
//! order confirmed, deposit payment recorded.
//!
//! All values are derived deterministically from the row index, so repeated
//! runs against fresh databases produce identical datasets.

use std::env;

use chrono::{Duration, Utc};

use atlas_core::{
    Activity, ActivityKind, ActivityStatus, Call, CallDirection, CallOutcome, Company, Email,
    OrderItem, OrderStatus, Payment, PaymentMethod, Person, Phone, Quote, QuoteItem, QuoteStatus,
    SalesOrder,
};
use atlas_db::repository::activity::generate_activity_id;
use atlas_db::repository::call::generate_call_id;
use atlas_db::repository::company::generate_company_id;
use atlas_db::repository::email::generate_email_id;
use atlas_db::repository::payment::generate_payment_id;
use atlas_db::repository::person::generate_person_id;
use atlas_db::repository::phone::generate_phone_id;
use atlas_db::repository::quote::{generate_quote_id, generate_quote_item_id};
use atlas_db::repository::sales_order::{generate_order_id, generate_order_item_id};
use atlas_db::{Database, DbConfig};

/// Company name fragments for realistic test data
const NAME_STEMS: &[&str] = &[
    "Initech", "Northwind", "Vandelay", "Acme", "Globex", "Stark", "Wayne", "Hooli", "Umbrella",
    "Aperture", "Cyberdyne", "Wonka", "Tyrell", "Soylent", "Oscorp",
];

const NAME_SUFFIXES: &[&str] = &["Ltd", "GmbH", "Inc", "Partners", "Group", "Holdings"];

const INDUSTRIES: &[&str] = &[
    "Manufacturing",
    "Healthcare",
    "Logistics",
    "Finance",
    "Retail",
    "Software",
];

const FIRST_NAMES: &[&str] = &[
    "Ada", "Grace", "Alan", "Edsger", "Barbara", "Donald", "Margaret", "John", "Radia", "Dennis",
];

const LAST_NAMES: &[&str] = &[
    "Lovelace", "Hopper", "Turing", "Dijkstra", "Liskov", "Knuth", "Hamilton", "Backus",
    "Perlman", "Ritchie",
];

const TITLES: &[&str] = &[
    "CEO",
    "VP Operations",
    "Head of Procurement",
    "IT Manager",
    "Office Manager",
];

const LINE_DESCRIPTIONS: &[&str] = &[
    "Annual support contract",
    "On-site training day",
    "Implementation services",
    "Premium license seat",
    "Data migration package",
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    // Parse command line arguments
    let args: Vec<String> = env::args().collect();

    let mut count: usize = 50;
    let mut db_path = String::from("./atlas_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--count" | "-c" => {
                if i + 1 < args.len() {
                    count = args[i + 1].parse().unwrap_or(50);
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Atlas CRM Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --count <N>    Number of companies to generate (default: 50)");
                println!("  -d, --db <PATH>    Database file path (default: ./atlas_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Atlas CRM Seed Data Generator");
    println!("================================");
    println!("Database:  {}", db_path);
    println!("Companies: {}", count);
    println!();

    // Connect to database
    let config = DbConfig::new(&db_path);
    let db = Database::new(config).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    // Check existing data
    let existing = db.companies().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} companies", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    println!();
    println!("Generating companies...");

    let start = std::time::Instant::now();
    let mut first_company_id = None;

    for idx in 0..count {
        let company = generate_company(idx);
        if first_company_id.is_none() {
            first_company_id = Some(company.id.clone());
        }
        db.companies().insert(&company).await?;

        let people_count = 1 + idx % 3;
        for p in 0..people_count {
            let person = generate_person(&company.id, idx, p);
            db.people().insert(&person).await?;

            db.phones().insert(&generate_phone(&person.id, idx, p)).await?;
            db.emails().insert(&generate_email(&person, idx, p)).await?;
            db.activities()
                .insert(&generate_activity(&person.id, idx, p))
                .await?;
            db.calls().insert(&generate_call(&person.id, idx, p)).await?;
        }

        // Every third company gets a quote; every sixth the full pipeline.
        if idx % 3 == 0 {
            let quote = seed_quote(&db, &company.id, idx).await?;
            if idx % 6 == 0 {
                seed_order(&db, &company.id, &quote, idx).await?;
            }
        }

        if (idx + 1) % 10 == 0 {
            println!("  Generated {} companies...", idx + 1);
        }
    }

    let elapsed = start.elapsed();
    println!();
    println!("✓ Generated {} companies in {:?}", count, elapsed);
    println!("  People:   {}", db.people().count().await?);
    println!("  Quotes:   {}", db.quotes().count().await?);
    println!("  Orders:   {}", db.sales_orders().count().await?);
    println!("  Payments: {}", db.payments().count().await?);

    // Show one assembled aggregate as a smoke check
    if let Some(id) = first_company_id {
        if let Some(mut company) = db.companies().get_by_id(&id).await? {
            db.companies().load_people(&mut company).await?;

            println!();
            println!("Sample aggregate:");
            println!("{}", serde_json::to_string_pretty(&company)?);
        }
    }

    println!();
    println!("✓ Seed complete!");

    Ok(())
}

fn generate_company(idx: usize) -> Company {
    let now = Utc::now();
    let stem = NAME_STEMS[idx % NAME_STEMS.len()];
    let suffix = NAME_SUFFIXES[(idx / NAME_STEMS.len()) % NAME_SUFFIXES.len()];

    Company {
        id: generate_company_id(),
        name: format!("{} {} {:03}", stem, suffix, idx),
        industry: Some(INDUSTRIES[idx % INDUSTRIES.len()].to_string()),
        website: Some(format!(
            "https://www.{}{:03}.example.com",
            stem.to_lowercase(),
            idx
        )),
        phone: Some(format!("+1 (555) {:03}-{:04}", 100 + idx % 900, idx % 10_000)),
        notes: None,
        is_active: true,
        created_at: now,
        updated_at: now,
        addresses: Vec::new(),
        people: Vec::new(),
    }
}

fn generate_person(company_id: &str, idx: usize, p: usize) -> Person {
    let now = Utc::now();
    let seed = idx * 7 + p;

    Person {
        id: generate_person_id(),
        company_id: Some(company_id.to_string()),
        first_name: FIRST_NAMES[seed % FIRST_NAMES.len()].to_string(),
        last_name: LAST_NAMES[(seed / 3) % LAST_NAMES.len()].to_string(),
        title: Some(TITLES[seed % TITLES.len()].to_string()),
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

fn generate_phone(person_id: &str, idx: usize, p: usize) -> Phone {
    let now = Utc::now();
    Phone {
        id: generate_phone_id(),
        person_id: person_id.to_string(),
        number: format!("+1 (555) {:03}-{:04}", 200 + idx % 700, (idx * 13 + p) % 10_000),
        label: Some("mobile".to_string()),
        is_primary: true,
        is_active: true,
        created_at: now,
        updated_at: now,
    }
}

fn generate_email(person: &Person, idx: usize, p: usize) -> Email {
    let now = Utc::now();
    Email {
        id: generate_email_id(),
        person_id: person.id.clone(),
        address: format!(
            "{}.{}{}@example.com",
            person.first_name.to_lowercase(),
            person.last_name.to_lowercase(),
            idx * 10 + p
        ),
        label: Some("work".to_string()),
        is_primary: true,
        is_active: true,
        created_at: now,
        updated_at: now,
    }
}

fn generate_activity(person_id: &str, idx: usize, p: usize) -> Activity {
    let now = Utc::now();
    let kinds = [
        ActivityKind::Task,
        ActivityKind::Meeting,
        ActivityKind::FollowUp,
        ActivityKind::Demo,
    ];

    Activity {
        id: generate_activity_id(),
        person_id: person_id.to_string(),
        kind: kinds[(idx + p) % kinds.len()],
        status: ActivityStatus::Open,
        subject: format!("Follow up on renewal #{}", idx),
        detail: None,
        due_at: Some(now + Duration::days(1 + (idx % 14) as i64)),
        completed_at: None,
        is_active: true,
        created_at: now,
        updated_at: now,
    }
}

fn generate_call(person_id: &str, idx: usize, p: usize) -> Call {
    let now = Utc::now();
    let outcomes = [
        CallOutcome::Connected,
        CallOutcome::Voicemail,
        CallOutcome::NoAnswer,
    ];

    Call {
        id: generate_call_id(),
        person_id: person_id.to_string(),
        direction: if (idx + p) % 2 == 0 {
            CallDirection::Outbound
        } else {
            CallDirection::Inbound
        },
        outcome: outcomes[(idx + p) % outcomes.len()],
        subject: Some("Intro call".to_string()),
        notes: None,
        started_at: now - Duration::days((idx % 30) as i64),
        duration_secs: ((idx * 37 + p * 11) % 900) as i64,
        is_active: true,
        created_at: now,
        updated_at: now,
    }
}

async fn seed_quote(
    db: &Database,
    company_id: &str,
    idx: usize,
) -> Result<Quote, Box<dyn std::error::Error>> {
    let now = Utc::now();
    let quote = Quote {
        id: generate_quote_id(),
        company_id: company_id.to_string(),
        person_id: None,
        // Index-derived so repeated inserts in one run can't collide.
        quote_number: format!("Q-{}-{:04}", now.format("%Y%m%d"), idx),
        status: QuoteStatus::Draft,
        subtotal_cents: 0,
        discount_cents: 0,
        total_cents: 0,
        issued_at: now,
        expires_at: Some(now + Duration::days(30)),
        notes: None,
        is_active: true,
        created_at: now,
        updated_at: now,
        items: Vec::new(),
    };
    db.quotes().insert(&quote).await?;

    let mut subtotal = 0i64;
    for line in 0..2 {
        let unit_price = 10_000 + ((idx * 31 + line * 17) % 90_000) as i64;
        let quantity = 1 + ((idx + line) % 5) as i64;
        let item = QuoteItem {
            id: generate_quote_item_id(),
            quote_id: quote.id.clone(),
            description: LINE_DESCRIPTIONS[(idx + line) % LINE_DESCRIPTIONS.len()].to_string(),
            unit_price_cents: unit_price,
            quantity,
            line_total_cents: QuoteItem::compute_line_total(unit_price, quantity),
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        subtotal += item.line_total_cents;
        db.quotes().add_item(&item).await?;
    }

    let discount = if idx % 2 == 0 { subtotal / 10 } else { 0 };
    db.quotes()
        .update_totals(&quote.id, subtotal, discount, subtotal - discount)
        .await?;
    db.quotes().mark_sent(&quote.id).await?;

    Ok(quote)
}

async fn seed_order(
    db: &Database,
    company_id: &str,
    quote: &Quote,
    idx: usize,
) -> Result<(), Box<dyn std::error::Error>> {
    db.quotes().mark_accepted(&quote.id).await?;

    let now = Utc::now();
    let Some(mut accepted) = db.quotes().get_by_id(&quote.id).await? else {
        return Ok(());
    };
    db.quotes().load_items(&mut accepted).await?;

    let order = SalesOrder {
        id: generate_order_id(),
        company_id: company_id.to_string(),
        quote_id: Some(accepted.id.clone()),
        order_number: format!("SO-{}-{:04}", now.format("%Y%m%d"), idx),
        status: OrderStatus::Pending,
        subtotal_cents: accepted.subtotal_cents,
        discount_cents: accepted.discount_cents,
        total_cents: accepted.total_cents,
        ordered_at: now,
        fulfilled_at: None,
        notes: None,
        is_active: true,
        created_at: now,
        updated_at: now,
        items: Vec::new(),
        payments: Vec::new(),
    };
    db.sales_orders().insert(&order).await?;

    for quote_item in &accepted.items {
        let item = OrderItem {
            id: generate_order_item_id(),
            order_id: order.id.clone(),
            description: quote_item.description.clone(),
            unit_price_cents: quote_item.unit_price_cents,
            quantity: quote_item.quantity,
            line_total_cents: quote_item.line_total_cents,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        db.sales_orders().add_item(&item).await?;
    }

    db.sales_orders().confirm(&order.id).await?;

    // Half the order value arrives as a deposit.
    let payment = Payment {
        id: generate_payment_id(),
        order_id: order.id.clone(),
        method: PaymentMethod::BankTransfer,
        amount_cents: (order.total_cents / 2).max(1),
        reference: Some(format!("WIRE-{:06}", idx)),
        received_at: now,
        is_active: true,
        created_at: now,
        updated_at: now,
    };
    db.payments().insert(&payment).await?;

    Ok(())
}
