//! Integration tests for the activity/call log and the quote → order →
//! payment pipeline: guarded status transitions, date-range filters, and
//! aggregate loads.

mod common;

use chrono::{Duration, Utc};

use atlas_core::{CallDirection, OrderStatus, QuoteStatus};
use atlas_db::DbError;
use common::*;

// =============================================================================
// Activities
// =============================================================================

#[tokio::test]
async fn activity_company_rollup_joins_both_sides_active() {
    let db = test_db().await;

    let acme = company("Acme Corp");
    db.companies().insert(&acme).await.unwrap();
    let ada = person(Some(&acme.id), "Ada", "Lovelace");
    let grace = person(Some(&acme.id), "Grace", "Hopper");
    db.people().insert(&ada).await.unwrap();
    db.people().insert(&grace).await.unwrap();

    db.activities()
        .insert(&activity(&ada.id, "Renewal call"))
        .await
        .unwrap();
    db.activities()
        .insert(&activity(&grace.id, "Send proposal"))
        .await
        .unwrap();

    assert_eq!(db.activities().get_by_company(&acme.id).await.unwrap().len(), 2);

    // Deactivating the person removes their activities from the rollup even
    // though the activity rows themselves stay active.
    db.people().soft_delete(&grace.id).await.unwrap();
    let rollup = db.activities().get_by_company(&acme.id).await.unwrap();
    assert_eq!(rollup.len(), 1);
    assert_eq!(rollup[0].subject, "Renewal call");
}

#[tokio::test]
async fn activity_complete_is_a_guarded_transition() {
    let db = test_db().await;

    let ada = person(None, "Ada", "Lovelace");
    db.people().insert(&ada).await.unwrap();
    let task = activity(&ada.id, "Prepare demo");
    db.activities().insert(&task).await.unwrap();

    assert_eq!(db.activities().get_open().await.unwrap().len(), 1);

    db.activities().complete(&task.id).await.unwrap();

    let done = db.activities().get_by_id(&task.id).await.unwrap().unwrap();
    assert!(!done.is_open());
    assert!(done.completed_at.is_some());
    assert!(db.activities().get_open().await.unwrap().is_empty());

    // Completing twice fails: the row is no longer open.
    assert!(matches!(
        db.activities().complete(&task.id).await,
        Err(DbError::NotFound { .. })
    ));
    // Same for canceling a completed activity.
    assert!(matches!(
        db.activities().cancel(&task.id).await,
        Err(DbError::NotFound { .. })
    ));
}

#[tokio::test]
async fn activity_due_range_is_half_open() {
    let db = test_db().await;

    let ada = person(None, "Ada", "Lovelace");
    db.people().insert(&ada).await.unwrap();

    let now = Utc::now();
    let mut soon = activity(&ada.id, "Due soon");
    soon.due_at = Some(now + Duration::days(1));
    let mut later = activity(&ada.id, "Due later");
    later.due_at = Some(now + Duration::days(10));
    let unscheduled = activity(&ada.id, "No due date");

    db.activities().insert(&soon).await.unwrap();
    db.activities().insert(&later).await.unwrap();
    db.activities().insert(&unscheduled).await.unwrap();

    let week = db
        .activities()
        .get_due_between(now, now + Duration::days(7))
        .await
        .unwrap();
    assert_eq!(week.len(), 1);
    assert_eq!(week[0].subject, "Due soon");

    // Inverted ranges are rejected before any SQL runs.
    assert!(matches!(
        db.activities()
            .get_due_between(now + Duration::days(7), now)
            .await,
        Err(DbError::Validation(_))
    ));
}

// =============================================================================
// Calls
// =============================================================================

#[tokio::test]
async fn call_filters_by_direction_and_range() {
    let db = test_db().await;

    let ada = person(None, "Ada", "Lovelace");
    db.people().insert(&ada).await.unwrap();

    let now = Utc::now();
    let mut inbound = call(&ada.id);
    inbound.direction = CallDirection::Inbound;
    inbound.started_at = now - Duration::days(2);
    let mut outbound = call(&ada.id);
    outbound.started_at = now - Duration::days(20);

    db.calls().insert(&inbound).await.unwrap();
    db.calls().insert(&outbound).await.unwrap();

    let inbound_calls = db.calls().get_by_direction(CallDirection::Inbound).await.unwrap();
    assert_eq!(inbound_calls.len(), 1);
    assert_eq!(inbound_calls[0].id, inbound.id);

    let this_week = db
        .calls()
        .get_between(now - Duration::days(7), now)
        .await
        .unwrap();
    assert_eq!(this_week.len(), 1);
    assert_eq!(this_week[0].id, inbound.id);

    assert_eq!(db.calls().get_by_person(&ada.id).await.unwrap().len(), 2);
}

// =============================================================================
// Quotes
// =============================================================================

#[tokio::test]
async fn quote_lifecycle_draft_to_accepted() {
    let db = test_db().await;

    let acme = company("Acme Corp");
    db.companies().insert(&acme).await.unwrap();
    let mut q = quote(&acme.id, "Q-20260806-0001");
    db.quotes().insert(&q).await.unwrap();

    db.quotes()
        .add_item(&quote_item(&q.id, "Annual support contract", 50_000, 2))
        .await
        .unwrap();
    db.quotes()
        .add_item(&quote_item(&q.id, "On-site training day", 80_000, 1))
        .await
        .unwrap();

    db.quotes()
        .update_totals(&q.id, 180_000, 18_000, 162_000)
        .await
        .unwrap();

    db.quotes().mark_sent(&q.id).await.unwrap();
    db.quotes().mark_accepted(&q.id).await.unwrap();

    db.quotes().load_items(&mut q).await.unwrap();
    assert_eq!(q.items.len(), 2);
    assert_eq!(q.items[0].line_total_cents, 100_000);

    let accepted = db.quotes().get_by_id(&q.id).await.unwrap().unwrap();
    assert_eq!(accepted.status, QuoteStatus::Accepted);
    assert_eq!(accepted.total().cents(), 162_000);

    let by_status = db.quotes().get_by_status(QuoteStatus::Accepted).await.unwrap();
    assert_eq!(by_status.len(), 1);
    assert_eq!(db.quotes().get_by_company(&acme.id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn quote_transitions_enforce_prior_status() {
    let db = test_db().await;

    let acme = company("Acme Corp");
    db.companies().insert(&acme).await.unwrap();
    let q = quote(&acme.id, "Q-20260806-0002");
    db.quotes().insert(&q).await.unwrap();

    // Draft cannot be accepted without being sent first.
    assert!(matches!(
        db.quotes().mark_accepted(&q.id).await,
        Err(DbError::NotFound { .. })
    ));

    db.quotes().mark_sent(&q.id).await.unwrap();

    // Totals are frozen once the quote leaves draft.
    assert!(matches!(
        db.quotes().update_totals(&q.id, 1, 0, 1).await,
        Err(DbError::NotFound { .. })
    ));

    db.quotes().mark_rejected(&q.id).await.unwrap();
    assert!(matches!(
        db.quotes().mark_accepted(&q.id).await,
        Err(DbError::NotFound { .. })
    ));
}

#[tokio::test]
async fn quote_number_must_be_unique() {
    let db = test_db().await;

    let acme = company("Acme Corp");
    db.companies().insert(&acme).await.unwrap();

    db.quotes()
        .insert(&quote(&acme.id, "Q-20260806-0003"))
        .await
        .unwrap();
    let duplicate = db.quotes().insert(&quote(&acme.id, "Q-20260806-0003")).await;
    assert!(matches!(duplicate, Err(DbError::UniqueViolation { .. })));
}

#[tokio::test]
async fn quote_item_removal_is_soft() {
    let db = test_db().await;

    let acme = company("Acme Corp");
    db.companies().insert(&acme).await.unwrap();
    let mut q = quote(&acme.id, "Q-20260806-0004");
    db.quotes().insert(&q).await.unwrap();

    let keep = quote_item(&q.id, "Premium license seat", 12_000, 3);
    let removed = quote_item(&q.id, "Data migration package", 40_000, 1);
    db.quotes().add_item(&keep).await.unwrap();
    db.quotes().add_item(&removed).await.unwrap();

    assert!(db.quotes().remove_item(&removed.id).await.unwrap());

    db.quotes().load_items(&mut q).await.unwrap();
    assert_eq!(q.items.len(), 1);
    assert_eq!(q.items[0].id, keep.id);
}

#[tokio::test]
async fn quote_issued_range_filter() {
    let db = test_db().await;

    let acme = company("Acme Corp");
    db.companies().insert(&acme).await.unwrap();

    let now = Utc::now();
    let mut recent = quote(&acme.id, "Q-20260806-0005");
    recent.issued_at = now - Duration::days(3);
    let mut old = quote(&acme.id, "Q-20260806-0006");
    old.issued_at = now - Duration::days(90);
    db.quotes().insert(&recent).await.unwrap();
    db.quotes().insert(&old).await.unwrap();

    let this_month = db
        .quotes()
        .get_issued_between(now - Duration::days(30), now)
        .await
        .unwrap();
    assert_eq!(this_month.len(), 1);
    assert_eq!(this_month[0].id, recent.id);
}

// =============================================================================
// Sales orders & payments
// =============================================================================

#[tokio::test]
async fn order_pipeline_confirm_fulfill() {
    let db = test_db().await;

    let acme = company("Acme Corp");
    db.companies().insert(&acme).await.unwrap();
    let q = quote(&acme.id, "Q-20260806-0007");
    db.quotes().insert(&q).await.unwrap();
    db.quotes().mark_sent(&q.id).await.unwrap();
    db.quotes().mark_accepted(&q.id).await.unwrap();

    let mut order = sales_order(&acme.id, Some(&q.id), "SO-20260806-0001");
    db.sales_orders().insert(&order).await.unwrap();
    db.sales_orders()
        .add_item(&order_item(&order.id, "Annual support contract", 5_000, 2))
        .await
        .unwrap();

    db.sales_orders().confirm(&order.id).await.unwrap();
    db.sales_orders().fulfill(&order.id).await.unwrap();

    let fulfilled = db.sales_orders().get_by_id(&order.id).await.unwrap().unwrap();
    assert_eq!(fulfilled.status, OrderStatus::Fulfilled);
    assert!(fulfilled.fulfilled_at.is_some());

    // A fulfilled order cannot be canceled.
    assert!(matches!(
        db.sales_orders().cancel(&order.id).await,
        Err(DbError::NotFound { .. })
    ));

    db.sales_orders().load_items(&mut order).await.unwrap();
    assert_eq!(order.items.len(), 1);

    let from_quote = db.sales_orders().get_by_quote(&q.id).await.unwrap();
    assert_eq!(from_quote.len(), 1);
    assert_eq!(from_quote[0].id, order.id);

    let fulfilled_orders = db
        .sales_orders()
        .get_by_status(OrderStatus::Fulfilled)
        .await
        .unwrap();
    assert_eq!(fulfilled_orders.len(), 1);
}

#[tokio::test]
async fn order_totals_only_change_while_pending() {
    let db = test_db().await;

    let acme = company("Acme Corp");
    db.companies().insert(&acme).await.unwrap();
    let order = sales_order(&acme.id, None, "SO-20260806-0002");
    db.sales_orders().insert(&order).await.unwrap();

    db.sales_orders()
        .update_totals(&order.id, 20_000, 2_000, 18_000)
        .await
        .unwrap();

    db.sales_orders().confirm(&order.id).await.unwrap();
    assert!(matches!(
        db.sales_orders().update_totals(&order.id, 1, 0, 1).await,
        Err(DbError::NotFound { .. })
    ));

    let confirmed = db.sales_orders().get_by_id(&order.id).await.unwrap().unwrap();
    assert_eq!(confirmed.total_cents, 18_000);
}

#[tokio::test]
async fn payments_accumulate_against_an_order() {
    let db = test_db().await;

    let acme = company("Acme Corp");
    db.companies().insert(&acme).await.unwrap();
    let mut order = sales_order(&acme.id, None, "SO-20260806-0003");
    db.sales_orders().insert(&order).await.unwrap();
    db.sales_orders().confirm(&order.id).await.unwrap();

    db.payments().insert(&payment(&order.id, 4_000)).await.unwrap();
    let second = payment(&order.id, 6_000);
    db.payments().insert(&second).await.unwrap();

    assert_eq!(
        db.payments().total_received_for_order(&order.id).await.unwrap(),
        10_000
    );

    db.sales_orders().load_payments(&mut order).await.unwrap();
    assert_eq!(order.payments.len(), 2);
    assert_eq!(order.paid().cents(), 10_000);
    assert_eq!(order.balance().cents(), 0);

    // Reversing a payment takes it out of the total but keeps the row.
    db.payments().soft_delete(&second.id).await.unwrap();
    assert_eq!(
        db.payments().total_received_for_order(&order.id).await.unwrap(),
        4_000
    );
    assert_eq!(db.payments().get_by_order(&order.id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn payment_amount_must_be_positive() {
    let db = test_db().await;

    let acme = company("Acme Corp");
    db.companies().insert(&acme).await.unwrap();
    let order = sales_order(&acme.id, None, "SO-20260806-0004");
    db.sales_orders().insert(&order).await.unwrap();

    assert!(matches!(
        db.payments().insert(&payment(&order.id, 0)).await,
        Err(DbError::Validation(_))
    ));
    assert!(matches!(
        db.payments().insert(&payment(&order.id, -500)).await,
        Err(DbError::Validation(_))
    ));
}

#[tokio::test]
async fn payment_received_range_filter() {
    let db = test_db().await;

    let acme = company("Acme Corp");
    db.companies().insert(&acme).await.unwrap();
    let order = sales_order(&acme.id, None, "SO-20260806-0005");
    db.sales_orders().insert(&order).await.unwrap();

    let now = Utc::now();
    let mut recent = payment(&order.id, 1_000);
    recent.received_at = now - Duration::days(1);
    let mut old = payment(&order.id, 2_000);
    old.received_at = now - Duration::days(60);
    db.payments().insert(&recent).await.unwrap();
    db.payments().insert(&old).await.unwrap();

    let this_month = db
        .payments()
        .get_received_between(now - Duration::days(30), now)
        .await
        .unwrap();
    assert_eq!(this_month.len(), 1);
    assert_eq!(this_month[0].id, recent.id);
}

// =============================================================================
// Foreign keys
// =============================================================================

#[tokio::test]
async fn foreign_keys_are_enforced() {
    let db = test_db().await;

    // Payment against an order id that was never inserted.
    let result = db.payments().insert(&payment(&new_id(), 1_000)).await;
    assert!(matches!(result, Err(DbError::ForeignKeyViolation { .. })));
}
