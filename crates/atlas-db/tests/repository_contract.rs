//! Integration tests for the uniform repository contract: guarded inserts,
//! warn-only updates, soft delete, existence checks, filtered lookups, and
//! navigation loads.

mod common;

use atlas_core::AddressKind;
use atlas_db::DbError;
use common::*;

// =============================================================================
// CRUD round-trips
// =============================================================================

#[tokio::test]
async fn company_crud_roundtrip() {
    let db = test_db().await;
    let repo = db.companies();

    let mut c = company("Initech Ltd");
    c.website = Some("https://initech.example.com".to_string());

    let inserted = repo.insert(&c).await.unwrap();
    assert_eq!(inserted.id, c.id);
    assert_eq!(inserted.name, "Initech Ltd");

    let fetched = repo.get_by_id(&c.id).await.unwrap().unwrap();
    assert_eq!(fetched.name, "Initech Ltd");
    assert_eq!(fetched.website.as_deref(), Some("https://initech.example.com"));
    assert!(fetched.is_active);
    // Navigation collections start empty until loaded explicitly.
    assert!(fetched.people.is_empty());

    let mut changed = fetched.clone();
    changed.name = "Initech Global Ltd".to_string();
    changed.industry = Some("Manufacturing".to_string());
    let updated = repo.update(&changed).await.unwrap();
    assert!(updated.updated_at >= fetched.updated_at);

    let reread = repo.get_by_id(&c.id).await.unwrap().unwrap();
    assert_eq!(reread.name, "Initech Global Ltd");
    assert_eq!(reread.industry.as_deref(), Some("Manufacturing"));

    assert!(repo.exists(&c.id).await.unwrap());
    assert_eq!(repo.count().await.unwrap(), 1);
}

#[tokio::test]
async fn insert_rejects_bad_input() {
    let db = test_db().await;

    let mut bad_id = company("Fine Name");
    bad_id.id = "not-a-uuid".to_string();
    assert!(matches!(
        db.companies().insert(&bad_id).await,
        Err(DbError::Validation(_))
    ));

    let mut empty_id = company("Fine Name");
    empty_id.id = String::new();
    assert!(matches!(
        db.companies().insert(&empty_id).await,
        Err(DbError::Validation(_))
    ));

    let blank_name = company("   ");
    assert!(matches!(
        db.companies().insert(&blank_name).await,
        Err(DbError::Validation(_))
    ));

    // Nothing reached the database.
    assert_eq!(db.companies().count().await.unwrap(), 0);
}

#[tokio::test]
async fn update_of_missing_row_warns_but_succeeds() {
    let db = test_db().await;

    // Never inserted: the update matches nothing and still returns Ok.
    let ghost = company("Ghost Corp");
    let returned = db.companies().update(&ghost).await.unwrap();
    assert_eq!(returned.name, "Ghost Corp");
    assert!(!db.companies().exists(&ghost.id).await.unwrap());
}

// =============================================================================
// Soft delete
// =============================================================================

#[tokio::test]
async fn soft_delete_hides_row_from_every_read() {
    let db = test_db().await;
    let repo = db.companies();

    let c = company("Vandelay Inc");
    repo.insert(&c).await.unwrap();

    assert!(repo.soft_delete(&c.id).await.unwrap());

    assert!(repo.get_by_id(&c.id).await.unwrap().is_none());
    assert!(!repo.exists(&c.id).await.unwrap());
    assert!(repo.list().await.unwrap().is_empty());
    assert_eq!(repo.count().await.unwrap(), 0);
    assert!(repo.search_by_name("Vandelay", 10).await.unwrap().is_empty());

    // Second delete finds nothing to do.
    assert!(!repo.soft_delete(&c.id).await.unwrap());
}

#[tokio::test]
async fn soft_deleted_update_is_ignored() {
    let db = test_db().await;
    let repo = db.companies();

    let c = company("Globex Group");
    repo.insert(&c).await.unwrap();
    repo.soft_delete(&c.id).await.unwrap();

    // Updates only touch live rows; this is the warn-only path.
    let mut changed = c.clone();
    changed.name = "Globex Renamed".to_string();
    repo.update(&changed).await.unwrap();

    assert!(repo.get_by_id(&c.id).await.unwrap().is_none());
}

// =============================================================================
// Filtered lookups
// =============================================================================

#[tokio::test]
async fn search_by_name_matches_substring() {
    let db = test_db().await;
    let repo = db.companies();

    repo.insert(&company("Initech Ltd")).await.unwrap();
    repo.insert(&company("Infinity Partners")).await.unwrap();
    repo.insert(&company("Acme Corp")).await.unwrap();

    let hits = repo.search_by_name("ini", 10).await.unwrap();
    assert_eq!(hits.len(), 2);

    // Empty query lists everything, ordered by name.
    let all = repo.search_by_name("", 10).await.unwrap();
    assert_eq!(all.len(), 3);
    assert_eq!(all[0].name, "Acme Corp");

    let limited = repo.search_by_name("", 2).await.unwrap();
    assert_eq!(limited.len(), 2);
}

#[tokio::test]
async fn get_by_industry_filters_active_rows() {
    let db = test_db().await;
    let repo = db.companies();

    let mut a = company("Alpha");
    a.industry = Some("Logistics".to_string());
    let mut b = company("Beta");
    b.industry = Some("Logistics".to_string());
    let mut c = company("Gamma");
    c.industry = Some("Retail".to_string());

    repo.insert(&a).await.unwrap();
    repo.insert(&b).await.unwrap();
    repo.insert(&c).await.unwrap();
    repo.soft_delete(&b.id).await.unwrap();

    let logistics = repo.get_by_industry("Logistics").await.unwrap();
    assert_eq!(logistics.len(), 1);
    assert_eq!(logistics[0].name, "Alpha");
}

#[tokio::test]
async fn person_lookups_by_company_and_name() {
    let db = test_db().await;

    let acme = company("Acme Corp");
    db.companies().insert(&acme).await.unwrap();

    let ada = person(Some(&acme.id), "Ada", "Lovelace");
    let grace = person(Some(&acme.id), "Grace", "Hopper");
    let alan = person(None, "Alan", "Turing");
    db.people().insert(&ada).await.unwrap();
    db.people().insert(&grace).await.unwrap();
    db.people().insert(&alan).await.unwrap();

    let at_acme = db.people().get_by_company(&acme.id).await.unwrap();
    assert_eq!(at_acme.len(), 2);
    // Ordered by last name: Hopper before Lovelace.
    assert_eq!(at_acme[0].last_name, "Hopper");

    let hits = db.people().search_by_name("lov", 10).await.unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].full_name(), "Ada Lovelace");

    db.people().soft_delete(&grace.id).await.unwrap();
    let at_acme = db.people().get_by_company(&acme.id).await.unwrap();
    assert_eq!(at_acme.len(), 1);
}

// =============================================================================
// Navigation loads
// =============================================================================

#[tokio::test]
async fn person_contact_card_loads() {
    let db = test_db().await;

    let acme = company("Acme Corp");
    db.companies().insert(&acme).await.unwrap();
    let mut ada = person(Some(&acme.id), "Ada", "Lovelace");
    db.people().insert(&ada).await.unwrap();

    db.addresses()
        .insert(&address_for_person(&ada.id))
        .await
        .unwrap();

    let secondary = phone(&ada.id, "+1 (555) 010-2030", false);
    let primary = phone(&ada.id, "+1 (555) 010-0001", true);
    db.phones().insert(&secondary).await.unwrap();
    db.phones().insert(&primary).await.unwrap();

    db.emails()
        .insert(&email(&ada.id, "ada@acme.example.com", true))
        .await
        .unwrap();
    let old_email = email(&ada.id, "ada@old.example.com", false);
    db.emails().insert(&old_email).await.unwrap();
    db.emails().soft_delete(&old_email.id).await.unwrap();

    db.activities()
        .insert(&activity(&ada.id, "Demo the analytical engine"))
        .await
        .unwrap();
    db.calls().insert(&call(&ada.id)).await.unwrap();

    db.people().load_addresses(&mut ada).await.unwrap();
    db.people().load_phones(&mut ada).await.unwrap();
    db.people().load_emails(&mut ada).await.unwrap();
    db.people().load_activities(&mut ada).await.unwrap();
    db.people().load_calls(&mut ada).await.unwrap();

    assert_eq!(ada.addresses.len(), 1);
    assert_eq!(ada.phones.len(), 2);
    // Primary number sorts first.
    assert!(ada.phones[0].is_primary);
    // The soft-deleted email is not loaded.
    assert_eq!(ada.emails.len(), 1);
    assert_eq!(ada.emails[0].address, "ada@acme.example.com");
    assert_eq!(ada.activities.len(), 1);
    assert_eq!(ada.calls.len(), 1);
}

#[tokio::test]
async fn company_loads_people_and_addresses() {
    let db = test_db().await;

    let mut acme = company("Acme Corp");
    db.companies().insert(&acme).await.unwrap();

    let mut hq = address_for_person(&new_id());
    hq.person_id = None;
    hq.company_id = Some(acme.id.clone());
    hq.kind = AddressKind::Office;
    db.addresses().insert(&hq).await.unwrap();

    db.people()
        .insert(&person(Some(&acme.id), "Ada", "Lovelace"))
        .await
        .unwrap();
    let gone = person(Some(&acme.id), "Grace", "Hopper");
    db.people().insert(&gone).await.unwrap();
    db.people().soft_delete(&gone.id).await.unwrap();

    db.companies().load_addresses(&mut acme).await.unwrap();
    db.companies().load_people(&mut acme).await.unwrap();

    assert_eq!(acme.addresses.len(), 1);
    assert_eq!(acme.addresses[0].kind, AddressKind::Office);
    assert_eq!(acme.people.len(), 1);
    assert_eq!(acme.people[0].first_name, "Ada");
}

// =============================================================================
// Joined lookups exclude inactive rows on both sides
// =============================================================================

#[tokio::test]
async fn email_lookup_excludes_deactivated_person() {
    let db = test_db().await;

    let ada = person(None, "Ada", "Lovelace");
    db.people().insert(&ada).await.unwrap();
    db.emails()
        .insert(&email(&ada.id, "ada@example.com", true))
        .await
        .unwrap();

    let found = db.people().get_by_email_address("ada@example.com").await.unwrap();
    assert_eq!(found.len(), 1);

    db.people().soft_delete(&ada.id).await.unwrap();

    // The email row is still active, but its owner is not.
    let found = db.people().get_by_email_address("ada@example.com").await.unwrap();
    assert!(found.is_empty());
    let channels = db.emails().find_by_address("ada@example.com").await.unwrap();
    assert!(channels.is_empty());
}

#[tokio::test]
async fn phone_lookup_excludes_deactivated_number() {
    let db = test_db().await;

    let ada = person(None, "Ada", "Lovelace");
    db.people().insert(&ada).await.unwrap();
    let mobile = phone(&ada.id, "+1 (555) 010-2030", true);
    db.phones().insert(&mobile).await.unwrap();

    assert_eq!(
        db.phones()
            .find_by_number("+1 (555) 010-2030")
            .await
            .unwrap()
            .len(),
        1
    );
    let primary = db.phones().get_primary_for_person(&ada.id).await.unwrap();
    assert_eq!(primary.unwrap().number, "+1 (555) 010-2030");

    db.phones().soft_delete(&mobile.id).await.unwrap();

    assert!(db
        .phones()
        .find_by_number("+1 (555) 010-2030")
        .await
        .unwrap()
        .is_empty());
    assert!(db
        .phones()
        .get_primary_for_person(&ada.id)
        .await
        .unwrap()
        .is_none());
}

// =============================================================================
// Address ownership guard
// =============================================================================

#[tokio::test]
async fn address_requires_an_owner() {
    let db = test_db().await;

    let mut orphan = address_for_person(&new_id());
    orphan.person_id = None;
    orphan.company_id = None;

    assert!(matches!(
        db.addresses().insert(&orphan).await,
        Err(DbError::Validation(_))
    ));
}

#[tokio::test]
async fn address_lookup_by_person_and_kind() {
    let db = test_db().await;

    let ada = person(None, "Ada", "Lovelace");
    db.people().insert(&ada).await.unwrap();

    let home = address_for_person(&ada.id);
    let mut office = address_for_person(&ada.id);
    office.kind = AddressKind::Office;
    db.addresses().insert(&home).await.unwrap();
    db.addresses().insert(&office).await.unwrap();

    assert_eq!(db.addresses().get_by_person(&ada.id).await.unwrap().len(), 2);

    let offices = db.addresses().get_by_kind(AddressKind::Office).await.unwrap();
    assert_eq!(offices.len(), 1);
    assert_eq!(offices[0].id, office.id);

    db.addresses().soft_delete(&home.id).await.unwrap();
    assert_eq!(db.addresses().get_by_person(&ada.id).await.unwrap().len(), 1);
}
