//! Lifecycle tests against a live PostgreSQL.
//!
//! Run with a database available:
//!   DATABASE_URL=postgres://localhost/mealbridge_test cargo test --test lifecycle -- --ignored
//!
//! Each test registers throwaway accounts with unique emails, so the
//! suite can run repeatedly against the same database.

use mealbridge::errors::AppError;
use mealbridge::models::account::{NewAccount, Role};
use mealbridge::models::donation::NewDonation;
use mealbridge::models::notification::{ContactSnapshot, NotificationKind};
use mealbridge::models::request::{NewRequest, Urgency};
use mealbridge::store::postgres::PgStore;
use uuid::Uuid;

async fn store() -> PgStore {
    let url = std::env::var("DATABASE_URL")
        .unwrap_or_else(|_| "postgres://localhost/mealbridge_test".into());
    let store = PgStore::connect(&url).await.expect("database unavailable");
    store.migrate().await.expect("migrations failed");
    store
}

fn new_account(role: Role) -> NewAccount {
    NewAccount {
        name: "Test User".into(),
        email: format!("user-{}@example.org", Uuid::new_v4().simple()),
        password_hash: "$argon2id$v=19$m=19456,t=2,p=1$unused$unused".into(),
        role,
        phone: "555-0100".into(),
        address: "12 Hill Road".into(),
        organization_name: None,
    }
}

fn rice_donation() -> NewDonation {
    NewDonation {
        food_type: "Rice".into(),
        quantity: "10kg".into(),
        expiry_time: "today 6pm".into(),
        pickup_address: "12 Hill Road".into(),
        description: None,
    }
}

#[tokio::test]
#[ignore = "requires a PostgreSQL instance at DATABASE_URL"]
async fn accept_then_complete_walks_the_state_machine() {
    let db = store().await;
    let donor = db.insert_account(&new_account(Role::Donor)).await.unwrap();
    let recipient = db.insert_account(&new_account(Role::Recipient)).await.unwrap();

    let donation = db.insert_donation(donor.id, &rice_donation()).await.unwrap();
    assert_eq!(donation.status, "available");
    assert!(donation.accepted_by.is_none());

    // Complete before any claim must fail.
    let err = db.complete_donation(donation.id, donor.id).await.unwrap_err();
    assert!(matches!(err, AppError::InvalidTransition(_)));

    let accepted = db.accept_donation(donation.id, recipient.id).await.unwrap();
    assert_eq!(accepted.status, "accepted");
    assert_eq!(accepted.accepted_by, Some(recipient.id));

    let completed = db.complete_donation(donation.id, donor.id).await.unwrap();
    assert_eq!(completed.status, "completed");
    // Claimant reference survives completion.
    assert_eq!(completed.accepted_by, Some(recipient.id));
}

#[tokio::test]
#[ignore = "requires a PostgreSQL instance at DATABASE_URL"]
async fn second_claim_loses_and_first_claimant_sticks() {
    let db = store().await;
    let donor = db.insert_account(&new_account(Role::Donor)).await.unwrap();
    let first = db.insert_account(&new_account(Role::Recipient)).await.unwrap();
    let second = db.insert_account(&new_account(Role::Recipient)).await.unwrap();

    let donation = db.insert_donation(donor.id, &rice_donation()).await.unwrap();

    db.accept_donation(donation.id, first.id).await.unwrap();
    let err = db.accept_donation(donation.id, second.id).await.unwrap_err();
    assert!(matches!(err, AppError::InvalidTransition(_)));

    let current = db.get_donation(donation.id).await.unwrap().unwrap();
    assert_eq!(current.accepted_by, Some(first.id));
}

#[tokio::test]
#[ignore = "requires a PostgreSQL instance at DATABASE_URL"]
async fn concurrent_claims_resolve_to_one_winner() {
    let db = store().await;
    let donor = db.insert_account(&new_account(Role::Donor)).await.unwrap();
    let a = db.insert_account(&new_account(Role::Recipient)).await.unwrap();
    let b = db.insert_account(&new_account(Role::Recipient)).await.unwrap();

    let donation = db.insert_donation(donor.id, &rice_donation()).await.unwrap();

    let (ra, rb) = tokio::join!(
        db.accept_donation(donation.id, a.id),
        db.accept_donation(donation.id, b.id),
    );

    let winners = [&ra, &rb].iter().filter(|r| r.is_ok()).count();
    assert_eq!(winners, 1, "exactly one concurrent claim must win");
    let loser = if ra.is_ok() { rb } else { ra };
    assert!(matches!(loser.unwrap_err(), AppError::InvalidTransition(_)));
}

#[tokio::test]
#[ignore = "requires a PostgreSQL instance at DATABASE_URL"]
async fn delete_is_only_allowed_while_available() {
    let db = store().await;
    let donor = db.insert_account(&new_account(Role::Donor)).await.unwrap();
    let recipient = db.insert_account(&new_account(Role::Recipient)).await.unwrap();

    let keep = db.insert_donation(donor.id, &rice_donation()).await.unwrap();
    db.accept_donation(keep.id, recipient.id).await.unwrap();
    let err = db.delete_donation(keep.id, donor.id).await.unwrap_err();
    assert!(matches!(err, AppError::InvalidTransition(_)));

    let gone = db.insert_donation(donor.id, &rice_donation()).await.unwrap();
    db.delete_donation(gone.id, donor.id).await.unwrap();
    assert!(db.get_donation(gone.id).await.unwrap().is_none());
}

#[tokio::test]
#[ignore = "requires a PostgreSQL instance at DATABASE_URL"]
async fn claim_notifies_the_donor_with_contact_snapshot() {
    let db = store().await;
    let donor = db.insert_account(&new_account(Role::Donor)).await.unwrap();
    let mut recipient_fields = new_account(Role::Recipient);
    recipient_fields.organization_name = Some("Sunrise Home".into());
    let recipient = db.insert_account(&recipient_fields).await.unwrap();

    let donation = db.insert_donation(donor.id, &rice_donation()).await.unwrap();
    db.accept_donation(donation.id, recipient.id).await.unwrap();

    // What the accept handler records for the donor.
    let contact = ContactSnapshot::new(recipient.display_name(), &recipient);
    db.insert_notification(
        donor.id,
        NotificationKind::DonationAccepted,
        "Your donation of Rice has been accepted!",
        serde_json::to_value(&contact).unwrap(),
    )
    .await
    .unwrap();

    let notifications = db.list_notifications(donor.id).await.unwrap();
    assert_eq!(notifications.len(), 1);
    let n = &notifications[0];
    assert_eq!(n.r#type, "donation_accepted");
    assert!(!n.is_read);
    assert_eq!(n.contact["name"], "Sunrise Home");
    assert_eq!(n.contact["email"], recipient.email);

    // Read flag is idempotent and owner-scoped.
    let read = db.mark_notification_read(n.id, donor.id).await.unwrap();
    assert!(read.is_read);
    let again = db.mark_notification_read(n.id, donor.id).await.unwrap();
    assert!(again.is_read);
    let err = db.mark_notification_read(n.id, recipient.id).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
#[ignore = "requires a PostgreSQL instance at DATABASE_URL"]
async fn request_lifecycle_mirrors_donations() {
    let db = store().await;
    let recipient = db.insert_account(&new_account(Role::Recipient)).await.unwrap();
    let donor = db.insert_account(&new_account(Role::Donor)).await.unwrap();

    let request = db
        .insert_request(
            recipient.id,
            &NewRequest {
                food_type: "Lentils".into(),
                quantity: "5kg".into(),
                urgency: Urgency::High,
                description: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(request.status, "pending");

    let fulfilled = db.fulfill_request(request.id, donor.id).await.unwrap();
    assert_eq!(fulfilled.status, "fulfilled");
    assert_eq!(fulfilled.fulfilled_by, Some(donor.id));

    // Neither a second fulfill nor a late cancel may land.
    let err = db.fulfill_request(request.id, donor.id).await.unwrap_err();
    assert!(matches!(err, AppError::InvalidTransition(_)));
    let err = db.cancel_request(request.id, recipient.id).await.unwrap_err();
    assert!(matches!(err, AppError::InvalidTransition(_)));
}

#[tokio::test]
#[ignore = "requires a PostgreSQL instance at DATABASE_URL"]
async fn duplicate_email_leaves_original_account_alone() {
    let db = store().await;
    let mut fields = new_account(Role::Donor);
    fields.name = "Original".into();
    let original = db.insert_account(&fields).await.unwrap();

    fields.name = "Impostor".into();
    let err = db.insert_account(&fields).await.unwrap_err();
    assert!(matches!(err, AppError::DuplicateEmail));

    let unchanged = db.get_account(original.id).await.unwrap().unwrap();
    assert_eq!(unchanged.name, "Original");
}
