/// Visitor scheduling tests
///
/// Run with: cargo test --test visitor_tests

use chrono::{DateTime, Duration, TimeZone, Utc};
use communityhub_portal::connection::memory::BackendOp;
use communityhub_portal::connection::{MemoryCollection, Role, Session};
use communityhub_portal::controller::{CrudListController, FieldTarget, Outcome};
use communityhub_portal::core::{Identity, Record, format_timestamp};
use communityhub_portal::notify::{MemorySink, Notification, Notifier};
use communityhub_portal::resources::{Screen, mount};

fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 19, 9, 30, 0).unwrap()
}

fn visitors() -> (CrudListController<MemoryCollection>, MemoryCollection) {
    let backend = MemoryCollection::read_only("visitorId").with_owner_field("userId");
    let session = Session::new("42", Role::Resident).unwrap();
    let ctl = mount(Screen::Visitors, backend.clone(), Some(&session))
        .unwrap()
        .with_clock(fixed_now);
    (ctl, backend)
}

fn fill_visit(ctl: &mut CrudListController<MemoryCollection>, check_in: &str, check_out: &str) {
    ctl.update_field(FieldTarget::Draft("visitorFullName"), "Ravi Kumar");
    ctl.update_field(FieldTarget::Draft("buildingNumber"), "B2");
    ctl.update_field(FieldTarget::Draft("purpose"), "Delivery");
    ctl.update_field(FieldTarget::Draft("checkInDate"), check_in);
    ctl.update_field(FieldTarget::Draft("checkOutDate"), check_out);
}

#[tokio::test]
async fn test_checkout_not_after_checkin_is_rejected() {
    let (mut ctl, backend) = visitors();
    fill_visit(&mut ctl, "2026-10-20 10:00", "2026-10-20 10:00");

    let outcome = ctl.submit_draft().await;

    let Outcome::Rejected(errors) = outcome else {
        panic!("expected rejection, got {:?}", outcome);
    };
    assert_eq!(
        errors.messages(),
        vec!["Check-out date must be after check-in date."]
    );
    assert_eq!(backend.calls(BackendOp::Create), 0);
}

#[tokio::test]
async fn test_past_checkin_reported_before_order_violation() {
    let (mut ctl, backend) = visitors();
    fill_visit(&mut ctl, "2026-10-19 08:00", "2026-10-19 07:00");

    let outcome = ctl.submit_draft().await;

    let sink = MemorySink::new();
    Notifier::emit(&sink, &ctl.schema().messages, &outcome);
    assert_eq!(
        sink.snapshot(),
        vec![
            Notification::error("Check-in date cannot be before current date and time."),
            Notification::error("Check-out date must be after check-in date."),
        ]
    );
    assert_eq!(backend.calls(BackendOp::Create), 0);
}

#[tokio::test]
async fn test_missing_fields_emit_one_notification_each_in_field_order() {
    let (mut ctl, _backend) = visitors();
    ctl.update_field(FieldTarget::Draft("purpose"), "Delivery");

    let outcome = ctl.submit_draft().await;
    let sink = MemorySink::new();
    Notifier::emit(&sink, &ctl.schema().messages, &outcome);

    assert_eq!(
        sink.messages(),
        vec![
            "Please enter visitor name.",
            "Please enter building number.",
            "Please select check-in date.",
            "Please select check-out date.",
        ]
    );
}

#[tokio::test]
async fn test_valid_visit_is_created_with_owner() {
    let (mut ctl, backend) = visitors();
    let check_in = fixed_now() + Duration::hours(1);
    let check_out = check_in + Duration::hours(2);
    fill_visit(
        &mut ctl,
        &format_timestamp(check_in),
        &format_timestamp(check_out),
    );

    let outcome = ctl.submit_draft().await;

    assert_eq!(outcome, Outcome::Created(Identity::Int(1)));
    let stored = backend.records().await;
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].text("userId"), "42");
    assert_eq!(stored[0].text("userType"), "RESIDENT");
    assert_eq!(stored[0].timestamp("checkInDate"), Some(check_in));
    assert!(stored[0].get("checkInDate").is_some());
    assert!(ctl.draft().is_blank("visitorFullName"));
    assert!(ctl.draft().is_blank("checkInDate"));

    let sink = MemorySink::new();
    Notifier::emit(&sink, &ctl.schema().messages, &outcome);
    assert_eq!(sink.messages(), vec!["Visitor added successfully!"]);
}

#[tokio::test]
async fn test_delete_visit_notifies() {
    let (mut ctl, backend) = visitors();
    backend
        .seed(Record::new().with("visitorId", 7).with("userId", "42"))
        .await;
    ctl.load().await;

    let outcome = ctl.remove(&Identity::Int(7)).await;
    let sink = MemorySink::new();
    Notifier::emit(&sink, &ctl.schema().messages, &outcome);

    assert!(ctl.is_empty());
    assert_eq!(sink.messages(), vec!["Visitor deleted successfully!"]);
}

#[tokio::test]
async fn test_failed_create_and_delete_are_reported() {
    let (mut ctl, backend) = visitors();
    backend
        .seed(Record::new().with("visitorId", 7).with("userId", "42"))
        .await;
    ctl.load().await;
    backend.set_failing(BackendOp::Delete, true).await;
    backend.set_failing(BackendOp::Create, true).await;

    let sink = MemorySink::new();
    let removed = ctl.remove(&Identity::Int(7)).await;
    Notifier::emit(&sink, &ctl.schema().messages, &removed);

    let check_in = fixed_now() + Duration::hours(1);
    fill_visit(
        &mut ctl,
        &format_timestamp(check_in),
        &format_timestamp(check_in + Duration::hours(2)),
    );
    let created = ctl.submit_draft().await;
    Notifier::emit(&sink, &ctl.schema().messages, &created);

    assert!(matches!(removed, Outcome::Failed { .. }));
    assert!(matches!(created, Outcome::Failed { .. }));
    assert_eq!(
        sink.snapshot(),
        vec![
            Notification::error("Failed to delete visitor"),
            Notification::error("Failed to add visitor"),
        ]
    );
    assert_eq!(ctl.len(), 1);
    assert!(!ctl.draft().is_blank("visitorFullName"));
}
