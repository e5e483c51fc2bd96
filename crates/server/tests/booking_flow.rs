//! End-to-end booking and payment flows over in-memory stores.

#![allow(clippy::unwrap_used)]

mod support;

use std::sync::Arc;

use storycuts_core::{BookingStatus, Email, IdentityId, PaymentStatus, Price, UserRole};
use storycuts_server::db::BookingStore;
use storycuts_server::error::AppError;
use storycuts_server::models::NewProfile;
use storycuts_server::services::payments::bridge::PaymentCallback;
use storycuts_server::services::{BookingRequest, BookingService, OfferEngine, PaymentBridge};

use support::{CountingNotifier, FakeGateway, InMemoryStore};

struct Harness {
    store: InMemoryStore,
    bookings: BookingService,
    payments: PaymentBridge,
    gateway: Arc<FakeGateway>,
    notifier: Arc<CountingNotifier>,
}

fn harness() -> Harness {
    let store = InMemoryStore::new();
    let gateway = Arc::new(FakeGateway::new());
    let notifier = Arc::new(CountingNotifier::new());

    let offers = OfferEngine::new(Arc::new(store.clone()), Arc::new(store.clone()));
    let bookings = BookingService::new(Arc::new(store.clone()), offers);
    let payments = PaymentBridge::new(
        gateway.clone(),
        bookings.clone(),
        notifier.clone(),
        "rzp_test_k3y1d".to_string(),
    );

    Harness {
        store,
        bookings,
        payments,
        gateway,
        notifier,
    }
}

async fn signed_up(h: &Harness, id: &str) -> (IdentityId, Email) {
    let identity = IdentityId::from(id);
    let email = Email::parse(&format!("{id}@example.com")).unwrap();

    use storycuts_server::db::ProfileStore;
    h.store
        .ensure(&NewProfile {
            identity_id: identity.clone(),
            email: email.clone(),
            display_name: id.to_string(),
            role: UserRole::Customer,
        })
        .await
        .unwrap();

    (identity, email)
}

fn request(vehicle: &str, package: &str) -> BookingRequest {
    BookingRequest {
        vehicle: vehicle.to_string(),
        package: package.to_string(),
        full_name: "Asha Verma".to_string(),
        phone: "9876543210".to_string(),
        city: "Pune".to_string(),
        location: "FC Road".to_string(),
        vehicle_model: "RE Classic 350".to_string(),
        shoot_date: "2026-09-12".to_string(),
        shoot_time: "17:30".to_string(),
        notes: None,
    }
}

/// Run a signed, well-formed payment callback for the booking's order.
async fn pay(h: &Harness, booking_id: storycuts_core::BookingId) -> storycuts_server::models::Booking {
    let order = h.payments.create_order(booking_id).await.unwrap();
    let payment_id = format!("pay_{booking_id}");
    let outcome = h
        .payments
        .reconcile(PaymentCallback {
            booking_id,
            order_id: order.order_id.clone(),
            payment_id: payment_id.clone(),
            signature: FakeGateway::sign(&order.order_id, &payment_id),
        })
        .await
        .unwrap();
    assert!(outcome.newly_paid);
    outcome.booking
}

#[tokio::test]
async fn first_booking_gets_offer_price() {
    let h = harness();
    let (id, email) = signed_up(&h, "u1").await;

    let booking = h
        .bookings
        .create(&id, &email, request("bike", "cinematic"))
        .await
        .unwrap();

    assert_eq!(booking.base_price, Price::new(499));
    assert_eq!(booking.final_price, Price::new(9));
    assert!(booking.offer_applied);
    assert_eq!(booking.booking_status, BookingStatus::New);
    assert_eq!(booking.payment_status, PaymentStatus::Pending);
    assert_eq!(booking.payment_ref, None);
}

#[tokio::test]
async fn delivery_is_never_offer_priced() {
    let h = harness();
    let (id, email) = signed_up(&h, "u1").await;

    let booking = h
        .bookings
        .create(&id, &email, request("car", "delivery"))
        .await
        .unwrap();

    assert_eq!(booking.final_price, Price::new(1259));
    assert!(!booking.offer_applied);
}

#[tokio::test]
async fn payment_confirms_booking_and_consumes_offer() {
    let h = harness();
    let (id, email) = signed_up(&h, "u1").await;

    let booking = h
        .bookings
        .create(&id, &email, request("bike", "cinematic"))
        .await
        .unwrap();

    let order = h.payments.create_order(booking.id).await.unwrap();
    // Offer price of Rs.9 becomes 900 paise at the gateway
    assert_eq!(order.amount, 900);
    assert_eq!(order.currency, "INR");
    assert_eq!(order.key_id, "rzp_test_k3y1d");

    let payment_id = "pay_29QQoUBi66xm2f".to_string();
    let outcome = h
        .payments
        .reconcile(PaymentCallback {
            booking_id: booking.id,
            order_id: order.order_id.clone(),
            payment_id: payment_id.clone(),
            signature: FakeGateway::sign(&order.order_id, &payment_id),
        })
        .await
        .unwrap();

    assert!(outcome.newly_paid);
    assert_eq!(outcome.booking.booking_status, BookingStatus::Confirmed);
    assert_eq!(outcome.booking.payment_status, PaymentStatus::Paid);
    assert_eq!(outcome.booking.payment_ref.as_deref(), Some(payment_id.as_str()));
    assert_eq!(h.notifier.attempts(), 1);

    // The offer is consumed on the profile
    assert!(h.store.profile(&id).unwrap().offer_used);

    // The next booking is full price
    let second = h
        .bookings
        .create(&id, &email, request("car", "rolling"))
        .await
        .unwrap();
    assert_eq!(second.final_price, Price::new(899));
    assert!(!second.offer_applied);
}

#[tokio::test]
async fn redelivered_callback_is_idempotent() {
    let h = harness();
    let (id, email) = signed_up(&h, "u1").await;

    let booking = h
        .bookings
        .create(&id, &email, request("bike", "combo"))
        .await
        .unwrap();

    let order = h.payments.create_order(booking.id).await.unwrap();
    let payment_id = "pay_dup".to_string();
    let callback = || PaymentCallback {
        booking_id: booking.id,
        order_id: order.order_id.clone(),
        payment_id: payment_id.clone(),
        signature: FakeGateway::sign(&order.order_id, &payment_id),
    };

    let first = h.payments.reconcile(callback()).await.unwrap();
    assert!(first.newly_paid);

    let second = h.payments.reconcile(callback()).await.unwrap();
    assert!(!second.newly_paid);
    assert_eq!(second.booking.payment_status, PaymentStatus::Paid);

    // The customer is notified exactly once
    assert_eq!(h.notifier.attempts(), 1);
}

#[tokio::test]
async fn forged_signature_leaves_booking_untouched() {
    let h = harness();
    let (id, email) = signed_up(&h, "u1").await;

    let booking = h
        .bookings
        .create(&id, &email, request("bike", "cinematic"))
        .await
        .unwrap();
    let order = h.payments.create_order(booking.id).await.unwrap();

    let result = h
        .payments
        .reconcile(PaymentCallback {
            booking_id: booking.id,
            order_id: order.order_id.clone(),
            payment_id: "pay_forged".to_string(),
            signature: FakeGateway::sign(&order.order_id, "pay_other"),
        })
        .await;

    assert!(matches!(result, Err(AppError::SignatureMismatch)));

    let unchanged = h.bookings.get(booking.id).await.unwrap();
    assert_eq!(unchanged.payment_status, PaymentStatus::Pending);
    assert_eq!(unchanged.booking_status, BookingStatus::New);
    assert_eq!(h.notifier.attempts(), 0);
}

#[tokio::test]
async fn notification_failure_does_not_fail_payment() {
    let h = harness();
    let (id, email) = signed_up(&h, "u1").await;
    h.notifier.fail_next(true);

    let booking = h
        .bookings
        .create(&id, &email, request("bike", "cinematic"))
        .await
        .unwrap();
    let paid = pay(&h, booking.id).await;

    assert_eq!(paid.payment_status, PaymentStatus::Paid);
    assert_eq!(h.notifier.attempts(), 1);
}

#[tokio::test]
async fn order_for_unknown_booking_is_not_found() {
    let h = harness();
    let result = h
        .payments
        .create_order(storycuts_core::BookingId::generate())
        .await;

    assert!(matches!(result, Err(AppError::NotFound(_))));
    assert_eq!(h.gateway.orders_created(), 0);
}

#[tokio::test]
async fn non_positive_amount_is_rejected_before_the_gateway() {
    let h = harness();
    let (id, email) = signed_up(&h, "u1").await;

    // A corrupted record with a zero price must never reach the gateway
    let booking = h
        .store
        .insert(storycuts_server::models::NewBooking {
            owner: id,
            owner_email: email,
            vehicle: storycuts_core::VehicleCategory::Bike,
            package: storycuts_core::ShootPackage::Cinematic,
            base_price: Price::new(0),
            final_price: Price::new(0),
            offer_applied: false,
            details: storycuts_server::models::CustomerDetails {
                full_name: "Asha Verma".to_string(),
                phone: storycuts_core::Phone::parse("9876543210").unwrap(),
                city: "Pune".to_string(),
                location: "FC Road".to_string(),
                vehicle_model: "RE Classic 350".to_string(),
                shoot_date: "2026-09-12".parse().unwrap(),
                shoot_time: "17:30:00".parse().unwrap(),
                notes: None,
            },
        })
        .await
        .unwrap();

    let result = h.payments.create_order(booking.id).await;
    assert!(matches!(result, Err(AppError::InvalidAmount)));
    assert_eq!(h.gateway.orders_created(), 0);
}

#[tokio::test]
async fn invalid_input_reports_the_failing_field() {
    let h = harness();
    let (id, email) = signed_up(&h, "u1").await;

    let mut bad = request("bike", "cinematic");
    bad.phone = "12345".to_string();

    match h.bookings.create(&id, &email, bad).await {
        Err(AppError::Validation { field, .. }) => assert_eq!(field, "phone"),
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[tokio::test]
async fn status_overrides_follow_the_lifecycle_graph() {
    let h = harness();
    let (id, email) = signed_up(&h, "u1").await;

    let booking = h
        .bookings
        .create(&id, &email, request("bike", "cinematic"))
        .await
        .unwrap();

    // new -> completed skips confirmed
    let result = h
        .bookings
        .set_status(booking.id, BookingStatus::Completed)
        .await;
    assert!(matches!(result, Err(AppError::InvalidTransition { .. })));

    let cancelled = h
        .bookings
        .set_status(booking.id, BookingStatus::Cancelled)
        .await
        .unwrap();
    assert_eq!(cancelled.booking_status, BookingStatus::Cancelled);

    // cancelled is terminal
    let result = h
        .bookings
        .set_status(booking.id, BookingStatus::Confirmed)
        .await;
    assert!(matches!(result, Err(AppError::InvalidTransition { .. })));
}

#[tokio::test]
async fn paid_booking_can_complete() {
    let h = harness();
    let (id, email) = signed_up(&h, "u1").await;

    let booking = h
        .bookings
        .create(&id, &email, request("car", "combo"))
        .await
        .unwrap();
    pay(&h, booking.id).await;

    let completed = h
        .bookings
        .set_status(booking.id, BookingStatus::Completed)
        .await
        .unwrap();
    assert_eq!(completed.booking_status, BookingStatus::Completed);
    // Payment state is untouched by lifecycle overrides
    assert_eq!(completed.payment_status, PaymentStatus::Paid);
}

#[tokio::test]
async fn stale_offer_booking_is_repriced_at_order_time() {
    let h = harness();
    let (id, email) = signed_up(&h, "u1").await;

    // Two bookings quoted while the offer was still available
    let first = h
        .bookings
        .create(&id, &email, request("bike", "cinematic"))
        .await
        .unwrap();
    let second = h
        .bookings
        .create(&id, &email, request("bike", "rolling"))
        .await
        .unwrap();
    assert!(second.offer_applied);
    assert_eq!(second.final_price, Price::new(9));

    // Paying the first consumes the offer
    pay(&h, first.id).await;
    assert!(h.store.profile(&id).unwrap().offer_used);

    // The second booking's stale promo price is dropped before the gateway
    // sees an order for it
    let order = h.payments.create_order(second.id).await.unwrap();
    assert_eq!(order.amount, Price::new(599).minor_units());

    let repriced = h.bookings.get(second.id).await.unwrap();
    assert_eq!(repriced.final_price, Price::new(599));
    assert!(!repriced.offer_applied);

    // Paying it commits the base price, not a second promo price
    let payment_id = "pay_second".to_string();
    let outcome = h
        .payments
        .reconcile(PaymentCallback {
            booking_id: second.id,
            order_id: order.order_id.clone(),
            payment_id: payment_id.clone(),
            signature: FakeGateway::sign(&order.order_id, &payment_id),
        })
        .await
        .unwrap();
    assert!(outcome.newly_paid);
    assert_eq!(outcome.booking.final_price, Price::new(599));
    assert!(!outcome.booking.offer_applied);
}

#[tokio::test]
async fn unconsumed_offer_price_survives_order_creation() {
    let h = harness();
    let (id, email) = signed_up(&h, "u1").await;

    let booking = h
        .bookings
        .create(&id, &email, request("bike", "cinematic"))
        .await
        .unwrap();

    // No other payment happened; the promo price stands
    let order = h.payments.create_order(booking.id).await.unwrap();
    assert_eq!(order.amount, Price::new(9).minor_units());
    assert!(h.bookings.get(booking.id).await.unwrap().offer_applied);
}

#[tokio::test]
async fn offers_are_per_identity() {
    let h = harness();
    let (u1, u1_email) = signed_up(&h, "u1").await;
    let (u2, u2_email) = signed_up(&h, "u2").await;

    let first = h
        .bookings
        .create(&u1, &u1_email, request("bike", "cinematic"))
        .await
        .unwrap();
    pay(&h, first.id).await;

    // u1 used the offer; u2 still gets it
    let second = h
        .bookings
        .create(&u2, &u2_email, request("bike", "cinematic"))
        .await
        .unwrap();
    assert!(second.offer_applied);
    assert_eq!(second.final_price, Price::new(9));
}

#[tokio::test]
async fn store_failure_withholds_the_offer() {
    let h = harness();
    let (id, email) = signed_up(&h, "u1").await;

    h.store.fail_reads(true);
    // Creation still needs the insert path, which is unaffected
    let booking = h
        .bookings
        .create(&id, &email, request("bike", "cinematic"))
        .await
        .unwrap();
    h.store.fail_reads(false);

    assert!(!booking.offer_applied);
    assert_eq!(booking.final_price, Price::new(499));
}
