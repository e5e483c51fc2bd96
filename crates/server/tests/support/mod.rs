//! In-memory doubles for the storage and vendor seams.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;

use storycuts_core::{BookingId, BookingStatus, Email, IdentityId, PaymentStatus, UserRole};
use storycuts_server::db::{BookingStore, PaymentOutcome, ProfileStore, RepositoryError};
use storycuts_server::models::{Booking, NewBooking, NewProfile, UserProfile};
use storycuts_server::services::PaymentGateway;
use storycuts_server::services::notify::{Notifier, NotifyError};
use storycuts_server::services::payments::{GatewayError, GatewayOrder, signature};

/// HMAC key shared by [`FakeGateway`] and test callbacks.
pub const TEST_GATEWAY_SECRET: &[u8] = b"gw_test_5k2mN8pQ4rT7uW0zC3xY6aB9dE";

#[derive(Default)]
struct Inner {
    bookings: Vec<Booking>,
    profiles: HashMap<String, UserProfile>,
    fail_reads: bool,
}

/// One lock over bookings and profiles, so `confirm_payment` is atomic the
/// same way the database transaction is.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    inner: Arc<Mutex<Inner>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every read fail, for exercising fail-closed paths.
    pub fn fail_reads(&self, fail: bool) {
        self.lock().fail_reads = fail;
    }

    pub fn profile(&self, identity: &IdentityId) -> Option<UserProfile> {
        self.lock().profiles.get(identity.as_str()).cloned()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().expect("store lock poisoned")
    }

    fn check_reads(inner: &Inner) -> Result<(), RepositoryError> {
        if inner.fail_reads {
            return Err(RepositoryError::DataCorruption(
                "injected read failure".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl BookingStore for InMemoryStore {
    async fn insert(&self, new: NewBooking) -> Result<Booking, RepositoryError> {
        let booking = Booking {
            id: BookingId::generate(),
            owner: new.owner,
            owner_email: new.owner_email,
            vehicle: new.vehicle,
            package: new.package,
            base_price: new.base_price,
            final_price: new.final_price,
            offer_applied: new.offer_applied,
            details: new.details,
            booking_status: BookingStatus::New,
            payment_status: PaymentStatus::Pending,
            payment_ref: None,
            created_at: Utc::now(),
        };

        self.lock().bookings.push(booking.clone());
        Ok(booking)
    }

    async fn get(&self, id: BookingId) -> Result<Option<Booking>, RepositoryError> {
        let inner = self.lock();
        Self::check_reads(&inner)?;
        Ok(inner.bookings.iter().find(|b| b.id == id).cloned())
    }

    async fn list(&self) -> Result<Vec<Booking>, RepositoryError> {
        let inner = self.lock();
        Self::check_reads(&inner)?;
        Ok(inner.bookings.iter().rev().cloned().collect())
    }

    async fn list_for_owner(&self, owner: &IdentityId) -> Result<Vec<Booking>, RepositoryError> {
        let inner = self.lock();
        Self::check_reads(&inner)?;
        Ok(inner
            .bookings
            .iter()
            .rev()
            .filter(|b| &b.owner == owner)
            .cloned()
            .collect())
    }

    async fn has_paid_booking(&self, owner: &IdentityId) -> Result<bool, RepositoryError> {
        let inner = self.lock();
        Self::check_reads(&inner)?;
        Ok(inner
            .bookings
            .iter()
            .any(|b| &b.owner == owner && b.payment_status == PaymentStatus::Paid))
    }

    async fn reprice_to_base(&self, id: BookingId) -> Result<Option<Booking>, RepositoryError> {
        let mut inner = self.lock();
        let Some(booking) = inner.bookings.iter_mut().find(|b| {
            b.id == id && b.offer_applied && b.payment_status == PaymentStatus::Pending
        }) else {
            return Ok(None);
        };

        booking.final_price = booking.base_price;
        booking.offer_applied = false;
        Ok(Some(booking.clone()))
    }

    async fn update_status(
        &self,
        id: BookingId,
        from: BookingStatus,
        to: BookingStatus,
    ) -> Result<Option<Booking>, RepositoryError> {
        let mut inner = self.lock();
        let Some(booking) = inner
            .bookings
            .iter_mut()
            .find(|b| b.id == id && b.booking_status == from)
        else {
            return Ok(None);
        };

        booking.booking_status = to;
        Ok(Some(booking.clone()))
    }

    async fn confirm_payment(
        &self,
        id: BookingId,
        payment_ref: &str,
    ) -> Result<PaymentOutcome, RepositoryError> {
        let mut inner = self.lock();

        let Some(booking) = inner.bookings.iter_mut().find(|b| b.id == id) else {
            return Err(RepositoryError::NotFound);
        };

        if booking.payment_status == PaymentStatus::Paid {
            return Ok(PaymentOutcome::AlreadyPaid(booking.clone()));
        }

        booking.payment_status = PaymentStatus::Paid;
        booking.payment_ref = Some(payment_ref.to_string());
        if booking.booking_status == BookingStatus::New {
            booking.booking_status = BookingStatus::Confirmed;
        }
        let confirmed = booking.clone();

        if confirmed.offer_applied
            && let Some(profile) = inner.profiles.get_mut(confirmed.owner.as_str())
            && !profile.offer_used
        {
            profile.offer_used = true;
        }

        Ok(PaymentOutcome::Confirmed(confirmed))
    }
}

#[async_trait]
impl ProfileStore for InMemoryStore {
    async fn get(&self, identity_id: &IdentityId) -> Result<Option<UserProfile>, RepositoryError> {
        let inner = self.lock();
        Self::check_reads(&inner)?;
        Ok(inner.profiles.get(identity_id.as_str()).cloned())
    }

    async fn ensure(&self, new: &NewProfile) -> Result<UserProfile, RepositoryError> {
        let mut inner = self.lock();
        let profile = inner
            .profiles
            .entry(new.identity_id.as_str().to_string())
            .or_insert_with(|| UserProfile {
                identity_id: new.identity_id.clone(),
                email: new.email.clone(),
                display_name: new.display_name.clone(),
                role: new.role,
                offer_used: false,
                created_at: Utc::now(),
            });
        Ok(profile.clone())
    }

    async fn set_role(&self, email: &Email, role: UserRole) -> Result<(), RepositoryError> {
        let mut inner = self.lock();
        let Some(profile) = inner.profiles.values_mut().find(|p| &p.email == email) else {
            return Err(RepositoryError::NotFound);
        };
        profile.role = role;
        Ok(())
    }
}

/// Deterministic gateway double using the real signature scheme.
#[derive(Default)]
pub struct FakeGateway {
    orders_created: AtomicUsize,
}

impl FakeGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn orders_created(&self) -> usize {
        self.orders_created.load(Ordering::SeqCst)
    }

    /// Sign a callback the way the real gateway would.
    pub fn sign(order_id: &str, payment_id: &str) -> String {
        signature::sign(TEST_GATEWAY_SECRET, order_id, payment_id)
    }
}

#[async_trait]
impl PaymentGateway for FakeGateway {
    async fn create_order(
        &self,
        amount_minor: i64,
        currency: &str,
        receipt: &str,
    ) -> Result<GatewayOrder, GatewayError> {
        let n = self.orders_created.fetch_add(1, Ordering::SeqCst);
        Ok(GatewayOrder {
            id: format!("order_{n}_{receipt}"),
            amount: amount_minor,
            currency: currency.to_string(),
        })
    }

    fn verify_signature(&self, order_id: &str, payment_id: &str, sig: &str) -> bool {
        signature::verify(TEST_GATEWAY_SECRET, order_id, payment_id, sig)
    }
}

/// Notifier double that counts deliveries and can be made to fail.
#[derive(Default)]
pub struct CountingNotifier {
    attempts: AtomicUsize,
    fail: std::sync::atomic::AtomicBool,
}

impl CountingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    pub fn fail_next(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl Notifier for CountingNotifier {
    async fn booking_confirmed(&self, _booking: &Booking) -> Result<(), NotifyError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err(NotifyError::Api {
                status: 503,
                message: "vendor down".to_string(),
            });
        }
        Ok(())
    }
}
