//! Booking store: the shared mutable resource of the whole system.
//!
//! Every writer goes through conditional/partial updates that touch only the
//! fields it owns: creation writes price fields once, status overrides write
//! `booking_status` guarded by the expected predecessor, and payment
//! confirmation commits the paid transition and the owner's offer-used flag
//! in a single transaction.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use storycuts_core::{
    BookingId, BookingStatus, Email, IdentityId, PaymentStatus, Phone, Price, ShootPackage,
    VehicleCategory,
};

use super::RepositoryError;
use crate::models::booking::{Booking, CustomerDetails, NewBooking};

/// Result of a payment confirmation attempt.
#[derive(Debug, Clone)]
pub enum PaymentOutcome {
    /// The booking transitioned to paid/confirmed in this call.
    Confirmed(Booking),
    /// The booking was already paid; nothing was written.
    AlreadyPaid(Booking),
}

impl PaymentOutcome {
    /// The booking in its post-call state.
    #[must_use]
    pub const fn booking(&self) -> &Booking {
        match self {
            Self::Confirmed(b) | Self::AlreadyPaid(b) => b,
        }
    }
}

/// Storage seam for booking records.
///
/// Implementations must make [`BookingStore::confirm_payment`] atomic: the
/// paid transition and the owner's offer-used flag commit together or not at
/// all, and a repeat call for an already-paid booking writes nothing.
#[async_trait]
pub trait BookingStore: Send + Sync {
    /// Persist a new booking with status `new`/`pending`.
    async fn insert(&self, new: NewBooking) -> Result<Booking, RepositoryError>;

    /// Fetch a booking by id.
    async fn get(&self, id: BookingId) -> Result<Option<Booking>, RepositoryError>;

    /// All bookings, newest first (administrative view).
    async fn list(&self) -> Result<Vec<Booking>, RepositoryError>;

    /// Bookings owned by one identity, newest first.
    async fn list_for_owner(&self, owner: &IdentityId) -> Result<Vec<Booking>, RepositoryError>;

    /// Whether the identity has any paid booking.
    async fn has_paid_booking(&self, owner: &IdentityId) -> Result<bool, RepositoryError>;

    /// Drop a stale offer price: reset `final_price` to `base_price` and
    /// clear `offer_applied`, conditional on the booking still being
    /// offer-priced and unpaid.
    ///
    /// Returns `None` when the condition did not hold (already paid, or not
    /// offer-priced); nothing is written in that case.
    async fn reprice_to_base(&self, id: BookingId) -> Result<Option<Booking>, RepositoryError>;

    /// Move `booking_status` from `from` to `to` as one conditional write.
    ///
    /// Returns `None` when the booking was not in `from` anymore (lost race
    /// or stale view); the caller decides how to surface that.
    async fn update_status(
        &self,
        id: BookingId,
        from: BookingStatus,
        to: BookingStatus,
    ) -> Result<Option<Booking>, RepositoryError>;

    /// Confirm payment: set `payment_status = paid`, advance `new` bookings
    /// to `confirmed`, record the gateway payment reference, and set the
    /// owner's offer-used flag when the booking was offer-priced - all in one
    /// transactional unit.
    async fn confirm_payment(
        &self,
        id: BookingId,
        payment_ref: &str,
    ) -> Result<PaymentOutcome, RepositoryError>;
}

/// `PostgreSQL`-backed booking store.
pub struct PgBookingStore {
    pool: PgPool,
}

impl PgBookingStore {
    /// Create a new store over the shared pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const BOOKING_COLUMNS: &str = "id, owner_id, owner_email, vehicle, package, \
     base_price, final_price, offer_applied, \
     full_name, phone, city, location, vehicle_model, shoot_date, shoot_time, notes, \
     booking_status, payment_status, payment_ref, created_at";

/// Raw row shape; statuses and catalog enums are stored as text.
#[derive(sqlx::FromRow)]
struct BookingRow {
    id: Uuid,
    owner_id: String,
    owner_email: String,
    vehicle: String,
    package: String,
    base_price: i64,
    final_price: i64,
    offer_applied: bool,
    full_name: String,
    phone: String,
    city: String,
    location: String,
    vehicle_model: String,
    shoot_date: NaiveDate,
    shoot_time: NaiveTime,
    notes: Option<String>,
    booking_status: String,
    payment_status: String,
    payment_ref: Option<String>,
    created_at: DateTime<Utc>,
}

impl TryFrom<BookingRow> for Booking {
    type Error = RepositoryError;

    fn try_from(row: BookingRow) -> Result<Self, Self::Error> {
        let corrupt = |what: &str, err: String| {
            RepositoryError::DataCorruption(format!("invalid {what} in database: {err}"))
        };

        let vehicle: VehicleCategory = row
            .vehicle
            .parse()
            .map_err(|e: String| corrupt("vehicle", e))?;
        let package: ShootPackage = row
            .package
            .parse()
            .map_err(|e: String| corrupt("package", e))?;
        let booking_status: BookingStatus = row
            .booking_status
            .parse()
            .map_err(|e: String| corrupt("booking status", e))?;
        let payment_status: PaymentStatus = row
            .payment_status
            .parse()
            .map_err(|e: String| corrupt("payment status", e))?;
        let owner_email =
            Email::parse(&row.owner_email).map_err(|e| corrupt("email", e.to_string()))?;
        let phone = Phone::parse(&row.phone).map_err(|e| corrupt("phone", e.to_string()))?;

        Ok(Self {
            id: BookingId::new(row.id),
            owner: IdentityId::new(row.owner_id),
            owner_email,
            vehicle,
            package,
            base_price: Price::new(row.base_price),
            final_price: Price::new(row.final_price),
            offer_applied: row.offer_applied,
            details: CustomerDetails {
                full_name: row.full_name,
                phone,
                city: row.city,
                location: row.location,
                vehicle_model: row.vehicle_model,
                shoot_date: row.shoot_date,
                shoot_time: row.shoot_time,
                notes: row.notes,
            },
            booking_status,
            payment_status,
            payment_ref: row.payment_ref,
            created_at: row.created_at,
        })
    }
}

#[async_trait]
impl BookingStore for PgBookingStore {
    async fn insert(&self, new: NewBooking) -> Result<Booking, RepositoryError> {
        let sql = format!(
            "INSERT INTO bookings \
               (id, owner_id, owner_email, vehicle, package, \
                base_price, final_price, offer_applied, \
                full_name, phone, city, location, vehicle_model, \
                shoot_date, shoot_time, notes, booking_status, payment_status) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, \
                     'new', 'pending') \
             RETURNING {BOOKING_COLUMNS}"
        );

        let row: BookingRow = sqlx::query_as(&sql)
            .bind(BookingId::generate().as_uuid())
            .bind(new.owner.as_str())
            .bind(new.owner_email.as_str())
            .bind(new.vehicle.as_str())
            .bind(new.package.as_str())
            .bind(new.base_price.rupees())
            .bind(new.final_price.rupees())
            .bind(new.offer_applied)
            .bind(&new.details.full_name)
            .bind(new.details.phone.as_str())
            .bind(&new.details.city)
            .bind(&new.details.location)
            .bind(&new.details.vehicle_model)
            .bind(new.details.shoot_date)
            .bind(new.details.shoot_time)
            .bind(&new.details.notes)
            .fetch_one(&self.pool)
            .await?;

        row.try_into()
    }

    async fn get(&self, id: BookingId) -> Result<Option<Booking>, RepositoryError> {
        let sql = format!("SELECT {BOOKING_COLUMNS} FROM bookings WHERE id = $1");

        let row: Option<BookingRow> = sqlx::query_as(&sql)
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;

        row.map(Booking::try_from).transpose()
    }

    async fn list(&self) -> Result<Vec<Booking>, RepositoryError> {
        let sql = format!("SELECT {BOOKING_COLUMNS} FROM bookings ORDER BY created_at DESC");

        let rows: Vec<BookingRow> = sqlx::query_as(&sql).fetch_all(&self.pool).await?;

        rows.into_iter().map(Booking::try_from).collect()
    }

    async fn list_for_owner(&self, owner: &IdentityId) -> Result<Vec<Booking>, RepositoryError> {
        let sql = format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings WHERE owner_id = $1 ORDER BY created_at DESC"
        );

        let rows: Vec<BookingRow> = sqlx::query_as(&sql)
            .bind(owner.as_str())
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(Booking::try_from).collect()
    }

    async fn has_paid_booking(&self, owner: &IdentityId) -> Result<bool, RepositoryError> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM bookings WHERE owner_id = $1 AND payment_status = 'paid')",
        )
        .bind(owner.as_str())
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn reprice_to_base(&self, id: BookingId) -> Result<Option<Booking>, RepositoryError> {
        // Conditional on pending so a payment that lands first wins; the
        // paid price is never rewritten.
        let sql = format!(
            "UPDATE bookings SET final_price = base_price, offer_applied = FALSE \
             WHERE id = $1 AND offer_applied = TRUE AND payment_status = 'pending' \
             RETURNING {BOOKING_COLUMNS}"
        );

        let row: Option<BookingRow> = sqlx::query_as(&sql)
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;

        row.map(Booking::try_from).transpose()
    }

    async fn update_status(
        &self,
        id: BookingId,
        from: BookingStatus,
        to: BookingStatus,
    ) -> Result<Option<Booking>, RepositoryError> {
        // Conditional on the expected predecessor so a concurrent transition
        // cannot be silently overwritten. Price fields are never touched here.
        let sql = format!(
            "UPDATE bookings SET booking_status = $3 \
             WHERE id = $1 AND booking_status = $2 \
             RETURNING {BOOKING_COLUMNS}"
        );

        let row: Option<BookingRow> = sqlx::query_as(&sql)
            .bind(id.as_uuid())
            .bind(from.as_str())
            .bind(to.as_str())
            .fetch_optional(&self.pool)
            .await?;

        row.map(Booking::try_from).transpose()
    }

    async fn confirm_payment(
        &self,
        id: BookingId,
        payment_ref: &str,
    ) -> Result<PaymentOutcome, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let select_sql = format!("SELECT {BOOKING_COLUMNS} FROM bookings WHERE id = $1 FOR UPDATE");
        let row: Option<BookingRow> = sqlx::query_as(&select_sql)
            .bind(id.as_uuid())
            .fetch_optional(&mut *tx)
            .await?;

        let Some(row) = row else {
            return Err(RepositoryError::NotFound);
        };
        let booking = Booking::try_from(row)?;

        // Re-delivered callback: same resulting state, no further writes.
        if booking.payment_status == PaymentStatus::Paid {
            tx.rollback().await?;
            return Ok(PaymentOutcome::AlreadyPaid(booking));
        }

        let update_sql = format!(
            "UPDATE bookings SET \
               payment_status = 'paid', \
               payment_ref = $2, \
               booking_status = CASE WHEN booking_status = 'new' \
                                     THEN 'confirmed' ELSE booking_status END \
             WHERE id = $1 \
             RETURNING {BOOKING_COLUMNS}"
        );

        let updated: BookingRow = sqlx::query_as(&update_sql)
            .bind(id.as_uuid())
            .bind(payment_ref)
            .fetch_one(&mut *tx)
            .await?;

        // The offer flag flips in the same transaction as the paid
        // transition; a second concurrent payment sees the committed flag.
        if booking.offer_applied {
            sqlx::query(
                "UPDATE user_profiles SET offer_used = TRUE \
                 WHERE identity_id = $1 AND offer_used = FALSE",
            )
            .bind(booking.owner.as_str())
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Ok(PaymentOutcome::Confirmed(updated.try_into()?))
    }
}
