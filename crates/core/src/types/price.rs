//! Type-safe price representation.
//!
//! All StoryCuts packages are priced in whole rupees, so prices are an `i64`
//! rupee amount rather than a decimal. The payment gateway bills in paise;
//! [`Price::minor_units`] is the only conversion point.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Paise per rupee, the gateway's minor currency unit.
const MINOR_UNITS_PER_RUPEE: i64 = 100;

/// A price in whole rupees (INR).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(i64);

impl Price {
    /// ISO 4217 code for the only currency we bill in.
    pub const CURRENCY: &'static str = "INR";

    /// Create a price from a rupee amount.
    #[must_use]
    pub const fn new(rupees: i64) -> Self {
        Self(rupees)
    }

    /// The rupee amount.
    #[must_use]
    pub const fn rupees(&self) -> i64 {
        self.0
    }

    /// The amount in the gateway's minor unit (paise).
    #[must_use]
    pub const fn minor_units(&self) -> i64 {
        self.0 * MINOR_UNITS_PER_RUPEE
    }

    /// Whether this is a billable amount.
    #[must_use]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\u{20b9}{}", self.0)
    }
}

impl From<i64> for Price {
    fn from(rupees: i64) -> Self {
        Self(rupees)
    }
}

impl From<Price> for i64 {
    fn from(price: Price) -> Self {
        price.0
    }
}

// SQLx support (with postgres feature)
#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for Price {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <i64 as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <i64 as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Price {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let rupees = <i64 as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(Self(rupees))
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for Price {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <i64 as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}
