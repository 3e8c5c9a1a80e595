//! Non-negative catalog price using decimal arithmetic.

use core::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Errors that can occur when constructing a [`Price`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceError {
    /// The amount is below zero.
    #[error("price cannot be negative")]
    Negative,

    /// More than two decimal places.
    #[error("price cannot have more than {MAX_SCALE} decimal places")]
    TooPrecise,

    /// Does not fit `NUMERIC(12, 2)`.
    #[error("price must be below 10000000000")]
    TooLarge,
}

/// Decimal places kept by the price column.
pub const MAX_SCALE: u32 = 2;

/// Exclusive upper bound: ten integer digits.
const UPPER_BOUND: i64 = 10_000_000_000;

/// A product price in the store currency.
///
/// Stored as `NUMERIC(12, 2)`; JSON carries it as a plain number
/// (`9.99`), not a string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "PriceRepr", into = "PriceRepr")]
pub struct Price(Decimal);

impl Price {
    /// Create a price that the database stores without rounding.
    ///
    /// Trailing zeros do not count towards the scale, so `9.990` is
    /// accepted as `9.99`.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::Negative`] if `amount < 0`,
    /// [`PriceError::TooPrecise`] if it has more than two decimal places,
    /// and [`PriceError::TooLarge`] if it is `10^10` or more.
    pub fn new(amount: Decimal) -> Result<Self, PriceError> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(PriceError::Negative);
        }
        let amount = amount.normalize();
        if amount.scale() > MAX_SCALE {
            return Err(PriceError::TooPrecise);
        }
        if amount >= Decimal::from(UPPER_BOUND) {
            return Err(PriceError::TooLarge);
        }
        Ok(Self(amount))
    }

    /// The decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl TryFrom<Decimal> for Price {
    type Error = PriceError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

#[derive(Serialize, Deserialize)]
#[serde(transparent)]
struct PriceRepr(#[serde(with = "rust_decimal::serde::float")] Decimal);

impl TryFrom<PriceRepr> for Price {
    type Error = PriceError;

    fn try_from(value: PriceRepr) -> Result<Self, Self::Error> {
        Self::new(value.0)
    }
}

impl From<Price> for PriceRepr {
    fn from(price: Price) -> Self {
        Self(price.0)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for Price {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <Decimal as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <Decimal as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Price {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let amount = <Decimal as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(Self::new(amount)?)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for Price {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <Decimal as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}
