//! An exact monetary amount with two decimal places.
//!
//! Amounts are held as a [Decimal] in memory and stored as an integer number
//! of cents in the database, so sums computed by SQLite are exact.

use std::{
    fmt::Display,
    ops::{Add, AddAssign, Sub},
};

use rusqlite::types::{FromSql, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use rust_decimal::{Decimal, prelude::ToPrimitive};
use serde::{Deserialize, Serialize};

use crate::Error;

/// The number of decimal places kept for every amount.
const CENT_SCALE: u32 = 2;

/// An amount of money, e.g. an account balance or the value of a transaction.
///
/// Serializes to JSON as a string with two decimal places, e.g. `"30.00"`.
/// Deserializes from either a JSON string or number, rejecting values with
/// more than two decimal places.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "Decimal")]
pub struct Money(Decimal);

impl Money {
    /// Zero dollars.
    pub fn zero() -> Self {
        Self::from_cents(0)
    }

    /// Create an amount from a whole number of cents.
    pub fn from_cents(cents: i64) -> Self {
        Self(Decimal::new(cents, CENT_SCALE))
    }

    /// The amount as a whole number of cents, or `None` if it does not fit in an `i64`.
    pub fn cents(&self) -> Option<i64> {
        (self.0 * Decimal::ONE_HUNDRED).trunc().to_i64()
    }

    /// Whether the amount is strictly greater than zero.
    pub fn is_positive(&self) -> bool {
        self.0 > Decimal::ZERO
    }

    /// Whether the amount is exactly zero.
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Whether the amount is strictly less than zero.
    pub fn is_negative(&self) -> bool {
        self.0 < Decimal::ZERO
    }
}

impl TryFrom<Decimal> for Money {
    type Error = Error;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        if value.normalize().scale() > CENT_SCALE {
            return Err(Error::Validation(
                "Amount cannot have more than two decimal places.".to_owned(),
            ));
        }

        let mut amount = value;
        amount.rescale(CENT_SCALE);

        if i64::try_from(amount.mantissa()).is_err() {
            return Err(Error::Validation("Amount is too large.".to_owned()));
        }

        Ok(Self(amount))
    }
}

impl Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Self) -> Self::Output {
        Money(self.0 + rhs.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl Sub for Money {
    type Output = Money;

    fn sub(self, rhs: Self) -> Self::Output {
        Money(self.0 - rhs.0)
    }
}

impl ToSql for Money {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        let cents = self.cents().ok_or_else(|| {
            rusqlite::Error::ToSqlConversionFailure(
                format!("{self} is too large to store as cents").into(),
            )
        })?;

        Ok(ToSqlOutput::from(cents))
    }
}

impl FromSql for Money {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        i64::column_result(value).map(Money::from_cents)
    }
}
