use crate::error::{BrokerageError, Result};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

const NANOS_PER_UNIT: i128 = 1_000_000_000;

/// Fixed-point currency amount: whole `units` plus `nanos` (1e-9 units).
///
/// Like `Duration`, `nanos` carries the sign of `units`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Money {
    pub currency: String,
    pub units: i64,
    pub nanos: i32,
}

impl Money {
    pub fn new(currency: impl Into<String>, units: i64, nanos: i32) -> Self {
        Self::from_nanos(
            currency,
            units as i128 * NANOS_PER_UNIT + nanos as i128,
        )
    }

    pub fn from_nanos(currency: impl Into<String>, total: i128) -> Self {
        Self {
            currency: currency.into(),
            units: (total / NANOS_PER_UNIT) as i64,
            nanos: (total % NANOS_PER_UNIT) as i32,
        }
    }

    pub fn as_nanos(&self) -> i128 {
        self.units as i128 * NANOS_PER_UNIT + self.nanos as i128
    }

    fn same_currency(&self, other: &Money) -> Result<()> {
        if self.currency != other.currency {
            return Err(BrokerageError::CurrencyMismatch {
                left: self.currency.clone(),
                right: other.currency.clone(),
            });
        }
        Ok(())
    }

    /// Compare two amounts of the same currency
    pub fn try_cmp(&self, other: &Money) -> Result<Ordering> {
        self.same_currency(other)?;
        Ok(self.as_nanos().cmp(&other.as_nanos()))
    }

    pub fn try_add(&self, other: &Money) -> Result<Money> {
        self.same_currency(other)?;
        Ok(Money::from_nanos(
            self.currency.clone(),
            self.as_nanos() + other.as_nanos(),
        ))
    }

    pub fn try_sub(&self, other: &Money) -> Result<Money> {
        self.same_currency(other)?;
        Ok(Money::from_nanos(
            self.currency.clone(),
            self.as_nanos() - other.as_nanos(),
        ))
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.units < 0 || self.nanos < 0 { "-" } else { "" };
        write!(
            f,
            "{}{}.{:09} {}",
            sign,
            self.units.unsigned_abs(),
            self.nanos.unsigned_abs(),
            self.currency
        )
    }
}
