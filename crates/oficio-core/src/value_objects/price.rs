//! Price - a positive amount of money in centavos
//!
//! Money never travels as a float: amounts are integer centavos end to end,
//! including what is sent to the payment gateway.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A quote price in centavos (BRL cents). Always strictly positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(i64);

impl Price {
    /// Build a price from centavos. Rejects zero and negative amounts.
    pub fn from_centavos(centavos: i64) -> Result<Self, PriceError> {
        if centavos <= 0 {
            return Err(PriceError::NotPositive(centavos));
        }
        Ok(Self(centavos))
    }

    /// Amount in centavos
    #[inline]
    pub const fn centavos(self) -> i64 {
        self.0
    }

    /// Whole-real part, for display
    #[inline]
    pub const fn reais(self) -> i64 {
        self.0 / 100
    }
}

/// Error building a [`Price`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PriceError {
    #[error("price must be positive, got {0} centavos")]
    NotPositive(i64),
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "R$ {},{:02}", self.0 / 100, self.0 % 100)
    }
}

impl TryFrom<i64> for Price {
    type Error = PriceError;

    fn try_from(centavos: i64) -> Result<Self, Self::Error> {
        Self::from_centavos(centavos)
    }
}

impl From<Price> for i64 {
    fn from(price: Price) -> Self {
        price.0
    }
}
