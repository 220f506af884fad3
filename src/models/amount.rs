use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Currency used by the provider for all voucher prices.
pub const DEFAULT_CURRENCY: &str = "EUR";

/// Structured monetary amount.
///
/// The provider's wire format carries prices as integer minor units
/// (eurocents); the local API exposes them as decimal values. Conversions in
/// both directions go through this type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Amount {
    pub value: Decimal,
    pub currency: String,
}

impl Amount {
    pub fn new(value: Decimal, currency: impl Into<String>) -> Self {
        Self {
            value,
            currency: currency.into(),
        }
    }

    pub fn zero() -> Self {
        Self::from_minor_units(0)
    }

    /// Builds an amount from integer minor units (two decimal places).
    pub fn from_minor_units(minor: i64) -> Self {
        Self {
            value: Decimal::new(minor, 2),
            currency: DEFAULT_CURRENCY.to_string(),
        }
    }

    /// Converts to integer minor units, rounding half-up on sub-cent values.
    pub fn to_minor_units(&self) -> i64 {
        (self.value * Decimal::from(100))
            .round()
            .to_i64()
            .unwrap_or(0)
    }
}

impl Default for Amount {
    fn default() -> Self {
        Self::zero()
    }
}
