use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{CurrencyCode, UtcDateTime, ValidationError};

/// Conversion factors keyed by currency: `1 base = factor units of key`.
pub type RateTable = BTreeMap<CurrencyCode, f64>;

/// Store-assigned identifier of a persisted calculation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RecordId(Uuid);

impl RecordId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        Uuid::parse_str(input.trim())
            .map(Self)
            .map_err(|_| ValidationError::InvalidRecordId {
                value: input.to_owned(),
            })
    }
}

impl Display for RecordId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

impl TryFrom<String> for RecordId {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<RecordId> for String {
    fn from(value: RecordId) -> Self {
        value.to_string()
    }
}

/// One persisted evaluation. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationRecord {
    pub id: RecordId,
    pub expression: String,
    pub result: String,
    pub timestamp: UtcDateTime,
}

/// Rates for one base currency at the instant they were fetched.
///
/// The constructor enforces `rates[base] == 1.0` and that every factor is
/// finite and positive, so a snapshot that exists is always usable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "UncheckedRateSnapshot")]
pub struct RateSnapshot {
    base: CurrencyCode,
    rates: RateTable,
    fetched_at: UtcDateTime,
}

impl RateSnapshot {
    pub fn new(
        base: CurrencyCode,
        rates: RateTable,
        fetched_at: UtcDateTime,
    ) -> Result<Self, ValidationError> {
        for (currency, factor) in &rates {
            if !factor.is_finite() || *factor <= 0.0 {
                return Err(ValidationError::InvalidRate {
                    currency: currency.to_string(),
                });
            }
        }

        if rates.get(&base).copied() != Some(1.0) {
            return Err(ValidationError::BaseNotUnit {
                base: base.to_string(),
            });
        }

        Ok(Self {
            base,
            rates,
            fetched_at,
        })
    }

    pub fn base(&self) -> &CurrencyCode {
        &self.base
    }

    pub fn rates(&self) -> &RateTable {
        &self.rates
    }

    pub fn rate(&self, currency: &CurrencyCode) -> Option<f64> {
        self.rates.get(currency).copied()
    }

    pub fn fetched_at(&self) -> UtcDateTime {
        self.fetched_at
    }
}

#[derive(Deserialize)]
struct UncheckedRateSnapshot {
    base: CurrencyCode,
    rates: RateTable,
    fetched_at: UtcDateTime,
}

impl TryFrom<UncheckedRateSnapshot> for RateSnapshot {
    type Error = ValidationError;

    fn try_from(value: UncheckedRateSnapshot) -> Result<Self, Self::Error> {
        Self::new(value.base, value.rates, value.fetched_at)
    }
}
