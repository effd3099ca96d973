//! # Domain Models
//!
//! Canonical domain types shared by the calculator, the rate cache, and the
//! stores.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`CurrencyCode`] | Validated three-letter currency code |
//! | [`RateSnapshot`] | Rates for one base currency, base pinned to 1.0 |
//! | [`RateTable`] | Currency-to-factor mapping |
//! | [`CalculationRecord`] | A persisted evaluation |
//! | [`RecordId`] | Identifier of a persisted evaluation |
//! | [`UtcDateTime`] | UTC timestamp |
//!
//! All types validate their invariants at construction time, so a value that
//! exists is a value that can be trusted.

mod currency;
mod models;
mod timestamp;

pub use currency::CurrencyCode;
pub use models::{CalculationRecord, RateSnapshot, RateTable, RecordId};
pub use timestamp::UtcDateTime;
