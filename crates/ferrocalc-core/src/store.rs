//! Collaborator contracts for persistence.
//!
//! The calculator never talks to a database directly. It is handed a
//! [`HistoryStore`] and a [`RateStore`], which may be the in-memory stores in
//! [`crate::memory`] or the DuckDB warehouse.
//!
//! | Trait | Method | Contract |
//! |-------|--------|----------|
//! | [`HistoryStore`] | `append` | insert one record, return its id |
//! | [`HistoryStore`] | `list` | up to `limit` records, newest first |
//! | [`HistoryStore`] | `delete` | remove by id, report found/not found |
//! | [`RateStore`] | `find` | the snapshot for a base, if any |
//! | [`RateStore`] | `upsert` | replace the single snapshot keyed by base |
//!
//! # Thread Safety
//!
//! Implementations must be `Send + Sync`; they are shared behind `Arc` across
//! concurrently running requests. `upsert` must replace the whole snapshot in
//! one step so no reader observes a half-written table.

use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;

use crate::{CalculationRecord, CurrencyCode, RateSnapshot, RecordId, UtcDateTime};

/// Boxed future returned by store methods.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + Send + 'a>>;

/// Outcome of deleting a history record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Found,
    NotFound,
}

/// Store failure classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreErrorKind {
    Unavailable,
    Corrupt,
    Internal,
}

/// Structured store error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreError {
    kind: StoreErrorKind,
    message: String,
}

impl StoreError {
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self {
            kind: StoreErrorKind::Unavailable,
            message: message.into(),
        }
    }

    pub fn corrupt(message: impl Into<String>) -> Self {
        Self {
            kind: StoreErrorKind::Corrupt,
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            kind: StoreErrorKind::Internal,
            message: message.into(),
        }
    }

    pub const fn kind(&self) -> StoreErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn code(&self) -> &'static str {
        match self.kind {
            StoreErrorKind::Unavailable => "store.unavailable",
            StoreErrorKind::Corrupt => "store.corrupt",
            StoreErrorKind::Internal => "store.internal",
        }
    }
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code())
    }
}

impl std::error::Error for StoreError {}

/// Persistent collection of calculation records.
pub trait HistoryStore: Send + Sync {
    /// Inserts a record and returns the identifier the store assigned.
    fn append<'a>(
        &'a self,
        expression: &'a str,
        result: &'a str,
        timestamp: UtcDateTime,
    ) -> StoreFuture<'a, RecordId>;

    /// Returns at most `limit` records, most recent first.
    fn list(&self, limit: usize) -> StoreFuture<'_, Vec<CalculationRecord>>;

    fn delete(&self, id: RecordId) -> StoreFuture<'_, DeleteOutcome>;
}

/// Persistent rate snapshots, one per base currency.
pub trait RateStore: Send + Sync {
    fn find<'a>(&'a self, base: &'a CurrencyCode) -> StoreFuture<'a, Option<RateSnapshot>>;

    /// Replaces whatever snapshot is stored for `base` with `snapshot`.
    fn upsert<'a>(
        &'a self,
        base: &'a CurrencyCode,
        snapshot: &'a RateSnapshot,
    ) -> StoreFuture<'a, ()>;
}
