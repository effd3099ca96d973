//! Rate provider contract and the bundled static provider.

use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;

use crate::{CurrencyCode, RateTable};

/// Provider failure classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderErrorKind {
    Unavailable,
    InvalidResponse,
}

/// Structured provider error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderError {
    kind: ProviderErrorKind,
    message: String,
}

impl ProviderError {
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self {
            kind: ProviderErrorKind::Unavailable,
            message: message.into(),
        }
    }

    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self {
            kind: ProviderErrorKind::InvalidResponse,
            message: message.into(),
        }
    }

    pub const fn kind(&self) -> ProviderErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn code(&self) -> &'static str {
        match self.kind {
            ProviderErrorKind::Unavailable => "provider.unavailable",
            ProviderErrorKind::InvalidResponse => "provider.invalid_response",
        }
    }
}

impl Display for ProviderError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code())
    }
}

impl std::error::Error for ProviderError {}

/// Source of truth for conversion rates.
///
/// `fetch` returns factors relative to the reference currency configured on
/// the [`RateCacheManager`](super::RateCacheManager): `1 reference = factor
/// units of key`. The call is made once per refresh and never retried; any
/// timeout belongs to the transport behind the implementation.
pub trait RateProvider: Send + Sync {
    /// Short identifier used in log records.
    fn name(&self) -> &'static str;

    fn fetch<'a>(
        &'a self,
    ) -> Pin<Box<dyn Future<Output = Result<RateTable, ProviderError>> + Send + 'a>>;
}

/// Fixed rate table, usable offline.
#[derive(Debug, Clone, PartialEq)]
pub struct StaticRateProvider {
    table: RateTable,
}

impl StaticRateProvider {
    pub fn new(table: RateTable) -> Self {
        Self { table }
    }
}

impl Default for StaticRateProvider {
    /// USD-referenced table with the major currencies.
    fn default() -> Self {
        let table = [
            ("USD", 1.0),
            ("EUR", 0.93),
            ("GBP", 0.79),
            ("JPY", 151.15),
            ("CNY", 7.24),
            ("RUB", 92.5),
        ]
        .into_iter()
        .filter_map(|(code, factor)| CurrencyCode::parse(code).ok().map(|code| (code, factor)))
        .collect();

        Self::new(table)
    }
}

impl RateProvider for StaticRateProvider {
    fn name(&self) -> &'static str {
        "static"
    }

    fn fetch<'a>(
        &'a self,
    ) -> Pin<Box<dyn Future<Output = Result<RateTable, ProviderError>> + Send + 'a>> {
        Box::pin(async move { Ok(self.table.clone()) })
    }
}
