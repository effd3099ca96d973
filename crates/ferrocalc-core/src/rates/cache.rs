//! Freshness-based rate caching with idempotent upsert.
//!
//! For each request the manager runs a small state machine:
//!
//! ```text
//! Lookup ──fresh──▶ return stored snapshot
//!    │
//!    └─stale/missing──▶ fetch ──▶ normalize ──▶ upsert ──▶ return new snapshot
//! ```
//!
//! Two requests for the same stale base may both refresh. That is fine: both
//! derive the same snapshot from the same provider truth, and the store
//! replaces the record keyed by base atomically, so the last write wins and
//! exactly one snapshot per base remains.

use std::sync::Arc;
use std::time::Duration;

use log::{debug, warn};
use thiserror::Error;

use crate::rates::provider::{ProviderError, RateProvider};
use crate::store::RateStore;
use crate::{CurrencyCode, RateSnapshot, RateTable, UtcDateTime};

/// Defines how the manager uses the rate store for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CacheMode {
    /// Serve a fresh stored snapshot if present;
    /// otherwise fetch, store, and return a new one. (Default)
    #[default]
    Use,
    /// Always fetch from the provider and replace the stored snapshot.
    Refresh,
    /// Always fetch from the provider; never read or write the store.
    Bypass,
}

/// Rate cache tuning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateCacheConfig {
    /// Age after which a stored snapshot is stale.
    pub ttl: Duration,
    /// Currency the provider's factors are expressed against.
    pub reference: CurrencyCode,
}

impl Default for RateCacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(24 * 60 * 60),
            reference: CurrencyCode::usd(),
        }
    }
}

/// Request-level failures of a rate lookup.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RateError {
    #[error("rate provider unavailable: {0}")]
    ProviderUnavailable(ProviderError),
    #[error("currency '{currency}' is not quoted by the rate provider")]
    UnknownCurrency { currency: CurrencyCode },
}

impl RateError {
    /// Stable machine-readable code.
    pub const fn code(&self) -> &'static str {
        match self {
            Self::ProviderUnavailable(_) => "rates.provider_unavailable",
            Self::UnknownCurrency { .. } => "rates.unknown_currency",
        }
    }
}

/// A snapshot plus how it was obtained.
#[derive(Debug, Clone, PartialEq)]
pub struct RateLookup {
    pub snapshot: RateSnapshot,
    pub cache_hit: bool,
    /// Non-fatal problems, such as a failed store write.
    pub warnings: Vec<String>,
}

/// Serves rate snapshots from a [`RateStore`], refreshing them from a
/// [`RateProvider`] once they are older than the configured TTL.
#[derive(Clone)]
pub struct RateCacheManager {
    store: Arc<dyn RateStore>,
    provider: Arc<dyn RateProvider>,
    config: RateCacheConfig,
}

impl RateCacheManager {
    pub fn new(
        store: Arc<dyn RateStore>,
        provider: Arc<dyn RateProvider>,
        config: RateCacheConfig,
    ) -> Self {
        Self {
            store,
            provider,
            config,
        }
    }

    pub fn config(&self) -> &RateCacheConfig {
        &self.config
    }

    /// Returns rates for `base` using [`CacheMode::Use`].
    pub async fn get_rates(&self, base: &CurrencyCode) -> Result<RateLookup, RateError> {
        self.get_rates_with_mode(base, CacheMode::Use).await
    }

    /// Returns rates for `base`.
    ///
    /// # Errors
    ///
    /// - [`RateError::ProviderUnavailable`] when a refresh was needed and the
    ///   provider failed or returned an unusable table. An expired snapshot is
    ///   never served in its place.
    /// - [`RateError::UnknownCurrency`] when the provider does not quote `base`.
    pub async fn get_rates_with_mode(
        &self,
        base: &CurrencyCode,
        mode: CacheMode,
    ) -> Result<RateLookup, RateError> {
        let mut warnings = Vec::new();

        if mode == CacheMode::Use {
            if let Some(snapshot) = self.lookup_fresh(base, &mut warnings).await {
                return Ok(RateLookup {
                    snapshot,
                    cache_hit: true,
                    warnings,
                });
            }
        }

        let snapshot = self.refresh(base).await?;

        if mode != CacheMode::Bypass {
            if let Err(error) = self.store.upsert(base, &snapshot).await {
                warn!("rate store upsert for {base} failed: {error}");
                warnings.push(format!("rate store write failed: {error}"));
            }
        }

        Ok(RateLookup {
            snapshot,
            cache_hit: false,
            warnings,
        })
    }

    async fn lookup_fresh(
        &self,
        base: &CurrencyCode,
        warnings: &mut Vec<String>,
    ) -> Option<RateSnapshot> {
        let stored = match self.store.find(base).await {
            Ok(stored) => stored?,
            Err(error) => {
                // An unreadable cache is a miss; the provider is still authoritative.
                warn!("rate store lookup for {base} failed: {error}");
                warnings.push(format!("rate store read failed: {error}"));
                return None;
            }
        };

        let age = UtcDateTime::now().saturating_since(stored.fetched_at());
        if age < self.config.ttl {
            debug!("serving cached rates for {base} (age {}s)", age.as_secs());
            Some(stored)
        } else {
            debug!("cached rates for {base} are stale (age {}s)", age.as_secs());
            None
        }
    }

    async fn refresh(&self, base: &CurrencyCode) -> Result<RateSnapshot, RateError> {
        debug!("fetching rates from provider '{}' for {base}", self.provider.name());
        let table = self
            .provider
            .fetch()
            .await
            .map_err(RateError::ProviderUnavailable)?;

        let rates = normalize(&table, base, &self.config.reference)?;
        RateSnapshot::new(base.clone(), rates, UtcDateTime::now()).map_err(|error| {
            RateError::ProviderUnavailable(ProviderError::invalid_response(error.to_string()))
        })
    }
}

/// Re-expresses a reference-currency table relative to `base`.
///
/// The reference currency is implicitly `1.0` when the provider omits it.
/// Every factor is divided by the factor of `base`, and `base` itself is
/// pinned to exactly `1.0`.
pub fn normalize(
    table: &RateTable,
    base: &CurrencyCode,
    reference: &CurrencyCode,
) -> Result<RateTable, RateError> {
    let mut table = table.clone();
    table.entry(reference.clone()).or_insert(1.0);

    let base_factor = match table.get(base) {
        Some(factor) if factor.is_finite() && *factor > 0.0 => *factor,
        _ => {
            return Err(RateError::UnknownCurrency {
                currency: base.clone(),
            })
        }
    };

    let mut normalized: RateTable = table
        .into_iter()
        .map(|(currency, factor)| (currency, factor / base_factor))
        .collect();
    normalized.insert(base.clone(), 1.0);
    Ok(normalized)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn code(raw: &str) -> CurrencyCode {
        CurrencyCode::parse(raw).expect("valid code")
    }

    fn usd_table() -> RateTable {
        [("USD", 1.0), ("EUR", 0.5), ("JPY", 150.0)]
            .into_iter()
            .map(|(raw, factor)| (code(raw), factor))
            .collect()
    }

    #[test]
    fn normalizing_to_reference_keeps_factors() {
        let normalized = normalize(&usd_table(), &code("USD"), &code("USD")).expect("normalize");
        assert_eq!(normalized, usd_table());
    }

    #[test]
    fn normalizing_divides_by_the_base_factor() {
        let normalized = normalize(&usd_table(), &code("EUR"), &code("USD")).expect("normalize");

        assert_eq!(normalized.get(&code("EUR")), Some(&1.0));
        assert_eq!(normalized.get(&code("USD")), Some(&2.0));
        assert_eq!(normalized.get(&code("JPY")), Some(&300.0));
    }

    #[test]
    fn missing_reference_is_implicitly_unit() {
        let table: RateTable = [(code("EUR"), 0.5)].into_iter().collect();
        let normalized = normalize(&table, &code("EUR"), &code("USD")).expect("normalize");
        assert_eq!(normalized.get(&code("USD")), Some(&2.0));
    }

    #[test]
    fn unknown_base_is_rejected() {
        let err = normalize(&usd_table(), &code("CHF"), &code("USD")).expect_err("must fail");
        assert_eq!(
            err,
            RateError::UnknownCurrency {
                currency: code("CHF")
            }
        );
        assert_eq!(err.code(), "rates.unknown_currency");
    }

    #[test]
    fn zero_base_factor_is_rejected() {
        let mut table = usd_table();
        table.insert(code("XAU"), 0.0);
        assert!(normalize(&table, &code("XAU"), &code("USD")).is_err());
    }

    #[test]
    fn default_config_uses_a_day_and_usd() {
        let config = RateCacheConfig::default();
        assert_eq!(config.ttl, Duration::from_secs(86_400));
        assert_eq!(config.reference, CurrencyCode::usd());
        assert_eq!(CacheMode::default(), CacheMode::Use);
    }
}
