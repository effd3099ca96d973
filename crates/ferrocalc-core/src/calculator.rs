//! The calculator façade: the entry points the service layer calls.
//!
//! | Method | Description |
//! |--------|-------------|
//! | [`Calculator::calculate`] | Evaluate an expression and record it in history |
//! | [`Calculator::get_rates`] | Rates for a base currency, via the TTL cache |
//! | [`Calculator::history`] | Most recent calculations |
//! | [`Calculator::delete_calculation`] | Remove one calculation by id |

use std::sync::Arc;

use log::{debug, warn};
use serde::Serialize;

use crate::expression::{evaluate_expression, format_result, CalculationError, EvalLimits};
use crate::rates::{CacheMode, RateCacheConfig, RateCacheManager, RateError, RateLookup, RateProvider};
use crate::store::{DeleteOutcome, HistoryStore, RateStore, StoreError};
use crate::{CalculationRecord, CurrencyCode, RecordId, UtcDateTime};

/// Number of history records returned when the caller does not ask for a limit.
pub const DEFAULT_HISTORY_LIMIT: usize = 50;

/// Calculator tuning.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CalculatorConfig {
    pub limits: EvalLimits,
    pub rates: RateCacheConfig,
}

/// A successful evaluation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Calculation {
    pub expression: String,
    pub result: String,
    #[serde(skip)]
    pub value: f64,
    /// Identifier of the history record, absent when persisting failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record_id: Option<RecordId>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

/// Evaluates expressions, records them, and serves currency rates.
///
/// All collaborators are injected, so the same calculator runs against the
/// in-memory stores in tests and the DuckDB warehouse in the binary.
#[derive(Clone)]
pub struct Calculator {
    history: Arc<dyn HistoryStore>,
    rates: RateCacheManager,
    limits: EvalLimits,
}

impl Calculator {
    pub fn new(
        history: Arc<dyn HistoryStore>,
        rate_store: Arc<dyn RateStore>,
        provider: Arc<dyn RateProvider>,
        config: CalculatorConfig,
    ) -> Self {
        Self {
            history,
            rates: RateCacheManager::new(rate_store, provider, config.rates),
            limits: config.limits,
        }
    }

    pub fn limits(&self) -> &EvalLimits {
        &self.limits
    }

    /// Evaluates `expression` and appends it to history.
    ///
    /// A history write failure never fails the calculation; it is logged and
    /// reported in [`Calculation::warnings`].
    ///
    /// # Errors
    ///
    /// Returns [`CalculationError`] when the text does not tokenize, parse,
    /// or evaluate. Failed calculations are not recorded.
    pub async fn calculate(&self, expression: &str) -> Result<Calculation, CalculationError> {
        let value = evaluate_expression(expression, &self.limits)?;
        let result = format_result(value);
        debug!("evaluated '{expression}' = {result}");

        let mut warnings = Vec::new();
        let record_id = match self
            .history
            .append(expression, &result, UtcDateTime::now())
            .await
        {
            Ok(id) => Some(id),
            Err(error) => {
                warn!("failed to record calculation '{expression}': {error}");
                warnings.push(format!("history write failed: {error}"));
                None
            }
        };

        Ok(Calculation {
            expression: expression.to_owned(),
            result,
            value,
            record_id,
            warnings,
        })
    }

    /// Returns rates for `base`, refreshing them when the cached copy is stale.
    pub async fn get_rates(&self, base: &CurrencyCode) -> Result<RateLookup, RateError> {
        self.rates.get_rates(base).await
    }

    pub async fn get_rates_with_mode(
        &self,
        base: &CurrencyCode,
        mode: CacheMode,
    ) -> Result<RateLookup, RateError> {
        self.rates.get_rates_with_mode(base, mode).await
    }

    /// Returns at most `limit` calculations, most recent first.
    pub async fn history(&self, limit: usize) -> Result<Vec<CalculationRecord>, StoreError> {
        if limit == 0 {
            return Ok(Vec::new());
        }
        self.history.list(limit).await
    }

    pub async fn delete_calculation(&self, id: RecordId) -> Result<DeleteOutcome, StoreError> {
        self.history.delete(id).await
    }
}
