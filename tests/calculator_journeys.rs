//! User journeys through the calculator façade
//!
//! Each test follows a caller through calculate, history, delete, and rates
//! against in-memory stores, plus a history store that always fails.

use std::sync::Arc;

use ferrocalc_core::{
    CalculationRecord, Calculator, CalculatorConfig, CurrencyCode, DeleteOutcome, EvalLimits,
    HistoryStore, InMemoryHistoryStore, InMemoryRateStore, RecordId, StaticRateProvider,
    StoreError, StoreFuture, UtcDateTime, DEFAULT_HISTORY_LIMIT,
};

/// History store whose every operation fails.
struct UnavailableHistory;

impl HistoryStore for UnavailableHistory {
    fn append<'a>(
        &'a self,
        _expression: &'a str,
        _result: &'a str,
        _timestamp: UtcDateTime,
    ) -> StoreFuture<'a, RecordId> {
        Box::pin(async { Err(StoreError::unavailable("history offline")) })
    }

    fn list(&self, _limit: usize) -> StoreFuture<'_, Vec<CalculationRecord>> {
        Box::pin(async { Err(StoreError::unavailable("history offline")) })
    }

    fn delete(&self, _id: RecordId) -> StoreFuture<'_, DeleteOutcome> {
        Box::pin(async { Err(StoreError::unavailable("history offline")) })
    }
}

fn calculator_with(history: Arc<dyn HistoryStore>) -> Calculator {
    Calculator::new(
        history,
        Arc::new(InMemoryRateStore::new()),
        Arc::new(StaticRateProvider::default()),
        CalculatorConfig::default(),
    )
}

#[tokio::test]
async fn when_history_store_is_down_then_calculation_still_succeeds() {
    // Given: a calculator whose history store rejects every write
    let calculator = calculator_with(Arc::new(UnavailableHistory));

    // When: the user calculates
    let calculation = calculator.calculate("2+3*4").await.expect("calculates");

    // Then: the result is returned, with a warning instead of a record id
    assert_eq!(calculation.result, "14");
    assert_eq!(calculation.record_id, None);
    assert_eq!(calculation.warnings.len(), 1);
    assert!(calculation.warnings[0].contains("store.unavailable"));
}

#[tokio::test]
async fn when_history_store_is_down_then_listing_reports_the_store_error() {
    let calculator = calculator_with(Arc::new(UnavailableHistory));

    let error = calculator
        .history(DEFAULT_HISTORY_LIMIT)
        .await
        .expect_err("must fail");
    assert_eq!(error.code(), "store.unavailable");
}

#[tokio::test]
async fn when_user_calculates_several_times_then_history_lists_newest_first() {
    // Given: three calculations in order
    let calculator = calculator_with(Arc::new(InMemoryHistoryStore::new()));
    for expression in ["1+1", "2*3", "2^10"] {
        calculator.calculate(expression).await.expect("calculates");
    }

    // When: the user asks for the two most recent
    let records = calculator.history(2).await.expect("history");

    // Then: the latest comes first
    let expressions: Vec<&str> = records.iter().map(|r| r.expression.as_str()).collect();
    assert_eq!(expressions, vec!["2^10", "2*3"]);
    assert_eq!(records[0].result, "1024");
}

#[tokio::test]
async fn when_user_deletes_a_calculation_then_it_leaves_history() {
    // Given: two recorded calculations
    let calculator = calculator_with(Arc::new(InMemoryHistoryStore::new()));
    let kept = calculator.calculate("1+1").await.expect("calculates");
    let removed = calculator.calculate("9/3").await.expect("calculates");
    let removed_id = removed.record_id.expect("recorded");

    // When: one is deleted
    let outcome = calculator
        .delete_calculation(removed_id)
        .await
        .expect("delete");

    // Then: it is gone, the other remains, and a repeat delete finds nothing
    assert_eq!(outcome, DeleteOutcome::Found);
    let records = calculator.history(DEFAULT_HISTORY_LIMIT).await.expect("history");
    assert_eq!(records.len(), 1);
    assert_eq!(Some(records[0].id), kept.record_id);
    assert_eq!(
        calculator.delete_calculation(removed_id).await,
        Ok(DeleteOutcome::NotFound)
    );
}

#[tokio::test]
async fn when_calculation_fails_then_nothing_is_recorded() {
    let history = InMemoryHistoryStore::new();
    let calculator = calculator_with(Arc::new(history.clone()));

    for text in ["5/0", "3+@", "(1+2", "10^20"] {
        calculator.calculate(text).await.expect_err("must fail");
    }

    assert!(history.is_empty().await);
}

#[tokio::test]
async fn when_limits_are_tightened_then_calculator_enforces_them() {
    let calculator = Calculator::new(
        Arc::new(InMemoryHistoryStore::new()),
        Arc::new(InMemoryRateStore::new()),
        Arc::new(StaticRateProvider::default()),
        CalculatorConfig {
            limits: EvalLimits {
                max_magnitude: 100.0,
                ..EvalLimits::default()
            },
            ..CalculatorConfig::default()
        },
    );

    assert_eq!(calculator.calculate("10^2").await.expect("at bound").result, "100");
    let error = calculator.calculate("10^3").await.expect_err("over bound");
    assert_eq!(error.code(), "calc.overflow");
}

#[tokio::test]
async fn when_user_asks_for_rates_twice_then_second_answer_is_cached() {
    let calculator = calculator_with(Arc::new(InMemoryHistoryStore::new()));
    let eur = CurrencyCode::parse("eur").expect("valid code");

    let first = calculator.get_rates(&eur).await.expect("rates");
    let second = calculator.get_rates(&eur).await.expect("rates");

    assert!(!first.cache_hit);
    assert!(second.cache_hit);
    assert_eq!(first.snapshot, second.snapshot);
    assert_eq!(second.snapshot.rate(&eur), Some(1.0));
}
