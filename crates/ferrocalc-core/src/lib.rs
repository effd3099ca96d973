//! # Ferrocalc Core
//!
//! Expression engine, currency rate cache, and persistence contracts for the
//! Ferrocalc calculator service.
//!
//! ## Overview
//!
//! - **Expression engine**: lexer, recursive-descent parser, and evaluator
//!   for arithmetic over `+ - * / ^`, parentheses, and unary minus
//! - **Rate cache**: TTL-based freshness over a pluggable rate provider, with
//!   normalization to any quoted base currency
//! - **Store contracts** for calculation history and rate snapshots, plus
//!   in-memory implementations
//! - **Calculator façade** wiring the above together
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`calculator`] | Calculate, GetRates, History, DeleteCalculation |
//! | [`domain`] | Currency codes, records, snapshots, timestamps |
//! | [`error`] | Domain validation errors |
//! | [`expression`] | Tokenizer, parser, AST, evaluator |
//! | [`memory`] | In-memory history and rate stores |
//! | [`rates`] | Rate providers and the TTL cache manager |
//! | [`store`] | `HistoryStore` and `RateStore` traits |
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use ferrocalc_core::{
//!     Calculator, CalculatorConfig, CurrencyCode, InMemoryHistoryStore, InMemoryRateStore,
//!     StaticRateProvider,
//! };
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let calculator = Calculator::new(
//!     Arc::new(InMemoryHistoryStore::new()),
//!     Arc::new(InMemoryRateStore::new()),
//!     Arc::new(StaticRateProvider::default()),
//!     CalculatorConfig::default(),
//! );
//!
//! let calculation = calculator.calculate("2 + 3 * 4").await?;
//! assert_eq!(calculation.result, "14");
//!
//! let lookup = calculator.get_rates(&CurrencyCode::parse("EUR")?).await?;
//! assert_eq!(lookup.snapshot.rate(&CurrencyCode::parse("EUR")?), Some(1.0));
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! Every request-level error carries a stable code:
//!
//! ```rust
//! use ferrocalc_core::{evaluate_expression, EvalLimits};
//!
//! let error = evaluate_expression("5 / 0", &EvalLimits::default()).unwrap_err();
//! assert_eq!(error.code(), "calc.division_by_zero");
//! ```

pub mod calculator;
pub mod domain;
pub mod error;
pub mod expression;
pub mod memory;
pub mod rates;
pub mod store;

// Calculator façade
pub use calculator::{Calculation, Calculator, CalculatorConfig, DEFAULT_HISTORY_LIMIT};

// Domain models
pub use domain::{CalculationRecord, CurrencyCode, RateSnapshot, RateTable, RecordId, UtcDateTime};

// Error types
pub use error::ValidationError;

// Expression engine
pub use expression::{
    evaluate_expression, format_result, CalculationError, EvalError, EvalLimits, Expr, LexError,
    SyntaxError, Token, TokenKind,
};

// In-memory stores
pub use memory::{InMemoryHistoryStore, InMemoryRateStore};

// Rates
pub use rates::{
    CacheMode, ProviderError, ProviderErrorKind, RateCacheConfig, RateCacheManager, RateError,
    RateLookup, RateProvider, StaticRateProvider,
};

// Store contracts
pub use store::{DeleteOutcome, HistoryStore, RateStore, StoreError, StoreErrorKind, StoreFuture};
