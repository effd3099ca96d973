//! # Expression Engine
//!
//! Safe evaluation of untrusted arithmetic text as a strict three-stage
//! pipeline:
//!
//! ```text
//! text ──tokenize──▶ [Token] ──parse──▶ Expr ──evaluate──▶ f64
//!        LexError            SyntaxError        EvalError
//! ```
//!
//! Each stage only produces its own error type; [`CalculationError`] unifies
//! them at the pipeline boundary. Every call owns its tokens and tree, so
//! concurrent evaluations share nothing.
//!
//! ## Limits
//!
//! | Limit | Default | Enforced by | Failure |
//! |-------|---------|-------------|---------|
//! | `max_tokens` | 4096 | parser | `SyntaxError` |
//! | `max_depth` | 100 | parser | `SyntaxError` |
//! | `max_magnitude` | 1e15 | evaluator (`^`) | `Overflow` |
//!
//! ## Example
//!
//! ```rust
//! use ferrocalc_core::expression::{evaluate_expression, EvalLimits};
//!
//! let value = evaluate_expression("(2 + 3) * 4", &EvalLimits::default()).unwrap();
//! assert_eq!(value, 20.0);
//! ```

pub mod ast;
pub mod error;
pub mod evaluator;
pub mod lexer;
pub mod parser;
pub mod token;

pub use ast::{BinaryOp, Expr, UnaryOp};
pub use error::{CalculationError, EvalError, LexError, SyntaxError};
pub use evaluator::{evaluate, evaluate_with_limits, format_result};
pub use lexer::tokenize;
pub use parser::{parse, parse_with_limits};
pub use token::{Token, TokenKind};

/// Resource bounds applied to a single evaluation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EvalLimits {
    /// Maximum nesting of parentheses, minus signs and exponents.
    pub max_depth: usize,
    /// Maximum number of tokens, including the terminator.
    pub max_tokens: usize,
    /// Largest absolute value a power may produce.
    pub max_magnitude: f64,
}

impl Default for EvalLimits {
    fn default() -> Self {
        Self {
            max_depth: 100,
            max_tokens: 4096,
            max_magnitude: 1e15,
        }
    }
}

/// Runs the full tokenize → parse → evaluate pipeline on `text`.
pub fn evaluate_expression(text: &str, limits: &EvalLimits) -> Result<f64, CalculationError> {
    let tokens = tokenize(text)?;
    let tree = parse_with_limits(&tokens, limits)?;
    Ok(evaluate_with_limits(&tree, limits)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pipeline_reports_the_failing_stage() {
        let limits = EvalLimits::default();
        assert_eq!(
            evaluate_expression("1 # 2", &limits).map_err(|error| error.code()),
            Err("calc.lex_error")
        );
        assert_eq!(
            evaluate_expression("1 +", &limits).map_err(|error| error.code()),
            Err("calc.syntax_error")
        );
        assert_eq!(
            evaluate_expression("1 / (2 - 2)", &limits).map_err(|error| error.code()),
            Err("calc.division_by_zero")
        );
        assert_eq!(
            evaluate_expression("10 ^ 20", &limits).map_err(|error| error.code()),
            Err("calc.overflow")
        );
        assert_eq!(
            evaluate_expression("(-1) ^ 0.5", &limits).map_err(|error| error.code()),
            Err("calc.invalid_operation")
        );
    }

    #[test]
    fn pipeline_evaluates_mixed_expressions() {
        let value = evaluate_expression(" 1.5 * (4 - 2) ^ 3 / -2 ", &EvalLimits::default())
            .expect("evaluates");
        assert_eq!(value, -6.0);
    }
}
