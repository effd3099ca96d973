//! Post-order evaluation of an [`Expr`].
//!
//! The tree is walked structurally; there are no variables, no functions and
//! no side effects. Every intermediate value must stay finite, and powers must
//! stay within [`EvalLimits::max_magnitude`].

use super::ast::{BinaryOp, Expr, UnaryOp};
use super::error::EvalError;
use super::EvalLimits;

/// Evaluates with the default limits.
pub fn evaluate(expr: &Expr) -> Result<f64, EvalError> {
    evaluate_with_limits(expr, &EvalLimits::default())
}

pub fn evaluate_with_limits(expr: &Expr, limits: &EvalLimits) -> Result<f64, EvalError> {
    let value = eval_node(expr, limits)?;
    // Fold -0 into 0 so "-0" never reaches a caller.
    Ok(if value == 0.0 { 0.0 } else { value })
}

/// Renders a result the way it is returned to callers and stored in history.
pub fn format_result(value: f64) -> String {
    format!("{value}")
}

fn eval_node(expr: &Expr, limits: &EvalLimits) -> Result<f64, EvalError> {
    match expr {
        Expr::Literal(value) => finite(*value),
        Expr::Unary {
            op: UnaryOp::Negate,
            operand,
        } => Ok(-eval_node(operand, limits)?),
        Expr::Binary { op, left, right } => {
            let left = eval_node(left, limits)?;
            let right = eval_node(right, limits)?;
            apply(*op, left, right, limits)
        }
    }
}

fn apply(op: BinaryOp, left: f64, right: f64, limits: &EvalLimits) -> Result<f64, EvalError> {
    match op {
        BinaryOp::Add => finite(left + right),
        BinaryOp::Subtract => finite(left - right),
        BinaryOp::Multiply => finite(left * right),
        BinaryOp::Divide => {
            if right == 0.0 {
                return Err(EvalError::DivisionByZero);
            }
            finite(left / right)
        }
        BinaryOp::Power => power(left, right, limits.max_magnitude),
    }
}

fn power(base: f64, exponent: f64, max_magnitude: f64) -> Result<f64, EvalError> {
    if base == 0.0 && exponent < 0.0 {
        return Err(EvalError::DivisionByZero);
    }
    if base < 0.0 && exponent.fract() != 0.0 {
        return Err(EvalError::InvalidOperation(
            "negative base with a fractional exponent",
        ));
    }

    let value = base.powf(exponent);
    if value.is_nan() {
        return Err(EvalError::InvalidOperation("exponentiation has no real result"));
    }
    if value.is_infinite() || value.abs() > max_magnitude {
        return Err(EvalError::Overflow);
    }
    Ok(value)
}

fn finite(value: f64) -> Result<f64, EvalError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(EvalError::Overflow)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expression::ast::Expr;

    fn lit(value: f64) -> Expr {
        Expr::Literal(value)
    }

    #[test]
    fn walks_the_tree_in_post_order() {
        let expr = Expr::binary(
            BinaryOp::Subtract,
            Expr::binary(BinaryOp::Multiply, lit(6.0), lit(7.0)),
            Expr::negate(lit(8.0)),
        );
        assert_eq!(evaluate(&expr), Ok(50.0));
    }

    #[test]
    fn division_by_zero_is_a_typed_failure() {
        let expr = Expr::binary(BinaryOp::Divide, lit(5.0), lit(0.0));
        assert_eq!(evaluate(&expr), Err(EvalError::DivisionByZero));

        let negative_zero = Expr::binary(BinaryOp::Divide, lit(5.0), Expr::negate(lit(0.0)));
        assert_eq!(evaluate(&negative_zero), Err(EvalError::DivisionByZero));
    }

    #[test]
    fn zero_to_a_negative_power_is_division_by_zero() {
        let expr = Expr::binary(BinaryOp::Power, lit(0.0), lit(-1.0));
        assert_eq!(evaluate(&expr), Err(EvalError::DivisionByZero));
    }

    #[test]
    fn power_beyond_magnitude_bound_overflows() {
        let at_bound = Expr::binary(BinaryOp::Power, lit(10.0), lit(15.0));
        assert!(evaluate(&at_bound).is_ok());

        let beyond = Expr::binary(BinaryOp::Power, lit(10.0), lit(16.0));
        assert_eq!(evaluate(&beyond), Err(EvalError::Overflow));

        let huge = Expr::binary(BinaryOp::Power, lit(9.0), lit(1e9));
        assert_eq!(evaluate(&huge), Err(EvalError::Overflow));
    }

    #[test]
    fn magnitude_bound_is_configurable() {
        let limits = EvalLimits {
            max_magnitude: 100.0,
            ..EvalLimits::default()
        };
        let expr = Expr::binary(BinaryOp::Power, lit(2.0), lit(7.0));
        assert_eq!(evaluate_with_limits(&expr, &limits), Err(EvalError::Overflow));
    }

    #[test]
    fn fractional_exponents_work_for_positive_bases() {
        let expr = Expr::binary(BinaryOp::Power, lit(9.0), lit(0.5));
        let value = evaluate(&expr).expect("evaluates");
        assert!((value - 3.0).abs() < 1e-12);
    }

    #[test]
    fn negative_base_with_fractional_exponent_is_invalid() {
        let expr = Expr::binary(BinaryOp::Power, lit(-8.0), lit(0.5));
        assert!(matches!(evaluate(&expr), Err(EvalError::InvalidOperation(_))));
    }

    #[test]
    fn non_finite_intermediate_values_overflow() {
        let expr = Expr::binary(BinaryOp::Multiply, lit(1e300), lit(1e300));
        assert_eq!(evaluate(&expr), Err(EvalError::Overflow));
        assert_eq!(evaluate(&lit(f64::INFINITY)), Err(EvalError::Overflow));
    }

    #[test]
    fn negative_zero_is_normalized() {
        let expr = Expr::negate(lit(0.0));
        let value = evaluate(&expr).expect("evaluates");
        assert!(value.is_sign_positive());
        assert_eq!(format_result(value), "0");
    }

    #[test]
    fn results_format_without_trailing_zeros() {
        assert_eq!(format_result(14.0), "14");
        assert_eq!(format_result(-4.0), "-4");
        assert_eq!(format_result(0.25), "0.25");
    }
}
