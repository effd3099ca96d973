use thiserror::Error;

/// A character that cannot start or continue a token.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("unexpected character '{character}' at position {position}")]
pub struct LexError {
    pub position: usize,
    pub character: char,
}

/// A structurally invalid token sequence.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("expected {expected} at position {position}, found {found}")]
pub struct SyntaxError {
    pub position: usize,
    pub expected: String,
    pub found: String,
}

/// Failures of a well-formed tree during evaluation.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum EvalError {
    #[error("division by zero")]
    DivisionByZero,
    #[error("result magnitude exceeds the allowed bound")]
    Overflow,
    #[error("invalid operation: {0}")]
    InvalidOperation(&'static str),
}

/// Any failure of the tokenize → parse → evaluate pipeline.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CalculationError {
    #[error(transparent)]
    Lex(#[from] LexError),
    #[error(transparent)]
    Syntax(#[from] SyntaxError),
    #[error(transparent)]
    Eval(#[from] EvalError),
}

impl CalculationError {
    /// Stable machine-readable code.
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Lex(_) => "calc.lex_error",
            Self::Syntax(_) => "calc.syntax_error",
            Self::Eval(EvalError::DivisionByZero) => "calc.division_by_zero",
            Self::Eval(EvalError::Overflow) => "calc.overflow",
            Self::Eval(EvalError::InvalidOperation(_)) => "calc.invalid_operation",
        }
    }
}
