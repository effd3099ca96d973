use std::fmt::{Display, Formatter};

/// Infix arithmetic operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    Power,
}

impl BinaryOp {
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Subtract => "-",
            Self::Multiply => "*",
            Self::Divide => "/",
            Self::Power => "^",
        }
    }
}

impl Display for BinaryOp {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Prefix operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    Negate,
}

/// Parsed expression tree. Each child is owned by exactly one parent.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Literal(f64),
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
}

impl Expr {
    pub fn binary(op: BinaryOp, left: Expr, right: Expr) -> Self {
        Self::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn negate(operand: Expr) -> Self {
        Self::Unary {
            op: UnaryOp::Negate,
            operand: Box::new(operand),
        }
    }
}

/// Fully parenthesized rendering, so the grouping the parser chose is visible.
impl Display for Expr {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Literal(value) => write!(f, "{value}"),
            Self::Binary { op, left, right } => write!(f, "({left} {op} {right})"),
            Self::Unary {
                op: UnaryOp::Negate,
                operand,
            } => write!(f, "(-{operand})"),
        }
    }
}
