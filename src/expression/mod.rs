//! Sandboxed expression language used by notification rules.
//!
//! Conditions, destination numbers, usernames and template parameters are all
//! written as small Python-flavoured expressions over the triggering document:
//!
//! ```text
//! doc.status == "Paid" and doc.grand_total > 1000
//! contact_mobile or customer_mobile
//! "INV-" + name
//! items[0].item_code
//! ```
//!
//! Expressions are parsed into a fixed AST and interpreted against an
//! [`EvaluationContext`]. Nothing in the language can reach the host: there are
//! no calls, assignments or imports.

mod eval;
mod lexer;
mod parser;
mod value;

use serde_json::Value;

use crate::models::document::EvaluationContext;

pub use parser::{BinaryOp, Expr, LogicalOp, UnaryOp};
pub use value::{is_truthy, to_display_string, type_name};

/// Maximum nesting of parentheses, brackets and unary operators.
pub const MAX_DEPTH: usize = 64;

/// Maximum number of operators in one expression.
pub const MAX_OPERATORS: usize = 1024;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ExpressionError {
    #[error("expression is empty")]
    Empty,

    #[error("unexpected character '{ch}' at position {position}")]
    UnexpectedCharacter { ch: char, position: usize },

    #[error("unterminated string starting at position {0}")]
    UnterminatedString(usize),

    #[error("invalid number literal '{0}'")]
    InvalidNumber(String),

    #[error("unexpected {found} at position {position}")]
    UnexpectedToken { found: String, position: usize },

    #[error("unexpected end of expression")]
    UnexpectedEnd,

    #[error("expression nests deeper than {0} levels")]
    TooDeep(usize),

    #[error("expression has more than {0} operators")]
    TooLong(usize),

    #[error("unknown field '{0}'")]
    UnknownField(String),

    #[error("unsupported operand types for '{operator}': {left} and {right}")]
    TypeMismatch {
        operator: &'static str,
        left: &'static str,
        right: &'static str,
    },

    #[error("bad operand type for '{operator}': {operand}")]
    InvalidOperand {
        operator: &'static str,
        operand: &'static str,
    },

    #[error("index {0} out of range")]
    IndexOutOfRange(i64),

    #[error("division by zero")]
    DivisionByZero,

    #[error("numeric result is not finite")]
    NonFinite,
}

/// A parsed expression, ready to be evaluated any number of times.
#[derive(Debug, Clone, PartialEq)]
pub struct Expression {
    source: String,
    ast: Expr,
}

impl Expression {
    pub fn parse(source: &str) -> Result<Self, ExpressionError> {
        let tokens = lexer::tokenize(source)?;
        let ast = parser::parse(tokens)?;

        Ok(Self {
            source: source.to_string(),
            ast,
        })
    }

    pub fn evaluate(&self, context: &EvaluationContext) -> Result<Value, ExpressionError> {
        self.ast.eval(context)
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn ast(&self) -> &Expr {
        &self.ast
    }
}

/// Parses and evaluates `source` in one step.
pub fn evaluate(source: &str, context: &EvaluationContext) -> Result<Value, ExpressionError> {
    Expression::parse(source)?.evaluate(context)
}
