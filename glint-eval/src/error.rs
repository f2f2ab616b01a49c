use glint_parser::ast::{BinaryOp, UnaryOp};
use glint_value::EnvError;
use thiserror::Error;

/// Errors raised while a program runs.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RuntimeError {
    #[error("Operator `{op}` cannot be applied to {lhs} and {rhs}")]
    TypeMismatch {
        op: BinaryOp,
        lhs: &'static str,
        rhs: &'static str,
    },
    #[error("Operator `{op}` cannot be applied to {operand}")]
    UnaryTypeMismatch { op: UnaryOp, operand: &'static str },
    #[error("Expected a boolean, found {found}")]
    ExpectedBoolean { found: &'static str },
    #[error("`{callee}` expects {expected} arguments but got {found}")]
    ArityMismatch {
        callee: String,
        expected: usize,
        found: usize,
    },
    #[error("Can only call functions and classes, found {found}")]
    NotCallable { found: &'static str },
    #[error("Only objects have fields, found {found}")]
    NotAnObject { found: &'static str },
    #[error("No such field `{name}`")]
    NoSuchField { name: String },
    #[error("Failed to write output: {0}")]
    Output(String),
    #[error(transparent)]
    Internal(#[from] InternalError),
}

impl RuntimeError {
    /// Whether the error is an interpreter bug rather than a fault of the program.
    pub fn is_internal(&self) -> bool {
        matches!(self, Self::Internal(_))
    }
}

/// A resolved variable missing from the frame its depth points to.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("Internal error: `{name}` could not be found at runtime ({source})")]
pub struct InternalError {
    pub name: String,
    pub source: EnvError,
}
