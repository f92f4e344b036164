//! Error types for evaluation.

use thiserror::Error;

use crate::builtin::Arity;

/// Every way a core operation can fail.
///
/// A failure aborts the whole top-level form; the evaluator never retries
/// or produces a partial value.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EvalError {
    #[error("unbound name `{0}`")]
    UnboundName(String),

    #[error("{name}: wrong number of arguments, expected {expected}, got {got}")]
    ArityMismatch {
        name: String,
        expected: Arity,
        got: usize,
    },

    #[error("{operation}: expected {expected}, got {value}")]
    TypeMismatch {
        operation: String,
        expected: &'static str,
        value: String,
    },

    #[error("cannot call {0}")]
    UncallableHead(String),

    #[error("`Unquote` can only be used inside `Quasiquote`")]
    DirectUseOfUnquote,

    #[error("{operation}: division by zero")]
    DivisionByZero { operation: String },

    #[error("output error: {0}")]
    Output(String),
}

impl EvalError {
    pub fn type_mismatch(
        operation: impl Into<String>,
        expected: &'static str,
        value: impl ToString,
    ) -> Self {
        EvalError::TypeMismatch {
            operation: operation.into(),
            expected,
            value: value.to_string(),
        }
    }
}

/// Result type alias
pub type EvalResult<T> = Result<T, EvalError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arity_message() {
        let err = EvalError::ArityMismatch {
            name: "+".to_string(),
            expected: Arity::at_least(2),
            got: 1,
        };
        assert_eq!(
            err.to_string(),
            "+: wrong number of arguments, expected at least 2, got 1"
        );
    }

    #[test]
    fn test_type_mismatch_message() {
        let err = EvalError::type_mismatch("Inc", "a number", "\"ten\"");
        assert_eq!(err.to_string(), "Inc: expected a number, got \"ten\"");
    }
}
