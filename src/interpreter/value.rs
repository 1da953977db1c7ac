use std::fmt;

use crate::token::Span;

use super::error::RuntimeError;

/// Runtime scalar. Every value the interpreter manipulates is one of these
/// two tags; a variable may swap tags across assignments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Value {
    Int(i64),
    Bool(bool),
}

/// Static type of an expression. `Undefined` marks an operand combination no
/// operator accepts; the evaluator turns it into a type error at the
/// offending node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataType {
    Int,
    Bool,
    Undefined,
}

impl Value {
    pub fn data_type(self) -> DataType {
        match self {
            Value::Int(_) => DataType::Int,
            Value::Bool(_) => DataType::Bool,
        }
    }

    /// The type discipline guarantees the tag before these are called, so a
    /// mismatch is an interpreter bug, not a source-program error.
    pub(super) fn as_int(self, span: Span) -> Result<i64, RuntimeError> {
        match self {
            Value::Int(value) => Ok(value),
            Value::Bool(_) => Err(RuntimeError::Internal {
                message: "expected an int value, found a bool".to_string(),
                span,
            }),
        }
    }

    pub(super) fn as_bool(self, span: Span) -> Result<bool, RuntimeError> {
        match self {
            Value::Bool(value) => Ok(value),
            Value::Int(_) => Err(RuntimeError::Internal {
                message: "expected a bool value, found an int".to_string(),
                span,
            }),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(value) => write!(f, "{value}"),
            Value::Bool(true) => write!(f, "True"),
            Value::Bool(false) => write!(f, "False"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prints_like_the_source_language() {
        assert_eq!(Value::Int(-7).to_string(), "-7");
        assert_eq!(Value::Bool(true).to_string(), "True");
        assert_eq!(Value::Bool(false).to_string(), "False");
    }

    #[test]
    fn reports_wrong_tag_access_as_internal() {
        let err = Value::Bool(true)
            .as_int(Span::new(1, 0))
            .expect_err("expected tag mismatch");
        assert!(matches!(err, RuntimeError::Internal { .. }));
    }
}
