use thiserror::Error;

use crate::error::ErrorKind;
use crate::token::Span;

/// Typed errors produced while executing a program. Each variant knows the
/// diagnostic kind it surfaces as and the source position it points at.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RuntimeError {
    #[error("Variable '{name}' is not defined")]
    UndefinedVariable { name: String, span: Span },
    #[error("List '{name}' is not defined")]
    UndefinedList { name: String, span: Span },
    #[error("Identifier '{name}' is already defined")]
    AlreadyDefined { name: String, span: Span },
    #[error("Operands of '{op}' must be boolean")]
    BooleanOperands { op: &'static str, span: Span },
    #[error("Operand of 'not' must be boolean")]
    NotOperand { span: Span },
    #[error("Operand of unary '-' must be integer")]
    NegOperand { span: Span },
    #[error("Operands of '==' and '!=' must be of the same type (int or bool)")]
    EqualityOperands { span: Span },
    #[error("Operands of '<', '<=', '>', '>=' must be integers")]
    ComparisonOperands { span: Span },
    #[error("Operands of arithmetic expressions must be integers")]
    ArithmeticOperands { span: Span },
    #[error("List index must be an integer")]
    NonIntegerIndex { span: Span },
    #[error("List index out of bounds for '{name}'")]
    IndexOutOfBounds { name: String, span: Span },
    #[error("Division by zero")]
    DivisionByZero { span: Span },
    #[error("{context} condition must be boolean")]
    NonBooleanCondition { context: &'static str, span: Span },
    #[error("Break statement not allowed outside of loop")]
    BreakOutsideLoop { span: Span },
    #[error("Continue statement not allowed outside of loop")]
    ContinueOutsideLoop { span: Span },
    #[error("Failed to write program output: {message}")]
    OutputWrite { message: String, span: Span },
    #[error("Internal invariant violated: {message}")]
    Internal { message: String, span: Span },
}

impl RuntimeError {
    pub fn span(&self) -> Span {
        match self {
            RuntimeError::UndefinedVariable { span, .. }
            | RuntimeError::UndefinedList { span, .. }
            | RuntimeError::AlreadyDefined { span, .. }
            | RuntimeError::BooleanOperands { span, .. }
            | RuntimeError::NotOperand { span }
            | RuntimeError::NegOperand { span }
            | RuntimeError::EqualityOperands { span }
            | RuntimeError::ComparisonOperands { span }
            | RuntimeError::ArithmeticOperands { span }
            | RuntimeError::NonIntegerIndex { span }
            | RuntimeError::IndexOutOfBounds { span, .. }
            | RuntimeError::DivisionByZero { span }
            | RuntimeError::NonBooleanCondition { span, .. }
            | RuntimeError::BreakOutsideLoop { span }
            | RuntimeError::ContinueOutsideLoop { span }
            | RuntimeError::OutputWrite { span, .. }
            | RuntimeError::Internal { span, .. } => *span,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            RuntimeError::UndefinedVariable { .. }
            | RuntimeError::UndefinedList { .. }
            | RuntimeError::AlreadyDefined { .. }
            | RuntimeError::IndexOutOfBounds { .. }
            | RuntimeError::NonBooleanCondition { .. }
            | RuntimeError::BreakOutsideLoop { .. }
            | RuntimeError::ContinueOutsideLoop { .. } => ErrorKind::Semantic,
            RuntimeError::BooleanOperands { .. }
            | RuntimeError::NotOperand { .. }
            | RuntimeError::NegOperand { .. }
            | RuntimeError::EqualityOperands { .. }
            | RuntimeError::ComparisonOperands { .. }
            | RuntimeError::ArithmeticOperands { .. }
            | RuntimeError::NonIntegerIndex { .. } => ErrorKind::Type,
            RuntimeError::DivisionByZero { .. } => ErrorKind::ZeroDivision,
            RuntimeError::OutputWrite { .. } => ErrorKind::Evaluation,
            RuntimeError::Internal { .. } => ErrorKind::Internal,
        }
    }
}
