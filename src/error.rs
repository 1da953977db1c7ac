//! Diagnostic surface shared by every pipeline stage.
//!
//! Stage errors (`LexError`, `ParseError`, `RuntimeError`) stay typed inside
//! the library; the binary converts whichever one aborts the run into a
//! single `Diagnostic` and prints it on stderr as
//! `Error: <NAME> [<line>:<column>] - <message>`.

use std::fmt;

use crate::interpreter::RuntimeError;
use crate::lexer::LexError;
use crate::parser::ParseError;
use crate::token::Span;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    MissingFile,
    FileOpen,
    Indentation,
    Lexical,
    ReservedKeyword,
    Syntax,
    Internal,
    Semantic,
    Index,
    Evaluation,
    ZeroDivision,
    Type,
}

impl ErrorKind {
    pub fn name(self) -> &'static str {
        match self {
            ErrorKind::MissingFile => "MISSING_FILE_ERROR",
            ErrorKind::FileOpen => "FILE_OPEN_ERROR",
            ErrorKind::Indentation => "INDENTATION_ERROR",
            ErrorKind::Lexical => "LEXICAL_ERROR",
            ErrorKind::ReservedKeyword => "RESERVED_KEYWORD_ERROR",
            ErrorKind::Syntax => "SYNTAX_ERROR",
            ErrorKind::Internal => "INTERNAL_ERROR",
            ErrorKind::Semantic => "SEMANTIC_ERROR",
            ErrorKind::Index => "INDEX_ERROR",
            ErrorKind::Evaluation => "EVALUATION_ERROR",
            ErrorKind::ZeroDivision => "ZERO_DIVISION",
            ErrorKind::Type => "TYPE_ERROR",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub kind: ErrorKind,
    pub span: Span,
    pub message: String,
}

impl Diagnostic {
    pub fn new(kind: ErrorKind, span: Span, message: impl Into<String>) -> Self {
        Self {
            kind,
            span,
            message: message.into(),
        }
    }

    /// Startup failures happen before any source position exists.
    pub fn startup(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self::new(kind, Span::default(), message)
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Error: {} [{}:{}] - {}",
            self.kind.name(),
            self.span.line,
            self.span.column,
            self.message
        )
    }
}

impl std::error::Error for Diagnostic {}

impl From<LexError> for Diagnostic {
    fn from(error: LexError) -> Self {
        let kind = match error {
            LexError::InvalidDedent { .. } => ErrorKind::Indentation,
            LexError::InvariantViolation { .. } => ErrorKind::Internal,
            _ => ErrorKind::Lexical,
        };
        Diagnostic::new(kind, error.span(), error.to_string())
    }
}

impl From<ParseError> for Diagnostic {
    fn from(error: ParseError) -> Self {
        let kind = match error {
            ParseError::MissingIndent { .. } => ErrorKind::Indentation,
            _ => ErrorKind::Syntax,
        };
        Diagnostic::new(kind, error.span(), error.to_string())
    }
}

impl From<RuntimeError> for Diagnostic {
    fn from(error: RuntimeError) -> Self {
        Diagnostic::new(error.kind(), error.span(), error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_the_diagnostic_line() {
        let diagnostic = Diagnostic::new(
            ErrorKind::ZeroDivision,
            Span::new(3, 9),
            "Division by zero",
        );
        assert_eq!(
            diagnostic.to_string(),
            "Error: ZERO_DIVISION [3:9] - Division by zero"
        );
    }

    #[test]
    fn startup_diagnostics_point_at_origin() {
        let diagnostic = Diagnostic::startup(ErrorKind::MissingFile, "No input file provided");
        assert_eq!(
            diagnostic.to_string(),
            "Error: MISSING_FILE_ERROR [0:0] - No input file provided"
        );
    }

    #[test]
    fn maps_lexer_errors_onto_kinds() {
        let lexical: Diagnostic = LexError::LeadingZero {
            span: Span::new(1, 4),
        }
        .into();
        assert_eq!(lexical.kind, ErrorKind::Lexical);

        let indentation: Diagnostic = LexError::InvalidDedent {
            span: Span::new(2, 0),
        }
        .into();
        assert_eq!(indentation.kind, ErrorKind::Indentation);
    }

    #[test]
    fn maps_parser_errors_onto_kinds() {
        let syntax: Diagnostic = ParseError::Expected {
            expected: "':'",
            context: "compound statement",
            span: Span::new(1, 7),
        }
        .into();
        assert_eq!(syntax.kind, ErrorKind::Syntax);
        assert_eq!(
            syntax.to_string(),
            "Error: SYNTAX_ERROR [1:7] - Expected ':' in compound statement"
        );

        let indentation: Diagnostic = ParseError::MissingIndent {
            span: Span::new(2, 0),
        }
        .into();
        assert_eq!(indentation.kind, ErrorKind::Indentation);
    }
}
