//! Error types for declaration rewriting.
//!
//! Every failure is scoped to the single document being rewritten. Callers
//! that process many files report the error for that file and continue with
//! the next one.

use std::path::PathBuf;

use thiserror::Error;

use crate::dialect::DeclarationDialect;

/// Errors from parsing and rewriting declaration files.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum SyntaxError {
    /// Failed to initialise the Tree-sitter parser for a dialect.
    #[error("failed to initialise parser for {dialect}: {message}")]
    ParserInitError {
        /// The dialect that failed to initialise.
        dialect: DeclarationDialect,
        /// Description of the failure.
        message: String,
    },

    /// Failed to determine the dialect from a file path.
    #[error("could not determine declaration dialect for path: {}", path.display())]
    UnknownDialect {
        /// The path that could not be mapped to a dialect.
        path: PathBuf,
    },

    /// The source text is not valid syntax for its dialect.
    #[error("failed to parse {dialect} at {line}:{column}: {message}")]
    ParseError {
        /// The dialect that failed to parse.
        dialect: DeclarationDialect,
        /// Line number (one-based) where the problem starts.
        line: u32,
        /// Column number (one-based) where the problem starts.
        column: u32,
        /// Description of the failure.
        message: String,
    },

    /// An edit left the document in a state that cannot be emitted as text.
    #[error("failed to serialise rewritten source: {message}")]
    SerializationError {
        /// Description of the violated invariant.
        message: String,
    },
}

impl SyntaxError {
    /// Creates a parser initialisation error.
    #[must_use]
    pub fn parser_init(dialect: DeclarationDialect, message: impl Into<String>) -> Self {
        Self::ParserInitError {
            dialect,
            message: message.into(),
        }
    }

    /// Creates an unknown dialect error.
    #[must_use]
    pub const fn unknown_dialect(path: PathBuf) -> Self {
        Self::UnknownDialect { path }
    }

    /// Creates a parse error at a one-based position.
    #[must_use]
    pub fn parse(
        dialect: DeclarationDialect,
        (line, column): (u32, u32),
        message: impl Into<String>,
    ) -> Self {
        Self::ParseError {
            dialect,
            line,
            column,
            message: message.into(),
        }
    }

    /// Creates a serialisation error.
    #[must_use]
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::SerializationError {
            message: message.into(),
        }
    }

    /// Returns whether this error was raised while parsing the input.
    #[must_use]
    pub const fn is_parse_error(&self) -> bool {
        matches!(self, Self::ParseError { .. })
    }
}
