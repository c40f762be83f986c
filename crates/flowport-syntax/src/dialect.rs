//! Declaration dialect detection.
//!
//! This module provides the [`DeclarationDialect`] enum for identifying the
//! flavour of a declaration file and selecting how it is parsed.

use std::fmt;
use std::path::Path;

use crate::error::SyntaxError;
use crate::outline::SyntaxOutline;
use crate::parser::TypeScriptParser;
use crate::scanner;

/// Declaration file dialects understood by the rewrite engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DeclarationDialect {
    /// Flow library definitions (`.flow`, `.js.flow`).
    #[default]
    Flow,
    /// TypeScript declarations (`.d.ts`, `.ts`, `.mts`, `.cts`).
    TypeScript,
}

impl DeclarationDialect {
    /// Detects the dialect from a file extension.
    ///
    /// Returns `None` if the extension is not recognised.
    #[must_use]
    pub fn from_extension(ext: &str) -> Option<Self> {
        let normalised = ext.to_ascii_lowercase();
        match normalised.as_str() {
            "flow" => Some(Self::Flow),
            "ts" | "mts" | "cts" => Some(Self::TypeScript),
            _ => None,
        }
    }

    /// Detects the dialect from a file path by examining its extension.
    ///
    /// `Foo.js.flow` and `Foo.d.ts` resolve through their final extension.
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
    }

    /// Like [`DeclarationDialect::from_path`], but reports unknown paths as an
    /// error.
    ///
    /// # Errors
    ///
    /// Returns [`SyntaxError::UnknownDialect`] when the extension is not
    /// recognised.
    pub fn try_from_path(path: &Path) -> Result<Self, SyntaxError> {
        Self::from_path(path).ok_or_else(|| SyntaxError::unknown_dialect(path.to_path_buf()))
    }

    /// Parses `source` into the outline the rewriter edits through.
    ///
    /// # Errors
    ///
    /// Returns [`SyntaxError::ParseError`] when `source` is not valid syntax
    /// for this dialect.
    pub fn outline(self, source: &str) -> Result<SyntaxOutline, SyntaxError> {
        match self {
            Self::Flow => scanner::outline(source),
            Self::TypeScript => TypeScriptParser::new()?.outline(source),
        }
    }

    /// Returns the lower-case identifier for this dialect.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Flow => "flow",
            Self::TypeScript => "typescript",
        }
    }
}

impl fmt::Display for DeclarationDialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
