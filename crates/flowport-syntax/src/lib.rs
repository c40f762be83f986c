//! Syntax-aware rewriting of public declaration files for the www build.
//!
//! This crate provides the rewrite engine behind `flowport`:
//!
//! - **Import source rewriting**: every import declaration whose module
//!   reference is a key of a [`NameMapping`] has that literal replaced by the
//!   mapped internal name. Nothing else in the statement changes.
//! - **Docblock annotation**: a leading docblock with an `@flow strict` line
//!   gains `@generated` and `@oncall` lines directly after it.
//!
//! Both edits go through a [`SyntaxOutline`], a span-indexed view of the
//! document, so formatting, comments, and all other code survive byte for
//! byte.
//!
//! # Supported Dialects
//!
//! - Flow (`.flow`, `.js.flow`), read by a lossless in-crate scanner
//! - TypeScript (`.d.ts`, `.ts`, `.mts`, `.cts`), read by Tree-sitter
//!
//! # Example
//!
//! ```
//! use flowport_syntax::{NameMapping, rewrite};
//!
//! let mapping: NameMapping = [("lexical/Foo", "LexicalFoo")].into_iter().collect();
//! let result = rewrite("import x from \"lexical/Foo\";\n", &mapping)?;
//!
//! assert!(result.has_changes());
//! assert_eq!(result.output(), "import x from \"LexicalFoo\";\n");
//! # Ok::<(), flowport_syntax::SyntaxError>(())
//! ```

mod dialect;
mod docblock;
mod error;
mod mapping;
mod outline;
mod parser;
mod position;
mod rewriter;
mod scanner;

pub use dialect::DeclarationDialect;
pub use docblock::{DEFAULT_ONCALL, DocblockAnnotations, GENERATED_MARKER, STRICT_FLAG};
pub use error::SyntaxError;
pub use mapping::NameMapping;
pub use outline::{DocBlock, ImportSource, SyntaxOutline};
pub use parser::TypeScriptParser;
pub use rewriter::{RewriteResult, Rewriter, rewrite};
