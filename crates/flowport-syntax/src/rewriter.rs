//! Mapping-driven rewrite engine for declaration files.
//!
//! The rewriter parses a document into its [`SyntaxOutline`], collects one
//! edit per mapped import source and at most one for the docblock, and
//! splices the edits into the original text. Bytes outside the edited spans
//! are copied through unchanged.

use std::ops::Range;

use crate::dialect::DeclarationDialect;
use crate::docblock::DocblockAnnotations;
use crate::error::SyntaxError;
use crate::mapping::NameMapping;
use crate::outline::quote;

/// Rewrites `source` as a Flow declaration file with default annotations.
///
/// # Errors
///
/// Returns [`SyntaxError::ParseError`] when `source` is not valid Flow and
/// [`SyntaxError::SerializationError`] when the edits cannot be emitted.
pub fn rewrite(source: &str, mapping: &NameMapping) -> Result<RewriteResult, SyntaxError> {
    Rewriter::default().rewrite(source, mapping)
}

/// Engine that rewrites import sources and annotates docblocks.
#[derive(Debug, Clone, Default)]
pub struct Rewriter {
    dialect: DeclarationDialect,
    annotations: DocblockAnnotations,
}

impl Rewriter {
    /// Creates a rewriter for the given dialect.
    #[must_use]
    pub fn new(dialect: DeclarationDialect) -> Self {
        Self {
            dialect,
            annotations: DocblockAnnotations::default(),
        }
    }

    /// Replaces the `@oncall` tag inserted into strict docblocks.
    #[must_use]
    pub fn with_oncall(mut self, oncall: impl Into<String>) -> Self {
        self.annotations = DocblockAnnotations::new(oncall);
        self
    }

    /// Returns the docblock annotations this rewriter inserts.
    #[must_use]
    pub const fn annotations(&self) -> &DocblockAnnotations {
        &self.annotations
    }

    /// Rewrites one document.
    ///
    /// # Errors
    ///
    /// Returns [`SyntaxError::ParseError`] when `source` is not valid for the
    /// dialect, and [`SyntaxError::SerializationError`] when the edited text
    /// can no longer be parsed or an edit falls outside the document.
    pub fn rewrite(
        &self,
        source: &str,
        mapping: &NameMapping,
    ) -> Result<RewriteResult, SyntaxError> {
        let outline = self.dialect.outline(source)?;

        let mut edits = Vec::new();
        let mut replaced_imports: usize = 0;
        for import in outline.imports() {
            if let Some(target) = mapping.get(import.value()) {
                edits.push(Edit::new(import.span(), quote(target, import.quote())));
                replaced_imports = replaced_imports.saturating_add(1);
            }
        }

        let mut docblock_annotated = false;
        if let Some(docblock) = outline.docblock() {
            if let Some(annotated) = self.annotations.apply(docblock.text()) {
                edits.push(Edit::new(docblock.span(), annotated));
                docblock_annotated = true;
            }
        }

        if edits.is_empty() {
            return Ok(RewriteResult {
                output: source.to_owned(),
                replaced_imports,
                docblock_annotated,
            });
        }

        let output = splice(source, edits)?;
        self.dialect.outline(&output).map_err(|error| {
            SyntaxError::serialization(format!("rewritten source no longer parses: {error}"))
        })?;

        Ok(RewriteResult {
            output,
            replaced_imports,
            docblock_annotated,
        })
    }
}

/// One replacement of a byte range of the original text.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Edit {
    span: Range<usize>,
    replacement: String,
}

impl Edit {
    const fn new(span: Range<usize>, replacement: String) -> Self {
        Self { span, replacement }
    }
}

/// Copies `source` through, substituting each edit's span.
///
/// Edits must lie on character boundaries and must not overlap.
fn splice(source: &str, mut edits: Vec<Edit>) -> Result<String, SyntaxError> {
    edits.sort_by_key(|edit| edit.span.start);

    let grown: usize = edits.iter().map(|edit| edit.replacement.len()).sum();
    let mut output = String::with_capacity(source.len().saturating_add(grown));
    let mut cursor: usize = 0;

    for edit in &edits {
        let (start, end) = (edit.span.start, edit.span.end);
        if start < cursor {
            return Err(SyntaxError::serialization(format!(
                "edit at {start}..{end} overlaps a previous edit ending at {cursor}"
            )));
        }
        let untouched = source.get(cursor..start).ok_or_else(|| {
            SyntaxError::serialization(format!("edit at {start}..{end} is not on a UTF-8 boundary"))
        })?;
        if source.get(start..end).is_none() {
            return Err(SyntaxError::serialization(format!(
                "edit at {start}..{end} falls outside the document"
            )));
        }
        output.push_str(untouched);
        output.push_str(&edit.replacement);
        cursor = end;
    }

    let tail = source
        .get(cursor..)
        .ok_or_else(|| SyntaxError::serialization("edit ends outside the document"))?;
    output.push_str(tail);
    Ok(output)
}

/// Result of a rewrite operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewriteResult {
    output: String,
    replaced_imports: usize,
    docblock_annotated: bool,
}

impl RewriteResult {
    /// Returns the rewritten source.
    #[must_use]
    pub fn output(&self) -> &str {
        &self.output
    }

    /// Consumes the result, returning the rewritten source.
    #[must_use]
    pub fn into_output(self) -> String {
        self.output
    }

    /// Returns the number of import sources that were replaced.
    #[must_use]
    pub const fn replaced_imports(&self) -> usize {
        self.replaced_imports
    }

    /// Returns whether the docblock gained the generated markers.
    #[must_use]
    pub const fn docblock_annotated(&self) -> bool {
        self.docblock_annotated
    }

    /// Returns whether any edit rule fired.
    #[must_use]
    pub const fn has_changes(&self) -> bool {
        self.replaced_imports > 0 || self.docblock_annotated
    }
}
