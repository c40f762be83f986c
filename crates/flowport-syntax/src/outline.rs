//! The span-indexed syntax view the rewriter edits through.
//!
//! An outline records only the parts of a document that may be edited:
//! import source literals and the file-level docblock. Every span indexes the
//! original text, so the bytes between spans are re-emitted untouched.

use std::ops::Range;

/// Editable regions of a parsed declaration file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyntaxOutline {
    imports: Vec<ImportSource>,
    docblock: Option<DocBlock>,
}

impl SyntaxOutline {
    pub(crate) const fn new(imports: Vec<ImportSource>, docblock: Option<DocBlock>) -> Self {
        Self { imports, docblock }
    }

    /// Source literals of every import declaration, in document order.
    #[must_use]
    pub fn imports(&self) -> &[ImportSource] {
        &self.imports
    }

    /// The file-level documentation comment, if present.
    #[must_use]
    pub const fn docblock(&self) -> Option<&DocBlock> {
        self.docblock.as_ref()
    }
}

/// The module-reference literal of one import declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportSource {
    span: Range<usize>,
    quote: char,
    value: String,
}

impl ImportSource {
    /// Builds an import source from the raw literal text found at `span`.
    ///
    /// Returns `None` when `raw` is not a quoted string literal.
    pub(crate) fn from_literal(span: Range<usize>, raw: &str) -> Option<Self> {
        let (quote, value) = unquote(raw)?;
        Some(Self { span, quote, value })
    }

    /// Byte range of the literal, quotes included.
    #[must_use]
    pub fn span(&self) -> Range<usize> {
        self.span.clone()
    }

    /// The quote character the literal was written with.
    #[must_use]
    pub const fn quote(&self) -> char {
        self.quote
    }

    /// The decoded reference string.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }
}

/// The leading block comment of a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocBlock {
    span: Range<usize>,
    text: String,
}

impl DocBlock {
    pub(crate) fn new(span: Range<usize>, text: impl Into<String>) -> Self {
        Self {
            span,
            text: text.into(),
        }
    }

    /// Byte range of the comment, delimiters included.
    #[must_use]
    pub fn span(&self) -> Range<usize> {
        self.span.clone()
    }

    /// The comment text, delimiters included.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }
}

/// Splits a quoted literal into its quote character and decoded value.
///
/// Only the escapes that can appear in a module path are decoded; any other
/// escape is kept verbatim so it never matches a mapping key by accident.
pub(crate) fn unquote(raw: &str) -> Option<(char, String)> {
    let mut chars = raw.chars();
    let quote = chars.next().filter(|c| matches!(c, '"' | '\''))?;
    let body = chars.as_str().strip_suffix(quote)?;

    let mut value = String::with_capacity(body.len());
    let mut body_chars = body.chars();
    while let Some(ch) = body_chars.next() {
        if ch != '\\' {
            value.push(ch);
            continue;
        }
        match body_chars.next() {
            Some(escaped @ ('\\' | '\'' | '"')) => value.push(escaped),
            Some('n') => value.push('\n'),
            Some('t') => value.push('\t'),
            Some('r') => value.push('\r'),
            // Line continuation.
            Some('\n') => {}
            Some(other) => {
                value.push('\\');
                value.push(other);
            }
            None => value.push('\\'),
        }
    }
    Some((quote, value))
}

/// Writes `value` as a literal delimited by `quote`.
pub(crate) fn quote(value: &str, quote: char) -> String {
    let mut literal = String::with_capacity(value.len().saturating_add(2));
    literal.push(quote);
    for ch in value.chars() {
        match ch {
            '\\' => literal.push_str("\\\\"),
            '\n' => literal.push_str("\\n"),
            '\r' => literal.push_str("\\r"),
            c if c == quote => {
                literal.push('\\');
                literal.push(c);
            }
            c => literal.push(c),
        }
    }
    literal.push(quote);
    literal
}
