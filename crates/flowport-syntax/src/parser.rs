//! Tree-sitter front end for TypeScript declaration files.
//!
//! Tree-sitter recovers from malformed input by inserting ERROR and MISSING
//! nodes, so every parse is checked for them before an outline is built. The
//! first one found becomes the reported [`SyntaxError::ParseError`].

use tree_sitter::Node;

use crate::dialect::DeclarationDialect;
use crate::error::SyntaxError;
use crate::outline::{DocBlock, ImportSource, SyntaxOutline};
use crate::position::point_to_one_based;

/// Number of source characters quoted in a diagnostic message.
const CONTEXT_CHARS: usize = 40;

/// A recovered syntax error located in the source.
#[derive(Debug, Clone, PartialEq, Eq)]
struct SyntaxDiagnostic {
    line: u32,
    column: u32,
    /// What went wrong, quoting the offending text when there is any.
    message: String,
}

impl SyntaxDiagnostic {
    fn from_node(node: Node<'_>, source: &str) -> Self {
        let (line, column) = point_to_one_based(node.start_position());
        let quoted: String = source
            .get(node.byte_range())
            .map(|text| text.chars().take(CONTEXT_CHARS).collect())
            .unwrap_or_default();
        let message = match (node.is_missing(), quoted.is_empty()) {
            (true, _) => format!("expected {}", node.kind()),
            (false, true) => "unexpected end of input".to_owned(),
            (false, false) => format!("unexpected `{quoted}`"),
        };
        Self {
            line,
            column,
            message,
        }
    }
}

/// Tree-sitter parser loaded with the TypeScript grammar.
///
/// Parsers are cheap to build and not shared between threads; the rewriter
/// creates one per document.
pub struct TypeScriptParser {
    inner: tree_sitter::Parser,
}

impl TypeScriptParser {
    /// Creates a parser for the TypeScript grammar.
    ///
    /// # Errors
    ///
    /// Returns [`SyntaxError::ParserInitError`] when the grammar's ABI does
    /// not match the linked Tree-sitter runtime.
    pub fn new() -> Result<Self, SyntaxError> {
        let language: tree_sitter::Language = tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into();
        let mut inner = tree_sitter::Parser::new();
        inner.set_language(&language).map_err(|error| {
            SyntaxError::parser_init(DeclarationDialect::TypeScript, error.to_string())
        })?;
        Ok(Self { inner })
    }

    fn tree(&mut self, source: &str) -> Result<tree_sitter::Tree, SyntaxError> {
        self.inner.parse(source, None).ok_or_else(|| {
            SyntaxError::parse(
                DeclarationDialect::TypeScript,
                (1, 1),
                "parser produced no tree",
            )
        })
    }

    /// Parses `source` into its editable outline.
    ///
    /// # Errors
    ///
    /// Returns [`SyntaxError::ParseError`] for the first syntax error.
    pub fn outline(&mut self, source: &str) -> Result<SyntaxOutline, SyntaxError> {
        let tree = self.tree(source)?;
        let root = tree.root_node();
        if let Some(first) = collect_diagnostics(root, source).into_iter().next() {
            return Err(SyntaxError::parse(
                DeclarationDialect::TypeScript,
                (first.line, first.column),
                first.message,
            ));
        }

        let mut imports = Vec::new();
        visit_preorder(root, |node| {
            if node.kind() != "import_statement" {
                return true;
            }
            if let Some(import) = import_source(node, source) {
                imports.push(import);
            }
            false
        });
        Ok(SyntaxOutline::new(imports, leading_docblock(root, source)))
    }
}

fn collect_diagnostics(root: Node<'_>, source: &str) -> Vec<SyntaxDiagnostic> {
    let mut diagnostics = Vec::new();
    visit_preorder(root, |node| {
        if !node.has_error() {
            return false;
        }
        if node.is_error() || node.is_missing() {
            diagnostics.push(SyntaxDiagnostic::from_node(node, source));
        }
        true
    });
    diagnostics
}

/// Walks `root` depth first; `visit` returns whether to enter the node.
fn visit_preorder<'t>(root: Node<'t>, mut visit: impl FnMut(Node<'t>) -> bool) {
    let mut cursor = root.walk();
    loop {
        if visit(cursor.node()) && cursor.goto_first_child() {
            continue;
        }
        while !cursor.goto_next_sibling() {
            if !cursor.goto_parent() {
                return;
            }
        }
    }
}

/// Module literal of `import ... from 'x'`, `import 'x'`, or
/// `import x = require('x')`.
fn import_source(statement: Node<'_>, source: &str) -> Option<ImportSource> {
    let literal = statement.child_by_field_name("source").or_else(|| {
        let mut cursor = statement.walk();
        statement
            .children(&mut cursor)
            .find(|child| child.kind() == "import_require_clause")
            .and_then(|clause| clause.child_by_field_name("source"))
    })?;
    let raw = source.get(literal.byte_range())?;
    ImportSource::from_literal(literal.byte_range(), raw)
}

/// The first top-level node when it is a block comment, after any `#!` line.
fn leading_docblock(root: Node<'_>, source: &str) -> Option<DocBlock> {
    let mut cursor = root.walk();
    let first = root
        .children(&mut cursor)
        .find(|child| child.kind() != "hash_bang_line")?;
    let text = source.get(first.byte_range())?;
    (first.kind() == "comment" && text.starts_with("/*"))
        .then(|| DocBlock::new(first.byte_range(), text))
}
