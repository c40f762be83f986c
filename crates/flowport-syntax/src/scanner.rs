//! Lossless scanner for Flow declaration files.
//!
//! The Tree-sitter grammars shipped with the toolchain do not understand Flow
//! type syntax (`?T`, `{| |}`, `declare export`), so Flow files are read with
//! a hand-written scanner instead. The scanner splits the whole document into
//! tokens, trivia included, so every byte belongs to exactly one token. It
//! tracks bracket nesting (template substitutions included) and rejects
//! unterminated literals, unterminated comments, and unbalanced brackets.
//!
//! Import declarations are then recognised on the significant token stream at
//! any nesting depth, which covers imports inside `declare module` bodies.

use std::ops::Range;

use crate::dialect::DeclarationDialect;
use crate::error::SyntaxError;
use crate::outline::{DocBlock, ImportSource, SyntaxOutline};
use crate::position::offset_to_one_based;

/// Classification of a scanned token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TokenKind {
    Whitespace,
    LineComment,
    BlockComment,
    String,
    /// A template chunk: from `` ` `` or `}` up to `${` or the closing `` ` ``.
    Template,
    Regex,
    Number,
    Identifier,
    Punct(u8),
}

impl TokenKind {
    const fn is_trivia(self) -> bool {
        matches!(self, Self::Whitespace | Self::LineComment | Self::BlockComment)
    }
}

/// A token and the bytes it covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Token {
    pub(crate) kind: TokenKind,
    pub(crate) span: Range<usize>,
}

#[derive(Debug, Clone, Copy)]
enum Bracket {
    Paren(usize),
    /// The parenthesised head of `if`, `while`, `for` or `with`.
    ControlHead(usize),
    Square(usize),
    Curly(usize),
    TemplateSubstitution(usize),
}

impl Bracket {
    const fn open_offset(self) -> usize {
        match self {
            Self::Paren(at)
            | Self::ControlHead(at)
            | Self::Square(at)
            | Self::Curly(at)
            | Self::TemplateSubstitution(at) => at,
        }
    }

    const fn closer(self) -> u8 {
        match self {
            Self::Paren(_) | Self::ControlHead(_) => b')',
            Self::Square(_) => b']',
            Self::Curly(_) | Self::TemplateSubstitution(_) => b'}',
        }
    }
}

const BYTE_ORDER_MARK: char = '\u{feff}';

/// Keywords after which a `/` starts a regular expression.
const REGEX_PREFIX_KEYWORDS: &[&str] = &[
    "return",
    "typeof",
    "instanceof",
    "in",
    "of",
    "new",
    "delete",
    "void",
    "throw",
    "case",
    "do",
    "else",
    "yield",
    "await",
];

/// Keywords whose parenthesised head is followed by a statement, so a `/`
/// after the closing `)` starts a regular expression.
const CONTROL_KEYWORDS: &[&str] = &["if", "while", "for", "with"];

/// Parses Flow `source` into an outline of its editable regions.
pub(crate) fn outline(source: &str) -> Result<SyntaxOutline, SyntaxError> {
    let tokens = tokenize(source)?;
    let docblock = find_docblock(source, &tokens);
    let imports = find_imports(source, &tokens)?;
    Ok(SyntaxOutline::new(imports, docblock))
}

/// Splits `source` into tokens that together cover every byte.
pub(crate) fn tokenize(source: &str) -> Result<Vec<Token>, SyntaxError> {
    Scanner::new(source).run()
}

struct Scanner<'src> {
    source: &'src str,
    bytes: &'src [u8],
    pos: usize,
    tokens: Vec<Token>,
    brackets: Vec<Bracket>,
    /// Offset of the most recent `)` that closed a control head.
    last_control_close: Option<usize>,
}

impl<'src> Scanner<'src> {
    fn new(source: &'src str) -> Self {
        Self {
            source,
            bytes: source.as_bytes(),
            pos: 0,
            tokens: Vec::new(),
            brackets: Vec::new(),
            last_control_close: None,
        }
    }

    fn run(mut self) -> Result<Vec<Token>, SyntaxError> {
        if self.source.starts_with(BYTE_ORDER_MARK) {
            self.push(TokenKind::Whitespace, 0, BYTE_ORDER_MARK.len_utf8());
        }
        if self.bytes.get(self.pos..).is_some_and(|rest| rest.starts_with(b"#!")) {
            let start = self.pos;
            let end = self.line_end(start);
            self.push(TokenKind::LineComment, start, end);
        }

        while let Some(byte) = self.peek(0) {
            let start = self.pos;
            match byte {
                b' ' | b'\t' | b'\n' | b'\r' | 0x0b | 0x0c => {
                    let end = self.take_while(start, is_whitespace);
                    self.push(TokenKind::Whitespace, start, end);
                }
                b'/' => self.scan_slash(start)?,
                b'"' | b'\'' => self.scan_string(start, byte)?,
                b'`' => self.scan_template(start, start.saturating_add(1))?,
                b'0'..=b'9' => {
                    let end = self.take_while(start, is_number_continue);
                    self.push(TokenKind::Number, start, end);
                }
                b'.' if self.peek(1).is_some_and(|b| b.is_ascii_digit()) => {
                    let end = self.take_while(start.saturating_add(1), is_number_continue);
                    self.push(TokenKind::Number, start, end);
                }
                b'(' if self.follows_keyword(CONTROL_KEYWORDS) => {
                    self.open(Bracket::ControlHead(start), byte);
                }
                b'(' => self.open(Bracket::Paren(start), byte),
                b'[' => self.open(Bracket::Square(start), byte),
                b'{' => self.open(Bracket::Curly(start), byte),
                b')' | b']' | b'}' => self.close(start, byte)?,
                b if is_identifier_start(b) => {
                    let end = self.take_while(start, is_identifier_continue);
                    self.push(TokenKind::Identifier, start, end);
                }
                other => self.push(TokenKind::Punct(other), start, start.saturating_add(1)),
            }
        }

        if let Some(open) = self.brackets.last() {
            return Err(self.error_at(
                open.open_offset(),
                format!("unclosed bracket, expected `{}`", char::from(open.closer())),
            ));
        }
        Ok(self.tokens)
    }

    fn peek(&self, ahead: usize) -> Option<u8> {
        self.bytes.get(self.pos.saturating_add(ahead)).copied()
    }

    fn push(&mut self, kind: TokenKind, start: usize, end: usize) {
        self.tokens.push(Token {
            kind,
            span: start..end,
        });
        self.pos = end;
    }

    fn take_while(&self, from: usize, predicate: impl Fn(u8) -> bool) -> usize {
        let mut end = from;
        while self.bytes.get(end).is_some_and(|b| predicate(*b)) {
            end = end.saturating_add(1);
        }
        end
    }

    fn line_end(&self, from: usize) -> usize {
        self.take_while(from, |b| b != b'\n' && b != b'\r')
    }

    fn open(&mut self, bracket: Bracket, byte: u8) {
        let start = self.pos;
        self.brackets.push(bracket);
        self.push(TokenKind::Punct(byte), start, start.saturating_add(1));
    }

    fn close(&mut self, start: usize, byte: u8) -> Result<(), SyntaxError> {
        match self.brackets.pop() {
            Some(Bracket::TemplateSubstitution(_)) if byte == b'}' => {
                self.scan_template(start, start.saturating_add(1))
            }
            Some(open) if open.closer() == byte => {
                if matches!(open, Bracket::ControlHead(_)) {
                    self.last_control_close = Some(start);
                }
                self.push(TokenKind::Punct(byte), start, start.saturating_add(1));
                Ok(())
            }
            Some(open) => Err(self.error_at(
                start,
                format!(
                    "unexpected `{}`, expected `{}`",
                    char::from(byte),
                    char::from(open.closer())
                ),
            )),
            None => Err(self.error_at(start, format!("unexpected `{}`", char::from(byte)))),
        }
    }

    fn scan_slash(&mut self, start: usize) -> Result<(), SyntaxError> {
        match self.peek(1) {
            Some(b'/') => {
                let end = self.line_end(start);
                self.push(TokenKind::LineComment, start, end);
                Ok(())
            }
            Some(b'*') => {
                let body = start.saturating_add(2);
                let end = self
                    .bytes
                    .get(body..)
                    .and_then(|rest| rest.windows(2).position(|pair| pair == b"*/"))
                    .map(|found| body.saturating_add(found).saturating_add(2))
                    .ok_or_else(|| self.error_at(start, "unterminated block comment"))?;
                self.push(TokenKind::BlockComment, start, end);
                Ok(())
            }
            _ if self.regex_allowed() => self.scan_regex(start),
            _ => {
                self.push(TokenKind::Punct(b'/'), start, start.saturating_add(1));
                Ok(())
            }
        }
    }

    fn scan_string(&mut self, start: usize, quote: u8) -> Result<(), SyntaxError> {
        let mut at = start.saturating_add(1);
        loop {
            match self.bytes.get(at).copied() {
                Some(b'\\') => {
                    // A `\r\n` line continuation counts as a single escape.
                    let escaped = self.bytes.get(at.saturating_add(1)..at.saturating_add(3));
                    let skip = if escaped == Some(b"\r\n".as_slice()) { 3 } else { 2 };
                    at = at.saturating_add(skip);
                }
                Some(b) if b == quote => {
                    self.push(TokenKind::String, start, at.saturating_add(1));
                    return Ok(());
                }
                Some(b'\n' | b'\r') | None => {
                    return Err(self.error_at(start, "unterminated string literal"));
                }
                Some(_) => at = at.saturating_add(1),
            }
        }
    }

    /// Scans a template chunk whose body starts at `body`.
    fn scan_template(&mut self, start: usize, body: usize) -> Result<(), SyntaxError> {
        let mut at = body;
        loop {
            match self.bytes.get(at).copied() {
                Some(b'\\') => at = at.saturating_add(2),
                Some(b'`') => {
                    self.push(TokenKind::Template, start, at.saturating_add(1));
                    return Ok(());
                }
                Some(b'$') if self.bytes.get(at.saturating_add(1)) == Some(&b'{') => {
                    self.brackets.push(Bracket::TemplateSubstitution(at));
                    self.push(TokenKind::Template, start, at.saturating_add(2));
                    return Ok(());
                }
                Some(_) => at = at.saturating_add(1),
                None => return Err(self.error_at(start, "unterminated template literal")),
            }
        }
    }

    fn scan_regex(&mut self, start: usize) -> Result<(), SyntaxError> {
        let mut at = start.saturating_add(1);
        let mut in_class = false;
        loop {
            match self.bytes.get(at).copied() {
                Some(b'\\') => at = at.saturating_add(2),
                Some(b'[') => {
                    in_class = true;
                    at = at.saturating_add(1);
                }
                Some(b']') => {
                    in_class = false;
                    at = at.saturating_add(1);
                }
                Some(b'/') if !in_class => {
                    let end = self.take_while(at.saturating_add(1), |b| b.is_ascii_alphabetic());
                    self.push(TokenKind::Regex, start, end);
                    return Ok(());
                }
                Some(b'\n' | b'\r') | None => {
                    return Err(self.error_at(start, "unterminated regular expression"));
                }
                Some(_) => at = at.saturating_add(1),
            }
        }
    }

    fn previous_significant(&self) -> Option<&Token> {
        self.tokens.iter().rev().find(|t| !t.kind.is_trivia())
    }

    fn follows_keyword(&self, keywords: &[&str]) -> bool {
        self.previous_significant().is_some_and(|previous| {
            previous.kind == TokenKind::Identifier
                && self
                    .source
                    .get(previous.span.clone())
                    .is_some_and(|word| keywords.contains(&word))
        })
    }

    /// Decides whether a `/` at the current position starts a regex.
    ///
    /// A `)` usually ends an expression, except when it closes the head of
    /// `if`, `while`, `for` or `with`, where a statement follows. A `}` is
    /// always treated as ending an expression.
    fn regex_allowed(&self) -> bool {
        let Some(previous) = self.previous_significant() else {
            return true;
        };
        match previous.kind {
            TokenKind::Punct(b')') => self.last_control_close == Some(previous.span.start),
            TokenKind::Punct(b']' | b'}') => false,
            TokenKind::Punct(_) => true,
            TokenKind::Identifier => self.follows_keyword(REGEX_PREFIX_KEYWORDS),
            _ => false,
        }
    }

    fn error_at(&self, offset: usize, message: impl Into<String>) -> SyntaxError {
        SyntaxError::parse(
            DeclarationDialect::Flow,
            offset_to_one_based(self.source, offset),
            message,
        )
    }
}

const fn is_whitespace(byte: u8) -> bool {
    matches!(byte, b' ' | b'\t' | b'\n' | b'\r' | 0x0b | 0x0c)
}

const fn is_identifier_start(byte: u8) -> bool {
    byte.is_ascii_alphabetic() || matches!(byte, b'_' | b'$' | b'\\') || byte >= 0x80
}

const fn is_identifier_continue(byte: u8) -> bool {
    is_identifier_start(byte) || byte.is_ascii_digit()
}

const fn is_number_continue(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || matches!(byte, b'_' | b'.')
}

/// Returns the first comment of the file when it is a block comment.
///
/// A leading byte order mark and `#!` line are skipped.
fn find_docblock(source: &str, tokens: &[Token]) -> Option<DocBlock> {
    let shebang = source
        .strip_prefix(BYTE_ORDER_MARK)
        .unwrap_or(source)
        .starts_with("#!");
    let first = tokens
        .iter()
        .filter(|token| token.kind != TokenKind::Whitespace)
        .nth(usize::from(shebang))?;
    if first.kind != TokenKind::BlockComment {
        return None;
    }
    let text = source.get(first.span.clone())?;
    Some(DocBlock::new(first.span.clone(), text))
}

/// Significant-token view used to recognise import declarations.
struct Significant<'a> {
    source: &'a str,
    tokens: Vec<&'a Token>,
}

impl<'a> Significant<'a> {
    fn new(source: &'a str, tokens: &'a [Token]) -> Self {
        Self {
            source,
            tokens: tokens.iter().filter(|t| !t.kind.is_trivia()).collect(),
        }
    }

    fn kind(&self, index: usize) -> Option<TokenKind> {
        self.tokens.get(index).map(|t| t.kind)
    }

    fn text(&self, index: usize) -> Option<&'a str> {
        self.tokens
            .get(index)
            .and_then(|t| self.source.get(t.span.clone()))
    }

    fn is_word(&self, index: usize, word: &str) -> bool {
        self.kind(index) == Some(TokenKind::Identifier) && self.text(index) == Some(word)
    }

    /// Whether the `import` at `index` begins an import declaration rather
    /// than `import(...)`, `import.meta`, or a property named `import`.
    fn starts_import_declaration(&self, index: usize) -> bool {
        if !self.is_word(index, "import") {
            return false;
        }
        if index > 0 && self.kind(index.saturating_sub(1)) == Some(TokenKind::Punct(b'.')) {
            return false;
        }
        matches!(
            self.kind(index.saturating_add(1)),
            Some(
                TokenKind::Identifier
                    | TokenKind::String
                    | TokenKind::Punct(b'{')
                    | TokenKind::Punct(b'*')
            )
        )
    }

    /// Finds the index of the source literal of the declaration at `index`.
    fn import_source(&self, index: usize) -> Result<usize, usize> {
        let first = index.saturating_add(1);
        if self.kind(first) == Some(TokenKind::String) {
            return Ok(first);
        }

        let mut depth: usize = 0;
        let mut at = first;
        loop {
            match self.kind(at) {
                None => return Err(at),
                Some(TokenKind::Punct(b'{' | b'(' | b'[')) => depth = depth.saturating_add(1),
                Some(TokenKind::Punct(b'}' | b')' | b']')) => {
                    if depth == 0 {
                        return Err(at);
                    }
                    depth = depth.saturating_sub(1);
                }
                Some(TokenKind::Punct(b';')) if depth == 0 => return Err(at),
                Some(TokenKind::String) if depth == 0 => return Err(at),
                Some(TokenKind::Identifier)
                    if depth == 0
                        && self.is_word(at, "from")
                        && self.kind(at.saturating_add(1)) == Some(TokenKind::String) =>
                {
                    return Ok(at.saturating_add(1));
                }
                Some(_) => {}
            }
            at = at.saturating_add(1);
        }
    }
}

fn find_imports(source: &str, tokens: &[Token]) -> Result<Vec<ImportSource>, SyntaxError> {
    let view = Significant::new(source, tokens);
    let mut imports = Vec::new();

    for index in 0..view.tokens.len() {
        if !view.starts_import_declaration(index) {
            continue;
        }
        let literal = view.import_source(index).map_err(|stop| {
            let offset = view
                .tokens
                .get(stop)
                .map_or(source.len(), |t| t.span.start);
            SyntaxError::parse(
                DeclarationDialect::Flow,
                offset_to_one_based(source, offset),
                "import declaration is missing its module source",
            )
        })?;
        let Some(token) = view.tokens.get(literal) else {
            continue;
        };
        let raw = view.text(literal).unwrap_or_default();
        if let Some(import) = ImportSource::from_literal(token.span.clone(), raw) {
            imports.push(import);
        }
    }

    Ok(imports)
}
