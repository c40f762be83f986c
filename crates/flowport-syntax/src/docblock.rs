//! Docblock annotation for files exported to www.
//!
//! A docblock that declares `@flow strict` on its own line gains two lines
//! directly after it: `@generated` and an `@oncall` routing tag. The new
//! lines reuse the gutter (indentation, `*`, spacing) and the line ending of
//! the flag line, so the rest of the comment is left exactly as written. When
//! the flag line also closes the comment (` * @flow strict */`), the closer
//! moves to the end of the inserted `@oncall` line.

/// The annotation that makes a docblock eligible for rewriting.
pub const STRICT_FLAG: &str = "@flow strict";

/// The generated-file marker inserted after the flag line.
pub const GENERATED_MARKER: &str = "@generated";

/// The routing tag used when none is configured.
pub const DEFAULT_ONCALL: &str = "lexical_web_text_editor";

/// Lines inserted after every `@flow strict` line of a docblock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocblockAnnotations {
    oncall: String,
}

impl Default for DocblockAnnotations {
    fn default() -> Self {
        Self::new(DEFAULT_ONCALL)
    }
}

impl DocblockAnnotations {
    /// Creates annotations carrying the given `@oncall` tag.
    #[must_use]
    pub fn new(oncall: impl Into<String>) -> Self {
        Self {
            oncall: oncall.into(),
        }
    }

    /// Returns the `@oncall` tag.
    #[must_use]
    pub fn oncall(&self) -> &str {
        &self.oncall
    }

    /// Annotates `comment`, returning `None` when nothing was inserted.
    ///
    /// Flag lines that are already followed by `@generated` are left alone,
    /// so annotating an annotated comment is a no-op.
    #[must_use]
    pub fn apply(&self, comment: &str) -> Option<String> {
        if !comment.contains(STRICT_FLAG) {
            return None;
        }

        let lines: Vec<&str> = comment.split_inclusive('\n').collect();
        let mut annotated = String::with_capacity(comment.len().saturating_add(64));
        let mut inserted = false;

        for (index, line) in lines.iter().enumerate() {
            let Some(flag) = FlagLine::parse(line) else {
                annotated.push_str(line);
                continue;
            };
            let next = lines.get(index.saturating_add(1)).copied();
            if next.and_then(annotation).is_some_and(|a| a == GENERATED_MARKER) {
                annotated.push_str(line);
                continue;
            }

            let ending = line_ending(line);
            let newline = if ending.is_empty() {
                comment_newline(comment)
            } else {
                ending
            };
            match flag.closer {
                None => annotated.push_str(line),
                Some(_) => {
                    annotated.push_str(flag.gutter);
                    annotated.push_str(STRICT_FLAG);
                    annotated.push_str(newline);
                }
            }
            annotated.push_str(flag.gutter);
            annotated.push_str(GENERATED_MARKER);
            annotated.push_str(newline);
            annotated.push_str(flag.gutter);
            annotated.push_str("@oncall ");
            annotated.push_str(&self.oncall);
            match flag.closer {
                None => annotated.push_str(newline),
                Some(closer) => {
                    annotated.push_str(closer);
                    annotated.push_str(ending);
                }
            }
            inserted = true;
        }

        inserted.then_some(annotated)
    }
}

/// A `@flow strict` line of a docblock.
struct FlagLine<'a> {
    gutter: &'a str,
    /// The spacing and `*/` when the flag line also closes the comment.
    closer: Option<&'a str>,
}

impl<'a> FlagLine<'a> {
    fn parse(line: &'a str) -> Option<Self> {
        let (gutter, text) = split_gutter(line)?;
        if text == STRICT_FLAG {
            return Some(Self {
                gutter,
                closer: None,
            });
        }
        let flag = text.strip_suffix("*/")?.trim_end();
        if flag != STRICT_FLAG {
            return None;
        }
        Some(Self {
            gutter,
            closer: text.get(STRICT_FLAG.len()..),
        })
    }
}

fn comment_newline(comment: &str) -> &'static str {
    if comment.contains("\r\n") { "\r\n" } else { "\n" }
}

fn line_ending(line: &str) -> &str {
    if line.ends_with("\r\n") {
        "\r\n"
    } else if line.ends_with('\n') {
        "\n"
    } else {
        ""
    }
}

/// Splits a docblock line into its gutter and annotation text.
///
/// A gutter is optional indentation, one `*`, and the spacing that follows.
/// Lines that open or close the comment have no annotation.
fn split_gutter(line: &str) -> Option<(&str, &str)> {
    let body = line.trim_end_matches(['\n', '\r']);
    let after_indent = body.trim_start();
    let after_star = after_indent.strip_prefix('*')?;
    if after_star.starts_with('/') {
        return None;
    }
    let text = after_star.trim_start();
    let gutter = body.get(..body.len().saturating_sub(text.len()))?;
    Some((gutter, text.trim_end()))
}

fn annotation(line: &str) -> Option<&str> {
    split_gutter(line).map(|(_, text)| text)
}
