//! Shared position conversion helpers.
//!
//! Tree-sitter positions and scanner offsets are zero-based. For user-facing
//! messages, we prefer one-based line and column numbers.

/// Converts a Tree-sitter position (0-based) to one-based display coordinates.
#[must_use]
pub(crate) fn point_to_one_based(pos: tree_sitter::Point) -> (u32, u32) {
    // Line/column numbers will realistically never exceed u32::MAX.
    let line = u32::try_from(pos.row.saturating_add(1)).unwrap_or(u32::MAX);
    let column = u32::try_from(pos.column.saturating_add(1)).unwrap_or(u32::MAX);
    (line, column)
}

/// Converts a byte offset into `source` to one-based display coordinates.
///
/// Columns count characters, not bytes. Offsets past the end clamp to the
/// final position.
#[must_use]
pub(crate) fn offset_to_one_based(source: &str, offset: usize) -> (u32, u32) {
    let mut row: usize = 0;
    let mut column: usize = 0;
    for (index, ch) in source.char_indices() {
        if index >= offset {
            break;
        }
        if ch == '\n' {
            row = row.saturating_add(1);
            column = 0;
        } else {
            column = column.saturating_add(1);
        }
    }
    point_to_one_based(tree_sitter::Point { row, column })
}
