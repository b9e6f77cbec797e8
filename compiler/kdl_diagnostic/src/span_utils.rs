//! Line and column lookup for byte offsets.
//!
//! The lexer stamps every lexeme with a 1-based line and column taken from
//! a [`LineOffsetTable`] built once per source file.

/// Pre-computed line offset table for efficient line/column lookup.
///
/// # Example
///
/// ```
/// use kdl_diagnostic::span_utils::LineOffsetTable;
///
/// let source = "line1\nline2\nline3";
/// let table = LineOffsetTable::build(source);
///
/// assert_eq!(table.offset_to_line_col(source, 0), (1, 1));  // 'l' in line1
/// assert_eq!(table.offset_to_line_col(source, 6), (2, 1));  // 'l' in line2
/// assert_eq!(table.offset_to_line_col(source, 12), (3, 1)); // 'l' in line3
/// ```
#[derive(Clone, Debug, Default)]
pub struct LineOffsetTable {
    /// Byte offset of each line start.
    /// offsets[0] = 0 (line 1 starts at byte 0)
    offsets: Vec<u32>,
}

impl LineOffsetTable {
    /// Build a line offset table from source text.
    pub fn build(source: &str) -> Self {
        let mut offsets = vec![0u32];
        for (i, byte) in source.as_bytes().iter().enumerate() {
            if *byte == b'\n' {
                offsets.push(u32::try_from(i + 1).unwrap_or(u32::MAX));
            }
        }
        LineOffsetTable { offsets }
    }

    /// Get 1-based line number from a byte offset using binary search.
    #[inline]
    pub fn line_from_offset(&self, offset: u32) -> u32 {
        let line_idx = match self.offsets.binary_search(&offset) {
            Ok(exact) => exact,
            Err(insert) => insert.saturating_sub(1),
        };
        u32::try_from(line_idx).unwrap_or(u32::MAX - 1) + 1
    }

    /// Get 1-based (line, column) from a byte offset.
    ///
    /// The column counts characters, not bytes, from the start of the line.
    pub fn offset_to_line_col(&self, source: &str, offset: u32) -> (u32, u32) {
        let line = self.line_from_offset(offset);
        let line_idx = (line - 1) as usize;
        let line_start = self.offsets.get(line_idx).copied().unwrap_or(0) as usize;
        let offset = (offset as usize).min(source.len());

        let col_text = source.get(line_start..offset).unwrap_or_default();
        let col = u32::try_from(col_text.chars().count()).unwrap_or(u32::MAX - 1) + 1;

        (line, col)
    }

    /// Get the number of lines in the source.
    pub fn line_count(&self) -> usize {
        self.offsets.len()
    }
}
