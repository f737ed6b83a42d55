/// Line/column conversion for byte offsets.
///
/// Diagnostics are produced as byte ranges; hosts that speak in lines and
/// columns convert them with a [`LineIndex`] built once per document text.
use text_size::TextSize;

/// A position in source code (0-indexed, column in bytes)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LineCol {
    pub line: u32,
    pub col: u32,
}

impl LineCol {
    pub fn new(line: u32, col: u32) -> Self {
        Self { line, col }
    }
}

/// Offsets of every line start in a text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineIndex {
    line_starts: Vec<TextSize>,
    len: TextSize,
}

impl LineIndex {
    pub fn new(text: &str) -> Self {
        let mut line_starts = vec![TextSize::new(0)];
        for (i, b) in text.bytes().enumerate() {
            if b == b'\n' {
                line_starts.push(crate::base::offset(i + 1));
            }
        }
        Self {
            line_starts,
            len: crate::base::offset(text.len()),
        }
    }

    /// Convert an offset into a line/column pair. Offsets past the end clamp to it.
    pub fn line_col(&self, offset: TextSize) -> LineCol {
        let offset = offset.min(self.len);
        let line = match self.line_starts.binary_search(&offset) {
            Ok(line) => line,
            Err(next) => next - 1,
        };
        let col = offset - self.line_starts[line];
        LineCol::new(line as u32, u32::from(col))
    }

    /// Convert a line/column pair back to an offset, if the line exists.
    pub fn offset(&self, pos: LineCol) -> Option<TextSize> {
        let start = *self.line_starts.get(pos.line as usize)?;
        Some((start + TextSize::new(pos.col)).min(self.len))
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }
}
