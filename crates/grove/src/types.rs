//! Value types shared across the tree model and the parser.
//!
//! - **`Point`**: zero-based row/column position (column counted in bytes)
//! - **`ByteRange`**: half-open `[start, end)` byte interval
//! - **`Edit`**: description of how one source buffer became another

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A zero-based row/column position in a source buffer.
///
/// Columns are byte offsets from the start of the row, matching the engine.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct Point {
    /// Zero-based line number
    pub row: usize,
    /// Zero-based byte column within the line
    pub column: usize,
}

impl Point {
    /// Create a point.
    #[must_use]
    pub const fn new(row: usize, column: usize) -> Self {
        Self { row, column }
    }

    /// Compute the position of `offset` within `source`.
    ///
    /// Offsets past the end of the buffer are clamped to its end.
    #[must_use]
    pub fn for_offset(source: &[u8], offset: usize) -> Self {
        let prefix = &source[..offset.min(source.len())];
        let row = prefix.iter().filter(|&&b| b == b'\n').count();
        let column = match prefix.iter().rposition(|&b| b == b'\n') {
            Some(newline) => prefix.len() - newline - 1,
            None => prefix.len(),
        };
        Self { row, column }
    }
}

impl From<tree_sitter::Point> for Point {
    fn from(point: tree_sitter::Point) -> Self {
        Self::new(point.row, point.column)
    }
}

impl From<Point> for tree_sitter::Point {
    fn from(point: Point) -> Self {
        tree_sitter::Point::new(point.row, point.column)
    }
}

impl std::fmt::Display for Point {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.row, self.column)
    }
}

/// A half-open byte interval `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ByteRange {
    /// First byte covered
    pub start: usize,
    /// One past the last byte covered
    pub end: usize,
}

impl ByteRange {
    /// Create a range.
    #[must_use]
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Number of bytes covered.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// Returns `true` if the range covers no bytes.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns `true` if `other` lies entirely within this range.
    #[must_use]
    pub const fn contains(&self, other: &ByteRange) -> bool {
        self.start <= other.start && other.end <= self.end
    }
}

impl From<std::ops::Range<usize>> for ByteRange {
    fn from(range: std::ops::Range<usize>) -> Self {
        Self::new(range.start, range.end)
    }
}

impl From<ByteRange> for std::ops::Range<usize> {
    fn from(range: ByteRange) -> Self {
        range.start..range.end
    }
}

/// How a source buffer was edited into a new one.
///
/// Bytes `[start_byte, old_end_byte)` of the old buffer were replaced by
/// bytes `[start_byte, new_end_byte)` of the new buffer; everything before
/// and after is unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edit {
    /// Where the edit begins (same in both buffers)
    pub start_byte: usize,
    /// End of the replaced span in the old buffer
    pub old_end_byte: usize,
    /// End of the replacement span in the new buffer
    pub new_end_byte: usize,
}

impl Edit {
    /// Create an edit.
    #[must_use]
    pub const fn new(start_byte: usize, old_end_byte: usize, new_end_byte: usize) -> Self {
        Self {
            start_byte,
            old_end_byte,
            new_end_byte,
        }
    }

    /// An insertion of `len` bytes at `at`.
    #[must_use]
    pub const fn insert(at: usize, len: usize) -> Self {
        Self::new(at, at, at.saturating_add(len))
    }

    /// A deletion of the bytes in `range`.
    #[must_use]
    pub const fn delete(range: ByteRange) -> Self {
        Self::new(range.start, range.end, range.start)
    }

    /// Check that this edit turns a buffer of `old_len` bytes into one of
    /// `new_len` bytes.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidEdit` if an offset is inverted or out of
    /// bounds, or the unchanged suffixes have different lengths.
    pub fn validate(&self, old_len: usize, new_len: usize) -> Result<()> {
        if self.start_byte > self.old_end_byte || self.start_byte > self.new_end_byte {
            return Err(Error::InvalidEdit(format!(
                "start byte {} is past the end of the edited span",
                self.start_byte
            )));
        }
        if self.old_end_byte > old_len {
            return Err(Error::InvalidEdit(format!(
                "old end byte {} exceeds old source length {old_len}",
                self.old_end_byte
            )));
        }
        if self.new_end_byte > new_len {
            return Err(Error::InvalidEdit(format!(
                "new end byte {} exceeds new source length {new_len}",
                self.new_end_byte
            )));
        }
        if old_len - self.old_end_byte != new_len - self.new_end_byte {
            return Err(Error::InvalidEdit(
                "unchanged suffix differs in length between old and new source".to_string(),
            ));
        }
        Ok(())
    }

    /// Convert to the engine's edit, deriving row/column positions from the
    /// two buffers.
    pub(crate) fn to_input_edit(
        self,
        old_source: &[u8],
        new_source: &[u8],
    ) -> tree_sitter::InputEdit {
        tree_sitter::InputEdit {
            start_byte: self.start_byte,
            old_end_byte: self.old_end_byte,
            new_end_byte: self.new_end_byte,
            start_position: Point::for_offset(old_source, self.start_byte).into(),
            old_end_position: Point::for_offset(old_source, self.old_end_byte).into(),
            new_end_position: Point::for_offset(new_source, self.new_end_byte).into(),
        }
    }
}
