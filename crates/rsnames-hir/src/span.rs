//! Source locations shared by the item tree, the symbol table and diagnostics.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};
use text_size::TextRange;

/// Identifies one source file of the analysed crate.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct FileId(pub u32);

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "file#{}", self.0)
    }
}

/// A range inside a specific file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceSpan {
    /// File the range belongs to.
    pub file_id: FileId,
    /// Byte range inside the file.
    pub range: TextRange,
}

impl SourceSpan {
    /// Creates a new span.
    #[must_use]
    pub fn new(file_id: FileId, range: TextRange) -> Self {
        Self { file_id, range }
    }

    /// Start offset of the range, as a plain number.
    #[must_use]
    pub fn start(&self) -> u32 {
        u32::from(self.range.start())
    }

    /// End offset of the range, as a plain number.
    #[must_use]
    pub fn end(&self) -> u32 {
        u32::from(self.range.end())
    }
}

impl Ord for SourceSpan {
    fn cmp(&self, other: &Self) -> Ordering {
        self.file_id
            .cmp(&other.file_id)
            .then_with(|| self.range.start().cmp(&other.range.start()))
            .then_with(|| self.range.end().cmp(&other.range.end()))
    }
}

impl PartialOrd for SourceSpan {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for SourceSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}..{}", self.file_id, self.start(), self.end())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spans_order_by_file_then_offset() {
        let a = SourceSpan::new(FileId(0), TextRange::new(10.into(), 12.into()));
        let b = SourceSpan::new(FileId(0), TextRange::new(3.into(), 40.into()));
        let c = SourceSpan::new(FileId(1), TextRange::new(0.into(), 1.into()));
        let mut spans = vec![c, a, b];
        spans.sort();
        assert_eq!(spans, vec![b, a, c]);
    }
}
