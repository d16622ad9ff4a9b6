//! Screen cache cell types
//!
//! A cache cell holds the full grapheme cluster displayed in one character
//! position plus an opaque style word. Style words and line attributes are
//! copied verbatim from the engine and never interpreted here.

use serde::{Deserialize, Serialize};
use unicode_width::UnicodeWidthStr;

/// Opaque per-row flags reported by the engine (wrapped, double-width and
/// friends). The raw value is preserved bit for bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct LineAttr(pub u64);

/// A single cache cell
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Cell {
    /// Codepoints of the cluster in display order, base character first.
    /// An empty cluster denotes a blank cell.
    pub cluster: String,
    /// Opaque style word copied verbatim from the engine
    pub attr: u64,
}

impl Cell {
    /// Create a cell from a cluster and style word
    pub fn new(cluster: impl Into<String>, attr: u64) -> Self {
        Self {
            cluster: cluster.into(),
            attr,
        }
    }

    /// Check if this cell is blank (empty cluster)
    pub fn is_blank(&self) -> bool {
        self.cluster.is_empty()
    }

    /// The base character of the cluster, if any
    pub fn base(&self) -> Option<char> {
        self.cluster.chars().next()
    }

    /// Display width of the cluster in columns. Blank cells and clusters of
    /// zero-width codepoints still occupy one column.
    pub fn width(&self) -> usize {
        UnicodeWidthStr::width(self.cluster.as_str()).max(1)
    }

    /// Reset cell to a blank state
    pub fn reset(&mut self) {
        self.cluster.clear();
        self.attr = 0;
    }

    /// Replace cluster and style word, reusing the cluster's allocation
    pub(crate) fn overwrite(&mut self, cluster: &str, attr: u64) {
        self.cluster.clear();
        self.cluster.push_str(cluster);
        self.attr = attr;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_default_is_blank() {
        let cell = Cell::default();
        assert!(cell.is_blank());
        assert_eq!(cell.base(), None);
        assert_eq!(cell.width(), 1);
    }

    #[test]
    fn test_cell_cluster() {
        let cell = Cell::new("e\u{301}", 7);
        assert!(!cell.is_blank());
        assert_eq!(cell.base(), Some('e'));
        assert_eq!(cell.width(), 1); // combining mark adds no width
        assert_eq!(cell.attr, 7);
    }

    #[test]
    fn test_cell_wide_cluster() {
        let cell = Cell::new("\u{4e16}", 0); // CJK ideograph
        assert_eq!(cell.width(), 2);
    }

    #[test]
    fn test_cell_overwrite_and_reset() {
        let mut cell = Cell::new("a", 3);
        cell.overwrite("b\u{300}", 9);
        assert_eq!(cell.cluster, "b\u{300}");
        assert_eq!(cell.attr, 9);

        cell.reset();
        assert!(cell.is_blank());
        assert_eq!(cell.attr, 0);
    }
}
