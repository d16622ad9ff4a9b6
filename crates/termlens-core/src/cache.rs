//! Screen cache, the mirrored terminal buffer with scrollback
//!
//! Rows are stored oldest-scrollback-line first. Externally rows are
//! addressed with display-relative signed indices: row 0 is the top visible
//! row, negative rows reach back into scrollback, and the bottom visible row
//! is `visible_rows - 1`. That matches the coordinates both write paths use
//! (viewport rows for live repaints, page offsets for a full capture).

use crate::cell::{Cell, LineAttr};
use crate::color::Palette;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// A row of cells plus its line attribute
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Row {
    cells: Vec<Cell>,
    /// Per-row flags copied verbatim from the engine
    pub attr: LineAttr,
}

impl Row {
    /// Create a blank row with the given width
    pub fn new(columns: usize) -> Self {
        Self {
            cells: vec![Cell::default(); columns],
            attr: LineAttr::default(),
        }
    }

    /// Get the width of this row
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Check if the row has no cells
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Resize the row to a new width
    pub fn resize(&mut self, columns: usize) {
        self.cells.resize(columns, Cell::default());
    }

    /// Blank all cells and clear the line attribute
    pub fn clear(&mut self) {
        for cell in &mut self.cells {
            cell.reset();
        }
        self.attr = LineAttr::default();
    }

    /// Get a reference to a cell at the given column
    pub fn get(&self, column: usize) -> Option<&Cell> {
        self.cells.get(column)
    }

    /// Get a mutable reference to a cell at the given column
    pub fn get_mut(&mut self, column: usize) -> Option<&mut Cell> {
        self.cells.get_mut(column)
    }

    /// Iterator over cells
    pub fn iter(&self) -> impl Iterator<Item = &Cell> {
        self.cells.iter()
    }

    /// Get the text content of this row (trimmed)
    pub fn text(&self) -> String {
        let mut s = String::new();
        self.write_text_to(&mut s);
        s
    }

    /// Write the text content of this row (trimmed) into an existing buffer.
    ///
    /// The buffer is cleared first, then the row's text is appended. This
    /// allows reusing a single String allocation across many rows. Blank
    /// cells read as spaces.
    pub fn write_text_to(&self, buf: &mut String) {
        buf.clear();
        for cell in &self.cells {
            if cell.is_blank() {
                buf.push(' ');
            } else {
                buf.push_str(&cell.cluster);
            }
        }
        let trimmed_len = buf.trim_end().len();
        buf.truncate(trimmed_len);
    }
}

impl std::ops::Index<usize> for Row {
    type Output = Cell;

    fn index(&self, column: usize) -> &Self::Output {
        &self.cells[column]
    }
}

impl std::ops::IndexMut<usize> for Row {
    fn index_mut(&mut self, column: usize) -> &mut Self::Output {
        &mut self.cells[column]
    }
}

/// Mirrored screen buffer: visible rows plus scrollback, palette included.
///
/// The cache is owned and mutated exclusively by the synchronization paths;
/// readers get shared access between writes. It is rebuilt in place, cell by
/// cell, and only resized at the start of a full capture.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScreenCache {
    /// All rows, oldest scrollback line first
    rows: VecDeque<Row>,
    columns: usize,
    visible_rows: usize,
    palette: Palette,
}

impl ScreenCache {
    /// Create a cache covering only a visible region, with no scrollback
    pub fn new(columns: usize, visible_rows: usize) -> Self {
        let mut cache = Self {
            rows: VecDeque::new(),
            columns,
            visible_rows,
            palette: Palette::default(),
        };
        cache.resize(columns, visible_rows, visible_rows);
        cache
    }

    /// Get the column count
    pub fn columns(&self) -> usize {
        self.columns
    }

    /// Get the visible row count
    pub fn visible_rows(&self) -> usize {
        self.visible_rows
    }

    /// Total line count (scrollback plus visible rows)
    pub fn total_lines(&self) -> usize {
        self.rows.len()
    }

    /// Lines of scrollback in front of the visible region
    pub fn scrollback_lines(&self) -> usize {
        self.rows.len() - self.visible_rows
    }

    /// Resize to new dimensions, preserving existing content where it fits.
    ///
    /// `total_lines` is clamped to at least `visible_rows`. Growth inserts
    /// blank rows at the scrollback end; shrinking drops the oldest rows, so
    /// the visible region keeps its addresses across a resize.
    pub fn resize(&mut self, columns: usize, visible_rows: usize, total_lines: usize) {
        let total_lines = total_lines.max(visible_rows);

        for row in &mut self.rows {
            row.resize(columns);
        }
        while self.rows.len() > total_lines {
            self.rows.pop_front();
        }
        while self.rows.len() < total_lines {
            self.rows.push_front(Row::new(columns));
        }

        self.columns = columns;
        self.visible_rows = visible_rows;
    }

    /// Replace the palette table
    pub fn set_palette(&mut self, palette: Palette) {
        self.palette = palette;
    }

    /// Get the palette table
    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    fn storage_index(&self, row: isize) -> Option<usize> {
        let index = row + self.scrollback_lines() as isize;
        if index >= 0 && (index as usize) < self.rows.len() {
            Some(index as usize)
        } else {
            None
        }
    }

    /// Get a row by display-relative index (0 = top visible row, negative =
    /// scrollback)
    pub fn row(&self, row: isize) -> Option<&Row> {
        self.rows.get(self.storage_index(row)?)
    }

    /// Get a mutable row by display-relative index
    pub fn row_mut(&mut self, row: isize) -> Option<&mut Row> {
        let index = self.storage_index(row)?;
        self.rows.get_mut(index)
    }

    /// Overwrite one cell. An empty cluster blanks the cell. Writes outside
    /// the cache are dropped.
    pub fn set_cell(&mut self, row: isize, column: usize, cluster: &str, attr: u64) {
        match self.row_mut(row).and_then(|r| r.get_mut(column)) {
            Some(cell) => cell.overwrite(cluster, attr),
            None => log::trace!("dropping cell write outside cache: row {row} col {column}"),
        }
    }

    /// Overwrite one row's line attribute. Writes outside the cache are
    /// dropped.
    pub fn set_row_attr(&mut self, row: isize, attr: LineAttr) {
        match self.row_mut(row) {
            Some(r) => r.attr = attr,
            None => log::trace!("dropping line-attribute write outside cache: row {row}"),
        }
    }

    /// Iterator over all rows, oldest scrollback line first
    pub fn iter(&self) -> impl Iterator<Item = &Row> {
        self.rows.iter()
    }

    /// Get all text content, one line per row, oldest scrollback line first
    pub fn text(&self) -> String {
        self.rows
            .iter()
            .map(|r| r.text())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Text of the visible region only
    pub fn visible_text(&self) -> String {
        (0..self.visible_rows as isize)
            .filter_map(|r| self.row(r).map(|row| row.text()))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_new() {
        let cache = ScreenCache::new(80, 24);
        assert_eq!(cache.columns(), 80);
        assert_eq!(cache.visible_rows(), 24);
        assert_eq!(cache.total_lines(), 24);
        assert_eq!(cache.scrollback_lines(), 0);
    }

    #[test]
    fn test_signed_row_addressing() {
        let mut cache = ScreenCache::new(10, 4);
        cache.resize(10, 4, 10); // 6 lines of scrollback

        assert!(cache.row(-7).is_none());
        assert!(cache.row(-6).is_some());
        assert!(cache.row(3).is_some());
        assert!(cache.row(4).is_none());

        cache.set_cell(-6, 0, "a", 1);
        cache.set_cell(3, 9, "z", 2);
        assert_eq!(cache.row(-6).unwrap()[0].cluster, "a");
        assert_eq!(cache.row(3).unwrap()[9].cluster, "z");
    }

    #[test]
    fn test_out_of_range_writes_dropped() {
        let mut cache = ScreenCache::new(4, 2);
        cache.set_cell(5, 0, "x", 0);
        cache.set_cell(0, 99, "x", 0);
        cache.set_row_attr(-1, LineAttr(1));
        assert!(cache.iter().all(|r| r.iter().all(Cell::is_blank)));
    }

    #[test]
    fn test_resize_keeps_visible_addresses() {
        let mut cache = ScreenCache::new(10, 4);
        cache.set_cell(0, 0, "A", 0);
        cache.set_cell(3, 0, "B", 0);

        // Growing total lines adds scrollback without moving visible rows
        cache.resize(10, 4, 20);
        assert_eq!(cache.scrollback_lines(), 16);
        assert_eq!(cache.row(0).unwrap()[0].cluster, "A");
        assert_eq!(cache.row(3).unwrap()[0].cluster, "B");

        // Shrinking drops the oldest rows first
        cache.resize(10, 4, 4);
        assert_eq!(cache.scrollback_lines(), 0);
        assert_eq!(cache.row(0).unwrap()[0].cluster, "A");
    }

    #[test]
    fn test_resize_clamps_total_to_visible() {
        let mut cache = ScreenCache::new(10, 4);
        cache.resize(10, 4, 0);
        assert_eq!(cache.total_lines(), 4);
    }

    #[test]
    fn test_row_text() {
        let mut cache = ScreenCache::new(10, 1);
        cache.set_cell(0, 0, "H", 0);
        cache.set_cell(0, 1, "i", 0);
        assert_eq!(cache.row(0).unwrap().text(), "Hi");
    }

    #[test]
    fn test_visible_text_excludes_scrollback() {
        let mut cache = ScreenCache::new(4, 1);
        cache.resize(4, 1, 2);
        cache.set_cell(-1, 0, "h", 0);
        cache.set_cell(0, 0, "v", 0);
        assert_eq!(cache.visible_text(), "v");
        assert_eq!(cache.text(), "h\nv");
    }
}
