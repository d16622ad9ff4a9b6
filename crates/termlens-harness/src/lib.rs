//! Scripted in-memory engine for exercising the mirror without a real
//! terminal-emulation engine.
//!
//! [`ScriptedEngine`] implements the [`Engine`] trait over a plain row
//! store. Tests preload history and screen rows, queue repaint
//! notifications, and afterwards inspect the bytes the engine was fed and
//! the exact sequence of viewport scrolls it was asked to perform.

use std::collections::VecDeque;

use termlens_core::{
    DamageSink, Engine, EngineCell, EngineError, EngineOptions, LineAttr, Palette, RowView,
};

/// One engine row: cells (possibly extending past the column count to hold
/// chained combining codepoints) plus a line attribute
#[derive(Debug, Clone)]
struct ScriptedRow {
    cells: Vec<EngineCell>,
    attr: LineAttr,
}

impl ScriptedRow {
    fn blank(columns: usize) -> Self {
        Self {
            cells: vec![EngineCell::new(' '); columns],
            attr: LineAttr::default(),
        }
    }

    fn from_text(text: &str, columns: usize, attr: LineAttr) -> Self {
        let mut cells: Vec<EngineCell> = text.chars().take(columns).map(EngineCell::new).collect();
        cells.resize(columns, EngineCell::new(' '));
        Self { cells, attr }
    }
}

/// A queued repaint notification, delivered on the next `feed` or
/// `flush_pending` call
#[derive(Debug, Clone)]
struct PendingDamage {
    row: usize,
    column: usize,
    run: Vec<char>,
    attr: u64,
    line_attr: LineAttr,
}

/// In-memory engine with scripted content and full call recording
#[derive(Debug)]
pub struct ScriptedEngine {
    columns: usize,
    rows: usize,
    scrollback_capacity: usize,
    palette: Palette,
    /// Scrollback rows, oldest first
    history: Vec<ScriptedRow>,
    /// Visible rows, top first
    screen: Vec<ScriptedRow>,
    viewport_offset: isize,
    scroll_log: Vec<isize>,
    flushes: usize,
    fed: Vec<u8>,
    options: EngineOptions,
    linefeed_implies_cr: bool,
    pending: VecDeque<PendingDamage>,
}

impl ScriptedEngine {
    pub fn new(columns: usize, rows: usize) -> Self {
        Self {
            columns,
            rows,
            scrollback_capacity: usize::MAX,
            palette: Palette::default(),
            history: Vec::new(),
            screen: (0..rows).map(|_| ScriptedRow::blank(columns)).collect(),
            viewport_offset: 0,
            scroll_log: Vec::new(),
            flushes: 0,
            fed: Vec::new(),
            options: EngineOptions::empty(),
            linefeed_implies_cr: false,
            pending: VecDeque::new(),
        }
    }

    /// Append a scrollback row from plain text, oldest rows pushed first
    pub fn push_history_text(&mut self, text: &str) {
        self.push_history_row(text, LineAttr::default());
    }

    /// Append a scrollback row from plain text with a line attribute
    pub fn push_history_row(&mut self, text: &str, attr: LineAttr) {
        let row = ScriptedRow::from_text(text, self.columns, attr);
        self.history.push(row);
        while self.history.len() > self.scrollback_capacity {
            self.history.remove(0);
        }
    }

    /// Replace a visible row with plain text
    pub fn set_screen_text(&mut self, row: usize, text: &str) {
        self.screen[row] = ScriptedRow::from_text(text, self.columns, LineAttr::default());
    }

    /// Replace a visible row with raw cells; the slice may be longer than
    /// the column count to hold chained combining codepoints
    pub fn set_screen_cells(&mut self, row: usize, cells: Vec<EngineCell>) {
        self.screen[row].cells = cells;
    }

    /// Set a visible row's line attribute
    pub fn set_screen_row_attr(&mut self, row: usize, attr: LineAttr) {
        self.screen[row].attr = attr;
    }

    /// Replace the palette reported to captures
    pub fn set_palette(&mut self, palette: Palette) {
        self.palette = palette;
    }

    /// Queue a repaint notification for the next `feed` or `flush_pending`
    pub fn queue_damage(&mut self, row: usize, column: usize, run: &str, attr: u64, line_attr: LineAttr) {
        self.pending.push_back(PendingDamage {
            row,
            column,
            run: run.chars().collect(),
            attr,
            line_attr,
        });
    }

    /// Every viewport offset the engine was scrolled to, in order
    pub fn scroll_log(&self) -> &[isize] {
        &self.scroll_log
    }

    /// Current viewport offset (0 = live position)
    pub fn viewport_offset(&self) -> isize {
        self.viewport_offset
    }

    /// All filtered bytes received through `feed`
    pub fn fed_bytes(&self) -> &[u8] {
        &self.fed
    }

    /// Number of `flush_pending` calls
    pub fn flush_count(&self) -> usize {
        self.flushes
    }

    /// Scrollback rows the engine can hold after the last resize
    pub fn scrollback_capacity(&self) -> usize {
        self.scrollback_capacity
    }

    /// Option flags last forwarded through `configure`
    pub fn options(&self) -> EngineOptions {
        self.options
    }

    /// Last value forwarded through `set_linefeed_implies_cr`
    pub fn linefeed_implies_cr(&self) -> bool {
        self.linefeed_implies_cr
    }

    fn drain_pending(&mut self, sink: &mut dyn DamageSink) {
        while let Some(damage) = self.pending.pop_front() {
            sink.damage(
                damage.row,
                damage.column,
                &damage.run,
                damage.attr,
                damage.line_attr,
            );
        }
    }
}

impl Engine for ScriptedEngine {
    fn feed(&mut self, bytes: &[u8], sink: &mut dyn DamageSink) {
        self.fed.extend_from_slice(bytes);
        self.drain_pending(sink);
    }

    fn columns(&self) -> usize {
        self.columns
    }

    fn visible_rows(&self) -> usize {
        self.rows
    }

    fn scrollback_len(&self) -> usize {
        self.history.len()
    }

    fn palette(&self) -> &Palette {
        &self.palette
    }

    fn scroll_viewport(&mut self, offset: isize, _sink: &mut dyn DamageSink) {
        assert!(
            offset <= 0 && -offset <= self.history.len() as isize,
            "viewport offset {offset} outside [-{}, 0]",
            self.history.len()
        );
        self.viewport_offset = offset;
        self.scroll_log.push(offset);
    }

    fn flush_pending(&mut self, sink: &mut dyn DamageSink) {
        self.flushes += 1;
        self.drain_pending(sink);
    }

    fn row(&self, row: usize) -> RowView<'_> {
        let display = self.viewport_offset + row as isize;
        let scripted = if display < 0 {
            let index = self.history.len() as isize + display;
            &self.history[index as usize]
        } else {
            &self.screen[display as usize]
        };
        RowView {
            cells: &scripted.cells,
            attr: scripted.attr,
        }
    }

    fn resize(
        &mut self,
        columns: usize,
        rows: usize,
        buffer_lines: usize,
    ) -> Result<(), EngineError> {
        // Rows are only extended: cells past the column count hold chained
        // combining codepoints and stay reachable.
        for row in &mut self.screen {
            if row.cells.len() < columns {
                row.cells.resize(columns, EngineCell::new(' '));
            }
        }
        while self.screen.len() > rows {
            self.screen.pop();
        }
        while self.screen.len() < rows {
            self.screen.push(ScriptedRow::blank(columns));
        }
        for row in &mut self.history {
            if row.cells.len() < columns {
                row.cells.resize(columns, EngineCell::new(' '));
            }
        }

        self.scrollback_capacity = buffer_lines.saturating_sub(rows);
        while self.history.len() > self.scrollback_capacity {
            self.history.remove(0);
        }

        self.columns = columns;
        self.rows = rows;
        self.viewport_offset = 0;
        log::debug!("scripted engine resized to {columns}x{rows}");
        Ok(())
    }

    fn clear_scrollback(&mut self) {
        self.history.clear();
    }

    fn configure(&mut self, options: EngineOptions) {
        self.options = options;
    }

    fn set_linefeed_implies_cr(&mut self, enabled: bool) {
        self.linefeed_implies_cr = enabled;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use termlens_core::DiscardSink;

    #[test]
    fn test_viewport_mapping() {
        let mut engine = ScriptedEngine::new(4, 2);
        engine.push_history_text("h0");
        engine.push_history_text("h1");
        engine.set_screen_text(0, "s0");
        engine.set_screen_text(1, "s1");

        // Live position shows the screen
        assert_eq!(engine.row(0).cells[0].ch, 's');
        assert_eq!(engine.row(0).cells[1].ch, '0');

        // Scrolled fully back, row 0 is the oldest history line
        engine.scroll_viewport(-2, &mut DiscardSink);
        assert_eq!(engine.row(0).cells[1].ch, '0');
        assert_eq!(engine.row(1).cells[1].ch, '1');
        assert_eq!(engine.row(0).cells[0].ch, 'h');
    }

    #[test]
    #[should_panic(expected = "outside")]
    fn test_out_of_range_scroll_panics() {
        let mut engine = ScriptedEngine::new(4, 2);
        engine.scroll_viewport(-1, &mut DiscardSink);
    }

    #[test]
    fn test_resize_recomputes_scrollback_capacity() {
        let mut engine = ScriptedEngine::new(4, 2);
        engine.resize(4, 2, 6).unwrap();
        assert_eq!(engine.scrollback_capacity(), 4);

        for i in 0..10 {
            engine.push_history_text(&format!("line {i}"));
        }
        assert_eq!(engine.scrollback_len(), 4);
        // Oldest rows were dropped
        assert_eq!(engine.row_text_for_test(-4), "line 6");
    }

    impl ScriptedEngine {
        fn row_text_for_test(&self, display: isize) -> String {
            let row = if display < 0 {
                &self.history[(self.history.len() as isize + display) as usize]
            } else {
                &self.screen[display as usize]
            };
            let text: String = row.cells.iter().map(|c| c.ch).collect();
            text.trim_end().to_string()
        }
    }
}
