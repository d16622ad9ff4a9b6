//! Terminal-engine interface
//!
//! The emulation engine is an external collaborator. This module pins down
//! the narrow surface the synchronization core consumes without assuming
//! anything about the engine's internals: dimension queries, viewport
//! scrolling, read-only row access, and a sink for repaint notifications.

use crate::cell::LineAttr;
use crate::color::Palette;
use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors surfaced by the engine. Every variant is fatal for the mirror:
/// errors propagate unchanged and nothing is retried.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("engine failed to relayout its buffers: {0}")]
    Relayout(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("engine reported an unrecoverable failure: {0}")]
    Fatal(String),
}

bitflags! {
    /// Engine option flags forwarded verbatim during bootstrap
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct EngineOptions: u32 {
        /// Interpret the 16 base ANSI colors
        const ANSI_COLOR = 1 << 0;
        /// Interpret xterm 256-color sequences
        const XTERM_256_COLOR = 1 << 1;
        /// Bidirectional text support
        const BIDI = 1 << 2;
        /// Arabic text shaping
        const ARABIC_SHAPING = 1 << 3;
        /// Erase operations paint the current background color
        const ERASE_WITH_BACKGROUND = 1 << 4;
    }
}

/// Bootstrap configuration applied to the engine when a mirror is created
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Initial column count
    pub columns: usize,
    /// Initial visible row count
    pub rows: usize,
    /// Total addressable lines the engine keeps (visible plus scrollback).
    /// The engine derives its scrollback capacity as `buffer_lines - rows`.
    pub buffer_lines: usize,
    /// Option flags forwarded verbatim
    pub options: EngineOptions,
    /// Treat a bare linefeed as carriage return plus linefeed
    pub linefeed_implies_cr: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            columns: 80,
            rows: 24,
            buffer_lines: 100_000,
            options: EngineOptions::ANSI_COLOR
                | EngineOptions::XTERM_256_COLOR
                | EngineOptions::ERASE_WITH_BACKGROUND,
            linefeed_implies_cr: false,
        }
    }
}

/// One cell of an engine row: primary codepoint, relative link to the next
/// codepoint of the same cluster (0 terminates the chain), opaque style word
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineCell {
    pub ch: char,
    pub cc_next: usize,
    pub attr: u64,
}

impl EngineCell {
    /// A cell holding a single unchained codepoint with no styling
    pub fn new(ch: char) -> Self {
        Self {
            ch,
            cc_next: 0,
            attr: 0,
        }
    }
}

/// Read-only view of one viewport row.
///
/// `cells` may extend past the column count: the tail slots hold combining
/// codepoints that are only reachable through `cc_next` chains.
#[derive(Debug, Clone, Copy)]
pub struct RowView<'a> {
    pub cells: &'a [EngineCell],
    pub attr: LineAttr,
}

/// Sink for the engine's synchronous repaint notifications.
///
/// A sink is borrowed for the duration of every engine call that may
/// repaint; there is no callback registration and no notification can
/// outlive the call that produced it.
pub trait DamageSink {
    /// One repaint: `run` replaces the content of `row` starting at
    /// `column`. `attr` applies to every cluster assembled from the run;
    /// `line_attr` replaces the row's flags.
    fn damage(&mut self, row: usize, column: usize, run: &[char], attr: u64, line_attr: LineAttr);
}

/// Sink that drops every notification
#[derive(Debug, Default)]
pub struct DiscardSink;

impl DamageSink for DiscardSink {
    fn damage(
        &mut self,
        _row: usize,
        _column: usize,
        _run: &[char],
        _attr: u64,
        _line_attr: LineAttr,
    ) {
    }
}

/// The terminal-emulation engine as consumed by the synchronization core
pub trait Engine {
    /// Feed filtered input bytes; resulting repaints go to `sink`
    fn feed(&mut self, bytes: &[u8], sink: &mut dyn DamageSink);

    /// Current column count
    fn columns(&self) -> usize;

    /// Current visible row count
    fn visible_rows(&self) -> usize;

    /// Rows currently held in scrollback
    fn scrollback_len(&self) -> usize;

    /// Current palette table
    fn palette(&self) -> &Palette;

    /// Scroll the viewport to `offset`: 0 is the live position, negative
    /// offsets reach back into scrollback
    fn scroll_viewport(&mut self, offset: isize, sink: &mut dyn DamageSink);

    /// Flush pending redraw bookkeeping so row reads observe every write
    fn flush_pending(&mut self, sink: &mut dyn DamageSink);

    /// Read-only access to one viewport row
    fn row(&self, row: usize) -> RowView<'_>;

    /// Relayout to `columns` by `rows`, keeping `buffer_lines` total lines
    fn resize(&mut self, columns: usize, rows: usize, buffer_lines: usize)
        -> Result<(), EngineError>;

    /// Discard the scrollback history
    fn clear_scrollback(&mut self);

    /// Forward option flags
    fn configure(&mut self, options: EngineOptions);

    /// Toggle whether a bare linefeed implies a carriage return
    fn set_linefeed_implies_cr(&mut self, enabled: bool);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert_eq!(config.columns, 80);
        assert_eq!(config.rows, 24);
        assert_eq!(config.buffer_lines, 100_000);
        assert!(config.options.contains(EngineOptions::ANSI_COLOR));
        assert!(config.options.contains(EngineOptions::XTERM_256_COLOR));
        assert!(!config.options.contains(EngineOptions::BIDI));
        assert!(!config.options.contains(EngineOptions::ARABIC_SHAPING));
        assert!(!config.linefeed_implies_cr);
    }
}
