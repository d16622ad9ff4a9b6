//! Mirror facade: one engine, one cache, one input filter
//!
//! [`Mirror`] owns the shared cache and enforces the single-writer rule:
//! the live path and the bulk capture can never write at the same time, and
//! pausing live updates is a scoped operation that cannot be left stuck in
//! the disabled state.

use crate::cache::ScreenCache;
use crate::capture;
use crate::engine::{Engine, EngineConfig, EngineError};
use crate::input::InputFilter;
use crate::live::CacheWriter;
use std::ops::{Deref, DerefMut};

/// Which path currently owns cache writes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SyncMode {
    /// Engine repaints are written through as they arrive
    #[default]
    Live,
    /// A bulk operation owns the cache; repaints are dropped
    BulkSync,
}

/// Terminal mirror: feeds a terminal-emulation engine and keeps an
/// independent, queryable copy of its display buffer and scrollback.
pub struct Mirror<E: Engine> {
    engine: E,
    cache: ScreenCache,
    filter: InputFilter,
    mode: SyncMode,
    config: EngineConfig,
}

impl<E: Engine> Mirror<E> {
    /// Bootstrap with the default configuration (80x24, 100000-line buffer)
    pub fn new(engine: E) -> Result<Self, EngineError> {
        Self::with_config(engine, EngineConfig::default())
    }

    /// Apply `config` to the engine and size the cache to match
    pub fn with_config(mut engine: E, config: EngineConfig) -> Result<Self, EngineError> {
        engine.resize(config.columns, config.rows, config.buffer_lines)?;
        engine.configure(config.options);
        engine.set_linefeed_implies_cr(config.linefeed_implies_cr);

        let cache = ScreenCache::new(config.columns, config.rows);
        Ok(Self {
            engine,
            cache,
            filter: InputFilter::new(),
            mode: SyncMode::Live,
            config,
        })
    }

    /// Raw bytes from the session. Marker spans are stripped, the rest goes
    /// to the engine, and resulting repaints land in the cache unless live
    /// updates are paused.
    pub fn feed(&mut self, bytes: &[u8]) {
        let Self {
            engine,
            cache,
            filter,
            mode,
            ..
        } = self;
        let mut sink = CacheWriter::new(cache, *mode == SyncMode::Live);
        filter.feed(bytes, |chunk| engine.feed(chunk, &mut sink));
    }

    /// End of the input stream: release any byte the filter is still
    /// holding back (a trailing ESC that never became a marker).
    pub fn flush_input(&mut self) {
        let Self {
            engine,
            cache,
            filter,
            mode,
            ..
        } = self;
        let mut sink = CacheWriter::new(cache, *mode == SyncMode::Live);
        filter.flush(|chunk| engine.feed(chunk, &mut sink));
    }

    /// Capture the engine's entire addressable buffer (visible rows plus
    /// scrollback) into the cache and return it for reading.
    pub fn synchronize(&mut self) -> &ScreenCache {
        capture::capture_into(&mut self.engine, &mut self.cache);
        &self.cache
    }

    /// Current mirror contents without forcing a capture. Stale for
    /// anything the live path has not covered since the last
    /// [`Mirror::synchronize`].
    pub fn cache(&self) -> &ScreenCache {
        &self.cache
    }

    /// Read access to the engine
    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Mutable access to the engine. Bytes written here bypass the input
    /// filter and the cache; prefer [`Mirror::feed`] for session data.
    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    /// Current write mode
    pub fn mode(&self) -> SyncMode {
        self.mode
    }

    /// Update the terminal dimensions. The engine relays out and recomputes
    /// its scrollback capacity from the configured buffer size; the cache
    /// follows the new dimensions.
    pub fn resize(&mut self, columns: usize, rows: usize) -> Result<(), EngineError> {
        self.config.columns = columns;
        self.config.rows = rows;
        self.engine.resize(columns, rows, self.config.buffer_lines)?;
        self.cache
            .resize(columns, rows, self.engine.scrollback_len() + rows);
        log::debug!("resized mirror to {columns}x{rows}");
        Ok(())
    }

    /// Discard the engine's scrollback history. The cache keeps its stale
    /// rows until the next [`Mirror::synchronize`].
    pub fn clear_scrollback(&mut self) {
        self.engine.clear_scrollback();
    }

    /// Toggle whether a bare linefeed is treated as carriage return plus
    /// linefeed. Useful for streams that only ever send LF.
    pub fn set_linefeed_implies_cr(&mut self, enabled: bool) {
        self.config.linefeed_implies_cr = enabled;
        self.engine.set_linefeed_implies_cr(enabled);
    }

    /// Silence the live update path for a scope.
    ///
    /// The guard derefs to the mirror, so feeding continues while paused;
    /// dropping the guard restores the previous mode on every exit path.
    pub fn pause_live_updates(&mut self) -> LiveUpdatesPaused<'_, E> {
        let previous = self.mode;
        self.mode = SyncMode::BulkSync;
        LiveUpdatesPaused {
            mirror: self,
            previous,
        }
    }
}

/// Scoped pause of the live update path; see
/// [`Mirror::pause_live_updates`].
pub struct LiveUpdatesPaused<'a, E: Engine> {
    mirror: &'a mut Mirror<E>,
    previous: SyncMode,
}

impl<E: Engine> Deref for LiveUpdatesPaused<'_, E> {
    type Target = Mirror<E>;

    fn deref(&self) -> &Mirror<E> {
        self.mirror
    }
}

impl<E: Engine> DerefMut for LiveUpdatesPaused<'_, E> {
    fn deref_mut(&mut self) -> &mut Mirror<E> {
        self.mirror
    }
}

impl<E: Engine> Drop for LiveUpdatesPaused<'_, E> {
    fn drop(&mut self) {
        self.mirror.mode = self.previous;
    }
}
