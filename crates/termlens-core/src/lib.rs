//! termlens-core: queryable screen cache for a terminal-emulation engine
//!
//! Mirrors the display buffer of a live character-cell engine, scrollback
//! included, into an independent [`ScreenCache`] that recorders, automation
//! and remote-session inspectors can read without depending on the engine's
//! memory layout or redraw lifecycle.
//!
//! - Raw session bytes pass through [`InputFilter`] before they reach the
//!   engine, stripping out-of-band marker spans.
//! - While the engine processes input, its repaint notifications stream
//!   through [`CacheWriter`] into the cache's visible region.
//! - [`Mirror::synchronize`] rebuilds the whole cache on demand by paging
//!   the engine's viewport through scrollback.

pub mod cache;
pub mod capture;
pub mod cell;
pub mod cluster;
pub mod color;
pub mod engine;
pub mod input;
pub mod live;
pub mod mirror;

pub use cache::{Row, ScreenCache};
pub use capture::capture_into;
pub use cell::{Cell, LineAttr};
pub use color::{Palette, Rgb};
pub use engine::{
    DamageSink, DiscardSink, Engine, EngineCell, EngineConfig, EngineError, EngineOptions, RowView,
};
pub use input::InputFilter;
pub use live::CacheWriter;
pub use mirror::{LiveUpdatesPaused, Mirror, SyncMode};
