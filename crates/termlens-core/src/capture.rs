//! Full-buffer capture: paging the engine's viewport through scrollback
//!
//! The engine exposes exactly one viewport-sized window at a time, addressed
//! by a scroll offset. A capture therefore walks the addressable range page
//! by page, top of scrollback first, then reads the remainder out of the
//! live viewport and scrolls the engine back where it was.

use crate::cache::ScreenCache;
use crate::cluster;
use crate::engine::{DiscardSink, Engine};

/// Rebuild `cache` from the engine's entire addressable buffer (visible rows
/// plus full scrollback).
///
/// The cache is resized once up front, then overwritten cell by cell. The
/// engine's viewport is restored to the live position on every exit path.
/// With a zero-sized viewport the cache is resized and nothing else happens.
pub fn capture_into<E: Engine>(engine: &mut E, cache: &mut ScreenCache) {
    let columns = engine.columns();
    let visible = engine.visible_rows();
    let scrollback = engine.scrollback_len();

    cache.resize(columns, visible, scrollback + visible);
    cache.set_palette(engine.palette().clone());

    if visible == 0 {
        return;
    }

    engine.flush_pending(&mut DiscardSink);

    let mut viewport = ViewportLock::acquire(engine);

    // Full pages cover every position strictly above the live viewport top.
    let mut offset = -(scrollback as isize);
    while offset < 0 {
        viewport.copy_page(cache, offset, 0);
        offset += visible as isize;
    }

    // offset is now in [0, visible): the remainder sits at the bottom of
    // the live viewport, so it is read in place without scrolling past it.
    viewport.copy_page(cache, 0, offset as usize);

    log::debug!(
        "captured {} lines ({} scrollback, {} columns)",
        cache.total_lines(),
        scrollback,
        columns
    );
}

/// Exclusive control over the engine's viewport position.
///
/// Dropping the lock scrolls the engine back to the live position, so no
/// exit path (early return, panic in a row copy) can leave the viewport
/// displaced.
struct ViewportLock<'a, E: Engine> {
    engine: &'a mut E,
}

impl<'a, E: Engine> ViewportLock<'a, E> {
    fn acquire(engine: &'a mut E) -> Self {
        Self { engine }
    }

    /// Scroll to `target` and copy viewport rows `skip..visible` into cache
    /// rows `target + skip .. target + visible`.
    fn copy_page(&mut self, cache: &mut ScreenCache, target: isize, skip: usize) {
        self.engine.scroll_viewport(target, &mut DiscardSink);

        let columns = self.engine.columns();
        let visible = self.engine.visible_rows();
        let mut cluster_buf = String::new();

        for viewport_row in skip..visible {
            let cache_row = target + viewport_row as isize;
            let view = self.engine.row(viewport_row);
            cache.set_row_attr(cache_row, view.attr);
            for column in 0..columns {
                cluster::from_chain(view.cells, column, &mut cluster_buf);
                let attr = view.cells.get(column).map_or(0, |cell| cell.attr);
                cache.set_cell(cache_row, column, &cluster_buf, attr);
            }
        }
    }
}

impl<E: Engine> Drop for ViewportLock<'_, E> {
    fn drop(&mut self) {
        self.engine.scroll_viewport(0, &mut DiscardSink);
    }
}
