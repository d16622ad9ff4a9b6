//! Live update path: engine repaints pushed straight into the cache
//!
//! The engine reports repaints synchronously while it processes input.
//! [`CacheWriter`] receives them and keeps the cache's visible region
//! current between full captures.

use crate::cache::ScreenCache;
use crate::cell::LineAttr;
use crate::cluster;
use crate::engine::DamageSink;

/// Damage sink that writes repaints into the cache.
///
/// Repaint rows arrive in viewport coordinates, which coincide with the
/// cache's visible region (row 0 is the top visible row). A disabled writer
/// ignores notifications entirely, line attribute included.
pub struct CacheWriter<'a> {
    cache: &'a mut ScreenCache,
    enabled: bool,
}

impl<'a> CacheWriter<'a> {
    pub fn new(cache: &'a mut ScreenCache, enabled: bool) -> Self {
        Self { cache, enabled }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
}

impl DamageSink for CacheWriter<'_> {
    fn damage(&mut self, row: usize, column: usize, run: &[char], attr: u64, line_attr: LineAttr) {
        if !self.enabled {
            return;
        }
        let row = row as isize;
        self.cache.set_row_attr(row, line_attr);
        for (index, cluster) in cluster::split_run(run).enumerate() {
            self.cache.set_cell(row, column + index, &cluster, attr);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::DamageSink;

    fn run(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    #[test]
    fn test_plain_run_advances_one_column_per_cluster() {
        let mut cache = ScreenCache::new(8, 2);
        let mut writer = CacheWriter::new(&mut cache, true);
        writer.damage(1, 2, &run("abc"), 5, LineAttr(9));

        let row = cache.row(1).unwrap();
        assert_eq!(row.attr, LineAttr(9));
        assert!(row[0].is_blank());
        assert_eq!(row[2].cluster, "a");
        assert_eq!(row[3].cluster, "b");
        assert_eq!(row[4].cluster, "c");
        assert_eq!(row[2].attr, 5);
        assert_eq!(row[4].attr, 5);
    }

    #[test]
    fn test_combining_codepoints_share_a_column() {
        let mut cache = ScreenCache::new(4, 1);
        let mut writer = CacheWriter::new(&mut cache, true);
        writer.damage(0, 0, &run("e\u{301}x"), 0, LineAttr(0));

        let row = cache.row(0).unwrap();
        assert_eq!(row[0].cluster, "e\u{301}");
        assert_eq!(row[1].cluster, "x");
        assert!(row[2].is_blank());
    }

    #[test]
    fn test_disabled_writer_mutates_nothing() {
        let mut cache = ScreenCache::new(4, 1);
        cache.set_cell(0, 0, "k", 1);
        let before = cache.row(0).unwrap().clone();

        let mut writer = CacheWriter::new(&mut cache, false);
        assert!(!writer.is_enabled());
        writer.damage(0, 0, &run("xyz"), 7, LineAttr(42));

        assert_eq!(*cache.row(0).unwrap(), before);
    }

    #[test]
    fn test_run_past_row_end_is_clipped() {
        let mut cache = ScreenCache::new(2, 1);
        let mut writer = CacheWriter::new(&mut cache, true);
        writer.damage(0, 1, &run("ab"), 0, LineAttr(0));

        let row = cache.row(0).unwrap();
        assert_eq!(row[1].cluster, "a");
        assert_eq!(row.iter().filter(|c| !c.is_blank()).count(), 1);
    }
}
