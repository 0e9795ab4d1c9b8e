//! The per-tick streaming loop.

use std::sync::Arc;

use glam::DVec3;
use rustc_hash::FxHashSet;
use terra_config::{GeneratorConfig, TileConfig};

use crate::{
    Tile, TileBuilder, TileCache, TileJob, TileResult, TileWorkers, positions_in_radius,
};

/// What one tick did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Finished tiles made active.
    pub built: usize,
    /// Builds that failed.
    pub failed: usize,
    /// Tiles reused from the cache pool.
    pub promoted: usize,
    /// Active tiles moved into the cache pool.
    pub evicted: usize,
    /// Pooled tiles dropped because the pool was full.
    pub dropped: usize,
    /// Builds handed to the workers.
    pub dispatched: usize,
    /// True if the update was skipped because builds were still in flight.
    pub skipped: bool,
}

/// Keeps the tiles around an anchor active.
///
/// Each [`tick`](Self::tick) first collects finished builds, then runs
/// [`update_tiles`](Self::update_tiles), which does nothing while any build is still in
/// flight. At most one batch of builds is outstanding at a time.
pub struct TilePool {
    cache: TileCache,
    workers: TileWorkers,
    radius: u32,
    length: f64,
    resolution: u32,
    in_flight: usize,
}

impl TilePool {
    /// A pool building tiles with `builder`, sized by `tiles`, sampling with `generator`.
    pub fn new(
        builder: Arc<dyn TileBuilder>,
        tiles: &TileConfig,
        generator: &GeneratorConfig,
    ) -> Self {
        Self::with_workers(
            TileWorkers::new(builder, tiles.worker_threads),
            tiles,
            generator,
        )
    }

    /// A pool dispatching to an existing set of workers. `tiles.worker_threads` is
    /// ignored.
    pub fn with_workers(
        workers: TileWorkers,
        tiles: &TileConfig,
        generator: &GeneratorConfig,
    ) -> Self {
        Self {
            cache: TileCache::new(tiles.cache_size),
            workers,
            radius: tiles.generation_radius,
            length: generator.length,
            resolution: generator.resolution,
            in_flight: 0,
        }
    }

    /// Active tiles and the cache pool.
    pub fn cache(&self) -> &TileCache {
        &self.cache
    }

    /// Builds dispatched and not yet collected.
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// True when no build is outstanding.
    pub fn is_idle(&self) -> bool {
        self.in_flight == 0
    }

    /// Generation radius in tiles.
    pub fn radius(&self) -> u32 {
        self.radius
    }

    /// Collects finished builds, then updates the tile set around `anchor`.
    pub fn tick(&mut self, anchor: DVec3) -> TickReport {
        let mut report = TickReport::default();
        for result in self.workers.drain() {
            self.complete(result, &mut report);
        }

        let update = self.update_tiles(anchor);
        report.promoted = update.promoted;
        report.evicted = update.evicted;
        report.dropped = update.dropped;
        report.dispatched = update.dispatched;
        report.failed += update.failed;
        report.skipped = update.skipped;

        tracing::debug!(
            built = report.built,
            promoted = report.promoted,
            evicted = report.evicted,
            dispatched = report.dispatched,
            active = self.cache.active_len(),
            cached = self.cache.cached_len(),
            skipped = report.skipped,
            "tile tick"
        );
        report
    }

    /// Brings the active set in line with the positions around `anchor`.
    ///
    /// Skipped entirely while builds are in flight. Positions already pooled are reused
    /// before any stale tile is moved into the pool; remaining positions are dispatched
    /// to the workers.
    pub fn update_tiles(&mut self, anchor: DVec3) -> TickReport {
        let mut report = TickReport::default();
        if self.in_flight > 0 {
            report.skipped = true;
            return report;
        }

        let nearby = positions_in_radius(self.radius, anchor, self.length);
        let nearby_set: FxHashSet<_> = nearby.iter().copied().collect();

        let mut missing = Vec::new();
        for position in self.cache.new_positions(&nearby) {
            match self.cache.take_cached(position) {
                Some(tile) => {
                    tracing::debug!(%position, "reused cached tile");
                    self.cache.add_active(tile);
                    report.promoted += 1;
                }
                None => missing.push(position),
            }
        }

        for position in self.cache.stale_positions(&nearby_set) {
            let Some(tile) = self.cache.remove_active(position) else {
                continue;
            };
            tracing::debug!(%position, "evicted tile to cache");
            report.evicted += 1;
            if self.cache.cache_tile(tile).is_some() {
                report.dropped += 1;
            }
        }

        for position in missing {
            self.in_flight += 1;
            let job = TileJob {
                position,
                resolution: self.resolution,
            };
            match self.workers.submit(job) {
                Ok(()) => {
                    tracing::debug!(%position, "dispatched tile build");
                    report.dispatched += 1;
                }
                Err(error) => {
                    self.in_flight -= 1;
                    tracing::warn!(%position, %error, "failed to dispatch tile build");
                    report.failed += 1;
                }
            }
        }

        report
    }

    /// Forgets outstanding builds so the next update runs. Results that still arrive are
    /// added as usual.
    pub fn reset_in_flight(&mut self) {
        if self.in_flight > 0 {
            tracing::warn!(in_flight = self.in_flight, "resetting in-flight tile builds");
        }
        self.in_flight = 0;
    }

    fn complete(&mut self, result: TileResult, report: &mut TickReport) {
        self.in_flight = self.in_flight.saturating_sub(1);
        match result.result {
            Ok(data) => {
                tracing::debug!(
                    position = %result.position,
                    build_time_us = result.build_time_us,
                    "tile built"
                );
                if self.cache.add_active(Tile::new(data)).is_some() {
                    tracing::debug!(position = %result.position, "replaced active tile");
                }
                report.built += 1;
            }
            Err(error) => {
                tracing::warn!(position = %result.position, %error, "tile build failed");
                report.failed += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use terra_noise::GridPosition;

    use super::*;
    use crate::{TileData, TileError};

    #[derive(Default)]
    struct Counting {
        builds: AtomicUsize,
        fail_at: Option<GridPosition>,
    }

    impl TileBuilder for Counting {
        fn build(&self, position: GridPosition, resolution: u32) -> Result<TileData, TileError> {
            self.builds.fetch_add(1, Ordering::Relaxed);
            if Some(position) == self.fail_at {
                return Err(TileError::Build {
                    position,
                    reason: "refused".into(),
                });
            }
            Ok(TileData {
                position,
                resolution,
                heights: vec![0.0; (resolution * resolution) as usize],
                splat: None,
                vegetation: Vec::new(),
            })
        }
    }

    fn pool(builder: Arc<Counting>, radius: u32, cache_size: usize) -> TilePool {
        let tiles = TileConfig {
            generation_radius: radius,
            cache_size,
            worker_threads: 0,
        };
        let generator = GeneratorConfig {
            length: 1.0,
            resolution: 2,
            ..Default::default()
        };
        TilePool::new(builder, &tiles, &generator)
    }

    fn at(x: f64, z: f64) -> DVec3 {
        DVec3::new(x + 0.5, 0.0, z + 0.5)
    }

    #[test]
    fn test_first_tick_dispatches_second_collects() {
        let builder = Arc::new(Counting::default());
        let mut pool = pool(Arc::clone(&builder), 2, 10);

        let first = pool.tick(at(0.0, 0.0));
        assert_eq!(first.dispatched, 9);
        assert_eq!(pool.in_flight(), 9);
        assert_eq!(pool.cache().active_len(), 0);

        let second = pool.tick(at(0.0, 0.0));
        assert_eq!(second.built, 9);
        assert_eq!(second.dispatched, 0);
        assert!(!second.skipped);
        assert!(pool.is_idle());
        assert_eq!(pool.cache().active_len(), 9);
        assert_eq!(builder.builds.load(Ordering::Relaxed), 9);
    }

    #[test]
    fn test_update_is_gated_while_in_flight() {
        let builder = Arc::new(Counting::default());
        let mut pool = pool(builder, 2, 10);
        pool.update_tiles(at(0.0, 0.0));
        assert_eq!(pool.in_flight(), 9);

        let report = pool.update_tiles(at(5.0, 5.0));
        assert!(report.skipped);
        assert_eq!(report.dispatched, 0);
        assert_eq!(pool.in_flight(), 9);
    }

    #[test]
    fn test_moving_away_evicts_and_coming_back_reuses() {
        let builder = Arc::new(Counting::default());
        let mut pool = pool(Arc::clone(&builder), 1, 10);

        pool.tick(at(0.0, 0.0));
        pool.tick(at(0.0, 0.0));
        assert!(pool.cache().is_active(GridPosition::ZERO));

        let away = pool.tick(at(10.0, 0.0));
        assert_eq!(away.evicted, 1);
        assert_eq!(away.dispatched, 1);
        assert!(pool.cache().is_cached(GridPosition::ZERO));

        pool.tick(at(10.0, 0.0));
        let back = pool.tick(at(0.0, 0.0));
        assert_eq!(back.promoted, 1);
        assert_eq!(back.dispatched, 0);
        assert!(pool.cache().is_active(GridPosition::ZERO));
        assert!(pool.cache().is_cached(GridPosition::new(10, 0)));
        assert_eq!(builder.builds.load(Ordering::Relaxed), 2);
    }

    #[test]
    fn test_full_pool_drops_oldest() {
        let builder = Arc::new(Counting::default());
        let mut pool = pool(builder, 1, 1);

        for x in [0.0, 10.0, 20.0] {
            pool.tick(at(x, 0.0));
            pool.tick(at(x, 0.0));
        }
        let report = pool.tick(at(30.0, 0.0));
        assert_eq!(report.evicted, 1);
        assert_eq!(report.dropped, 1);
        assert_eq!(
            pool.cache().cached_positions(),
            vec![GridPosition::new(20, 0)]
        );
    }

    #[test]
    fn test_reuse_from_full_pool_happens_before_eviction() {
        let builder = Arc::new(Counting::default());
        let mut pool = pool(Arc::clone(&builder), 1, 1);
        let home = GridPosition::ZERO;
        let away = GridPosition::new(10, 0);

        pool.tick(at(0.0, 0.0));
        pool.tick(at(0.0, 0.0));
        pool.tick(at(10.0, 0.0));
        pool.tick(at(10.0, 0.0));
        assert_eq!(pool.cache().cached_positions(), vec![home]);
        assert_eq!(pool.cache().active_positions(), vec![away]);

        let back = pool.tick(at(0.0, 0.0));
        assert_eq!(back.promoted, 1);
        assert_eq!(back.evicted, 1);
        assert_eq!(back.dropped, 0);
        assert_eq!(back.dispatched, 0);
        assert_eq!(pool.cache().active_positions(), vec![home]);
        assert_eq!(pool.cache().cached_positions(), vec![away]);
        assert_eq!(builder.builds.load(Ordering::Relaxed), 2);
    }

    #[test]
    fn test_late_results_after_reset_replace_active_tiles() {
        let builder = Arc::new(Counting::default());
        let mut pool = pool(Arc::clone(&builder), 1, 4);
        pool.update_tiles(at(0.0, 0.0));
        pool.reset_in_flight();
        assert_eq!(pool.update_tiles(at(0.0, 0.0)).dispatched, 1);

        let report = pool.tick(at(0.0, 0.0));
        assert_eq!(report.built, 2);
        assert_eq!(pool.cache().active_len(), 1);
        assert_eq!(pool.cache().cached_len(), 0);
        assert!(pool.cache().is_consistent());
        assert!(pool.is_idle());
        assert_eq!(builder.builds.load(Ordering::Relaxed), 2);
    }

    #[test]
    fn test_failed_builds_release_the_gate() {
        let builder = Arc::new(Counting {
            fail_at: Some(GridPosition::new(1, 0)),
            ..Default::default()
        });
        let mut pool = pool(builder, 2, 10);
        pool.tick(at(0.0, 0.0));

        let report = pool.tick(at(0.0, 0.0));
        assert_eq!(report.failed, 1);
        assert_eq!(report.built, 8);
        assert!(!pool.cache().is_active(GridPosition::new(1, 0)));

        // The failed position is retried on the same tick's update.
        assert_eq!(report.dispatched, 1);
    }

    #[test]
    fn test_reset_unblocks_updates() {
        let builder = Arc::new(Counting::default());
        let mut pool = pool(builder, 2, 10);
        pool.update_tiles(at(0.0, 0.0));
        pool.reset_in_flight();
        assert!(pool.is_idle());
        assert!(!pool.update_tiles(at(0.0, 0.0)).skipped);
    }

    #[test]
    fn test_cache_stays_consistent_across_ticks() {
        let builder = Arc::new(Counting::default());
        let mut pool = pool(builder, 3, 6);
        let path = [
            (0.0, 0.0),
            (1.0, 0.0),
            (3.0, 1.0),
            (6.0, 4.0),
            (2.0, 2.0),
            (-4.0, 0.0),
            (0.0, 0.0),
        ];
        for (x, z) in path {
            for _ in 0..2 {
                pool.tick(at(x, z));
                assert!(pool.cache().is_consistent());
            }
        }
    }
}
