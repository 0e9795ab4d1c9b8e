//! Active tiles plus a bounded pool of inactive ones.

use std::collections::VecDeque;

use rustc_hash::{FxHashMap, FxHashSet};
use terra_noise::GridPosition;

use crate::Tile;

/// The active set and the cache pool.
///
/// A position is held by at most one of the two at any time. The pool is bounded by
/// `capacity`; when full, the tile that entered the pool earliest is dropped.
#[derive(Debug)]
pub struct TileCache {
    capacity: usize,
    active: FxHashMap<GridPosition, Tile>,
    /// Least-recently-cached first.
    cached: VecDeque<Tile>,
    clock: u64,
}

impl TileCache {
    /// An empty cache whose pool retains at most `capacity` tiles.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            active: FxHashMap::default(),
            cached: VecDeque::with_capacity(capacity),
            clock: 0,
        }
    }

    /// Maximum number of pooled tiles.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of active tiles.
    pub fn active_len(&self) -> usize {
        self.active.len()
    }

    /// Number of pooled tiles.
    pub fn cached_len(&self) -> usize {
        self.cached.len()
    }

    /// True if a tile at `position` is active.
    pub fn is_active(&self, position: GridPosition) -> bool {
        self.active.contains_key(&position)
    }

    /// True if a tile at `position` is pooled.
    pub fn is_cached(&self, position: GridPosition) -> bool {
        self.cached.iter().any(|t| t.position() == position)
    }

    /// The active tile at `position`.
    pub fn active(&self, position: GridPosition) -> Option<&Tile> {
        self.active.get(&position)
    }

    /// Positions of all active tiles, sorted.
    pub fn active_positions(&self) -> Vec<GridPosition> {
        let mut positions: Vec<_> = self.active.keys().copied().collect();
        positions.sort_unstable();
        positions
    }

    /// Pooled positions, least-recently-cached first.
    pub fn cached_positions(&self) -> Vec<GridPosition> {
        self.cached.iter().map(Tile::position).collect()
    }

    /// Positions in `nearby` that have no active tile, in input order.
    pub fn new_positions(&self, nearby: &[GridPosition]) -> Vec<GridPosition> {
        nearby
            .iter()
            .copied()
            .filter(|p| !self.active.contains_key(p))
            .collect()
    }

    /// Active positions that are not in `nearby`, sorted.
    pub fn stale_positions(&self, nearby: &FxHashSet<GridPosition>) -> Vec<GridPosition> {
        let mut stale: Vec<_> = self
            .active
            .keys()
            .copied()
            .filter(|p| !nearby.contains(p))
            .collect();
        stale.sort_unstable();
        stale
    }

    /// Makes `tile` active, dropping any pooled copy of the same position.
    ///
    /// Returns the tile it replaced in the active set, if any.
    pub fn add_active(&mut self, mut tile: Tile) -> Option<Tile> {
        let position = tile.position();
        if self.take_cached(position).is_some() {
            tracing::debug!(%position, "discarded pooled duplicate");
        }
        tile.set_cached_at(None);
        self.active.insert(position, tile)
    }

    /// Removes the active tile at `position`.
    pub fn remove_active(&mut self, position: GridPosition) -> Option<Tile> {
        self.active.remove(&position)
    }

    /// Moves `tile` into the pool.
    ///
    /// Returns the tile dropped to stay within capacity: the oldest pooled tile, or
    /// `tile` itself when the capacity is 0.
    pub fn cache_tile(&mut self, mut tile: Tile) -> Option<Tile> {
        let position = tile.position();
        if self.capacity == 0 {
            tracing::debug!(%position, "cache disabled, dropped tile");
            return Some(tile);
        }
        // A pooled duplicate would break the one-owner rule.
        self.take_cached(position);
        self.active.remove(&position);

        self.clock += 1;
        tile.set_cached_at(Some(self.clock));
        self.cached.push_back(tile);

        if self.cached.len() > self.capacity {
            let dropped = self.cached.pop_front();
            if let Some(dropped) = &dropped {
                tracing::debug!(position = %dropped.position(), "cache full, dropped oldest tile");
            }
            return dropped;
        }
        None
    }

    /// Removes and returns the pooled tile at `position`.
    pub fn take_cached(&mut self, position: GridPosition) -> Option<Tile> {
        let index = self.cached.iter().position(|t| t.position() == position)?;
        self.cached.remove(index)
    }

    /// Checks the ownership invariants: no position both active and pooled, no pooled
    /// duplicates, and the pool within capacity.
    pub fn is_consistent(&self) -> bool {
        let mut seen = FxHashSet::default();
        self.cached.len() <= self.capacity
            && self
                .cached
                .iter()
                .all(|t| !self.active.contains_key(&t.position()) && seen.insert(t.position()))
            && self.active.iter().all(|(p, t)| *p == t.position())
    }

    /// Drops every tile.
    pub fn clear(&mut self) {
        self.active.clear();
        self.cached.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TileData;

    fn tile(x: i32, z: i32) -> Tile {
        Tile::new(TileData {
            position: GridPosition::new(x, z),
            resolution: 1,
            heights: vec![x as f64],
            splat: None,
            vegetation: Vec::new(),
        })
    }

    #[test]
    fn test_new_positions_skip_active() {
        let mut cache = TileCache::new(4);
        cache.add_active(tile(0, 0));
        let nearby = [GridPosition::new(0, 0), GridPosition::new(1, 0)];
        assert_eq!(cache.new_positions(&nearby), vec![GridPosition::new(1, 0)]);
    }

    #[test]
    fn test_stale_positions_are_active_and_not_nearby() {
        let mut cache = TileCache::new(4);
        cache.add_active(tile(0, 0));
        cache.add_active(tile(5, 5));
        cache.add_active(tile(-5, 5));
        let nearby: FxHashSet<_> = [GridPosition::new(0, 0)].into_iter().collect();
        assert_eq!(
            cache.stale_positions(&nearby),
            vec![GridPosition::new(-5, 5), GridPosition::new(5, 5)]
        );
    }

    #[test]
    fn test_pool_drops_least_recently_cached() {
        let mut cache = TileCache::new(2);
        assert!(cache.cache_tile(tile(1, 0)).is_none());
        assert!(cache.cache_tile(tile(2, 0)).is_none());

        let dropped = cache.cache_tile(tile(3, 0)).unwrap();
        assert_eq!(dropped.position(), GridPosition::new(1, 0));
        assert_eq!(
            cache.cached_positions(),
            vec![GridPosition::new(2, 0), GridPosition::new(3, 0)]
        );
    }

    #[test]
    fn test_recached_tile_moves_to_back() {
        let mut cache = TileCache::new(2);
        cache.cache_tile(tile(1, 0));
        cache.cache_tile(tile(2, 0));

        let reused = cache.take_cached(GridPosition::new(1, 0)).unwrap();
        cache.add_active(reused);
        let back = cache.remove_active(GridPosition::new(1, 0)).unwrap();
        cache.cache_tile(back);

        let dropped = cache.cache_tile(tile(3, 0)).unwrap();
        assert_eq!(dropped.position(), GridPosition::new(2, 0));
    }

    #[test]
    fn test_cache_stamps_are_monotonic() {
        let mut cache = TileCache::new(3);
        cache.cache_tile(tile(1, 0));
        cache.cache_tile(tile(2, 0));
        let first = cache.take_cached(GridPosition::new(1, 0)).unwrap();
        let second = cache.take_cached(GridPosition::new(2, 0)).unwrap();
        assert!(first.cached_at() < second.cached_at());

        cache.add_active(first);
        assert_eq!(
            cache.active(GridPosition::new(1, 0)).unwrap().cached_at(),
            None
        );
    }

    #[test]
    fn test_zero_capacity_drops_immediately() {
        let mut cache = TileCache::new(0);
        let dropped = cache.cache_tile(tile(0, 0)).unwrap();
        assert_eq!(dropped.position(), GridPosition::ZERO);
        assert_eq!(cache.cached_len(), 0);
    }

    #[test]
    fn test_one_owner_per_position() {
        let mut cache = TileCache::new(4);
        cache.cache_tile(tile(0, 0));
        cache.add_active(tile(0, 0));
        assert!(cache.is_active(GridPosition::ZERO));
        assert!(!cache.is_cached(GridPosition::ZERO));
        assert!(cache.is_consistent());

        cache.cache_tile(tile(0, 0));
        assert!(!cache.is_active(GridPosition::ZERO));
        assert!(cache.is_cached(GridPosition::ZERO));
        assert!(cache.is_consistent());
    }
}
