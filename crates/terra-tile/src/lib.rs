//! Tile streaming around a moving anchor.
//!
//! [`TilePool`] keeps the tiles within a radius of the anchor active, parks tiles that
//! fall out of range in a bounded [`TileCache`], and builds missing tiles on
//! [`TileWorkers`] threads. The active set and the cache are only ever touched from the
//! thread that calls [`TilePool::tick`]; workers hand finished tiles back over a channel.

mod builder;
mod cache;
mod pool;
mod radius;
mod tile;
mod workers;

pub use builder::{GraphTileBuilder, TileBuilder, TileError};
pub use cache::TileCache;
pub use pool::{TickReport, TilePool};
pub use radius::positions_in_radius;
pub use terra_noise::GridPosition;
pub use tile::{Tile, TileData};
pub use workers::{TileJob, TileResult, TileWorkers};
