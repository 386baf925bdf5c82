//! Chunk coordinates, location queues, and streaming-space geometry.
#![forbid(unsafe_code)]

pub mod bounds;
pub mod coord;
pub mod distance;
pub mod indexer;
pub mod queue;
pub mod storage;

pub use bounds::{Aabb, WorldBounds};
pub use coord::ChunkCoord;
pub use distance::{DistanceFn, Ellipsoid, squared_euclidean};
pub use indexer::ChunkIndexer;
pub use queue::{Location, LocationQueue};
pub use storage::ChunkStorage;
