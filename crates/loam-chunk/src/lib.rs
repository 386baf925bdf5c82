//! Chunk voxel storage, derived flags, and the neighbor-linked chunk arena.
#![forbid(unsafe_code)]

pub mod arena;
pub mod chunk;
pub mod neighbors;
pub mod objects;
pub mod voxels;

pub use arena::{ChunkArena, ChunkId, SetResult};
pub use chunk::{Chunk, DrawHandle, SetOutcome, UserData};
pub use neighbors::{NEIGHBOR_SLOTS, SELF_SLOT, edge_offsets, slot_index, slot_offset};
pub use objects::{NoObjects, ObjectMesher};
pub use voxels::VoxelBuffer;
