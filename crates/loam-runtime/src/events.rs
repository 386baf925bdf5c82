use loam_chunk::{UserData, VoxelBuffer};
use loam_world::ChunkCoord;

use crate::request::RequestId;

/// Notifications queued by the engine, drained with
/// [`StreamingEngine::drain_events`](crate::StreamingEngine::drain_events).
pub enum WorldEvent {
    /// No generator is registered: fill `voxels` and answer with
    /// `set_chunk_data(request_id, ..)`.
    ChunkDataNeeded {
        request_id: RequestId,
        coord: ChunkCoord,
        world_name: String,
        voxels: VoxelBuffer,
    },
    ChunkAdded {
        coord: ChunkCoord,
    },
    ChunkBeingRemoved {
        coord: ChunkCoord,
        user_data: Option<UserData>,
    },
    PlayerEnteredChunk {
        coord: ChunkCoord,
    },
    InitialLoadComplete,
}

impl std::fmt::Debug for WorldEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WorldEvent::ChunkDataNeeded { request_id, .. } => {
                f.debug_struct("ChunkDataNeeded").field("request_id", request_id).finish()
            }
            WorldEvent::ChunkAdded { coord } => {
                f.debug_struct("ChunkAdded").field("coord", coord).finish()
            }
            WorldEvent::ChunkBeingRemoved { coord, user_data } => f
                .debug_struct("ChunkBeingRemoved")
                .field("coord", coord)
                .field("has_user_data", &user_data.is_some())
                .finish(),
            WorldEvent::PlayerEnteredChunk { coord } => {
                f.debug_struct("PlayerEnteredChunk").field("coord", coord).finish()
            }
            WorldEvent::InitialLoadComplete => f.write_str("InitialLoadComplete"),
        }
    }
}
