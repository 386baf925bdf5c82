use loam_blocks::BlockId;
use loam_world::ChunkCoord;

/// Collaborator that draws per-voxel object blocks as instances.
///
/// `set_object_block` receives the block's new id; a non-object id means
/// the instance at that location goes away.
pub trait ObjectMesher {
    fn init_chunk(&mut self, chunk: ChunkCoord);
    fn set_object_block(&mut self, chunk: ChunkCoord, block: BlockId, local: [usize; 3]);
    fn dispose_chunk(&mut self, chunk: ChunkCoord);
    fn build_object_meshes(&mut self, chunk: ChunkCoord);
}

/// Object collaborator for worlds without object blocks.
#[derive(Copy, Clone, Debug, Default)]
pub struct NoObjects;

impl ObjectMesher for NoObjects {
    fn init_chunk(&mut self, _chunk: ChunkCoord) {}
    fn set_object_block(&mut self, _chunk: ChunkCoord, _block: BlockId, _local: [usize; 3]) {}
    fn dispose_chunk(&mut self, _chunk: ChunkCoord) {}
    fn build_object_meshes(&mut self, _chunk: ChunkCoord) {}
}
