use std::collections::BTreeMap;
use std::sync::Arc;

use hashbrown::HashMap;
use loam_blocks::{BlockId, BlockRegistry};
use loam_chunk::ObjectMesher;
use loam_world::ChunkCoord;

#[derive(Default, Debug)]
struct ChunkObjects {
    blocks: HashMap<[usize; 3], BlockId>,
    /// World-space instance positions per block id, rebuilt on demand.
    instances: BTreeMap<BlockId, Vec<[f32; 3]>>,
}

/// Reference object collaborator: tracks which voxels hold object blocks
/// and builds per-block instance lists for each chunk.
pub struct ObjectInstances {
    registry: Arc<BlockRegistry>,
    chunk_size: usize,
    chunks: HashMap<ChunkCoord, ChunkObjects>,
}

impl ObjectInstances {
    pub fn new(registry: Arc<BlockRegistry>, chunk_size: usize) -> Self {
        Self {
            registry,
            chunk_size,
            chunks: HashMap::new(),
        }
    }

    pub fn instance_count(&self, chunk: ChunkCoord) -> usize {
        self.chunks.get(&chunk).map_or(0, |c| c.blocks.len())
    }

    /// Instance positions built by the last `build_object_meshes` call.
    pub fn instances(&self, chunk: ChunkCoord, block: BlockId) -> &[[f32; 3]] {
        self.chunks
            .get(&chunk)
            .and_then(|c| c.instances.get(&block))
            .map_or(&[], Vec::as_slice)
    }

    pub fn tracked_chunks(&self) -> usize {
        self.chunks.len()
    }
}

impl ObjectMesher for ObjectInstances {
    fn init_chunk(&mut self, chunk: ChunkCoord) {
        self.chunks.entry(chunk).or_default();
    }

    fn set_object_block(&mut self, chunk: ChunkCoord, block: BlockId, local: [usize; 3]) {
        let objs = self.chunks.entry(chunk).or_default();
        if self.registry.is_object(block) {
            objs.blocks.insert(local, block);
        } else if objs.blocks.remove(&local).is_none() {
            panic!("object instance bookkeeping desync: no instance at {local:?} in chunk {chunk}");
        }
    }

    fn dispose_chunk(&mut self, chunk: ChunkCoord) {
        self.chunks.remove(&chunk);
    }

    fn build_object_meshes(&mut self, chunk: ChunkCoord) {
        let s = self.chunk_size as i32;
        let Some(objs) = self.chunks.get_mut(&chunk) else {
            return;
        };
        objs.instances.clear();
        let origin = [chunk.cx * s, chunk.cy * s, chunk.cz * s];
        for (&[x, y, z], &block) in &objs.blocks {
            // Instances sit on the center of the voxel's bottom face.
            objs.instances.entry(block).or_default().push([
                (origin[0] + x as i32) as f32 + 0.5,
                (origin[1] + y as i32) as f32,
                (origin[2] + z as i32) as f32 + 0.5,
            ]);
        }
        log::trace!(target: "mesh", "rebuilt {} object instances for {}", objs.blocks.len(), chunk);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use loam_blocks::{BlockOptions, BlockRegistryBuilder};

    fn registry() -> Arc<BlockRegistry> {
        let mut b = BlockRegistryBuilder::new();
        b.register_block(1, BlockOptions::named("flower").object("flower"))
            .unwrap();
        b.register_block(2, BlockOptions::named("stone")).unwrap();
        Arc::new(b.build())
    }

    #[test]
    fn builds_world_space_instances() {
        let mut objs = ObjectInstances::new(registry(), 8);
        let c = ChunkCoord::new(1, 0, -1);
        objs.init_chunk(c);
        objs.set_object_block(c, 1, [2, 3, 4]);
        objs.build_object_meshes(c);
        assert_eq!(objs.instances(c, 1), &[[10.5, 3.0, -3.5]]);
        objs.set_object_block(c, 2, [2, 3, 4]);
        objs.build_object_meshes(c);
        assert!(objs.instances(c, 1).is_empty());
        objs.dispose_chunk(c);
        assert_eq!(objs.tracked_chunks(), 0);
    }

    #[test]
    #[should_panic(expected = "bookkeeping desync")]
    fn removing_missing_instance_panics() {
        let mut objs = ObjectInstances::new(registry(), 8);
        let c = ChunkCoord::new(0, 0, 0);
        objs.init_chunk(c);
        objs.set_object_block(c, 0, [1, 1, 1]);
    }
}
