use loam_blocks::{AIR, BlockId};
use loam_chunk::ObjectMesher;
use loam_mesh_cpu::MeshBuildAdapter;
use loam_world::Aabb;

use crate::StreamingEngine;

impl<M: MeshBuildAdapter, O: ObjectMesher> StreamingEngine<M, O> {
    /// Block at a world voxel; air where no chunk is loaded.
    pub fn block_id(&self, x: i32, y: i32, z: i32) -> BlockId {
        let (c, [lx, ly, lz]) = self.indexer.world_to_chunk(x, y, z);
        self.arena.chunk_at(c).map_or(AIR, |ch| ch.get(lx, ly, lz))
    }

    pub fn block_solidity(&self, x: i32, y: i32, z: i32) -> bool {
        self.registry.is_solid(self.block_id(x, y, z))
    }

    pub fn block_opacity(&self, x: i32, y: i32, z: i32) -> bool {
        self.registry.is_opaque(self.block_id(x, y, z))
    }

    pub fn block_fluidity(&self, x: i32, y: i32, z: i32) -> bool {
        self.registry.is_fluid(self.block_id(x, y, z))
    }

    /// Writes a voxel and queues the affected chunks for remeshing.
    /// Returns whether anything changed; writes outside loaded chunks are
    /// dropped.
    pub fn set_block_id(&mut self, x: i32, y: i32, z: i32, id: BlockId) -> bool {
        let (c, local) = self.indexer.world_to_chunk(x, y, z);
        let Some(res) = self
            .arena
            .set_block(c, local, id, &self.registry, &mut self.objects)
        else {
            log::debug!(target: "stream", "set_block_id at ({x}, {y}, {z}) outside loaded chunks");
            return false;
        };
        if res.outcome.terrain_dirty || res.outcome.objects_dirty {
            self.enqueue_edited(c);
        }
        for n in res.dirtied_neighbors {
            self.enqueue_edited(n);
        }
        res.outcome.changed
    }

    /// True when no solid voxel overlaps `aabb`. Unloaded space counts as
    /// air, so only the part of the box inside loaded chunks is walked.
    pub fn is_box_unobstructed(&self, aabb: &Aabb) -> bool {
        if aabb.min.iter().chain(&aabb.max).any(|v| !v.is_finite()) {
            return false;
        }
        let Some((lo_c, hi_c)) = self.loaded_chunk_range() else {
            return true;
        };
        let s = self.cfg.chunk_size as f64;
        let mut lo = [0i32; 3];
        let mut hi = [0i32; 3];
        for a in 0..3 {
            let first = f64::from(lo_c[a]) * s;
            let last = (f64::from(hi_c[a]) + 1.0) * s - 1.0;
            let (min, max) = (aabb.min[a].floor().max(first), aabb.max[a].floor().min(last));
            if min > max {
                return true;
            }
            lo[a] = min as i32;
            hi[a] = max as i32;
        }
        for x in lo[0]..=hi[0] {
            for y in lo[1]..=hi[1] {
                for z in lo[2]..=hi[2] {
                    if self.block_solidity(x, y, z) {
                        return false;
                    }
                }
            }
        }
        true
    }

    fn loaded_chunk_range(&self) -> Option<([i32; 3], [i32; 3])> {
        let mut coords = self.arena.coords();
        let first = coords.next()?;
        let init = ([first.cx, first.cy, first.cz], [first.cx, first.cy, first.cz]);
        Some(coords.fold(init, |(mut lo, mut hi), c| {
            for (a, v) in [c.cx, c.cy, c.cz].into_iter().enumerate() {
                lo[a] = lo[a].min(v);
                hi[a] = hi[a].max(v);
            }
            (lo, hi)
        }))
    }
}
