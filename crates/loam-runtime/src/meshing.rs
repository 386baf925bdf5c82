use loam_chunk::ObjectMesher;
use loam_mesh_cpu::MeshBuildAdapter;
use loam_world::ChunkCoord;

use crate::StreamingEngine;

impl<M: MeshBuildAdapter, O: ObjectMesher> StreamingEngine<M, O> {
    /// Rebuilds whatever is dirty on the chunk at `c`: terrain through the
    /// greedy mesher and mesh adapter, objects through the object
    /// collaborator. Returns whether a chunk was found.
    pub fn update_chunk_meshes(&mut self, c: ChunkCoord) -> bool {
        let Some(id) = self.arena.id_at(c) else {
            return false;
        };
        let Some((terrain, objects, origin)) = self
            .arena
            .get(id)
            .filter(|ch| !ch.is_disposed())
            .map(|ch| (ch.terrain_dirty, ch.objects_dirty, ch.origin()))
        else {
            return false;
        };

        if terrain {
            let Some(hood) = self.arena.neighborhood(id) else {
                return false;
            };
            let arena = &self.arena;
            let batches = self
                .mesher
                .mesh(&hood, |y| arena.layer_hint(id, y), &self.registry);
            let handles = self.adapter.build(c, origin, &batches);
            let old = match self.arena.get_mut(id) {
                Some(ch) => {
                    ch.terrain_dirty = false;
                    ch.times_meshed += 1;
                    ch.replace_terrain_handles(handles)
                }
                None => handles,
            };
            self.adapter.dispose(old);
            self.counters.meshes_built += 1;
            log::trace!(
                target: "mesh",
                "meshed {}: {} quads in {} batches",
                c,
                batches.quad_count(),
                batches.batches.len()
            );
        }

        if objects {
            self.objects.build_object_meshes(c);
            if let Some(ch) = self.arena.get_mut(id) {
                ch.objects_dirty = false;
            }
        }
        true
    }
}
