use std::any::Any;
use std::fmt;

use loam_blocks::{AIR, BlockId, BlockRegistry};
use loam_world::{ChunkCoord, LocationQueue};

use super::arena::ChunkId;
use super::neighbors::NEIGHBOR_SLOTS;
use super::objects::ObjectMesher;
use super::voxels::VoxelBuffer;

/// Opaque drawable returned by a mesh adapter. The chunk only stores it.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct DrawHandle(pub u64);

/// Caller payload attached to chunk data, handed back on removal.
pub type UserData = Box<dyn Any + Send>;

/// What a single-voxel write changed.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct SetOutcome {
    pub changed: bool,
    pub old: BlockId,
    pub terrain_dirty: bool,
    pub objects_dirty: bool,
    /// Neighbors sharing this voxel's face, edge, or corner must remesh.
    pub propagate_to_neighbors: bool,
}

pub struct Chunk {
    pub coord: ChunkCoord,
    size: usize,
    origin: [i32; 3],
    voxels: Option<VoxelBuffer>,
    is_full: bool,
    is_empty: bool,
    whole_layer_voxel: Vec<Option<BlockId>>,
    pub terrain_dirty: bool,
    pub objects_dirty: bool,
    pub(crate) neighbors: [Option<ChunkId>; NEIGHBOR_SLOTS],
    pub(crate) neighbor_count: usize,
    block_handler_locs: LocationQueue<[i32; 3]>,
    pub times_meshed: u32,
    user_data: Option<UserData>,
    terrain_handles: Vec<DrawHandle>,
    disposed: bool,
}

impl fmt::Debug for Chunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Chunk")
            .field("coord", &self.coord)
            .field("size", &self.size)
            .field("is_full", &self.is_full)
            .field("is_empty", &self.is_empty)
            .field("terrain_dirty", &self.terrain_dirty)
            .field("objects_dirty", &self.objects_dirty)
            .field("neighbor_count", &self.neighbor_count)
            .field("times_meshed", &self.times_meshed)
            .field("disposed", &self.disposed)
            .finish()
    }
}

impl Chunk {
    /// Builds a chunk from generated data. With `fill`, the whole buffer is
    /// set to that id without scanning content.
    pub fn new(
        coord: ChunkCoord,
        size: usize,
        voxels: VoxelBuffer,
        fill: Option<BlockId>,
        user_data: Option<UserData>,
        registry: &BlockRegistry,
        objects: &mut dyn ObjectMesher,
    ) -> Self {
        let s = size as i32;
        let mut voxels = voxels;
        if voxels.size() != size {
            voxels = VoxelBuffer::from_vec(size, voxels.as_slice().to_vec());
        }
        let mut chunk = Chunk {
            coord,
            size,
            origin: [coord.cx * s, coord.cy * s, coord.cz * s],
            voxels: None,
            is_full: false,
            is_empty: false,
            whole_layer_voxel: vec![None; size],
            terrain_dirty: false,
            objects_dirty: false,
            neighbors: [None; NEIGHBOR_SLOTS],
            neighbor_count: 0,
            block_handler_locs: LocationQueue::new(),
            times_meshed: 0,
            user_data,
            terrain_handles: Vec::new(),
            disposed: false,
        };
        objects.init_chunk(coord);
        match fill {
            Some(id) => {
                voxels.fill(id);
                chunk.whole_layer_voxel.fill(Some(id));
                chunk.is_full = registry.is_opaque(id);
                chunk.is_empty = id == AIR;
                let needs_scan = registry.has_handlers(id) || registry.is_object(id);
                chunk.voxels = Some(voxels);
                if needs_scan {
                    chunk.register_all(registry, objects);
                }
            }
            None => {
                chunk.voxels = Some(voxels);
                chunk.scan_voxel_data(registry, objects);
            }
        }
        chunk.terrain_dirty = !chunk.is_empty;
        log::trace!(
            target: "chunk",
            "chunk {} created (full={}, empty={})",
            coord,
            chunk.is_full,
            chunk.is_empty
        );
        chunk
    }

    /// Full scan: flags, layer cache, object and handler registration.
    fn scan_voxel_data(&mut self, registry: &BlockRegistry, objects: &mut dyn ObjectMesher) {
        let Some(voxels) = self.voxels.as_ref() else {
            return;
        };
        let s = self.size;
        let mut full = true;
        let mut empty = true;
        for y in 0..s {
            let layer = voxels.layer(y);
            let first = layer.first().copied();
            let mut uniform = true;
            for &id in layer {
                if Some(id) != first {
                    uniform = false;
                }
                if id != AIR {
                    empty = false;
                }
                if !registry.is_opaque(id) {
                    full = false;
                }
            }
            self.whole_layer_voxel[y] = if uniform { first } else { None };
        }
        self.is_full = full;
        self.is_empty = empty;
        if !empty {
            self.register_all(registry, objects);
        }
    }

    /// Registers object instances and handler locations for every voxel.
    fn register_all(&mut self, registry: &BlockRegistry, objects: &mut dyn ObjectMesher) {
        let Some(voxels) = self.voxels.as_ref() else {
            return;
        };
        let s = self.size;
        for y in 0..s {
            if let Some(id) = self.whole_layer_voxel[y] {
                if !registry.is_object(id) && !registry.has_handlers(id) {
                    continue;
                }
            }
            for z in 0..s {
                for x in 0..s {
                    let id = voxels.get(x, y, z);
                    // Plain blocks carry no objects or handlers.
                    if id == AIR || registry.is_plain(id) {
                        continue;
                    }
                    if registry.is_object(id) {
                        objects.set_object_block(self.coord, id, [x, y, z]);
                        self.objects_dirty = true;
                    }
                    if let Some(h) = registry.handlers(id) {
                        self.block_handler_locs.add([x as i32, y as i32, z as i32]);
                        let [wx, wy, wz] = self.world_pos([x, y, z]);
                        h.fire_load(wx, wy, wz);
                    }
                }
            }
        }
    }

    #[inline]
    fn world_pos(&self, local: [usize; 3]) -> [i32; 3] {
        [
            self.origin[0] + local[0] as i32,
            self.origin[1] + local[1] as i32,
            self.origin[2] + local[2] as i32,
        ]
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    #[inline]
    pub fn origin(&self) -> [i32; 3] {
        self.origin
    }

    /// Reads one voxel; air once disposed.
    #[inline]
    pub fn get(&self, x: usize, y: usize, z: usize) -> BlockId {
        self.voxels.as_ref().map_or(AIR, |v| v.get(x, y, z))
    }

    /// Writes one voxel and updates the derived state. Neighbor propagation
    /// is left to the arena, driven by the returned outcome.
    pub fn set(
        &mut self,
        x: usize,
        y: usize,
        z: usize,
        new_id: BlockId,
        registry: &BlockRegistry,
        objects: &mut dyn ObjectMesher,
    ) -> SetOutcome {
        let Some(voxels) = self.voxels.as_mut() else {
            return SetOutcome::default();
        };
        let old_id = voxels.get(x, y, z);
        if old_id == new_id {
            return SetOutcome {
                old: old_id,
                ..SetOutcome::default()
            };
        }
        voxels.set(x, y, z, new_id);

        // Only ever loosened; tightening needs a full rescan.
        if self.is_full && !registry.is_opaque(new_id) {
            self.is_full = false;
        }
        if self.is_empty && new_id != AIR {
            self.is_empty = false;
        }
        if self.whole_layer_voxel[y] != Some(new_id) {
            self.whole_layer_voxel[y] = None;
        }

        let [wx, wy, wz] = self.world_pos([x, y, z]);
        let loc = [x as i32, y as i32, z as i32];
        if let Some(h) = registry.handlers(old_id) {
            h.fire_unset(wx, wy, wz);
            self.block_handler_locs.remove(loc);
        }
        if let Some(h) = registry.handlers(new_id) {
            h.fire_set(wx, wy, wz);
            self.block_handler_locs.add(loc);
        }

        let old_obj = registry.is_object(old_id);
        let new_obj = registry.is_object(new_id);
        if old_obj || new_obj {
            objects.set_object_block(self.coord, new_id, [x, y, z]);
            self.objects_dirty = true;
        }

        let shape_changed = registry.is_solid(old_id) != registry.is_solid(new_id)
            || registry.is_opaque(old_id) != registry.is_opaque(new_id);
        let was_terrain = !old_obj && old_id != AIR;
        let now_terrain = !new_obj && new_id != AIR;
        let terrain_dirty = shape_changed || was_terrain || now_terrain;
        if terrain_dirty {
            self.terrain_dirty = true;
        }
        let last = self.size - 1;
        let on_edge = x == 0 || y == 0 || z == 0 || x == last || y == last || z == last;
        SetOutcome {
            changed: true,
            old: old_id,
            terrain_dirty,
            objects_dirty: old_obj || new_obj,
            propagate_to_neighbors: terrain_dirty && on_edge,
        }
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.is_full
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.is_empty
    }

    #[inline]
    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    #[inline]
    pub fn is_dirty(&self) -> bool {
        self.terrain_dirty || self.objects_dirty
    }

    /// `Some(id)` when Y-layer `y` is known to be a single id.
    #[inline]
    pub fn whole_layer_voxel(&self, y: usize) -> Option<BlockId> {
        self.whole_layer_voxel.get(y).copied().flatten()
    }

    pub fn voxels(&self) -> Option<&VoxelBuffer> {
        self.voxels.as_ref()
    }

    #[inline]
    pub fn neighbor(&self, slot: usize) -> Option<ChunkId> {
        self.neighbors.get(slot).copied().flatten()
    }

    /// Count of non-self neighbor slots in use.
    #[inline]
    pub fn neighbor_count(&self) -> usize {
        self.neighbor_count
    }

    pub fn handler_locations(&self) -> impl Iterator<Item = [i32; 3]> + '_ {
        self.block_handler_locs.iter()
    }

    pub fn take_user_data(&mut self) -> Option<UserData> {
        self.user_data.take()
    }

    pub fn user_data(&self) -> Option<&UserData> {
        self.user_data.as_ref()
    }

    pub fn terrain_handles(&self) -> &[DrawHandle] {
        &self.terrain_handles
    }

    /// Stores fresh terrain handles and returns the previous ones for release.
    pub fn replace_terrain_handles(&mut self, handles: Vec<DrawHandle>) -> Vec<DrawHandle> {
        std::mem::replace(&mut self.terrain_handles, handles)
    }

    /// Fires `on_unload` for handler locations, releases voxel data and
    /// neighbor links, and returns the drawable handles the caller must free.
    /// Calling it again returns nothing.
    pub fn dispose(
        &mut self,
        registry: &BlockRegistry,
        objects: &mut dyn ObjectMesher,
    ) -> Vec<DrawHandle> {
        if self.disposed {
            return Vec::new();
        }
        self.disposed = true;
        if let Some(voxels) = self.voxels.as_ref() {
            for [x, y, z] in self.block_handler_locs.iter() {
                let id = voxels.get(x as usize, y as usize, z as usize);
                if let Some(h) = registry.handlers(id) {
                    let [wx, wy, wz] = self.world_pos([x as usize, y as usize, z as usize]);
                    h.fire_unload(wx, wy, wz);
                }
            }
        }
        objects.dispose_chunk(self.coord);
        self.block_handler_locs.clear();
        self.voxels = None;
        self.neighbors = [None; NEIGHBOR_SLOTS];
        self.neighbor_count = 0;
        self.terrain_dirty = false;
        self.objects_dirty = false;
        log::trace!(target: "chunk", "chunk {} disposed", self.coord);
        std::mem::take(&mut self.terrain_handles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::objects::NoObjects;
    use loam_blocks::{BlockHandlers, BlockOptions, BlockRegistryBuilder, MaterialOptions};
    use std::sync::{Arc, Mutex};

    fn registry() -> BlockRegistry {
        let mut b = BlockRegistryBuilder::new();
        b.register_material("stone", MaterialOptions::color(0.5, 0.5, 0.5));
        b.register_material("dirt", MaterialOptions::color(0.4, 0.3, 0.2));
        b.register_block(1, BlockOptions::named("stone").material("stone"))
            .unwrap();
        b.register_block(2, BlockOptions::named("glass").material("stone").transparent())
            .unwrap();
        b.register_block(3, BlockOptions::named("dirt").material("dirt"))
            .unwrap();
        b.build()
    }

    fn fresh(reg: &BlockRegistry, fill: Option<BlockId>) -> Chunk {
        Chunk::new(
            ChunkCoord::new(0, 0, 0),
            4,
            VoxelBuffer::new(4),
            fill,
            None,
            reg,
            &mut NoObjects,
        )
    }

    #[test]
    fn filled_with_opaque_is_full() {
        let reg = registry();
        let c = fresh(&reg, Some(1));
        assert!(c.is_full());
        assert!(!c.is_empty());
        assert!(c.terrain_dirty);
        assert_eq!(c.whole_layer_voxel(2), Some(1));
    }

    #[test]
    fn filled_with_air_is_empty_and_clean() {
        let reg = registry();
        let c = fresh(&reg, Some(AIR));
        assert!(c.is_empty());
        assert!(!c.is_full());
        assert!(!c.terrain_dirty);
    }

    #[test]
    fn scanned_flags_match_fill() {
        let reg = registry();
        let c = Chunk::new(
            ChunkCoord::new(0, 0, 0),
            4,
            VoxelBuffer::filled(4, 1),
            None,
            None,
            &reg,
            &mut NoObjects,
        );
        assert!(c.is_full());
        assert!(!c.is_empty());
    }

    #[test]
    fn set_same_id_is_noop() {
        let reg = registry();
        let mut c = fresh(&reg, Some(1));
        c.terrain_dirty = false;
        let out = c.set(0, 0, 0, 1, &reg, &mut NoObjects);
        assert!(!out.changed);
        assert!(!out.propagate_to_neighbors);
        assert!(!c.terrain_dirty);
        assert_eq!(c.whole_layer_voxel(0), Some(1));
    }

    #[test]
    fn set_loosens_flags_one_way() {
        let reg = registry();
        let mut c = fresh(&reg, Some(1));
        c.set(1, 1, 1, 2, &reg, &mut NoObjects);
        assert!(!c.is_full());
        assert_eq!(c.whole_layer_voxel(1), None);
        assert_eq!(c.whole_layer_voxel(0), Some(1));
        // Restoring does not re-tighten without a rescan.
        c.set(1, 1, 1, 1, &reg, &mut NoObjects);
        assert!(!c.is_full());
    }

    #[test]
    fn material_swap_dirties_terrain_without_shape_change() {
        let reg = registry();
        let mut c = fresh(&reg, Some(1));
        c.terrain_dirty = false;
        let out = c.set(2, 2, 2, 3, &reg, &mut NoObjects);
        assert!(out.terrain_dirty);
        assert!(!out.propagate_to_neighbors);
        assert!(c.terrain_dirty);
    }

    #[test]
    fn boundary_material_swap_reaches_neighbors() {
        let reg = registry();
        let mut c = fresh(&reg, Some(1));
        c.terrain_dirty = false;
        let out = c.set(3, 2, 2, 3, &reg, &mut NoObjects);
        assert!(out.terrain_dirty);
        assert!(out.propagate_to_neighbors);
    }

    #[test]
    fn handlers_fire_with_world_coordinates() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let (load, unload) = (seen.clone(), seen.clone());
        let mut b = BlockRegistryBuilder::new();
        b.register_block(
            1,
            BlockOptions::named("torch").handlers(
                BlockHandlers::new()
                    .on_load(move |x, y, z| load.lock().unwrap().push(("load", x, y, z)))
                    .on_unload(move |x, y, z| unload.lock().unwrap().push(("unload", x, y, z))),
            ),
        )
        .unwrap();
        let reg = b.build();
        let mut vox = VoxelBuffer::new(4);
        vox.set(1, 2, 3, 1);
        let mut c = Chunk::new(ChunkCoord::new(-1, 0, 2), 4, vox, None, None, &reg, &mut NoObjects);
        assert_eq!(c.handler_locations().count(), 1);
        c.dispose(&reg, &mut NoObjects);
        let log = seen.lock().unwrap().clone();
        assert_eq!(log, vec![("load", -3, 2, 11), ("unload", -3, 2, 11)]);
    }

    #[derive(Default)]
    struct Recorder(Vec<(BlockId, [usize; 3])>);

    impl ObjectMesher for Recorder {
        fn init_chunk(&mut self, _chunk: ChunkCoord) {}
        fn set_object_block(&mut self, _chunk: ChunkCoord, block: BlockId, local: [usize; 3]) {
            self.0.push((block, local));
        }
        fn dispose_chunk(&mut self, _chunk: ChunkCoord) {}
        fn build_object_meshes(&mut self, _chunk: ChunkCoord) {}
    }

    #[test]
    fn scan_registers_objects_among_plain_blocks() {
        let mut b = BlockRegistryBuilder::new();
        b.register_material("stone", MaterialOptions::color(0.5, 0.5, 0.5));
        b.register_block(1, BlockOptions::named("stone").material("stone"))
            .unwrap();
        b.register_block(2, BlockOptions::named("flower").object("flower"))
            .unwrap();
        let reg = b.build();
        assert!(reg.is_plain(1) && !reg.is_plain(2));
        let mut vox = VoxelBuffer::filled(4, 1);
        vox.set(2, 1, 3, 2);
        let mut rec = Recorder::default();
        let c = Chunk::new(ChunkCoord::new(0, 0, 0), 4, vox, None, None, &reg, &mut rec);
        assert_eq!(rec.0, vec![(2, [2, 1, 3])]);
        assert!(c.objects_dirty);
        assert_eq!(c.handler_locations().count(), 0);
    }

    #[test]
    fn dispose_is_idempotent_and_returns_handles_once() {
        let reg = registry();
        let mut c = fresh(&reg, Some(1));
        c.replace_terrain_handles(vec![DrawHandle(7)]);
        assert_eq!(c.dispose(&reg, &mut NoObjects), vec![DrawHandle(7)]);
        assert!(c.is_disposed());
        assert!(c.dispose(&reg, &mut NoObjects).is_empty());
        assert_eq!(c.get(0, 0, 0), AIR);
    }
}
