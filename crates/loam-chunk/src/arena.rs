use loam_blocks::{BlockId, BlockRegistry};
use loam_world::{ChunkCoord, ChunkStorage};

use super::chunk::{Chunk, SetOutcome};
use super::neighbors::{NEIGHBOR_SLOTS, SELF_SLOT, edge_offsets, slot_index, slot_offset};
use super::objects::ObjectMesher;
use super::voxels::VoxelBuffer;

/// Generational handle into a [`ChunkArena`]. Handles to removed chunks
/// never resolve, even after the slot is reused.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ChunkId {
    index: u32,
    generation: u32,
}

#[derive(Default)]
struct Slot {
    generation: u32,
    chunk: Option<Chunk>,
}

/// Result of a voxel write routed through the arena.
#[derive(Clone, Debug, Default)]
pub struct SetResult {
    pub outcome: SetOutcome,
    /// Existing neighbors that were marked terrain-dirty by edge propagation.
    pub dirtied_neighbors: Vec<ChunkCoord>,
}

/// Owns every live chunk and keeps their 27-slot neighbor tables linked.
#[derive(Default)]
pub struct ChunkArena {
    slots: Vec<Slot>,
    free: Vec<u32>,
    by_coord: ChunkStorage<ChunkId>,
}

impl ChunkArena {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.by_coord.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.by_coord.is_empty()
    }

    #[inline]
    pub fn id_at(&self, c: ChunkCoord) -> Option<ChunkId> {
        self.by_coord.get(c).copied()
    }

    #[inline]
    pub fn contains(&self, c: ChunkCoord) -> bool {
        self.by_coord.contains(c)
    }

    #[inline]
    pub fn get(&self, id: ChunkId) -> Option<&Chunk> {
        let slot = self.slots.get(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        slot.chunk.as_ref()
    }

    #[inline]
    pub fn get_mut(&mut self, id: ChunkId) -> Option<&mut Chunk> {
        let slot = self.slots.get_mut(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        slot.chunk.as_mut()
    }

    pub fn chunk_at(&self, c: ChunkCoord) -> Option<&Chunk> {
        self.get(self.id_at(c)?)
    }

    pub fn chunk_at_mut(&mut self, c: ChunkCoord) -> Option<&mut Chunk> {
        let id = self.id_at(c)?;
        self.get_mut(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (ChunkId, &Chunk)> + '_ {
        self.slots.iter().enumerate().filter_map(|(i, s)| {
            s.chunk.as_ref().map(|c| {
                (
                    ChunkId {
                        index: i as u32,
                        generation: s.generation,
                    },
                    c,
                )
            })
        })
    }

    /// Inserts a chunk, links it with the chunks around it, and returns
    /// the coordinates of existing neighbors that became terrain-dirty
    /// (either side non-empty).
    ///
    /// Panics if a chunk already occupies the coordinate.
    pub fn insert(&mut self, chunk: Chunk) -> (ChunkId, Vec<ChunkCoord>) {
        let coord = chunk.coord;
        assert!(
            !self.by_coord.contains(coord),
            "chunk {coord} inserted twice"
        );
        let id = match self.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index as usize];
                slot.chunk = Some(chunk);
                ChunkId {
                    index,
                    generation: slot.generation,
                }
            }
            None => {
                self.slots.push(Slot {
                    generation: 0,
                    chunk: Some(chunk),
                });
                ChunkId {
                    index: (self.slots.len() - 1) as u32,
                    generation: 0,
                }
            }
        };
        self.by_coord.insert(coord, id);

        let mut dirtied = Vec::new();
        let mut links = Vec::with_capacity(26);
        for ((di, dj, dk), nc) in coord.neighbors() {
            if let Some(nid) = self.id_at(nc) {
                links.push((slot_index(di, dj, dk), nid));
            }
        }
        let self_empty = self.get(id).is_none_or(|c| c.is_empty());
        for &(slot, nid) in &links {
            let back = NEIGHBOR_SLOTS - 1 - slot;
            if let Some(n) = self.get_mut(nid) {
                n.neighbors[back] = Some(id);
                n.neighbor_count += 1;
                if !self_empty || !n.is_empty() {
                    n.terrain_dirty = true;
                    dirtied.push(n.coord);
                }
            }
        }
        if let Some(c) = self.get_mut(id) {
            c.neighbors[SELF_SLOT] = Some(id);
            for &(slot, nid) in &links {
                c.neighbors[slot] = Some(nid);
            }
            c.neighbor_count = links.len();
        }
        log::trace!(target: "chunk", "linked {} to {} neighbors", coord, links.len());
        (id, dirtied)
    }

    /// Unlinks and removes the chunk at `c`. The caller disposes it.
    pub fn remove(&mut self, c: ChunkCoord) -> Option<Chunk> {
        let id = self.by_coord.remove(c)?;
        let slot = self.slots.get_mut(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        let chunk = slot.chunk.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index);
        for slot in 0..NEIGHBOR_SLOTS {
            if slot == SELF_SLOT {
                continue;
            }
            let Some(nid) = chunk.neighbors[slot] else {
                continue;
            };
            if let Some(n) = self.get_mut(nid) {
                let back = NEIGHBOR_SLOTS - 1 - slot;
                if n.neighbors[back] == Some(id) {
                    n.neighbors[back] = None;
                    n.neighbor_count -= 1;
                }
            }
        }
        Some(chunk)
    }

    /// Writes one voxel and propagates terrain dirtiness across chunk
    /// boundaries. `None` when no chunk is loaded at `c`.
    pub fn set_block(
        &mut self,
        c: ChunkCoord,
        local: [usize; 3],
        id: BlockId,
        registry: &BlockRegistry,
        objects: &mut dyn ObjectMesher,
    ) -> Option<SetResult> {
        let cid = self.id_at(c)?;
        let chunk = self.get_mut(cid)?;
        let size = chunk.size();
        let outcome = chunk.set(local[0], local[1], local[2], id, registry, objects);
        let mut result = SetResult {
            outcome,
            dirtied_neighbors: Vec::new(),
        };
        if !outcome.propagate_to_neighbors {
            return Some(result);
        }
        let targets: Vec<ChunkId> = edge_offsets(local, size)
            .into_iter()
            .filter_map(|(di, dj, dk)| chunk.neighbor(slot_index(di, dj, dk)))
            .collect();
        for nid in targets {
            if let Some(n) = self.get_mut(nid) {
                n.terrain_dirty = true;
                result.dirtied_neighbors.push(n.coord);
            }
        }
        Some(result)
    }

    /// Voxel buffers of the 27-chunk neighborhood around `id`, by slot.
    pub fn neighborhood(&self, id: ChunkId) -> Option<[Option<&VoxelBuffer>; NEIGHBOR_SLOTS]> {
        let chunk = self.get(id)?;
        let mut out: [Option<&VoxelBuffer>; NEIGHBOR_SLOTS] = [None; NEIGHBOR_SLOTS];
        for (slot, entry) in out.iter_mut().enumerate() {
            let n = if slot == SELF_SLOT {
                Some(chunk)
            } else {
                chunk.neighbor(slot).and_then(|nid| self.get(nid))
            };
            *entry = n.filter(|n| !n.is_disposed()).and_then(|n| n.voxels());
        }
        Some(out)
    }

    /// Whole-layer caches of the chunk and its vertical neighbors, used to
    /// skip constant Y planes.
    pub fn layer_hint(&self, id: ChunkId, y: i32) -> Option<BlockId> {
        let chunk = self.get(id)?;
        let s = chunk.size() as i32;
        if (0..s).contains(&y) {
            return chunk.whole_layer_voxel(y as usize);
        }
        let dj = if y < 0 { -1 } else { 1 };
        let n = self.get(chunk.neighbor(slot_index(0, dj, 0))?)?;
        n.whole_layer_voxel(y.rem_euclid(s) as usize)
    }

    pub fn coords(&self) -> impl Iterator<Item = ChunkCoord> + '_ {
        self.by_coord.iter().map(|(c, _)| c)
    }

    /// Offsets of linked neighbors, for diagnostics.
    pub fn linked_offsets(&self, id: ChunkId) -> Vec<(i32, i32, i32)> {
        let Some(chunk) = self.get(id) else {
            return Vec::new();
        };
        (0..NEIGHBOR_SLOTS)
            .filter(|&s| s != SELF_SLOT && chunk.neighbor(s).is_some())
            .map(slot_offset)
            .collect()
    }
}
