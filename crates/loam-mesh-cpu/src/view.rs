use loam_blocks::{AIR, BlockId};
use loam_chunk::{NEIGHBOR_SLOTS, SELF_SLOT, VoxelBuffer, slot_index};

/// Maps padded coordinates `-1..=S` to `(neighbor offset, local coordinate)`.
/// Built once per chunk size.
#[derive(Clone, Debug)]
pub struct EdgeLookup {
    size: usize,
    entries: Vec<(i32, usize)>,
}

impl EdgeLookup {
    pub fn new(size: usize) -> Self {
        let s = size as i32;
        let entries = (-1..=s)
            .map(|c| {
                if c < 0 {
                    (-1, size - 1)
                } else if c >= s {
                    (1, 0)
                } else {
                    (0, c as usize)
                }
            })
            .collect();
        Self { size, entries }
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    /// `c` in `-1..=S`.
    #[inline]
    pub fn get(&self, c: i32) -> (i32, usize) {
        self.entries[(c + 1) as usize]
    }
}

/// Padded `(S+2)³` copy of a chunk and the boundary layers of its 26
/// neighbors. Missing neighbors are clamped to the chunk's own edge voxel.
///
/// Access goes through an axis-transposed frame: `get(d, i, j, k)` reads
/// depth `i` along axis `d`, `j` along `(d+1)%3` and `k` along `(d+2)%3`.
#[derive(Clone, Debug)]
pub struct NeighborhoodView {
    size: usize,
    pad: usize,
    data: Vec<BlockId>,
    /// Constant-layer hints for Y layers `-1..S`, indexed `y + 1`.
    layers: Vec<Option<BlockId>>,
}

impl NeighborhoodView {
    pub fn build(
        lookup: &EdgeLookup,
        hood: &[Option<&VoxelBuffer>; NEIGHBOR_SLOTS],
        layer_hint: impl Fn(i32) -> Option<BlockId>,
    ) -> Self {
        let size = lookup.size();
        let s = size as i32;
        let pad = size + 2;
        let mut data = vec![AIR; pad * pad * pad];
        let own = hood[SELF_SLOT];
        let clamp = |c: i32| c.clamp(0, s - 1) as usize;
        for y in -1..=s {
            let (dy, ly) = lookup.get(y);
            for z in -1..=s {
                let (dz, lz) = lookup.get(z);
                for x in -1..=s {
                    let (dx, lx) = lookup.get(x);
                    let id = match hood[slot_index(dx, dy, dz)] {
                        Some(buf) => buf.get(lx, ly, lz),
                        None => own.map_or(AIR, |b| b.get(clamp(x), clamp(y), clamp(z))),
                    };
                    let pi = (((y + 1) as usize * pad) + (z + 1) as usize) * pad + (x + 1) as usize;
                    data[pi] = id;
                }
            }
        }
        let mut layers = Vec::with_capacity(size + 1);
        let below = hood[slot_index(0, -1, 0)].is_some();
        layers.push(if below { layer_hint(-1) } else { layer_hint(0) });
        for y in 0..s {
            layers.push(layer_hint(y));
        }
        Self {
            size,
            pad,
            data,
            layers,
        }
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    #[inline]
    fn stride(&self, axis: usize) -> usize {
        match axis {
            0 => 1,
            1 => self.pad * self.pad,
            _ => self.pad,
        }
    }

    /// Chunk-local `(x, y, z)` in `-1..=S`.
    #[inline]
    pub fn get_xyz(&self, x: i32, y: i32, z: i32) -> BlockId {
        let p = self.pad;
        self.data[(((y + 1) as usize * p) + (z + 1) as usize) * p + (x + 1) as usize]
    }

    /// Transposed read for axis `d`.
    #[inline]
    pub fn get(&self, d: usize, i: i32, j: i32, k: i32) -> BlockId {
        let (u, v) = ((d + 1) % 3, (d + 2) % 3);
        let origin = self.stride(0) + self.stride(1) + self.stride(2);
        let at = origin as isize
            + i as isize * self.stride(d) as isize
            + j as isize * self.stride(u) as isize
            + k as isize * self.stride(v) as isize;
        self.data[at as usize]
    }

    /// Constant-layer hint for Y layer `y` in `-1..S`.
    #[inline]
    pub fn layer(&self, y: i32) -> Option<BlockId> {
        self.layers.get((y + 1) as usize).copied().flatten()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hood_with<'a>(
        pairs: &[(usize, &'a VoxelBuffer)],
    ) -> [Option<&'a VoxelBuffer>; NEIGHBOR_SLOTS] {
        let mut hood = [None; NEIGHBOR_SLOTS];
        for &(slot, buf) in pairs {
            hood[slot] = Some(buf);
        }
        hood
    }

    #[test]
    fn reads_neighbor_edges() {
        let mut own = VoxelBuffer::new(4);
        own.set(0, 0, 0, 1);
        let mut west = VoxelBuffer::new(4);
        west.set(3, 2, 1, 9);
        let hood = hood_with(&[(SELF_SLOT, &own), (slot_index(-1, 0, 0), &west)]);
        let view = NeighborhoodView::build(&EdgeLookup::new(4), &hood, |_| None);
        assert_eq!(view.get_xyz(0, 0, 0), 1);
        assert_eq!(view.get_xyz(-1, 2, 1), 9);
        // x axis: depth x, u = y, v = z
        assert_eq!(view.get(0, -1, 2, 1), 9);
        // z axis: depth z, u = x, v = y
        assert_eq!(view.get(2, 1, -1, 2), 9);
    }

    #[test]
    fn missing_neighbors_clamp_to_own_edge() {
        let mut own = VoxelBuffer::new(4);
        own.set(3, 0, 2, 5);
        let hood = hood_with(&[(SELF_SLOT, &own)]);
        let view = NeighborhoodView::build(&EdgeLookup::new(4), &hood, |_| None);
        assert_eq!(view.get_xyz(4, 0, 2), 5);
        assert_eq!(view.get_xyz(4, -1, 2), 5);
        assert_eq!(view.get_xyz(-1, 0, 2), 0);
    }

    #[test]
    fn layer_below_falls_back_to_own_bottom() {
        let own = VoxelBuffer::filled(2, 3);
        let hood = hood_with(&[(SELF_SLOT, &own)]);
        let view = NeighborhoodView::build(&EdgeLookup::new(2), &hood, |y| (y >= 0).then_some(3));
        assert_eq!(view.layer(-1), Some(3));
        assert_eq!(view.layer(1), Some(3));
    }
}
