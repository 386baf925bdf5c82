use loam_blocks::{BlockId, BlockRegistry, FaceDir, MaterialId};
use loam_chunk::{NEIGHBOR_SLOTS, VoxelBuffer};

use crate::ao::{compute_ao, pack_ao_mask};
use crate::batch::{Quad, TerrainBatches};
use crate::view::{EdgeLookup, NeighborhoodView};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct MesherOptions {
    pub ambient_occlusion: bool,
    /// Allow the level-0 "reverse" corner; off clamps corners to 1..=3.
    pub reverse_ao: bool,
}

impl Default for MesherOptions {
    fn default() -> Self {
        Self {
            ambient_occlusion: true,
            reverse_ao: true,
        }
    }
}

/// AO byte used when occlusion is disabled: every corner open.
const FLAT_AO: u8 = pack_ao_mask(1, 1, 1, 1);

/// Greedy surface extractor for one chunk size. Reuses its mask buffer
/// across calls.
#[derive(Clone, Debug)]
pub struct GreedyMesher {
    lookup: EdgeLookup,
    opts: MesherOptions,
    mask: Vec<Option<(i32, u8)>>,
}

impl GreedyMesher {
    pub fn new(size: usize, opts: MesherOptions) -> Self {
        Self {
            lookup: EdgeLookup::new(size),
            opts,
            mask: vec![None; size * size],
        }
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.lookup.size()
    }

    pub fn options(&self) -> MesherOptions {
        self.opts
    }

    pub fn set_options(&mut self, opts: MesherOptions) {
        self.opts = opts;
    }

    /// Meshes the chunk in slot 13 of `hood` against its neighbors.
    pub fn mesh(
        &mut self,
        hood: &[Option<&VoxelBuffer>; NEIGHBOR_SLOTS],
        layer_hint: impl Fn(i32) -> Option<BlockId>,
        registry: &BlockRegistry,
    ) -> TerrainBatches {
        let view = NeighborhoodView::build(&self.lookup, hood, layer_hint);
        self.mesh_view(&view, registry)
    }

    pub fn mesh_view(
        &mut self,
        view: &NeighborhoodView,
        registry: &BlockRegistry,
    ) -> TerrainBatches {
        let mut out = TerrainBatches::default();
        for d in 0..3 {
            self.mesh_axis(view, registry, d, &mut out);
        }
        log::trace!(target: "mesh", "greedy pass produced {} quads", out.quad_count());
        out
    }

    fn mesh_axis(
        &mut self,
        view: &NeighborhoodView,
        registry: &BlockRegistry,
        d: usize,
        out: &mut TerrainBatches,
    ) {
        let size = self.size();
        let (u, v) = ((d + 1) % 3, (d + 2) % 3);
        // Plane S belongs to the positive neighbor's plane 0.
        for i in 0..size as i32 {
            if d == 1 && skip_y_plane(view, registry, i) {
                continue;
            }
            if !self.build_mask(view, registry, d, i) {
                continue;
            }
            greedy_rects(size, size, &mut self.mask, |j0, k0, w, h, (signed, ao)| {
                let (dir, material) = if signed > 0 {
                    (FaceDir::from_axis(d, true), MaterialId(signed as u16))
                } else {
                    (FaceDir::from_axis(d, false), MaterialId((-signed) as u16))
                };
                let mut base = [0i32; 3];
                base[d] = i;
                base[u] = j0 as i32;
                base[v] = k0 as i32;
                out.push(
                    registry.terrain_material(material),
                    Quad {
                        material,
                        dir,
                        base,
                        width: w as u32,
                        height: h as u32,
                        ao,
                    },
                );
            });
        }
    }

    /// Fills the mask for the plane between depth `i-1` and `i`. Returns
    /// whether any face was found.
    fn build_mask(
        &mut self,
        view: &NeighborhoodView,
        registry: &BlockRegistry,
        d: usize,
        i: i32,
    ) -> bool {
        let s = self.size() as i32;
        let pos_dir = FaceDir::from_axis(d, true);
        let neg_dir = FaceDir::from_axis(d, false);
        let solid = |a: i32, b: i32, c: i32| registry.is_solid(view.get(d, a, b, c));
        let mut any = false;
        for k in 0..s {
            for j in 0..s {
                let idx = (k * s + j) as usize;
                self.mask[idx] = None;
                let id0 = view.get(d, i - 1, j, k);
                let id1 = view.get(d, i, j, k);
                if id0 == id1 {
                    continue;
                }
                let op0 = registry.is_opaque(id0);
                let op1 = registry.is_opaque(id1);
                if op0 && op1 {
                    continue;
                }
                let mat0 = registry.face_material(id0, pos_dir);
                let mat1 = registry.face_material(id1, neg_dir);
                if mat0 == mat1 {
                    continue;
                }
                let positive = if op0 {
                    true
                } else if op1 {
                    false
                } else {
                    !mat0.is_none()
                };
                let signed = if positive {
                    i32::from(mat0.0)
                } else {
                    -i32::from(mat1.0)
                };
                if signed == 0 {
                    continue;
                }
                let ao = if self.opts.ambient_occlusion {
                    let (ipos, ineg) = if positive { (i, i - 1) } else { (i - 1, i) };
                    compute_ao(&solid, ipos, ineg, j, k, self.opts.reverse_ao)
                } else {
                    FLAT_AO
                };
                self.mask[idx] = Some((signed, ao));
                any = true;
            }
        }
        any
    }
}

/// Two constant Y layers of one id, or of two opaque ids, have no faces.
fn skip_y_plane(view: &NeighborhoodView, registry: &BlockRegistry, i: i32) -> bool {
    match (view.layer(i - 1), view.layer(i)) {
        (Some(a), Some(b)) => a == b || (registry.is_opaque(a) && registry.is_opaque(b)),
        _ => false,
    }
}

/// Merges equal mask cells into maximal rectangles, row-major. Consumed
/// cells are cleared.
#[inline]
fn greedy_rects<K: Copy + Eq>(
    width: usize,
    height: usize,
    mask: &mut [Option<K>],
    mut emit: impl FnMut(usize, usize, usize, usize, K),
) {
    for y in 0..height {
        for x in 0..width {
            let Some(code) = mask[y * width + x] else {
                continue;
            };
            let mut w = 1;
            while x + w < width && mask[y * width + x + w] == Some(code) {
                w += 1;
            }
            let mut h = 1;
            'expand: while y + h < height {
                let row = (y + h) * width + x;
                if mask[row..row + w].iter().any(|c| *c != Some(code)) {
                    break 'expand;
                }
                h += 1;
            }
            emit(x, y, w, h, code);
            for yy in 0..h {
                let row = (y + yy) * width + x;
                mask[row..row + w].fill(None);
            }
        }
    }
}
