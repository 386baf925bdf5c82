use std::collections::BTreeMap;

use loam_blocks::{FaceDir, MaterialId, TerrainMaterialId};

use crate::ao::unpack_ao_mask;

/// One merged rectangle. `base` is the chunk-local corner on the face
/// plane; `width` runs along axis `(d+1)%3` and `height` along `(d+2)%3`,
/// where `d` is the face's axis.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Quad {
    pub material: MaterialId,
    pub dir: FaceDir,
    pub base: [i32; 3],
    pub width: u32,
    pub height: u32,
    pub ao: u8,
}

impl Quad {
    /// `[a00, a01, a10, a11]`.
    #[inline]
    pub fn ao_corners(&self) -> [u8; 4] {
        unpack_ao_mask(self.ao)
    }

    #[inline]
    pub fn area(&self) -> u32 {
        self.width * self.height
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FaceBatch {
    pub quads: Vec<Quad>,
}

impl FaceBatch {
    pub fn len(&self) -> usize {
        self.quads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quads.is_empty()
    }
}

/// Mesher output: one batch per terrain material.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TerrainBatches {
    pub batches: BTreeMap<TerrainMaterialId, FaceBatch>,
}

impl TerrainBatches {
    pub fn push(&mut self, terrain: TerrainMaterialId, quad: Quad) {
        self.batches.entry(terrain).or_default().quads.push(quad);
    }

    pub fn is_empty(&self) -> bool {
        self.batches.values().all(FaceBatch::is_empty)
    }

    pub fn quad_count(&self) -> usize {
        self.batches.values().map(FaceBatch::len).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (TerrainMaterialId, &FaceBatch)> + '_ {
        self.batches.iter().map(|(k, v)| (*k, v))
    }

    pub fn quads(&self) -> impl Iterator<Item = &Quad> + '_ {
        self.batches.values().flat_map(|b| b.quads.iter())
    }

    pub fn clear(&mut self) {
        self.batches.clear();
    }
}
