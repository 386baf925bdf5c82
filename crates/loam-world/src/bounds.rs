use serde::{Deserialize, Serialize};

use super::coord::ChunkCoord;

/// Inclusive chunk-index box. Locations outside are never requested.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldBounds {
    pub min: [i32; 3],
    pub max: [i32; 3],
}

impl WorldBounds {
    pub fn new(min: [i32; 3], max: [i32; 3]) -> Self {
        Self { min, max }
    }

    #[inline]
    pub fn contains(&self, c: ChunkCoord) -> bool {
        (self.min[0]..=self.max[0]).contains(&c.cx)
            && (self.min[1]..=self.max[1]).contains(&c.cy)
            && (self.min[2]..=self.max[2]).contains(&c.cz)
    }
}

/// World-space box in voxel units. Bounds may be infinite.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Aabb {
    pub min: [f64; 3],
    pub max: [f64; 3],
}

impl Aabb {
    pub fn new(min: [f64; 3], max: [f64; 3]) -> Self {
        Self { min, max }
    }

    pub fn everything() -> Self {
        Self {
            min: [f64::NEG_INFINITY; 3],
            max: [f64::INFINITY; 3],
        }
    }

    /// Inclusive chunk range covering the box. Infinite bounds map to
    /// `fallback` (typically the range of known chunks).
    pub fn chunk_range(
        &self,
        chunk_size: i32,
        fallback: ([i32; 3], [i32; 3]),
    ) -> ([i32; 3], [i32; 3]) {
        let s = f64::from(chunk_size);
        let mut lo = [0; 3];
        let mut hi = [0; 3];
        for a in 0..3 {
            lo[a] = if self.min[a].is_finite() {
                (self.min[a] / s).floor() as i32
            } else {
                fallback.0[a]
            };
            hi[a] = if self.max[a].is_finite() {
                (self.max[a] / s).floor() as i32
            } else {
                fallback.1[a]
            };
        }
        (lo, hi)
    }
}
