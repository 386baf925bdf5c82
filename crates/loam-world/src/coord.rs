use std::fmt;

use serde::{Deserialize, Serialize};

/// Chunk-grid coordinate. World origin of the chunk is `(cx*S, cy*S, cz*S)`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChunkCoord {
    pub cx: i32,
    pub cy: i32,
    pub cz: i32,
}

impl ChunkCoord {
    #[inline]
    pub const fn new(cx: i32, cy: i32, cz: i32) -> Self {
        Self { cx, cy, cz }
    }

    #[inline]
    pub fn offset(self, dx: i32, dy: i32, dz: i32) -> Self {
        Self {
            cx: self.cx + dx,
            cy: self.cy + dy,
            cz: self.cz + dz,
        }
    }

    /// Component-wise `self - other`.
    #[inline]
    pub fn delta(self, other: ChunkCoord) -> (i32, i32, i32) {
        (self.cx - other.cx, self.cy - other.cy, self.cz - other.cz)
    }

    #[inline]
    pub fn distance_sq(self, other: ChunkCoord) -> i64 {
        let dx = i64::from(self.cx - other.cx);
        let dy = i64::from(self.cy - other.cy);
        let dz = i64::from(self.cz - other.cz);
        dx * dx + dy * dy + dz * dz
    }

    /// Iterates the 26 surrounding coordinates with their `(di, dj, dk)` offsets.
    pub fn neighbors(self) -> impl Iterator<Item = ((i32, i32, i32), ChunkCoord)> {
        (-1..=1).flat_map(move |di| {
            (-1..=1).flat_map(move |dj| {
                (-1..=1).filter_map(move |dk| {
                    if di == 0 && dj == 0 && dk == 0 {
                        None
                    } else {
                        Some(((di, dj, dk), self.offset(di, dj, dk)))
                    }
                })
            })
        })
    }
}

impl fmt::Display for ChunkCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.cx, self.cy, self.cz)
    }
}

impl From<(i32, i32, i32)> for ChunkCoord {
    fn from(value: (i32, i32, i32)) -> Self {
        Self::new(value.0, value.1, value.2)
    }
}

impl From<ChunkCoord> for (i32, i32, i32) {
    fn from(value: ChunkCoord) -> Self {
        (value.cx, value.cy, value.cz)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn neighbors_cover_26_distinct_coords() {
        let c = ChunkCoord::new(3, -2, 7);
        let all: Vec<_> = c.neighbors().collect();
        assert_eq!(all.len(), 26);
        assert!(all.iter().all(|(_, n)| *n != c && n.distance_sq(c) <= 3));
        let mut uniq: Vec<_> = all.iter().map(|(_, n)| *n).collect();
        uniq.sort();
        uniq.dedup();
        assert_eq!(uniq.len(), 26);
    }
}
