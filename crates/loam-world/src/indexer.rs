use super::coord::ChunkCoord;

/// World → chunk coordinate conversion, chosen once per chunk size.
///
/// Power-of-two sizes use an arithmetic shift and mask; other sizes use
/// euclidean division so the local coordinate stays in `[0, size)` for
/// negative world coordinates as well.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ChunkIndexer {
    Shift { shift: u32, mask: i32 },
    Div { size: i32 },
}

impl ChunkIndexer {
    pub fn new(size: usize) -> Self {
        assert!(size > 0, "chunk size must be positive");
        let size = size as i32;
        if size.count_ones() == 1 {
            ChunkIndexer::Shift {
                shift: size.trailing_zeros(),
                mask: size - 1,
            }
        } else {
            ChunkIndexer::Div { size }
        }
    }

    #[inline]
    pub fn chunk_size(&self) -> i32 {
        match *self {
            ChunkIndexer::Shift { mask, .. } => mask + 1,
            ChunkIndexer::Div { size } => size,
        }
    }

    /// Splits one world axis into `(chunk index, local coordinate)`.
    #[inline]
    pub fn split(&self, w: i32) -> (i32, i32) {
        match *self {
            ChunkIndexer::Shift { shift, mask } => (w >> shift, w & mask),
            ChunkIndexer::Div { size } => (w.div_euclid(size), w.rem_euclid(size)),
        }
    }

    #[inline]
    pub fn world_to_chunk(&self, x: i32, y: i32, z: i32) -> (ChunkCoord, [usize; 3]) {
        let (cx, lx) = self.split(x);
        let (cy, ly) = self.split(y);
        let (cz, lz) = self.split(z);
        (ChunkCoord::new(cx, cy, cz), [lx as usize, ly as usize, lz as usize])
    }

    #[inline]
    pub fn chunk_of(&self, x: i32, y: i32, z: i32) -> ChunkCoord {
        self.world_to_chunk(x, y, z).0
    }

    /// Chunk containing a continuous world position (floored first).
    pub fn chunk_of_f64(&self, pos: [f64; 3]) -> ChunkCoord {
        self.chunk_of(
            pos[0].floor() as i32,
            pos[1].floor() as i32,
            pos[2].floor() as i32,
        )
    }
}
