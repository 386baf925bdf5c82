use loam_blocks::{AIR, BlockId};

/// Cubic `S×S×S` array of block ids, linearized as `(y*S + z)*S + x`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VoxelBuffer {
    size: usize,
    data: Vec<BlockId>,
}

impl VoxelBuffer {
    /// All-air buffer.
    pub fn new(size: usize) -> Self {
        Self {
            size,
            data: vec![AIR; size * size * size],
        }
    }

    pub fn filled(size: usize, id: BlockId) -> Self {
        Self {
            size,
            data: vec![id; size * size * size],
        }
    }

    /// Wraps existing data, padding with air or truncating to `S³`.
    pub fn from_vec(size: usize, mut data: Vec<BlockId>) -> Self {
        let expect = size * size * size;
        if data.len() != expect {
            data.resize(expect, AIR);
        }
        Self { size, data }
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    #[inline]
    pub fn idx(&self, x: usize, y: usize, z: usize) -> usize {
        (y * self.size + z) * self.size + x
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize, z: usize) -> BlockId {
        self.data[self.idx(x, y, z)]
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, z: usize, id: BlockId) {
        let i = self.idx(x, y, z);
        self.data[i] = id;
    }

    pub fn fill(&mut self, id: BlockId) {
        self.data.fill(id);
    }

    /// Contiguous `S×S` slice for Y-layer `y`, indexed `z*S + x`.
    #[inline]
    pub fn layer(&self, y: usize) -> &[BlockId] {
        let n = self.size * self.size;
        &self.data[y * n..(y + 1) * n]
    }

    /// `Some(id)` when every voxel in layer `y` has the same id.
    pub fn uniform_layer(&self, y: usize) -> Option<BlockId> {
        let layer = self.layer(y);
        let first = *layer.first()?;
        layer.iter().all(|&b| b == first).then_some(first)
    }

    #[inline]
    pub fn as_slice(&self) -> &[BlockId] {
        &self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layers_are_y_major() {
        let mut v = VoxelBuffer::new(4);
        v.set(1, 2, 3, 7);
        assert_eq!(v.layer(2)[3 * 4 + 1], 7);
        assert_eq!(v.uniform_layer(2), None);
        assert_eq!(v.uniform_layer(1), Some(AIR));
    }

    #[test]
    fn from_vec_pads_with_air() {
        let v = VoxelBuffer::from_vec(2, vec![5, 5, 5]);
        assert_eq!(v.as_slice().len(), 8);
        assert_eq!(v.get(0, 0, 0), 5);
        assert_eq!(v.get(1, 1, 1), AIR);
    }
}
