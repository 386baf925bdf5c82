use serde::{Deserialize, Serialize};

pub type BlockId = u16;

/// Block id 0 is always air: not solid, not opaque, no material.
pub const AIR: BlockId = 0;
pub const MAX_BLOCK_ID: BlockId = u16::MAX;

/// Index into the material catalog. `MaterialId::NONE` means "draw nothing".
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MaterialId(pub u16);

impl MaterialId {
    pub const NONE: MaterialId = MaterialId(0);

    #[inline]
    pub fn is_none(self) -> bool {
        self.0 == 0
    }
}

/// Batch key: materials that can share one render mesh collapse to the same id.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TerrainMaterialId(pub u16);

impl TerrainMaterialId {
    /// Shared by every plain-colored opaque material.
    pub const FLAT_COLOR: TerrainMaterialId = TerrainMaterialId(0);
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub enum FaceDir {
    NegX = 0,
    PosX = 1,
    NegY = 2,
    PosY = 3,
    NegZ = 4,
    PosZ = 5,
}

impl FaceDir {
    pub const ALL: [FaceDir; 6] = [
        FaceDir::NegX,
        FaceDir::PosX,
        FaceDir::NegY,
        FaceDir::PosY,
        FaceDir::NegZ,
        FaceDir::PosZ,
    ];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Converts a face index `[0..6)` back into a `FaceDir`.
    /// Falls back to `PosY` for out-of-range indices.
    #[inline]
    pub fn from_index(i: usize) -> FaceDir {
        match i {
            0 => FaceDir::NegX,
            1 => FaceDir::PosX,
            2 => FaceDir::NegY,
            3 => FaceDir::PosY,
            4 => FaceDir::NegZ,
            5 => FaceDir::PosZ,
            _ => FaceDir::PosY,
        }
    }

    #[inline]
    pub fn from_axis(axis: usize, positive: bool) -> FaceDir {
        FaceDir::from_index(axis * 2 + positive as usize)
    }

    /// 0 = x, 1 = y, 2 = z.
    #[inline]
    pub fn axis(self) -> usize {
        self.index() / 2
    }

    #[inline]
    pub fn is_positive(self) -> bool {
        self.index() & 1 == 1
    }

    #[inline]
    pub fn opposite(self) -> FaceDir {
        FaceDir::from_index(self.index() ^ 1)
    }

    /// Integer grid step when leaving the block through this face.
    #[inline]
    pub fn delta(self) -> (i32, i32, i32) {
        match self {
            FaceDir::NegX => (-1, 0, 0),
            FaceDir::PosX => (1, 0, 0),
            FaceDir::NegY => (0, -1, 0),
            FaceDir::PosY => (0, 1, 0),
            FaceDir::NegZ => (0, 0, -1),
            FaceDir::PosZ => (0, 0, 1),
        }
    }

    #[inline]
    pub fn normal(self) -> [f32; 3] {
        let (x, y, z) = self.delta();
        [x as f32, y as f32, z as f32]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn face_dir_axis_and_sign_roundtrip() {
        for dir in FaceDir::ALL {
            assert_eq!(FaceDir::from_axis(dir.axis(), dir.is_positive()), dir);
            assert_eq!(dir.opposite().opposite(), dir);
            assert_ne!(dir.opposite().is_positive(), dir.is_positive());
        }
        assert_eq!(FaceDir::PosY.delta(), (0, 1, 0));
        assert_eq!(FaceDir::from_index(42), FaceDir::PosY);
    }
}
