use loam_blocks::{AIR, BlockOptions, BlockRegistry, BlockRegistryBuilder, MaterialOptions};
use loam_chunk::{Chunk, NoObjects, VoxelBuffer};
use loam_world::ChunkCoord;
use proptest::prelude::*;

fn registry() -> BlockRegistry {
    let mut b = BlockRegistryBuilder::new();
    b.register_material("stone", MaterialOptions::color(0.5, 0.5, 0.5));
    b.register_block(1, BlockOptions::named("stone").material("stone"))
        .unwrap();
    b.register_block(2, BlockOptions::named("glass").material("stone").transparent())
        .unwrap();
    b.build()
}

proptest! {
    // idx maps each (x,y,z) within bounds to unique in-range indices
    #[test]
    fn idx_is_unique_and_in_range(s in 1usize..=8) {
        let buf = VoxelBuffer::new(s);
        let expect = s * s * s;
        let mut seen = vec![false; expect];
        for y in 0..s { for z in 0..s { for x in 0..s {
            let i = buf.idx(x, y, z);
            prop_assert!(i < expect);
            prop_assert!(!seen[i]);
            seen[i] = true;
        }}}
        prop_assert!(seen.into_iter().all(|b| b));
    }

    #[test]
    fn scan_flags_match_content(
        s in 1usize..=6,
        cells in prop::collection::vec(0u16..3, 216),
    ) {
        let reg = registry();
        let data: Vec<u16> = cells.into_iter().take(s * s * s).collect();
        let full = data.iter().all(|&id| reg.is_opaque(id));
        let empty = data.iter().all(|&id| id == AIR);
        let vox = VoxelBuffer::from_vec(s, data.clone());
        let c = Chunk::new(ChunkCoord::new(0, 0, 0), s, vox, None, None, &reg, &mut NoObjects);
        prop_assert_eq!(c.is_full(), full);
        prop_assert_eq!(c.is_empty(), empty);
        prop_assert_eq!(c.terrain_dirty, !empty);
        for y in 0..s {
            let layer = &data[y * s * s..(y + 1) * s * s];
            let uniform = layer.iter().all(|&b| b == layer[0]);
            prop_assert_eq!(c.whole_layer_voxel(y), uniform.then_some(layer[0]));
        }
    }

    #[test]
    fn writes_are_read_back(
        s in 2usize..=6,
        x in 0usize..6,
        y in 0usize..6,
        z in 0usize..6,
        id in 0u16..3,
    ) {
        let reg = registry();
        let (x, y, z) = (x % s, y % s, z % s);
        let (origin, buf) = (ChunkCoord::new(0, 0, 0), VoxelBuffer::new(s));
        let mut c = Chunk::new(origin, s, buf, Some(AIR), None, &reg, &mut NoObjects);
        let out = c.set(x, y, z, id, &reg, &mut NoObjects);
        prop_assert_eq!(out.changed, id != AIR);
        prop_assert_eq!(c.get(x, y, z), id);
        prop_assert_eq!(c.is_empty(), id == AIR);
    }
}
