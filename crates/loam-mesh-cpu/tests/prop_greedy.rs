use loam_blocks::{BlockRegistry, FaceDir};
use loam_chunk::{NEIGHBOR_SLOTS, SELF_SLOT, VoxelBuffer};
use loam_mesh_cpu::{GreedyMesher, MesherOptions, pack_ao_mask, unpack_ao_mask};
use proptest::prelude::*;

const NO_REVERSE: MesherOptions = MesherOptions {
    ambient_occlusion: true,
    reverse_ao: false,
};

fn alone(buf: &VoxelBuffer) -> [Option<&VoxelBuffer>; NEIGHBOR_SLOTS] {
    let mut hood = [None; NEIGHBOR_SLOTS];
    hood[SELF_SLOT] = Some(buf);
    hood
}

#[test]
fn floating_slab_meshes_to_six_quads() {
    let reg = BlockRegistry::with_defaults();
    let stone = reg.block_id_by_name("stone").unwrap();
    let mut buf = VoxelBuffer::new(16);
    for z in 2..=13 {
        for x in 2..=13 {
            buf.set(x, 4, z, stone);
        }
    }
    let out = GreedyMesher::new(16, NO_REVERSE).mesh(&alone(&buf), |_| None, &reg);
    assert_eq!(out.quad_count(), 6);
    for dir in FaceDir::ALL {
        let faces: Vec<_> = out.quads().filter(|q| q.dir == dir).collect();
        assert_eq!(faces.len(), 1, "{dir:?}");
        let want = if dir.axis() == 1 { 144 } else { 12 };
        assert_eq!(faces[0].area(), want, "{dir:?}");
    }
    let top = out.quads().find(|q| q.dir == FaceDir::PosY).unwrap();
    assert_eq!(top.base, [2, 5, 2]);
    assert_eq!(top.ao_corners(), [1, 1, 1, 1]);
}

#[test]
fn uniform_layer_hints_skip_interior_planes() {
    let reg = BlockRegistry::with_defaults();
    let dirt = reg.block_id_by_name("dirt").unwrap();
    let mut buf = VoxelBuffer::new(8);
    for z in 0..8 {
        for x in 0..8 {
            for y in 0..3 {
                buf.set(x, y, z, dirt);
            }
        }
    }
    let hint = |y: i32| match y {
        -1..=2 => Some(dirt),
        3..=7 => Some(0),
        _ => None,
    };
    let hinted = GreedyMesher::new(8, NO_REVERSE).mesh(&alone(&buf), hint, &reg);
    let plain = GreedyMesher::new(8, NO_REVERSE).mesh(&alone(&buf), |_| None, &reg);
    assert_eq!(hinted, plain);
    assert_eq!(hinted.quad_count(), 1);
}

proptest! {
    #[test]
    fn ao_mask_round_trips(a00 in 0u8..4, a01 in 0u8..4, a10 in 0u8..4, a11 in 0u8..4) {
        prop_assert_eq!(unpack_ao_mask(pack_ao_mask(a00, a01, a10, a11)), [a00, a01, a10, a11]);
    }

    // Merging never changes the drawn area: it equals the number of
    // air/stone contacts inside the chunk.
    #[test]
    fn quad_area_matches_exposed_faces(
        cells in proptest::collection::vec(any::<bool>(), 6 * 6 * 6),
    ) {
        const S: usize = 6;
        let reg = BlockRegistry::with_defaults();
        let stone = reg.block_id_by_name("stone").unwrap();
        let mut buf = VoxelBuffer::new(S);
        for (i, &on) in cells.iter().enumerate() {
            if on {
                buf.set(i % S, i / (S * S), (i / S) % S, stone);
            }
        }
        let mut want = 0u32;
        for y in 0..S {
            for z in 0..S {
                for x in 0..S {
                    let here = buf.get(x, y, z);
                    if x + 1 < S && buf.get(x + 1, y, z) != here { want += 1; }
                    if y + 1 < S && buf.get(x, y + 1, z) != here { want += 1; }
                    if z + 1 < S && buf.get(x, y, z + 1) != here { want += 1; }
                }
            }
        }
        let opts = MesherOptions { ambient_occlusion: false, reverse_ao: false };
        let out = GreedyMesher::new(S, opts).mesh(&alone(&buf), |_| None, &reg);
        let area: u32 = out.quads().map(|q| q.area()).sum();
        prop_assert_eq!(area, want);
    }
}
