use std::sync::Arc;

use loam_blocks::{AIR, BlockRegistry};
use loam_chunk::NoObjects;
use loam_mesh_cpu::CpuMeshAdapter;
use loam_runtime::{EngineConfig, StreamingEngine, WorldEvent};
use loam_world::{ChunkCoord, WorldBounds};
use proptest::prelude::*;

fn run_to_completion(cfg: EngineConfig) -> StreamingEngine {
    let reg = Arc::new(BlockRegistry::with_defaults());
    let mut e: StreamingEngine =
        StreamingEngine::new(cfg, reg.clone(), CpuMeshAdapter::new(reg), NoObjects).unwrap();
    for _ in 0..500 {
        e.tick();
        let needed: Vec<_> = e
            .drain_events()
            .filter_map(|ev| match ev {
                WorldEvent::ChunkDataNeeded {
                    request_id, voxels, ..
                } => Some((request_id, voxels)),
                _ => None,
            })
            .collect();
        for (id, voxels) in needed {
            e.set_chunk_data(&id.to_string(), voxels, None, Some(AIR)).unwrap();
        }
        if e.initial_load_complete() {
            return e;
        }
    }
    panic!("no convergence: {:?}", e.stats());
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    // After the initial load, exactly the add ellipsoid is loaded.
    #[test]
    fn loaded_set_is_the_add_ellipsoid(h in 0i32..4, v in 0i32..3) {
        let e = run_to_completion(EngineConfig {
            chunk_size: 4,
            chunk_add_distance: [h, v],
            max_processing_per_tick_ms: 1000,
            ..EngineConfig::default()
        });
        let add = e.add_distance();
        let mut want = 0;
        for x in -h..=h {
            for y in -v..=v {
                for z in -h..=h {
                    if add.contains(x, y, z) {
                        want += 1;
                        prop_assert!(e.chunk_at(ChunkCoord::new(x, y, z)).is_some());
                    }
                }
            }
        }
        prop_assert_eq!(e.stats().chunks_loaded, want);
        prop_assert_eq!(e.stats().known, want);
    }

    #[test]
    fn nothing_loads_outside_world_bounds(lo in -2i32..=0, hi in 0i32..=2) {
        let bounds = WorldBounds::new([lo, 0, lo], [hi, 0, hi]);
        let e = run_to_completion(EngineConfig {
            chunk_size: 4,
            chunk_add_distance: [2, 2],
            max_processing_per_tick_ms: 1000,
            world_bounds: Some(bounds),
            ..EngineConfig::default()
        });
        for c in e.known_chunks() {
            prop_assert!(bounds.contains(c), "{} outside bounds", c);
        }
        prop_assert!(e.chunk_at(ChunkCoord::new(0, 0, 0)).is_some());
    }
}
