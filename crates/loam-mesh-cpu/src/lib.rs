//! CPU greedy mesher: face culling, ambient occlusion, and quad batching.
#![forbid(unsafe_code)]

pub mod ao;
pub mod batch;
pub mod greedy;
pub mod mesh_build;
pub mod objects;
pub mod view;

pub use ao::{decide_tri_dir, pack_ao_mask, unpack_ao_mask};
pub use batch::{FaceBatch, Quad, TerrainBatches};
pub use greedy::{GreedyMesher, MesherOptions};
pub use mesh_build::{AoShading, CpuMesh, CpuMeshAdapter, MeshBuild, MeshBuildAdapter};
pub use objects::ObjectInstances;
pub use view::{EdgeLookup, NeighborhoodView};
