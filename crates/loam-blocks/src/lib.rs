//! Block, material, and registry crate.
#![forbid(unsafe_code)]

pub mod config;
pub mod error;
pub mod handlers;
pub mod material;
pub mod registry;
pub mod types;

pub use error::RegistryError;
pub use handlers::{BlockHandlers, HandlerFn};
pub use material::{Material, MaterialCatalog, MaterialOptions};
pub use registry::{BlockOptions, BlockRegistry, BlockRegistryBuilder};
pub use types::{AIR, BlockId, FaceDir, MAX_BLOCK_ID, MaterialId, TerrainMaterialId};
