use std::fs;
use std::path::Path;

use loam_world::WorldBounds;
use serde::Deserialize;

use crate::error::EngineError;

/// Streaming and meshing knobs. Every field has a default, so a partial
/// TOML table is enough.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub chunk_size: usize,
    /// `[horizontal, vertical]` radii in chunks.
    pub chunk_add_distance: [i32; 2],
    /// Grown to at least `chunk_add_distance + 1` per axis.
    pub chunk_remove_distance: [i32; 2],
    pub max_processing_per_tick_ms: u64,
    pub max_processing_per_render_ms: u64,
    pub max_chunks_pending_creation: usize,
    pub min_neighbors_to_mesh: usize,
    pub manually_control_chunk_loading: bool,
    pub world_bounds: Option<WorldBounds>,
    pub ambient_occlusion: bool,
    pub reverse_ao: bool,
    pub world_name: String,
    pub remove_scan_per_tick: usize,
    /// Wedge offsets examined per tick; each expands to up to 16 locations.
    pub add_scan_per_tick: usize,
    pub mesh_scan_per_tick: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            chunk_size: 24,
            chunk_add_distance: [2, 2],
            chunk_remove_distance: [3, 3],
            max_processing_per_tick_ms: 9,
            max_processing_per_render_ms: 5,
            max_chunks_pending_creation: 50,
            min_neighbors_to_mesh: 6,
            manually_control_chunk_loading: false,
            world_bounds: None,
            ambient_occlusion: true,
            reverse_ao: true,
            world_name: "default".to_string(),
            remove_scan_per_tick: 100,
            add_scan_per_tick: 40,
            mesh_scan_per_tick: 100,
        }
    }
}

impl EngineConfig {
    pub fn from_toml_str(src: &str) -> Result<Self, EngineError> {
        let cfg: EngineConfig = toml::from_str(src)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, EngineError> {
        Self::from_toml_str(&fs::read_to_string(path)?)
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        if self.chunk_size == 0 {
            return Err(EngineError::Config("chunk_size must be positive".into()));
        }
        if self.chunk_add_distance.iter().any(|&r| r < 0) {
            return Err(EngineError::Config("chunk_add_distance must be non-negative".into()));
        }
        if self.min_neighbors_to_mesh > 26 {
            return Err(EngineError::Config(format!(
                "min_neighbors_to_mesh {} exceeds 26",
                self.min_neighbors_to_mesh
            )));
        }
        if let Some(b) = &self.world_bounds {
            if (0..3).any(|a| b.min[a] > b.max[a]) {
                return Err(EngineError::Config("world_bounds min exceeds max".into()));
            }
        }
        if self.max_chunks_pending_creation == 0 {
            log::warn!(
                target: "stream",
                "max_chunks_pending_creation is 0; no chunk will ever be requested"
            );
        }
        Ok(())
    }
}
