use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

use loam_blocks::BlockRegistry;
use loam_runtime::EngineConfig;
use serde::Deserialize;

use crate::terrain::TerrainParams;

/// Shape of the demo's `loam.toml`.
#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct DemoConfig {
    pub engine: EngineConfig,
    pub terrain: TerrainParams,
    /// Material and block definitions, relative to the config file. The
    /// built-in palette is used when either is missing.
    pub materials: Option<PathBuf>,
    pub blocks: Option<PathBuf>,
}

impl DemoConfig {
    pub fn load(path: &Path) -> Result<Self, Box<dyn Error>> {
        let src = fs::read_to_string(path)?;
        let mut cfg: DemoConfig = toml::from_str(&src)?;
        cfg.engine.validate()?;
        let base = path.parent().unwrap_or(Path::new("."));
        cfg.materials = cfg.materials.map(|p| base.join(p));
        cfg.blocks = cfg.blocks.map(|p| base.join(p));
        Ok(cfg)
    }

    pub fn registry(&self) -> Result<BlockRegistry, Box<dyn Error>> {
        match (&self.materials, &self.blocks) {
            (Some(m), Some(b)) => Ok(BlockRegistry::load_from_paths(m, b)?),
            _ => {
                log::info!("no block definitions configured; using the built-in palette");
                Ok(BlockRegistry::with_defaults())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_tables_fall_back_to_defaults() {
        let cfg: DemoConfig = toml::from_str(
            r#"
            [engine]
            chunk_size = 16
            world_name = "hills"

            [terrain]
            seed = 42
        "#,
        )
        .unwrap();
        assert_eq!(cfg.engine.chunk_size, 16);
        assert_eq!(cfg.engine.chunk_add_distance, [2, 2]);
        assert_eq!(cfg.terrain.seed, 42);
        assert_eq!(cfg.terrain.base_height, TerrainParams::default().base_height);
        assert!(cfg.registry().unwrap().block_id_by_name("stone").is_some());
    }

    #[test]
    fn shipped_config_loads() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("assets/voxels/loam.toml");
        let cfg = DemoConfig::load(&path).unwrap();
        assert_eq!(cfg.engine.world_name, "hills");
        let reg = cfg.registry().unwrap();
        let flower = reg.block_id_by_name("flower").unwrap();
        assert!(reg.is_object(flower));
        assert!(!reg.is_opaque(flower));
        let water = reg.block_id_by_name("water").unwrap();
        assert!(reg.is_fluid(water) && !reg.is_solid(water));
    }
}
