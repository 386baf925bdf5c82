use std::sync::{Arc, RwLock};

use fastnoise_lite::{FastNoiseLite, NoiseType};
use loam_blocks::{AIR, BlockId, BlockRegistry};
use loam_chunk::VoxelBuffer;
use loam_runtime::{GenerateError, GeneratedChunk};
use loam_world::ChunkCoord;
use serde::Deserialize;

/// Heightmap parameters for the demo terrain.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct TerrainParams {
    pub seed: i32,
    pub frequency: f32,
    pub base_height: i32,
    pub amplitude: f32,
    pub sea_level: i32,
    pub dirt_depth: i32,
}

impl Default for TerrainParams {
    fn default() -> Self {
        Self {
            seed: 1337,
            frequency: 0.02,
            base_height: 8,
            amplitude: 12.0,
            sea_level: 4,
            dirt_depth: 3,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Palette {
    stone: BlockId,
    dirt: BlockId,
    grass: BlockId,
    sand: BlockId,
    water: BlockId,
}

impl Palette {
    fn from_registry(reg: &BlockRegistry) -> Self {
        let pick = |name: &str, fallback: BlockId| {
            reg.block_id_by_name(name).unwrap_or_else(|| {
                log::warn!("block `{}` not registered; using id {}", name, fallback);
                fallback
            })
        };
        let stone = pick("stone", AIR);
        Self {
            stone,
            dirt: pick("dirt", stone),
            grass: pick("grass", stone),
            sand: pick("sand", stone),
            water: pick("water", AIR),
        }
    }
}

/// Noise heightmap generator shared with the worker pool. Parameters can be
/// swapped at runtime; the caller switches the engine's world name so
/// chunks built from the old parameters are discarded.
#[derive(Clone)]
pub struct HeightmapTerrain {
    params: Arc<RwLock<TerrainParams>>,
    palette: Palette,
}

impl HeightmapTerrain {
    pub fn new(params: TerrainParams, reg: &BlockRegistry) -> Self {
        Self {
            params: Arc::new(RwLock::new(params)),
            palette: Palette::from_registry(reg),
        }
    }

    /// Installs `params`, returning whether they differ from the current
    /// ones.
    pub fn replace_params(&self, params: TerrainParams) -> bool {
        let mut current = match self.params.write() {
            Ok(p) => p,
            Err(poisoned) => poisoned.into_inner(),
        };
        if *current == params {
            return false;
        }
        *current = params;
        true
    }

    pub fn params(&self) -> Result<TerrainParams, GenerateError> {
        self.params
            .read()
            .map(|p| p.clone())
            .map_err(|e| format!("terrain params lock poisoned: {e}").into())
    }

    /// Builds the voxels of chunk `c`. Chunks entirely above the terrain
    /// and the sea resolve to `None` (air); chunks entirely below the
    /// lowest possible surface come back as a uniform stone fill.
    pub fn generate(
        &self,
        c: ChunkCoord,
        size: usize,
    ) -> Result<Option<GeneratedChunk>, GenerateError> {
        let p = self.params()?;
        let s = size as i32;
        let y0 = c.cy * s;
        let lowest = p.base_height - p.amplitude.abs().ceil() as i32;
        let highest = p.base_height + p.amplitude.abs().ceil() as i32;
        if y0 > highest.max(p.sea_level) {
            return Ok(None);
        }
        if y0 + s - 1 < lowest - p.dirt_depth {
            return Ok(Some(GeneratedChunk::filled(size, self.palette.stone)));
        }

        let mut noise = FastNoiseLite::with_seed(p.seed);
        noise.set_noise_type(Some(NoiseType::OpenSimplex2));
        noise.set_frequency(Some(p.frequency));

        let mut voxels = VoxelBuffer::new(size);
        let (x0, z0) = (c.cx * s, c.cz * s);
        for z in 0..size {
            for x in 0..size {
                let n = noise.get_noise_2d((x0 + x as i32) as f32, (z0 + z as i32) as f32);
                let height = p.base_height + (n * p.amplitude) as i32;
                for y in 0..size {
                    let wy = y0 + y as i32;
                    let id = self.column_block(&p, wy, height);
                    if id != AIR {
                        voxels.set(x, y, z, id);
                    }
                }
            }
        }
        Ok(Some(GeneratedChunk::new(voxels)))
    }

    fn column_block(&self, p: &TerrainParams, wy: i32, height: i32) -> BlockId {
        let pal = &self.palette;
        if wy > height {
            return if wy <= p.sea_level { pal.water } else { AIR };
        }
        if wy == height {
            // Beaches where the surface meets the water line.
            return if height <= p.sea_level + 1 { pal.sand } else { pal.grass };
        }
        if wy + p.dirt_depth >= height { pal.dirt } else { pal.stone }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn terrain() -> HeightmapTerrain {
        HeightmapTerrain::new(TerrainParams::default(), &BlockRegistry::with_defaults())
    }

    #[test]
    fn high_chunks_are_air() {
        let t = terrain();
        assert!(t.generate(ChunkCoord::new(0, 10, 0), 8).unwrap().is_none());
    }

    #[test]
    fn deep_chunks_use_a_stone_fill() {
        let t = terrain();
        let chunk = t.generate(ChunkCoord::new(3, -10, 3), 8).unwrap().unwrap();
        assert_eq!(chunk.fill, Some(3));
    }

    #[test]
    fn surface_chunk_has_grass_or_sand_on_top_of_columns() {
        let reg = BlockRegistry::with_defaults();
        let t = HeightmapTerrain::new(
            TerrainParams {
                amplitude: 0.0,
                base_height: 10,
                sea_level: 0,
                ..TerrainParams::default()
            },
            &reg,
        );
        let chunk = t.generate(ChunkCoord::new(0, 0, 0), 16).unwrap().unwrap();
        let v = &chunk.voxels;
        assert_eq!(v.get(3, 10, 3), 2);
        assert_eq!(v.get(3, 9, 3), 1);
        assert_eq!(v.get(3, 2, 3), 3);
        assert_eq!(v.get(3, 11, 3), AIR);
    }

    #[test]
    fn replaced_params_take_effect_only_when_different() {
        let t = terrain();
        let mut p = t.params().unwrap();
        assert!(!t.replace_params(p.clone()));
        p.seed = 7;
        assert!(t.replace_params(p.clone()));
        assert_eq!(t.params().unwrap(), p);
        assert!(!t.replace_params(p));
    }
}
