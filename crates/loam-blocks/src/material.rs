use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use super::error::RegistryError;
use super::types::{MaterialId, TerrainMaterialId};

/// Registration options for a face material.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct MaterialOptions {
    /// RGBA, used as vertex color for untextured materials.
    pub color: [f32; 4],
    pub texture: Option<String>,
    pub tex_has_alpha: bool,
    pub atlas_index: Option<u32>,
    /// Name of a custom render material supplied by the renderer.
    pub render_material: Option<String>,
}

impl Default for MaterialOptions {
    fn default() -> Self {
        Self {
            color: [1.0, 1.0, 1.0, 1.0],
            texture: None,
            tex_has_alpha: false,
            atlas_index: None,
            render_material: None,
        }
    }
}

impl MaterialOptions {
    pub fn color(r: f32, g: f32, b: f32) -> Self {
        Self {
            color: [r, g, b, 1.0],
            ..Self::default()
        }
    }

    pub fn texture(path: impl Into<String>, has_alpha: bool) -> Self {
        Self {
            texture: Some(path.into()),
            tex_has_alpha: has_alpha,
            ..Self::default()
        }
    }

    #[inline]
    fn has_alpha(&self) -> bool {
        self.tex_has_alpha || self.color[3] < 1.0
    }
}

#[derive(Clone, Debug)]
pub struct Material {
    pub id: MaterialId,
    pub name: String,
    pub color: [f32; 4],
    pub texture: Option<String>,
    pub tex_has_alpha: bool,
    pub atlas_index: Option<u32>,
    pub render_material: Option<String>,
    pub terrain: TerrainMaterialId,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct TerrainKey {
    texture: Option<String>,
    has_alpha: bool,
    render_material: Option<String>,
}

impl TerrainKey {
    fn flat_color() -> Self {
        Self {
            texture: None,
            has_alpha: false,
            render_material: None,
        }
    }
}

#[derive(Clone, Debug)]
pub struct MaterialCatalog {
    pub materials: Vec<Material>,
    pub by_name: HashMap<String, MaterialId>,
    terrain_keys: HashMap<TerrainKey, TerrainMaterialId>,
}

impl Default for MaterialCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl MaterialCatalog {
    pub fn new() -> Self {
        let mut terrain_keys = HashMap::new();
        terrain_keys.insert(TerrainKey::flat_color(), TerrainMaterialId::FLAT_COLOR);
        // Slot 0 is the "no material" sentinel.
        let sentinel = Material {
            id: MaterialId::NONE,
            name: String::new(),
            color: [0.0; 4],
            texture: None,
            tex_has_alpha: false,
            atlas_index: None,
            render_material: None,
            terrain: TerrainMaterialId::FLAT_COLOR,
        };
        Self {
            materials: vec![sentinel],
            by_name: HashMap::new(),
            terrain_keys,
        }
    }

    /// Registers (or redefines) a named material. Redefinition keeps the id.
    pub fn register(&mut self, name: &str, opts: MaterialOptions) -> MaterialId {
        let key = TerrainKey {
            texture: opts.texture.clone(),
            has_alpha: opts.has_alpha(),
            render_material: opts.render_material.clone(),
        };
        let next_terrain = TerrainMaterialId(self.terrain_keys.len() as u16);
        let terrain = *self.terrain_keys.entry(key).or_insert(next_terrain);
        let id = self
            .by_name
            .get(name)
            .copied()
            .unwrap_or(MaterialId(self.materials.len() as u16));
        let mat = Material {
            id,
            name: name.to_string(),
            color: opts.color,
            texture: opts.texture,
            tex_has_alpha: opts.tex_has_alpha,
            atlas_index: opts.atlas_index,
            render_material: opts.render_material,
            terrain,
        };
        if (id.0 as usize) < self.materials.len() {
            self.materials[id.0 as usize] = mat;
        } else {
            self.materials.push(mat);
            self.by_name.insert(name.to_string(), id);
        }
        id
    }

    pub fn get_id(&self, name: &str) -> Option<MaterialId> {
        self.by_name.get(name).copied()
    }

    pub fn get(&self, id: MaterialId) -> Option<&Material> {
        if id.is_none() {
            return None;
        }
        self.materials.get(id.0 as usize)
    }

    #[inline]
    pub fn terrain_material(&self, id: MaterialId) -> TerrainMaterialId {
        self.materials
            .get(id.0 as usize)
            .map(|m| m.terrain)
            .unwrap_or(TerrainMaterialId::FLAT_COLOR)
    }

    /// Number of distinct terrain-material batch keys.
    pub fn terrain_material_count(&self) -> usize {
        self.terrain_keys.len()
    }

    pub fn len(&self) -> usize {
        self.materials.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn from_toml_str(toml_str: &str) -> Result<Self, RegistryError> {
        let cfg: MaterialsConfig = toml::from_str(toml_str)?;
        Ok(Self::from_config(cfg))
    }

    pub fn from_config(cfg: MaterialsConfig) -> Self {
        let mut catalog = MaterialCatalog::new();
        let mut entries: Vec<(String, MaterialEntry)> = cfg.materials.into_iter().collect();
        // Sorted so MaterialId assignment does not follow HashMap order.
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        for (name, entry) in entries {
            let opts = match entry {
                MaterialEntry::Texture(path) => MaterialOptions::texture(path, false),
                MaterialEntry::Color(rgba) => MaterialOptions {
                    color: rgba,
                    ..MaterialOptions::default()
                },
                MaterialEntry::Detail(opts) => opts,
            };
            catalog.register(&name, opts);
        }
        catalog
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, RegistryError> {
        let s = fs::read_to_string(path)?;
        Self::from_toml_str(&s)
    }
}

// --- Config ---

#[derive(Deserialize, Debug, Default)]
pub struct MaterialsConfig {
    #[serde(default)]
    pub materials: HashMap<String, MaterialEntry>,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(untagged)]
pub enum MaterialEntry {
    // Simple: stone = "assets/blocks/stone.png"
    Texture(String),
    // Flat color: dirt = [0.45, 0.36, 0.22, 1.0]
    Color([f32; 4]),
    // Detailed: water = { color = [...], tex_has_alpha = true }
    Detail(MaterialOptions),
}
