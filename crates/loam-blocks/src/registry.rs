use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use super::config::BlocksConfig;
use super::error::RegistryError;
use super::handlers::BlockHandlers;
use super::material::{Material, MaterialCatalog, MaterialOptions};
use super::types::{AIR, BlockId, FaceDir, MAX_BLOCK_ID, MaterialId, TerrainMaterialId};

/// Registration options for one block id.
#[derive(Clone, Debug)]
pub struct BlockOptions {
    pub name: String,
    pub solid: bool,
    pub opaque: bool,
    /// Fluid blocks are never solid.
    pub fluid: bool,
    pub fluid_density: f32,
    pub viscosity: f32,
    /// 1, 2, 3 or 6 material names. Empty means the block draws no terrain faces.
    pub material: Vec<String>,
    /// Object blocks are drawn as instances by the object collaborator.
    pub object_mesh: Option<String>,
    pub handlers: BlockHandlers,
}

impl Default for BlockOptions {
    fn default() -> Self {
        Self {
            name: String::new(),
            solid: true,
            opaque: true,
            fluid: false,
            fluid_density: 1.0,
            viscosity: 0.5,
            material: Vec::new(),
            object_mesh: None,
            handlers: BlockHandlers::default(),
        }
    }
}

impl BlockOptions {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn material(mut self, mat: impl Into<String>) -> Self {
        self.material = vec![mat.into()];
        self
    }

    pub fn materials<S: Into<String>>(mut self, mats: impl IntoIterator<Item = S>) -> Self {
        self.material = mats.into_iter().map(Into::into).collect();
        self
    }

    pub fn transparent(mut self) -> Self {
        self.opaque = false;
        self
    }

    pub fn fluid(mut self, density: f32, viscosity: f32) -> Self {
        self.fluid = true;
        self.solid = false;
        self.opaque = false;
        self.fluid_density = density;
        self.viscosity = viscosity;
        self
    }

    pub fn object(mut self, mesh: impl Into<String>) -> Self {
        self.object_mesh = Some(mesh.into());
        self.opaque = false;
        self
    }

    pub fn handlers(mut self, handlers: BlockHandlers) -> Self {
        self.handlers = handlers;
        self
    }
}

#[derive(Clone, Debug)]
struct BlockEntry {
    name: String,
    solid: bool,
    opaque: bool,
    fluid: bool,
    fluid_density: f32,
    viscosity: f32,
    faces: [MaterialId; 6],
    object_mesh: Option<String>,
    handlers: Option<Arc<BlockHandlers>>,
}

impl BlockEntry {
    fn air() -> Self {
        Self {
            name: "air".to_string(),
            solid: false,
            opaque: false,
            fluid: false,
            fluid_density: 1.0,
            viscosity: 0.5,
            faces: [MaterialId::NONE; 6],
            object_mesh: None,
            handlers: None,
        }
    }

    fn placeholder() -> Self {
        Self {
            name: String::new(),
            solid: true,
            opaque: true,
            ..Self::air()
        }
    }
}

/// Expands a 1/2/3/6 material list into per-face ids in `FaceDir` order.
fn expand_face_materials(id: u32, mats: &[MaterialId]) -> Result<[MaterialId; 6], RegistryError> {
    let mut out = [MaterialId::NONE; 6];
    match mats.len() {
        0 => {}
        1 => out = [mats[0]; 6],
        2 => {
            for dir in FaceDir::ALL {
                out[dir.index()] = if dir.axis() == 1 { mats[0] } else { mats[1] };
            }
        }
        3 => {
            for dir in FaceDir::ALL {
                out[dir.index()] = match dir {
                    FaceDir::PosY => mats[0],
                    FaceDir::NegY => mats[1],
                    _ => mats[2],
                };
            }
        }
        6 => out.copy_from_slice(mats),
        count => return Err(RegistryError::BadFaceMaterialCount { id, count }),
    }
    Ok(out)
}

/// Mutable registration phase. `build` freezes it into a [`BlockRegistry`].
#[derive(Clone, Debug)]
pub struct BlockRegistryBuilder {
    materials: MaterialCatalog,
    entries: Vec<BlockEntry>,
    by_name: HashMap<String, BlockId>,
}

impl Default for BlockRegistryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl BlockRegistryBuilder {
    pub fn new() -> Self {
        Self::with_materials(MaterialCatalog::new())
    }

    pub fn with_materials(materials: MaterialCatalog) -> Self {
        let mut by_name = HashMap::new();
        by_name.insert("air".to_string(), AIR);
        Self {
            materials,
            entries: vec![BlockEntry::air()],
            by_name,
        }
    }

    pub fn register_material(&mut self, name: &str, opts: MaterialOptions) -> MaterialId {
        self.materials.register(name, opts)
    }

    /// Highest id registered so far (0 when only air exists).
    pub fn max_block_id(&self) -> BlockId {
        (self.entries.len() - 1) as BlockId
    }

    /// Registers (or overrides) block `id`. Ids between the current maximum
    /// and `id` are filled with solid, opaque placeholders.
    pub fn register_block(
        &mut self,
        id: u32,
        opts: BlockOptions,
    ) -> Result<BlockId, RegistryError> {
        if id == 0 || id > MAX_BLOCK_ID as u32 {
            return Err(RegistryError::BlockIdOutOfRange { id });
        }
        let mut mats = Vec::with_capacity(opts.material.len());
        for name in &opts.material {
            let mid = self
                .materials
                .get_id(name)
                .ok_or_else(|| RegistryError::UnknownMaterial {
                    id,
                    material: name.clone(),
                })?;
            mats.push(mid);
        }
        let faces = expand_face_materials(id, &mats)?;
        let block = id as BlockId;
        if !opts.name.is_empty() {
            if let Some(&prev) = self.by_name.get(&opts.name) {
                if prev != block {
                    return Err(RegistryError::DuplicateName(opts.name));
                }
            }
        }

        while self.entries.len() <= id as usize {
            self.entries.push(BlockEntry::placeholder());
        }
        let old_name = std::mem::take(&mut self.entries[id as usize].name);
        if !old_name.is_empty() {
            self.by_name.remove(&old_name);
        }
        if !opts.name.is_empty() {
            self.by_name.insert(opts.name.clone(), block);
        }
        let handlers = (!opts.handlers.is_empty()).then(|| Arc::new(opts.handlers));
        self.entries[id as usize] = BlockEntry {
            name: opts.name,
            solid: opts.solid && !opts.fluid,
            opaque: opts.opaque,
            fluid: opts.fluid,
            fluid_density: opts.fluid_density,
            viscosity: opts.viscosity,
            faces,
            object_mesh: opts.object_mesh,
            handlers,
        };
        Ok(block)
    }

    pub fn build(self) -> BlockRegistry {
        let n = self.entries.len();
        let mut reg = BlockRegistry {
            materials: self.materials,
            by_name: self.by_name,
            names: Vec::with_capacity(n),
            solidity: Vec::with_capacity(n),
            opacity: Vec::with_capacity(n),
            fluidity: Vec::with_capacity(n),
            fluid_density: Vec::with_capacity(n),
            viscosity: Vec::with_capacity(n),
            is_object: Vec::with_capacity(n),
            object_mesh: Vec::with_capacity(n),
            face_material: Vec::with_capacity(n * 6),
            handlers: Vec::with_capacity(n),
            is_plain: Vec::with_capacity(n),
        };
        for e in self.entries {
            let is_object = e.object_mesh.is_some();
            reg.is_plain
                .push(e.solid && e.opaque && e.handlers.is_none() && !is_object && !e.fluid);
            reg.names.push(e.name);
            reg.solidity.push(e.solid);
            reg.opacity.push(e.opaque);
            reg.fluidity.push(e.fluid);
            reg.fluid_density.push(e.fluid_density);
            reg.viscosity.push(e.viscosity);
            reg.is_object.push(is_object);
            reg.object_mesh.push(e.object_mesh);
            reg.face_material.extend_from_slice(&e.faces);
            reg.handlers.push(e.handlers);
        }
        log::debug!(
            target: "blocks",
            "registry frozen: {} block ids, {} materials, {} terrain materials",
            reg.solidity.len(),
            reg.materials.len(),
            reg.materials.terrain_material_count()
        );
        reg
    }
}

/// Frozen, dense lookup tables indexed by block id. Index 0 is air.
#[derive(Clone, Debug)]
pub struct BlockRegistry {
    pub materials: MaterialCatalog,
    by_name: HashMap<String, BlockId>,
    names: Vec<String>,
    solidity: Vec<bool>,
    opacity: Vec<bool>,
    fluidity: Vec<bool>,
    fluid_density: Vec<f32>,
    viscosity: Vec<f32>,
    is_object: Vec<bool>,
    object_mesh: Vec<Option<String>>,
    face_material: Vec<MaterialId>,
    handlers: Vec<Option<Arc<BlockHandlers>>>,
    is_plain: Vec<bool>,
}

impl Default for BlockRegistry {
    fn default() -> Self {
        BlockRegistryBuilder::new().build()
    }
}

impl BlockRegistry {
    pub fn builder() -> BlockRegistryBuilder {
        BlockRegistryBuilder::new()
    }

    /// Number of id slots, including air and placeholders.
    #[inline]
    pub fn len(&self) -> usize {
        self.solidity.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() <= 1
    }

    #[inline]
    pub fn is_solid(&self, id: BlockId) -> bool {
        self.solidity.get(id as usize).copied().unwrap_or(false)
    }

    #[inline]
    pub fn is_opaque(&self, id: BlockId) -> bool {
        self.opacity.get(id as usize).copied().unwrap_or(false)
    }

    #[inline]
    pub fn is_fluid(&self, id: BlockId) -> bool {
        self.fluidity.get(id as usize).copied().unwrap_or(false)
    }

    #[inline]
    pub fn is_object(&self, id: BlockId) -> bool {
        self.is_object.get(id as usize).copied().unwrap_or(false)
    }

    #[inline]
    pub fn is_plain(&self, id: BlockId) -> bool {
        self.is_plain.get(id as usize).copied().unwrap_or(false)
    }

    pub fn fluid_density(&self, id: BlockId) -> f32 {
        self.fluid_density.get(id as usize).copied().unwrap_or(1.0)
    }

    pub fn viscosity(&self, id: BlockId) -> f32 {
        self.viscosity.get(id as usize).copied().unwrap_or(0.5)
    }

    #[inline]
    pub fn face_material(&self, id: BlockId, dir: FaceDir) -> MaterialId {
        self.face_material
            .get(id as usize * 6 + dir.index())
            .copied()
            .unwrap_or(MaterialId::NONE)
    }

    #[inline]
    pub fn handlers(&self, id: BlockId) -> Option<&Arc<BlockHandlers>> {
        self.handlers.get(id as usize).and_then(|h| h.as_ref())
    }

    #[inline]
    pub fn has_handlers(&self, id: BlockId) -> bool {
        self.handlers(id).is_some()
    }

    pub fn object_mesh(&self, id: BlockId) -> Option<&str> {
        self.object_mesh.get(id as usize).and_then(|m| m.as_deref())
    }

    pub fn name(&self, id: BlockId) -> Option<&str> {
        self.names
            .get(id as usize)
            .map(String::as_str)
            .filter(|n| !n.is_empty())
    }

    pub fn block_id_by_name(&self, name: &str) -> Option<BlockId> {
        self.by_name.get(name).copied()
    }

    pub fn material_id_by_name(&self, name: &str) -> Option<MaterialId> {
        self.materials.get_id(name)
    }

    pub fn material(&self, mat: MaterialId) -> Option<&Material> {
        self.materials.get(mat)
    }

    #[inline]
    pub fn terrain_material(&self, mat: MaterialId) -> TerrainMaterialId {
        self.materials.terrain_material(mat)
    }

    pub fn load_from_paths(
        materials_path: impl AsRef<Path>,
        blocks_path: impl AsRef<Path>,
    ) -> Result<Self, RegistryError> {
        let materials = MaterialCatalog::from_path(materials_path)?;
        let blocks_toml = fs::read_to_string(blocks_path)?;
        let blocks_cfg: BlocksConfig = toml::from_str(&blocks_toml)?;
        Self::from_configs(materials, blocks_cfg)
    }

    pub fn from_configs(
        materials: MaterialCatalog,
        cfg: BlocksConfig,
    ) -> Result<Self, RegistryError> {
        let mut builder = BlockRegistryBuilder::with_materials(materials);
        for def in cfg.blocks {
            let id = def.id.unwrap_or(builder.max_block_id() as u32 + 1);
            let defaults = BlockOptions::default();
            let fluid = def.fluid.unwrap_or(false);
            let opts = BlockOptions {
                name: def.name,
                solid: def.solid.unwrap_or(!fluid),
                opaque: def.opaque.unwrap_or(!fluid && def.object_mesh.is_none()),
                fluid,
                fluid_density: def.fluid_density.unwrap_or(defaults.fluid_density),
                viscosity: def.viscosity.unwrap_or(defaults.viscosity),
                material: def.material.map(|m| m.into_vec()).unwrap_or_default(),
                object_mesh: def.object_mesh,
                handlers: BlockHandlers::default(),
            };
            builder.register_block(id, opts)?;
        }
        Ok(builder.build())
    }

    /// Small built-in palette used when no config files are supplied.
    pub fn with_defaults() -> Self {
        let mut b = BlockRegistryBuilder::new();
        b.register_material("dirt", MaterialOptions::color(0.45, 0.36, 0.22));
        b.register_material("grass_top", MaterialOptions::color(0.22, 0.62, 0.20));
        b.register_material("stone", MaterialOptions::color(0.50, 0.50, 0.52));
        b.register_material("sand", MaterialOptions::color(0.86, 0.80, 0.55));
        b.register_material(
            "water",
            MaterialOptions {
                color: [0.20, 0.35, 0.90, 0.6],
                ..MaterialOptions::default()
            },
        );
        b.register_material("glass", MaterialOptions::texture("glass.png", true));
        let defs = [
            (1, BlockOptions::named("dirt").material("dirt")),
            (2, BlockOptions::named("grass").materials(["grass_top", "dirt", "dirt"])),
            (3, BlockOptions::named("stone").material("stone")),
            (4, BlockOptions::named("sand").material("sand")),
            (5, BlockOptions::named("water").material("water").fluid(1.0, 0.5)),
            (6, BlockOptions::named("glass").material("glass").transparent()),
        ];
        for (id, opts) in defs {
            // Static palette: every material above is registered.
            if let Err(e) = b.register_block(id, opts) {
                log::error!(target: "blocks", "default palette: {e}");
            }
        }
        b.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn builder_with_stone() -> BlockRegistryBuilder {
        let mut b = BlockRegistryBuilder::new();
        b.register_material("stone", MaterialOptions::color(0.5, 0.5, 0.5));
        b
    }

    #[test]
    fn rejects_out_of_range_ids() {
        let mut b = builder_with_stone();
        assert!(matches!(
            b.register_block(0, BlockOptions::named("x")),
            Err(RegistryError::BlockIdOutOfRange { id: 0 })
        ));
        assert!(matches!(
            b.register_block(70_000, BlockOptions::named("x")),
            Err(RegistryError::BlockIdOutOfRange { id: 70_000 })
        ));
    }

    #[test]
    fn rejects_bad_material_count() {
        let mut b = builder_with_stone();
        let opts = BlockOptions::named("odd").materials(["stone", "stone", "stone", "stone"]);
        assert!(matches!(
            b.register_block(1, opts),
            Err(RegistryError::BadFaceMaterialCount { id: 1, count: 4 })
        ));
    }

    #[test]
    fn gap_ids_are_solid_opaque_placeholders() {
        let mut b = builder_with_stone();
        b.register_block(5, BlockOptions::named("stone").material("stone"))
            .unwrap();
        let reg = b.build();
        assert_eq!(reg.len(), 6);
        for id in 1..5 {
            assert!(reg.is_solid(id));
            assert!(reg.is_opaque(id));
            assert!(reg.face_material(id, FaceDir::PosY).is_none());
        }
        assert!(!reg.is_solid(AIR));
        assert!(!reg.is_opaque(AIR));
    }

    #[test]
    fn three_materials_map_top_bottom_sides() {
        let mut b = BlockRegistryBuilder::new();
        let top = b.register_material("top", MaterialOptions::color(0.0, 1.0, 0.0));
        let bottom = b.register_material("bottom", MaterialOptions::color(0.3, 0.2, 0.1));
        let side = b.register_material("side", MaterialOptions::color(0.2, 0.5, 0.1));
        b.register_block(1, BlockOptions::named("grass").materials(["top", "bottom", "side"]))
            .unwrap();
        let reg = b.build();
        assert_eq!(reg.face_material(1, FaceDir::PosY), top);
        assert_eq!(reg.face_material(1, FaceDir::NegY), bottom);
        for dir in [FaceDir::NegX, FaceDir::PosX, FaceDir::NegZ, FaceDir::PosZ] {
            assert_eq!(reg.face_material(1, dir), side);
        }
    }

    #[test]
    fn two_materials_map_vertical_and_sides() {
        let mut b = BlockRegistryBuilder::new();
        let ends = b.register_material("ends", MaterialOptions::color(1.0, 0.0, 0.0));
        let sides = b.register_material("sides", MaterialOptions::color(0.0, 0.0, 1.0));
        b.register_block(2, BlockOptions::named("log").materials(["ends", "sides"]))
            .unwrap();
        let reg = b.build();
        assert_eq!(reg.face_material(2, FaceDir::PosY), ends);
        assert_eq!(reg.face_material(2, FaceDir::NegY), ends);
        assert_eq!(reg.face_material(2, FaceDir::PosX), sides);
        assert_eq!(reg.face_material(2, FaceDir::NegZ), sides);
    }

    #[test]
    fn plain_excludes_handlers_objects_and_fluids() {
        let mut b = builder_with_stone();
        b.register_block(1, BlockOptions::named("stone").material("stone"))
            .unwrap();
        b.register_block(
            2,
            BlockOptions::named("torch").handlers(BlockHandlers::new().on_load(|_, _, _| {})),
        )
        .unwrap();
        b.register_block(3, BlockOptions::named("flower").object("flower"))
            .unwrap();
        b.register_block(4, BlockOptions::named("water").fluid(1.0, 0.5))
            .unwrap();
        let reg = b.build();
        assert!(reg.is_plain(1));
        assert!(!reg.is_plain(2));
        assert!(!reg.is_plain(3));
        assert!(reg.is_object(3));
        assert!(!reg.is_plain(4));
        assert!(!reg.is_solid(4));
        assert!(reg.is_fluid(4));
        assert!(reg.handlers(2).is_some());
        assert!(reg.handlers(1).is_none());
    }

    #[test]
    fn unknown_material_and_duplicate_names_are_errors() {
        let mut b = builder_with_stone();
        assert!(matches!(
            b.register_block(1, BlockOptions::named("x").material("nope")),
            Err(RegistryError::UnknownMaterial { .. })
        ));
        b.register_block(1, BlockOptions::named("stone").material("stone"))
            .unwrap();
        assert!(matches!(
            b.register_block(2, BlockOptions::named("stone")),
            Err(RegistryError::DuplicateName(_))
        ));
        // Overriding the same id under the same name is fine.
        b.register_block(1, BlockOptions::named("stone")).unwrap();
    }

    #[test]
    fn defaults_palette_resolves_names() {
        let reg = BlockRegistry::with_defaults();
        let water = reg.block_id_by_name("water").unwrap();
        assert!(reg.is_fluid(water));
        assert!(!reg.is_opaque(water));
        let grass = reg.block_id_by_name("grass").unwrap();
        assert_eq!(
            reg.face_material(grass, FaceDir::PosY),
            reg.material_id_by_name("grass_top").unwrap()
        );
        assert_eq!(reg.block_id_by_name("air"), Some(AIR));
    }
}
