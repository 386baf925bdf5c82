use serde::Deserialize;

/// Top-level shape of `blocks.toml`.
#[derive(Deserialize, Debug, Clone, Default)]
pub struct BlocksConfig {
    #[serde(default)]
    pub blocks: Vec<BlockDef>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct BlockDef {
    pub name: String,
    /// Explicit id; when absent the next free id is used.
    pub id: Option<u32>,
    pub solid: Option<bool>,
    pub opaque: Option<bool>,
    pub fluid: Option<bool>,
    pub fluid_density: Option<f32>,
    pub viscosity: Option<f32>,
    pub material: Option<MaterialSpec>,
    /// Name of an object mesh; marks the block as an object block.
    pub object_mesh: Option<String>,
}

/// Either a single material name for all faces or a 1/2/3/6 element list.
#[derive(Deserialize, Debug, Clone)]
#[serde(untagged)]
pub enum MaterialSpec {
    One(String),
    Many(Vec<String>),
}

impl MaterialSpec {
    pub fn into_vec(self) -> Vec<String> {
        match self {
            MaterialSpec::One(s) => vec![s],
            MaterialSpec::Many(v) => v,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_single_and_list_materials() {
        let cfg: BlocksConfig = toml::from_str(
            r#"
            [[blocks]]
            name = "stone"
            id = 1
            material = "stone"

            [[blocks]]
            name = "grass"
            material = ["grass_top", "dirt", "grass_side"]

            [[blocks]]
            name = "water"
            opaque = false
            fluid = true
            fluid_density = 1.0
            viscosity = 0.5
            material = "water"
        "#,
        )
        .unwrap();
        assert_eq!(cfg.blocks.len(), 3);
        assert_eq!(cfg.blocks[0].id, Some(1));
        let grass = cfg.blocks[1].material.clone().unwrap().into_vec();
        assert_eq!(grass.len(), 3);
        assert_eq!(cfg.blocks[2].fluid, Some(true));
        assert_eq!(cfg.blocks[2].opaque, Some(false));
    }
}
