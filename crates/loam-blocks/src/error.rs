use thiserror::Error;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("block id {id} out of range (expected 1..={max})", max = crate::MAX_BLOCK_ID)]
    BlockIdOutOfRange { id: u32 },
    #[error("block {id}: face material list must have 1, 2, 3 or 6 entries, got {count}")]
    BadFaceMaterialCount { id: u32, count: usize },
    #[error("block {id}: unknown material `{material}`")]
    UnknownMaterial { id: u32, material: String },
    #[error("duplicate block name `{0}`")]
    DuplicateName(String),
    #[error("failed to read registry config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse registry config: {0}")]
    Toml(#[from] toml::de::Error),
}
