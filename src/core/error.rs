use thiserror::Error;

use crate::core::types::{CountryId, CountryPair};

#[derive(Error, Debug)]
pub enum ArchonError {
    #[error("Invalid country id: {0}")]
    InvalidCountry(CountryId),

    #[error("A country cannot have relations with itself: {0}")]
    SelfRelation(CountryId),

    #[error("Already at war: {0}")]
    AlreadyAtWar(CountryPair),

    #[error("Not at war: {0}")]
    NotAtWar(CountryPair),

    #[error("Modifier limit of {limit} reached for {pair}")]
    ModifierLimit { pair: CountryPair, limit: usize },

    #[error("Corrupt save data: {0}")]
    CorruptSave(String),

    #[error("Unsupported save version {found} (expected {expected})")]
    UnsupportedSaveVersion { found: u32, expected: u32 },

    #[error("Unknown command type: {0}")]
    UnknownCommandType(u8),

    #[error("Truncated command: needed {needed} bytes, got {available}")]
    TruncatedCommand { needed: usize, available: usize },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Binary serialization error: {0}")]
    BincodeError(#[from] bincode::Error),

    #[error("Config parse error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ArchonError>;
