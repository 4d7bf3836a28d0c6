use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum HamletError {
    // Config-related errors
    #[error("Failed to get config directory")]
    ConfigDirNotFound,

    #[error("Failed to create config directory: {0}")]
    ConfigDirCreationFailed(#[from] std::io::Error),

    #[error("Failed to serialize config: {0}")]
    SerializationFailed(#[from] toml::ser::Error),

    #[error("Failed to deserialize config: {0}")]
    DeserializationFailed(#[from] toml::de::Error),

    // Village data errors
    #[error("Invalid village data: {reason}")]
    InvalidVillageData { reason: String },

    #[error("Village file not found at path: {path}")]
    VillageFileNotFound { path: PathBuf },

    #[error("Corrupted village file: {reason}")]
    CorruptedVillageFile { reason: String },

    #[error("Village validation failed: {reason}")]
    VillageValidationFailed { reason: String },

    // Generation errors
    #[error("Invalid generation config: {reason}")]
    InvalidGenerationConfig { reason: String },
}

/// Result type alias for all operations
pub type HamletResult<T> = Result<T, HamletError>;
