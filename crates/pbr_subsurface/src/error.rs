//! Error types for material persistence

use thiserror::Error;

/// Errors raised while saving or restoring material data
#[derive(Error, Debug)]
pub enum MaterialError {
    /// Serialized material text could not be parsed
    #[error("Failed to parse material data: {0}")]
    Parse(String),

    /// Material data could not be serialized
    #[error("Failed to serialize material data: {0}")]
    Serialize(String),

    /// A texture referenced by serialized data could not be resolved
    #[error("Texture '{name}' referenced by '{slot}' could not be resolved")]
    UnresolvedTexture {
        /// Slot the texture was meant for (e.g. `thicknessTexture`)
        slot: &'static str,
        /// Name recorded in the serialized data
        name: String,
    },
}

/// Result alias for material operations
pub type MaterialResult<T> = Result<T, MaterialError>;
