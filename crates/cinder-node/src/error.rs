//! Node-level errors

use cinder_core::error::CinderError;
use thiserror::Error;

pub type NodeResult<T> = std::result::Result<T, NodeError>;

#[derive(Debug, Error)]
pub enum NodeError {
    /// A core operation failed; state and journal are unchanged
    #[error(transparent)]
    Core(#[from] CinderError),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML render error: {0}")]
    TomlRender(#[from] toml::ser::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Snapshot error: {0}")]
    Snapshot(#[from] bincode::Error),

    #[error("Logging setup failed: {0}")]
    Logging(String),
}

impl NodeError {
    /// The core error behind this failure, if any
    pub fn as_core(&self) -> Option<&CinderError> {
        match self {
            Self::Core(e) => Some(e),
            _ => None,
        }
    }

    /// Whether the failure is a rejected request rather than a fault
    pub fn is_rejection(&self) -> bool {
        self.as_core().map(|e| !e.is_fatal()).unwrap_or(false)
    }
}
