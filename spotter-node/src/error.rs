//! Error types for spotter-node

use spotter_core::settings::SettingsError;
use spotter_core::Error as CoreError;
use spotter_eye::VisionError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum NodeError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Vision error: {0}")]
    Vision(#[from] VisionError),

    #[error("Settings error: {0}")]
    Settings(#[from] SettingsError),

    #[error(transparent)]
    Core(#[from] CoreError),
}

pub type Result<T> = std::result::Result<T, NodeError>;

impl From<NodeError> for CoreError {
    fn from(err: NodeError) -> Self {
        match err {
            NodeError::Core(inner) => inner,
            NodeError::Config(msg) => CoreError::Configuration(msg),
            NodeError::Settings(inner) => inner.into(),
            NodeError::Vision(inner) => inner.into(),
        }
    }
}
