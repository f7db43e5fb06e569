//! Error types for image cube configuration

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CubeError {
    #[error("unknown direction: {0}")]
    UnknownDirection(String),

    #[error("unknown selection policy: {0}")]
    UnknownSelection(String),

    #[error("unknown command: {0}")]
    UnknownCommand(String),

    #[error("invalid settings: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid settings file: {0}")]
    Toml(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, CubeError>;
