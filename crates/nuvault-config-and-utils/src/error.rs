//! Core error types.

use thiserror::Error;

/// Failures while loading configuration or touching the `~/.nuvault` tree.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Config value present but unusable
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("I/O failure: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed API URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Config file is not valid JSON
    #[error("Config JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Cannot resolve path: {0}")]
    Path(String),
}

/// Shorthand for results carrying [`CoreError`].
pub type CoreResult<T> = Result<T, CoreError>;
