//! Error types for the gif-probe tool

use thiserror::Error;

use crate::config::ConfigError;

/// Probe error type
#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("GIF error: {0}")]
    Gif(#[from] gif_parser::Error),

    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("Frame {frame} is {width}x{height}, over the limit of {limit} pixels")]
    FrameTooLarge {
        frame: usize,
        width: usize,
        height: usize,
        limit: usize,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for probe operations
pub type Result<T> = std::result::Result<T, ProbeError>;
