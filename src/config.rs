//! Configuration for gif-probe
//!
//! Precedence: CLI > env > file > defaults. The merged configuration is
//! validated once, after every layer has been applied.

use clap::Parser;
use gif_parser::ReaderOptions;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::frames::DEFAULT_MAX_FRAME_PIXELS;

/// Largest chunk the probe feeds to the parser at once
pub const MAX_CHUNK_SIZE: usize = 16 * 1024 * 1024;

/// CLI arguments for gif-probe
#[derive(Parser, Debug, Clone)]
#[command(name = "gif-probe")]
#[command(version)]
#[command(about = "Inspect GIF streams with the incremental parser", long_about = None)]
pub struct CliArgs {
    /// GIF file to inspect
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Path to custom config file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Bytes fed to the parser per call
    #[arg(long, value_name = "BYTES")]
    pub chunk_size: Option<usize>,

    /// Output format (text, json)
    #[arg(short, long, value_name = "FORMAT")]
    pub format: Option<String>,

    /// Decode every frame and report the outcome
    #[arg(short, long)]
    pub decode: bool,

    /// Treat unknown bytes between blocks as an error
    #[arg(long)]
    pub strict: bool,

    /// Reject streams with more frames than this
    #[arg(long, value_name = "COUNT")]
    pub max_frames: Option<usize>,

    /// Largest frame, in pixels, that --decode will materialize
    #[arg(long, value_name = "PIXELS")]
    pub max_frame_pixels: Option<usize>,

    /// Do not flag the first frame for progressive display
    #[arg(long)]
    pub no_progressive: bool,
}

/// Report output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_name(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "text" | "txt" => Some(OutputFormat::Text),
            "json" => Some(OutputFormat::Json),
            _ => None,
        }
    }
}

/// Probe configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbeConfig {
    /// Bytes fed to the parser per `parse` call
    pub chunk_size: usize,
    pub format: OutputFormat,
    /// Decode every frame after parsing
    pub decode_frames: bool,
    /// Largest frame buffer a decode may allocate, in pixels
    pub max_frame_pixels: usize,
    pub reader: ReaderOptions,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            chunk_size: 4096,
            format: OutputFormat::Text,
            decode_frames: false,
            max_frame_pixels: DEFAULT_MAX_FRAME_PIXELS,
            reader: ReaderOptions::default(),
        }
    }
}

/// Configuration error with context
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError {
    pub message: String,
    pub field: Option<String>,
}

impl ConfigError {
    fn field(field: &str, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            field: Some(field.to_string()),
        }
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(field) = &self.field {
            write!(f, "Config error in '{}': {}", field, self.message)
        } else {
            write!(f, "Config error: {}", self.message)
        }
    }
}

impl std::error::Error for ConfigError {}

impl ProbeConfig {
    /// Load configuration with full precedence:
    /// CLI args > environment variables > config file > defaults
    pub fn load_with_args(args: &CliArgs) -> Result<Self, ConfigError> {
        let mut config = ProbeConfig::default();

        let config_path = args.config.clone().or_else(Self::default_config_path);
        if let Some(path) = &config_path {
            if path.exists() {
                match Self::load_from_file(path) {
                    Ok(file_config) => config = file_config,
                    Err(e) => {
                        log::warn!("Failed to load config from {:?}: {}", path, e);
                    }
                }
            }
        }

        config.apply_env(|key| env::var(key).ok());
        config.apply_cli_args(args);
        config.validate()?;

        Ok(config)
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError {
            message: format!("Failed to read config file: {}", e),
            field: None,
        })?;

        toml::from_str(&content).map_err(|e| ConfigError {
            message: format!("Failed to parse config file: {}", e),
            field: None,
        })
    }

    /// Apply `GIF_PROBE_*` variables resolved through `lookup`
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(val) = lookup("GIF_PROBE_CHUNK_SIZE") {
            match val.parse() {
                Ok(size) => self.chunk_size = size,
                Err(_) => log::warn!("Ignoring GIF_PROBE_CHUNK_SIZE={:?}", val),
            }
        }
        if let Some(val) = lookup("GIF_PROBE_FORMAT") {
            match OutputFormat::from_name(&val) {
                Some(format) => self.format = format,
                None => log::warn!("Ignoring GIF_PROBE_FORMAT={:?}", val),
            }
        }
        if let Some(val) = lookup("GIF_PROBE_DECODE") {
            self.decode_frames = val == "1" || val.to_lowercase() == "true";
        }
    }

    /// Apply CLI arguments to config
    fn apply_cli_args(&mut self, args: &CliArgs) {
        if let Some(size) = args.chunk_size {
            self.chunk_size = size;
        }
        if let Some(name) = &args.format {
            if let Some(format) = OutputFormat::from_name(name) {
                self.format = format;
            }
        }
        if args.decode {
            self.decode_frames = true;
        }
        if let Some(pixels) = args.max_frame_pixels {
            self.max_frame_pixels = pixels;
        }
        if args.strict {
            self.reader.strict_block_framing = true;
        }
        if let Some(max) = args.max_frames {
            self.reader.max_frames = Some(max);
        }
        if args.no_progressive {
            self.reader.progressive_display = false;
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.chunk_size == 0 {
            return Err(ConfigError::field("chunk_size", "Chunk size must be at least 1"));
        }
        if self.chunk_size > MAX_CHUNK_SIZE {
            return Err(ConfigError::field(
                "chunk_size",
                format!("Chunk size must be at most {}", MAX_CHUNK_SIZE),
            ));
        }
        if self.max_frame_pixels == 0 {
            return Err(ConfigError::field(
                "max_frame_pixels",
                "Frame pixel limit must be at least 1",
            ));
        }
        if self.reader.max_frames == Some(0) {
            return Err(ConfigError::field(
                "reader.max_frames",
                "Frame limit must be at least 1",
            ));
        }
        Ok(())
    }

    /// Get the default configuration file path
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("gif-probe").join("config.toml"))
    }
}
