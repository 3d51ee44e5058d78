//! GIF Stream Inspection Library
//!
//! Glue around the incremental `gif-parser` core:
//!
//! - `frames`: row sink that materializes decoded frames as index buffers
//! - `report`: serializable summary of a parsed stream
//! - `config`: configuration for the `gif-probe` tool
//! - `error`: errors surfaced by the tool

pub mod config;
pub mod error;
pub mod frames;
pub mod report;

pub use gif_parser as parser;
