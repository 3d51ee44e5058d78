//! GIF Parser - incremental GIF stream parser and frame decoder
//!
//! This crate walks the GIF byte grammar as data arrives and reconstructs the
//! logical structure of the stream: screen parameters, palettes, and an
//! ordered list of animation frames with their compressed image data.
//! Frames are decoded on demand by an LZW decompressor that emits rows of
//! palette indices in interlace-aware order.
//!
//! The parser is designed to:
//! - Suspend at any byte boundary and resume exactly where it stopped
//! - Never read past the bytes currently available
//! - Reject malformed streams with a sticky fatal error
//! - Keep decoder memory bounded (one dictionary per frame being decoded)
//!
//! Reference: https://www.w3.org/Graphics/GIF/spec-gif89a.txt

mod cursor;
mod error;
mod frame;
mod lzw;
mod options;
mod palette;
mod reader;

pub use cursor::{ByteSource, StreamBuffer};
pub use error::{Error, Result};
pub use frame::{DecodeStatus, DisposalMethod, FrameContext, FrameRect};
pub use lzw::{
    LzwDecoder, LzwParams, Row, RowSink, MAX_DICTIONARY_ENTRIES, MAX_DICTIONARY_ENTRY_BITS,
};
pub use options::ReaderOptions;
pub use palette::{ColorTable, Palette, PixelFormat, BYTES_PER_ENTRY, MAX_COLORS};
pub use reader::{GifReader, GifVersion, ParseQuery, ParseStatus, State};
