//! Error types for GIF parsing and decoding
//!
//! Running out of buffered bytes is not an error: the parser reports it as
//! [`crate::ParseStatus::InsufficientData`]. Every variant here is fatal.

use thiserror::Error;

/// GIF error type
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The stream does not start with `GIF87a` or `GIF89a`
    #[error("Not a GIF stream: bad signature")]
    BadSignature,

    /// LZW minimum code size outside `1..=11`
    #[error("Invalid LZW minimum code size: {0}")]
    InvalidCodeSize(u8),

    /// Frame has no size and the logical screen is empty too
    #[error("Frame has zero width or height and the logical screen is empty")]
    EmptyFrame,

    /// Graphic control extension declared shorter than its four fields
    #[error("Graphic control extension truncated to {0} bytes")]
    TruncatedControlExtension(usize),

    /// Sub-block length does not match what its block requires
    #[error("Corrupt sub-block: expected at least {expected} bytes, found {actual}")]
    CorruptSubBlock { expected: usize, actual: usize },

    /// Netscape application sub-block with an undefined id
    #[error("Unknown Netscape extension sub-block id {0}")]
    UnknownNetscapeExtension(u8),

    /// Unknown byte where a block introducer was required
    #[error("Unexpected block introducer 0x{0:02X}")]
    UnexpectedBlock(u8),

    /// Image data appeared before any image descriptor
    #[error("Image data without a frame")]
    MissingFrame,

    /// Code greater than the next free dictionary slot
    #[error("Invalid LZW code {code} (next free slot {avail})")]
    InvalidCode { code: u16, avail: u16 },

    /// Dictionary chain does not match its recorded length
    #[error("Corrupt LZW dictionary")]
    CorruptDictionary,

    /// Requested frame was never seen
    #[error("Frame index {0} out of range")]
    FrameOutOfRange(usize),

    /// Stream declares more frames than the configured limit
    #[error("Frame limit of {0} exceeded")]
    TooManyFrames(usize),
}

/// Result type for GIF operations
pub type Result<T> = std::result::Result<T, Error>;
