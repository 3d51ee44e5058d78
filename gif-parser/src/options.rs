//! Reader options

use serde::{Deserialize, Serialize};

/// Options controlling how a [`crate::GifReader`] treats a stream
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReaderOptions {
    /// Flag the first frame for progressive display when it is interlaced
    pub progressive_display: bool,
    /// Upper bound on frame descriptors; `None` means unlimited
    pub max_frames: Option<usize>,
    /// Treat unknown bytes between blocks as fatal instead of as the end of the stream
    pub strict_block_framing: bool,
}

impl Default for ReaderOptions {
    fn default() -> Self {
        Self {
            progressive_display: true,
            max_frames: None,
            strict_block_framing: false,
        }
    }
}
