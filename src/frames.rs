//! Index buffer materialization
//!
//! The decoder hands out rows in interlace order. `IndexedFrame` writes each
//! row at its true index, so once a frame is complete the buffer holds the
//! exact row-major pixel matrix.

use gif_parser::{
    ByteSource, DecodeStatus, Error, GifReader, ParseQuery, ReaderOptions, Row, RowSink,
};

use crate::error::{ProbeError, Result};

/// Default cap on the pixels of one materialized frame (8192 x 8192)
pub const DEFAULT_MAX_FRAME_PIXELS: usize = 8192 * 8192;

/// A frame decoded into palette indices
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexedFrame {
    pub frame: usize,
    pub width: usize,
    pub height: usize,
    /// Row-major palette indices
    pub pixels: Vec<u8>,
    pub rows_written: usize,
}

impl IndexedFrame {
    /// Zero-filled buffer for a `width` x `height` frame of at most
    /// `max_pixels` pixels
    pub fn allocate(frame: usize, width: usize, height: usize, max_pixels: usize) -> Result<Self> {
        let pixels = width
            .checked_mul(height)
            .filter(|&pixels| pixels <= max_pixels)
            .ok_or(ProbeError::FrameTooLarge {
                frame,
                width,
                height,
                limit: max_pixels,
            })?;
        Ok(Self {
            frame,
            width,
            height,
            pixels: vec![0; pixels],
            rows_written: 0,
        })
    }

    pub fn row(&self, index: usize) -> Option<&[u8]> {
        let start = index.checked_mul(self.width)?;
        self.pixels.get(start..start + self.width)
    }

    pub fn pixel(&self, x: usize, y: usize) -> Option<u8> {
        if x >= self.width {
            return None;
        }
        self.row(y).map(|row| row[x])
    }
}

impl RowSink for IndexedFrame {
    fn emit_row(&mut self, row: Row<'_>) {
        debug_assert_eq!(row.frame, self.frame);
        let start = row.index * self.width;
        if let Some(dest) = self.pixels.get_mut(start..start + self.width) {
            dest.copy_from_slice(row.pixels);
            self.rows_written += 1;
        }
    }
}

/// Decode frame `index` from the start.
///
/// Returns `None` while the frame's image data is incomplete; that frame's
/// decoder state is discarded so the next call starts over. Frames larger
/// than `max_pixels` fail with [`ProbeError::FrameTooLarge`] before any
/// buffer is allocated.
pub fn decode_frame<S: ByteSource>(
    reader: &mut GifReader<S>,
    index: usize,
    max_pixels: usize,
) -> Result<Option<IndexedFrame>> {
    let context = reader
        .frame_context(index)
        .ok_or(Error::FrameOutOfRange(index))?;
    if !context.is_header_defined() {
        return Ok(None);
    }
    let mut frame = IndexedFrame::allocate(
        index,
        context.width() as usize,
        context.height() as usize,
        max_pixels,
    )?;

    match reader.decode(index, &mut frame)? {
        DecodeStatus::Complete => Ok(Some(frame)),
        DecodeStatus::Incomplete => {
            reader.clear_frame_decode_state(index)?;
            Ok(None)
        }
    }
}

/// Parse an in-memory stream and decode every complete frame
pub fn decode_all(
    data: Vec<u8>,
    options: ReaderOptions,
    max_pixels: usize,
) -> Result<Vec<IndexedFrame>> {
    let mut reader = GifReader::from_bytes(data, options);
    reader.parse(ParseQuery::FrameCount)?;

    let mut frames = Vec::with_capacity(reader.images_count());
    for index in 0..reader.images_count() {
        if let Some(frame) = decode_frame(&mut reader, index, max_pixels)? {
            frames.push(frame);
        }
    }
    Ok(frames)
}
