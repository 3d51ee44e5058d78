//! Frame descriptors and the per-frame decode driver

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::lzw::{LzwDecoder, LzwParams, RowSink};
use crate::palette::Palette;

/// What happens to a frame's area before the next frame is drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DisposalMethod {
    /// Leave the pixels in place
    #[default]
    Keep,
    /// Clear the frame's area to the background
    RestoreBackground,
    /// Restore the canvas as it was before the frame
    RestorePrevious,
}

impl DisposalMethod {
    /// Map the 3-bit field of a graphic control extension.
    ///
    /// Value 4 is not in the GIF89a spec, but some encoders write it when
    /// they mean 3.
    pub fn from_raw(value: u8) -> Self {
        match value {
            2 => DisposalMethod::RestoreBackground,
            3 | 4 => DisposalMethod::RestorePrevious,
            _ => DisposalMethod::Keep,
        }
    }
}

/// Position and size of a frame within the logical screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct FrameRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl FrameRect {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> u64 {
        u64::from(self.x) + u64::from(self.width)
    }

    pub fn bottom(&self) -> u64 {
        u64::from(self.y) + u64::from(self.height)
    }

    /// Whether `other` lies entirely inside this rect
    pub fn contains(&self, other: &FrameRect) -> bool {
        self.x <= other.x
            && self.y <= other.y
            && self.right() >= other.right()
            && self.bottom() >= other.bottom()
    }

    /// Whether this rect covers a `width` x `height` screen
    pub fn is_full_screen(&self, width: u32, height: u32) -> bool {
        self.contains(&FrameRect::new(0, 0, width, height))
    }
}

/// Outcome of a [`FrameContext::decode`] call that did not fail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeStatus {
    /// Every row the stream provides has been emitted
    Complete,
    /// More image data is needed
    Incomplete,
}

/// One animation frame as parsed from the stream
#[derive(Debug)]
pub struct FrameContext {
    frame_id: usize,
    rect: FrameRect,
    transparent_pixel: Option<u8>,
    disposal: DisposalMethod,
    required_frame: Option<usize>,
    data_size: Option<u8>,
    interlaced: bool,
    progressive_display: bool,
    delay_ms: u32,
    complete: bool,
    header_defined: bool,
    local_palette: Palette,
    lzw_blocks: Vec<Vec<u8>>,
    lzw: Option<Box<LzwDecoder>>,
    current_block: usize,
    decode_error: Option<Error>,
}

impl FrameContext {
    pub(crate) fn new(frame_id: usize) -> Self {
        Self {
            frame_id,
            rect: FrameRect::default(),
            transparent_pixel: None,
            disposal: DisposalMethod::Keep,
            required_frame: None,
            data_size: None,
            interlaced: false,
            progressive_display: false,
            delay_ms: 0,
            complete: false,
            header_defined: false,
            local_palette: Palette::new(),
            lzw_blocks: Vec::new(),
            lzw: None,
            current_block: 0,
            decode_error: None,
        }
    }

    pub fn frame_id(&self) -> usize {
        self.frame_id
    }

    /// Offset and size exactly as read from the image descriptor
    pub fn rect(&self) -> FrameRect {
        self.rect
    }

    pub fn width(&self) -> u32 {
        self.rect.width
    }

    pub fn height(&self) -> u32 {
        self.rect.height
    }

    pub fn transparent_pixel(&self) -> Option<u8> {
        self.transparent_pixel
    }

    pub fn disposal(&self) -> DisposalMethod {
        self.disposal
    }

    /// Earlier frame this one must be drawn over, `None` if independent
    pub fn required_frame(&self) -> Option<usize> {
        self.required_frame
    }

    /// LZW minimum code size, once the image data has started
    pub fn data_size(&self) -> Option<u8> {
        self.data_size
    }

    pub fn interlaced(&self) -> bool {
        self.interlaced
    }

    pub fn progressive_display(&self) -> bool {
        self.progressive_display
    }

    /// Delay before the next frame in milliseconds
    pub fn delay_ms(&self) -> u32 {
        self.delay_ms
    }

    /// The sub-block terminator has been parsed
    pub fn is_complete(&self) -> bool {
        self.complete
    }

    /// The image descriptor has been parsed
    pub fn is_header_defined(&self) -> bool {
        self.header_defined
    }

    pub fn local_palette(&self) -> &Palette {
        &self.local_palette
    }

    /// Palette in effect for this frame
    pub fn active_palette<'a>(&'a self, global: &'a Palette) -> &'a Palette {
        if self.local_palette.is_defined() {
            &self.local_palette
        } else {
            global
        }
    }

    /// Whether the transparent index addresses an entry of the active palette
    pub fn has_valid_transparency(&self, global: &Palette) -> bool {
        self.transparent_pixel
            .is_some_and(|index| self.active_palette(global).contains_index(index))
    }

    /// Compressed sub-blocks received so far
    pub fn lzw_blocks(&self) -> &[Vec<u8>] {
        &self.lzw_blocks
    }

    /// Total compressed bytes received so far
    pub fn compressed_len(&self) -> usize {
        self.lzw_blocks.iter().map(Vec::len).sum()
    }

    /// A decode pass is in progress
    pub fn is_decoding(&self) -> bool {
        self.lzw.is_some()
    }

    /// Error that stopped the last decode pass
    pub fn decode_error(&self) -> Option<&Error> {
        self.decode_error.as_ref()
    }

    pub(crate) fn set_rect(&mut self, rect: FrameRect) {
        self.rect = rect;
    }

    pub(crate) fn set_transparent_pixel(&mut self, index: Option<u8>) {
        self.transparent_pixel = index;
    }

    pub(crate) fn set_disposal(&mut self, disposal: DisposalMethod) {
        self.disposal = disposal;
    }

    pub(crate) fn set_delay_ms(&mut self, delay_ms: u32) {
        self.delay_ms = delay_ms;
    }

    pub(crate) fn set_required_frame(&mut self, required: Option<usize>) {
        self.required_frame = required;
    }

    pub(crate) fn set_data_size(&mut self, data_size: u8) {
        self.data_size = Some(data_size);
    }

    pub(crate) fn set_interlaced(&mut self, interlaced: bool) {
        self.interlaced = interlaced;
    }

    pub(crate) fn set_progressive_display(&mut self, progressive: bool) {
        self.progressive_display = progressive;
    }

    pub(crate) fn set_complete(&mut self) {
        self.complete = true;
    }

    pub(crate) fn set_header_defined(&mut self) {
        self.header_defined = true;
    }

    pub(crate) fn local_palette_mut(&mut self) -> &mut Palette {
        &mut self.local_palette
    }

    pub(crate) fn add_lzw_block(&mut self, data: &[u8]) {
        self.lzw_blocks.push(data.to_vec());
    }

    fn lzw_params(&self, data_size: u8) -> LzwParams {
        LzwParams {
            frame_id: self.frame_id,
            width: self.rect.width as usize,
            height: self.rect.height as usize,
            data_size,
            interlaced: self.interlaced,
            progressive_display: self.progressive_display,
            required_frame: self.required_frame,
            transparent_pixel: self.transparent_pixel,
        }
    }

    /// Feed buffered image data to the decoder, emitting rows into `sink`.
    ///
    /// Resumes from the first block not yet fed. A failure is latched and
    /// returned by every later call until [`FrameContext::clear_decode_state`].
    pub fn decode<K>(&mut self, global: &Palette, sink: &mut K) -> Result<DecodeStatus>
    where
        K: RowSink + ?Sized,
    {
        if let Some(err) = &self.decode_error {
            return Err(err.clone());
        }
        let Some(data_size) = self.data_size else {
            return Ok(DecodeStatus::Incomplete);
        };
        if !self.header_defined {
            return Ok(DecodeStatus::Incomplete);
        }

        let params = self.lzw_params(data_size);
        if self.lzw.is_none() {
            let colors = self.active_palette(global).entry_count();
            let decoder = match LzwDecoder::new(&params, colors) {
                Ok(decoder) => decoder,
                Err(err) => {
                    self.decode_error = Some(err.clone());
                    return Err(err);
                }
            };
            self.lzw = Some(Box::new(decoder));
            self.current_block = 0;
        }
        let Some(lzw) = self.lzw.as_deref_mut() else {
            return Ok(DecodeStatus::Incomplete);
        };

        while self.current_block < self.lzw_blocks.len() && !lzw.is_finished() {
            let block = &self.lzw_blocks[self.current_block];
            if let Err(err) = lzw.do_lzw(&params, block, sink) {
                log::debug!("frame {}: decode failed: {}", self.frame_id, err);
                self.decode_error = Some(err.clone());
                return Err(err);
            }
            self.current_block += 1;
        }

        let finished = lzw.is_finished()
            || (self.complete && self.current_block == self.lzw_blocks.len());
        if !finished {
            return Ok(DecodeStatus::Incomplete);
        }

        log::debug!(
            "frame {}: decode complete, {} rows missing",
            self.frame_id,
            lzw.rows_remaining()
        );
        self.lzw = None;
        Ok(DecodeStatus::Complete)
    }

    /// Drop decoder state so the frame can be decoded again from scratch
    pub fn clear_decode_state(&mut self) {
        self.lzw = None;
        self.current_block = 0;
        self.decode_error = None;
    }
}
