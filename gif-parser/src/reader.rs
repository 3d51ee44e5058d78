//! GIF stream parser
//!
//! Walks the GIF grammar one unit at a time: fixed-size headers, palettes,
//! and length-prefixed sub-blocks. Each state knows how many bytes it needs;
//! if the byte source cannot supply them the parser suspends with nothing
//! consumed and resumes at the same boundary on the next call.
//!
//! State handling is split in two. `transition` maps a state and its unit
//! to the next state plus an `Effect` describing what was read. The reader
//! applies effects to the stream context (screen, palettes, frames).

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::cursor::{ByteSource, StreamBuffer};
use crate::error::{Error, Result};
use crate::frame::{DecodeStatus, DisposalMethod, FrameContext, FrameRect};
use crate::lzw::{RowSink, MAX_DICTIONARY_ENTRY_BITS};
use crate::options::ReaderOptions;
use crate::palette::{ColorTable, Palette, PixelFormat, BYTES_PER_ENTRY};

/// Application identifiers whose sub-blocks carry the loop count
const NETSCAPE_IDENTIFIERS: [&[u8]; 2] = [b"NETSCAPE2.0", b"ANIMEXTS1.0"];
/// Fields of a graphic control extension: flags, delay (2), transparent index
const CONTROL_EXTENSION_LEN: usize = 4;
/// Netscape sub-block: id followed by a 16-bit value
const NETSCAPE_SUB_BLOCK_LEN: usize = 3;

/// Signature version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GifVersion {
    #[serde(rename = "87a")]
    Gif87a,
    #[serde(rename = "89a")]
    Gif89a,
}

impl fmt::Display for GifVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GifVersion::Gif87a => write!(f, "GIF87a"),
            GifVersion::Gif89a => write!(f, "GIF89a"),
        }
    }
}

/// How far [`GifReader::parse`] should go
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseQuery {
    /// Stop once the logical screen size is final (first image descriptor)
    Size,
    /// Parse to the end of the stream
    FrameCount,
    /// Stop once the image data of frame `n` has been read
    Frame(usize),
}

/// Progress signal of a successful [`GifReader::parse`] call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseStatus {
    /// The query is answered, or the stream has ended
    Satisfied,
    /// Suspended at a unit boundary; call again after more bytes arrive
    InsufficientData,
}

/// Parser state. Variants carry the size of the unit they consume.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    /// Signature and version
    Type,
    /// Logical screen descriptor
    GlobalHeader,
    GlobalColormap { colors: usize },
    /// Block introducer
    ImageStart,
    /// Image descriptor
    ImageHeader,
    ImageColormap { colors: usize },
    /// LZW minimum code size
    LzwStart,
    /// Compressed sub-block payload
    Lzw { len: usize },
    /// Compressed sub-block length
    SubBlock,
    /// Extension label and first sub-block length
    Extension,
    ControlExtension { len: usize },
    /// Length of the next ignored sub-block
    ConsumeBlock,
    SkipBlock { len: usize },
    /// Length of the next comment sub-block
    CommentExtension,
    ConsumeComment { len: usize },
    /// Application identifier and authentication code
    ApplicationExtension { len: usize },
    /// Length of the next Netscape sub-block
    NetscapeExtensionBlock,
    ConsumeNetscapeExtension { len: usize },
    Done,
}

impl State {
    /// Bytes the state consumes in one step
    pub fn bytes_needed(&self) -> usize {
        match *self {
            State::Type => 6,
            State::GlobalHeader => 7,
            State::ImageHeader => 9,
            State::Extension => 2,
            State::GlobalColormap { colors } | State::ImageColormap { colors } => {
                colors * BYTES_PER_ENTRY
            }
            State::ImageStart
            | State::LzwStart
            | State::SubBlock
            | State::ConsumeBlock
            | State::CommentExtension
            | State::NetscapeExtensionBlock => 1,
            State::Lzw { len }
            | State::ControlExtension { len }
            | State::SkipBlock { len }
            | State::ConsumeComment { len }
            | State::ApplicationExtension { len }
            | State::ConsumeNetscapeExtension { len } => len,
            State::Done => 0,
        }
    }
}

/// Image descriptor fields
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ImageDescriptor {
    pub rect: FrameRect,
    pub local_colors: Option<usize>,
    pub interlaced: bool,
}

/// Graphic control extension fields
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Control {
    pub transparent: Option<u8>,
    pub disposal: DisposalMethod,
    pub delay_ms: u32,
}

/// What a unit contributed to the stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Effect<'a> {
    None,
    Version(GifVersion),
    ScreenDescriptor {
        width: u16,
        height: u16,
        background_index: u8,
        global_colors: Option<usize>,
    },
    GlobalPalette(&'a [u8]),
    Control(Control),
    BeginComment,
    Comment(&'a [u8]),
    LoopCount(u16),
    ImageHeader(ImageDescriptor),
    LocalPalette(&'a [u8]),
    DataSize(u8),
    LzwBlock(&'a [u8]),
    FrameEnd,
    Trailer,
    /// Unknown byte where a block introducer belongs
    Unknown(u8),
}

fn read_u16(unit: &[u8], at: usize) -> u16 {
    u16::from_le_bytes([unit[at], unit[at + 1]])
}

fn palette_colors(flags: u8) -> Option<usize> {
    (flags & 0x80 != 0).then(|| 2usize << (flags & 0x07))
}

/// Consume one unit. `unit` holds exactly `state.bytes_needed()` bytes.
pub(crate) fn transition<'a>(state: &State, unit: &'a [u8]) -> Result<(State, Effect<'a>)> {
    let step = match *state {
        State::Type => {
            let version = match unit {
                b"GIF87a" => GifVersion::Gif87a,
                b"GIF89a" => GifVersion::Gif89a,
                _ => return Err(Error::BadSignature),
            };
            (State::GlobalHeader, Effect::Version(version))
        }

        State::GlobalHeader => {
            let global_colors = palette_colors(unit[4]);
            let next = match global_colors {
                Some(colors) => State::GlobalColormap { colors },
                None => State::ImageStart,
            };
            let effect = Effect::ScreenDescriptor {
                width: read_u16(unit, 0),
                height: read_u16(unit, 2),
                background_index: unit[5],
                global_colors,
            };
            (next, effect)
        }

        State::GlobalColormap { .. } => (State::ImageStart, Effect::GlobalPalette(unit)),

        State::ImageStart => match unit[0] {
            b'!' => (State::Extension, Effect::None),
            b',' => (State::ImageHeader, Effect::None),
            b';' => (State::Done, Effect::Trailer),
            other => (State::Done, Effect::Unknown(other)),
        },

        State::Extension => {
            let len = unit[1] as usize;
            let (data_state, effect) = match unit[0] {
                0xF9 => {
                    if len < CONTROL_EXTENSION_LEN {
                        return Err(Error::TruncatedControlExtension(len));
                    }
                    (State::ControlExtension { len }, Effect::None)
                }
                0xFF => (State::ApplicationExtension { len }, Effect::None),
                0xFE => (State::ConsumeComment { len }, Effect::BeginComment),
                // Plain text and unknown labels
                _ => (State::SkipBlock { len }, Effect::None),
            };
            if len == 0 {
                (State::ImageStart, effect)
            } else {
                (data_state, effect)
            }
        }

        State::ControlExtension { .. } => {
            let flags = unit[0];
            let control = Control {
                transparent: (flags & 0x01 != 0).then_some(unit[3]),
                disposal: DisposalMethod::from_raw((flags >> 2) & 0x07),
                delay_ms: u32::from(read_u16(unit, 1)) * 10,
            };
            (State::ConsumeBlock, Effect::Control(control))
        }

        State::ConsumeBlock => match unit[0] {
            0 => (State::ImageStart, Effect::None),
            len => (State::SkipBlock { len: len as usize }, Effect::None),
        },

        State::SkipBlock { .. } => (State::ConsumeBlock, Effect::None),

        State::ConsumeComment { .. } => (State::CommentExtension, Effect::Comment(unit)),

        State::CommentExtension => match unit[0] {
            0 => (State::ImageStart, Effect::None),
            len => (State::ConsumeComment { len: len as usize }, Effect::None),
        },

        State::ApplicationExtension { .. } => {
            if NETSCAPE_IDENTIFIERS.iter().any(|id| *id == unit) {
                (State::NetscapeExtensionBlock, Effect::None)
            } else {
                (State::ConsumeBlock, Effect::None)
            }
        }

        State::NetscapeExtensionBlock => match unit[0] as usize {
            0 => (State::ImageStart, Effect::None),
            len if len < NETSCAPE_SUB_BLOCK_LEN => {
                return Err(Error::CorruptSubBlock {
                    expected: NETSCAPE_SUB_BLOCK_LEN,
                    actual: len,
                })
            }
            len => (State::ConsumeNetscapeExtension { len }, Effect::None),
        },

        State::ConsumeNetscapeExtension { .. } => match unit[0] & 0x07 {
            1 => (
                State::NetscapeExtensionBlock,
                Effect::LoopCount(read_u16(unit, 1)),
            ),
            // Buffering hint, nothing to do
            2 => (State::NetscapeExtensionBlock, Effect::None),
            id => return Err(Error::UnknownNetscapeExtension(id)),
        },

        State::ImageHeader => {
            let flags = unit[8];
            let descriptor = ImageDescriptor {
                rect: FrameRect::new(
                    u32::from(read_u16(unit, 0)),
                    u32::from(read_u16(unit, 2)),
                    u32::from(read_u16(unit, 4)),
                    u32::from(read_u16(unit, 6)),
                ),
                local_colors: palette_colors(flags),
                interlaced: flags & 0x40 != 0,
            };
            let next = match descriptor.local_colors {
                Some(colors) => State::ImageColormap { colors },
                None => State::LzwStart,
            };
            (next, Effect::ImageHeader(descriptor))
        }

        State::ImageColormap { .. } => (State::LzwStart, Effect::LocalPalette(unit)),

        State::LzwStart => {
            let data_size = unit[0];
            if data_size == 0 || data_size >= MAX_DICTIONARY_ENTRY_BITS {
                return Err(Error::InvalidCodeSize(data_size));
            }
            (State::SubBlock, Effect::DataSize(data_size))
        }

        State::SubBlock => match unit[0] {
            0 => (State::ImageStart, Effect::FrameEnd),
            len => (State::Lzw { len: len as usize }, Effect::None),
        },

        State::Lzw { .. } => (State::SubBlock, Effect::LzwBlock(unit)),

        State::Done => (State::Done, Effect::None),
    };

    Ok(step)
}

/// What the parse loop does after an effect is applied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    /// Consume the unit and keep going
    Advance,
    /// Answer the query without consuming the unit
    Hold,
    /// Consume the unit, then answer the query
    Yield,
}

/// Everything learned from the stream so far
#[derive(Debug, Default)]
struct StreamContext {
    version: Option<GifVersion>,
    screen_width: u32,
    screen_height: u32,
    background_index: u8,
    global_palette: Palette,
    loop_count: Option<u16>,
    comments: Vec<Vec<u8>>,
    frames: Vec<FrameContext>,
    size_known: bool,
    first_frame_has_alpha: Option<bool>,
    first_frame_supports_index8: Option<bool>,
    parse_completed: bool,
}

impl StreamContext {
    fn apply(&mut self, effect: Effect<'_>, query: ParseQuery, options: &ReaderOptions) -> Result<Flow> {
        match effect {
            Effect::None => {}
            Effect::Version(version) => {
                log::debug!("signature {}", version);
                self.version = Some(version);
            }
            Effect::ScreenDescriptor {
                width,
                height,
                background_index,
                global_colors,
            } => {
                log::debug!(
                    "logical screen {}x{}, global palette {:?}",
                    width,
                    height,
                    global_colors
                );
                self.screen_width = u32::from(width);
                self.screen_height = u32::from(height);
                self.background_index = background_index;
                if let Some(colors) = global_colors {
                    self.global_palette.set_entry_count(colors);
                }
            }
            Effect::GlobalPalette(data) => self.global_palette.set_raw_data(data),
            Effect::Control(control) => {
                let index = self.add_frame_if_necessary(options)?;
                let frame = &mut self.frames[index];
                frame.set_transparent_pixel(control.transparent);
                frame.set_disposal(control.disposal);
                frame.set_delay_ms(control.delay_ms);
            }
            Effect::BeginComment => self.comments.push(Vec::new()),
            Effect::Comment(data) => {
                if let Some(comment) = self.comments.last_mut() {
                    comment.extend_from_slice(data);
                }
            }
            Effect::LoopCount(count) => {
                log::debug!("loop count {}", count);
                self.loop_count = Some(count);
            }
            Effect::ImageHeader(descriptor) => {
                return self.apply_image_header(descriptor, query, options);
            }
            Effect::LocalPalette(data) => {
                let index = self.current_index()?;
                self.frames[index].local_palette_mut().set_raw_data(data);
                self.finish_frame_header(index);
            }
            Effect::DataSize(data_size) => {
                let index = self.current_index()?;
                self.frames[index].set_data_size(data_size);
            }
            Effect::LzwBlock(data) => {
                let index = self.current_index()?;
                self.frames[index].add_lzw_block(data);
            }
            Effect::FrameEnd => {
                let index = self.current_index()?;
                self.frames[index].set_complete();
                log::debug!(
                    "frame {}: image data complete ({} bytes)",
                    index,
                    self.frames[index].compressed_len()
                );
                if let ParseQuery::Frame(n) = query {
                    if self.frames.len() > n {
                        return Ok(Flow::Yield);
                    }
                }
            }
            Effect::Trailer => log::debug!("trailer after {} frames", self.frames.len()),
            Effect::Unknown(byte) => {
                if options.strict_block_framing {
                    return Err(Error::UnexpectedBlock(byte));
                }
                log::warn!("unexpected byte 0x{:02X} between blocks, ending stream", byte);
            }
        }
        Ok(Flow::Advance)
    }

    fn apply_image_header(
        &mut self,
        descriptor: ImageDescriptor,
        query: ParseQuery,
        options: &ReaderOptions,
    ) -> Result<Flow> {
        let mut rect = descriptor.rect;
        let first_frame = self.is_first_frame();

        // Only the first frame may grow the screen
        if first_frame {
            let right = rect.x.saturating_add(rect.width);
            let bottom = rect.y.saturating_add(rect.height);
            if right > self.screen_width || bottom > self.screen_height {
                log::warn!(
                    "first frame ({}x{} at {},{}) enlarges the {}x{} screen",
                    rect.width,
                    rect.height,
                    rect.x,
                    rect.y,
                    self.screen_width,
                    self.screen_height
                );
            }
            self.screen_width = self.screen_width.max(right);
            self.screen_height = self.screen_height.max(bottom);
        }
        self.size_known = true;

        if query == ParseQuery::Size {
            return Ok(Flow::Hold);
        }

        if rect.width == 0 || rect.height == 0 {
            rect.width = self.screen_width;
            rect.height = self.screen_height;
            if rect.width == 0 || rect.height == 0 {
                return Err(Error::EmptyFrame);
            }
        }

        let index = self.add_frame_if_necessary(options)?;
        let frame = &mut self.frames[index];
        frame.set_rect(rect);
        frame.set_interlaced(descriptor.interlaced);
        frame.set_progressive_display(options.progressive_display && first_frame);
        frame.set_header_defined();
        log::debug!(
            "frame {}: {}x{} at {},{} interlaced {}",
            index,
            rect.width,
            rect.height,
            rect.x,
            rect.y,
            descriptor.interlaced
        );

        match descriptor.local_colors {
            Some(colors) => frame.local_palette_mut().set_entry_count(colors),
            None => self.finish_frame_header(index),
        }
        Ok(Flow::Advance)
    }

    /// No frame has finished yet
    fn is_first_frame(&self) -> bool {
        match self.frames.as_slice() {
            [] => true,
            [only] => !only.is_complete(),
            _ => false,
        }
    }

    fn current_index(&self) -> Result<usize> {
        self.frames.len().checked_sub(1).ok_or(Error::MissingFrame)
    }

    fn add_frame_if_necessary(&mut self, options: &ReaderOptions) -> Result<usize> {
        if self.frames.last().map_or(true, FrameContext::is_complete) {
            if let Some(max) = options.max_frames {
                if self.frames.len() >= max {
                    return Err(Error::TooManyFrames(max));
                }
            }
            let id = self.frames.len();
            self.frames.push(FrameContext::new(id));
            log::debug!("frame {}: added", id);
        }
        self.current_index()
    }

    /// Called once the frame's palette is known
    fn finish_frame_header(&mut self, index: usize) {
        let required = self.required_frame_for(index);
        self.frames[index].set_required_frame(required);

        if index == 0 {
            let frame = &self.frames[0];
            let has_palette =
                frame.local_palette().is_defined() || self.global_palette.entry_count() > 0;
            if !has_palette || frame.has_valid_transparency(&self.global_palette) {
                self.first_frame_has_alpha = Some(true);
                self.first_frame_supports_index8 = Some(true);
            } else {
                let subset = !frame
                    .rect()
                    .is_full_screen(self.screen_width, self.screen_height);
                self.first_frame_has_alpha = Some(subset);
                self.first_frame_supports_index8 = Some(!subset);
            }
        }
    }

    fn required_frame_for(&self, index: usize) -> Option<usize> {
        if index == 0 {
            return None;
        }
        let frame = &self.frames[index];
        let prev = &self.frames[index - 1];

        if prev.disposal() == DisposalMethod::RestorePrevious {
            return prev.required_frame();
        }

        // An opaque frame covering the previous one hides it completely
        if !frame.has_valid_transparency(&self.global_palette)
            && frame.rect().contains(&prev.rect())
        {
            return prev.required_frame();
        }

        match prev.disposal() {
            DisposalMethod::Keep => Some(index - 1),
            DisposalMethod::RestoreBackground => {
                if prev
                    .rect()
                    .is_full_screen(self.screen_width, self.screen_height)
                    || prev.required_frame().is_none()
                {
                    None
                } else {
                    prev.required_frame()
                }
            }
            DisposalMethod::RestorePrevious => prev.required_frame(),
        }
    }
}

/// Incremental GIF reader over a byte source
#[derive(Debug)]
pub struct GifReader<S> {
    source: S,
    options: ReaderOptions,
    state: State,
    /// First fatal error, returned by every later `parse`
    error: Option<Error>,
    stream: StreamContext,
}

impl<S: ByteSource> GifReader<S> {
    pub fn new(source: S, options: ReaderOptions) -> Self {
        Self {
            source,
            options,
            state: State::Type,
            error: None,
            stream: StreamContext::default(),
        }
    }

    /// Consume buffered bytes until `query` is answered or the data runs out
    pub fn parse(&mut self, query: ParseQuery) -> Result<ParseStatus> {
        if let Some(err) = &self.error {
            return Err(err.clone());
        }
        match self.parse_units(query) {
            Ok(status) => Ok(status),
            Err(err) => {
                log::debug!("parse failed in {:?}: {}", self.state, err);
                self.stream.parse_completed = true;
                self.error = Some(err.clone());
                Err(err)
            }
        }
    }

    fn parse_units(&mut self, query: ParseQuery) -> Result<ParseStatus> {
        if self.stream.parse_completed || self.query_answered(query) {
            return Ok(ParseStatus::Satisfied);
        }

        loop {
            if self.state == State::Done {
                self.stream.parse_completed = true;
                log::debug!("parse complete, {} frames", self.stream.frames.len());
                return Ok(ParseStatus::Satisfied);
            }

            let needed = self.state.bytes_needed();
            let Some(unit) = self.source.peek(needed) else {
                return Ok(ParseStatus::InsufficientData);
            };
            let (next, effect) = transition(&self.state, unit)?;

            let flow = self.stream.apply(effect, query, &self.options)?;
            if flow == Flow::Hold {
                return Ok(ParseStatus::Satisfied);
            }

            self.source.advance(needed);
            log::trace!("{:?} -> {:?} ({} bytes)", self.state, next, needed);
            self.state = next;
            if flow == Flow::Yield {
                return Ok(ParseStatus::Satisfied);
            }
        }
    }

    fn query_answered(&self, query: ParseQuery) -> bool {
        match query {
            ParseQuery::Size => self.stream.size_known,
            ParseQuery::FrameCount => false,
            ParseQuery::Frame(n) => self
                .stream
                .frames
                .get(n)
                .is_some_and(FrameContext::is_complete),
        }
    }

    /// Decode the buffered image data of frame `index` into `sink`
    pub fn decode<K>(&mut self, index: usize, sink: &mut K) -> Result<DecodeStatus>
    where
        K: RowSink + ?Sized,
    {
        let global = &self.stream.global_palette;
        let frame = self
            .stream
            .frames
            .get_mut(index)
            .ok_or(Error::FrameOutOfRange(index))?;
        frame.decode(global, sink)
    }

    /// Frames whose image descriptor has been read. A trailing frame that
    /// only has a control extension so far is not counted.
    pub fn images_count(&self) -> usize {
        match self.stream.frames.last() {
            None => 0,
            Some(last) if last.is_header_defined() => self.stream.frames.len(),
            Some(_) => self.stream.frames.len() - 1,
        }
    }

    /// Netscape loop count, if the extension was seen. Zero means forever.
    pub fn loop_count(&self) -> Option<u16> {
        self.stream.loop_count
    }

    pub fn frame_context(&self, index: usize) -> Option<&FrameContext> {
        self.stream.frames.get(index)
    }

    /// Drop every frame's decoder state
    pub fn clear_decode_state(&mut self) {
        for frame in &mut self.stream.frames {
            frame.clear_decode_state();
        }
    }

    /// Drop the decoder state of frame `index` only
    pub fn clear_frame_decode_state(&mut self, index: usize) -> Result<()> {
        self.stream
            .frames
            .get_mut(index)
            .ok_or(Error::FrameOutOfRange(index))?
            .clear_decode_state();
        Ok(())
    }

    /// Known once the first frame's palette has been read
    pub fn first_frame_has_alpha(&self) -> Option<bool> {
        self.stream.first_frame_has_alpha
    }

    /// Known once the first frame's palette has been read
    pub fn first_frame_supports_index8(&self) -> Option<bool> {
        self.stream.first_frame_supports_index8
    }

    pub fn screen_width(&self) -> u32 {
        self.stream.screen_width
    }

    pub fn screen_height(&self) -> u32 {
        self.stream.screen_height
    }

    pub fn version(&self) -> Option<GifVersion> {
        self.stream.version
    }

    pub fn background_index(&self) -> u8 {
        self.stream.background_index
    }

    pub fn global_palette(&self) -> &Palette {
        &self.stream.global_palette
    }

    /// Color table for a frame: its local palette if it has one, else the
    /// global palette, with the frame's transparent index cleared.
    pub fn color_table(&mut self, index: usize, format: PixelFormat) -> Option<&ColorTable> {
        let frame = self.stream.frames.get_mut(index)?;
        let transparent = frame.transparent_pixel();
        if frame.local_palette().is_defined() {
            frame.local_palette_mut().build_table(format, transparent)
        } else {
            self.stream.global_palette.build_table(format, transparent)
        }
    }

    /// Comment extension payloads in stream order
    pub fn comments(&self) -> impl Iterator<Item = &[u8]> {
        self.stream.comments.iter().map(Vec::as_slice)
    }

    /// The trailer was reached, the stream ended leniently, or parsing failed
    pub fn is_parse_completed(&self) -> bool {
        self.stream.parse_completed
    }

    pub fn state(&self) -> State {
        self.state
    }

    /// Fatal parse error, if one occurred
    pub fn error(&self) -> Option<&Error> {
        self.error.as_ref()
    }

    pub fn options(&self) -> &ReaderOptions {
        &self.options
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }
}

impl GifReader<StreamBuffer> {
    /// Reader fed incrementally with [`GifReader::push_data`]
    pub fn streaming(options: ReaderOptions) -> Self {
        Self::new(StreamBuffer::new(), options)
    }

    /// Reader over a complete in-memory stream
    pub fn from_bytes(data: Vec<u8>, options: ReaderOptions) -> Self {
        Self::new(StreamBuffer::from_bytes(data), options)
    }

    /// Append received bytes, dropping those already parsed
    pub fn push_data(&mut self, data: &[u8]) {
        self.source.compact();
        self.source.push(data);
    }
}
