//! Stream reports
//!
//! A `StreamReport` is a plain snapshot of what the parser learned about a
//! stream. It serializes to JSON for tooling and renders as text for humans.

use std::fmt;

use gif_parser::{ByteSource, DisposalMethod, FrameRect, GifReader, GifVersion};
use serde::Serialize;

/// Result of decoding one frame
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "kebab-case")]
pub enum DecodeOutcome {
    Complete { rows: usize },
    Incomplete,
    Failed { error: String },
}

/// Summary of a single frame
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FrameReport {
    pub index: usize,
    pub rect: FrameRect,
    pub delay_ms: u32,
    pub disposal: DisposalMethod,
    pub transparent_pixel: Option<u8>,
    /// Frame that must be composited before this one
    pub required_frame: Option<usize>,
    pub interlaced: bool,
    /// Entry count of the local color table, if the frame has one
    pub local_palette_colors: Option<usize>,
    /// Total length of the buffered LZW sub-blocks
    pub compressed_bytes: usize,
    /// All image data has been read
    pub complete: bool,
    /// Set when frames were decoded
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decoded: Option<DecodeOutcome>,
}

/// Summary of a parsed stream
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StreamReport {
    pub version: Option<GifVersion>,
    pub screen_width: u32,
    pub screen_height: u32,
    pub background_index: u8,
    pub global_palette_colors: Option<usize>,
    /// Netscape loop count; `Some(0)` loops forever
    pub loop_count: Option<u16>,
    pub images_count: usize,
    /// The trailer (or end of parseable data) was reached
    pub parse_completed: bool,
    pub first_frame_has_alpha: Option<bool>,
    pub first_frame_supports_index8: Option<bool>,
    pub comments: Vec<String>,
    pub frames: Vec<FrameReport>,
}

impl StreamReport {
    /// Snapshot everything the reader has parsed so far
    pub fn from_reader<S: ByteSource>(reader: &GifReader<S>) -> Self {
        let global = reader.global_palette();
        let frames = (0..reader.images_count())
            .filter_map(|index| reader.frame_context(index))
            .map(|frame| {
                let local = frame.local_palette();
                FrameReport {
                    index: frame.frame_id(),
                    rect: frame.rect(),
                    delay_ms: frame.delay_ms(),
                    disposal: frame.disposal(),
                    transparent_pixel: frame.transparent_pixel(),
                    required_frame: frame.required_frame(),
                    interlaced: frame.interlaced(),
                    local_palette_colors: local.is_defined().then(|| local.entry_count()),
                    compressed_bytes: frame.compressed_len(),
                    complete: frame.is_complete(),
                    decoded: None,
                }
            })
            .collect();

        Self {
            version: reader.version(),
            screen_width: reader.screen_width(),
            screen_height: reader.screen_height(),
            background_index: reader.background_index(),
            global_palette_colors: global.is_defined().then(|| global.entry_count()),
            loop_count: reader.loop_count(),
            images_count: reader.images_count(),
            parse_completed: reader.is_parse_completed(),
            first_frame_has_alpha: reader.first_frame_has_alpha(),
            first_frame_supports_index8: reader.first_frame_supports_index8(),
            comments: reader
                .comments()
                .map(|comment| String::from_utf8_lossy(comment).into_owned())
                .collect(),
            frames,
        }
    }

    pub fn set_decode_outcome(&mut self, index: usize, outcome: DecodeOutcome) {
        if let Some(frame) = self.frames.iter_mut().find(|frame| frame.index == index) {
            frame.decoded = Some(outcome);
        }
    }

    pub fn has_decode_failures(&self) -> bool {
        self.frames
            .iter()
            .any(|frame| matches!(frame.decoded, Some(DecodeOutcome::Failed { .. })))
    }
}

fn optional<T: fmt::Display>(value: Option<T>) -> String {
    value.map_or_else(|| "-".to_string(), |v| v.to_string())
}

impl fmt::Display for StreamReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Version:     {}", optional(self.version))?;
        writeln!(f, "Screen:      {}x{}", self.screen_width, self.screen_height)?;
        writeln!(f, "Background:  {}", self.background_index)?;
        writeln!(f, "Palette:     {}", optional(self.global_palette_colors))?;
        match self.loop_count {
            Some(0) => writeln!(f, "Loop count:  forever")?,
            other => writeln!(f, "Loop count:  {}", optional(other))?,
        }
        writeln!(f, "Frames:      {}", self.images_count)?;
        writeln!(f, "Completed:   {}", self.parse_completed)?;
        writeln!(f, "Has alpha:   {}", optional(self.first_frame_has_alpha))?;
        writeln!(f, "Index8:      {}", optional(self.first_frame_supports_index8))?;
        for comment in &self.comments {
            writeln!(f, "Comment:     {}", comment)?;
        }

        for frame in &self.frames {
            writeln!(f)?;
            writeln!(
                f,
                "Frame {}: {}x{} at ({}, {}), {} ms, {:?}",
                frame.index,
                frame.rect.width,
                frame.rect.height,
                frame.rect.x,
                frame.rect.y,
                frame.delay_ms,
                frame.disposal
            )?;
            writeln!(
                f,
                "  transparent {}, requires {}, interlaced {}, local palette {}",
                optional(frame.transparent_pixel),
                optional(frame.required_frame),
                frame.interlaced,
                optional(frame.local_palette_colors)
            )?;
            write!(
                f,
                "  {} compressed bytes{}",
                frame.compressed_bytes,
                if frame.complete { "" } else { " (incomplete)" }
            )?;
            match &frame.decoded {
                Some(DecodeOutcome::Complete { rows }) => write!(f, ", decoded {} rows", rows)?,
                Some(DecodeOutcome::Incomplete) => write!(f, ", decode incomplete")?,
                Some(DecodeOutcome::Failed { error }) => write!(f, ", decode failed: {}", error)?,
                None => {}
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
