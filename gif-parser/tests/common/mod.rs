//! Test-only GIF encoder shared by the integration tests

#![allow(dead_code)]

use std::collections::HashMap;

use gif_parser::{GifReader, ReaderOptions, Row, StreamBuffer};

const MAX_CODES: u16 = 4096;

#[derive(Default)]
struct BitWriter {
    out: Vec<u8>,
    acc: u32,
    bits: u32,
}

impl BitWriter {
    fn write(&mut self, code: u16, size: u8) {
        self.acc |= u32::from(code) << self.bits;
        self.bits += u32::from(size);
        while self.bits >= 8 {
            self.out.push(self.acc as u8);
            self.acc >>= 8;
            self.bits -= 8;
        }
    }

    fn finish(mut self) -> Vec<u8> {
        if self.bits > 0 {
            self.out.push(self.acc as u8);
        }
        self.out
    }
}

/// LZW-compress palette indices. Every index must be below `1 << data_size`.
///
/// With `clear_when_full` a clear code follows the 4096th entry; without it
/// the dictionary stays frozen until the end.
pub fn lzw_encode(data_size: u8, pixels: &[u8], clear_when_full: bool) -> Vec<u8> {
    let clear = 1u16 << data_size;
    let end = clear + 1;
    let mut writer = BitWriter::default();
    let mut table: HashMap<(u16, u8), u16> = HashMap::new();
    let mut next = clear + 2;
    let mut size = data_size + 1;

    writer.write(clear, size);
    let mut current: Option<u16> = None;
    for &pixel in pixels {
        let Some(prefix) = current else {
            current = Some(u16::from(pixel));
            continue;
        };
        if let Some(&code) = table.get(&(prefix, pixel)) {
            current = Some(code);
            continue;
        }

        writer.write(prefix, size);
        if next < MAX_CODES {
            table.insert((prefix, pixel), next);
            next += 1;
            if next - 1 == (1 << size) && size < 12 {
                size += 1;
            }
        } else if clear_when_full {
            writer.write(clear, size);
            table.clear();
            next = clear + 2;
            size = data_size + 1;
        }
        current = Some(u16::from(pixel));
    }
    if let Some(prefix) = current {
        writer.write(prefix, size);
    }
    writer.write(end, size);
    writer.finish()
}

/// Split data into length-prefixed sub-blocks plus the terminator
pub fn sub_blocks(data: &[u8], max_len: usize) -> Vec<u8> {
    let mut out = Vec::with_capacity(data.len() + data.len() / max_len + 2);
    for chunk in data.chunks(max_len.clamp(1, 255)) {
        out.push(chunk.len() as u8);
        out.extend_from_slice(chunk);
    }
    out.push(0);
    out
}

/// Row visitation order of an interlaced frame
pub fn interlace_order(height: usize) -> Vec<usize> {
    [(0, 8), (4, 8), (2, 4), (1, 2)]
        .iter()
        .flat_map(|&(start, step)| (start..height).step_by(step))
        .collect()
}

/// Smallest palette size exponent holding `colors` entries
fn size_bits(colors: usize) -> u8 {
    let mut bits = 0;
    while (2usize << bits) < colors {
        bits += 1;
    }
    bits
}

/// Grey ramp palette with `colors` entries (a power of two)
pub fn grey_palette(colors: usize) -> Vec<u8> {
    (0..colors)
        .flat_map(|i| {
            let v = (i * 255 / (colors - 1).max(1)) as u8;
            [v, v, v]
        })
        .collect()
}

#[derive(Debug, Clone)]
pub struct FrameSpec {
    pub x: u16,
    pub y: u16,
    pub width: u16,
    pub height: u16,
    /// Row-major pixel indices
    pub pixels: Vec<u8>,
    pub data_size: u8,
    pub interlaced: bool,
    pub local_palette: Option<Vec<u8>>,
    pub transparent: Option<u8>,
    pub disposal: u8,
    pub delay: u16,
    pub clear_when_full: bool,
    pub block_len: usize,
}

impl FrameSpec {
    pub fn new(width: u16, height: u16, pixels: Vec<u8>) -> Self {
        assert_eq!(pixels.len(), width as usize * height as usize);
        Self {
            x: 0,
            y: 0,
            width,
            height,
            pixels,
            data_size: 8,
            interlaced: false,
            local_palette: None,
            transparent: None,
            disposal: 0,
            delay: 0,
            clear_when_full: true,
            block_len: 255,
        }
    }

    pub fn at(mut self, x: u16, y: u16) -> Self {
        self.x = x;
        self.y = y;
        self
    }

    pub fn data_size(mut self, data_size: u8) -> Self {
        self.data_size = data_size;
        self
    }

    pub fn interlaced(mut self) -> Self {
        self.interlaced = true;
        self
    }

    pub fn transparent(mut self, index: u8) -> Self {
        self.transparent = Some(index);
        self
    }

    pub fn disposal(mut self, disposal: u8) -> Self {
        self.disposal = disposal;
        self
    }

    pub fn local_palette(mut self, palette: Vec<u8>) -> Self {
        self.local_palette = Some(palette);
        self
    }

    /// Pixels in the order the encoder must write them
    fn stream_order(&self) -> Vec<u8> {
        let width = self.width as usize;
        let rows: Vec<usize> = if self.interlaced {
            interlace_order(self.height as usize)
        } else {
            (0..self.height as usize).collect()
        };
        rows.iter()
            .flat_map(|&row| self.pixels[row * width..(row + 1) * width].iter().copied())
            .collect()
    }

    fn encode(&self, out: &mut Vec<u8>) {
        let has_control = self.transparent.is_some() || self.disposal != 0 || self.delay != 0;
        if has_control {
            let flags = (self.disposal << 2) | u8::from(self.transparent.is_some());
            let [lo, hi] = self.delay.to_le_bytes();
            out.extend_from_slice(&[
                0x21,
                0xF9,
                0x04,
                flags,
                lo,
                hi,
                self.transparent.unwrap_or(0),
                0x00,
            ]);
        }

        out.push(0x2C);
        for value in [self.x, self.y, self.width, self.height] {
            out.extend_from_slice(&value.to_le_bytes());
        }
        let mut flags = 0u8;
        if self.interlaced {
            flags |= 0x40;
        }
        if let Some(palette) = &self.local_palette {
            flags |= 0x80 | size_bits(palette.len() / 3);
        }
        out.push(flags);
        if let Some(palette) = &self.local_palette {
            out.extend_from_slice(palette);
        }

        out.push(self.data_size);
        let compressed = lzw_encode(self.data_size, &self.stream_order(), self.clear_when_full);
        out.extend(sub_blocks(&compressed, self.block_len));
    }
}

#[derive(Debug, Clone)]
pub struct GifBuilder {
    pub width: u16,
    pub height: u16,
    pub global_palette: Option<Vec<u8>>,
    pub loop_count: Option<u16>,
    pub comment: Option<Vec<u8>>,
    pub frames: Vec<FrameSpec>,
    pub trailer: bool,
}

impl GifBuilder {
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            global_palette: Some(grey_palette(256)),
            loop_count: None,
            comment: None,
            frames: Vec::new(),
            trailer: true,
        }
    }

    pub fn frame(mut self, frame: FrameSpec) -> Self {
        self.frames.push(frame);
        self
    }

    pub fn loop_count(mut self, count: u16) -> Self {
        self.loop_count = Some(count);
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let mut out = b"GIF89a".to_vec();
        out.extend_from_slice(&self.width.to_le_bytes());
        out.extend_from_slice(&self.height.to_le_bytes());
        match &self.global_palette {
            Some(palette) => out.push(0x80 | size_bits(palette.len() / 3)),
            None => out.push(0x00),
        }
        out.extend_from_slice(&[0x00, 0x00]);
        if let Some(palette) = &self.global_palette {
            out.extend_from_slice(palette);
        }

        if let Some(count) = self.loop_count {
            out.extend_from_slice(&[0x21, 0xFF, 0x0B]);
            out.extend_from_slice(b"NETSCAPE2.0");
            let [lo, hi] = count.to_le_bytes();
            out.extend_from_slice(&[0x03, 0x01, lo, hi, 0x00]);
        }
        if let Some(comment) = &self.comment {
            out.extend_from_slice(&[0x21, 0xFE]);
            out.extend(sub_blocks(comment, 255));
        }

        for frame in &self.frames {
            frame.encode(&mut out);
        }
        if self.trailer {
            out.push(0x3B);
        }
        out
    }
}

/// Decode a frame into a row-major index buffer, writing rows at their true index
pub fn decode_frame(reader: &mut GifReader<StreamBuffer>, index: usize) -> Vec<u8> {
    let frame = reader.frame_context(index).expect("frame parsed");
    let width = frame.width() as usize;
    let mut buffer = vec![0u8; width * frame.height() as usize];
    reader
        .decode(index, &mut |row: Row<'_>| {
            let start = row.index * width;
            buffer[start..start + width].copy_from_slice(row.pixels);
        })
        .expect("frame decodes");
    buffer
}

/// Parse a complete stream with default options
pub fn parse_all(data: Vec<u8>) -> GifReader<StreamBuffer> {
    let mut reader = GifReader::from_bytes(data, ReaderOptions::default());
    reader
        .parse(gif_parser::ParseQuery::FrameCount)
        .expect("stream parses");
    reader
}
