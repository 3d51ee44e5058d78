//! LZW decompressor for GIF image data
//!
//! Variable-length codes are read LSB-first from a 32-bit accumulator. The
//! dictionary lives in three fixed 4096-entry arrays (prefix code, suffix
//! byte, chain length) so a run can be written back-to-front straight into
//! the scanline buffer without an intermediate stack.
//!
//! Decoding is resumable at any byte: a sub-block may end in the middle of a
//! code and the leftover bits stay in the accumulator for the next call.
//!
//! Rows are handed to a [`RowSink`] as soon as a full scanline is available,
//! tagged with their true row index. Interlaced frames visit rows in the four
//! standard passes:
//!
//! | Pass | First row | Step |
//! |------|-----------|------|
//! | 1    | 0         | 8    |
//! | 2    | 4         | 8    |
//! | 3    | 2         | 4    |
//! | 4    | 1         | 2    |

use std::fmt;
use std::ops::RangeInclusive;

use crate::error::{Error, Result};

/// Widest code the dictionary can address
pub const MAX_DICTIONARY_ENTRY_BITS: u8 = 12;
/// Dictionary capacity (2^12)
pub const MAX_DICTIONARY_ENTRIES: usize = 1 << MAX_DICTIONARY_ENTRY_BITS;

/// Read-only view of the frame being decoded.
///
/// Passed into every call instead of being stored, so the decoder never holds
/// a reference back to the frame that owns it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LzwParams {
    pub frame_id: usize,
    pub width: usize,
    pub height: usize,
    /// LZW minimum code size from the stream
    pub data_size: u8,
    pub interlaced: bool,
    pub progressive_display: bool,
    pub required_frame: Option<usize>,
    pub transparent_pixel: Option<u8>,
}

/// One decoded scanline
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row<'a> {
    /// Frame the row belongs to
    pub frame: usize,
    /// True row index within the frame
    pub index: usize,
    /// Rows this scanline may be replicated into while the frame is still
    /// arriving (progressive interlaced display). Equals `index..=index`
    /// for every other frame.
    pub span: RangeInclusive<usize>,
    /// Palette indices, exactly one frame width
    pub pixels: &'a [u8],
    /// Transparent index, if it falls inside the frame's palette
    pub transparent: Option<u8>,
    /// Whether transparent pixels must still be written to the output
    pub write_transparent: bool,
}

/// Consumer of decoded rows
pub trait RowSink {
    fn emit_row(&mut self, row: Row<'_>);
}

impl<F> RowSink for F
where
    F: FnMut(Row<'_>),
{
    fn emit_row(&mut self, row: Row<'_>) {
        self(row)
    }
}

/// LZW decoder state for one frame
pub struct LzwDecoder {
    data_size: u8,
    code_size: u8,
    code_mask: u32,
    clear_code: usize,
    /// Next free dictionary slot
    avail: usize,
    old_code: Option<usize>,
    first_char: u8,
    /// Bit accumulator and the number of unread bits in it
    datum: u32,
    bits: u32,
    /// Interlace pass, 1-4 while interlaced, 0 otherwise
    pass: u8,
    row: usize,
    rows_remaining: usize,
    end_seen: bool,
    transparent: Option<u8>,
    always_write_transparent: bool,
    prefix: Box<[u16; MAX_DICTIONARY_ENTRIES]>,
    suffix: Box<[u8; MAX_DICTIONARY_ENTRIES]>,
    suffix_length: Box<[u16; MAX_DICTIONARY_ENTRIES]>,
    /// Partial scanline plus room for the longest possible run
    row_buffer: Vec<u8>,
    row_fill: usize,
}

impl LzwDecoder {
    /// Set up a decoder for a frame whose palette has `palette_colors` entries
    pub fn new(params: &LzwParams, palette_colors: usize) -> Result<Self> {
        let data_size = params.data_size;
        if data_size == 0 || data_size >= MAX_DICTIONARY_ENTRY_BITS {
            return Err(Error::InvalidCodeSize(data_size));
        }
        if params.width == 0 || params.height == 0 {
            return Err(Error::EmptyFrame);
        }

        let clear_code = 1usize << data_size;
        let code_size = data_size + 1;

        let mut suffix = Box::new([0u8; MAX_DICTIONARY_ENTRIES]);
        let mut suffix_length = Box::new([0u16; MAX_DICTIONARY_ENTRIES]);
        for code in 0..clear_code {
            suffix[code] = code as u8;
            suffix_length[code] = 1;
        }

        log::debug!(
            "frame {}: LZW decoder ready ({}x{}, data size {}, interlaced {})",
            params.frame_id,
            params.width,
            params.height,
            data_size,
            params.interlaced
        );

        Ok(Self {
            data_size,
            code_size,
            code_mask: (1 << code_size) - 1,
            clear_code,
            avail: clear_code + 2,
            old_code: None,
            first_char: 0,
            datum: 0,
            bits: 0,
            pass: if params.interlaced { 1 } else { 0 },
            row: 0,
            rows_remaining: params.height,
            end_seen: false,
            transparent: params
                .transparent_pixel
                .filter(|&index| (index as usize) < palette_colors),
            always_write_transparent: !params.interlaced && params.required_frame.is_none(),
            prefix: Box::new([0u16; MAX_DICTIONARY_ENTRIES]),
            suffix,
            suffix_length,
            row_buffer: vec![0; params.width + MAX_DICTIONARY_ENTRIES],
            row_fill: 0,
        })
    }

    /// Whether rows are still expected
    pub fn has_remaining_rows(&self) -> bool {
        self.rows_remaining > 0
    }

    /// All rows emitted, or the end-of-information code was read
    pub fn is_finished(&self) -> bool {
        self.rows_remaining == 0 || self.end_seen
    }

    pub fn rows_remaining(&self) -> usize {
        self.rows_remaining
    }

    /// Next free dictionary slot
    pub fn avail(&self) -> usize {
        self.avail
    }

    /// Current code width in bits
    pub fn code_size(&self) -> u8 {
        self.code_size
    }

    fn end_code(&self) -> usize {
        self.clear_code + 1
    }

    fn reset_dictionary(&mut self) {
        self.code_size = self.data_size + 1;
        self.code_mask = (1 << self.code_size) - 1;
        self.avail = self.clear_code + 2;
        self.old_code = None;
    }

    /// Decompress one sub-block, emitting every row it completes.
    pub fn do_lzw<K>(&mut self, params: &LzwParams, block: &[u8], sink: &mut K) -> Result<()>
    where
        K: RowSink + ?Sized,
    {
        if self.is_finished() {
            return Ok(());
        }

        for &byte in block {
            self.datum |= u32::from(byte) << self.bits;
            self.bits += 8;

            while self.bits >= u32::from(self.code_size) {
                let code = (self.datum & self.code_mask) as usize;
                self.datum >>= self.code_size;
                self.bits -= u32::from(self.code_size);

                if code == self.clear_code {
                    self.reset_dictionary();
                    continue;
                }

                if code == self.end_code() {
                    log::trace!(
                        "frame {}: end code with {} rows remaining",
                        params.frame_id,
                        self.rows_remaining
                    );
                    self.end_seen = true;
                    return Ok(());
                }

                self.write_run(code)?;

                let width = params.width;
                let mut row_begin = 0;
                while row_begin + width <= self.row_fill {
                    self.output_row(params, row_begin, sink);
                    row_begin += width;
                    self.rows_remaining -= 1;
                    if self.rows_remaining == 0 {
                        return Ok(());
                    }
                }

                if row_begin > 0 {
                    self.row_buffer.copy_within(row_begin..self.row_fill, 0);
                    self.row_fill -= row_begin;
                }
            }
        }

        Ok(())
    }

    /// Expand `code` into the row buffer and grow the dictionary.
    fn write_run(&mut self, code: usize) -> Result<()> {
        let (run_length, mut current, self_referential) = if code < self.avail {
            (usize::from(self.suffix_length[code]), code, false)
        } else {
            match self.old_code {
                // KwKwK: the previous run followed by its own first byte
                Some(old) if code == self.avail => {
                    (usize::from(self.suffix_length[old]) + 1, old, true)
                }
                _ => {
                    return Err(Error::InvalidCode {
                        code: code as u16,
                        avail: self.avail as u16,
                    })
                }
            }
        };

        let start = self.row_fill;
        let end = start + run_length;
        if end > self.row_buffer.len() {
            return Err(Error::CorruptDictionary);
        }

        let mut pos = end;
        if self_referential {
            pos -= 1;
            self.row_buffer[pos] = self.first_char;
        }
        while current >= self.clear_code {
            if pos == start {
                return Err(Error::CorruptDictionary);
            }
            pos -= 1;
            self.row_buffer[pos] = self.suffix[current];
            current = usize::from(self.prefix[current]);
        }
        if pos != start + 1 {
            return Err(Error::CorruptDictionary);
        }
        self.first_char = self.suffix[current];
        self.row_buffer[start] = self.first_char;

        if let Some(old) = self.old_code {
            if self.avail < MAX_DICTIONARY_ENTRIES {
                self.prefix[self.avail] = old as u16;
                self.suffix[self.avail] = self.first_char;
                self.suffix_length[self.avail] = self.suffix_length[old] + 1;
                self.avail += 1;

                if self.avail >= (1 << self.code_size)
                    && self.code_size < MAX_DICTIONARY_ENTRY_BITS
                {
                    self.code_size += 1;
                    self.code_mask = (1 << self.code_size) - 1;
                }
            }
        }
        self.old_code = Some(code);
        self.row_fill = end;

        Ok(())
    }

    fn output_row<K>(&mut self, params: &LzwParams, row_begin: usize, sink: &mut K)
    where
        K: RowSink + ?Sized,
    {
        let height = params.height;
        let progressive = params.progressive_display && params.interlaced;

        if self.row < height {
            let span = if progressive && self.pass < 4 {
                self.progressive_span(height)
            } else {
                self.row..=self.row
            };
            sink.emit_row(Row {
                frame: params.frame_id,
                index: self.row,
                span,
                pixels: &self.row_buffer[row_begin..row_begin + params.width],
                transparent: self.transparent,
                write_transparent: self.always_write_transparent
                    || (progressive && self.pass > 1),
            });
        }

        self.advance_row(height);
    }

    /// Rows to replicate into during an early interlace pass, shifted up so
    /// the image does not appear to crawl as later passes fill it in.
    fn progressive_span(&self, height: usize) -> RangeInclusive<usize> {
        let (dup, shift): (isize, isize) = match self.pass {
            1 => (7, 3),
            2 => (3, 1),
            3 => (1, 0),
            _ => (0, 0),
        };
        let last = height as isize - 1;
        let mut start = self.row as isize - shift;
        let mut end = start + dup;

        // Cover the bottom edge left behind by the upward shift
        if end <= last && last - end <= shift {
            end = last;
        }
        start = start.max(0);
        end = end.min(last);

        start as usize..=end as usize
    }

    fn advance_row(&mut self, height: usize) {
        if self.pass == 0 {
            self.row += 1;
            return;
        }

        loop {
            let (step, next_start) = match self.pass {
                1 => (8, 4),
                2 => (8, 2),
                3 => (4, 1),
                4 => (2, 0),
                _ => return,
            };
            self.row += step;
            if self.row >= height {
                self.pass += 1;
                self.row = next_start;
            }
            if self.row < height {
                break;
            }
        }
    }
}

impl fmt::Debug for LzwDecoder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LzwDecoder")
            .field("code_size", &self.code_size)
            .field("avail", &self.avail)
            .field("pass", &self.pass)
            .field("row", &self.row)
            .field("rows_remaining", &self.rows_remaining)
            .field("end_seen", &self.end_seen)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Pack codes LSB-first, tracking code width the same way the decoder does.
    fn pack_codes(data_size: u8, codes: &[u16]) -> Vec<u8> {
        let clear = 1u16 << data_size;
        let mut size = data_size + 1;
        let mut avail = clear + 2;
        let mut have_old = false;
        let mut out = Vec::new();
        let mut acc: u32 = 0;
        let mut nbits = 0u32;

        for &code in codes {
            acc |= u32::from(code) << nbits;
            nbits += u32::from(size);
            while nbits >= 8 {
                out.push(acc as u8);
                acc >>= 8;
                nbits -= 8;
            }

            if code == clear {
                size = data_size + 1;
                avail = clear + 2;
                have_old = false;
                continue;
            }
            if code == clear + 1 {
                continue;
            }
            if have_old && (avail as usize) < MAX_DICTIONARY_ENTRIES {
                avail += 1;
                if avail >= (1 << size) && size < MAX_DICTIONARY_ENTRY_BITS {
                    size += 1;
                }
            }
            have_old = true;
        }
        if nbits > 0 {
            out.push(acc as u8);
        }
        out
    }

    fn params(width: usize, height: usize, data_size: u8) -> LzwParams {
        LzwParams {
            frame_id: 0,
            width,
            height,
            data_size,
            interlaced: false,
            progressive_display: false,
            required_frame: None,
            transparent_pixel: None,
        }
    }

    fn decode_rows(params: &LzwParams, blocks: &[&[u8]]) -> Result<Vec<(usize, Vec<u8>)>> {
        let mut decoder = LzwDecoder::new(params, 256)?;
        let mut rows = Vec::new();
        let mut sink = |row: Row<'_>| rows.push((row.index, row.pixels.to_vec()));
        for block in blocks {
            decoder.do_lzw(params, block, &mut sink)?;
        }
        Ok(rows)
    }

    // 10x10 sample image from "What's In A GIF" (4 colors, data size 2)
    const SAMPLE_DATA: [u8; 22] = [
        0x8C, 0x2D, 0x99, 0x87, 0x2A, 0x1C, 0xDC, 0x33, 0xA0, 0x02, 0x75, 0xEC, 0x95, 0xFA,
        0xA8, 0xDE, 0x60, 0x8C, 0x04, 0x91, 0x4C, 0x01,
    ];

    const SAMPLE_PIXELS: [[u8; 10]; 10] = [
        [1, 1, 1, 1, 1, 2, 2, 2, 2, 2],
        [1, 1, 1, 1, 1, 2, 2, 2, 2, 2],
        [1, 1, 1, 1, 1, 2, 2, 2, 2, 2],
        [1, 1, 1, 0, 0, 0, 0, 2, 2, 2],
        [1, 1, 1, 0, 0, 0, 0, 2, 2, 2],
        [2, 2, 2, 0, 0, 0, 0, 1, 1, 1],
        [2, 2, 2, 0, 0, 0, 0, 1, 1, 1],
        [2, 2, 2, 2, 2, 1, 1, 1, 1, 1],
        [2, 2, 2, 2, 2, 1, 1, 1, 1, 1],
        [2, 2, 2, 2, 2, 1, 1, 1, 1, 1],
    ];

    #[test]
    fn test_sample_image() {
        let params = params(10, 10, 2);
        let rows = decode_rows(&params, &[&SAMPLE_DATA]).unwrap();

        assert_eq!(rows.len(), 10);
        for (i, (index, pixels)) in rows.iter().enumerate() {
            assert_eq!(*index, i);
            assert_eq!(pixels.as_slice(), &SAMPLE_PIXELS[i]);
        }
    }

    #[test]
    fn test_byte_at_a_time_matches_whole_block() {
        let params = params(10, 10, 2);
        let whole = decode_rows(&params, &[&SAMPLE_DATA]).unwrap();

        let blocks: Vec<&[u8]> = SAMPLE_DATA.chunks(1).collect();
        let split = decode_rows(&params, &blocks).unwrap();
        assert_eq!(whole, split);
    }

    #[test]
    fn test_self_referential_code() {
        // clear, 1, then code 6 == avail: "1" followed by its first byte
        let data = pack_codes(2, &[4, 1, 6, 5]);
        let params = params(3, 1, 2);
        let rows = decode_rows(&params, &[&data]).unwrap();
        assert_eq!(rows, vec![(0, vec![1, 1, 1])]);
    }

    #[test]
    fn test_code_beyond_avail_is_fatal() {
        let data = pack_codes(2, &[4, 1, 7]);
        let params = params(8, 1, 2);
        assert_eq!(
            decode_rows(&params, &[&data]),
            Err(Error::InvalidCode { code: 7, avail: 6 })
        );
    }

    #[test]
    fn test_new_code_without_previous_is_fatal() {
        let data = pack_codes(2, &[4, 6]);
        let params = params(8, 1, 2);
        assert_eq!(
            decode_rows(&params, &[&data]),
            Err(Error::InvalidCode { code: 6, avail: 6 })
        );
    }

    #[test]
    fn test_invalid_data_size() {
        assert_eq!(
            LzwDecoder::new(&params(1, 1, 0), 2).err(),
            Some(Error::InvalidCodeSize(0))
        );
        assert_eq!(
            LzwDecoder::new(&params(1, 1, 12), 2).err(),
            Some(Error::InvalidCodeSize(12))
        );
        assert!(LzwDecoder::new(&params(1, 1, 11), 2).is_ok());
    }

    #[test]
    fn test_end_code_stops_decoding() {
        let data = pack_codes(2, &[4, 1, 2, 5, 3]);
        let params = params(4, 1, 2);
        let mut decoder = LzwDecoder::new(&params, 4).unwrap();
        let mut rows = 0;
        decoder
            .do_lzw(&params, &data, &mut |_row: Row<'_>| rows += 1)
            .unwrap();

        assert_eq!(rows, 0);
        assert!(decoder.is_finished());
        assert!(decoder.has_remaining_rows());
    }

    #[test]
    fn test_full_dictionary_then_clear() {
        // Literal 0 repeated until the dictionary holds 4096 entries, then an
        // existing code, another literal, and a clear code.
        let mut codes = vec![4u16];
        codes.extend(std::iter::repeat(0).take(1 + 4090));
        codes.push(4095);
        codes.push(3);
        codes.extend([4, 2, 2]);
        let data = pack_codes(2, &codes);

        let params = params(4096, 1, 2);
        let mut decoder = LzwDecoder::new(&params, 4).unwrap();
        let mut pixels = Vec::new();
        let mut max_avail = 0;
        for byte in data.chunks(1) {
            decoder
                .do_lzw(&params, byte, &mut |row: Row<'_>| {
                    pixels.extend_from_slice(row.pixels)
                })
                .unwrap();
            max_avail = max_avail.max(decoder.avail());
            assert!(decoder.code_size() <= MAX_DICTIONARY_ENTRY_BITS);
        }

        assert_eq!(max_avail, MAX_DICTIONARY_ENTRIES);
        // Clear reset the dictionary, one entry was added after it
        assert_eq!(decoder.avail(), 7);
        assert_eq!(decoder.code_size(), 3);

        assert_eq!(pixels.len(), 4096);
        assert!(pixels[..4093].iter().all(|&p| p == 0));
        assert_eq!(&pixels[4093..], &[3, 2, 2]);
    }

    #[test]
    fn test_interlaced_row_order() {
        // One literal per row; the pixel value is the emission order
        let height = 20;
        let mut codes = vec![32u16];
        codes.extend(0..height as u16);
        codes.push(33);
        let data = pack_codes(5, &codes);

        let mut params = params(1, height, 5);
        params.interlaced = true;
        let rows = decode_rows(&params, &[&data]).unwrap();

        let order: Vec<usize> = rows.iter().map(|(index, _)| *index).collect();
        assert_eq!(
            order,
            vec![0, 8, 16, 4, 12, 2, 6, 10, 14, 18, 1, 3, 5, 7, 9, 11, 13, 15, 17, 19]
        );
        for (k, (_, pixels)) in rows.iter().enumerate() {
            assert_eq!(pixels[0] as usize, k);
        }
    }

    #[test]
    fn test_progressive_span() {
        let height = 16;
        let mut codes = vec![32u16];
        codes.extend(0..height as u16);
        let data = pack_codes(5, &codes);

        let mut params = params(1, height, 5);
        params.interlaced = true;
        params.progressive_display = true;

        let mut decoder = LzwDecoder::new(&params, 32).unwrap();
        let mut spans = Vec::new();
        decoder
            .do_lzw(&params, &data, &mut |row: Row<'_>| {
                spans.push((row.index, row.span.clone(), row.write_transparent))
            })
            .unwrap();

        // Pass 1: shifted up by 3, replicated over 8 rows
        assert_eq!(spans[0], (0, 0..=4, false));
        // Within the shift of the bottom edge, so extended to the last row
        assert_eq!(spans[1], (8, 5..=15, false));
        // Pass 2 reaches the bottom edge
        assert_eq!(spans[3], (12, 11..=15, true));
        // Pass 4 is never replicated
        assert_eq!(spans[15], (15, 15..=15, true));
    }

    #[test]
    fn test_transparent_policy() {
        let data = pack_codes(2, &[4, 1, 5]);

        let mut independent = params(1, 1, 2);
        independent.transparent_pixel = Some(1);
        let mut decoder = LzwDecoder::new(&independent, 4).unwrap();
        let mut seen = None;
        decoder
            .do_lzw(&independent, &data, &mut |row: Row<'_>| {
                seen = Some((row.transparent, row.write_transparent))
            })
            .unwrap();
        assert_eq!(seen, Some((Some(1), true)));

        // Dependent frame, transparent index outside a 1-entry palette
        let mut dependent = independent;
        dependent.required_frame = Some(0);
        let mut decoder = LzwDecoder::new(&dependent, 1).unwrap();
        let mut seen = None;
        decoder
            .do_lzw(&dependent, &data, &mut |row: Row<'_>| {
                seen = Some((row.transparent, row.write_transparent))
            })
            .unwrap();
        assert_eq!(seen, Some((None, false)));
    }
}
