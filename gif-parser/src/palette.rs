//! Palette tables
//!
//! A palette stores the raw RGB triples exactly as they appear in the stream.
//! Turning them into a renderable table is done on request and memoized.

use serde::{Deserialize, Serialize};

/// Maximum number of palette entries
pub const MAX_COLORS: usize = 256;
/// Bytes per palette entry (R, G, B)
pub const BYTES_PER_ENTRY: usize = 3;

/// Byte order of materialized colors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PixelFormat {
    #[default]
    Rgba8888,
    Bgra8888,
}

impl PixelFormat {
    fn pack(self, r: u8, g: u8, b: u8) -> [u8; 4] {
        match self {
            PixelFormat::Rgba8888 => [r, g, b, 0xFF],
            PixelFormat::Bgra8888 => [b, g, r, 0xFF],
        }
    }
}

/// Fully transparent color, used for the transparent index and unused entries
const TRANSPARENT: [u8; 4] = [0, 0, 0, 0];

/// A 256-entry color table in a specific pixel format
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorTable {
    format: PixelFormat,
    colors: [[u8; 4]; MAX_COLORS],
}

impl ColorTable {
    /// Color for a palette index
    pub fn get(&self, index: u8) -> [u8; 4] {
        self.colors[index as usize]
    }

    /// All 256 entries
    pub fn entries(&self) -> &[[u8; 4]; MAX_COLORS] {
        &self.colors
    }

    pub fn format(&self) -> PixelFormat {
        self.format
    }
}

#[derive(Debug, Clone)]
struct CachedTable {
    transparent: Option<u8>,
    table: ColorTable,
}

/// Global or local palette
#[derive(Debug, Clone, Default)]
pub struct Palette {
    entry_count: usize,
    raw: Vec<u8>,
    defined: bool,
    cache: Option<CachedTable>,
}

impl Palette {
    /// Create an undefined palette
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn set_entry_count(&mut self, count: usize) {
        debug_assert!(count <= MAX_COLORS);
        self.entry_count = count.min(MAX_COLORS);
    }

    /// Store the raw triples. The palette is immutable afterwards until the
    /// next definition, which invalidates any materialized table.
    pub(crate) fn set_raw_data(&mut self, data: &[u8]) {
        debug_assert_eq!(data.len(), self.entry_count * BYTES_PER_ENTRY);
        self.raw.clear();
        self.raw.extend_from_slice(data);
        self.defined = true;
        self.cache = None;
    }

    pub fn is_defined(&self) -> bool {
        self.defined
    }

    /// Declared number of entries (0 when undefined)
    pub fn entry_count(&self) -> usize {
        if self.defined {
            self.entry_count
        } else {
            0
        }
    }

    /// Raw RGB triples, `entry_count * 3` bytes
    pub fn raw_data(&self) -> &[u8] {
        &self.raw
    }

    /// RGB triple for an index, if the palette defines it
    pub fn rgb(&self, index: u8) -> Option<[u8; 3]> {
        if !self.contains_index(index) {
            return None;
        }
        let start = index as usize * BYTES_PER_ENTRY;
        let entry = self.raw.get(start..start + BYTES_PER_ENTRY)?;
        Some([entry[0], entry[1], entry[2]])
    }

    /// Whether `index` addresses a defined entry
    pub fn contains_index(&self, index: u8) -> bool {
        (index as usize) < self.entry_count()
    }

    /// Build (or reuse) the color table for this palette.
    ///
    /// Returns `None` for undefined palettes. The transparent index and every
    /// entry past `entry_count` map to fully transparent black.
    pub fn build_table(
        &mut self,
        format: PixelFormat,
        transparent: Option<u8>,
    ) -> Option<&ColorTable> {
        if !self.defined {
            return None;
        }

        let stale = match &self.cache {
            Some(cached) => cached.table.format != format || cached.transparent != transparent,
            None => true,
        };
        if stale {
            let mut colors = [TRANSPARENT; MAX_COLORS];
            for (i, rgb) in self
                .raw
                .chunks_exact(BYTES_PER_ENTRY)
                .take(self.entry_count)
                .enumerate()
            {
                if transparent != Some(i as u8) {
                    colors[i] = format.pack(rgb[0], rgb[1], rgb[2]);
                }
            }
            self.cache = Some(CachedTable {
                transparent,
                table: ColorTable { format, colors },
            });
        }

        self.cache.as_ref().map(|cached| &cached.table)
    }
}
