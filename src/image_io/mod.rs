//! Row-streaming image sources and sinks
//!
//! Compile and link never hold a whole canvas in memory: they pull one row at
//! a time from a [`RowSource`] and push one row at a time into a [`RowSink`].
//! PNG files are the on-disk implementation; [`MemoryImage`] is the in-memory
//! one used by tests and benches.

mod memory;
mod offs;
mod reader;
mod writer;

pub use memory::MemoryImage;
pub use offs::{encode_offset, read_offset};
pub use reader::PngReader;
pub use writer::PngWriter;

use std::fmt;

use crate::color::Color;
use crate::error::Result;
use crate::geometry::Offset;

/// Pixel layout of a source image. Only 8-bit depths are accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorKind {
    Rgb,
    Rgba,
    Indexed,
}

impl ColorKind {
    pub fn bytes_per_pixel(self) -> usize {
        match self {
            ColorKind::Rgb => 3,
            ColorKind::Rgba => 4,
            ColorKind::Indexed => 1,
        }
    }
}

impl fmt::Display for ColorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ColorKind::Rgb => "RGB",
            ColorKind::Rgba => "RGBA",
            ColorKind::Indexed => "indexed",
        })
    }
}

/// Metadata of an opened image.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageInfo {
    pub width: u32,
    pub height: u32,
    pub kind: ColorKind,
    pub bit_depth: u8,
    /// Full PLTE contents (indexed images only)
    pub palette: Option<Vec<Color>>,
    /// tRNS alpha values, one per leading palette entry (indexed images only)
    pub transparency: Option<Vec<u8>>,
    /// Pixel-unit placement, zero when the image has no offset
    pub offset: Offset,
}

impl ImageInfo {
    /// Bytes in one decoded row.
    pub fn row_bytes(&self) -> usize {
        self.width as usize * self.kind.bytes_per_pixel()
    }

    pub fn pixel_count(&self) -> u64 {
        self.width as u64 * self.height as u64
    }
}

/// An image that can be read one row at a time, top to bottom.
pub trait RowSource {
    /// Name used in diagnostics, usually the file path.
    fn name(&self) -> &str;

    fn info(&self) -> &ImageInfo;

    /// Read the next row into `buf`, which must be exactly
    /// [`ImageInfo::row_bytes`] long.
    fn read_row(&mut self, buf: &mut [u8]) -> Result<()>;
}

/// Destination for rows, written top to bottom.
pub trait RowSink {
    fn write_row(&mut self, row: &[u8]) -> Result<()>;
}

/// Collects rows in memory.
impl RowSink for Vec<Vec<u8>> {
    fn write_row(&mut self, row: &[u8]) -> Result<()> {
        self.push(row.to_vec());
        Ok(())
    }
}
