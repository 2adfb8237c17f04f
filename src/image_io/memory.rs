//! In-memory image source

use std::io;

use super::{ColorKind, ImageInfo, RowSource};
use crate::color::Color;
use crate::error::{Error, Result};
use crate::geometry::Offset;

/// A fully decoded image served row by row, with the same contract as a
/// [`PngReader`](super::PngReader).
#[derive(Debug, Clone)]
pub struct MemoryImage {
    name: String,
    info: ImageInfo,
    pixels: Vec<u8>,
    next_row: u32,
}

impl MemoryImage {
    /// Wrap raw pixels. `pixels` holds `height` rows of
    /// [`ImageInfo::row_bytes`] each.
    pub fn new(name: impl Into<String>, info: ImageInfo, pixels: Vec<u8>) -> Self {
        debug_assert_eq!(pixels.len(), info.row_bytes() * info.height as usize);
        Self { name: name.into(), info, pixels, next_row: 0 }
    }

    pub fn rgb(name: impl Into<String>, width: u32, height: u32, pixels: Vec<u8>) -> Self {
        Self::new(name, Self::direct_info(width, height, ColorKind::Rgb), pixels)
    }

    pub fn rgba(name: impl Into<String>, width: u32, height: u32, pixels: Vec<u8>) -> Self {
        Self::new(name, Self::direct_info(width, height, ColorKind::Rgba), pixels)
    }

    /// Indexed image with its own palette and optional tRNS alpha values.
    pub fn indexed(
        name: impl Into<String>,
        width: u32,
        height: u32,
        palette: Vec<Color>,
        transparency: Option<Vec<u8>>,
        offset: Offset,
        pixels: Vec<u8>,
    ) -> Self {
        let info = ImageInfo {
            width,
            height,
            kind: ColorKind::Indexed,
            bit_depth: 8,
            palette: Some(palette),
            transparency,
            offset,
        };
        Self::new(name, info, pixels)
    }

    fn direct_info(width: u32, height: u32, kind: ColorKind) -> ImageInfo {
        ImageInfo {
            width,
            height,
            kind,
            bit_depth: 8,
            palette: None,
            transparency: None,
            offset: Offset::ZERO,
        }
    }
}

impl RowSource for MemoryImage {
    fn name(&self) -> &str {
        &self.name
    }

    fn info(&self) -> &ImageInfo {
        &self.info
    }

    fn read_row(&mut self, buf: &mut [u8]) -> Result<()> {
        let row_bytes = self.info.row_bytes();
        if self.next_row >= self.info.height || buf.len() != row_bytes {
            return Err(Error::io(
                &self.name,
                io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    format!("no row {} of {} bytes", self.next_row, buf.len()),
                ),
            ));
        }
        let start = self.next_row as usize * row_bytes;
        buf.copy_from_slice(&self.pixels[start..start + row_bytes]);
        self.next_row += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rows_in_order_then_eof() {
        let mut image = MemoryImage::rgb("m", 1, 2, vec![1, 2, 3, 4, 5, 6]);
        let mut row = [0u8; 3];
        image.read_row(&mut row).unwrap();
        assert_eq!(row, [1, 2, 3]);
        image.read_row(&mut row).unwrap();
        assert_eq!(row, [4, 5, 6]);
        assert!(image.read_row(&mut row).is_err());
    }
}
