//! Tile compilation
//!
//! Turns one RGBA or indexed source image into an indexed [`Tile`] whose
//! pixels are indices into a shared [`Palette`], tagged with a placement
//! offset.

use std::path::Path;

use log::debug;

use crate::color::Color;
use crate::error::{Error, Result, Warning, WarningKind};
use crate::geometry::Offset;
use crate::image_io::{ColorKind, MemoryImage, PngWriter, RowSink, RowSource};
use crate::palette::{remap, Palette, TRANSPARENT};

/// A compiled tile: one palette index per pixel, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tile {
    pub width: u32,
    pub height: u32,
    pub offset: Offset,
    pub palette: Palette,
    pub pixels: Vec<u8>,
}

impl Tile {
    pub fn row(&self, y: u32) -> &[u8] {
        let start = y as usize * self.width as usize;
        &self.pixels[start..start + self.width as usize]
    }

    /// Stream the tile to `sink`, one row at a time.
    pub fn write_rows<K: RowSink>(&self, sink: &mut K) -> Result<()> {
        for y in 0..self.height {
            sink.write_row(self.row(y))?;
        }
        Ok(())
    }

    /// Write the tile as an indexed PNG carrying its palette and offset.
    pub fn save(&self, path: &Path, compression: png::Compression) -> Result<()> {
        let mut writer = PngWriter::create(
            path,
            self.width,
            self.height,
            &self.palette,
            self.offset,
            compression,
        )?;
        self.write_rows(&mut writer)?;
        writer.finish()
    }

    /// The tile as it would read back from disk: indexed, slot 0 transparent.
    pub fn into_image(self, name: impl Into<String>) -> MemoryImage {
        let mut plte = vec![Color::default()];
        plte.extend_from_slice(self.palette.colors());
        MemoryImage::indexed(
            name,
            self.width,
            self.height,
            plte,
            Some(vec![0]),
            self.offset,
            self.pixels,
        )
    }
}

/// Compile `source` against `palette`.
///
/// - Indexed sources are translated through their own palette; a source
///   color missing from `palette` aborts with [`Error::ColorNotInPalette`].
/// - RGBA sources are matched pixel by pixel. Alpha 0 becomes transparent.
///   Other non-opaque alpha and opaque colors missing from `palette` also
///   become transparent, each with a warning naming the pixel.
/// - RGB sources are rejected with [`Error::NotATemplate`].
///
/// The offset is stored as given.
pub fn compile<S: RowSource>(
    source: &mut S,
    palette: &Palette,
    offset: Offset,
) -> Result<(Tile, Vec<Warning>)> {
    let info = source.info().clone();
    let name = source.name().to_string();
    let mut pixels = Vec::with_capacity(info.width as usize * info.height as usize);
    let mut warnings = Vec::new();
    let mut row = vec![0u8; info.row_bytes()];

    match info.kind {
        ColorKind::Rgb => return Err(Error::NotATemplate { name }),
        ColorKind::Indexed => {
            let colors = info
                .palette
                .as_deref()
                .ok_or_else(|| Error::unsupported(&name, "indexed image has no palette"))?;
            let alpha = info.transparency.as_deref().unwrap_or_default();
            let mut target = palette.clone();
            let (table, entry_warnings) = remap(&name, colors, alpha, &mut target, false)?;
            warnings.extend(entry_warnings);
            debug!("{}: {} palette entries mapped", name, table.len());

            for y in 0..info.height {
                source.read_row(&mut row)?;
                for (x, &index) in row.iter().enumerate() {
                    let mapped = table.get(index).ok_or_else(|| Error::InvalidIndex {
                        name: name.clone(),
                        x: x as u32,
                        y,
                        index,
                        len: table.len(),
                    })?;
                    pixels.push(mapped);
                }
            }
        }
        ColorKind::Rgba => {
            for y in 0..info.height {
                source.read_row(&mut row)?;
                for (x, pixel) in row.chunks_exact(4).enumerate() {
                    let x = x as u32;
                    let color = Color::from_pixel(pixel);
                    let index = match pixel[3] {
                        0 => TRANSPARENT,
                        255 => palette.index_of(color).unwrap_or_else(|| {
                            warnings.push(Warning::at(
                                WarningKind::OutOfPaletteColorCoerced,
                                x,
                                y,
                                format!("out-of-palette color {}, marking transparent", color),
                            ));
                            TRANSPARENT
                        }),
                        a => {
                            warnings.push(Warning::at(
                                WarningKind::LossyAlphaCoercion,
                                x,
                                y,
                                format!("pixel has alpha {}, neither 255 nor 0, marking transparent", a),
                            ));
                            TRANSPARENT
                        }
                    };
                    pixels.push(index);
                }
            }
        }
    }

    let tile = Tile {
        width: info.width,
        height: info.height,
        offset,
        palette: palette.clone(),
        pixels,
    };
    Ok((tile, warnings))
}
