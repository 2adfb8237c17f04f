//! PNG file source

use std::fs::File;
use std::io::{self, BufReader, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use log::info;

use super::{offs, ColorKind, ImageInfo, RowSource};
use crate::color::colors_from_plte;
use crate::error::{Error, Result};

/// A PNG file opened for row-by-row decoding.
///
/// The file handle is owned by the decoder and closed when the reader is
/// dropped, whether or not every row was consumed.
pub struct PngReader {
    path: PathBuf,
    name: String,
    info: ImageInfo,
    reader: png::Reader<BufReader<File>>,
    rows_read: u32,
}

impl std::fmt::Debug for PngReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PngReader")
            .field("path", &self.path)
            .field("info", &self.info)
            .field("rows_read", &self.rows_read)
            .finish()
    }
}

impl PngReader {
    /// Open `path` and read everything up to the image data.
    ///
    /// Accepts 8-bit RGB, RGBA and indexed non-interlaced images, with an
    /// optional pixel-unit `oFFs` chunk.
    pub fn open(path: &Path) -> Result<Self> {
        info!("opening {}", path.display());
        let name = path.display().to_string();
        let file = File::open(path).map_err(|e| Error::io(path, e))?;
        let mut file = BufReader::new(file);

        let offset = offs::read_offset(&mut file, path)?;
        file.seek(SeekFrom::Start(0)).map_err(|e| Error::io(path, e))?;

        let mut decoder = png::Decoder::new(file);
        decoder.set_transformations(png::Transformations::IDENTITY);
        let reader = decoder
            .read_info()
            .map_err(|source| Error::Decode { path: path.to_path_buf(), source })?;

        let png_info = reader.info();
        if png_info.bit_depth != png::BitDepth::Eight {
            return Err(Error::unsupported(
                name,
                format!("bit depth {} is not supported, only 8", png_info.bit_depth as u8),
            ));
        }
        if png_info.interlaced {
            return Err(Error::unsupported(name, "interlaced images are not supported"));
        }
        let kind = match png_info.color_type {
            png::ColorType::Rgb => ColorKind::Rgb,
            png::ColorType::Rgba => ColorKind::Rgba,
            png::ColorType::Indexed => ColorKind::Indexed,
            other => {
                return Err(Error::unsupported(
                    name,
                    format!("color type {:?} is not supported", other),
                ))
            }
        };
        let (palette, transparency) = if kind == ColorKind::Indexed {
            (
                png_info.palette.as_deref().map(colors_from_plte),
                png_info.trns.as_deref().map(<[u8]>::to_vec),
            )
        } else {
            (None, None)
        };

        let info = ImageInfo {
            width: png_info.width,
            height: png_info.height,
            kind,
            bit_depth: 8,
            palette,
            transparency,
            offset,
        };
        Ok(Self { path: path.to_path_buf(), name, info, reader, rows_read: 0 })
    }
}

impl RowSource for PngReader {
    fn name(&self) -> &str {
        &self.name
    }

    fn info(&self) -> &ImageInfo {
        &self.info
    }

    fn read_row(&mut self, buf: &mut [u8]) -> Result<()> {
        let row = self
            .reader
            .next_row()
            .map_err(|source| Error::Decode { path: self.path.clone(), source })?;
        match row {
            Some(row) if row.data().len() == buf.len() => {
                buf.copy_from_slice(row.data());
                self.rows_read += 1;
                Ok(())
            }
            Some(row) => Err(Error::unsupported(
                self.name.clone(),
                format!("row {} has {} bytes, expected {}", self.rows_read, row.data().len(), buf.len()),
            )),
            None => Err(Error::io(
                &self.path,
                io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    format!("image ended after {} of {} rows", self.rows_read, self.info.height),
                ),
            )),
        }
    }
}
