//! PNG file sink for compiled tiles and linked canvases

use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use log::info;

use super::{encode_offset, offs, RowSink};
use crate::error::{Error, Result};
use crate::geometry::Offset;
use crate::palette::Palette;

/// An indexed 8-bit PNG being written one row at a time.
///
/// Layout: `PLTE` is the reserved transparent slot followed by the palette
/// colors, `tRNS` marks exactly slot 0 transparent, and `oFFs` is present
/// only for a non-zero offset.
pub struct PngWriter {
    path: PathBuf,
    writer: png::StreamWriter<'static, File>,
    width: u32,
    height: u32,
    rows_written: u32,
}

impl PngWriter {
    pub fn create(
        path: &Path,
        width: u32,
        height: u32,
        palette: &Palette,
        offset: Offset,
        compression: png::Compression,
    ) -> Result<Self> {
        let file = File::create(path).map_err(|e| Error::io(path, e))?;
        let encode_err = |source| Error::Encode { path: path.to_path_buf(), source };

        let mut encoder = png::Encoder::new(file, width, height);
        encoder.set_color(png::ColorType::Indexed);
        encoder.set_depth(png::BitDepth::Eight);
        encoder.set_compression(compression);
        encoder.set_palette(palette.to_plte());
        encoder.set_trns(vec![0u8]);

        let mut writer = encoder.write_header().map_err(encode_err)?;
        if !offset.is_zero() {
            writer.write_chunk(offs::chunk_type(), &encode_offset(offset)).map_err(encode_err)?;
        }
        let writer = writer.into_stream_writer().map_err(encode_err)?;
        info!("{} opened for writing ({}x{} at {})", path.display(), width, height, offset);

        Ok(Self { path: path.to_path_buf(), writer, width, height, rows_written: 0 })
    }

    /// Flush the remaining image data and the end chunk. Fails if fewer rows
    /// than the image height were written.
    pub fn finish(self) -> Result<()> {
        if self.rows_written != self.height {
            return Err(Error::io(
                &self.path,
                io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    format!("only {} of {} rows written", self.rows_written, self.height),
                ),
            ));
        }
        let path = self.path;
        self.writer.finish().map_err(|source| Error::Encode { path: path.clone(), source })?;
        info!("wrote {}", path.display());
        Ok(())
    }
}

impl RowSink for PngWriter {
    fn write_row(&mut self, row: &[u8]) -> Result<()> {
        if row.len() != self.width as usize || self.rows_written == self.height {
            return Err(Error::io(
                &self.path,
                io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!(
                        "row of {} bytes at row {} does not fit a {}x{} image",
                        row.len(),
                        self.rows_written,
                        self.width,
                        self.height
                    ),
                ),
            ));
        }
        self.writer.write_all(row).map_err(|e| Error::io(&self.path, e))?;
        self.rows_written += 1;
        Ok(())
    }
}
