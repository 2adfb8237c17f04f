//! `oFFs` (image offset) chunk support
//!
//! The `png` crate skips ancillary chunks it doesn't know, so the offset is
//! found by walking the chunk list ourselves up to the first `IDAT`. Layout:
//! signed 32-bit big-endian x, signed 32-bit big-endian y, one unit byte.

use std::io::{self, Read, Seek, SeekFrom};
use std::path::Path;

use crate::error::{Error, Result};
use crate::geometry::Offset;

const OFFSET_UNIT_PIXEL: u8 = 0;
const OFFSET_UNIT_MICROMETER: u8 = 1;
const OFFS: [u8; 4] = *b"oFFs";
const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1A, b'\n'];

/// Scan the chunk list of a PNG stream for an `oFFs` chunk.
///
/// Returns [`Offset::ZERO`] when there is no `oFFs` chunk before the image
/// data. Streams that aren't well-formed PNG also yield zero; the decoder
/// reports those properly. The stream position is left wherever the scan
/// stopped, callers rewind before decoding.
pub fn read_offset<R: Read + Seek>(reader: &mut R, path: &Path) -> Result<Offset> {
    let mut signature = [0u8; 8];
    if !read_or_eof(reader, &mut signature, path)? || signature != PNG_SIGNATURE {
        return Ok(Offset::ZERO);
    }

    let mut header = [0u8; 8];
    while read_or_eof(reader, &mut header, path)? {
        let length = u32::from_be_bytes([header[0], header[1], header[2], header[3]]);
        let kind = [header[4], header[5], header[6], header[7]];
        match &kind {
            b"IDAT" | b"IEND" => break,
            b"oFFs" => {
                if length != 9 {
                    return Err(Error::unsupported(
                        path.display().to_string(),
                        format!("malformed oFFs chunk of {} bytes", length),
                    ));
                }
                let mut data = [0u8; 9];
                reader.read_exact(&mut data).map_err(|e| Error::io(path, e))?;
                return decode_offset(&data, path);
            }
            _ => {
                reader
                    .seek(SeekFrom::Current(length as i64 + 4))
                    .map_err(|e| Error::io(path, e))?;
            }
        }
    }
    Ok(Offset::ZERO)
}

fn decode_offset(data: &[u8; 9], path: &Path) -> Result<Offset> {
    let x = i32::from_be_bytes([data[0], data[1], data[2], data[3]]);
    let y = i32::from_be_bytes([data[4], data[5], data[6], data[7]]);
    match data[8] {
        OFFSET_UNIT_PIXEL => Ok(Offset::new(x, y)),
        OFFSET_UNIT_MICROMETER => Err(Error::unsupported(
            path.display().to_string(),
            "offset is in micrometers instead of pixels",
        )),
        unit => Err(Error::unsupported(
            path.display().to_string(),
            format!("unknown offset unit {}", unit),
        )),
    }
}

/// Payload of a pixel-unit `oFFs` chunk.
pub fn encode_offset(offset: Offset) -> [u8; 9] {
    let mut data = [0u8; 9];
    data[..4].copy_from_slice(&offset.x.to_be_bytes());
    data[4..8].copy_from_slice(&offset.y.to_be_bytes());
    data[8] = OFFSET_UNIT_PIXEL;
    data
}

pub(crate) fn chunk_type() -> png::chunk::ChunkType {
    png::chunk::ChunkType(OFFS)
}

/// `read_exact` that reports a clean end of stream as `false`.
fn read_or_eof<R: Read>(reader: &mut R, buf: &mut [u8], path: &Path) -> Result<bool> {
    match reader.read_exact(buf) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => Ok(false),
        Err(e) => Err(Error::io(path, e)),
    }
}
