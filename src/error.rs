//! Error and warning types for compiling and linking tiles

use std::fmt;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::color::Color;

/// Result type alias for tile operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Coarse classification of an [`Error`], used by callers that branch on the
/// failure class rather than on the exact variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    IoFailure,
    UnsupportedFormat,
    LegendTooLarge,
    ColorNotInPalette,
    PaletteOverflow,
    NotATemplate,
    PaletteMismatch,
    UnsupportedOverlap,
    InvalidIndex,
    StrictWarnings,
}

/// Fatal error while compiling or linking. Every variant aborts the run.
#[derive(Debug, Error)]
pub enum Error {
    /// Opening, reading or writing a file failed
    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// The PNG decoder rejected the file
    #[error("failed to read {}: {source}", .path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: png::DecodingError,
    },
    /// The PNG encoder failed
    #[error("failed to write {}: {source}", .path.display())]
    Encode {
        path: PathBuf,
        #[source]
        source: png::EncodingError,
    },
    /// Wrong color kind, bit depth, interlacing or offset unit
    #[error("{name}: {reason}")]
    UnsupportedFormat { name: String, reason: String },
    /// Legend image has more pixels than a palette can hold
    #[error("{name}: legend image is too big: {width}x{height} has {pixels} pixels, at most 255 allowed")]
    LegendTooLarge { name: String, width: u32, height: u32, pixels: u64 },
    /// Source wants a color the target palette doesn't have
    #[error("{name}: image wants color {color} (source palette entry {entry}) that does not exist in the palette, recompile the legend")]
    ColorNotInPalette { name: String, color: Color, entry: usize },
    /// Palette would grow past 255 real colors
    #[error("{name}: palette merge results in too big palette: color {color} would be entry 256")]
    PaletteOverflow { name: String, color: Color },
    /// Pure RGB sources are uncompiled legends, not tile content
    #[error("{name}: tried to compile a pure RGB image, is it a template?")]
    NotATemplate { name: String },
    /// Two link inputs don't share the exact same palette
    #[error("palette of '{tile}' differs from '{first}', recompile all tiles against one legend")]
    PaletteMismatch { first: String, tile: String },
    /// Two tiles occupy the same canvas cell on one scanline
    #[error("overlapping tiles '{left}' and '{right}' at canvas x={x} y={y}, overlapping tiles are not supported")]
    UnsupportedOverlap {
        left: String,
        right: String,
        x: i64,
        y: i64,
    },
    /// An indexed pixel points past the end of its own palette
    #[error("{name}: pixel at x={x} y={y} uses index {index}, but the palette has {len} entries")]
    InvalidIndex { name: String, x: u32, y: u32, index: u8, len: usize },
    /// Strict mode turned coercion warnings into a failure
    #[error("{count} warning(s) treated as errors in strict mode")]
    StrictWarnings { count: usize },
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Error::Io { path: path.into(), source }
    }

    pub(crate) fn unsupported(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::UnsupportedFormat { name: name.into(), reason: reason.into() }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Io { .. } | Error::Decode { .. } | Error::Encode { .. } => ErrorKind::IoFailure,
            Error::UnsupportedFormat { .. } => ErrorKind::UnsupportedFormat,
            Error::LegendTooLarge { .. } => ErrorKind::LegendTooLarge,
            Error::ColorNotInPalette { .. } => ErrorKind::ColorNotInPalette,
            Error::PaletteOverflow { .. } => ErrorKind::PaletteOverflow,
            Error::NotATemplate { .. } => ErrorKind::NotATemplate,
            Error::PaletteMismatch { .. } => ErrorKind::PaletteMismatch,
            Error::UnsupportedOverlap { .. } => ErrorKind::UnsupportedOverlap,
            Error::InvalidIndex { .. } => ErrorKind::InvalidIndex,
            Error::StrictWarnings { .. } => ErrorKind::StrictWarnings,
        }
    }
}

/// Classes of lossy-but-recoverable conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WarningKind {
    /// Alpha strictly between 0 and 255, pixel forced to transparent
    LossyAlphaCoercion,
    /// Opaque color missing from the palette, pixel forced to transparent
    OutOfPaletteColorCoerced,
}

/// A warning generated while building a palette or compiling a tile.
///
/// `position` is the pixel `(x, y)` for image pixels, or `None` for palette
/// entries of an indexed source.
#[derive(Debug, Clone, PartialEq)]
pub struct Warning {
    pub kind: WarningKind,
    pub position: Option<(u32, u32)>,
    pub message: String,
}

impl Warning {
    pub fn at(kind: WarningKind, x: u32, y: u32, message: impl Into<String>) -> Self {
        Self { kind, position: Some((x, y)), message: message.into() }
    }

    pub fn entry(kind: WarningKind, message: impl Into<String>) -> Self {
        Self { kind, position: None, message: message.into() }
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.position {
            Some((x, y)) => write!(f, "x={} y={}: {}", x, y, self.message),
            None => f.write_str(&self.message),
        }
    }
}
