//! tilelink - Library for compiling and linking indexed PNG tiles
//!
//! This library provides functionality to:
//! - Build a shared palette from a legend image
//! - Compile RGBA or indexed images into tiles indexed against that palette,
//!   tagged with a placement offset
//! - Link any number of tiles into one canvas with a streaming scanline sweep
//!   that keeps only the rows of the tiles under the current scanline in memory

pub mod cli;
pub mod color;
pub mod compile;
pub mod config;
pub mod error;
pub mod geometry;
pub mod image_io;
pub mod palette;
pub mod sweep;

pub use error::{Error, ErrorKind, Result, Warning, WarningKind};
