//! Palette unification
//!
//! A [`Palette`] is the ordered, duplicate-free list of real colors shared by
//! every tile of a canvas. Index 0 is reserved for transparency and is never
//! stored or compared; real colors occupy indices `1..=255`.
//!
//! Palettes come from a legend image ([`build_palette`]) and are used to
//! translate source colors into indices ([`remap`]).

use crate::color::Color;
use crate::error::{Error, Result, Warning, WarningKind};
use crate::image_io::{ColorKind, RowSource};

/// Maximum number of real colors: one byte per index, minus the reserved slot.
pub const MAX_COLORS: usize = 255;

/// Largest legend image accepted, in pixels.
pub const MAX_LEGEND_PIXELS: u64 = 255;

/// Index meaning "no color".
pub const TRANSPARENT: u8 = 0;

/// Ordered set of real colors; color `k` of the list has index `k + 1`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Palette {
    colors: Vec<Color>,
}

impl Palette {
    pub fn new() -> Self {
        Self::default()
    }

    /// Palette of a compiled tile: its `PLTE` minus the reserved slot 0.
    pub fn from_tile_plte(plte: &[Color]) -> Self {
        Self { colors: plte.iter().skip(1).copied().collect() }
    }

    /// Number of real colors.
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Number of `PLTE` entries including the reserved slot.
    pub fn slots(&self) -> usize {
        self.colors.len() + 1
    }

    pub fn colors(&self) -> &[Color] {
        &self.colors
    }

    /// Color for `index`, or `None` for the transparent index and indices
    /// past the end.
    pub fn get(&self, index: u8) -> Option<Color> {
        match index {
            TRANSPARENT => None,
            i => self.colors.get(i as usize - 1).copied(),
        }
    }

    /// Index of the first exact match.
    pub fn index_of(&self, color: Color) -> Option<u8> {
        self.colors.iter().position(|&c| c == color).map(|i| i as u8 + 1)
    }

    /// Append a color that isn't in the palette yet and return its index.
    /// `None` when the palette already holds [`MAX_COLORS`] colors.
    pub fn push(&mut self, color: Color) -> Option<u8> {
        if self.colors.len() == MAX_COLORS {
            return None;
        }
        self.colors.push(color);
        Some(self.colors.len() as u8)
    }

    /// Index of `color`, appending it when missing.
    pub fn intern(&mut self, color: Color) -> Option<u8> {
        match self.index_of(color) {
            Some(index) => Some(index),
            None => self.push(color),
        }
    }

    /// `PLTE` payload: a black placeholder for slot 0, then every color.
    pub fn to_plte(&self) -> Vec<u8> {
        let mut plte = Vec::with_capacity(self.slots() * 3);
        plte.extend_from_slice(&Color::default().to_bytes());
        for color in &self.colors {
            plte.extend_from_slice(&color.to_bytes());
        }
        plte
    }
}

/// Translation from a source palette's entries to target palette indices.
///
/// Built once per source image and applied to every pixel; never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexTable(Vec<u8>);

impl IndexTable {
    /// Target index for source entry `entry`, `None` if the source palette
    /// has no such entry.
    pub fn get(&self, entry: u8) -> Option<u8> {
        self.0.get(entry as usize).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }
}

/// Map every entry of a source palette to an index in `target`.
///
/// `name` identifies the source image in errors.
///
/// `alpha` is the source's tRNS table; entries past its end are opaque. An
/// entry with alpha 0 maps to the transparent index, as does an entry with
/// any other non-opaque alpha (with a [`WarningKind::LossyAlphaCoercion`]
/// warning). Opaque colors are matched exactly against `target`; a miss
/// fails with [`Error::ColorNotInPalette`] unless `allow_growth` is set, in
/// which case the color is appended, failing with [`Error::PaletteOverflow`]
/// past 255 colors.
pub fn remap(
    name: &str,
    colors: &[Color],
    alpha: &[u8],
    target: &mut Palette,
    allow_growth: bool,
) -> Result<(IndexTable, Vec<Warning>)> {
    let mut table = Vec::with_capacity(colors.len());
    let mut warnings = Vec::new();

    for (entry, &color) in colors.iter().enumerate() {
        let a = alpha.get(entry).copied().unwrap_or(u8::MAX);
        if a != u8::MAX {
            if a != 0 {
                warnings.push(Warning::entry(
                    WarningKind::LossyAlphaCoercion,
                    format!(
                        "palette entry {} ({}) has alpha {}, neither 255 nor 0, marking as transparent",
                        entry, color, a
                    ),
                ));
            }
            table.push(TRANSPARENT);
            continue;
        }

        let index = match target.index_of(color) {
            Some(index) => index,
            None if allow_growth => target
                .push(color)
                .ok_or_else(|| Error::PaletteOverflow { name: name.to_string(), color })?,
            None => {
                return Err(Error::ColorNotInPalette { name: name.to_string(), color, entry })
            }
        };
        table.push(index);
    }

    Ok((IndexTable(table), warnings))
}

/// Build a palette from a legend image.
///
/// - RGB: every distinct color, in row-major order of first appearance.
/// - RGBA: the same, skipping alpha-0 pixels; pixels with any other
///   non-opaque alpha are skipped with a warning.
/// - Indexed: the image's own palette, deduplicated, without its transparent
///   entries.
///
/// Legends larger than [`MAX_LEGEND_PIXELS`] are rejected before any pixel
/// is read.
pub fn build_palette<S: RowSource>(legend: &mut S) -> Result<(Palette, Vec<Warning>)> {
    let info = legend.info();
    if info.pixel_count() > MAX_LEGEND_PIXELS {
        return Err(Error::LegendTooLarge {
            name: legend.name().to_string(),
            width: info.width,
            height: info.height,
            pixels: info.pixel_count(),
        });
    }

    let kind = info.kind;
    let mut palette = Palette::new();
    let mut warnings = Vec::new();

    match kind {
        ColorKind::Indexed => {
            let colors = info.palette.clone().ok_or_else(|| {
                Error::unsupported(legend.name(), "indexed image has no palette")
            })?;
            let alpha = info.transparency.clone().unwrap_or_default();
            let (_, entry_warnings) = remap(legend.name(), &colors, &alpha, &mut palette, true)?;
            warnings.extend(entry_warnings);
        }
        _ => {
            let (width, height) = (info.width, info.height);
            let stride = kind.bytes_per_pixel();
            let mut row = vec![0u8; info.row_bytes()];
            for y in 0..height {
                legend.read_row(&mut row)?;
                for (x, pixel) in row.chunks_exact(stride).enumerate().take(width as usize) {
                    let color = Color::from_pixel(pixel);
                    if kind == ColorKind::Rgba {
                        match pixel[3] {
                            0 => continue,
                            255 => {}
                            a => {
                                warnings.push(Warning::at(
                                    WarningKind::LossyAlphaCoercion,
                                    x as u32,
                                    y,
                                    format!(
                                        "legend pixel {} has alpha {}, neither 255 nor 0, skipping",
                                        color, a
                                    ),
                                ));
                                continue;
                            }
                        }
                    }
                    palette.intern(color).ok_or_else(|| Error::PaletteOverflow {
                        name: legend.name().to_string(),
                        color,
                    })?;
                }
            }
        }
    }

    Ok((palette, warnings))
}
