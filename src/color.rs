//! RGB color type shared by palettes, legends and tiles
//!
//! Colors carry no alpha: transparency lives in palette slot 0 and in the
//! per-pixel alpha of RGBA sources, never in the color itself.

use std::fmt;

/// An 8-bit RGB color. Equality is an exact match on all three channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Color {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
}

impl Color {
    pub const fn new(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    /// Build a color from the first three bytes of a pixel (RGB or RGBA).
    /// Rows are sliced with `chunks_exact(3 | 4)`, so `pixel` is never short.
    pub(crate) fn from_pixel(pixel: &[u8]) -> Self {
        Self::new(pixel[0], pixel[1], pixel[2])
    }

    /// The three channels in PLTE order.
    pub fn to_bytes(self) -> [u8; 3] {
        [self.red, self.green, self.blue]
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.red, self.green, self.blue)
    }
}

/// Split a PLTE chunk payload into colors. Trailing bytes that don't form a
/// full triple are ignored.
pub fn colors_from_plte(plte: &[u8]) -> Vec<Color> {
    plte.chunks_exact(3).map(Color::from_pixel).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_is_uppercase_hex() {
        assert_eq!(Color::new(255, 8, 0xab).to_string(), "#FF08AB");
    }

    #[test]
    fn test_colors_from_plte_ignores_partial_triple() {
        let colors = colors_from_plte(&[1, 2, 3, 4, 5, 6, 7]);
        assert_eq!(colors, vec![Color::new(1, 2, 3), Color::new(4, 5, 6)]);
    }
}
