//! Placement offsets and canvas bounds
//!
//! Offsets are stored as `i32` (the range of a PNG `oFFs` chunk). Any sum of
//! an offset and a size is done in `i64` so it cannot overflow.

use std::fmt;

/// Signed placement of a tile's top-left pixel on the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Offset {
    pub x: i32,
    pub y: i32,
}

impl Offset {
    pub const ZERO: Offset = Offset { x: 0, y: 0 };

    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn is_zero(self) -> bool {
        self == Self::ZERO
    }
}

impl fmt::Display for Offset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:+},{:+}", self.x, self.y)
    }
}

/// Axis-aligned box given by its top-left corner and exclusive bottom-right
/// corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bounds {
    pub min_x: i64,
    pub min_y: i64,
    pub max_x: i64,
    pub max_y: i64,
}

impl Bounds {
    /// Bounds of a `width` x `height` image placed at `offset`.
    pub fn placed(offset: Offset, width: u32, height: u32) -> Self {
        Self {
            min_x: offset.x as i64,
            min_y: offset.y as i64,
            max_x: offset.x as i64 + width as i64,
            max_y: offset.y as i64 + height as i64,
        }
    }

    /// Component-wise min of the top-left corners and max of the bottom-right
    /// corners.
    pub fn corners_union(self, other: Bounds) -> Bounds {
        Bounds {
            min_x: self.min_x.min(other.min_x),
            min_y: self.min_y.min(other.min_y),
            max_x: self.max_x.max(other.max_x),
            max_y: self.max_y.max(other.max_y),
        }
    }

    pub fn width(&self) -> i64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> i64 {
        self.max_y - self.min_y
    }
}
