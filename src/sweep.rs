//! Scanline sweep compositing
//!
//! Links many compiled tiles into one indexed canvas without holding the
//! canvas in memory. Tiles are sorted by their top edge; walking the canvas
//! top to bottom, a tile becomes active on its first row, contributes one
//! row per scanline, and is dropped (closing its stream) after its last row.
//! Each tile moves through pending, active and consumed exactly once.
//!
//! Overlap is not blended: two active tiles covering the same cell of a
//! scanline abort the run with [`Error::UnsupportedOverlap`] before that
//! scanline is emitted.

use std::collections::VecDeque;

use log::debug;

use crate::error::{Error, Result};
use crate::geometry::{Bounds, Offset};
use crate::image_io::{ColorKind, RowSink, RowSource};
use crate::palette::{Palette, TRANSPARENT};

/// A row source checked to be a compiled tile: indexed, with slot 0 as its
/// only transparent entry.
#[derive(Debug)]
pub struct TileReader<S> {
    source: S,
    palette: Palette,
}

impl<S: RowSource> TileReader<S> {
    pub fn new(source: S) -> Result<Self> {
        let info = source.info();
        let compiled = info.kind == ColorKind::Indexed
            && info.bit_depth == 8
            && info.transparency.as_deref() == Some(&[0u8][..]);
        let plte = match &info.palette {
            Some(plte) if compiled && !plte.is_empty() => plte,
            _ => {
                return Err(Error::unsupported(
                    source.name(),
                    "does not seem to be a compiled tile (expected indexed with index 0 transparent)",
                ))
            }
        };
        let palette = Palette::from_tile_plte(plte);
        Ok(Self { source, palette })
    }

    pub fn name(&self) -> &str {
        self.source.name()
    }

    pub fn width(&self) -> u32 {
        self.source.info().width
    }

    pub fn height(&self) -> u32 {
        self.source.info().height
    }

    pub fn offset(&self) -> Offset {
        self.source.info().offset
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    pub fn bounds(&self) -> Bounds {
        Bounds::placed(self.offset(), self.width(), self.height())
    }
}

/// Geometry and palette of the composite image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Canvas {
    pub offset: Offset,
    pub width: u32,
    pub height: u32,
    pub palette: Palette,
}

/// A tile whose vertical span contains the current scanline.
struct ActiveTile<S> {
    tile: TileReader<S>,
    row: Vec<u8>,
    left: i64,
    right: i64,
    bottom: i64,
}

impl<S: RowSource> ActiveTile<S> {
    fn new(tile: TileReader<S>) -> Self {
        let bounds = tile.bounds();
        Self {
            row: vec![0; tile.width() as usize],
            left: bounds.min_x,
            right: bounds.max_x,
            bottom: bounds.max_y - 1,
            tile,
        }
    }
}

/// Counters reported after a completed sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SweepStats {
    pub rows: u32,
    pub tiles: usize,
    /// Scanlines no tile touched, emitted fully transparent
    pub empty_rows: u32,
}

/// Sweep compositor over a set of tiles sharing one palette.
pub struct Compositor<S> {
    pending: VecDeque<TileReader<S>>,
    bounds: Bounds,
    canvas: Canvas,
}

impl<S: RowSource> Compositor<S> {
    /// Validate the tiles and compute the canvas.
    ///
    /// Every tile's palette must equal the first tile's exactly. The canvas
    /// spans the component-wise minimum of the tiles' top-left corners to the
    /// maximum of their bottom-right corners. Nothing is read from the tiles
    /// beyond their metadata.
    pub fn new(tiles: Vec<TileReader<S>>) -> Result<Self> {
        let first = tiles
            .first()
            .ok_or_else(|| Error::unsupported("link", "no tiles to link"))?;
        let palette = first.palette().clone();
        let first_name = first.name().to_string();
        let mut bounds = first.bounds();

        for tile in &tiles[1..] {
            if tile.palette() != &palette {
                return Err(Error::PaletteMismatch {
                    first: first_name,
                    tile: tile.name().to_string(),
                });
            }
            bounds = bounds.corners_union(tile.bounds());
        }

        let width = u32::try_from(bounds.width())
            .map_err(|_| Error::unsupported("link", format!("canvas width {} is too big", bounds.width())))?;
        let height = u32::try_from(bounds.height())
            .map_err(|_| Error::unsupported("link", format!("canvas height {} is too big", bounds.height())))?;
        // The minimum of i32 coordinates is itself an i32.
        let offset = Offset::new(bounds.min_x as i32, bounds.min_y as i32);

        let mut tiles = tiles;
        tiles.sort_by_key(|t| t.offset().y);

        Ok(Self {
            pending: tiles.into(),
            bounds,
            canvas: Canvas { offset, width, height, palette },
        })
    }

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    /// Stream the canvas into `sink`, one row per scanline.
    ///
    /// On error, rows before the failing scanline have already been written.
    pub fn run<K: RowSink>(mut self, sink: &mut K) -> Result<SweepStats> {
        let mut stats = SweepStats { tiles: self.pending.len(), ..SweepStats::default() };
        let mut active: Vec<ActiveTile<S>> = Vec::new();
        let mut out = vec![TRANSPARENT; self.canvas.width as usize];

        for y in self.bounds.min_y..self.bounds.max_y {
            let mut activated = false;
            while self.pending.front().is_some_and(|t| t.offset().y as i64 == y) {
                if let Some(tile) = self.pending.pop_front() {
                    debug!("y={}: activating {}", y, tile.name());
                    active.push(ActiveTile::new(tile));
                    activated = true;
                }
            }
            if activated {
                active.sort_by_key(|a| a.left);
            }

            for a in active.iter_mut() {
                a.tile.source.read_row(&mut a.row)?;
            }

            if active.is_empty() {
                stats.empty_rows += 1;
            }
            blend_row(&active, self.bounds.min_x, y, &mut out)?;
            sink.write_row(&out)?;
            stats.rows += 1;

            active.retain(|a| {
                let done = a.bottom == y;
                if done {
                    debug!("y={}: releasing {}", y, a.tile.name());
                }
                !done
            });
        }

        Ok(stats)
    }
}

/// Fill `out` with one canvas row from the x-sorted active tiles.
///
/// Gaps become transparent; each tile's row is copied in place. A tile that
/// reaches past the left edge of the next one is an overlap.
fn blend_row<S: RowSource>(
    active: &[ActiveTile<S>],
    canvas_left: i64,
    y: i64,
    out: &mut [u8],
) -> Result<()> {
    let mut x = canvas_left;
    for (i, tile) in active.iter().enumerate() {
        if let Some(next) = active.get(i + 1) {
            if next.left < tile.right {
                return Err(Error::UnsupportedOverlap {
                    left: tile.tile.name().to_string(),
                    right: next.tile.name().to_string(),
                    x: next.left,
                    y,
                });
            }
        }
        let start = (tile.left - canvas_left) as usize;
        let end = (tile.right - canvas_left) as usize;
        out[(x - canvas_left) as usize..start].fill(TRANSPARENT);
        out[start..end].copy_from_slice(&tile.row);
        x = tile.right;
    }
    out[(x - canvas_left) as usize..].fill(TRANSPARENT);
    Ok(())
}
