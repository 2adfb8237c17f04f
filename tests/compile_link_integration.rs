//! Integration tests for compiling PNG files into tiles and linking them.
//!
//! Fixtures are written to a scratch directory: RGB/RGBA sources with the
//! `image` crate, indexed sources (with tRNS and oFFs) with the `png` crate.

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use tilelink::color::Color;
use tilelink::compile::compile;
use tilelink::error::{ErrorKind, WarningKind};
use tilelink::geometry::Offset;
use tilelink::image_io::{encode_offset, ColorKind, PngReader, PngWriter, RowSource};
use tilelink::palette::build_palette;
use tilelink::sweep::{Compositor, TileReader};

const RED: [u8; 3] = [255, 0, 0];
const GREEN: [u8; 3] = [0, 255, 0];
const BLUE: [u8; 3] = [0, 0, 255];

fn write_rgb(dir: &TempDir, name: &str, width: u32, height: u32, pixels: &[[u8; 3]]) -> PathBuf {
    let path = dir.path().join(name);
    let raw: Vec<u8> = pixels.iter().flatten().copied().collect();
    image::RgbImage::from_raw(width, height, raw).unwrap().save(&path).unwrap();
    path
}

fn write_rgba(dir: &TempDir, name: &str, width: u32, height: u32, pixels: &[[u8; 4]]) -> PathBuf {
    let path = dir.path().join(name);
    let raw: Vec<u8> = pixels.iter().flatten().copied().collect();
    image::RgbaImage::from_raw(width, height, raw).unwrap().save(&path).unwrap();
    path
}

/// Indexed 8-bit PNG with an optional tRNS chunk and an optional raw oFFs
/// payload.
fn write_indexed(
    dir: &TempDir,
    name: &str,
    width: u32,
    height: u32,
    plte: &[[u8; 3]],
    trns: Option<&[u8]>,
    offs: Option<[u8; 9]>,
    pixels: &[u8],
) -> PathBuf {
    let path = dir.path().join(name);
    let file = BufWriter::new(File::create(&path).unwrap());
    let mut encoder = png::Encoder::new(file, width, height);
    encoder.set_color(png::ColorType::Indexed);
    encoder.set_depth(png::BitDepth::Eight);
    encoder.set_palette(plte.iter().flatten().copied().collect::<Vec<u8>>());
    if let Some(trns) = trns {
        encoder.set_trns(trns.to_vec());
    }
    let mut writer = encoder.write_header().unwrap();
    if let Some(payload) = offs {
        writer.write_chunk(png::chunk::ChunkType(*b"oFFs"), &payload).unwrap();
    }
    writer.write_image_data(pixels).unwrap();
    writer.finish().unwrap();
    path
}

fn legend(dir: &TempDir) -> PathBuf {
    write_rgb(dir, "legend.png", 3, 1, &[RED, GREEN, BLUE])
}

/// Compile `input` against the legend and save it as `name`.
fn compile_file(dir: &TempDir, legend: &Path, input: &Path, offset: Offset, name: &str) -> PathBuf {
    let (palette, _) = build_palette(&mut PngReader::open(legend).unwrap()).unwrap();
    let (tile, _) = compile(&mut PngReader::open(input).unwrap(), &palette, offset).unwrap();
    let out = dir.path().join(name);
    tile.save(&out, png::Compression::Fast).unwrap();
    out
}

fn read_all(path: &Path) -> (tilelink::image_io::ImageInfo, Vec<Vec<u8>>) {
    let mut reader = PngReader::open(path).unwrap();
    let info = reader.info().clone();
    let mut rows = Vec::new();
    for _ in 0..info.height {
        let mut row = vec![0u8; info.row_bytes()];
        reader.read_row(&mut row).unwrap();
        rows.push(row);
    }
    (info, rows)
}

fn link_files(paths: &[PathBuf], out: &Path) -> tilelink::Result<()> {
    let tiles = paths
        .iter()
        .map(|p| PngReader::open(p).and_then(TileReader::new))
        .collect::<tilelink::Result<Vec<_>>>()?;
    let compositor = Compositor::new(tiles)?;
    let canvas = compositor.canvas().clone();
    let mut writer = PngWriter::create(
        out,
        canvas.width,
        canvas.height,
        &canvas.palette,
        canvas.offset,
        png::Compression::Fast,
    )?;
    compositor.run(&mut writer)?;
    writer.finish()
}

#[test]
fn test_compile_rgba_tile_file() {
    let dir = TempDir::new().unwrap();
    let legend = legend(&dir);
    let input = write_rgba(
        &dir,
        "src.png",
        2,
        2,
        &[[0, 0, 255, 255], [0, 0, 0, 0], [255, 0, 0, 255], [0, 255, 0, 255]],
    );
    let tile = compile_file(&dir, &legend, &input, Offset::new(-3, 4), "tile.png");

    let (info, rows) = read_all(&tile);
    assert_eq!(info.kind, ColorKind::Indexed);
    assert_eq!(info.offset, Offset::new(-3, 4));
    assert_eq!(info.transparency, Some(vec![0]));
    assert_eq!(
        info.palette,
        Some(vec![
            Color::new(0, 0, 0),
            Color::new(255, 0, 0),
            Color::new(0, 255, 0),
            Color::new(0, 0, 255)
        ])
    );
    assert_eq!(rows, vec![vec![3, 0], vec![1, 2]]);
}

#[test]
fn test_compile_rgb_source_is_rejected() {
    let dir = TempDir::new().unwrap();
    let (palette, _) = build_palette(&mut PngReader::open(&legend(&dir)).unwrap()).unwrap();
    let input = write_rgb(&dir, "rgb.png", 1, 1, &[RED]);
    let err = compile(&mut PngReader::open(&input).unwrap(), &palette, Offset::ZERO).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotATemplate);
}

#[test]
fn test_compile_indexed_source_without_trns() {
    let dir = TempDir::new().unwrap();
    let (palette, _) = build_palette(&mut PngReader::open(&legend(&dir)).unwrap()).unwrap();
    let input = write_indexed(&dir, "idx.png", 3, 1, &[BLUE, RED], None, None, &[0, 1, 0]);

    let (tile, warnings) =
        compile(&mut PngReader::open(&input).unwrap(), &palette, Offset::ZERO).unwrap();
    assert!(warnings.is_empty());
    assert_eq!(tile.pixels, vec![3, 1, 3]);
}

#[test]
fn test_compile_indexed_source_with_unknown_color_fails() {
    let dir = TempDir::new().unwrap();
    let (palette, _) = build_palette(&mut PngReader::open(&legend(&dir)).unwrap()).unwrap();
    let input =
        write_indexed(&dir, "idx.png", 1, 1, &[[0, 0, 0], [9, 9, 9]], Some(&[0]), None, &[1]);

    let err = compile(&mut PngReader::open(&input).unwrap(), &palette, Offset::ZERO).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ColorNotInPalette);
}

#[test]
fn test_compile_warnings_name_pixels() {
    let dir = TempDir::new().unwrap();
    let (palette, _) = build_palette(&mut PngReader::open(&legend(&dir)).unwrap()).unwrap();
    let input = write_rgba(&dir, "src.png", 2, 1, &[[255, 0, 0, 64], [1, 1, 1, 255]]);

    let (tile, warnings) =
        compile(&mut PngReader::open(&input).unwrap(), &palette, Offset::ZERO).unwrap();
    assert_eq!(tile.pixels, vec![0, 0]);
    assert_eq!(warnings.len(), 2);
    assert_eq!(warnings[0].kind, WarningKind::LossyAlphaCoercion);
    assert_eq!(warnings[0].position, Some((0, 0)));
    assert_eq!(warnings[1].kind, WarningKind::OutOfPaletteColorCoerced);
    assert_eq!(warnings[1].position, Some((1, 0)));
}

#[test]
fn test_recompiling_a_compiled_tile_is_identity() {
    let dir = TempDir::new().unwrap();
    let legend = legend(&dir);
    let input = write_rgba(&dir, "src.png", 2, 1, &[[0, 255, 0, 255], [0, 0, 0, 0]]);
    let first = compile_file(&dir, &legend, &input, Offset::new(7, -7), "first.png");
    let second = compile_file(&dir, &legend, &first, Offset::new(7, -7), "second.png");

    assert_eq!(read_all(&first), read_all(&second));
}

#[test]
fn test_link_two_adjacent_tiles() {
    let dir = TempDir::new().unwrap();
    let legend = legend(&dir);
    let red = write_rgba(&dir, "red.png", 2, 2, &[[255, 0, 0, 255]; 4]);
    let blue = write_rgba(&dir, "blue.png", 2, 2, &[[0, 0, 255, 255]; 4]);
    let left = compile_file(&dir, &legend, &red, Offset::new(0, 0), "left.png");
    let right = compile_file(&dir, &legend, &blue, Offset::new(2, 0), "right.png");

    let out = dir.path().join("canvas.png");
    link_files(&[right, left], &out).unwrap();

    let (info, rows) = read_all(&out);
    assert_eq!((info.width, info.height), (4, 2));
    assert_eq!(info.offset, Offset::ZERO);
    assert_eq!(info.transparency, Some(vec![0]));
    assert_eq!(rows, vec![vec![1, 1, 3, 3], vec![1, 1, 3, 3]]);
}

#[test]
fn test_link_negative_offsets_and_gap() {
    let dir = TempDir::new().unwrap();
    let legend = legend(&dir);
    let green = write_rgba(&dir, "green.png", 1, 1, &[[0, 255, 0, 255]]);
    let a = compile_file(&dir, &legend, &green, Offset::new(-2, -2), "a.png");
    let b = compile_file(&dir, &legend, &green, Offset::new(1, 0), "b.png");

    let out = dir.path().join("canvas.png");
    link_files(&[a, b], &out).unwrap();

    let (info, rows) = read_all(&out);
    assert_eq!(info.offset, Offset::new(-2, -2));
    assert_eq!((info.width, info.height), (4, 3));
    assert_eq!(rows, vec![vec![2, 0, 0, 0], vec![0, 0, 0, 0], vec![0, 0, 0, 2]]);
}

#[test]
fn test_linked_canvas_links_again() {
    let dir = TempDir::new().unwrap();
    let legend = legend(&dir);
    let red = write_rgba(&dir, "red.png", 1, 1, &[[255, 0, 0, 255]]);
    let tile = compile_file(&dir, &legend, &red, Offset::new(3, 3), "tile.png");

    let once = dir.path().join("once.png");
    link_files(&[tile], &once).unwrap();
    let twice = dir.path().join("twice.png");
    link_files(&[once.clone()], &twice).unwrap();

    assert_eq!(read_all(&once), read_all(&twice));
}

#[test]
fn test_link_palette_mismatch() {
    let dir = TempDir::new().unwrap();
    let red = write_rgba(&dir, "red.png", 1, 1, &[[255, 0, 0, 255]]);
    let legend_a = legend(&dir);
    let legend_b = write_rgb(&dir, "legend_b.png", 2, 1, &[RED, GREEN]);
    let a = compile_file(&dir, &legend_a, &red, Offset::ZERO, "a.png");
    let b = compile_file(&dir, &legend_b, &red, Offset::new(1, 0), "b.png");

    let err = link_files(&[a, b], &dir.path().join("canvas.png")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::PaletteMismatch);
}

#[test]
fn test_link_rejects_uncompiled_input() {
    let dir = TempDir::new().unwrap();
    let raw = write_rgba(&dir, "raw.png", 1, 1, &[[255, 0, 0, 255]]);
    let err = link_files(&[raw], &dir.path().join("canvas.png")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnsupportedFormat);
}

#[test]
fn test_link_overlap() {
    let dir = TempDir::new().unwrap();
    let legend = legend(&dir);
    let red = write_rgba(&dir, "red.png", 2, 2, &[[255, 0, 0, 255]; 4]);
    let a = compile_file(&dir, &legend, &red, Offset::new(0, 0), "a.png");
    let b = compile_file(&dir, &legend, &red, Offset::new(1, 1), "b.png");

    let err = link_files(&[a, b], &dir.path().join("canvas.png")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnsupportedOverlap);
}

#[test]
fn test_micrometre_offset_unit_rejected() {
    let dir = TempDir::new().unwrap();
    let mut payload = encode_offset(Offset::new(1, 1));
    payload[8] = 1;
    let path = write_indexed(&dir, "um.png", 1, 1, &[[0, 0, 0]], Some(&[0]), Some(payload), &[0]);

    let err = PngReader::open(&path).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnsupportedFormat);
}

#[test]
fn test_pixel_offset_read_from_foreign_file() {
    let dir = TempDir::new().unwrap();
    let payload = encode_offset(Offset::new(-100, 250));
    let path =
        write_indexed(&dir, "foreign.png", 1, 1, &[[0, 0, 0], RED], Some(&[0]), Some(payload), &[1]);

    let reader = TileReader::new(PngReader::open(&path).unwrap()).unwrap();
    assert_eq!(reader.offset(), Offset::new(-100, 250));
    assert_eq!(reader.palette().colors(), &[Color::new(255, 0, 0)]);
}
