//! Link command implementation

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use glob::glob;
use log::{info, warn};

use crate::config::TilelinkConfig;
use crate::error::Result;
use crate::image_io::{PngReader, PngWriter};
use crate::sweep::{Compositor, TileReader};

use super::{EXIT_ERROR, EXIT_INVALID_ARGS, EXIT_SUCCESS};

/// Execute the link command
pub fn run_link(output: &Path, tiles: &[String], config: &TilelinkConfig) -> ExitCode {
    let paths = match expand_tiles(tiles) {
        Ok(paths) => paths,
        Err(message) => {
            eprintln!("Error: {}", message);
            return ExitCode::from(EXIT_INVALID_ARGS);
        }
    };

    match link_files(output, &paths, config) {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(EXIT_ERROR)
        }
    }
}

/// Expand tile arguments containing glob metacharacters. Plain paths, and
/// existing files whose names happen to contain metacharacters, are passed
/// through untouched so a missing file is reported when opened.
pub(crate) fn expand_tiles(args: &[String]) -> std::result::Result<Vec<PathBuf>, String> {
    let mut paths = Vec::new();
    for arg in args {
        if !arg.contains(['*', '?', '[']) || Path::new(arg).is_file() {
            paths.push(PathBuf::from(arg));
            continue;
        }
        let entries = glob(arg).map_err(|e| format!("invalid pattern '{}': {}", arg, e))?;
        let mut matched: Vec<PathBuf> = entries.filter_map(|e| e.ok()).collect();
        if matched.is_empty() {
            return Err(format!("no tiles match '{}'", arg));
        }
        matched.sort();
        paths.extend(matched);
    }
    Ok(paths)
}

fn link_files(output: &Path, paths: &[PathBuf], config: &TilelinkConfig) -> Result<()> {
    let tiles = paths
        .iter()
        .map(|path| PngReader::open(path).and_then(TileReader::new))
        .collect::<Result<Vec<_>>>()?;

    // Everything that can be checked without reading pixels is checked
    // before the output file exists.
    let compositor = Compositor::new(tiles)?;
    let canvas = compositor.canvas().clone();
    let mut writer = PngWriter::create(
        output,
        canvas.width,
        canvas.height,
        &canvas.palette,
        canvas.offset,
        config.output.compression.to_png(),
    )?;

    let result = compositor.run(&mut writer).and_then(|stats| {
        writer.finish()?;
        Ok(stats)
    });
    match result {
        Ok(stats) => {
            info!(
                "linked {} tiles into {}x{} canvas ({} empty rows)",
                stats.tiles, canvas.width, canvas.height, stats.empty_rows
            );
            Ok(())
        }
        Err(e) => {
            if config.link.keep_partial {
                warn!("keeping partial output {}", output.display());
            } else if fs::remove_file(output).is_ok() {
                warn!("removed partial output {}", output.display());
            }
            Err(e)
        }
    }
}
