//! Compile command implementation

use std::path::Path;
use std::process::ExitCode;

use log::{info, warn};

use crate::compile::compile;
use crate::config::TilelinkConfig;
use crate::error::{Error, Result, Warning};
use crate::geometry::Offset;
use crate::image_io::{PngReader, RowSource};
use crate::palette::build_palette;

use super::{EXIT_ERROR, EXIT_SUCCESS};

/// Execute the compile command
pub fn run_compile(
    output: &Path,
    legend: &Path,
    input: &Path,
    offset: Offset,
    config: &TilelinkConfig,
) -> ExitCode {
    match compile_file(output, legend, input, offset, config) {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(EXIT_ERROR)
        }
    }
}

fn compile_file(
    output: &Path,
    legend: &Path,
    input: &Path,
    offset: Offset,
    config: &TilelinkConfig,
) -> Result<()> {
    let mut legend = PngReader::open(legend)?;
    let (palette, legend_warnings) = build_palette(&mut legend)?;
    report(legend.name(), &legend_warnings);
    drop(legend);
    info!("palette has {} colors", palette.len());

    let mut source = PngReader::open(input)?;
    let (tile, warnings) = compile(&mut source, &palette, offset)?;
    report(source.name(), &warnings);
    drop(source);

    let count = legend_warnings.len() + warnings.len();
    if config.compile.strict && count > 0 {
        return Err(Error::StrictWarnings { count });
    }

    tile.save(output, config.output.compression.to_png())
}

fn report(name: &str, warnings: &[Warning]) {
    for warning in warnings {
        warn!("{}: {}", name, warning);
    }
}
