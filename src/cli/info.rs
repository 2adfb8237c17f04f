//! Info command implementation

use std::path::Path;
use std::process::ExitCode;

use crate::error::Result;
use crate::image_io::{ColorKind, ImageInfo, PngReader, RowSource};

use super::{EXIT_ERROR, EXIT_SUCCESS};

/// Execute the info command
pub fn run_info(files: &[impl AsRef<Path>]) -> ExitCode {
    let mut failed = false;
    for file in files {
        match describe(file.as_ref()) {
            Ok(text) => println!("{}", text),
            Err(e) => {
                eprintln!("Error: {}", e);
                failed = true;
            }
        }
    }
    ExitCode::from(if failed { EXIT_ERROR } else { EXIT_SUCCESS })
}

fn describe(path: &Path) -> Result<String> {
    let reader = PngReader::open(path)?;
    Ok(format_info(reader.name(), reader.info()))
}

/// One block of `key: value` lines describing `info`.
pub(crate) fn format_info(name: &str, info: &ImageInfo) -> String {
    let mut lines = vec![
        format!("{}:", name),
        format!("  size:         {}x{}", info.width, info.height),
        format!("  color:        {} ({}-bit)", info.kind, info.bit_depth),
    ];
    if info.kind == ColorKind::Indexed {
        let entries = info.palette.as_ref().map_or(0, Vec::len);
        lines.push(format!("  palette:      {} entries", entries));
        match &info.transparency {
            Some(trns) => lines.push(format!("  transparency: {:?}", trns)),
            None => lines.push("  transparency: none".to_string()),
        }
    }
    lines.push(format!("  offset:       {}", info.offset));
    lines.join("\n")
}
