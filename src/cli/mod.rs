//! Command-line interface implementation
//!
//! This module provides the CLI entry point and dispatches to submodules
//! for specific command implementations.

mod compile;
mod info;
mod link;

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use crate::config::{load_config, merge_cli_overrides, CliOverrides};
use crate::geometry::Offset;

/// Exit codes
pub(crate) const EXIT_SUCCESS: u8 = 0;
pub(crate) const EXIT_ERROR: u8 = 1;
pub(crate) const EXIT_INVALID_ARGS: u8 = 2;

/// tilelink - Compile indexed PNG tiles against a shared palette and link them
/// into one canvas
#[derive(Parser)]
#[command(name = "tilelink")]
#[command(about = "Compile PNG tiles against a shared palette and link them into one canvas")]
#[command(version)]
pub struct Cli {
    /// Config file to use instead of searching for tilelink.toml
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// More output (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count, conflicts_with = "quiet")]
    pub verbose: u8,

    /// Only print errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Compile an RGBA or indexed image into a tile using a legend's palette
    #[command(allow_negative_numbers = true)]
    Compile {
        /// Tile PNG to write
        output: PathBuf,

        /// Legend image whose colors form the palette
        legend: PathBuf,

        /// Source image to compile
        input: PathBuf,

        /// Horizontal placement of the tile on the canvas
        #[arg(value_parser = parse_offset)]
        offset_x: i32,

        /// Vertical placement of the tile on the canvas
        #[arg(value_parser = parse_offset)]
        offset_y: i32,

        /// Fail if any pixel had to be coerced to transparent
        #[arg(long)]
        strict: bool,
    },

    /// Link compiled tiles into one canvas
    Link {
        /// Canvas PNG to write
        output: PathBuf,

        /// Compiled tiles (glob patterns are expanded)
        #[arg(required = true)]
        tiles: Vec<String>,

        /// Keep the partially written canvas if linking fails
        #[arg(long)]
        keep_partial: bool,
    },

    /// Show dimensions, color kind, palette and offset of PNG files
    Info {
        /// Files to inspect
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
}

/// Parse a tile offset, telling malformed input apart from values that do
/// not fit in 32 bits.
pub fn parse_offset(s: &str) -> Result<i32, String> {
    let digits = s.strip_prefix(|c| c == '-' || c == '+').unwrap_or(s);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(format!("'{}' is not a number", s));
    }
    s.parse::<i32>().map_err(|_| format!("'{}' is out of range for a 32-bit offset", s))
}

fn init_logging(level: &str) {
    let env = env_logger::Env::default().default_filter_or(level);
    // A second initialisation only happens when run() is called twice in one
    // process; the first logger stays in place.
    let _ = env_logger::Builder::from_env(env).format_timestamp(None).try_init();
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let log_level = if cli.quiet {
        Some("error".to_string())
    } else {
        match cli.verbose {
            0 => None,
            1 => Some("debug".to_string()),
            _ => Some("trace".to_string()),
        }
    };
    let (strict, keep_partial) = match &cli.command {
        Commands::Compile { strict, .. } => (strict.then_some(true), None),
        Commands::Link { keep_partial, .. } => (None, keep_partial.then_some(true)),
        Commands::Info { .. } => (None, None),
    };

    let mut config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(EXIT_ERROR);
        }
    };
    merge_cli_overrides(&mut config, &CliOverrides { strict, keep_partial, log_level });
    init_logging(&config.log.level);

    match cli.command {
        Commands::Compile { output, legend, input, offset_x, offset_y, .. } => {
            compile::run_compile(&output, &legend, &input, Offset::new(offset_x, offset_y), &config)
        }
        Commands::Link { output, tiles, .. } => link::run_link(&output, &tiles, &config),
        Commands::Info { files } => info::run_info(&files),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_offset() {
        assert_eq!(parse_offset("0"), Ok(0));
        assert_eq!(parse_offset("-17"), Ok(-17));
        assert_eq!(parse_offset("+3"), Ok(3));
        assert_eq!(parse_offset("-2147483648"), Ok(i32::MIN));
    }

    #[test]
    fn test_parse_offset_not_a_number() {
        for s in ["", "-", "abc", "1.5", "0x10", "12px"] {
            let err = parse_offset(s).unwrap_err();
            assert!(err.contains("not a number"), "{s}: {err}");
        }
    }

    #[test]
    fn test_parse_offset_out_of_range() {
        for s in ["2147483648", "-2147483649", "99999999999999999999999"] {
            let err = parse_offset(s).unwrap_err();
            assert!(err.contains("out of range"), "{s}: {err}");
        }
    }

    #[test]
    fn test_cli_accepts_negative_offsets() {
        let cli =
            Cli::try_parse_from(["tilelink", "compile", "o.png", "l.png", "i.png", "-4", "-8"])
                .unwrap();
        match cli.command {
            Commands::Compile { offset_x, offset_y, strict, .. } => {
                assert_eq!((offset_x, offset_y), (-4, -8));
                assert!(!strict);
            }
            _ => panic!("expected compile"),
        }
    }

    #[test]
    fn test_cli_link_needs_a_tile() {
        assert!(Cli::try_parse_from(["tilelink", "link", "out.png"]).is_err());
    }

    #[test]
    fn test_cli_verbose_conflicts_with_quiet() {
        assert!(Cli::try_parse_from(["tilelink", "-v", "-q", "info", "a.png"]).is_err());
    }
}
