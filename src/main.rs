//! tilelink - Command-line tool for compiling and linking indexed PNG tiles

use std::process::ExitCode;

use tilelink::cli;

fn main() -> ExitCode {
    cli::run()
}
