//! fmpal - Command-line tool for previewing and exporting costume palettes

use std::process::ExitCode;

use fmpalette::cli;

fn main() -> ExitCode {
    cli::run()
}
