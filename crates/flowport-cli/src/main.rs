//! CLI entrypoint for the flowport declaration exporter.
//!
//! The binary delegates to [`flowport_cli::run`], which loads configuration,
//! exports every package, and prints a one-line summary.

use std::io::{self, StderrLock, StdoutLock};
use std::process::ExitCode;

fn main() -> ExitCode {
    let mut stdout: StdoutLock<'_> = io::stdout().lock();
    let mut stderr: StderrLock<'_> = io::stderr().lock();
    flowport_cli::run(std::env::args_os(), &mut stdout, &mut stderr)
}
