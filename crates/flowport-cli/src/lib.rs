//! Command-line runtime for the flowport declaration exporter.
//!
//! `flowport` reads every package under the configured packages root,
//! derives the www name of each public npm module, and rewrites the Flow
//! declaration files so their imports and docblocks match the www build. The
//! runtime is written against generic output streams and a pluggable
//! configuration loader so tests can drive it in-process.

use std::ffi::OsString;
use std::io::Write;
use std::process::ExitCode;

use clap::Parser;
use tracing::info;

mod config;
mod errors;
mod names;
mod packages;
mod pipeline;
mod telemetry;

use config::split_config_arguments;
pub(crate) use config::{ConfigLoader, OrthoConfigLoader};
pub(crate) use errors::AppError;

/// Rewrites public Flow declaration files for consumption by the www build.
///
/// Configuration flags (`--packages-dir`, `--fail-fast`, `--log-filter`, and
/// the rest) are read by the configuration loader, together with
/// `FLOWPORT_*` environment variables and an optional `--config-path` file.
#[derive(Parser, Debug)]
#[command(name = "flowport", version)]
struct Cli {
    /// Reports what would be written without touching the file system.
    #[arg(long)]
    dry_run: bool,
}

struct CliRunner<'a, W: Write, E: Write, L: ConfigLoader> {
    stdout: &'a mut W,
    stderr: &'a mut E,
    loader: &'a L,
}

impl<W, E, L> CliRunner<'_, W, E, L>
where
    W: Write,
    E: Write,
    L: ConfigLoader,
{
    fn run<I>(&mut self, args: I) -> ExitCode
    where
        I: IntoIterator<Item = OsString>,
    {
        let args: Vec<OsString> = args.into_iter().collect();
        let split = split_config_arguments(&args);

        match self.execute(&split.cli_arguments, &split.config_arguments) {
            Ok(exit_code) => exit_code,
            Err(AppError::CliUsage(error)) if !error.use_stderr() => {
                let _ = write!(self.stdout, "{error}");
                ExitCode::SUCCESS
            }
            Err(error) => {
                let _ = writeln!(self.stderr, "{error}");
                ExitCode::FAILURE
            }
        }
    }

    fn execute(
        &mut self,
        cli_arguments: &[OsString],
        config_arguments: &[OsString],
    ) -> Result<ExitCode, AppError> {
        let cli = Cli::try_parse_from(cli_arguments).map_err(AppError::CliUsage)?;
        let config = self.loader.load(config_arguments)?;
        telemetry::initialise(&config)?;
        info!(
            packages_dir = %config.packages_dir(),
            dry_run = cli.dry_run,
            "starting export"
        );

        let summary = pipeline::run(&config, cli.dry_run)?;
        for failure in summary.failures() {
            let _ = writeln!(self.stderr, "{failure}");
        }
        let _ = writeln!(self.stdout, "{summary}");

        Ok(if summary.is_success() {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        })
    }
}

/// Runs the CLI using the provided arguments and IO handles.
#[must_use]
pub fn run<I, W, E>(args: I, stdout: &mut W, stderr: &mut E) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    W: Write,
    E: Write,
{
    run_with_loader(args, stdout, stderr, &OrthoConfigLoader)
}

pub(crate) fn run_with_loader<I, W, E, L>(
    args: I,
    stdout: &mut W,
    stderr: &mut E,
    loader: &L,
) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    W: Write,
    E: Write,
    L: ConfigLoader,
{
    CliRunner {
        stdout,
        stderr,
        loader,
    }
    .run(args)
}

#[cfg(test)]
mod tests;
