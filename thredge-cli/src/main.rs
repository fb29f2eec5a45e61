//! `thredge` binary: samples correlated threshold graphs from the command
//! line and prints them to stdout.

use std::io::{self, BufWriter, Write};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use thredge_cli::{
    cli::{Cli, CliError, render_report, run_cli},
    logging::{self, LoggingError},
};
use tracing::{error, field};

fn try_main() -> Result<()> {
    let cli = Cli::parse();
    let report = run_cli(cli).context("failed to sample graphs")?;
    let stdout = io::stdout();
    let mut writer = BufWriter::new(stdout.lock());
    render_report(&report, &mut writer).context("failed to render samples")?;
    writer.flush().context("failed to flush output")?;
    Ok(())
}

fn main() -> ExitCode {
    if let Err(err) = logging::init_logging() {
        report_logging_init_error(&err);
        return ExitCode::FAILURE;
    }

    if let Err(err) = try_main() {
        let code = err
            .downcast_ref::<CliError>()
            .map(|cli_error| match cli_error {
                CliError::Core(core) => core.code().as_str(),
                CliError::Index(index) => index.code().as_str(),
            })
            .map(field::display);
        error!(error = %format!("{err:#}"), code, "command execution failed");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

#[expect(
    clippy::print_stderr,
    reason = "tracing is not installed when logging setup fails"
)]
fn report_logging_init_error(err: &LoggingError) {
    eprintln!("failed to initialize logging: {err}");
}
