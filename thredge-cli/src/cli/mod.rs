//! Command-line interface for sampling thredge graphs.
//!
//! The `sample` command builds a model from its arguments, draws a batch of
//! graphs with a seeded generator, and renders edge lists, degree sequences,
//! or a density summary.

mod commands;

pub use commands::{
    BackendArg, Cli, CliError, Command, OutputFormat, SampleCommand, SampleReport, StrategyArg,
    render_report, run_cli,
};

#[cfg(test)]
mod tests;
