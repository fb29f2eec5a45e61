//! Argument parsing and execution of the `sample` command.

use std::io::{self, Write};

use clap::{ArgGroup, Args, Parser, Subcommand, ValueEnum};
use rand::{SeedableRng, rngs::SmallRng};
use thiserror::Error;
use thredge_core::{
    CovarianceBackend, DrawStrategy, Edge, IndexError, ThredgeError, ThredgeGraph,
    degree_sequence,
};
use tracing::{Span, field, info, instrument};

/// Top-level CLI options parsed by [`clap`].
#[derive(Debug, Parser, Clone)]
#[command(
    name = "thredge",
    about = "Sample random graphs from thresholded, vertex-correlated Gaussian edge weights."
)]
pub struct Cli {
    /// Command to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Supported CLI commands.
#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Draw graphs from a thredge model.
    Sample(SampleCommand),
}

/// Options accepted by the `sample` command.
#[derive(Debug, Args, Clone)]
#[command(group(
    ArgGroup::new("density")
        .required(true)
        .args(["threshold", "mean_degree"]),
))]
pub struct SampleCommand {
    /// Number of vertices.
    #[arg(long, short = 'n')]
    pub vertices: usize,

    /// Covariance between edges that share one endpoint.
    #[arg(long, short = 'b', default_value_t = 0.0, allow_negative_numbers = true)]
    pub correlation: f64,

    /// Edge threshold applied to the latent weights.
    #[arg(long, allow_negative_numbers = true)]
    pub threshold: Option<f64>,

    /// Target expected degree used to calibrate the threshold.
    #[arg(long = "mean-degree")]
    pub mean_degree: Option<f64>,

    /// Number of graphs to draw.
    #[arg(long, default_value_t = 1)]
    pub samples: usize,

    /// Seed for the random number generator. Drawn from the OS when omitted.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Latent weight backend.
    #[arg(long, value_enum, default_value_t = BackendArg::Dense)]
    pub backend: BackendArg,

    /// Whether to correlate every draw in one matrix product.
    #[arg(long, value_enum, default_value_t = StrategyArg::PerCall)]
    pub strategy: StrategyArg,

    /// What to print for each sample.
    #[arg(long, value_enum, default_value_t = OutputFormat::Summary)]
    pub output: OutputFormat,
}

/// Backend names accepted on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum BackendArg {
    /// Materialise the covariance and its Cholesky factor.
    Dense,
    /// Combine per-vertex and per-edge normals; needs `0 <= b <= 0.5`.
    VertexFactor,
}

impl From<BackendArg> for CovarianceBackend {
    fn from(value: BackendArg) -> Self {
        match value {
            BackendArg::Dense => Self::Dense,
            BackendArg::VertexFactor => Self::VertexFactor,
        }
    }
}

/// Draw strategies accepted on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StrategyArg {
    /// One weight vector at a time.
    PerCall,
    /// All weight vectors at once.
    Batch,
}

impl From<StrategyArg> for DrawStrategy {
    fn from(value: StrategyArg) -> Self {
        match value {
            StrategyArg::PerCall => Self::PerCall,
            StrategyArg::Batch => Self::Batch,
        }
    }
}

/// Rendering modes for [`render_report`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// One `i<TAB>j` line per edge, samples separated by a header line.
    Edges,
    /// One line of tab-separated vertex degrees per sample.
    Degrees,
    /// Model parameters followed by the edge count and mean degree of each
    /// sample.
    Summary,
}

/// Errors surfaced while executing CLI commands.
#[derive(Debug, Error)]
pub enum CliError {
    /// Model construction or sampling failed.
    #[error(transparent)]
    Core(#[from] ThredgeError),
    /// A sampled edge fell outside the graph.
    #[error(transparent)]
    Index(#[from] IndexError),
}

/// Graphs drawn by the `sample` command together with the model they came
/// from.
#[derive(Debug, Clone)]
pub struct SampleReport {
    /// Number of vertices.
    pub vertices: usize,
    /// Correlation parameter of the model.
    pub correlation: f64,
    /// Threshold the samples were cut at.
    pub threshold: f64,
    /// Expected degree implied by the threshold.
    pub expected_mean_degree: f64,
    /// Backend that drew the latent weights.
    pub backend: CovarianceBackend,
    /// Edge list of every sample.
    pub edge_lists: Vec<Vec<Edge>>,
    /// Degree sequence of every sample.
    pub degrees: Vec<Vec<usize>>,
    /// Requested rendering mode.
    pub output: OutputFormat,
}

impl SampleReport {
    /// Returns the realised mean degree of sample `index`.
    #[must_use]
    pub fn mean_degree(&self, index: usize) -> Option<f64> {
        let edges = self.edge_lists.get(index)?;
        Some(2.0 * edges.len() as f64 / self.vertices as f64)
    }
}

/// Executes the CLI command represented by `cli`.
///
/// # Errors
/// Returns [`CliError`] when the model cannot be built.
///
/// # Examples
/// ```
/// use thredge_cli::cli::{
///     BackendArg, Cli, Command, OutputFormat, SampleCommand, StrategyArg, run_cli,
/// };
///
/// let cli = Cli {
///     command: Command::Sample(SampleCommand {
///         vertices: 10,
///         correlation: 0.1,
///         threshold: None,
///         mean_degree: Some(3.0),
///         samples: 2,
///         seed: Some(7),
///         backend: BackendArg::Dense,
///         strategy: StrategyArg::PerCall,
///         output: OutputFormat::Summary,
///     }),
/// };
/// let report = run_cli(cli).expect("configuration is valid");
/// assert_eq!(report.edge_lists.len(), 2);
/// ```
#[instrument(name = "cli.run", err, skip(cli), fields(command = field::Empty))]
pub fn run_cli(cli: Cli) -> Result<SampleReport, CliError> {
    match cli.command {
        Command::Sample(sample) => {
            Span::current().record("command", field::display("sample"));
            run_sample(sample)
        }
    }
}

#[instrument(
    name = "cli.sample",
    err,
    skip(command),
    fields(vertices = command.vertices, samples = command.samples, seed = field::Empty),
)]
pub(super) fn run_sample(command: SampleCommand) -> Result<SampleReport, CliError> {
    let builder = ThredgeGraph::builder(command.vertices)
        .with_correlation(command.correlation)
        .with_backend(command.backend.into());
    let builder = match (command.threshold, command.mean_degree) {
        (Some(threshold), Some(mean_degree)) => builder
            .with_threshold(threshold)
            .with_mean_degree(mean_degree),
        (Some(threshold), None) => builder.with_threshold(threshold),
        (None, Some(mean_degree)) => builder.with_mean_degree(mean_degree),
        (None, None) => builder,
    };
    let graph = builder.build()?;

    let mut rng = match command.seed {
        Some(seed) => {
            Span::current().record("seed", seed);
            SmallRng::seed_from_u64(seed)
        }
        None => SmallRng::from_entropy(),
    };
    let edge_lists = graph.get_n_edge_lists(&mut rng, command.samples, command.strategy.into());
    let degrees = edge_lists
        .iter()
        .map(|edges| degree_sequence(graph.vertex_count(), edges))
        .collect::<Result<Vec<_>, _>>()?;

    info!(
        threshold = graph.threshold(),
        total_edges = edge_lists.iter().map(Vec::len).sum::<usize>(),
        "sampling completed"
    );
    Ok(SampleReport {
        vertices: graph.vertex_count(),
        correlation: graph.correlation(),
        threshold: graph.threshold(),
        expected_mean_degree: graph.expected_mean_degree(),
        backend: graph.backend(),
        edge_lists,
        degrees,
        output: command.output,
    })
}

/// Renders `report` to `writer` in the format it requests.
///
/// # Errors
/// Returns [`io::Error`] if writing to the supplied writer fails.
///
/// # Examples
/// ```
/// # use std::io::Cursor;
/// # use thredge_cli::cli::{OutputFormat, SampleReport, render_report};
/// # use thredge_core::{CovarianceBackend, Edge};
/// let report = SampleReport {
///     vertices: 3,
///     correlation: 0.0,
///     threshold: 0.0,
///     expected_mean_degree: 1.0,
///     backend: CovarianceBackend::Dense,
///     edge_lists: vec![vec![Edge::new(0, 2).expect("distinct")]],
///     degrees: vec![vec![1, 0, 1]],
///     output: OutputFormat::Edges,
/// };
/// let mut buffer = Cursor::new(Vec::new());
/// render_report(&report, &mut buffer).expect("writing to memory succeeds");
/// assert_eq!(buffer.into_inner(), b"# sample 0\n0\t2\n");
/// ```
pub fn render_report(report: &SampleReport, mut writer: impl Write) -> io::Result<()> {
    match report.output {
        OutputFormat::Edges => {
            for (index, edges) in report.edge_lists.iter().enumerate() {
                writeln!(writer, "# sample {index}")?;
                for edge in edges {
                    writeln!(writer, "{}\t{}", edge.source(), edge.target())?;
                }
            }
        }
        OutputFormat::Degrees => {
            for degrees in &report.degrees {
                let line: Vec<String> = degrees.iter().map(ToString::to_string).collect();
                writeln!(writer, "{}", line.join("\t"))?;
            }
        }
        OutputFormat::Summary => {
            writeln!(writer, "vertices: {}", report.vertices)?;
            writeln!(writer, "correlation: {}", report.correlation)?;
            writeln!(writer, "backend: {:?}", report.backend)?;
            writeln!(writer, "threshold: {:.6}", report.threshold)?;
            writeln!(
                writer,
                "expected mean degree: {:.4}",
                report.expected_mean_degree
            )?;
            writeln!(writer, "sample\tedges\tmean_degree")?;
            for (index, edges) in report.edge_lists.iter().enumerate() {
                let mean = report.mean_degree(index).unwrap_or_default();
                writeln!(writer, "{index}\t{}\t{mean:.4}", edges.len())?;
            }
        }
    }
    Ok(())
}
