//! Unit tests for the `sample` command and its renderer.

use super::commands::run_sample;
use super::{
    BackendArg, Cli, CliError, Command, OutputFormat, SampleCommand, SampleReport, StrategyArg,
    render_report, run_cli,
};

use clap::Parser;
use rstest::{fixture, rstest};
use thredge_core::{CovarianceBackend, Edge, ThredgeError};
use thredge_test_support::tracing::RecordingLayer;
use tracing_subscriber::layer::SubscriberExt;

#[fixture]
fn command() -> SampleCommand {
    SampleCommand {
        vertices: 12,
        correlation: 0.1,
        threshold: None,
        mean_degree: Some(3.0),
        samples: 5,
        seed: Some(11),
        backend: BackendArg::Dense,
        strategy: StrategyArg::PerCall,
        output: OutputFormat::Summary,
    }
}

fn render(report: &SampleReport) -> String {
    let mut buffer = Vec::new();
    render_report(report, &mut buffer).expect("writing to memory succeeds");
    String::from_utf8(buffer).expect("renderer emits UTF-8")
}

#[rstest]
fn parses_full_sample_invocation() {
    let cli = Cli::try_parse_from([
        "thredge",
        "sample",
        "--vertices",
        "40",
        "--correlation",
        "-0.01",
        "--threshold",
        "-0.5",
        "--samples",
        "3",
        "--seed",
        "9",
        "--backend",
        "vertex-factor",
        "--strategy",
        "batch",
        "--output",
        "degrees",
    ])
    .expect("arguments are valid");
    let Command::Sample(sample) = cli.command;
    assert_eq!(sample.vertices, 40);
    assert_eq!(sample.correlation, -0.01);
    assert_eq!(sample.threshold, Some(-0.5));
    assert_eq!(sample.mean_degree, None);
    assert_eq!(sample.backend, BackendArg::VertexFactor);
    assert_eq!(sample.strategy, StrategyArg::Batch);
    assert_eq!(sample.output, OutputFormat::Degrees);
}

#[rstest]
#[case::neither(&["thredge", "sample", "--vertices", "10"][..])]
#[case::both(&["thredge", "sample", "-n", "10", "--threshold", "1", "--mean-degree", "2"][..])]
fn parser_requires_exactly_one_density_target(#[case] args: &[&str]) {
    assert!(Cli::try_parse_from(args).is_err());
}

#[rstest]
fn seeded_runs_are_reproducible(command: SampleCommand) {
    let first = run_sample(command.clone()).expect("configuration is valid");
    let second = run_sample(command).expect("configuration is valid");
    assert_eq!(first.edge_lists, second.edge_lists);
    assert_eq!(first.edge_lists.len(), 5);
    assert!((first.expected_mean_degree - 3.0).abs() < 1e-9);
}

#[rstest]
fn degrees_match_edge_lists(mut command: SampleCommand) {
    command.strategy = StrategyArg::Batch;
    let report = run_sample(command).expect("configuration is valid");
    for (edges, degrees) in report.edge_lists.iter().zip(&report.degrees) {
        assert_eq!(degrees.len(), 12);
        assert_eq!(degrees.iter().sum::<usize>(), 2 * edges.len());
    }
}

#[rstest]
fn core_errors_are_surfaced(mut command: SampleCommand) {
    command.backend = BackendArg::VertexFactor;
    command.correlation = -0.05;
    let err = run_sample(command).expect_err("vertex factor needs b >= 0");
    assert!(matches!(
        err,
        CliError::Core(ThredgeError::UnsupportedCorrelation {
            backend: CovarianceBackend::VertexFactor,
            ..
        })
    ));
}

#[rstest]
fn run_cli_records_command_span(command: SampleCommand) {
    let layer = RecordingLayer::default();
    let subscriber = tracing_subscriber::registry().with(layer.clone());
    tracing::subscriber::with_default(subscriber, || {
        run_cli(Cli {
            command: Command::Sample(command),
        })
        .expect("configuration is valid");
    });
    let run = layer.span_named("cli.run").expect("run span recorded");
    assert_eq!(run.fields.get("command").map(String::as_str), Some("sample"));
    let sample = layer.span_named("cli.sample").expect("sample span recorded");
    assert_eq!(sample.fields.get("seed").map(String::as_str), Some("11"));
    assert!(layer.span_named("core.graph.build").is_some());
}

fn fixed_report(output: OutputFormat) -> SampleReport {
    let edges = |pairs: &[(usize, usize)]| -> Vec<Edge> {
        pairs
            .iter()
            .filter_map(|&(i, j)| Edge::new(i, j))
            .collect()
    };
    SampleReport {
        vertices: 4,
        correlation: 0.2,
        threshold: 0.5,
        expected_mean_degree: 0.925_6,
        backend: CovarianceBackend::Dense,
        edge_lists: vec![edges(&[(0, 1), (0, 2), (2, 3)]), edges(&[])],
        degrees: vec![vec![2, 1, 2, 1], vec![0, 0, 0, 0]],
        output,
    }
}

#[rstest]
#[case::edges(OutputFormat::Edges, "# sample 0\n0\t1\n0\t2\n2\t3\n# sample 1\n")]
#[case::degrees(OutputFormat::Degrees, "2\t1\t2\t1\n0\t0\t0\t0\n")]
#[case::summary(
    OutputFormat::Summary,
    "vertices: 4\ncorrelation: 0.2\nbackend: Dense\nthreshold: 0.500000\n\
     expected mean degree: 0.9256\nsample\tedges\tmean_degree\n0\t3\t1.5000\n1\t0\t0.0000\n"
)]
fn renders_each_output_format(#[case] output: OutputFormat, #[case] expected: &str) {
    assert_eq!(render(&fixed_report(output)), expected);
}
