//! Command-line parsing for the performance report.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the pipeline code.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::{Device, Metric, SeriesMode, SourceKind};
use crate::logging::LogFormat;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(
    name = "perf-report",
    version,
    about = "Web performance report: LCP / CLS over time, per device"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Launch the interactive TUI (default).
    Tui(ReportArgs),
    /// Fetch once and print the normalized series.
    Show(ReportArgs),
    /// Fetch once and print (or write) the chart spec as JSON.
    Spec(SpecArgs),
}

/// Options shared by every command.
#[derive(Debug, Args, Clone)]
pub struct ReportArgs {
    /// Metric to report.
    #[arg(short = 'm', long, value_enum, default_value_t = Metric::Lcp)]
    pub metric: Metric,

    /// Device class.
    #[arg(short = 'd', long, value_enum, default_value_t = Device::Mobile)]
    pub device: Device,

    /// Read records as one `value` (single) or five stacked channels (multi).
    #[arg(long, value_enum, default_value_t = SeriesMode::Single)]
    pub mode: SeriesMode,

    /// Where payloads come from.
    #[arg(long, value_enum, default_value_t = SourceKind::Sample)]
    pub source: SourceKind,

    /// Retrieval endpoint for `--source http` (falls back to PERF_REPORT_ENDPOINT).
    #[arg(long)]
    pub endpoint: Option<String>,

    /// HTTP request timeout in seconds.
    #[arg(long, default_value_t = 10)]
    pub timeout_secs: u64,

    /// Random seed for the sample source.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Artificial sample-source delay in milliseconds.
    #[arg(long, default_value_t = 0)]
    pub sample_latency_ms: u64,

    /// Log level used when RUST_LOG is not set.
    #[arg(long, default_value = "info")]
    pub log_level: String,

    /// Log output format.
    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,

    /// Log file for the TUI (other commands log to stderr).
    #[arg(long, default_value = "perf-report.log")]
    pub log_file: PathBuf,
}

/// Options for `spec`.
#[derive(Debug, Args, Clone)]
pub struct SpecArgs {
    #[command(flatten)]
    pub report: ReportArgs,

    /// Write the chart spec to this file instead of stdout.
    #[arg(long, value_name = "JSON")]
    pub out: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_show_with_flags() {
        let cli = Cli::parse_from([
            "perf-report", "show", "-m", "cls", "-d", "desktop", "--mode", "multi",
        ]);
        let Command::Show(args) = cli.command else {
            panic!("expected show");
        };
        assert_eq!(args.metric, Metric::Cls);
        assert_eq!(args.device, Device::Desktop);
        assert_eq!(args.mode, SeriesMode::Multi);
        assert_eq!(args.source, SourceKind::Sample);
    }

    #[test]
    fn parses_spec_out() {
        let cli = Cli::parse_from(["perf-report", "spec", "--out", "chart.json"]);
        let Command::Spec(args) = cli.command else {
            panic!("expected spec");
        };
        assert_eq!(args.out, Some(PathBuf::from("chart.json")));
        assert_eq!(args.report.metric, Metric::Lcp);
    }
}
