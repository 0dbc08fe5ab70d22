//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - resolves configuration (flags + `.env`)
//! - initializes logging
//! - dispatches to the TUI or a one-shot command

use std::time::Duration;

use clap::Parser;
use tracing::info;

use crate::cli::{Command, ReportArgs, SpecArgs};
use crate::data::HttpSource;
use crate::domain::{MetricSelection, ReportConfig};
use crate::error::AppError;
use crate::logging::{LogTarget, init_tracing};

pub mod pipeline;

/// Entry point for the `perf-report` binary.
pub fn run() -> Result<(), AppError> {
    // We want `perf-report` and `perf-report -m cls` to behave like `perf-report tui ...`.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    match cli.command {
        Command::Tui(args) => handle_tui(args),
        Command::Show(args) => handle_show(args),
        Command::Spec(args) => handle_spec(args),
    }
}

fn handle_tui(args: ReportArgs) -> Result<(), AppError> {
    init_tracing(&args.log_level, args.log_format, &LogTarget::File(args.log_file.clone()))?;
    let config = report_config_from_args(&args);
    info!(selection = %config.selection, source = ?config.source, "starting tui");
    crate::tui::run(config)
}

fn handle_show(args: ReportArgs) -> Result<(), AppError> {
    init_tracing(&args.log_level, args.log_format, &LogTarget::Stderr)?;
    let config = report_config_from_args(&args);
    let run = pipeline::run_once(&config)?;

    println!(
        "{}",
        crate::report::format_run_summary(
            run.selection,
            run.mode,
            &run.source,
            run.spec.as_ref(),
            run.series.len(),
        )
    );
    if let Some(spec) = &run.spec {
        println!("{}", crate::report::format_series_table(&run.series, spec));
    }
    Ok(())
}

fn handle_spec(args: SpecArgs) -> Result<(), AppError> {
    init_tracing(&args.report.log_level, args.report.log_format, &LogTarget::Stderr)?;
    let config = report_config_from_args(&args.report);
    let run = pipeline::run_once(&config)?;

    let export = crate::io::SpecExport::new(run.selection, run.mode, run.source, run.spec);
    match &args.out {
        Some(path) => {
            crate::io::write_spec_json(path, &export)?;
            info!(path = %path.display(), "wrote chart spec");
        }
        None => println!("{}", crate::io::spec_json_string(&export)?),
    }
    Ok(())
}

pub fn report_config_from_args(args: &ReportArgs) -> ReportConfig {
    ReportConfig {
        selection: MetricSelection::new(args.metric, args.device),
        mode: args.mode,
        source: args.source,
        endpoint: args.endpoint.clone().or_else(HttpSource::endpoint_from_env),
        timeout: Duration::from_secs(args.timeout_secs.max(1)),
        seed: args.seed,
        sample_latency: Duration::from_millis(args.sample_latency_ms),
    }
}

/// Rewrite argv so `perf-report` defaults to `perf-report tui`.
///
/// Rules:
/// - `perf-report`                      -> `perf-report tui`
/// - `perf-report -m cls ...`           -> `perf-report tui -m cls ...`
/// - `perf-report --help/--version/-h`  -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("tui".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "tui" | "show" | "spec");
    if is_subcommand {
        return argv;
    }

    // If the first token is a flag, treat it as "tui flags".
    if arg1.starts_with('-') {
        argv.insert(1, "tui".to_string());
        return argv;
    }

    // Otherwise, leave as-is.
    argv
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Device, Metric, SeriesMode, SourceKind};

    fn argv(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn bare_invocation_runs_tui() {
        assert_eq!(rewrite_args(argv(&["perf-report"])), argv(&["perf-report", "tui"]));
    }

    #[test]
    fn leading_flags_go_to_tui() {
        assert_eq!(
            rewrite_args(argv(&["perf-report", "-m", "cls"])),
            argv(&["perf-report", "tui", "-m", "cls"])
        );
    }

    #[test]
    fn subcommands_and_help_are_untouched() {
        for first in ["show", "spec", "tui", "--help", "-V"] {
            let args = argv(&["perf-report", first]);
            assert_eq!(rewrite_args(args.clone()), args);
        }
    }

    #[test]
    fn config_from_args() {
        let cli = crate::cli::Cli::parse_from([
            "perf-report",
            "show",
            "-m",
            "cls",
            "--mode",
            "multi",
            "--endpoint",
            "http://localhost:9000/metrics",
            "--timeout-secs",
            "0",
        ]);
        let Command::Show(args) = cli.command else {
            panic!("expected show");
        };
        let config = report_config_from_args(&args);
        assert_eq!(config.selection, MetricSelection::new(Metric::Cls, Device::Mobile));
        assert_eq!(config.mode, SeriesMode::Multi);
        assert_eq!(config.source, SourceKind::Sample);
        assert_eq!(config.endpoint.as_deref(), Some("http://localhost:9000/metrics"));
        assert_eq!(config.timeout, Duration::from_secs(1));
    }
}
