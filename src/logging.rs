//! Tracing setup.
//!
//! The TUI owns the terminal, so it logs to a file; one-shot commands log to
//! stderr. `RUST_LOG` overrides the configured level.

use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;

use clap::ValueEnum;
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt, prelude::*};

use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Clone)]
pub enum LogTarget {
    Stderr,
    File(PathBuf),
}

pub fn init_tracing(level: &str, format: LogFormat, target: &LogTarget) -> Result<(), AppError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let layer: Box<dyn Layer<Registry> + Send + Sync> = match target {
        LogTarget::Stderr => match format {
            LogFormat::Text => fmt::layer().with_writer(std::io::stderr).boxed(),
            LogFormat::Json => fmt::layer().json().with_writer(std::io::stderr).boxed(),
        },
        LogTarget::File(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|e| AppError::new(2, format!("Failed to open log file '{}': {e}", path.display())))?;
            let writer = Mutex::new(file);
            match format {
                LogFormat::Text => fmt::layer().with_writer(writer).with_ansi(false).boxed(),
                LogFormat::Json => fmt::layer().json().with_writer(writer).boxed(),
            }
        }
    };

    tracing_subscriber::registry()
        .with(layer)
        .with(filter)
        .try_init()
        .map_err(|e| AppError::new(4, format!("Failed to initialize tracing: {e}")))?;

    Ok(())
}
