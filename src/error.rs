//! Error types.
//!
//! - `AppError` is what the binary reports: a message plus a process exit code.
//! - `FetchError` and `RenderError` belong to one pipeline stage each and are
//!   terminated there; they only become an `AppError` in one-shot commands.

use thiserror::Error;

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

/// User-visible text for any retrieval failure.
pub const FETCH_FAILED_MESSAGE: &str = "Failed to fetch data. Please try again later.";
/// User-visible text for a payload that is neither an array nor an object.
pub const INVALID_FORMAT_MESSAGE: &str = "Invalid data format.";
/// User-visible text for a chart spec the engine refused.
pub const RENDER_FAILED_MESSAGE: &str = "Failed to render chart.";

/// Failure while retrieving a payload for a selection.
#[derive(Debug, Clone, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Transport(String),

    #[error("request failed with status {0}")]
    Status(u16),

    #[error("invalid data format: {0}")]
    Shape(String),
}

impl FetchError {
    /// Short, static message for the UI. The detailed `Display` output is for logs.
    pub fn user_message(&self) -> &'static str {
        match self {
            FetchError::Transport(_) | FetchError::Status(_) => FETCH_FAILED_MESSAGE,
            FetchError::Shape(_) => INVALID_FORMAT_MESSAGE,
        }
    }
}

impl From<FetchError> for AppError {
    fn from(err: FetchError) -> Self {
        AppError::new(4, format!("{}: {err}", err.user_message()))
    }
}

/// A chart spec the engine could not apply.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RenderError {
    #[error("series '{series}' has {got} values for {expected} categories")]
    LengthMismatch {
        series: String,
        expected: usize,
        got: usize,
    },

    #[error("series '{series}' contains a non-finite value")]
    NonFinite { series: String },

    #[error("series '{series}' has an invalid color '{color}'")]
    InvalidColor { series: String, color: String },

    #[error("chart spec has no series")]
    NoSeries,

    #[error("chart surface is already mounted")]
    AlreadyMounted,

    #[error("chart engine has been disposed")]
    Disposed,
}
