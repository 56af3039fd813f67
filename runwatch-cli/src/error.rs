//! CLI-specific error types and exit code mapping

use runwatch_core::error::RunwatchError;
use runwatch_matcher::RunMatcherError;

/// CLI-specific error type.
///
/// Each variant carries enough context for a user-friendly message.
/// The `exit_code()` method maps errors to process exit codes.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Configuration loading or validation failure.
    #[error("configuration error: {0}")]
    Config(String),

    /// The alert sink could not be opened or its schema prepared.
    #[error("sink error: {0}")]
    Sink(String),

    /// The input file could not be opened or read.
    #[error("input error: {0}")]
    Input(#[from] std::io::Error),

    /// Logging could not be initialized.
    #[error("logging error: {0}")]
    Logging(String),

    /// Any other failure during the run.
    #[error("{0}")]
    Run(String),
}

impl CliError {
    /// Map the error to a process exit code.
    ///
    /// | Code | Meaning                          |
    /// |------|----------------------------------|
    /// | 0    | Success                          |
    /// | 1    | General error                    |
    /// | 2    | Configuration error              |
    /// | 3    | Sink connect / schema failure    |
    /// | 10   | Input file I/O error             |
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) => 2,
            Self::Sink(_) => 3,
            Self::Input(_) => 10,
            Self::Logging(_) | Self::Run(_) => 1,
        }
    }

    /// Wrap a configuration loading failure.
    pub fn config(err: RunwatchError) -> Self {
        Self::Config(err.to_string())
    }

    /// Wrap a sink open failure.
    pub fn sink(err: RunwatchError) -> Self {
        Self::Sink(err.to_string())
    }
}

impl From<RunMatcherError> for CliError {
    fn from(e: RunMatcherError) -> Self {
        match e {
            RunMatcherError::Config { .. } => Self::Config(e.to_string()),
            RunMatcherError::Sink(_) => Self::Sink(e.to_string()),
            RunMatcherError::Io(io) => Self::Input(io),
            other => Self::Run(other.to_string()),
        }
    }
}
