//! CLI-specific error types and exit code mapping

use sigmaforge_core::error::SigmaforgeError;
use sigmaforge_convert::ConvertError;
use sigmaforge_sigma::SigmaError;

/// CLI-specific error type.
///
/// Each variant carries enough context for a user-friendly message.
/// The `exit_code()` method maps errors to standard Unix exit codes.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Configuration loading or validation failure.
    #[error("configuration error: {0}")]
    Config(String),

    /// A subcommand-specific operation failed.
    #[error("{0}")]
    Command(String),

    /// Rules root directory does not exist (checked before any processing).
    #[error("rules directory not found: {path}")]
    Precondition { path: String },

    /// JSON serialisation failed during output rendering.
    #[error("json output error: {0}")]
    JsonSerialize(#[from] serde_json::Error),

    /// IO error (file read, stdout write, etc.).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Wrapped domain error from sigmaforge-core.
    #[error("{0}")]
    Core(#[from] SigmaforgeError),

    /// Conversion run error.
    #[error("convert error: {0}")]
    Convert(String),

    /// Rule parsing/compilation error.
    #[error("rule error: {0}")]
    Rule(String),
}

impl CliError {
    /// Map the error to a process exit code.
    ///
    /// | Code | Meaning                          |
    /// |------|----------------------------------|
    /// | 0    | Success                          |
    /// | 1    | General / command error          |
    /// | 2    | Configuration error              |
    /// | 3    | Rules directory missing          |
    /// | 10   | IO error                         |
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) => 2,
            Self::Precondition { .. } => 3,
            Self::Io(_) => 10,
            Self::JsonSerialize(_)
            | Self::Command(_)
            | Self::Core(_)
            | Self::Convert(_)
            | Self::Rule(_) => 1,
        }
    }
}

impl From<ConvertError> for CliError {
    fn from(e: ConvertError) -> Self {
        match e {
            ConvertError::RulesRootMissing { path } => Self::Precondition { path },
            other => Self::Convert(other.to_string()),
        }
    }
}

impl From<SigmaError> for CliError {
    fn from(e: SigmaError) -> Self {
        Self::Rule(e.to_string())
    }
}
