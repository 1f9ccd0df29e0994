//! Error types for the classifier boundary and facade setup.

use std::path::PathBuf;

use rule_engine::ConfigError;
use thiserror::Error;

/// Failure of one classifier call.
///
/// Recoverable per request: the fusion agent falls back to the rule-only
/// result and surfaces the error next to it.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ClassifierError {
    #[error("Classifier unavailable: {0}")]
    Unavailable(String),

    #[error("Classifier inference failed: {0}")]
    Inference(String),

    #[error("Invalid classifier verdict: {0}")]
    InvalidVerdict(String),

    #[error("Classifier timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },
}

/// Setup errors. Any of these aborts construction.
#[derive(Debug, Error)]
pub enum GuardError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Invalid agent config: {0}")]
    InvalidAgentConfig(String),

    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse guard config: {0}")]
    Parse(String),
}

pub type GuardResult<T> = Result<T, GuardError>;
