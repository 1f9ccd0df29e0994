// Construction-time errors for policies and signal tables.
//
// Nothing in the request path returns these: a policy or signal table that
// fails validation must abort setup instead of degrading silently.

use thiserror::Error;

/// Configuration errors detected while building rules and policies.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("JSON parse error: {0}")]
    JsonParseError(String),

    #[error("Signal table has no signals")]
    EmptySignalTable,

    #[error("Invalid signal ID: {0}")]
    InvalidSignalId(String),

    #[error("Duplicate signal ID: {0}")]
    DuplicateSignalId(String),

    #[error("Invalid weight: signal {signal_id} has weight {weight}")]
    InvalidWeight { signal_id: String, weight: u32 },

    #[error("Invalid pattern: signal {signal_id} - {reason}")]
    InvalidPattern { signal_id: String, reason: String },

    #[error("Invalid thresholds: sanitize {sanitize} exceeds block {block}")]
    InvalidThresholds { sanitize: u32, block: u32 },

    #[error("Invalid severity floor: rule {rule} has floor {floor}, expected 1..=10")]
    InvalidSeverityFloor { rule: String, floor: u8 },

    #[error("Invalid rule: {0}")]
    InvalidRule(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;
