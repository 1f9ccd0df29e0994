// Parse and validate weighted jailbreak signal tables.
//
// A signal table is data, not logic: a versioned catalogue of weighted
// patterns plus the two aggregate thresholds the signal-aggregation rule
// compares its score against. Fetching and verifying a table is the
// caller's concern; this module only decodes an already trusted document
// and rejects malformed ones before any rule is built from it.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::error::{ConfigError, ConfigResult};

/// One weighted signal. Any matching pattern contributes `weight` once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signal {
    pub id: String,
    pub weight: u32,
    pub patterns: Vec<String>,
}

impl Signal {
    pub fn new<I, S>(id: impl Into<String>, weight: u32, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            id: id.into(),
            weight,
            patterns: patterns.into_iter().map(Into::into).collect(),
        }
    }
}

/// Aggregate score thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalThresholds {
    pub block: u32,
    pub sanitize: u32,
}

/// Versioned catalogue of weighted signals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalTable {
    pub version: String,
    pub thresholds: SignalThresholds,
    pub signals: Vec<Signal>,
}

impl SignalTable {
    pub fn new(version: impl Into<String>, thresholds: SignalThresholds, signals: Vec<Signal>) -> Self {
        Self {
            version: version.into(),
            thresholds,
            signals,
        }
    }

    /// Decodes and validates a table from JSON. Unknown fields are ignored.
    pub fn from_json(json: &str) -> ConfigResult<Self> {
        let table: SignalTable =
            serde_json::from_str(json).map_err(|e| ConfigError::JsonParseError(e.to_string()))?;
        table.validate()?;
        Ok(table)
    }

    pub fn to_json(&self) -> ConfigResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| ConfigError::JsonParseError(e.to_string()))
    }

    /// Structural validation.
    ///
    /// Rejects empty tables, blank or duplicate ids, zero weights, signals
    /// without patterns, blank patterns (they would match every text) and a
    /// sanitize threshold above the block threshold.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.signals.is_empty() {
            return Err(ConfigError::EmptySignalTable);
        }

        if self.thresholds.sanitize > self.thresholds.block {
            return Err(ConfigError::InvalidThresholds {
                sanitize: self.thresholds.sanitize,
                block: self.thresholds.block,
            });
        }

        let mut seen = HashSet::new();
        for signal in &self.signals {
            if signal.id.trim().is_empty() {
                return Err(ConfigError::InvalidSignalId(
                    "Signal ID cannot be empty".to_string(),
                ));
            }
            if !seen.insert(signal.id.as_str()) {
                return Err(ConfigError::DuplicateSignalId(signal.id.clone()));
            }
            if signal.weight == 0 {
                return Err(ConfigError::InvalidWeight {
                    signal_id: signal.id.clone(),
                    weight: signal.weight,
                });
            }
            if signal.patterns.is_empty() {
                return Err(ConfigError::InvalidPattern {
                    signal_id: signal.id.clone(),
                    reason: "no patterns defined".to_string(),
                });
            }
            if signal.patterns.iter().any(|p| p.trim().is_empty()) {
                return Err(ConfigError::InvalidPattern {
                    signal_id: signal.id.clone(),
                    reason: "blank pattern".to_string(),
                });
            }
        }

        Ok(())
    }
}
