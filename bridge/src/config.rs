//! Local guard configuration: agent thresholds, tool allow-list and an
//! optional jailbreak signal table, loaded from JSON text or a file.
//!
//! Documents are trusted as given; nothing here fetches or verifies
//! signatures.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use log::info;
use serde::{Deserialize, Serialize};

use rule_engine::{Policy, SignalRule, SignalTable};

use crate::agent::AgentConfig;
use crate::error::{GuardError, GuardResult};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GuardConfig {
    pub agent: AgentConfig,
    pub allowed_tools: Vec<String>,
    /// Replaces the stock injection phrases in the strict policy.
    pub signals: Option<SignalTable>,
}

impl GuardConfig {
    /// Parses and validates a JSON document.
    pub fn from_json(json: &str) -> GuardResult<Self> {
        let config: GuardConfig =
            serde_json::from_str(json).map_err(|e| GuardError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> GuardResult<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|source| GuardError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json(&json)?;
        info!(
            "Loaded guard config from {}: {} allowed tools, signal table {}",
            path.display(),
            config.allowed_tools.len(),
            config
                .signals
                .as_ref()
                .map(|t| t.version.as_str())
                .unwrap_or("none")
        );
        Ok(config)
    }

    pub fn validate(&self) -> GuardResult<()> {
        self.agent.validate()?;
        if let Some(table) = &self.signals {
            table.validate()?;
        }
        Ok(())
    }

    /// The strict policy, with a signal rule in the injection slot when a
    /// signal table is configured.
    pub fn policy(&self) -> GuardResult<Policy> {
        match &self.signals {
            Some(table) => Ok(Policy::strict_with(Arc::new(SignalRule::new(table)?))),
            None => Ok(Policy::strict()),
        }
    }
}
