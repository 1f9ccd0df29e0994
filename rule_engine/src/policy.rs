//! # Policy
//!
//! Per-stage ordered binding of rules to enforcement modes and severity
//! floors.
//!
//! Entry order does not influence the resolved action, but it fixes the
//! order of findings in a result and the order sanitizers run in.
//! A policy is immutable once built and can be shared across threads.

use std::sync::Arc;

use crate::decision::{MAX_SEVERITY, MIN_SEVERITY};
use crate::error::{ConfigError, ConfigResult};
use crate::rule_metadata::{EnforcementMode, Stage};
use crate::rules::{PhraseRule, PiiRule, Rule};

// ================================================================================================
// POLICY ENTRY
// ================================================================================================

/// One rule bound into a policy.
#[derive(Debug, Clone)]
pub struct PolicyEntry {
    pub rule: Arc<dyn Rule>,
    pub mode: EnforcementMode,
    /// A finding counts only when its severity is at least this (1..=10).
    pub min_severity_to_trigger: u8,
}

impl PolicyEntry {
    pub fn new(rule: Arc<dyn Rule>, mode: EnforcementMode, min_severity_to_trigger: u8) -> Self {
        PolicyEntry {
            rule,
            mode,
            min_severity_to_trigger,
        }
    }

    fn validate(&self) -> ConfigResult<()> {
        if self.rule.name().trim().is_empty() {
            return Err(ConfigError::InvalidRule("rule name cannot be empty".to_string()));
        }
        if !(MIN_SEVERITY..=MAX_SEVERITY).contains(&self.min_severity_to_trigger) {
            return Err(ConfigError::InvalidSeverityFloor {
                rule: self.rule.name().to_string(),
                floor: self.min_severity_to_trigger,
            });
        }
        Ok(())
    }
}

// ================================================================================================
// POLICY
// ================================================================================================

#[derive(Debug, Clone, Default)]
pub struct Policy {
    input_entries: Vec<PolicyEntry>,
    output_entries: Vec<PolicyEntry>,
}

impl Policy {
    /// Builds a policy, validating every entry.
    pub fn new(input_entries: Vec<PolicyEntry>, output_entries: Vec<PolicyEntry>) -> ConfigResult<Self> {
        for entry in input_entries.iter().chain(output_entries.iter()) {
            entry.validate()?;
        }
        Ok(Policy {
            input_entries,
            output_entries,
        })
    }

    pub fn builder() -> PolicyBuilder {
        PolicyBuilder::default()
    }

    /// A policy with no rules: every text is allowed unchanged.
    pub fn empty() -> Self {
        Policy::default()
    }

    /// Default production policy.
    ///
    /// Input: prompt injection blocks at floor 8, PII and toxicity sanitize
    /// at floor 1. Output: PII sanitizes at floor 1.
    pub fn strict() -> Self {
        Self::strict_with(Arc::new(PhraseRule::prompt_injection()))
    }

    /// The strict policy with a different rule in the blocking injection slot,
    /// e.g. a [`SignalRule`](crate::rules::SignalRule) built from a signal table.
    pub fn strict_with(injection_rule: Arc<dyn Rule>) -> Self {
        let pii: Arc<dyn Rule> = Arc::new(PiiRule::new());
        Policy {
            input_entries: vec![
                PolicyEntry::new(injection_rule, EnforcementMode::BlockIfFound, 8),
                PolicyEntry::new(pii.clone(), EnforcementMode::SanitizeIfFound, 1),
                PolicyEntry::new(
                    Arc::new(PhraseRule::toxicity()),
                    EnforcementMode::SanitizeIfFound,
                    1,
                ),
            ],
            output_entries: vec![PolicyEntry::new(pii, EnforcementMode::SanitizeIfFound, 1)],
        }
    }

    pub fn entries(&self, stage: Stage) -> &[PolicyEntry] {
        match stage {
            Stage::Input => &self.input_entries,
            Stage::Output => &self.output_entries,
        }
    }

    pub fn input_entries(&self) -> &[PolicyEntry] {
        &self.input_entries
    }

    pub fn output_entries(&self) -> &[PolicyEntry] {
        &self.output_entries
    }
}

// ================================================================================================
// BUILDER
// ================================================================================================

/// Accumulates entries in insertion order; `build` validates them.
#[derive(Debug, Default)]
pub struct PolicyBuilder {
    input_entries: Vec<PolicyEntry>,
    output_entries: Vec<PolicyEntry>,
}

impl PolicyBuilder {
    pub fn input(mut self, rule: Arc<dyn Rule>, mode: EnforcementMode, min_severity: u8) -> Self {
        self.input_entries.push(PolicyEntry::new(rule, mode, min_severity));
        self
    }

    pub fn output(mut self, rule: Arc<dyn Rule>, mode: EnforcementMode, min_severity: u8) -> Self {
        self.output_entries.push(PolicyEntry::new(rule, mode, min_severity));
        self
    }

    /// Binds the same rule on both stages.
    pub fn both(self, rule: Arc<dyn Rule>, mode: EnforcementMode, min_severity: u8) -> Self {
        self.input(rule.clone(), mode, min_severity)
            .output(rule, mode, min_severity)
    }

    pub fn build(self) -> ConfigResult<Policy> {
        Policy::new(self.input_entries, self.output_entries)
    }
}
