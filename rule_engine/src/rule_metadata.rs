// Enforcement metadata shared by every rule binding.
//
// This module defines the small closed vocabularies the engine reasons with:
// where in the pipeline a text sits (Stage), what a policy entry does when
// its rule fires (EnforcementMode), what the engine finally decides (Action),
// and the optional taxonomy tag a finding can carry for reporting.

use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// STAGE
// ============================================================================

/// Pipeline position of the text being evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Stage {
    /// Prompt on its way to the model.
    Input,
    /// Model response on its way back to the caller.
    Output,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Input => write!(f, "INPUT"),
            Stage::Output => write!(f, "OUTPUT"),
        }
    }
}

// ============================================================================
// ACTION
// ============================================================================

/// Final disposition of a text.
///
/// The derived ordering is the resolution order: `Allow < Sanitize < Block`.
/// Anything that merges two decisions keeps the larger one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Action {
    Allow,
    Sanitize,
    Block,
}

impl Action {
    pub fn name(&self) -> &'static str {
        match self {
            Action::Allow => "ALLOW",
            Action::Sanitize => "SANITIZE",
            Action::Block => "BLOCK",
        }
    }

    /// Returns true if this action rejects the text outright.
    pub fn is_blocking(&self) -> bool {
        matches!(self, Action::Block)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ============================================================================
// ENFORCEMENT MODE
// ============================================================================

/// How a policy entry treats matches from its rule.
///
/// Attached to the policy entry, not to the rule: the same rule can block in
/// one policy and sanitize in another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EnforcementMode {
    /// Report findings, never change the outcome.
    AllowOnly,
    /// Rewrite the text when the rule fires.
    SanitizeIfFound,
    /// Reject the text when the rule fires.
    BlockIfFound,
}

impl EnforcementMode {
    pub fn to_action(self) -> Action {
        match self {
            EnforcementMode::AllowOnly => Action::Allow,
            EnforcementMode::SanitizeIfFound => Action::Sanitize,
            EnforcementMode::BlockIfFound => Action::Block,
        }
    }
}

// ============================================================================
// TAXONOMY
// ============================================================================

/// OWASP Top 10 for LLM applications, used to tag findings for reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OwaspLlmTop10 {
    LLM01,
    LLM02,
    LLM03,
    LLM04,
    LLM05,
    LLM06,
    LLM07,
    LLM08,
    LLM09,
    LLM10,
}

impl OwaspLlmTop10 {
    pub fn all() -> [OwaspLlmTop10; 10] {
        use OwaspLlmTop10::*;
        [LLM01, LLM02, LLM03, LLM04, LLM05, LLM06, LLM07, LLM08, LLM09, LLM10]
    }

    pub fn code(&self) -> &'static str {
        match self {
            OwaspLlmTop10::LLM01 => "LLM01",
            OwaspLlmTop10::LLM02 => "LLM02",
            OwaspLlmTop10::LLM03 => "LLM03",
            OwaspLlmTop10::LLM04 => "LLM04",
            OwaspLlmTop10::LLM05 => "LLM05",
            OwaspLlmTop10::LLM06 => "LLM06",
            OwaspLlmTop10::LLM07 => "LLM07",
            OwaspLlmTop10::LLM08 => "LLM08",
            OwaspLlmTop10::LLM09 => "LLM09",
            OwaspLlmTop10::LLM10 => "LLM10",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            OwaspLlmTop10::LLM01 => "Prompt Injection",
            OwaspLlmTop10::LLM02 => "Insecure Output Handling",
            OwaspLlmTop10::LLM03 => "Training Data Poisoning",
            OwaspLlmTop10::LLM04 => "Model Denial of Service",
            OwaspLlmTop10::LLM05 => "Supply Chain Vulnerabilities",
            OwaspLlmTop10::LLM06 => "Sensitive Information Disclosure",
            OwaspLlmTop10::LLM07 => "Insecure Plugin Design",
            OwaspLlmTop10::LLM08 => "Excessive Agency",
            OwaspLlmTop10::LLM09 => "Overreliance",
            OwaspLlmTop10::LLM10 => "Model Theft",
        }
    }

    /// Looks up a taxonomy entry by its code (`"LLM06"`).
    pub fn from_code(code: &str) -> Option<Self> {
        Self::all().into_iter().find(|entry| entry.code() == code)
    }
}

impl fmt::Display for OwaspLlmTop10 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.code(), self.title())
    }
}
