//! Findings and the immutable result of one evaluation.

use serde::Serialize;

use crate::rule_metadata::{Action, OwaspLlmTop10};

/// Lowest and highest severity a finding can carry.
pub const MIN_SEVERITY: u8 = 1;
pub const MAX_SEVERITY: u8 = 10;

/// Upper bound of the aggregate risk score.
pub const MAX_RISK_SCORE: u8 = 100;

// ============================================================================
// FINDING
// ============================================================================

/// One rule's observation about a text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Finding {
    pub category: String,
    /// Name of the rule that produced this finding.
    pub rule_id: String,
    /// 1..=10
    pub severity: u8,
    pub message: String,
    pub taxonomy: Option<OwaspLlmTop10>,
}

impl Finding {
    /// Creates a finding, clamping severity into `1..=10`.
    pub fn new(
        category: impl Into<String>,
        rule_id: impl Into<String>,
        severity: u8,
        message: impl Into<String>,
    ) -> Self {
        Self {
            category: category.into(),
            rule_id: rule_id.into(),
            severity: severity.clamp(MIN_SEVERITY, MAX_SEVERITY),
            message: message.into(),
            taxonomy: None,
        }
    }

    pub fn with_taxonomy(mut self, taxonomy: OwaspLlmTop10) -> Self {
        self.taxonomy = Some(taxonomy);
        self
    }
}

/// `min(100, Σ severity * 10)`.
pub fn risk_score(findings: &[Finding]) -> u8 {
    let total = findings
        .iter()
        .fold(0u32, |acc, f| acc.saturating_add(u32::from(f.severity) * 10));
    total.min(u32::from(MAX_RISK_SCORE)) as u8
}

// ============================================================================
// GUARDRAIL RESULT
// ============================================================================

/// Outcome of one `validate`/`protect` call.
///
/// Fields are private so the invariants hold for every value in circulation:
/// `risk_score <= 100`, and `safe_text` is present exactly when the action is
/// not `Block`. Merging produces a new value; nothing mutates a result after
/// construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GuardrailResult {
    action: Action,
    risk_score: u8,
    safe_text: Option<String>,
    findings: Vec<Finding>,
    message_to_user: String,
}

impl GuardrailResult {
    /// A rejected text. `risk_score` is capped at 100.
    pub fn blocked(risk_score: u32, findings: Vec<Finding>, message: impl Into<String>) -> Self {
        Self {
            action: Action::Block,
            risk_score: cap(risk_score),
            safe_text: None,
            findings,
            message_to_user: message.into(),
        }
    }

    /// A text that may proceed, possibly rewritten.
    ///
    /// Passing `Action::Block` yields a blocked result and drops `safe_text`.
    pub fn permitted(
        action: Action,
        risk_score: u32,
        safe_text: String,
        findings: Vec<Finding>,
        message: impl Into<String>,
    ) -> Self {
        if action.is_blocking() {
            return Self::blocked(risk_score, findings, message);
        }
        Self {
            action,
            risk_score: cap(risk_score),
            safe_text: Some(safe_text),
            findings,
            message_to_user: message.into(),
        }
    }

    pub fn action(&self) -> Action {
        self.action
    }

    pub fn risk_score(&self) -> u8 {
        self.risk_score
    }

    pub fn safe_text(&self) -> Option<&str> {
        self.safe_text.as_deref()
    }

    pub fn findings(&self) -> &[Finding] {
        &self.findings
    }

    pub fn message_to_user(&self) -> &str {
        &self.message_to_user
    }

    pub fn is_blocked(&self) -> bool {
        self.action.is_blocking()
    }

    /// Consumes the result, returning the text to forward (if any).
    pub fn into_safe_text(self) -> Option<String> {
        self.safe_text
    }

    /// Pretty-printed JSON describing the decision and every finding.
    pub fn to_explainability_report(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

fn cap(score: u32) -> u8 {
    score.min(u32::from(MAX_RISK_SCORE)) as u8
}
