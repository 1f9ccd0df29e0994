// Audit records for guardrail decisions.
//
// A record captures one validate/protect outcome with provenance: a fresh
// record id, the UTC decision time, and a SHA-256 fingerprint of the
// evaluated text so decisions can be correlated without storing the text.
// Persisting records is the caller's concern.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::decision::{Finding, GuardrailResult};
use crate::rule_metadata::{Action, Stage};

/// Hex SHA-256 of a text.
pub fn fingerprint(text: &str) -> String {
    format!("{:x}", Sha256::digest(text.as_bytes()))
}

/// One audited decision. Carries the outcome of the evaluation but never
/// the evaluated or forwarded text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecisionRecord {
    pub record_id: Uuid,
    pub decided_at: DateTime<Utc>,
    pub stage: Stage,
    /// SHA-256 of the evaluated text, never the text itself
    pub text_fingerprint: String,
    pub text_len: usize,
    pub action: Action,
    pub risk_score: u8,
    pub findings: Vec<Finding>,
    pub message_to_user: String,
    /// Hash over the fields above, for tamper detection
    pub record_hash: String,
}

impl DecisionRecord {
    pub fn new(stage: Stage, text: &str, result: &GuardrailResult) -> Self {
        let mut record = Self {
            record_id: Uuid::new_v4(),
            decided_at: Utc::now(),
            stage,
            text_fingerprint: fingerprint(text),
            text_len: text.len(),
            action: result.action(),
            risk_score: result.risk_score(),
            findings: result.findings().to_vec(),
            message_to_user: result.message_to_user().to_string(),
            record_hash: String::new(),
        };

        // Compute hash after all fields are set
        record.record_hash = record.compute_hash();
        record
    }

    /// Whether the record was produced for this exact text.
    pub fn matches_text(&self, text: &str) -> bool {
        self.text_fingerprint == fingerprint(text)
    }

    pub fn compute_hash(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.record_id.as_bytes());
        hasher.update(self.decided_at.timestamp_micros().to_le_bytes());
        hasher.update(self.stage.to_string().as_bytes());
        hasher.update(self.text_fingerprint.as_bytes());
        hasher.update((self.text_len as u64).to_le_bytes());
        hasher.update(self.action.name().as_bytes());
        hasher.update([self.risk_score]);
        for finding in &self.findings {
            hasher.update(finding.category.as_bytes());
            hasher.update(finding.rule_id.as_bytes());
            hasher.update([finding.severity]);
            hasher.update(finding.message.as_bytes());
        }
        hasher.update(self.message_to_user.as_bytes());
        format!("{:x}", hasher.finalize())
    }

    pub fn verify_hash(&self) -> bool {
        self.compute_hash() == self.record_hash
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
