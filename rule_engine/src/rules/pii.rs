// PII rule: email addresses and loose 10-digit phone numbers.

use once_cell::sync::Lazy;
use regex::Regex;

use super::Rule;
use crate::decision::Finding;
use crate::rule_metadata::OwaspLlmTop10;

pub const REDACTED_EMAIL: &str = "[REDACTED_EMAIL]";
pub const REDACTED_PHONE: &str = "[REDACTED_PHONE]";

const PII_SEVERITY: u8 = 6;

static EMAIL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}").expect("valid email regex")
});

static PHONE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(\+?\d{1,3}[- ]?)?\d{10}\b").expect("valid phone regex"));

/// Detects emails and phone numbers; redacts both on sanitize.
///
/// Emits at most one finding per category regardless of how many matches
/// the text contains.
#[derive(Debug, Clone, Copy, Default)]
pub struct PiiRule;

impl PiiRule {
    pub fn new() -> Self {
        PiiRule
    }

    fn finding(&self, message: &str) -> Finding {
        Finding::new(self.category(), self.name(), PII_SEVERITY, message)
            .with_taxonomy(OwaspLlmTop10::LLM06)
    }
}

impl Rule for PiiRule {
    fn name(&self) -> &str {
        "PII_V1"
    }

    fn category(&self) -> &str {
        "PII"
    }

    fn check(&self, text: &str) -> Vec<Finding> {
        let mut findings = Vec::new();
        if EMAIL_PATTERN.is_match(text) {
            findings.push(self.finding("Email address detected."));
        }
        if PHONE_PATTERN.is_match(text) {
            findings.push(self.finding("Phone number detected."));
        }
        findings
    }

    fn sanitize(&self, text: &str) -> String {
        let without_email = EMAIL_PATTERN.replace_all(text, REDACTED_EMAIL);
        PHONE_PATTERN
            .replace_all(&without_email, REDACTED_PHONE)
            .into_owned()
    }
}
