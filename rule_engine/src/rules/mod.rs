//! # Rules
//!
//! A rule is a single detector over a block of text. Rules are stateless
//! given their configuration and must be total functions over text: the
//! engine never catches a failing `check` or `sanitize`.
//!
//! - [`PhraseRule`]: case-insensitive phrase list, one finding per hit
//! - [`PiiRule`]: email and phone detection with redaction
//! - [`SignalRule`]: weighted signal aggregation against thresholds

mod phrase;
mod pii;
mod signal;

pub use phrase::PhraseRule;
pub use pii::{PiiRule, REDACTED_EMAIL, REDACTED_PHONE};
pub use signal::SignalRule;

use crate::decision::Finding;

/// Detector capability bound into a policy.
pub trait Rule: Send + Sync {
    /// Stable identifier; findings from this rule carry it as `rule_id`.
    fn name(&self) -> &str;

    fn category(&self) -> &str;

    fn check(&self, text: &str) -> Vec<Finding>;

    /// Rewrites the text to remove what this rule detects.
    ///
    /// Rules that do not rewrite return their input unchanged. Applying
    /// `sanitize` to text the rule does not match must be a no-op.
    fn sanitize(&self, text: &str) -> String {
        text.to_string()
    }
}

impl std::fmt::Debug for dyn Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rule")
            .field("name", &self.name())
            .field("category", &self.category())
            .finish()
    }
}
