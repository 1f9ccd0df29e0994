pub mod rule_metadata;
pub mod error;
pub mod decision;
pub mod rules;
pub mod signal_table;
pub mod policy;
pub mod engine;
pub mod audit_record;

pub use rule_metadata::{
    Action,                 // Resolved outcome, ordered Allow < Sanitize < Block
    EnforcementMode,        // What a triggered policy entry asks for
    OwaspLlmTop10,          // Taxonomy codes attached to findings
    Stage,                  // Input or output
};

pub use error::{ConfigError, ConfigResult};

pub use decision::{
    risk_score, Finding, GuardrailResult, MAX_RISK_SCORE, MAX_SEVERITY, MIN_SEVERITY,
};

pub use rules::{PhraseRule, PiiRule, Rule, SignalRule, REDACTED_EMAIL, REDACTED_PHONE};

pub use signal_table::{Signal, SignalTable, SignalThresholds};

pub use policy::{Policy, PolicyBuilder, PolicyEntry};

pub use engine::{GuardrailsEngine, ALLOW_MESSAGE, BLOCK_MESSAGE, SANITIZE_MESSAGE};

pub use audit_record::{fingerprint, DecisionRecord};
