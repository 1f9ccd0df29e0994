//! # Guard Bridge Library
//!
//! Connects the rule engine to the outside world: classifier fusion, tool
//! gating, configuration loading and the [`Guardrails`] facade.

// Core modules
pub mod agent;
pub mod classifier;
pub mod config;
pub mod error;
pub mod guard;
pub mod tool_gateway;

// Re-export commonly used types
pub use agent::{AgentConfig, ClassifierStatus, FusionOutcome, GuardrailsAgent, SkipReason};
pub use classifier::{
    CachedClassifier, Classifier, ClassifierVerdict, KeywordClassifier, LogitsClassifier,
    LogitsModel, NoOpClassifier, TimeoutClassifier,
};
pub use config::GuardConfig;
pub use error::{ClassifierError, GuardError, GuardResult};
pub use guard::{Guardrails, GuardrailsBuilder};
pub use tool_gateway::{ToolCall, ToolGate};
