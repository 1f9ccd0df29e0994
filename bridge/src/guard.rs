use std::sync::Arc;

use log::info;

use rule_engine::{GuardrailResult, GuardrailsEngine, Policy, Stage};

use crate::agent::{AgentConfig, FusionOutcome, GuardrailsAgent};
use crate::classifier::{Classifier, NoOpClassifier};
use crate::config::GuardConfig;
use crate::error::{ClassifierError, GuardResult};
use crate::tool_gateway::{ToolCall, ToolGate};

// ================================================================================================
// GUARDRAILS
// ================================================================================================

/// Entry point for callers: one engine shared by the fusion agent and the
/// tool gate.
///
/// Immutable after construction; share it behind an `Arc` across tasks.
#[derive(Debug)]
pub struct Guardrails {
    engine: Arc<GuardrailsEngine>,
    agent: GuardrailsAgent,
    tool_gate: ToolGate,
}

impl Guardrails {
    pub fn builder() -> GuardrailsBuilder {
        GuardrailsBuilder::default()
    }

    /// Builds from a loaded config with the given classifier.
    pub fn from_config(config: &GuardConfig, classifier: Arc<dyn Classifier>) -> GuardResult<Self> {
        Self::builder()
            .with_policy(config.policy()?)
            .with_agent_config(config.agent)
            .with_allowed_tools(config.allowed_tools.iter().cloned())
            .with_classifier(classifier)
            .build()
    }

    // ============================================================================================
    // ENTRY POINTS
    // ============================================================================================

    pub fn validate_input(&self, text: &str) -> GuardrailResult {
        self.engine.validate_input(text)
    }

    pub fn validate_output(&self, text: &str) -> GuardrailResult {
        self.engine.validate_output(text)
    }

    pub async fn protect_input(&self, text: &str) -> GuardrailResult {
        self.agent.protect_input(text).await
    }

    pub async fn protect_output(&self, text: &str) -> GuardrailResult {
        self.agent.protect_output(text).await
    }

    pub fn validate_tool_call(&self, call: &ToolCall) -> GuardrailResult {
        self.tool_gate.validate(call)
    }

    /// Fused result plus the classifier status.
    pub async fn protect(&self, stage: Stage, text: &str) -> FusionOutcome {
        self.agent.protect(stage, text).await
    }

    pub async fn try_protect(
        &self,
        stage: Stage,
        text: &str,
    ) -> Result<GuardrailResult, ClassifierError> {
        self.agent.try_protect(stage, text).await
    }

    // ============================================================================================
    // ACCESSORS
    // ============================================================================================

    pub fn engine(&self) -> &GuardrailsEngine {
        &self.engine
    }

    pub fn agent(&self) -> &GuardrailsAgent {
        &self.agent
    }

    pub fn tool_gate(&self) -> &ToolGate {
        &self.tool_gate
    }
}

// ================================================================================================
// BUILDER
// ================================================================================================

/// Defaults: strict policy, default agent config, no-op classifier, no
/// allowed tools.
pub struct GuardrailsBuilder {
    policy: Policy,
    agent_config: AgentConfig,
    allowed_tools: Vec<String>,
    classifier: Arc<dyn Classifier>,
}

impl Default for GuardrailsBuilder {
    fn default() -> Self {
        GuardrailsBuilder {
            policy: Policy::strict(),
            agent_config: AgentConfig::default(),
            allowed_tools: Vec::new(),
            classifier: Arc::new(NoOpClassifier),
        }
    }
}

impl GuardrailsBuilder {
    pub fn with_policy(mut self, policy: Policy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_agent_config(mut self, config: AgentConfig) -> Self {
        self.agent_config = config;
        self
    }

    pub fn with_allowed_tools<I, S>(mut self, tools: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_tools = tools.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_classifier(mut self, classifier: Arc<dyn Classifier>) -> Self {
        self.classifier = classifier;
        self
    }

    /// Fails when the agent config does not validate.
    pub fn build(self) -> GuardResult<Guardrails> {
        let engine = Arc::new(GuardrailsEngine::new(self.policy));
        let agent = GuardrailsAgent::new(Arc::clone(&engine), self.agent_config, self.classifier)?;
        let tool_gate = ToolGate::new(self.allowed_tools, Arc::clone(&engine));

        info!(
            "Guardrails initialized: {} input rules, {} output rules, {} allowed tools, ML fallback {}",
            engine.policy().input_entries().len(),
            engine.policy().output_entries().len(),
            tool_gate.allowed_tools().count(),
            if self.agent_config.enable_fallback { "on" } else { "off" }
        );

        Ok(Guardrails {
            engine,
            agent,
            tool_gate,
        })
    }
}
