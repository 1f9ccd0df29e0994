//! # Fusion Agent
//!
//! Combines the rule engine's decision with a jailbreak classifier verdict:
//! 1. Validate with the rule engine
//! 2. Return a rule BLOCK unchanged; the classifier is not consulted
//! 3. Skip the classifier when fallback is disabled or the rule risk is
//!    below `ask_threshold`
//! 4. Otherwise append one ML finding and raise (never lower) the action
//!    and risk score by the verdict's probability
//!
//! A classifier failure falls back to the rule-only result and is reported
//! next to it in [`FusionOutcome::classifier`].

use std::sync::Arc;

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use rule_engine::{Action, Finding, GuardrailResult, GuardrailsEngine, Stage};

use crate::classifier::{Classifier, ClassifierVerdict};
use crate::error::{ClassifierError, GuardError, GuardResult};

pub const ML_CATEGORY: &str = "ML_CLASSIFIER";
pub const ML_RULE_ID: &str = "SLM_JAILBREAK_CLASSIFIER";

pub const ML_ALLOW_MESSAGE: &str = "Allowed: ML classifier found no jailbreak attempt.";
pub const ML_SANITIZE_MESSAGE: &str = "Sanitized: suspicious prompt detected (ML confirmed).";
pub const ML_BLOCK_MESSAGE: &str = "Blocked: jailbreak or policy bypass attempt detected (ML confirmed).";

// ================================================================================================
// CONFIGURATION
// ================================================================================================

/// Controls when and how classifier verdicts are fused.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Consult the classifier at all.
    pub enable_fallback: bool,
    /// Probability at or above which the result is blocked.
    pub block_threshold: f32,
    /// Probability at or above which the result is at least sanitized.
    pub sanitize_threshold: f32,
    /// Rule risk score at or above which the classifier is consulted.
    /// 0 consults it on every non-blocked text.
    pub ask_threshold: u8,
}

impl Default for AgentConfig {
    fn default() -> Self {
        AgentConfig {
            enable_fallback: true,
            block_threshold: 0.85,
            sanitize_threshold: 0.55,
            ask_threshold: 35,
        }
    }
}

impl AgentConfig {
    pub fn with_fallback(mut self, enabled: bool) -> Self {
        self.enable_fallback = enabled;
        self
    }

    pub fn with_thresholds(mut self, sanitize: f32, block: f32) -> Self {
        self.sanitize_threshold = sanitize;
        self.block_threshold = block;
        self
    }

    pub fn with_ask_threshold(mut self, ask_threshold: u8) -> Self {
        self.ask_threshold = ask_threshold;
        self
    }

    pub fn validate(&self) -> GuardResult<()> {
        for (name, value) in [
            ("block_threshold", self.block_threshold),
            ("sanitize_threshold", self.sanitize_threshold),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(GuardError::InvalidAgentConfig(format!(
                    "{} must be within [0, 1], got {}",
                    name, value
                )));
            }
        }
        if self.sanitize_threshold > self.block_threshold {
            return Err(GuardError::InvalidAgentConfig(format!(
                "sanitize_threshold {} exceeds block_threshold {}",
                self.sanitize_threshold, self.block_threshold
            )));
        }
        if u32::from(self.ask_threshold) > u32::from(rule_engine::MAX_RISK_SCORE) {
            return Err(GuardError::InvalidAgentConfig(format!(
                "ask_threshold must be within 0..=100, got {}",
                self.ask_threshold
            )));
        }
        Ok(())
    }

    fn severity_for(&self, probability: f32) -> u8 {
        if probability >= self.block_threshold {
            10
        } else if probability >= self.sanitize_threshold {
            7
        } else {
            2
        }
    }

    fn action_for(&self, probability: f32) -> Action {
        if probability >= self.block_threshold {
            Action::Block
        } else if probability >= self.sanitize_threshold {
            Action::Sanitize
        } else {
            Action::Allow
        }
    }
}

// ================================================================================================
// OUTCOME
// ================================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Rules already blocked; a verdict could not change the outcome.
    RuleBlocked,
    /// `enable_fallback` is off.
    Disabled,
    /// Rule risk score below `ask_threshold`.
    BelowAskThreshold,
}

/// What happened on the classifier path of one `protect` call.
#[derive(Debug, Clone, PartialEq)]
pub enum ClassifierStatus {
    Skipped(SkipReason),
    Consulted(ClassifierVerdict),
    /// The result is the rule-only decision.
    Failed(ClassifierError),
}

#[derive(Debug, Clone, PartialEq)]
pub struct FusionOutcome {
    pub result: GuardrailResult,
    pub classifier: ClassifierStatus,
}

impl FusionOutcome {
    fn skipped(result: GuardrailResult, reason: SkipReason) -> Self {
        FusionOutcome {
            result,
            classifier: ClassifierStatus::Skipped(reason),
        }
    }

    /// True when the classifier should have been consulted but was not
    /// usable.
    pub fn is_degraded(&self) -> bool {
        matches!(self.classifier, ClassifierStatus::Failed(_))
    }
}

// ================================================================================================
// AGENT
// ================================================================================================

pub struct GuardrailsAgent {
    engine: Arc<GuardrailsEngine>,
    config: AgentConfig,
    classifier: Arc<dyn Classifier>,
}

impl std::fmt::Debug for GuardrailsAgent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GuardrailsAgent")
            .field("engine", &self.engine)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl GuardrailsAgent {
    /// Fails when `config` does not validate.
    pub fn new(
        engine: Arc<GuardrailsEngine>,
        config: AgentConfig,
        classifier: Arc<dyn Classifier>,
    ) -> GuardResult<Self> {
        config.validate()?;
        Ok(GuardrailsAgent {
            engine,
            config,
            classifier,
        })
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    pub fn engine(&self) -> &GuardrailsEngine {
        &self.engine
    }

    pub async fn protect_input(&self, text: &str) -> GuardrailResult {
        self.protect(Stage::Input, text).await.result
    }

    pub async fn protect_output(&self, text: &str) -> GuardrailResult {
        self.protect(Stage::Output, text).await.result
    }

    /// Like [`protect`](Self::protect) but returns the classifier failure
    /// instead of the fallback result.
    pub async fn try_protect(
        &self,
        stage: Stage,
        text: &str,
    ) -> Result<GuardrailResult, ClassifierError> {
        let outcome = self.protect(stage, text).await;
        match outcome.classifier {
            ClassifierStatus::Failed(e) => Err(e),
            _ => Ok(outcome.result),
        }
    }

    pub async fn protect(&self, stage: Stage, text: &str) -> FusionOutcome {
        let base = self.engine.validate(stage, text);

        if base.is_blocked() {
            return FusionOutcome::skipped(base, SkipReason::RuleBlocked);
        }
        if !self.config.enable_fallback {
            return FusionOutcome::skipped(base, SkipReason::Disabled);
        }
        if base.risk_score() < self.config.ask_threshold {
            return FusionOutcome::skipped(base, SkipReason::BelowAskThreshold);
        }

        let verdict = match self.classifier.predict(text).await {
            Ok(verdict) => verdict,
            Err(e) => return self.fall_back(stage, base, e),
        };
        if let Err(e) = verdict.validate() {
            return self.fall_back(stage, base, e);
        }

        let result = self.fuse(base, &verdict);
        debug!(
            "{} fusion: verdict {} p={}, action {}, risk {}",
            stage,
            verdict.label,
            verdict.probability,
            result.action(),
            result.risk_score()
        );

        FusionOutcome {
            result,
            classifier: ClassifierStatus::Consulted(verdict),
        }
    }

    fn fall_back(&self, stage: Stage, base: GuardrailResult, error: ClassifierError) -> FusionOutcome {
        warn!(
            "{} classifier unavailable, using rule-only decision {}: {}",
            stage,
            base.action(),
            error
        );
        FusionOutcome {
            result: base,
            classifier: ClassifierStatus::Failed(error),
        }
    }

    /// Pure merge of a non-blocked base result with a verdict.
    ///
    /// Safe text is carried over from the base result as is; it is not
    /// re-sanitized after an upgrade that only the classifier caused.
    fn fuse(&self, base: GuardrailResult, verdict: &ClassifierVerdict) -> GuardrailResult {
        let probability = verdict.probability;

        let ml_finding = Finding::new(
            ML_CATEGORY,
            ML_RULE_ID,
            self.config.severity_for(probability),
            format!(
                "ML verdict={}, jailbreakProbability={}",
                verdict.label, probability
            ),
        );

        let ml_risk = (probability * 100.0).round() as u32;
        let risk = u32::from(base.risk_score()).max(ml_risk);
        let action = base.action().max(self.config.action_for(probability));

        let mut findings = base.findings().to_vec();
        findings.push(ml_finding);

        let message = match action {
            Action::Block => ML_BLOCK_MESSAGE,
            Action::Sanitize => ML_SANITIZE_MESSAGE,
            Action::Allow => ML_ALLOW_MESSAGE,
        };

        match action {
            Action::Block => GuardrailResult::blocked(risk, findings, message),
            _ => {
                let safe_text = base.into_safe_text().unwrap_or_default();
                GuardrailResult::permitted(action, risk, safe_text, findings, message)
            }
        }
    }
}
