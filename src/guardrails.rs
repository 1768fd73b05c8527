//! Input guardrails evaluated before any routing happens

use crate::agent::AgentSpec;
use crate::error::{Error, Result};
use crate::outputs::StructuredOutput;
use crate::provider::{Completion, CompletionProvider};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Result of a guardrail check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuardrailVerdict {
    /// Guardrail that produced the verdict
    pub guardrail: String,
    /// Whether the tripwire fired
    pub triggered: bool,
    /// Explanation of the result
    pub reasoning: String,
}

impl GuardrailVerdict {
    /// Create a passing verdict
    pub fn pass(guardrail: impl Into<String>, reasoning: impl Into<String>) -> Self {
        Self {
            guardrail: guardrail.into(),
            triggered: false,
            reasoning: reasoning.into(),
        }
    }

    /// Create a verdict that trips the wire
    pub fn trip(guardrail: impl Into<String>, reasoning: impl Into<String>) -> Self {
        Self {
            guardrail: guardrail.into(),
            triggered: true,
            reasoning: reasoning.into(),
        }
    }

    /// Lifecycle state this verdict settles a check in
    pub fn state(&self) -> GuardrailState {
        if self.triggered {
            GuardrailState::Tripped
        } else {
            GuardrailState::Passed
        }
    }
}

/// Lifecycle of one guardrail evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GuardrailState {
    /// Not evaluated yet
    Pending,
    /// Evaluated, input may proceed
    Passed,
    /// Evaluated, input is rejected
    Tripped,
    /// The check itself could not run
    Failed,
}

impl fmt::Display for GuardrailState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Pending => "pending",
            Self::Passed => "passed",
            Self::Tripped => "tripped",
            Self::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// Input guardrail trait
#[async_trait]
pub trait InputGuardrail: Send + Sync {
    /// Unique identifier
    fn id(&self) -> &str;

    /// Check input before agent processing
    async fn check(&self, input: &str) -> Result<GuardrailVerdict>;
}

/// Guardrail backed by a check agent that answers with a verdict
pub struct AgentGuardrail {
    id: String,
    agent: Arc<AgentSpec>,
    provider: Arc<dyn CompletionProvider>,
}

impl AgentGuardrail {
    /// Create a guardrail running `agent` through `provider`
    pub fn new(
        id: impl Into<String>,
        agent: Arc<AgentSpec>,
        provider: Arc<dyn CompletionProvider>,
    ) -> Self {
        Self {
            id: id.into(),
            agent,
            provider,
        }
    }

    /// The check agent
    pub fn agent(&self) -> &Arc<AgentSpec> {
        &self.agent
    }
}

#[async_trait]
impl InputGuardrail for AgentGuardrail {
    fn id(&self) -> &str {
        &self.id
    }

    async fn check(&self, input: &str) -> Result<GuardrailVerdict> {
        let completion = self.provider.complete(self.agent.check_task(input)).await?;
        match completion {
            Completion::Final(StructuredOutput::Verdict(output)) => Ok(GuardrailVerdict {
                guardrail: self.id.clone(),
                triggered: output.is_math_homework,
                reasoning: output.reasoning,
            }),
            Completion::Final(other) => Err(Error::provider(format!(
                "guardrail '{}' expected a verdict, got {} output",
                self.id,
                other.schema().name()
            ))),
            Completion::Handoff { target, .. } => Err(Error::provider(format!(
                "guardrail '{}' attempted a handoff to '{}'",
                self.id, target
            ))),
        }
    }
}

/// Ordered set of input guardrails run before routing
#[derive(Clone, Default)]
pub struct GuardrailStage {
    guardrails: Vec<Arc<dyn InputGuardrail>>,
}

impl GuardrailStage {
    /// Create a stage from guardrails, evaluated in order
    pub fn new(guardrails: Vec<Arc<dyn InputGuardrail>>) -> Self {
        Self { guardrails }
    }

    /// The input guardrails attached to `agent`
    pub fn for_agent(agent: &AgentSpec) -> Self {
        Self::new(agent.input_guardrails.clone())
    }

    /// Number of guardrails
    pub fn len(&self) -> usize {
        self.guardrails.len()
    }

    /// Whether the stage has no guardrails
    pub fn is_empty(&self) -> bool {
        self.guardrails.is_empty()
    }

    /// Run every guardrail in order; the first tripped verdict wins.
    ///
    /// A failing check aborts the stage with its error. There are no retries
    /// here; transient provider failures are retried by the client.
    #[instrument(skip_all, fields(guardrails = self.guardrails.len()))]
    pub async fn evaluate(&self, query: &str) -> Result<GuardrailVerdict> {
        for guardrail in &self.guardrails {
            debug!(guardrail = guardrail.id(), state = %GuardrailState::Pending, "guardrail started");
            let verdict = guardrail.check(query).await?;
            debug!(guardrail = guardrail.id(), state = %verdict.state(), "guardrail evaluated");
            if verdict.triggered {
                info!(guardrail = guardrail.id(), reasoning = %verdict.reasoning, "guardrail tripped");
                return Ok(verdict);
            }
        }
        Ok(GuardrailVerdict::pass("input", "all input guardrails passed"))
    }
}

impl fmt::Debug for GuardrailStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GuardrailStage")
            .field(
                "guardrails",
                &self.guardrails.iter().map(|g| g.id()).collect::<Vec<_>>(),
            )
            .finish()
    }
}
