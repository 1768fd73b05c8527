//! Handoff protocol between the planner and its specialists
//!
//! A handoff is an explicit value returned by the provider
//! ([`Completion::Handoff`](crate::provider::Completion::Handoff)), not a
//! hidden control transfer. The router follows at most one.

use crate::agent::AgentSpec;
use crate::openai::ToolDefinition;
use serde::{Deserialize, Serialize};

/// Function name the model calls to hand off to `agent_name`
pub fn handoff_tool_name(agent_name: &str) -> String {
    let slug: String = agent_name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '_' })
        .collect();
    format!("transfer_to_{}", slug)
}

/// A specialist the current agent may transfer control to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandoffTarget {
    /// Name of the receiving agent
    pub agent: String,
    /// Function name exposed to the model
    pub tool_name: String,
    /// When to pick this specialist
    pub description: String,
}

impl HandoffTarget {
    /// Describe `spec` as a handoff target
    pub fn for_agent(spec: &AgentSpec) -> Self {
        Self {
            agent: spec.name.clone(),
            tool_name: handoff_tool_name(&spec.name),
            description: spec.description.clone(),
        }
    }

    /// Function definition advertised to the model
    pub fn definition(&self) -> ToolDefinition {
        ToolDefinition::function(
            &self.tool_name,
            format!("Handoff to the {} agent. {}", self.agent, self.description),
            serde_json::json!({
                "type": "object",
                "properties": {
                    "reason": {
                        "type": "string",
                        "description": "Why this specialist should take over"
                    }
                }
            }),
        )
    }
}

/// A handoff that actually happened during a route
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Handoff {
    /// Agent that gave up control
    pub source: String,
    /// Agent that received control
    pub target: String,
    /// Reason given by the source agent
    pub reason: String,
    /// Context carried to the target
    pub context: HandoffContext,
}

impl Handoff {
    /// Create a new handoff
    pub fn new(
        source: impl Into<String>,
        target: impl Into<String>,
        reason: impl Into<String>,
        context: HandoffContext,
    ) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            reason: reason.into(),
            context,
        }
    }
}

/// Context to transfer during handoff
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HandoffContext {
    /// Original user query, passed unchanged to the target
    pub original_query: String,
}

impl HandoffContext {
    /// Create a new handoff context
    pub fn new(original_query: impl Into<String>) -> Self {
        Self {
            original_query: original_query.into(),
        }
    }
}
