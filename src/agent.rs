//! Agent role definitions

use crate::config::ModelConfig;
use crate::error::{Error, Result};
use crate::guardrails::InputGuardrail;
use crate::handoffs::HandoffTarget;
use crate::outputs::OutputSchema;
use crate::provider::CompletionTask;
use crate::tools::{ToolRegistry, ToolSet};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// An immutable agent role: instructions, allowed tools, output shape and
/// the specialists it may hand off to
pub struct AgentSpec {
    /// Human-readable name; also the handoff key
    pub name: String,
    /// One-line summary, shown to the model when this agent is a handoff target
    pub description: String,
    /// Listing text served by `GET /agents`
    pub summary: String,
    /// System prompt defining the role
    pub instructions: String,
    /// Names of the tools this agent may call
    pub tools: Vec<String>,
    /// Shape of the final answer
    pub output: OutputSchema,
    /// Agents this agent can hand off to
    pub handoffs: Vec<Arc<AgentSpec>>,
    /// Checks run against raw input before this agent sees it
    pub input_guardrails: Vec<Arc<dyn InputGuardrail>>,
    /// Capabilities advertised by the agent listing
    pub capabilities: Vec<String>,
    /// Model override; the provider default is used when absent
    pub model: Option<ModelConfig>,
}

impl AgentSpec {
    /// Create a new agent builder
    pub fn builder() -> AgentSpecBuilder {
        AgentSpecBuilder::new()
    }

    /// Find a handoff target by agent name
    pub fn handoff_target(&self, name: &str) -> Option<&Arc<AgentSpec>> {
        self.handoffs.iter().find(|spec| spec.name == name)
    }

    /// Build the provider task for running this agent on `input`
    pub fn task(&self, input: &str, registry: &Arc<ToolRegistry>) -> CompletionTask {
        CompletionTask {
            agent: self.name.clone(),
            instructions: self.instructions.clone(),
            input: input.to_string(),
            tools: registry.scoped(self.tools.iter().cloned()),
            output: self.output,
            handoffs: self
                .handoffs
                .iter()
                .map(|spec| HandoffTarget::for_agent(spec))
                .collect(),
            model: self.model.clone(),
        }
    }

    /// Same as [`AgentSpec::task`] but with handoffs removed
    pub fn terminal_task(&self, input: &str, registry: &Arc<ToolRegistry>) -> CompletionTask {
        CompletionTask {
            handoffs: Vec::new(),
            ..self.task(input, registry)
        }
    }

    /// Task for a tool-less, handoff-less check agent
    pub fn check_task(&self, input: &str) -> CompletionTask {
        CompletionTask {
            agent: self.name.clone(),
            instructions: self.instructions.clone(),
            input: input.to_string(),
            tools: ToolSet::empty(),
            output: self.output,
            handoffs: Vec::new(),
            model: self.model.clone(),
        }
    }

    /// Public description of this agent
    pub fn profile(&self) -> AgentProfile {
        let mut capabilities = self.capabilities.clone();
        if !self.handoffs.is_empty() && !capabilities.iter().any(|c| c == "agent handoffs") {
            capabilities.push("agent handoffs".to_string());
        }
        AgentProfile {
            name: self.name.clone(),
            description: self.summary.clone(),
            capabilities,
            tools: self.tools.clone(),
        }
    }

    /// Profiles of this agent followed by every agent reachable through handoffs
    pub fn roster(&self) -> Vec<AgentProfile> {
        let mut profiles = vec![self.profile()];
        for target in &self.handoffs {
            for profile in target.roster() {
                if !profiles.iter().any(|p| p.name == profile.name) {
                    profiles.push(profile);
                }
            }
        }
        profiles
    }
}

impl std::fmt::Debug for AgentSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentSpec")
            .field("name", &self.name)
            .field("tools", &self.tools)
            .field("output", &self.output)
            .field(
                "handoffs",
                &self.handoffs.iter().map(|h| &h.name).collect::<Vec<_>>(),
            )
            .field(
                "input_guardrails",
                &self.input_guardrails.iter().map(|g| g.id()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

/// Agent listing entry served by `GET /agents`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentProfile {
    /// Agent name
    pub name: String,
    /// What the agent is for
    pub description: String,
    /// What it can do
    pub capabilities: Vec<String>,
    /// Tools it may call
    pub tools: Vec<String>,
}

/// Agent builder
#[derive(Default)]
pub struct AgentSpecBuilder {
    name: Option<String>,
    description: Option<String>,
    summary: Option<String>,
    instructions: Option<String>,
    tools: Vec<String>,
    output: Option<OutputSchema>,
    handoffs: Vec<Arc<AgentSpec>>,
    input_guardrails: Vec<Arc<dyn InputGuardrail>>,
    capabilities: Vec<String>,
    model: Option<ModelConfig>,
}

impl AgentSpecBuilder {
    /// Create a new agent builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the agent name
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the description
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the listing text (the description when unset)
    pub fn summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    /// Set the system prompt
    pub fn instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = Some(instructions.into());
        self
    }

    /// Allow a tool by name
    pub fn tool(mut self, name: impl Into<String>) -> Self {
        self.tools.push(name.into());
        self
    }

    /// Set the output schema (free text when unset)
    pub fn output(mut self, output: OutputSchema) -> Self {
        self.output = Some(output);
        self
    }

    /// Add a handoff target
    pub fn handoff(mut self, target: Arc<AgentSpec>) -> Self {
        self.handoffs.push(target);
        self
    }

    /// Add an input guardrail
    pub fn input_guardrail(mut self, guardrail: Arc<dyn InputGuardrail>) -> Self {
        self.input_guardrails.push(guardrail);
        self
    }

    /// Add several input guardrails
    pub fn input_guardrails(mut self, guardrails: Vec<Arc<dyn InputGuardrail>>) -> Self {
        self.input_guardrails.extend(guardrails);
        self
    }

    /// Advertise a capability
    pub fn capability(mut self, capability: impl Into<String>) -> Self {
        self.capabilities.push(capability.into());
        self
    }

    /// Override the model
    pub fn model(mut self, model: ModelConfig) -> Self {
        self.model = Some(model);
        self
    }

    /// Build the agent
    pub fn build(self) -> Result<AgentSpec> {
        let name = self.name.ok_or_else(|| Error::config("Agent name is required"))?;
        let instructions = self
            .instructions
            .ok_or_else(|| Error::config(format!("Instructions are required for agent '{}'", name)))?;

        for (i, target) in self.handoffs.iter().enumerate() {
            if target.name == name {
                return Err(Error::config(format!("Agent '{}' cannot hand off to itself", name)));
            }
            if self.handoffs[..i].iter().any(|prev| prev.name == target.name) {
                return Err(Error::config(format!(
                    "Agent '{}' lists handoff target '{}' twice",
                    name, target.name
                )));
            }
        }

        let description = self.description.unwrap_or_else(|| name.clone());
        Ok(AgentSpec {
            summary: self.summary.unwrap_or_else(|| description.clone()),
            description,
            name,
            instructions,
            tools: self.tools,
            output: self.output.unwrap_or(OutputSchema::Text),
            handoffs: self.handoffs,
            input_guardrails: self.input_guardrails,
            capabilities: self.capabilities,
            model: self.model,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::travel_tools::{travel_registry, HOTEL_TOOL, WEATHER_TOOL};

    fn specialist() -> Arc<AgentSpec> {
        Arc::new(
            AgentSpec::builder()
                .name("Hotel Specialist")
                .description("Finds hotels")
                .instructions("Find hotels.")
                .tool(HOTEL_TOOL)
                .output(OutputSchema::Hotel)
                .capability("hotel search")
                .build()
                .unwrap(),
        )
    }

    #[test]
    fn test_build_requires_name_and_instructions() {
        assert!(AgentSpec::builder().instructions("x").build().is_err());
        assert!(AgentSpec::builder().name("x").build().is_err());
    }

    #[test]
    fn test_build_rejects_duplicate_handoffs() {
        let hotel = specialist();
        let result = AgentSpec::builder()
            .name("Planner")
            .instructions("Plan.")
            .handoff(hotel.clone())
            .handoff(hotel)
            .build();
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_task_scopes_tools_and_lists_handoffs() {
        let registry = Arc::new(travel_registry());
        let planner = AgentSpec::builder()
            .name("Planner")
            .instructions("Plan.")
            .tool(WEATHER_TOOL)
            .output(OutputSchema::TravelPlan)
            .handoff(specialist())
            .build()
            .unwrap();

        let task = planner.task("Trip to Tokyo", &registry);
        assert!(task.tools.allows(WEATHER_TOOL));
        assert!(!task.tools.allows(HOTEL_TOOL));
        assert_eq!(task.handoffs.len(), 1);
        assert_eq!(task.handoffs[0].tool_name, "transfer_to_hotel_specialist");

        let terminal = planner.terminal_task("Trip to Tokyo", &registry);
        assert!(terminal.handoffs.is_empty());
    }

    #[test]
    fn test_roster_walks_handoffs() {
        let planner = AgentSpec::builder()
            .name("Planner")
            .description("Main travel planning agent")
            .instructions("Plan.")
            .capability("travel itineraries")
            .handoff(specialist())
            .build()
            .unwrap();

        let roster = planner.roster();
        assert_eq!(roster.len(), 2);
        assert!(roster[0].capabilities.contains(&"agent handoffs".to_string()));
        assert_eq!(roster[1].tools, vec![HOTEL_TOOL.to_string()]);
        assert_eq!(roster[1].description, "Finds hotels");
    }

    #[test]
    fn test_summary_overrides_listing_text_only() {
        let spec = AgentSpec::builder()
            .name("Hotel Specialist")
            .description("Finds hotels")
            .summary("Hotel searches")
            .instructions("Find hotels.")
            .build()
            .unwrap();
        assert_eq!(spec.profile().description, "Hotel searches");
        assert_eq!(HandoffTarget::for_agent(&spec).description, "Finds hotels");
    }
}
