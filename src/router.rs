//! Dispatch of a query to the agent that answers it

use crate::agent::AgentSpec;
use crate::error::{Error, Result};
use crate::handoffs::{Handoff, HandoffContext};
use crate::outputs::StructuredOutput;
use crate::provider::{Completion, CompletionProvider};
use crate::tools::ToolRegistry;
use std::sync::Arc;
use tracing::{info, instrument};

/// Result of routing one query
#[derive(Debug, Clone)]
pub struct RouteOutcome {
    /// Agent that produced the final output
    pub agent: Arc<AgentSpec>,
    /// The final output
    pub output: StructuredOutput,
    /// The handoff taken on the way, if any
    pub handoff: Option<Handoff>,
}

/// Runs the entry agent and follows at most one handoff
#[derive(Clone)]
pub struct Router {
    entry: Arc<AgentSpec>,
    provider: Arc<dyn CompletionProvider>,
    tools: Arc<ToolRegistry>,
}

impl Router {
    /// Create a router with `entry` as the top-level agent
    pub fn new(
        entry: Arc<AgentSpec>,
        provider: Arc<dyn CompletionProvider>,
        tools: Arc<ToolRegistry>,
    ) -> Self {
        Self {
            entry,
            provider,
            tools,
        }
    }

    /// The top-level agent
    pub fn entry(&self) -> &Arc<AgentSpec> {
        &self.entry
    }

    /// Route `query` to its final answer.
    ///
    /// The entry agent always sees the query first. If it hands off, the
    /// named specialist gets the same query with its own tools and no handoff
    /// targets, so exactly one agent produces the output.
    #[instrument(skip_all, fields(entry = %self.entry.name))]
    pub async fn route(&self, query: &str) -> Result<RouteOutcome> {
        let task = self.entry.task(query, &self.tools);
        let (target, reason) = match self.provider.complete(task).await? {
            Completion::Final(output) => {
                info!(agent = %self.entry.name, kind = output.schema().name(), "entry agent answered");
                return Ok(RouteOutcome {
                    agent: Arc::clone(&self.entry),
                    output,
                    handoff: None,
                });
            }
            Completion::Handoff { target, reason } => (target, reason),
        };

        let specialist = self.entry.handoff_target(&target).cloned().ok_or_else(|| {
            Error::handoff(format!(
                "agent '{}' has no handoff target named '{}'",
                self.entry.name, target
            ))
        })?;
        info!(from = %self.entry.name, to = %specialist.name, %reason, "handing off");

        let handoff = Handoff::new(
            &self.entry.name,
            &specialist.name,
            reason,
            HandoffContext::new(query),
        );

        match self
            .provider
            .complete(specialist.terminal_task(query, &self.tools))
            .await?
        {
            Completion::Final(output) => {
                info!(agent = %specialist.name, kind = output.schema().name(), "specialist answered");
                Ok(RouteOutcome {
                    agent: specialist,
                    output,
                    handoff: Some(handoff),
                })
            }
            Completion::Handoff { target, .. } => Err(Error::handoff(format!(
                "agent '{}' attempted a second handoff to '{}'",
                specialist.name, target
            ))),
        }
    }

    /// The agent that would answer `query`
    pub async fn select(&self, query: &str) -> Result<Arc<AgentSpec>> {
        Ok(self.route(query).await?.agent)
    }
}

impl std::fmt::Debug for Router {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Router")
            .field("entry", &self.entry.name)
            .field("provider", &self.provider.name())
            .field("tools", &self.tools)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outputs::OutputSchema;
    use crate::testing::{ScriptedProvider, Step};
    use crate::travel_tools::{travel_registry, FLIGHT_TOOL, HOTEL_TOOL, WEATHER_TOOL};

    fn planner() -> Arc<AgentSpec> {
        let flights = AgentSpec::builder()
            .name("Flight Specialist")
            .instructions("Find flights.")
            .tool(FLIGHT_TOOL)
            .output(OutputSchema::Flight)
            .build()
            .unwrap();
        let hotels = AgentSpec::builder()
            .name("Hotel Specialist")
            .instructions("Find hotels.")
            .tool(HOTEL_TOOL)
            .output(OutputSchema::Hotel)
            .build()
            .unwrap();
        Arc::new(
            AgentSpec::builder()
                .name("Travel Planner")
                .instructions("Plan trips.")
                .tool(WEATHER_TOOL)
                .output(OutputSchema::TravelPlan)
                .handoff(Arc::new(flights))
                .handoff(Arc::new(hotels))
                .build()
                .unwrap(),
        )
    }

    fn router(provider: Arc<ScriptedProvider>) -> Router {
        Router::new(planner(), provider, Arc::new(travel_registry()))
    }

    #[tokio::test]
    async fn test_entry_answer_needs_no_handoff() {
        let provider = ScriptedProvider::new()
            .script("Travel Planner", vec![Step::finish("Pack an umbrella")]);
        let outcome = router(Arc::new(provider)).route("Trip ideas?").await.unwrap();

        assert_eq!(outcome.agent.name, "Travel Planner");
        assert!(outcome.handoff.is_none());
    }

    #[tokio::test]
    async fn test_single_handoff_reaches_specialist() {
        let provider = Arc::new(
            ScriptedProvider::new()
                .script("Travel Planner", vec![Step::handoff("Flight Specialist", "flight request")])
                .script("Flight Specialist", vec![Step::finish("SkyWays at 08:00")]),
        );
        let outcome = router(provider.clone()).route("Flights to Chicago").await.unwrap();

        assert_eq!(outcome.agent.name, "Flight Specialist");
        let handoff = outcome.handoff.unwrap();
        assert_eq!(handoff.source, "Travel Planner");
        assert_eq!(handoff.context.original_query, "Flights to Chicago");

        let calls = provider.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[1].input, "Flights to Chicago");
        assert!(calls[1].handoffs.is_empty());
        assert!(calls[1].tools.allows(FLIGHT_TOOL));
        assert!(!calls[1].tools.allows(WEATHER_TOOL));
    }

    #[tokio::test]
    async fn test_unknown_handoff_target() {
        let provider = ScriptedProvider::new()
            .script("Travel Planner", vec![Step::handoff("Cruise Specialist", "boats")]);
        let err = router(Arc::new(provider)).route("Cruise?").await.unwrap_err();
        assert!(matches!(err, Error::Handoff(_)));
    }

    #[tokio::test]
    async fn test_second_handoff_is_rejected() {
        let provider = ScriptedProvider::new()
            .script("Travel Planner", vec![Step::handoff("Hotel Specialist", "hotel")])
            .script("Hotel Specialist", vec![Step::handoff("Flight Specialist", "flight")]);
        let err = router(Arc::new(provider)).route("Hotel and flight").await.unwrap_err();
        assert!(matches!(err, Error::Handoff(msg) if msg.contains("second handoff")));
    }

    #[tokio::test]
    async fn test_select_returns_answering_agent() {
        let provider = ScriptedProvider::new()
            .script("Travel Planner", vec![Step::handoff("Hotel Specialist", "hotel")])
            .script("Hotel Specialist", vec![Step::finish("Riverside Inn")]);
        let agent = router(Arc::new(provider)).select("Hotel in Paris").await.unwrap();
        assert_eq!(agent.name, "Hotel Specialist");
    }
}
