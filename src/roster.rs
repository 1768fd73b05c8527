//! The agents this service runs

use crate::agent::AgentSpec;
use crate::error::Result;
use crate::guardrails::{AgentGuardrail, InputGuardrail};
use crate::outputs::OutputSchema;
use crate::provider::CompletionProvider;
use crate::travel_tools::{FLIGHT_TOOL, HOTEL_TOOL, WEATHER_TOOL};
use std::sync::Arc;

/// Name of the planner, the entry agent
pub const TRAVEL_PLANNER: &str = "Travel Planner";
/// Name of the flight specialist
pub const FLIGHT_SPECIALIST: &str = "Flight Specialist";
/// Name of the hotel specialist
pub const HOTEL_SPECIALIST: &str = "Hotel Specialist";
/// Name of the customer-support agent
pub const CUSTOMER_SUPPORT: &str = "Customer support agent";
/// Name of the math-homework check agent
pub const GUARDRAIL_CHECK: &str = "Guardrail check";
/// Id of the math-homework guardrail
pub const MATH_GUARDRAIL: &str = "math_homework";

const FLIGHT_INSTRUCTIONS: &str = "\
You are a flight specialist who helps users find the best flights for their trips.

Use the search_flights tool to find flight options, and then provide personalized recommendations
based on the user's preferences (price, time, direct vs. connecting).

Always explain the reasoning behind your recommendations.

Format your response in a clear, organized way with flight details and prices.";

const HOTEL_INSTRUCTIONS: &str = "\
You are a hotel specialist who helps users find the best accommodations for their trips.

Use the search_hotels tool to find hotel options, and then provide personalized recommendations
based on the user's preferences (location, price, amenities).

Always explain the reasoning behind your recommendations.

Format your response in a clear, organized way with hotel details, amenities, and prices.";

const PLANNER_INSTRUCTIONS: &str = "\
You are a comprehensive travel planning assistant that helps users plan their perfect trip.

You can:
1. Provide weather information for destinations
2. Create personalized travel itineraries
3. Hand off to specialists for flights and hotels when needed

Always be helpful, informative, and enthusiastic about travel. Provide specific recommendations
based on the user's interests and preferences.

When creating travel plans, consider:
- The weather at the destination
- Local attractions and activities
- Budget constraints
- Travel duration

If the user asks specifically about flights or hotels, hand off to the appropriate specialist agent.";

/// Flight search and recommendation specialist
pub fn flight_specialist() -> Result<Arc<AgentSpec>> {
    AgentSpec::builder()
        .name(FLIGHT_SPECIALIST)
        .description("Specialist agent for finding and recommending flights")
        .summary("Specialist for flight searches and recommendations")
        .instructions(FLIGHT_INSTRUCTIONS)
        .tool(FLIGHT_TOOL)
        .output(OutputSchema::Flight)
        .capability("flight search")
        .capability("flight recommendations")
        .build()
        .map(Arc::new)
}

/// Hotel search and recommendation specialist
pub fn hotel_specialist() -> Result<Arc<AgentSpec>> {
    AgentSpec::builder()
        .name(HOTEL_SPECIALIST)
        .description("Specialist agent for finding and recommending hotels and accommodations")
        .summary("Specialist for hotel searches and recommendations")
        .instructions(HOTEL_INSTRUCTIONS)
        .tool(HOTEL_TOOL)
        .output(OutputSchema::Hotel)
        .capability("hotel search")
        .capability("hotel recommendations")
        .build()
        .map(Arc::new)
}

/// Entry agent: weather, itineraries and handoffs to both specialists
pub fn travel_planner(guardrails: Vec<Arc<dyn InputGuardrail>>) -> Result<Arc<AgentSpec>> {
    AgentSpec::builder()
        .name(TRAVEL_PLANNER)
        .description("Main travel planning agent")
        .instructions(PLANNER_INSTRUCTIONS)
        .tool(WEATHER_TOOL)
        .output(OutputSchema::TravelPlan)
        .capability("weather information")
        .capability("travel itineraries")
        .handoff(flight_specialist()?)
        .handoff(hotel_specialist()?)
        .input_guardrails(guardrails)
        .build()
        .map(Arc::new)
}

/// Check agent deciding whether the user wants their math homework done
pub fn math_guardrail_checker() -> Result<Arc<AgentSpec>> {
    AgentSpec::builder()
        .name(GUARDRAIL_CHECK)
        .instructions("Check if the user is asking you to do their math homework.")
        .output(OutputSchema::Verdict)
        .build()
        .map(Arc::new)
}

/// The math-homework guardrail, run through `provider`
pub fn math_guardrail(provider: Arc<dyn CompletionProvider>) -> Result<Arc<dyn InputGuardrail>> {
    Ok(Arc::new(AgentGuardrail::new(
        MATH_GUARDRAIL,
        math_guardrail_checker()?,
        provider,
    )))
}

/// General customer-support agent, guarded like the planner
pub fn customer_support_agent(guardrails: Vec<Arc<dyn InputGuardrail>>) -> Result<Arc<AgentSpec>> {
    AgentSpec::builder()
        .name(CUSTOMER_SUPPORT)
        .instructions("You are a customer support agent. You help customers with their questions.")
        .input_guardrails(guardrails)
        .capability("customer support")
        .build()
        .map(Arc::new)
}
