//! Structured output types produced by agents
//!
//! Each agent declares an [`OutputSchema`]; the provider is asked to answer
//! in that shape and the reply is parsed into the matching
//! [`StructuredOutput`] variant. Replies that do not fit the schema degrade
//! to [`StructuredOutput::Text`].

use crate::error::{Error, Result};
use crate::openai::{JsonSchemaFormat, ResponseFormat};
use schemars::{schema_for, JsonSchema};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use tracing::warn;

/// A recommended flight
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FlightRecommendation {
    /// Operating airline
    pub airline: String,
    /// Local departure time, `HH:MM`
    pub departure_time: String,
    /// Local arrival time, `HH:MM`
    pub arrival_time: String,
    /// Ticket price in USD
    pub price: f64,
    /// Whether the flight has no connections
    pub direct_flight: bool,
    /// Why this flight was picked
    pub recommendation_reason: String,
}

/// A recommended hotel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct HotelRecommendation {
    /// Hotel name
    pub name: String,
    /// Neighbourhood or district
    pub location: String,
    /// Nightly rate in USD
    pub price_per_night: f64,
    /// Amenities offered
    pub amenities: Vec<String>,
    /// Why this hotel was picked
    pub recommendation_reason: String,
}

/// A general travel itinerary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct TravelPlan {
    /// Where the trip goes
    pub destination: String,
    /// Trip length in days
    pub duration_days: u32,
    /// Total budget in USD
    pub budget: f64,
    /// List of recommended activities
    pub activities: Vec<String>,
    /// Additional notes or recommendations
    pub notes: String,
}

/// Verdict of the math-homework check agent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct MathHomeworkOutput {
    /// True when the user wants their math homework done for them
    pub is_math_homework: bool,
    /// Short explanation of the decision
    pub reasoning: String,
}

/// Shape an agent must answer in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputSchema {
    /// [`FlightRecommendation`]
    Flight,
    /// [`HotelRecommendation`]
    Hotel,
    /// [`TravelPlan`]
    TravelPlan,
    /// [`MathHomeworkOutput`]
    Verdict,
    /// Free text
    Text,
}

impl OutputSchema {
    /// Schema name sent to the provider
    pub fn name(&self) -> &'static str {
        match self {
            Self::Flight => "FlightRecommendation",
            Self::Hotel => "HotelRecommendation",
            Self::TravelPlan => "TravelPlan",
            Self::Verdict => "MathHomeworkOutput",
            Self::Text => "text",
        }
    }

    /// JSON Schema for the structured variants, `None` for free text
    pub fn json_schema(&self) -> Option<Value> {
        let root = match self {
            Self::Flight => schema_for!(FlightRecommendation),
            Self::Hotel => schema_for!(HotelRecommendation),
            Self::TravelPlan => schema_for!(TravelPlan),
            Self::Verdict => schema_for!(MathHomeworkOutput),
            Self::Text => return None,
        };
        serde_json::to_value(root).ok()
    }

    /// `response_format` request field for this schema
    pub fn response_format(&self) -> Option<ResponseFormat> {
        self.json_schema().map(|schema| ResponseFormat::JsonSchema {
            json_schema: JsonSchemaFormat {
                name: self.name().to_string(),
                schema,
            },
        })
    }

    /// Parse a raw model reply into this schema.
    ///
    /// The reply is validated against the JSON Schema first; anything that
    /// is not valid JSON of the right shape becomes [`StructuredOutput::Text`].
    pub fn parse(&self, raw: &str) -> StructuredOutput {
        let Some(schema) = self.json_schema() else {
            return StructuredOutput::Text(raw.to_string());
        };

        let parsed = match extract_json(raw) {
            Some(value) if conforms(&schema, &value) => match self {
                Self::Flight => decode(value).map(StructuredOutput::Flight),
                Self::Hotel => decode(value).map(StructuredOutput::Hotel),
                Self::TravelPlan => decode(value).map(StructuredOutput::TravelPlan),
                Self::Verdict => decode(value).map(StructuredOutput::Verdict),
                Self::Text => unreachable!("text has no schema"),
            },
            _ => Err(Error::invalid_input("reply does not match schema")),
        };

        parsed.unwrap_or_else(|_| {
            warn!(schema = self.name(), "unrecognized output shape, falling back to text");
            StructuredOutput::Text(raw.to_string())
        })
    }
}

/// The final answer of an agent run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum StructuredOutput {
    /// Flight specialist answer
    Flight(FlightRecommendation),
    /// Hotel specialist answer
    Hotel(HotelRecommendation),
    /// Planner answer
    TravelPlan(TravelPlan),
    /// Guardrail check answer
    Verdict(MathHomeworkOutput),
    /// Anything else
    Text(String),
}

impl StructuredOutput {
    /// Schema this output satisfies
    pub fn schema(&self) -> OutputSchema {
        match self {
            Self::Flight(_) => OutputSchema::Flight,
            Self::Hotel(_) => OutputSchema::Hotel,
            Self::TravelPlan(_) => OutputSchema::TravelPlan,
            Self::Verdict(_) => OutputSchema::Verdict,
            Self::Text(_) => OutputSchema::Text,
        }
    }
}

impl fmt::Display for StructuredOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.write_str(text),
            Self::Flight(v) => write_json(f, v),
            Self::Hotel(v) => write_json(f, v),
            Self::TravelPlan(v) => write_json(f, v),
            Self::Verdict(v) => write_json(f, v),
        }
    }
}

fn write_json<T: Serialize>(f: &mut fmt::Formatter<'_>, value: &T) -> fmt::Result {
    let rendered = serde_json::to_string(value).map_err(|_| fmt::Error)?;
    f.write_str(&rendered)
}

fn decode<T: DeserializeOwned>(value: Value) -> Result<T> {
    Ok(serde_json::from_value(value)?)
}

fn conforms(schema: &Value, instance: &Value) -> bool {
    match jsonschema::validator_for(schema) {
        Ok(validator) => validator.is_valid(instance),
        Err(_) => false,
    }
}

/// Models sometimes wrap JSON in a markdown fence; strip it before parsing
fn extract_json(raw: &str) -> Option<Value> {
    let trimmed = raw.trim();
    let body = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|rest| rest.strip_suffix("```"))
        .unwrap_or(trimmed);
    serde_json::from_str(body.trim()).ok()
}
