//! Response envelope returned by `POST /query`

use crate::guardrails::GuardrailVerdict;
use crate::outputs::{FlightRecommendation, HotelRecommendation, StructuredOutput, TravelPlan};
use serde::{Deserialize, Serialize};

/// Kind tag of a response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseKind {
    /// Flight recommendation
    Flight,
    /// Hotel recommendation
    Hotel,
    /// Travel plan
    TravelPlan,
    /// Free text
    General,
}

/// Response payload; serialized as `response_type` plus `data`, so the
/// kind cannot disagree with the payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "response_type", content = "data", rename_all = "snake_case")]
pub enum Payload {
    /// Flight recommendation
    Flight(FlightRecommendation),
    /// Hotel recommendation
    Hotel(HotelRecommendation),
    /// Travel plan
    TravelPlan(TravelPlan),
    /// Anything else, stringified
    General(String),
}

impl Payload {
    /// Kind tag of this payload
    pub fn kind(&self) -> ResponseKind {
        match self {
            Self::Flight(_) => ResponseKind::Flight,
            Self::Hotel(_) => ResponseKind::Hotel,
            Self::TravelPlan(_) => ResponseKind::TravelPlan,
            Self::General(_) => ResponseKind::General,
        }
    }
}

impl From<StructuredOutput> for Payload {
    fn from(output: StructuredOutput) -> Self {
        match output {
            StructuredOutput::Flight(flight) => Self::Flight(flight),
            StructuredOutput::Hotel(hotel) => Self::Hotel(hotel),
            StructuredOutput::TravelPlan(plan) => Self::TravelPlan(plan),
            StructuredOutput::Text(text) => Self::General(text),
            other => Self::General(other.to_string()),
        }
    }
}

/// Body of a `POST /query` response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    /// Whether the query was answered
    pub success: bool,
    /// Kind and data
    #[serde(flatten)]
    pub payload: Payload,
    /// Human-readable status line
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ResponseEnvelope {
    /// Successful response for an agent's final output
    pub fn from_output(output: StructuredOutput) -> Self {
        let payload = Payload::from(output);
        let message = match payload.kind() {
            ResponseKind::Flight => "Flight recommendation generated successfully",
            ResponseKind::Hotel => "Hotel recommendation generated successfully",
            ResponseKind::TravelPlan => "Travel plan generated successfully",
            ResponseKind::General => "Response generated successfully",
        };
        Self {
            success: true,
            payload,
            message: Some(message.to_string()),
        }
    }

    /// Rejection produced by a tripped guardrail
    pub fn rejected(verdict: &GuardrailVerdict) -> Self {
        Self {
            success: false,
            payload: Payload::General(String::new()),
            message: Some(verdict.reasoning.clone()),
        }
    }

    /// Kind tag of the payload
    pub fn kind(&self) -> ResponseKind {
        self.payload.kind()
    }
}
