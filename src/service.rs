//! Query handling: guardrails, routing, envelope

use crate::agent::AgentProfile;
use crate::envelope::ResponseEnvelope;
use crate::error::Result;
use crate::guardrails::{GuardrailStage, GuardrailState};
use crate::router::Router;
use crate::types::RequestId;
use tracing::{error, info, info_span, Instrument};

/// Everything needed to answer a query; cheap to clone and share
#[derive(Debug, Clone)]
pub struct TravelService {
    guardrails: GuardrailStage,
    router: Router,
}

impl TravelService {
    /// Create a service from an explicit guardrail stage and router
    pub fn new(guardrails: GuardrailStage, router: Router) -> Self {
        Self { guardrails, router }
    }

    /// Create a service whose guardrails are the entry agent's own
    pub fn for_router(router: Router) -> Self {
        Self::new(GuardrailStage::for_agent(router.entry()), router)
    }

    /// The router
    pub fn router(&self) -> &Router {
        &self.router
    }

    /// Profiles of every agent the router can reach
    pub fn agents(&self) -> Vec<AgentProfile> {
        self.router.entry().roster()
    }

    /// Answer one query.
    ///
    /// A tripped guardrail yields an unsuccessful envelope and the router is
    /// never called. Provider failures come back as `Err`.
    pub async fn handle(&self, query: &str) -> Result<ResponseEnvelope> {
        let request_id = RequestId::new();
        let span = info_span!("query", %request_id);
        async move {
            let verdict = self
                .guardrails
                .evaluate(query)
                .await
                .inspect_err(|e| error!(state = %GuardrailState::Failed, error = %e, "guardrail evaluation failed"))?;
            if verdict.triggered {
                info!(guardrail = %verdict.guardrail, "query rejected");
                return Ok(ResponseEnvelope::rejected(&verdict));
            }

            let outcome = self.router.route(query).await?;
            let envelope = ResponseEnvelope::from_output(outcome.output);
            info!(agent = %outcome.agent.name, kind = ?envelope.kind(), "query answered");
            Ok(envelope)
        }
        .instrument(span)
        .await
    }
}
