//! HTTP surface: axum routes over [`TravelService`]

use crate::agent::AgentProfile;
use crate::envelope::ResponseEnvelope;
use crate::error::{Error, Result};
use crate::service::TravelService;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

/// API name reported by `GET /` and `GET /health`
pub const API_NAME: &str = "Travel Agent API";

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    service: Arc<TravelService>,
    agents: Arc<Vec<AgentProfile>>,
}

impl AppState {
    /// Wrap a service; the agent listing is computed once here
    pub fn new(service: TravelService) -> Self {
        let agents = service.agents();
        Self {
            service: Arc::new(service),
            agents: Arc::new(agents),
        }
    }
}

/// Body of `POST /query`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TravelQuery {
    /// The travel-related question or request
    pub query: String,
}

/// Body of `GET /health`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Always "healthy" while the process serves requests
    pub status: String,
    /// Human-readable status line
    pub message: String,
    /// RFC 3339 timestamp of the check
    pub checked_at: String,
}

/// Body of `GET /agents`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentListing {
    /// Every agent the service can route to
    pub agents: Vec<AgentProfile>,
}

/// Failure of `POST /query`, rendered as `500 {"detail": ...}`
#[derive(Debug)]
pub struct ApiError(Error);

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let detail = format!("Error processing travel query: {}", self.0);
        (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "detail": detail }))).into_response()
    }
}

/// Build the router. `cors` adds a permissive CORS layer.
pub fn app(state: AppState, cors: bool) -> Router {
    let router = Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/query", post(query))
        .route("/agents", get(list_agents))
        .with_state(state)
        .layer(TraceLayer::new_for_http());

    if cors {
        router.layer(CorsLayer::permissive())
    } else {
        router
    }
}

/// API information
pub async fn root() -> Json<Value> {
    Json(json!({
        "message": API_NAME,
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "/": "API information",
            "/query": "POST - Submit travel queries",
            "/health": "GET - Health check",
            "/agents": "GET - List available agents"
        }
    }))
}

/// Liveness check
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        message: format!("{} is running", API_NAME),
        checked_at: Utc::now().to_rfc3339(),
    })
}

/// Answer a travel query
pub async fn query(
    State(state): State<AppState>,
    Json(request): Json<TravelQuery>,
) -> std::result::Result<Json<ResponseEnvelope>, ApiError> {
    match state.service.handle(&request.query).await {
        Ok(envelope) => Ok(Json(envelope)),
        Err(e) => {
            error!(error = %e, "travel query failed");
            Err(e.into())
        }
    }
}

/// Static agent listing
pub async fn list_agents(State(state): State<AppState>) -> Json<AgentListing> {
    Json(AgentListing {
        agents: state.agents.as_ref().clone(),
    })
}

/// Bind `address` and serve until Ctrl-C
pub async fn serve(address: &str, app: Router) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(address).await?;
    info!(bind_address = %address, "travel agent API listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("travel agent API stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "failed to listen for shutdown signal");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roster::travel_planner;
    use crate::router::Router as AgentRouter;
    use crate::testing::{ScriptedProvider, Step};
    use crate::travel_tools::travel_registry;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use tower::ServiceExt;

    fn state(provider: ScriptedProvider) -> AppState {
        let router = AgentRouter::new(
            travel_planner(vec![]).unwrap(),
            Arc::new(provider),
            Arc::new(travel_registry()),
        );
        AppState::new(TravelService::for_router(router))
    }

    async fn json_body(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let Json(payload) = health().await;
        assert_eq!(payload.status, "healthy");
        assert_eq!(payload.message, "Travel Agent API is running");
    }

    #[tokio::test]
    async fn test_root_lists_endpoints() {
        let Json(info) = root().await;
        assert_eq!(info["message"], "Travel Agent API");
        assert!(info["endpoints"]["/query"].is_string());
    }

    #[tokio::test]
    async fn test_agents_listing() {
        let Json(listing) = list_agents(State(state(ScriptedProvider::new()))).await;
        assert_eq!(listing.agents.len(), 3);
        assert_eq!(listing.agents[0].tools, vec!["get_weather_forecast".to_string()]);
    }

    #[tokio::test]
    async fn test_query_round_trip() {
        let provider = ScriptedProvider::new()
            .script("Travel Planner", vec![Step::finish("Enjoy Lisbon!")]);
        let response = app(state(provider), false)
            .oneshot(
                Request::post("/query")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"query":"Ideas for Lisbon?"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["response_type"], "general");
        assert_eq!(body["data"], "Enjoy Lisbon!");
    }

    #[tokio::test]
    async fn test_provider_failure_is_500() {
        let provider =
            ScriptedProvider::new().script("Travel Planner", vec![Step::fail("upstream timeout")]);
        let response = app(state(provider), true)
            .oneshot(
                Request::post("/query")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"query":"Trip to Rome"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = json_body(response).await;
        assert_eq!(
            body["detail"],
            "Error processing travel query: Completion provider error: upstream timeout"
        );
    }

    #[tokio::test]
    async fn test_missing_query_field_is_rejected() {
        let response = app(state(ScriptedProvider::new()), false)
            .oneshot(
                Request::post("/query")
                    .header("content-type", "application/json")
                    .body(Body::from("{}"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}
