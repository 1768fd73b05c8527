use anyhow::Result;
use std::sync::Arc;
use tracing::info;
use voyage::config::AppConfig;
use voyage::guardrails::InputGuardrail;
use voyage::provider::{ChatCompletionProvider, CompletionProvider};
use voyage::server::{self, AppState};
use voyage::tracing_ext::init_tracing;
use voyage::{roster, travel_tools, OpenAiClient, Router, TravelService};

#[tokio::main]
async fn main() -> Result<()> {
    // Config first so the log format is known before anything logs
    let config = AppConfig::from_env()?;
    init_tracing(config.server.log_format)?;

    let client = Arc::new(OpenAiClient::new(config.provider.clone())?);
    let provider: Arc<dyn CompletionProvider> =
        Arc::new(ChatCompletionProvider::from_config(client, &config.provider));

    let guardrails: Vec<Arc<dyn InputGuardrail>> = if config.server.guardrails_enabled {
        vec![roster::math_guardrail(provider.clone())?]
    } else {
        Vec::new()
    };

    let planner = roster::travel_planner(guardrails)?;
    let router = Router::new(planner, provider, Arc::new(travel_tools::travel_registry()));
    let service = TravelService::for_router(router);

    info!(
        model = %config.provider.model.model,
        endpoint = %config.provider.completions_url(),
        guardrails = config.server.guardrails_enabled,
        "travel agent initialized"
    );

    let app = server::app(AppState::new(service), config.server.cors_permissive);
    server::serve(&config.server.socket_address(), app).await?;
    Ok(())
}
