//! The chat-backed provider against a mock OpenAI-compatible server

use mockito::Matcher;
use serde_json::json;
use std::sync::Arc;
use url::Url;
use voyage::envelope::ResponseKind;
use voyage::retry::RetryConfig;
use voyage::roster;
use voyage::travel_tools::travel_registry;
use voyage::{
    ChatCompletionProvider, CompletionProvider, OpenAiClient, ProviderConfig, Router,
    TravelService,
};

fn reply(message: serde_json::Value) -> String {
    json!({
        "id": "cmpl-test",
        "model": "test-model",
        "choices": [{"index": 0, "message": message, "finish_reason": "stop"}],
        "usage": {"prompt_tokens": 10, "completion_tokens": 5, "total_tokens": 15}
    })
    .to_string()
}

fn tool_call(name: &str, arguments: serde_json::Value) -> serde_json::Value {
    json!({
        "role": "assistant",
        "content": null,
        "tool_calls": [{
            "id": "call_1",
            "type": "function",
            "function": {"name": name, "arguments": arguments.to_string()}
        }]
    })
}

fn service_for(server: &mockito::ServerGuard) -> TravelService {
    let config = ProviderConfig::new(
        "sk-test",
        Url::parse(&format!("{}/v1", server.url())).unwrap(),
        "test-model",
    )
    .with_retry(RetryConfig::none());
    let client = Arc::new(OpenAiClient::new(config.clone()).unwrap());
    let provider: Arc<dyn CompletionProvider> =
        Arc::new(ChatCompletionProvider::from_config(client, &config));
    let planner = roster::travel_planner(vec![]).unwrap();
    TravelService::for_router(Router::new(planner, provider, Arc::new(travel_registry())))
}

#[tokio::test]
async fn hotel_handoff_over_http() {
    let mut server = mockito::Server::new_async().await;

    let planner = server
        .mock("POST", "/v1/chat/completions")
        .match_body(Matcher::Regex("transfer_to_hotel_specialist".into()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(reply(tool_call(
            "transfer_to_hotel_specialist",
            json!({"reason": "hotel request"}),
        )))
        .expect(1)
        .create_async()
        .await;
    let hotel_search = server
        .mock("POST", "/v1/chat/completions")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(reply(tool_call(
            "search_hotels",
            json!({"city": "Paris", "check_in": "2025-06-01", "check_out": "2025-06-04", "max_price": 300}),
        )))
        .expect(1)
        .create_async()
        .await;
    let answer = server
        .mock("POST", "/v1/chat/completions")
        .match_body(Matcher::Regex("Riverside Inn".into()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(reply(json!({
            "role": "assistant",
            "content": json!({
                "name": "City Center Hotel",
                "location": "Downtown",
                "price_per_night": 199.99,
                "amenities": ["WiFi", "Pool", "Gym", "Restaurant"],
                "recommendation_reason": "Has a pool and is under $300"
            }).to_string()
        })))
        .expect(1)
        .create_async()
        .await;

    let envelope = service_for(&server)
        .handle("Find me a hotel in Paris with a pool for under $300 per night")
        .await
        .unwrap();

    planner.assert_async().await;
    hotel_search.assert_async().await;
    answer.assert_async().await;
    assert!(envelope.success);
    assert_eq!(envelope.kind(), ResponseKind::Hotel);
}

#[tokio::test]
async fn upstream_failure_is_an_error() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/v1/chat/completions")
        .with_status(500)
        .with_body("boom")
        .create_async()
        .await;

    let err = service_for(&server).handle("Trip to Rome").await.unwrap_err();
    assert!(err.is_provider_failure());
}
