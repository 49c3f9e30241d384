use std::sync::Arc;

use httpmock::prelude::*;
use mathsolver::{
    AiErrorKind, Config, GeminiClient, ImageInput, Orchestrator, Prompt, RawInput, Sender,
    SubmitOutcome,
};
use serde_json::json;

const PATH: &str = "/v1beta/models/gemini-2.0-flash:generateContent";

fn reply(text: &str) -> serde_json::Value {
    json!({
        "candidates": [{
            "content": { "role": "model", "parts": [{ "text": text }] },
            "finishReason": "STOP"
        }]
    })
}

fn client(server: &MockServer) -> GeminiClient {
    GeminiClient::new("test-key", &server.base_url(), "gemini-2.0-flash")
}

#[tokio::test]
async fn text_prompt_is_sent_with_key_header() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path(PATH)
                .header("x-goog-api-key", "test-key")
                .body_contains("\"text\":\"What is 6 * 7?\"");
            then.status(200)
                .header("content-type", "application/json")
                .json_body(reply("42"));
        })
        .await;

    let text = client(&server)
        .query(Prompt::Text("What is 6 * 7?".into()))
        .await
        .unwrap();

    assert_eq!(text, "42");
    mock.assert_async().await;
}

#[tokio::test]
async fn image_prompt_is_sent_inline() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path(PATH)
                .body_contains("\"mime_type\":\"image/png\"")
                .body_contains("\"data\":\"AQID\"");
            then.status(200)
                .header("content-type", "application/json")
                .json_body(reply("3x = 12"));
        })
        .await;

    let image = ImageInput::new(vec![1, 2, 3], "image/png");
    let text = client(&server).query(Prompt::Image(image)).await.unwrap();

    assert_eq!(text, "3x = 12");
    mock.assert_async().await;
}

#[tokio::test]
async fn multiple_parts_are_joined() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path(PATH);
            then.status(200).json_body(json!({
                "candidates": [{
                    "content": { "parts": [{ "text": "Step 1\n" }, { "text": "x = 1" }] }
                }]
            }));
        })
        .await;

    let text = client(&server).query(Prompt::Text("x - 1 = 0".into())).await.unwrap();
    assert_eq!(text, "Step 1\nx = 1");
}

#[tokio::test]
async fn missing_candidates_yield_empty_text() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path(PATH);
            then.status(200).json_body(json!({ "promptFeedback": { "blockReason": "OTHER" } }));
        })
        .await;

    let text = client(&server).query(Prompt::Text("1 + 1".into())).await.unwrap();
    assert_eq!(text, "");
}

#[tokio::test]
async fn invalid_key_is_an_auth_error() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path(PATH);
            then.status(400).json_body(json!({
                "error": {
                    "code": 400,
                    "message": "API key not valid. Please pass a valid API key.",
                    "status": "INVALID_ARGUMENT"
                }
            }));
        })
        .await;

    let err = client(&server)
        .query(Prompt::Text("1 + 1".into()))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), AiErrorKind::Auth);
}

#[tokio::test]
async fn server_error_keeps_message() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path(PATH);
            then.status(503).json_body(json!({
                "error": { "code": 503, "message": "The model is overloaded.", "status": "UNAVAILABLE" }
            }));
        })
        .await;

    let err = client(&server)
        .query(Prompt::Text("1 + 1".into()))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), AiErrorKind::Backend);
    assert!(err.to_string().contains("The model is overloaded."));
}

#[tokio::test]
async fn unreachable_host_is_a_connectivity_error() {
    let client = GeminiClient::new("test-key", "http://127.0.0.1:1", "gemini-2.0-flash");
    let err = client.query(Prompt::Text("1 + 1".into())).await.unwrap_err();
    assert_eq!(err.kind(), AiErrorKind::Connectivity);
}

#[tokio::test]
async fn orchestrator_solves_through_gemini() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path(PATH)
                .body_contains("Solve this math problem step-by-step")
                .body_contains("5x = 25");
            then.status(200)
                .json_body(reply("**Step 1:** divide by 5\nFinal answer: \\boxed{5}"));
        })
        .await;

    let mut config = Config::new("test-key");
    config.base_url = server.base_url();
    let orchestrator = Orchestrator::new(&config, Arc::new(GeminiClient::from_config(&config)));

    let outcome = orchestrator.submit(RawInput::Text("5x = 25".into())).await;

    assert_eq!(outcome, SubmitOutcome::Solved);
    mock.assert_async().await;
    let transcript = orchestrator.transcript();
    let answer = transcript.last().unwrap();
    assert_eq!(answer.sender, Sender::Ai);
    assert_eq!(answer.text, "<b>Step 1:</b> divide by 5<br>Final answer: 5");
}

#[tokio::test]
async fn quick_reply_never_reaches_gemini() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST).path(PATH);
            then.status(200).json_body(reply("unused"));
        })
        .await;

    let mut config = Config::new("test-key");
    config.base_url = server.base_url();
    let orchestrator = Orchestrator::new(&config, Arc::new(GeminiClient::from_config(&config)));

    let outcome = orchestrator.submit(RawInput::Text("Good Morning!".into())).await;

    assert_eq!(outcome, SubmitOutcome::QuickReply);
    assert_eq!(mock.hits_async().await, 0);
}
