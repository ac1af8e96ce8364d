//! Shared test utilities and fixtures
//!
//! A wiremock server standing in for the Gemini `generateContent` endpoint.

#![allow(dead_code)]

use serde_json::{Value, json};
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};
use xyprompt_providers::GeminiClient;
use xyprompt_types::ApiKey;

pub const GENERATE_PATH: &str = "/v1beta/models/gemini-2.5-flash:generateContent";

/// Start a mock server that simulates the Gemini API
pub async fn start_gemini_mock() -> MockServer {
    MockServer::start().await
}

pub fn client_for(server: &MockServer) -> GeminiClient {
    GeminiClient::builder(ApiKey::new("test-key").expect("non-empty key"))
        .base_url(format!("{}/v1beta", server.uri()))
        .build()
        .expect("client builds")
}

/// A successful `generateContent` payload whose only part is `text`.
pub fn candidate_body(text: &str) -> Value {
    json!({
        "candidates": [{
            "content": { "role": "model", "parts": [{ "text": text }] },
            "finishReason": "STOP"
        }],
        "usageMetadata": { "promptTokenCount": 10, "candidatesTokenCount": 20 }
    })
}

fn prompt_matcher(prompt: &str) -> Value {
    json!({ "contents": [{ "parts": [{ "text": prompt }] }] })
}

/// Mount a structured-list response for `prompt`; `text` is returned verbatim.
pub async fn mount_list(server: &MockServer, prompt: &str, text: &str) {
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .and(body_partial_json(prompt_matcher(prompt)))
        .and(body_partial_json(
            json!({ "generationConfig": { "responseMimeType": "application/json" } }),
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(candidate_body(text)))
        .expect(1)
        .mount(server)
        .await;
}

/// Mount the answer for a single rendered query.
pub async fn mount_answer(server: &MockServer, query: &str, answer: &str) {
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .and(body_partial_json(prompt_matcher(query)))
        .respond_with(ResponseTemplate::new(200).set_body_json(candidate_body(answer)))
        .expect(1)
        .mount(server)
        .await;
}

/// Mount an API error for a single rendered query.
pub async fn mount_error(server: &MockServer, query: &str, status: u16, message: &str) {
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .and(body_partial_json(prompt_matcher(query)))
        .respond_with(ResponseTemplate::new(status).set_body_json(json!({
            "error": { "code": status, "message": message, "status": "UNAVAILABLE" }
        })))
        .expect(1)
        .mount(server)
        .await;
}
