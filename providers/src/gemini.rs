use crate::{
    BackendError, GEMINI_API_BASE_URL, LanguageModel, RawListResponse, http_client_builder,
    read_capped_error_body, wire,
};
use serde_json::{Value, json};
use std::time::Duration;
use xyprompt_types::{ApiKey, ModelName};

/// Builder for [`GeminiClient`].
#[derive(Debug)]
pub struct GeminiClientBuilder {
    api_key: ApiKey,
    base_url: String,
    timeout: Option<Duration>,
}

impl GeminiClientBuilder {
    /// Points the client at another API root, e.g. a local mock server.
    #[must_use]
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Overall per-request timeout. Without one only the connect timeout applies.
    #[must_use]
    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn build(self) -> Result<GeminiClient, BackendError> {
        let https_only = self.base_url.starts_with("https://");
        let http = http_client_builder(https_only, self.timeout).build()?;
        Ok(GeminiClient {
            api_key: self.api_key,
            base_url: self.base_url,
            http,
        })
    }
}

/// Gemini `generateContent` client.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    api_key: ApiKey,
    base_url: String,
    http: reqwest::Client,
}

impl GeminiClient {
    #[must_use]
    pub fn builder(api_key: ApiKey) -> GeminiClientBuilder {
        GeminiClientBuilder {
            api_key,
            base_url: GEMINI_API_BASE_URL.to_string(),
            timeout: None,
        }
    }

    pub fn new(api_key: ApiKey) -> Result<Self, BackendError> {
        Self::builder(api_key).build()
    }

    fn endpoint(&self, model: &ModelName) -> String {
        format!("{}/models/{}:generateContent", self.base_url, model.as_str())
    }

    async fn generate_content(
        &self,
        model: &ModelName,
        body: &Value,
    ) -> Result<wire::Response, BackendError> {
        let response = self
            .http
            .post(self.endpoint(model))
            .header("x-goog-api-key", self.api_key.expose_secret())
            .header("content-type", "application/json")
            .json(body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = read_capped_error_body(response).await;
            let message = serde_json::from_str::<wire::ErrorEnvelope>(&error_text)
                .map(|envelope| envelope.error.message_or_default().to_string())
                .unwrap_or(error_text);
            tracing::warn!(%status, model = %model, "Gemini request rejected");
            return Err(BackendError::Http { status, message });
        }

        let bytes = response.bytes().await?;
        let parsed: wire::Response = serde_json::from_slice(&bytes)?;

        if let Some(error) = &parsed.error {
            return Err(BackendError::Api(error.message_or_default().to_string()));
        }

        if let Some(reason) = parsed
            .prompt_feedback
            .as_ref()
            .and_then(|feedback| feedback.block_reason.as_deref())
        {
            tracing::warn!(reason, model = %model, "Gemini blocked the prompt");
        }
        if let Some(warning) = parsed.finish_reason().and_then(wire::FinishReason::warning) {
            tracing::warn!(model = %model, "{warning}");
        }
        if let Some(usage) = &parsed.usage_metadata {
            tracing::debug!(
                input_tokens = usage.prompt_token_count,
                output_tokens = usage.candidates_token_count,
                "Gemini usage"
            );
        }

        Ok(parsed)
    }
}

/// Build a content part for Gemini API.
fn text_part(text: &str) -> Value {
    json!({ "text": text })
}

fn user_contents(text: &str) -> Value {
    json!([{
        "role": "user",
        "parts": [text_part(text)]
    }])
}

/// Request body for a free-text question.
///
/// Grounding adds the `google_search` tool so the model may consult live
/// search results before answering.
fn build_text_request(query: &str, grounding: bool) -> Value {
    let mut body = serde_json::Map::new();
    body.insert("contents".into(), user_contents(query));
    if grounding {
        body.insert("tools".into(), json!([{ "google_search": {} }]));
    }
    Value::Object(body)
}

/// Request body asking for a JSON array of strings.
fn build_list_request(prompt: &str) -> Value {
    json!({
        "contents": user_contents(prompt),
        "generationConfig": {
            "responseMimeType": "application/json",
            "responseSchema": {
                "type": "ARRAY",
                "items": { "type": "STRING" }
            }
        }
    })
}

impl LanguageModel for GeminiClient {
    async fn generate_text(
        &self,
        model: &ModelName,
        query: &str,
        grounding: bool,
    ) -> Result<String, BackendError> {
        let body = build_text_request(query, grounding);
        let response = self.generate_content(model, &body).await?;

        let queries = response.web_search_queries();
        if !queries.is_empty() {
            tracing::debug!(?queries, "Grounded with web search");
        }

        Ok(response
            .text()
            .map(|text| text.trim().to_string())
            .unwrap_or_default())
    }

    async fn generate_structured_list(
        &self,
        model: &ModelName,
        prompt: &str,
    ) -> Result<RawListResponse, BackendError> {
        let body = build_list_request(prompt);
        let response = self.generate_content(model, &body).await?;
        Ok(RawListResponse::from_text(response.text()))
    }
}
