//! Language model client for xyprompt.
//!
//! # Architecture
//!
//! - [`LanguageModel`] - the two calls the rest of the system needs: free text
//!   generation (optionally grounded with web search) and structured list
//!   generation
//! - [`gemini`] - Google Gemini implementation over the `generateContent` REST API
//! - [`wire`] - typed response structures for the Gemini API
//!
//! Every call is a single request/response round trip. There is no retry and no
//! streaming: a failure surfaces as [`BackendError`] and the caller decides what
//! to do with it.

pub mod gemini;
pub mod wire;

pub use gemini::{GeminiClient, GeminiClientBuilder};
pub use xyprompt_types;

use reqwest::StatusCode;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use xyprompt_types::ModelName;

/// Canonical Gemini API base URL.
pub const GEMINI_API_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

const CONNECT_TIMEOUT_SECS: u64 = 30;

// reqwest only exposes tcp_keepalive (idle time); interval/retries use platform defaults.
const TCP_KEEPALIVE_SECS: u64 = 60;

const POOL_MAX_IDLE_PER_HOST: usize = 8;
const POOL_IDLE_TIMEOUT_SECS: u64 = 90;

const MAX_ERROR_BODY_BYTES: usize = 32 * 1024;

/// Failure of a backend call. Never retried.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("API error {status}: {message}")]
    Http { status: StatusCode, message: String },
    #[error("API error: {0}")]
    Api(String),
    #[error("invalid response payload: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Response of a structured list request.
///
/// `parsed` holds the decoded JSON array when the backend honoured the
/// requested response format; `text` is the raw payload as received.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawListResponse {
    pub parsed: Option<Vec<serde_json::Value>>,
    pub text: Option<String>,
}

impl RawListResponse {
    /// Builds a response from raw text, decoding it as a JSON array if possible.
    #[must_use]
    pub fn from_text(text: Option<String>) -> Self {
        let parsed = text
            .as_deref()
            .and_then(|raw| serde_json::from_str::<Vec<serde_json::Value>>(raw).ok());
        Self { parsed, text }
    }

    #[must_use]
    pub fn text(&self) -> &str {
        self.text.as_deref().unwrap_or_default()
    }
}

/// Text generation backend.
pub trait LanguageModel {
    /// Sends `query` and returns the trimmed answer text, empty when the model
    /// produced none. With `grounding` the model may consult web search.
    fn generate_text(
        &self,
        model: &ModelName,
        query: &str,
        grounding: bool,
    ) -> impl Future<Output = Result<String, BackendError>>;

    /// Asks for a JSON array answer to `prompt`.
    fn generate_structured_list(
        &self,
        model: &ModelName,
        prompt: &str,
    ) -> impl Future<Output = Result<RawListResponse, BackendError>>;
}

/// Hardened HTTP client builder shared by backend clients.
///
/// `https_only` is relaxed only for local test servers.
pub(crate) fn http_client_builder(
    https_only: bool,
    timeout: Option<Duration>,
) -> reqwest::ClientBuilder {
    use reqwest::header::{HeaderMap, HeaderValue};

    let mut default_headers = HeaderMap::new();
    default_headers.insert(
        "x-goog-api-client",
        HeaderValue::from_static(concat!("xyprompt/", env!("CARGO_PKG_VERSION"))),
    );

    let mut builder = reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
        .redirect(reqwest::redirect::Policy::none())
        .https_only(https_only)
        .tcp_keepalive(Some(Duration::from_secs(TCP_KEEPALIVE_SECS)))
        .pool_max_idle_per_host(POOL_MAX_IDLE_PER_HOST)
        .pool_idle_timeout(Some(Duration::from_secs(POOL_IDLE_TIMEOUT_SECS)))
        .user_agent(concat!("xyprompt/", env!("CARGO_PKG_VERSION")))
        .default_headers(default_headers);

    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }

    builder
}

pub async fn read_capped_error_body(response: reqwest::Response) -> String {
    use futures_util::StreamExt;
    let mut body = Vec::new();
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let Ok(chunk) = chunk else { break };
        body.extend_from_slice(&chunk);
        if body.len() > MAX_ERROR_BODY_BYTES {
            body.truncate(MAX_ERROR_BODY_BYTES);
            let text = String::from_utf8_lossy(&body);
            return format!("{text}...(truncated)");
        }
    }
    String::from_utf8_lossy(&body).into_owned()
}
