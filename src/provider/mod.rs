//! Remote text-generation endpoints and fallback orchestration.
//!
//! Each provider endpoint is one model identifier templated into a
//! `generateContent` URL. Endpoints are tried strictly in order; how the
//! loop reacts to each failure kind is a first-class decision carried by
//! [`CallOutcome`], not incidental control flow: unsupported models and
//! ordinary failures skip to the next endpoint, a rate limit stops the
//! whole chain.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Endpoint order tried on every call.
pub const DEFAULT_MODELS: [&str; 3] = ["gemini-2.0-flash", "gemini-1.5-flash", "gemini-1.5-pro"];

/// Production API root; overridable for tests.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Outcome of one endpoint call, as the fallback loop classifies it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallOutcome {
    /// 2xx with non-empty extracted text.
    Text(String),
    /// 400/404: the endpoint does not serve this request shape; try the next.
    ModelUnsupported(u16),
    /// 429: stop the chain entirely.
    RateLimited,
    /// Transport error, other non-2xx status, or empty/undecodable body;
    /// try the next endpoint.
    Failed(String),
}

/// A backend that can answer one prompt with one text completion.
///
/// The production implementation is [`GeminiClient`]; tests substitute
/// scripted fakes.
#[async_trait]
pub trait TextModel: Send + Sync {
    async fn generate(&self, model: &str, prompt: &str, timeout: Duration) -> CallOutcome;
}

/// HTTP client for the `generateContent` API.
pub struct GeminiClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl GeminiClient {
    /// Build a client against the production API root.
    pub fn new(api_key: impl Into<String>) -> Result<Self, reqwest::Error> {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    /// Build a client against a custom API root (used by tests).
    pub fn with_base_url(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder().build()?;
        Ok(Self {
            http,
            base_url: base_url.into(),
            api_key: api_key.into(),
        })
    }
}

#[async_trait]
impl TextModel for GeminiClient {
    async fn generate(&self, model: &str, prompt: &str, timeout: Duration) -> CallOutcome {
        let url = format!(
            "{}/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            model
        );

        let payload = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
        };

        let response = match self
            .http
            .post(&url)
            .header("x-goog-api-key", self.api_key.as_str())
            .timeout(timeout)
            .json(&payload)
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) => return CallOutcome::Failed(format!("transport error: {e}")),
        };

        let status = response.status().as_u16();
        match status {
            400 | 404 => return CallOutcome::ModelUnsupported(status),
            429 => return CallOutcome::RateLimited,
            s if !(200..300).contains(&s) => {
                return CallOutcome::Failed(format!("unexpected status {s}"));
            }
            _ => {}
        }

        let body: GenerateResponse = match response.json().await {
            Ok(b) => b,
            Err(e) => return CallOutcome::Failed(format!("response decoding failed: {e}")),
        };

        match extract_text(&body) {
            Some(text) => CallOutcome::Text(text),
            None => CallOutcome::Failed("response contained no candidate text".to_string()),
        }
    }
}

/// Try each endpoint in order and return the first usable text.
///
/// Exit rule: `Text` returns immediately, `ModelUnsupported` and `Failed`
/// move on to the next endpoint, `RateLimited` abandons the remaining
/// endpoints. `None` means the chain was exhausted (or cut short).
pub async fn request_text(
    client: &dyn TextModel,
    models: &[&str],
    prompt: &str,
    timeout: Duration,
) -> Option<String> {
    for model in models {
        match client.generate(model, prompt, timeout).await {
            CallOutcome::Text(text) => {
                debug!("model {model} answered");
                return Some(text);
            }
            CallOutcome::ModelUnsupported(status) => {
                eprintln!("Model {model} not available (status {status}). Trying next...");
            }
            CallOutcome::RateLimited => {
                eprintln!("Rate limit reached on {model}; not trying further models.");
                return None;
            }
            CallOutcome::Failed(reason) => {
                warn!("model {model} failed: {reason}");
            }
        }
    }
    None
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

/// Pull the answer out of `candidates[0].content.parts[0].text`.
fn extract_text(body: &GenerateResponse) -> Option<String> {
    let text = body
        .candidates
        .first()?
        .content
        .as_ref()?
        .parts
        .first()?
        .text
        .as_deref()?
        .trim();

    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}
