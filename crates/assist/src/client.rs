//! HTTP client for the Gemini `generateContent` endpoint.
//!
//! One request per call, no streaming, no retry — the caller decides whether
//! a second attempt is worth it (in practice: it never is, the entry points
//! fail closed instead).

use crate::error::{ErrorKind, Result};
use exn::{OptionExt, ResultExt};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Gemini API base URL.
const API_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Default model to use.
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

// =============================================================================
// API Request/Response Types
// =============================================================================

/// Request body for `generateContent`.
#[derive(Debug, Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig", skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_schema: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Content,
}

impl GenerateResponse {
    /// Concatenated text of the first candidate's parts, if any.
    fn into_text(self) -> Option<String> {
        let candidate = self.candidates.into_iter().next()?;
        let text: String = candidate.content.parts.into_iter().map(|part| part.text).collect();
        match text.is_empty() {
            true => None,
            false => Some(text),
        }
    }
}

// =============================================================================
// Client
// =============================================================================

/// Thin client over the text-generation API.
///
/// Construct once and share; the inner [`reqwest::Client`] pools
/// connections. A client without an API key is valid — every request
/// through it fails (and the entry points then fail closed), which is
/// exactly the degraded mode an unconfigured installation should get.
#[derive(Debug, Clone)]
pub struct AssistClient {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
}

impl AssistClient {
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: API_BASE_URL.to_string(),
            api_key,
            model: DEFAULT_MODEL.to_string(),
        }
    }

    /// Use a different model id.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Point the client somewhere else (tests, proxies).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Send one prompt and return the generated text.
    ///
    /// When `response_schema` is given, the service is asked for
    /// `application/json` output matching it, and the returned string is
    /// that JSON document.
    pub(crate) async fn generate(&self, prompt: &str, response_schema: Option<Value>) -> Result<String> {
        let Some(api_key) = self.api_key.as_deref() else {
            exn::bail!(ErrorKind::MissingApiKey);
        };
        let request = GenerateRequest {
            contents: vec![Content { parts: vec![Part { text: prompt.to_string() }] }],
            generation_config: response_schema.map(|schema| GenerationConfig {
                response_mime_type: "application/json".to_string(),
                response_schema: Some(schema),
            }),
        };
        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);
        let response = self
            .http
            .post(&url)
            .query(&[("key", api_key)])
            .json(&request)
            .send()
            .await
            .or_raise(|| ErrorKind::Http)?;
        let status = response.status();
        if !status.is_success() {
            exn::bail!(ErrorKind::Api(status.as_u16()));
        }
        let body: GenerateResponse =
            response.json().await.or_raise(|| ErrorKind::MalformedResponse)?;
        body.into_text().ok_or_raise(|| ErrorKind::MalformedResponse)
    }
}
