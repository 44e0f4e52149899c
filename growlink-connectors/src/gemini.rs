//! Text Generation Client (generateContent endpoint)
//!
//! One POST per question: the assembled prompt goes out as a single text
//! part with the generation parameters, and the first candidate's text comes
//! back. A response without a usable candidate yields a fixed fallback
//! string rather than an error; transport failures are the only thing the
//! caller ever sees as [`AiError`], and the assistant upstream converts even
//! those into an apology line.

use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use serde::{Deserialize, Serialize};

use growlink_core::assistant::{GenerationConfig, TextGenerator};
use growlink_core::errors::AiError;

/// Model used when none is configured.
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Reply used when the endpoint answers without a usable candidate.
pub const NO_REPLY_FALLBACK: &str = "Sorry, I could not generate a response.";

/// Generation endpoint configuration.
#[derive(Clone)]
pub struct GeminiConfig {
    /// API key, sent as a query parameter
    pub api_key: String,
    /// Full endpoint URL
    pub endpoint: String,
    /// Per-request timeout; generation is slow, so generous by default
    pub timeout: Duration,
}

impl GeminiConfig {
    /// Configuration for the default model.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_model(api_key, DEFAULT_MODEL)
    }

    /// Configuration for a specific model name.
    pub fn with_model(api_key: impl Into<String>, model: &str) -> Self {
        Self {
            api_key: api_key.into(),
            endpoint: format!(
                "https://generativelanguage.googleapis.com/v1beta/models/{model}:generateContent"
            ),
            timeout: Duration::from_secs(60),
        }
    }
}

/// Client for the text-generation endpoint.
pub struct GeminiClient {
    config: GeminiConfig,
    http: reqwest::Client,
}

impl GeminiClient {
    /// Build a client.
    pub fn new(config: GeminiConfig) -> Result<Self, AiError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| AiError::Request(e.to_string()))?;
        Ok(Self { config, http })
    }
}

#[derive(Serialize, Deserialize)]
struct Part {
    text: String,
}

#[derive(Serialize)]
struct RequestContent {
    parts: Vec<Part>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationSettings {
    temperature: f32,
    top_k: u32,
    top_p: f32,
    max_output_tokens: u32,
}

impl From<&GenerationConfig> for GenerationSettings {
    fn from(config: &GenerationConfig) -> Self {
        Self {
            temperature: config.temperature,
            top_k: config.top_k,
            top_p: config.top_p,
            max_output_tokens: config.max_output_tokens,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    contents: Vec<RequestContent>,
    generation_config: GenerationSettings,
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
    parts: Vec<Part>,
}

/// First candidate's first text part, or the fixed fallback.
fn extract_reply(response: GenerateResponse) -> String {
    response
        .candidates
        .into_iter()
        .next()
        .and_then(|candidate| candidate.content)
        .and_then(|content| content.parts.into_iter().next())
        .map(|part| part.text)
        .unwrap_or_else(|| NO_REPLY_FALLBACK.to_string())
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(
        &self,
        prompt: &str,
        config: &GenerationConfig,
    ) -> Result<String, AiError> {
        let request = GenerateRequest {
            contents: vec![RequestContent {
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: config.into(),
        };

        let url = format!("{}?key={}", self.config.endpoint, self.config.api_key);
        debug!("generation request: {} prompt bytes", prompt.len());

        let response = self
            .http
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| AiError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AiError::Endpoint {
                status: status.as_u16(),
                message: response.text().await.unwrap_or_default(),
            });
        }

        let body: GenerateResponse = response
            .json()
            .await
            .map_err(|e| AiError::Malformed(e.to_string()))?;
        Ok(extract_reply(body))
    }
}
