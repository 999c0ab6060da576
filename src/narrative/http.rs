//! OpenAI-compatible narrative rewriter.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::{NarrativeConfig, NarrativeProvider};
use crate::error::{NarrativeError, Result};

use super::NarrativeRewriter;

const SYSTEM_PROMPT: &str = "You are a logistics operations expert. Take the technical analysis and rewrite it as a clear, actionable business report. Make it professional but accessible, with specific recommendations. Keep the same factual content but improve clarity and business relevance.";

/// Rewrites narratives through a `/chat/completions` endpoint.
pub struct HttpRewriter {
    client: Client,
    name: &'static str,
    base_url: String,
    model: String,
    api_key: Option<String>,
    max_tokens: u32,
    temperature: f32,
    timeout_secs: u64,
}

/// Chat completion request format.
#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: String,
}

/// Chat completion response format.
#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

/// OpenAI error response format.
#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ApiError,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}

impl HttpRewriter {
    /// Create a rewriter from configuration.
    ///
    /// The hosted OpenAI provider requires `api_key`; local Ollama does not.
    pub fn from_config(config: &NarrativeConfig) -> Result<Self> {
        if config.provider == NarrativeProvider::OpenAi && config.api_key.is_none() {
            return Err(NarrativeError::Unavailable(
                "API key not provided for the openai provider".to_string(),
            )
            .into());
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| NarrativeError::Api(format!("Failed to create HTTP client: {}", e)))?;

        let name = match config.provider {
            NarrativeProvider::Ollama => "ollama",
            _ => "openai",
        };

        Ok(Self {
            client,
            name,
            base_url: config.base_url().trim_end_matches('/').to_string(),
            model: config.model().to_string(),
            api_key: config.api_key.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
            timeout_secs: config.timeout_secs,
        })
    }

    /// Create a rewriter with explicit parameters.
    pub fn new(base_url: &str, model: &str, api_key: Option<&str>, timeout_secs: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| NarrativeError::Api(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            name: "openai",
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            api_key: api_key.map(str::to_string),
            max_tokens: 800,
            temperature: 0.3,
            timeout_secs,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    fn build_request<'a>(&'a self, narrative: &str, context: &serde_json::Value) -> ChatRequest<'a> {
        ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user",
                    content: format!("Analysis: {}\n\nQuery Context: {}", narrative, context),
                },
            ],
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        }
    }
}

#[async_trait]
impl NarrativeRewriter for HttpRewriter {
    fn name(&self) -> &str {
        self.name
    }

    async fn rewrite(
        &self,
        narrative: &str,
        context: &serde_json::Value,
    ) -> std::result::Result<String, NarrativeError> {
        let request = self.build_request(narrative, context);

        let mut builder = self
            .client
            .post(self.endpoint())
            .header("Content-Type", "application/json")
            .json(&request);
        if let Some(api_key) = &self.api_key {
            builder = builder.header("Authorization", format!("Bearer {}", api_key));
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                NarrativeError::Timeout(self.timeout_secs)
            } else if e.is_connect() {
                NarrativeError::Unavailable(format!("Connection failed: {}", e))
            } else {
                NarrativeError::Api(format!("Request failed: {}", e))
            }
        })?;

        let status = response.status();

        if status.is_success() {
            let result: ChatResponse = response
                .json()
                .await
                .map_err(|e| NarrativeError::Api(format!("Failed to parse response: {}", e)))?;

            result
                .choices
                .into_iter()
                .next()
                .and_then(|choice| choice.message.content)
                .map(|content| content.trim().to_string())
                .filter(|content| !content.is_empty())
                .ok_or(NarrativeError::EmptyResponse)
        } else if status.as_u16() == 429 {
            Err(NarrativeError::RateLimited)
        } else {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());

            // Try to parse as OpenAI error format
            if let Ok(error_response) = serde_json::from_str::<ErrorResponse>(&error_text) {
                Err(NarrativeError::Api(format!(
                    "API error ({}): {}",
                    status, error_response.error.message
                )))
            } else {
                Err(NarrativeError::Api(format!("API error ({}): {}", status, error_text)))
            }
        }
    }
}
