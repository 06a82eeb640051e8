use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::ExplanationSettings;

const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Prompt handed to a generative provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub system: String,
    pub prompt: String,
    pub max_tokens: u32,
}

/// Raw provider output plus accounting.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderResponse {
    pub text: String,
    pub input_tokens: u32,
    pub output_tokens: u32,
    pub cost_usd: f64,
}

/// Generative backend for explanations.
#[async_trait]
pub trait ExplanationProvider: Send + Sync {
    async fn generate(&self, request: &GenerationRequest)
        -> Result<ProviderResponse, ProviderError>;
}

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("provider is not configured: {0}")]
    NotConfigured(&'static str),
    #[error("provider transport failed: {0}")]
    Transport(String),
    #[error("provider returned status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("provider rate limited the request")]
    RateLimited,
    #[error("provider response could not be decoded: {0}")]
    Malformed(String),
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        ProviderError::Transport(err.to_string())
    }
}

/// USD per million tokens.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TokenPricing {
    pub input_per_mtok: f64,
    pub output_per_mtok: f64,
}

impl TokenPricing {
    pub fn cost(&self, input_tokens: u32, output_tokens: u32) -> f64 {
        (f64::from(input_tokens) * self.input_per_mtok
            + f64::from(output_tokens) * self.output_per_mtok)
            / 1_000_000.0
    }
}

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: Vec<Message<'a>>,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
    usage: Usage,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
struct Usage {
    input_tokens: u32,
    output_tokens: u32,
}

/// Messages-API client for Anthropic models.
pub struct AnthropicProvider {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
    pricing: TokenPricing,
}

impl AnthropicProvider {
    pub fn new(settings: &ExplanationSettings) -> Result<Self, ProviderError> {
        let api_key = settings
            .api_key
            .clone()
            .ok_or(ProviderError::NotConfigured("AI_API_KEY is not set"))?;

        // The resilience layer owns the overall deadline; this only bounds a stuck socket.
        let client = Client::builder()
            .timeout(settings.timeout + Duration::from_secs(5))
            .build()?;

        Ok(Self {
            client,
            base_url: settings.base_url.clone(),
            api_key,
            model: settings.model.clone(),
            pricing: TokenPricing {
                input_per_mtok: settings.input_price_per_mtok,
                output_per_mtok: settings.output_price_per_mtok,
            },
        })
    }

    pub(crate) fn endpoint(&self) -> String {
        let base = self.base_url.trim_end_matches('/');
        if base.ends_with("/v1/messages") {
            base.to_string()
        } else if base.ends_with("/v1") {
            format!("{base}/messages")
        } else {
            format!("{base}/v1/messages")
        }
    }
}

#[async_trait]
impl ExplanationProvider for AnthropicProvider {
    async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<ProviderResponse, ProviderError> {
        let body = MessagesRequest {
            model: &self.model,
            max_tokens: request.max_tokens,
            system: &request.system,
            messages: vec![Message {
                role: "user",
                content: &request.prompt,
            }],
        };

        let response = self
            .client
            .post(self.endpoint())
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(ProviderError::RateLimited);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let payload: MessagesResponse = response
            .json()
            .await
            .map_err(|err| ProviderError::Malformed(err.to_string()))?;

        let text = payload
            .content
            .iter()
            .filter(|block| block.kind == "text")
            .map(|block| block.text.as_str())
            .collect::<Vec<_>>()
            .join("");

        let cost_usd = self
            .pricing
            .cost(payload.usage.input_tokens, payload.usage.output_tokens);
        debug!(
            model = %self.model,
            input_tokens = payload.usage.input_tokens,
            output_tokens = payload.usage.output_tokens,
            cost_usd,
            "provider call completed"
        );

        Ok(ProviderResponse {
            text,
            input_tokens: payload.usage.input_tokens,
            output_tokens: payload.usage.output_tokens,
            cost_usd,
        })
    }
}
