/// Anthropic Messages API

use serde::{Deserialize, Serialize};

use super::{HttpRequest, ProviderAdapter, decode_envelope};
use crate::error::ClassifyError;
use crate::settings::ProviderConfig;

const ANTHROPIC_VERSION: &str = "2023-06-01";
const MAX_TOKENS: u32 = 2048;

pub struct AnthropicAdapter;

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: [Message<'a>; 1],
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: Option<String>,
}

impl ProviderAdapter for AnthropicAdapter {
    fn build_request(&self, prompt: &str, config: &ProviderConfig) -> Result<HttpRequest, ClassifyError> {
        let body = MessagesRequest {
            model: &config.model,
            max_tokens: MAX_TOKENS,
            messages: [Message {
                role: "user",
                content: prompt,
            }],
        };

        Ok(HttpRequest {
            url: config.normalized_endpoint().to_string(),
            headers: vec![
                ("Content-Type", "application/json".to_string()),
                ("x-api-key", config.api_key().to_string()),
                ("anthropic-version", ANTHROPIC_VERSION.to_string()),
            ],
            body: serde_json::to_string(&body)
                .map_err(|e| ClassifyError::provider(format!("Failed to encode request: {}", e)))?,
        })
    }

    fn extract_text(&self, body: &str) -> Result<String, ClassifyError> {
        let response: MessagesResponse = decode_envelope(body, "Anthropic")?;

        response
            .content
            .into_iter()
            .next()
            .and_then(|block| block.text)
            .ok_or_else(|| ClassifyError::provider("Anthropic response has no content[0].text"))
    }
}
