/// OpenAI Chat Completions shape, shared by DeepSeek and custom endpoints

use serde::{Deserialize, Serialize};

use super::{HttpRequest, ProviderAdapter, decode_envelope};
use crate::error::ClassifyError;
use crate::settings::ProviderConfig;

const TEMPERATURE: f64 = 0.7;

pub struct OpenAiCompatibleAdapter;

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [Message<'a>; 1],
    temperature: f64,
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

impl ProviderAdapter for OpenAiCompatibleAdapter {
    fn build_request(&self, prompt: &str, config: &ProviderConfig) -> Result<HttpRequest, ClassifyError> {
        let body = ChatRequest {
            model: &config.model,
            messages: [Message {
                role: "user",
                content: prompt,
            }],
            temperature: TEMPERATURE,
        };

        Ok(HttpRequest {
            url: config.normalized_endpoint().to_string(),
            headers: vec![
                ("Content-Type", "application/json".to_string()),
                ("Authorization", format!("Bearer {}", config.api_key())),
            ],
            body: serde_json::to_string(&body)
                .map_err(|e| ClassifyError::provider(format!("Failed to encode request: {}", e)))?,
        })
    }

    fn extract_text(&self, body: &str) -> Result<String, ClassifyError> {
        let response: ChatResponse = decode_envelope(body, "OpenAI-compatible")?;

        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| ClassifyError::provider("OpenAI-compatible response has no choices[0].message.content"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::ProviderKind;
    use crate::testing::test_config;

    #[test]
    fn test_build_request() {
        let mut config = test_config(ProviderKind::DeepSeek);
        config.endpoint = "https://api.deepseek.com/v1/chat/completions/".to_string();

        let request = OpenAiCompatibleAdapter.build_request("group these", &config).unwrap();

        assert_eq!(request.url, "https://api.deepseek.com/v1/chat/completions");
        assert_eq!(request.header("authorization"), Some("Bearer test-key"));
        assert_eq!(request.header("Content-Type"), Some("application/json"));
        assert_eq!(
            request.body,
            r#"{"model":"test-model","messages":[{"role":"user","content":"group these"}],"temperature":0.7}"#
        );
    }

    #[test]
    fn test_extract_text() {
        let body = r#"{"id":"x","choices":[{"index":0,"message":{"role":"assistant","content":"hello"}}]}"#;
        assert_eq!(OpenAiCompatibleAdapter.extract_text(body).unwrap(), "hello");
    }

    #[test]
    fn test_extract_text_without_choices() {
        let err = OpenAiCompatibleAdapter.extract_text(r#"{"choices":[]}"#).unwrap_err();
        assert!(matches!(err, ClassifyError::Provider { status: None, .. }));

        let err = OpenAiCompatibleAdapter.extract_text("<html>").unwrap_err();
        assert!(err.to_string().starts_with("Unexpected OpenAI-compatible response"));
    }
}
