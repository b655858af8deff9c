/// LLM provider adapters
///
/// Each HTTP vendor gets a [`ProviderAdapter`] that knows its request body,
/// auth scheme and response envelope:
///
/// - **openai**: OpenAI, DeepSeek and any custom OpenAI-compatible endpoint
/// - **anthropic**: Anthropic Messages API
/// - **gemini**: Google Gemini `generateContent`
///
/// The on-device model has no wire format and goes through [`OnDeviceModel`].
/// [`LlmClient`] picks the right path from the configured provider tag.

pub mod anthropic;
pub mod gemini;
pub mod on_device;
pub mod openai;
pub mod transport;

use std::collections::HashMap;

use async_trait::async_trait;
use log::{debug, info};

use crate::error::ClassifyError;
use crate::parser::{GroupProposal, parse_groups};
use crate::prompt::build_prompt;
use crate::settings::{ProviderConfig, ProviderKind};
use crate::tab_data::TabSnapshot;

pub use anthropic::AnthropicAdapter;
pub use gemini::GeminiAdapter;
pub use on_device::{Availability, ModelSession, OnDeviceModel};
pub use openai::OpenAiCompatibleAdapter;
pub use transport::ReqwestTransport;

/// A JSON POST ready to hand to an [`HttpTransport`]
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub url: String,
    pub headers: Vec<(&'static str, String)>,
    pub body: String,
}

impl HttpRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Request/response shape of one HTTP vendor
pub trait ProviderAdapter {
    fn build_request(&self, prompt: &str, config: &ProviderConfig) -> Result<HttpRequest, ClassifyError>;

    /// Pull the assistant's text out of a successful response body
    fn extract_text(&self, body: &str) -> Result<String, ClassifyError>;
}

/// Sends one request and returns whatever status came back
#[async_trait(?Send)]
pub trait HttpTransport {
    async fn post(&self, request: HttpRequest) -> Result<HttpResponse, ClassifyError>;
}

/// Adapters keyed by provider tag
pub struct ProviderRegistry {
    adapters: HashMap<ProviderKind, Box<dyn ProviderAdapter>>,
}

impl ProviderRegistry {
    pub fn empty() -> Self {
        ProviderRegistry {
            adapters: HashMap::new(),
        }
    }

    /// Add or replace the adapter for a provider
    pub fn register(&mut self, kind: ProviderKind, adapter: Box<dyn ProviderAdapter>) {
        self.adapters.insert(kind, adapter);
    }

    pub fn get(&self, kind: ProviderKind) -> Option<&dyn ProviderAdapter> {
        self.adapters.get(&kind).map(|adapter| adapter.as_ref())
    }
}

impl Default for ProviderRegistry {
    fn default() -> Self {
        let mut registry = ProviderRegistry::empty();
        registry.register(ProviderKind::OpenAi, Box::new(OpenAiCompatibleAdapter));
        registry.register(ProviderKind::DeepSeek, Box::new(OpenAiCompatibleAdapter));
        registry.register(ProviderKind::Custom, Box::new(OpenAiCompatibleAdapter));
        registry.register(ProviderKind::Anthropic, Box::new(AnthropicAdapter));
        registry.register(ProviderKind::Gemini, Box::new(GeminiAdapter));
        registry
    }
}

/// Turns a tab list into group proposals using the configured provider
pub struct LlmClient {
    registry: ProviderRegistry,
    transport: Box<dyn HttpTransport>,
    on_device: Box<dyn OnDeviceModel>,
}

impl LlmClient {
    pub fn new(transport: Box<dyn HttpTransport>, on_device: Box<dyn OnDeviceModel>) -> Self {
        LlmClient {
            registry: ProviderRegistry::default(),
            transport,
            on_device,
        }
    }

    pub fn with_registry(mut self, registry: ProviderRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub async fn classify(
        &self,
        tabs: &[TabSnapshot],
        config: &ProviderConfig,
    ) -> Result<Vec<GroupProposal>, ClassifyError> {
        let prompt = build_prompt(tabs, &config.locale);
        let text = self.complete(&prompt, config).await?;
        parse_groups(&text)
    }

    /// Send one prompt and return the model's raw text reply
    pub async fn complete(&self, prompt: &str, config: &ProviderConfig) -> Result<String, ClassifyError> {
        if config.provider == ProviderKind::OnDevice {
            info!("Prompting on-device model");
            return on_device::prompt_once(self.on_device.as_ref(), prompt).await;
        }

        let adapter = self.registry.get(config.provider).ok_or_else(|| {
            ClassifyError::provider(format!("No adapter registered for provider \"{}\"", config.provider.tag()))
        })?;

        let request = adapter.build_request(prompt, config)?;
        info!("Calling {} ({})", config.provider.tag(), config.model);
        debug!("Request body is {} bytes", request.body.len());

        let response = self.transport.post(request).await?;
        debug!("Response status {}, {} bytes", response.status, response.body.len());

        if !response.is_success() {
            return Err(ClassifyError::http_status(response.status, response.body));
        }

        let text = adapter.extract_text(&response.body)?;
        if text.trim().is_empty() {
            return Err(ClassifyError::provider("AI response was empty"));
        }
        Ok(text)
    }
}

/// Parse a vendor envelope, mapping any mismatch to a provider error
pub(crate) fn decode_envelope<T>(body: &str, vendor: &str) -> Result<T, ClassifyError>
where
    T: serde::de::DeserializeOwned,
{
    serde_json::from_str(body)
        .map_err(|e| ClassifyError::provider(format!("Unexpected {} response: {}", vendor, e)))
}
