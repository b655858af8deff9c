/// Provider configuration read from `chrome.storage.sync`
///
/// The options page owns writing these keys. This side only reads:
///
/// - `apiProvider`: the selected provider tag
/// - `config_<provider>`: `{apiKey, apiEndpoint, model}` saved per provider
/// - `apiKey`, `apiEndpoint`, `model`: legacy top-level copies of the last save
use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;

use crate::error::ClassifyError;

/// Storage keys to fetch before calling [`resolve_provider_config`]
pub fn storage_keys() -> Vec<String> {
    let mut keys: Vec<String> = ["apiProvider", "apiKey", "apiEndpoint", "model"]
        .iter()
        .map(|key| key.to_string())
        .collect();
    keys.extend(ProviderKind::ALL.iter().map(|kind| kind.storage_key()));
    keys
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProviderKind {
    #[serde(rename = "openai")]
    OpenAi,
    #[serde(rename = "anthropic")]
    Anthropic,
    #[serde(rename = "deepseek")]
    DeepSeek,
    #[serde(rename = "gemini")]
    Gemini,
    #[serde(rename = "custom")]
    Custom,
    /// Chrome's built-in Gemini Nano
    #[serde(rename = "gemini-nano")]
    OnDevice,
}

/// Default endpoint and model offered for a provider
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Preset {
    pub endpoint: &'static str,
    pub model: &'static str,
}

impl ProviderKind {
    pub const ALL: [ProviderKind; 6] = [
        ProviderKind::OpenAi,
        ProviderKind::Anthropic,
        ProviderKind::DeepSeek,
        ProviderKind::Gemini,
        ProviderKind::Custom,
        ProviderKind::OnDevice,
    ];

    pub fn tag(self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "openai",
            ProviderKind::Anthropic => "anthropic",
            ProviderKind::DeepSeek => "deepseek",
            ProviderKind::Gemini => "gemini",
            ProviderKind::Custom => "custom",
            ProviderKind::OnDevice => "gemini-nano",
        }
    }

    /// Unknown tags are sent in the OpenAI-compatible shape, like a custom endpoint
    pub fn from_tag(tag: &str) -> ProviderKind {
        ProviderKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.tag() == tag)
            .unwrap_or(ProviderKind::Custom)
    }

    pub fn storage_key(self) -> String {
        format!("config_{}", self.tag())
    }

    pub fn requires_api_key(self) -> bool {
        self != ProviderKind::OnDevice
    }

    pub fn preset(self) -> Preset {
        match self {
            ProviderKind::OpenAi => Preset {
                endpoint: "https://api.openai.com/v1/chat/completions",
                model: "gpt-4o-mini",
            },
            ProviderKind::Anthropic => Preset {
                endpoint: "https://api.anthropic.com/v1/messages",
                model: "claude-3-5-haiku-20241022",
            },
            ProviderKind::DeepSeek => Preset {
                endpoint: "https://api.deepseek.com/v1/chat/completions",
                model: "deepseek-chat",
            },
            ProviderKind::Gemini => Preset {
                endpoint: "https://generativelanguage.googleapis.com/v1beta/models",
                model: "gemini-2.5-flash-lite",
            },
            ProviderKind::Custom => Preset {
                endpoint: "",
                model: "",
            },
            ProviderKind::OnDevice => Preset {
                endpoint: "chrome-built-in",
                model: "gemini-nano",
            },
        }
    }
}

/// Everything a provider adapter needs for one call
#[derive(Clone, PartialEq)]
pub struct ProviderConfig {
    pub provider: ProviderKind,
    pub api_key: Option<String>,
    pub endpoint: String,
    pub model: String,
    /// Browser UI language, e.g. "en-US" or "zh-CN"
    pub locale: String,
}

// Hand-written so the API key never ends up in a log line
impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("provider", &self.provider)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .field("locale", &self.locale)
            .finish()
    }
}

impl ProviderConfig {
    /// Endpoint with any trailing `/` removed
    pub fn normalized_endpoint(&self) -> &str {
        self.endpoint.trim_end_matches('/')
    }

    pub fn api_key(&self) -> &str {
        self.api_key.as_deref().unwrap_or_default()
    }

    pub fn validate(&self) -> Result<(), ClassifyError> {
        if self.provider.requires_api_key() && self.api_key().trim().is_empty() {
            return Err(ClassifyError::config("Please configure API Key in settings"));
        }

        if self.provider == ProviderKind::OnDevice {
            return Ok(());
        }

        if self.endpoint.trim().is_empty() {
            return Err(ClassifyError::config("Please configure API endpoint in settings"));
        }

        if self.model.trim().is_empty() {
            return Err(ClassifyError::config("Please configure model name in settings"));
        }

        let url = Url::parse(self.normalized_endpoint()).map_err(|e| {
            ClassifyError::config(format!("Invalid API endpoint \"{}\": {}", self.endpoint, e))
        })?;

        match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(ClassifyError::config(format!(
                "Invalid API endpoint \"{}\": unsupported scheme \"{}\"",
                self.endpoint, scheme
            ))),
        }
    }
}

/// Per-provider object stored under `config_<provider>`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredProviderConfig {
    #[serde(default)]
    api_key: Option<String>,
    #[serde(default)]
    api_endpoint: Option<String>,
    #[serde(default)]
    model: Option<String>,
}

/// Build a [`ProviderConfig`] from the raw storage object.
///
/// Each field is taken from the per-provider entry first, then the legacy
/// top-level key, then the provider preset. Blank strings count as missing.
pub fn resolve_provider_config(stored: &Value, locale: &str) -> ProviderConfig {
    let provider = stored
        .get("apiProvider")
        .and_then(Value::as_str)
        .map(ProviderKind::from_tag)
        .unwrap_or(ProviderKind::OpenAi);

    let per_provider: StoredProviderConfig = stored
        .get(provider.storage_key())
        .cloned()
        .and_then(|value| serde_json::from_value(value).ok())
        .unwrap_or_default();

    let legacy = |key: &str| {
        stored
            .get(key)
            .and_then(Value::as_str)
            .map(str::to_string)
    };
    let pick = |primary: Option<String>, legacy_key: &str| {
        non_blank(primary).or_else(|| non_blank(legacy(legacy_key)))
    };

    let preset = provider.preset();
    let api_key = pick(per_provider.api_key, "apiKey");
    let endpoint = pick(per_provider.api_endpoint, "apiEndpoint")
        .unwrap_or_else(|| preset.endpoint.to_string());
    let model = pick(per_provider.model, "model").unwrap_or_else(|| preset.model.to_string());

    ProviderConfig {
        provider,
        api_key: if provider.requires_api_key() { api_key } else { None },
        endpoint,
        model,
        locale: locale.to_string(),
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}
