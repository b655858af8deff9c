/// Error types for classification and ungrouping runs
use thiserror::Error;

/// Everything that can end (or, for `GroupApply`, dent) a run.
///
/// The `Display` text is what the user sees in the badge title or popup.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ClassifyError {
    /// Missing API key, endpoint or model, or an unusable endpoint URL
    #[error("{0}")]
    Config(String),

    #[error("Tab groups only work in normal windows")]
    WindowType,

    #[error("All tabs are already grouped")]
    NoTabs,

    /// Transport failure, non-2xx status or an unexpected response envelope
    #[error("{}", provider_message(.status, .message))]
    Provider { status: Option<u16>, message: String },

    #[error("{0}")]
    Parse(String),

    #[error("{0}")]
    EmptyResult(String),

    /// One group could not be created; never ends the run
    #[error("Failed to create group \"{group}\": {message}")]
    GroupApply { group: String, message: String },

    /// A call into the browser's extension APIs failed
    #[error("{0}")]
    Host(String),

    #[error("Another run is already in progress for this window")]
    AlreadyRunning,
}

fn provider_message(status: &Option<u16>, message: &str) -> String {
    match status {
        Some(code) => format!("API request failed: {} - {}", code, message),
        None => message.to_string(),
    }
}

impl ClassifyError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    pub fn provider(message: impl Into<String>) -> Self {
        Self::Provider {
            status: None,
            message: message.into(),
        }
    }

    pub fn http_status(status: u16, body: impl Into<String>) -> Self {
        Self::Provider {
            status: Some(status),
            message: body.into(),
        }
    }

    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse(message.into())
    }

    pub fn host(message: impl Into<String>) -> Self {
        Self::Host(message.into())
    }

    /// Errors that mean "nothing to do" rather than "something broke"
    pub fn is_benign(&self) -> bool {
        matches!(self, ClassifyError::NoTabs)
    }
}
