/// Chrome's built-in language model (Gemini Nano)
///
/// Contract: availability check, one session with the fixed system
/// instruction, a single prompt, then explicit teardown.

use async_trait::async_trait;
use log::{info, warn};

use crate::error::ClassifyError;
use crate::prompt::SYSTEM_INSTRUCTION;

/// What `LanguageModel.availability()` reports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Availability {
    Available,
    Downloadable,
    Downloading,
    Unavailable,
}

impl Availability {
    /// Accepts both the current and the older `readily`/`after-download`/`no` names
    pub fn from_status(status: &str) -> Availability {
        match status {
            "available" | "readily" => Availability::Available,
            "downloadable" | "after-download" => Availability::Downloadable,
            "downloading" => Availability::Downloading,
            _ => Availability::Unavailable,
        }
    }
}

#[async_trait(?Send)]
pub trait OnDeviceModel {
    async fn availability(&self) -> Result<Availability, ClassifyError>;

    async fn create_session(&self, system_instruction: &str) -> Result<Box<dyn ModelSession>, ClassifyError>;
}

#[async_trait(?Send)]
pub trait ModelSession {
    async fn prompt(&mut self, text: &str) -> Result<String, ClassifyError>;

    fn destroy(self: Box<Self>);
}

/// Run one prompt through a fresh session. No polling while the model downloads.
///
/// Every failure comes back as a provider error prefixed with "Gemini Nano error:".
pub async fn prompt_once(model: &dyn OnDeviceModel, prompt: &str) -> Result<String, ClassifyError> {
    let reply = prompt_session(model, prompt)
        .await
        .map_err(|e| ClassifyError::provider(format!("Gemini Nano error: {}", e)));

    match &reply {
        Ok(text) => info!("On-device model replied with {} bytes", text.len()),
        Err(e) => warn!("On-device prompt failed: {}", e),
    }
    reply
}

async fn prompt_session(model: &dyn OnDeviceModel, prompt: &str) -> Result<String, ClassifyError> {
    match model.availability().await? {
        Availability::Available => {}
        Availability::Downloadable | Availability::Downloading => {
            return Err(ClassifyError::provider(
                "Model needs to be downloaded first. Please wait and try again.",
            ));
        }
        Availability::Unavailable => {
            return Err(ClassifyError::provider(
                "Chrome built-in AI is not available on this device",
            ));
        }
    }

    let mut session = model.create_session(SYSTEM_INSTRUCTION).await?;
    let reply = session.prompt(prompt).await;
    session.destroy();
    reply
}
