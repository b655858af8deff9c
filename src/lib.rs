/// Tab Sorter - Chrome Extension that groups tabs with an LLM
/// Built with Rust + WASM + Yew

pub mod tab_data;
pub mod palette;
pub mod error;
pub mod settings;
pub mod prompt;
pub mod parser;
pub mod provider;
pub mod host;
pub mod applier;
pub mod status;
pub mod classify;
pub mod ungroup;
mod chrome;
pub mod ui;

#[cfg(test)]
mod testing;

use log::{info, warn};
use wasm_bindgen::prelude::*;

use crate::chrome::BadgeReporter;
use crate::classify::ClassifyOutcome;
use crate::error::ClassifyError;
use crate::status::{RunState, StatusReporter};
use crate::ungroup::UngroupSummary;

// Set up panic hook for better error messages in the browser console
#[wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();
    wasm_logger::init(wasm_logger::Config::default());
}

// Toolbar-button entry points, called from the background worker
#[wasm_bindgen]
pub async fn classify_current_window() -> Result<(), JsValue> {
    let result = match chrome::current_window_id().await {
        Ok(window_id) => chrome::run_classify(window_id, &BadgeReporter).await,
        Err(e) => {
            BadgeReporter.report(RunState::Error, Some(&e.to_string()));
            Err(e)
        }
    };
    classify_finished(result).map_err(|e| JsValue::from_str(&e))
}

#[wasm_bindgen]
pub async fn ungroup_current_window() -> Result<(), JsValue> {
    let result = match chrome::current_window_id().await {
        Ok(window_id) => chrome::run_ungroup(window_id, &BadgeReporter).await,
        Err(e) => {
            BadgeReporter.report(RunState::Error, Some(&e.to_string()));
            Err(e)
        }
    };
    ungroup_finished(result).map_err(|e| JsValue::from_str(&e))
}

/// Log the outcome; nothing-to-do is not a failure for the caller
fn classify_finished(result: Result<ClassifyOutcome, ClassifyError>) -> Result<(), String> {
    match result {
        Ok(outcome) => {
            info!("{}", outcome.message());
            Ok(())
        }
        Err(e) if e.is_benign() => {
            info!("{}", e);
            Ok(())
        }
        Err(e) => {
            warn!("Classification failed: {}", e);
            Err(e.to_string())
        }
    }
}

fn ungroup_finished(result: Result<UngroupSummary, ClassifyError>) -> Result<(), String> {
    match result {
        Ok(summary) => {
            info!("{}", summary.message());
            Ok(())
        }
        Err(e) => {
            warn!("Ungroup failed: {}", e);
            Err(e.to_string())
        }
    }
}

// Start the Yew app for the popup
#[wasm_bindgen]
pub fn start_popup() {
    yew::Renderer::<ui::popup::App>::new().render();
}
