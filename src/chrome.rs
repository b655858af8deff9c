/// Bindings from the core traits to the real chrome.* APIs
use std::rc::Rc;

use async_trait::async_trait;
use log::warn;
use serde::Serialize;
use serde::de::DeserializeOwned;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

use crate::classify::{ClassifyOutcome, Classifier};
use crate::error::ClassifyError;
use crate::host::TabHost;
use crate::provider::{Availability, LlmClient, ModelSession, OnDeviceModel, ReqwestTransport};
use crate::settings::{ProviderConfig, resolve_provider_config, storage_keys};
use crate::status::{RunState, StatusReporter, icon_state};
use crate::tab_data::{GroupUpdate, TabGroupInfo, TabSnapshot, WindowKind};
use crate::ungroup::UngroupSummary;

// Import JS bridge functions
#[wasm_bindgen(module = "/bridge.js")]
extern "C" {
    #[wasm_bindgen(catch)]
    async fn getWindowType(window_id: i32) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn getCurrentWindowId() -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn queryTabsInWindow(window_id: i32) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn queryTabsInGroup(group_id: i32) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn getTab(tab_id: i32) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn groupTabs(tab_ids: JsValue, window_id: i32) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn updateGroup(group_id: i32, props: JsValue) -> Result<(), JsValue>;

    #[wasm_bindgen(catch)]
    async fn ungroupTabs(tab_ids: JsValue) -> Result<(), JsValue>;

    #[wasm_bindgen(catch)]
    async fn queryGroups(window_id: i32) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn getSyncStorage(keys: JsValue) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn languageModelAvailability() -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn createLanguageModelSession(system_instruction: &str) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn promptSession(session: &JsValue, text: &str) -> Result<JsValue, JsValue>;

    fn destroySession(session: &JsValue);

    fn getUILanguage() -> String;

    fn openOptionsPage();

    fn applyIconState(update: JsValue, idle: JsValue);
}

/// Best-effort message out of a thrown JS value
fn js_message(err: &JsValue) -> String {
    err.dyn_ref::<js_sys::Error>()
        .map(|e| String::from(e.message()))
        .or_else(|| err.as_string())
        .unwrap_or_else(|| format!("{:?}", err))
}

fn host_error(context: &str, err: JsValue) -> ClassifyError {
    ClassifyError::host(format!("{}: {}", context, js_message(&err)))
}

fn to_js<T: Serialize>(value: &T) -> Result<JsValue, ClassifyError> {
    serde_wasm_bindgen::to_value(value)
        .map_err(|e| ClassifyError::host(format!("Failed to serialize: {:?}", e)))
}

fn from_js<T: DeserializeOwned>(value: JsValue, what: &str) -> Result<T, ClassifyError> {
    serde_wasm_bindgen::from_value(value)
        .map_err(|e| ClassifyError::host(format!("Failed to parse {}: {:?}", what, e)))
}

/// `chrome.tabs` / `chrome.tabGroups` / `chrome.windows`
pub struct ChromeHost;

#[async_trait(?Send)]
impl TabHost for ChromeHost {
    async fn window_kind(&self, window_id: i32) -> Result<WindowKind, ClassifyError> {
        let kind = getWindowType(window_id)
            .await
            .map_err(|e| host_error("Failed to get window", e))?;
        from_js(kind, "window type")
    }

    async fn tabs_in_window(&self, window_id: i32) -> Result<Vec<TabSnapshot>, ClassifyError> {
        let tabs = queryTabsInWindow(window_id)
            .await
            .map_err(|e| host_error("Failed to get tabs", e))?;
        from_js(tabs, "tabs")
    }

    async fn tabs_in_group(&self, group_id: i32) -> Result<Vec<TabSnapshot>, ClassifyError> {
        let tabs = queryTabsInGroup(group_id)
            .await
            .map_err(|e| host_error("Failed to get grouped tabs", e))?;
        from_js(tabs, "tabs")
    }

    async fn get_tab(&self, tab_id: i32) -> Result<Option<TabSnapshot>, ClassifyError> {
        let tab = getTab(tab_id)
            .await
            .map_err(|e| host_error("Failed to get tab", e))?;
        if tab.is_null() || tab.is_undefined() {
            return Ok(None);
        }
        from_js(tab, "tab").map(Some)
    }

    async fn group_tabs(&self, tab_ids: &[i32], window_id: i32) -> Result<i32, ClassifyError> {
        let group_id = groupTabs(to_js(&tab_ids)?, window_id)
            .await
            .map_err(|e| host_error("Failed to group tabs", e))?;
        from_js(group_id, "group id")
    }

    async fn update_group(&self, group_id: i32, update: &GroupUpdate) -> Result<(), ClassifyError> {
        updateGroup(group_id, to_js(update)?)
            .await
            .map_err(|e| host_error("Failed to update group", e))
    }

    async fn ungroup_tabs(&self, tab_ids: &[i32]) -> Result<(), ClassifyError> {
        ungroupTabs(to_js(&tab_ids)?)
            .await
            .map_err(|e| host_error("Failed to ungroup tabs", e))
    }

    async fn groups_in_window(&self, window_id: i32) -> Result<Vec<TabGroupInfo>, ClassifyError> {
        let groups = queryGroups(window_id)
            .await
            .map_err(|e| host_error("Failed to get groups", e))?;
        from_js(groups, "groups")
    }
}

fn nano_error(err: JsValue) -> ClassifyError {
    ClassifyError::provider(js_message(&err))
}

/// Chrome's `LanguageModel` prompt API
pub struct ChromeLanguageModel;

#[async_trait(?Send)]
impl OnDeviceModel for ChromeLanguageModel {
    async fn availability(&self) -> Result<Availability, ClassifyError> {
        let status = languageModelAvailability().await.map_err(nano_error)?;
        Ok(Availability::from_status(&status.as_string().unwrap_or_default()))
    }

    async fn create_session(&self, system_instruction: &str) -> Result<Box<dyn ModelSession>, ClassifyError> {
        let session = createLanguageModelSession(system_instruction)
            .await
            .map_err(nano_error)?;
        Ok(Box::new(ChromeSession { session }))
    }
}

struct ChromeSession {
    session: JsValue,
}

#[async_trait(?Send)]
impl ModelSession for ChromeSession {
    async fn prompt(&mut self, text: &str) -> Result<String, ClassifyError> {
        let reply = promptSession(&self.session, text).await.map_err(nano_error)?;
        reply
            .as_string()
            .ok_or_else(|| ClassifyError::provider("reply was not text"))
    }

    fn destroy(self: Box<Self>) {
        destroySession(&self.session);
    }
}

/// Shows run state on the toolbar icon badge
pub struct BadgeReporter;

impl StatusReporter for BadgeReporter {
    fn report(&self, state: RunState, message: Option<&str>) {
        let update = icon_state(state, message);
        let idle = icon_state(RunState::Idle, None);
        match (to_js(&update), to_js(&idle)) {
            (Ok(update), Ok(idle)) => applyIconState(update, idle),
            (Err(e), _) | (_, Err(e)) => warn!("Failed to update icon: {}", e),
        }
    }
}

/// Read the saved provider settings and the browser UI language
pub async fn load_provider_config() -> Result<ProviderConfig, ClassifyError> {
    let stored = getSyncStorage(to_js(&storage_keys())?)
        .await
        .map_err(|e| host_error("Failed to read settings", e))?;
    let stored: serde_json::Value = from_js(stored, "settings")?;
    Ok(resolve_provider_config(&stored, &getUILanguage()))
}

pub async fn current_window_id() -> Result<i32, ClassifyError> {
    let id = getCurrentWindowId()
        .await
        .map_err(|e| host_error("Unable to get current window", e))?;
    from_js(id, "window id")
}

pub fn open_options_page() {
    openOptionsPage();
}

thread_local! {
    // One instance per extension context so the per-window guard sees every run
    static CLASSIFIER: Rc<Classifier> = Rc::new(Classifier::new(
        Box::new(ChromeHost),
        LlmClient::new(Box::new(ReqwestTransport::new()), Box::new(ChromeLanguageModel)),
    ));
}

pub fn classifier() -> Rc<Classifier> {
    CLASSIFIER.with(Rc::clone)
}

/// Load settings and classify `window_id`, opening the options page when
/// the provider is not configured.
pub async fn run_classify(
    window_id: i32,
    reporter: &dyn StatusReporter,
) -> Result<ClassifyOutcome, ClassifyError> {
    let config = match load_provider_config().await {
        Ok(config) => config,
        Err(e) => {
            reporter.report(RunState::Error, Some(&e.to_string()));
            return Err(e);
        }
    };

    let result = classifier().classify(window_id, &config, reporter).await;
    if let Err(ClassifyError::Config(_)) = &result {
        open_options_page();
    }
    result
}

pub async fn run_ungroup(
    window_id: i32,
    reporter: &dyn StatusReporter,
) -> Result<UngroupSummary, ClassifyError> {
    classifier().ungroup_all(window_id, reporter).await
}
