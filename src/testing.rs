/// In-memory browser and provider doubles shared by the unit tests
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use async_trait::async_trait;

use crate::error::ClassifyError;
use crate::host::TabHost;
use crate::provider::{Availability, HttpRequest, HttpResponse, HttpTransport, ModelSession, OnDeviceModel};
use crate::settings::{ProviderConfig, ProviderKind};
use crate::status::{RunState, StatusReporter};
use crate::tab_data::{GroupUpdate, TabGroupInfo, TabSnapshot, UNGROUPED, WindowKind};

pub fn test_config(provider: ProviderKind) -> ProviderConfig {
    ProviderConfig {
        provider,
        api_key: Some("test-key".to_string()),
        endpoint: "https://llm.example.com/v1".to_string(),
        model: "test-model".to_string(),
        locale: "en-US".to_string(),
    }
}

/// Wrap model text in an OpenAI chat completion envelope
pub fn openai_reply(content: &str) -> String {
    serde_json::json!({
        "choices": [{ "message": { "role": "assistant", "content": content } }]
    })
    .to_string()
}

struct HostState {
    window_kind: WindowKind,
    tabs: Vec<TabSnapshot>,
    next_group_id: i32,
    created_groups: usize,
    group_updates: HashMap<i32, GroupUpdate>,
    failing_group_tabs: HashSet<i32>,
    fail_ungroup: bool,
    ungroup_calls: usize,
}

/// A browser with one window of interest; clones share state
#[derive(Clone)]
pub struct FakeHost {
    state: Rc<RefCell<HostState>>,
}

impl FakeHost {
    pub fn new() -> Self {
        FakeHost {
            state: Rc::new(RefCell::new(HostState {
                window_kind: WindowKind::Normal,
                tabs: Vec::new(),
                next_group_id: 1000,
                created_groups: 0,
                group_updates: HashMap::new(),
                failing_group_tabs: HashSet::new(),
                fail_ungroup: false,
                ungroup_calls: 0,
            })),
        }
    }

    pub fn with_tab(self, tab: TabSnapshot) -> Self {
        {
            let mut state = self.state.borrow_mut();
            state.tabs.retain(|t| t.id != tab.id);
            state.tabs.push(tab);
        }
        self
    }

    pub fn with_window_kind(self, kind: WindowKind) -> Self {
        self.state.borrow_mut().window_kind = kind;
        self
    }

    /// Creating a group that contains `tab_id` fails
    pub fn failing_group_for(self, tab_id: i32) -> Self {
        self.state.borrow_mut().failing_group_tabs.insert(tab_id);
        self
    }

    pub fn failing_ungroup(self) -> Self {
        self.state.borrow_mut().fail_ungroup = true;
        self
    }

    pub fn tab(&self, tab_id: i32) -> Option<TabSnapshot> {
        self.state.borrow().tabs.iter().find(|t| t.id == tab_id).cloned()
    }

    pub fn close_tab(&self, tab_id: i32) {
        self.state.borrow_mut().tabs.retain(|t| t.id != tab_id);
    }

    pub fn move_to_group(&self, tab_id: i32, group_id: i32) {
        if let Some(tab) = self.state.borrow_mut().tabs.iter_mut().find(|t| t.id == tab_id) {
            tab.group_id = group_id;
        }
    }

    pub fn created_groups(&self) -> usize {
        self.state.borrow().created_groups
    }

    pub fn group_update(&self, group_id: i32) -> Option<GroupUpdate> {
        self.state.borrow().group_updates.get(&group_id).cloned()
    }

    pub fn ungroup_calls(&self) -> usize {
        self.state.borrow().ungroup_calls
    }
}

#[async_trait(?Send)]
impl TabHost for FakeHost {
    async fn window_kind(&self, _window_id: i32) -> Result<WindowKind, ClassifyError> {
        Ok(self.state.borrow().window_kind)
    }

    async fn tabs_in_window(&self, window_id: i32) -> Result<Vec<TabSnapshot>, ClassifyError> {
        Ok(self
            .state
            .borrow()
            .tabs
            .iter()
            .filter(|t| t.window_id == window_id)
            .cloned()
            .collect())
    }

    async fn tabs_in_group(&self, group_id: i32) -> Result<Vec<TabSnapshot>, ClassifyError> {
        Ok(self
            .state
            .borrow()
            .tabs
            .iter()
            .filter(|t| t.group_id == group_id)
            .cloned()
            .collect())
    }

    async fn get_tab(&self, tab_id: i32) -> Result<Option<TabSnapshot>, ClassifyError> {
        Ok(self.tab(tab_id))
    }

    async fn group_tabs(&self, tab_ids: &[i32], window_id: i32) -> Result<i32, ClassifyError> {
        let mut state = self.state.borrow_mut();
        if tab_ids.iter().any(|id| state.failing_group_tabs.contains(id)) {
            return Err(ClassifyError::host("Tabs cannot be edited right now"));
        }

        let group_id = state.next_group_id;
        state.next_group_id += 1;
        state.created_groups += 1;
        for tab in state.tabs.iter_mut().filter(|t| tab_ids.contains(&t.id)) {
            tab.group_id = group_id;
            tab.window_id = window_id;
        }
        Ok(group_id)
    }

    async fn update_group(&self, group_id: i32, update: &GroupUpdate) -> Result<(), ClassifyError> {
        self.state.borrow_mut().group_updates.insert(group_id, update.clone());
        Ok(())
    }

    async fn ungroup_tabs(&self, tab_ids: &[i32]) -> Result<(), ClassifyError> {
        let mut state = self.state.borrow_mut();
        if state.fail_ungroup {
            return Err(ClassifyError::host("Tabs cannot be edited right now"));
        }

        state.ungroup_calls += 1;
        for tab in state.tabs.iter_mut().filter(|t| tab_ids.contains(&t.id)) {
            tab.group_id = UNGROUPED;
        }
        Ok(())
    }

    async fn groups_in_window(&self, window_id: i32) -> Result<Vec<TabGroupInfo>, ClassifyError> {
        let state = self.state.borrow();
        let mut groups: Vec<TabGroupInfo> = Vec::new();
        for tab in state.tabs.iter().filter(|t| t.window_id == window_id && !t.is_ungrouped()) {
            if groups.iter().all(|g| g.id != tab.group_id) {
                groups.push(TabGroupInfo { id: tab.group_id });
            }
        }
        Ok(groups)
    }
}

struct TransportState {
    reply: Result<HttpResponse, ClassifyError>,
    requests: Vec<HttpRequest>,
    on_send: Option<Rc<dyn Fn()>>,
}

/// Returns a canned response and records every request
#[derive(Clone)]
pub struct FakeTransport {
    state: Rc<RefCell<TransportState>>,
}

impl FakeTransport {
    pub fn replying(status: u16, body: &str) -> Self {
        Self::with_reply(Ok(HttpResponse {
            status,
            body: body.to_string(),
        }))
    }

    pub fn failing(message: &str) -> Self {
        Self::with_reply(Err(ClassifyError::provider(message)))
    }

    fn with_reply(reply: Result<HttpResponse, ClassifyError>) -> Self {
        FakeTransport {
            state: Rc::new(RefCell::new(TransportState {
                reply,
                requests: Vec::new(),
                on_send: None,
            })),
        }
    }

    /// Run `hook` while the request is "in flight"
    pub fn on_send(self, hook: impl Fn() + 'static) -> Self {
        self.state.borrow_mut().on_send = Some(Rc::new(hook));
        self
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.state.borrow().requests.clone()
    }
}

#[async_trait(?Send)]
impl HttpTransport for FakeTransport {
    async fn post(&self, request: HttpRequest) -> Result<HttpResponse, ClassifyError> {
        let hook = {
            let mut state = self.state.borrow_mut();
            state.requests.push(request);
            state.on_send.clone()
        };
        if let Some(hook) = hook {
            hook();
        }
        self.state.borrow().reply.clone()
    }
}

struct OnDeviceState {
    availability: Availability,
    reply: Result<String, ClassifyError>,
    system_instructions: Vec<String>,
    destroyed: usize,
}

#[derive(Clone)]
pub struct FakeOnDevice {
    state: Rc<RefCell<OnDeviceState>>,
}

impl FakeOnDevice {
    fn build(availability: Availability, reply: Result<String, ClassifyError>) -> Self {
        FakeOnDevice {
            state: Rc::new(RefCell::new(OnDeviceState {
                availability,
                reply,
                system_instructions: Vec::new(),
                destroyed: 0,
            })),
        }
    }

    /// For runs that must never reach the on-device model
    pub fn unused() -> Self {
        Self::build(Availability::Unavailable, Err(ClassifyError::provider("unused")))
    }

    pub fn ready(reply: &str) -> Self {
        Self::build(Availability::Available, Ok(reply.to_string()))
    }

    pub fn with_availability(availability: Availability) -> Self {
        Self::build(availability, Ok(String::new()))
    }

    pub fn failing_prompt(message: &str) -> Self {
        Self::build(Availability::Available, Err(ClassifyError::provider(message)))
    }

    pub fn system_instructions(&self) -> Vec<String> {
        self.state.borrow().system_instructions.clone()
    }

    pub fn destroyed_sessions(&self) -> usize {
        self.state.borrow().destroyed
    }
}

#[async_trait(?Send)]
impl OnDeviceModel for FakeOnDevice {
    async fn availability(&self) -> Result<Availability, ClassifyError> {
        Ok(self.state.borrow().availability)
    }

    async fn create_session(&self, system_instruction: &str) -> Result<Box<dyn ModelSession>, ClassifyError> {
        self.state
            .borrow_mut()
            .system_instructions
            .push(system_instruction.to_string());
        Ok(Box::new(FakeSession {
            state: self.state.clone(),
        }))
    }
}

struct FakeSession {
    state: Rc<RefCell<OnDeviceState>>,
}

#[async_trait(?Send)]
impl ModelSession for FakeSession {
    async fn prompt(&mut self, _text: &str) -> Result<String, ClassifyError> {
        self.state.borrow().reply.clone()
    }

    fn destroy(self: Box<Self>) {
        self.state.borrow_mut().destroyed += 1;
    }
}

/// Remembers every status transition
#[derive(Default)]
pub struct RecordingReporter {
    updates: RefCell<Vec<(RunState, Option<String>)>>,
}

impl RecordingReporter {
    pub fn states(&self) -> Vec<RunState> {
        self.updates.borrow().iter().map(|(state, _)| *state).collect()
    }

    pub fn last_message(&self) -> Option<String> {
        self.updates.borrow().last().and_then(|(_, message)| message.clone())
    }
}

impl StatusReporter for RecordingReporter {
    fn report(&self, state: RunState, message: Option<&str>) {
        self.updates
            .borrow_mut()
            .push((state, message.map(str::to_string)));
    }
}
