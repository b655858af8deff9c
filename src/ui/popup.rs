/// Popup UI: classify, ungroup, and show what happened

use yew::prelude::*;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use patternfly_yew::prelude::*;
use log::warn;
use crate::chrome::{classifier, current_window_id, open_options_page, run_classify, run_ungroup};
use crate::error::ClassifyError;
use crate::status::{DISPLAY_DURATION_MS, RunState, StateEpoch, StatusReporter};
use crate::tab_data::GroupSummary;
use crate::ui::components::{GroupList, WindowStats};

#[derive(Clone, PartialEq)]
enum AppState {
    Idle,
    Loading(String),
    Info(String),
    Success(String),
    Error(String),
}

/// Mirrors run transitions into the popup instead of the toolbar badge
struct PopupReporter {
    state: UseStateHandle<AppState>,
    epoch: StateEpoch,
    busy_message: &'static str,
}

impl StatusReporter for PopupReporter {
    fn report(&self, state: RunState, message: Option<&str>) {
        let text = message.unwrap_or_default().to_string();
        let next = match state {
            RunState::Loading => AppState::Loading(self.busy_message.to_string()),
            RunState::Success => AppState::Success(text),
            RunState::Error => AppState::Error(text),
            RunState::Idle if text.is_empty() => AppState::Idle,
            RunState::Idle => AppState::Info(text),
        };
        let terminal = !matches!(next, AppState::Loading(_) | AppState::Idle);
        let shown = self.epoch.advance();
        self.state.set(next);
        if terminal {
            reset_after(self.state.clone(), self.epoch.clone(), shown, DISPLAY_DURATION_MS);
        }
    }
}

#[function_component(App)]
pub fn app() -> Html {
    let state = use_state(|| AppState::Idle);
    let groups = use_state(Vec::<GroupSummary>::new);
    let counts = use_state(|| (0usize, 0usize));
    let epoch = use_state(StateEpoch::default);

    // Load tab and group counts on mount
    {
        let counts = counts.clone();
        use_effect_with((), move |_| {
            spawn_local(refresh_counts(counts));
            || ()
        });
    }

    // Classify handler
    let on_classify = {
        let state = state.clone();
        let groups = groups.clone();
        let counts = counts.clone();
        let epoch = (*epoch).clone();

        Callback::from(move |_| {
            let state = state.clone();
            let groups = groups.clone();
            let counts = counts.clone();
            let epoch = epoch.clone();

            groups.set(Vec::new());

            spawn_local(async move {
                let reporter = PopupReporter {
                    state: state.clone(),
                    epoch: epoch.clone(),
                    busy_message: "Classifying tabs...",
                };
                let window_id = match current_window_id().await {
                    Ok(id) => id,
                    Err(e) => {
                        reporter.report(RunState::Error, Some(&e.to_string()));
                        return;
                    }
                };
                // Every other failure was already reported by the run itself
                match run_classify(window_id, &reporter).await {
                    Ok(outcome) => groups.set(outcome.groups),
                    Err(e @ ClassifyError::AlreadyRunning) => {
                        reporter.report(RunState::Error, Some(&e.to_string()));
                    }
                    Err(_) => {}
                }
                refresh_counts(counts).await;
            });
        })
    };

    // Ungroup handler
    let on_ungroup = {
        let state = state.clone();
        let groups = groups.clone();
        let counts = counts.clone();
        let epoch = (*epoch).clone();

        Callback::from(move |_| {
            let state = state.clone();
            let groups = groups.clone();
            let counts = counts.clone();
            let epoch = epoch.clone();

            spawn_local(async move {
                let reporter = PopupReporter {
                    state: state.clone(),
                    epoch: epoch.clone(),
                    busy_message: "Ungrouping tabs...",
                };
                let window_id = match current_window_id().await {
                    Ok(id) => id,
                    Err(e) => {
                        reporter.report(RunState::Error, Some(&e.to_string()));
                        return;
                    }
                };
                // Every other failure was already reported by the run itself
                match run_ungroup(window_id, &reporter).await {
                    Ok(_) => groups.set(Vec::new()),
                    Err(e @ ClassifyError::AlreadyRunning) => {
                        reporter.report(RunState::Error, Some(&e.to_string()));
                    }
                    Err(_) => {}
                }
                refresh_counts(counts).await;
            });
        })
    };

    let on_settings = Callback::from(move |_| open_options_page());

    let is_busy = matches!(*state, AppState::Loading(_));

    html! {
        <div class="padding-20">
            <h1 class="popup-title">{"Tab Sorter"}</h1>

            <WindowStats tab_count={counts.0} group_count={counts.1} />

            // Status display
            {match &*state {
                AppState::Loading(msg) => html! {
                    <div class="loading-text-center">
                        <Spinner />
                        <p class="loading-text">{msg}</p>
                    </div>
                },
                AppState::Info(msg) => html! {
                    <div class="message-top-margin">
                        <Alert r#type={AlertType::Info} title={msg.clone()} inline={true}>
                        </Alert>
                    </div>
                },
                AppState::Success(msg) => html! {
                    <div class="message-top-margin">
                        <Alert r#type={AlertType::Success} title={msg.clone()} inline={true}>
                        </Alert>
                    </div>
                },
                AppState::Error(err) => html! {
                    <div class="message-top-margin">
                        <Alert r#type={AlertType::Danger} title={"Error"} inline={true}>
                            {err.clone()}
                        </Alert>
                    </div>
                },
                AppState::Idle => html! {}
            }}

            <div class="flex-column-gap">
                <Button onclick={on_classify} disabled={is_busy} variant={ButtonVariant::Primary} block={true}>
                    {"Classify Tabs with AI"}
                </Button>
                <Button onclick={on_ungroup} disabled={is_busy} variant={ButtonVariant::Secondary} block={true}>
                    {"Ungroup All Tabs"}
                </Button>
                <Button onclick={on_settings} variant={ButtonVariant::Secondary} block={true}>
                    {"Settings"}
                </Button>
            </div>

            <GroupList groups={(*groups).clone()} />

            <p class="footer-popup">
                {"Tab Sorter v0.1.0"}
            </p>
        </div>
    }
}

// Helper functions

async fn refresh_counts(counts: UseStateHandle<(usize, usize)>) {
    let classifier = classifier();
    let window_id = match current_window_id().await {
        Ok(id) => id,
        Err(e) => {
            warn!("{}", e);
            return;
        }
    };

    let tabs = classifier.host().tabs_in_window(window_id).await;
    let groups = classifier.host().groups_in_window(window_id).await;
    match (tabs, groups) {
        (Ok(tabs), Ok(groups)) => counts.set((tabs.len(), groups.len())),
        (Err(e), _) | (_, Err(e)) => warn!("Failed to count tabs: {}", e),
    }
}

/// Return to idle after a terminal state has been visible for `ms`, unless
/// something newer was shown in the meantime
fn reset_after(state: UseStateHandle<AppState>, epoch: StateEpoch, shown: u64, ms: u32) {
    let Some(window) = web_sys::window() else {
        return;
    };
    let callback = Closure::once_into_js(move || {
        if epoch.is_current(shown) {
            state.set(AppState::Idle);
        }
    });
    if let Err(e) = window.set_timeout_with_callback_and_timeout_and_arguments_0(
        callback.unchecked_ref(),
        ms as i32,
    ) {
        warn!("Failed to schedule status reset: {:?}", e);
    }
}
