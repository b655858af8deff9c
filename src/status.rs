/// Extension icon state: badge text, badge color and tooltip per run state
use std::cell::Cell;
use std::rc::Rc;

use serde::Serialize;

/// How long success and error badges stay before returning to idle
pub const DISPLAY_DURATION_MS: u32 = 3000;

const DEFAULT_TITLE: &str = "Click to classify tabs with AI";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Loading,
    Success,
    Error,
}

/// What the action icon should show
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IconUpdate {
    pub state: &'static str,
    pub badge_text: &'static str,
    pub badge_color: Option<&'static str>,
    pub title: String,
    /// Schedule a return to idle after this many milliseconds
    pub reset_after_ms: Option<u32>,
}

/// Pure transition: no hidden state, the caller applies the result
pub fn icon_state(state: RunState, message: Option<&str>) -> IconUpdate {
    let (name, badge_text, badge_color, default_title, reset_after_ms) = match state {
        RunState::Loading => ("loading", "...", Some("#1a73e8"), "Processing...", None),
        RunState::Success => (
            "success",
            "✓",
            Some("#34a853"),
            "Operation successful",
            Some(DISPLAY_DURATION_MS),
        ),
        RunState::Error => (
            "error",
            "✗",
            Some("#ea4335"),
            "Operation failed",
            Some(DISPLAY_DURATION_MS),
        ),
        RunState::Idle => ("idle", "", None, DEFAULT_TITLE, None),
    };

    let title = match message {
        Some(text) if !text.is_empty() => text.to_string(),
        _ => default_title.to_string(),
    };

    IconUpdate {
        state: name,
        badge_text,
        badge_color,
        title,
        reset_after_ms,
    }
}

/// Counts shown states so a delayed reset can tell it has been superseded.
///
/// Clones share the same counter.
#[derive(Debug, Clone, Default)]
pub struct StateEpoch(Rc<Cell<u64>>);

impl StateEpoch {
    /// Record that a new state is on screen and return its epoch
    pub fn advance(&self) -> u64 {
        let next = self.0.get() + 1;
        self.0.set(next);
        next
    }

    pub fn is_current(&self, epoch: u64) -> bool {
        self.0.get() == epoch
    }
}

/// Receives every state transition of a run
pub trait StatusReporter {
    fn report(&self, state: RunState, message: Option<&str>);
}
