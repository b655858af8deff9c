/// Data structures shared between the host bridge and the grouping pipeline
use serde::{Deserialize, Serialize};

use crate::palette::GroupColor;

/// Group id the browser reports for a tab that is not in any group
pub const UNGROUPED: i32 = -1;

/// A browser tab as observed at one point in time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TabSnapshot {
    pub id: i32,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub url: String,
    pub window_id: i32,
    #[serde(default = "ungrouped")]
    pub group_id: i32,
}

fn ungrouped() -> i32 {
    UNGROUPED
}

impl TabSnapshot {
    pub fn new(id: i32, title: &str, url: &str, window_id: i32, group_id: i32) -> TabSnapshot {
        TabSnapshot {
            id,
            title: title.to_string(),
            url: url.to_string(),
            window_id,
            group_id,
        }
    }

    pub fn is_ungrouped(&self) -> bool {
        self.group_id == UNGROUPED
    }
}

/// Window type as reported by `chrome.windows.get`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WindowKind {
    Normal,
    Popup,
    Panel,
    App,
    Devtools,
    #[serde(other)]
    Unknown,
}

/// An existing tab group in a window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TabGroupInfo {
    pub id: i32,
}

/// Properties pushed to a freshly created group
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupUpdate {
    pub title: String,
    pub color: GroupColor,
    pub collapsed: bool,
}

/// A group that was actually created in the browser
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppliedGroup {
    pub group_id: i32,
    pub title: String,
    pub color: GroupColor,
    pub collapsed: bool,
    pub tab_ids: Vec<i32>,
}

/// What the popup shows for each created group
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupSummary {
    pub name: String,
    pub member_count: usize,
    pub color: GroupColor,
}

impl From<&AppliedGroup> for GroupSummary {
    fn from(group: &AppliedGroup) -> Self {
        GroupSummary {
            name: group.title.clone(),
            member_count: group.tab_ids.len(),
            color: group.color,
        }
    }
}
