/// The browser's tab, window and group surface
use async_trait::async_trait;

use crate::error::ClassifyError;
use crate::tab_data::{GroupUpdate, TabGroupInfo, TabSnapshot, WindowKind};

/// Every call is a fresh read or write against live browser state.
#[async_trait(?Send)]
pub trait TabHost {
    async fn window_kind(&self, window_id: i32) -> Result<WindowKind, ClassifyError>;

    async fn tabs_in_window(&self, window_id: i32) -> Result<Vec<TabSnapshot>, ClassifyError>;

    async fn tabs_in_group(&self, group_id: i32) -> Result<Vec<TabSnapshot>, ClassifyError>;

    /// `None` when the tab no longer exists
    async fn get_tab(&self, tab_id: i32) -> Result<Option<TabSnapshot>, ClassifyError>;

    /// Create a group from `tab_ids` in `window_id`, returning the new group id
    async fn group_tabs(&self, tab_ids: &[i32], window_id: i32) -> Result<i32, ClassifyError>;

    async fn update_group(&self, group_id: i32, update: &GroupUpdate) -> Result<(), ClassifyError>;

    async fn ungroup_tabs(&self, tab_ids: &[i32]) -> Result<(), ClassifyError>;

    async fn groups_in_window(&self, window_id: i32) -> Result<Vec<TabGroupInfo>, ClassifyError>;
}

/// Tab groups only exist in normal browser windows
pub async fn ensure_normal_window(host: &dyn TabHost, window_id: i32) -> Result<(), ClassifyError> {
    match host.window_kind(window_id).await? {
        WindowKind::Normal => Ok(()),
        _ => Err(ClassifyError::WindowType),
    }
}
