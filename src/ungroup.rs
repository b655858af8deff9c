/// Dissolve every tab group in a window
use log::info;
use serde::Serialize;

use crate::error::ClassifyError;
use crate::host::{TabHost, ensure_normal_window};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UngroupSummary {
    pub groups_dissolved: usize,
    pub tabs_affected: usize,
}

impl UngroupSummary {
    pub fn message(&self) -> String {
        format!(
            "Ungrouped {} groups, {} tabs total",
            self.groups_dissolved, self.tabs_affected
        )
    }
}

/// Collect the members of every group in the window and ungroup them in one call.
///
/// A window without groups is not an error; it reports zero/zero.
pub async fn ungroup_all(host: &dyn TabHost, window_id: i32) -> Result<UngroupSummary, ClassifyError> {
    ensure_normal_window(host, window_id).await?;

    let groups = host.groups_in_window(window_id).await?;
    if groups.is_empty() {
        return Ok(UngroupSummary::default());
    }

    let mut tab_ids = Vec::new();
    for group in &groups {
        let members = host.tabs_in_group(group.id).await?;
        tab_ids.extend(members.iter().map(|tab| tab.id));
    }

    if !tab_ids.is_empty() {
        host.ungroup_tabs(&tab_ids).await.map_err(|e| ClassifyError::GroupApply {
            group: format!("{} groups", groups.len()),
            message: e.to_string(),
        })?;
    }

    info!(
        "Ungrouped {} groups ({} tabs) in window {}",
        groups.len(),
        tab_ids.len(),
        window_id
    );

    Ok(UngroupSummary {
        groups_dissolved: groups.len(),
        tabs_affected: tab_ids.len(),
    })
}
