/// Turn validated proposals into real tab groups, one at a time
use std::collections::HashSet;

use log::{error, info, warn};

use crate::error::ClassifyError;
use crate::host::TabHost;
use crate::palette::resolve_color;
use crate::parser::GroupProposal;
use crate::tab_data::{AppliedGroup, GroupUpdate};

/// Result of a best-effort apply: what was created and what failed
#[derive(Debug, Default, PartialEq)]
pub struct ApplyReport {
    pub applied: Vec<AppliedGroup>,
    pub failures: Vec<ClassifyError>,
}

/// Create one group per proposal, in order.
///
/// A failure on one group is recorded and the next group is still tried.
/// Proposals whose members all vanished are skipped without a group.
pub async fn apply_groups(host: &dyn TabHost, proposals: &[GroupProposal], window_id: i32) -> ApplyReport {
    let mut report = ApplyReport::default();
    let mut claimed = HashSet::new();

    for (index, proposal) in proposals.iter().enumerate() {
        let tab_ids = live_members(host, proposal, window_id, &claimed).await;

        if tab_ids.is_empty() {
            warn!(
                "Group \"{}\" has no valid tabs in window {}, skipping",
                proposal.name, window_id
            );
            continue;
        }

        let color = resolve_color(proposal.color.as_deref(), index);
        let update = GroupUpdate {
            title: proposal.name.clone(),
            color,
            collapsed: false,
        };

        match create_group(host, &tab_ids, window_id, &update).await {
            Ok(group_id) => {
                info!(
                    "Created group \"{}\" ({} tabs, {}) as {}",
                    update.title,
                    tab_ids.len(),
                    color,
                    group_id
                );
                claimed.extend(tab_ids.iter().copied());
                report.applied.push(AppliedGroup {
                    group_id,
                    title: update.title,
                    color,
                    collapsed: update.collapsed,
                    tab_ids,
                });
            }
            Err(e) => {
                error!("Failed to create group \"{}\": {}", proposal.name, e);
                report.failures.push(ClassifyError::GroupApply {
                    group: proposal.name.clone(),
                    message: e.to_string(),
                });
            }
        }
    }

    report
}

// Fresh per-tab check: exists, lives in this window, still ungrouped,
// and not already placed in an earlier group of this batch.
async fn live_members(
    host: &dyn TabHost,
    proposal: &GroupProposal,
    window_id: i32,
    claimed: &HashSet<i32>,
) -> Vec<i32> {
    let mut seen = HashSet::new();
    let mut valid = Vec::new();

    for &tab_id in &proposal.tab_ids {
        if claimed.contains(&tab_id) || !seen.insert(tab_id) {
            continue;
        }

        match host.get_tab(tab_id).await {
            Ok(Some(tab)) if tab.window_id != window_id => {
                warn!(
                    "Tab {} is in different window ({} vs {}), skipping",
                    tab_id, tab.window_id, window_id
                );
            }
            Ok(Some(tab)) if !tab.is_ungrouped() => {
                warn!("Tab {} joined group {} meanwhile, skipping", tab_id, tab.group_id);
            }
            Ok(Some(_)) => valid.push(tab_id),
            Ok(None) | Err(_) => warn!("Tab {} does not exist, skipping", tab_id),
        }
    }

    valid
}

async fn create_group(
    host: &dyn TabHost,
    tab_ids: &[i32],
    window_id: i32,
    update: &GroupUpdate,
) -> Result<i32, ClassifyError> {
    let group_id = host.group_tabs(tab_ids, window_id).await?;
    host.update_group(group_id, update).await?;
    Ok(group_id)
}
