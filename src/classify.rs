/// Classification run: snapshot, ask the model, re-check, apply
use std::cell::RefCell;
use std::collections::HashSet;

use log::{info, warn};

use crate::applier::apply_groups;
use crate::error::ClassifyError;
use crate::host::{TabHost, ensure_normal_window};
use crate::parser::GroupProposal;
use crate::provider::LlmClient;
use crate::settings::ProviderConfig;
use crate::status::{RunState, StatusReporter};
use crate::tab_data::{GroupSummary, TabSnapshot};
use crate::ungroup::{UngroupSummary, ungroup_all};

/// What a finished classification produced
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifyOutcome {
    pub groups: Vec<GroupSummary>,
    /// Per-group failures; the run still counts as finished
    pub failed: Vec<ClassifyError>,
}

impl ClassifyOutcome {
    pub fn message(&self) -> String {
        let mut message = format!(
            "Successfully classified tabs into {} groups!",
            self.groups.len()
        );
        if !self.failed.is_empty() {
            message.push_str(&format!(" ({} failed)", self.failed.len()));
        }
        message
    }
}

/// Keep only members that are still present and ungrouped in the latest
/// snapshot, dropping proposals left with no members.
pub fn revalidate(proposals: Vec<GroupProposal>, current_tabs: &[TabSnapshot]) -> Vec<GroupProposal> {
    let valid: HashSet<i32> = current_tabs
        .iter()
        .filter(|tab| tab.is_ungrouped())
        .map(|tab| tab.id)
        .collect();

    proposals
        .into_iter()
        .map(|mut proposal| {
            proposal.tab_ids.retain(|id| valid.contains(id));
            proposal
        })
        .filter(|proposal| !proposal.tab_ids.is_empty())
        .collect()
}

/// Drives classify and ungroup runs against one browser.
///
/// At most one run per window is in flight; a second request for the same
/// window fails with [`ClassifyError::AlreadyRunning`].
pub struct Classifier {
    host: Box<dyn TabHost>,
    llm: LlmClient,
    in_flight: RefCell<HashSet<i32>>,
}

impl Classifier {
    pub fn new(host: Box<dyn TabHost>, llm: LlmClient) -> Self {
        Classifier {
            host,
            llm,
            in_flight: RefCell::new(HashSet::new()),
        }
    }

    pub fn host(&self) -> &dyn TabHost {
        self.host.as_ref()
    }

    pub async fn classify(
        &self,
        window_id: i32,
        config: &ProviderConfig,
        reporter: &dyn StatusReporter,
    ) -> Result<ClassifyOutcome, ClassifyError> {
        let _guard = self.claim(window_id)?;

        reporter.report(RunState::Loading, None);
        let result = self.run_classification(window_id, config).await;

        match &result {
            Ok(outcome) if outcome.groups.is_empty() => {
                reporter.report(RunState::Error, Some(&outcome.message()));
            }
            Ok(outcome) => reporter.report(RunState::Success, Some(&outcome.message())),
            Err(e) => report_failure(reporter, "Classification", e),
        }
        result
    }

    pub async fn ungroup_all(
        &self,
        window_id: i32,
        reporter: &dyn StatusReporter,
    ) -> Result<UngroupSummary, ClassifyError> {
        let _guard = self.claim(window_id)?;

        reporter.report(RunState::Loading, None);
        let result = ungroup_all(self.host(), window_id).await;

        match &result {
            Ok(summary) if summary.groups_dissolved == 0 => {
                reporter.report(RunState::Idle, Some("No grouped tabs currently"));
            }
            Ok(summary) => reporter.report(RunState::Success, Some(&summary.message())),
            Err(e) => report_failure(reporter, "Ungroup", e),
        }
        result
    }

    async fn run_classification(
        &self,
        window_id: i32,
        config: &ProviderConfig,
    ) -> Result<ClassifyOutcome, ClassifyError> {
        config.validate()?;
        ensure_normal_window(self.host(), window_id).await?;

        let snapshot: Vec<TabSnapshot> = self
            .host
            .tabs_in_window(window_id)
            .await?
            .into_iter()
            .filter(TabSnapshot::is_ungrouped)
            .collect();

        if snapshot.is_empty() {
            return Err(ClassifyError::NoTabs);
        }

        info!("Classifying {} ungrouped tabs in window {}", snapshot.len(), window_id);
        let proposals = self.llm.classify(&snapshot, config).await?;

        if proposals.is_empty() {
            return Err(ClassifyError::EmptyResult(
                "Invalid group data format from AI".to_string(),
            ));
        }

        // The call above can take seconds; tabs may have closed or been grouped by hand
        let current = self.host.tabs_in_window(window_id).await?;
        let proposed = proposals.len();
        let proposals = revalidate(proposals, &current);

        if proposals.is_empty() {
            warn!("No valid groups after re-validation ({} proposed)", proposed);
            return Err(ClassifyError::EmptyResult(
                "All tabs were closed or grouped during classification".to_string(),
            ));
        }

        let report = apply_groups(self.host(), &proposals, window_id).await;

        if report.applied.is_empty() && report.failures.is_empty() {
            return Err(ClassifyError::EmptyResult(
                "All tabs were closed or grouped during classification".to_string(),
            ));
        }

        Ok(ClassifyOutcome {
            groups: report.applied.iter().map(GroupSummary::from).collect(),
            failed: report.failures,
        })
    }

    fn claim(&self, window_id: i32) -> Result<WindowGuard<'_>, ClassifyError> {
        if !self.in_flight.borrow_mut().insert(window_id) {
            warn!("Run already in progress for window {}", window_id);
            return Err(ClassifyError::AlreadyRunning);
        }
        Ok(WindowGuard {
            in_flight: &self.in_flight,
            window_id,
        })
    }
}

fn report_failure(reporter: &dyn StatusReporter, what: &str, e: &ClassifyError) {
    if e.is_benign() {
        info!("{} skipped: {}", what, e);
        reporter.report(RunState::Idle, Some(&e.to_string()));
    } else {
        warn!("{} failed: {}", what, e);
        reporter.report(RunState::Error, Some(&e.to_string()));
    }
}

/// Releases the window when the run ends, however it ends
struct WindowGuard<'a> {
    in_flight: &'a RefCell<HashSet<i32>>,
    window_id: i32,
}

impl Drop for WindowGuard<'_> {
    fn drop(&mut self) {
        self.in_flight.borrow_mut().remove(&self.window_id);
    }
}
