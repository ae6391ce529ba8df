// src/sync/orchestrator.rs
//! Runs the sync of a whole workspace, one entity kind at a time.

use super::{
    SyncOptions, SyncResult, TrunkBranchLeafSync, TrunkBranchLeafTagSync, TrunkLeafSync,
};
use crate::error::Result;
use crate::model::Entity;
use crate::notion::{InboxTaskDirectInfo, InboxTaskInverseInfo};
use crate::output::ProgressReporter;
use crate::store::{LocalRepositories, NotionManagers};
use crate::types::{EntityId, EntityKey, ValidationError};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;

/// An entity kind that can be synced on its own.
///
/// Variants are declared in dependency order: inbox tasks render big plan
/// names, so big plans go first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SyncTarget {
    Vacations,
    BigPlans,
    SlackTasks,
    InboxTasks,
    Metrics,
    SmartLists,
}

impl SyncTarget {
    pub const ALL: [SyncTarget; 6] = [
        Self::Vacations,
        Self::BigPlans,
        Self::SlackTasks,
        Self::InboxTasks,
        Self::Metrics,
        Self::SmartLists,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Vacations => "vacations",
            Self::BigPlans => "big-plans",
            Self::SlackTasks => "slack-tasks",
            Self::InboxTasks => "inbox-tasks",
            Self::Metrics => "metrics",
            Self::SmartLists => "smart-lists",
        }
    }
}

impl FromStr for SyncTarget {
    type Err = ValidationError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|target| target.as_str() == wanted)
            .ok_or_else(|| ValidationError::InvalidEnum {
                kind: "sync target",
                value: s.to_string(),
                expected: "vacations, big-plans, slack-tasks, inbox-tasks, metrics, smart-lists",
            })
    }
}

impl fmt::Display for SyncTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What to sync in a workspace.
#[derive(Debug, Clone, Default)]
pub struct WorkspaceSyncRequest {
    /// Targets to run. Empty means all of them.
    pub targets: Vec<SyncTarget>,
    /// Shared options. Its own id filter is ignored in favour of
    /// `leaf_filters`.
    pub options: SyncOptions,
    pub leaf_filters: HashMap<SyncTarget, HashSet<EntityId>>,
    /// Restricts branch targets to these keys.
    pub branch_keys: Option<Vec<EntityKey>>,
}

impl WorkspaceSyncRequest {
    fn selected(&self) -> Vec<SyncTarget> {
        SyncTarget::ALL
            .into_iter()
            .filter(|t| self.targets.is_empty() || self.targets.contains(t))
            .collect()
    }

    fn options_for(&self, target: SyncTarget) -> SyncOptions {
        SyncOptions {
            filter_ref_ids: self.leaf_filters.get(&target).cloned(),
            ..self.options.clone()
        }
    }
}

/// Counts for one target, summed over its branches when it has any.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetSummary {
    pub target: SyncTarget,
    pub branches: usize,
    pub reconciled: usize,
    pub created_locally: usize,
    pub modified_locally: usize,
    pub created_remotely: usize,
    pub modified_remotely: usize,
    pub removed_remotely: usize,
}

impl TargetSummary {
    fn new(target: SyncTarget) -> Self {
        Self {
            target,
            branches: 0,
            reconciled: 0,
            created_locally: 0,
            modified_locally: 0,
            created_remotely: 0,
            modified_remotely: 0,
            removed_remotely: 0,
        }
    }

    fn absorb<L>(&mut self, result: &SyncResult<L>) {
        self.reconciled += result.all.len();
        self.created_locally += result.created_locally.len();
        self.modified_locally += result.modified_locally.len();
        self.created_remotely += result.created_remotely.len();
        self.modified_remotely += result.modified_remotely.len();
        self.removed_remotely += result.removed_remotely.len();
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkspaceSyncSummary {
    pub targets: Vec<TargetSummary>,
}

impl WorkspaceSyncSummary {
    pub fn for_target(&self, target: SyncTarget) -> Option<&TargetSummary> {
        self.targets.iter().find(|s| s.target == target)
    }
}

pub struct SyncOrchestrator<'a> {
    local: LocalRepositories<'a>,
    notion: NotionManagers<'a>,
}

impl<'a> SyncOrchestrator<'a> {
    pub fn new(local: LocalRepositories<'a>, notion: NotionManagers<'a>) -> Self {
        Self { local, notion }
    }

    pub fn sync(
        &self,
        workspace_ref_id: EntityId,
        request: &WorkspaceSyncRequest,
        reporter: &mut ProgressReporter,
    ) -> Result<WorkspaceSyncSummary> {
        let mut summary = WorkspaceSyncSummary::default();
        for target in request.selected() {
            log::info!("Syncing {} for workspace {}", target, workspace_ref_id);
            let options = request.options_for(target);
            let target_summary = match target {
                SyncTarget::Vacations => self.sync_vacations(workspace_ref_id, &options, reporter)?,
                SyncTarget::BigPlans => self.sync_big_plans(workspace_ref_id, &options, reporter)?,
                SyncTarget::SlackTasks => {
                    self.sync_slack_tasks(workspace_ref_id, &options, reporter)?
                }
                SyncTarget::InboxTasks => {
                    self.sync_inbox_tasks(workspace_ref_id, &options, reporter)?
                }
                SyncTarget::Metrics => {
                    self.sync_metrics(workspace_ref_id, request, &options, reporter)?
                }
                SyncTarget::SmartLists => {
                    self.sync_smart_lists(workspace_ref_id, request, &options, reporter)?
                }
            };
            summary.targets.push(target_summary);
        }
        Ok(summary)
    }

    fn sync_vacations(
        &self,
        workspace_ref_id: EntityId,
        options: &SyncOptions,
        reporter: &mut ProgressReporter,
    ) -> Result<TargetSummary> {
        let result = TrunkLeafSync::new(
            self.local.vacation_collections,
            self.local.vacations,
            self.notion.vacations,
        )
        .sync(workspace_ref_id, &(), &(), options, reporter)?;
        let mut summary = TargetSummary::new(SyncTarget::Vacations);
        summary.absorb(&result);
        Ok(summary)
    }

    fn sync_big_plans(
        &self,
        workspace_ref_id: EntityId,
        options: &SyncOptions,
        reporter: &mut ProgressReporter,
    ) -> Result<TargetSummary> {
        let result = TrunkLeafSync::new(
            self.local.big_plan_collections,
            self.local.big_plans,
            self.notion.big_plans,
        )
        .sync(workspace_ref_id, &(), &(), options, reporter)?;
        let mut summary = TargetSummary::new(SyncTarget::BigPlans);
        summary.absorb(&result);
        Ok(summary)
    }

    fn sync_slack_tasks(
        &self,
        workspace_ref_id: EntityId,
        options: &SyncOptions,
        reporter: &mut ProgressReporter,
    ) -> Result<TargetSummary> {
        let result = TrunkLeafSync::new(
            self.local.slack_task_collections,
            self.local.slack_tasks,
            self.notion.slack_tasks,
        )
        .sync(workspace_ref_id, &(), &(), options, reporter)?;
        let mut summary = TargetSummary::new(SyncTarget::SlackTasks);
        summary.absorb(&result);
        Ok(summary)
    }

    fn sync_inbox_tasks(
        &self,
        workspace_ref_id: EntityId,
        options: &SyncOptions,
        reporter: &mut ProgressReporter,
    ) -> Result<TargetSummary> {
        let plan_collection = self.local.big_plan_collections.load_by_parent(workspace_ref_id)?;
        let big_plans = self
            .local
            .big_plans
            .find_all(plan_collection.ref_id(), true, None)?;
        let direct_info = InboxTaskDirectInfo::from_big_plans(&big_plans);
        let inverse_info = InboxTaskInverseInfo::from_big_plans(&big_plans);

        let result = TrunkLeafSync::new(
            self.local.inbox_task_collections,
            self.local.inbox_tasks,
            self.notion.inbox_tasks,
        )
        .sync(workspace_ref_id, &direct_info, &inverse_info, options, reporter)?;
        let mut summary = TargetSummary::new(SyncTarget::InboxTasks);
        summary.absorb(&result);
        Ok(summary)
    }

    fn sync_metrics(
        &self,
        workspace_ref_id: EntityId,
        request: &WorkspaceSyncRequest,
        options: &SyncOptions,
        reporter: &mut ProgressReporter,
    ) -> Result<TargetSummary> {
        let collection = self.local.metric_collections.load_by_parent(workspace_ref_id)?;
        let metrics = self.local.metrics.find_all(
            collection.ref_id(),
            false,
            request.branch_keys.as_deref(),
        )?;
        let sync = TrunkBranchLeafSync::new(
            self.local.metrics,
            self.local.metric_entries,
            self.notion.metrics,
        );

        let mut summary = TargetSummary::new(SyncTarget::Metrics);
        for metric in metrics {
            let result = sync.sync(metric.ref_id(), &(), &(), options, reporter)?;
            summary.branches += 1;
            summary.absorb(&result.leaves);
        }
        Ok(summary)
    }

    fn sync_smart_lists(
        &self,
        workspace_ref_id: EntityId,
        request: &WorkspaceSyncRequest,
        options: &SyncOptions,
        reporter: &mut ProgressReporter,
    ) -> Result<TargetSummary> {
        let collection = self.local.smart_list_collections.load_by_parent(workspace_ref_id)?;
        let smart_lists = self.local.smart_lists.find_all(
            collection.ref_id(),
            false,
            request.branch_keys.as_deref(),
        )?;
        let sync = TrunkBranchLeafTagSync::new(
            self.local.smart_lists,
            self.local.smart_list_items,
            self.local.smart_list_tags,
            self.notion.smart_lists,
        );

        let mut summary = TargetSummary::new(SyncTarget::SmartLists);
        for smart_list in smart_lists {
            let result = sync.sync(smart_list.ref_id(), options, reporter)?;
            summary.branches += 1;
            summary.absorb(&result.leaves);
        }
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn targets_parse_from_kebab_case() {
        assert_eq!("smart-lists".parse::<SyncTarget>(), Ok(SyncTarget::SmartLists));
        assert_eq!(" Inbox-Tasks ".parse::<SyncTarget>(), Ok(SyncTarget::InboxTasks));
        assert_eq!("vacations".parse::<SyncTarget>(), Ok(SyncTarget::Vacations));
        assert!("habits".parse::<SyncTarget>().is_err());
    }

    #[test]
    fn selection_follows_dependency_order() {
        let request = WorkspaceSyncRequest {
            targets: vec![SyncTarget::InboxTasks, SyncTarget::BigPlans],
            ..WorkspaceSyncRequest::default()
        };
        assert_eq!(
            request.selected(),
            vec![SyncTarget::BigPlans, SyncTarget::InboxTasks]
        );
        assert_eq!(WorkspaceSyncRequest::default().selected(), SyncTarget::ALL.to_vec());
    }
}
