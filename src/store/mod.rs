//! Reference stores for the local and remote sides, and the registries the
//! sync engine and services are handed.
//!
//! The engine never sees the concrete stores. It receives a
//! [`LocalRepositories`] and a [`NotionManagers`] of trait objects, so a
//! different backend (or a test double wrapping one of these) plugs in by
//! building those two structs.

mod memory;
mod notion_memory;
mod snapshot;

pub use memory::{
    EntityTable, InMemoryBranchRepository, InMemoryLeafRepository, InMemoryTrunkRepository,
};
pub use notion_memory::{
    BranchScope, InMemoryBranchNotionManager, InMemoryTrunkLeafNotionManager, NotionTable,
};
pub use snapshot::{LocalSnapshot, NotionSnapshot, WorkspaceSnapshot};

use crate::algebras::{
    BranchRepository, LeafRepository, TrunkBranchLeafAndTagNotionManager,
    TrunkBranchLeafNotionManager, TrunkLeafNotionManager, TrunkRepository,
};
use crate::error::{Result, StoreError};
use crate::model::{
    BigPlan, BigPlanCollection, CollectionKind, Entity, EventSource, InboxTask,
    InboxTaskCollection, Metric, MetricCollection, MetricEntry, SlackTask, SlackTaskCollection,
    SmartList, SmartListCollection, SmartListItem, SmartListTag, Vacation, VacationCollection,
};
use crate::notion::{
    NotionBigPlan, NotionInboxTask, NotionMetric, NotionMetricEntry, NotionSlackTask,
    NotionSmartList, NotionSmartListItem, NotionSmartListTag, NotionVacation,
};
use crate::types::{EntityId, Timestamp};

/// Local repositories for every entity kind that takes part in sync.
#[derive(Debug, Default)]
pub struct DomainStorage {
    pub inbox_task_collections: InMemoryTrunkRepository<InboxTaskCollection>,
    pub inbox_tasks: InMemoryLeafRepository<InboxTask>,
    pub big_plan_collections: InMemoryTrunkRepository<BigPlanCollection>,
    pub big_plans: InMemoryLeafRepository<BigPlan>,
    pub slack_task_collections: InMemoryTrunkRepository<SlackTaskCollection>,
    pub slack_tasks: InMemoryLeafRepository<SlackTask>,
    pub vacation_collections: InMemoryTrunkRepository<VacationCollection>,
    pub vacations: InMemoryLeafRepository<Vacation>,
    pub metric_collections: InMemoryTrunkRepository<MetricCollection>,
    pub metrics: InMemoryBranchRepository<Metric>,
    pub metric_entries: InMemoryLeafRepository<MetricEntry>,
    pub smart_list_collections: InMemoryTrunkRepository<SmartListCollection>,
    pub smart_lists: InMemoryBranchRepository<SmartList>,
    pub smart_list_tags: InMemoryLeafRepository<SmartListTag>,
    pub smart_list_items: InMemoryLeafRepository<SmartListItem>,
}

/// Remote managers for every entity kind that takes part in sync.
#[derive(Debug, Default)]
pub struct NotionStorage {
    pub inbox_tasks: InMemoryTrunkLeafNotionManager<NotionInboxTask>,
    pub big_plans: InMemoryTrunkLeafNotionManager<NotionBigPlan>,
    pub slack_tasks: InMemoryTrunkLeafNotionManager<NotionSlackTask>,
    pub vacations: InMemoryTrunkLeafNotionManager<NotionVacation>,
    pub metrics: InMemoryBranchNotionManager<NotionMetric, NotionMetricEntry>,
    pub smart_lists:
        InMemoryBranchNotionManager<NotionSmartList, NotionSmartListItem, NotionSmartListTag>,
}

/// Local side as seen by the engine.
#[derive(Clone, Copy)]
pub struct LocalRepositories<'a> {
    pub inbox_task_collections: &'a dyn TrunkRepository<InboxTaskCollection>,
    pub inbox_tasks: &'a dyn LeafRepository<InboxTask>,
    pub big_plan_collections: &'a dyn TrunkRepository<BigPlanCollection>,
    pub big_plans: &'a dyn LeafRepository<BigPlan>,
    pub slack_task_collections: &'a dyn TrunkRepository<SlackTaskCollection>,
    pub slack_tasks: &'a dyn LeafRepository<SlackTask>,
    pub vacation_collections: &'a dyn TrunkRepository<VacationCollection>,
    pub vacations: &'a dyn LeafRepository<Vacation>,
    pub metric_collections: &'a dyn TrunkRepository<MetricCollection>,
    pub metrics: &'a dyn BranchRepository<Metric>,
    pub metric_entries: &'a dyn LeafRepository<MetricEntry>,
    pub smart_list_collections: &'a dyn TrunkRepository<SmartListCollection>,
    pub smart_lists: &'a dyn BranchRepository<SmartList>,
    pub smart_list_tags: &'a dyn LeafRepository<SmartListTag>,
    pub smart_list_items: &'a dyn LeafRepository<SmartListItem>,
}

/// Remote side as seen by the engine.
#[derive(Clone, Copy)]
pub struct NotionManagers<'a> {
    pub inbox_tasks: &'a dyn TrunkLeafNotionManager<NotionInboxTask>,
    pub big_plans: &'a dyn TrunkLeafNotionManager<NotionBigPlan>,
    pub slack_tasks: &'a dyn TrunkLeafNotionManager<NotionSlackTask>,
    pub vacations: &'a dyn TrunkLeafNotionManager<NotionVacation>,
    pub metrics: &'a dyn TrunkBranchLeafNotionManager<NotionMetric, NotionMetricEntry>,
    pub smart_lists: &'a dyn TrunkBranchLeafAndTagNotionManager<
        NotionSmartList,
        NotionSmartListItem,
        NotionSmartListTag,
    >,
}

impl DomainStorage {
    pub fn repositories(&self) -> LocalRepositories<'_> {
        LocalRepositories {
            inbox_task_collections: &self.inbox_task_collections,
            inbox_tasks: &self.inbox_tasks,
            big_plan_collections: &self.big_plan_collections,
            big_plans: &self.big_plans,
            slack_task_collections: &self.slack_task_collections,
            slack_tasks: &self.slack_tasks,
            vacation_collections: &self.vacation_collections,
            vacations: &self.vacations,
            metric_collections: &self.metric_collections,
            metrics: &self.metrics,
            metric_entries: &self.metric_entries,
            smart_list_collections: &self.smart_list_collections,
            smart_lists: &self.smart_lists,
            smart_list_tags: &self.smart_list_tags,
            smart_list_items: &self.smart_list_items,
        }
    }
}

impl NotionStorage {
    pub fn managers(&self) -> NotionManagers<'_> {
        NotionManagers {
            inbox_tasks: &self.inbox_tasks,
            big_plans: &self.big_plans,
            slack_tasks: &self.slack_tasks,
            vacations: &self.vacations,
            metrics: &self.metrics,
            smart_lists: &self.smart_lists,
        }
    }
}

impl<'a> LocalRepositories<'a> {
    /// Creates every missing trunk for a workspace. Returns how many were
    /// created.
    pub fn ensure_workspace(&self, workspace_ref_id: EntityId, at: Timestamp) -> Result<usize> {
        let created = [
            ensure_trunk(self.inbox_task_collections, workspace_ref_id, at)?,
            ensure_trunk(self.big_plan_collections, workspace_ref_id, at)?,
            ensure_trunk(self.slack_task_collections, workspace_ref_id, at)?,
            ensure_trunk(self.vacation_collections, workspace_ref_id, at)?,
            ensure_trunk(self.metric_collections, workspace_ref_id, at)?,
            ensure_trunk(self.smart_list_collections, workspace_ref_id, at)?,
        ];
        Ok(created.iter().filter(|c| **c).count())
    }
}

fn ensure_trunk<K: CollectionKind>(
    repository: &dyn TrunkRepository<crate::model::Collection<K>>,
    workspace_ref_id: EntityId,
    at: Timestamp,
) -> Result<bool> {
    match repository.load_by_parent(workspace_ref_id) {
        Ok(_) => Ok(false),
        Err(StoreError::EntityNotFound { .. }) => {
            let trunk = repository.create(crate::model::Collection::<K>::new_collection(
                workspace_ref_id,
                EventSource::Cli,
                at,
            ))?;
            log::info!(
                "Created {} {} for workspace {}",
                K::NAME,
                trunk.ref_id(),
                workspace_ref_id
            );
            Ok(true)
        }
        Err(e) => Err(e.into()),
    }
}
