// src/store/snapshot.rs
//! JSON persistence of both in-memory stores between binary runs.

use super::{
    BranchScope, DomainStorage, EntityTable, InMemoryBranchNotionManager, InMemoryBranchRepository,
    InMemoryLeafRepository, InMemoryTrunkLeafNotionManager, InMemoryTrunkRepository,
    NotionStorage, NotionTable,
};
use crate::error::{AppError, Result};
use crate::model::{
    BigPlan, BigPlanCollection, InboxTask, InboxTaskCollection, Metric, MetricCollection,
    MetricEntry, SlackTask, SlackTaskCollection, SmartList, SmartListCollection, SmartListItem,
    SmartListTag, Vacation, VacationCollection,
};
use crate::notion::{
    NotionBigPlan, NotionInboxTask, NotionMetric, NotionMetricEntry, NotionSlackTask,
    NotionSmartList, NotionSmartListItem, NotionSmartListTag, NotionVacation,
};
use crate::types::EntityId;
use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const LOCAL_FILE: &str = "local.json";
const NOTION_FILE: &str = "notion.json";

/// Persisted form of [`DomainStorage`].
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LocalSnapshot {
    pub inbox_task_collections: EntityTable<InboxTaskCollection>,
    pub inbox_tasks: EntityTable<InboxTask>,
    pub big_plan_collections: EntityTable<BigPlanCollection>,
    pub big_plans: EntityTable<BigPlan>,
    pub slack_task_collections: EntityTable<SlackTaskCollection>,
    pub slack_tasks: EntityTable<SlackTask>,
    pub vacation_collections: EntityTable<VacationCollection>,
    pub vacations: EntityTable<Vacation>,
    pub metric_collections: EntityTable<MetricCollection>,
    pub metrics: EntityTable<Metric>,
    pub metric_entries: EntityTable<MetricEntry>,
    pub smart_list_collections: EntityTable<SmartListCollection>,
    pub smart_lists: EntityTable<SmartList>,
    pub smart_list_tags: EntityTable<SmartListTag>,
    pub smart_list_items: EntityTable<SmartListItem>,
}

type SmartListScopes =
    IndexMap<EntityId, BranchScope<NotionSmartList, NotionSmartListItem, NotionSmartListTag>>;

/// Persisted form of [`NotionStorage`].
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NotionSnapshot {
    pub inbox_tasks: IndexMap<EntityId, NotionTable<NotionInboxTask>>,
    pub big_plans: IndexMap<EntityId, NotionTable<NotionBigPlan>>,
    pub slack_tasks: IndexMap<EntityId, NotionTable<NotionSlackTask>>,
    pub vacations: IndexMap<EntityId, NotionTable<NotionVacation>>,
    pub metrics: IndexMap<EntityId, BranchScope<NotionMetric, NotionMetricEntry, ()>>,
    pub smart_lists: SmartListScopes,
}

impl From<&DomainStorage> for LocalSnapshot {
    fn from(storage: &DomainStorage) -> Self {
        Self {
            inbox_task_collections: storage.inbox_task_collections.snapshot(),
            inbox_tasks: storage.inbox_tasks.snapshot(),
            big_plan_collections: storage.big_plan_collections.snapshot(),
            big_plans: storage.big_plans.snapshot(),
            slack_task_collections: storage.slack_task_collections.snapshot(),
            slack_tasks: storage.slack_tasks.snapshot(),
            vacation_collections: storage.vacation_collections.snapshot(),
            vacations: storage.vacations.snapshot(),
            metric_collections: storage.metric_collections.snapshot(),
            metrics: storage.metrics.snapshot(),
            metric_entries: storage.metric_entries.snapshot(),
            smart_list_collections: storage.smart_list_collections.snapshot(),
            smart_lists: storage.smart_lists.snapshot(),
            smart_list_tags: storage.smart_list_tags.snapshot(),
            smart_list_items: storage.smart_list_items.snapshot(),
        }
    }
}

impl From<LocalSnapshot> for DomainStorage {
    fn from(snapshot: LocalSnapshot) -> Self {
        Self {
            inbox_task_collections: InMemoryTrunkRepository::from_snapshot(
                snapshot.inbox_task_collections,
            ),
            inbox_tasks: InMemoryLeafRepository::from_snapshot(snapshot.inbox_tasks),
            big_plan_collections: InMemoryTrunkRepository::from_snapshot(
                snapshot.big_plan_collections,
            ),
            big_plans: InMemoryLeafRepository::from_snapshot(snapshot.big_plans),
            slack_task_collections: InMemoryTrunkRepository::from_snapshot(
                snapshot.slack_task_collections,
            ),
            slack_tasks: InMemoryLeafRepository::from_snapshot(snapshot.slack_tasks),
            vacation_collections: InMemoryTrunkRepository::from_snapshot(
                snapshot.vacation_collections,
            ),
            vacations: InMemoryLeafRepository::from_snapshot(snapshot.vacations),
            metric_collections: InMemoryTrunkRepository::from_snapshot(
                snapshot.metric_collections,
            ),
            metrics: InMemoryBranchRepository::from_snapshot(snapshot.metrics),
            metric_entries: InMemoryLeafRepository::from_snapshot(snapshot.metric_entries),
            smart_list_collections: InMemoryTrunkRepository::from_snapshot(
                snapshot.smart_list_collections,
            ),
            smart_lists: InMemoryBranchRepository::from_snapshot(snapshot.smart_lists),
            smart_list_tags: InMemoryLeafRepository::from_snapshot(snapshot.smart_list_tags),
            smart_list_items: InMemoryLeafRepository::from_snapshot(snapshot.smart_list_items),
        }
    }
}

impl From<&NotionStorage> for NotionSnapshot {
    fn from(storage: &NotionStorage) -> Self {
        Self {
            inbox_tasks: storage.inbox_tasks.snapshot(),
            big_plans: storage.big_plans.snapshot(),
            slack_tasks: storage.slack_tasks.snapshot(),
            vacations: storage.vacations.snapshot(),
            metrics: storage.metrics.snapshot(),
            smart_lists: storage.smart_lists.snapshot(),
        }
    }
}

impl From<NotionSnapshot> for NotionStorage {
    fn from(snapshot: NotionSnapshot) -> Self {
        Self {
            inbox_tasks: InMemoryTrunkLeafNotionManager::from_snapshot(snapshot.inbox_tasks),
            big_plans: InMemoryTrunkLeafNotionManager::from_snapshot(snapshot.big_plans),
            slack_tasks: InMemoryTrunkLeafNotionManager::from_snapshot(snapshot.slack_tasks),
            vacations: InMemoryTrunkLeafNotionManager::from_snapshot(snapshot.vacations),
            metrics: InMemoryBranchNotionManager::from_snapshot(snapshot.metrics),
            smart_lists: InMemoryBranchNotionManager::from_snapshot(snapshot.smart_lists),
        }
    }
}

/// The state directory holding `local.json` and `notion.json`.
#[derive(Debug, Clone)]
pub struct WorkspaceSnapshot {
    dir: PathBuf,
}

impl WorkspaceSnapshot {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Loads both stores. Missing files yield empty stores.
    pub fn load(&self) -> Result<(DomainStorage, NotionStorage)> {
        let local: LocalSnapshot = read_or_default(&self.dir.join(LOCAL_FILE))?;
        let notion: NotionSnapshot = read_or_default(&self.dir.join(NOTION_FILE))?;
        Ok((local.into(), notion.into()))
    }

    pub fn save(&self, local: &DomainStorage, notion: &NotionStorage) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        write_json(&self.dir.join(LOCAL_FILE), &LocalSnapshot::from(local))?;
        write_json(&self.dir.join(NOTION_FILE), &NotionSnapshot::from(notion))?;
        log::debug!("Wrote state snapshot to {}", self.dir.display());
        Ok(())
    }
}

fn read_or_default<T: DeserializeOwned + Default>(path: &Path) -> Result<T> {
    if !path.exists() {
        log::info!("No state file at {}, starting empty", path.display());
        return Ok(T::default());
    }
    let raw = fs::read_to_string(path)?;
    serde_json::from_str(&raw).map_err(|source| AppError::JsonParseError {
        path: path.to_path_buf(),
        source,
    })
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let raw = serde_json::to_string_pretty(value)?;
    fs::write(path, raw)?;
    Ok(())
}
