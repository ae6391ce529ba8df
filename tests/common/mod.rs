// tests/common/mod.rs
//! Shared fixtures: a workspace with every collection in place, backed by
//! the in-memory stores.

#![allow(dead_code)]

use jupiter_sync::algebras::{LeafRepository, TrunkRepository};
use jupiter_sync::store::NotionTable;
use jupiter_sync::{
    BigPlan, BigPlanStatus, DomainStorage, EntityId, EntityName, EventSource, NotionBigPlan,
    NotionId, NotionStorage, ProgressReporter, SyncOptions, SyncResult, Timestamp, TrunkEntity,
    TrunkLeafSync,
};

pub const WORKSPACE: EntityId = EntityId::new(1);

pub fn at(secs: i64) -> Timestamp {
    Timestamp::from_unix_secs(secs).expect("valid timestamp")
}

pub fn name(raw: &str) -> EntityName {
    EntityName::new(raw).expect("valid name")
}

pub struct World {
    pub local: DomainStorage,
    pub notion: NotionStorage,
}

impl World {
    pub fn new() -> Self {
        let local = DomainStorage::default();
        local
            .repositories()
            .ensure_workspace(WORKSPACE, at(0))
            .expect("workspace collections");
        Self {
            local,
            notion: NotionStorage::default(),
        }
    }

    pub fn big_plan_trunk(&self) -> EntityId {
        self.local
            .big_plan_collections
            .load_by_parent(WORKSPACE)
            .expect("big plan collection")
            .header
            .ref_id
    }

    pub fn inbox_task_trunk(&self) -> EntityId {
        self.local
            .inbox_task_collections
            .load_by_parent(WORKSPACE)
            .expect("inbox task collection")
            .header
            .ref_id
    }

    pub fn smart_list_trunk(&self) -> EntityId {
        let trunk = self
            .local
            .smart_list_collections
            .load_by_parent(WORKSPACE)
            .expect("smart list collection");
        assert_eq!(trunk.workspace_ref_id(), WORKSPACE);
        trunk.header.ref_id
    }

    pub fn vacation_trunk(&self) -> EntityId {
        self.local
            .vacation_collections
            .load_by_parent(WORKSPACE)
            .expect("vacation collection")
            .header
            .ref_id
    }

    pub fn metric_trunk(&self) -> EntityId {
        self.local
            .metric_collections
            .load_by_parent(WORKSPACE)
            .expect("metric collection")
            .header
            .ref_id
    }

    pub fn add_big_plan(&self, plan_name: &str, secs: i64) -> BigPlan {
        self.local
            .big_plans
            .create(BigPlan::new_big_plan(
                self.big_plan_trunk(),
                name(plan_name),
                BigPlanStatus::NotStarted,
                None,
                EventSource::Cli,
                at(secs),
            ))
            .expect("create big plan")
    }

    pub fn big_plan(&self, ref_id: EntityId) -> BigPlan {
        self.local
            .big_plans
            .load_by_id(ref_id, true)
            .expect("big plan exists")
    }

    pub fn sync_big_plans(
        &self,
        options: &SyncOptions,
        reporter: &mut ProgressReporter,
    ) -> SyncResult<BigPlan> {
        let local = self.local.repositories();
        let notion = self.notion.managers();
        TrunkLeafSync::new(local.big_plan_collections, local.big_plans, notion.big_plans)
            .sync(WORKSPACE, &(), &(), options, reporter)
            .expect("sync succeeds")
    }

    /// Runs `f` against the remote big plan table.
    pub fn big_plan_rows<R>(&self, f: impl FnOnce(&mut NotionTable<NotionBigPlan>) -> R) -> R {
        self.notion.big_plans.with_table(self.big_plan_trunk(), f)
    }
}

/// A big plan row as if typed straight into Notion.
pub fn typed_in_notion(row_name: &str, ref_id: Option<EntityId>, secs: i64) -> NotionBigPlan {
    NotionBigPlan {
        notion_id: NotionId::unassigned(),
        ref_id,
        archived: false,
        last_edited_time: at(secs),
        name: row_name.to_string(),
        status: Some("In Progress".to_string()),
        due_date: None,
    }
}
