// src/sync/mod.rs
//! Bidirectional reconciliation between the local store and Notion.
//!
//! The passes are written once, generically, in [`reconcile`]. The three
//! shapes ([`TrunkLeafSync`], [`TrunkBranchLeafSync`] and
//! [`TrunkBranchLeafTagSync`]) only decide which remote set the passes run
//! against, and [`SyncOrchestrator`] picks the shapes per entity kind.
//!
//! Failure model: a remote row that has gone missing while it is being
//! updated or removed is logged and recorded as a failed step, and the run
//! carries on. Any other error aborts the run. Local writes already made
//! stay made, and running again converges.

mod branch_leaf;
mod branch_leaf_tag;
mod orchestrator;
mod reconcile;
mod trunk_leaf;

pub use branch_leaf::{BranchSyncResult, TrunkBranchLeafSync};
pub use branch_leaf_tag::{BranchTagSyncResult, TagIndex, TrunkBranchLeafTagSync};
pub use orchestrator::{
    SyncOrchestrator, SyncTarget, TargetSummary, WorkspaceSyncRequest, WorkspaceSyncSummary,
};
pub use reconcile::reconcile_leaves;
pub use trunk_leaf::TrunkLeafSync;

use crate::error::{NotionStoreError, Result};
use crate::output::MarkStatus;
use crate::types::{EntityId, SyncPrefer};
use std::collections::HashSet;

/// Knobs shared by every sync shape.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncOptions {
    /// Wipe the remote rows first and rebuild them from the local side.
    pub drop_all_notion_side: bool,
    /// Skip the timestamp comparison and merge every matched pair.
    pub sync_even_if_not_modified: bool,
    /// Restrict the run to these local ids.
    pub filter_ref_ids: Option<HashSet<EntityId>>,
    pub sync_prefer: SyncPrefer,
}

impl SyncOptions {
    pub fn prefer(sync_prefer: SyncPrefer) -> Self {
        Self {
            sync_prefer,
            ..Self::default()
        }
    }

    pub fn forced(mut self) -> Self {
        self.sync_even_if_not_modified = true;
        self
    }

    pub fn dropping_notion_side(mut self) -> Self {
        self.drop_all_notion_side = true;
        self
    }

    pub fn only(mut self, ref_ids: impl IntoIterator<Item = EntityId>) -> Self {
        self.filter_ref_ids = Some(ref_ids.into_iter().collect());
        self
    }

    fn allows(&self, ref_id: Option<EntityId>) -> bool {
        match (&self.filter_ref_ids, ref_id) {
            (None, _) => true,
            (Some(filter), Some(ref_id)) => filter.contains(&ref_id),
            (Some(_), None) => false,
        }
    }
}

/// What one reconciliation did, by local id.
#[derive(Debug, Clone, PartialEq)]
pub struct SyncResult<L> {
    /// Every local entity that took part, in its final state.
    pub all: Vec<L>,
    pub created_locally: Vec<EntityId>,
    pub modified_locally: Vec<EntityId>,
    pub created_remotely: Vec<EntityId>,
    pub modified_remotely: Vec<EntityId>,
    pub removed_remotely: Vec<EntityId>,
}

impl<L> Default for SyncResult<L> {
    fn default() -> Self {
        Self {
            all: Vec::new(),
            created_locally: Vec::new(),
            modified_locally: Vec::new(),
            created_remotely: Vec::new(),
            modified_remotely: Vec::new(),
            removed_remotely: Vec::new(),
        }
    }
}

impl<L> SyncResult<L> {
    pub fn has_a_local_change(&self) -> bool {
        !self.created_locally.is_empty() || !self.modified_locally.is_empty()
    }

    pub fn has_a_remote_change(&self) -> bool {
        !self.created_remotely.is_empty()
            || !self.modified_remotely.is_empty()
            || !self.removed_remotely.is_empty()
    }
}

/// Maps a remote not-found to a failed step and lets every other error
/// through.
pub(crate) fn tolerate_missing<T>(
    result: std::result::Result<T, NotionStoreError>,
    step: &str,
    name: &str,
) -> Result<MarkStatus> {
    match result {
        Ok(_) => Ok(MarkStatus::Ok),
        Err(e) if e.is_not_found() => {
            log::info!("Skipping {} for '{}', it is already gone: {}", step, name, e);
            Ok(MarkStatus::Failed)
        }
        Err(e) => Err(e.into()),
    }
}
