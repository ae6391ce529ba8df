// src/sync/branch_leaf.rs
//! Branches with their own remote database of leaves: metrics and their
//! entries.

use super::{reconcile_leaves, tolerate_missing, SyncOptions, SyncResult};
use crate::algebras::{
    BranchLeaves, BranchNotionManager, BranchRepository, LeafRepository,
    TrunkBranchLeafNotionManager,
};
use crate::error::Result;
use crate::model::{BranchEntity, Entity};
use crate::notion::{NotionBranch, NotionLeaf};
use crate::output::{MarkStatus, ProgressReporter};
use crate::types::{EntityId, SyncPrefer};

/// Outcome of syncing one branch and its leaves.
#[derive(Debug, Clone, PartialEq)]
pub struct BranchSyncResult<B, L> {
    pub branch: B,
    pub leaves: SyncResult<L>,
}

pub struct TrunkBranchLeafSync<'a, B, N>
where
    B: NotionBranch,
    N: NotionLeaf,
{
    branches: &'a dyn BranchRepository<B::Entity>,
    leaves: &'a dyn LeafRepository<N::Entity>,
    notion: &'a dyn TrunkBranchLeafNotionManager<B, N>,
}

impl<'a, B, N> TrunkBranchLeafSync<'a, B, N>
where
    B: NotionBranch,
    N: NotionLeaf,
{
    pub fn new(
        branches: &'a dyn BranchRepository<B::Entity>,
        leaves: &'a dyn LeafRepository<N::Entity>,
        notion: &'a dyn TrunkBranchLeafNotionManager<B, N>,
    ) -> Self {
        Self {
            branches,
            leaves,
            notion,
        }
    }

    /// Syncs the branch's own page, then its leaves.
    pub fn sync(
        &self,
        branch_ref_id: EntityId,
        direct_info: &N::DirectInfo,
        inverse_info: &N::InverseInfo,
        options: &SyncOptions,
        reporter: &mut ProgressReporter,
    ) -> Result<BranchSyncResult<B::Entity, N::Entity>> {
        let branch = self.branches.load_by_id(branch_ref_id, false)?;
        let branch =
            reconcile_branch::<B, _>(self.branches, self.notion, branch, options, reporter)?;
        let leaves = reconcile_leaves::<N::Entity, N, _>(
            self.leaves,
            &BranchLeaves::new(self.notion, branch.trunk_ref_id(), branch.ref_id()),
            branch.ref_id(),
            direct_info,
            inverse_info,
            options,
            reporter,
        )?;
        Ok(BranchSyncResult { branch, leaves })
    }
}

/// Brings a branch and its remote page in line, creating the page when
/// it does not exist yet.
pub(crate) fn reconcile_branch<B, M>(
    local: &dyn BranchRepository<B::Entity>,
    remote: &M,
    branch: B::Entity,
    options: &SyncOptions,
    reporter: &mut ProgressReporter,
) -> Result<B::Entity>
where
    B: NotionBranch,
    M: BranchNotionManager<B> + ?Sized,
{
    let kind = <B::Entity as Entity>::KIND;
    let trunk_ref_id = branch.trunk_ref_id();
    let name = branch.nice_name();

    let page = match remote.load_branch(trunk_ref_id, branch.ref_id()) {
        Ok(page) => page,
        Err(e) if e.is_not_found() => {
            log::info!("Creating remote page for {} '{}'", kind, name);
            remote.upsert_branch(trunk_ref_id, B::new_notion_row(&branch))?;
            reporter
                .start_creating_entity(kind, &name)
                .entity_id(branch.ref_id())
                .mark_other("remote create", MarkStatus::Ok);
            return Ok(branch);
        }
        Err(e) => return Err(e.into()),
    };

    let progress = reporter
        .start_updating_entity(kind, &name)
        .entity_id(branch.ref_id());
    match options.sync_prefer {
        SyncPrefer::Local => {
            let status = tolerate_missing(
                remote.save_branch(trunk_ref_id, page.join_with_entity(&branch)),
                "remote save",
                &name,
            )?;
            progress.mark_remote_change(status);
            Ok(branch)
        }
        SyncPrefer::Notion => {
            let merged = page.apply_to_entity(branch.clone())?;
            if merged.version() == branch.version() && !options.sync_even_if_not_modified {
                progress.mark_not_needed();
                return Ok(branch);
            }
            let merged = local.save(merged)?;
            progress.mark_local_change();
            Ok(merged)
        }
    }
}
