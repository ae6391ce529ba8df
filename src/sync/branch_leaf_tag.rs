// src/sync/branch_leaf_tag.rs
//! Branches whose leaves carry branch-scoped tags: smart lists.
//!
//! Tags are reconciled before the leaves so that tag names on remote rows
//! resolve to local tag ids, and local tag ids render as names.

use super::branch_leaf::reconcile_branch;
use super::{reconcile_leaves, SyncOptions, SyncResult};
use crate::algebras::{
    BranchLeaves, BranchRepository, BranchTags, LeafRepository, TrunkBranchLeafAndTagNotionManager,
};
use crate::error::Result;
use crate::model::{BranchEntity, BranchTagEntity, Entity};
use crate::notion::{NotionBranch, NotionLeaf};
use crate::output::ProgressReporter;
use crate::types::{EntityId, TagName};
use std::collections::HashMap;

/// A branch's live tags, indexed both ways.
#[derive(Debug, Clone, PartialEq)]
pub struct TagIndex<T> {
    pub by_ref_id: HashMap<EntityId, T>,
    pub by_name: HashMap<TagName, T>,
}

impl<T: BranchTagEntity> TagIndex<T> {
    pub fn from_tags(tags: impl IntoIterator<Item = T>) -> Self {
        let mut by_ref_id = HashMap::new();
        let mut by_name = HashMap::new();
        for tag in tags {
            by_name.insert(tag.tag_name().clone(), tag.clone());
            by_ref_id.insert(tag.ref_id(), tag);
        }
        Self { by_ref_id, by_name }
    }
}

/// Tag and leaf outcomes for one branch.
#[derive(Debug, Clone, PartialEq)]
pub struct BranchTagSyncResult<B, L, T> {
    pub branch: B,
    pub tags: SyncResult<T>,
    pub leaves: SyncResult<L>,
}

pub struct TrunkBranchLeafTagSync<'a, B, N, G>
where
    B: NotionBranch,
    N: NotionLeaf,
    G: NotionLeaf,
{
    branches: &'a dyn BranchRepository<B::Entity>,
    leaves: &'a dyn LeafRepository<N::Entity>,
    tags: &'a dyn LeafRepository<G::Entity>,
    notion: &'a dyn TrunkBranchLeafAndTagNotionManager<B, N, G>,
}

impl<'a, B, N, G, T> TrunkBranchLeafTagSync<'a, B, N, G>
where
    B: NotionBranch,
    T: BranchTagEntity,
    G: NotionLeaf<Entity = T, DirectInfo = (), InverseInfo = ()>,
    N: NotionLeaf<DirectInfo = HashMap<EntityId, T>, InverseInfo = HashMap<TagName, T>>,
{
    pub fn new(
        branches: &'a dyn BranchRepository<B::Entity>,
        leaves: &'a dyn LeafRepository<N::Entity>,
        tags: &'a dyn LeafRepository<T>,
        notion: &'a dyn TrunkBranchLeafAndTagNotionManager<B, N, G>,
    ) -> Self {
        Self {
            branches,
            leaves,
            tags,
            notion,
        }
    }

    /// Syncs the branch page, then its tags, then its leaves.
    ///
    /// The leaf id filter does not apply to tags: every tag is needed to
    /// translate leaf rows.
    pub fn sync(
        &self,
        branch_ref_id: EntityId,
        options: &SyncOptions,
        reporter: &mut ProgressReporter,
    ) -> Result<BranchTagSyncResult<B::Entity, N::Entity, T>> {
        let branch = self.branches.load_by_id(branch_ref_id, false)?;
        let branch =
            reconcile_branch::<B, _>(self.branches, self.notion, branch, options, reporter)?;
        let trunk_ref_id = branch.trunk_ref_id();

        let tag_options = SyncOptions {
            filter_ref_ids: None,
            ..options.clone()
        };
        let tags = reconcile_leaves::<T, G, _>(
            self.tags,
            &BranchTags::new(self.notion, trunk_ref_id, branch.ref_id()),
            branch.ref_id(),
            &(),
            &(),
            &tag_options,
            reporter,
        )?;

        let index = TagIndex::from_tags(self.tags.find_all(branch.ref_id(), false, None)?);
        log::debug!(
            "{} '{}' has {} live tags",
            <B::Entity as Entity>::KIND,
            branch.nice_name(),
            index.by_name.len()
        );

        let leaves = reconcile_leaves::<N::Entity, N, _>(
            self.leaves,
            &BranchLeaves::new(self.notion, trunk_ref_id, branch.ref_id()),
            branch.ref_id(),
            &index.by_ref_id,
            &index.by_name,
            options,
            reporter,
        )?;

        Ok(BranchTagSyncResult {
            branch,
            tags,
            leaves,
        })
    }
}
