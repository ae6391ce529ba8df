//! Remote storage capabilities.
//!
//! Remote rows are addressed by the local id they mirror. The mapping from
//! local id to remote id is kept by the manager itself ("linking"), so a
//! sync run can tell rows it created from rows someone typed in by hand.
//!
//! Every fallible call returns [`NotionStoreError`]; callers tell a missing
//! row apart from a real failure with [`NotionStoreError::is_not_found`].

use crate::error::NotionStoreError;
use crate::notion::{NotionBranch, NotionLeaf};
use crate::types::{EntityId, NotionId};

/// Remote rows for leaves hanging directly off a trunk.
///
/// # Laws
///
/// - **L1 (Upsert links)**: after `upsert_leaf(t, row)` the returned row has
///   a fresh remote id and that id is in `load_all_saved_notion_ids(t)`.
/// - **L2 (Save requires existence)**: `save_leaf` on a row whose remote id
///   is unknown fails with a not-found error.
/// - **L3 (Remove requires existence)**: `remove_leaf(t, id)` fails with a
///   not-found error when no row carries `id`.
/// - **L4 (Row removal is exact)**: `remove_leaf_by_notion_id(t, nid)`
///   deletes that one row and any link pointing at it. Other rows carrying
///   the same local id, and their links, stay.
pub trait TrunkLeafNotionManager<N: NotionLeaf>: Send + Sync {
    fn upsert_leaf(&self, trunk_ref_id: EntityId, leaf: N) -> Result<N, NotionStoreError>;

    fn save_leaf(&self, trunk_ref_id: EntityId, leaf: N) -> Result<N, NotionStoreError>;

    fn load_leaf(&self, trunk_ref_id: EntityId, leaf_ref_id: EntityId)
        -> Result<N, NotionStoreError>;

    fn load_all_leaves(&self, trunk_ref_id: EntityId) -> Result<Vec<N>, NotionStoreError>;

    fn remove_leaf(&self, trunk_ref_id: EntityId, leaf_ref_id: EntityId)
        -> Result<(), NotionStoreError>;

    fn remove_leaf_by_notion_id(
        &self,
        trunk_ref_id: EntityId,
        notion_id: &NotionId,
    ) -> Result<(), NotionStoreError>;

    fn drop_all_leaves(&self, trunk_ref_id: EntityId) -> Result<(), NotionStoreError>;

    fn load_all_saved_notion_ids(
        &self,
        trunk_ref_id: EntityId,
    ) -> Result<Vec<NotionId>, NotionStoreError>;

    fn link_local_and_notion_leaves(
        &self,
        trunk_ref_id: EntityId,
        leaf_ref_id: EntityId,
        notion_id: &NotionId,
    ) -> Result<(), NotionStoreError>;
}

/// Remote page heading each branch's database.
pub trait BranchNotionManager<B: NotionBranch>: Send + Sync {
    fn upsert_branch(&self, trunk_ref_id: EntityId, branch: B) -> Result<B, NotionStoreError>;

    fn save_branch(&self, trunk_ref_id: EntityId, branch: B) -> Result<B, NotionStoreError>;

    fn load_branch(
        &self,
        trunk_ref_id: EntityId,
        branch_ref_id: EntityId,
    ) -> Result<B, NotionStoreError>;

    fn remove_branch(
        &self,
        trunk_ref_id: EntityId,
        branch_ref_id: EntityId,
    ) -> Result<(), NotionStoreError>;
}

/// Remote rows of a branch's leaves. Same laws as [`TrunkLeafNotionManager`],
/// scoped to `(trunk_ref_id, branch_ref_id)`.
pub trait BranchLeafNotionManager<N: NotionLeaf>: Send + Sync {
    fn upsert_leaf(
        &self,
        trunk_ref_id: EntityId,
        branch_ref_id: EntityId,
        leaf: N,
    ) -> Result<N, NotionStoreError>;

    fn save_leaf(
        &self,
        trunk_ref_id: EntityId,
        branch_ref_id: EntityId,
        leaf: N,
    ) -> Result<N, NotionStoreError>;

    fn load_leaf(
        &self,
        trunk_ref_id: EntityId,
        branch_ref_id: EntityId,
        leaf_ref_id: EntityId,
    ) -> Result<N, NotionStoreError>;

    fn load_all_leaves(
        &self,
        trunk_ref_id: EntityId,
        branch_ref_id: EntityId,
    ) -> Result<Vec<N>, NotionStoreError>;

    fn remove_leaf(
        &self,
        trunk_ref_id: EntityId,
        branch_ref_id: EntityId,
        leaf_ref_id: EntityId,
    ) -> Result<(), NotionStoreError>;

    fn remove_leaf_by_notion_id(
        &self,
        trunk_ref_id: EntityId,
        branch_ref_id: EntityId,
        notion_id: &NotionId,
    ) -> Result<(), NotionStoreError>;

    fn drop_all_leaves(
        &self,
        trunk_ref_id: EntityId,
        branch_ref_id: EntityId,
    ) -> Result<(), NotionStoreError>;

    fn load_all_saved_notion_ids(
        &self,
        trunk_ref_id: EntityId,
        branch_ref_id: EntityId,
    ) -> Result<Vec<NotionId>, NotionStoreError>;

    fn link_local_and_notion_leaves(
        &self,
        trunk_ref_id: EntityId,
        branch_ref_id: EntityId,
        leaf_ref_id: EntityId,
        notion_id: &NotionId,
    ) -> Result<(), NotionStoreError>;
}

/// Remote tag options of a branch. Same laws as [`TrunkLeafNotionManager`],
/// scoped to `(trunk_ref_id, branch_ref_id)`.
pub trait BranchTagNotionManager<G: NotionLeaf>: Send + Sync {
    fn upsert_branch_tag(
        &self,
        trunk_ref_id: EntityId,
        branch_ref_id: EntityId,
        tag: G,
    ) -> Result<G, NotionStoreError>;

    fn save_branch_tag(
        &self,
        trunk_ref_id: EntityId,
        branch_ref_id: EntityId,
        tag: G,
    ) -> Result<G, NotionStoreError>;

    fn load_all_branch_tags(
        &self,
        trunk_ref_id: EntityId,
        branch_ref_id: EntityId,
    ) -> Result<Vec<G>, NotionStoreError>;

    fn remove_branch_tag(
        &self,
        trunk_ref_id: EntityId,
        branch_ref_id: EntityId,
        tag_ref_id: EntityId,
    ) -> Result<(), NotionStoreError>;

    fn remove_branch_tag_by_notion_id(
        &self,
        trunk_ref_id: EntityId,
        branch_ref_id: EntityId,
        notion_id: &NotionId,
    ) -> Result<(), NotionStoreError>;

    fn drop_all_branch_tags(
        &self,
        trunk_ref_id: EntityId,
        branch_ref_id: EntityId,
    ) -> Result<(), NotionStoreError>;

    fn load_all_saved_branch_tag_notion_ids(
        &self,
        trunk_ref_id: EntityId,
        branch_ref_id: EntityId,
    ) -> Result<Vec<NotionId>, NotionStoreError>;

    fn link_local_and_notion_branch_tags(
        &self,
        trunk_ref_id: EntityId,
        branch_ref_id: EntityId,
        tag_ref_id: EntityId,
        notion_id: &NotionId,
    ) -> Result<(), NotionStoreError>;
}

/// Branch page plus branch rows.
pub trait TrunkBranchLeafNotionManager<B: NotionBranch, N: NotionLeaf>:
    BranchNotionManager<B> + BranchLeafNotionManager<N>
{
}

impl<T, B, N> TrunkBranchLeafNotionManager<B, N> for T
where
    T: BranchNotionManager<B> + BranchLeafNotionManager<N> + ?Sized,
    B: NotionBranch,
    N: NotionLeaf,
{
}

/// Branch page, branch rows and branch tags.
pub trait TrunkBranchLeafAndTagNotionManager<B: NotionBranch, N: NotionLeaf, G: NotionLeaf>:
    TrunkBranchLeafNotionManager<B, N> + BranchTagNotionManager<G>
{
}

impl<T, B, N, G> TrunkBranchLeafAndTagNotionManager<B, N, G> for T
where
    T: TrunkBranchLeafNotionManager<B, N> + BranchTagNotionManager<G> + ?Sized,
    B: NotionBranch,
    N: NotionLeaf,
    G: NotionLeaf,
{
}

/// One remote collection of leaf rows with its scope already bound.
///
/// The three-pass reconciliation is written once against this trait and
/// reused for trunk leaves, branch leaves and branch tags.
pub trait RemoteLeafSet<N: NotionLeaf> {
    fn upsert(&self, row: N) -> Result<N, NotionStoreError>;

    fn save(&self, row: N) -> Result<N, NotionStoreError>;

    fn load_all(&self) -> Result<Vec<N>, NotionStoreError>;

    /// Removes every row mirroring `ref_id`.
    fn remove(&self, ref_id: EntityId) -> Result<(), NotionStoreError>;

    /// Removes exactly one row.
    fn remove_row(&self, notion_id: &NotionId) -> Result<(), NotionStoreError>;

    fn drop_all(&self) -> Result<(), NotionStoreError>;

    fn load_all_saved_notion_ids(&self) -> Result<Vec<NotionId>, NotionStoreError>;

    fn link(&self, ref_id: EntityId, notion_id: &NotionId) -> Result<(), NotionStoreError>;
}

/// Leaf rows of one trunk.
pub struct TrunkLeaves<'a, M: ?Sized> {
    manager: &'a M,
    trunk_ref_id: EntityId,
}

impl<'a, M: ?Sized> TrunkLeaves<'a, M> {
    pub fn new(manager: &'a M, trunk_ref_id: EntityId) -> Self {
        Self {
            manager,
            trunk_ref_id,
        }
    }
}

impl<'a, N, M> RemoteLeafSet<N> for TrunkLeaves<'a, M>
where
    N: NotionLeaf,
    M: TrunkLeafNotionManager<N> + ?Sized,
{
    fn upsert(&self, row: N) -> Result<N, NotionStoreError> {
        self.manager.upsert_leaf(self.trunk_ref_id, row)
    }

    fn save(&self, row: N) -> Result<N, NotionStoreError> {
        self.manager.save_leaf(self.trunk_ref_id, row)
    }

    fn load_all(&self) -> Result<Vec<N>, NotionStoreError> {
        self.manager.load_all_leaves(self.trunk_ref_id)
    }

    fn remove(&self, ref_id: EntityId) -> Result<(), NotionStoreError> {
        self.manager.remove_leaf(self.trunk_ref_id, ref_id)
    }

    fn remove_row(&self, notion_id: &NotionId) -> Result<(), NotionStoreError> {
        self.manager
            .remove_leaf_by_notion_id(self.trunk_ref_id, notion_id)
    }

    fn drop_all(&self) -> Result<(), NotionStoreError> {
        self.manager.drop_all_leaves(self.trunk_ref_id)
    }

    fn load_all_saved_notion_ids(&self) -> Result<Vec<NotionId>, NotionStoreError> {
        self.manager.load_all_saved_notion_ids(self.trunk_ref_id)
    }

    fn link(&self, ref_id: EntityId, notion_id: &NotionId) -> Result<(), NotionStoreError> {
        self.manager
            .link_local_and_notion_leaves(self.trunk_ref_id, ref_id, notion_id)
    }
}

/// Leaf rows of one branch.
pub struct BranchLeaves<'a, M: ?Sized> {
    manager: &'a M,
    trunk_ref_id: EntityId,
    branch_ref_id: EntityId,
}

impl<'a, M: ?Sized> BranchLeaves<'a, M> {
    pub fn new(manager: &'a M, trunk_ref_id: EntityId, branch_ref_id: EntityId) -> Self {
        Self {
            manager,
            trunk_ref_id,
            branch_ref_id,
        }
    }
}

impl<'a, N, M> RemoteLeafSet<N> for BranchLeaves<'a, M>
where
    N: NotionLeaf,
    M: BranchLeafNotionManager<N> + ?Sized,
{
    fn upsert(&self, row: N) -> Result<N, NotionStoreError> {
        self.manager
            .upsert_leaf(self.trunk_ref_id, self.branch_ref_id, row)
    }

    fn save(&self, row: N) -> Result<N, NotionStoreError> {
        self.manager.save_leaf(self.trunk_ref_id, self.branch_ref_id, row)
    }

    fn load_all(&self) -> Result<Vec<N>, NotionStoreError> {
        self.manager
            .load_all_leaves(self.trunk_ref_id, self.branch_ref_id)
    }

    fn remove(&self, ref_id: EntityId) -> Result<(), NotionStoreError> {
        self.manager
            .remove_leaf(self.trunk_ref_id, self.branch_ref_id, ref_id)
    }

    fn remove_row(&self, notion_id: &NotionId) -> Result<(), NotionStoreError> {
        self.manager
            .remove_leaf_by_notion_id(self.trunk_ref_id, self.branch_ref_id, notion_id)
    }

    fn drop_all(&self) -> Result<(), NotionStoreError> {
        self.manager
            .drop_all_leaves(self.trunk_ref_id, self.branch_ref_id)
    }

    fn load_all_saved_notion_ids(&self) -> Result<Vec<NotionId>, NotionStoreError> {
        self.manager
            .load_all_saved_notion_ids(self.trunk_ref_id, self.branch_ref_id)
    }

    fn link(&self, ref_id: EntityId, notion_id: &NotionId) -> Result<(), NotionStoreError> {
        self.manager.link_local_and_notion_leaves(
            self.trunk_ref_id,
            self.branch_ref_id,
            ref_id,
            notion_id,
        )
    }
}

/// Tag options of one branch.
pub struct BranchTags<'a, M: ?Sized> {
    manager: &'a M,
    trunk_ref_id: EntityId,
    branch_ref_id: EntityId,
}

impl<'a, M: ?Sized> BranchTags<'a, M> {
    pub fn new(manager: &'a M, trunk_ref_id: EntityId, branch_ref_id: EntityId) -> Self {
        Self {
            manager,
            trunk_ref_id,
            branch_ref_id,
        }
    }
}

impl<'a, G, M> RemoteLeafSet<G> for BranchTags<'a, M>
where
    G: NotionLeaf,
    M: BranchTagNotionManager<G> + ?Sized,
{
    fn upsert(&self, row: G) -> Result<G, NotionStoreError> {
        self.manager
            .upsert_branch_tag(self.trunk_ref_id, self.branch_ref_id, row)
    }

    fn save(&self, row: G) -> Result<G, NotionStoreError> {
        self.manager
            .save_branch_tag(self.trunk_ref_id, self.branch_ref_id, row)
    }

    fn load_all(&self) -> Result<Vec<G>, NotionStoreError> {
        self.manager
            .load_all_branch_tags(self.trunk_ref_id, self.branch_ref_id)
    }

    fn remove(&self, ref_id: EntityId) -> Result<(), NotionStoreError> {
        self.manager
            .remove_branch_tag(self.trunk_ref_id, self.branch_ref_id, ref_id)
    }

    fn remove_row(&self, notion_id: &NotionId) -> Result<(), NotionStoreError> {
        self.manager
            .remove_branch_tag_by_notion_id(self.trunk_ref_id, self.branch_ref_id, notion_id)
    }

    fn drop_all(&self) -> Result<(), NotionStoreError> {
        self.manager
            .drop_all_branch_tags(self.trunk_ref_id, self.branch_ref_id)
    }

    fn load_all_saved_notion_ids(&self) -> Result<Vec<NotionId>, NotionStoreError> {
        self.manager
            .load_all_saved_branch_tag_notion_ids(self.trunk_ref_id, self.branch_ref_id)
    }

    fn link(&self, ref_id: EntityId, notion_id: &NotionId) -> Result<(), NotionStoreError> {
        self.manager.link_local_and_notion_branch_tags(
            self.trunk_ref_id,
            self.branch_ref_id,
            ref_id,
            notion_id,
        )
    }
}
