//! In-memory remote store.
//!
//! Rows are kept exactly as written, the way the Notion API keeps page
//! properties. Fresh remote ids are random UUIDs. Missing rows answer with
//! the same not-found errors the real client produces.

use crate::algebras::{
    BranchLeafNotionManager, BranchNotionManager, BranchTagNotionManager, TrunkLeafNotionManager,
};
use crate::error::{NotionStoreError, RemoteKey};
use crate::model::Entity;
use crate::notion::{NotionBranch, NotionLeaf};
use crate::types::{EntityId, NotionId};
use indexmap::IndexMap;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

/// One remote database: its rows and the local ↔ remote link table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotionTable<N> {
    rows: IndexMap<NotionId, N>,
    links: IndexMap<EntityId, NotionId>,
    #[serde(skip)]
    link_log: Vec<(EntityId, NotionId)>,
}

impl<N> Default for NotionTable<N> {
    fn default() -> Self {
        Self {
            rows: IndexMap::new(),
            links: IndexMap::new(),
            link_log: Vec::new(),
        }
    }
}

impl<N: NotionLeaf> NotionTable<N> {
    fn kind() -> &'static str {
        <N::Entity as Entity>::KIND
    }

    /// Creates the row, or rewrites the row already linked to its ref id.
    pub fn upsert(&mut self, row: N) -> N {
        let linked = row
            .ref_id()
            .and_then(|ref_id| self.links.get(&ref_id))
            .filter(|notion_id| self.rows.contains_key(*notion_id))
            .cloned();
        let notion_id = linked.unwrap_or_else(NotionId::new_v4);
        let row = row.with_notion_id(notion_id.clone());
        if let Some(ref_id) = row.ref_id() {
            self.links.insert(ref_id, notion_id.clone());
        }
        self.rows.insert(notion_id, row.clone());
        row
    }

    /// Stores a row as-is without linking it, as if typed into Notion.
    pub fn insert_unlinked(&mut self, row: N) -> N {
        let row = if row.notion_id().is_unassigned() {
            row.with_notion_id(NotionId::new_v4())
        } else {
            row
        };
        self.rows.insert(row.notion_id().clone(), row.clone());
        row
    }

    pub fn save(&mut self, row: N) -> Result<N, NotionStoreError> {
        match self.rows.get_mut(row.notion_id()) {
            Some(slot) => {
                *slot = row.clone();
                Ok(row)
            }
            None => Err(NotionStoreError::not_found(
                Self::kind(),
                RemoteKey::Notion(row.notion_id().clone()),
            )),
        }
    }

    pub fn load(&self, ref_id: EntityId) -> Result<N, NotionStoreError> {
        self.links
            .get(&ref_id)
            .and_then(|notion_id| self.rows.get(notion_id))
            .cloned()
            .ok_or_else(|| NotionStoreError::not_found(Self::kind(), RemoteKey::Ref(ref_id)))
    }

    pub fn load_all(&self) -> Vec<N> {
        self.rows.values().cloned().collect()
    }

    /// Removes every row carrying `ref_id`, plus its link.
    pub fn remove(&mut self, ref_id: EntityId) -> Result<(), NotionStoreError> {
        let doomed: Vec<NotionId> = self
            .rows
            .iter()
            .filter(|(_, row)| row.ref_id() == Some(ref_id))
            .map(|(notion_id, _)| notion_id.clone())
            .collect();
        let unlinked = self.links.shift_remove(&ref_id);
        if doomed.is_empty() {
            return Err(NotionStoreError::not_found(
                Self::kind(),
                unlinked.map_or(RemoteKey::Ref(ref_id), RemoteKey::Notion),
            ));
        }
        for notion_id in doomed {
            self.rows.shift_remove(&notion_id);
        }
        Ok(())
    }

    /// Removes one row and any link pointing at it.
    pub fn remove_row(&mut self, notion_id: &NotionId) -> Result<(), NotionStoreError> {
        if self.rows.shift_remove(notion_id).is_none() {
            return Err(NotionStoreError::not_found(
                Self::kind(),
                RemoteKey::Notion(notion_id.clone()),
            ));
        }
        self.links.retain(|_, linked| linked != notion_id);
        Ok(())
    }

    pub fn drop_all(&mut self) {
        self.rows.clear();
        self.links.clear();
    }

    pub fn saved_notion_ids(&self) -> Vec<NotionId> {
        self.links.values().cloned().collect()
    }

    pub fn link(&mut self, ref_id: EntityId, notion_id: &NotionId) -> Result<(), NotionStoreError> {
        if !self.rows.contains_key(notion_id) {
            return Err(NotionStoreError::not_found(
                Self::kind(),
                RemoteKey::Notion(notion_id.clone()),
            ));
        }
        self.links.insert(ref_id, notion_id.clone());
        self.link_log.push((ref_id, notion_id.clone()));
        Ok(())
    }

    /// Every explicit link call made against this table since it was loaded.
    pub fn link_log(&self) -> &[(EntityId, NotionId)] {
        &self.link_log
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Remote rows of trunk-level leaves, one table per trunk.
#[derive(Debug)]
pub struct InMemoryTrunkLeafNotionManager<N> {
    tables: Mutex<IndexMap<EntityId, NotionTable<N>>>,
}

impl<N> Default for InMemoryTrunkLeafNotionManager<N> {
    fn default() -> Self {
        Self {
            tables: Mutex::new(IndexMap::new()),
        }
    }
}

impl<N: NotionLeaf> InMemoryTrunkLeafNotionManager<N> {
    pub fn snapshot(&self) -> IndexMap<EntityId, NotionTable<N>> {
        self.tables.lock().clone()
    }

    pub fn from_snapshot(tables: IndexMap<EntityId, NotionTable<N>>) -> Self {
        Self {
            tables: Mutex::new(tables),
        }
    }

    /// Runs `f` against the table of one trunk, creating it if needed.
    pub fn with_table<R>(
        &self,
        trunk_ref_id: EntityId,
        f: impl FnOnce(&mut NotionTable<N>) -> R,
    ) -> R {
        let mut tables = self.tables.lock();
        f(tables.entry(trunk_ref_id).or_default())
    }
}

impl<N: NotionLeaf> TrunkLeafNotionManager<N> for InMemoryTrunkLeafNotionManager<N> {
    fn upsert_leaf(&self, trunk_ref_id: EntityId, leaf: N) -> Result<N, NotionStoreError> {
        Ok(self.with_table(trunk_ref_id, |t| t.upsert(leaf)))
    }

    fn save_leaf(&self, trunk_ref_id: EntityId, leaf: N) -> Result<N, NotionStoreError> {
        self.with_table(trunk_ref_id, |t| t.save(leaf))
    }

    fn load_leaf(
        &self,
        trunk_ref_id: EntityId,
        leaf_ref_id: EntityId,
    ) -> Result<N, NotionStoreError> {
        self.with_table(trunk_ref_id, |t| t.load(leaf_ref_id))
    }

    fn load_all_leaves(&self, trunk_ref_id: EntityId) -> Result<Vec<N>, NotionStoreError> {
        Ok(self.with_table(trunk_ref_id, |t| t.load_all()))
    }

    fn remove_leaf(
        &self,
        trunk_ref_id: EntityId,
        leaf_ref_id: EntityId,
    ) -> Result<(), NotionStoreError> {
        self.with_table(trunk_ref_id, |t| t.remove(leaf_ref_id))
    }

    fn remove_leaf_by_notion_id(
        &self,
        trunk_ref_id: EntityId,
        notion_id: &NotionId,
    ) -> Result<(), NotionStoreError> {
        self.with_table(trunk_ref_id, |t| t.remove_row(notion_id))
    }

    fn drop_all_leaves(&self, trunk_ref_id: EntityId) -> Result<(), NotionStoreError> {
        self.with_table(trunk_ref_id, |t| t.drop_all());
        Ok(())
    }

    fn load_all_saved_notion_ids(
        &self,
        trunk_ref_id: EntityId,
    ) -> Result<Vec<NotionId>, NotionStoreError> {
        Ok(self.with_table(trunk_ref_id, |t| t.saved_notion_ids()))
    }

    fn link_local_and_notion_leaves(
        &self,
        trunk_ref_id: EntityId,
        leaf_ref_id: EntityId,
        notion_id: &NotionId,
    ) -> Result<(), NotionStoreError> {
        self.with_table(trunk_ref_id, |t| t.link(leaf_ref_id, notion_id))
    }
}

/// Everything the remote side holds for one branch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BranchScope<B, N, G> {
    pub trunk_ref_id: EntityId,
    pub page: Option<B>,
    pub leaves: NotionTable<N>,
    pub tags: NotionTable<G>,
}

impl<B, N, G> BranchScope<B, N, G> {
    fn new(trunk_ref_id: EntityId) -> Self {
        Self {
            trunk_ref_id,
            page: None,
            leaves: NotionTable::default(),
            tags: NotionTable::default(),
        }
    }
}

/// Remote pages, rows and tag options of every branch of one kind, keyed
/// by branch id. Branch kinds without tags use `()` for `G`.
#[derive(Debug)]
pub struct InMemoryBranchNotionManager<B, N, G = ()> {
    scopes: Mutex<IndexMap<EntityId, BranchScope<B, N, G>>>,
}

impl<B, N, G> Default for InMemoryBranchNotionManager<B, N, G> {
    fn default() -> Self {
        Self {
            scopes: Mutex::new(IndexMap::new()),
        }
    }
}

impl<B: NotionBranch, N: NotionLeaf, G: Clone + Send> InMemoryBranchNotionManager<B, N, G> {
    pub fn snapshot(&self) -> IndexMap<EntityId, BranchScope<B, N, G>> {
        self.scopes.lock().clone()
    }

    pub fn from_snapshot(scopes: IndexMap<EntityId, BranchScope<B, N, G>>) -> Self {
        Self {
            scopes: Mutex::new(scopes),
        }
    }

    /// Runs `f` against the scope of one branch, creating it if needed.
    pub fn with_scope<R>(
        &self,
        trunk_ref_id: EntityId,
        branch_ref_id: EntityId,
        f: impl FnOnce(&mut BranchScope<B, N, G>) -> R,
    ) -> R {
        let mut scopes = self.scopes.lock();
        f(scopes
            .entry(branch_ref_id)
            .or_insert_with(|| BranchScope::new(trunk_ref_id)))
    }

    /// Runs `f` against an existing scope only. `None` when the branch has
    /// no remote state under that trunk.
    fn existing_scope<R>(
        &self,
        trunk_ref_id: EntityId,
        branch_ref_id: EntityId,
        f: impl FnOnce(&mut BranchScope<B, N, G>) -> R,
    ) -> Option<R> {
        let mut scopes = self.scopes.lock();
        scopes
            .get_mut(&branch_ref_id)
            .filter(|scope| scope.trunk_ref_id == trunk_ref_id)
            .map(f)
    }

    fn branch_not_found(branch_ref_id: EntityId) -> NotionStoreError {
        NotionStoreError::not_found(<B::Entity as Entity>::KIND, RemoteKey::Ref(branch_ref_id))
    }
}

impl<B, N, G> BranchNotionManager<B> for InMemoryBranchNotionManager<B, N, G>
where
    B: NotionBranch,
    N: NotionLeaf,
    G: Clone + Send + Sync,
{
    fn upsert_branch(&self, trunk_ref_id: EntityId, branch: B) -> Result<B, NotionStoreError> {
        let branch_ref_id = branch.ref_id();
        Ok(self.with_scope(trunk_ref_id, branch_ref_id, |scope| {
            let notion_id = scope
                .page
                .as_ref()
                .map(|page| page.notion_id().clone())
                .unwrap_or_else(NotionId::new_v4);
            let page = branch.with_notion_id(notion_id);
            scope.page = Some(page.clone());
            page
        }))
    }

    fn save_branch(&self, trunk_ref_id: EntityId, branch: B) -> Result<B, NotionStoreError> {
        let mut scopes = self.scopes.lock();
        match scopes
            .get_mut(&branch.ref_id())
            .filter(|scope| scope.trunk_ref_id == trunk_ref_id)
        {
            Some(BranchScope {
                page: Some(page), ..
            }) if page.notion_id() == branch.notion_id() => {
                *page = branch.clone();
                Ok(branch)
            }
            _ => Err(NotionStoreError::not_found(
                <B::Entity as Entity>::KIND,
                RemoteKey::Notion(branch.notion_id().clone()),
            )),
        }
    }

    fn load_branch(
        &self,
        trunk_ref_id: EntityId,
        branch_ref_id: EntityId,
    ) -> Result<B, NotionStoreError> {
        self.scopes
            .lock()
            .get(&branch_ref_id)
            .filter(|scope| scope.trunk_ref_id == trunk_ref_id)
            .and_then(|scope| scope.page.clone())
            .ok_or_else(|| Self::branch_not_found(branch_ref_id))
    }

    fn remove_branch(
        &self,
        trunk_ref_id: EntityId,
        branch_ref_id: EntityId,
    ) -> Result<(), NotionStoreError> {
        let mut scopes = self.scopes.lock();
        match scopes.get(&branch_ref_id) {
            Some(scope) if scope.trunk_ref_id == trunk_ref_id && scope.page.is_some() => {
                scopes.shift_remove(&branch_ref_id);
                Ok(())
            }
            _ => Err(Self::branch_not_found(branch_ref_id)),
        }
    }
}

impl<B, N, G> BranchLeafNotionManager<N> for InMemoryBranchNotionManager<B, N, G>
where
    B: NotionBranch,
    N: NotionLeaf,
    G: Clone + Send + Sync,
{
    fn upsert_leaf(
        &self,
        trunk_ref_id: EntityId,
        branch_ref_id: EntityId,
        leaf: N,
    ) -> Result<N, NotionStoreError> {
        Ok(self.with_scope(trunk_ref_id, branch_ref_id, |s| s.leaves.upsert(leaf)))
    }

    fn save_leaf(
        &self,
        trunk_ref_id: EntityId,
        branch_ref_id: EntityId,
        leaf: N,
    ) -> Result<N, NotionStoreError> {
        let missing = row_not_found::<N>(leaf.notion_id());
        self.existing_scope(trunk_ref_id, branch_ref_id, |s| s.leaves.save(leaf))
            .unwrap_or(Err(missing))
    }

    fn load_leaf(
        &self,
        trunk_ref_id: EntityId,
        branch_ref_id: EntityId,
        leaf_ref_id: EntityId,
    ) -> Result<N, NotionStoreError> {
        self.existing_scope(trunk_ref_id, branch_ref_id, |s| s.leaves.load(leaf_ref_id))
            .unwrap_or_else(|| Err(ref_not_found::<N>(leaf_ref_id)))
    }

    fn load_all_leaves(
        &self,
        trunk_ref_id: EntityId,
        branch_ref_id: EntityId,
    ) -> Result<Vec<N>, NotionStoreError> {
        Ok(self
            .existing_scope(trunk_ref_id, branch_ref_id, |s| s.leaves.load_all())
            .unwrap_or_default())
    }

    fn remove_leaf(
        &self,
        trunk_ref_id: EntityId,
        branch_ref_id: EntityId,
        leaf_ref_id: EntityId,
    ) -> Result<(), NotionStoreError> {
        self.existing_scope(trunk_ref_id, branch_ref_id, |s| s.leaves.remove(leaf_ref_id))
            .unwrap_or_else(|| Err(ref_not_found::<N>(leaf_ref_id)))
    }

    fn remove_leaf_by_notion_id(
        &self,
        trunk_ref_id: EntityId,
        branch_ref_id: EntityId,
        notion_id: &NotionId,
    ) -> Result<(), NotionStoreError> {
        self.existing_scope(trunk_ref_id, branch_ref_id, |s| s.leaves.remove_row(notion_id))
            .unwrap_or_else(|| Err(row_not_found::<N>(notion_id)))
    }

    fn drop_all_leaves(
        &self,
        trunk_ref_id: EntityId,
        branch_ref_id: EntityId,
    ) -> Result<(), NotionStoreError> {
        self.existing_scope(trunk_ref_id, branch_ref_id, |s| s.leaves.drop_all());
        Ok(())
    }

    fn load_all_saved_notion_ids(
        &self,
        trunk_ref_id: EntityId,
        branch_ref_id: EntityId,
    ) -> Result<Vec<NotionId>, NotionStoreError> {
        Ok(self
            .existing_scope(trunk_ref_id, branch_ref_id, |s| s.leaves.saved_notion_ids())
            .unwrap_or_default())
    }

    fn link_local_and_notion_leaves(
        &self,
        trunk_ref_id: EntityId,
        branch_ref_id: EntityId,
        leaf_ref_id: EntityId,
        notion_id: &NotionId,
    ) -> Result<(), NotionStoreError> {
        self.existing_scope(trunk_ref_id, branch_ref_id, |s| s.leaves.link(leaf_ref_id, notion_id))
            .unwrap_or_else(|| Err(row_not_found::<N>(notion_id)))
    }
}

impl<B, N, G> BranchTagNotionManager<G> for InMemoryBranchNotionManager<B, N, G>
where
    B: NotionBranch,
    N: NotionLeaf,
    G: NotionLeaf,
{
    fn upsert_branch_tag(
        &self,
        trunk_ref_id: EntityId,
        branch_ref_id: EntityId,
        tag: G,
    ) -> Result<G, NotionStoreError> {
        Ok(self.with_scope(trunk_ref_id, branch_ref_id, |s| s.tags.upsert(tag)))
    }

    fn save_branch_tag(
        &self,
        trunk_ref_id: EntityId,
        branch_ref_id: EntityId,
        tag: G,
    ) -> Result<G, NotionStoreError> {
        let missing = row_not_found::<G>(tag.notion_id());
        self.existing_scope(trunk_ref_id, branch_ref_id, |s| s.tags.save(tag))
            .unwrap_or(Err(missing))
    }

    fn load_all_branch_tags(
        &self,
        trunk_ref_id: EntityId,
        branch_ref_id: EntityId,
    ) -> Result<Vec<G>, NotionStoreError> {
        Ok(self
            .existing_scope(trunk_ref_id, branch_ref_id, |s| s.tags.load_all())
            .unwrap_or_default())
    }

    fn remove_branch_tag(
        &self,
        trunk_ref_id: EntityId,
        branch_ref_id: EntityId,
        tag_ref_id: EntityId,
    ) -> Result<(), NotionStoreError> {
        self.existing_scope(trunk_ref_id, branch_ref_id, |s| s.tags.remove(tag_ref_id))
            .unwrap_or_else(|| Err(ref_not_found::<G>(tag_ref_id)))
    }

    fn remove_branch_tag_by_notion_id(
        &self,
        trunk_ref_id: EntityId,
        branch_ref_id: EntityId,
        notion_id: &NotionId,
    ) -> Result<(), NotionStoreError> {
        self.existing_scope(trunk_ref_id, branch_ref_id, |s| s.tags.remove_row(notion_id))
            .unwrap_or_else(|| Err(row_not_found::<G>(notion_id)))
    }

    fn drop_all_branch_tags(
        &self,
        trunk_ref_id: EntityId,
        branch_ref_id: EntityId,
    ) -> Result<(), NotionStoreError> {
        self.existing_scope(trunk_ref_id, branch_ref_id, |s| s.tags.drop_all());
        Ok(())
    }

    fn load_all_saved_branch_tag_notion_ids(
        &self,
        trunk_ref_id: EntityId,
        branch_ref_id: EntityId,
    ) -> Result<Vec<NotionId>, NotionStoreError> {
        Ok(self
            .existing_scope(trunk_ref_id, branch_ref_id, |s| s.tags.saved_notion_ids())
            .unwrap_or_default())
    }

    fn link_local_and_notion_branch_tags(
        &self,
        trunk_ref_id: EntityId,
        branch_ref_id: EntityId,
        tag_ref_id: EntityId,
        notion_id: &NotionId,
    ) -> Result<(), NotionStoreError> {
        self.existing_scope(trunk_ref_id, branch_ref_id, |s| s.tags.link(tag_ref_id, notion_id))
            .unwrap_or_else(|| Err(row_not_found::<G>(notion_id)))
    }
}

fn ref_not_found<N: NotionLeaf>(ref_id: EntityId) -> NotionStoreError {
    NotionStoreError::not_found(<N::Entity as Entity>::KIND, RemoteKey::Ref(ref_id))
}

fn row_not_found<N: NotionLeaf>(notion_id: &NotionId) -> NotionStoreError {
    NotionStoreError::not_found(
        <N::Entity as Entity>::KIND,
        RemoteKey::Notion(notion_id.clone()),
    )
}
