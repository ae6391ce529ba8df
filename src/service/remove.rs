// src/service/remove.rs
//! Hard removal, bypassing archival.

use crate::algebras::{
    BranchLeaves, BranchTags, LeafRepository, RemoteLeafSet, TrunkLeafNotionManager, TrunkLeaves,
    TrunkRepository,
};
use crate::error::Result;
use crate::model::{Entity, LeafEntity, SmartList, TrunkEntity};
use crate::notion::{NotionLeaf, NotionSmartListItem, NotionSmartListTag};
use crate::output::ProgressReporter;
use crate::store::{LocalRepositories, NotionManagers};
use crate::sync::tolerate_missing;
use crate::types::{EntityId, EntityKey};

/// Deletes one leaf locally, then its remote row.
pub fn remove_leaf<L, N, R>(
    local: &dyn LeafRepository<L>,
    remote: &R,
    ref_id: EntityId,
    reporter: &mut ProgressReporter,
) -> Result<L>
where
    L: LeafEntity,
    N: NotionLeaf<Entity = L>,
    R: RemoteLeafSet<N> + ?Sized,
{
    let leaf = local.remove(ref_id)?;
    let name = leaf.nice_name();
    let progress = reporter
        .start_removing_entity(L::KIND, &name)
        .entity_id(ref_id)
        .mark_local_change();
    let status = tolerate_missing(remote.remove(ref_id), "remote remove", &name)?;
    progress.mark_other("remote remove", status);
    Ok(leaf)
}

/// Hard-removes leaves hanging directly off a trunk.
pub struct LeafRemoveService<'a, T, N>
where
    T: TrunkEntity,
    N: NotionLeaf,
{
    trunks: &'a dyn TrunkRepository<T>,
    leaves: &'a dyn LeafRepository<N::Entity>,
    notion: &'a dyn TrunkLeafNotionManager<N>,
}

impl<'a, T, N> LeafRemoveService<'a, T, N>
where
    T: TrunkEntity,
    N: NotionLeaf,
{
    pub fn new(
        trunks: &'a dyn TrunkRepository<T>,
        leaves: &'a dyn LeafRepository<N::Entity>,
        notion: &'a dyn TrunkLeafNotionManager<N>,
    ) -> Self {
        Self {
            trunks,
            leaves,
            notion,
        }
    }

    pub fn remove(
        &self,
        workspace_ref_id: EntityId,
        ref_id: EntityId,
        reporter: &mut ProgressReporter,
    ) -> Result<N::Entity> {
        let trunk = self.trunks.load_by_parent(workspace_ref_id)?;
        remove_leaf::<N::Entity, N, _>(
            self.leaves,
            &TrunkLeaves::new(self.notion, trunk.ref_id()),
            ref_id,
            reporter,
        )
    }
}

/// Hard-removes a smart list with its tags and items.
pub struct SmartListRemoveService<'a> {
    local: LocalRepositories<'a>,
    notion: NotionManagers<'a>,
}

impl<'a> SmartListRemoveService<'a> {
    pub fn new(local: LocalRepositories<'a>, notion: NotionManagers<'a>) -> Self {
        Self { local, notion }
    }

    pub fn remove(
        &self,
        workspace_ref_id: EntityId,
        key: &EntityKey,
        reporter: &mut ProgressReporter,
    ) -> Result<()> {
        let trunk = self.local.smart_list_collections.load_by_parent(workspace_ref_id)?;
        let smart_list = self.local.smart_lists.load_by_key(trunk.ref_id(), key)?;
        let list_ref_id = smart_list.ref_id();
        let manager = self.notion.smart_lists;

        let tags = BranchTags::new(manager, trunk.ref_id(), list_ref_id);
        for tag in self.local.smart_list_tags.find_all(list_ref_id, true, None)? {
            remove_leaf::<_, NotionSmartListTag, _>(
                self.local.smart_list_tags,
                &tags,
                tag.ref_id(),
                reporter,
            )?;
        }

        let items = BranchLeaves::new(manager, trunk.ref_id(), list_ref_id);
        for item in self.local.smart_list_items.find_all(list_ref_id, true, None)? {
            remove_leaf::<_, NotionSmartListItem, _>(
                self.local.smart_list_items,
                &items,
                item.ref_id(),
                reporter,
            )?;
        }

        self.local.smart_lists.remove(list_ref_id)?;
        let name = smart_list.nice_name();
        let progress = reporter
            .start_removing_entity(SmartList::KIND, &name)
            .entity_id(list_ref_id)
            .mark_local_change();

        manager.drop_all_branch_tags(trunk.ref_id(), list_ref_id)?;
        let status = tolerate_missing(
            manager.remove_branch(trunk.ref_id(), list_ref_id),
            "remote remove",
            &name,
        )?;
        progress.mark_other("remote remove", status);
        log::info!("Removed smart list '{}'", name);
        Ok(())
    }
}
