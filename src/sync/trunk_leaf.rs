//! Leaves that hang directly off a trunk: inbox tasks, big plans, Slack
//! tasks.

use super::{reconcile_leaves, SyncOptions, SyncResult};
use crate::algebras::{LeafRepository, TrunkLeafNotionManager, TrunkLeaves, TrunkRepository};
use crate::error::Result;
use crate::model::{Entity, LeafEntity, TrunkEntity};
use crate::notion::NotionLeaf;
use crate::output::ProgressReporter;
use crate::types::EntityId;

pub struct TrunkLeafSync<'a, T, N>
where
    T: TrunkEntity,
    N: NotionLeaf,
{
    trunks: &'a dyn TrunkRepository<T>,
    leaves: &'a dyn LeafRepository<N::Entity>,
    notion: &'a dyn TrunkLeafNotionManager<N>,
}

impl<'a, T, N> TrunkLeafSync<'a, T, N>
where
    T: TrunkEntity,
    N: NotionLeaf,
    N::Entity: LeafEntity,
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

    /// Syncs every leaf of the workspace's trunk.
    pub fn sync(
        &self,
        workspace_ref_id: EntityId,
        direct_info: &N::DirectInfo,
        inverse_info: &N::InverseInfo,
        options: &SyncOptions,
        reporter: &mut ProgressReporter,
    ) -> Result<SyncResult<N::Entity>> {
        let trunk = self.trunks.load_by_parent(workspace_ref_id)?;
        log::info!("Syncing {} of {}", <N::Entity as Entity>::KIND, trunk.nice_name());
        reconcile_leaves::<N::Entity, N, _>(
            self.leaves,
            &TrunkLeaves::new(self.notion, trunk.ref_id()),
            trunk.ref_id(),
            direct_info,
            inverse_info,
            options,
            reporter,
        )
    }
}
