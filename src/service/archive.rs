// src/service/archive.rs
//! Archiving leaves, with the inbox task cascade for big plans and Slack
//! tasks.

use crate::algebras::{
    LeafRepository, RemoteLeafSet, TrunkLeafNotionManager, TrunkLeaves, TrunkRepository,
};
use crate::error::Result;
use crate::model::{
    BigPlan, BigPlanCollection, Entity, EventSource, InboxTask, InboxTaskCollection, LeafEntity,
    SlackTask, SlackTaskCollection, TrunkEntity,
};
use crate::notion::{NotionBigPlan, NotionInboxTask, NotionLeaf, NotionSlackTask};
use crate::output::ProgressReporter;
use crate::store::{LocalRepositories, NotionManagers};
use crate::sync::tolerate_missing;
use crate::types::{EntityId, TimeProvider};

/// Archives one leaf locally, then removes its remote row.
///
/// Already archived leaves are returned untouched.
pub fn archive_leaf<L, N, R>(
    local: &dyn LeafRepository<L>,
    remote: &R,
    leaf: L,
    time: &dyn TimeProvider,
    reporter: &mut ProgressReporter,
) -> Result<L>
where
    L: LeafEntity,
    N: NotionLeaf<Entity = L>,
    R: RemoteLeafSet<N> + ?Sized,
{
    let name = leaf.nice_name();
    let progress = reporter
        .start_archiving_entity(L::KIND, &name)
        .entity_id(leaf.ref_id());
    if leaf.archived() {
        progress.mark_not_needed();
        return Ok(leaf);
    }

    let leaf = local.save(leaf.mark_archived(EventSource::Cli, time.right_now()))?;
    progress.mark_local_change();

    let status = tolerate_missing(remote.remove(leaf.ref_id()), "remote remove", &name)?;
    progress.mark_other("remote remove", status);
    log::info!("Archived {} '{}'", L::KIND, name);
    Ok(leaf)
}

/// A leaf that inbox tasks can be generated from.
pub trait InboxTaskOwner: LeafEntity {
    fn owns(&self, task: &InboxTask) -> bool;
}

impl InboxTaskOwner for BigPlan {
    fn owns(&self, task: &InboxTask) -> bool {
        task.big_plan_ref_id == Some(self.ref_id())
    }
}

impl InboxTaskOwner for SlackTask {
    fn owns(&self, task: &InboxTask) -> bool {
        task.slack_task_ref_id == Some(self.ref_id())
    }
}

/// Archives an owner leaf after archiving every live inbox task it owns.
pub struct ArchiveWithInboxTasksService<'a, T, N>
where
    T: TrunkEntity,
    N: NotionLeaf,
{
    owner_trunks: &'a dyn TrunkRepository<T>,
    owners: &'a dyn LeafRepository<N::Entity>,
    owner_notion: &'a dyn TrunkLeafNotionManager<N>,
    inbox_task_collections: &'a dyn TrunkRepository<InboxTaskCollection>,
    inbox_tasks: &'a dyn LeafRepository<InboxTask>,
    inbox_task_notion: &'a dyn TrunkLeafNotionManager<NotionInboxTask>,
    time: &'a dyn TimeProvider,
}

impl<'a> ArchiveWithInboxTasksService<'a, BigPlanCollection, NotionBigPlan> {
    pub fn for_big_plans(
        local: LocalRepositories<'a>,
        notion: NotionManagers<'a>,
        time: &'a dyn TimeProvider,
    ) -> Self {
        Self {
            owner_trunks: local.big_plan_collections,
            owners: local.big_plans,
            owner_notion: notion.big_plans,
            inbox_task_collections: local.inbox_task_collections,
            inbox_tasks: local.inbox_tasks,
            inbox_task_notion: notion.inbox_tasks,
            time,
        }
    }
}

impl<'a> ArchiveWithInboxTasksService<'a, SlackTaskCollection, NotionSlackTask> {
    pub fn for_slack_tasks(
        local: LocalRepositories<'a>,
        notion: NotionManagers<'a>,
        time: &'a dyn TimeProvider,
    ) -> Self {
        Self {
            owner_trunks: local.slack_task_collections,
            owners: local.slack_tasks,
            owner_notion: notion.slack_tasks,
            inbox_task_collections: local.inbox_task_collections,
            inbox_tasks: local.inbox_tasks,
            inbox_task_notion: notion.inbox_tasks,
            time,
        }
    }
}

impl<'a, T, N> ArchiveWithInboxTasksService<'a, T, N>
where
    T: TrunkEntity,
    N: NotionLeaf,
    N::Entity: InboxTaskOwner,
{
    pub fn archive(
        &self,
        workspace_ref_id: EntityId,
        owner_ref_id: EntityId,
        reporter: &mut ProgressReporter,
    ) -> Result<N::Entity> {
        let owner = self.owners.load_by_id(owner_ref_id, true)?;
        if owner.archived() {
            reporter
                .start_archiving_entity(<N::Entity as Entity>::KIND, &owner.nice_name())
                .entity_id(owner_ref_id)
                .mark_not_needed();
            return Ok(owner);
        }

        let inbox_trunk = self.inbox_task_collections.load_by_parent(workspace_ref_id)?;
        let owned: Vec<InboxTask> = self
            .inbox_tasks
            .find_all(inbox_trunk.ref_id(), false, None)?
            .into_iter()
            .filter(|task| owner.owns(task))
            .collect();
        log::info!(
            "Archiving {} '{}' and {} inbox tasks",
            <N::Entity as Entity>::KIND,
            owner.nice_name(),
            owned.len()
        );

        let inbox_remote = TrunkLeaves::new(self.inbox_task_notion, inbox_trunk.ref_id());
        for task in owned {
            archive_leaf::<InboxTask, NotionInboxTask, _>(
                self.inbox_tasks,
                &inbox_remote,
                task,
                self.time,
                reporter,
            )?;
        }

        let owner_trunk = self.owner_trunks.load_by_parent(workspace_ref_id)?;
        archive_leaf::<N::Entity, N, _>(
            self.owners,
            &TrunkLeaves::new(self.owner_notion, owner_trunk.ref_id()),
            owner,
            self.time,
            reporter,
        )
    }
}
