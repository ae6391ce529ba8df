// tests/sync_failures.rs
//! How a sync behaves when the remote side misbehaves part-way.

mod common;

use common::{typed_in_notion, World, WORKSPACE};
use jupiter_sync::algebras::{LeafRepository, TrunkLeafNotionManager};
use jupiter_sync::output::MarkStatus;
use jupiter_sync::store::InMemoryTrunkLeafNotionManager;
use jupiter_sync::{
    AppError, BigPlan, EntityId, NotionBigPlan, NotionId, NotionStoreError, ProgressReporter,
    RemoteKey, SyncOptions, SyncResult, TrunkLeafSync,
};
use pretty_assertions::assert_eq;

/// Delegates to the in-memory store but fails every row removal with the
/// given error.
struct FailingRemovals<'a> {
    inner: &'a InMemoryTrunkLeafNotionManager<NotionBigPlan>,
    error: fn(&NotionId) -> NotionStoreError,
}

impl TrunkLeafNotionManager<NotionBigPlan> for FailingRemovals<'_> {
    fn upsert_leaf(
        &self,
        trunk_ref_id: EntityId,
        leaf: NotionBigPlan,
    ) -> Result<NotionBigPlan, NotionStoreError> {
        self.inner.upsert_leaf(trunk_ref_id, leaf)
    }

    fn save_leaf(
        &self,
        trunk_ref_id: EntityId,
        leaf: NotionBigPlan,
    ) -> Result<NotionBigPlan, NotionStoreError> {
        self.inner.save_leaf(trunk_ref_id, leaf)
    }

    fn load_leaf(
        &self,
        trunk_ref_id: EntityId,
        leaf_ref_id: EntityId,
    ) -> Result<NotionBigPlan, NotionStoreError> {
        self.inner.load_leaf(trunk_ref_id, leaf_ref_id)
    }

    fn load_all_leaves(
        &self,
        trunk_ref_id: EntityId,
    ) -> Result<Vec<NotionBigPlan>, NotionStoreError> {
        self.inner.load_all_leaves(trunk_ref_id)
    }

    fn remove_leaf(
        &self,
        trunk_ref_id: EntityId,
        leaf_ref_id: EntityId,
    ) -> Result<(), NotionStoreError> {
        self.inner.remove_leaf(trunk_ref_id, leaf_ref_id)
    }

    fn remove_leaf_by_notion_id(
        &self,
        _trunk_ref_id: EntityId,
        notion_id: &NotionId,
    ) -> Result<(), NotionStoreError> {
        Err((self.error)(notion_id))
    }

    fn drop_all_leaves(&self, trunk_ref_id: EntityId) -> Result<(), NotionStoreError> {
        self.inner.drop_all_leaves(trunk_ref_id)
    }

    fn load_all_saved_notion_ids(
        &self,
        trunk_ref_id: EntityId,
    ) -> Result<Vec<NotionId>, NotionStoreError> {
        self.inner.load_all_saved_notion_ids(trunk_ref_id)
    }

    fn link_local_and_notion_leaves(
        &self,
        trunk_ref_id: EntityId,
        leaf_ref_id: EntityId,
        notion_id: &NotionId,
    ) -> Result<(), NotionStoreError> {
        self.inner
            .link_local_and_notion_leaves(trunk_ref_id, leaf_ref_id, notion_id)
    }
}

fn seed_new_row_then_orphans(world: &World) {
    world.big_plan_rows(|table| {
        table.insert_unlinked(typed_in_notion("Fresh", None, 10));
        table.insert_unlinked(typed_in_notion("Ghost", Some(EntityId::new(40)), 10));
        table.insert_unlinked(typed_in_notion("Phantom", Some(EntityId::new(41)), 10));
    });
}

fn sync_with(
    world: &World,
    notion: &FailingRemovals<'_>,
    reporter: &mut ProgressReporter,
) -> Result<SyncResult<BigPlan>, AppError> {
    let local = world.local.repositories();
    let notion: &dyn TrunkLeafNotionManager<NotionBigPlan> = notion;
    TrunkLeafSync::new(local.big_plan_collections, local.big_plans, notion).sync(
        WORKSPACE,
        &(),
        &(),
        &SyncOptions::default(),
        reporter,
    )
}

#[test]
fn test_missing_remote_row_is_recorded_and_the_run_continues() {
    let world = World::new();
    seed_new_row_then_orphans(&world);
    let notion = FailingRemovals {
        inner: &world.notion.big_plans,
        error: |notion_id| {
            NotionStoreError::not_found("big plan", RemoteKey::Notion(notion_id.clone()))
        },
    };
    let mut reporter = ProgressReporter::new();

    let result = sync_with(&world, &notion, &mut reporter).expect("not-found is tolerated");

    assert_eq!(result.created_locally.len(), 1);
    assert_eq!(
        result.removed_remotely,
        vec![EntityId::new(40), EntityId::new(41)]
    );
    let failed: Vec<&str> = reporter.failures().map(|e| e.name.as_str()).collect();
    assert_eq!(failed, vec!["Ghost", "Phantom"]);
    assert!(reporter
        .failures()
        .all(|e| e.marks.iter().any(|m| m.status == MarkStatus::Failed)));
}

#[test]
fn test_other_remote_errors_abort_but_keep_local_writes() {
    let world = World::new();
    seed_new_row_then_orphans(&world);
    let notion = FailingRemovals {
        inner: &world.notion.big_plans,
        error: |_| NotionStoreError::Transport {
            message: "connection reset".to_string(),
        },
    };
    let mut reporter = ProgressReporter::new();

    let err = sync_with(&world, &notion, &mut reporter).unwrap_err();
    assert!(matches!(err, AppError::Notion(NotionStoreError::Transport { .. })));

    let kept = world
        .local
        .big_plans
        .find_all(world.big_plan_trunk(), true, None)
        .unwrap();
    assert_eq!(kept.len(), 1);
    assert_eq!(kept[0].name.as_str(), "Fresh");
    assert_eq!(reporter.entities().len(), 2);
}

#[test]
fn test_rerun_after_an_abort_converges() {
    let world = World::new();
    seed_new_row_then_orphans(&world);
    let broken = FailingRemovals {
        inner: &world.notion.big_plans,
        error: |_| NotionStoreError::Transport {
            message: "timeout".to_string(),
        },
    };
    assert!(sync_with(&world, &broken, &mut ProgressReporter::new()).is_err());

    let result = world.sync_big_plans(&SyncOptions::default(), &mut ProgressReporter::new());

    assert!(result.created_locally.is_empty());
    assert_eq!(result.removed_remotely, vec![EntityId::new(40), EntityId::new(41)]);
    assert_eq!(world.big_plan_rows(|table| table.len()), 1);
}
