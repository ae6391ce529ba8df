// tests/sync_leaf.rs
//! Leaf-only reconciliation against the in-memory stores.

mod common;

use common::{at, name, typed_in_notion, World};
use jupiter_sync::algebras::{LeafRepository, TrunkLeafNotionManager};
use jupiter_sync::{
    BigPlan, BigPlanStatus, Entity, EventSource, NotionId, NotionLeaf, NotionStoreError,
    ProgressReporter, SyncOptions, SyncPrefer, UpdateAction,
};
use pretty_assertions::assert_eq;

fn rename_locally(world: &World, plan: BigPlan, new_name: &str, secs: i64) -> BigPlan {
    world
        .local
        .big_plans
        .save(plan.update(
            UpdateAction::change_to(name(new_name)),
            UpdateAction::DoNothing,
            UpdateAction::DoNothing,
            EventSource::Cli,
            at(secs),
        ))
        .expect("save")
}

fn rename_remotely(world: &World, plan: &BigPlan, new_name: &str, secs: i64) {
    world
        .big_plan_rows(|table| {
            let mut row = table.load(plan.ref_id())?;
            row.name = new_name.to_string();
            row.last_edited_time = at(secs);
            table.save(row)
        })
        .expect("remote edit");
}

#[test]
fn test_local_leaf_is_pushed_to_an_empty_remote() {
    let world = World::new();
    let plan = world.add_big_plan("Buy milk", 100);
    let mut reporter = ProgressReporter::new();

    let result = world.sync_big_plans(&SyncOptions::prefer(SyncPrefer::Notion), &mut reporter);

    assert_eq!(result.created_remotely, vec![plan.ref_id()]);
    assert!(result.created_locally.is_empty());
    assert!(result.modified_locally.is_empty());
    assert!(result.modified_remotely.is_empty());
    assert!(result.removed_remotely.is_empty());

    let rows = world.big_plan_rows(|table| table.load_all());
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].ref_id, Some(plan.ref_id()));
    assert_eq!(rows[0].name, "Buy milk");

    let linked = world
        .notion
        .big_plans
        .load_all_saved_notion_ids(world.big_plan_trunk())
        .unwrap();
    assert_eq!(linked, vec![rows[0].notion_id.clone()]);
}

#[test]
fn test_second_sync_without_changes_modifies_nothing() {
    let world = World::new();
    world.add_big_plan("Buy milk", 100);
    world.big_plan_rows(|table| {
        table.insert_unlinked(typed_in_notion("Paint shed", None, 150))
    });

    for prefer in [SyncPrefer::Notion, SyncPrefer::Local] {
        let options = SyncOptions::prefer(prefer);
        world.sync_big_plans(&options, &mut ProgressReporter::new());

        let mut reporter = ProgressReporter::new();
        let second = world.sync_big_plans(&options, &mut reporter);

        assert!(!second.has_a_local_change(), "{prefer}: {second:?}");
        assert!(!second.has_a_remote_change(), "{prefer}: {second:?}");
        assert_eq!(second.all.len(), 2);
        assert_eq!(reporter.stats().not_needed, 2);
    }
}

#[test]
fn test_row_without_ref_id_becomes_a_linked_local_leaf() {
    let world = World::new();
    let row = world.big_plan_rows(|table| {
        table.insert_unlinked(typed_in_notion("Paint shed", None, 150))
    });

    let result = world.sync_big_plans(&SyncOptions::default(), &mut ProgressReporter::new());

    assert_eq!(result.created_locally.len(), 1);
    let new_id = result.created_locally[0];
    let plan = world.big_plan(new_id);
    assert_eq!(plan.name.as_str(), "Paint shed");
    assert_eq!(plan.status, BigPlanStatus::InProgress);

    let synced = world.big_plan_rows(|table| table.load(new_id)).unwrap();
    assert_eq!(synced.notion_id, row.notion_id);
    assert_eq!(synced.ref_id, Some(new_id));
    assert_eq!(
        world.big_plan_rows(|table| table.link_log().to_vec()),
        vec![(new_id, row.notion_id.clone())]
    );
}

#[test]
fn test_row_pointing_at_a_missing_leaf_is_removed() {
    let world = World::new();
    let ghost = jupiter_sync::EntityId::new(42);
    world.big_plan_rows(|table| {
        table.insert_unlinked(typed_in_notion("Ghost", Some(ghost), 10))
    });

    let result = world.sync_big_plans(&SyncOptions::default(), &mut ProgressReporter::new());

    assert_eq!(result.removed_remotely, vec![ghost]);
    assert!(world.big_plan_rows(|table| table.is_empty()));
}

#[test]
fn test_unlinked_copy_of_a_live_leaf_is_treated_as_orphan() {
    let world = World::new();
    let plan = world.add_big_plan("New Title", 200);
    let stale = world.big_plan_rows(|table| {
        table.insert_unlinked(typed_in_notion("Old Title", Some(plan.ref_id()), 50))
    });

    let result = world.sync_big_plans(
        &SyncOptions::prefer(SyncPrefer::Notion),
        &mut ProgressReporter::new(),
    );

    assert_eq!(result.removed_remotely, vec![plan.ref_id()]);
    let rows = world.big_plan_rows(|table| table.load_all());
    assert!(rows.iter().all(|row| row.notion_id != stale.notion_id));
    assert_eq!(world.big_plan(plan.ref_id()).name.as_str(), "New Title");
}

#[test]
fn test_copy_of_a_linked_row_is_removed_without_touching_the_original() {
    let world = World::new();
    let plan = world.add_big_plan("Keep me", 100);
    world.sync_big_plans(&SyncOptions::default(), &mut ProgressReporter::new());
    let original = world
        .big_plan_rows(|table| table.load(plan.ref_id()))
        .unwrap();
    let copy = world.big_plan_rows(|table| {
        table.insert_unlinked(typed_in_notion("Keep me", Some(plan.ref_id()), 50))
    });

    let result = world.sync_big_plans(&SyncOptions::default(), &mut ProgressReporter::new());

    assert_eq!(result.removed_remotely, vec![plan.ref_id()]);
    assert!(result.created_remotely.is_empty());
    assert_eq!(result.all.len(), 1);
    let rows = world.big_plan_rows(|table| table.load_all());
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].notion_id, original.notion_id);
    assert_ne!(rows[0].notion_id, copy.notion_id);
    assert_eq!(
        world.big_plan_rows(|table| table.load(plan.ref_id())).unwrap(),
        original
    );

    let again = world.sync_big_plans(&SyncOptions::default(), &mut ProgressReporter::new());
    assert!(!again.has_a_remote_change(), "{again:?}");
}

#[test]
fn test_prefer_local_pushes_newer_local_state() {
    let world = World::new();
    let plan = world.add_big_plan("Draft", 100);
    world.sync_big_plans(&SyncOptions::default(), &mut ProgressReporter::new());
    rename_remotely(&world, &plan, "Remote", 200);
    let plan = rename_locally(&world, world.big_plan(plan.ref_id()), "Local", 300);

    let result = world.sync_big_plans(
        &SyncOptions::prefer(SyncPrefer::Local),
        &mut ProgressReporter::new(),
    );

    assert_eq!(result.modified_remotely, vec![plan.ref_id()]);
    assert!(result.modified_locally.is_empty());
    let row = world.big_plan_rows(|table| table.load(plan.ref_id())).unwrap();
    assert_eq!(row.name, "Local");
    assert_eq!(row.last_edited_time, at(300));
    assert_eq!(world.big_plan(plan.ref_id()), plan);
}

#[test]
fn test_prefer_notion_pulls_newer_remote_state() {
    let world = World::new();
    let plan = world.add_big_plan("Draft", 100);
    world.sync_big_plans(&SyncOptions::default(), &mut ProgressReporter::new());
    rename_remotely(&world, &plan, "Remote", 200);

    let result = world.sync_big_plans(
        &SyncOptions::prefer(SyncPrefer::Notion),
        &mut ProgressReporter::new(),
    );

    assert_eq!(result.modified_locally, vec![plan.ref_id()]);
    let pulled = world.big_plan(plan.ref_id());
    assert_eq!(pulled.name.as_str(), "Remote");
    assert_eq!(pulled.version(), plan.version() + 1);
    assert_eq!(pulled.last_modified_time(), at(200));
}

#[test]
fn test_older_side_does_not_win_without_force() {
    let world = World::new();
    let plan = world.add_big_plan("Draft", 100);
    world.sync_big_plans(&SyncOptions::default(), &mut ProgressReporter::new());
    rename_remotely(&world, &plan, "Remote", 50);

    let mut reporter = ProgressReporter::new();
    let result = world.sync_big_plans(&SyncOptions::prefer(SyncPrefer::Notion), &mut reporter);
    assert!(!result.has_a_local_change());
    assert_eq!(world.big_plan(plan.ref_id()).name.as_str(), "Draft");

    let forced = world.sync_big_plans(
        &SyncOptions::prefer(SyncPrefer::Notion).forced(),
        &mut ProgressReporter::new(),
    );
    assert_eq!(forced.modified_locally, vec![plan.ref_id()]);
    assert_eq!(world.big_plan(plan.ref_id()).name.as_str(), "Remote");
}

#[test]
fn test_archived_leaf_without_row_is_never_pushed() {
    let world = World::new();
    let plan = world.add_big_plan("Old plan", 100);
    world
        .local
        .big_plans
        .save(plan.mark_archived(EventSource::Cli, at(120)))
        .unwrap();

    let result = world.sync_big_plans(&SyncOptions::default(), &mut ProgressReporter::new());

    assert!(result.created_remotely.is_empty());
    assert!(world.big_plan_rows(|table| table.is_empty()));
    assert_eq!(result.all.len(), 1);
    assert!(result.all[0].archived());
}

#[test]
fn test_drop_all_rebuilds_the_remote_side() {
    let world = World::new();
    let plan = world.add_big_plan("Keep", 100);
    world.sync_big_plans(&SyncOptions::default(), &mut ProgressReporter::new());
    world.big_plan_rows(|table| table.insert_unlinked(typed_in_notion("Stray", None, 10)));

    let result = world.sync_big_plans(
        &SyncOptions::default().dropping_notion_side(),
        &mut ProgressReporter::new(),
    );

    assert_eq!(result.created_remotely, vec![plan.ref_id()]);
    assert!(result.created_locally.is_empty());
    let rows = world.big_plan_rows(|table| table.load_all());
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].name, "Keep");
}

#[test]
fn test_filter_limits_the_run_to_selected_leaves() {
    let world = World::new();
    let wanted = world.add_big_plan("Wanted", 100);
    world.add_big_plan("Ignored", 100);
    world.big_plan_rows(|table| table.insert_unlinked(typed_in_notion("Unlinked", None, 10)));

    let result = world.sync_big_plans(
        &SyncOptions::default().only([wanted.ref_id()]),
        &mut ProgressReporter::new(),
    );

    assert_eq!(result.created_remotely, vec![wanted.ref_id()]);
    assert!(result.created_locally.is_empty());
    assert_eq!(world.big_plan_rows(|table| table.len()), 2);
}

#[test]
fn test_remote_rows_round_trip_through_the_manager() {
    let world = World::new();
    let plan = world.add_big_plan("Round trip", 100);
    let trunk = world.big_plan_trunk();

    let row = world
        .notion
        .big_plans
        .upsert_leaf(trunk, jupiter_sync::NotionBigPlan::new_notion_row(&plan, &()))
        .unwrap();
    assert!(!row.notion_id.is_unassigned());
    assert_eq!(world.notion.big_plans.load_leaf(trunk, plan.ref_id()).unwrap(), row);

    world.notion.big_plans.remove_leaf(trunk, plan.ref_id()).unwrap();
    let err = world.notion.big_plans.remove_leaf(trunk, plan.ref_id()).unwrap_err();
    assert!(err.is_not_found());

    let kept = world
        .notion
        .big_plans
        .upsert_leaf(trunk, jupiter_sync::NotionBigPlan::new_notion_row(&plan, &()))
        .unwrap();
    let copy = world.big_plan_rows(|table| table.insert_unlinked(row.clone()));
    world
        .notion
        .big_plans
        .remove_leaf_by_notion_id(trunk, &copy.notion_id)
        .unwrap();
    assert_eq!(world.notion.big_plans.load_leaf(trunk, plan.ref_id()).unwrap(), kept);
    assert!(world
        .notion
        .big_plans
        .remove_leaf_by_notion_id(trunk, &copy.notion_id)
        .unwrap_err()
        .is_not_found());

    let missing = jupiter_sync::NotionBigPlan {
        notion_id: NotionId::new_v4(),
        ..row
    };
    assert!(matches!(
        world.notion.big_plans.save_leaf(trunk, missing),
        Err(NotionStoreError::EntityNotFound { .. })
    ));
}
