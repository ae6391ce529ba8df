// tests/sync_vacation.rs
//! Vacations through the workspace orchestrator.

mod common;

use common::{at, name, World, WORKSPACE};
use jupiter_sync::algebras::LeafRepository;
use jupiter_sync::{
    ADate, AppError, Entity, EventSource, NotionId, NotionVacation, ProgressReporter,
    SyncOptions, SyncOrchestrator, SyncPrefer, SyncTarget, Vacation, WorkspaceSyncRequest,
    WorkspaceSyncSummary,
};
use pretty_assertions::assert_eq;

fn day(d: u32) -> ADate {
    ADate::from_ymd(2025, 8, d).unwrap()
}

fn sync_vacations(world: &World, prefer: SyncPrefer) -> Result<WorkspaceSyncSummary, AppError> {
    SyncOrchestrator::new(world.local.repositories(), world.notion.managers()).sync(
        WORKSPACE,
        &WorkspaceSyncRequest {
            targets: vec![SyncTarget::Vacations],
            options: SyncOptions::prefer(prefer),
            ..WorkspaceSyncRequest::default()
        },
        &mut ProgressReporter::new(),
    )
}

fn typed_vacation(start_date: Option<ADate>, end_date: Option<ADate>) -> NotionVacation {
    NotionVacation {
        notion_id: NotionId::unassigned(),
        ref_id: None,
        archived: false,
        last_edited_time: at(40),
        name: "Seaside".to_string(),
        start_date,
        end_date,
    }
}

#[test]
fn test_vacations_flow_both_ways() {
    let world = World::new();
    let hiking = world
        .local
        .vacations
        .create(
            Vacation::new_vacation(
                world.vacation_trunk(),
                name("Hiking"),
                day(1),
                day(5),
                EventSource::Cli,
                at(10),
            )
            .unwrap(),
        )
        .unwrap();
    world
        .notion
        .vacations
        .with_table(world.vacation_trunk(), |table| {
            table.insert_unlinked(typed_vacation(Some(day(20)), Some(day(27))))
        });

    let summary = sync_vacations(&world, SyncPrefer::Notion).unwrap();

    let counts = summary.for_target(SyncTarget::Vacations).unwrap();
    assert_eq!(counts.created_remotely, 1);
    assert_eq!(counts.created_locally, 1);
    assert_eq!(counts.reconciled, 2);
    assert_eq!(summary.targets.len(), 1);

    let local = world
        .local
        .vacations
        .find_all(world.vacation_trunk(), true, None)
        .unwrap();
    let seaside = local.iter().find(|v| v.name.as_str() == "Seaside").unwrap();
    assert_eq!((seaside.start_date, seaside.end_date), (day(20), day(27)));

    let pushed = world
        .notion
        .vacations
        .with_table(world.vacation_trunk(), |table| table.load(hiking.ref_id()))
        .unwrap();
    assert_eq!(pushed.start_date, Some(day(1)));
    assert_eq!(pushed.end_date, Some(day(5)));
}

#[test]
fn test_remote_row_with_an_empty_range_aborts_the_run() {
    let world = World::new();
    world
        .notion
        .vacations
        .with_table(world.vacation_trunk(), |table| {
            table.insert_unlinked(typed_vacation(Some(day(9)), Some(day(3))))
        });

    let err = sync_vacations(&world, SyncPrefer::Notion).unwrap_err();

    assert!(matches!(err, AppError::Validation(_)), "{err:?}");
    assert!(world
        .local
        .vacations
        .find_all(world.vacation_trunk(), true, None)
        .unwrap()
        .is_empty());
}
