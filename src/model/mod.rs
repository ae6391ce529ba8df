//! Local domain model: the entity framework plus the concrete kinds that
//! take part in Notion sync.
//!
//! Entities are values. Every mutating method consumes the entity and
//! returns the next version, so a caller can never observe a half-applied
//! update.

mod big_plan;
mod collections;
pub mod event;
mod inbox_task;
mod metric;
mod slack_task;
mod smart_list;
mod update_action;
mod vacation;

pub use big_plan::{BigPlan, BigPlanStatus};
pub use collections::*;
pub use event::{Event, EventKind, EventSource, FieldChanges};
pub use inbox_task::{InboxTask, InboxTaskSource, InboxTaskStatus};
pub use metric::{Metric, MetricEntry};
pub use slack_task::SlackTask;
pub use smart_list::{SmartList, SmartListItem, SmartListTag};
pub use update_action::UpdateAction;
pub use vacation::Vacation;

use crate::types::{EntityId, EntityKey, TagName, Timestamp};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Version carried by an entity that has only been created.
pub const FIRST_VERSION: u32 = 0;

/// Identity, archival state and history shared by every entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityHeader {
    pub ref_id: EntityId,
    pub version: u32,
    pub archived: bool,
    pub created_time: Timestamp,
    pub last_modified_time: Timestamp,
    pub archived_time: Option<Timestamp>,
    pub events: Vec<Event>,
}

impl EntityHeader {
    pub fn new(source: EventSource, created_time: Timestamp, fields: FieldChanges) -> Self {
        Self {
            ref_id: EntityId::unassigned(),
            version: FIRST_VERSION,
            archived: false,
            created_time,
            last_modified_time: created_time,
            archived_time: None,
            events: vec![Event {
                kind: EventKind::Created,
                source,
                entity_version: FIRST_VERSION,
                timestamp: created_time,
                fields: fields.into_inner(),
            }],
        }
    }

    /// Whether a mutation at `at` from `source` produces a new version.
    ///
    /// Remote edits newer than the local copy always do, even when no field
    /// differs, so the local last-modified time catches up with the remote
    /// last-edited time.
    pub fn should_bump(&self, changes: &FieldChanges, source: EventSource, at: Timestamp) -> bool {
        !changes.is_empty() || (source == EventSource::Notion && self.last_modified_time < at)
    }

    /// Appends an update event if the version rule says so.
    pub fn record_update(&mut self, changes: FieldChanges, source: EventSource, at: Timestamp) {
        if self.should_bump(&changes, source, at) {
            self.push_event(EventKind::Updated, changes, source, at);
        }
    }

    fn push_event(
        &mut self,
        kind: EventKind,
        changes: FieldChanges,
        source: EventSource,
        at: Timestamp,
    ) {
        self.version += 1;
        self.last_modified_time = at;
        self.events.push(Event {
            kind,
            source,
            entity_version: self.version,
            timestamp: at,
            fields: changes.into_inner(),
        });
    }

    pub fn change_archived(&mut self, archived: bool, source: EventSource, at: Timestamp) {
        if self.archived == archived {
            return;
        }
        let mut changes = FieldChanges::new();
        changes.record("archived", &archived);
        self.archived = archived;
        if archived {
            self.archived_time = Some(at);
            self.push_event(EventKind::Archived, changes, source, at);
        } else {
            self.archived_time = None;
            self.push_event(EventKind::Restored, changes, source, at);
        }
    }
}

/// Behaviour common to every stored entity.
pub trait Entity: Clone + fmt::Debug + Send + Sync + 'static {
    /// Human-readable kind, used in logs and progress output.
    const KIND: &'static str;

    fn header(&self) -> &EntityHeader;

    fn header_mut(&mut self) -> &mut EntityHeader;

    fn nice_name(&self) -> String;

    fn ref_id(&self) -> EntityId {
        self.header().ref_id
    }

    fn archived(&self) -> bool {
        self.header().archived
    }

    fn version(&self) -> u32 {
        self.header().version
    }

    fn last_modified_time(&self) -> Timestamp {
        self.header().last_modified_time
    }

    fn assign_ref_id(mut self, ref_id: EntityId) -> Self {
        self.header_mut().ref_id = ref_id;
        self
    }

    fn mark_archived(mut self, source: EventSource, at: Timestamp) -> Self {
        self.header_mut().change_archived(true, source, at);
        self
    }

    fn change_archived(mut self, archived: bool, source: EventSource, at: Timestamp) -> Self {
        self.header_mut().change_archived(archived, source, at);
        self
    }
}

/// Singleton collection owned by a workspace.
pub trait TrunkEntity: Entity {
    fn workspace_ref_id(&self) -> EntityId;
}

/// Named sub-collection of a trunk with its own remote database.
pub trait BranchEntity: Entity {
    fn trunk_ref_id(&self) -> EntityId;

    fn key(&self) -> &EntityKey;
}

/// Unit of content living under a trunk or a branch.
pub trait LeafEntity: Entity {
    fn parent_ref_id(&self) -> EntityId;
}

/// Leaf-shaped label scoped to a branch.
pub trait BranchTagEntity: LeafEntity {
    fn tag_name(&self) -> &TagName;
}

/// Implements [`Entity`] for a struct with a `header` field.
macro_rules! impl_entity {
    ($ty:ty, $kind:literal, |$s:ident| $name:expr) => {
        impl $crate::model::Entity for $ty {
            const KIND: &'static str = $kind;

            fn header(&self) -> &$crate::model::EntityHeader {
                &self.header
            }

            fn header_mut(&mut self) -> &mut $crate::model::EntityHeader {
                &mut self.header
            }

            fn nice_name(&self) -> String {
                let $s = self;
                $name
            }
        }
    };
}

pub(crate) use impl_entity;

#[cfg(test)]
mod tests {
    use super::*;

    fn at(secs: i64) -> Timestamp {
        Timestamp::from_unix_secs(secs).unwrap()
    }

    #[test]
    fn new_header_starts_at_first_version() {
        let header = EntityHeader::new(EventSource::Cli, at(10), FieldChanges::new());
        assert_eq!(header.version, FIRST_VERSION);
        assert!(header.ref_id.is_unassigned());
        assert_eq!(header.events.len(), 1);
        assert_eq!(header.events[0].kind, EventKind::Created);
    }

    #[test]
    fn unchanged_cli_update_keeps_version() {
        let mut header = EntityHeader::new(EventSource::Cli, at(10), FieldChanges::new());
        header.record_update(FieldChanges::new(), EventSource::Cli, at(20));
        assert_eq!(header.version, 0);
        assert_eq!(header.last_modified_time, at(10));
    }

    #[test]
    fn newer_notion_update_bumps_even_without_changes() {
        let mut header = EntityHeader::new(EventSource::Cli, at(10), FieldChanges::new());
        header.record_update(FieldChanges::new(), EventSource::Notion, at(20));
        assert_eq!(header.version, 1);
        assert_eq!(header.last_modified_time, at(20));

        header.record_update(FieldChanges::new(), EventSource::Notion, at(15));
        assert_eq!(header.version, 1);
    }

    #[test]
    fn archive_and_restore_are_events() {
        let mut header = EntityHeader::new(EventSource::Cli, at(10), FieldChanges::new());
        header.change_archived(true, EventSource::Cli, at(11));
        header.change_archived(true, EventSource::Cli, at(12));
        assert_eq!(header.version, 1);
        assert_eq!(header.archived_time, Some(at(11)));

        header.change_archived(false, EventSource::Notion, at(13));
        assert!(!header.archived);
        assert_eq!(header.archived_time, None);
        let kinds: Vec<EventKind> = header.events.iter().map(|e| e.kind).collect();
        assert_eq!(
            kinds,
            vec![EventKind::Created, EventKind::Archived, EventKind::Restored]
        );
    }
}
