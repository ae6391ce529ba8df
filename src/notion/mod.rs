//! Remote (Notion) projections of local entities.
//!
//! Each entity kind has one row type here. The row type is the only place
//! that knows how to turn a local entity into its remote shape and back;
//! the sync engine only sees the [`NotionLeaf`] and [`NotionBranch`]
//! traits.

mod big_plan;
mod inbox_task;
mod metric;
mod slack_task;
mod smart_list;
mod vacation;

pub use big_plan::NotionBigPlan;
pub use inbox_task::{InboxTaskDirectInfo, InboxTaskInverseInfo, NotionInboxTask};
pub use metric::{NotionMetric, NotionMetricEntry};
pub use slack_task::NotionSlackTask;
pub use smart_list::{NotionSmartList, NotionSmartListItem, NotionSmartListTag};
pub use vacation::NotionVacation;

use crate::model::{BranchEntity, LeafEntity};
use crate::types::{EntityId, NotionId, Timestamp, ValidationError};
use std::fmt;

/// A merged local entity plus whether the remote row is now stale and
/// should be rewritten from it.
#[derive(Debug, Clone, PartialEq)]
pub struct ApplyOutcome<E> {
    pub entity: E,
    pub should_modify_on_notion: bool,
}

impl<E> ApplyOutcome<E> {
    pub fn just(entity: E) -> Self {
        Self {
            entity,
            should_modify_on_notion: false,
        }
    }

    pub fn and_modify_on_notion(entity: E) -> Self {
        Self {
            entity,
            should_modify_on_notion: true,
        }
    }
}

/// Remote row mirroring a leaf entity.
///
/// `DirectInfo` is the extra context needed to render a local entity
/// remotely (e.g. big plan names), `InverseInfo` the context needed to read
/// a remote row back (e.g. tags by name).
pub trait NotionLeaf: Clone + fmt::Debug + Send + Sync + 'static {
    type Entity: LeafEntity;
    type DirectInfo;
    type InverseInfo;

    fn notion_id(&self) -> &NotionId;

    /// Local id, absent for rows authored directly in Notion.
    fn ref_id(&self) -> Option<EntityId>;

    fn archived(&self) -> bool;

    fn last_edited_time(&self) -> Timestamp;

    fn nice_name(&self) -> String;

    fn with_notion_id(self, notion_id: NotionId) -> Self;

    /// Fresh row for an entity that has no remote counterpart yet.
    fn new_notion_row(entity: &Self::Entity, info: &Self::DirectInfo) -> Self;

    /// This row rewritten from `entity`, keeping its remote identity.
    fn join_with_entity(&self, entity: &Self::Entity, info: &Self::DirectInfo) -> Self {
        Self::new_notion_row(entity, info).with_notion_id(self.notion_id().clone())
    }

    fn new_entity(
        &self,
        parent_ref_id: EntityId,
        info: &Self::InverseInfo,
    ) -> Result<Self::Entity, ValidationError>;

    fn apply_to_entity(
        &self,
        entity: Self::Entity,
        info: &Self::InverseInfo,
    ) -> Result<ApplyOutcome<Self::Entity>, ValidationError>;
}

/// Remote page heading a branch's own database.
pub trait NotionBranch: Clone + fmt::Debug + Send + Sync + 'static {
    type Entity: BranchEntity;

    fn notion_id(&self) -> &NotionId;

    fn ref_id(&self) -> EntityId;

    fn last_edited_time(&self) -> Timestamp;

    fn nice_name(&self) -> String;

    fn with_notion_id(self, notion_id: NotionId) -> Self;

    fn new_notion_row(entity: &Self::Entity) -> Self;

    fn join_with_entity(&self, entity: &Self::Entity) -> Self {
        Self::new_notion_row(entity).with_notion_id(self.notion_id().clone())
    }

    /// Merges the page into `entity`, stamped with the page's edit time so
    /// an untouched page leaves the version alone.
    fn apply_to_entity(&self, entity: Self::Entity) -> Result<Self::Entity, ValidationError>;
}

/// Accessors shared by every leaf row, which all carry the same four
/// bookkeeping fields.
macro_rules! leaf_row_accessors {
    () => {
        fn notion_id(&self) -> &$crate::types::NotionId {
            &self.notion_id
        }

        fn ref_id(&self) -> Option<$crate::types::EntityId> {
            self.ref_id
        }

        fn archived(&self) -> bool {
            self.archived
        }

        fn last_edited_time(&self) -> $crate::types::Timestamp {
            self.last_edited_time
        }

        fn with_notion_id(mut self, notion_id: $crate::types::NotionId) -> Self {
            self.notion_id = notion_id;
            self
        }
    };
}

pub(crate) use leaf_row_accessors;

/// Reads an optional free-text column, treating blank as absent.
pub(crate) fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
