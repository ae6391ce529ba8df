//! Trunk entities: one collection per workspace and entity kind.

use super::{Entity, EntityHeader, EventSource, FieldChanges, TrunkEntity};
use crate::types::{EntityId, Timestamp};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::marker::PhantomData;

/// Names a trunk kind at the type level.
pub trait CollectionKind: Clone + fmt::Debug + PartialEq + Send + Sync + 'static {
    const NAME: &'static str;
}

/// Singleton collection owning the leaves or branches of one kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Collection<K> {
    pub header: EntityHeader,
    pub workspace_ref_id: EntityId,
    #[serde(skip)]
    _kind: PhantomData<K>,
}

impl<K: CollectionKind> Collection<K> {
    pub fn new_collection(workspace_ref_id: EntityId, source: EventSource, at: Timestamp) -> Self {
        let mut fields = FieldChanges::new();
        fields.record("workspace_ref_id", &workspace_ref_id);
        Self {
            header: EntityHeader::new(source, at, fields),
            workspace_ref_id,
            _kind: PhantomData,
        }
    }
}

impl<K: CollectionKind> Entity for Collection<K> {
    const KIND: &'static str = K::NAME;

    fn header(&self) -> &EntityHeader {
        &self.header
    }

    fn header_mut(&mut self) -> &mut EntityHeader {
        &mut self.header
    }

    fn nice_name(&self) -> String {
        format!("{} for workspace {}", K::NAME, self.workspace_ref_id)
    }
}

impl<K: CollectionKind> TrunkEntity for Collection<K> {
    fn workspace_ref_id(&self) -> EntityId {
        self.workspace_ref_id
    }
}

macro_rules! collection_kind {
    ($marker:ident, $alias:ident, $name:literal) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub struct $marker;

        impl CollectionKind for $marker {
            const NAME: &'static str = $name;
        }

        pub type $alias = Collection<$marker>;
    };
}

collection_kind!(InboxTasks, InboxTaskCollection, "inbox task collection");
collection_kind!(BigPlans, BigPlanCollection, "big plan collection");
collection_kind!(SlackTasks, SlackTaskCollection, "slack task collection");
collection_kind!(Metrics, MetricCollection, "metric collection");
collection_kind!(SmartLists, SmartListCollection, "smart list collection");
collection_kind!(Vacations, VacationCollection, "vacation collection");
