use super::{
    impl_entity, BranchEntity, EntityHeader, EventSource, FieldChanges, LeafEntity, UpdateAction,
};
use crate::types::{ADate, EntityId, EntityKey, EntityName, Timestamp};
use serde::{Deserialize, Serialize};

/// A tracked quantity (weight, reading time, ...) whose entries live in
/// their own remote database.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metric {
    pub header: EntityHeader,
    pub metric_collection_ref_id: EntityId,
    pub key: EntityKey,
    pub name: EntityName,
    pub icon: Option<String>,
}

impl_entity!(Metric, "metric", |metric| metric.name.to_string());

impl BranchEntity for Metric {
    fn trunk_ref_id(&self) -> EntityId {
        self.metric_collection_ref_id
    }

    fn key(&self) -> &EntityKey {
        &self.key
    }
}

impl Metric {
    pub fn new_metric(
        metric_collection_ref_id: EntityId,
        key: EntityKey,
        name: EntityName,
        icon: Option<String>,
        source: EventSource,
        created_time: Timestamp,
    ) -> Self {
        let mut fields = FieldChanges::new();
        fields.record("key", &key);
        fields.record("name", &name);
        fields.record("icon", &icon);
        Self {
            header: EntityHeader::new(source, created_time, fields),
            metric_collection_ref_id,
            key,
            name,
            icon,
        }
    }

    pub fn update(
        mut self,
        name: UpdateAction<EntityName>,
        icon: UpdateAction<Option<String>>,
        source: EventSource,
        at: Timestamp,
    ) -> Self {
        let mut changes = FieldChanges::new();
        name.apply_to(&mut self.name, "name", &mut changes);
        icon.apply_to(&mut self.icon, "icon", &mut changes);
        self.header.record_update(changes, source, at);
        self
    }
}

/// One measurement of a metric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricEntry {
    pub header: EntityHeader,
    pub metric_ref_id: EntityId,
    pub collection_time: ADate,
    pub value: f64,
    pub notes: Option<String>,
}

impl_entity!(MetricEntry, "metric entry", |entry| format!(
    "Entry for {}",
    entry.collection_time
));

impl LeafEntity for MetricEntry {
    fn parent_ref_id(&self) -> EntityId {
        self.metric_ref_id
    }
}

impl MetricEntry {
    pub fn new_metric_entry(
        metric_ref_id: EntityId,
        collection_time: ADate,
        value: f64,
        notes: Option<String>,
        source: EventSource,
        created_time: Timestamp,
    ) -> Self {
        let mut fields = FieldChanges::new();
        fields.record("collection_time", &collection_time);
        fields.record("value", &value);
        fields.record("notes", &notes);
        Self {
            header: EntityHeader::new(source, created_time, fields),
            metric_ref_id,
            collection_time,
            value,
            notes,
        }
    }

    pub fn update(
        mut self,
        collection_time: UpdateAction<ADate>,
        value: UpdateAction<f64>,
        notes: UpdateAction<Option<String>>,
        source: EventSource,
        at: Timestamp,
    ) -> Self {
        let mut changes = FieldChanges::new();
        collection_time.apply_to(&mut self.collection_time, "collection_time", &mut changes);
        value.apply_to(&mut self.value, "value", &mut changes);
        notes.apply_to(&mut self.notes, "notes", &mut changes);
        self.header.record_update(changes, source, at);
        self
    }
}
