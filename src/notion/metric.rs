use super::{leaf_row_accessors, non_blank, ApplyOutcome, NotionBranch, NotionLeaf};
use crate::model::{Entity, EventSource, Metric, MetricEntry, UpdateAction};
use crate::types::{ADate, EntityId, EntityName, NotionId, Timestamp, ValidationError};
use serde::{Deserialize, Serialize};

/// Page heading a metric's entry database.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotionMetric {
    pub notion_id: NotionId,
    pub ref_id: EntityId,
    pub name: String,
    pub icon: Option<String>,
    pub last_edited_time: Timestamp,
}

impl NotionBranch for NotionMetric {
    type Entity = Metric;

    fn notion_id(&self) -> &NotionId {
        &self.notion_id
    }

    fn ref_id(&self) -> EntityId {
        self.ref_id
    }

    fn last_edited_time(&self) -> Timestamp {
        self.last_edited_time
    }

    fn nice_name(&self) -> String {
        self.name.clone()
    }

    fn with_notion_id(mut self, notion_id: NotionId) -> Self {
        self.notion_id = notion_id;
        self
    }

    fn new_notion_row(entity: &Metric) -> Self {
        Self {
            notion_id: NotionId::unassigned(),
            ref_id: entity.ref_id(),
            name: entity.name.to_string(),
            icon: entity.icon.clone(),
            last_edited_time: entity.last_modified_time(),
        }
    }

    fn apply_to_entity(&self, entity: Metric) -> Result<Metric, ValidationError> {
        Ok(entity.update(
            UpdateAction::change_to(EntityName::new(&self.name)?),
            UpdateAction::change_to(non_blank(&self.icon)),
            EventSource::Notion,
            self.last_edited_time,
        ))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotionMetricEntry {
    pub notion_id: NotionId,
    pub ref_id: Option<EntityId>,
    pub archived: bool,
    pub last_edited_time: Timestamp,
    pub collection_time: Option<ADate>,
    pub value: Option<f64>,
    pub notes: Option<String>,
}

impl NotionMetricEntry {
    fn required_fields(&self) -> Result<(ADate, f64), ValidationError> {
        let collection_time = self
            .collection_time
            .ok_or(ValidationError::EmptyField("collection time"))?;
        let value = self.value.ok_or(ValidationError::EmptyField("value"))?;
        if !value.is_finite() {
            return Err(ValidationError::InvalidNumber {
                field: "value",
                value: value.to_string(),
            });
        }
        Ok((collection_time, value))
    }
}

impl NotionLeaf for NotionMetricEntry {
    type Entity = MetricEntry;
    type DirectInfo = ();
    type InverseInfo = ();

    leaf_row_accessors!();

    fn nice_name(&self) -> String {
        match self.collection_time {
            Some(date) => format!("Entry for {}", date),
            None => "Entry".to_string(),
        }
    }

    fn new_notion_row(entity: &MetricEntry, _info: &()) -> Self {
        Self {
            notion_id: NotionId::unassigned(),
            ref_id: Some(entity.ref_id()),
            archived: entity.archived(),
            last_edited_time: entity.last_modified_time(),
            collection_time: Some(entity.collection_time),
            value: Some(entity.value),
            notes: entity.notes.clone(),
        }
    }

    fn new_entity(
        &self,
        parent_ref_id: EntityId,
        _info: &(),
    ) -> Result<MetricEntry, ValidationError> {
        let (collection_time, value) = self.required_fields()?;
        let entry = MetricEntry::new_metric_entry(
            parent_ref_id,
            collection_time,
            value,
            non_blank(&self.notes),
            EventSource::Notion,
            self.last_edited_time,
        );
        Ok(entry.change_archived(self.archived, EventSource::Notion, self.last_edited_time))
    }

    fn apply_to_entity(
        &self,
        entity: MetricEntry,
        _info: &(),
    ) -> Result<ApplyOutcome<MetricEntry>, ValidationError> {
        let (collection_time, value) = self.required_fields()?;
        let updated = entity
            .update(
                UpdateAction::change_to(collection_time),
                UpdateAction::change_to(value),
                UpdateAction::change_to(non_blank(&self.notes)),
                EventSource::Notion,
                self.last_edited_time,
            )
            .change_archived(self.archived, EventSource::Notion, self.last_edited_time);
        Ok(ApplyOutcome::just(updated))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_without_value_is_rejected() {
        let row = NotionMetricEntry {
            notion_id: NotionId::new_v4(),
            ref_id: None,
            archived: false,
            last_edited_time: Timestamp::from_unix_secs(5).unwrap(),
            collection_time: Some(ADate::from_ymd(2024, 1, 2).unwrap()),
            value: None,
            notes: None,
        };
        assert_eq!(
            row.new_entity(EntityId::new(1), &()).unwrap_err(),
            ValidationError::EmptyField("value")
        );
    }
}
