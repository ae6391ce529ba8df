use super::{impl_entity, EntityHeader, EventSource, FieldChanges, LeafEntity, UpdateAction};
use crate::types::{ADate, EntityId, EntityName, Timestamp, ValidationError};
use serde::{Deserialize, Serialize};

/// Days off. The range is closed and must span at least one night.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vacation {
    pub header: EntityHeader,
    pub vacation_collection_ref_id: EntityId,
    pub name: EntityName,
    pub start_date: ADate,
    pub end_date: ADate,
}

impl_entity!(Vacation, "vacation", |vacation| vacation.name.to_string());

impl LeafEntity for Vacation {
    fn parent_ref_id(&self) -> EntityId {
        self.vacation_collection_ref_id
    }
}

fn check_range(start_date: ADate, end_date: ADate) -> Result<(), ValidationError> {
    if start_date < end_date {
        Ok(())
    } else {
        Err(ValidationError::InvalidDate {
            value: format!("{}..{}", start_date, end_date),
            reason: "a vacation must start before it ends".to_string(),
        })
    }
}

impl Vacation {
    pub fn new_vacation(
        vacation_collection_ref_id: EntityId,
        name: EntityName,
        start_date: ADate,
        end_date: ADate,
        source: EventSource,
        created_time: Timestamp,
    ) -> Result<Self, ValidationError> {
        check_range(start_date, end_date)?;
        let mut fields = FieldChanges::new();
        fields.record("name", &name);
        fields.record("start_date", &start_date);
        fields.record("end_date", &end_date);
        Ok(Self {
            header: EntityHeader::new(source, created_time, fields),
            vacation_collection_ref_id,
            name,
            start_date,
            end_date,
        })
    }

    /// Rejects the whole update when the resulting range would be empty.
    pub fn update(
        mut self,
        name: UpdateAction<EntityName>,
        start_date: UpdateAction<ADate>,
        end_date: UpdateAction<ADate>,
        source: EventSource,
        at: Timestamp,
    ) -> Result<Self, ValidationError> {
        check_range(
            start_date.clone().or_else(self.start_date),
            end_date.clone().or_else(self.end_date),
        )?;
        let mut changes = FieldChanges::new();
        name.apply_to(&mut self.name, "name", &mut changes);
        start_date.apply_to(&mut self.start_date, "start_date", &mut changes);
        end_date.apply_to(&mut self.end_date, "end_date", &mut changes);
        self.header.record_update(changes, source, at);
        Ok(self)
    }
}
