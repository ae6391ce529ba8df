use super::{leaf_row_accessors, ApplyOutcome, NotionLeaf};
use crate::model::{Entity, EventSource, UpdateAction, Vacation};
use crate::types::{ADate, EntityId, EntityName, NotionId, Timestamp, ValidationError};
use serde::{Deserialize, Serialize};

/// A vacation row. Both dates are nullable columns remotely, but a row
/// without them never becomes a local vacation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotionVacation {
    pub notion_id: NotionId,
    pub ref_id: Option<EntityId>,
    pub archived: bool,
    pub last_edited_time: Timestamp,
    pub name: String,
    pub start_date: Option<ADate>,
    pub end_date: Option<ADate>,
}

impl NotionVacation {
    fn dates(&self) -> Result<(ADate, ADate), ValidationError> {
        match (self.start_date, self.end_date) {
            (Some(start), Some(end)) => Ok((start, end)),
            (None, _) => Err(ValidationError::EmptyField("start_date")),
            (_, None) => Err(ValidationError::EmptyField("end_date")),
        }
    }
}

impl NotionLeaf for NotionVacation {
    type Entity = Vacation;
    type DirectInfo = ();
    type InverseInfo = ();

    leaf_row_accessors!();

    fn nice_name(&self) -> String {
        self.name.clone()
    }

    fn new_notion_row(entity: &Vacation, _info: &()) -> Self {
        Self {
            notion_id: NotionId::unassigned(),
            ref_id: Some(entity.ref_id()),
            archived: entity.archived(),
            last_edited_time: entity.last_modified_time(),
            name: entity.name.to_string(),
            start_date: Some(entity.start_date),
            end_date: Some(entity.end_date),
        }
    }

    fn new_entity(&self, parent_ref_id: EntityId, _info: &()) -> Result<Vacation, ValidationError> {
        let (start_date, end_date) = self.dates()?;
        let vacation = Vacation::new_vacation(
            parent_ref_id,
            EntityName::new(&self.name)?,
            start_date,
            end_date,
            EventSource::Notion,
            self.last_edited_time,
        )?;
        Ok(vacation.change_archived(self.archived, EventSource::Notion, self.last_edited_time))
    }

    fn apply_to_entity(
        &self,
        entity: Vacation,
        _info: &(),
    ) -> Result<ApplyOutcome<Vacation>, ValidationError> {
        let (start_date, end_date) = self.dates()?;
        let updated = entity
            .update(
                UpdateAction::change_to(EntityName::new(&self.name)?),
                UpdateAction::change_to(start_date),
                UpdateAction::change_to(end_date),
                EventSource::Notion,
                self.last_edited_time,
            )?
            .change_archived(self.archived, EventSource::Notion, self.last_edited_time);
        Ok(ApplyOutcome::just(updated))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn day(d: u32) -> ADate {
        ADate::from_ymd(2024, 12, d).unwrap()
    }

    fn at(secs: i64) -> Timestamp {
        Timestamp::from_unix_secs(secs).unwrap()
    }

    fn typed_row(start_date: Option<ADate>, end_date: Option<ADate>) -> NotionVacation {
        NotionVacation {
            notion_id: NotionId::new_v4(),
            ref_id: None,
            archived: false,
            last_edited_time: at(5),
            name: "Winter break".to_string(),
            start_date,
            end_date,
        }
    }

    #[test]
    fn rows_missing_a_date_are_rejected() {
        assert_eq!(
            typed_row(None, Some(day(30))).new_entity(EntityId::new(1), &()),
            Err(ValidationError::EmptyField("start_date"))
        );
        assert_eq!(
            typed_row(Some(day(20)), None).new_entity(EntityId::new(1), &()),
            Err(ValidationError::EmptyField("end_date"))
        );
        assert!(typed_row(Some(day(30)), Some(day(20)))
            .new_entity(EntityId::new(1), &())
            .is_err());
    }

    #[test]
    fn remote_dates_move_the_local_vacation() {
        let vacation = typed_row(Some(day(20)), Some(day(30)))
            .new_entity(EntityId::new(1), &())
            .unwrap()
            .assign_ref_id(EntityId::new(8));
        let row = NotionVacation::new_notion_row(&vacation, &());
        assert_eq!(row.start_date, Some(day(20)));

        let remote = NotionVacation {
            end_date: Some(day(31)),
            last_edited_time: at(9),
            ..row
        };
        let merged = remote.apply_to_entity(vacation, &()).unwrap();
        assert_eq!(merged.entity.end_date, day(31));
        assert_eq!(merged.entity.last_modified_time(), at(9));
        assert!(!merged.should_modify_on_notion);
    }
}
