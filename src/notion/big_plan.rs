use super::{leaf_row_accessors, ApplyOutcome, NotionLeaf};
use crate::model::{BigPlan, BigPlanStatus, Entity, EventSource, UpdateAction};
use crate::types::{ADate, EntityId, EntityName, NotionId, Timestamp, ValidationError};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotionBigPlan {
    pub notion_id: NotionId,
    pub ref_id: Option<EntityId>,
    pub archived: bool,
    pub last_edited_time: Timestamp,
    pub name: String,
    pub status: Option<String>,
    pub due_date: Option<ADate>,
}

impl NotionBigPlan {
    fn parsed_status(&self) -> Result<BigPlanStatus, ValidationError> {
        match &self.status {
            Some(label) => label.parse(),
            None => Ok(BigPlanStatus::NotStarted),
        }
    }
}

impl NotionLeaf for NotionBigPlan {
    type Entity = BigPlan;
    type DirectInfo = ();
    type InverseInfo = ();

    leaf_row_accessors!();

    fn nice_name(&self) -> String {
        self.name.clone()
    }

    fn new_notion_row(entity: &BigPlan, _info: &()) -> Self {
        Self {
            notion_id: NotionId::unassigned(),
            ref_id: Some(entity.ref_id()),
            archived: entity.archived(),
            last_edited_time: entity.last_modified_time(),
            name: entity.name.to_string(),
            status: Some(entity.status.notion_label().to_string()),
            due_date: entity.due_date,
        }
    }

    fn new_entity(&self, parent_ref_id: EntityId, _info: &()) -> Result<BigPlan, ValidationError> {
        let plan = BigPlan::new_big_plan(
            parent_ref_id,
            EntityName::new(&self.name)?,
            self.parsed_status()?,
            self.due_date,
            EventSource::Notion,
            self.last_edited_time,
        );
        Ok(plan.change_archived(self.archived, EventSource::Notion, self.last_edited_time))
    }

    fn apply_to_entity(
        &self,
        entity: BigPlan,
        _info: &(),
    ) -> Result<ApplyOutcome<BigPlan>, ValidationError> {
        let updated = entity
            .update(
                UpdateAction::change_to(EntityName::new(&self.name)?),
                UpdateAction::change_to(self.parsed_status()?),
                UpdateAction::change_to(self.due_date),
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
    use pretty_assertions::assert_eq;

    fn at(secs: i64) -> Timestamp {
        Timestamp::from_unix_secs(secs).unwrap()
    }

    #[test]
    fn row_round_trips_through_entity() {
        let plan = BigPlan::new_big_plan(
            EntityId::new(1),
            EntityName::new("Launch").unwrap(),
            BigPlanStatus::InProgress,
            Some(ADate::from_ymd(2024, 5, 1).unwrap()),
            EventSource::Cli,
            at(10),
        )
        .assign_ref_id(EntityId::new(5));

        let row = NotionBigPlan::new_notion_row(&plan, &());
        assert_eq!(row.ref_id, Some(EntityId::new(5)));
        assert_eq!(row.status.as_deref(), Some("In Progress"));
        assert!(row.notion_id.is_unassigned());

        let remote = NotionBigPlan {
            name: "Launch v2".to_string(),
            status: Some("Done".to_string()),
            last_edited_time: at(20),
            ..row
        };
        let merged = remote.apply_to_entity(plan, &()).unwrap();
        assert!(!merged.should_modify_on_notion);
        assert_eq!(merged.entity.name.as_str(), "Launch v2");
        assert_eq!(merged.entity.status, BigPlanStatus::Done);
        assert_eq!(merged.entity.last_modified_time(), at(20));
    }

    #[test]
    fn blank_remote_name_is_rejected() {
        let row = NotionBigPlan {
            notion_id: NotionId::new_v4(),
            ref_id: None,
            archived: false,
            last_edited_time: at(1),
            name: "  ".to_string(),
            status: None,
            due_date: None,
        };
        assert!(row.new_entity(EntityId::new(1), &()).is_err());
    }
}
