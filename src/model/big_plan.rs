use super::{impl_entity, EntityHeader, EventSource, FieldChanges, LeafEntity, UpdateAction};
use crate::types::{ADate, EntityId, EntityName, Timestamp, ValidationError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BigPlanStatus {
    #[default]
    NotStarted,
    Accepted,
    InProgress,
    Blocked,
    NotDone,
    Done,
}

impl BigPlanStatus {
    pub fn notion_label(&self) -> &'static str {
        match self {
            Self::NotStarted => "Not Started",
            Self::Accepted => "Accepted",
            Self::InProgress => "In Progress",
            Self::Blocked => "Blocked",
            Self::NotDone => "Not Done",
            Self::Done => "Done",
        }
    }
}

impl FromStr for BigPlanStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace([' ', '_'], "-").as_str() {
            "not-started" => Ok(Self::NotStarted),
            "accepted" => Ok(Self::Accepted),
            "in-progress" => Ok(Self::InProgress),
            "blocked" => Ok(Self::Blocked),
            "not-done" => Ok(Self::NotDone),
            "done" => Ok(Self::Done),
            _ => Err(ValidationError::InvalidEnum {
                kind: "big plan status",
                value: s.to_string(),
                expected: "not-started, accepted, in-progress, blocked, not-done, done",
            }),
        }
    }
}

impl fmt::Display for BigPlanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.notion_label())
    }
}

/// A multi-step undertaking that inbox tasks can be attached to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BigPlan {
    pub header: EntityHeader,
    pub big_plan_collection_ref_id: EntityId,
    pub name: EntityName,
    pub status: BigPlanStatus,
    pub due_date: Option<ADate>,
}

impl_entity!(BigPlan, "big plan", |plan| plan.name.to_string());

impl LeafEntity for BigPlan {
    fn parent_ref_id(&self) -> EntityId {
        self.big_plan_collection_ref_id
    }
}

impl BigPlan {
    pub fn new_big_plan(
        big_plan_collection_ref_id: EntityId,
        name: EntityName,
        status: BigPlanStatus,
        due_date: Option<ADate>,
        source: EventSource,
        created_time: Timestamp,
    ) -> Self {
        let mut fields = FieldChanges::new();
        fields.record("name", &name);
        fields.record("status", &status);
        fields.record("due_date", &due_date);
        Self {
            header: EntityHeader::new(source, created_time, fields),
            big_plan_collection_ref_id,
            name,
            status,
            due_date,
        }
    }

    pub fn update(
        mut self,
        name: UpdateAction<EntityName>,
        status: UpdateAction<BigPlanStatus>,
        due_date: UpdateAction<Option<ADate>>,
        source: EventSource,
        at: Timestamp,
    ) -> Self {
        let mut changes = FieldChanges::new();
        name.apply_to(&mut self.name, "name", &mut changes);
        status.apply_to(&mut self.status, "status", &mut changes);
        due_date.apply_to(&mut self.due_date, "due_date", &mut changes);
        self.header.record_update(changes, source, at);
        self
    }
}
