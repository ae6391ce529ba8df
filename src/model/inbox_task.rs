use super::{
    impl_entity, Entity, EntityHeader, EventSource, FieldChanges, LeafEntity, SlackTask,
    UpdateAction,
};
use crate::types::{ADate, EntityId, EntityName, Timestamp, ValidationError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InboxTaskStatus {
    #[default]
    NotStarted,
    Accepted,
    InProgress,
    Blocked,
    NotDone,
    Done,
}

impl InboxTaskStatus {
    const ALL: &'static str = "not-started, accepted, in-progress, blocked, not-done, done";

    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Done | Self::NotDone)
    }

    /// Label shown in the remote status column.
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

impl FromStr for InboxTaskStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace([' ', '_'], "-");
        match normalized.as_str() {
            "not-started" => Ok(Self::NotStarted),
            "accepted" => Ok(Self::Accepted),
            "in-progress" => Ok(Self::InProgress),
            "blocked" => Ok(Self::Blocked),
            "not-done" => Ok(Self::NotDone),
            "done" => Ok(Self::Done),
            _ => Err(ValidationError::InvalidEnum {
                kind: "inbox task status",
                value: s.to_string(),
                expected: Self::ALL,
            }),
        }
    }
}

impl fmt::Display for InboxTaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.notion_label())
    }
}

/// Where an inbox task came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InboxTaskSource {
    User,
    BigPlan,
    SlackTask,
}

impl InboxTaskSource {
    pub fn notion_label(&self) -> &'static str {
        match self {
            Self::User => "User",
            Self::BigPlan => "Big Plan",
            Self::SlackTask => "Slack Task",
        }
    }
}

impl FromStr for InboxTaskSource {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace([' ', '_'], "-").as_str() {
            "user" => Ok(Self::User),
            "big-plan" => Ok(Self::BigPlan),
            "slack-task" => Ok(Self::SlackTask),
            _ => Err(ValidationError::InvalidEnum {
                kind: "inbox task source",
                value: s.to_string(),
                expected: "user, big-plan, slack-task",
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InboxTask {
    pub header: EntityHeader,
    pub inbox_task_collection_ref_id: EntityId,
    pub source: InboxTaskSource,
    pub name: EntityName,
    pub status: InboxTaskStatus,
    pub big_plan_ref_id: Option<EntityId>,
    pub slack_task_ref_id: Option<EntityId>,
    pub due_date: Option<ADate>,
}

impl_entity!(InboxTask, "inbox task", |task| task.name.to_string());

impl LeafEntity for InboxTask {
    fn parent_ref_id(&self) -> EntityId {
        self.inbox_task_collection_ref_id
    }
}

impl InboxTask {
    pub fn new_inbox_task(
        inbox_task_collection_ref_id: EntityId,
        name: EntityName,
        status: InboxTaskStatus,
        big_plan_ref_id: Option<EntityId>,
        due_date: Option<ADate>,
        source: EventSource,
        created_time: Timestamp,
    ) -> Self {
        let task_source = if big_plan_ref_id.is_some() {
            InboxTaskSource::BigPlan
        } else {
            InboxTaskSource::User
        };
        let mut fields = FieldChanges::new();
        fields.record("name", &name);
        fields.record("status", &status);
        fields.record("big_plan_ref_id", &big_plan_ref_id);
        fields.record("due_date", &due_date);
        Self {
            header: EntityHeader::new(source, created_time, fields),
            inbox_task_collection_ref_id,
            source: task_source,
            name,
            status,
            big_plan_ref_id,
            slack_task_ref_id: None,
            due_date,
        }
    }

    /// Task asking the user to follow up on a Slack message.
    pub fn new_for_slack_task(
        inbox_task_collection_ref_id: EntityId,
        slack_task: &SlackTask,
        source: EventSource,
        created_time: Timestamp,
    ) -> Result<Self, ValidationError> {
        let name = EntityName::new(format!("Respond to message from {}", slack_task.user))?;
        let mut fields = FieldChanges::new();
        fields.record("name", &name);
        fields.record("slack_task_ref_id", &slack_task.ref_id());
        Ok(Self {
            header: EntityHeader::new(source, created_time, fields),
            inbox_task_collection_ref_id,
            source: InboxTaskSource::SlackTask,
            name,
            status: InboxTaskStatus::Accepted,
            big_plan_ref_id: None,
            slack_task_ref_id: Some(slack_task.ref_id()),
            due_date: None,
        })
    }

    pub fn update(
        mut self,
        name: UpdateAction<EntityName>,
        status: UpdateAction<InboxTaskStatus>,
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

    /// Only user-created tasks may move between big plans.
    pub fn associate_with_big_plan(
        mut self,
        big_plan_ref_id: Option<EntityId>,
        source: EventSource,
        at: Timestamp,
    ) -> Result<Self, ValidationError> {
        if self.source != InboxTaskSource::User && self.source != InboxTaskSource::BigPlan {
            return Err(ValidationError::InvalidEnum {
                kind: "inbox task source for big plan association",
                value: format!("{:?}", self.source),
                expected: "user, big-plan",
            });
        }
        let mut changes = FieldChanges::new();
        UpdateAction::change_to(big_plan_ref_id).apply_to(
            &mut self.big_plan_ref_id,
            "big_plan_ref_id",
            &mut changes,
        );
        self.header.record_update(changes, source, at);
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(secs: i64) -> Timestamp {
        Timestamp::from_unix_secs(secs).unwrap()
    }

    fn task() -> InboxTask {
        InboxTask::new_inbox_task(
            EntityId::new(1),
            EntityName::new("Buy milk").unwrap(),
            InboxTaskStatus::Accepted,
            None,
            None,
            EventSource::Cli,
            at(100),
        )
    }

    #[test]
    fn status_parses_remote_labels() {
        assert_eq!("In Progress".parse::<InboxTaskStatus>().unwrap(), InboxTaskStatus::InProgress);
        assert_eq!("not_done".parse::<InboxTaskStatus>().unwrap(), InboxTaskStatus::NotDone);
        assert!("someday".parse::<InboxTaskStatus>().is_err());
        assert!(InboxTaskStatus::Done.is_completed());
    }

    #[test]
    fn update_records_only_changed_fields() {
        let updated = task().update(
            UpdateAction::change_to(EntityName::new("Buy milk").unwrap()),
            UpdateAction::change_to(InboxTaskStatus::Done),
            UpdateAction::DoNothing,
            EventSource::Cli,
            at(200),
        );
        assert_eq!(updated.version(), 1);
        let last = updated.header.events.last().unwrap();
        assert!(last.fields.contains_key("status"));
        assert!(!last.fields.contains_key("name"));
    }

    #[test]
    fn slack_generated_tasks_cannot_join_big_plans() {
        let slack = SlackTask::new_slack_task(
            EntityId::new(4),
            "ana".to_string(),
            Some("general".to_string()),
            "ping".to_string(),
            EventSource::Cli,
            at(1),
        )
        .assign_ref_id(EntityId::new(9));
        let generated =
            InboxTask::new_for_slack_task(EntityId::new(1), &slack, EventSource::Cli, at(2))
                .unwrap();
        assert_eq!(generated.slack_task_ref_id, Some(EntityId::new(9)));
        assert!(generated
            .associate_with_big_plan(Some(EntityId::new(3)), EventSource::Cli, at(3))
            .is_err());

        let associated = task()
            .associate_with_big_plan(Some(EntityId::new(3)), EventSource::Cli, at(300))
            .unwrap();
        assert_eq!(associated.big_plan_ref_id, Some(EntityId::new(3)));
    }
}
