use super::{leaf_row_accessors, non_blank, ApplyOutcome, NotionLeaf};
use crate::model::{Entity, EventSource, SlackTask, UpdateAction};
use crate::types::{EntityId, NotionId, Timestamp, ValidationError};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotionSlackTask {
    pub notion_id: NotionId,
    pub ref_id: Option<EntityId>,
    pub archived: bool,
    pub last_edited_time: Timestamp,
    pub user: String,
    pub channel: Option<String>,
    pub message: String,
}

impl NotionSlackTask {
    fn validated_user(&self) -> Result<String, ValidationError> {
        match self.user.trim() {
            "" => Err(ValidationError::EmptyField("user")),
            user => Ok(user.to_string()),
        }
    }
}

impl NotionLeaf for NotionSlackTask {
    type Entity = SlackTask;
    type DirectInfo = ();
    type InverseInfo = ();

    leaf_row_accessors!();

    fn nice_name(&self) -> String {
        format!("Message from {}", self.user)
    }

    fn new_notion_row(entity: &SlackTask, _info: &()) -> Self {
        Self {
            notion_id: NotionId::unassigned(),
            ref_id: Some(entity.ref_id()),
            archived: entity.archived(),
            last_edited_time: entity.last_modified_time(),
            user: entity.user.clone(),
            channel: entity.channel.clone(),
            message: entity.message.clone(),
        }
    }

    fn new_entity(
        &self,
        parent_ref_id: EntityId,
        _info: &(),
    ) -> Result<SlackTask, ValidationError> {
        let task = SlackTask::new_slack_task(
            parent_ref_id,
            self.validated_user()?,
            non_blank(&self.channel),
            self.message.clone(),
            EventSource::Notion,
            self.last_edited_time,
        );
        Ok(task.change_archived(self.archived, EventSource::Notion, self.last_edited_time))
    }

    fn apply_to_entity(
        &self,
        entity: SlackTask,
        _info: &(),
    ) -> Result<ApplyOutcome<SlackTask>, ValidationError> {
        let updated = entity
            .update(
                UpdateAction::change_to(self.validated_user()?),
                UpdateAction::change_to(non_blank(&self.channel)),
                UpdateAction::change_to(self.message.clone()),
                EventSource::Notion,
                self.last_edited_time,
            )
            .change_archived(self.archived, EventSource::Notion, self.last_edited_time);
        Ok(ApplyOutcome::just(updated))
    }
}
