use super::{impl_entity, EntityHeader, EventSource, FieldChanges, LeafEntity, UpdateAction};
use crate::types::{EntityId, Timestamp};
use serde::{Deserialize, Serialize};

/// A Slack message pushed into the workspace for follow-up.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlackTask {
    pub header: EntityHeader,
    pub slack_task_collection_ref_id: EntityId,
    pub user: String,
    pub channel: Option<String>,
    pub message: String,
}

impl_entity!(SlackTask, "slack task", |task| match &task.channel {
    Some(channel) => format!("Message from {} on #{}", task.user, channel),
    None => format!("Message from {}", task.user),
});

impl LeafEntity for SlackTask {
    fn parent_ref_id(&self) -> EntityId {
        self.slack_task_collection_ref_id
    }
}

impl SlackTask {
    pub fn new_slack_task(
        slack_task_collection_ref_id: EntityId,
        user: String,
        channel: Option<String>,
        message: String,
        source: EventSource,
        created_time: Timestamp,
    ) -> Self {
        let mut fields = FieldChanges::new();
        fields.record("user", &user);
        fields.record("channel", &channel);
        fields.record("message", &message);
        Self {
            header: EntityHeader::new(source, created_time, fields),
            slack_task_collection_ref_id,
            user,
            channel,
            message,
        }
    }

    pub fn update(
        mut self,
        user: UpdateAction<String>,
        channel: UpdateAction<Option<String>>,
        message: UpdateAction<String>,
        source: EventSource,
        at: Timestamp,
    ) -> Self {
        let mut changes = FieldChanges::new();
        user.apply_to(&mut self.user, "user", &mut changes);
        channel.apply_to(&mut self.channel, "channel", &mut changes);
        message.apply_to(&mut self.message, "message", &mut changes);
        self.header.record_update(changes, source, at);
        self
    }
}
