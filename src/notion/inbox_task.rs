use super::{leaf_row_accessors, non_blank, ApplyOutcome, NotionLeaf};
use crate::model::{
    BigPlan, Entity, EventSource, InboxTask, InboxTaskSource, InboxTaskStatus, UpdateAction,
};
use crate::types::{ADate, EntityId, EntityName, NotionId, Timestamp, ValidationError};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Big plans known locally, used to render the big plan column.
#[derive(Debug, Clone, Default)]
pub struct InboxTaskDirectInfo {
    pub big_plans_by_ref_id: HashMap<EntityId, BigPlan>,
}

/// Big plans known locally, used to resolve the big plan column.
#[derive(Debug, Clone, Default)]
pub struct InboxTaskInverseInfo {
    pub big_plans_by_ref_id: HashMap<EntityId, BigPlan>,
    pub big_plans_by_name: HashMap<String, BigPlan>,
}

impl InboxTaskInverseInfo {
    pub fn from_big_plans<'a>(plans: impl IntoIterator<Item = &'a BigPlan>) -> Self {
        let mut info = Self::default();
        for plan in plans {
            info.big_plans_by_name
                .insert(plan.name.as_str().to_lowercase(), plan.clone());
            info.big_plans_by_ref_id.insert(plan.ref_id(), plan.clone());
        }
        info
    }

    fn resolve(&self, ref_id: Option<EntityId>, name: Option<&str>) -> Option<&BigPlan> {
        ref_id
            .and_then(|id| self.big_plans_by_ref_id.get(&id))
            .or_else(|| name.and_then(|n| self.big_plans_by_name.get(&n.to_lowercase())))
    }
}

impl InboxTaskDirectInfo {
    pub fn from_big_plans<'a>(plans: impl IntoIterator<Item = &'a BigPlan>) -> Self {
        Self {
            big_plans_by_ref_id: plans.into_iter().map(|p| (p.ref_id(), p.clone())).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotionInboxTask {
    pub notion_id: NotionId,
    pub ref_id: Option<EntityId>,
    pub archived: bool,
    pub last_edited_time: Timestamp,
    pub name: String,
    pub status: Option<String>,
    pub source: Option<String>,
    pub big_plan_ref_id: Option<EntityId>,
    pub big_plan_name: Option<String>,
    pub slack_task_ref_id: Option<EntityId>,
    pub due_date: Option<ADate>,
}

impl NotionInboxTask {
    fn parsed_status(&self) -> Result<InboxTaskStatus, ValidationError> {
        match non_blank(&self.status) {
            Some(label) => label.parse(),
            None => Ok(InboxTaskStatus::NotStarted),
        }
    }

    fn resolve_big_plan<'a>(&self, info: &'a InboxTaskInverseInfo) -> Option<&'a BigPlan> {
        info.resolve(
            self.big_plan_ref_id,
            non_blank(&self.big_plan_name).as_deref(),
        )
    }

    /// The row shows a stale or partial big plan reference.
    fn big_plan_column_is_stale(&self, resolved: Option<&BigPlan>) -> bool {
        match resolved {
            Some(plan) => {
                self.big_plan_ref_id != Some(plan.ref_id())
                    || self.big_plan_name.as_deref() != Some(plan.name.as_str())
            }
            None => self.big_plan_ref_id.is_some() || non_blank(&self.big_plan_name).is_some(),
        }
    }
}

impl NotionLeaf for NotionInboxTask {
    type Entity = InboxTask;
    type DirectInfo = InboxTaskDirectInfo;
    type InverseInfo = InboxTaskInverseInfo;

    leaf_row_accessors!();

    fn nice_name(&self) -> String {
        self.name.clone()
    }

    fn new_notion_row(entity: &InboxTask, info: &InboxTaskDirectInfo) -> Self {
        let big_plan_name = entity
            .big_plan_ref_id
            .and_then(|id| info.big_plans_by_ref_id.get(&id))
            .map(|plan| plan.name.to_string());
        Self {
            notion_id: NotionId::unassigned(),
            ref_id: Some(entity.ref_id()),
            archived: entity.archived(),
            last_edited_time: entity.last_modified_time(),
            name: entity.name.to_string(),
            status: Some(entity.status.notion_label().to_string()),
            source: Some(entity.source.notion_label().to_string()),
            big_plan_ref_id: entity.big_plan_ref_id,
            big_plan_name,
            slack_task_ref_id: entity.slack_task_ref_id,
            due_date: entity.due_date,
        }
    }

    fn new_entity(
        &self,
        parent_ref_id: EntityId,
        info: &InboxTaskInverseInfo,
    ) -> Result<InboxTask, ValidationError> {
        let big_plan = self.resolve_big_plan(info);
        let task = InboxTask::new_inbox_task(
            parent_ref_id,
            EntityName::new(&self.name)?,
            self.parsed_status()?,
            big_plan.map(|plan| plan.ref_id()),
            self.due_date,
            EventSource::Notion,
            self.last_edited_time,
        );
        Ok(task.change_archived(self.archived, EventSource::Notion, self.last_edited_time))
    }

    fn apply_to_entity(
        &self,
        entity: InboxTask,
        info: &InboxTaskInverseInfo,
    ) -> Result<ApplyOutcome<InboxTask>, ValidationError> {
        let resolved = self.resolve_big_plan(info);
        let mut should_modify_on_notion = self.big_plan_column_is_stale(resolved);

        let mut updated = entity.update(
            UpdateAction::change_to(EntityName::new(&self.name)?),
            UpdateAction::change_to(self.parsed_status()?),
            UpdateAction::change_to(self.due_date),
            EventSource::Notion,
            self.last_edited_time,
        );

        let resolved_ref_id = resolved.map(|plan| plan.ref_id());
        if resolved_ref_id != updated.big_plan_ref_id {
            match updated.source {
                InboxTaskSource::User | InboxTaskSource::BigPlan => {
                    updated = updated.associate_with_big_plan(
                        resolved_ref_id,
                        EventSource::Notion,
                        self.last_edited_time,
                    )?;
                }
                InboxTaskSource::SlackTask => {
                    log::warn!(
                        "Ignoring big plan change on generated inbox task '{}'",
                        updated.name
                    );
                    should_modify_on_notion = true;
                }
            }
        }

        let updated =
            updated.change_archived(self.archived, EventSource::Notion, self.last_edited_time);

        Ok(ApplyOutcome {
            entity: updated,
            should_modify_on_notion,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::BigPlanStatus;
    use pretty_assertions::assert_eq;

    fn at(secs: i64) -> Timestamp {
        Timestamp::from_unix_secs(secs).unwrap()
    }

    fn plan(id: u64, name: &str) -> BigPlan {
        BigPlan::new_big_plan(
            EntityId::new(1),
            EntityName::new(name).unwrap(),
            BigPlanStatus::Accepted,
            None,
            EventSource::Cli,
            at(1),
        )
        .assign_ref_id(EntityId::new(id))
    }

    fn row(name: &str) -> NotionInboxTask {
        NotionInboxTask {
            notion_id: NotionId::new_v4(),
            ref_id: None,
            archived: false,
            last_edited_time: at(50),
            name: name.to_string(),
            status: None,
            source: None,
            big_plan_ref_id: None,
            big_plan_name: None,
            slack_task_ref_id: None,
            due_date: None,
        }
    }

    #[test]
    fn new_entity_resolves_big_plan_by_name() {
        let info = InboxTaskInverseInfo::from_big_plans([&plan(7, "Move house")]);
        let remote = NotionInboxTask {
            big_plan_name: Some("move house".to_string()),
            ..row("Pack books")
        };
        let task = remote.new_entity(EntityId::new(2), &info).unwrap();
        assert_eq!(task.big_plan_ref_id, Some(EntityId::new(7)));
        assert_eq!(task.source, InboxTaskSource::BigPlan);
        assert_eq!(task.status, InboxTaskStatus::NotStarted);
        assert_eq!(task.last_modified_time(), at(50));
    }

    #[test]
    fn renamed_big_plan_marks_row_for_rewrite() {
        let plans = [plan(7, "Move house")];
        let info = InboxTaskInverseInfo::from_big_plans(plans.iter());
        let local = InboxTask::new_inbox_task(
            EntityId::new(2),
            EntityName::new("Pack books").unwrap(),
            InboxTaskStatus::Accepted,
            Some(EntityId::new(7)),
            None,
            EventSource::Cli,
            at(10),
        )
        .assign_ref_id(EntityId::new(3));
        let remote = NotionInboxTask {
            ref_id: Some(EntityId::new(3)),
            big_plan_ref_id: Some(EntityId::new(7)),
            big_plan_name: Some("Old plan name".to_string()),
            status: Some("Accepted".to_string()),
            ..row("Pack books")
        };

        let outcome = remote.apply_to_entity(local, &info).unwrap();
        assert!(outcome.should_modify_on_notion);
        assert_eq!(outcome.entity.big_plan_ref_id, Some(EntityId::new(7)));

        let direct = InboxTaskDirectInfo::from_big_plans(plans.iter());
        let rewritten = remote.join_with_entity(&outcome.entity, &direct);
        assert_eq!(rewritten.notion_id, remote.notion_id);
        assert_eq!(rewritten.big_plan_name.as_deref(), Some("Move house"));
    }

    #[test]
    fn unknown_status_label_is_a_validation_error() {
        let remote = NotionInboxTask {
            status: Some("Someday".to_string()),
            ..row("Call mom")
        };
        assert!(remote
            .new_entity(EntityId::new(2), &InboxTaskInverseInfo::default())
            .is_err());
    }
}
