use super::{leaf_row_accessors, non_blank, ApplyOutcome, NotionBranch, NotionLeaf};
use crate::model::{
    Entity, EventSource, SmartList, SmartListItem, SmartListTag, UpdateAction,
};
use crate::types::{
    EntityId, EntityName, NotionId, TagName, Timestamp, ValidatedUrl, ValidationError,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotionSmartList {
    pub notion_id: NotionId,
    pub ref_id: EntityId,
    pub name: String,
    pub icon: Option<String>,
    pub last_edited_time: Timestamp,
}

impl NotionBranch for NotionSmartList {
    type Entity = SmartList;

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

    fn new_notion_row(entity: &SmartList) -> Self {
        Self {
            notion_id: NotionId::unassigned(),
            ref_id: entity.ref_id(),
            name: entity.name.to_string(),
            icon: entity.icon.clone(),
            last_edited_time: entity.last_modified_time(),
        }
    }

    fn apply_to_entity(&self, entity: SmartList) -> Result<SmartList, ValidationError> {
        Ok(entity.update(
            UpdateAction::change_to(EntityName::new(&self.name)?),
            UpdateAction::change_to(non_blank(&self.icon)),
            EventSource::Notion,
            self.last_edited_time,
        ))
    }
}

/// One option of the smart list's tag column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotionSmartListTag {
    pub notion_id: NotionId,
    pub ref_id: Option<EntityId>,
    pub archived: bool,
    pub last_edited_time: Timestamp,
    pub name: String,
}

impl NotionLeaf for NotionSmartListTag {
    type Entity = SmartListTag;
    type DirectInfo = ();
    type InverseInfo = ();

    leaf_row_accessors!();

    fn nice_name(&self) -> String {
        self.name.clone()
    }

    fn new_notion_row(entity: &SmartListTag, _info: &()) -> Self {
        Self {
            notion_id: NotionId::unassigned(),
            ref_id: Some(entity.ref_id()),
            archived: entity.archived(),
            last_edited_time: entity.last_modified_time(),
            name: entity.tag_name.to_string(),
        }
    }

    fn new_entity(
        &self,
        parent_ref_id: EntityId,
        _info: &(),
    ) -> Result<SmartListTag, ValidationError> {
        let tag = SmartListTag::new_smart_list_tag(
            parent_ref_id,
            TagName::new(&self.name)?,
            EventSource::Notion,
            self.last_edited_time,
        );
        Ok(tag.change_archived(self.archived, EventSource::Notion, self.last_edited_time))
    }

    fn apply_to_entity(
        &self,
        entity: SmartListTag,
        _info: &(),
    ) -> Result<ApplyOutcome<SmartListTag>, ValidationError> {
        let updated = entity
            .update(
                UpdateAction::change_to(TagName::new(&self.name)?),
                EventSource::Notion,
                self.last_edited_time,
            )
            .change_archived(self.archived, EventSource::Notion, self.last_edited_time);
        Ok(ApplyOutcome::just(updated))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotionSmartListItem {
    pub notion_id: NotionId,
    pub ref_id: Option<EntityId>,
    pub archived: bool,
    pub last_edited_time: Timestamp,
    pub name: String,
    pub is_done: bool,
    pub tags: Vec<String>,
    pub url: Option<String>,
}

impl NotionSmartListItem {
    /// Tag ids for the tag names on this row. Names with no local tag are
    /// dropped; the second value reports whether any were.
    fn resolve_tags(
        &self,
        tags_by_name: &HashMap<TagName, SmartListTag>,
    ) -> Result<(Vec<EntityId>, bool), ValidationError> {
        let mut tag_ids = Vec::with_capacity(self.tags.len());
        let mut skipped_any = false;
        for raw in &self.tags {
            let name = TagName::new(raw)?;
            match tags_by_name.get(&name) {
                Some(tag) => tag_ids.push(tag.ref_id()),
                None => {
                    log::warn!(
                        "Skipping unknown tag '{}' on smart list item '{}'",
                        name,
                        self.name
                    );
                    skipped_any = true;
                }
            }
        }
        Ok((tag_ids, skipped_any))
    }

    fn parsed_url(&self) -> Result<Option<ValidatedUrl>, ValidationError> {
        non_blank(&self.url)
            .map(|url| ValidatedUrl::parse(&url))
            .transpose()
    }
}

impl NotionLeaf for NotionSmartListItem {
    type Entity = SmartListItem;
    type DirectInfo = HashMap<EntityId, SmartListTag>;
    type InverseInfo = HashMap<TagName, SmartListTag>;

    leaf_row_accessors!();

    fn nice_name(&self) -> String {
        self.name.clone()
    }

    fn new_notion_row(
        entity: &SmartListItem,
        tags_by_ref_id: &HashMap<EntityId, SmartListTag>,
    ) -> Self {
        let tags = entity
            .tags_ref_id
            .iter()
            .filter_map(|id| tags_by_ref_id.get(id))
            .map(|tag| tag.tag_name.to_string())
            .collect();
        Self {
            notion_id: NotionId::unassigned(),
            ref_id: Some(entity.ref_id()),
            archived: entity.archived(),
            last_edited_time: entity.last_modified_time(),
            name: entity.name.to_string(),
            is_done: entity.is_done,
            tags,
            url: entity.url.as_ref().map(|url| url.to_string()),
        }
    }

    fn new_entity(
        &self,
        parent_ref_id: EntityId,
        tags_by_name: &HashMap<TagName, SmartListTag>,
    ) -> Result<SmartListItem, ValidationError> {
        let (tags_ref_id, _) = self.resolve_tags(tags_by_name)?;
        let item = SmartListItem::new_smart_list_item(
            parent_ref_id,
            EntityName::new(&self.name)?,
            self.is_done,
            tags_ref_id,
            self.parsed_url()?,
            EventSource::Notion,
            self.last_edited_time,
        );
        Ok(item.change_archived(self.archived, EventSource::Notion, self.last_edited_time))
    }

    fn apply_to_entity(
        &self,
        entity: SmartListItem,
        tags_by_name: &HashMap<TagName, SmartListTag>,
    ) -> Result<ApplyOutcome<SmartListItem>, ValidationError> {
        let (tags_ref_id, skipped_any) = self.resolve_tags(tags_by_name)?;
        let updated = entity
            .update(
                UpdateAction::change_to(EntityName::new(&self.name)?),
                UpdateAction::change_to(self.is_done),
                UpdateAction::change_to(tags_ref_id),
                UpdateAction::change_to(self.parsed_url()?),
                EventSource::Notion,
                self.last_edited_time,
            )
            .change_archived(self.archived, EventSource::Notion, self.last_edited_time);
        Ok(ApplyOutcome {
            entity: updated,
            should_modify_on_notion: skipped_any,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn at(secs: i64) -> Timestamp {
        Timestamp::from_unix_secs(secs).unwrap()
    }

    fn tag(id: u64, name: &str) -> SmartListTag {
        SmartListTag::new_smart_list_tag(
            EntityId::new(1),
            TagName::new(name).unwrap(),
            EventSource::Cli,
            at(1),
        )
        .assign_ref_id(EntityId::new(id))
    }

    #[test]
    fn unknown_tags_are_skipped_and_flag_a_rewrite() {
        let known = tag(10, "fiction");
        let tags_by_name = HashMap::from([(known.tag_name.clone(), known.clone())]);
        let row = NotionSmartListItem {
            notion_id: NotionId::new_v4(),
            ref_id: Some(EntityId::new(4)),
            archived: false,
            last_edited_time: at(30),
            name: "Dune".to_string(),
            is_done: true,
            tags: vec!["fiction".to_string(), "lost".to_string()],
            url: Some("https://example.com/dune".to_string()),
        };

        let local = row.new_entity(EntityId::new(1), &tags_by_name).unwrap();
        assert_eq!(local.tags_ref_id, vec![EntityId::new(10)]);

        let outcome = row
            .apply_to_entity(local.assign_ref_id(EntityId::new(4)), &tags_by_name)
            .unwrap();
        assert!(outcome.should_modify_on_notion);

        let tags_by_ref_id = HashMap::from([(known.ref_id(), known)]);
        let rewritten = row.join_with_entity(&outcome.entity, &tags_by_ref_id);
        assert_eq!(rewritten.tags, vec!["fiction".to_string()]);
        assert_eq!(rewritten.notion_id, row.notion_id);
    }
}
