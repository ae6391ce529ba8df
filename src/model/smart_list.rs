use super::{
    impl_entity, BranchEntity, BranchTagEntity, EntityHeader, EventSource, FieldChanges,
    LeafEntity, UpdateAction,
};
use crate::types::{EntityId, EntityKey, EntityName, TagName, Timestamp, ValidatedUrl};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SmartList {
    pub header: EntityHeader,
    pub smart_list_collection_ref_id: EntityId,
    pub key: EntityKey,
    pub name: EntityName,
    pub icon: Option<String>,
}

impl_entity!(SmartList, "smart list", |list| list.name.to_string());

impl BranchEntity for SmartList {
    fn trunk_ref_id(&self) -> EntityId {
        self.smart_list_collection_ref_id
    }

    fn key(&self) -> &EntityKey {
        &self.key
    }
}

impl SmartList {
    pub fn new_smart_list(
        smart_list_collection_ref_id: EntityId,
        key: EntityKey,
        name: EntityName,
        icon: Option<String>,
        source: EventSource,
        created_time: Timestamp,
    ) -> Self {
        let mut fields = FieldChanges::new();
        fields.record("key", &key);
        fields.record("name", &name);
        fields.record("icon", &icon);
        Self {
            header: EntityHeader::new(source, created_time, fields),
            smart_list_collection_ref_id,
            key,
            name,
            icon,
        }
    }

    pub fn update(
        mut self,
        name: UpdateAction<EntityName>,
        icon: UpdateAction<Option<String>>,
        source: EventSource,
        at: Timestamp,
    ) -> Self {
        let mut changes = FieldChanges::new();
        name.apply_to(&mut self.name, "name", &mut changes);
        icon.apply_to(&mut self.icon, "icon", &mut changes);
        self.header.record_update(changes, source, at);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SmartListTag {
    pub header: EntityHeader,
    pub smart_list_ref_id: EntityId,
    pub tag_name: TagName,
}

impl_entity!(SmartListTag, "smart list tag", |tag| tag.tag_name.to_string());

impl LeafEntity for SmartListTag {
    fn parent_ref_id(&self) -> EntityId {
        self.smart_list_ref_id
    }
}

impl BranchTagEntity for SmartListTag {
    fn tag_name(&self) -> &TagName {
        &self.tag_name
    }
}

impl SmartListTag {
    pub fn new_smart_list_tag(
        smart_list_ref_id: EntityId,
        tag_name: TagName,
        source: EventSource,
        created_time: Timestamp,
    ) -> Self {
        let mut fields = FieldChanges::new();
        fields.record("tag_name", &tag_name);
        Self {
            header: EntityHeader::new(source, created_time, fields),
            smart_list_ref_id,
            tag_name,
        }
    }

    pub fn update(
        mut self,
        tag_name: UpdateAction<TagName>,
        source: EventSource,
        at: Timestamp,
    ) -> Self {
        let mut changes = FieldChanges::new();
        tag_name.apply_to(&mut self.tag_name, "tag_name", &mut changes);
        self.header.record_update(changes, source, at);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SmartListItem {
    pub header: EntityHeader,
    pub smart_list_ref_id: EntityId,
    pub name: EntityName,
    pub is_done: bool,
    pub tags_ref_id: Vec<EntityId>,
    pub url: Option<ValidatedUrl>,
}

impl_entity!(SmartListItem, "smart list item", |item| item.name.to_string());

impl LeafEntity for SmartListItem {
    fn parent_ref_id(&self) -> EntityId {
        self.smart_list_ref_id
    }
}

impl SmartListItem {
    pub fn new_smart_list_item(
        smart_list_ref_id: EntityId,
        name: EntityName,
        is_done: bool,
        tags_ref_id: Vec<EntityId>,
        url: Option<ValidatedUrl>,
        source: EventSource,
        created_time: Timestamp,
    ) -> Self {
        let mut fields = FieldChanges::new();
        fields.record("name", &name);
        fields.record("is_done", &is_done);
        fields.record("tags_ref_id", &tags_ref_id);
        fields.record("url", &url);
        Self {
            header: EntityHeader::new(source, created_time, fields),
            smart_list_ref_id,
            name,
            is_done,
            tags_ref_id,
            url,
        }
    }

    pub fn update(
        mut self,
        name: UpdateAction<EntityName>,
        is_done: UpdateAction<bool>,
        tags_ref_id: UpdateAction<Vec<EntityId>>,
        url: UpdateAction<Option<ValidatedUrl>>,
        source: EventSource,
        at: Timestamp,
    ) -> Self {
        let mut changes = FieldChanges::new();
        name.apply_to(&mut self.name, "name", &mut changes);
        is_done.apply_to(&mut self.is_done, "is_done", &mut changes);
        tags_ref_id.apply_to(&mut self.tags_ref_id, "tags_ref_id", &mut changes);
        url.apply_to(&mut self.url, "url", &mut changes);
        self.header.record_update(changes, source, at);
        self
    }
}
