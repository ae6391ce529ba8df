//! In-memory local repositories.

use crate::algebras::{BranchRepository, LeafRepository, TrunkRepository};
use crate::error::StoreError;
use crate::model::{BranchEntity, Entity, LeafEntity, TrunkEntity};
use crate::types::{EntityId, EntityKey};
use indexmap::IndexMap;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Rows of one entity kind plus the id counter. This is also the
/// persisted form of a repository.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityTable<E> {
    next_id: u64,
    rows: IndexMap<EntityId, E>,
}

impl<E> Default for EntityTable<E> {
    fn default() -> Self {
        Self {
            next_id: 1,
            rows: IndexMap::new(),
        }
    }
}

impl<E: Entity> EntityTable<E> {
    fn create(&mut self, entity: E) -> E {
        let ref_id = EntityId::new(self.next_id);
        self.next_id += 1;
        let entity = entity.assign_ref_id(ref_id);
        self.rows.insert(ref_id, entity.clone());
        entity
    }

    fn save(&mut self, entity: E) -> Result<E, StoreError> {
        match self.rows.get_mut(&entity.ref_id()) {
            Some(slot) => {
                *slot = entity.clone();
                Ok(entity)
            }
            None => Err(StoreError::not_found(E::KIND, entity.ref_id())),
        }
    }

    fn load(&self, ref_id: EntityId, allow_archived: bool) -> Result<E, StoreError> {
        self.rows
            .get(&ref_id)
            .filter(|e| allow_archived || !e.archived())
            .cloned()
            .ok_or_else(|| StoreError::not_found(E::KIND, ref_id))
    }

    fn remove(&mut self, ref_id: EntityId) -> Result<E, StoreError> {
        self.rows
            .shift_remove(&ref_id)
            .ok_or_else(|| StoreError::not_found(E::KIND, ref_id))
    }

    fn iter(&self) -> impl Iterator<Item = &E> {
        self.rows.values()
    }
}

/// Shared body of the three repository kinds.
#[derive(Debug)]
struct Table<E>(Mutex<EntityTable<E>>);

impl<E> Default for Table<E> {
    fn default() -> Self {
        Self(Mutex::new(EntityTable::default()))
    }
}

impl<E: Entity> Table<E> {
    fn snapshot(&self) -> EntityTable<E> {
        self.0.lock().clone()
    }

    fn restore(table: EntityTable<E>) -> Self {
        Self(Mutex::new(table))
    }
}

macro_rules! snapshot_methods {
    () => {
        /// Copy of the current contents, for persistence.
        pub fn snapshot(&self) -> EntityTable<E> {
            self.table.snapshot()
        }

        pub fn from_snapshot(table: EntityTable<E>) -> Self {
            Self {
                table: Table::restore(table),
            }
        }
    };
}

#[derive(Debug)]
pub struct InMemoryTrunkRepository<E> {
    table: Table<E>,
}

impl<E> Default for InMemoryTrunkRepository<E> {
    fn default() -> Self {
        Self {
            table: Table::default(),
        }
    }
}

impl<E: TrunkEntity> InMemoryTrunkRepository<E> {
    snapshot_methods!();
}

impl<E: TrunkEntity> TrunkRepository<E> for InMemoryTrunkRepository<E> {
    fn create(&self, trunk: E) -> Result<E, StoreError> {
        let mut table = self.table.0.lock();
        if table
            .iter()
            .any(|t| t.workspace_ref_id() == trunk.workspace_ref_id())
        {
            return Err(StoreError::AlreadyExists {
                entity: E::KIND,
                id: format!("for workspace {}", trunk.workspace_ref_id()),
            });
        }
        Ok(table.create(trunk))
    }

    fn save(&self, trunk: E) -> Result<E, StoreError> {
        self.table.0.lock().save(trunk)
    }

    fn load_by_id(&self, ref_id: EntityId) -> Result<E, StoreError> {
        self.table.0.lock().load(ref_id, true)
    }

    fn load_by_parent(&self, workspace_ref_id: EntityId) -> Result<E, StoreError> {
        self.table
            .0
            .lock()
            .iter()
            .find(|t| t.workspace_ref_id() == workspace_ref_id)
            .cloned()
            .ok_or_else(|| {
                StoreError::not_found(E::KIND, format!("workspace {}", workspace_ref_id))
            })
    }
}

#[derive(Debug)]
pub struct InMemoryBranchRepository<E> {
    table: Table<E>,
}

impl<E> Default for InMemoryBranchRepository<E> {
    fn default() -> Self {
        Self {
            table: Table::default(),
        }
    }
}

impl<E: BranchEntity> InMemoryBranchRepository<E> {
    snapshot_methods!();
}

impl<E: BranchEntity> BranchRepository<E> for InMemoryBranchRepository<E> {
    fn create(&self, branch: E) -> Result<E, StoreError> {
        let mut table = self.table.0.lock();
        if table
            .iter()
            .any(|b| b.trunk_ref_id() == branch.trunk_ref_id() && b.key() == branch.key())
        {
            return Err(StoreError::AlreadyExists {
                entity: E::KIND,
                id: branch.key().to_string(),
            });
        }
        Ok(table.create(branch))
    }

    fn save(&self, branch: E) -> Result<E, StoreError> {
        self.table.0.lock().save(branch)
    }

    fn load_by_id(&self, ref_id: EntityId, allow_archived: bool) -> Result<E, StoreError> {
        self.table.0.lock().load(ref_id, allow_archived)
    }

    fn load_by_key(&self, trunk_ref_id: EntityId, key: &EntityKey) -> Result<E, StoreError> {
        self.table
            .0
            .lock()
            .iter()
            .find(|b| b.trunk_ref_id() == trunk_ref_id && b.key() == key)
            .cloned()
            .ok_or_else(|| StoreError::not_found(E::KIND, key))
    }

    fn find_all(
        &self,
        trunk_ref_id: EntityId,
        allow_archived: bool,
        filter_keys: Option<&[EntityKey]>,
    ) -> Result<Vec<E>, StoreError> {
        Ok(self
            .table
            .0
            .lock()
            .iter()
            .filter(|b| b.trunk_ref_id() == trunk_ref_id)
            .filter(|b| allow_archived || !b.archived())
            .filter(|b| filter_keys.map_or(true, |keys| keys.contains(b.key())))
            .cloned()
            .collect())
    }

    fn remove(&self, ref_id: EntityId) -> Result<E, StoreError> {
        self.table.0.lock().remove(ref_id)
    }
}

#[derive(Debug)]
pub struct InMemoryLeafRepository<E> {
    table: Table<E>,
}

impl<E> Default for InMemoryLeafRepository<E> {
    fn default() -> Self {
        Self {
            table: Table::default(),
        }
    }
}

impl<E: LeafEntity> InMemoryLeafRepository<E> {
    snapshot_methods!();
}

impl<E: LeafEntity> LeafRepository<E> for InMemoryLeafRepository<E> {
    fn create(&self, leaf: E) -> Result<E, StoreError> {
        Ok(self.table.0.lock().create(leaf))
    }

    fn save(&self, leaf: E) -> Result<E, StoreError> {
        self.table.0.lock().save(leaf)
    }

    fn load_by_id(&self, ref_id: EntityId, allow_archived: bool) -> Result<E, StoreError> {
        self.table.0.lock().load(ref_id, allow_archived)
    }

    fn find_all(
        &self,
        parent_ref_id: EntityId,
        allow_archived: bool,
        filter_ref_ids: Option<&HashSet<EntityId>>,
    ) -> Result<Vec<E>, StoreError> {
        Ok(self
            .table
            .0
            .lock()
            .iter()
            .filter(|l| l.parent_ref_id() == parent_ref_id)
            .filter(|l| allow_archived || !l.archived())
            .filter(|l| filter_ref_ids.map_or(true, |ids| ids.contains(&l.ref_id())))
            .cloned()
            .collect())
    }

    fn remove(&self, ref_id: EntityId) -> Result<E, StoreError> {
        self.table.0.lock().remove(ref_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BigPlan, BigPlanStatus, BigPlanCollection, EventSource, Metric};
    use crate::types::{EntityName, Timestamp};

    fn at(secs: i64) -> Timestamp {
        Timestamp::from_unix_secs(secs).unwrap()
    }

    fn plan(collection: u64, name: &str) -> BigPlan {
        BigPlan::new_big_plan(
            EntityId::new(collection),
            EntityName::new(name).unwrap(),
            BigPlanStatus::Accepted,
            None,
            EventSource::Cli,
            at(1),
        )
    }

    #[test]
    fn create_assigns_sequential_ids() {
        let repo = InMemoryLeafRepository::default();
        let a = repo.create(plan(1, "a")).unwrap();
        let b = repo.create(plan(1, "b")).unwrap();
        assert_eq!(a.ref_id(), EntityId::new(1));
        assert_eq!(b.ref_id(), EntityId::new(2));
    }

    #[test]
    fn save_of_unknown_leaf_fails() {
        let repo = InMemoryLeafRepository::default();
        let err = repo.save(plan(1, "a").assign_ref_id(EntityId::new(9))).unwrap_err();
        assert!(matches!(err, StoreError::EntityNotFound { .. }));
    }

    #[test]
    fn find_all_honours_parent_archival_and_filter() {
        let repo = InMemoryLeafRepository::default();
        let a = repo.create(plan(1, "a")).unwrap();
        let b = repo.create(plan(1, "b")).unwrap();
        repo.create(plan(2, "other")).unwrap();
        repo.save(b.clone().mark_archived(EventSource::Cli, at(2))).unwrap();

        assert_eq!(repo.find_all(EntityId::new(1), false, None).unwrap().len(), 1);
        assert_eq!(repo.find_all(EntityId::new(1), true, None).unwrap().len(), 2);

        let only_a = HashSet::from([a.ref_id()]);
        let found = repo.find_all(EntityId::new(1), true, Some(&only_a)).unwrap();
        assert_eq!(found, vec![a.clone()]);

        assert!(repo.load_by_id(b.ref_id(), false).is_err());
        assert!(repo.load_by_id(b.ref_id(), true).is_ok());
    }

    #[test]
    fn trunk_is_a_singleton_per_workspace() {
        let repo = InMemoryTrunkRepository::default();
        repo.create(BigPlanCollection::new_collection(EntityId::new(1), EventSource::Cli, at(1)))
            .unwrap();
        let dup = repo.create(BigPlanCollection::new_collection(
            EntityId::new(1),
            EventSource::Cli,
            at(2),
        ));
        assert!(matches!(dup, Err(StoreError::AlreadyExists { .. })));
        assert!(repo.load_by_parent(EntityId::new(1)).is_ok());
        assert!(repo.load_by_parent(EntityId::new(2)).is_err());
    }

    #[test]
    fn branch_keys_are_unique_per_trunk() {
        let repo = InMemoryBranchRepository::default();
        let metric = |key: &str| {
            Metric::new_metric(
                EntityId::new(1),
                EntityKey::new(key).unwrap(),
                EntityName::new("Weight").unwrap(),
                None,
                EventSource::Cli,
                at(1),
            )
        };
        repo.create(metric("weight")).unwrap();
        assert!(repo.create(metric("weight")).is_err());
        let key = EntityKey::new("weight").unwrap();
        assert!(repo.load_by_key(EntityId::new(1), &key).is_ok());
        assert_eq!(
            repo.find_all(EntityId::new(1), false, Some(&[key][..])).unwrap().len(),
            1
        );
    }
}
