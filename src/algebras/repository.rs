//! Local storage capabilities, one trait per entity shape.
//!
//! Every call is its own short commit. Implementations use interior
//! mutability so a sync run can hold shared references to all of them.

use crate::error::StoreError;
use crate::model::{BranchEntity, LeafEntity, TrunkEntity};
use crate::types::{EntityId, EntityKey};
use std::collections::HashSet;

/// Storage for singleton trunks.
///
/// # Laws
///
/// - **L1 (Singleton)**: after `create(t)`, `load_by_parent(t.workspace_ref_id())`
///   returns `t` with its assigned id.
/// - **L2 (No duplicates)**: a second `create` for the same workspace fails
///   with `AlreadyExists`.
pub trait TrunkRepository<T: TrunkEntity>: Send + Sync {
    /// Stores a new trunk and returns it with its assigned id.
    fn create(&self, trunk: T) -> Result<T, StoreError>;

    /// Overwrites an existing trunk. Fails if it does not exist.
    fn save(&self, trunk: T) -> Result<T, StoreError>;

    fn load_by_id(&self, ref_id: EntityId) -> Result<T, StoreError>;

    fn load_by_parent(&self, workspace_ref_id: EntityId) -> Result<T, StoreError>;
}

/// Storage for branches, keyed both by id and by their slug.
///
/// # Laws
///
/// - **L1 (Unique key)**: two branches of one trunk never share a key.
/// - **L2 (Archival filter)**: `find_all(t, false, _)` never returns an
///   archived branch; `load_by_id(id, false)` fails for one.
pub trait BranchRepository<B: BranchEntity>: Send + Sync {
    fn create(&self, branch: B) -> Result<B, StoreError>;

    fn save(&self, branch: B) -> Result<B, StoreError>;

    fn load_by_id(&self, ref_id: EntityId, allow_archived: bool) -> Result<B, StoreError>;

    fn load_by_key(&self, trunk_ref_id: EntityId, key: &EntityKey) -> Result<B, StoreError>;

    fn find_all(
        &self,
        trunk_ref_id: EntityId,
        allow_archived: bool,
        filter_keys: Option<&[EntityKey]>,
    ) -> Result<Vec<B>, StoreError>;

    /// Hard delete. Returns the removed branch.
    fn remove(&self, ref_id: EntityId) -> Result<B, StoreError>;
}

/// Storage for leaves under a trunk or branch.
///
/// # Laws
///
/// - **L1 (Fresh ids)**: `create` assigns an id no other leaf of this kind
///   has ever had.
/// - **L2 (Save requires existence)**: `save(l)` fails with
///   `EntityNotFound` unless `l.ref_id()` was created and not removed.
/// - **L3 (Filtering)**: `find_all(p, a, Some(ids))` returns exactly the
///   leaves of `p` whose id is in `ids`, subject to the archival flag.
pub trait LeafRepository<L: LeafEntity>: Send + Sync {
    fn create(&self, leaf: L) -> Result<L, StoreError>;

    fn save(&self, leaf: L) -> Result<L, StoreError>;

    fn load_by_id(&self, ref_id: EntityId, allow_archived: bool) -> Result<L, StoreError>;

    fn find_all(
        &self,
        parent_ref_id: EntityId,
        allow_archived: bool,
        filter_ref_ids: Option<&HashSet<EntityId>>,
    ) -> Result<Vec<L>, StoreError>;

    /// Hard delete, bypassing archival. Returns the removed leaf.
    fn remove(&self, ref_id: EntityId) -> Result<L, StoreError>;
}
