//! Capability algebras for jupiter-sync.
//!
//! This module defines the traits the reconciliation engine is written
//! against. Each trait is a **capability**, not an implementation:
//!
//! - **Object-safe**: can be used as `dyn Trait`
//! - **Documented with laws**: properties that all implementations must satisfy
//! - **Synchronous**: one sync run is a sequence of short, blocking calls
//!
//! # Architecture
//!
//! ```text
//! Sync engine (sync/)
//!         ↓
//! Algebras (algebras/)
//!         ↓
//! Stores (store/): in-memory reference stores, JSON snapshots
//! ```
//!
//! # Capability Traits
//!
//! - [`TrunkRepository`], [`BranchRepository`], [`LeafRepository`]: local storage
//! - [`TrunkLeafNotionManager`]: remote rows of a trunk's leaves
//! - [`BranchNotionManager`], [`BranchLeafNotionManager`],
//!   [`BranchTagNotionManager`]: remote pages, rows and tags of a branch
//! - [`RemoteLeafSet`]: one remote collection of leaf rows, the shape the
//!   three-pass reconciliation is written against

pub mod notion_manager;
pub mod repository;

pub use notion_manager::{
    BranchLeafNotionManager, BranchLeaves, BranchNotionManager, BranchTagNotionManager,
    BranchTags, RemoteLeafSet, TrunkBranchLeafAndTagNotionManager, TrunkBranchLeafNotionManager,
    TrunkLeafNotionManager, TrunkLeaves,
};
pub use repository::{BranchRepository, LeafRepository, TrunkRepository};
