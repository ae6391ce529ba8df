// src/lib.rs
//! jupiter-sync library: two-way reconciliation between a local entity
//! store and Notion.
//!
//! # Public API
//!
//! The library exposes types organized by concern:
//! - **Error handling**: `AppError`, `NotionStoreError`, `StoreError`, `ValidationError`
//! - **Configuration**: `CommandLineInput`, `SyncConfig`
//! - **Domain model**: entity traits and the concrete kinds (`InboxTask`, `BigPlan`, ...)
//! - **Notion projections**: `NotionLeaf`, `NotionBranch` and one row type per kind
//! - **Storage**: repository and Notion manager traits, in-memory stores, snapshots
//! - **Sync**: `TrunkLeafSync`, `TrunkBranchLeafSync`, `TrunkBranchLeafTagSync`,
//!   `SyncOrchestrator`
//! - **Services**: archive and remove use cases
//! - **Output**: `ProgressReporter` and its rendering

pub mod algebras;
pub mod config;
mod constants;
pub mod error;
pub mod model;
pub mod notion;
pub mod output;
pub mod service;
pub mod store;
pub mod sync;
pub mod types;

// --- Error Handling ---
pub use crate::error::{AppError, NotionStoreError, RemoteKey, StoreError};
pub use crate::types::ValidationError;

// --- Configuration ---
pub use crate::config::{CommandLineInput, Operation, SyncConfig};
pub use crate::constants::LOG_FILE_NAME;

// --- Domain Types ---
pub use crate::types::{
    ADate, EntityId, EntityKey, EntityName, FixedTimeProvider, NotionId, SyncPrefer,
    SystemTimeProvider, TagName, TimeProvider, Timestamp, ValidatedUrl,
};

// --- Domain Model ---
pub use crate::model::{
    BigPlan, BigPlanStatus, BranchEntity, BranchTagEntity, Entity, EntityHeader, EventSource,
    InboxTask, InboxTaskSource, InboxTaskStatus, LeafEntity, Metric, MetricEntry, SlackTask,
    SmartList, SmartListItem, SmartListTag, TrunkEntity, UpdateAction, Vacation,
};

// --- Notion Projections ---
pub use crate::notion::{
    NotionBigPlan, NotionBranch, NotionInboxTask, NotionLeaf, NotionMetric, NotionMetricEntry,
    NotionSlackTask, NotionSmartList, NotionSmartListItem, NotionSmartListTag, NotionVacation,
};

// --- Storage ---
pub use crate::store::{
    DomainStorage, LocalRepositories, NotionManagers, NotionStorage, WorkspaceSnapshot,
};

// --- Sync ---
pub use crate::sync::{
    SyncOptions, SyncOrchestrator, SyncResult, SyncTarget, TrunkBranchLeafSync,
    TrunkBranchLeafTagSync, TrunkLeafSync, WorkspaceSyncRequest, WorkspaceSyncSummary,
};

// --- Services ---
pub use crate::service::{ArchiveWithInboxTasksService, LeafRemoveService, SmartListRemoveService};

// --- Output ---
pub use crate::output::{render_progress, render_sync_summary, ProgressReporter};
