//! Archive and remove use cases.
//!
//! Both commit the local change first and then clean up Notion on a best
//! effort basis: a remote row that is already gone is reported as a failed
//! step, never as an error.

mod archive;
mod remove;

pub use archive::{archive_leaf, ArchiveWithInboxTasksService, InboxTaskOwner};
pub use remove::{remove_leaf, LeafRemoveService, SmartListRemoveService};
