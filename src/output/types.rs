// src/output/types.rs
//! Per-record progress collected while a use case runs.
//!
//! Every entity a sync or service touches gets one [`EntityProgress`]. The
//! steps performed on it are appended as marks, so a partially failed
//! record still shows what did happen.

use crate::types::EntityId;
use std::fmt;

/// What is being done to an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityAction {
    Creating,
    Updating,
    Archiving,
    Removing,
}

impl fmt::Display for EntityAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Creating => "creating",
            Self::Updating => "updating",
            Self::Archiving => "archiving",
            Self::Removing => "removing",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkStatus {
    Ok,
    Failed,
}

/// One step performed on an entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressMark {
    LocalChange,
    RemoteChange,
    NotNeeded,
    Other(String),
}

impl fmt::Display for ProgressMark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LocalChange => f.write_str("local change"),
            Self::RemoteChange => f.write_str("remote change"),
            Self::NotNeeded => f.write_str("not needed"),
            Self::Other(step) => f.write_str(step),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepMark {
    pub mark: ProgressMark,
    pub status: MarkStatus,
}

/// Progress of one entity through a use case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityProgress {
    pub action: EntityAction,
    pub kind: &'static str,
    pub ref_id: Option<EntityId>,
    pub name: String,
    pub marks: Vec<StepMark>,
}

impl EntityProgress {
    fn new(action: EntityAction, kind: &'static str, name: String) -> Self {
        Self {
            action,
            kind,
            ref_id: None,
            name,
            marks: Vec::new(),
        }
    }

    /// Sets the ref id once it is known, e.g. after a local create.
    pub fn entity_id(&mut self, ref_id: EntityId) -> &mut Self {
        self.ref_id = Some(ref_id);
        self
    }

    pub fn mark_local_change(&mut self) -> &mut Self {
        self.mark(ProgressMark::LocalChange, MarkStatus::Ok)
    }

    pub fn mark_remote_change(&mut self, status: MarkStatus) -> &mut Self {
        self.mark(ProgressMark::RemoteChange, status)
    }

    pub fn mark_not_needed(&mut self) -> &mut Self {
        self.mark(ProgressMark::NotNeeded, MarkStatus::Ok)
    }

    pub fn mark_other(&mut self, step: &str, status: MarkStatus) -> &mut Self {
        self.mark(ProgressMark::Other(step.to_string()), status)
    }

    fn mark(&mut self, mark: ProgressMark, status: MarkStatus) -> &mut Self {
        self.marks.push(StepMark { mark, status });
        self
    }

    pub fn has_failures(&self) -> bool {
        self.marks.iter().any(|m| m.status == MarkStatus::Failed)
    }

    pub fn was_needed(&self) -> bool {
        !self.marks.iter().any(|m| m.mark == ProgressMark::NotNeeded)
    }
}

/// Collects the progress of every entity a use case touches, in order.
#[derive(Debug, Clone, Default)]
pub struct ProgressReporter {
    entities: Vec<EntityProgress>,
}

impl ProgressReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start_creating_entity(&mut self, kind: &'static str, name: &str) -> &mut EntityProgress {
        self.start(EntityAction::Creating, kind, name)
    }

    pub fn start_updating_entity(&mut self, kind: &'static str, name: &str) -> &mut EntityProgress {
        self.start(EntityAction::Updating, kind, name)
    }

    pub fn start_archiving_entity(
        &mut self,
        kind: &'static str,
        name: &str,
    ) -> &mut EntityProgress {
        self.start(EntityAction::Archiving, kind, name)
    }

    pub fn start_removing_entity(&mut self, kind: &'static str, name: &str) -> &mut EntityProgress {
        self.start(EntityAction::Removing, kind, name)
    }

    fn start(
        &mut self,
        action: EntityAction,
        kind: &'static str,
        name: &str,
    ) -> &mut EntityProgress {
        log::debug!("{} {} '{}'", action, kind, name);
        let index = self.entities.len();
        self.entities
            .push(EntityProgress::new(action, kind, name.to_string()));
        &mut self.entities[index]
    }

    pub fn entities(&self) -> &[EntityProgress] {
        &self.entities
    }

    pub fn failures(&self) -> impl Iterator<Item = &EntityProgress> {
        self.entities.iter().filter(|e| e.has_failures())
    }

    pub fn stats(&self) -> ProgressStats {
        self.entities
            .iter()
            .fold(ProgressStats::default(), |mut stats, entity| {
                if !entity.was_needed() {
                    stats.not_needed += 1;
                    return stats;
                }
                match entity.action {
                    EntityAction::Creating => stats.created += 1,
                    EntityAction::Updating => stats.updated += 1,
                    EntityAction::Archiving => stats.archived += 1,
                    EntityAction::Removing => stats.removed += 1,
                }
                stats.failed_steps += entity
                    .marks
                    .iter()
                    .filter(|m| m.status == MarkStatus::Failed)
                    .count();
                stats
            })
    }
}

/// Counts over a [`ProgressReporter`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProgressStats {
    pub created: usize,
    pub updated: usize,
    pub archived: usize,
    pub removed: usize,
    pub not_needed: usize,
    pub failed_steps: usize,
}
