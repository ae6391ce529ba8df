// src/output/render.rs
//! Plain-text rendering of progress and sync summaries for the terminal.

use super::types::{EntityProgress, MarkStatus, ProgressReporter};
use crate::sync::WorkspaceSyncSummary;
use std::fmt::Write;

/// One line per touched entity, followed by the totals.
pub fn render_progress(reporter: &ProgressReporter) -> String {
    let mut out = String::new();
    for entity in reporter.entities() {
        let _ = writeln!(out, "{}", render_entity(entity));
    }
    let stats = reporter.stats();
    let _ = writeln!(
        out,
        "{} created, {} updated, {} archived, {} removed, {} unchanged, {} failed steps",
        stats.created,
        stats.updated,
        stats.archived,
        stats.removed,
        stats.not_needed,
        stats.failed_steps
    );
    out
}

fn render_entity(entity: &EntityProgress) -> String {
    let id = entity
        .ref_id
        .map(|id| format!(" #{}", id))
        .unwrap_or_default();
    let marks = entity
        .marks
        .iter()
        .map(|m| match m.status {
            MarkStatus::Ok => m.mark.to_string(),
            MarkStatus::Failed => format!("{} (failed)", m.mark),
        })
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "{} {}{} '{}': {}",
        entity.action, entity.kind, id, entity.name, marks
    )
}

/// A small table of per-target counts.
pub fn render_sync_summary(summary: &WorkspaceSyncSummary) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<12} {:>8} {:>8} {:>8} {:>8} {:>8} {:>8}",
        "target", "branches", "+local", "~local", "+notion", "~notion", "-notion"
    );
    for t in &summary.targets {
        let _ = writeln!(
            out,
            "{:<12} {:>8} {:>8} {:>8} {:>8} {:>8} {:>8}",
            t.target.as_str(),
            t.branches,
            t.created_locally,
            t.modified_locally,
            t.created_remotely,
            t.modified_remotely,
            t.removed_remotely
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::EntityId;

    #[test]
    fn failed_steps_are_flagged() {
        let mut reporter = ProgressReporter::new();
        reporter
            .start_removing_entity("big plan", "Stray row")
            .entity_id(EntityId::new(7))
            .mark_other("remote remove", MarkStatus::Failed);

        let rendered = render_progress(&reporter);
        assert!(rendered.contains("removing big plan #7 'Stray row': remote remove (failed)"));
        assert!(rendered.contains("1 removed"));
    }
}
