// src/sync/reconcile.rs
//! The three reconciliation passes, shared by every sync shape.

use super::{tolerate_missing, SyncOptions, SyncResult};
use crate::algebras::{LeafRepository, RemoteLeafSet};
use crate::error::Result;
use crate::model::LeafEntity;
use crate::notion::NotionLeaf;
use crate::output::{MarkStatus, ProgressReporter};
use crate::types::{EntityId, NotionId, SyncPrefer};
use indexmap::IndexMap;
use std::collections::HashSet;

/// Reconciles the leaves under `parent_ref_id` with one remote row set.
///
/// Pass A walks the remote rows: unlinked rows become new local leaves,
/// linked rows are merged in the preferred direction, and anything else
/// (rows pointing at leaves that no longer exist, copies of linked rows) is
/// removed by its own remote id. Pass B gives every unmatched, unarchived
/// local leaf a remote row. Archived leaves stay in the returned set.
pub fn reconcile_leaves<L, N, R>(
    local: &dyn LeafRepository<L>,
    remote: &R,
    parent_ref_id: EntityId,
    direct_info: &N::DirectInfo,
    inverse_info: &N::InverseInfo,
    options: &SyncOptions,
    reporter: &mut ProgressReporter,
) -> Result<SyncResult<L>>
where
    L: LeafEntity,
    N: NotionLeaf<Entity = L>,
    R: RemoteLeafSet<N> + ?Sized,
{
    let all_local: IndexMap<EntityId, L> = local
        .find_all(parent_ref_id, true, options.filter_ref_ids.as_ref())?
        .into_iter()
        .map(|leaf| (leaf.ref_id(), leaf))
        .collect();

    let (all_rows, linked): (Vec<N>, HashSet<NotionId>) = if options.drop_all_notion_side {
        log::info!("Dropping every remote {} under {}", L::KIND, parent_ref_id);
        remote.drop_all()?;
        (Vec::new(), HashSet::new())
    } else {
        let rows = remote.load_all()?;
        let linked = remote.load_all_saved_notion_ids()?.into_iter().collect();
        (rows, linked)
    };

    log::info!(
        "Reconciling {} local and {} remote {} rows under {}",
        all_local.len(),
        all_rows.len(),
        L::KIND,
        parent_ref_id
    );

    let mut result = SyncResult::default();
    let mut matched: HashSet<EntityId> = HashSet::new();

    for row in all_rows {
        if !options.allows(row.ref_id()) {
            continue;
        }
        let name = row.nice_name();

        match row.ref_id() {
            None => {
                let leaf = local.create(row.new_entity(parent_ref_id, inverse_info)?)?;
                let progress = reporter
                    .start_creating_entity(L::KIND, &name)
                    .entity_id(leaf.ref_id())
                    .mark_local_change();
                log::debug!("Created {} '{}' from an unlinked remote row", L::KIND, name);

                remote.link(leaf.ref_id(), row.notion_id())?;
                progress.mark_other("linking", MarkStatus::Ok);

                let status = tolerate_missing(
                    remote.save(row.join_with_entity(&leaf, direct_info)),
                    "remote save",
                    &name,
                )?;
                progress.mark_remote_change(status);

                result.created_locally.push(leaf.ref_id());
                result.all.push(leaf);
            }
            Some(ref_id)
                if all_local.contains_key(&ref_id) && linked.contains(row.notion_id()) =>
            {
                matched.insert(ref_id);
                let Some(leaf) = all_local.get(&ref_id).cloned() else {
                    continue;
                };
                let leaf = merge_linked(
                    local,
                    remote,
                    &row,
                    leaf,
                    direct_info,
                    inverse_info,
                    options,
                    reporter,
                    &mut result,
                )?;
                result.all.push(leaf);
            }
            Some(ref_id) => {
                let progress = reporter
                    .start_removing_entity(L::KIND, &name)
                    .entity_id(ref_id);
                log::info!(
                    "Removing remote {} '{}' ({}), it has no local counterpart",
                    L::KIND,
                    name,
                    row.notion_id()
                );
                let status =
                    tolerate_missing(remote.remove_row(row.notion_id()), "remote remove", &name)?;
                progress.mark_other("remote remove", status);
                result.removed_remotely.push(ref_id);
            }
        }
    }

    for (ref_id, leaf) in all_local {
        if matched.contains(&ref_id) {
            continue;
        }
        if leaf.archived() {
            result.all.push(leaf);
            continue;
        }
        let row = remote.upsert(N::new_notion_row(&leaf, direct_info))?;
        reporter
            .start_creating_entity(L::KIND, &leaf.nice_name())
            .entity_id(ref_id)
            .mark_other("remote create", MarkStatus::Ok);
        log::debug!(
            "Created remote {} '{}' as {}",
            L::KIND,
            leaf.nice_name(),
            row.notion_id()
        );
        result.created_remotely.push(ref_id);
        result.all.push(leaf);
    }

    Ok(result)
}

/// Pass A for a row whose leaf exists locally and whose link is recorded.
#[allow(clippy::too_many_arguments)]
fn merge_linked<L, N, R>(
    local: &dyn LeafRepository<L>,
    remote: &R,
    row: &N,
    leaf: L,
    direct_info: &N::DirectInfo,
    inverse_info: &N::InverseInfo,
    options: &SyncOptions,
    reporter: &mut ProgressReporter,
    result: &mut SyncResult<L>,
) -> Result<L>
where
    L: LeafEntity,
    N: NotionLeaf<Entity = L>,
    R: RemoteLeafSet<N> + ?Sized,
{
    let name = row.nice_name();
    let progress = reporter
        .start_updating_entity(L::KIND, &name)
        .entity_id(leaf.ref_id());
    let force = options.sync_even_if_not_modified;

    match options.sync_prefer {
        SyncPrefer::Notion => {
            if !force && row.last_edited_time() <= leaf.last_modified_time() {
                progress.mark_not_needed();
                return Ok(leaf);
            }
            let outcome = row.apply_to_entity(leaf, inverse_info)?;
            let leaf = local.save(outcome.entity)?;
            progress.mark_local_change();
            result.modified_locally.push(leaf.ref_id());

            if outcome.should_modify_on_notion {
                let status = tolerate_missing(
                    remote.save(row.join_with_entity(&leaf, direct_info)),
                    "remote save",
                    &name,
                )?;
                progress.mark_remote_change(status);
            }
            Ok(leaf)
        }
        SyncPrefer::Local => {
            if !force && leaf.last_modified_time() <= row.last_edited_time() {
                progress.mark_not_needed();
                return Ok(leaf);
            }
            let status = tolerate_missing(
                remote.save(row.join_with_entity(&leaf, direct_info)),
                "remote save",
                &name,
            )?;
            progress.mark_remote_change(status);
            result.modified_remotely.push(leaf.ref_id());
            Ok(leaf)
        }
    }
}
