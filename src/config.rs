// src/config.rs
use crate::constants::{DEFAULT_STATE_DIR, STATE_DIR_ENV};
use crate::error::AppError;
use crate::sync::{SyncOptions, SyncTarget, WorkspaceSyncRequest};
use crate::types::{EntityId, EntityKey, SyncPrefer};
use clap::{Parser, Subcommand};
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;

/// Parsed command-line input.
#[derive(Parser, Debug)]
#[command(author, version, about = "Two-way sync between Jupiter and Notion", long_about = None)]
pub struct CommandLineInput {
    /// Enable verbose logging (debug level)
    #[arg(short, long, global = true, default_value_t = false)]
    pub verbose: bool,

    /// Directory holding the local and Notion state files
    #[arg(long, global = true)]
    pub state_dir: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Reconcile local entities with Notion
    Sync {
        /// Workspace ref id
        #[arg(long)]
        workspace: String,

        /// Entity kinds to sync (repeatable, default all)
        #[arg(long = "target")]
        targets: Vec<String>,

        /// Which side wins when both changed: local or notion
        #[arg(long, default_value = "notion")]
        prefer: String,

        /// Wipe the Notion side first and rebuild it from local data
        #[arg(long, default_value_t = false)]
        drop_all_notion: bool,

        /// Merge every linked pair regardless of modification times
        #[arg(long, default_value_t = false)]
        sync_even_if_not_modified: bool,

        /// Only sync these leaf ref ids (repeatable)
        #[arg(long = "filter-ref-id")]
        filter_ref_ids: Vec<String>,

        /// Only sync metrics and smart lists with these keys (repeatable)
        #[arg(long = "filter-branch-key")]
        filter_branch_keys: Vec<String>,
    },

    /// Archive a big plan or Slack task together with its inbox tasks
    Archive {
        #[arg(long)]
        workspace: String,

        #[arg(long, conflicts_with = "slack_task", required_unless_present = "slack_task")]
        big_plan: Option<String>,

        #[arg(long)]
        slack_task: Option<String>,
    },

    /// Hard-remove a smart list with all its items and tags
    Remove {
        #[arg(long)]
        workspace: String,

        #[arg(long)]
        smart_list: String,
    },
}

/// A validated operation, ready to run.
#[derive(Debug, Clone)]
pub enum Operation {
    Sync {
        workspace_ref_id: EntityId,
        request: WorkspaceSyncRequest,
    },
    ArchiveBigPlan {
        workspace_ref_id: EntityId,
        big_plan_ref_id: EntityId,
    },
    ArchiveSlackTask {
        workspace_ref_id: EntityId,
        slack_task_ref_id: EntityId,
    },
    RemoveSmartList {
        workspace_ref_id: EntityId,
        key: EntityKey,
    },
}

/// Resolved configuration of one run.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    pub state_dir: PathBuf,
    pub verbose: bool,
    pub operation: Operation,
}

impl SyncConfig {
    /// Resolves the configuration from CLI input and environment.
    pub fn resolve(cli: CommandLineInput) -> Result<Self, AppError> {
        Self::resolve_with(cli, std::env::var(STATE_DIR_ENV).ok())
    }

    fn resolve_with(
        cli: CommandLineInput,
        env_state_dir: Option<String>,
    ) -> Result<Self, AppError> {
        let state_dir = cli
            .state_dir
            .or(env_state_dir)
            .filter(|dir| !dir.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_STATE_DIR));

        let operation = match cli.command {
            Command::Sync {
                workspace,
                targets,
                prefer,
                drop_all_notion,
                sync_even_if_not_modified,
                filter_ref_ids,
                filter_branch_keys,
            } => {
                let targets = targets
                    .iter()
                    .map(|t| t.parse::<SyncTarget>())
                    .collect::<Result<Vec<_>, _>>()?;
                let filter = filter_ref_ids
                    .iter()
                    .map(|id| EntityId::parse(id))
                    .collect::<Result<HashSet<_>, _>>()?;
                let branch_keys = filter_branch_keys
                    .iter()
                    .map(|key| key.parse::<EntityKey>())
                    .collect::<Result<Vec<_>, _>>()?;

                let leaf_filters: HashMap<SyncTarget, HashSet<EntityId>> = if filter.is_empty() {
                    Default::default()
                } else {
                    let scope = if targets.is_empty() {
                        SyncTarget::ALL.to_vec()
                    } else {
                        targets.clone()
                    };
                    scope.into_iter().map(|t| (t, filter.clone())).collect()
                };

                Operation::Sync {
                    workspace_ref_id: EntityId::parse(&workspace)?,
                    request: WorkspaceSyncRequest {
                        targets,
                        options: SyncOptions {
                            drop_all_notion_side: drop_all_notion,
                            sync_even_if_not_modified,
                            filter_ref_ids: None,
                            sync_prefer: prefer.parse::<SyncPrefer>()?,
                        },
                        leaf_filters,
                        branch_keys: (!branch_keys.is_empty()).then_some(branch_keys),
                    },
                }
            }
            Command::Archive {
                workspace,
                big_plan,
                slack_task,
            } => {
                let workspace_ref_id = EntityId::parse(&workspace)?;
                match (big_plan, slack_task) {
                    (Some(id), None) => Operation::ArchiveBigPlan {
                        workspace_ref_id,
                        big_plan_ref_id: EntityId::parse(&id)?,
                    },
                    (None, Some(id)) => Operation::ArchiveSlackTask {
                        workspace_ref_id,
                        slack_task_ref_id: EntityId::parse(&id)?,
                    },
                    _ => {
                        return Err(AppError::MissingConfiguration(
                            "archive needs exactly one of --big-plan or --slack-task".to_string(),
                        ))
                    }
                }
            }
            Command::Remove {
                workspace,
                smart_list,
            } => Operation::RemoveSmartList {
                workspace_ref_id: EntityId::parse(&workspace)?,
                key: smart_list.parse::<EntityKey>()?,
            },
        };

        Ok(SyncConfig {
            state_dir,
            verbose: cli.verbose,
            operation,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse(args: &[&str]) -> CommandLineInput {
        let argv = std::iter::once("jupiter-sync").chain(args.iter().copied());
        CommandLineInput::try_parse_from(argv).expect("arguments should parse")
    }

    #[test]
    fn sync_flags_resolve_into_a_request() {
        let cli = parse(&[
            "sync",
            "--workspace",
            "1",
            "--target",
            "inbox-tasks",
            "--prefer",
            "local",
            "--filter-ref-id",
            "4",
        ]);
        let config = SyncConfig::resolve_with(cli, None).unwrap();
        assert_eq!(config.state_dir, PathBuf::from(DEFAULT_STATE_DIR));

        let Operation::Sync {
            workspace_ref_id,
            request,
        } = config.operation
        else {
            panic!("expected a sync operation");
        };
        assert_eq!(workspace_ref_id, EntityId::new(1));
        assert_eq!(request.targets, vec![SyncTarget::InboxTasks]);
        assert_eq!(request.options.sync_prefer, SyncPrefer::Local);
        assert_eq!(
            request.leaf_filters.get(&SyncTarget::InboxTasks),
            Some(&HashSet::from([EntityId::new(4)]))
        );
        assert_eq!(request.leaf_filters.get(&SyncTarget::BigPlans), None);
    }

    #[test]
    fn invalid_preference_is_rejected() {
        let cli = parse(&["sync", "--workspace", "1", "--prefer", "both"]);
        let err = SyncConfig::resolve_with(cli, None).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn state_dir_flag_beats_environment() {
        let cli = parse(&[
            "--state-dir",
            "/tmp/a",
            "remove",
            "--workspace",
            "1",
            "--smart-list",
            "books",
        ]);
        let config = SyncConfig::resolve_with(cli, Some("/tmp/b".into())).unwrap();
        assert_eq!(config.state_dir, PathBuf::from("/tmp/a"));

        let cli = parse(&["remove", "--workspace", "1", "--smart-list", "books"]);
        let config = SyncConfig::resolve_with(cli, Some("/tmp/b".into())).unwrap();
        assert_eq!(config.state_dir, PathBuf::from("/tmp/b"));
    }

    #[test]
    fn archive_takes_one_owner() {
        let cli = parse(&["archive", "--workspace", "2", "--slack-task", "9"]);
        let config = SyncConfig::resolve_with(cli, None).unwrap();
        assert!(matches!(
            config.operation,
            Operation::ArchiveSlackTask { slack_task_ref_id, .. }
                if slack_task_ref_id == EntityId::new(9)
        ));
        assert!(CommandLineInput::try_parse_from([
            "jupiter-sync",
            "archive",
            "--workspace",
            "2",
            "--big-plan",
            "1",
            "--slack-task",
            "9"
        ])
        .is_err());
    }
}
