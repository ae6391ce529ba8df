// src/main.rs

use clap::Parser;
use jupiter_sync::{
    render_progress, render_sync_summary, AppError, ArchiveWithInboxTasksService,
    CommandLineInput, DomainStorage, NotionStorage, Operation, ProgressReporter,
    SmartListRemoveService, SyncConfig, SyncOrchestrator, SystemTimeProvider, TimeProvider,
    WorkspaceSnapshot, LOG_FILE_NAME,
};
use log::LevelFilter;
use log4rs::{
    append::console::ConsoleAppender,
    append::file::FileAppender,
    config::{Appender, Root},
    encode::pattern::PatternEncoder,
    filter::threshold::ThresholdFilter,
    Config,
};
use std::fs;

/// Sets up logging configuration.
fn setup_logging(verbose: bool) -> Result<(), Box<dyn std::error::Error>> {
    let log_level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };

    let log_file_path = std::env::temp_dir().join(LOG_FILE_NAME);
    if let Some(parent) = log_file_path.parent() {
        fs::create_dir_all(parent)?;
    }

    let pattern = if verbose {
        "{d(%Y-%m-%d %H:%M:%S)} [{l}] - {m}{n}"
    } else {
        "{m}{n}"
    };

    let stdout_appender = ConsoleAppender::builder()
        .encoder(Box::new(PatternEncoder::new(pattern)))
        .build();

    let file_appender = FileAppender::builder()
        .encoder(Box::new(PatternEncoder::new(
            "{d(%Y-%m-%d %H:%M:%S)} [{l}] - {m}{n}",
        )))
        .build(&log_file_path)?;

    let config = Config::builder()
        .appender(Appender::builder().build("stdout", Box::new(stdout_appender)))
        .appender(
            Appender::builder()
                .filter(Box::new(ThresholdFilter::new(LevelFilter::Debug)))
                .build("file", Box::new(file_appender)),
        )
        .build(
            Root::builder()
                .appender("stdout")
                .appender("file")
                .build(log_level),
        )?;

    log4rs::init_config(config)?;
    log::info!("Logging initialized. Log file: {}", log_file_path.display());
    Ok(())
}

/// Runs one operation against both stores.
fn run_operation(
    operation: &Operation,
    local: &DomainStorage,
    notion: &NotionStorage,
    reporter: &mut ProgressReporter,
) -> Result<(), AppError> {
    let time = SystemTimeProvider;
    let repositories = local.repositories();
    let managers = notion.managers();

    match operation {
        Operation::Sync {
            workspace_ref_id,
            request,
        } => {
            let created = repositories.ensure_workspace(*workspace_ref_id, time.right_now())?;
            if created > 0 {
                log::info!("Created {} collections for workspace {}", created, workspace_ref_id);
            }
            let summary = SyncOrchestrator::new(repositories, managers).sync(
                *workspace_ref_id,
                request,
                reporter,
            )?;
            print!("{}", render_sync_summary(&summary));
        }
        Operation::ArchiveBigPlan {
            workspace_ref_id,
            big_plan_ref_id,
        } => {
            ArchiveWithInboxTasksService::for_big_plans(repositories, managers, &time).archive(
                *workspace_ref_id,
                *big_plan_ref_id,
                reporter,
            )?;
        }
        Operation::ArchiveSlackTask {
            workspace_ref_id,
            slack_task_ref_id,
        } => {
            ArchiveWithInboxTasksService::for_slack_tasks(repositories, managers, &time).archive(
                *workspace_ref_id,
                *slack_task_ref_id,
                reporter,
            )?;
        }
        Operation::RemoveSmartList {
            workspace_ref_id,
            key,
        } => {
            SmartListRemoveService::new(repositories, managers).remove(
                *workspace_ref_id,
                key,
                reporter,
            )?;
        }
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = CommandLineInput::parse();

    setup_logging(cli.verbose)?;

    let config = SyncConfig::resolve(cli)?;
    let snapshot = WorkspaceSnapshot::new(&config.state_dir);
    let (local, notion) = snapshot.load()?;

    let mut reporter = ProgressReporter::new();
    let outcome = run_operation(&config.operation, &local, &notion, &mut reporter);

    // Local writes that happened before a failure are kept.
    snapshot.save(&local, &notion)?;
    print!("{}", render_progress(&reporter));

    outcome?;
    Ok(())
}
