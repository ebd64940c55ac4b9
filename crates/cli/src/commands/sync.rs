//! `gridstudy sync <study> <FILE> [--dry-run]`

use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use gridstudy_core::StudyId;
use gridstudy_variants::{Command, CommandStore, SyncPlan, SyncStats, command, reconcile};

use super::{parse_study, render_list};

#[derive(Debug, Args)]
pub struct SyncArgs {
    /// Study identifier
    pub study: String,

    /// JSON array of desired commands; entries with an `id` match existing commands
    pub file: PathBuf,

    /// Only print the remote calls that would be issued
    #[arg(long)]
    pub dry_run: bool,
}

/// Outcome of a sync, for printing.
#[derive(Debug, PartialEq)]
pub enum SyncOutcome {
    Planned(SyncStats),
    Applied {
        stats: SyncStats,
        commands: Vec<Command>,
    },
}

pub async fn execute<S: CommandStore>(store: &S, args: SyncArgs) -> anyhow::Result<()> {
    let study = parse_study(&args.study)?;
    let text = std::fs::read_to_string(&args.file)
        .with_context(|| format!("failed to read {}", args.file.display()))?;
    let desired = command::parse_json(&text)
        .with_context(|| format!("failed to parse {}", args.file.display()))?;

    match sync_study(store, &study, &desired, args.dry_run).await? {
        SyncOutcome::Planned(stats) => {
            println!(
                "dry run: {} delete(s), {} append(s), {} update(s), {} move(s)",
                stats.deleted, stats.appended, stats.updated, stats.moved
            );
        }
        SyncOutcome::Applied { stats, commands } => {
            if stats.is_noop() {
                println!("study {study} already up to date");
            } else {
                println!("{}", render_list(&commands));
            }
        }
    }
    Ok(())
}

/// Fetch the remote list and converge it to `desired`.
pub async fn sync_study<S: CommandStore>(
    store: &S,
    study: &StudyId,
    desired: &[Command],
    dry_run: bool,
) -> anyhow::Result<SyncOutcome> {
    let prior = store
        .list(study)
        .await
        .with_context(|| format!("failed to fetch commands of study {study}"))?;
    let stats = SyncPlan::compute(&prior, desired).stats();

    if dry_run {
        return Ok(SyncOutcome::Planned(stats));
    }

    let commands = reconcile(store, study, &prior, desired)
        .await
        .context("synchronization failed; the remote list may be partially updated")?;
    Ok(SyncOutcome::Applied { stats, commands })
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridstudy_variants::InMemoryCommandStore;
    use serde_json::json;

    fn study() -> StudyId {
        StudyId::new_unchecked("cli-study")
    }

    #[tokio::test]
    async fn dry_run_leaves_remote_untouched() {
        let store = InMemoryCommandStore::new();
        let prior = store
            .seed(&study(), vec![Command::new("a", json!({})), Command::new("b", json!({}))])
            .unwrap();
        let desired = vec![prior[1].clone(), Command::new("c", json!({}))];

        let outcome = sync_study(&store, &study(), &desired, true).await.unwrap();

        assert_eq!(
            outcome,
            SyncOutcome::Planned(SyncStats {
                deleted: 1,
                appended: 1,
                updated: 0,
                moved: 0,
            })
        );
        assert_eq!(store.snapshot(&study()).unwrap(), prior);
    }

    #[tokio::test]
    async fn sync_applies_file_contents() {
        let store = InMemoryCommandStore::new();
        let prior = store
            .seed(&study(), vec![Command::new("a", json!({"x": 1}))])
            .unwrap();
        let mut edited = prior[0].clone();
        edited.args = json!({"x": 2});
        let desired = vec![Command::new("z", json!({})), edited];

        let outcome = sync_study(&store, &study(), &desired, false).await.unwrap();

        let SyncOutcome::Applied { stats, commands } = outcome else {
            panic!("expected applied outcome");
        };
        assert_eq!(stats.updated, 1);
        assert_eq!(stats.appended, 1);
        assert_eq!(store.snapshot(&study()).unwrap(), commands);
        assert_eq!(commands[0].action, "z");
    }

    #[test]
    fn renders_one_line_per_command() {
        let cmds = vec![
            Command::new("a", json!({})).with_id(gridstudy_core::CommandId::new_unchecked("c1")),
            Command::new("b", json!({})),
        ];
        assert_eq!(render_list(&cmds), "   0  c1  a\n   1  -  b");
    }
}
