//! `gridstudy export <study> [--output FILE]`

use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use gridstudy_variants::{CommandStore, command};

use super::parse_study;

#[derive(Debug, Args)]
pub struct ExportArgs {
    /// Study identifier
    pub study: String,

    /// Write to this file instead of stdout
    #[arg(long, short)]
    pub output: Option<PathBuf>,
}

pub async fn execute<S: CommandStore>(store: &S, args: ExportArgs) -> anyhow::Result<()> {
    let study = parse_study(&args.study)?;
    let commands = store.list(&study).await?;
    let text = command::export_json(&commands)?;

    match args.output {
        Some(path) => {
            std::fs::write(&path, text)
                .with_context(|| format!("failed to write {}", path.display()))?;
            tracing::info!(
                study = %study,
                commands = commands.len(),
                path = %path.display(),
                "commands exported"
            );
        }
        None => println!("{text}"),
    }
    Ok(())
}
