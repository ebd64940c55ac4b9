//! `gridstudy list <study>`

use clap::Args;
use gridstudy_variants::CommandStore;

use super::{parse_study, render_list};

#[derive(Debug, Args)]
pub struct ListArgs {
    /// Study identifier
    pub study: String,
}

pub async fn execute<S: CommandStore>(store: &S, args: ListArgs) -> anyhow::Result<()> {
    let study = parse_study(&args.study)?;
    let commands = store.list(&study).await?;
    if commands.is_empty() {
        println!("study {study} has no commands");
    } else {
        println!("{}", render_list(&commands));
    }
    Ok(())
}
