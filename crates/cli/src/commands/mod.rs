pub mod export;
pub mod list;
pub mod sync;

use anyhow::Context;
use gridstudy_core::StudyId;

/// Parse a study id given on the command line.
pub(crate) fn parse_study(raw: &str) -> anyhow::Result<StudyId> {
    raw.parse::<StudyId>()
        .with_context(|| format!("invalid study id '{raw}'"))
}

/// One line per command: index, id, action.
pub(crate) fn render_list(commands: &[gridstudy_variants::Command]) -> String {
    commands
        .iter()
        .enumerate()
        .map(|(index, cmd)| {
            let id = cmd.id.as_ref().map(|id| id.as_str()).unwrap_or("-");
            format!("{index:>4}  {id}  {}", cmd.action)
        })
        .collect::<Vec<_>>()
        .join("\n")
}
