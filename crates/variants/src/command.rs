//! Variant command model and its JSON import/export format.

use gridstudy_core::{CommandId, DomainError};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single variant command.
///
/// `action` and `args` are opaque to this crate: they are forwarded to the
/// backend and compared for equality, never interpreted.
///
/// The same shape is used on the wire (`{"id", "action", "args", "version"}`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Command {
    /// Absent until the remote store has persisted the command.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<CommandId>,
    pub action: String,
    /// Usually a JSON object; batched commands carry an array.
    #[serde(default)]
    pub args: Value,
    /// Backend command-schema version, carried through unchanged.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<u32>,
}

impl Command {
    /// A new, not yet persisted command.
    pub fn new(action: impl Into<String>, args: Value) -> Self {
        Self {
            id: None,
            action: action.into(),
            args,
            version: None,
        }
    }

    pub fn with_id(mut self, id: CommandId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }

    /// Deep equality of the argument payloads.
    pub fn same_args(&self, other: &Command) -> bool {
        self.args == other.args
    }

    /// Copy of this command without its identifier.
    pub fn detached(&self) -> Self {
        Self {
            id: None,
            ..self.clone()
        }
    }
}

/// Errors raised while importing commands from JSON.
#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("invalid command file: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Invalid(#[from] DomainError),
}

/// Serialize commands as a pretty JSON array of `{action, args}` objects.
///
/// Identifiers are stripped: they are only meaningful within the study that
/// assigned them.
pub fn export_json(commands: &[Command]) -> Result<String, serde_json::Error> {
    let detached: Vec<Command> = commands.iter().map(Command::detached).collect();
    serde_json::to_string_pretty(&detached)
}

/// Parse a JSON array of commands, dropping any identifiers it contains.
pub fn import_json(text: &str) -> Result<Vec<Command>, ImportError> {
    let commands = parse_json(text)?;
    Ok(commands.iter().map(Command::detached).collect())
}

/// Parse a JSON array of commands, keeping identifiers.
///
/// Used when a file describes the desired state of an existing study.
pub fn parse_json(text: &str) -> Result<Vec<Command>, ImportError> {
    let commands: Vec<Command> = serde_json::from_str(text)?;
    for (index, command) in commands.iter().enumerate() {
        if command.action.trim().is_empty() {
            let msg = format!("command #{index} has an empty action");
            return Err(DomainError::validation(msg).into());
        }
    }
    Ok(commands)
}
