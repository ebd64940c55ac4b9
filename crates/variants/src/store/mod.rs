//! Remote command store abstraction.
//!
//! A `CommandStore` holds one ordered command list per study and exposes
//! per-command operations only. Each call is atomic from the caller's point
//! of view: it either fully applies or fails with no partial effect.
//!
//! Implementations:
//! - [`HttpCommandStore`]: the REST backend
//! - [`InMemoryCommandStore`]: tests/dev

use std::sync::Arc;

use gridstudy_core::{CommandId, StudyId};

use crate::command::Command;

pub mod http;
pub mod memory;

pub use http::HttpCommandStore;
pub use memory::InMemoryCommandStore;

/// Per-command operations on a remote, ordered command list.
#[async_trait::async_trait]
pub trait CommandStore: Send + Sync {
    /// Current remote list, in order.
    async fn list(&self, study: &StudyId) -> Result<Vec<Command>, StoreError>;

    /// Persist `command` at the tail of the list and return its new id.
    async fn append(&self, study: &StudyId, command: &Command) -> Result<CommandId, StoreError>;

    /// Replace the args of command `id` in place; position is unchanged.
    async fn update(
        &self,
        study: &StudyId,
        id: &CommandId,
        command: &Command,
    ) -> Result<(), StoreError>;

    /// Relocate command `id` to the zero-based `index`; others shift.
    async fn move_to(&self, study: &StudyId, id: &CommandId, index: usize)
    -> Result<(), StoreError>;

    /// Remove command `id`; later commands shift down.
    async fn delete(&self, study: &StudyId, id: &CommandId) -> Result<(), StoreError>;
}

#[async_trait::async_trait]
impl<S> CommandStore for Arc<S>
where
    S: CommandStore + ?Sized,
{
    async fn list(&self, study: &StudyId) -> Result<Vec<Command>, StoreError> {
        (**self).list(study).await
    }

    async fn append(&self, study: &StudyId, command: &Command) -> Result<CommandId, StoreError> {
        (**self).append(study, command).await
    }

    async fn update(
        &self,
        study: &StudyId,
        id: &CommandId,
        command: &Command,
    ) -> Result<(), StoreError> {
        (**self).update(study, id, command).await
    }

    async fn move_to(
        &self,
        study: &StudyId,
        id: &CommandId,
        index: usize,
    ) -> Result<(), StoreError> {
        (**self).move_to(study, id, index).await
    }

    async fn delete(&self, study: &StudyId, id: &CommandId) -> Result<(), StoreError> {
        (**self).delete(study, id).await
    }
}

/// Failure of a single remote store operation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("network error: {0}")]
    Network(String),
    #[error("API error ({0}): {1}")]
    Api(u16, String),
    #[error("parse error: {0}")]
    Parse(String),
    #[error("invalid API URL: {0}")]
    InvalidUrl(String),
    #[error("command not found: {0}")]
    CommandNotFound(CommandId),
    #[error("store lock poisoned")]
    Poisoned,
}
