//! Command editor session.
//!
//! Holds, for one study, the last-known remote list and the locally edited
//! list between saves. Edits never touch the remote store; `save` reconciles
//! the two lists in one run.

use chrono::{DateTime, Utc};
use gridstudy_core::StudyId;
use serde_json::Value;

use crate::command::{self, Command, ImportError};
use crate::reconcile::{ReconcileError, SyncPlan, SyncStats, reconcile};
use crate::store::{CommandStore, StoreError};

#[derive(Debug, thiserror::Error)]
pub enum EditorError {
    #[error("index {index} out of range (list has {len} commands)")]
    IndexOutOfRange { index: usize, len: usize },
    #[error(transparent)]
    Import(#[from] ImportError),
    #[error("export failed: {0}")]
    Export(#[from] serde_json::Error),
    #[error(transparent)]
    Reconcile(#[from] ReconcileError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Editing session over a study's variant commands.
#[derive(Debug)]
pub struct CommandEditor<S> {
    store: S,
    study: StudyId,
    persisted: Vec<Command>,
    current: Vec<Command>,
    last_synced_at: Option<DateTime<Utc>>,
}

impl<S: CommandStore> CommandEditor<S> {
    /// Open a session with the current remote list.
    pub async fn load(store: S, study: StudyId) -> Result<Self, EditorError> {
        let remote = store.list(&study).await?;
        tracing::debug!(study = %study, commands = remote.len(), "command editor loaded");
        Ok(Self {
            store,
            study,
            persisted: remote.clone(),
            current: remote,
            last_synced_at: Some(Utc::now()),
        })
    }

    pub fn study(&self) -> &StudyId {
        &self.study
    }

    /// Working (edited) list.
    pub fn commands(&self) -> &[Command] {
        &self.current
    }

    /// Last-known remote list.
    pub fn persisted(&self) -> &[Command] {
        &self.persisted
    }

    pub fn last_synced_at(&self) -> Option<DateTime<Utc>> {
        self.last_synced_at
    }

    pub fn is_dirty(&self) -> bool {
        self.current != self.persisted
    }

    /// Remote calls the next `save` would issue.
    pub fn pending_changes(&self) -> SyncStats {
        SyncPlan::compute(&self.persisted, &self.current).stats()
    }

    /// Append a new command; returns its index.
    pub fn add(&mut self, action: impl Into<String>, args: Value) -> usize {
        self.current.push(Command::new(action, args));
        self.current.len() - 1
    }

    pub fn remove(&mut self, index: usize) -> Result<Command, EditorError> {
        self.check(index)?;
        Ok(self.current.remove(index))
    }

    pub fn update_args(&mut self, index: usize, args: Value) -> Result<(), EditorError> {
        self.check(index)?;
        self.current[index].args = args;
        Ok(())
    }

    /// Move the command at `from` to `to` (drag-and-drop result).
    pub fn reorder(&mut self, from: usize, to: usize) -> Result<(), EditorError> {
        self.check(from)?;
        self.check(to)?;
        let cmd = self.current.remove(from);
        self.current.insert(to, cmd);
        Ok(())
    }

    pub fn export_json(&self) -> Result<String, EditorError> {
        Ok(command::export_json(&self.current)?)
    }

    /// Replace the working list with commands parsed from `text`.
    ///
    /// Imported commands carry no id, so the next save deletes the previous
    /// remote commands and appends the imported ones.
    pub fn import_json(&mut self, text: &str) -> Result<usize, EditorError> {
        let imported = command::import_json(text)?;
        let count = imported.len();
        self.current = imported;
        Ok(count)
    }

    /// Reconcile the remote list with the working list.
    ///
    /// On failure both lists are left untouched; the remote list may be
    /// partially updated, so call [`reload`](Self::reload) before retrying.
    pub async fn save(&mut self) -> Result<&[Command], EditorError> {
        let synced = reconcile(&self.store, &self.study, &self.persisted, &self.current).await?;
        self.persisted = synced.clone();
        self.current = synced;
        self.last_synced_at = Some(Utc::now());
        Ok(&self.current)
    }

    /// Discard local edits and re-fetch the remote list.
    pub async fn reload(&mut self) -> Result<(), EditorError> {
        let remote = self.store.list(&self.study).await?;
        self.persisted = remote.clone();
        self.current = remote;
        self.last_synced_at = Some(Utc::now());
        Ok(())
    }

    fn check(&self, index: usize) -> Result<(), EditorError> {
        if index < self.current.len() {
            Ok(())
        } else {
            Err(EditorError::IndexOutOfRange {
                index,
                len: self.current.len(),
            })
        }
    }
}
