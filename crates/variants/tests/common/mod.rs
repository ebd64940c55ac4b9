#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use gridstudy_core::{CommandId, StudyId};
use gridstudy_variants::{Command, CommandStore, InMemoryCommandStore, StoreError};
use serde_json::Value;
use tokio::sync::Barrier;

/// A remote call as observed by [`RecordingStore`].
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    List,
    Append { action: String },
    Update { id: CommandId, args: Value },
    Move { id: CommandId, index: usize },
    Delete { id: CommandId },
}

impl Call {
    pub fn kind(&self) -> CallKind {
        match self {
            Call::List => CallKind::List,
            Call::Append { .. } => CallKind::Append,
            Call::Update { .. } => CallKind::Update,
            Call::Move { .. } => CallKind::Move,
            Call::Delete { .. } => CallKind::Delete,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CallKind {
    List,
    Append,
    Update,
    Move,
    Delete,
}

/// In-memory store that records every call and can be told to fail one kind.
///
/// A gated kind holds each call at a barrier until `parties` calls of that
/// kind are in flight together.
#[derive(Debug, Default)]
pub struct RecordingStore {
    pub inner: InMemoryCommandStore,
    calls: Mutex<Vec<Call>>,
    fail_on: Mutex<Option<CallKind>>,
    gates: Mutex<HashMap<CallKind, Arc<Barrier>>>,
}

impl RecordingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_on(&self, kind: CallKind) {
        *self.fail_on.lock().unwrap() = Some(kind);
    }

    pub fn gate(&self, kind: CallKind, parties: usize) {
        self.gates
            .lock()
            .unwrap()
            .insert(kind, Arc::new(Barrier::new(parties)));
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, kind: CallKind) -> usize {
        self.calls().iter().filter(|c| c.kind() == kind).count()
    }

    pub fn clear(&self) {
        self.calls.lock().unwrap().clear();
    }

    fn record(&self, call: Call) -> Result<(), StoreError> {
        let kind = call.kind();
        self.calls.lock().unwrap().push(call);
        if *self.fail_on.lock().unwrap() == Some(kind) {
            return Err(StoreError::Api(500, format!("injected {kind:?} failure")));
        }
        Ok(())
    }

    async fn pass_gate(&self, kind: CallKind) {
        let gate = self.gates.lock().unwrap().get(&kind).cloned();
        if let Some(barrier) = gate {
            barrier.wait().await;
        }
    }
}

#[async_trait::async_trait]
impl CommandStore for RecordingStore {
    async fn list(&self, study: &StudyId) -> Result<Vec<Command>, StoreError> {
        self.record(Call::List)?;
        self.inner.list(study).await
    }

    async fn append(&self, study: &StudyId, command: &Command) -> Result<CommandId, StoreError> {
        self.record(Call::Append {
            action: command.action.clone(),
        })?;
        self.pass_gate(CallKind::Append).await;
        self.inner.append(study, command).await
    }

    async fn update(
        &self,
        study: &StudyId,
        id: &CommandId,
        command: &Command,
    ) -> Result<(), StoreError> {
        self.record(Call::Update {
            id: id.clone(),
            args: command.args.clone(),
        })?;
        self.pass_gate(CallKind::Update).await;
        self.inner.update(study, id, command).await
    }

    async fn move_to(
        &self,
        study: &StudyId,
        id: &CommandId,
        index: usize,
    ) -> Result<(), StoreError> {
        self.record(Call::Move {
            id: id.clone(),
            index,
        })?;
        self.pass_gate(CallKind::Move).await;
        self.inner.move_to(study, id, index).await
    }

    async fn delete(&self, study: &StudyId, id: &CommandId) -> Result<(), StoreError> {
        self.record(Call::Delete { id: id.clone() })?;
        self.pass_gate(CallKind::Delete).await;
        self.inner.delete(study, id).await
    }
}

pub fn study() -> StudyId {
    StudyId::new_unchecked("study-42")
}
