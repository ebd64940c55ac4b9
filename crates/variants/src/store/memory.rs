//! In-memory command store for tests/dev.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use gridstudy_core::{CommandId, StudyId};

use crate::command::Command;
use crate::store::{CommandStore, StoreError};

/// In-memory command lists keyed by study.
///
/// - No IO
/// - Ids are fresh UUIDv7 strings
/// - Unknown studies behave as empty lists
#[derive(Debug, Default)]
pub struct InMemoryCommandStore {
    studies: RwLock<HashMap<StudyId, Vec<Command>>>,
}

impl InMemoryCommandStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arc() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Seed a study with an already-persisted list (ids are assigned where missing).
    pub fn seed(
        &self,
        study: &StudyId,
        commands: Vec<Command>,
    ) -> Result<Vec<Command>, StoreError> {
        let seeded: Vec<Command> = commands
            .into_iter()
            .map(|mut cmd| {
                cmd.id.get_or_insert_with(CommandId::generate);
                cmd
            })
            .collect();

        let mut studies = self.studies.write().map_err(|_| StoreError::Poisoned)?;
        studies.insert(study.clone(), seeded.clone());
        Ok(seeded)
    }

    /// Synchronous view of a study's list.
    pub fn snapshot(&self, study: &StudyId) -> Result<Vec<Command>, StoreError> {
        let studies = self.studies.read().map_err(|_| StoreError::Poisoned)?;
        Ok(studies.get(study).cloned().unwrap_or_default())
    }

    fn position(list: &[Command], id: &CommandId) -> Result<usize, StoreError> {
        list.iter()
            .position(|c| c.id.as_ref() == Some(id))
            .ok_or_else(|| StoreError::CommandNotFound(id.clone()))
    }
}

#[async_trait::async_trait]
impl CommandStore for InMemoryCommandStore {
    async fn list(&self, study: &StudyId) -> Result<Vec<Command>, StoreError> {
        self.snapshot(study)
    }

    async fn append(&self, study: &StudyId, command: &Command) -> Result<CommandId, StoreError> {
        let id = CommandId::generate();
        let mut studies = self.studies.write().map_err(|_| StoreError::Poisoned)?;
        studies
            .entry(study.clone())
            .or_default()
            .push(command.detached().with_id(id.clone()));
        Ok(id)
    }

    async fn update(
        &self,
        study: &StudyId,
        id: &CommandId,
        command: &Command,
    ) -> Result<(), StoreError> {
        let mut studies = self.studies.write().map_err(|_| StoreError::Poisoned)?;
        let list = studies
            .get_mut(study)
            .ok_or_else(|| StoreError::CommandNotFound(id.clone()))?;
        let pos = Self::position(list, id)?;
        let stored = &mut list[pos];
        stored.action = command.action.clone();
        stored.args = command.args.clone();
        stored.version = command.version;
        Ok(())
    }

    async fn move_to(
        &self,
        study: &StudyId,
        id: &CommandId,
        index: usize,
    ) -> Result<(), StoreError> {
        let mut studies = self.studies.write().map_err(|_| StoreError::Poisoned)?;
        let list = studies
            .get_mut(study)
            .ok_or_else(|| StoreError::CommandNotFound(id.clone()))?;
        let pos = Self::position(list, id)?;
        let cmd = list.remove(pos);
        let target = index.min(list.len());
        list.insert(target, cmd);
        Ok(())
    }

    async fn delete(&self, study: &StudyId, id: &CommandId) -> Result<(), StoreError> {
        let mut studies = self.studies.write().map_err(|_| StoreError::Poisoned)?;
        let list = studies
            .get_mut(study)
            .ok_or_else(|| StoreError::CommandNotFound(id.clone()))?;
        let pos = Self::position(list, id)?;
        list.remove(pos);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn study() -> StudyId {
        StudyId::new_unchecked("study-1")
    }

    fn actions(store: &InMemoryCommandStore) -> Vec<String> {
        store
            .snapshot(&study())
            .unwrap()
            .into_iter()
            .map(|c| c.action)
            .collect()
    }

    #[tokio::test]
    async fn append_assigns_ids_at_tail() {
        let store = InMemoryCommandStore::new();
        let a = store.append(&study(), &Command::new("a", json!({}))).await.unwrap();
        let b = store.append(&study(), &Command::new("b", json!({}))).await.unwrap();
        assert_ne!(a, b);

        let list = store.list(&study()).await.unwrap();
        assert_eq!(list[0].id, Some(a));
        assert_eq!(list[1].id, Some(b));
    }

    #[tokio::test]
    async fn move_shifts_other_commands() {
        let store = InMemoryCommandStore::new();
        let seeded = store
            .seed(
                &study(),
                vec![
                    Command::new("a", json!({})),
                    Command::new("b", json!({})),
                    Command::new("c", json!({})),
                ],
            )
            .unwrap();

        let a = seeded[0].id.clone().unwrap();
        store.move_to(&study(), &a, 2).await.unwrap();
        assert_eq!(actions(&store), vec!["b", "c", "a"]);

        // Out-of-range targets clamp to the tail.
        let b = seeded[1].id.clone().unwrap();
        store.move_to(&study(), &b, 99).await.unwrap();
        assert_eq!(actions(&store), vec!["c", "a", "b"]);
    }

    #[tokio::test]
    async fn update_replaces_args_in_place() {
        let store = InMemoryCommandStore::new();
        let seeded = store
            .seed(&study(), vec![Command::new("a", json!({"x": 1})), Command::new("b", json!({}))])
            .unwrap();
        let a = seeded[0].id.clone().unwrap();

        store
            .update(&study(), &a, &Command::new("a", json!({"x": 2})))
            .await
            .unwrap();

        let list = store.snapshot(&study()).unwrap();
        assert_eq!(list[0].args, json!({"x": 2}));
        assert_eq!(list[0].id, Some(a));
    }

    #[tokio::test]
    async fn unknown_ids_are_rejected() {
        let store = InMemoryCommandStore::new();
        store.seed(&study(), vec![Command::new("a", json!({}))]).unwrap();
        let missing = CommandId::new_unchecked("missing");

        assert_eq!(
            store.delete(&study(), &missing).await,
            Err(StoreError::CommandNotFound(missing.clone()))
        );
        assert_eq!(
            store.move_to(&StudyId::new_unchecked("other"), &missing, 0).await,
            Err(StoreError::CommandNotFound(missing))
        );
    }
}
