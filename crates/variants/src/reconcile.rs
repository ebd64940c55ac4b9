//! Command-list reconciliation.
//!
//! Converges a remote command list to a desired local list using only the
//! per-command operations of [`CommandStore`]. A run has three phases, each a
//! strict barrier for the next:
//!
//! 1. **Deletion**: delete every prior command whose id is gone from the
//!    desired list.
//! 2. **Append**: append every desired command that has no id yet. The remote
//!    store places them at the tail, in call order.
//! 3. **Update and move**: walk the desired list in order; update a command
//!    whose args changed, then move it if its index in the working list
//!    (prior minus deletions, plus appends) differs from its final index.
//!
//! Calls within a phase run concurrently on the calling task
//! (`try_join_all`). For a single command, the update is awaited before its
//! move is issued.
//!
//! There is no retry and no rollback. The first failing call fails the run;
//! calls that already succeeded stay applied, so the caller should re-fetch
//! the remote list before trying again.

use std::collections::{HashMap, HashSet};
use std::fmt;

use futures::future::try_join_all;
use gridstudy_core::{CommandId, StudyId};

use crate::command::Command;
use crate::store::{CommandStore, StoreError};

/// Phase of a reconciliation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncPhase {
    Deletion,
    Append,
    UpdateAndMove,
}

impl fmt::Display for SyncPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SyncPhase::Deletion => "deletion",
            SyncPhase::Append => "append",
            SyncPhase::UpdateAndMove => "update-and-move",
        })
    }
}

/// A reconciliation run aborted on the first failed remote call of `phase`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{phase} phase failed: {source}")]
pub struct ReconcileError {
    pub phase: SyncPhase,
    pub source: StoreError,
}

impl ReconcileError {
    fn at(phase: SyncPhase) -> impl FnOnce(StoreError) -> Self {
        move |source| Self { phase, source }
    }
}

/// Phase-3 work for one desired command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlanStep {
    /// Final index in the desired list.
    pub index: usize,
    /// Args differ from the working list entry.
    pub update: bool,
    /// Index in the working list differs from `index`.
    pub reposition: bool,
}

/// Number of remote calls per kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncStats {
    pub deleted: usize,
    pub appended: usize,
    pub updated: usize,
    pub moved: usize,
}

impl SyncStats {
    pub fn total(&self) -> usize {
        self.deleted + self.appended + self.updated + self.moved
    }

    pub fn is_noop(&self) -> bool {
        self.total() == 0
    }
}

/// The remote calls a run will issue, derived from the two lists alone.
///
/// Computing the plan does no IO; `reconcile` executes it phase by phase.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncPlan {
    /// Prior ids missing from the desired list, in prior order.
    pub deletions: Vec<CommandId>,
    /// Indices (into the desired list) of commands without an id, in order.
    pub appends: Vec<usize>,
    /// Desired commands needing an update and/or a move, in desired order.
    pub steps: Vec<PlanStep>,
}

impl SyncPlan {
    /// Diff `prior` (last-known remote state) against `desired`.
    ///
    /// Prior entries without an id cannot be addressed remotely and are
    /// ignored. A desired id unknown to `prior` is updated and moved.
    pub fn compute(prior: &[Command], desired: &[Command]) -> Self {
        let desired_ids: HashSet<&CommandId> =
            desired.iter().filter_map(|c| c.id.as_ref()).collect();

        let mut deletions = Vec::new();
        // Working list after deletion: id -> (index, prior command).
        let mut working: HashMap<&CommandId, (usize, &Command)> =
            HashMap::with_capacity(prior.len());
        for cmd in prior {
            let Some(id) = cmd.id.as_ref() else { continue };
            if desired_ids.contains(id) {
                let index = working.len();
                working.entry(id).or_insert((index, cmd));
            } else {
                deletions.push(id.clone());
            }
        }

        let appends: Vec<usize> = desired
            .iter()
            .enumerate()
            .filter(|(_, c)| c.id.is_none())
            .map(|(i, _)| i)
            .collect();

        let mut next_tail = working.len();
        let mut steps = Vec::new();
        for (index, cmd) in desired.iter().enumerate() {
            let (working_index, update) = match cmd.id.as_ref() {
                None => {
                    let tail = next_tail;
                    next_tail += 1;
                    (Some(tail), false)
                }
                Some(id) => match working.get(id) {
                    Some(&(prior_index, prior_cmd)) => {
                        (Some(prior_index), !prior_cmd.same_args(cmd))
                    }
                    None => (None, true),
                },
            };

            let reposition = working_index != Some(index);
            if update || reposition {
                steps.push(PlanStep {
                    index,
                    update,
                    reposition,
                });
            }
        }

        Self {
            deletions,
            appends,
            steps,
        }
    }

    pub fn stats(&self) -> SyncStats {
        SyncStats {
            deleted: self.deletions.len(),
            appended: self.appends.len(),
            updated: self.steps.iter().filter(|s| s.update).count(),
            moved: self.steps.iter().filter(|s| s.reposition).count(),
        }
    }
}

/// Converge the remote list of `study` from `prior` to `desired`.
///
/// Returns `desired` with every entry carrying an id (existing ids kept,
/// appended commands filled in). The result is the next run's `prior`.
#[tracing::instrument(
    name = "reconcile",
    skip_all,
    fields(study = %study, prior = prior.len(), desired = desired.len())
)]
pub async fn reconcile<S>(
    store: &S,
    study: &StudyId,
    prior: &[Command],
    desired: &[Command],
) -> Result<Vec<Command>, ReconcileError>
where
    S: CommandStore + ?Sized,
{
    let plan = SyncPlan::compute(prior, desired);
    let stats = plan.stats();

    let outcome = execute(store, study, &plan, desired).await;
    match &outcome {
        Ok(_) => tracing::info!(
            deleted = stats.deleted,
            appended = stats.appended,
            updated = stats.updated,
            moved = stats.moved,
            "command list reconciled"
        ),
        Err(err) => tracing::warn!(
            phase = %err.phase,
            error = %err.source,
            "reconciliation aborted"
        ),
    }
    outcome
}

async fn execute<S>(
    store: &S,
    study: &StudyId,
    plan: &SyncPlan,
    desired: &[Command],
) -> Result<Vec<Command>, ReconcileError>
where
    S: CommandStore + ?Sized,
{
    tracing::debug!(calls = plan.deletions.len(), "deletion phase");
    try_join_all(plan.deletions.iter().map(|id| store.delete(study, id)))
        .await
        .map_err(ReconcileError::at(SyncPhase::Deletion))?;

    tracing::debug!(calls = plan.appends.len(), "append phase");
    let new_ids = try_join_all(plan.appends.iter().map(|&i| store.append(study, &desired[i])))
        .await
        .map_err(ReconcileError::at(SyncPhase::Append))?;

    let mut result = desired.to_vec();
    for (&i, id) in plan.appends.iter().zip(new_ids) {
        result[i].id = Some(id);
    }

    tracing::debug!(calls = plan.steps.len(), "update-and-move phase");
    let result_ref = &result;
    try_join_all(plan.steps.iter().filter_map(|step| {
        let command = &result_ref[step.index];
        let id = command.id.as_ref()?;
        Some(async move {
            if step.update {
                store.update(study, id, command).await?;
            }
            if step.reposition {
                store.move_to(study, id, step.index).await?;
            }
            Ok::<(), StoreError>(())
        })
    }))
    .await
    .map_err(ReconcileError::at(SyncPhase::UpdateAndMove))?;

    Ok(result)
}
