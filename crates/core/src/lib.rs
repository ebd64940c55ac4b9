//! `gridstudy-core` — shared identifiers and the domain error model.
//!
//! This crate contains **pure domain** primitives (no IO, no async).

pub mod error;
pub mod id;

pub use error::DomainError;
pub use id::{CommandId, StudyId};
