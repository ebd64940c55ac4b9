//! `gridstudy-variants`
//!
//! **Responsibility:** client-side editing and synchronization of a variant
//! study's command list.
//!
//! This crate provides:
//! - The command model and its JSON import/export format
//! - A `CommandStore` abstraction (REST client + in-memory store)
//! - The reconciler that converges a remote list to an edited local list
//! - An editor session tying the two together
//!
//! The backend remains the authority: local edits only reach it through
//! `reconcile`.

pub mod command;
pub mod config;
pub mod editor;
pub mod reconcile;
pub mod store;

pub use command::{Command, ImportError};
pub use config::{ClientConfig, ConfigError};
pub use editor::{CommandEditor, EditorError};
pub use reconcile::{ReconcileError, SyncPhase, SyncPlan, SyncStats, reconcile};
pub use store::{CommandStore, HttpCommandStore, InMemoryCommandStore, StoreError};
