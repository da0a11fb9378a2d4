//! # jotapp
//!
//! The note management engine behind `jot`: a single-user, on-device collection
//! of short text notes with search, filters, bulk selection, statistics,
//! backups and JSON/TXT/CSV import and export.
//!
//! ## Architecture
//!
//! ```text
//! client (CLI) ──► api::Notebook ──► commands/*  (pure: view, stats, export, import, tags)
//!                        │
//!                        ├─► store::NoteStore ──► persistence::PersistenceGateway ──► KeyValueStore
//!                        │                                  │
//!                        │                                  └─► watch snapshot ──► backup task
//!                        └─► selection / favorites / pins / edit session
//! ```
//!
//! - [`api`]: the facade every client goes through.
//! - [`commands`]: pure functions over a slice of notes.
//! - [`store`]: the canonical collection and the storage backends.
//! - [`persistence`]: key layout, backups, and where storage errors stop.
//! - [`backup`] and [`draft`]: the two background tasks, both tokio based.
//! - [`config`]: layered settings.
//!
//! This crate never writes to stdout or stderr. Diagnostics go through `tracing`;
//! the client decides where they end up.

pub mod api;
pub mod backup;
pub mod commands;
pub mod config;
pub mod draft;
pub mod edit;
pub mod error;
pub mod model;
pub mod persistence;
pub mod selection;
pub mod store;
