//! # Storage Layer
//!
//! Durable state is kept behind the [`KeyValueStore`] trait so the engine can run
//! against different backends:
//!
//! - [`fs_backend::FsBackend`]: production storage, one file per key.
//! - [`mem_backend::MemBackend`]: in-memory storage for tests, with write-failure
//!   simulation.
//!
//! On top of the raw backend sits [`note_store::NoteStore`], which owns the
//! canonical note collection and hands every new snapshot to the
//! [`PersistenceGateway`](crate::persistence::PersistenceGateway).

pub mod backend;
pub mod fs_backend;
pub mod mem_backend;
pub mod note_store;

pub use backend::KeyValueStore;
pub use note_store::NoteStore;
