//! # Command Layer
//!
//! Pure functions over the note collection. Commands read notes and return data;
//! they never touch storage, the terminal or the clock on their own. Mutation
//! and persistence belong to [`NoteStore`](crate::store::NoteStore) and the
//! [`Notebook`](crate::api::Notebook) facade.
//!
//! ## Testing Strategy
//!
//! Most logic tests live here. Commands take plain slices of [`Note`](crate::model::Note),
//! so tests build notes directly and need no backend at all.
//!
//! ## Command Modules
//!
//! - [`view`]: search, filter and sort into a display order
//! - [`stats`]: aggregate counts over the whole collection
//! - [`export`]: JSON, TXT and CSV serialization of a scope
//! - [`import`]: parsing of an imported JSON array, with ticket sequencing
//! - [`tags`]: distinct tags across the collection

pub mod export;
pub mod import;
pub mod stats;
pub mod tags;
pub mod view;
