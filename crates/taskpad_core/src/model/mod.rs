//! Task domain model.
//!
//! # Responsibility
//! - Define the canonical `Item` record shared by store, persistence and views.
//! - Own the title contract applied on create and edit.
//!
//! # Invariants
//! - Every item is identified by a stable `ItemId`.
//! - Stored titles are trimmed and never empty.

pub mod item;
pub mod title;
