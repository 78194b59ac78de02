//! Repository layer: backing stores and the item persistence adapter.
//!
//! # Responsibility
//! - Define the key-value slot contract behind durable storage.
//! - Mirror the live collection into one fixed slot and read it back leniently.
//!
//! # Invariants
//! - A write replaces the whole stored collection.
//! - Loading never fails the caller; it degrades to an empty collection.

pub mod backing_store;
pub mod item_repo;
