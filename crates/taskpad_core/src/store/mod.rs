//! Pure collection transformations.
//!
//! # Responsibility
//! - Produce a new collection for every create/update/delete/toggle/clear.
//! - Never touch storage; persistence is the caller's next step.
//!
//! # Invariants
//! - Unknown ids are no-ops that return the input unchanged by value.
//! - Insertion order is preserved; ordering for display lives in `view`.

pub mod item_store;
