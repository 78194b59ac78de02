//! Read-time projections over the live collection.
//!
//! # Invariants
//! - Views never mutate stored order or identity.
//! - Views are recomputed on every read; nothing is cached.

pub mod derived;
