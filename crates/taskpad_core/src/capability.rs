//! Injectable clock and id-source capabilities.
//!
//! # Responsibility
//! - Keep time and identity generation out of ambient/global access.
//! - Provide deterministic implementations for tests and fixtures.
//!
//! # Invariants
//! - `IdSource` implementations never return the same id twice.

use crate::model::item::ItemId;
use chrono::{DateTime, Duration, Utc};
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use uuid::Uuid;

/// Source of "now" timestamps.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

/// Source of fresh, collision-resistant item ids.
pub trait IdSource {
    fn next_id(&self) -> ItemId;
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> DateTime<Utc> {
        (**self).now()
    }
}

impl<I: IdSource + ?Sized> IdSource for &I {
    fn next_id(&self) -> ItemId {
        (**self).next_id()
    }
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Random v4 UUIDs rendered as hyphenated strings.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidIdSource;

impl IdSource for UuidIdSource {
    fn next_id(&self) -> ItemId {
        ItemId::new(Uuid::new_v4().to_string())
    }
}

/// Clock frozen at one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Clock that advances by a fixed step on every read.
///
/// The first read returns `start`.
#[derive(Debug)]
pub struct SteppingClock {
    start: DateTime<Utc>,
    step_ms: i64,
    reads: AtomicI64,
}

impl SteppingClock {
    pub fn new(start: DateTime<Utc>, step: Duration) -> Self {
        Self {
            start,
            step_ms: step.num_milliseconds(),
            reads: AtomicI64::new(0),
        }
    }
}

impl Clock for SteppingClock {
    fn now(&self) -> DateTime<Utc> {
        let read = self.reads.fetch_add(1, Ordering::Relaxed);
        self.start + Duration::milliseconds(self.step_ms.saturating_mul(read))
    }
}

/// Deterministic ids `<prefix>-1`, `<prefix>-2`, ...
#[derive(Debug)]
pub struct SequentialIds {
    prefix: String,
    next: AtomicU64,
}

impl SequentialIds {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: AtomicU64::new(1),
        }
    }
}

impl Default for SequentialIds {
    fn default() -> Self {
        Self::new("item")
    }
}

impl IdSource for SequentialIds {
    fn next_id(&self) -> ItemId {
        let value = self.next.fetch_add(1, Ordering::Relaxed);
        ItemId::new(format!("{}-{value}", self.prefix))
    }
}
