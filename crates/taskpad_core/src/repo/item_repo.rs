//! Item persistence adapter.
//!
//! # Responsibility
//! - Serialize the full collection into the fixed `tasks` slot.
//! - Read the slot back with per-record leniency.
//!
//! # Invariants
//! - `save` overwrites the whole slot; there is no partial-record versioning.
//! - `load` never fails: missing or unparseable data yields an empty collection.
//! - A malformed record drops only itself, never the whole load.
//! - Duplicate ids in stored data are kept as-is.

use crate::capability::Clock;
use crate::config::TASKS_SLOT_KEY;
use crate::model::item::{Item, ItemId};
use crate::repo::backing_store::{BackingStore, StorageError};
use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use serde_json::{Map, Value};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type PersistResult<T> = Result<T, PersistError>;

/// Write-side persistence failures.
///
/// All of these leave the in-memory collection authoritative; callers surface
/// them as warnings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersistError {
    /// No backing store is reachable; changes live in memory only.
    StorageUnavailable,
    /// The store rejected the write for size reasons.
    QuotaExceeded {
        requested_bytes: usize,
        limit_bytes: Option<usize>,
    },
    /// Any other store failure.
    Backend(String),
    /// The collection could not be encoded.
    Serialize(String),
}

impl Display for PersistError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::StorageUnavailable => write!(f, "task storage is unavailable"),
            Self::QuotaExceeded {
                requested_bytes, ..
            } => write!(
                f,
                "task storage quota exceeded ({requested_bytes} bytes requested)"
            ),
            Self::Backend(details) => write!(f, "task storage write failed: {details}"),
            Self::Serialize(details) => write!(f, "task encoding failed: {details}"),
        }
    }
}

impl Error for PersistError {}

impl From<StorageError> for PersistError {
    fn from(value: StorageError) -> Self {
        match value {
            StorageError::Unavailable(_) => Self::StorageUnavailable,
            StorageError::QuotaExceeded {
                requested_bytes,
                limit_bytes,
            } => Self::QuotaExceeded {
                requested_bytes,
                limit_bytes,
            },
            StorageError::Backend(details) => Self::Backend(details),
        }
    }
}

/// Where a loaded collection came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOrigin {
    /// Slot held a JSON array; records were read from it.
    Stored,
    /// Slot was absent. Normal first run.
    Missing,
    /// Slot held something that is not a JSON array. Treated as cold start.
    Unparseable,
    /// Store could not be read. Session continues in memory.
    Unreadable,
}

/// Result of a lenient load, including what was degraded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadReport {
    pub items: Vec<Item>,
    /// Records skipped for failing the shape check.
    pub dropped_records: usize,
    pub origin: LoadOrigin,
}

impl LoadReport {
    fn empty(origin: LoadOrigin) -> Self {
        Self {
            items: Vec::new(),
            dropped_records: 0,
            origin,
        }
    }

    /// Whether the session starts without any stored history.
    pub fn is_cold_start(&self) -> bool {
        self.origin != LoadOrigin::Stored
    }
}

/// Mirrors the live collection to one slot of a `BackingStore`.
pub struct ItemPersistence<S> {
    store: Option<S>,
}

impl<S: BackingStore> ItemPersistence<S> {
    pub fn new(store: S) -> Self {
        Self { store: Some(store) }
    }

    /// Adapter with no reachable store; every save reports `StorageUnavailable`.
    pub fn unavailable() -> Self {
        Self { store: None }
    }

    pub fn is_available(&self) -> bool {
        self.store.is_some()
    }

    /// Overwrites the `tasks` slot with the full collection.
    ///
    /// # Errors
    /// - `StorageUnavailable` when no store is reachable.
    /// - `QuotaExceeded` when the store rejects the write for size.
    /// - `Backend` / `Serialize` for other failures.
    pub fn save(&self, items: &[Item]) -> PersistResult<()> {
        let store = self.store.as_ref().ok_or(PersistError::StorageUnavailable)?;
        let encoded =
            serde_json::to_string(items).map_err(|err| PersistError::Serialize(err.to_string()))?;

        match store.write_slot(TASKS_SLOT_KEY, &encoded) {
            Ok(()) => {
                debug!(
                    "event=items_save module=repo status=ok count={} bytes={}",
                    items.len(),
                    encoded.len()
                );
                Ok(())
            }
            Err(err) => {
                warn!(
                    "event=items_save module=repo status=error count={} error={}",
                    items.len(),
                    err
                );
                Err(err.into())
            }
        }
    }

    /// Loads the collection, degrading to empty on any failure.
    pub fn load(&self, clock: &impl Clock) -> Vec<Item> {
        self.load_report(clock).items
    }

    /// Loads the collection and reports what was dropped or degraded.
    pub fn load_report(&self, clock: &impl Clock) -> LoadReport {
        let Some(store) = self.store.as_ref() else {
            info!("event=items_load module=repo status=unavailable");
            return LoadReport::empty(LoadOrigin::Unreadable);
        };

        let raw = match store.read_slot(TASKS_SLOT_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                info!("event=items_load module=repo status=missing");
                return LoadReport::empty(LoadOrigin::Missing);
            }
            Err(err) => {
                warn!("event=items_load module=repo status=error error={err}");
                return LoadReport::empty(LoadOrigin::Unreadable);
            }
        };

        let records = match serde_json::from_str::<Value>(&raw) {
            Ok(Value::Array(records)) => records,
            Ok(_) => {
                warn!("event=items_load module=repo status=unparseable reason=not_an_array");
                return LoadReport::empty(LoadOrigin::Unparseable);
            }
            Err(err) => {
                warn!("event=items_load module=repo status=unparseable reason=invalid_json error={err}");
                return LoadReport::empty(LoadOrigin::Unparseable);
            }
        };

        let total = records.len();
        let mut items = Vec::with_capacity(total);
        for (index, record) in records.iter().enumerate() {
            match parse_record(record, clock) {
                Some(item) => items.push(item),
                None => debug!("event=items_load module=repo status=record_dropped index={index}"),
            }
        }

        let dropped_records = total - items.len();
        info!(
            "event=items_load module=repo status=ok count={} dropped={}",
            items.len(),
            dropped_records
        );
        LoadReport {
            items,
            dropped_records,
            origin: LoadOrigin::Stored,
        }
    }
}

/// Shape check for one stored record.
///
/// Requires string `id`, non-blank string `title`, and boolean `completed`.
/// Over-long titles are kept; the length limit applies to input, not to
/// history. `createdAt` falls back to `clock.now()`.
fn parse_record(record: &Value, clock: &impl Clock) -> Option<Item> {
    let fields = record.as_object()?;
    let id = fields.get("id")?.as_str()?;
    let title = fields.get("title")?.as_str()?.trim();
    if title.is_empty() {
        return None;
    }
    let completed = fields.get("completed")?.as_bool()?;
    let created_at = parse_created_at(fields).unwrap_or_else(|| clock.now());

    Some(Item::from_parts(
        ItemId::new(id),
        title,
        completed,
        created_at,
    ))
}

fn parse_created_at(fields: &Map<String, Value>) -> Option<DateTime<Utc>> {
    let raw = fields.get("createdAt")?.as_str()?;
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|value| value.with_timezone(&Utc))
}
