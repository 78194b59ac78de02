//! Key-value slot stores.
//!
//! # Responsibility
//! - Provide string slots addressed by key, the shape of browser-local storage.
//! - Classify write failures into unavailable / quota / generic backend errors.
//!
//! # Invariants
//! - `write_slot` overwrites the previous value for the key atomically.
//! - Quota accounting counts key and value bytes across all slots.

use crate::db::DbError;
use log::warn;
use rusqlite::{params, Connection, ErrorCode, OptionalExtension};
use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type StorageResult<T> = Result<T, StorageError>;

/// Slot store failure classes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// The store cannot be reached at all.
    Unavailable(String),
    /// The store rejected a write for size reasons.
    QuotaExceeded {
        requested_bytes: usize,
        limit_bytes: Option<usize>,
    },
    /// Any other backend failure.
    Backend(String),
}

impl Display for StorageError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unavailable(details) => write!(f, "storage unavailable: {details}"),
            Self::QuotaExceeded {
                requested_bytes,
                limit_bytes: Some(limit),
            } => write!(
                f,
                "storage quota exceeded: {requested_bytes} bytes requested, limit {limit}"
            ),
            Self::QuotaExceeded {
                requested_bytes,
                limit_bytes: None,
            } => write!(
                f,
                "storage quota exceeded: {requested_bytes} bytes requested"
            ),
            Self::Backend(details) => write!(f, "storage backend error: {details}"),
        }
    }
}

impl Error for StorageError {}

/// A store whose database cannot be opened or migrated is unreachable.
impl From<DbError> for StorageError {
    fn from(value: DbError) -> Self {
        match value {
            DbError::Sqlite(err) => match classify_sqlite_error(err, 0) {
                StorageError::Backend(details) => StorageError::Unavailable(details),
                other => other,
            },
            schema @ DbError::UnsupportedSchemaVersion { .. } => {
                StorageError::Unavailable(schema.to_string())
            }
        }
    }
}

/// Durable key-value slot contract.
pub trait BackingStore {
    fn read_slot(&self, key: &str) -> StorageResult<Option<String>>;
    fn write_slot(&self, key: &str, value: &str) -> StorageResult<()>;
}

impl<S: BackingStore + ?Sized> BackingStore for &S {
    fn read_slot(&self, key: &str) -> StorageResult<Option<String>> {
        (**self).read_slot(key)
    }

    fn write_slot(&self, key: &str, value: &str) -> StorageResult<()> {
        (**self).write_slot(key, value)
    }
}

/// Process-memory slot store with optional quota and availability switch.
#[derive(Debug)]
pub struct MemoryBackingStore {
    slots: RefCell<BTreeMap<String, String>>,
    available: Cell<bool>,
    quota_bytes: Option<usize>,
}

impl Default for MemoryBackingStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryBackingStore {
    pub fn new() -> Self {
        Self {
            slots: RefCell::new(BTreeMap::new()),
            available: Cell::new(true),
            quota_bytes: None,
        }
    }

    pub fn with_quota(mut self, quota_bytes: usize) -> Self {
        self.quota_bytes = Some(quota_bytes);
        self
    }

    /// Seeds one slot, bypassing quota checks.
    pub fn with_slot(self, key: &str, value: impl Into<String>) -> Self {
        self.slots.borrow_mut().insert(key.to_string(), value.into());
        self
    }

    /// Simulates the store becoming (un)reachable.
    pub fn set_available(&self, available: bool) {
        self.available.set(available);
    }

    fn ensure_available(&self) -> StorageResult<()> {
        if self.available.get() {
            Ok(())
        } else {
            Err(StorageError::Unavailable(
                "memory store switched off".to_string(),
            ))
        }
    }
}

impl BackingStore for MemoryBackingStore {
    fn read_slot(&self, key: &str) -> StorageResult<Option<String>> {
        self.ensure_available()?;
        Ok(self.slots.borrow().get(key).cloned())
    }

    fn write_slot(&self, key: &str, value: &str) -> StorageResult<()> {
        self.ensure_available()?;
        let mut slots = self.slots.borrow_mut();
        if let Some(limit) = self.quota_bytes {
            let others: usize = slots
                .iter()
                .filter(|(slot_key, _)| slot_key.as_str() != key)
                .map(|(slot_key, slot_value)| slot_key.len() + slot_value.len())
                .sum();
            let requested = others + key.len() + value.len();
            if requested > limit {
                return Err(StorageError::QuotaExceeded {
                    requested_bytes: requested,
                    limit_bytes: Some(limit),
                });
            }
        }
        slots.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// SQLite-backed slot store over the `kv_slots` table.
///
/// Expects a connection returned by `db::open_db`/`open_db_in_memory`.
pub struct SqliteBackingStore {
    conn: Connection,
    quota_bytes: Option<usize>,
}

impl SqliteBackingStore {
    pub fn new(conn: Connection) -> Self {
        Self {
            conn,
            quota_bytes: None,
        }
    }

    /// Caps total slot bytes; `None` leaves only the disk as a limit.
    pub fn with_quota(mut self, quota_bytes: Option<usize>) -> Self {
        self.quota_bytes = quota_bytes;
        self
    }

    fn bytes_used_by_other_slots(&self, key: &str) -> StorageResult<usize> {
        let used: i64 = self
            .conn
            .query_row(
                "SELECT COALESCE(SUM(length(CAST(key AS BLOB)) + length(CAST(value AS BLOB))), 0)
                 FROM kv_slots
                 WHERE key != ?1;",
                [key],
                |row| row.get(0),
            )
            .map_err(|err| classify_sqlite_error(err, 0))?;
        Ok(usize::try_from(used).unwrap_or(usize::MAX))
    }
}

impl BackingStore for SqliteBackingStore {
    fn read_slot(&self, key: &str) -> StorageResult<Option<String>> {
        self.conn
            .query_row(
                "SELECT value FROM kv_slots WHERE key = ?1;",
                [key],
                |row| row.get::<_, String>(0),
            )
            .optional()
            .map_err(|err| classify_sqlite_error(err, 0))
    }

    fn write_slot(&self, key: &str, value: &str) -> StorageResult<()> {
        let own_bytes = key.len() + value.len();
        if let Some(limit) = self.quota_bytes {
            let requested = self.bytes_used_by_other_slots(key)?.saturating_add(own_bytes);
            if requested > limit {
                warn!(
                    "event=slot_write module=repo status=quota_exceeded requested_bytes={requested} limit_bytes={limit}"
                );
                return Err(StorageError::QuotaExceeded {
                    requested_bytes: requested,
                    limit_bytes: Some(limit),
                });
            }
        }

        self.conn
            .execute(
                "INSERT INTO kv_slots (key, value, updated_at)
                 VALUES (?1, ?2, (strftime('%s', 'now') * 1000))
                 ON CONFLICT(key) DO UPDATE SET
                    value = excluded.value,
                    updated_at = excluded.updated_at;",
                params![key, value],
            )
            .map_err(|err| classify_sqlite_error(err, own_bytes))?;
        Ok(())
    }
}

fn classify_sqlite_error(err: rusqlite::Error, requested_bytes: usize) -> StorageError {
    match err.sqlite_error_code() {
        Some(ErrorCode::DiskFull) | Some(ErrorCode::TooBig) => StorageError::QuotaExceeded {
            requested_bytes,
            limit_bytes: None,
        },
        Some(
            ErrorCode::CannotOpen
            | ErrorCode::ReadOnly
            | ErrorCode::PermissionDenied
            | ErrorCode::DatabaseBusy
            | ErrorCode::DatabaseLocked
            | ErrorCode::SystemIoFailure,
        ) => StorageError::Unavailable(err.to_string()),
        _ => StorageError::Backend(err.to_string()),
    }
}
