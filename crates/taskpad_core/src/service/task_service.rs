//! Task session: the single-writer owner of the live collection.
//!
//! # Responsibility
//! - Run each intent as validate -> new collection -> persist -> report.
//! - Turn persistence failures into non-blocking warnings.
//!
//! # Invariants
//! - Validation failures never touch in-memory or stored state.
//! - The in-memory collection is replaced before the write is attempted and
//!   stays authoritative when the write fails.
//! - Intents on unknown ids change nothing and write nothing.

use crate::capability::{Clock, IdSource, SystemClock, UuidIdSource};
use crate::config::StoreConfig;
use crate::db::open_db;
use crate::model::item::{Item, ItemId, ItemPatch};
use crate::model::title::{validate_title, TitleValidationError};
use crate::repo::backing_store::{BackingStore, SqliteBackingStore, StorageError};
use crate::repo::item_repo::{ItemPersistence, LoadReport, PersistError};
use crate::store::item_store;
use crate::view::derived::{self, ItemStats};
use log::{error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Errors surfaced inline at the point of input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskServiceError {
    Validation(TitleValidationError),
}

impl Display for TaskServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
        }
    }
}

impl Error for TaskServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
        }
    }
}

impl From<TitleValidationError> for TaskServiceError {
    fn from(value: TitleValidationError) -> Self {
        Self::Validation(value)
    }
}

/// Durability warning attached to an already-applied mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersistWarning {
    StorageUnavailable,
    QuotaExceeded,
    WriteFailed(String),
}

impl PersistWarning {
    /// User-facing text; quota gets its own wording.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::StorageUnavailable => {
                "Storage is unavailable. Changes are kept for this session only and will be lost on reload."
            }
            Self::QuotaExceeded => {
                "Storage is full. This change was applied but not saved; delete or clear completed tasks to free space."
            }
            Self::WriteFailed(_) => {
                "Saving failed. This change was applied but may be lost on reload."
            }
        }
    }
}

impl From<PersistError> for PersistWarning {
    fn from(value: PersistError) -> Self {
        match value {
            PersistError::StorageUnavailable => Self::StorageUnavailable,
            PersistError::QuotaExceeded { .. } => Self::QuotaExceeded,
            PersistError::Backend(details) | PersistError::Serialize(details) => {
                Self::WriteFailed(details)
            }
        }
    }
}

/// Outcome of one intent that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationOutcome {
    /// `false` when the target id was not in the collection.
    pub found: bool,
    /// Target or newly created item, when the intent has one.
    pub item_id: Option<ItemId>,
    /// Set when the in-memory change could not be made durable.
    pub warning: Option<PersistWarning>,
}

impl MutationOutcome {
    fn not_found(id: &ItemId) -> Self {
        Self {
            found: false,
            item_id: Some(id.clone()),
            warning: None,
        }
    }

    /// Whether the change reached durable storage.
    pub fn persisted(&self) -> bool {
        self.found && self.warning.is_none()
    }
}

/// Live collection plus the capabilities every intent needs.
pub struct TaskSession<S, C = SystemClock, I = UuidIdSource> {
    items: Vec<Item>,
    persistence: ItemPersistence<S>,
    clock: C,
    ids: I,
    last_load: LoadSummary,
}

/// Metadata of the startup load, without the items themselves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadSummary {
    pub dropped_records: usize,
    pub cold_start: bool,
    pub storage_available: bool,
}

pub type SqliteTaskSession = TaskSession<SqliteBackingStore, SystemClock, UuidIdSource>;

impl<S: BackingStore, C: Clock, I: IdSource> TaskSession<S, C, I> {
    /// Loads the stored collection once and takes ownership of it.
    pub fn open(persistence: ItemPersistence<S>, clock: C, ids: I) -> Self {
        let report: LoadReport = persistence.load_report(&clock);
        let last_load = LoadSummary {
            dropped_records: report.dropped_records,
            cold_start: report.is_cold_start(),
            storage_available: persistence.is_available(),
        };
        Self {
            items: report.items,
            persistence,
            clock,
            ids,
            last_load,
        }
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn last_load(&self) -> LoadSummary {
        self.last_load
    }

    pub fn stats(&self) -> ItemStats {
        derived::stats(&self.items)
    }

    pub fn presentation_order(&self) -> Vec<Item> {
        derived::presentation_order(&self.items)
    }

    /// Creates an item from user input and appends it.
    pub fn add(&mut self, title: &str) -> Result<MutationOutcome, TaskServiceError> {
        let item = item_store::create(title, &self.clock, &self.ids)?;
        let item_id = item.id.clone();
        let next = item_store::append(&self.items, item);
        Ok(self.commit("add", next, Some(item_id)))
    }

    /// Saves an edited title. Validation runs before the id lookup.
    pub fn edit(&mut self, id: &ItemId, title: &str) -> Result<MutationOutcome, TaskServiceError> {
        self.update(id, ItemPatch::title(title))
    }

    /// Merges a partial field set into one item.
    pub fn update(
        &mut self,
        id: &ItemId,
        patch: ItemPatch,
    ) -> Result<MutationOutcome, TaskServiceError> {
        if let Some(title) = patch.title.as_deref() {
            validate_title(title)?;
        }
        if !item_store::contains(&self.items, id) {
            return Ok(MutationOutcome::not_found(id));
        }
        let next = item_store::update(&self.items, id, &patch);
        Ok(self.commit("update", next, Some(id.clone())))
    }

    pub fn toggle(&mut self, id: &ItemId) -> MutationOutcome {
        if !item_store::contains(&self.items, id) {
            return MutationOutcome::not_found(id);
        }
        let next = item_store::toggle(&self.items, id);
        self.commit("toggle", next, Some(id.clone()))
    }

    pub fn delete(&mut self, id: &ItemId) -> MutationOutcome {
        if !item_store::contains(&self.items, id) {
            return MutationOutcome::not_found(id);
        }
        let next = item_store::delete(&self.items, id);
        self.commit("delete", next, Some(id.clone()))
    }

    pub fn clear_all(&mut self) -> MutationOutcome {
        self.commit("clear_all", item_store::clear_all(), None)
    }

    pub fn clear_completed(&mut self) -> MutationOutcome {
        let next = item_store::clear_completed(&self.items);
        self.commit("clear_completed", next, None)
    }

    fn commit(
        &mut self,
        intent: &'static str,
        next: Vec<Item>,
        item_id: Option<ItemId>,
    ) -> MutationOutcome {
        self.items = next;
        let warning = match self.persistence.save(&self.items) {
            Ok(()) => {
                info!(
                    "event=task_intent module=service intent={intent} status=ok count={}",
                    self.items.len()
                );
                None
            }
            Err(err) => {
                warn!(
                    "event=task_intent module=service intent={intent} status=not_durable count={} error={}",
                    self.items.len(),
                    err
                );
                Some(PersistWarning::from(err))
            }
        };
        MutationOutcome {
            found: true,
            item_id,
            warning,
        }
    }
}

/// Opens the SQLite store described by `config` and loads a session from it.
///
/// When the database cannot be opened the session still starts, with storage
/// unavailable, so every mutation reports `PersistWarning::StorageUnavailable`.
pub fn open_sqlite_session(config: &StoreConfig) -> SqliteTaskSession {
    let persistence = match open_db(&config.db_path).map_err(StorageError::from) {
        Ok(conn) => ItemPersistence::new(
            SqliteBackingStore::new(conn).with_quota(config.quota_bytes),
        ),
        Err(err) => {
            error!(
                "event=session_open module=service status=degraded error_code=store_unreachable error={err}"
            );
            ItemPersistence::unavailable()
        }
    };
    TaskSession::open(persistence, SystemClock, UuidIdSource)
}
