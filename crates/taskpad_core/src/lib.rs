//! Core domain logic for Taskpad.
//! This crate is the single source of truth for task invariants.

pub mod capability;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod store;
pub mod view;

pub use capability::{
    Clock, FixedClock, IdSource, SequentialIds, SteppingClock, SystemClock, UuidIdSource,
};
pub use config::{StoreConfig, TASKS_SLOT_KEY};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::item::{Item, ItemId, ItemPatch};
pub use model::title::{normalize_title, validate_title, TitleValidationError, MAX_TITLE_CHARS};
pub use repo::backing_store::{
    BackingStore, MemoryBackingStore, SqliteBackingStore, StorageError, StorageResult,
};
pub use repo::item_repo::{ItemPersistence, LoadOrigin, LoadReport, PersistError, PersistResult};
pub use service::task_service::{
    open_sqlite_session, LoadSummary, MutationOutcome, PersistWarning, SqliteTaskSession,
    TaskServiceError, TaskSession,
};
pub use view::derived::{presentation_order, stats, ItemStats};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
