//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose task intents and read models to Dart via FRB.
//! - Own the process-wide task session so sequential UI calls compose on the
//!   latest collection.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - Every response carries the full presentation-ordered list and stats, so
//!   the UI re-renders from one envelope.
//! - Persistence problems arrive as `warning`, never as `ok = false`.

use log::warn;
use std::sync::{Mutex, MutexGuard, OnceLock};
use taskpad_core::{
    core_version as core_version_inner, init_logging as init_logging_inner,
    open_sqlite_session, ping as ping_inner, Item, ItemId, MutationOutcome, PersistWarning,
    SqliteTaskSession, StoreConfig, TaskServiceError,
};

static SESSION: OnceLock<Mutex<SqliteTaskSession>> = OnceLock::new();

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir`.
/// - Returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// One task row as rendered by the UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskItemView {
    pub id: String,
    pub title: String,
    pub completed: bool,
    /// RFC 3339 creation timestamp.
    pub created_at: String,
}

/// Aggregate counters for the header/footer widgets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskStatsView {
    pub total: u32,
    pub active: u32,
    pub completed: u32,
    pub completion_percent: u32,
}

/// Response envelope shared by every task call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskResponse {
    /// `false` only for input errors and unknown ids.
    pub ok: bool,
    /// Human-readable response message for diagnostics/UI.
    pub message: String,
    /// Non-blocking durability warning; the change is applied regardless.
    pub warning: Option<String>,
    /// Target or newly created task ID.
    pub item_id: Option<String>,
    /// Tasks in presentation order (active first, newest first).
    pub items: Vec<TaskItemView>,
    pub stats: TaskStatsView,
}

/// Returns the current list and stats without mutating anything.
///
/// The first call loads the store; a load-time degradation is reported in
/// `warning` so the UI can tell the user data will not survive reload.
#[flutter_rust_bridge::frb(sync)]
pub fn tasks_snapshot() -> TaskResponse {
    let session = lock_session();
    let warning = if session.last_load().storage_available {
        None
    } else {
        Some(PersistWarning::StorageUnavailable.user_message().to_string())
    };
    let message = if session.items().is_empty() {
        "No tasks yet.".to_string()
    } else {
        format!("{} task(s).", session.items().len())
    };
    respond(&session, true, message, warning, None)
}

/// Adds a task from the input field.
#[flutter_rust_bridge::frb(sync)]
pub fn task_add(title: String) -> TaskResponse {
    let mut session = lock_session();
    let result = session.add(&title);
    respond_to_validated(&session, result, "Task added.")
}

/// Saves an inline edit. The title is validated like on creation.
#[flutter_rust_bridge::frb(sync)]
pub fn task_edit(id: String, title: String) -> TaskResponse {
    let mut session = lock_session();
    let result = session.edit(&ItemId::new(id), &title);
    respond_to_validated(&session, result, "Task updated.")
}

/// Flips the completed flag of one task.
#[flutter_rust_bridge::frb(sync)]
pub fn task_toggle(id: String) -> TaskResponse {
    let mut session = lock_session();
    let outcome = session.toggle(&ItemId::new(id));
    respond_to_outcome(&session, outcome, "Task toggled.")
}

#[flutter_rust_bridge::frb(sync)]
pub fn task_delete(id: String) -> TaskResponse {
    let mut session = lock_session();
    let outcome = session.delete(&ItemId::new(id));
    respond_to_outcome(&session, outcome, "Task deleted.")
}

#[flutter_rust_bridge::frb(sync)]
pub fn tasks_clear_completed() -> TaskResponse {
    let mut session = lock_session();
    let outcome = session.clear_completed();
    respond_to_outcome(&session, outcome, "Completed tasks cleared.")
}

#[flutter_rust_bridge::frb(sync)]
pub fn tasks_clear_all() -> TaskResponse {
    let mut session = lock_session();
    let outcome = session.clear_all();
    respond_to_outcome(&session, outcome, "All tasks cleared.")
}

fn lock_session() -> MutexGuard<'static, SqliteTaskSession> {
    let session =
        SESSION.get_or_init(|| Mutex::new(open_sqlite_session(&StoreConfig::from_env())));
    // Collections are replaced whole, so a poisoned lock still guards a consistent value.
    session.lock().unwrap_or_else(|poisoned| {
        warn!("event=session_lock module=ffi status=recovered_poison");
        poisoned.into_inner()
    })
}

fn respond_to_validated(
    session: &SqliteTaskSession,
    result: Result<MutationOutcome, TaskServiceError>,
    success_message: &str,
) -> TaskResponse {
    match result {
        Ok(outcome) => respond_to_outcome(session, outcome, success_message),
        Err(err) => respond(session, false, err.to_string(), None, None),
    }
}

fn respond_to_outcome(
    session: &SqliteTaskSession,
    outcome: MutationOutcome,
    success_message: &str,
) -> TaskResponse {
    let item_id = outcome.item_id.as_ref().map(ToString::to_string);
    if !outcome.found {
        return respond(session, false, "Task not found.".to_string(), None, item_id);
    }
    let warning = outcome
        .warning
        .as_ref()
        .map(|warning| warning.user_message().to_string());
    respond(session, true, success_message.to_string(), warning, item_id)
}

fn respond(
    session: &SqliteTaskSession,
    ok: bool,
    message: String,
    warning: Option<String>,
    item_id: Option<String>,
) -> TaskResponse {
    let stats = session.stats();
    TaskResponse {
        ok,
        message,
        warning,
        item_id,
        items: session
            .presentation_order()
            .into_iter()
            .map(to_item_view)
            .collect(),
        stats: TaskStatsView {
            total: saturating_u32(stats.total),
            active: saturating_u32(stats.active),
            completed: saturating_u32(stats.completed),
            completion_percent: stats.completion_percent(),
        },
    }
}

fn to_item_view(item: Item) -> TaskItemView {
    TaskItemView {
        id: item.id.to_string(),
        title: item.title,
        completed: item.completed,
        created_at: item.created_at.to_rfc3339(),
    }
}

fn saturating_u32(value: usize) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::{
        core_version, init_logging, ping, task_add, task_delete, task_edit, task_toggle,
        tasks_snapshot,
    };
    use std::sync::Once;
    use std::time::{SystemTime, UNIX_EPOCH};
    use taskpad_core::config::DB_PATH_ENV;

    static SCRATCH_STORE: Once = Once::new();

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }

    #[test]
    fn init_logging_rejects_empty_log_dir() {
        let error = init_logging("info".to_string(), String::new());
        assert!(!error.is_empty());
    }

    #[test]
    fn init_logging_rejects_unsupported_level() {
        let error = init_logging("verbose".to_string(), "/tmp/taskpad-logs".to_string());
        assert!(!error.is_empty());
    }

    #[test]
    fn task_add_returns_item_in_snapshot() {
        use_scratch_store();
        let title = unique_token("ffi-add");
        let response = task_add(format!("  {title}  "));
        assert!(response.ok, "{}", response.message);
        let id = response.item_id.expect("add should return item_id");

        let snapshot = tasks_snapshot();
        let row = snapshot
            .items
            .iter()
            .find(|item| item.id == id)
            .expect("created task should be listed");
        assert_eq!(row.title, title);
        assert!(!row.completed);
        assert_eq!(
            snapshot.stats.active + snapshot.stats.completed,
            snapshot.stats.total
        );

        assert!(task_delete(id).ok);
    }

    #[test]
    fn task_add_rejects_blank_title() {
        use_scratch_store();
        let response = task_add("   ".to_string());
        assert!(!response.ok);
        assert!(response.message.contains("empty"));
        assert!(response.item_id.is_none());
    }

    #[test]
    fn toggle_edit_delete_flow() {
        use_scratch_store();
        let created = task_add(unique_token("ffi-flow"));
        let id = created.item_id.expect("add should return item_id");

        let toggled = task_toggle(id.clone());
        assert!(toggled.ok, "{}", toggled.message);
        assert!(toggled.items.iter().any(|item| item.id == id && item.completed));

        let edited = task_edit(id.clone(), "renamed".to_string());
        assert!(edited.ok, "{}", edited.message);
        assert!(edited
            .items
            .iter()
            .any(|item| item.id == id && item.title == "renamed"));

        let deleted = task_delete(id.clone());
        assert!(deleted.ok, "{}", deleted.message);
        assert!(deleted.items.iter().all(|item| item.id != id));
    }

    #[test]
    fn unknown_id_is_reported_not_ok() {
        use_scratch_store();
        let response = task_toggle(unique_token("no-such-task"));
        assert!(!response.ok);
        assert_eq!(response.message, "Task not found.");
    }

    /// Points the process-wide session at a per-run database. Must run before
    /// the first call that opens the session.
    fn use_scratch_store() {
        SCRATCH_STORE.call_once(|| {
            let path = std::env::temp_dir().join(format!(
                "{}-{}.sqlite3",
                unique_token("taskpad-ffi-test"),
                std::process::id()
            ));
            std::env::set_var(DB_PATH_ENV, path);
        });
    }

    fn unique_token(prefix: &str) -> String {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("time went backwards")
            .as_nanos();
        format!("{prefix}-{nanos}")
    }
}
