use chrono::{Duration, TimeZone, Utc};
use serde_json::json;
use taskpad_core::{
    open_sqlite_session, BackingStore, ItemId, ItemPatch, ItemPersistence, ItemStats,
    MemoryBackingStore, PersistWarning, SequentialIds, SteppingClock, StoreConfig,
    TaskServiceError, TaskSession, TitleValidationError, TASKS_SLOT_KEY,
};

fn clock() -> SteppingClock {
    SteppingClock::new(
        Utc.with_ymd_and_hms(2026, 5, 1, 7, 0, 0).unwrap(),
        Duration::seconds(1),
    )
}

fn session(
    store: &MemoryBackingStore,
) -> TaskSession<&MemoryBackingStore, SteppingClock, SequentialIds> {
    TaskSession::open(ItemPersistence::new(store), clock(), SequentialIds::new("t"))
}

fn stored_len(store: &MemoryBackingStore) -> usize {
    let raw = store.read_slot(TASKS_SLOT_KEY).unwrap().unwrap();
    serde_json::from_str::<Vec<serde_json::Value>>(&raw)
        .unwrap()
        .len()
}

#[test]
fn add_from_empty_creates_active_item() {
    let store = MemoryBackingStore::new();
    let mut session = session(&store);
    assert!(session.last_load().cold_start);

    let outcome = session.add("Buy milk").unwrap();

    assert!(outcome.persisted());
    assert_eq!(outcome.item_id, Some(ItemId::new("t-1")));
    assert_eq!(session.items().len(), 1);
    assert!(!session.items()[0].completed);
    assert_eq!(
        session.stats(),
        ItemStats {
            total: 1,
            active: 1,
            completed: 0,
        }
    );
    assert_eq!(stored_len(&store), 1);
}

#[test]
fn empty_title_is_rejected_without_touching_state() {
    let store = MemoryBackingStore::new();
    let mut session = session(&store);
    session.add("keep me").unwrap();

    let err = session.add("   ").unwrap_err();

    assert_eq!(
        err,
        TaskServiceError::Validation(TitleValidationError::EmptyTitle)
    );
    assert_eq!(session.items().len(), 1);
    assert_eq!(stored_len(&store), 1);
}

#[test]
fn edit_validates_and_trims() {
    let store = MemoryBackingStore::new();
    let mut session = session(&store);
    let id = session.add("draft").unwrap().item_id.unwrap();

    let too_long = session.edit(&id, &"z".repeat(501)).unwrap_err();
    assert!(matches!(
        too_long,
        TaskServiceError::Validation(TitleValidationError::TitleTooLong { .. })
    ));
    assert_eq!(session.items()[0].title, "draft");

    let outcome = session.edit(&id, "  final  ").unwrap();
    assert!(outcome.persisted());
    assert_eq!(session.items()[0].title, "final");
}

#[test]
fn unknown_id_intents_change_nothing_and_write_nothing() {
    let store = MemoryBackingStore::new();
    let mut session = session(&store);
    session.add("only").unwrap();
    let before = store.read_slot(TASKS_SLOT_KEY).unwrap();
    let snapshot = session.items().to_vec();
    let missing = ItemId::new("missing");

    assert!(!session.toggle(&missing).found);
    assert!(!session.delete(&missing).found);
    assert!(!session.edit(&missing, "renamed").unwrap().found);

    assert_eq!(session.items(), snapshot.as_slice());
    assert_eq!(store.read_slot(TASKS_SLOT_KEY).unwrap(), before);
}

#[test]
fn toggle_then_presentation_order_lists_newer_active_first() {
    let store = MemoryBackingStore::new();
    let mut session = session(&store);
    let a = session.add("A").unwrap().item_id.unwrap();
    let b = session.add("B").unwrap().item_id.unwrap();

    session.toggle(&a);

    let ordered: Vec<ItemId> = session
        .presentation_order()
        .into_iter()
        .map(|item| item.id)
        .collect();
    assert_eq!(ordered, vec![b, a.clone()]);
    assert_eq!(session.items()[0].id, a);
}

#[test]
fn update_patch_can_set_completed_directly() {
    let store = MemoryBackingStore::new();
    let mut session = session(&store);
    let id = session.add("A").unwrap().item_id.unwrap();

    session.update(&id, ItemPatch::completed(true)).unwrap();

    assert!(session.items()[0].completed);
    assert_eq!(session.stats().completion_percent(), 100);
}

#[test]
fn clear_completed_and_clear_all_are_persisted() {
    let store = MemoryBackingStore::new();
    let mut session = session(&store);
    let done = session.add("done").unwrap().item_id.unwrap();
    session.add("open").unwrap();
    session.toggle(&done);

    assert!(session.clear_completed().persisted());
    assert_eq!(session.items().len(), 1);
    assert_eq!(session.items()[0].title, "open");
    assert_eq!(stored_len(&store), 1);

    assert!(session.clear_all().persisted());
    assert!(session.items().is_empty());
    assert_eq!(stored_len(&store), 0);
}

#[test]
fn unavailable_storage_keeps_mutation_in_memory_with_warning() {
    let store = MemoryBackingStore::new();
    let mut session = session(&store);
    store.set_available(false);

    let outcome = session.add("ephemeral").unwrap();

    assert!(outcome.found);
    assert!(!outcome.persisted());
    assert_eq!(outcome.warning, Some(PersistWarning::StorageUnavailable));
    assert_eq!(session.items().len(), 1);
}

#[test]
fn session_without_store_still_works() {
    let persistence: ItemPersistence<MemoryBackingStore> = ItemPersistence::unavailable();
    let mut session = TaskSession::open(persistence, clock(), SequentialIds::default());

    assert!(!session.last_load().storage_available);
    let outcome = session.add("offline").unwrap();
    assert_eq!(outcome.warning, Some(PersistWarning::StorageUnavailable));
    assert_eq!(session.stats().total, 1);
}

#[test]
fn quota_warning_is_distinct_from_unavailable() {
    let store = MemoryBackingStore::new().with_quota(120);
    let mut session = session(&store);
    session.add("short").unwrap();

    let outcome = session.add(&"long title ".repeat(20)).unwrap();

    assert_eq!(outcome.warning, Some(PersistWarning::QuotaExceeded));
    assert_ne!(
        PersistWarning::QuotaExceeded.user_message(),
        PersistWarning::StorageUnavailable.user_message()
    );
    assert_eq!(session.items().len(), 2);
    assert_eq!(stored_len(&store), 1);
}

#[test]
fn open_loads_stored_items_and_reports_dropped_records() {
    let store = MemoryBackingStore::new().with_slot(
        TASKS_SLOT_KEY,
        json!([
            { "id": "1", "title": "kept", "completed": true, "createdAt": "2026-01-01T00:00:00Z" },
            { "id": "2", "title": "no flag" }
        ])
        .to_string(),
    );

    let session = session(&store);

    assert_eq!(session.items().len(), 1);
    assert_eq!(session.last_load().dropped_records, 1);
    assert!(!session.last_load().cold_start);
}

#[test]
fn sqlite_session_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let config = StoreConfig {
        db_path: dir.path().join("tasks.sqlite3"),
        quota_bytes: None,
    };

    let mut first = open_sqlite_session(&config);
    let id = first.add("water plants").unwrap().item_id.unwrap();
    first.toggle(&id);
    drop(first);

    let second = open_sqlite_session(&config);
    assert_eq!(second.items().len(), 1);
    assert_eq!(second.items()[0].id, id);
    assert!(second.items()[0].completed);
}

#[test]
fn sqlite_session_with_unopenable_path_degrades_to_memory() {
    let dir = tempfile::tempdir().unwrap();
    let config = StoreConfig {
        db_path: dir.path().join("missing-dir").join("tasks.sqlite3"),
        quota_bytes: None,
    };

    let mut session = open_sqlite_session(&config);

    assert!(!session.last_load().storage_available);
    let outcome = session.add("still works").unwrap();
    assert_eq!(outcome.warning, Some(PersistWarning::StorageUnavailable));
}

#[test]
fn sqlite_session_with_newer_schema_degrades_to_memory() {
    let dir = tempfile::tempdir().unwrap();
    let config = StoreConfig {
        db_path: dir.path().join("tasks.sqlite3"),
        quota_bytes: None,
    };
    rusqlite::Connection::open(&config.db_path)
        .unwrap()
        .pragma_update(None, "user_version", 99_u32)
        .unwrap();

    let mut session = open_sqlite_session(&config);

    assert!(!session.last_load().storage_available);
    let outcome = session.add("kept in memory").unwrap();
    assert_eq!(outcome.warning, Some(PersistWarning::StorageUnavailable));
}

#[test]
fn over_long_stored_title_survives_next_write() {
    let store = MemoryBackingStore::new().with_slot(
        TASKS_SLOT_KEY,
        json!([{ "id": "1", "title": "y".repeat(600), "completed": false }]).to_string(),
    );
    let mut session = session(&store);
    assert_eq!(session.last_load().dropped_records, 0);

    session.add("new").unwrap();

    assert_eq!(stored_len(&store), 2);
    let edited = session.edit(&ItemId::new("1"), &"y".repeat(600));
    assert!(matches!(
        edited,
        Err(TaskServiceError::Validation(TitleValidationError::TitleTooLong { .. }))
    ));
}
