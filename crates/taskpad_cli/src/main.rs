//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `taskpad_core` linkage.
//! - Report what the configured task store currently holds.

use taskpad_core::{open_sqlite_session, StoreConfig};

fn main() {
    println!("taskpad_core ping={}", taskpad_core::ping());
    println!("taskpad_core version={}", taskpad_core::core_version());

    let config = StoreConfig::from_env();
    let session = open_sqlite_session(&config);
    let load = session.last_load();
    let stats = session.stats();
    println!(
        "store path={} available={} dropped_records={}",
        config.db_path.display(),
        load.storage_available,
        load.dropped_records
    );
    println!(
        "tasks total={} active={} completed={} completion_percent={}",
        stats.total,
        stats.active,
        stats.completed,
        stats.completion_percent()
    );
}
