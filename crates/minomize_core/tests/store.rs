use std::collections::HashSet;
use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};
use minomize_core::{
    JobPersistence, JobRecord, JobStatus, JobStore, MemoryPersistence, StatusReport,
    RETENTION_WINDOW,
};
use pretty_assertions::assert_eq;

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 20, 12, 0, 0).unwrap()
}

fn record(id: &str, age: chrono::Duration) -> JobRecord {
    JobRecord::new(id, format!("https://www.youtube.com/watch?v={id}"), now() - age)
}

#[test]
fn prune_drops_records_past_retention_window() {
    engine_logging::initialize_for_tests();
    let mut store = JobStore::in_memory();
    store.put(record("old", chrono::Duration::days(8))).unwrap();
    store.put(record("recent", chrono::Duration::days(6))).unwrap();

    let removed = store.prune(RETENTION_WINDOW, now());

    assert_eq!(removed, 1);
    assert!(store.get("old").is_none());
    assert!(store.get("recent").is_some());
}

#[test]
fn load_prunes_once_and_writes_back() {
    let persistence = MemoryPersistence::new();
    persistence
        .save(&[
            record("fresh", chrono::Duration::hours(1)),
            record("stale", chrono::Duration::days(30)),
        ])
        .unwrap();

    let store = JobStore::load(persistence.clone(), now(), RETENTION_WINDOW).unwrap();

    assert_eq!(store.len(), 1);
    let saved: Vec<_> = persistence.snapshot().into_iter().map(|r| r.id).collect();
    assert_eq!(saved, vec!["fresh".to_string()]);
}

#[test]
fn load_keeps_first_of_duplicate_ids() {
    let persistence = MemoryPersistence::new();
    let newer = record("dup", chrono::Duration::hours(1)).with_title("newer");
    let older = record("dup", chrono::Duration::hours(2)).with_title("older");
    persistence.save(&[newer, older]).unwrap();

    let store = JobStore::load(persistence, now(), RETENTION_WINDOW).unwrap();

    assert_eq!(store.len(), 1);
    assert_eq!(store.get("dup").unwrap().title.as_deref(), Some("newer"));
}

#[test]
fn list_recent_returns_newest_first_without_duplicates() {
    let mut store = JobStore::in_memory();
    // Insert out of order so ordering comes from start time, not insertion.
    for minutes in [30, 10, 70, 50, 20, 80, 60, 40] {
        let id = format!("job-{minutes}");
        store
            .put(record(&id, chrono::Duration::minutes(minutes)))
            .unwrap();
    }

    let recent = store.list_recent(5);

    let ids: Vec<_> = recent.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["job-10", "job-20", "job-30", "job-40", "job-50"]);
    let unique: HashSet<_> = ids.iter().collect();
    assert_eq!(unique.len(), 5);
}

#[test]
fn put_replaces_record_with_same_id() {
    let mut store = JobStore::in_memory();
    store.put(record("a", chrono::Duration::minutes(1))).unwrap();
    let mut replacement = record("a", chrono::Duration::minutes(1));
    replacement.status = JobStatus::Processing;
    store.put(replacement).unwrap();

    assert_eq!(store.len(), 1);
    assert_eq!(store.get("a").unwrap().status, JobStatus::Processing);
}

#[test]
fn update_status_overwrites_mutable_fields_wholesale() {
    let mut store = JobStore::in_memory();
    store.put(record("a", chrono::Duration::minutes(1))).unwrap();
    store
        .update_status("a", &StatusReport::processing(40).with_message("Transcribing"))
        .unwrap();

    // A later report without message or progress clears both.
    let updated = store
        .update_status("a", &StatusReport::new(JobStatus::Processing))
        .unwrap();

    assert!(updated);
    let stored = store.get("a").unwrap();
    assert_eq!(stored.status, JobStatus::Processing);
    assert_eq!(stored.progress, None);
    assert_eq!(stored.message, None);
    assert_eq!(
        stored.source_url,
        "https://www.youtube.com/watch?v=a".to_string()
    );
}

#[test]
fn update_status_ignores_unknown_ids() {
    let mut store = JobStore::in_memory();
    let updated = store
        .update_status("missing", &StatusReport::processing(10))
        .unwrap();
    assert!(!updated);
    assert!(store.is_empty());
}

#[test]
fn remove_writes_through_and_reports_missing() {
    let mut store = JobStore::in_memory();
    store.put(record("a", chrono::Duration::minutes(1))).unwrap();

    let removed = store.remove("a").unwrap();
    assert_eq!(removed.map(|r| r.id), Some("a".to_string()));
    assert!(store.persistence().snapshot().is_empty());
    assert!(store.remove("a").unwrap().is_none());
}

#[test]
fn pending_ids_skip_terminal_records() {
    let mut store = JobStore::in_memory();
    let mut done = record("done", chrono::Duration::minutes(3));
    done.status = JobStatus::Complete;
    store.put(done).unwrap();
    store.put(record("queued", chrono::Duration::minutes(2))).unwrap();
    let mut running = record("running", chrono::Duration::minutes(1));
    running.status = JobStatus::Processing;
    store.put(running).unwrap();

    let mut pending = store.pending_ids();
    pending.sort();
    assert_eq!(pending, vec!["queued".to_string(), "running".to_string()]);
}

#[test]
fn has_source_matches_submitted_url() {
    let mut store = JobStore::in_memory();
    store.put(record("abc", chrono::Duration::minutes(1))).unwrap();
    assert!(store.has_source("https://www.youtube.com/watch?v=abc"));
    assert!(!store.has_source("https://www.youtube.com/watch?v=xyz"));
}

#[test]
fn oversized_retention_window_prunes_nothing() {
    let mut store = JobStore::in_memory();
    store.put(record("a", chrono::Duration::days(365))).unwrap();
    assert_eq!(store.prune(Duration::MAX, now()), 0);
    assert_eq!(store.len(), 1);
}
