//! End-to-end behavior of the task core through the public API, with a
//! hand-driven clock over an in-memory store or a real data directory.

use chrono::{Duration, TimeZone, Utc};
use pretty_assertions::assert_eq;

use std::fs;

use tasklist::io::store::{CORRUPT_TASKS_KEY, DirStore, KeyValueStore, MemoryStore, TASKS_KEY};
use tasklist::model::task::{Priority, TaskDraft};
use tasklist::ops::clock::{Clock, ManualClock};
use tasklist::ops::session::Session;
use tasklist::ops::task_store::{TaskError, TaskStore};
use tasklist::ops::view::{self, EmptyState, Filter};

fn clock() -> ManualClock {
    ManualClock::new(Utc.with_ymd_and_hms(2025, 5, 14, 9, 0, 0).unwrap())
}

fn store_over(kv: &MemoryStore, clock: &ManualClock) -> TaskStore {
    TaskStore::load_all(Box::new(kv.clone()), Box::new(clock.clone()))
}

#[test]
fn add_toggle_delete_undo_scenario() {
    let kv = MemoryStore::new();
    let clock = clock();
    let mut store = store_over(&kv, &clock);

    let task = store
        .add(TaskDraft::new("Test").with_priority(Priority::Low))
        .unwrap();
    assert!(store.toggle(&task.id).unwrap());
    store.delete(&task.id).unwrap();
    assert!(store.is_empty());

    clock.advance(Duration::seconds(2));
    let restored = store.undo_last_delete().unwrap();
    assert_eq!(store.len(), 1);
    assert_eq!(restored.title, "Test");
    assert!(restored.completed);
    assert_eq!(restored.priority, Priority::Low);

    // The persisted copy agrees with memory
    let reloaded = store_over(&kv, &clock);
    assert_eq!(reloaded.tasks(), store.tasks());
}

#[test]
fn ids_are_unique() {
    let mut store = store_over(&MemoryStore::new(), &clock());
    for i in 0..50 {
        store.add(TaskDraft::new(format!("task {}", i))).unwrap();
    }
    let mut ids: Vec<&str> = store.tasks().iter().map(|t| t.id.as_str()).collect();
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), 50);
}

#[test]
fn blank_titles_change_nothing() {
    let kv = MemoryStore::new();
    let mut store = store_over(&kv, &clock());
    assert!(matches!(store.add(TaskDraft::new("")), Err(TaskError::Validation)));
    assert!(matches!(store.add(TaskDraft::new("   ")), Err(TaskError::Validation)));
    assert!(store.is_empty());
    assert_eq!(kv.writes(TASKS_KEY), 0);
}

#[test]
fn undo_window_closes_after_five_seconds() {
    let clock = clock();
    let mut store = store_over(&MemoryStore::new(), &clock);
    let task = store.add(TaskDraft::new("Call mom")).unwrap();
    store.delete(&task.id).unwrap();

    clock.advance(Duration::seconds(5));
    assert_eq!(store.undo_last_delete(), None);
    assert!(store.is_empty());
}

#[test]
fn second_delete_replaces_the_undo_slot() {
    let clock = clock();
    let mut store = store_over(&MemoryStore::new(), &clock);
    let a = store.add(TaskDraft::new("a")).unwrap();
    let b = store.add(TaskDraft::new("b")).unwrap();
    store.delete(&a.id).unwrap();
    store.delete(&b.id).unwrap();

    assert_eq!(store.undo_last_delete().map(|t| t.title), Some("b".to_string()));
    assert_eq!(store.undo_last_delete(), None);
}

#[test]
fn projection_over_a_mixed_list() {
    let mut store = store_over(&MemoryStore::new(), &clock());
    let milk = store.add(TaskDraft::new("Buy milk")).unwrap();
    store
        .add(TaskDraft::new("Errands").with_notes("SHOPping list"))
        .unwrap();
    let rent = store.add(TaskDraft::new("Pay rent")).unwrap();
    store.toggle(&milk.id).unwrap();
    store.toggle(&rent.id).unwrap();

    let done = view::project(store.tasks(), Filter::Completed, "");
    let titles: Vec<&str> = done.tasks.iter().map(|t| t.title.as_str()).collect();
    assert_eq!(titles, vec!["Pay rent", "Buy milk"]);

    let shop = view::project(store.tasks(), Filter::All, "shop");
    assert_eq!(shop.count, 1);
    assert_eq!(shop.tasks[0].title, "Errands");

    let none = view::project(store.tasks(), Filter::Pending, "rent");
    assert_eq!(none.empty, Some(EmptyState::NoMatches));
}

#[test]
fn missing_id_is_healed_once() {
    let raw = r#"[{"title":"Legacy","completed":false,"priority":"high","createdAt":"2024-01-01T00:00:00Z"}]"#;
    let kv = MemoryStore::with_value(TASKS_KEY, raw);
    let clock = clock();

    let store = store_over(&kv, &clock);
    assert_eq!(kv.writes(TASKS_KEY), 1);
    let id = store.tasks()[0].id.clone();
    assert!(!id.is_empty());

    // Loading the healed data needs no further writes
    let again = store_over(&kv, &clock);
    assert_eq!(again.tasks()[0].id, id);
    assert_eq!(kv.writes(TASKS_KEY), 1);
    assert_eq!(kv.get(TASKS_KEY).unwrap(), kv.value(TASKS_KEY));
}

#[test]
fn session_reports_each_outcome() {
    let clock = clock();
    let mut session = Session::new(store_over(&MemoryStore::new(), &clock));

    assert_eq!(
        session.add(TaskDraft::new("  ")).message.text,
        "Task title is required"
    );
    assert_eq!(
        session.add(TaskDraft::new("Buy milk")).message.text,
        "Task added successfully"
    );
    let id = session.store().tasks()[0].id.clone();

    let deleted = session.delete(&id);
    let offer = deleted.undo_offer.unwrap();
    assert_eq!(offer.title, "Buy milk");
    assert_eq!(offer.expires_at, clock.now() + Duration::seconds(5));

    clock.advance(Duration::seconds(6));
    assert!(session.tick());
    assert_eq!(session.undo().message.text, "Nothing to undo");
}

// ---------------------------------------------------------------------------
// On-disk data directory
// ---------------------------------------------------------------------------

fn store_in(dir: &std::path::Path, clock: &ManualClock) -> TaskStore {
    TaskStore::load_all(Box::new(DirStore::open(dir).unwrap()), Box::new(clock.clone()))
}

#[test]
fn non_utf8_task_file_is_preserved_before_overwrite() {
    let tmp = tempfile::TempDir::new().unwrap();
    let raw: &[u8] = b"[{\"id\":\"a\",\"title\":\"caf\xe9\",\"priority\":\"low\"}]";
    fs::write(tmp.path().join(TASKS_KEY), raw).unwrap();
    let clock = clock();

    let mut store = store_in(tmp.path(), &clock);
    assert!(store.is_empty());
    assert_eq!(fs::read(tmp.path().join(CORRUPT_TASKS_KEY)).unwrap(), raw);

    store.add(TaskDraft::new("new")).unwrap();
    assert!(store.take_persist_error().is_none());

    // The original bytes survive the first write
    assert_eq!(fs::read(tmp.path().join(CORRUPT_TASKS_KEY)).unwrap(), raw);
    let fresh = store_in(tmp.path(), &clock);
    assert_eq!(fresh.len(), 1);
    assert_eq!(fresh.tasks()[0].title, "new");
}

#[test]
fn two_writers_on_one_directory_keep_both_changes() {
    let tmp = tempfile::TempDir::new().unwrap();
    let clock = clock();
    let mut ui = store_in(tmp.path(), &clock);
    let mut cli = store_in(tmp.path(), &clock);

    cli.add(TaskDraft::new("from cli")).unwrap();
    ui.add(TaskDraft::new("from ui")).unwrap();
    let first = ui.tasks()[1].id.clone();
    cli.toggle(&first).unwrap();

    let fresh = store_in(tmp.path(), &clock);
    let titles: Vec<_> = fresh.tasks().iter().map(|t| t.title.as_str()).collect();
    assert_eq!(titles, vec!["from ui", "from cli"]);
    assert!(fresh.tasks()[1].completed);
    assert!(tmp.path().join(".lock").exists());
}
