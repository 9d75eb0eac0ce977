//! Tests for the file-backed data source.

use super::*;
use serde_json::json;
use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use tempfile::NamedTempFile;

fn people_csv() -> NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
    writeln!(file, "name,department,age").unwrap();
    writeln!(file, "Alice,Engineering,30").unwrap();
    writeln!(file, "Bob,Sales,25").unwrap();
    writeln!(file, "Carol,Engineering,41").unwrap();
    file.flush().unwrap();
    file
}

fn broken_jsonl() -> NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".jsonl").tempfile().unwrap();
    writeln!(file, "not json").unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn test_missing_path_is_not_found() {
    let err = FileDataSource::new("/nonexistent/people.csv", LoadOptions::default(), Hooks::new())
        .unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
}

#[test]
fn test_invalid_options_are_rejected_at_construction() {
    let file = people_csv();
    let options = LoadOptions {
        chunk_size: 0,
        ..LoadOptions::default()
    };

    let err = FileDataSource::new(file.path(), options, Hooks::new()).unwrap_err();

    assert!(matches!(err, Error::Config(_)));
}

#[test]
fn test_format_resolved_from_extension() {
    let file = people_csv();
    let source = FileDataSource::new(file.path(), LoadOptions::default(), Hooks::new()).unwrap();
    assert_eq!(source.format(), FileFormat::Csv);
}

#[test]
fn test_sync_load_then_query() {
    let file = people_csv();
    let options = LoadOptions {
        infer_types: true,
        ..LoadOptions::default()
    };
    let mut source = FileDataSource::new(file.path(), options, Hooks::new()).unwrap();

    source.load().unwrap();
    source.set_filter("age > 28").unwrap();
    source.set_sort("age DESC").unwrap();
    let page = source.get_page(None);

    assert_eq!(source.total_count(), 2);
    assert_eq!(page[0]["name"], json!("Carol"));
    assert_eq!(source.last_report().map(|r| r.rows_loaded), Some(3));
    assert!(source.last_error().is_none());
}

#[test]
fn test_sync_error_without_hook_is_returned() {
    let file = broken_jsonl();
    let mut source = FileDataSource::new(file.path(), LoadOptions::default(), Hooks::new()).unwrap();

    let err = source.load().unwrap_err();

    assert!(matches!(err, Error::Json(_)));
    assert!(source.last_error().is_some());
    assert!(source.last_report().is_none());
}

#[test]
fn test_sync_error_with_hook_is_routed() {
    let file = broken_jsonl();
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let hooks = Hooks::new().on_error(move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
    });
    let mut source = FileDataSource::new(file.path(), LoadOptions::default(), hooks).unwrap();

    assert!(source.load().is_ok());
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_threaded_load_completes() {
    let file = people_csv();
    let options = LoadOptions {
        use_threading: true,
        ..LoadOptions::default()
    };
    let mut source = FileDataSource::new(file.path(), options, Hooks::new()).unwrap();

    source.load().unwrap();

    assert!(source.wait_for_load(Duration::from_secs(10)));
    assert!(!source.is_loading());
    assert_eq!(source.store().len(), 3);
    assert_eq!(source.last_report().map(|r| r.rows_loaded), Some(3));
}

#[test]
fn test_threaded_error_goes_to_hook() {
    let file = broken_jsonl();
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let hooks = Hooks::new().on_error(move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
    });
    let options = LoadOptions {
        use_threading: true,
        ..LoadOptions::default()
    };
    let mut source = FileDataSource::new(file.path(), options, hooks).unwrap();

    source.load().unwrap();

    assert!(source.wait_for_load(Duration::from_secs(10)));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(source.last_error().is_some());
}

#[test]
fn test_wait_without_load_returns_immediately() {
    let file = people_csv();
    let mut source = FileDataSource::new(file.path(), LoadOptions::default(), Hooks::new()).unwrap();
    assert!(source.wait_for_load(Duration::from_millis(1)));
}

#[test]
fn test_wait_times_out_while_loader_is_blocked() {
    let file = people_csv();
    let options = LoadOptions {
        use_threading: true,
        ..LoadOptions::default()
    };
    let mut source = FileDataSource::new(file.path(), options, Hooks::new()).unwrap();
    let store = source.shared_store();

    // The loader cannot write while the guard is held.
    let guard = store.lock();
    source.load().unwrap();
    assert!(!source.wait_for_load(Duration::from_millis(50)));
    assert!(source.is_loading());
    assert!(matches!(source.load(), Err(Error::Worker(_))));
    drop(guard);

    assert!(source.wait_for_load(Duration::from_secs(10)));
    assert_eq!(store.lock().len(), 3);
}

#[test]
fn test_reload_replaces_rows() {
    let file = people_csv();
    let mut source = FileDataSource::new(file.path(), LoadOptions::default(), Hooks::new()).unwrap();

    source.load().unwrap();
    source.select_all(false);
    source.load().unwrap();

    assert_eq!(source.store().len(), 3);
    assert_eq!(source.selected_count(), 0);
}

#[test]
fn test_with_store_keeps_configured_page_size() {
    let file = people_csv();
    let mut source = FileDataSource::new(file.path(), LoadOptions::default(), Hooks::new())
        .unwrap()
        .with_store(RowStore::with_page_size(2));

    source.load().unwrap();

    assert_eq!(source.get_page(None).len(), 2);
    assert!(source.has_next_page());
    assert_eq!(source.next_page().len(), 1);
}

#[test]
fn test_into_store_returns_loaded_rows() {
    let file = people_csv();
    let mut source = FileDataSource::new(file.path(), LoadOptions::default(), Hooks::new()).unwrap();
    source.load().unwrap();

    let store = source.into_store();

    assert_eq!(store.len(), 3);
    assert_eq!(store.records()[1]["name"], json!("Bob"));
}
