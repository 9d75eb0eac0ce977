//! Tests for strategy execution.

use super::*;
use serde_json::json;
use std::io::Write;
use std::sync::Arc;
use tempfile::NamedTempFile;

fn csv_rows(rows: usize) -> NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
    writeln!(file, "name,score").unwrap();
    for i in 0..rows {
        writeln!(file, "user{i},{}", i % 10).unwrap();
    }
    file.flush().unwrap();
    file
}

fn progress_log() -> (Arc<Mutex<Vec<(usize, usize)>>>, Hooks) {
    let log = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&log);
    let hooks = Hooks::new().on_progress(move |current, total| sink.lock().push((current, total)));
    (log, hooks)
}

#[test]
fn test_eager_load_replaces_store() {
    let file = csv_rows(3);
    let store = Mutex::new(RowStore::new());
    store.lock().set_data(vec![json!({"old": true})]);

    let report = load_into(
        file.path(),
        FileFormat::Csv,
        &LoadOptions::default(),
        &Hooks::new(),
        &store,
    )
    .unwrap();

    let store = store.lock();
    assert_eq!(report.strategy, LoadingStrategy::Eager);
    assert_eq!(report.rows_loaded, 3);
    assert_eq!(store.len(), 3);
    assert_eq!(store.columns(), vec!["id", "name", "score", "selected"]);
    assert_eq!(store.records()[0]["name"], json!("user0"));
}

#[test]
fn test_eager_progress_every_thousand_and_at_end() {
    let file = csv_rows(2500);
    let (log, hooks) = progress_log();
    let store = Mutex::new(RowStore::new());

    load_into(file.path(), FileFormat::Csv, &LoadOptions::default(), &hooks, &store).unwrap();

    let log = log.lock();
    let currents: Vec<usize> = log.iter().map(|(c, _)| *c).collect();
    assert_eq!(currents, vec![1000, 2000, 2500]);
    assert_eq!(log.last(), Some(&(2500, 2500)));
}

#[test]
fn test_chunked_load_appends_with_continuous_ids() {
    let file = csv_rows(25);
    let (log, hooks) = progress_log();
    let options = LoadOptions {
        loading_strategy: LoadingStrategy::Chunked,
        chunk_size: 10,
        ..LoadOptions::default()
    };
    let store = Mutex::new(RowStore::new());

    let report = load_into(file.path(), FileFormat::Csv, &options, &hooks, &store).unwrap();

    assert_eq!(report.chunks, 3);
    assert_eq!(report.rows_loaded, 25);
    let ids: Vec<i64> = store
        .lock()
        .records()
        .iter()
        .map(|r| r["id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, (1..=25).collect::<Vec<_>>());
    let currents: Vec<usize> = log.lock().iter().map(|(c, _)| *c).collect();
    assert_eq!(currents, vec![10, 20, 25]);
}

#[test]
fn test_chunked_load_of_empty_file_clears_store() {
    let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
    writeln!(file, "a,b").unwrap();
    file.flush().unwrap();
    let options = LoadOptions {
        loading_strategy: LoadingStrategy::Chunked,
        ..LoadOptions::default()
    };
    let store = Mutex::new(RowStore::new());
    store.lock().set_data(vec![json!({"old": 1})]);

    let report = load_into(file.path(), FileFormat::Csv, &options, &Hooks::new(), &store).unwrap();

    assert_eq!(report.chunks, 1);
    assert!(store.lock().is_empty());
}

#[test]
fn test_auto_picks_chunked_above_threshold() {
    let file = csv_rows(300);
    let options = LoadOptions {
        max_memory_rows: 100,
        chunk_size: 100,
        ..LoadOptions::default()
    };
    let store = Mutex::new(RowStore::new());

    let report = load_into(file.path(), FileFormat::Csv, &options, &Hooks::new(), &store).unwrap();

    assert_eq!(report.requested, LoadingStrategy::Chunked);
    assert_eq!(report.strategy, LoadingStrategy::Chunked);
    assert_eq!(store.lock().len(), 300);
}

#[test]
fn test_hybrid_runs_eagerly() {
    let file = csv_rows(20);
    let options = LoadOptions {
        loading_strategy: LoadingStrategy::Hybrid,
        ..LoadOptions::default()
    };
    let store = Mutex::new(RowStore::new());

    let report = load_into(file.path(), FileFormat::Csv, &options, &Hooks::new(), &store).unwrap();

    assert_eq!(report.requested, LoadingStrategy::Hybrid);
    assert_eq!(report.strategy, LoadingStrategy::Eager);
    assert_eq!(store.lock().len(), 20);
}

#[test]
fn test_on_complete_receives_report() {
    let file = csv_rows(5);
    let seen = Arc::new(Mutex::new(None));
    let sink = Arc::clone(&seen);
    let hooks = Hooks::new().on_complete(move |report| *sink.lock() = Some(report.rows_loaded));
    let store = Mutex::new(RowStore::new());

    load_into(file.path(), FileFormat::Csv, &LoadOptions::default(), &hooks, &store).unwrap();

    assert_eq!(*seen.lock(), Some(5));
}

#[test]
fn test_read_error_keeps_previous_contents() {
    let mut file = tempfile::Builder::new().suffix(".jsonl").tempfile().unwrap();
    writeln!(file, "{{\"a\": 1}}").unwrap();
    writeln!(file, "{{broken").unwrap();
    file.flush().unwrap();
    let store = Mutex::new(RowStore::new());
    store.lock().set_data(vec![json!({"old": 1})]);

    let err = load_into(
        file.path(),
        FileFormat::Jsonl,
        &LoadOptions::default(),
        &Hooks::new(),
        &store,
    )
    .unwrap_err();

    assert!(matches!(err, crate::error::Error::Json(_)));
    assert_eq!(store.lock().len(), 1);
    assert_eq!(store.lock().records()[0]["old"], json!(1));
}
