//! Tests for strategy selection.

use super::*;
use std::io::Write;
use tempfile::NamedTempFile;

fn csv_file(rows: usize) -> NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
    writeln!(file, "id,name").unwrap();
    for i in 0..rows {
        writeln!(file, "{i:04},name{i:04}").unwrap();
    }
    file.flush().unwrap();
    file
}

#[test]
fn test_choose_strategy_thresholds() {
    assert_eq!(choose_strategy(50, 100), LoadingStrategy::Eager);
    assert_eq!(choose_strategy(100, 100), LoadingStrategy::Chunked);
    assert_eq!(choose_strategy(300, 100), LoadingStrategy::Chunked);
    assert_eq!(choose_strategy(500, 100), LoadingStrategy::Hybrid);
    assert_eq!(choose_strategy(10_000, 100), LoadingStrategy::Hybrid);
}

#[test]
fn test_lazy_and_hybrid_execute_eagerly() {
    assert_eq!(
        resolve_strategy(LoadingStrategy::Lazy, 10, 100),
        (LoadingStrategy::Lazy, LoadingStrategy::Eager)
    );
    assert_eq!(
        resolve_strategy(LoadingStrategy::Auto, 1000, 100),
        (LoadingStrategy::Hybrid, LoadingStrategy::Eager)
    );
    assert_eq!(
        resolve_strategy(LoadingStrategy::Auto, 300, 100),
        (LoadingStrategy::Chunked, LoadingStrategy::Chunked)
    );
    assert_eq!(
        resolve_strategy(LoadingStrategy::Chunked, 1, 100),
        (LoadingStrategy::Chunked, LoadingStrategy::Chunked)
    );
}

#[test]
fn test_small_file_is_counted_exactly() {
    let file = csv_file(50);

    let rows = estimate_row_count(file.path(), FileFormat::Csv, &LoadOptions::default()).unwrap();

    assert_eq!(rows, 50);
}

#[test]
fn test_large_file_is_estimated_from_sample() {
    // Fixed-width rows make the estimate close to exact.
    let file = csv_file(300);

    let rows = estimate_row_count(file.path(), FileFormat::Csv, &LoadOptions::default()).unwrap();

    assert!((295..=305).contains(&rows), "estimate {rows}");
    assert_eq!(choose_strategy(rows, 100), LoadingStrategy::Chunked);
}

#[test]
fn test_headerless_file_counts_every_line() {
    let file = csv_file(10);
    let options = LoadOptions {
        has_header: false,
        ..LoadOptions::default()
    };

    let rows = estimate_row_count(file.path(), FileFormat::Csv, &options).unwrap();

    assert_eq!(rows, 11);
}

#[test]
fn test_json_uses_size_proxy() {
    let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
    file.write_all(&vec![b' '; 1000]).unwrap();
    file.flush().unwrap();

    let rows = estimate_row_count(file.path(), FileFormat::Json, &LoadOptions::default()).unwrap();

    assert_eq!(rows, 10);
}

#[test]
fn test_jsonl_skips_blank_lines_when_exact() {
    let mut file = tempfile::Builder::new().suffix(".jsonl").tempfile().unwrap();
    write!(file, "{{\"a\":1}}\n\n{{\"a\":2}}\n").unwrap();
    file.flush().unwrap();

    let rows = estimate_row_count(file.path(), FileFormat::Jsonl, &LoadOptions::default()).unwrap();

    assert_eq!(rows, 2);
}

#[test]
fn test_missing_file_is_not_found() {
    let err = estimate_row_count(
        Path::new("/nonexistent/tabula.csv"),
        FileFormat::Csv,
        &LoadOptions::default(),
    )
    .unwrap_err();

    assert!(matches!(err, Error::NotFound(_)));
}
