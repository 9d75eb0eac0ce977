//! End-to-end scenarios for the row store: load, filter, sort, page, select
//! and export, driven only through the public API.

use serde_json::{json, Value};
use tabula_core::{Record, RowStore, StoreConfig, TabulaConfig};
use tempfile::TempDir;

fn employees() -> Vec<Value> {
    vec![
        json!({"name": "Alice", "department": "Engineering", "age": 30, "email": "alice@corp.io"}),
        json!({"name": "Bob", "department": "Sales", "age": 25, "email": "bob@corp.com"}),
        json!({"name": "Carol", "department": "Engineering", "age": 35, "email": "carol@corp.io"}),
        json!({"name": "Dan", "department": "Engineering", "age": 40, "email": null}),
        json!({"name": "Erin", "department": "Support", "age": 28, "email": "erin@corp.com"}),
    ]
}

fn names(rows: &[Record]) -> Vec<String> {
    rows.iter()
        .map(|r| r["name"].as_str().unwrap_or_default().to_string())
        .collect()
}

#[test]
fn test_review_workflow_filter_select_export() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let out = temp_dir.path().join("engineering.csv");

    let mut store = RowStore::with_page_size(2);
    store.set_data(employees());

    store
        .set_filter("department = 'Engineering' AND age > 30")
        .expect("filter");
    assert_eq!(names(&store.get_page(None)), vec!["Carol", "Dan"]);

    assert_eq!(store.select_all(false), 2);
    store.set_filter("").expect("clear filter");

    let written = store.export_to_csv(&out, false).expect("export");
    assert_eq!(written, 2);

    let mut rdr = csv::Reader::from_path(&out).expect("read back");
    let headers = rdr.headers().expect("headers").clone();
    assert_eq!(&headers[0], "id");
    let exported: Vec<String> = rdr
        .records()
        .map(|r| r.expect("row")[1].to_string())
        .collect();
    assert_eq!(exported, vec!["Carol", "Dan"]);
}

#[test]
fn test_crud_round_trip_through_pages() {
    let mut store = RowStore::new();
    store.set_data(employees());

    let mut record = Record::new();
    record.insert("name".to_string(), json!("Frank"));
    record.insert("age".to_string(), json!(50));
    let id = store.create_record(record);

    store.set_sort("age DESC").expect("sort");
    // Dan has a null email but a real age, so Frank leads.
    assert_eq!(names(&store.get_page(Some(0)))[0], "Frank");

    assert!(store.update_from_value(id, json!({"age": 20})));
    assert_eq!(names(&store.get_page(None)).last().map(String::as_str), Some("Frank"));

    assert!(store.delete_record(id));
    assert_eq!(store.total_count(), 5);
}

#[test]
fn test_text_operators_on_email() {
    let mut store = RowStore::new();
    store.set_data(employees());

    store.set_filter("email ENDSWITH '.io'").expect("filter");
    assert_eq!(names(&store.get_page(None)), vec!["Alice", "Carol"]);

    store.set_filter("email LIKE '%@corp.c_m'").expect("filter");
    assert_eq!(names(&store.get_page(None)), vec!["Bob", "Erin"]);

    store
        .set_filter("department IN ('Sales', 'Support') OR name = 'Dan'")
        .expect("filter");
    assert_eq!(names(&store.get_page(None)), vec!["Bob", "Dan", "Erin"]);
}

#[test]
fn test_null_column_sorts_first() {
    let mut store = RowStore::new();
    store.set_data(employees());

    store.set_sort("email").expect("sort");
    assert_eq!(names(&store.get_page(None))[0], "Dan");

    store.set_sort("email DESC").expect("sort");
    assert_eq!(names(&store.get_page(None))[0], "Dan");
}

#[test]
fn test_store_from_toml_config() {
    let config = TabulaConfig::from_toml(
        r#"
        [store]
        page_size = 3
        default_sort = "name DESC"
        "#,
    )
    .expect("config");
    config.validate().expect("valid");

    let mut store = RowStore::from_config(&config.store).expect("store");
    store.set_data(employees());

    assert_eq!(store.page_count(), 2);
    assert_eq!(names(&store.get_page(None)), vec!["Erin", "Dan", "Carol"]);
}

#[test]
fn test_default_store_config_matches_new() {
    let store = RowStore::from_config(&StoreConfig::default()).expect("store");
    assert_eq!(store.page_size(), RowStore::new().page_size());
}
