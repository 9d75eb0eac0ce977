//! Tests for filter evaluation.

use crate::query::{Connective, FilterExpr, Op, Term};
use crate::value::{record_from_value, Record};
use serde_json::{json, Value};

fn row(value: Value) -> Record {
    record_from_value(value)
}

fn filter(input: &str) -> FilterExpr {
    FilterExpr::parse(input).unwrap().unwrap()
}

fn people() -> Vec<Record> {
    vec![
        row(json!({"name": "Alice", "age": 30})),
        row(json!({"name": "Bob", "age": 25})),
    ]
}

fn matching_names(rows: &[Record], expr: &str) -> Vec<String> {
    let f = filter(expr);
    rows.iter()
        .filter(|r| f.matches(r))
        .map(|r| r["name"].as_str().unwrap().to_string())
        .collect()
}

#[test]
fn test_age_gte_selects_alice() {
    assert_eq!(matching_names(&people(), "age >= 30"), vec!["Alice"]);
}

#[test]
fn test_contains_is_case_insensitive_substring() {
    assert_eq!(matching_names(&people(), "name CONTAINS 'o'"), vec!["Bob"]);
    assert_eq!(matching_names(&people(), "name CONTAINS 'ALI'"), vec!["Alice"]);
}

#[test]
fn test_and_of_department_and_age() {
    let rows = vec![
        row(json!({"name": "A", "department": "Engineering", "age": 30})),
        row(json!({"name": "B", "department": "Engineering", "age": 35})),
        row(json!({"name": "C", "department": "Engineering", "age": 40})),
    ];
    // Only the age-40 row is strictly above 35.
    assert_eq!(
        matching_names(&rows, "department = 'Engineering' AND age > 35"),
        vec!["C"]
    );
    assert_eq!(
        matching_names(&rows, "department = 'Engineering' AND age > 30"),
        vec!["B", "C"]
    );
}

#[test]
fn test_left_to_right_without_precedence() {
    // Standard precedence would read `a OR (b AND c)` and match; strict
    // left-to-right reads `(a OR b) AND c` and does not.
    let r = row(json!({"a": 1, "b": 0, "c": 0}));
    assert!(!filter("a = 1 OR b = 1 AND c = 1").matches(&r));

    let r = row(json!({"a": 0, "b": 0, "c": 1}));
    assert!(filter("a = 0 AND b = 1 OR c = 1").matches(&r));
}

#[test]
fn test_ordering_against_null_is_false() {
    let r = row(json!({"age": null}));
    assert!(!filter("age > 3").matches(&r));
    assert!(!filter("age <= 3").matches(&r));

    let r = row(json!({"age": 5}));
    assert!(!filter("age > null").matches(&r));
}

#[test]
fn test_missing_column_reads_as_null() {
    let r = row(json!({"name": "x"}));
    assert!(filter("age = null").matches(&r));
    assert!(filter("age != 3").matches(&r));
    assert!(!filter("age < 3").matches(&r));
    assert!(!filter("age").matches(&r));
}

#[test]
fn test_type_mismatch_is_false_and_reported() {
    let r = row(json!({"age": "thirty"}));
    let f = filter("age > 3");

    assert!(!f.matches(&r));
    let err = f.evaluate(&r).unwrap_err();
    assert_eq!(err.column, "age");
    assert!(err.message.contains("string"));
}

#[test]
fn test_failed_term_does_not_poison_or() {
    let r = row(json!({"age": "thirty", "name": "Zed"}));
    assert!(filter("age > 3 OR name = 'Zed'").matches(&r));
}

#[test]
fn test_equality_numeric_int_float() {
    let r = row(json!({"score": 2}));
    assert!(filter("score = 2.0").matches(&r));
    assert!(!filter("score = '2'").matches(&r));
}

#[test]
fn test_in_membership() {
    let r = row(json!({"status": "pending"}));
    assert!(filter("status IN ('active', 'pending')").matches(&r));
    assert!(!filter("status IN ('active')").matches(&r));
    assert!(!filter("status IN ()").matches(&r));
}

#[test]
fn test_like_term() {
    let f = filter("name LIKE 'A%e'");
    assert!(f.matches(&row(json!({"name": "Apple"}))));
    assert!(f.matches(&row(json!({"name": "Ae"}))));
    assert!(!f.matches(&row(json!({"name": "apple "}))));
}

#[test]
fn test_like_on_numbers_uses_text_form() {
    assert!(filter("zip LIKE '75%'").matches(&row(json!({"zip": 75001}))));
}

#[test]
fn test_startswith_endswith() {
    let r = row(json!({"email": "Ada@Example.org"}));
    assert!(filter("email STARTSWITH 'ada'").matches(&r));
    assert!(filter("email ENDSWITH '.ORG'").matches(&r));
    assert!(!filter("email ENDSWITH '.com'").matches(&r));
}

#[test]
fn test_truthiness() {
    assert!(filter("active").matches(&row(json!({"active": true}))));
    assert!(filter("active").matches(&row(json!({"active": "yes"}))));
    assert!(!filter("active").matches(&row(json!({"active": 0}))));
    assert!(!filter("active").matches(&row(json!({"active": ""}))));
    assert!(!filter("active").matches(&row(json!({"active": null}))));
}

#[test]
fn test_string_ordering_is_lexicographic() {
    let r = row(json!({"name": "Bob"}));
    assert!(filter("name > 'Alice'").matches(&r));
    assert!(!filter("name >= 'Carol'").matches(&r));
}

#[test]
fn test_built_filter_evaluates_like_parsed() {
    let built = FilterExpr::new(Term {
        column: "age".into(),
        op: Op::Lt(json!(28)),
    })
    .then(
        Connective::Or,
        Term {
            column: "name".into(),
            op: Op::StartsWith(json!("al")),
        },
    );

    let rows = people();
    let via_built: Vec<bool> = rows.iter().map(|r| built.matches(r)).collect();
    let via_parsed: Vec<bool> = rows
        .iter()
        .map(|r| filter("age < 28 OR name STARTSWITH 'al'").matches(r))
        .collect();
    assert_eq!(via_built, vec![true, true]);
    assert_eq!(via_built, via_parsed);
}

#[test]
fn test_unicode_column_filter() {
    let rows = vec![
        row(json!({"name": "A", "é": 1})),
        row(json!({"name": "B", "é": 2})),
    ];
    assert_eq!(matching_names(&rows, "é = 1"), vec!["A"]);
    assert_eq!(matching_names(&rows, "é > 1"), vec!["B"]);
}
