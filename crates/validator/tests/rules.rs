//! Individual rule operations.
//!
//! Each rule is exercised on its own against a record held in an
//! in-memory collection: falsy short-circuiting, default messages, and
//! strict equality for `match`.

use model_validator::prelude::*;
use pretty_assertions::assert_eq;
use regex::Regex;
use serde_json::{Value, json};

// ---------------------------------------------------------------------------
// Test helpers
// ---------------------------------------------------------------------------

fn record_with(attribute: &str, value: Value) -> MemoryRecord {
    MemoryRecord::new(&MemoryCollection::shared()).with(attribute, value)
}

fn falsy_values() -> Vec<Option<Value>> {
    vec![
        None,
        Some(Value::Null),
        Some(json!(0)),
        Some(json!(0.0)),
        Some(json!("")),
        Some(json!(false)),
    ]
}

fn record_for(value: Option<Value>) -> MemoryRecord {
    let record = MemoryRecord::new(&MemoryCollection::shared());
    match value {
        Some(value) => record.with("name", value),
        None => record,
    }
}

fn message(result: RuleResult) -> String {
    match result {
        Ok(()) => panic!("expected the rule to fail"),
        Err(error) => error.message().into_owned(),
    }
}

// ---------------------------------------------------------------------------
// required
// ---------------------------------------------------------------------------

#[tokio::test]
async fn required_fails_for_every_falsy_value() {
    for value in falsy_values() {
        let record = record_for(value.clone());
        let validator = Validator::new(&record);
        let result = validator.required("name", None).await;
        assert_eq!(message(result), "name is required", "value: {value:?}");
    }
}

#[tokio::test]
async fn required_passes_for_truthy_values() {
    for value in [json!("x"), json!(1), json!(true), json!([]), json!({})] {
        let record = record_with("name", value);
        let validator = Validator::new(&record);
        assert!(validator.required("name", None).await.is_ok());
    }
}

#[tokio::test]
async fn required_uses_custom_message() {
    let record = record_for(None);
    let validator = Validator::new(&record);
    let result = validator.required("name", Some("tell us your name")).await;
    assert_eq!(message(result), "tell us your name");
}

// ---------------------------------------------------------------------------
// match
// ---------------------------------------------------------------------------

#[tokio::test]
async fn match_compares_strictly() {
    let record = MemoryRecord::new(&MemoryCollection::shared())
        .with("password", "secret")
        .with("confirmation", "secret")
        .with("other", "different")
        .with("number", 1)
        .with("text", "1");
    let validator = Validator::new(&record);

    assert!(validator.matches("password", "confirmation", None).await.is_ok());
    assert_eq!(
        message(validator.matches("password", "other", None).await),
        "password must match other"
    );
    assert!(validator.matches("number", "text", None).await.is_err());
}

#[tokio::test]
async fn match_passes_when_both_unset() {
    let record = record_for(None);
    let validator = Validator::new(&record);
    assert!(validator.matches("a", "b", None).await.is_ok());
}

#[tokio::test]
async fn match_distinguishes_null_from_unset() {
    let record = record_with("a", Value::Null);
    let validator = Validator::new(&record);
    assert!(validator.matches("a", "b", None).await.is_err());
}

// ---------------------------------------------------------------------------
// minLength / maxLength
// ---------------------------------------------------------------------------

#[tokio::test]
async fn min_length_boundary() {
    let short = record_with("name", json!("xx"));
    assert_eq!(
        message(Validator::new(&short).min_length("name", 3, None).await),
        "name must be at least 3 characters long"
    );

    let exact = record_with("name", json!("xxx"));
    assert!(Validator::new(&exact).min_length("name", 3, None).await.is_ok());
}

#[tokio::test]
async fn max_length_boundary() {
    let long = record_with("name", json!("xxxx"));
    assert_eq!(
        message(Validator::new(&long).max_length("name", 3, None).await),
        "name must be at most 3 characters long"
    );

    let exact = record_with("name", json!("xxx"));
    assert!(Validator::new(&exact).max_length("name", 3, None).await.is_ok());
}

#[tokio::test]
async fn length_rules_skip_falsy_values() {
    for value in falsy_values() {
        let record = record_for(value);
        let validator = Validator::new(&record);
        assert!(validator.min_length("name", 100, None).await.is_ok());
        assert!(validator.max_length("name", 0, None).await.is_ok());
    }
}

#[tokio::test]
async fn length_counts_characters_and_elements() {
    let record = MemoryRecord::new(&MemoryCollection::shared())
        .with("name", "héllo")
        .with("tags", json!(["a", "b"]));
    let validator = Validator::new(&record);

    assert!(validator.max_length("name", 5, None).await.is_ok());
    assert!(validator.min_length("tags", 3, None).await.is_err());
    assert!(validator.max_length("tags", 2, None).await.is_ok());
}

#[tokio::test]
async fn length_rules_ignore_values_without_length() {
    let record = record_with("age", json!(12345));
    let validator = Validator::new(&record);
    assert!(validator.min_length("age", 10, None).await.is_ok());
    assert!(validator.max_length("age", 1, None).await.is_ok());
}

// ---------------------------------------------------------------------------
// pattern
// ---------------------------------------------------------------------------

#[tokio::test]
async fn pattern_reports_offending_value() {
    let pattern = Regex::new("^[a-z]+$").unwrap();

    let bad = record_with("name", json!("!"));
    assert_eq!(
        message(Validator::new(&bad).pattern("name", &pattern, None).await),
        "'!' is not a valid name"
    );

    let good = record_with("name", json!("name"));
    assert!(Validator::new(&good).pattern("name", &pattern, None).await.is_ok());
}

#[tokio::test]
async fn pattern_skips_falsy_values() {
    // Would reject the empty string if it were tested.
    let pattern = Regex::new("^x+$").unwrap();
    for value in falsy_values() {
        let record = record_for(value);
        let validator = Validator::new(&record);
        assert!(validator.pattern("name", &pattern, None).await.is_ok());
    }
}

#[tokio::test]
async fn pattern_tests_coerced_numbers() {
    let pattern = Regex::new(r"^\d{3}$").unwrap();

    let record = record_with("code", json!(123));
    assert!(Validator::new(&record).pattern("code", &pattern, None).await.is_ok());

    let record = record_with("code", json!(12));
    assert_eq!(
        message(Validator::new(&record).pattern("code", &pattern, None).await),
        "'12' is not a valid code"
    );
}

#[tokio::test]
async fn pattern_tests_integral_floats_without_fraction() {
    let pattern = Regex::new(r"^\d+$").unwrap();

    let record = record_with("code", json!(1.0));
    assert!(Validator::new(&record).pattern("code", &pattern, None).await.is_ok());

    let letters = Regex::new("^[a-z]+$").unwrap();
    let record = record_with("code", json!(-7.0));
    assert_eq!(
        message(Validator::new(&record).pattern("code", &letters, None).await),
        "'-7' is not a valid code"
    );
}

// ---------------------------------------------------------------------------
// idempotence
// ---------------------------------------------------------------------------

#[tokio::test]
async fn repeated_calls_agree() {
    let record = record_with("name", json!("xx"));
    let validator = Validator::new(&record);

    let first = validator.min_length("name", 3, None).await.map_err(|e| e.to_string());
    let second = validator.min_length("name", 3, None).await.map_err(|e| e.to_string());
    assert_eq!(first, second);
}

#[tokio::test]
async fn rules_do_not_mutate_the_record() {
    let record = record_with("name", json!("xx"));
    let before = record.row().clone();

    let validator = Validator::new(&record);
    let _ = validator.required("name", None).await;
    let _ = validator.unique("name", None).await;
    let _ = validator.min_length("name", 3, None).await;

    assert_eq!(record.row(), &before);
}
