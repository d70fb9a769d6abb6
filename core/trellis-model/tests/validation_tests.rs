mod common;

use common::{map, person};
use serde_json::json;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use trellis_model::{
    Entity, Schema, Validateable, ValidationResult, Validator, Value, ValueMap,
};

/// Requires a non-empty `title` and trims it.
fn title_validator(params: &ValueMap) -> ValidationResult {
    match params.get("title").and_then(Value::as_str).map(str::trim) {
        Some(title) if !title.is_empty() => {
            let mut sanitized = params.clone();
            sanitized.insert("title".into(), title.into());
            ValidationResult::success(sanitized)
        }
        _ => ValidationResult::failure().with_error("title", "must be filled"),
    }
}

fn note_schema() -> Arc<Schema> {
    Schema::builder("Note")
        .field("title")
        .field("body")
        .validator(title_validator)
        .build()
        .unwrap()
}

// ── ValidationResult ─────────────────────────────────────────────

#[test]
fn success_exposes_sanitized_params() {
    let result = ValidationResult::success(map(json!({"a": 1})));
    assert!(result.is_success());
    assert!(result.errors().is_empty());
    assert_eq!(result.valid_params(), map(json!({"a": 1})));
}

#[test]
fn failure_hides_sanitized_params() {
    let result = ValidationResult::failure()
        .with_error("a", "is missing")
        .with_error("a", "must be a number")
        .with_error("b", "is missing");
    assert!(!result.is_success());
    assert_eq!(result.errors()["a"], ["is missing", "must be a number"]);
    assert_eq!(result.errors().len(), 2);
    assert!(result.valid_params().is_empty());
}

#[test]
fn adding_error_marks_success_as_failed() {
    let result = ValidationResult::success(map(json!({"a": 1}))).with_error("a", "bad");
    assert!(!result.is_success());
    assert!(result.valid_params().is_empty());
    assert_eq!(result.sanitized_params(), &map(json!({"a": 1})));
}

// ── Validator collaborator ───────────────────────────────────────

#[test]
fn closures_are_validators() {
    let always_ok = |params: &ValueMap| ValidationResult::success(params.clone());
    let result = always_ok.validate(&map(json!({"x": 1})));
    assert!(result.is_success());
}

#[test]
fn schema_validate_delegates() {
    let schema = note_schema();
    let result = schema.validate(&map(json!({"title": "  hi "}))).unwrap();
    assert!(result.is_success());
    assert_eq!(result.sanitized_params()["title"], Value::from("hi"));
}

#[test]
fn schema_without_validator_returns_none() {
    let schema = Schema::builder("Plain").field("x").build().unwrap();
    assert!(schema.validate(&ValueMap::new()).is_none());
    assert!(schema.validator().is_none());
}

// ── Validateable on entities ─────────────────────────────────────

#[test]
fn valid_entity() {
    let schema = note_schema();
    let note = Entity::construct(&schema, map(json!({"title": " Todo ", "body": "x"}))).unwrap();
    assert!(note.is_valid());
    assert!(note.validation_errors().is_empty());
    assert_eq!(note.valid_params(), map(json!({"title": "Todo", "body": "x"})));
}

#[test]
fn invalid_entity() {
    let schema = note_schema();
    let note = Entity::construct(&schema, map(json!({"body": "x"}))).unwrap();
    assert!(!note.is_valid());
    assert_eq!(
        note.validation_errors()["title"],
        vec!["must be filled".to_string()]
    );
    assert!(note.valid_params().is_empty());
}

#[test]
fn entity_without_validator_is_vacuously_valid() {
    let p = person(json!({"name": "Ada"}));
    assert!(p.is_valid());
    assert!(p.validation().is_none());
    assert!(p.validation_errors().is_empty());
    assert_eq!(p.valid_params(), map(json!({"name": "Ada"})));
}

#[test]
fn validation_reflects_later_mutation() {
    let schema = note_schema();
    let mut note = Entity::construct(&schema, map(json!({"title": "ok"}))).unwrap();
    assert!(note.is_valid());
    note.set("title", "   ").unwrap();
    assert!(!note.is_valid());
}

// ── Custom Validateable ──────────────────────────────────────────

struct SignupForm {
    params: ValueMap,
}

impl Validateable for SignupForm {
    fn params(&self) -> ValueMap {
        self.params.clone()
    }

    fn validator(&self) -> Option<&dyn Validator> {
        None
    }
}

#[test]
fn custom_validateable_uses_raw_params_without_validator() {
    let form = SignupForm {
        params: map(json!({"email": "a@b.c"})),
    };
    assert!(form.is_valid());
    assert_eq!(form.valid_params(), map(json!({"email": "a@b.c"})));
}

// ── Recomputation ────────────────────────────────────────────────

/// Passes on odd runs, fails on even ones.
#[derive(Default)]
struct Alternating {
    runs: AtomicUsize,
}

impl Validator for Alternating {
    fn validate(&self, params: &ValueMap) -> ValidationResult {
        let run = self.runs.fetch_add(1, Ordering::SeqCst) + 1;
        if run % 2 == 1 {
            ValidationResult::success(params.clone())
        } else {
            ValidationResult::failure().with_error("run", format!("run {run} failed"))
        }
    }
}

struct Ticket {
    params: ValueMap,
    validator: Alternating,
}

impl Validateable for Ticket {
    fn params(&self) -> ValueMap {
        self.params.clone()
    }

    fn validator(&self) -> Option<&dyn Validator> {
        Some(&self.validator)
    }
}

#[test]
fn each_accessor_runs_the_validator() {
    let ticket = Ticket {
        params: map(json!({"seat": "12A"})),
        validator: Alternating::default(),
    };
    assert!(ticket.is_valid());
    assert!(!ticket.validation_errors().is_empty());
    assert_eq!(ticket.validator.runs.load(Ordering::SeqCst), 2);
}

#[test]
fn one_validation_result_gives_a_consistent_view() {
    let ticket = Ticket {
        params: map(json!({"seat": "12A"})),
        validator: Alternating::default(),
    };
    let result = ticket.validation().unwrap();
    assert!(result.is_success());
    assert!(result.errors().is_empty());
    assert_eq!(result.valid_params(), map(json!({"seat": "12A"})));
    assert_eq!(ticket.validator.runs.load(Ordering::SeqCst), 1);
}
