mod common;

use common::{ADDRESS, PERSON, integer_type};
use trellis_model::{
    AttributeOptions, Entity, ModelError, Schema, SourceType, UnknownKeyPolicy, ValueMap,
};

fn configuration_message(result: Result<std::sync::Arc<Schema>, ModelError>) -> String {
    match result {
        Err(ModelError::Configuration(msg)) => msg,
        Err(other) => panic!("expected configuration error, got {other}"),
        Ok(schema) => panic!("expected configuration error, built {schema:?}"),
    }
}

// ── Declaration order & flags ────────────────────────────────────

#[test]
fn fields_keep_declaration_order() {
    let fields: Vec<&str> = PERSON.fields().collect();
    assert_eq!(
        fields,
        ["name", "age", "active", "cache", "tags", "address", "pets"]
    );
}

#[test]
fn comparable_fields_exclude_opt_outs() {
    let comparable: Vec<&str> = PERSON.comparable_fields().collect();
    assert!(!comparable.contains(&"cache"));
    assert!(comparable.contains(&"address"));
    assert_eq!(comparable.len(), 6);
}

#[test]
fn namespace_fields_are_tracked() {
    let namespaces: Vec<&str> = PERSON.namespace_fields().collect();
    assert_eq!(namespaces, ["address"]);
    let attr = PERSON.attribute("address").unwrap();
    assert!(attr.is_comparable());
    assert!(std::sync::Arc::ptr_eq(attr.namespace().unwrap(), &*ADDRESS));
}

#[test]
fn coercions_only_for_coerced_attributes() {
    let coercions = PERSON.coercions();
    assert_eq!(coercions.len(), 3);
    assert_eq!(coercions.get("age").unwrap().target_name(), "Integer");
    assert_eq!(coercions.get("age").unwrap().selector(), "parse");
    assert_eq!(coercions.get("address").unwrap().selector(), "wrap");
    assert_eq!(coercions.get("pets").unwrap().selector(), "wrap_each");
    assert!(!coercions.contains("name"));
}

#[test]
fn predicate_flag_is_recorded() {
    assert!(PERSON.attribute("active").unwrap().is_predicate());
    assert!(!PERSON.attribute("name").unwrap().is_predicate());
}

#[test]
fn attrs_declares_many_with_shared_options() {
    let schema = Schema::builder("Flags")
        .attrs_predicate(["draft", "pinned"], AttributeOptions::new().comparable(false))
        .build()
        .unwrap();
    assert_eq!(schema.fields().collect::<Vec<_>>(), ["draft", "pinned"]);
    assert_eq!(schema.comparable_fields().count(), 0);
    assert!(schema.attributes().iter().all(|a| a.is_predicate()));
}

#[test]
fn empty_schema_is_valid() {
    let schema = Schema::builder("Empty").build().unwrap();
    assert_eq!(schema.fields().count(), 0);
    let entity = Entity::construct(&schema, ValueMap::new()).unwrap();
    assert_eq!(entity.inspect(), "#<Empty>");
}

// ── Configuration errors ─────────────────────────────────────────

#[test]
fn duplicate_attribute_is_rejected() {
    let msg = configuration_message(Schema::builder("Dup").field("a").field("a").build());
    assert!(msg.contains("`a` declared twice"), "{msg}");
}

#[test]
fn coercion_type_without_selector_is_rejected() {
    let msg = configuration_message(
        Schema::builder("Bad")
            .attr("age", AttributeOptions::new().coerce_type(integer_type()))
            .build(),
    );
    assert!(msg.contains("without a selector"), "{msg}");
}

#[test]
fn selector_without_coercion_type_is_rejected() {
    let msg = configuration_message(
        Schema::builder("Bad")
            .attr("age", AttributeOptions::new().selector("parse"))
            .build(),
    );
    assert!(msg.contains("without a coercion type"), "{msg}");
}

#[test]
fn unknown_selector_is_rejected_at_build_time() {
    let msg = configuration_message(
        Schema::builder("Bad")
            .attr("age", AttributeOptions::new().coerce_with(integer_type(), "nope"))
            .build(),
    );
    assert!(msg.contains("no selector `nope`"), "{msg}");
}

#[test]
fn wrap_rule_with_unknown_constructor_is_rejected() {
    let msg = configuration_message(
        Schema::builder("Bad")
            .wrap_from(SourceType::Str, "from_str")
            .build(),
    );
    assert!(msg.contains("unknown constructor `from_str`"), "{msg}");
}

#[test]
fn constructor_cannot_shadow_builtin_selector() {
    let msg = configuration_message(
        Schema::builder("Bad")
            .constructor("wrap", |schema, _| Ok(Entity::new(schema)))
            .build(),
    );
    assert!(msg.contains("shadows a built-in selector"), "{msg}");
}

#[test]
fn all_errors_are_reported_together() {
    let msg = configuration_message(
        Schema::builder("Bad")
            .field("a")
            .field("a")
            .attr("b", AttributeOptions::new().selector("x"))
            .build(),
    );
    assert!(msg.starts_with("Bad: "), "{msg}");
    assert!(msg.contains("declared twice"));
    assert!(msg.contains("without a coercion type"));
}

#[test]
fn nested_declaration_errors_surface_on_parent() {
    let msg = configuration_message(
        Schema::builder("Outer")
            .namespace_with("inner", |b| b.field("x").field("x"))
            .build(),
    );
    assert!(msg.contains("namespace `inner`"), "{msg}");
}

// ── Nested declaration ───────────────────────────────────────────

#[test]
fn namespace_with_names_nested_schema_after_parent() {
    let schema = Schema::builder("Order")
        .namespace_with("shipping", |b| b.field("city"))
        .build()
        .unwrap();
    let nested = schema.attribute("shipping").unwrap().namespace().unwrap();
    assert_eq!(nested.name(), "Order::shipping");
    assert_eq!(nested.fields().collect::<Vec<_>>(), ["city"]);
}

// ── Subtypes ─────────────────────────────────────────────────────

#[test]
fn extending_records_parent() {
    let base = Schema::builder("Base").field("id").build().unwrap();
    let child = trellis_model::SchemaBuilder::extending("Child", &base)
        .field("extra")
        .build()
        .unwrap();
    assert!(child.is_a(&base));
    assert!(!base.is_a(&child));
    assert_eq!(child.parent().unwrap().name(), "Base");
    assert_eq!(child.fields().collect::<Vec<_>>(), ["extra"]);
}

// ── Configuration values ─────────────────────────────────────────

#[test]
fn unknown_key_policy_defaults_to_ignore() {
    assert_eq!(UnknownKeyPolicy::default(), UnknownKeyPolicy::Ignore);
    assert_eq!(PERSON.unknown_keys(), UnknownKeyPolicy::Ignore);
}

#[test]
fn unknown_key_policy_serde() {
    let policy: UnknownKeyPolicy = serde_json::from_str("\"reject\"").unwrap();
    assert_eq!(policy, UnknownKeyPolicy::Reject);
    assert_eq!(
        serde_json::to_string(&UnknownKeyPolicy::Ignore).unwrap(),
        "\"ignore\""
    );
}

#[test]
fn schema_debug_lists_fields() {
    let debug = format!("{:?}", *ADDRESS);
    assert!(debug.contains("Address"));
    assert!(debug.contains("city"));
}
