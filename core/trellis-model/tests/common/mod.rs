//! Shared fixture schemas for model tests.

#![allow(dead_code)]

use std::sync::{Arc, LazyLock};
use trellis_model::{
    AttributeOptions, Entity, ModelError, Schema, SourceType, Value, ValueMap, ValueType,
};

/// Integer type whose `parse` selector accepts ints and numeric strings.
pub fn integer_type() -> ValueType {
    ValueType::new("Integer").selector("parse", |input| match input {
        Value::Int(i) => Ok(Value::Int(i)),
        Value::Str(s) => s
            .trim()
            .parse::<i64>()
            .map(Value::Int)
            .map_err(|e| ModelError::conversion(e.to_string())),
        other => Err(ModelError::conversion(format!(
            "expected int or string, got {}",
            other.type_name()
        ))),
    })
}

pub static ADDRESS: LazyLock<Arc<Schema>> = LazyLock::new(|| {
    Schema::builder("Address")
        .field("city")
        .field("zip")
        .build()
        .expect("address schema")
});

pub static PET: LazyLock<Arc<Schema>> = LazyLock::new(|| {
    Schema::builder("Pet")
        .field("name")
        .field("species")
        .build()
        .expect("pet schema")
});

/// A person with a coerced age, a predicate, a non-comparable cache, a
/// nested address and a list of pets.
pub static PERSON: LazyLock<Arc<Schema>> = LazyLock::new(|| {
    Schema::builder("Person")
        .field("name")
        .attr(
            "age",
            AttributeOptions::new().coerce_with(integer_type(), "parse"),
        )
        .attr_predicate("active", AttributeOptions::new())
        .attr("cache", AttributeOptions::new().comparable(false))
        .field("tags")
        .namespace("address", &ADDRESS)
        .list_of("pets", &PET)
        .build()
        .expect("person schema")
});

/// Money wraps maps, numbers (amount in USD) and `"<amount> <currency>"` strings.
pub static MONEY: LazyLock<Arc<Schema>> = LazyLock::new(|| {
    Schema::builder("Money")
        .field("amount")
        .field("currency")
        .constructor("from_number", |schema, input| {
            let mut params = ValueMap::new();
            params.insert("amount".into(), input);
            params.insert("currency".into(), "USD".into());
            Entity::construct(schema, params)
        })
        .constructor("parse", |schema, input| {
            let text = input.as_str().unwrap_or_default().to_string();
            let (amount, currency) = text
                .split_once(' ')
                .ok_or_else(|| ModelError::conversion(format!("cannot parse {text:?}")))?;
            let amount: f64 = amount
                .parse()
                .map_err(|_| ModelError::conversion(format!("bad amount {amount:?}")))?;
            let mut params = ValueMap::new();
            params.insert("amount".into(), amount.into());
            params.insert("currency".into(), currency.into());
            Entity::construct(schema, params)
        })
        .wrap_from(SourceType::Number, "from_number")
        .wrap_from(SourceType::Str, "parse")
        .build()
        .expect("money schema")
});

pub fn map(json: serde_json::Value) -> ValueMap {
    match Value::from(json) {
        Value::Map(map) => map,
        other => panic!("expected a JSON object, got {}", other.type_name()),
    }
}

pub fn person(json: serde_json::Value) -> Entity {
    Entity::construct(&PERSON, map(json)).expect("person")
}

/// Installs a test subscriber honoring `RUST_LOG`; repeated calls are no-ops.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
