//! Attribute schema and object graph engine for Trellis.
//!
//! Entity types are declared once with a [`SchemaBuilder`] and shared as
//! `Arc<Schema>`. Instances are populated from loosely-typed [`Value`] input,
//! serialized back to plain maps, and compared structurally:
//! - [`Schema`]: ordered attributes, comparable subset, coercions, wrap rules
//! - [`Entity`]: an instance holding attribute values
//! - [`Wrap`]: identity / map construction / rule dispatch, in that order
//! - [`Difference`]: first-level diff for assertion messages
//! - [`Validator`] and [`Mapper`]: collaborator interfaces the model
//!   delegates to
//!
//! ```
//! use serde_json::json;
//! use trellis_model::{Schema, Serializable, Value, Wrap};
//!
//! let person = Schema::builder("Person")
//!     .field("name")
//!     .namespace_with("address", |b| b.field("city").field("zip"))
//!     .build()
//!     .unwrap();
//!
//! let input = Value::from(json!({"name": "Ada", "address": {"city": "X", "zip": "1"}}));
//! let ada = person.wrap(input.clone()).unwrap();
//! assert_eq!(ada.nested("address").unwrap().type_name(), "Person::address");
//! assert_eq!(Value::Map(ada.to_map()), input);
//! ```

mod coercion;
mod compare;
mod entity;
mod error;
mod mapper;
mod schema;
mod validation;
mod value;
mod wrap;

pub use coercion::{Coercion, CoercionRegistry, CoercionTarget, Converter, ValueType};
pub use compare::Difference;
pub use entity::{Entity, Serializable};
pub use error::{ModelError, ModelResult};
pub use mapper::{Mapper, SchemaMapper};
pub use schema::{
    Attribute, AttributeOptions, Constructor, Schema, SchemaBuilder, UnknownKeyPolicy,
};
pub use validation::{Validateable, ValidationErrors, ValidationResult, Validator};
pub use value::{Value, ValueKind, ValueMap};
pub use wrap::{SourceType, Wrap, WrapRule};
