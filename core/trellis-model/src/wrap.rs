//! Wrap dispatch: resolving arbitrary input to an instance of a schema.
//!
//! The priority order is fixed:
//! 1. an instance of the target type (or a subtype) is returned unchanged,
//! 2. a keyed map is constructed attribute by attribute,
//! 3. the schema's wrap rules are tried in declaration order,
//! 4. otherwise the input is [`ModelError::Unwrappable`].

use crate::entity::Entity;
use crate::schema::Schema;
use crate::value::Value;
use crate::{ModelError, ModelResult};
use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Input shapes a wrap rule can match.
#[derive(Clone)]
pub enum SourceType {
    Bool,
    Int,
    Float,
    /// Either `Int` or `Float`.
    Number,
    Str,
    List,
    /// An entity whose schema is (or extends) the given one.
    Entity(Arc<Schema>),
}

impl SourceType {
    pub fn matches(&self, input: &Value) -> bool {
        match (self, input) {
            (Self::Bool, Value::Bool(_))
            | (Self::Int, Value::Int(_))
            | (Self::Float, Value::Float(_))
            | (Self::Number, Value::Int(_) | Value::Float(_))
            | (Self::Str, Value::Str(_))
            | (Self::List, Value::List(_)) => true,
            (Self::Entity(schema), Value::Entity(entity)) => entity.schema().is_a(schema),
            _ => false,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Bool => "bool",
            Self::Int => "int",
            Self::Float => "float",
            Self::Number => "number",
            Self::Str => "string",
            Self::List => "list",
            Self::Entity(schema) => schema.name(),
        }
    }
}

impl fmt::Debug for SourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One `(source type, constructor)` pair of a wrap schema.
#[derive(Clone)]
pub struct WrapRule {
    source: SourceType,
    constructor: String,
}

impl WrapRule {
    pub fn new(source: SourceType, constructor: impl Into<String>) -> Self {
        Self {
            source,
            constructor: constructor.into(),
        }
    }

    pub fn source(&self) -> &SourceType {
        &self.source
    }

    pub fn constructor(&self) -> &str {
        &self.constructor
    }
}

impl fmt::Debug for WrapRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} => {}", self.source, self.constructor)
    }
}

/// Converts arbitrary input into a canonical typed instance.
pub trait Wrap {
    type Output: Clone;

    /// Wraps owned input. An instance of the target type is moved through
    /// untouched.
    fn wrap(&self, input: Value) -> ModelResult<Self::Output>;

    /// Wraps borrowed input, borrowing it back when it already is an
    /// instance of the target type.
    fn wrap_ref<'a>(&self, input: &'a Value) -> ModelResult<Cow<'a, Self::Output>>;
}

impl Wrap for Arc<Schema> {
    type Output = Entity;

    fn wrap(&self, input: Value) -> ModelResult<Entity> {
        match input {
            Value::Entity(entity) if entity.schema().is_a(self) => Ok(entity),
            Value::Map(params) => Entity::construct(self, params),
            other => dispatch_rules(self, other),
        }
    }

    fn wrap_ref<'a>(&self, input: &'a Value) -> ModelResult<Cow<'a, Entity>> {
        match input {
            Value::Entity(entity) if entity.schema().is_a(self) => Ok(Cow::Borrowed(entity)),
            other => self.wrap(other.clone()).map(Cow::Owned),
        }
    }
}

fn dispatch_rules(schema: &Arc<Schema>, input: Value) -> ModelResult<Entity> {
    let rule = schema
        .wrap_rules()
        .iter()
        .find(|rule| rule.source().matches(&input));

    let Some(rule) = rule else {
        let actual = input.type_name();
        debug!(entity = %schema.name(), input = %actual, "no wrap rule matched");
        return Err(ModelError::unwrappable(schema.name(), actual));
    };

    // Rules are checked against constructors when the schema is built.
    let constructor = schema.constructor(rule.constructor()).ok_or_else(|| {
        ModelError::Configuration(format!(
            "{} has no constructor `{}`",
            schema.name(),
            rule.constructor()
        ))
    })?;
    constructor(schema, input)
}
