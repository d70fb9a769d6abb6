//! Per-attribute coercion: the `(type, selector)` pairs applied on assignment.

use crate::entity::Entity;
use crate::schema::Schema;
use crate::value::Value;
use crate::wrap::Wrap;
use crate::{ModelError, ModelResult};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

/// A named conversion function exposed by a [`ValueType`].
pub type Converter = Arc<dyn Fn(Value) -> ModelResult<Value> + Send + Sync>;

/// The "type" half of a coercion: something that exposes named conversion
/// selectors.
///
/// Entity schemas (`Arc<Schema>`) provide `wrap`, `new`, `wrap_each` and
/// every named constructor. [`ValueType`] covers everything else.
pub trait CoercionTarget: Send + Sync {
    /// Name used in diagnostics.
    fn type_name(&self) -> &str;

    /// Whether `selector` names a conversion this type provides.
    fn has_selector(&self, selector: &str) -> bool;

    /// Runs the conversion named by `selector`.
    fn convert(&self, selector: &str, input: Value) -> ModelResult<Value>;
}

/// A user-declared scalar type with named conversion selectors.
///
/// ```
/// use trellis_model::{ModelError, Value, ValueType};
///
/// let integer = ValueType::new("Integer").selector("parse", |input| match input {
///     Value::Str(s) => s.trim().parse::<i64>().map(Value::Int).map_err(|e| ModelError::conversion(e.to_string())),
///     other => Ok(other),
/// });
/// # let _ = integer;
/// ```
#[derive(Clone)]
pub struct ValueType {
    name: String,
    selectors: BTreeMap<String, Converter>,
}

impl ValueType {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            selectors: BTreeMap::new(),
        }
    }

    /// Registers a conversion under `name`.
    #[must_use]
    pub fn selector<F>(mut self, name: impl Into<String>, convert: F) -> Self
    where
        F: Fn(Value) -> ModelResult<Value> + Send + Sync + 'static,
    {
        self.selectors.insert(name.into(), Arc::new(convert));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Debug for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValueType")
            .field("name", &self.name)
            .field("selectors", &self.selectors.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl CoercionTarget for ValueType {
    fn type_name(&self) -> &str {
        &self.name
    }

    fn has_selector(&self, selector: &str) -> bool {
        self.selectors.contains_key(selector)
    }

    fn convert(&self, selector: &str, input: Value) -> ModelResult<Value> {
        let convert = self.selectors.get(selector).ok_or_else(|| {
            ModelError::Configuration(format!("{} has no selector `{selector}`", self.name))
        })?;
        convert(input)
    }
}

impl CoercionTarget for Arc<Schema> {
    fn type_name(&self) -> &str {
        self.name()
    }

    fn has_selector(&self, selector: &str) -> bool {
        matches!(selector, "wrap" | "new" | "wrap_each") || self.constructor(selector).is_some()
    }

    fn convert(&self, selector: &str, input: Value) -> ModelResult<Value> {
        match selector {
            "wrap" => self.wrap(input).map(Value::Entity),
            "new" => match input {
                Value::Map(params) => Entity::construct(self, params).map(Value::Entity),
                other => Err(ModelError::conversion(format!(
                    "expected map, got {}",
                    other.type_name()
                ))),
            },
            "wrap_each" => match input {
                Value::List(items) => items
                    .into_iter()
                    .map(|item| self.wrap(item).map(Value::Entity))
                    .collect::<ModelResult<Vec<_>>>()
                    .map(Value::List),
                other => Err(ModelError::conversion(format!(
                    "expected list, got {}",
                    other.type_name()
                ))),
            },
            name => {
                let constructor = self.constructor(name).ok_or_else(|| {
                    ModelError::Configuration(format!("{} has no selector `{name}`", self.name()))
                })?;
                constructor(self, input).map(Value::Entity)
            }
        }
    }
}

/// A resolved `(target type, selector)` pair.
#[derive(Clone)]
pub struct Coercion {
    target: Arc<dyn CoercionTarget>,
    selector: String,
}

impl Coercion {
    /// Pairs a target with one of its selectors, failing if the target does
    /// not provide it.
    pub fn new(target: Arc<dyn CoercionTarget>, selector: impl Into<String>) -> ModelResult<Self> {
        let selector = selector.into();
        if !target.has_selector(&selector) {
            return Err(ModelError::Configuration(format!(
                "{} has no selector `{selector}`",
                target.type_name()
            )));
        }
        Ok(Self { target, selector })
    }

    pub fn target_name(&self) -> &str {
        self.target.type_name()
    }

    pub fn selector(&self) -> &str {
        &self.selector
    }

    /// Converts `input` for storage in `attribute`.
    ///
    /// Anonymous conversion failures raised by the selector are tagged with
    /// the attribute, target and selector; other errors pass through as-is.
    pub fn apply(&self, attribute: &str, input: Value) -> ModelResult<Value> {
        self.target
            .convert(&self.selector, input)
            .map_err(|err| match err {
                ModelError::Coercion {
                    attribute: tagged,
                    reason,
                    ..
                } if tagged.is_empty() => ModelError::Coercion {
                    attribute: attribute.to_string(),
                    target: self.target.type_name().to_string(),
                    selector: self.selector.clone(),
                    reason,
                },
                other => other,
            })
    }
}

impl fmt::Debug for Coercion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.target.type_name(), self.selector)
    }
}

/// Attribute name → coercion. Attributes without an entry store raw input.
#[derive(Debug, Clone, Default)]
pub struct CoercionRegistry {
    entries: HashMap<String, Coercion>,
}

impl CoercionRegistry {
    pub(crate) fn insert(&mut self, attribute: impl Into<String>, coercion: Coercion) {
        self.entries.insert(attribute.into(), coercion);
    }

    pub fn get(&self, attribute: &str) -> Option<&Coercion> {
        self.entries.get(attribute)
    }

    pub fn contains(&self, attribute: &str) -> bool {
        self.entries.contains_key(attribute)
    }

    /// Applies the attribute's coercion, or returns `input` unchanged.
    pub fn apply(&self, attribute: &str, input: Value) -> ModelResult<Value> {
        match self.entries.get(attribute) {
            Some(coercion) => coercion.apply(attribute, input),
            None => Ok(input),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
