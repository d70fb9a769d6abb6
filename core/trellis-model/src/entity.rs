use crate::schema::{Schema, UnknownKeyPolicy};
use crate::value::{Value, ValueMap};
use crate::wrap::Wrap;
use crate::{ModelError, ModelResult};
use serde::{Serialize, Serializer};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, trace};

/// Capability of turning a nested object into a plain map.
///
/// Only entities implement it; lists, maps and scalars are unwrapped by
/// [`Value::to_plain`] directly.
pub trait Serializable {
    fn to_map(&self) -> ValueMap;
}

/// An instance of a [`Schema`].
///
/// Holds one optional slot per declared attribute. Unset attributes read
/// as absent. Nested entities are owned by the slot that holds them.
#[derive(Clone)]
pub struct Entity {
    schema: Arc<Schema>,
    pub(crate) slots: Vec<Option<Value>>,
}

impl Entity {
    /// Creates an instance with every attribute absent.
    pub fn new(schema: &Arc<Schema>) -> Self {
        Self {
            schema: Arc::clone(schema),
            slots: vec![None; schema.attributes().len()],
        }
    }

    /// Builds an instance by assigning each declared key of `params`.
    ///
    /// Keys missing from `params` stay absent. Undeclared keys follow the
    /// schema's [`UnknownKeyPolicy`].
    pub fn construct(schema: &Arc<Schema>, params: ValueMap) -> ModelResult<Self> {
        let mut entity = Self::new(schema);
        for (key, value) in params {
            if !schema.has_attribute(&key) {
                match schema.unknown_keys() {
                    UnknownKeyPolicy::Ignore => {
                        trace!(entity = %schema.name(), attribute = %key, "ignoring unknown key");
                        continue;
                    }
                    UnknownKeyPolicy::Reject => {
                        return Err(ModelError::UnknownAttribute {
                            entity: schema.name().to_string(),
                            attribute: key,
                        });
                    }
                }
            }
            entity.set(&key, value)?;
        }
        debug!(
            entity = %schema.name(),
            present = entity.slots.iter().flatten().count(),
            "constructed entity"
        );
        Ok(entity)
    }

    /// Wraps a JSON document into an instance of `schema`.
    pub fn from_json(schema: &Arc<Schema>, json: serde_json::Value) -> ModelResult<Self> {
        schema.wrap(json.into())
    }

    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    pub fn type_name(&self) -> &str {
        self.schema.name()
    }

    /// The stored value, or `None` if absent or undeclared.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.schema
            .position(name)
            .and_then(|idx| self.slots[idx].as_ref())
    }

    /// The nested entity stored under `name`, if any.
    pub fn nested(&self, name: &str) -> Option<&Entity> {
        self.get(name).and_then(Value::as_entity)
    }

    pub fn is_present(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Assigns an attribute, applying its coercion.
    ///
    /// Coerced attributes hand every input to their coercion, `Null`
    /// included, so a namespace attribute rejects `Null` as unwrappable.
    /// `Null` on an uncoerced attribute, or a coercion yielding `Null`,
    /// clears the attribute. Use [`Entity::clear`] to clear any attribute.
    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> ModelResult<()> {
        let idx = self.slot_index(name)?;
        let value = self.schema.coercions().apply(name, value.into())?;
        trace!(entity = %self.schema.name(), attribute = %name, kind = value.kind().as_str(), "assigned");
        self.slots[idx] = (!value.is_null()).then_some(value);
        Ok(())
    }

    /// Makes an attribute absent without running its coercion.
    pub fn clear(&mut self, name: &str) -> ModelResult<()> {
        let idx = self.slot_index(name)?;
        self.slots[idx] = None;
        Ok(())
    }

    fn slot_index(&self, name: &str) -> ModelResult<usize> {
        self.schema
            .position(name)
            .ok_or_else(|| ModelError::UnknownAttribute {
                entity: self.schema.name().to_string(),
                attribute: name.to_string(),
            })
    }

    /// Predicate accessor: whether the attribute holds a truthy value.
    pub fn is(&self, name: &str) -> ModelResult<bool> {
        match self.schema.attribute(name) {
            Some(attr) if attr.is_predicate() => {
                Ok(self.get(name).is_some_and(Value::is_truthy))
            }
            Some(_) => Err(ModelError::NotPredicate {
                entity: self.schema.name().to_string(),
                attribute: name.to_string(),
            }),
            None => Err(ModelError::UnknownAttribute {
                entity: self.schema.name().to_string(),
                attribute: name.to_string(),
            }),
        }
    }

    /// Present attributes in declaration order.
    pub fn present(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.schema
            .attributes()
            .iter()
            .zip(&self.slots)
            .filter_map(|(attr, slot)| slot.as_ref().map(|value| (attr.name(), value)))
    }

    pub fn to_json(&self) -> serde_json::Value {
        Value::Map(self.to_map()).to_json()
    }

    /// `#<Name @field=value ...>` over present attributes.
    pub fn inspect(&self) -> String {
        let attrs: Vec<String> = self
            .present()
            .map(|(name, value)| format!("@{name}={}", value.inspect()))
            .collect();
        if attrs.is_empty() {
            format!("#<{}>", self.type_name())
        } else {
            format!("#<{} {}>", self.type_name(), attrs.join(" "))
        }
    }
}

impl Serializable for Entity {
    fn to_map(&self) -> ValueMap {
        self.present()
            .map(|(name, value)| (name.to_string(), value.to_plain()))
            .collect()
    }
}

impl Serialize for Entity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_map().serialize(serializer)
    }
}

impl fmt::Debug for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.inspect())
    }
}
