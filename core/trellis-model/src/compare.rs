//! Attribute-scoped structural equality.
//!
//! Two entities are equal when they share a schema and every comparable
//! attribute holds structurally equal values. Non-comparable attributes
//! never take part.

use crate::entity::Entity;
use crate::value::Value;
use std::fmt;
use std::sync::Arc;

/// A first-level mismatch between two entities.
#[derive(Debug, Clone, PartialEq)]
pub enum Difference {
    /// The entities belong to different schemas.
    Type { left: String, right: String },
    /// A comparable attribute differs. `None` means absent.
    Attribute {
        name: String,
        left: Option<Value>,
        right: Option<Value>,
    },
}

impl fmt::Display for Difference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn show(value: Option<&Value>) -> String {
            value.map_or_else(|| "absent".to_string(), Value::inspect)
        }

        match self {
            Self::Type { left, right } => write!(f, "type: {left} != {right}"),
            Self::Attribute { name, left, right } => {
                write!(f, "{name}: {} != {}", show(left.as_ref()), show(right.as_ref()))
            }
        }
    }
}

impl PartialEq for Entity {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(self.schema(), other.schema())
            && comparable_slots(self, other).all(|(_, left, right)| left == right)
    }
}

impl Entity {
    /// Lists comparable attributes whose values differ, without descending
    /// into nested entities. Meant for assertion messages.
    pub fn differences(&self, other: &Entity) -> Vec<Difference> {
        if !Arc::ptr_eq(self.schema(), other.schema()) {
            return vec![Difference::Type {
                left: self.type_name().to_string(),
                right: other.type_name().to_string(),
            }];
        }
        comparable_slots(self, other)
            .filter(|(_, left, right)| left != right)
            .map(|(name, left, right)| Difference::Attribute {
                name: name.to_string(),
                left: left.cloned(),
                right: right.cloned(),
            })
            .collect()
    }

    /// One line per difference; empty when the entities are equal.
    pub fn diff_report(&self, other: &Entity) -> String {
        self.differences(other)
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn comparable_slots<'a>(
    left: &'a Entity,
    right: &'a Entity,
) -> impl Iterator<Item = (&'a str, Option<&'a Value>, Option<&'a Value>)> {
    left.schema()
        .attributes()
        .iter()
        .enumerate()
        .filter(|(_, attr)| attr.is_comparable())
        .map(move |(idx, attr)| {
            (
                attr.name(),
                left.slots[idx].as_ref(),
                right.slots[idx].as_ref(),
            )
        })
}
