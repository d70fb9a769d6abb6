use crate::entity::{Entity, Serializable};
use crate::schema::Schema;
use crate::value::ValueMap;
use crate::{ModelError, ModelResult};
use std::sync::Arc;

/// Converts flat persistence rows to and from entities.
///
/// Implementors supply `from_row` and `to_row`; the batch operations are
/// derived from them. Missing batches (`None`) map to an empty vector.
pub trait Mapper {
    type Row;
    type Entity;

    fn from_row(&self, row: Self::Row) -> ModelResult<Self::Entity> {
        let _ = row;
        Err(ModelError::NotImplemented("Mapper::from_row"))
    }

    fn to_row(&self, entity: &Self::Entity) -> ModelResult<Self::Row> {
        let _ = entity;
        Err(ModelError::NotImplemented("Mapper::to_row"))
    }

    fn from_rows<I>(&self, rows: Option<I>) -> ModelResult<Vec<Self::Entity>>
    where
        I: IntoIterator<Item = Self::Row>,
    {
        rows.into_iter()
            .flatten()
            .map(|row| self.from_row(row))
            .collect()
    }

    fn to_rows<'a, I>(&self, entities: Option<I>) -> ModelResult<Vec<Self::Row>>
    where
        I: IntoIterator<Item = &'a Self::Entity>,
        Self::Entity: 'a,
    {
        entities
            .into_iter()
            .flatten()
            .map(|entity| self.to_row(entity))
            .collect()
    }
}

/// Maps `ValueMap` rows to entities of one schema and back.
#[derive(Debug, Clone)]
pub struct SchemaMapper {
    schema: Arc<Schema>,
}

impl SchemaMapper {
    pub fn new(schema: &Arc<Schema>) -> Self {
        Self {
            schema: Arc::clone(schema),
        }
    }

    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }
}

impl Mapper for SchemaMapper {
    type Row = ValueMap;
    type Entity = Entity;

    fn from_row(&self, row: ValueMap) -> ModelResult<Entity> {
        Entity::construct(&self.schema, row)
    }

    fn to_row(&self, entity: &Entity) -> ModelResult<ValueMap> {
        if !entity.schema().is_a(&self.schema) {
            return Err(ModelError::unwrappable(
                self.schema.name(),
                entity.type_name(),
            ));
        }
        Ok(entity.to_map())
    }
}
