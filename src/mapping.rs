//!
//! Column mapping model: the correspondence between in-memory properties and
//! database columns, plus the typed accessors the calling mapping layer
//! supplies for each property.
//!
use std::marker::PhantomData;

use serde::{Deserialize, Serialize};

use crate::errors::{Result, VolleyError};
use crate::value::Value;

/// One persisted property. `data_type` is the SQL Server type descriptor,
/// used verbatim when a staging table is created from the mapping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnMapping {
    pub name_on_object: String,
    pub name_in_database: String,
    pub data_type: String,
    pub is_primary_key: bool,
}

impl ColumnMapping {
    pub fn new(name_on_object: &str, name_in_database: &str, data_type: &str) -> Self {
        ColumnMapping {
            name_on_object: name_on_object.to_owned(),
            name_in_database: name_in_database.to_owned(),
            data_type: data_type.to_owned(),
            is_primary_key: false,
        }
    }

    pub fn primary_key(mut self) -> Self {
        self.is_primary_key = true;
        self
    }
}

pub type Getter<T> = Box<dyn Fn(&T) -> Value + Send + Sync>;
pub type Setter<T> = Box<dyn Fn(&mut T, Value) + Send + Sync>;

/// A column mapping paired with its property accessors. The getter feeds the
/// row reader; the setter only exists for the fallback path.
pub struct MappedColumn<T> {
    pub mapping: ColumnMapping,
    getter: Getter<T>,
    setter: Option<Setter<T>>,
}

impl<T> MappedColumn<T> {
    pub fn get(&self, item: &T) -> Value {
        (self.getter)(item)
    }

    pub fn set(&self, item: &mut T, value: Value) -> Result<()> {
        match self.setter {
            Some(ref setter) => {
                setter(item, value);
                Ok(())
            }
            None => Err(VolleyError::MissingField(format!(
                "No setter registered for property `{}`",
                self.mapping.name_on_object
            ))),
        }
    }

    pub fn has_setter(&self) -> bool {
        self.setter.is_some()
    }
}

/// Destination table plus the ordered column set of one object type.
/// Constructed once per type by the calling mapping layer, immutable after
/// `build`.
pub struct EntityMapping<T> {
    schema: String,
    table: String,
    columns: Vec<MappedColumn<T>>,
}

impl<T> EntityMapping<T> {
    pub fn builder(schema: &str, table: &str) -> EntityMappingBuilder<T> {
        EntityMappingBuilder {
            schema: schema.to_owned(),
            table: table.to_owned(),
            columns: Vec::new(),
            unknown_setters: Vec::new(),
        }
    }

    pub fn schema(&self) -> &str {
        &self.schema
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn columns(&self) -> &[MappedColumn<T>] {
        &self.columns
    }

    /// The pure-data view of the column set, in declaration order.
    pub fn column_mappings(&self) -> Vec<ColumnMapping> {
        self.columns.iter().map(|c| c.mapping.clone()).collect()
    }

    pub fn find(&self, name_on_object: &str) -> Option<&MappedColumn<T>> {
        self.columns
            .iter()
            .find(|c| c.mapping.name_on_object == name_on_object)
    }
}

pub struct EntityMappingBuilder<T> {
    schema: String,
    table: String,
    columns: Vec<MappedColumn<T>>,
    unknown_setters: Vec<String>,
}

impl<T> EntityMappingBuilder<T> {
    pub fn column<F>(
        mut self,
        name_on_object: &str,
        name_in_database: &str,
        data_type: &str,
        getter: F,
    ) -> Self
    where
        F: Fn(&T) -> Value + Send + Sync + 'static,
    {
        self.columns.push(MappedColumn {
            mapping: ColumnMapping::new(name_on_object, name_in_database, data_type),
            getter: Box::new(getter),
            setter: None,
        });
        self
    }

    pub fn key<F>(
        mut self,
        name_on_object: &str,
        name_in_database: &str,
        data_type: &str,
        getter: F,
    ) -> Self
    where
        F: Fn(&T) -> Value + Send + Sync + 'static,
    {
        self.columns.push(MappedColumn {
            mapping: ColumnMapping::new(name_on_object, name_in_database, data_type).primary_key(),
            getter: Box::new(getter),
            setter: None,
        });
        self
    }

    /// Attach a setter to an already-declared column.
    pub fn setter<S>(mut self, name_on_object: &str, setter: S) -> Self
    where
        S: Fn(&mut T, Value) + Send + Sync + 'static,
    {
        match self
            .columns
            .iter_mut()
            .find(|c| c.mapping.name_on_object == name_on_object)
        {
            Some(column) => column.setter = Some(Box::new(setter)),
            None => self.unknown_setters.push(name_on_object.to_owned()),
        }
        self
    }

    pub fn build(self) -> Result<EntityMapping<T>> {
        if let Some(name) = self.unknown_setters.first() {
            return Err(VolleyError::MissingField(format!(
                "Setter registered for unmapped property `{}`",
                name
            )));
        }
        for (i, column) in self.columns.iter().enumerate() {
            let name = &column.mapping.name_on_object;
            if self.columns[..i]
                .iter()
                .any(|c| c.mapping.name_on_object == *name)
            {
                return Err(VolleyError::RedundantField(format!(
                    "Property `{}` is mapped more than once",
                    name
                )));
            }
        }
        Ok(EntityMapping {
            schema: self.schema,
            table: self.table,
            columns: self.columns,
        })
    }
}

/// The columns an update should set, named by object property. Values come
/// from the streamed items themselves; the specification never names a
/// primary key.
#[derive(Debug, Clone)]
pub struct UpdateSpecification<T> {
    properties: Vec<String>,
    _marker: PhantomData<fn(&T)>,
}

impl<T> UpdateSpecification<T> {
    pub fn new() -> Self {
        UpdateSpecification {
            properties: Vec::new(),
            _marker: PhantomData,
        }
    }

    pub fn set(mut self, name_on_object: &str) -> Self {
        if !self.properties.iter().any(|p| p == name_on_object) {
            self.properties.push(name_on_object.to_owned());
        }
        self
    }

    pub fn properties(&self) -> &[String] {
        &self.properties
    }
}

impl<T> Default for UpdateSpecification<T> {
    fn default() -> Self {
        Self::new()
    }
}
