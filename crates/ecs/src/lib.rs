//! Component data model and per-system event tables.
//!
//! Components are not Rust types: each one is an [`Identifier`] plus an opaque
//! `serde_json::Value`, so extensions can define new components without
//! recompiling the host. Payload validation happens before a component reaches
//! the world and is not repeated here.
//!
//! # Invariants
//! - A component's id never changes after construction.
//! - An [`EventTable`] never silently replaces a registered handler.

mod events;

pub use events::{EventError, EventTable, Handler, HandlerError};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tessera_common::Identifier;

/// A typed data value keyed by an [`Identifier`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Component {
    id: Identifier,
    data: Value,
}

impl Component {
    pub fn new(id: Identifier, data: Value) -> Self {
        Self { id, data }
    }

    /// A component carrying an empty object.
    pub fn empty(id: Identifier) -> Self {
        Self::new(id, Value::Object(Map::new()))
    }

    /// Build a component from any serializable value.
    pub fn from_typed<T: Serialize>(id: Identifier, value: &T) -> Result<Self, serde_json::Error> {
        Ok(Self::new(id, serde_json::to_value(value)?))
    }

    pub fn id(&self) -> &Identifier {
        &self.id
    }

    pub fn data(&self) -> &Value {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut Value {
        &mut self.data
    }

    pub fn set_data(&mut self, data: Value) {
        self.data = data;
    }

    /// Read one field of an object payload.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.data.get(name)
    }

    /// Write one field of an object payload.
    ///
    /// A payload that is not an object is replaced by an empty object first.
    pub fn set_field(&mut self, name: impl Into<String>, value: Value) {
        if !self.data.is_object() {
            self.data = Value::Object(Map::new());
        }
        if let Value::Object(map) = &mut self.data {
            map.insert(name.into(), value);
        }
    }

    /// Decode the payload into a concrete type.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        T::deserialize(&self.data)
    }
}
