//! Field maps: string identifiers to typed accessors.
//!
//! A [`FieldMap`] is the table a collaborator hands to the compiler. It
//! decides which fields of a record type are filterable and sortable, and
//! under which names. Each entry is a [`FieldAccessor`], a plain function
//! pointer tagged with the field's type, so the declared type and the
//! accessor cannot disagree.
//!
//! # Example
//!
//! ```
//! use sift::{FieldMap, FieldType};
//!
//! struct Message {
//!     subject: String,
//!     is_read: bool,
//! }
//!
//! let fields = FieldMap::<Message>::builder()
//!     .text("subject", |m| Some(m.subject.as_str()))
//!     .boolean("isRead", |m| Some(m.is_read))
//!     .build();
//!
//! assert_eq!(fields.field_type("isRead"), Some(FieldType::Bool));
//! assert!(fields.lookup("body").is_err());
//! ```

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::{Result, SiftError};
use crate::value::{FieldType, Value};

/// Typed, side-effect-free accessor for one field of `R`.
///
/// Accessors return `None` when the record has no value for the field.
pub enum FieldAccessor<R> {
    Text(fn(&R) -> Option<&str>),
    Integer(fn(&R) -> Option<i64>),
    Float(fn(&R) -> Option<f64>),
    Bool(fn(&R) -> Option<bool>),
    Timestamp(fn(&R) -> Option<DateTime<Utc>>),
    Uuid(fn(&R) -> Option<Uuid>),
}

impl<R> FieldAccessor<R> {
    /// Returns the declared type of the field.
    pub fn field_type(&self) -> FieldType {
        match self {
            FieldAccessor::Text(_) => FieldType::Text,
            FieldAccessor::Integer(_) => FieldType::Integer,
            FieldAccessor::Float(_) => FieldType::Float,
            FieldAccessor::Bool(_) => FieldType::Bool,
            FieldAccessor::Timestamp(_) => FieldType::Timestamp,
            FieldAccessor::Uuid(_) => FieldType::Uuid,
        }
    }

    /// Reads the field from a record.
    pub fn value<'a>(&self, record: &'a R) -> Value<'a> {
        match *self {
            FieldAccessor::Text(get) => get(record).map_or(Value::Null, Value::Text),
            FieldAccessor::Integer(get) => get(record).map_or(Value::Null, Value::Integer),
            FieldAccessor::Float(get) => get(record).map_or(Value::Null, Value::Float),
            FieldAccessor::Bool(get) => get(record).map_or(Value::Null, Value::Bool),
            FieldAccessor::Timestamp(get) => get(record).map_or(Value::Null, Value::Timestamp),
            FieldAccessor::Uuid(get) => get(record).map_or(Value::Null, Value::Uuid),
        }
    }
}

impl<R> Clone for FieldAccessor<R> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<R> Copy for FieldAccessor<R> {}

impl<R> fmt::Debug for FieldAccessor<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FieldAccessor<{}>", self.field_type())
    }
}

/// Lookup table from field identifier to typed accessor for records of `R`.
///
/// An empty map is valid; every lookup on it fails.
pub struct FieldMap<R> {
    fields: BTreeMap<String, FieldAccessor<R>>,
}

impl<R> FieldMap<R> {
    /// Starts building a field map.
    pub fn builder() -> FieldMapBuilder<R> {
        FieldMapBuilder {
            fields: BTreeMap::new(),
        }
    }

    /// A field map that exposes no fields.
    pub fn empty() -> Self {
        FieldMap {
            fields: BTreeMap::new(),
        }
    }

    /// Resolves a field identifier to its accessor.
    ///
    /// # Errors
    ///
    /// Returns [`SiftError::UnknownField`] if the identifier is not registered.
    pub fn lookup(&self, field_id: &str) -> Result<FieldAccessor<R>> {
        self.fields
            .get(field_id)
            .copied()
            .ok_or_else(|| SiftError::UnknownField(field_id.to_string()))
    }

    /// Returns `true` if the identifier is registered.
    pub fn contains(&self, field_id: &str) -> bool {
        self.fields.contains_key(field_id)
    }

    /// Returns the declared type of a field, if registered.
    pub fn field_type(&self, field_id: &str) -> Option<FieldType> {
        self.fields.get(field_id).map(FieldAccessor::field_type)
    }

    /// Registered identifiers, sorted.
    pub fn field_ids(&self) -> Vec<&str> {
        self.fields.keys().map(String::as_str).collect()
    }

    /// Iterates over registered identifiers and their types, sorted by
    /// identifier.
    pub fn fields(&self) -> impl Iterator<Item = (&str, FieldType)> {
        self.fields
            .iter()
            .map(|(id, accessor)| (id.as_str(), accessor.field_type()))
    }

    /// Number of registered fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns `true` if no fields are registered.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<R> Default for FieldMap<R> {
    fn default() -> Self {
        FieldMap::empty()
    }
}

impl<R> Clone for FieldMap<R> {
    fn clone(&self) -> Self {
        FieldMap {
            fields: self.fields.clone(),
        }
    }
}

impl<R> fmt::Debug for FieldMap<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.fields()).finish()
    }
}

/// Builder for [`FieldMap`].
///
/// Registering an identifier twice replaces the earlier accessor.
pub struct FieldMapBuilder<R> {
    fields: BTreeMap<String, FieldAccessor<R>>,
}

impl<R> FieldMapBuilder<R> {
    /// Registers an accessor under the given identifier.
    pub fn field(mut self, field_id: impl Into<String>, accessor: FieldAccessor<R>) -> Self {
        self.fields.insert(field_id.into(), accessor);
        self
    }

    /// Registers a text field.
    pub fn text(self, field_id: impl Into<String>, get: fn(&R) -> Option<&str>) -> Self {
        self.field(field_id, FieldAccessor::Text(get))
    }

    /// Registers an integer field.
    pub fn integer(self, field_id: impl Into<String>, get: fn(&R) -> Option<i64>) -> Self {
        self.field(field_id, FieldAccessor::Integer(get))
    }

    /// Registers a floating point field.
    pub fn float(self, field_id: impl Into<String>, get: fn(&R) -> Option<f64>) -> Self {
        self.field(field_id, FieldAccessor::Float(get))
    }

    /// Registers a boolean field.
    pub fn boolean(self, field_id: impl Into<String>, get: fn(&R) -> Option<bool>) -> Self {
        self.field(field_id, FieldAccessor::Bool(get))
    }

    /// Registers a timestamp field.
    pub fn timestamp(
        self,
        field_id: impl Into<String>,
        get: fn(&R) -> Option<DateTime<Utc>>,
    ) -> Self {
        self.field(field_id, FieldAccessor::Timestamp(get))
    }

    /// Registers a UUID field.
    pub fn uuid(self, field_id: impl Into<String>, get: fn(&R) -> Option<Uuid>) -> Self {
        self.field(field_id, FieldAccessor::Uuid(get))
    }

    /// Finishes the map.
    pub fn build(self) -> FieldMap<R> {
        FieldMap {
            fields: self.fields,
        }
    }
}
