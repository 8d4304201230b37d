//! Field types and runtime values.
//!
//! [`FieldType`] is the static type a field map declares for a field.
//! [`Value`] is what an accessor reads out of a record, borrowed from it.
//! [`TypedValue`] is an owned operand that has already been coerced to a
//! field type, and [`ValueSet`] is the de-duplicated operand list of a
//! membership filter.

use std::cmp::Ordering;
use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Declared type of a filterable/sortable field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    /// UTF-8 text.
    Text,
    /// Signed 64-bit integer.
    Integer,
    /// 64-bit floating point.
    Float,
    /// Boolean.
    Bool,
    /// UTC date and time.
    Timestamp,
    /// UUID.
    Uuid,
}

impl FieldType {
    /// Returns `true` if `>`, `>=`, `<` and `<=` are defined for this type.
    pub fn is_ordered(self) -> bool {
        matches!(
            self,
            FieldType::Integer | FieldType::Float | FieldType::Timestamp
        )
    }

    /// Returns the display name of this type.
    pub fn as_str(self) -> &'static str {
        match self {
            FieldType::Text => "text",
            FieldType::Integer => "integer",
            FieldType::Float => "float",
            FieldType::Bool => "bool",
            FieldType::Timestamp => "timestamp",
            FieldType::Uuid => "uuid",
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Runtime value of a field, borrowed from the record.
///
/// Accessors return `Value::Null` when the record has no value for the field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value<'a> {
    Text(&'a str),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Timestamp(DateTime<Utc>),
    Uuid(Uuid),
    Null,
}

impl<'a> Value<'a> {
    /// Returns `true` if this is a `Null` value.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns the type of this value, or `None` for `Null`.
    pub fn field_type(&self) -> Option<FieldType> {
        match self {
            Value::Text(_) => Some(FieldType::Text),
            Value::Integer(_) => Some(FieldType::Integer),
            Value::Float(_) => Some(FieldType::Float),
            Value::Bool(_) => Some(FieldType::Bool),
            Value::Timestamp(_) => Some(FieldType::Timestamp),
            Value::Uuid(_) => Some(FieldType::Uuid),
            Value::Null => None,
        }
    }

    /// Extracts the text value, if present.
    pub fn as_str(&self) -> Option<&'a str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Compares two non-null values of the same type.
    ///
    /// Returns `None` if either side is null, the types differ, or a float
    /// is NaN. Predicates treat `None` as "does not match".
    pub fn compare(&self, other: &Value<'_>) -> Option<Ordering> {
        match (self, other) {
            (Value::Text(a), Value::Text(b)) => Some(a.cmp(b)),
            (Value::Integer(a), Value::Integer(b)) => Some(a.cmp(b)),
            (Value::Float(a), Value::Float(b)) => a.partial_cmp(b),
            (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
            (Value::Timestamp(a), Value::Timestamp(b)) => Some(a.cmp(b)),
            (Value::Uuid(a), Value::Uuid(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }
}

/// Owned operand, already coerced to a field type.
#[derive(Debug, Clone, PartialEq)]
pub enum TypedValue {
    Text(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Timestamp(DateTime<Utc>),
    Uuid(Uuid),
    Null,
}

impl TypedValue {
    /// Borrows this operand as a [`Value`] for comparison with field values.
    pub fn as_value(&self) -> Value<'_> {
        match self {
            TypedValue::Text(s) => Value::Text(s),
            TypedValue::Integer(n) => Value::Integer(*n),
            TypedValue::Float(n) => Value::Float(*n),
            TypedValue::Bool(b) => Value::Bool(*b),
            TypedValue::Timestamp(t) => Value::Timestamp(*t),
            TypedValue::Uuid(u) => Value::Uuid(*u),
            TypedValue::Null => Value::Null,
        }
    }

    /// Returns `true` if this is a `Null` operand.
    pub fn is_null(&self) -> bool {
        matches!(self, TypedValue::Null)
    }

    /// Returns the type of this operand, or `None` for `Null`.
    pub fn field_type(&self) -> Option<FieldType> {
        self.as_value().field_type()
    }

    /// Renders this operand as JSON.
    ///
    /// Timestamps become RFC 3339 strings in UTC and UUIDs their hyphenated
    /// form, which are also the forms the coercion rules accept back.
    /// Non-finite floats have no JSON form and render as `null`.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            TypedValue::Text(s) => serde_json::Value::String(s.clone()),
            TypedValue::Integer(n) => serde_json::Value::from(*n),
            TypedValue::Float(n) => serde_json::Number::from_f64(*n)
                .map_or(serde_json::Value::Null, serde_json::Value::Number),
            TypedValue::Bool(b) => serde_json::Value::Bool(*b),
            TypedValue::Timestamp(t) => {
                serde_json::Value::String(t.to_rfc3339_opts(SecondsFormat::AutoSi, true))
            }
            TypedValue::Uuid(u) => serde_json::Value::String(u.hyphenated().to_string()),
            TypedValue::Null => serde_json::Value::Null,
        }
    }
}

impl fmt::Display for TypedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_json())
    }
}

impl From<&str> for TypedValue {
    fn from(s: &str) -> Self {
        TypedValue::Text(s.to_string())
    }
}

impl From<String> for TypedValue {
    fn from(s: String) -> Self {
        TypedValue::Text(s)
    }
}

impl From<i32> for TypedValue {
    fn from(n: i32) -> Self {
        TypedValue::Integer(n as i64)
    }
}

impl From<i64> for TypedValue {
    fn from(n: i64) -> Self {
        TypedValue::Integer(n)
    }
}

impl From<u32> for TypedValue {
    fn from(n: u32) -> Self {
        TypedValue::Integer(n as i64)
    }
}

impl From<f64> for TypedValue {
    fn from(n: f64) -> Self {
        TypedValue::Float(n)
    }
}

impl From<bool> for TypedValue {
    fn from(b: bool) -> Self {
        TypedValue::Bool(b)
    }
}

impl From<DateTime<Utc>> for TypedValue {
    fn from(t: DateTime<Utc>) -> Self {
        TypedValue::Timestamp(t)
    }
}

impl From<Uuid> for TypedValue {
    fn from(u: Uuid) -> Self {
        TypedValue::Uuid(u)
    }
}

impl<T: Into<TypedValue>> From<Option<T>> for TypedValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(TypedValue::Null, Into::into)
    }
}

/// De-duplicated operand list of a membership filter.
///
/// Keeps the first occurrence of each value, in input order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValueSet {
    values: Vec<TypedValue>,
}

impl ValueSet {
    /// Creates a set from the given values, dropping duplicates.
    pub fn new(values: impl IntoIterator<Item = TypedValue>) -> Self {
        let mut set = ValueSet::default();
        for value in values {
            set.insert(value);
        }
        set
    }

    /// Adds a value unless an equal one is already present.
    pub fn insert(&mut self, value: TypedValue) {
        if !self.values.contains(&value) {
            self.values.push(value);
        }
    }

    /// Returns `true` if a field value is a member of this set.
    ///
    /// A null field value is a member only if the set contains `Null`.
    pub fn contains(&self, value: &Value<'_>) -> bool {
        self.values.iter().any(|member| member.as_value() == *value)
    }

    /// Number of distinct values.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` if the set has no values.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterates over the distinct values in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = &TypedValue> {
        self.values.iter()
    }
}
