//! Value coercion.
//!
//! Filter operands arrive either pre-typed ([`Operand::Typed`], from the
//! Rust builder API) or loosely typed ([`Operand::Json`], decoded from a
//! request). [`coerce`] converts one operand to the declared type of the
//! field it is compared against; [`coerce_many`] does the same for a
//! membership list.
//!
//! # Rules
//!
//! | Declared | JSON accepted | Pre-typed accepted |
//! |----------|---------------|--------------------|
//! | Text | string | Text |
//! | Integer | integer in i64 range, base-10 string | Integer |
//! | Float | finite number (integers up to 2^53), numeric string | finite Float, Integer up to 2^53 |
//! | Bool | `true`/`false`, the strings `"true"`/`"false"` | Bool |
//! | Timestamp | RFC 3339 string, integer epoch milliseconds | Timestamp |
//! | Uuid | UUID string | Uuid |
//!
//! `null` is accepted for every type and becomes [`TypedValue::Null`].
//! Anything else is an error: there are no implicit casts.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Result, SiftError};
use crate::value::{FieldType, TypedValue, ValueSet};

/// Largest integer magnitude an f64 represents exactly.
const MAX_EXACT_FLOAT_INT: u64 = 1 << 53;

/// A filter operand before coercion.
///
/// Deserializes from any JSON value into `Operand::Json`; serializes
/// pre-typed operands through [`TypedValue::to_json`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "serde_json::Value", into = "serde_json::Value")]
pub enum Operand {
    /// Already the right Rust type.
    Typed(TypedValue),
    /// Decoded from JSON, converted by the coercion rules.
    Json(serde_json::Value),
}

impl Operand {
    /// The null literal.
    pub fn null() -> Self {
        Operand::Typed(TypedValue::Null)
    }

    /// Renders this operand as JSON, for error messages and serialization.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Operand::Typed(value) => value.to_json(),
            Operand::Json(json) => json.clone(),
        }
    }
}

impl From<serde_json::Value> for Operand {
    fn from(json: serde_json::Value) -> Self {
        Operand::Json(json)
    }
}

impl From<Operand> for serde_json::Value {
    fn from(operand: Operand) -> Self {
        match operand {
            Operand::Typed(value) => value.to_json(),
            Operand::Json(json) => json,
        }
    }
}

impl From<TypedValue> for Operand {
    fn from(value: TypedValue) -> Self {
        Operand::Typed(value)
    }
}

macro_rules! typed_operand {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Operand {
                fn from(value: $t) -> Self {
                    Operand::Typed(TypedValue::from(value))
                }
            }
        )*
    };
}

typed_operand!(&str, String, i32, i64, u32, f64, bool, DateTime<Utc>, Uuid);

/// Coerces one operand to the declared type of `field`.
///
/// # Errors
///
/// Returns [`SiftError::ValueCoercion`] naming the field, the declared type
/// and the offending operand.
pub fn coerce(field: &str, declared: FieldType, raw: &Operand) -> Result<TypedValue> {
    match raw {
        Operand::Typed(value) => coerce_typed(field, declared, value),
        Operand::Json(json) => coerce_json(field, declared, json),
    }
}

/// Coerces a membership list, dropping duplicates.
///
/// Stops at the first operand that fails to coerce.
pub fn coerce_many(field: &str, declared: FieldType, raws: &[Operand]) -> Result<ValueSet> {
    let mut set = ValueSet::default();
    for raw in raws {
        set.insert(coerce(field, declared, raw)?);
    }
    Ok(set)
}

fn coerce_typed(field: &str, declared: FieldType, value: &TypedValue) -> Result<TypedValue> {
    match (declared, value) {
        (_, TypedValue::Null) => Ok(TypedValue::Null),
        (FieldType::Float, TypedValue::Integer(n)) if n.unsigned_abs() <= MAX_EXACT_FLOAT_INT => {
            Ok(TypedValue::Float(*n as f64))
        }
        (FieldType::Float, TypedValue::Integer(_)) => Err(mismatch(
            field,
            declared,
            value.to_json(),
            "integer is too large to be represented exactly as a float",
        )),
        (FieldType::Float, TypedValue::Float(n)) if !n.is_finite() => {
            Err(SiftError::ValueCoercion {
                field: field.to_string(),
                expected: declared,
                value: n.to_string(),
                reason: "expected a finite number".to_string(),
            })
        }
        _ if value.field_type() == Some(declared) => Ok(value.clone()),
        _ => {
            let actual = value.field_type().map_or("null", |t| t.as_str());
            Err(mismatch(
                field,
                declared,
                value.to_json(),
                &format!("expected a {declared} value, got {actual}"),
            ))
        }
    }
}

fn coerce_json(field: &str, declared: FieldType, json: &serde_json::Value) -> Result<TypedValue> {
    use serde_json::Value as Json;

    let fail = |reason: &str| mismatch(field, declared, json.clone(), reason);

    if json.is_null() {
        return Ok(TypedValue::Null);
    }

    match declared {
        FieldType::Text => match json {
            Json::String(s) => Ok(TypedValue::Text(s.clone())),
            _ => Err(fail("expected a string")),
        },

        FieldType::Integer => match json {
            Json::Number(n) => n
                .as_i64()
                .map(TypedValue::Integer)
                .ok_or_else(|| fail("expected an integer in the i64 range")),
            Json::String(s) => s
                .parse::<i64>()
                .map(TypedValue::Integer)
                .map_err(|e| fail(&e.to_string())),
            _ => Err(fail("expected an integer")),
        },

        FieldType::Float => {
            let inexact = |n: &serde_json::Number| {
                n.as_u64().is_some_and(|u| u > MAX_EXACT_FLOAT_INT)
                    || n.as_i64().is_some_and(|i| i.unsigned_abs() > MAX_EXACT_FLOAT_INT)
            };
            let parsed = match json {
                Json::Number(n) if inexact(n) => {
                    return Err(fail(
                        "integer is too large to be represented exactly as a float",
                    ))
                }
                Json::Number(n) => n.as_f64(),
                Json::String(s) => s.parse::<f64>().ok(),
                _ => None,
            };
            match parsed {
                Some(n) if n.is_finite() => Ok(TypedValue::Float(n)),
                _ => Err(fail("expected a finite number")),
            }
        }

        FieldType::Bool => match json {
            Json::Bool(b) => Ok(TypedValue::Bool(*b)),
            Json::String(s) if s == "true" => Ok(TypedValue::Bool(true)),
            Json::String(s) if s == "false" => Ok(TypedValue::Bool(false)),
            _ => Err(fail("expected true or false")),
        },

        FieldType::Timestamp => match json {
            Json::String(s) => DateTime::parse_from_rfc3339(s)
                .map(|t| TypedValue::Timestamp(t.with_timezone(&Utc)))
                .map_err(|e| fail(&format!("expected an RFC 3339 timestamp ({e})"))),
            Json::Number(n) => n
                .as_i64()
                .and_then(|ms| Utc.timestamp_millis_opt(ms).single())
                .map(TypedValue::Timestamp)
                .ok_or_else(|| fail("expected epoch milliseconds in range")),
            _ => Err(fail("expected an RFC 3339 string or epoch milliseconds")),
        },

        FieldType::Uuid => match json {
            Json::String(s) => Uuid::parse_str(s)
                .map(TypedValue::Uuid)
                .map_err(|e| fail(&e.to_string())),
            _ => Err(fail("expected a UUID string")),
        },
    }
}

fn mismatch(field: &str, declared: FieldType, value: serde_json::Value, reason: &str) -> SiftError {
    SiftError::ValueCoercion {
        field: field.to_string(),
        expected: declared,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}
