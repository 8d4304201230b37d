//! Traits for derive macro support.
//!
//! [`Queryable`] is implemented by record types that own their field map,
//! usually through `#[derive(Queryable)]` from `sift-macros`. The field
//! source traits adapt common Rust field types to accessor results; the
//! derive calls them so one attribute works for both `String` and
//! `Option<String>` fields.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::field::FieldMap;

/// A record type that knows its own filterable/sortable fields.
///
/// # Derive Usage
///
/// ```ignore
/// use sift::Queryable;
///
/// #[derive(Queryable)]
/// #[sift(rename_all = "camelCase")]
/// struct Notification {
///     #[sift(Text)]
///     subject: String,
///     #[sift(Bool)]
///     is_read: bool,
///     #[sift(Timestamp)]
///     read_at: Option<chrono::DateTime<chrono::Utc>>,
/// }
///
/// let fields = Notification::field_map();
/// assert!(fields.contains(Notification::IS_READ));
/// ```
///
/// # Manual Implementation
///
/// ```
/// use sift::{FieldMap, Queryable};
///
/// struct Task {
///     name: String,
///     priority: u8,
/// }
///
/// impl Queryable for Task {
///     fn field_map() -> FieldMap<Self> {
///         FieldMap::<Self>::builder()
///             .text("name", |t| Some(t.name.as_str()))
///             .integer("priority", |t| Some(t.priority as i64))
///             .build()
///     }
/// }
///
/// assert_eq!(Task::field_map().len(), 2);
/// ```
pub trait Queryable: Sized + 'static {
    /// Returns the field map for this record type.
    fn field_map() -> FieldMap<Self>;
}

/// Field types readable as text.
pub trait TextField {
    fn text_value(&self) -> Option<&str>;
}

/// Field types readable as a signed 64-bit integer.
///
/// Implemented only for types that convert losslessly.
pub trait IntegerField {
    fn integer_value(&self) -> Option<i64>;
}

/// Field types readable as a 64-bit float.
pub trait FloatField {
    fn float_value(&self) -> Option<f64>;
}

/// Field types readable as a boolean.
pub trait BoolField {
    fn bool_value(&self) -> Option<bool>;
}

/// Field types readable as a UTC timestamp.
pub trait TimestampField {
    fn timestamp_value(&self) -> Option<DateTime<Utc>>;
}

/// Field types readable as a UUID.
pub trait UuidField {
    fn uuid_value(&self) -> Option<Uuid>;
}

impl TextField for String {
    fn text_value(&self) -> Option<&str> {
        Some(self.as_str())
    }
}

impl TextField for Box<str> {
    fn text_value(&self) -> Option<&str> {
        Some(self)
    }
}

impl TextField for &'static str {
    fn text_value(&self) -> Option<&str> {
        Some(self)
    }
}

macro_rules! integer_field {
    ($($t:ty),*) => {
        $(
            impl IntegerField for $t {
                fn integer_value(&self) -> Option<i64> {
                    Some(i64::from(*self))
                }
            }
        )*
    };
}

integer_field!(i8, i16, i32, i64, u8, u16, u32);

impl FloatField for f32 {
    fn float_value(&self) -> Option<f64> {
        Some(f64::from(*self))
    }
}

impl FloatField for f64 {
    fn float_value(&self) -> Option<f64> {
        Some(*self)
    }
}

impl BoolField for bool {
    fn bool_value(&self) -> Option<bool> {
        Some(*self)
    }
}

impl TimestampField for DateTime<Utc> {
    fn timestamp_value(&self) -> Option<DateTime<Utc>> {
        Some(*self)
    }
}

impl UuidField for Uuid {
    fn uuid_value(&self) -> Option<Uuid> {
        Some(*self)
    }
}

// Optional fields read as null when absent
impl<T: TextField> TextField for Option<T> {
    fn text_value(&self) -> Option<&str> {
        self.as_ref().and_then(TextField::text_value)
    }
}

impl<T: IntegerField> IntegerField for Option<T> {
    fn integer_value(&self) -> Option<i64> {
        self.as_ref().and_then(IntegerField::integer_value)
    }
}

impl<T: FloatField> FloatField for Option<T> {
    fn float_value(&self) -> Option<f64> {
        self.as_ref().and_then(FloatField::float_value)
    }
}

impl<T: BoolField> BoolField for Option<T> {
    fn bool_value(&self) -> Option<bool> {
        self.as_ref().and_then(BoolField::bool_value)
    }
}

impl<T: TimestampField> TimestampField for Option<T> {
    fn timestamp_value(&self) -> Option<DateTime<Utc>> {
        self.as_ref().and_then(TimestampField::timestamp_value)
    }
}

impl<T: UuidField> UuidField for Option<T> {
    fn uuid_value(&self) -> Option<Uuid> {
        self.as_ref().and_then(UuidField::uuid_value)
    }
}
