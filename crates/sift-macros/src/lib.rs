//! Derive macro for the sift filter/sort compiler.
//!
//! [`Queryable`] generates a `sift::FieldMap` for a struct from
//! `#[sift(...)]` field annotations, so request field identifiers resolve to
//! typed accessors without hand-written tables.

mod queryable;

use proc_macro::TokenStream;
use syn::{parse_macro_input, DeriveInput};

/// Derives the `Queryable` trait for filterable/sortable structs.
///
/// # Field Attributes
///
/// | Attribute | Description |
/// |-----------|-------------|
/// | `Text` | Text field (`String`, `Box<str>`, `&'static str`, or an `Option` of one) |
/// | `Integer` | Integer field (`i8`..`i64`, `u8`..`u32`, or an `Option` of one) |
/// | `Float` | Float field (`f32`, `f64`, or an `Option` of one) |
/// | `Bool` | Boolean field |
/// | `Timestamp` | `chrono::DateTime<Utc>` field |
/// | `Uuid` | `uuid::Uuid` field |
/// | `skip` | Exclude this field |
/// | `rename = "..."` | Use a custom field identifier |
/// | `ty = "..."` | Field type as a string, for names that clash with keywords |
///
/// Fields without an attribute are not exposed. `Option` fields read as
/// null when `None`.
///
/// # Container Attributes
///
/// `#[sift(rename_all = "camelCase")]` derives identifiers from field names
/// (`snake_case`, `camelCase`, `PascalCase` and `kebab-case` are accepted).
///
/// # Generated Code
///
/// 1. Field identifier constants named after the Rust field
///    (`Notification::IS_READ == "isRead"`)
/// 2. `impl sift::Queryable` returning the field map
///
/// # Example
///
/// ```ignore
/// use sift::{compile_filter, FilterNode, Queryable};
///
/// #[derive(Queryable)]
/// #[sift(rename_all = "camelCase")]
/// struct Notification {
///     #[sift(Text)]
///     subject: String,
///     #[sift(Bool)]
///     is_read: bool,
///     #[sift(skip)]
///     internal_id: u64,
/// }
///
/// let fields = Notification::field_map();
/// let unread = compile_filter(&fields, &FilterNode::eq(Notification::IS_READ, false)).unwrap();
/// ```
#[proc_macro_derive(Queryable, attributes(sift))]
pub fn queryable_derive(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    queryable::queryable_derive_impl(input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}
