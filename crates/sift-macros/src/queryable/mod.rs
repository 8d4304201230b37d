//! Implementation of the `#[derive(Queryable)]` macro.
//!
//! Field annotations become typed registrations on a `sift::FieldMap`
//! builder, so the declared field type and the accessor always agree.

mod attrs;
mod derive;

pub use derive::queryable_derive_impl;
