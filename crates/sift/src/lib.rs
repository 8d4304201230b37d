//! Sift - dynamic filter and sort compiler for typed record collections.
//!
//! Sift turns a serializable query description into an executable predicate
//! and ordering over records of one Rust type. The record type exposes its
//! fields through a [`FieldMap`]; requests name fields by string, and every
//! name, operator and operand is checked once, at compile time.
//!
//! - Field types: text, integer, float, bool, timestamp, UUID
//! - Operators: `=`, `!=`, `>`, `>=`, `<`, `<=`, `contains`, `!contains`,
//!   `in`, `!in`, combined with `and`/`or`
//! - Multi-key stable sorting with per-key direction
//! - JSON wire format for filters, sort rules and whole queries
//!
//! # Quick Start
//!
//! ```rust
//! use sift::{compile_filter, compile_sort, FieldMap, FilterNode, SortRule};
//!
//! struct Notification {
//!     subject: String,
//!     is_read: bool,
//!     priority: i64,
//! }
//!
//! let fields = FieldMap::<Notification>::builder()
//!     .text("subject", |n| Some(n.subject.as_str()))
//!     .boolean("isRead", |n| Some(n.is_read))
//!     .integer("priority", |n| Some(n.priority))
//!     .build();
//!
//! // Usually decoded from a request body
//! let filter: FilterNode = serde_json::from_str(
//!     r#"{ "operator": "and", "children": [
//!         { "fieldId": "isRead", "operator": "=", "value": false },
//!         { "fieldId": "subject", "operator": "contains", "value": "build" } ] }"#,
//! )
//! .unwrap();
//!
//! let unread_builds = compile_filter(&fields, &filter).unwrap();
//! let by_priority = compile_sort(&fields, &[SortRule::desc("priority")]).unwrap();
//!
//! let inbox = vec![
//!     Notification { subject: "build failed".into(), is_read: false, priority: 2 },
//!     Notification { subject: "build fixed".into(), is_read: true, priority: 1 },
//!     Notification { subject: "build queued".into(), is_read: false, priority: 5 },
//! ];
//!
//! let mut hits = unread_builds.filter(&inbox);
//! by_priority.sort_refs(&mut hits);
//! assert_eq!(hits.len(), 2);
//! assert_eq!(hits[0].subject, "build queued");
//! ```
//!
//! # Null Handling
//!
//! An accessor returning `None` reads as null:
//!
//! | Filter | Matches a null record |
//! |--------|-----------------------|
//! | `= null` | yes |
//! | `!= null` | no |
//! | `= v`, `contains v`, `>`/`<` family | no |
//! | `!= v`, `!contains v` | yes |
//! | `in [.., null]` | yes |
//!
//! Sorting puts nulls first in ascending order and last in descending order.

mod coerce;
mod compiler;
mod error;
mod field;
mod filter;
mod op;
mod ordering;
mod predicate;
mod query;
mod traits;
mod value;

pub use coerce::{coerce, coerce_many, Operand};
pub use compiler::{compile_filter, compile_sort, Compiler, CompilerConfig};
pub use error::{Result, SiftError};
pub use field::{FieldAccessor, FieldMap, FieldMapBuilder};
pub use filter::{FilterNode, LogicalFilter, MembershipFilter, ValueFilter};
pub use op::{Operator, OperatorKind};
pub use ordering::{compare_values, Direction, SortKey, SortOrder, SortRule};
pub use predicate::{check_applicable, membership_predicate, value_predicate, Predicate};
pub use query::{Include, Page, Query, QueryResult};
pub use traits::{BoolField, FloatField, IntegerField, Queryable, TextField, TimestampField, UuidField};
pub use value::{FieldType, TypedValue, Value, ValueSet};

#[cfg(feature = "derive")]
pub use sift_macros::Queryable;
