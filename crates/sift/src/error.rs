//! Error types for the sift crate.
//!
//! Every error is raised while compiling a filter or sort request. Compiled
//! predicates and orderings are infallible, so nothing here can surface
//! during evaluation.

use thiserror::Error;

use crate::op::Operator;
use crate::value::FieldType;

/// Errors that can occur when compiling filters and sort requests.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SiftError {
    /// The field identifier is not registered in the field map.
    #[error("unknown field '{0}'")]
    UnknownField(String),

    /// A filter operand could not be converted to the field's declared type.
    #[error("cannot use {value} as a {expected} value for field '{field}': {reason}")]
    ValueCoercion {
        field: String,
        expected: FieldType,
        value: String,
        reason: String,
    },

    /// The operator string is not recognized, or does not belong to the
    /// kind of node it appears in.
    #[error("unsupported operator '{0}'")]
    UnsupportedOperator(String),

    /// The operator exists but is not defined for the field's type.
    #[error("operator '{operator}' is not applicable to {field_type} field '{field}'")]
    OperatorNotApplicable {
        operator: Operator,
        field: String,
        field_type: FieldType,
    },

    /// An `and`/`or` node with fewer than two children.
    #[error("'{operator}' needs at least 2 children, got {children}")]
    MalformedLogicalNode { operator: Operator, children: usize },

    /// A serialized filter node lacks the payload its operator requires.
    #[error("'{operator}' node is missing '{missing}'")]
    MissingNodeField {
        operator: Operator,
        missing: &'static str,
    },

    /// The sort compiler was called without any rules.
    #[error("sort request must contain at least one rule")]
    EmptySortRequest,

    /// Logical nodes are nested deeper than the compiler allows.
    #[error("filter is nested deeper than {max_depth} logical levels")]
    FilterTooDeep { max_depth: usize },

    /// A membership list is longer than the compiler allows.
    #[error("membership filter on '{field}' has {count} values, at most {max} are allowed")]
    TooManyValues {
        field: String,
        count: usize,
        max: usize,
    },
}

impl SiftError {
    /// Returns the field identifier this error is about, if any.
    ///
    /// Useful for naming the offending field in a "bad request" response.
    pub fn field(&self) -> Option<&str> {
        match self {
            SiftError::UnknownField(field)
            | SiftError::ValueCoercion { field, .. }
            | SiftError::OperatorNotApplicable { field, .. }
            | SiftError::TooManyValues { field, .. } => Some(field),
            _ => None,
        }
    }
}

/// Result type for sift operations.
pub type Result<T> = std::result::Result<T, SiftError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offender() {
        assert_eq!(
            SiftError::UnknownField("bogus".into()).to_string(),
            "unknown field 'bogus'"
        );
        assert_eq!(
            SiftError::UnsupportedOperator("~=".into()).to_string(),
            "unsupported operator '~='"
        );
        assert_eq!(
            SiftError::MalformedLogicalNode {
                operator: Operator::Or,
                children: 1
            }
            .to_string(),
            "'or' needs at least 2 children, got 1"
        );
        assert_eq!(
            SiftError::OperatorNotApplicable {
                operator: Operator::Gt,
                field: "subject".into(),
                field_type: FieldType::Text,
            }
            .to_string(),
            "operator '>' is not applicable to text field 'subject'"
        );
    }

    #[test]
    fn field_accessor() {
        assert_eq!(SiftError::UnknownField("x".into()).field(), Some("x"));
        assert_eq!(SiftError::EmptySortRequest.field(), None);
        assert_eq!(
            SiftError::TooManyValues {
                field: "id".into(),
                count: 3,
                max: 2
            }
            .field(),
            Some("id")
        );
    }
}
