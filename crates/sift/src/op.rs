//! Filter operators.
//!
//! The [`Operator`] enum covers every operator a filter tree can carry.
//! Operators are grouped by the kind of node they belong to: value
//! comparisons, membership tests, and logical combinators. On the wire they
//! travel as short strings (`"="`, `"!in"`, `"and"`, ...).

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SiftError;

/// Filter operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "&'static str")]
pub enum Operator {
    // Value operators
    /// Equal (`=`).
    Eq,
    /// Not equal (`!=`), the negation of `Eq`.
    NotEq,
    /// Greater than (`>`).
    Gt,
    /// Greater than or equal (`>=`).
    Gte,
    /// Less than (`<`).
    Lt,
    /// Less than or equal (`<=`).
    Lte,
    /// Substring containment (`contains`).
    Contains,
    /// Negated substring containment (`!contains`).
    NotContains,

    // Membership operators
    /// Member of a set (`in`).
    In,
    /// Not a member of a set (`!in`).
    NotIn,

    // Logical operators
    /// Conjunction (`and`).
    And,
    /// Disjunction (`or`).
    Or,
}

/// The kind of filter node an operator belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperatorKind {
    /// Compares a field against one value.
    Value,
    /// Tests a field against a set of values.
    Membership,
    /// Combines child filters.
    Logical,
}

impl Operator {
    /// Every operator, in wire order.
    pub const ALL: [Operator; 12] = [
        Operator::Eq,
        Operator::NotEq,
        Operator::Gt,
        Operator::Gte,
        Operator::Lt,
        Operator::Lte,
        Operator::Contains,
        Operator::NotContains,
        Operator::In,
        Operator::NotIn,
        Operator::And,
        Operator::Or,
    ];

    /// Returns the kind of node this operator belongs to.
    pub fn kind(self) -> OperatorKind {
        match self {
            Operator::In | Operator::NotIn => OperatorKind::Membership,
            Operator::And | Operator::Or => OperatorKind::Logical,
            _ => OperatorKind::Value,
        }
    }

    /// Returns `true` for `>`, `>=`, `<` and `<=`.
    pub fn is_ordering(self) -> bool {
        matches!(
            self,
            Operator::Gt | Operator::Gte | Operator::Lt | Operator::Lte
        )
    }

    /// Returns `true` for operators defined as the negation of another.
    pub fn is_negated(self) -> bool {
        matches!(
            self,
            Operator::NotEq | Operator::NotContains | Operator::NotIn
        )
    }

    /// Returns the positive form of a negated operator.
    ///
    /// - `NotEq` -> `Eq`
    /// - `NotContains` -> `Contains`
    /// - `NotIn` -> `In`
    /// - Others unchanged
    pub fn positive(self) -> Operator {
        match self {
            Operator::NotEq => Operator::Eq,
            Operator::NotContains => Operator::Contains,
            Operator::NotIn => Operator::In,
            other => other,
        }
    }

    /// Evaluates an ordering comparison given the field value's ordering
    /// relative to the operand.
    pub fn eval_ordering(self, ordering: Ordering) -> bool {
        match self {
            Operator::Eq => ordering == Ordering::Equal,
            Operator::NotEq => ordering != Ordering::Equal,
            Operator::Gt => ordering == Ordering::Greater,
            Operator::Gte => ordering != Ordering::Less,
            Operator::Lt => ordering == Ordering::Less,
            Operator::Lte => ordering != Ordering::Greater,
            _ => false, // Not an ordering-based operator
        }
    }

    /// Returns the wire form of this operator.
    pub fn as_str(self) -> &'static str {
        match self {
            Operator::Eq => "=",
            Operator::NotEq => "!=",
            Operator::Gt => ">",
            Operator::Gte => ">=",
            Operator::Lt => "<",
            Operator::Lte => "<=",
            Operator::Contains => "contains",
            Operator::NotContains => "!contains",
            Operator::In => "in",
            Operator::NotIn => "!in",
            Operator::And => "and",
            Operator::Or => "or",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operator {
    type Err = SiftError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Operator::ALL
            .into_iter()
            .find(|op| op.as_str() == s)
            .ok_or_else(|| SiftError::UnsupportedOperator(s.to_string()))
    }
}

impl TryFrom<String> for Operator {
    type Error = SiftError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Operator> for &'static str {
    fn from(op: Operator) -> Self {
        op.as_str()
    }
}
