//! Compiled predicates and the single-field predicate builders.
//!
//! A [`Predicate`] is a shared closure over a whole record. Builders take a
//! field accessor plus already-coerced operands and return a predicate;
//! [`Predicate::all`] and [`Predicate::any`] compose them. Negated operators
//! (`!=`, `!contains`, `!in`) are built as the negation of their positive
//! form, so they inherit its null handling inverted.

use std::fmt;
use std::sync::Arc;

use crate::error::{Result, SiftError};
use crate::field::FieldAccessor;
use crate::op::{Operator, OperatorKind};
use crate::value::{FieldType, TypedValue, ValueSet};

/// A compiled, reusable boolean test over records of `R`.
///
/// Cloning is cheap and the predicate is safe to evaluate from several
/// threads at once. Evaluation never fails.
pub struct Predicate<R> {
    test: Arc<dyn Fn(&R) -> bool + Send + Sync>,
}

impl<R: 'static> Predicate<R> {
    /// Wraps a closure as a predicate.
    pub fn new<F>(test: F) -> Self
    where
        F: Fn(&R) -> bool + Send + Sync + 'static,
    {
        Predicate {
            test: Arc::new(test),
        }
    }

    /// A predicate that matches every record.
    pub fn always() -> Self {
        Predicate::new(|_| true)
    }

    /// Evaluates the predicate against one record.
    pub fn matches(&self, record: &R) -> bool {
        (self.test)(record)
    }

    /// Logical negation.
    pub fn negate(self) -> Self {
        Predicate::new(move |record| !self.matches(record))
    }

    /// Conjunction of two or more predicates, evaluated left to right.
    ///
    /// # Errors
    ///
    /// Returns [`SiftError::MalformedLogicalNode`] for fewer than two inputs.
    pub fn all(predicates: Vec<Predicate<R>>) -> Result<Self> {
        require_operands(Operator::And, &predicates)?;
        Ok(Predicate::new(move |record| {
            predicates.iter().all(|p| p.matches(record))
        }))
    }

    /// Disjunction of two or more predicates, evaluated left to right.
    ///
    /// # Errors
    ///
    /// Returns [`SiftError::MalformedLogicalNode`] for fewer than two inputs.
    pub fn any(predicates: Vec<Predicate<R>>) -> Result<Self> {
        require_operands(Operator::Or, &predicates)?;
        Ok(Predicate::new(move |record| {
            predicates.iter().any(|p| p.matches(record))
        }))
    }

    /// Returns references to the matching records, in input order.
    pub fn filter<'a>(&self, records: &'a [R]) -> Vec<&'a R> {
        records.iter().filter(|r| self.matches(r)).collect()
    }

    /// Returns clones of the matching records, in input order.
    pub fn filter_cloned(&self, records: &[R]) -> Vec<R>
    where
        R: Clone,
    {
        records
            .iter()
            .filter(|r| self.matches(r))
            .cloned()
            .collect()
    }

    /// Removes non-matching records in place.
    pub fn retain(&self, records: &mut Vec<R>) {
        records.retain(|r| self.matches(r));
    }

    /// Counts the matching records.
    pub fn count(&self, records: &[R]) -> usize {
        records.iter().filter(|r| self.matches(r)).count()
    }

    /// Returns the first matching record.
    pub fn find<'a>(&self, records: &'a [R]) -> Option<&'a R> {
        records.iter().find(|r| self.matches(r))
    }
}

impl<R> Clone for Predicate<R> {
    fn clone(&self) -> Self {
        Predicate {
            test: Arc::clone(&self.test),
        }
    }
}

impl<R> fmt::Debug for Predicate<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Predicate")
    }
}

fn require_operands<R>(operator: Operator, predicates: &[Predicate<R>]) -> Result<()> {
    if predicates.len() < 2 {
        return Err(SiftError::MalformedLogicalNode {
            operator,
            children: predicates.len(),
        });
    }
    Ok(())
}

/// Builds the predicate for a value node.
///
/// `value` must already be coerced to the accessor's type.
///
/// # Errors
///
/// - [`SiftError::UnsupportedOperator`] if `op` is not a value operator.
/// - [`SiftError::OperatorNotApplicable`] for ordering operators on
///   unordered types and containment on non-text fields.
/// - [`SiftError::ValueCoercion`] if `value` does not match the field type,
///   or is null where a comparison needs a concrete operand.
pub fn value_predicate<R: 'static>(
    field: &str,
    accessor: FieldAccessor<R>,
    op: Operator,
    value: TypedValue,
) -> Result<Predicate<R>> {
    let field_type = accessor.field_type();
    check_applicable(field, field_type, op)?;
    check_operand(field, field_type, &value)?;

    let predicate = match op.positive() {
        Operator::Gt | Operator::Gte | Operator::Lt | Operator::Lte => {
            require_non_null(field, field_type, &value, "ordering comparisons need a value")?;
            compare(accessor, op, value)
        }
        Operator::Contains => {
            require_non_null(field, field_type, &value, "containment needs a value")?;
            contains(accessor, value)
        }
        _ => eq(accessor, value),
    };

    Ok(if op.is_negated() {
        predicate.negate()
    } else {
        predicate
    })
}

/// Builds the predicate for a membership node.
///
/// # Errors
///
/// - [`SiftError::UnsupportedOperator`] if `op` is not `in` or `!in`.
/// - [`SiftError::ValueCoercion`] if a member does not match the field type.
pub fn membership_predicate<R: 'static>(
    field: &str,
    accessor: FieldAccessor<R>,
    op: Operator,
    values: ValueSet,
) -> Result<Predicate<R>> {
    if op.kind() != OperatorKind::Membership {
        return Err(SiftError::UnsupportedOperator(op.to_string()));
    }
    for value in values.iter() {
        check_operand(field, accessor.field_type(), value)?;
    }

    let predicate = Predicate::new(move |record| values.contains(&accessor.value(record)));
    Ok(if op.is_negated() {
        predicate.negate()
    } else {
        predicate
    })
}

/// Checks that a value operator is defined for a field type.
///
/// The compiler calls this before coercing the operand, so a misapplied
/// operator is reported as such rather than as a bad operand.
///
/// # Errors
///
/// - [`SiftError::UnsupportedOperator`] if `op` is not a value operator.
/// - [`SiftError::OperatorNotApplicable`] for ordering operators on
///   unordered types and containment on non-text fields.
pub fn check_applicable(field: &str, field_type: FieldType, op: Operator) -> Result<()> {
    let applicable = match op.kind() {
        OperatorKind::Value if op.is_ordering() => field_type.is_ordered(),
        OperatorKind::Value if op.positive() == Operator::Contains => {
            field_type == FieldType::Text
        }
        OperatorKind::Value => true,
        _ => return Err(SiftError::UnsupportedOperator(op.to_string())),
    };
    if !applicable {
        return Err(SiftError::OperatorNotApplicable {
            operator: op,
            field: field.to_string(),
            field_type,
        });
    }
    Ok(())
}

fn eq<R: 'static>(accessor: FieldAccessor<R>, value: TypedValue) -> Predicate<R> {
    Predicate::new(move |record| accessor.value(record) == value.as_value())
}

fn compare<R: 'static>(accessor: FieldAccessor<R>, op: Operator, value: TypedValue) -> Predicate<R> {
    Predicate::new(move |record| {
        accessor
            .value(record)
            .compare(&value.as_value())
            .is_some_and(|ordering| op.eval_ordering(ordering))
    })
}

fn contains<R: 'static>(accessor: FieldAccessor<R>, value: TypedValue) -> Predicate<R> {
    let needle = match value {
        TypedValue::Text(s) => s,
        _ => String::new(),
    };
    Predicate::new(move |record| {
        accessor
            .value(record)
            .as_str()
            .is_some_and(|haystack| haystack.contains(needle.as_str()))
    })
}

fn check_operand(field: &str, field_type: FieldType, value: &TypedValue) -> Result<()> {
    match value.field_type() {
        Some(actual) if actual != field_type => Err(SiftError::ValueCoercion {
            field: field.to_string(),
            expected: field_type,
            value: value.to_string(),
            reason: format!("operand is a {actual} value"),
        }),
        _ => Ok(()),
    }
}

fn require_non_null(
    field: &str,
    field_type: FieldType,
    value: &TypedValue,
    reason: &str,
) -> Result<()> {
    if value.is_null() {
        return Err(SiftError::ValueCoercion {
            field: field.to_string(),
            expected: field_type,
            value: value.to_string(),
            reason: reason.to_string(),
        });
    }
    Ok(())
}
