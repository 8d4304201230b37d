//! Sort rules and compiled orderings.
//!
//! Provides [`Direction`] and [`SortRule`] for describing a sort request and
//! [`SortOrder`] for the compiled comparator. The first rule is the primary
//! key; each later rule only breaks ties left by the ones before it.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::field::FieldAccessor;
use crate::value::Value;

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Ascending order (smallest first, nulls first).
    #[default]
    Asc,
    /// Descending order (largest first, nulls last).
    Desc,
}

impl Direction {
    /// Returns `true` if this is ascending order.
    pub fn is_asc(self) -> bool {
        matches!(self, Direction::Asc)
    }

    /// Applies this direction to an ascending comparison.
    pub fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            Direction::Asc => ordering,
            Direction::Desc => ordering.reverse(),
        }
    }

    /// Returns the wire form of this direction.
    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Asc => "asc",
            Direction::Desc => "desc",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single sort key: a field and a direction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SortRule {
    pub field_id: String,
    #[serde(default)]
    pub direction: Direction,
}

impl SortRule {
    /// Creates an ascending rule for the given field.
    pub fn asc(field_id: impl Into<String>) -> Self {
        SortRule::new(field_id, Direction::Asc)
    }

    /// Creates a descending rule for the given field.
    pub fn desc(field_id: impl Into<String>) -> Self {
        SortRule::new(field_id, Direction::Desc)
    }

    pub fn new(field_id: impl Into<String>, direction: Direction) -> Self {
        SortRule {
            field_id: field_id.into(),
            direction,
        }
    }
}

/// Total ascending order over field values.
///
/// Null sorts before every value. Text compares byte-wise, floats use the
/// IEEE total order so `NaN` has a fixed place. Values of different types
/// cannot come from one accessor, but are still ordered by type so the
/// comparison stays total.
pub fn compare_values(a: &Value<'_>, b: &Value<'_>) -> Ordering {
    match (a, b) {
        (Value::Null, Value::Null) => Ordering::Equal,
        (Value::Null, _) => Ordering::Less,
        (_, Value::Null) => Ordering::Greater,
        (Value::Float(a), Value::Float(b)) => a.total_cmp(b),
        _ => a.compare(b).unwrap_or_else(|| type_rank(a).cmp(&type_rank(b))),
    }
}

fn type_rank(value: &Value<'_>) -> u8 {
    match value {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Integer(_) => 2,
        Value::Float(_) => 3,
        Value::Timestamp(_) => 4,
        Value::Text(_) => 5,
        Value::Uuid(_) => 6,
    }
}

/// One resolved sort key.
pub struct SortKey<R> {
    field_id: String,
    accessor: FieldAccessor<R>,
    direction: Direction,
}

impl<R> SortKey<R> {
    pub fn new(field_id: impl Into<String>, accessor: FieldAccessor<R>, direction: Direction) -> Self {
        SortKey {
            field_id: field_id.into(),
            accessor,
            direction,
        }
    }

    pub fn field_id(&self) -> &str {
        &self.field_id
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Compares two records on this key alone.
    pub fn compare(&self, a: &R, b: &R) -> Ordering {
        let ordering = compare_values(&self.accessor.value(a), &self.accessor.value(b));
        self.direction.apply(ordering)
    }
}

impl<R> Clone for SortKey<R> {
    fn clone(&self) -> Self {
        SortKey {
            field_id: self.field_id.clone(),
            accessor: self.accessor,
            direction: self.direction,
        }
    }
}

impl<R> fmt::Debug for SortKey<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.field_id, self.direction)
    }
}

/// A compiled multi-key ordering over records of `R`.
///
/// Always holds at least one key when produced by the compiler. The
/// ordering owns its accessors and does not borrow the field map.
pub struct SortOrder<R> {
    keys: Vec<SortKey<R>>,
}

impl<R> SortOrder<R> {
    pub fn new(keys: Vec<SortKey<R>>) -> Self {
        SortOrder { keys }
    }

    pub fn keys(&self) -> &[SortKey<R>] {
        &self.keys
    }

    /// Compares two records: the first key decides, later keys break ties.
    pub fn compare(&self, a: &R, b: &R) -> Ordering {
        self.keys
            .iter()
            .fold(Ordering::Equal, |ordering, key| {
                ordering.then_with(|| key.compare(a, b))
            })
    }

    /// Sorts records in place. The sort is stable.
    pub fn sort(&self, records: &mut [R]) {
        records.sort_by(|a, b| self.compare(a, b));
    }

    /// Sorts a slice of references in place. The sort is stable.
    pub fn sort_refs(&self, records: &mut [&R]) {
        records.sort_by(|a, b| self.compare(a, b));
    }

    /// Returns references to the records in sorted order.
    pub fn sorted<'a>(&self, records: &'a [R]) -> Vec<&'a R> {
        let mut refs: Vec<&R> = records.iter().collect();
        self.sort_refs(&mut refs);
        refs
    }
}

impl<R> Clone for SortOrder<R> {
    fn clone(&self) -> Self {
        SortOrder {
            keys: self.keys.clone(),
        }
    }
}

impl<R> fmt::Debug for SortOrder<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(&self.keys).finish()
    }
}
