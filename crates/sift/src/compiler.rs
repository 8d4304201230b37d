//! Filter and sort compilation.
//!
//! The [`Compiler`] resolves every field identifier in a request against a
//! [`FieldMap`], coerces operands to the declared field types, and emits a
//! [`Predicate`] or [`SortOrder`]. All validation happens here; the compiled
//! artifacts cannot fail.
//!
//! # Example
//!
//! ```
//! use sift::{Compiler, FieldMap, FilterNode, SortRule};
//!
//! struct Message {
//!     subject: String,
//!     priority: i64,
//! }
//!
//! let fields = FieldMap::<Message>::builder()
//!     .text("subject", |m| Some(m.subject.as_str()))
//!     .integer("priority", |m| Some(m.priority))
//!     .build();
//! let compiler = Compiler::new(&fields);
//!
//! let urgent = compiler
//!     .compile_filter(&FilterNode::gte("priority", 5i64))
//!     .unwrap();
//! let order = compiler.compile_sort(&[SortRule::desc("priority")]).unwrap();
//!
//! let mut messages = vec![
//!     Message { subject: "lunch".into(), priority: 1 },
//!     Message { subject: "outage".into(), priority: 9 },
//!     Message { subject: "deploy".into(), priority: 5 },
//! ];
//! urgent.retain(&mut messages);
//! order.sort(&mut messages);
//! assert_eq!(messages[0].subject, "outage");
//! assert_eq!(messages.len(), 2);
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::coerce::{coerce, coerce_many};
use crate::error::{Result, SiftError};
use crate::field::FieldMap;
use crate::filter::{FilterNode, LogicalFilter, MembershipFilter, ValueFilter};
use crate::op::{Operator, OperatorKind};
use crate::ordering::{SortKey, SortOrder, SortRule};
use crate::predicate::{check_applicable, membership_predicate, value_predicate, Predicate};

/// Limits applied while compiling untrusted filter trees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct CompilerConfig {
    /// Maximum nesting of logical nodes.
    pub max_depth: usize,
    /// Maximum length of one membership list.
    pub max_values: usize,
}

impl CompilerConfig {
    pub const DEFAULT_MAX_DEPTH: usize = 32;
    pub const DEFAULT_MAX_VALUES: usize = 1024;
}

impl Default for CompilerConfig {
    fn default() -> Self {
        CompilerConfig {
            max_depth: Self::DEFAULT_MAX_DEPTH,
            max_values: Self::DEFAULT_MAX_VALUES,
        }
    }
}

/// Compiles filter trees and sort requests against one field map.
///
/// The compiler only borrows the map; compiled predicates and orderings
/// outlive it.
pub struct Compiler<'m, R> {
    fields: &'m FieldMap<R>,
    config: CompilerConfig,
}

impl<'m, R> fmt::Debug for Compiler<'m, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Compiler")
            .field("fields", self.fields)
            .field("config", &self.config)
            .finish()
    }
}

impl<'m, R> Clone for Compiler<'m, R> {
    fn clone(&self) -> Self {
        Compiler {
            fields: self.fields,
            config: self.config,
        }
    }
}

impl<'m, R: 'static> Compiler<'m, R> {
    /// Creates a compiler with the default limits.
    pub fn new(fields: &'m FieldMap<R>) -> Self {
        Compiler::with_config(fields, CompilerConfig::default())
    }

    pub fn with_config(fields: &'m FieldMap<R>, config: CompilerConfig) -> Self {
        Compiler { fields, config }
    }

    /// Sets the maximum nesting of logical nodes.
    pub fn max_depth(mut self, max_depth: usize) -> Self {
        self.config.max_depth = max_depth;
        self
    }

    /// Sets the maximum length of a membership list.
    pub fn max_values(mut self, max_values: usize) -> Self {
        self.config.max_values = max_values;
        self
    }

    pub fn config(&self) -> CompilerConfig {
        self.config
    }

    pub fn fields(&self) -> &'m FieldMap<R> {
        self.fields
    }

    /// Compiles a filter tree into one predicate.
    ///
    /// Children are compiled depth-first, left to right, and the first error
    /// aborts compilation.
    ///
    /// # Errors
    ///
    /// Any [`SiftError`] except [`SiftError::EmptySortRequest`].
    pub fn compile_filter(&self, node: &FilterNode) -> Result<Predicate<R>> {
        debug!(
            nodes = node.node_count(),
            depth = node.depth(),
            "compiling filter"
        );
        let predicate = self.compile_node(node, 0)?;
        debug!("filter compiled");
        Ok(predicate)
    }

    /// Compiles a sort request into one ordering.
    ///
    /// # Errors
    ///
    /// - [`SiftError::EmptySortRequest`] if `rules` is empty.
    /// - [`SiftError::UnknownField`] for a rule naming an unregistered field.
    pub fn compile_sort(&self, rules: &[SortRule]) -> Result<SortOrder<R>> {
        if rules.is_empty() {
            return Err(SiftError::EmptySortRequest);
        }
        let keys = rules
            .iter()
            .map(|rule| {
                let accessor = self.fields.lookup(&rule.field_id)?;
                trace!(field = %rule.field_id, direction = %rule.direction, "sort key");
                Ok(SortKey::new(rule.field_id.as_str(), accessor, rule.direction))
            })
            .collect::<Result<Vec<_>>>()?;
        debug!(keys = keys.len(), "sort compiled");
        Ok(SortOrder::new(keys))
    }

    fn compile_node(&self, node: &FilterNode, depth: usize) -> Result<Predicate<R>> {
        match node {
            FilterNode::Value(filter) => self.compile_value(filter),
            FilterNode::Membership(filter) => self.compile_membership(filter),
            FilterNode::Logical(filter) => self.compile_logical(filter, depth + 1),
        }
    }

    fn compile_value(&self, filter: &ValueFilter) -> Result<Predicate<R>> {
        require_kind(filter.operator, OperatorKind::Value)?;
        trace!(field = %filter.field_id, operator = %filter.operator, "value node");

        let accessor = self.fields.lookup(&filter.field_id)?;
        check_applicable(&filter.field_id, accessor.field_type(), filter.operator)?;
        let value = coerce(&filter.field_id, accessor.field_type(), &filter.value)?;
        value_predicate(&filter.field_id, accessor, filter.operator, value)
    }

    fn compile_membership(&self, filter: &MembershipFilter) -> Result<Predicate<R>> {
        require_kind(filter.operator, OperatorKind::Membership)?;
        trace!(
            field = %filter.field_id,
            operator = %filter.operator,
            values = filter.values.len(),
            "membership node"
        );

        let accessor = self.fields.lookup(&filter.field_id)?;
        if filter.values.len() > self.config.max_values {
            return Err(SiftError::TooManyValues {
                field: filter.field_id.clone(),
                count: filter.values.len(),
                max: self.config.max_values,
            });
        }
        let values = coerce_many(&filter.field_id, accessor.field_type(), &filter.values)?;
        membership_predicate(&filter.field_id, accessor, filter.operator, values)
    }

    fn compile_logical(&self, filter: &LogicalFilter, depth: usize) -> Result<Predicate<R>> {
        require_kind(filter.operator, OperatorKind::Logical)?;
        if depth > self.config.max_depth {
            return Err(SiftError::FilterTooDeep {
                max_depth: self.config.max_depth,
            });
        }
        if filter.children.len() < 2 {
            return Err(SiftError::MalformedLogicalNode {
                operator: filter.operator,
                children: filter.children.len(),
            });
        }
        trace!(operator = %filter.operator, children = filter.children.len(), depth, "logical node");

        let children = filter
            .children
            .iter()
            .map(|child| self.compile_node(child, depth))
            .collect::<Result<Vec<_>>>()?;

        match filter.operator {
            Operator::And => Predicate::all(children),
            _ => Predicate::any(children),
        }
    }
}

fn require_kind(operator: Operator, kind: OperatorKind) -> Result<()> {
    if operator.kind() != kind {
        return Err(SiftError::UnsupportedOperator(operator.to_string()));
    }
    Ok(())
}

/// Compiles a filter tree with the default limits.
///
/// Shorthand for `Compiler::new(fields).compile_filter(node)`.
pub fn compile_filter<R: 'static>(fields: &FieldMap<R>, node: &FilterNode) -> Result<Predicate<R>> {
    Compiler::new(fields).compile_filter(node)
}

/// Compiles a sort request.
///
/// Shorthand for `Compiler::new(fields).compile_sort(rules)`.
pub fn compile_sort<R: 'static>(fields: &FieldMap<R>, rules: &[SortRule]) -> Result<SortOrder<R>> {
    Compiler::new(fields).compile_sort(rules)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ordering::Direction;
    use crate::value::FieldType;
    use serde_json::json;

    #[derive(Debug)]
    struct Item {
        name: String,
        size: i64,
        tag: Option<String>,
    }

    fn item(name: &str, size: i64, tag: Option<&str>) -> Item {
        Item {
            name: name.to_string(),
            size,
            tag: tag.map(str::to_string),
        }
    }

    fn fields() -> FieldMap<Item> {
        FieldMap::<Item>::builder()
            .text("name", |i| Some(i.name.as_str()))
            .integer("size", |i| Some(i.size))
            .text("tag", |i| i.tag.as_deref())
            .build()
    }

    fn items() -> Vec<Item> {
        vec![
            item("a", 1, Some("x")),
            item("b", 2, None),
            item("c", 3, Some("y")),
        ]
    }

    fn names(pred: &Predicate<Item>, items: &[Item]) -> Vec<String> {
        pred.filter(items).iter().map(|i| i.name.clone()).collect()
    }

    #[test]
    fn compiles_leaf() {
        let fields = fields();
        let pred = compile_filter(&fields, &FilterNode::gt("size", 1i64)).unwrap();
        assert_eq!(names(&pred, &items()), vec!["b", "c"]);
    }

    #[test]
    fn compiles_json_operands() {
        let fields = fields();
        let pred = compile_filter(&fields, &FilterNode::lte("size", json!("2"))).unwrap();
        assert_eq!(names(&pred, &items()), vec!["a", "b"]);
    }

    #[test]
    fn compiles_nested_tree() {
        let fields = fields();
        let tree = FilterNode::or(vec![
            FilterNode::eq("name", "a"),
            FilterNode::and(vec![
                FilterNode::gte("size", 2i64),
                FilterNode::not_in("tag", ["y"]),
            ]),
        ]);
        let pred = compile_filter(&fields, &tree).unwrap();
        assert_eq!(names(&pred, &items()), vec!["a", "b"]);
    }

    #[test]
    fn unknown_field_anywhere_fails() {
        let fields = fields();
        let tree = FilterNode::and(vec![
            FilterNode::eq("name", "a"),
            FilterNode::or(vec![FilterNode::eq("size", 1i64), FilterNode::eq("bogus", 1i64)]),
        ]);
        assert_eq!(
            compile_filter(&fields, &tree).unwrap_err(),
            SiftError::UnknownField("bogus".into())
        );
    }

    #[test]
    fn first_error_wins() {
        let fields = fields();
        let tree = FilterNode::and(vec![
            FilterNode::eq("size", "big"),
            FilterNode::eq("bogus", 1i64),
        ]);
        assert!(matches!(
            compile_filter(&fields, &tree),
            Err(SiftError::ValueCoercion { ref field, expected: FieldType::Integer, .. }) if field == "size"
        ));
    }

    #[test]
    fn operator_must_match_node_kind() {
        let fields = fields();
        let cases = [
            FilterNode::value("size", Operator::In, 1i64),
            FilterNode::membership("size", Operator::Eq, [1i64]),
            FilterNode::logical(Operator::Contains, vec![FilterNode::eq("size", 1i64); 2]),
            FilterNode::value("size", Operator::And, 1i64),
        ];
        for node in cases {
            let err = compile_filter(&fields, &node).unwrap_err();
            assert!(matches!(err, SiftError::UnsupportedOperator(_)), "{node:?}: {err}");
        }
    }

    #[test]
    fn logical_node_needs_two_children() {
        let fields = fields();
        for children in [vec![], vec![FilterNode::eq("size", 1i64)]] {
            let count = children.len();
            let err = compile_filter(&fields, &FilterNode::and(children)).unwrap_err();
            assert_eq!(
                err,
                SiftError::MalformedLogicalNode {
                    operator: Operator::And,
                    children: count
                }
            );
        }
    }

    #[test]
    fn depth_limit() {
        let fields = fields();
        let mut tree = FilterNode::eq("size", 1i64);
        for _ in 0..3 {
            tree = FilterNode::or(vec![tree, FilterNode::eq("size", 2i64)]);
        }

        let compiler = Compiler::new(&fields).max_depth(3);
        assert!(compiler.compile_filter(&tree).is_ok());

        let compiler = compiler.max_depth(2);
        assert_eq!(
            compiler.compile_filter(&tree).unwrap_err(),
            SiftError::FilterTooDeep { max_depth: 2 }
        );
    }

    #[test]
    fn membership_limit() {
        let fields = fields();
        let compiler = Compiler::new(&fields).max_values(2);
        assert!(compiler.compile_filter(&FilterNode::is_in("size", [1i64, 2])).is_ok());
        assert_eq!(
            compiler
                .compile_filter(&FilterNode::is_in("size", [1i64, 2, 3]))
                .unwrap_err(),
            SiftError::TooManyValues {
                field: "size".into(),
                count: 3,
                max: 2
            }
        );
    }

    #[test]
    fn config_from_json_uses_defaults() {
        let config: CompilerConfig = serde_json::from_value(json!({"maxDepth": 4})).unwrap();
        assert_eq!(config.max_depth, 4);
        assert_eq!(config.max_values, CompilerConfig::DEFAULT_MAX_VALUES);
        assert!(serde_json::from_value::<CompilerConfig>(json!({"depth": 4})).is_err());
    }

    #[test]
    fn compile_is_idempotent() {
        let fields = fields();
        let tree = FilterNode::not_eq("tag", "x");
        let first = compile_filter(&fields, &tree).unwrap();
        let second = compile_filter(&fields, &tree).unwrap();
        let items = items();
        assert_eq!(names(&first, &items), names(&second, &items));
        assert_eq!(names(&first, &items), vec!["b", "c"]);
    }

    #[test]
    fn sort_compiles_in_order() {
        let fields = fields();
        let order = compile_sort(&fields, &[SortRule::desc("size"), SortRule::asc("name")]).unwrap();
        let keys: Vec<_> = order
            .keys()
            .iter()
            .map(|k| (k.field_id(), k.direction()))
            .collect();
        assert_eq!(keys, vec![("size", Direction::Desc), ("name", Direction::Asc)]);

        let items = items();
        let sorted: Vec<_> = order.sorted(&items).iter().map(|i| i.size).collect();
        assert_eq!(sorted, vec![3, 2, 1]);
    }

    #[test]
    fn sort_errors() {
        let fields = fields();
        assert_eq!(compile_sort(&fields, &[]).unwrap_err(), SiftError::EmptySortRequest);
        assert_eq!(
            compile_sort(&fields, &[SortRule::asc("name"), SortRule::asc("bogus")]).unwrap_err(),
            SiftError::UnknownField("bogus".into())
        );
    }

    #[test]
    fn predicate_outlives_field_map() {
        let pred = {
            let fields = fields();
            compile_filter(&fields, &FilterNode::eq("name", "c")).unwrap()
        };
        assert_eq!(names(&pred, &items()), vec!["c"]);
    }

    #[test]
    fn predicate_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>(_: &T) {}
        let fields = fields();
        let pred = compile_filter(&fields, &FilterNode::eq("name", "c")).unwrap();
        assert_send_sync(&pred);
    }
}
