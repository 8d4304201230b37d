//! Filter trees.
//!
//! A [`FilterNode`] is the serializable description of a filter: value
//! comparisons and membership tests at the leaves, `and`/`or` combinators
//! above them. Nodes are built in Rust with the constructor functions or
//! decoded from JSON, where the operator string decides the node kind:
//!
//! ```json
//! { "operator": "and", "children": [
//!     { "fieldId": "subject", "operator": "contains", "value": "11" },
//!     { "fieldId": "isRead", "operator": "!in", "values": [true] } ] }
//! ```
//!
//! Nothing here checks field names or operand types; that happens in the
//! compiler, against a field map.

use serde::{Deserialize, Deserializer, Serialize};

use crate::coerce::Operand;
use crate::error::SiftError;
use crate::op::{Operator, OperatorKind};

/// One node of a filter tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawNode", into = "RawNode")]
pub enum FilterNode {
    /// Compares one field against one operand.
    Value(ValueFilter),
    /// Tests one field against a list of operands.
    Membership(MembershipFilter),
    /// Combines child nodes with `and` or `or`.
    Logical(LogicalFilter),
}

/// `{ fieldId, operator, value }` with a value operator.
#[derive(Debug, Clone, PartialEq)]
pub struct ValueFilter {
    pub field_id: String,
    pub operator: Operator,
    pub value: Operand,
}

/// `{ fieldId, operator, values }` with `in` or `!in`.
#[derive(Debug, Clone, PartialEq)]
pub struct MembershipFilter {
    pub field_id: String,
    pub operator: Operator,
    pub values: Vec<Operand>,
}

/// `{ operator, children }` with `and` or `or`.
#[derive(Debug, Clone, PartialEq)]
pub struct LogicalFilter {
    pub operator: Operator,
    pub children: Vec<FilterNode>,
}

impl FilterNode {
    /// Builds a value node with any operator.
    pub fn value(field_id: impl Into<String>, operator: Operator, value: impl Into<Operand>) -> Self {
        FilterNode::Value(ValueFilter {
            field_id: field_id.into(),
            operator,
            value: value.into(),
        })
    }

    /// Builds a membership node with any operator.
    pub fn membership<I, V>(field_id: impl Into<String>, operator: Operator, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Operand>,
    {
        FilterNode::Membership(MembershipFilter {
            field_id: field_id.into(),
            operator,
            values: values.into_iter().map(Into::into).collect(),
        })
    }

    /// Builds a logical node with any operator.
    pub fn logical(operator: Operator, children: Vec<FilterNode>) -> Self {
        FilterNode::Logical(LogicalFilter { operator, children })
    }

    pub fn eq(field_id: impl Into<String>, value: impl Into<Operand>) -> Self {
        FilterNode::value(field_id, Operator::Eq, value)
    }

    pub fn not_eq(field_id: impl Into<String>, value: impl Into<Operand>) -> Self {
        FilterNode::value(field_id, Operator::NotEq, value)
    }

    pub fn gt(field_id: impl Into<String>, value: impl Into<Operand>) -> Self {
        FilterNode::value(field_id, Operator::Gt, value)
    }

    pub fn gte(field_id: impl Into<String>, value: impl Into<Operand>) -> Self {
        FilterNode::value(field_id, Operator::Gte, value)
    }

    pub fn lt(field_id: impl Into<String>, value: impl Into<Operand>) -> Self {
        FilterNode::value(field_id, Operator::Lt, value)
    }

    pub fn lte(field_id: impl Into<String>, value: impl Into<Operand>) -> Self {
        FilterNode::value(field_id, Operator::Lte, value)
    }

    pub fn contains(field_id: impl Into<String>, value: impl Into<Operand>) -> Self {
        FilterNode::value(field_id, Operator::Contains, value)
    }

    pub fn not_contains(field_id: impl Into<String>, value: impl Into<Operand>) -> Self {
        FilterNode::value(field_id, Operator::NotContains, value)
    }

    /// `field = null`.
    pub fn is_null(field_id: impl Into<String>) -> Self {
        FilterNode::value(field_id, Operator::Eq, Operand::null())
    }

    pub fn is_in<I, V>(field_id: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Operand>,
    {
        FilterNode::membership(field_id, Operator::In, values)
    }

    pub fn not_in<I, V>(field_id: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Operand>,
    {
        FilterNode::membership(field_id, Operator::NotIn, values)
    }

    pub fn and(children: Vec<FilterNode>) -> Self {
        FilterNode::logical(Operator::And, children)
    }

    pub fn or(children: Vec<FilterNode>) -> Self {
        FilterNode::logical(Operator::Or, children)
    }

    /// The operator carried by this node.
    pub fn operator(&self) -> Operator {
        match self {
            FilterNode::Value(node) => node.operator,
            FilterNode::Membership(node) => node.operator,
            FilterNode::Logical(node) => node.operator,
        }
    }

    /// Nesting depth of logical nodes. A leaf has depth 0.
    pub fn depth(&self) -> usize {
        match self {
            FilterNode::Logical(node) => {
                1 + node.children.iter().map(FilterNode::depth).max().unwrap_or(0)
            }
            _ => 0,
        }
    }

    /// Total number of nodes in the tree.
    pub fn node_count(&self) -> usize {
        match self {
            FilterNode::Logical(node) => {
                1 + node.children.iter().map(FilterNode::node_count).sum::<usize>()
            }
            _ => 1,
        }
    }

    /// Field identifiers referenced by the tree, in visit order.
    pub fn field_ids(&self) -> Vec<&str> {
        let mut ids = Vec::new();
        self.collect_field_ids(&mut ids);
        ids
    }

    fn collect_field_ids<'a>(&'a self, ids: &mut Vec<&'a str>) {
        match self {
            FilterNode::Value(node) => ids.push(&node.field_id),
            FilterNode::Membership(node) => ids.push(&node.field_id),
            FilterNode::Logical(node) => {
                for child in &node.children {
                    child.collect_field_ids(ids);
                }
            }
        }
    }
}

/// Flat wire form shared by every node kind.
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct RawNode {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    field_id: Option<String>,
    operator: Operator,
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    value: Option<Operand>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    values: Option<Vec<Operand>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    children: Option<Vec<FilterNode>>,
}

// `"value": null` is a null literal, only a missing key means "no value"
fn present<'de, D>(deserializer: D) -> std::result::Result<Option<Operand>, D::Error>
where
    D: Deserializer<'de>,
{
    Operand::deserialize(deserializer).map(Some)
}

impl TryFrom<RawNode> for FilterNode {
    type Error = SiftError;

    fn try_from(raw: RawNode) -> Result<Self, Self::Error> {
        let operator = raw.operator;
        let missing = |key| SiftError::MissingNodeField {
            operator,
            missing: key,
        };

        match operator.kind() {
            OperatorKind::Value => Ok(FilterNode::Value(ValueFilter {
                field_id: raw.field_id.ok_or_else(|| missing("fieldId"))?,
                operator,
                value: raw.value.ok_or_else(|| missing("value"))?,
            })),
            OperatorKind::Membership => Ok(FilterNode::Membership(MembershipFilter {
                field_id: raw.field_id.ok_or_else(|| missing("fieldId"))?,
                operator,
                values: raw.values.ok_or_else(|| missing("values"))?,
            })),
            OperatorKind::Logical => Ok(FilterNode::Logical(LogicalFilter {
                operator,
                children: raw.children.ok_or_else(|| missing("children"))?,
            })),
        }
    }
}

impl From<FilterNode> for RawNode {
    fn from(node: FilterNode) -> Self {
        let mut raw = RawNode {
            field_id: None,
            operator: node.operator(),
            value: None,
            values: None,
            children: None,
        };
        match node {
            FilterNode::Value(node) => {
                raw.field_id = Some(node.field_id);
                raw.value = Some(node.value);
            }
            FilterNode::Membership(node) => {
                raw.field_id = Some(node.field_id);
                raw.values = Some(node.values);
            }
            FilterNode::Logical(node) => raw.children = Some(node.children),
        }
        raw
    }
}
