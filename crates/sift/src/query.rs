//! Query execution over in-memory collections.
//!
//! A [`Query`] bundles an optional filter tree, a sort request, paging and
//! the [`Include`] flags that select what the [`QueryResult`] carries. It is
//! the shape a list endpoint receives: everything is `serde` friendly.
//!
//! Execution order is fixed: filter, then sort, then page. Counts are taken
//! before paging.
//!
//! # Example
//!
//! ```
//! use sift::{Compiler, FieldMap, FilterNode, Include, Page, Query, SortRule};
//!
//! struct Task {
//!     name: String,
//!     done: bool,
//! }
//!
//! let fields = FieldMap::<Task>::builder()
//!     .text("name", |t| Some(t.name.as_str()))
//!     .boolean("done", |t| Some(t.done))
//!     .build();
//!
//! let tasks = vec![
//!     Task { name: "b".into(), done: false },
//!     Task { name: "a".into(), done: false },
//!     Task { name: "c".into(), done: true },
//! ];
//!
//! let result = Query::new()
//!     .filter(FilterNode::eq("done", false))
//!     .sort(SortRule::asc("name"))
//!     .page(Page::new(0, Some(1)))
//!     .include(Include::all())
//!     .execute(&Compiler::new(&fields), &tasks)
//!     .unwrap();
//!
//! let items = result.items.unwrap();
//! assert_eq!(items.len(), 1);
//! assert_eq!(items[0].name, "a");
//! assert_eq!(result.total_count, Some(3));
//! assert_eq!(result.total_match_count, Some(2));
//! ```

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::compiler::Compiler;
use crate::error::Result;
use crate::filter::FilterNode;
use crate::ordering::SortRule;

/// Which outputs a query produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Include {
    /// The page of matching records.
    pub items: bool,
    /// Number of records before filtering.
    pub total_count: bool,
    /// Number of records after filtering, before paging.
    pub total_match_count: bool,
}

impl Include {
    /// Every output.
    pub fn all() -> Self {
        Include {
            items: true,
            total_count: true,
            total_match_count: true,
        }
    }

    /// Only the counts, no records.
    pub fn counts() -> Self {
        Include {
            items: false,
            total_count: true,
            total_match_count: true,
        }
    }
}

impl Default for Include {
    fn default() -> Self {
        Include {
            items: true,
            total_count: false,
            total_match_count: false,
        }
    }
}

/// Offset paging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Page {
    /// Records to skip.
    pub skip: usize,
    /// Records to return after skipping; `None` returns the rest.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub take: Option<usize>,
}

impl Page {
    pub fn new(skip: usize, take: Option<usize>) -> Self {
        Page { skip, take }
    }

    /// Applies this page to an already filtered and sorted list.
    pub fn apply<T>(&self, items: Vec<T>) -> Vec<T> {
        let take = self.take.unwrap_or(usize::MAX);
        items.into_iter().skip(self.skip).take(take).collect()
    }
}

/// A filter, sort and paging request.
///
/// An empty sort list means "keep input order"; the sort compiler is only
/// invoked when there is at least one rule.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct Query {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<FilterNode>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sort: Vec<SortRule>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<Page>,
    pub include: Include,
}

impl Query {
    /// Creates a query that returns every record in input order.
    pub fn new() -> Self {
        Query::default()
    }

    /// Sets the filter tree, replacing any earlier one.
    pub fn filter(mut self, node: FilterNode) -> Self {
        self.filter = Some(node);
        self
    }

    /// Appends a sort rule.
    pub fn sort(mut self, rule: SortRule) -> Self {
        self.sort.push(rule);
        self
    }

    pub fn page(mut self, page: Page) -> Self {
        self.page = Some(page);
        self
    }

    pub fn include(mut self, include: Include) -> Self {
        self.include = include;
        self
    }

    /// Runs the query against a slice of records.
    ///
    /// Both the filter and the sort are compiled before any record is
    /// touched, so a bad request fails without partial work.
    ///
    /// # Errors
    ///
    /// Any compile error from [`Compiler::compile_filter`] or
    /// [`Compiler::compile_sort`].
    pub fn execute<'a, R: 'static>(
        &self,
        compiler: &Compiler<'_, R>,
        records: &'a [R],
    ) -> Result<QueryResult<&'a R>> {
        self.execute_refs(compiler, records.iter().collect())
    }

    /// Like [`Query::execute`], over records already narrowed by the caller.
    ///
    /// `total_count` is the length of `records`.
    ///
    /// # Errors
    ///
    /// Same as [`Query::execute`].
    pub fn execute_refs<'a, R: 'static>(
        &self,
        compiler: &Compiler<'_, R>,
        records: Vec<&'a R>,
    ) -> Result<QueryResult<&'a R>> {
        let predicate = self
            .filter
            .as_ref()
            .map(|node| compiler.compile_filter(node))
            .transpose()?;
        let order = if self.sort.is_empty() {
            None
        } else {
            Some(compiler.compile_sort(&self.sort)?)
        };

        let total_count = records.len();
        let mut matched: Vec<&'a R> = match &predicate {
            Some(predicate) => records.into_iter().filter(|r| predicate.matches(r)).collect(),
            None => records,
        };
        let total_match_count = matched.len();
        debug!(total_count, total_match_count, "query filtered");

        let items = if self.include.items {
            if let Some(order) = &order {
                order.sort_refs(&mut matched);
            }
            Some(match &self.page {
                Some(page) => page.apply(matched),
                None => matched,
            })
        } else {
            None
        };

        Ok(QueryResult {
            items,
            total_count: self.include.total_count.then_some(total_count),
            total_match_count: self.include.total_match_count.then_some(total_match_count),
        })
    }
}

/// The outputs selected by a query's [`Include`] flags.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResult<T> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Vec<T>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_match_count: Option<usize>,
}

impl<T> QueryResult<T> {
    /// Converts the items, keeping the counts.
    pub fn map<U, F>(self, f: F) -> QueryResult<U>
    where
        F: FnMut(T) -> U,
    {
        QueryResult {
            items: self.items.map(|items| items.into_iter().map(f).collect()),
            total_count: self.total_count,
            total_match_count: self.total_match_count,
        }
    }
}
