//! List queries: equality filters and page windows.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{StoreError, StoreResult};

/// Default page size for list queries.
pub const DEFAULT_LIMIT: u32 = 10;

/// Equality filters, combined with AND.
///
/// Each entry constrains `field` to equal `value` exactly. There is no OR and
/// no range operator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Filters(BTreeMap<String, Value>);

impl Filters {
    /// Create an empty filter set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an equality constraint.
    pub fn eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(field, value);
        self
    }

    /// Add an equality constraint in place. A later constraint on the same field wins.
    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(field.into(), value.into());
    }

    /// Iterate over `(field, value)` pairs in field order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of constraints.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if there are no constraints.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Check whether a JSON row satisfies every constraint.
    ///
    /// A `null` constraint matches a missing field.
    pub fn matches(&self, row: &Value) -> bool {
        self.0.iter().all(|(field, expected)| {
            let actual = row.get(field).unwrap_or(&Value::Null);
            actual == expected
        })
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Filters {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut filters = Filters::new();
        for (k, v) in iter {
            filters.insert(k, v);
        }
        filters
    }
}

/// Comparison operator of a [`Bound`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Comparison {
    /// Greater than or equal.
    Gte,
    /// Less than or equal.
    Lte,
}

impl Comparison {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Gte => "gte",
            Self::Lte => "lte",
        }
    }
}

/// An inclusive bound on one field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bound {
    pub field: String,
    pub comparison: Comparison,
    pub value: Value,
}

impl Bound {
    /// `field >= value`.
    pub fn at_least(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            comparison: Comparison::Gte,
            value: value.into(),
        }
    }

    /// `field <= value`.
    pub fn at_most(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            comparison: Comparison::Lte,
            value: value.into(),
        }
    }

    /// Check whether a JSON row satisfies the bound.
    ///
    /// Numbers compare numerically and strings lexically. A missing field or a
    /// type mismatch never satisfies a bound.
    pub fn matches(&self, row: &Value) -> bool {
        let ordering = match (row.get(&self.field), &self.value) {
            (Some(Value::Number(a)), Value::Number(b)) => match (a.as_f64(), b.as_f64()) {
                (Some(a), Some(b)) => a.partial_cmp(&b),
                _ => None,
            },
            (Some(Value::String(a)), Value::String(b)) => Some(a.as_str().cmp(b.as_str())),
            _ => None,
        };
        match (ordering, self.comparison) {
            (Some(ordering), Comparison::Gte) => ordering != Ordering::Less,
            (Some(ordering), Comparison::Lte) => ordering != Ordering::Greater,
            (None, _) => false,
        }
    }
}

/// Case-insensitive substring search over several text fields.
///
/// A row matches when any one of the fields contains the term.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextSearch {
    pub term: String,
    pub fields: Vec<String>,
}

impl TextSearch {
    /// Search `fields` for `term`. A blank term searches nothing and yields `None`.
    pub fn new<I, S>(term: &str, fields: I) -> Option<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let term = term.trim();
        if term.is_empty() {
            return None;
        }
        Some(Self {
            term: term.to_string(),
            fields: fields.into_iter().map(Into::into).collect(),
        })
    }

    /// Check whether any searched field of a JSON row contains the term.
    pub fn matches(&self, row: &Value) -> bool {
        let needle = self.term.to_lowercase();
        self.fields.iter().any(|field| {
            row.get(field)
                .and_then(Value::as_str)
                .is_some_and(|text| text.to_lowercase().contains(&needle))
        })
    }
}

/// Row selection for a range select: equality filters, inclusive bounds and
/// an optional text search, all of which must hold.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Criteria {
    #[serde(default)]
    pub filters: Filters,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub bounds: Vec<Bound>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<TextSearch>,
}

impl Criteria {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the equality filters.
    pub fn with_filters(mut self, filters: Filters) -> Self {
        self.filters = filters;
        self
    }

    /// Add an inclusive bound.
    pub fn bound(mut self, bound: Bound) -> Self {
        self.bounds.push(bound);
        self
    }

    /// Set the text search.
    pub fn search(mut self, search: TextSearch) -> Self {
        self.search = Some(search);
        self
    }

    /// Check if nothing is constrained.
    pub fn is_empty(&self) -> bool {
        self.filters.is_empty() && self.bounds.is_empty() && self.search.is_none()
    }

    /// Check whether a JSON row satisfies every part of the selection.
    pub fn matches(&self, row: &Value) -> bool {
        self.filters.matches(row)
            && self.bounds.iter().all(|bound| bound.matches(row))
            && self.search.as_ref().map_or(true, |search| search.matches(row))
    }
}

impl From<Filters> for Criteria {
    fn from(filters: Filters) -> Self {
        Self::new().with_filters(filters)
    }
}

/// A zero-based window of rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Range {
    /// Index of the first row.
    pub offset: u64,
    /// Number of rows requested.
    pub limit: u64,
}

impl Range {
    /// Create a range.
    pub fn new(offset: u64, limit: u64) -> Self {
        Self { offset, limit }
    }

    /// Window for a one-based page number.
    pub fn from_page(page: u32, limit: u32) -> Self {
        let limit = limit as u64;
        Self {
            offset: (page.max(1) as u64 - 1) * limit,
            limit,
        }
    }

    /// Index of the last row requested (inclusive).
    pub fn end_inclusive(&self) -> u64 {
        (self.offset + self.limit).saturating_sub(1)
    }
}

/// A paginated, filtered list request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListQuery {
    /// One-based page number.
    #[serde(default = "default_page")]
    pub page: u32,
    /// Page size.
    #[serde(default = "default_limit")]
    pub limit: u32,
    /// Equality filters applied before pagination.
    #[serde(default)]
    pub filters: Filters,
}

fn default_page() -> u32 {
    1
}

fn default_limit() -> u32 {
    DEFAULT_LIMIT
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            page: default_page(),
            limit: default_limit(),
            filters: Filters::new(),
        }
    }
}

impl ListQuery {
    /// Page 1, ten rows, no filters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the page number.
    pub fn page(mut self, page: u32) -> Self {
        self.page = page;
        self
    }

    /// Set the page size.
    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }

    /// Add an equality filter.
    pub fn filter(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filters.insert(field, value);
        self
    }

    /// Replace all filters.
    pub fn with_filters(mut self, filters: Filters) -> Self {
        self.filters = filters;
        self
    }

    /// Validate the query and compute its row window.
    pub fn range(&self) -> StoreResult<Range> {
        page_range(self.page, self.limit)
    }
}

/// Validate a one-based page and page size and compute the row window.
pub(crate) fn page_range(page: u32, limit: u32) -> StoreResult<Range> {
    if page == 0 {
        return Err(StoreError::Validation("page must be at least 1".to_string()));
    }
    if limit == 0 {
        return Err(StoreError::Validation("limit must be at least 1".to_string()));
    }
    Ok(Range::from_page(page, limit))
}

/// One page of records plus pagination metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    /// Records on this page.
    pub items: Vec<T>,
    /// One-based page number.
    pub page: u32,
    /// Page size.
    pub limit: u32,
    /// Total matching records, when the backend reports it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,
}

impl<T> Page<T> {
    /// Create a page.
    pub fn new(items: Vec<T>, page: u32, limit: u32, total: Option<u64>) -> Self {
        Self {
            items,
            page,
            limit,
            total,
        }
    }

    /// Number of pages, if the total is known.
    pub fn total_pages(&self) -> Option<u64> {
        let limit = self.limit.max(1) as u64;
        self.total.map(|total| total.div_ceil(limit))
    }

    /// One-based index of the first record on this page (0 when empty).
    pub fn first_index(&self) -> u64 {
        if self.items.is_empty() {
            0
        } else {
            (self.page.max(1) as u64 - 1) * self.limit as u64 + 1
        }
    }

    /// One-based index of the last record on this page (0 when empty).
    pub fn last_index(&self) -> u64 {
        if self.items.is_empty() {
            0
        } else {
            self.first_index() + self.items.len() as u64 - 1
        }
    }

    /// Check if a previous page exists.
    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    /// Check if a next page exists.
    ///
    /// Without a total, a full page is assumed to have a successor.
    pub fn has_next(&self) -> bool {
        match self.total_pages() {
            Some(pages) => (self.page as u64) < pages,
            None => self.items.len() as u64 == self.limit as u64,
        }
    }

    /// Check if the page has no records.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Map the records, keeping the metadata.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            page: self.page,
            limit: self.limit,
            total: self.total,
        }
    }
}
