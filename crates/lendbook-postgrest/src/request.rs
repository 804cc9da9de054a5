//! Request plans for table operations.
//!
//! A [`TableRequest`] is everything needed to issue one call against
//! `{rest_url}/{table}`, built without touching the network so the query
//! dialect can be checked in isolation.

use lendbook_store::{Bound, Criteria, Range, RecordId, TextSearch};
use reqwest::Method;
use serde_json::Value;

/// `Prefer` value asking for the affected rows in the response body.
pub const RETURN_REPRESENTATION: &str = "return=representation";

/// `Prefer` value asking for an exact `Content-Range` total.
pub const COUNT_EXACT: &str = "count=exact";

/// One call against a table endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct TableRequest {
    pub method: Method,
    pub table: String,
    pub query: Vec<(String, String)>,
    pub prefer: Vec<&'static str>,
    pub body: Option<Value>,
}

impl TableRequest {
    fn new(method: Method, table: &str) -> Self {
        Self {
            method,
            table: table.to_string(),
            query: Vec::new(),
            prefer: Vec::new(),
            body: None,
        }
    }

    fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    fn prefer(mut self, value: &'static str) -> Self {
        self.prefer.push(value);
        self
    }

    fn json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    fn id_filter(self, id: &RecordId) -> Self {
        self.param("id", format!("eq.{}", id))
    }

    /// `POST /{table}` returning the inserted row.
    pub fn insert(table: &str, row: Value) -> Self {
        Self::new(Method::POST, table)
            .prefer(RETURN_REPRESENTATION)
            .json(row)
    }

    /// `GET /{table}?select=*&id=eq.{id}`.
    pub fn select_by_id(table: &str, id: &RecordId) -> Self {
        Self::new(Method::GET, table)
            .param("select", "*")
            .id_filter(id)
    }

    /// `GET /{table}` with filters, bounds, an optional `or` search, a row
    /// window and an exact count.
    pub fn select_range(
        table: &str,
        criteria: &Criteria,
        range: Range,
        order: Option<&str>,
    ) -> Self {
        let mut request = Self::new(Method::GET, table)
            .param("select", "*")
            .prefer(COUNT_EXACT);
        for (field, value) in criteria.filters.iter() {
            request = request.param(field, filter_value(value));
        }
        for bound in &criteria.bounds {
            request = request.param(bound.field.as_str(), bound_value(bound));
        }
        if let Some(search) = &criteria.search {
            request = request.param("or", search_clause(search));
        }
        if let Some(order) = order {
            request = request.param("order", order);
        }
        request
            .param("offset", range.offset.to_string())
            .param("limit", range.limit.to_string())
    }

    /// `PATCH /{table}?id=eq.{id}` returning the updated row.
    pub fn update_by_id(table: &str, id: &RecordId, patch: Value) -> Self {
        Self::new(Method::PATCH, table)
            .id_filter(id)
            .prefer(RETURN_REPRESENTATION)
            .json(patch)
    }

    /// `DELETE /{table}?id=eq.{id}`.
    pub fn delete_by_id(table: &str, id: &RecordId) -> Self {
        Self::new(Method::DELETE, table).id_filter(id)
    }

    /// Value of the `Prefer` header, if any.
    pub fn prefer_header(&self) -> Option<String> {
        if self.prefer.is_empty() {
            None
        } else {
            Some(self.prefer.join(","))
        }
    }

    /// Whether the body is written to the target schema.
    pub fn writes(&self) -> bool {
        self.method != Method::GET
    }
}

/// Render an equality constraint in the PostgREST operator syntax.
///
/// Strings are passed verbatim; `null` becomes `is.null`.
pub fn filter_value(value: &Value) -> String {
    match value {
        Value::Null => "is.null".to_string(),
        other => format!("eq.{}", scalar(other)),
    }
}

/// Render an inclusive bound, e.g. `gte.650`.
pub fn bound_value(bound: &Bound) -> String {
    format!("{}.{}", bound.comparison.as_str(), scalar(&bound.value))
}

/// Render a text search as the body of an `or` parameter:
/// `(firstname.ilike.*ada*,email.ilike.*ada*)`.
///
/// Terms containing characters reserved by the `or` grammar are double-quoted.
pub fn search_clause(search: &TextSearch) -> String {
    let pattern = format!("*{}*", search.term);
    let pattern = if pattern.contains([',', '(', ')', '"', '\\', ':']) {
        format!("\"{}\"", pattern.replace('\\', "\\\\").replace('"', "\\\""))
    } else {
        pattern
    };
    let clauses: Vec<String> = search
        .fields
        .iter()
        .map(|field| format!("{}.ilike.{}", field, pattern))
        .collect();
    format!("({})", clauses.join(","))
}

fn scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
