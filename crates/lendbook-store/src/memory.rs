//! In-memory backend for development and testing.

use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{Map, Value};

use crate::backend::{Backend, BackendError, FailureKind, Rows};
use crate::query::{Criteria, Range};
use crate::record::RecordId;

/// Number of calls received per backend operation.
///
/// Failed attempts count too, so a retried call shows up once per attempt.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallCounts {
    pub insert: u32,
    pub select_by_id: u32,
    pub select_range: u32,
    pub update: u32,
    pub delete: u32,
}

impl CallCounts {
    /// Total calls across all operations.
    pub fn total(&self) -> u32 {
        self.insert + self.select_by_id + self.select_range + self.update + self.delete
    }
}

#[derive(Debug, Default)]
struct MemoryState {
    tables: HashMap<String, Vec<Map<String, Value>>>,
    calls: CallCounts,
    ranges: Vec<Range>,
    failures: VecDeque<BackendError>,
}

/// Backend keeping tables of JSON rows in memory.
///
/// Assigns UUID ids and RFC 3339 `created_at`/`updated_at` on insert, keeps
/// rows in insertion order, and reports an exact total for range selects.
/// Failures can be scripted with [`MemoryBackend::fail_next`].
#[derive(Debug, Default)]
pub struct MemoryBackend {
    state: Mutex<MemoryState>,
    latency: Duration,
}

impl MemoryBackend {
    /// Create an empty backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay every call by `latency` before it is served.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Make the next `n` calls fail with an error of `kind`.
    pub fn fail_next(&self, n: usize, kind: FailureKind) {
        let mut state = self.state();
        for i in 0..n {
            state.failures.push_back(BackendError {
                message: format!("simulated failure {}", i + 1),
                code: None,
                kind,
            });
        }
    }

    /// Make the next call fail with `error`.
    pub fn fail_next_with(&self, error: BackendError) {
        self.state().failures.push_back(error);
    }

    /// Insert rows as-is, without assigning ids or timestamps.
    pub fn seed(&self, table: &str, rows: impl IntoIterator<Item = Value>) {
        let mut state = self.state();
        let stored = state.tables.entry(table.to_string()).or_default();
        stored.extend(rows.into_iter().filter_map(|row| match row {
            Value::Object(map) => Some(map),
            _ => None,
        }));
    }

    /// Snapshot of every row in `table`.
    pub fn rows(&self, table: &str) -> Vec<Value> {
        self.state()
            .tables
            .get(table)
            .map(|rows| rows.iter().cloned().map(Value::Object).collect())
            .unwrap_or_default()
    }

    /// Calls received so far.
    pub fn calls(&self) -> CallCounts {
        self.state().calls
    }

    /// Every range requested by `select_range`, in order.
    pub fn requested_ranges(&self) -> Vec<Range> {
        self.state().ranges.clone()
    }

    /// Reset call counters and recorded ranges.
    pub fn reset_calls(&self) {
        let mut state = self.state();
        state.calls = CallCounts::default();
        state.ranges.clear();
    }

    fn state(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    async fn simulate_latency(&self) {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }

    fn begin(
        &self,
        count: impl FnOnce(&mut CallCounts),
    ) -> Result<MutexGuard<'_, MemoryState>, BackendError> {
        let mut state = self.state();
        count(&mut state.calls);
        match state.failures.pop_front() {
            Some(error) => Err(error),
            None => Ok(state),
        }
    }
}

fn row_id(row: &Map<String, Value>) -> Option<&str> {
    row.get("id").and_then(Value::as_str)
}

#[async_trait]
impl Backend for MemoryBackend {
    async fn insert_one(&self, table: &str, row: Value) -> Result<Value, BackendError> {
        self.simulate_latency().await;
        let mut state = self.begin(|c| c.insert += 1)?;

        let Value::Object(mut row) = row else {
            return Err(BackendError::permanent("row must be a JSON object"));
        };
        let now = Value::String(Utc::now().to_rfc3339());
        row.entry("id")
            .or_insert_with(|| Value::String(RecordId::generate().into_inner()));
        row.entry("created_at").or_insert_with(|| now.clone());
        row.entry("updated_at").or_insert(now);

        let rows = state.tables.entry(table.to_string()).or_default();
        if let Some(id) = row_id(&row) {
            if rows.iter().any(|existing| row_id(existing) == Some(id)) {
                return Err(BackendError::permanent(format!(
                    "duplicate key value violates unique constraint \"{}_pkey\"",
                    table
                ))
                .with_code("23505"));
            }
        }
        rows.push(row.clone());
        Ok(Value::Object(row))
    }

    async fn select_by_id(
        &self,
        table: &str,
        id: &RecordId,
    ) -> Result<Option<Value>, BackendError> {
        self.simulate_latency().await;
        let state = self.begin(|c| c.select_by_id += 1)?;

        Ok(state.tables.get(table).and_then(|rows| {
            rows.iter()
                .find(|row| row_id(row) == Some(id.as_str()))
                .cloned()
                .map(Value::Object)
        }))
    }

    async fn select_range(
        &self,
        table: &str,
        criteria: &Criteria,
        range: Range,
    ) -> Result<Rows, BackendError> {
        self.simulate_latency().await;
        let mut state = self.begin(|c| c.select_range += 1)?;
        state.ranges.push(range);

        let matching: Vec<Value> = state
            .tables
            .get(table)
            .map(|rows| {
                rows.iter()
                    .cloned()
                    .map(Value::Object)
                    .filter(|row| criteria.matches(row))
                    .collect()
            })
            .unwrap_or_default();

        let total = matching.len() as u64;
        let window = matching
            .into_iter()
            .skip(range.offset as usize)
            .take(range.limit as usize)
            .collect();

        Ok(Rows::new(window).with_total(total))
    }

    async fn update_by_id(
        &self,
        table: &str,
        id: &RecordId,
        patch: Value,
    ) -> Result<Option<Value>, BackendError> {
        self.simulate_latency().await;
        let mut state = self.begin(|c| c.update += 1)?;

        let Value::Object(patch) = patch else {
            return Err(BackendError::permanent("patch must be a JSON object"));
        };
        let Some(row) = state
            .tables
            .get_mut(table)
            .and_then(|rows| rows.iter_mut().find(|row| row_id(row) == Some(id.as_str())))
        else {
            return Ok(None);
        };

        for (key, value) in patch {
            if key != "id" {
                row.insert(key, value);
            }
        }
        row.insert(
            "updated_at".to_string(),
            Value::String(Utc::now().to_rfc3339()),
        );
        Ok(Some(Value::Object(row.clone())))
    }

    async fn delete_by_id(&self, table: &str, id: &RecordId) -> Result<(), BackendError> {
        self.simulate_latency().await;
        let mut state = self.begin(|c| c.delete += 1)?;

        if let Some(rows) = state.tables.get_mut(table) {
            rows.retain(|row| row_id(row) != Some(id.as_str()));
        }
        Ok(())
    }
}
