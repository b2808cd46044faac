// crates/statscopy-core/src/runtime/memory.rs
// ============================================================================
// Module: Statscopy In-Memory Backends
// Description: Deterministic in-memory source and sink for tests and demos.
// Purpose: Provide reference implementations without external services.
// Dependencies: crate::{core, interfaces}, serde_json
// ============================================================================

//! ## Overview
//! This module provides in-memory implementations of [`SourceDatabase`] and
//! [`WarehouseSink`] for tests and local demos. They are not intended for
//! production use. The sink coalesces rows by insert id unconditionally,
//! which is the strongest in-window deduplication behaviour, and rejects a
//! whole batch when any row in it fails, so a failed flush leaves no rows
//! behind.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::sync::Arc;
use std::sync::Mutex;

use serde_json::Map;
use serde_json::Value;

use crate::core::ALL_STATS_TABLES;
use crate::core::CancelToken;
use crate::core::INTERVAL_END_PARAM;
use crate::core::IntervalEnd;
use crate::core::StatsTable;
use crate::core::TableRef;
use crate::core::TableSchema;
use crate::core::TableSpec;
use crate::interfaces::MAX_BATCH_ROWS;
use crate::interfaces::QueryStatement;
use crate::interfaces::Row;
use crate::interfaces::RowCursor;
use crate::interfaces::RowFailure;
use crate::interfaces::SinkError;
use crate::interfaces::SinkRow;
use crate::interfaces::SourceDatabase;
use crate::interfaces::SourceError;
use crate::interfaces::WarehouseSink;

// ============================================================================
// SECTION: In-Memory Source
// ============================================================================

/// Maximum query-text bytes the in-memory sink accepts per row.
pub const MAX_TEXT_BYTES: usize = 64 * 1024;

/// In-memory source database for tests and demos.
///
/// Only registered tables exist; querying an unregistered table reports the
/// source's native not-found condition.
#[derive(Debug, Default, Clone)]
pub struct InMemorySource {
    /// Rows per registered source table, keyed by qualified name.
    tables: Arc<Mutex<BTreeMap<&'static str, Vec<Row>>>>,
}

impl InMemorySource {
    /// Creates an empty in-memory source.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a source table without rows.
    pub fn register_table(&self, table: StatsTable) {
        if let Ok(mut guard) = self.tables.lock() {
            guard.entry(table.qualified_name()).or_default();
        }
    }

    /// Registers a source table and appends rows to it.
    pub fn insert_rows(&self, table: StatsTable, rows: impl IntoIterator<Item = Row>) {
        if let Ok(mut guard) = self.tables.lock() {
            guard.entry(table.qualified_name()).or_default().extend(rows);
        }
    }
}

impl SourceDatabase for InMemorySource {
    type Cursor = InMemoryCursor;

    fn single_use_query(
        &self,
        statement: &QueryStatement,
        cancel: &CancelToken,
    ) -> Result<Self::Cursor, SourceError> {
        let table = ALL_STATS_TABLES
            .iter()
            .find(|table| statement.sql.contains(table.qualified_name()))
            .ok_or_else(|| SourceError::Unavailable("unrecognized query text".to_string()))?;
        let param = statement
            .params
            .get(INTERVAL_END_PARAM)
            .ok_or_else(|| SourceError::Unavailable("missing IntervalEnd parameter".to_string()))?;
        let interval_end = IntervalEnd::parse_param(param)
            .map_err(|err| SourceError::Unavailable(err.to_string()))?;

        let guard = self
            .tables
            .lock()
            .map_err(|_| SourceError::Unavailable("source mutex poisoned".to_string()))?;
        let rows = guard
            .get(table.qualified_name())
            .ok_or_else(|| SourceError::NotFound(table.qualified_name().to_string()))?;
        let selected: Vec<Row> = rows
            .iter()
            .filter(|row| {
                row.timestamp("interval_end")
                    .is_ok_and(|epoch| epoch == interval_end.unix_seconds())
            })
            .cloned()
            .collect();
        Ok(InMemoryCursor {
            rows: selected.into_iter(),
            cancel: cancel.clone(),
            stopped: false,
        })
    }
}

/// Cursor over a snapshot of in-memory rows.
#[derive(Debug)]
pub struct InMemoryCursor {
    /// Remaining rows of the snapshot.
    rows: std::vec::IntoIter<Row>,
    /// Cancellation signal observed on every pull.
    cancel: CancelToken,
    /// Whether the cursor was stopped early.
    stopped: bool,
}

impl RowCursor for InMemoryCursor {
    fn next_row(&mut self) -> Result<Option<Row>, SourceError> {
        if self.stopped {
            return Ok(None);
        }
        if self.cancel.is_cancelled() {
            return Err(SourceError::Unavailable("query cancelled".to_string()));
        }
        Ok(self.rows.next())
    }

    fn stop(&mut self) {
        self.stopped = true;
    }
}

// ============================================================================
// SECTION: In-Memory Sink
// ============================================================================

/// State of one in-memory destination table.
#[derive(Debug, Clone)]
struct TableState {
    /// Table specification supplied at creation.
    spec: TableSpec,
    /// Applied rows coalesced by insert id.
    rows: BTreeMap<String, Map<String, Value>>,
}

/// In-memory warehouse sink for tests and demos.
#[derive(Debug, Default, Clone)]
pub struct InMemorySink {
    /// Destination tables by reference.
    tables: Arc<Mutex<BTreeMap<TableRef, TableState>>>,
    /// Insert ids to reject, with their configured causes.
    rejects: Arc<Mutex<BTreeMap<String, String>>>,
    /// Sizes of every acknowledged batch, in order.
    put_sizes: Arc<Mutex<Vec<usize>>>,
}

impl InMemorySink {
    /// Creates an empty in-memory sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the sink to reject a specific insert id.
    pub fn fail_insert_id(&self, insert_id: impl Into<String>, reason: impl Into<String>) {
        if let Ok(mut guard) = self.rejects.lock() {
            guard.insert(insert_id.into(), reason.into());
        }
    }

    /// Returns the number of applied rows in a table.
    #[must_use]
    pub fn row_count(&self, table: &TableRef) -> usize {
        self.tables
            .lock()
            .ok()
            .and_then(|guard| guard.get(table).map(|state| state.rows.len()))
            .unwrap_or(0)
    }

    /// Returns true when a table holds a row with the given insert id.
    #[must_use]
    pub fn contains(&self, table: &TableRef, insert_id: &str) -> bool {
        self.tables
            .lock()
            .ok()
            .and_then(|guard| guard.get(table).map(|state| state.rows.contains_key(insert_id)))
            .unwrap_or(false)
    }

    /// Returns the applied rows of a table in insert-id order.
    #[must_use]
    pub fn rows(&self, table: &TableRef) -> Vec<Map<String, Value>> {
        self.tables
            .lock()
            .ok()
            .and_then(|guard| guard.get(table).map(|state| state.rows.values().cloned().collect()))
            .unwrap_or_default()
    }

    /// Returns the sizes of every acknowledged batch, in arrival order.
    #[must_use]
    pub fn put_sizes(&self) -> Vec<usize> {
        self.put_sizes.lock().map(|guard| guard.clone()).unwrap_or_default()
    }

    /// Returns the populated day partitions of a table, derived from the
    /// `interval_end` column of its applied rows.
    #[must_use]
    pub fn partition_days(&self, table: &TableRef) -> Vec<i64> {
        let days: BTreeSet<i64> = self
            .tables
            .lock()
            .ok()
            .and_then(|guard| {
                guard.get(table).map(|state| {
                    state
                        .rows
                        .values()
                        .filter_map(|row| row.get("interval_end").and_then(Value::as_i64))
                        .map(|epoch| IntervalEnd::from_unix_seconds(epoch).day_index())
                        .collect()
                })
            })
            .unwrap_or_default();
        days.into_iter().collect()
    }

    /// Classifies one incoming row, returning its failure cause when any.
    fn row_failure(&self, row: &SinkRow) -> Option<RowFailure> {
        if let Ok(guard) = self.rejects.lock()
            && let Some(reason) = guard.get(&row.insert_id)
        {
            return Some(RowFailure {
                insert_id: row.insert_id.clone(),
                reason: reason.clone(),
            });
        }
        if let Some(Value::String(text)) = row.columns.get("text")
            && text.len() > MAX_TEXT_BYTES
        {
            return Some(RowFailure {
                insert_id: row.insert_id.clone(),
                reason: format!("text exceeds {MAX_TEXT_BYTES} byte column limit"),
            });
        }
        None
    }
}

impl WarehouseSink for InMemorySink {
    fn create_table(&self, table: &TableRef, spec: &TableSpec) -> Result<(), SinkError> {
        let mut guard = self
            .tables
            .lock()
            .map_err(|_| SinkError::Unavailable("sink mutex poisoned".to_string()))?;
        if guard.contains_key(table) {
            return Err(SinkError::AlreadyExists(table.clone()));
        }
        guard.insert(
            table.clone(),
            TableState {
                spec: spec.clone(),
                rows: BTreeMap::new(),
            },
        );
        Ok(())
    }

    fn update_table(&self, table: &TableRef, schema: &TableSchema) -> Result<(), SinkError> {
        let mut guard = self
            .tables
            .lock()
            .map_err(|_| SinkError::Unavailable("sink mutex poisoned".to_string()))?;
        let state = guard.get_mut(table).ok_or_else(|| SinkError::NotFound(table.clone()))?;
        if !schema.is_superset_of(&state.spec.schema) {
            return Err(SinkError::SchemaConflict {
                table: table.clone(),
                detail: "proposed schema drops or alters existing columns".to_string(),
            });
        }
        state.spec.schema = schema.clone();
        Ok(())
    }

    fn put_rows(
        &self,
        table: &TableRef,
        rows: &[SinkRow],
        cancel: &CancelToken,
    ) -> Result<(), SinkError> {
        if cancel.is_cancelled() {
            return Err(SinkError::Unavailable("put cancelled".to_string()));
        }
        if rows.len() > MAX_BATCH_ROWS {
            return Err(SinkError::BatchTooLarge {
                actual: rows.len(),
                max: MAX_BATCH_ROWS,
            });
        }
        let failures: Vec<RowFailure> = rows.iter().filter_map(|row| self.row_failure(row)).collect();
        if !failures.is_empty() {
            return Err(SinkError::RowFailures(failures));
        }
        let mut guard = self
            .tables
            .lock()
            .map_err(|_| SinkError::Unavailable("sink mutex poisoned".to_string()))?;
        let state = guard.get_mut(table).ok_or_else(|| SinkError::NotFound(table.clone()))?;
        for row in rows {
            state.rows.insert(row.insert_id.clone(), row.columns.clone());
        }
        drop(guard);
        if let Ok(mut sizes) = self.put_sizes.lock() {
            sizes.push(rows.len());
        }
        Ok(())
    }
}
