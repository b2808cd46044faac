// crates/statscopy-core/src/core/query.rs
// ============================================================================
// Module: Statscopy Query Templates
// Description: Static per-family introspection queries.
// Purpose: Produce the single source query and its bound parameter.
// Dependencies: crate::core
// ============================================================================

//! ## Overview
//! Each family reads one fixed projection from its source table, filtered to a
//! single `interval_end`. The family-to-query mapping is a static table, not a
//! templating engine: the only substitutions are the source table name and the
//! `@IntervalEnd` parameter bound at execution time.
//!
//! The projection lists are part of the source contract. The decoder binds by
//! column name, but the lists must contain exactly the columns of the
//! destination schemas, no more, no less.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use crate::core::family::StatsKind;
use crate::core::family::StatsTable;
use crate::core::time::IntervalEnd;
use crate::core::time::IntervalEndError;

// ============================================================================
// SECTION: Projection Lists
// ============================================================================

/// Query-family projection, in destination-schema order.
pub const QUERY_STAT_COLUMNS: [&str; 14] = [
    "interval_end",
    "text",
    "text_truncated",
    "text_fingerprint",
    "execution_count",
    "avg_latency_seconds",
    "avg_rows",
    "avg_bytes",
    "avg_rows_scanned",
    "avg_cpu_seconds",
    "all_failed_execution_count",
    "all_failed_avg_latency_seconds",
    "cancelled_or_disconnected_execution_count",
    "timed_out_execution_count",
];

/// Read-family projection, in destination-schema order.
pub const READ_STAT_COLUMNS: [&str; 10] = [
    "interval_end",
    "read_columns",
    "fprint",
    "execution_count",
    "avg_rows",
    "avg_bytes",
    "avg_cpu_seconds",
    "avg_locking_delay_seconds",
    "avg_client_wait_seconds",
    "avg_leader_refresh_delay_seconds",
];

/// Transaction-family projection, in destination-schema order.
pub const TXN_STAT_COLUMNS: [&str; 13] = [
    "interval_end",
    "fprint",
    "read_columns",
    "write_constructive_columns",
    "write_delete_tables",
    "commit_attempt_count",
    "commit_abort_count",
    "commit_retry_count",
    "commit_failed_precondition_count",
    "avg_participants",
    "avg_total_latency_seconds",
    "avg_commit_latency_seconds",
    "avg_bytes",
];

/// Lock-family projection, in destination-schema order.
pub const LOCK_STAT_COLUMNS: [&str; 4] =
    ["interval_end", "row_range_start_key", "lock_wait_seconds", "sample_lock_requests"];

/// Returns the projection list for one family.
#[must_use]
pub const fn columns_for(kind: StatsKind) -> &'static [&'static str] {
    match kind {
        StatsKind::Query => &QUERY_STAT_COLUMNS,
        StatsKind::Read => &READ_STAT_COLUMNS,
        StatsKind::Txn => &TXN_STAT_COLUMNS,
        StatsKind::Lock => &LOCK_STAT_COLUMNS,
    }
}

// ============================================================================
// SECTION: Query Building
// ============================================================================

/// Name of the interval-end query parameter.
pub const INTERVAL_END_PARAM: &str = "IntervalEnd";

/// Builds the introspection query text for one source table.
#[must_use]
pub fn build_query(table: StatsTable) -> String {
    let columns = columns_for(table.kind()).join(", ");
    format!(
        "SELECT {columns} FROM {table} WHERE interval_end = TIMESTAMP(@{INTERVAL_END_PARAM}, \"UTC\")",
        table = table.qualified_name(),
    )
}

/// Binds the interval-end parameter to its `YYYY-MM-DD HH:MM:SS` UTC text.
///
/// # Errors
///
/// Returns [`IntervalEndError`] when the instant cannot be rendered.
pub fn bind_interval_end(
    interval_end: IntervalEnd,
) -> Result<BTreeMap<String, String>, IntervalEndError> {
    let mut params = BTreeMap::new();
    params.insert(INTERVAL_END_PARAM.to_string(), interval_end.to_param()?);
    Ok(params)
}
