// crates/statscopy-core/tests/query.rs
// ============================================================================
// Module: Query Template Tests
// Description: Tests for the static per-family introspection queries.
// Purpose: Pin query text, projection lists, and parameter formatting.
// Dependencies: statscopy-core
// ============================================================================
//! ## Overview
//! The query skeleton and projection lists are emitted verbatim to the
//! source, so these tests compare full query strings and the exact
//! `@IntervalEnd` parameter text.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

use statscopy_core::ALL_STATS_TABLES;
use statscopy_core::IntervalEnd;
use statscopy_core::StatsKind;
use statscopy_core::StatsTable;
use statscopy_core::bind_interval_end;
use statscopy_core::build_query;
use statscopy_core::columns_for;
use time::macros::datetime;

/// Verifies the full query text for the minute query-stats table.
#[test]
fn query_family_query_text() {
    let expected = concat!(
        "SELECT interval_end, text, text_truncated, text_fingerprint, execution_count, ",
        "avg_latency_seconds, avg_rows, avg_bytes, avg_rows_scanned, avg_cpu_seconds, ",
        "all_failed_execution_count, all_failed_avg_latency_seconds, ",
        "cancelled_or_disconnected_execution_count, timed_out_execution_count ",
        "FROM spanner_sys.query_stats_top_minute ",
        "WHERE interval_end = TIMESTAMP(@IntervalEnd, \"UTC\")",
    );
    assert_eq!(build_query(StatsTable::QueryStatsTopMinute), expected);
}

/// Verifies the full query text for the hourly lock-stats table.
#[test]
fn lock_family_query_text() {
    let expected = concat!(
        "SELECT interval_end, row_range_start_key, lock_wait_seconds, sample_lock_requests ",
        "FROM spanner_sys.lock_stats_total_hour ",
        "WHERE interval_end = TIMESTAMP(@IntervalEnd, \"UTC\")",
    );
    assert_eq!(build_query(StatsTable::LockStatsTotalHour), expected);
}

/// Verifies every source table produces a query against its own name.
#[test]
fn every_table_queries_its_own_name() {
    for table in ALL_STATS_TABLES {
        let sql = build_query(table);
        assert!(sql.contains(table.qualified_name()), "query for {table} misses its table name");
        assert!(sql.ends_with("TIMESTAMP(@IntervalEnd, \"UTC\")"));
    }
}

/// Verifies the projection lists have the documented sizes.
#[test]
fn projection_sizes_are_closed() {
    assert_eq!(columns_for(StatsKind::Query).len(), 14);
    assert_eq!(columns_for(StatsKind::Read).len(), 10);
    assert_eq!(columns_for(StatsKind::Txn).len(), 13);
    assert_eq!(columns_for(StatsKind::Lock).len(), 4);
}

/// Verifies the interval-end parameter text for a known instant.
#[test]
fn interval_end_parameter_text() {
    let params = bind_interval_end(IntervalEnd::from_unix_seconds(1_597_885_260)).unwrap();
    assert_eq!(params.get("IntervalEnd").map(String::as_str), Some("2020-08-20 01:01:00"));
}

/// Verifies a calendar instant and raw unix seconds name the same window.
#[test]
fn interval_end_from_calendar_instant() {
    let from_instant = IntervalEnd::from_datetime(datetime!(2020-08-20 01:01:00 UTC));
    assert_eq!(from_instant, IntervalEnd::from_unix_seconds(1_597_885_260));
    assert_eq!(from_instant.to_param().unwrap(), "2020-08-20 01:01:00");
}

/// Verifies parameter text parses back to the same instant.
#[test]
fn interval_end_parameter_roundtrip() {
    let interval_end = IntervalEnd::from_unix_seconds(1_672_531_200);
    let text = interval_end.to_param().unwrap();
    assert_eq!(text, "2023-01-01 00:00:00");
    assert_eq!(IntervalEnd::parse_param(&text).unwrap(), interval_end);
}

/// Verifies each granularity maps to its family shape.
#[test]
fn tables_collapse_to_four_kinds() {
    assert_eq!(StatsTable::QueryStatsTop10Minute.kind(), StatsKind::Query);
    assert_eq!(StatsTable::ReadStatsTopHour.kind(), StatsKind::Read);
    assert_eq!(StatsTable::TxnStatsTopMinute.kind(), StatsKind::Txn);
    assert_eq!(StatsTable::LockStatsTotal10Minute.kind(), StatsKind::Lock);
}
