// crates/statscopy-core/tests/memory_sink.rs
// ============================================================================
// Module: In-Memory Sink Tests
// Description: Tests for the reference warehouse sink implementation.
// Purpose: Validate table lifecycle, batch limits, and coalescing.
// Dependencies: statscopy-core, serde_json
// ============================================================================
//! ## Overview
//! The in-memory sink is the reference for warehouse semantics: create is
//! first-writer-wins, update enforces additive evolution, puts are all-or-
//! nothing per batch, and applied rows coalesce on their idempotence keys.

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

use serde_json::Map;
use serde_json::Value;
use serde_json::json;
use statscopy_core::CancelToken;
use statscopy_core::FieldSchema;
use statscopy_core::FieldType;
use statscopy_core::InMemorySink;
use statscopy_core::MAX_BATCH_ROWS;
use statscopy_core::MAX_TEXT_BYTES;
use statscopy_core::SinkError;
use statscopy_core::SinkRow;
use statscopy_core::StatsKind;
use statscopy_core::TableRef;
use statscopy_core::TableWriter;
use statscopy_core::WarehouseSink;
use statscopy_core::schema_for;
use statscopy_core::table_spec_for;

/// Destination used across the tests.
fn dest() -> TableRef {
    TableRef::new("reporting", "spanner_stats", "query_stats")
}

/// Creates a sink with the query-family destination table ready.
fn sink_with_table() -> InMemorySink {
    let sink = InMemorySink::new();
    sink.create_table(&dest(), &table_spec_for(StatsKind::Query)).unwrap();
    sink
}

/// Builds a minimal sink row with the given key and window.
fn sink_row(insert_id: &str, epoch: i64) -> SinkRow {
    let mut columns = Map::new();
    columns.insert("interval_end".to_string(), json!(epoch));
    columns.insert("text".to_string(), json!("SELECT 1"));
    SinkRow {
        insert_id: insert_id.to_string(),
        columns,
    }
}

/// Verifies a destination reference exposes its parts and a dotted form.
#[test]
fn destination_reference_parts() {
    let table = dest();
    assert_eq!(table.project.as_str(), "reporting");
    assert_eq!(table.dataset.as_str(), "spanner_stats");
    assert_eq!(table.table.as_str(), "query_stats");
    assert_eq!(table.to_string(), "reporting.spanner_stats.query_stats");
}

/// Verifies table creation is first-writer-wins.
#[test]
fn create_table_twice_reports_already_exists() {
    let sink = sink_with_table();
    let err = sink.create_table(&dest(), &table_spec_for(StatsKind::Query)).unwrap_err();
    assert!(matches!(err, SinkError::AlreadyExists(table) if table == dest()));
}

/// Verifies updating an absent table reports not-found.
#[test]
fn update_missing_table_reports_not_found() {
    let sink = InMemorySink::new();
    let err = sink.update_table(&dest(), &schema_for(StatsKind::Query)).unwrap_err();
    assert!(matches!(err, SinkError::NotFound(table) if table == dest()));
}

/// Verifies an additive schema change is accepted and a drop is refused.
#[test]
fn update_table_enforces_additive_evolution() {
    let sink = sink_with_table();

    let mut widened = schema_for(StatsKind::Query);
    widened.fields.push(FieldSchema::required("avg_retry_delay_seconds", FieldType::Float64));
    sink.update_table(&dest(), &widened).unwrap();

    let mut narrowed = schema_for(StatsKind::Query);
    narrowed.fields.pop();
    let err = sink.update_table(&dest(), &narrowed).unwrap_err();
    assert!(matches!(err, SinkError::SchemaConflict { .. }));
}

/// Verifies the maintenance entry point creates a missing table and evolves
/// an existing one.
#[test]
fn ensure_table_creates_then_updates() {
    let sink = InMemorySink::new();
    let writer = TableWriter::new(sink.clone());
    writer.ensure_table(StatsKind::Query, &dest()).unwrap();
    writer.ensure_table(StatsKind::Query, &dest()).unwrap();
    assert_eq!(sink.row_count(&dest()), 0);
}

/// Verifies puts against an absent table report not-found.
#[test]
fn put_rows_to_missing_table_reports_not_found() {
    let sink = InMemorySink::new();
    let rows = vec![sink_row("GCPBOX_SpannerQueryStat-_-60-_-1", 60)];
    let err = sink.put_rows(&dest(), &rows, &CancelToken::new()).unwrap_err();
    assert!(matches!(err, SinkError::NotFound(table) if table == dest()));
}

/// Verifies the sink refuses batches above the row limit.
#[test]
fn put_rows_rejects_oversized_batch() {
    let sink = sink_with_table();
    let rows: Vec<SinkRow> = (0..=MAX_BATCH_ROWS)
        .map(|index| sink_row(&format!("GCPBOX_SpannerQueryStat-_-60-_-{index}"), 60))
        .collect();
    let err = sink.put_rows(&dest(), &rows, &CancelToken::new()).unwrap_err();
    assert_eq!(
        err,
        SinkError::BatchTooLarge {
            actual: MAX_BATCH_ROWS + 1,
            max: MAX_BATCH_ROWS,
        }
    );
    assert_eq!(sink.row_count(&dest()), 0);
}

/// Verifies repeated puts of the same key coalesce to one applied row.
#[test]
fn put_rows_coalesces_on_insert_id() {
    let sink = sink_with_table();
    let rows = vec![sink_row("GCPBOX_SpannerQueryStat-_-60-_-1", 60)];
    sink.put_rows(&dest(), &rows, &CancelToken::new()).unwrap();
    sink.put_rows(&dest(), &rows, &CancelToken::new()).unwrap();

    assert_eq!(sink.row_count(&dest()), 1);
    assert_eq!(sink.put_sizes(), vec![1, 1]);
}

/// Verifies one oversized text cell rejects the entire batch.
#[test]
fn oversized_text_rejects_whole_batch() {
    let sink = sink_with_table();
    let mut big = sink_row("GCPBOX_SpannerQueryStat-_-60-_-2", 60);
    big.columns.insert("text".to_string(), Value::String("x".repeat(MAX_TEXT_BYTES + 1)));
    let rows = vec![sink_row("GCPBOX_SpannerQueryStat-_-60-_-1", 60), big];

    let err = sink.put_rows(&dest(), &rows, &CancelToken::new()).unwrap_err();
    let SinkError::RowFailures(failures) = err else {
        panic!("expected row failures, got {err:?}");
    };
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].insert_id, "GCPBOX_SpannerQueryStat-_-60-_-2");
    assert_eq!(sink.row_count(&dest()), 0);
}

/// Verifies a cancelled token fails the put before any row is applied.
#[test]
fn put_rows_observes_cancellation() {
    let sink = sink_with_table();
    let token = CancelToken::new();
    token.cancel();
    let rows = vec![sink_row("GCPBOX_SpannerQueryStat-_-60-_-1", 60)];
    let err = sink.put_rows(&dest(), &rows, &token).unwrap_err();
    assert!(matches!(err, SinkError::Unavailable(_)));
    assert_eq!(sink.row_count(&dest()), 0);
}

/// Verifies rows land in day partitions derived from their window.
#[test]
fn rows_partition_by_interval_end_day() {
    let sink = sink_with_table();
    let day_zero = 60;
    let day_one = 86_400 + 60;
    let rows = vec![
        sink_row("GCPBOX_SpannerQueryStat-_-60-_-1", day_zero),
        sink_row("GCPBOX_SpannerQueryStat-_-86460-_-1", day_one),
    ];
    sink.put_rows(&dest(), &rows, &CancelToken::new()).unwrap();

    assert_eq!(sink.partition_days(&dest()), vec![0, 1]);
}
