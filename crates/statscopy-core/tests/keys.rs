// crates/statscopy-core/tests/keys.rs
// ============================================================================
// Module: Idempotence Key Tests
// Description: Tests for deterministic idempotence key derivation.
// Purpose: Pin the exact key formats the sink's deduplication relies on.
// Dependencies: statscopy-core
// ============================================================================
//! ## Overview
//! The literal key prefixes and segment layout are part of the deduplication
//! contract; these tests pin them byte for byte and verify the required-field
//! invariants that gate key derivation.

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

use statscopy_core::IntervalEnd;
use statscopy_core::LockStat;
use statscopy_core::QueryStat;
use statscopy_core::ReadStat;
use statscopy_core::RecordError;
use statscopy_core::SampleLockRequest;
use statscopy_core::StatsKind;
use statscopy_core::StatsRecord;
use statscopy_core::TxnStat;

/// Builds a query stat with the given window and fingerprint.
fn query_stat(epoch: i64, fingerprint: i64) -> QueryStat {
    QueryStat {
        interval_end: IntervalEnd::from_unix_seconds(epoch),
        text: "SELECT 1".to_string(),
        text_truncated: false,
        text_fingerprint: fingerprint,
        execution_count: 12,
        avg_latency_seconds: 0.25,
        avg_rows: 3.0,
        avg_bytes: 128.0,
        avg_rows_scanned: 9.0,
        avg_cpu_seconds: 0.02,
        all_failed_execution_count: 1,
        all_failed_avg_latency_seconds: 0.75,
        cancelled_or_disconnected_execution_count: 0,
        timed_out_execution_count: 0,
    }
}

/// Builds a transaction stat with the given window and fingerprint.
fn txn_stat(epoch: i64, fprint: i64) -> TxnStat {
    TxnStat {
        interval_end: IntervalEnd::from_unix_seconds(epoch),
        fprint,
        read_columns: vec!["albums.title".to_string()],
        write_constructive_columns: vec!["albums.rating".to_string()],
        write_delete_tables: Vec::new(),
        commit_attempt_count: 7,
        commit_abort_count: 1,
        commit_retry_count: 1,
        commit_failed_precondition_count: 0,
        avg_participants: 1.5,
        avg_total_latency_seconds: 0.2,
        avg_commit_latency_seconds: 0.1,
        avg_bytes: 256.0,
    }
}

/// Builds a lock stat with the given window and start key.
fn lock_stat(epoch: i64, start_key: Vec<u8>) -> LockStat {
    LockStat {
        interval_end: IntervalEnd::from_unix_seconds(epoch),
        row_range_start_key: start_key,
        lock_wait_seconds: 4.5,
        sample_lock_requests: vec![SampleLockRequest {
            lock_mode: "Exclusive".to_string(),
            column: "albums.rating".to_string(),
        }],
    }
}

/// Verifies the query key layout for the 2020-08-20T01:01:00Z window.
#[test]
fn query_key_matches_contract() {
    let record = StatsRecord::Query(query_stat(1_597_885_260, 77));
    assert_eq!(record.insert_id().unwrap(), "GCPBOX_SpannerQueryStat-_-1597885260-_-77");
}

/// Verifies the transaction key layout for the 2023-01-01T00:00:00Z window.
#[test]
fn txn_key_matches_contract() {
    let record = StatsRecord::Txn(txn_stat(1_672_531_200, 42));
    assert_eq!(record.insert_id().unwrap(), "GCPBOX_SpannerTxStat-_-1672531200-_-42");
}

/// Verifies the read key layout.
#[test]
fn read_key_matches_contract() {
    let record = StatsRecord::Read(ReadStat {
        interval_end: IntervalEnd::from_unix_seconds(1_672_531_200),
        read_columns: vec!["albums.title".to_string()],
        fprint: -9,
        execution_count: 2,
        avg_rows: 1.0,
        avg_bytes: 64.0,
        avg_cpu_seconds: 0.01,
        avg_locking_delay_seconds: 0.0,
        avg_client_wait_seconds: 0.0,
        avg_leader_refresh_delay_seconds: 0.0,
    });
    assert_eq!(record.insert_id().unwrap(), "GCPBOX_SpannerReadStat-_-1672531200-_--9");
}

/// Verifies the lock key uses URL-safe base64 of the start key.
#[test]
fn lock_key_encodes_start_key() {
    let record = StatsRecord::Lock(lock_stat(1_672_531_200, b"userkey1".to_vec()));
    assert_eq!(
        record.insert_id().unwrap(),
        "GCPBOX_SpannerLockStat-_-1672531200-_-dXNlcmtleTE="
    );
}

/// Verifies an empty start key still yields a well-formed key.
#[test]
fn lock_key_allows_empty_start_key() {
    let record = StatsRecord::Lock(lock_stat(1_672_531_200, Vec::new()));
    assert_eq!(record.insert_id().unwrap(), "GCPBOX_SpannerLockStat-_-1672531200-_-");
}

/// Verifies equal content yields equal keys.
#[test]
fn keys_are_deterministic() {
    let a = StatsRecord::Txn(txn_stat(1_672_531_200, 42));
    let b = StatsRecord::Txn(txn_stat(1_672_531_200, 42));
    assert_eq!(a.insert_id().unwrap(), b.insert_id().unwrap());
}

/// Verifies a zero interval end is rejected before key derivation.
#[test]
fn zero_interval_end_is_rejected() {
    let record = StatsRecord::Query(query_stat(0, 77));
    assert_eq!(
        record.insert_id(),
        Err(RecordError::MissingIntervalEnd {
            kind: StatsKind::Query,
        })
    );
}

/// Verifies a zero fingerprint is rejected for fingerprinted families.
#[test]
fn zero_fingerprint_is_rejected() {
    let query = StatsRecord::Query(query_stat(1_672_531_200, 0));
    assert_eq!(
        query.insert_id(),
        Err(RecordError::MissingFingerprint {
            kind: StatsKind::Query,
        })
    );

    let txn = StatsRecord::Txn(txn_stat(1_672_531_200, 0));
    assert_eq!(
        txn.insert_id(),
        Err(RecordError::MissingFingerprint {
            kind: StatsKind::Txn,
        })
    );
}

/// Verifies the sink-row mapping carries the window as epoch seconds.
#[test]
fn sink_row_carries_epoch_interval_end() {
    let record = StatsRecord::Txn(txn_stat(1_672_531_200, 42));
    let row = record.to_row();
    assert_eq!(row.get("interval_end").and_then(serde_json::Value::as_i64), Some(1_672_531_200));
    assert_eq!(row.get("fprint").and_then(serde_json::Value::as_i64), Some(42));
    assert_eq!(row.len(), 13);
}
