// crates/statscopy-core/tests/proptest_keys.rs
// ============================================================================
// Module: Idempotence Key Property-Based Tests
// Description: Property tests for key determinism and layout stability.
// Purpose: Detect panics and invariants across wide input ranges.
// ============================================================================

//! Property-based tests for idempotence key invariants.

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
    reason = "Test-only assertions and helpers are permitted."
)]

use proptest::prelude::*;
use statscopy_core::IntervalEnd;
use statscopy_core::LockStat;
use statscopy_core::QueryStat;
use statscopy_core::StatsRecord;
use statscopy_core::TxnStat;

fn query_record(epoch: i64, fingerprint: i64, text: String) -> StatsRecord {
    StatsRecord::Query(QueryStat {
        interval_end: IntervalEnd::from_unix_seconds(epoch),
        text,
        text_truncated: false,
        text_fingerprint: fingerprint,
        execution_count: 1,
        avg_latency_seconds: 0.0,
        avg_rows: 0.0,
        avg_bytes: 0.0,
        avg_rows_scanned: 0.0,
        avg_cpu_seconds: 0.0,
        all_failed_execution_count: 0,
        all_failed_avg_latency_seconds: 0.0,
        cancelled_or_disconnected_execution_count: 0,
        timed_out_execution_count: 0,
    })
}

fn txn_record(epoch: i64, fprint: i64) -> StatsRecord {
    StatsRecord::Txn(TxnStat {
        interval_end: IntervalEnd::from_unix_seconds(epoch),
        fprint,
        read_columns: Vec::new(),
        write_constructive_columns: Vec::new(),
        write_delete_tables: Vec::new(),
        commit_attempt_count: 0,
        commit_abort_count: 0,
        commit_retry_count: 0,
        commit_failed_precondition_count: 0,
        avg_participants: 0.0,
        avg_total_latency_seconds: 0.0,
        avg_commit_latency_seconds: 0.0,
        avg_bytes: 0.0,
    })
}

fn lock_record(epoch: i64, start_key: Vec<u8>) -> StatsRecord {
    StatsRecord::Lock(LockStat {
        interval_end: IntervalEnd::from_unix_seconds(epoch),
        row_range_start_key: start_key,
        lock_wait_seconds: 0.0,
        sample_lock_requests: Vec::new(),
    })
}

proptest! {
    #[test]
    fn query_key_depends_only_on_window_and_fingerprint(
        epoch in 1i64..=4_102_444_800,
        fingerprint in prop::num::i64::ANY.prop_filter("nonzero", |f| *f != 0),
        text_a in ".{0,32}",
        text_b in ".{0,32}",
    ) {
        let a = query_record(epoch, fingerprint, text_a);
        let b = query_record(epoch, fingerprint, text_b);
        prop_assert_eq!(a.insert_id().unwrap(), b.insert_id().unwrap());
    }

    #[test]
    fn txn_key_has_three_segments(
        epoch in 1i64..=4_102_444_800,
        fprint in prop::num::i64::ANY.prop_filter("nonzero", |f| *f != 0),
    ) {
        let key = txn_record(epoch, fprint).insert_id().unwrap();
        let segments: Vec<&str> = key.split("-_-").collect();
        prop_assert_eq!(segments.len(), 3);
        prop_assert_eq!(segments[0], "GCPBOX_SpannerTxStat");
        prop_assert_eq!(segments[1], epoch.to_string());
        prop_assert_eq!(segments[2], fprint.to_string());
    }

    #[test]
    fn lock_key_never_panics_on_arbitrary_start_keys(
        epoch in 1i64..=4_102_444_800,
        start_key in prop::collection::vec(any::<u8>(), 0..64),
    ) {
        let key = lock_record(epoch, start_key.clone()).insert_id().unwrap();
        prop_assert!(key.starts_with("GCPBOX_SpannerLockStat-_-"));
        let other = lock_record(epoch, start_key).insert_id().unwrap();
        prop_assert_eq!(key, other);
    }

    #[test]
    fn distinct_fingerprints_never_collide(
        epoch in 1i64..=4_102_444_800,
        a in prop::num::i64::ANY.prop_filter("nonzero", |f| *f != 0),
        b in prop::num::i64::ANY.prop_filter("nonzero", |f| *f != 0),
    ) {
        prop_assume!(a != b);
        let key_a = txn_record(epoch, a).insert_id().unwrap();
        let key_b = txn_record(epoch, b).insert_id().unwrap();
        prop_assert_ne!(key_a, key_b);
    }

    #[test]
    fn serde_roundtrip_preserves_key(
        epoch in 1i64..=4_102_444_800,
        fprint in prop::num::i64::ANY.prop_filter("nonzero", |f| *f != 0),
    ) {
        let record = txn_record(epoch, fprint);
        let encoded = serde_json::to_string(&record).unwrap();
        let decoded: StatsRecord = serde_json::from_str(&encoded).unwrap();
        prop_assert_eq!(record.insert_id().unwrap(), decoded.insert_id().unwrap());
    }
}
