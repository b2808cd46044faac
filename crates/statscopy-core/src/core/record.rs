// crates/statscopy-core/src/core/record.rs
// ============================================================================
// Module: Statscopy Records
// Description: Value types for the four statistic families.
// Purpose: Carry decoded source rows, derive idempotence keys, map sink rows.
// Dependencies: serde, serde_json, base64, thiserror
// ============================================================================

//! ## Overview
//! A [`StatsRecord`] is created when a source row is decoded, is immutable
//! thereafter, and is owned by the copier's current batch until the sink
//! acknowledges it. Each variant knows how to derive its deterministic
//! idempotence key and how to render itself as a warehouse row keyed by
//! destination column name.
//!
//! Key prefixes are part of the deduplication contract; changing them breaks
//! coalescing for previously written rows.

// ============================================================================
// SECTION: Imports
// ============================================================================

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use base64::engine::general_purpose::URL_SAFE;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Map;
use serde_json::Value;
use serde_json::json;
use thiserror::Error;

use crate::core::family::StatsKind;
use crate::core::time::IntervalEnd;

// ============================================================================
// SECTION: Key Prefixes
// ============================================================================

/// Idempotence key prefix for query statistics.
pub const QUERY_KEY_PREFIX: &str = "GCPBOX_SpannerQueryStat";
/// Idempotence key prefix for read statistics.
pub const READ_KEY_PREFIX: &str = "GCPBOX_SpannerReadStat";
/// Idempotence key prefix for transaction statistics.
pub const TXN_KEY_PREFIX: &str = "GCPBOX_SpannerTxStat";
/// Idempotence key prefix for lock statistics.
pub const LOCK_KEY_PREFIX: &str = "GCPBOX_SpannerLockStat";

/// Separator between idempotence key segments.
const KEY_SEPARATOR: &str = "-_-";

// ============================================================================
// SECTION: Record Errors
// ============================================================================

/// Invariant violations detected on a decoded record.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    /// The record carries no aggregation-window label.
    #[error("{kind} stat record is missing its interval end")]
    MissingIntervalEnd {
        /// Family of the offending record.
        kind: StatsKind,
    },
    /// A required fingerprint field is zero.
    #[error("{kind} stat record is missing its fingerprint")]
    MissingFingerprint {
        /// Family of the offending record.
        kind: StatsKind,
    },
}

// ============================================================================
// SECTION: Family Payloads
// ============================================================================

/// One aggregated query-statistics row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryStat {
    /// Right edge of the aggregation window.
    pub interval_end: IntervalEnd,
    /// Query text, truncated by the source to approximately 64 KB.
    pub text: String,
    /// Whether the source truncated the query text.
    pub text_truncated: bool,
    /// Fingerprint of the normalized query text.
    pub text_fingerprint: i64,
    /// Number of executions in the window.
    pub execution_count: i64,
    /// Average execution latency in seconds.
    pub avg_latency_seconds: f64,
    /// Average rows returned per execution.
    pub avg_rows: f64,
    /// Average bytes returned per execution.
    pub avg_bytes: f64,
    /// Average rows scanned per execution.
    pub avg_rows_scanned: f64,
    /// Average CPU seconds consumed per execution.
    pub avg_cpu_seconds: f64,
    /// Executions that failed for any reason.
    pub all_failed_execution_count: i64,
    /// Average latency of failed executions in seconds.
    pub all_failed_avg_latency_seconds: f64,
    /// Executions cancelled by the caller or disconnected.
    pub cancelled_or_disconnected_execution_count: i64,
    /// Executions that hit the deadline.
    pub timed_out_execution_count: i64,
}

/// One aggregated read-statistics row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadStat {
    /// Right edge of the aggregation window.
    pub interval_end: IntervalEnd,
    /// Ordered set of columns touched by the read shape.
    pub read_columns: Vec<String>,
    /// Fingerprint of the read shape.
    pub fprint: i64,
    /// Number of executions in the window.
    pub execution_count: i64,
    /// Average rows returned per read.
    pub avg_rows: f64,
    /// Average bytes returned per read.
    pub avg_bytes: f64,
    /// Average CPU seconds consumed per read.
    pub avg_cpu_seconds: f64,
    /// Average seconds spent waiting on locks.
    pub avg_locking_delay_seconds: f64,
    /// Average seconds spent waiting on the client.
    pub avg_client_wait_seconds: f64,
    /// Average seconds spent refreshing the leader lease.
    pub avg_leader_refresh_delay_seconds: f64,
}

/// One aggregated transaction-statistics row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TxnStat {
    /// Right edge of the aggregation window.
    pub interval_end: IntervalEnd,
    /// Fingerprint of the transaction shape.
    pub fprint: i64,
    /// Ordered set of columns read by the transaction shape.
    pub read_columns: Vec<String>,
    /// Ordered set of columns written with constructive mutations.
    pub write_constructive_columns: Vec<String>,
    /// Ordered set of tables written with delete mutations.
    pub write_delete_tables: Vec<String>,
    /// Commit attempts in the window.
    pub commit_attempt_count: i64,
    /// Aborted commit attempts.
    pub commit_abort_count: i64,
    /// Retried commit attempts.
    pub commit_retry_count: i64,
    /// Commit attempts failed on preconditions.
    pub commit_failed_precondition_count: i64,
    /// Average participant count per commit.
    pub avg_participants: f64,
    /// Average end-to-end latency in seconds.
    pub avg_total_latency_seconds: f64,
    /// Average commit latency in seconds.
    pub avg_commit_latency_seconds: f64,
    /// Average bytes written per commit.
    pub avg_bytes: f64,
}

/// One sampled lock request inside a lock-statistics row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SampleLockRequest {
    /// Lock mode requested.
    pub lock_mode: String,
    /// Column the lock was requested on.
    pub column: String,
}

/// One aggregated lock-statistics row.
///
/// The source bounds `sample_lock_requests` to twenty entries; the start key
/// may legitimately be empty and still yields a well-formed idempotence key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LockStat {
    /// Right edge of the aggregation window.
    pub interval_end: IntervalEnd,
    /// Start key of the contended row range, opaque bytes.
    pub row_range_start_key: Vec<u8>,
    /// Cumulative lock wait seconds over the window.
    pub lock_wait_seconds: f64,
    /// Sampled lock requests for the range.
    pub sample_lock_requests: Vec<SampleLockRequest>,
}

// ============================================================================
// SECTION: Stats Record
// ============================================================================

/// Decoded source row for one of the four statistic families.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "stat", rename_all = "snake_case")]
pub enum StatsRecord {
    /// Query family payload.
    Query(QueryStat),
    /// Read family payload.
    Read(ReadStat),
    /// Transaction family payload.
    Txn(TxnStat),
    /// Lock family payload.
    Lock(LockStat),
}

impl StatsRecord {
    /// Returns the record's family.
    #[must_use]
    pub const fn kind(&self) -> StatsKind {
        match self {
            Self::Query(_) => StatsKind::Query,
            Self::Read(_) => StatsKind::Read,
            Self::Txn(_) => StatsKind::Txn,
            Self::Lock(_) => StatsKind::Lock,
        }
    }

    /// Returns the record's aggregation-window label.
    #[must_use]
    pub const fn interval_end(&self) -> IntervalEnd {
        match self {
            Self::Query(stat) => stat.interval_end,
            Self::Read(stat) => stat.interval_end,
            Self::Txn(stat) => stat.interval_end,
            Self::Lock(stat) => stat.interval_end,
        }
    }

    /// Derives the deterministic idempotence key for this record.
    ///
    /// Two records with equal content always yield equal keys, so reruns of
    /// the same interval coalesce inside the sink's deduplication window.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError`] when the interval end is zero or a required
    /// fingerprint is zero.
    pub fn insert_id(&self) -> Result<String, RecordError> {
        if self.interval_end().is_zero() {
            return Err(RecordError::MissingIntervalEnd {
                kind: self.kind(),
            });
        }
        let epoch = self.interval_end().unix_seconds();
        match self {
            Self::Query(stat) => {
                require_fingerprint(stat.text_fingerprint, StatsKind::Query)?;
                Ok(join_key(QUERY_KEY_PREFIX, epoch, &stat.text_fingerprint.to_string()))
            }
            Self::Read(stat) => {
                require_fingerprint(stat.fprint, StatsKind::Read)?;
                Ok(join_key(READ_KEY_PREFIX, epoch, &stat.fprint.to_string()))
            }
            Self::Txn(stat) => {
                require_fingerprint(stat.fprint, StatsKind::Txn)?;
                Ok(join_key(TXN_KEY_PREFIX, epoch, &stat.fprint.to_string()))
            }
            Self::Lock(stat) => {
                let suffix = URL_SAFE.encode(&stat.row_range_start_key);
                Ok(join_key(LOCK_KEY_PREFIX, epoch, &suffix))
            }
        }
    }

    /// Renders the record as a warehouse row keyed by destination column name.
    ///
    /// Timestamps are emitted as unix epoch seconds and byte columns as
    /// standard base64, matching the streaming-insert value encoding of the
    /// destination schema. The mapping is deterministic.
    #[must_use]
    pub fn to_row(&self) -> Map<String, Value> {
        match self {
            Self::Query(stat) => query_row(stat),
            Self::Read(stat) => read_row(stat),
            Self::Txn(stat) => txn_row(stat),
            Self::Lock(stat) => lock_row(stat),
        }
    }
}

/// Rejects zero fingerprints before key derivation.
const fn require_fingerprint(fprint: i64, kind: StatsKind) -> Result<(), RecordError> {
    if fprint == 0 {
        return Err(RecordError::MissingFingerprint {
            kind,
        });
    }
    Ok(())
}

/// Joins the three idempotence key segments.
fn join_key(prefix: &str, epoch: i64, tail: &str) -> String {
    format!("{prefix}{KEY_SEPARATOR}{epoch}{KEY_SEPARATOR}{tail}")
}

// ============================================================================
// SECTION: Row Mapping
// ============================================================================

/// Maps a query stat onto destination columns.
fn query_row(stat: &QueryStat) -> Map<String, Value> {
    let mut row = Map::new();
    row.insert("interval_end".to_string(), json!(stat.interval_end.unix_seconds()));
    row.insert("text".to_string(), json!(stat.text));
    row.insert("text_truncated".to_string(), json!(stat.text_truncated));
    row.insert("text_fingerprint".to_string(), json!(stat.text_fingerprint));
    row.insert("execution_count".to_string(), json!(stat.execution_count));
    row.insert("avg_latency_seconds".to_string(), json!(stat.avg_latency_seconds));
    row.insert("avg_rows".to_string(), json!(stat.avg_rows));
    row.insert("avg_bytes".to_string(), json!(stat.avg_bytes));
    row.insert("avg_rows_scanned".to_string(), json!(stat.avg_rows_scanned));
    row.insert("avg_cpu_seconds".to_string(), json!(stat.avg_cpu_seconds));
    row.insert(
        "all_failed_execution_count".to_string(),
        json!(stat.all_failed_execution_count),
    );
    row.insert(
        "all_failed_avg_latency_seconds".to_string(),
        json!(stat.all_failed_avg_latency_seconds),
    );
    row.insert(
        "cancelled_or_disconnected_execution_count".to_string(),
        json!(stat.cancelled_or_disconnected_execution_count),
    );
    row.insert("timed_out_execution_count".to_string(), json!(stat.timed_out_execution_count));
    row
}

/// Maps a read stat onto destination columns.
fn read_row(stat: &ReadStat) -> Map<String, Value> {
    let mut row = Map::new();
    row.insert("interval_end".to_string(), json!(stat.interval_end.unix_seconds()));
    row.insert("read_columns".to_string(), json!(stat.read_columns));
    row.insert("fprint".to_string(), json!(stat.fprint));
    row.insert("execution_count".to_string(), json!(stat.execution_count));
    row.insert("avg_rows".to_string(), json!(stat.avg_rows));
    row.insert("avg_bytes".to_string(), json!(stat.avg_bytes));
    row.insert("avg_cpu_seconds".to_string(), json!(stat.avg_cpu_seconds));
    row.insert("avg_locking_delay_seconds".to_string(), json!(stat.avg_locking_delay_seconds));
    row.insert("avg_client_wait_seconds".to_string(), json!(stat.avg_client_wait_seconds));
    row.insert(
        "avg_leader_refresh_delay_seconds".to_string(),
        json!(stat.avg_leader_refresh_delay_seconds),
    );
    row
}

/// Maps a transaction stat onto destination columns.
fn txn_row(stat: &TxnStat) -> Map<String, Value> {
    let mut row = Map::new();
    row.insert("interval_end".to_string(), json!(stat.interval_end.unix_seconds()));
    row.insert("fprint".to_string(), json!(stat.fprint));
    row.insert("read_columns".to_string(), json!(stat.read_columns));
    row.insert(
        "write_constructive_columns".to_string(),
        json!(stat.write_constructive_columns),
    );
    row.insert("write_delete_tables".to_string(), json!(stat.write_delete_tables));
    row.insert("commit_attempt_count".to_string(), json!(stat.commit_attempt_count));
    row.insert("commit_abort_count".to_string(), json!(stat.commit_abort_count));
    row.insert("commit_retry_count".to_string(), json!(stat.commit_retry_count));
    row.insert(
        "commit_failed_precondition_count".to_string(),
        json!(stat.commit_failed_precondition_count),
    );
    row.insert("avg_participants".to_string(), json!(stat.avg_participants));
    row.insert("avg_total_latency_seconds".to_string(), json!(stat.avg_total_latency_seconds));
    row.insert("avg_commit_latency_seconds".to_string(), json!(stat.avg_commit_latency_seconds));
    row.insert("avg_bytes".to_string(), json!(stat.avg_bytes));
    row
}

/// Maps a lock stat onto destination columns.
fn lock_row(stat: &LockStat) -> Map<String, Value> {
    let mut row = Map::new();
    row.insert("interval_end".to_string(), json!(stat.interval_end.unix_seconds()));
    row.insert("row_range_start_key".to_string(), json!(STANDARD.encode(&stat.row_range_start_key)));
    row.insert("lock_wait_seconds".to_string(), json!(stat.lock_wait_seconds));
    let requests: Vec<Value> = stat
        .sample_lock_requests
        .iter()
        .map(|request| {
            json!({
                "lock_mode": request.lock_mode,
                "column": request.column,
            })
        })
        .collect();
    row.insert("sample_lock_requests".to_string(), Value::Array(requests));
    row
}
