// crates/statscopy-core/src/runtime/reader.rs
// ============================================================================
// Module: Statscopy Record Reader
// Description: Lazy decoding of snapshot rows into stats records.
// Purpose: Turn a row cursor into an ordered, single-pass record sequence.
// Dependencies: crate::{core, interfaces}
// ============================================================================

//! ## Overview
//! The reader pulls rows from a source cursor one at a time and decodes each
//! into the requested record shape, preserving source order. A decode failure
//! fails the whole sequence; a record without its interval end is rejected
//! here, before it can reach the sink.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use thiserror::Error;

use crate::core::IntervalEnd;
use crate::core::LockStat;
use crate::core::QueryStat;
use crate::core::ReadStat;
use crate::core::RecordError;
use crate::core::SampleLockRequest;
use crate::core::StatsKind;
use crate::core::StatsRecord;
use crate::core::TxnStat;
use crate::interfaces::Cell;
use crate::interfaces::DecodeError;
use crate::interfaces::Row;
use crate::interfaces::RowCursor;
use crate::interfaces::SourceError;

// ============================================================================
// SECTION: Reader Errors
// ============================================================================

/// Errors that fail the record sequence.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReadError {
    /// The source failed mid-stream.
    #[error(transparent)]
    Source(#[from] SourceError),
    /// A row could not be mapped onto the record shape.
    #[error(transparent)]
    Decode(#[from] DecodeError),
    /// A decoded record violated a required-field invariant.
    #[error(transparent)]
    Record(#[from] RecordError),
}

// ============================================================================
// SECTION: Record Reader
// ============================================================================

/// Ordered, single-pass record sequence over one snapshot cursor.
pub struct RecordReader<C> {
    /// Underlying source cursor.
    cursor: C,
    /// Record shape to decode into.
    kind: StatsKind,
}

impl<C: RowCursor> RecordReader<C> {
    /// Wraps a cursor, decoding rows into the given family's shape.
    #[must_use]
    pub const fn new(cursor: C, kind: StatsKind) -> Self {
        Self {
            cursor,
            kind,
        }
    }

    /// Returns the next decoded record, or `None` once the cursor is drained.
    ///
    /// # Errors
    ///
    /// Returns [`ReadError`] on source failure, decode failure, or a record
    /// missing its interval end; any error ends the sequence.
    pub fn next_record(&mut self) -> Result<Option<StatsRecord>, ReadError> {
        let Some(row) = self.cursor.next_row()? else {
            return Ok(None);
        };
        let record = decode_record(self.kind, &row)?;
        if record.interval_end().is_zero() {
            return Err(ReadError::Record(RecordError::MissingIntervalEnd {
                kind: self.kind,
            }));
        }
        Ok(Some(record))
    }

    /// Releases the underlying cursor before exhaustion.
    pub fn stop(&mut self) {
        self.cursor.stop();
    }
}

// ============================================================================
// SECTION: Row Decoding
// ============================================================================

/// Decodes one row into the given family's record shape.
///
/// # Errors
///
/// Returns [`DecodeError`] when a projected column is absent or mistyped.
pub fn decode_record(kind: StatsKind, row: &Row) -> Result<StatsRecord, DecodeError> {
    match kind {
        StatsKind::Query => decode_query_stat(row).map(StatsRecord::Query),
        StatsKind::Read => decode_read_stat(row).map(StatsRecord::Read),
        StatsKind::Txn => decode_txn_stat(row).map(StatsRecord::Txn),
        StatsKind::Lock => decode_lock_stat(row).map(StatsRecord::Lock),
    }
}

/// Decodes a query-family row.
fn decode_query_stat(row: &Row) -> Result<QueryStat, DecodeError> {
    Ok(QueryStat {
        interval_end: IntervalEnd::from_unix_seconds(row.timestamp("interval_end")?),
        text: row.string("text")?,
        text_truncated: row.boolean("text_truncated")?,
        text_fingerprint: row.int64("text_fingerprint")?,
        execution_count: row.int64("execution_count")?,
        avg_latency_seconds: row.float64("avg_latency_seconds")?,
        avg_rows: row.float64("avg_rows")?,
        avg_bytes: row.float64("avg_bytes")?,
        avg_rows_scanned: row.float64("avg_rows_scanned")?,
        avg_cpu_seconds: row.float64("avg_cpu_seconds")?,
        all_failed_execution_count: row.int64("all_failed_execution_count")?,
        all_failed_avg_latency_seconds: row.float64("all_failed_avg_latency_seconds")?,
        cancelled_or_disconnected_execution_count: row
            .int64("cancelled_or_disconnected_execution_count")?,
        timed_out_execution_count: row.int64("timed_out_execution_count")?,
    })
}

/// Decodes a read-family row.
fn decode_read_stat(row: &Row) -> Result<ReadStat, DecodeError> {
    Ok(ReadStat {
        interval_end: IntervalEnd::from_unix_seconds(row.timestamp("interval_end")?),
        read_columns: row.string_array("read_columns")?,
        fprint: row.int64("fprint")?,
        execution_count: row.int64("execution_count")?,
        avg_rows: row.float64("avg_rows")?,
        avg_bytes: row.float64("avg_bytes")?,
        avg_cpu_seconds: row.float64("avg_cpu_seconds")?,
        avg_locking_delay_seconds: row.float64("avg_locking_delay_seconds")?,
        avg_client_wait_seconds: row.float64("avg_client_wait_seconds")?,
        avg_leader_refresh_delay_seconds: row.float64("avg_leader_refresh_delay_seconds")?,
    })
}

/// Decodes a transaction-family row.
fn decode_txn_stat(row: &Row) -> Result<TxnStat, DecodeError> {
    Ok(TxnStat {
        interval_end: IntervalEnd::from_unix_seconds(row.timestamp("interval_end")?),
        fprint: row.int64("fprint")?,
        read_columns: row.string_array("read_columns")?,
        write_constructive_columns: row.string_array("write_constructive_columns")?,
        write_delete_tables: row.string_array("write_delete_tables")?,
        commit_attempt_count: row.int64("commit_attempt_count")?,
        commit_abort_count: row.int64("commit_abort_count")?,
        commit_retry_count: row.int64("commit_retry_count")?,
        commit_failed_precondition_count: row.int64("commit_failed_precondition_count")?,
        avg_participants: row.float64("avg_participants")?,
        avg_total_latency_seconds: row.float64("avg_total_latency_seconds")?,
        avg_commit_latency_seconds: row.float64("avg_commit_latency_seconds")?,
        avg_bytes: row.float64("avg_bytes")?,
    })
}

/// Decodes a lock-family row.
fn decode_lock_stat(row: &Row) -> Result<LockStat, DecodeError> {
    let samples = row.struct_array("sample_lock_requests")?;
    let mut sample_lock_requests = Vec::with_capacity(samples.len());
    for sample in samples {
        sample_lock_requests.push(decode_lock_request(sample)?);
    }
    Ok(LockStat {
        interval_end: IntervalEnd::from_unix_seconds(row.timestamp("interval_end")?),
        row_range_start_key: row.bytes("row_range_start_key")?,
        lock_wait_seconds: row.float64("lock_wait_seconds")?,
        sample_lock_requests,
    })
}

/// Decodes one sampled lock request struct.
fn decode_lock_request(fields: &BTreeMap<String, Cell>) -> Result<SampleLockRequest, DecodeError> {
    let lock_mode = lock_request_field(fields, "lock_mode")?;
    let column = lock_request_field(fields, "column")?;
    Ok(SampleLockRequest {
        lock_mode,
        column,
    })
}

/// Extracts one string sub-field of a sampled lock request.
fn lock_request_field(
    fields: &BTreeMap<String, Cell>,
    field: &str,
) -> Result<String, DecodeError> {
    match fields.get(field) {
        Some(Cell::String(value)) => Ok(value.clone()),
        Some(other) => Err(DecodeError::TypeMismatch {
            column: format!("sample_lock_requests.{field}"),
            expected: "string",
            actual: other.type_label(),
        }),
        None => Err(DecodeError::MalformedStruct {
            column: "sample_lock_requests".to_string(),
            field: field.to_string(),
        }),
    }
}
