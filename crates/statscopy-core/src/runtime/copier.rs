// crates/statscopy-core/src/runtime/copier.rs
// ============================================================================
// Module: Statscopy Copy Engine
// Description: End-to-end per-family statistics copy.
// Purpose: Stream snapshot rows into keyed warehouse batches in lockstep.
// Dependencies: crate::{core, interfaces, runtime}
// ============================================================================

//! ## Overview
//! One copy run is a single-threaded cooperative pipeline: build the family
//! query, drain the snapshot cursor, buffer up to [`FLUSH_THRESHOLD`] records,
//! and flush each full buffer before pulling the next row. Flushes are
//! strictly sequential, which bounds memory and makes the failing batch the
//! last one attempted.
//!
//! The engine recovers nothing locally. Every non-success outcome is a
//! [`CopyFailure`] carrying the rows inserted before the failure, so callers
//! can decide retry scope; reruns are safe because the sink coalesces on
//! idempotence keys.

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;

use crate::core::CancelToken;
use crate::core::IntervalEnd;
use crate::core::IntervalEndError;
use crate::core::RecordError;
use crate::core::StatsRecord;
use crate::core::StatsTable;
use crate::core::TableRef;
use crate::core::bind_interval_end;
use crate::core::build_query;
use crate::interfaces::DecodeError;
use crate::interfaces::QueryStatement;
use crate::interfaces::SinkError;
use crate::interfaces::SourceDatabase;
use crate::interfaces::SourceError;
use crate::interfaces::WarehouseSink;
use crate::runtime::reader::ReadError;
use crate::runtime::reader::RecordReader;
use crate::runtime::writer::PutError;
use crate::runtime::writer::TableWriter;

// ============================================================================
// SECTION: Copy Errors
// ============================================================================

/// Number of buffered records that triggers a flush.
pub const FLUSH_THRESHOLD: usize = 100;

/// Terminal error kinds of a copy run.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CopyError {
    /// A record violated a required-field invariant.
    #[error("record invariant violated: {0}")]
    Invariant(#[from] RecordError),
    /// A source row could not be decoded; the run aborts.
    #[error("row decode failed: {0}")]
    Decode(#[from] DecodeError),
    /// The interval end could not be rendered as a query parameter.
    #[error("interval end rejected: {0}")]
    Interval(#[from] IntervalEndError),
    /// The source introspection table is absent.
    #[error("source stats table not found: {0}")]
    SourceNotFound(String),
    /// Any other source failure, surfaced unchanged.
    #[error("source failure: {0}")]
    Source(String),
    /// The sink rejected a flush, surfaced unchanged including per-row causes.
    #[error(transparent)]
    Sink(#[from] SinkError),
    /// Caller cancellation observed mid-run.
    #[error("copy cancelled")]
    Cancelled,
}

impl From<SourceError> for CopyError {
    fn from(err: SourceError) -> Self {
        match err {
            SourceError::NotFound(table) => Self::SourceNotFound(table),
            SourceError::Unavailable(detail) => Self::Source(detail),
        }
    }
}

impl From<ReadError> for CopyError {
    fn from(err: ReadError) -> Self {
        match err {
            ReadError::Source(source) => source.into(),
            ReadError::Decode(decode) => Self::Decode(decode),
            ReadError::Record(record) => Self::Invariant(record),
        }
    }
}

impl From<PutError> for CopyError {
    fn from(err: PutError) -> Self {
        match err {
            PutError::Record(record) => Self::Invariant(record),
            PutError::Sink(sink) => Self::Sink(sink),
        }
    }
}

/// Failed copy run, preserving partial progress.
///
/// Partial progress is a first-class observable outcome: `inserted` rows were
/// acknowledged by the sink before the failure.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("copy failed after {inserted} inserted rows: {error}")]
pub struct CopyFailure {
    /// Rows acknowledged by the sink before the failure.
    pub inserted: u64,
    /// Terminal error of the run.
    pub error: CopyError,
}

impl CopyFailure {
    /// Pairs a terminal error with the rows inserted before it.
    #[must_use]
    pub const fn new(inserted: u64, error: CopyError) -> Self {
        Self {
            inserted,
            error,
        }
    }
}

// ============================================================================
// SECTION: Stats Copier
// ============================================================================

/// End-to-end copy engine over a source database and a warehouse sink.
///
/// Runs share no mutable state; distinct copiers (or distinct calls on one
/// copier) may execute in parallel for different families or intervals.
pub struct StatsCopier<S, W> {
    /// Source database handle, owned by the caller's choice of `S`.
    source: S,
    /// Family-aware writer over the warehouse sink.
    writer: TableWriter<W>,
}

impl<S: SourceDatabase, W: WarehouseSink> StatsCopier<S, W> {
    /// Creates a copy engine over the given source and sink handles.
    #[must_use]
    pub const fn new(source: S, sink: W) -> Self {
        Self {
            source,
            writer: TableWriter::new(sink),
        }
    }

    /// Returns the family-aware writer, the maintenance entry point for
    /// creating and evolving destination tables.
    #[must_use]
    pub const fn writer(&self) -> &TableWriter<W> {
        &self.writer
    }

    /// Copies every source row labelled `interval_end` into the destination
    /// table, returning the number of rows the sink acknowledged.
    ///
    /// Rows are written in source order; the next row is not pulled until the
    /// previous flush has acknowledged. The run never creates or updates the
    /// destination table.
    ///
    /// # Errors
    ///
    /// Returns [`CopyFailure`] carrying the rows inserted so far together
    /// with the terminal [`CopyError`]. Nothing is retried.
    pub fn copy(
        &self,
        table: StatsTable,
        dest: &TableRef,
        interval_end: IntervalEnd,
        cancel: &CancelToken,
    ) -> Result<u64, CopyFailure> {
        let statement = self
            .statement_for(table, interval_end)
            .map_err(|err| CopyFailure::new(0, err.into()))?;
        let cursor = self
            .source
            .single_use_query(&statement, cancel)
            .map_err(|err| CopyFailure::new(0, err.into()))?;
        let mut reader = RecordReader::new(cursor, table.kind());

        let mut inserted: u64 = 0;
        let mut buffer: Vec<StatsRecord> = Vec::with_capacity(FLUSH_THRESHOLD);
        loop {
            if cancel.is_cancelled() {
                reader.stop();
                return Err(CopyFailure::new(inserted, CopyError::Cancelled));
            }
            let record = match reader.next_record() {
                Ok(record) => record,
                Err(err) => {
                    reader.stop();
                    return Err(CopyFailure::new(inserted, err.into()));
                }
            };
            let Some(record) = record else {
                break;
            };
            buffer.push(record);
            if buffer.len() >= FLUSH_THRESHOLD {
                inserted = self.flush(dest, &mut buffer, inserted, cancel).map_err(|err| {
                    reader.stop();
                    err
                })?;
            }
        }
        if !buffer.is_empty() {
            inserted = self.flush(dest, &mut buffer, inserted, cancel)?;
        }
        Ok(inserted)
    }

    /// Builds the bound query statement for one run.
    fn statement_for(
        &self,
        table: StatsTable,
        interval_end: IntervalEnd,
    ) -> Result<QueryStatement, IntervalEndError> {
        Ok(QueryStatement {
            sql: build_query(table),
            params: bind_interval_end(interval_end)?,
        })
    }

    /// Hands the buffered records to the sink and clears the buffer.
    ///
    /// A flush that fails contributes nothing to the insert count; the
    /// composite row-failure result is surfaced unchanged.
    fn flush(
        &self,
        dest: &TableRef,
        buffer: &mut Vec<StatsRecord>,
        inserted: u64,
        cancel: &CancelToken,
    ) -> Result<u64, CopyFailure> {
        if cancel.is_cancelled() {
            return Err(CopyFailure::new(inserted, CopyError::Cancelled));
        }
        let batch_len = buffer.len() as u64;
        self.writer
            .put_batch(dest, buffer, cancel)
            .map_err(|err| CopyFailure::new(inserted, err.into()))?;
        buffer.clear();
        Ok(inserted + batch_len)
    }
}
