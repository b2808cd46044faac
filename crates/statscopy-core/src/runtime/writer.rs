// crates/statscopy-core/src/runtime/writer.rs
// ============================================================================
// Module: Statscopy Table Writer
// Description: Per-family table maintenance and keyed batch writes.
// Purpose: Layer family schemas and idempotence keys over a warehouse sink.
// Dependencies: crate::{core, interfaces}
// ============================================================================

//! ## Overview
//! The writer owns the family-aware half of the sink contract: it creates and
//! updates destination tables with the family schemas and turns record batches
//! into keyed sink rows. It performs no batching of its own and rejects
//! batches over [`MAX_BATCH_ROWS`] outright.
//!
//! Schema maintenance (`create_table`, `update_table`, `ensure_table`) is a
//! separate entry point from the copy path; a copy run never touches table
//! existence.

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;

use crate::core::CancelToken;
use crate::core::RecordError;
use crate::core::StatsKind;
use crate::core::StatsRecord;
use crate::core::TableRef;
use crate::core::schema_for;
use crate::core::table_spec_for;
use crate::interfaces::MAX_BATCH_ROWS;
use crate::interfaces::SinkError;
use crate::interfaces::SinkRow;
use crate::interfaces::WarehouseSink;

// ============================================================================
// SECTION: Writer Errors
// ============================================================================

/// Errors raised while handing a batch to the sink.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PutError {
    /// A record failed its invariant during key derivation.
    #[error(transparent)]
    Record(#[from] RecordError),
    /// The sink rejected the batch.
    #[error(transparent)]
    Sink(#[from] SinkError),
}

// ============================================================================
// SECTION: Table Writer
// ============================================================================

/// Family-aware writer over a warehouse sink.
#[derive(Debug, Clone)]
pub struct TableWriter<W> {
    /// Underlying warehouse sink.
    sink: W,
}

impl<W: WarehouseSink> TableWriter<W> {
    /// Wraps a warehouse sink.
    #[must_use]
    pub const fn new(sink: W) -> Self {
        Self {
            sink,
        }
    }

    /// Creates the destination table for one family, day-partitioned on
    /// `interval_end`.
    ///
    /// # Errors
    ///
    /// Returns [`SinkError::AlreadyExists`] when the table is present; callers
    /// treat that as non-fatal.
    pub fn create_table(&self, kind: StatsKind, dest: &TableRef) -> Result<(), SinkError> {
        self.sink.create_table(dest, &table_spec_for(kind))
    }

    /// Applies the family schema as the new schema of an existing table.
    ///
    /// # Errors
    ///
    /// Returns [`SinkError::SchemaConflict`] when the change is not additive.
    pub fn update_table(&self, kind: StatsKind, dest: &TableRef) -> Result<(), SinkError> {
        self.sink.update_table(dest, &schema_for(kind))
    }

    /// Creates the destination table, updating its schema when it already
    /// exists. This is the maintenance entry point for schema evolution.
    ///
    /// # Errors
    ///
    /// Returns [`SinkError`] when neither create nor update succeeds.
    pub fn ensure_table(&self, kind: StatsKind, dest: &TableRef) -> Result<(), SinkError> {
        match self.create_table(kind, dest) {
            Err(SinkError::AlreadyExists(_)) => self.update_table(kind, dest),
            other => other,
        }
    }

    /// Streams one batch of records, attaching each record's idempotence key.
    ///
    /// # Errors
    ///
    /// Returns [`PutError`] when a key cannot be derived, the batch exceeds
    /// [`MAX_BATCH_ROWS`], or the sink rejects the write. Row-level failures
    /// surface unchanged as [`SinkError::RowFailures`].
    pub fn put_batch(
        &self,
        dest: &TableRef,
        records: &[StatsRecord],
        cancel: &CancelToken,
    ) -> Result<(), PutError> {
        if records.len() > MAX_BATCH_ROWS {
            return Err(PutError::Sink(SinkError::BatchTooLarge {
                actual: records.len(),
                max: MAX_BATCH_ROWS,
            }));
        }
        let mut rows = Vec::with_capacity(records.len());
        for record in records {
            rows.push(SinkRow {
                insert_id: record.insert_id()?,
                columns: record.to_row(),
            });
        }
        self.sink.put_rows(dest, &rows, cancel)?;
        Ok(())
    }
}
