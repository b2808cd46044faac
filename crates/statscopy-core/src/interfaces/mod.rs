// crates/statscopy-core/src/interfaces/mod.rs
// ============================================================================
// Module: Statscopy Interfaces
// Description: Backend-agnostic interfaces for the source database and sink.
// Purpose: Define the contract surfaces the copy pipeline consumes.
// Dependencies: crate::core, serde_json, thiserror
// ============================================================================

//! ## Overview
//! The pipeline reaches its collaborators exclusively through these traits: a
//! source database exposing single-use snapshot queries over a row cursor, and
//! a warehouse sink exposing table maintenance plus keyed streaming inserts.
//! Both handles are owned by the caller, stay valid for the duration of a run,
//! and are never closed by the core.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use serde_json::Map;
use serde_json::Value;
use thiserror::Error;

use crate::core::CancelToken;
use crate::core::TableRef;
use crate::core::TableSchema;
use crate::core::TableSpec;

// ============================================================================
// SECTION: Row Model
// ============================================================================

/// One decoded cell of a source row.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    /// Point-in-time value as unix epoch seconds.
    Timestamp(i64),
    /// UTF-8 text.
    String(String),
    /// Boolean flag.
    Bool(bool),
    /// 64-bit signed integer.
    Int64(i64),
    /// 64-bit floating point.
    Float64(f64),
    /// Opaque byte sequence.
    Bytes(Vec<u8>),
    /// Ordered sequence of strings.
    StringArray(Vec<String>),
    /// Ordered sequence of nested structs.
    StructArray(Vec<BTreeMap<String, Cell>>),
}

impl Cell {
    /// Returns the cell's type label, used in decode diagnostics.
    #[must_use]
    pub const fn type_label(&self) -> &'static str {
        match self {
            Self::Timestamp(_) => "timestamp",
            Self::String(_) => "string",
            Self::Bool(_) => "bool",
            Self::Int64(_) => "int64",
            Self::Float64(_) => "float64",
            Self::Bytes(_) => "bytes",
            Self::StringArray(_) => "string array",
            Self::StructArray(_) => "struct array",
        }
    }
}

/// Errors raised while mapping a source row onto a record shape.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// The projection promised a column the row does not carry.
    #[error("row is missing column {column}")]
    MissingColumn {
        /// Name of the absent column.
        column: String,
    },
    /// A column carries a value of an unexpected type.
    #[error("column {column} holds a {actual} value, expected {expected}")]
    TypeMismatch {
        /// Name of the offending column.
        column: String,
        /// Type the decoder expected.
        expected: &'static str,
        /// Type the row actually carried.
        actual: &'static str,
    },
    /// A nested struct column is missing a sub-field.
    #[error("struct column {column} is missing field {field}")]
    MalformedStruct {
        /// Name of the struct column.
        column: String,
        /// Name of the absent sub-field.
        field: String,
    },
}

/// One source row, keyed by projected column name.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Row {
    /// Decoded cells by column name.
    cells: BTreeMap<String, Cell>,
}

impl Row {
    /// Creates a row from decoded cells.
    #[must_use]
    pub const fn new(cells: BTreeMap<String, Cell>) -> Self {
        Self {
            cells,
        }
    }

    /// Inserts or replaces one cell, builder style.
    #[must_use]
    pub fn with(mut self, column: impl Into<String>, cell: Cell) -> Self {
        self.cells.insert(column.into(), cell);
        self
    }

    /// Looks up a cell by column name.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::MissingColumn`] when the column is absent.
    pub fn cell(&self, column: &str) -> Result<&Cell, DecodeError> {
        self.cells.get(column).ok_or_else(|| DecodeError::MissingColumn {
            column: column.to_string(),
        })
    }

    /// Reads a timestamp column as unix epoch seconds.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError`] when the column is absent or mistyped.
    pub fn timestamp(&self, column: &str) -> Result<i64, DecodeError> {
        match self.cell(column)? {
            Cell::Timestamp(value) => Ok(*value),
            other => Err(mismatch(column, "timestamp", other)),
        }
    }

    /// Reads a string column.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError`] when the column is absent or mistyped.
    pub fn string(&self, column: &str) -> Result<String, DecodeError> {
        match self.cell(column)? {
            Cell::String(value) => Ok(value.clone()),
            other => Err(mismatch(column, "string", other)),
        }
    }

    /// Reads a boolean column.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError`] when the column is absent or mistyped.
    pub fn boolean(&self, column: &str) -> Result<bool, DecodeError> {
        match self.cell(column)? {
            Cell::Bool(value) => Ok(*value),
            other => Err(mismatch(column, "bool", other)),
        }
    }

    /// Reads an integer column.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError`] when the column is absent or mistyped.
    pub fn int64(&self, column: &str) -> Result<i64, DecodeError> {
        match self.cell(column)? {
            Cell::Int64(value) => Ok(*value),
            other => Err(mismatch(column, "int64", other)),
        }
    }

    /// Reads a float column.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError`] when the column is absent or mistyped.
    pub fn float64(&self, column: &str) -> Result<f64, DecodeError> {
        match self.cell(column)? {
            Cell::Float64(value) => Ok(*value),
            other => Err(mismatch(column, "float64", other)),
        }
    }

    /// Reads a bytes column.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError`] when the column is absent or mistyped.
    pub fn bytes(&self, column: &str) -> Result<Vec<u8>, DecodeError> {
        match self.cell(column)? {
            Cell::Bytes(value) => Ok(value.clone()),
            other => Err(mismatch(column, "bytes", other)),
        }
    }

    /// Reads a repeated string column.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError`] when the column is absent or mistyped.
    pub fn string_array(&self, column: &str) -> Result<Vec<String>, DecodeError> {
        match self.cell(column)? {
            Cell::StringArray(value) => Ok(value.clone()),
            other => Err(mismatch(column, "string array", other)),
        }
    }

    /// Reads a repeated struct column.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError`] when the column is absent or mistyped.
    pub fn struct_array(&self, column: &str) -> Result<&[BTreeMap<String, Cell>], DecodeError> {
        match self.cell(column)? {
            Cell::StructArray(value) => Ok(value.as_slice()),
            other => Err(mismatch(column, "struct array", other)),
        }
    }
}

/// Builds a type-mismatch decode error.
fn mismatch(column: &str, expected: &'static str, actual: &Cell) -> DecodeError {
    DecodeError::TypeMismatch {
        column: column.to_string(),
        expected,
        actual: actual.type_label(),
    }
}

// ============================================================================
// SECTION: Source Database
// ============================================================================

/// Query text plus named parameters, emitted verbatim to the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryStatement {
    /// Query text.
    pub sql: String,
    /// Named parameters bound at execution time.
    pub params: BTreeMap<String, String>,
}

/// Errors raised by the source database.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SourceError {
    /// The queried introspection table does not exist on this database.
    #[error("source stats table not found: {0}")]
    NotFound(String),
    /// Any other read failure; surfaced unchanged, never retried by the core.
    #[error("source unavailable: {0}")]
    Unavailable(String),
}

/// Single-pass cursor over the rows of one snapshot query.
///
/// Rows arrive in source order; the cursor must be drained or explicitly
/// stopped to release the underlying resources.
pub trait RowCursor {
    /// Returns the next row, or `None` once the result set is exhausted.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] when the source fails mid-stream.
    fn next_row(&mut self) -> Result<Option<Row>, SourceError>;

    /// Releases the cursor before exhaustion. Draining to `None` is
    /// equivalent; calling both is harmless.
    fn stop(&mut self) {}
}

/// Source database handle exposing single-use snapshot queries.
///
/// A query sees one consistent point-in-time view; the core never retries
/// across snapshot boundaries.
pub trait SourceDatabase {
    /// Cursor type produced by this source.
    type Cursor: RowCursor;

    /// Executes the statement in a fresh single-use read-only snapshot.
    ///
    /// The cancellation token is forwarded so implementations can abort the
    /// read on the next row.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::NotFound`] when the source table is absent and
    /// [`SourceError::Unavailable`] for any other failure.
    fn single_use_query(
        &self,
        statement: &QueryStatement,
        cancel: &CancelToken,
    ) -> Result<Self::Cursor, SourceError>;
}

impl<S: SourceDatabase> SourceDatabase for &S {
    type Cursor = S::Cursor;

    fn single_use_query(
        &self,
        statement: &QueryStatement,
        cancel: &CancelToken,
    ) -> Result<Self::Cursor, SourceError> {
        (*self).single_use_query(statement, cancel)
    }
}

// ============================================================================
// SECTION: Warehouse Sink
// ============================================================================

/// Upper bound on rows per streaming-insert batch.
pub const MAX_BATCH_ROWS: usize = 100;

/// One warehouse row with its idempotence key attached.
#[derive(Debug, Clone, PartialEq)]
pub struct SinkRow {
    /// Idempotence key the sink uses to coalesce duplicates.
    pub insert_id: String,
    /// Column values keyed by destination column name.
    pub columns: Map<String, Value>,
}

/// One rejected row inside a partially failed batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowFailure {
    /// Idempotence key of the rejected row.
    pub insert_id: String,
    /// Sink-reported cause.
    pub reason: String,
}

/// Errors raised by the warehouse sink.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SinkError {
    /// The destination table already exists; non-fatal to maintenance flows.
    #[error("destination table already exists: {0}")]
    AlreadyExists(TableRef),
    /// The destination table does not exist.
    #[error("destination table not found: {0}")]
    NotFound(TableRef),
    /// The proposed schema is not an additive evolution of the current one.
    #[error("schema conflict on {table}: {detail}")]
    SchemaConflict {
        /// Destination table under maintenance.
        table: TableRef,
        /// Sink-reported cause.
        detail: String,
    },
    /// The batch exceeds [`MAX_BATCH_ROWS`].
    #[error("batch of {actual} rows exceeds the {max} row limit")]
    BatchTooLarge {
        /// Rows in the rejected batch.
        actual: usize,
        /// Maximum accepted batch size.
        max: usize,
    },
    /// The sink rejected individual rows; the batch is not acknowledged.
    #[error("sink rejected {} of the batch's rows", .0.len())]
    RowFailures(Vec<RowFailure>),
    /// Any other write failure; surfaced unchanged, never retried by the core.
    #[error("sink unavailable: {0}")]
    Unavailable(String),
}

/// Warehouse sink exposing table maintenance and keyed streaming inserts.
pub trait WarehouseSink {
    /// Creates the destination table with the given specification.
    ///
    /// # Errors
    ///
    /// Returns [`SinkError::AlreadyExists`] when the table is present.
    fn create_table(&self, table: &TableRef, spec: &TableSpec) -> Result<(), SinkError>;

    /// Replaces the destination table's schema.
    ///
    /// # Errors
    ///
    /// Returns [`SinkError::SchemaConflict`] when the proposed schema is not
    /// a superset of the current one.
    fn update_table(&self, table: &TableRef, schema: &TableSchema) -> Result<(), SinkError>;

    /// Streams one batch of keyed rows into the destination table.
    ///
    /// The sink performs no batching of its own. A fully successful batch
    /// returns nothing; rejected rows surface as
    /// [`SinkError::RowFailures`] listing each `(insert_id, cause)` pair.
    ///
    /// # Errors
    ///
    /// Returns [`SinkError`] when the batch cannot be applied.
    fn put_rows(
        &self,
        table: &TableRef,
        rows: &[SinkRow],
        cancel: &CancelToken,
    ) -> Result<(), SinkError>;
}

impl<W: WarehouseSink> WarehouseSink for &W {
    fn create_table(&self, table: &TableRef, spec: &TableSpec) -> Result<(), SinkError> {
        (*self).create_table(table, spec)
    }

    fn update_table(&self, table: &TableRef, schema: &TableSchema) -> Result<(), SinkError> {
        (*self).update_table(table, schema)
    }

    fn put_rows(
        &self,
        table: &TableRef,
        rows: &[SinkRow],
        cancel: &CancelToken,
    ) -> Result<(), SinkError> {
        (*self).put_rows(table, rows, cancel)
    }
}
