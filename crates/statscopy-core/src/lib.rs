// crates/statscopy-core/src/lib.rs
// ============================================================================
// Module: Statscopy Core Library
// Description: Public API surface for the statistics copy pipeline.
// Purpose: Expose core types, interfaces, and runtime helpers.
// Dependencies: crate::{core, interfaces, runtime}
// ============================================================================

//! ## Overview
//! Statscopy periodically reads the `spanner_sys` introspection tables of a
//! source database, transforms each row into a warehouse record with a
//! deterministic idempotence key, and streams the result into a day-partitioned
//! warehouse table. The library is backend-agnostic and integrates through
//! explicit interfaces rather than embedding vendor SDKs; handles are supplied
//! by the caller and cancellation is an explicit input.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod core;
pub mod interfaces;
pub mod runtime;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use core::*;

pub use interfaces::Cell;
pub use interfaces::DecodeError;
pub use interfaces::MAX_BATCH_ROWS;
pub use interfaces::QueryStatement;
pub use interfaces::Row;
pub use interfaces::RowCursor;
pub use interfaces::RowFailure;
pub use interfaces::SinkError;
pub use interfaces::SinkRow;
pub use interfaces::SourceDatabase;
pub use interfaces::SourceError;
pub use interfaces::WarehouseSink;
pub use runtime::CopyError;
pub use runtime::CopyFailure;
pub use runtime::FLUSH_THRESHOLD;
pub use runtime::InMemorySink;
pub use runtime::InMemorySource;
pub use runtime::MAX_TEXT_BYTES;
pub use runtime::PutError;
pub use runtime::ReadError;
pub use runtime::RecordReader;
pub use runtime::StatsCopier;
pub use runtime::TableWriter;
pub use runtime::decode_record;
