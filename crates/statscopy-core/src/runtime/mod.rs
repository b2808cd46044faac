// crates/statscopy-core/src/runtime/mod.rs
// ============================================================================
// Module: Statscopy Runtime
// Description: Copy engine, reader, writer, and in-memory backends.
// Purpose: Execute end-to-end per-family statistics copies.
// Dependencies: crate::{core, interfaces}
// ============================================================================

//! ## Overview
//! The runtime wires the value model to the interface seams: the reader
//! decodes cursor rows into records, the writer layers family schemas and
//! idempotence keys over the sink, and the copier drives both in lockstep.
//! In-memory backends support tests and local demos.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod copier;
pub mod memory;
pub mod reader;
pub mod writer;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use copier::CopyError;
pub use copier::CopyFailure;
pub use copier::FLUSH_THRESHOLD;
pub use copier::StatsCopier;
pub use memory::InMemoryCursor;
pub use memory::InMemorySink;
pub use memory::InMemorySource;
pub use memory::MAX_TEXT_BYTES;
pub use reader::ReadError;
pub use reader::RecordReader;
pub use reader::decode_record;
pub use writer::PutError;
pub use writer::TableWriter;
