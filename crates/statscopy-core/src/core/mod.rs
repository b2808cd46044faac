// crates/statscopy-core/src/core/mod.rs
// ============================================================================
// Module: Statscopy Core Types
// Description: Value types for the statistics copy pipeline.
// Purpose: Group families, records, schemas, queries, time, and cancellation.
// Dependencies: serde, serde_json, base64, thiserror, time
// ============================================================================

//! ## Overview
//! The core module holds the pure value model of the pipeline: the four
//! statistic families and their source tables, decoded records with
//! idempotence keys, destination schemas, the static query templates, the
//! interval-end time model, and the cancellation token. Nothing here performs
//! I/O.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod cancel;
pub mod family;
pub mod identifiers;
pub mod query;
pub mod record;
pub mod schema;
pub mod time;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use cancel::CancelToken;
pub use family::ALL_STATS_TABLES;
pub use family::StatsKind;
pub use family::StatsTable;
pub use identifiers::DatasetId;
pub use identifiers::ProjectId;
pub use identifiers::TableId;
pub use identifiers::TableRef;
pub use query::INTERVAL_END_PARAM;
pub use query::bind_interval_end;
pub use query::build_query;
pub use query::columns_for;
pub use record::LockStat;
pub use record::QueryStat;
pub use record::ReadStat;
pub use record::RecordError;
pub use record::SampleLockRequest;
pub use record::StatsRecord;
pub use record::TxnStat;
pub use schema::FieldSchema;
pub use schema::FieldType;
pub use schema::Partitioning;
pub use schema::TableSchema;
pub use schema::TableSpec;
pub use schema::schema_for;
pub use schema::table_spec_for;
pub use time::IntervalEnd;
pub use time::IntervalEndError;
