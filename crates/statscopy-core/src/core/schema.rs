// crates/statscopy-core/src/core/schema.rs
// ============================================================================
// Module: Statscopy Destination Schemas
// Description: Warehouse schema descriptors for the four statistic families.
// Purpose: Define closed per-family column sets and the evolution rule.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Each family writes into a warehouse table with exactly the columns listed
//! here, all required unless marked repeated. Schemas are closed: additive
//! evolution is supported through [`TableSchema::is_superset_of`], column
//! removal is not. Destination tables are partitioned by the day of
//! `interval_end`.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::core::family::StatsKind;

// ============================================================================
// SECTION: Field Descriptors
// ============================================================================

/// Semantic column type understood by the warehouse sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    /// Point-in-time value.
    Timestamp,
    /// UTF-8 text.
    String,
    /// Boolean flag.
    Bool,
    /// 64-bit signed integer.
    Int64,
    /// 64-bit floating point.
    Float64,
    /// Opaque byte sequence.
    Bytes,
    /// Arbitrary-precision decimal.
    Numeric,
    /// Nested record with sub-fields.
    Record,
}

/// One destination column descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSchema {
    /// Destination column name.
    pub name: String,
    /// Semantic column type.
    pub field_type: FieldType,
    /// Whether a value must be present on every row.
    pub required: bool,
    /// Whether the column holds an ordered sequence of values.
    pub repeated: bool,
    /// Sub-fields for `Record` columns, empty otherwise.
    pub fields: Vec<FieldSchema>,
}

impl FieldSchema {
    /// Creates a required scalar column.
    #[must_use]
    pub fn required(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            required: true,
            repeated: false,
            fields: Vec::new(),
        }
    }

    /// Creates a repeated scalar column.
    #[must_use]
    pub fn repeated(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            required: false,
            repeated: true,
            fields: Vec::new(),
        }
    }

    /// Creates a repeated record column with the given sub-fields.
    #[must_use]
    pub fn repeated_record(name: impl Into<String>, fields: Vec<Self>) -> Self {
        Self {
            name: name.into(),
            field_type: FieldType::Record,
            required: false,
            repeated: true,
            fields,
        }
    }
}

// ============================================================================
// SECTION: Table Descriptors
// ============================================================================

/// Ordered set of destination columns for one table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSchema {
    /// Column descriptors in declaration order.
    pub fields: Vec<FieldSchema>,
}

impl TableSchema {
    /// Looks up a column descriptor by name.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldSchema> {
        self.fields.iter().find(|field| field.name == name)
    }

    /// Returns true when every column of `other` appears here unchanged.
    ///
    /// This is the additive-evolution rule: a proposed schema may replace an
    /// existing one only when it is a superset of it.
    #[must_use]
    pub fn is_superset_of(&self, other: &Self) -> bool {
        other.fields.iter().all(|required| {
            self.field(&required.name).is_some_and(|candidate| candidate == required)
        })
    }
}

/// Partitioning applied to a destination table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "granularity", rename_all = "snake_case")]
pub enum Partitioning {
    /// One partition per day of the named timestamp column.
    Day {
        /// Column supplying the partition timestamp.
        field: String,
    },
}

/// Full destination table specification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSpec {
    /// Destination columns.
    pub schema: TableSchema,
    /// Partitioning layout.
    pub partition: Partitioning,
}

// ============================================================================
// SECTION: Family Schemas
// ============================================================================

/// Builds the destination schema for one family.
///
/// The column sets are closed; the copier never writes a column that is not
/// listed here.
#[must_use]
pub fn schema_for(kind: StatsKind) -> TableSchema {
    let fields = match kind {
        StatsKind::Query => vec![
            FieldSchema::required("interval_end", FieldType::Timestamp),
            FieldSchema::required("text", FieldType::String),
            FieldSchema::required("text_truncated", FieldType::Bool),
            FieldSchema::required("text_fingerprint", FieldType::Int64),
            FieldSchema::required("execution_count", FieldType::Int64),
            FieldSchema::required("avg_latency_seconds", FieldType::Float64),
            FieldSchema::required("avg_rows", FieldType::Float64),
            FieldSchema::required("avg_bytes", FieldType::Float64),
            FieldSchema::required("avg_rows_scanned", FieldType::Float64),
            FieldSchema::required("avg_cpu_seconds", FieldType::Float64),
            FieldSchema::required("all_failed_execution_count", FieldType::Int64),
            FieldSchema::required("all_failed_avg_latency_seconds", FieldType::Float64),
            FieldSchema::required("cancelled_or_disconnected_execution_count", FieldType::Int64),
            FieldSchema::required("timed_out_execution_count", FieldType::Int64),
        ],
        StatsKind::Read => vec![
            FieldSchema::required("interval_end", FieldType::Timestamp),
            FieldSchema::repeated("read_columns", FieldType::String),
            FieldSchema::required("fprint", FieldType::Int64),
            FieldSchema::required("execution_count", FieldType::Int64),
            FieldSchema::required("avg_rows", FieldType::Float64),
            FieldSchema::required("avg_bytes", FieldType::Float64),
            FieldSchema::required("avg_cpu_seconds", FieldType::Float64),
            FieldSchema::required("avg_locking_delay_seconds", FieldType::Float64),
            FieldSchema::required("avg_client_wait_seconds", FieldType::Float64),
            FieldSchema::required("avg_leader_refresh_delay_seconds", FieldType::Float64),
        ],
        StatsKind::Txn => vec![
            FieldSchema::required("interval_end", FieldType::Timestamp),
            FieldSchema::required("fprint", FieldType::Int64),
            FieldSchema::repeated("read_columns", FieldType::String),
            FieldSchema::repeated("write_constructive_columns", FieldType::String),
            FieldSchema::repeated("write_delete_tables", FieldType::String),
            FieldSchema::required("commit_attempt_count", FieldType::Int64),
            FieldSchema::required("commit_abort_count", FieldType::Int64),
            FieldSchema::required("commit_retry_count", FieldType::Int64),
            FieldSchema::required("commit_failed_precondition_count", FieldType::Int64),
            FieldSchema::required("avg_participants", FieldType::Float64),
            FieldSchema::required("avg_total_latency_seconds", FieldType::Float64),
            FieldSchema::required("avg_commit_latency_seconds", FieldType::Float64),
            FieldSchema::required("avg_bytes", FieldType::Float64),
        ],
        StatsKind::Lock => vec![
            FieldSchema::required("interval_end", FieldType::Timestamp),
            FieldSchema::required("row_range_start_key", FieldType::Bytes),
            FieldSchema::required("lock_wait_seconds", FieldType::Float64),
            FieldSchema::repeated_record(
                "sample_lock_requests",
                vec![
                    FieldSchema::required("lock_mode", FieldType::String),
                    FieldSchema::required("column", FieldType::String),
                ],
            ),
        ],
    };
    TableSchema {
        fields,
    }
}

/// Builds the full destination specification for one family.
///
/// All families partition by the day of `interval_end`.
#[must_use]
pub fn table_spec_for(kind: StatsKind) -> TableSpec {
    TableSpec {
        schema: schema_for(kind),
        partition: Partitioning::Day {
            field: "interval_end".to_string(),
        },
    }
}
