// crates/statscopy-core/src/core/family.rs
// ============================================================================
// Module: Statscopy Source Families
// Description: Statistic families and their introspection source tables.
// Purpose: Name the twelve source tables and map each to its record shape.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! The source database exposes four statistics families (query, read,
//! transaction, lock), each aggregated at three granularities. That yields
//! twelve distinct source tables inside the `spanner_sys` introspection
//! namespace but only four record shapes; [`StatsTable::kind`] collapses a
//! table to its shape.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Stats Kind
// ============================================================================

/// Record shape discriminant for the four statistics families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatsKind {
    /// Per-query execution statistics.
    Query,
    /// Read shape statistics.
    Read,
    /// Transaction commit statistics.
    Txn,
    /// Lock contention statistics.
    Lock,
}

impl fmt::Display for StatsKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Query => "query",
            Self::Read => "read",
            Self::Txn => "txn",
            Self::Lock => "lock",
        };
        f.write_str(label)
    }
}

// ============================================================================
// SECTION: Stats Table
// ============================================================================

/// Fully qualified introspection source table for one family and granularity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatsTable {
    /// Query statistics aggregated per minute.
    QueryStatsTopMinute,
    /// Query statistics aggregated per ten minutes.
    QueryStatsTop10Minute,
    /// Query statistics aggregated per hour.
    QueryStatsTopHour,
    /// Read statistics aggregated per minute.
    ReadStatsTopMinute,
    /// Read statistics aggregated per ten minutes.
    ReadStatsTop10Minute,
    /// Read statistics aggregated per hour.
    ReadStatsTopHour,
    /// Transaction statistics aggregated per minute.
    TxnStatsTopMinute,
    /// Transaction statistics aggregated per ten minutes.
    TxnStatsTop10Minute,
    /// Transaction statistics aggregated per hour.
    TxnStatsTopHour,
    /// Lock statistics aggregated per minute.
    LockStatsTotalMinute,
    /// Lock statistics aggregated per ten minutes.
    LockStatsTotal10Minute,
    /// Lock statistics aggregated per hour.
    LockStatsTotalHour,
}

/// All twelve source tables in declaration order.
pub const ALL_STATS_TABLES: [StatsTable; 12] = [
    StatsTable::QueryStatsTopMinute,
    StatsTable::QueryStatsTop10Minute,
    StatsTable::QueryStatsTopHour,
    StatsTable::ReadStatsTopMinute,
    StatsTable::ReadStatsTop10Minute,
    StatsTable::ReadStatsTopHour,
    StatsTable::TxnStatsTopMinute,
    StatsTable::TxnStatsTop10Minute,
    StatsTable::TxnStatsTopHour,
    StatsTable::LockStatsTotalMinute,
    StatsTable::LockStatsTotal10Minute,
    StatsTable::LockStatsTotalHour,
];

impl StatsTable {
    /// Returns the record shape produced by this source table.
    #[must_use]
    pub const fn kind(self) -> StatsKind {
        match self {
            Self::QueryStatsTopMinute | Self::QueryStatsTop10Minute | Self::QueryStatsTopHour => {
                StatsKind::Query
            }
            Self::ReadStatsTopMinute | Self::ReadStatsTop10Minute | Self::ReadStatsTopHour => {
                StatsKind::Read
            }
            Self::TxnStatsTopMinute | Self::TxnStatsTop10Minute | Self::TxnStatsTopHour => {
                StatsKind::Txn
            }
            Self::LockStatsTotalMinute
            | Self::LockStatsTotal10Minute
            | Self::LockStatsTotalHour => StatsKind::Lock,
        }
    }

    /// Returns the fully qualified source table name.
    #[must_use]
    pub const fn qualified_name(self) -> &'static str {
        match self {
            Self::QueryStatsTopMinute => "spanner_sys.query_stats_top_minute",
            Self::QueryStatsTop10Minute => "spanner_sys.query_stats_top_10minute",
            Self::QueryStatsTopHour => "spanner_sys.query_stats_top_hour",
            Self::ReadStatsTopMinute => "spanner_sys.read_stats_top_minute",
            Self::ReadStatsTop10Minute => "spanner_sys.read_stats_top_10minute",
            Self::ReadStatsTopHour => "spanner_sys.read_stats_top_hour",
            Self::TxnStatsTopMinute => "spanner_sys.txn_stats_top_minute",
            Self::TxnStatsTop10Minute => "spanner_sys.txn_stats_top_10minute",
            Self::TxnStatsTopHour => "spanner_sys.txn_stats_top_hour",
            Self::LockStatsTotalMinute => "spanner_sys.lock_stats_total_minute",
            Self::LockStatsTotal10Minute => "spanner_sys.lock_stats_total_10minute",
            Self::LockStatsTotalHour => "spanner_sys.lock_stats_total_hour",
        }
    }
}

impl fmt::Display for StatsTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.qualified_name())
    }
}
