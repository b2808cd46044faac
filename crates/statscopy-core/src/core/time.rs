// crates/statscopy-core/src/core/time.rs
// ============================================================================
// Module: Statscopy Time Model
// Description: Canonical interval-end timestamp for statistics windows.
// Purpose: Provide deterministic interval identities and query-parameter text.
// Dependencies: serde, time, thiserror
// ============================================================================

//! ## Overview
//! Every statistics row is labelled by the right edge of its aggregation
//! window. The copier uses that instant both as a query filter and as part of
//! every record's identity, so it is kept as an explicit caller-supplied value
//! at second precision. The core never reads wall-clock time to produce one.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;
use time::OffsetDateTime;
use time::PrimitiveDateTime;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;

// ============================================================================
// SECTION: Interval End
// ============================================================================

/// Query-parameter layout for interval ends: UTC at second precision.
const PARAM_FORMAT: &[BorrowedFormatItem<'_>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");

/// Errors raised when an interval end cannot be rendered.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IntervalEndError {
    /// The unix-second value lies outside the representable calendar range.
    #[error("interval end out of range: {0} unix seconds")]
    OutOfRange(i64),
    /// The formatting machinery rejected the value.
    #[error("interval end format failure: {0}")]
    Format(String),
    /// Parameter text does not match the `YYYY-MM-DD HH:MM:SS` layout.
    #[error("interval end parameter malformed: {0}")]
    Malformed(String),
}

/// Right edge of a statistics aggregation window.
///
/// # Invariants
/// - Values are explicitly provided by callers; the core never reads
///   wall-clock time.
/// - A zero value marks a record that failed to carry its window label and is
///   rejected before reaching the sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IntervalEnd(i64);

impl IntervalEnd {
    /// Creates an interval end from unix seconds.
    #[must_use]
    pub const fn from_unix_seconds(seconds: i64) -> Self {
        Self(seconds)
    }

    /// Creates an interval end from a calendar instant, truncated to seconds.
    #[must_use]
    pub const fn from_datetime(instant: OffsetDateTime) -> Self {
        Self(instant.unix_timestamp())
    }

    /// Returns the interval end as unix seconds.
    #[must_use]
    pub const fn unix_seconds(self) -> i64 {
        self.0
    }

    /// Returns true when the interval end carries no window label.
    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Renders the `@IntervalEnd` query-parameter text (`YYYY-MM-DD HH:MM:SS`, UTC).
    ///
    /// # Errors
    ///
    /// Returns [`IntervalEndError`] when the value cannot be represented as a
    /// calendar instant.
    pub fn to_param(self) -> Result<String, IntervalEndError> {
        let instant = OffsetDateTime::from_unix_timestamp(self.0)
            .map_err(|_| IntervalEndError::OutOfRange(self.0))?;
        instant.format(PARAM_FORMAT).map_err(|err| IntervalEndError::Format(err.to_string()))
    }

    /// Parses query-parameter text back into an interval end.
    ///
    /// # Errors
    ///
    /// Returns [`IntervalEndError::Malformed`] when the text does not match
    /// the `YYYY-MM-DD HH:MM:SS` layout.
    pub fn parse_param(text: &str) -> Result<Self, IntervalEndError> {
        let parsed = PrimitiveDateTime::parse(text, PARAM_FORMAT)
            .map_err(|_| IntervalEndError::Malformed(text.to_string()))?;
        Ok(Self(parsed.assume_utc().unix_timestamp()))
    }

    /// Returns the day index of the interval end, used for day partitioning.
    #[must_use]
    pub const fn day_index(self) -> i64 {
        self.0.div_euclid(86_400)
    }
}
