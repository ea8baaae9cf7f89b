//! Line classification for the waypoint trace format.
//!
//! The trace format is line oriented: one record per line, three
//! pipe-delimited fields `delay|latitude|longitude`, with `#`-prefixed
//! comment lines. Parsing is strict about shape and numeric conversion but
//! returns a structured outcome by value, never an error or panic: a
//! malformed line is an expected, recoverable event that the scheduler logs
//! and skips.
//!
//! Whitespace policy: each line is trimmed before classification (this
//! covers the `\r` left by CRLF sources), blank or whitespace-only lines
//! classify as [`LineOutcome::Comment`], and each field is trimmed before
//! numeric conversion.

use crate::waypoint::WaypointRecord;
use std::fmt;

/// Number of pipe-delimited fields in a record line.
const RECORD_FIELDS: usize = 3;

/// Classification of one raw trace line.
#[derive(Debug, Clone, PartialEq)]
pub enum LineOutcome {
    /// Comment or blank line; skipped silently, consumes no playback time.
    Comment,

    /// A well-formed record.
    Valid(WaypointRecord),

    /// A line that failed to parse. The scheduler logs the reason with the
    /// line number and moves on immediately.
    Malformed(MalformedReason),
}

/// Why a line failed to parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MalformedReason {
    /// The line did not split into exactly three pipe-delimited fields.
    /// Carries the count actually found.
    WrongFieldCount(usize),

    /// The delay field is not a non-negative whole number of seconds.
    BadDelay,

    /// The latitude field is not a decimal number in [-90, 90].
    BadLatitude,

    /// The longitude field is not a decimal number in [-180, 180].
    BadLongitude,
}

impl fmt::Display for MalformedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MalformedReason::WrongFieldCount(found) => {
                write!(f, "expected {RECORD_FIELDS} fields, found {found}")
            }
            MalformedReason::BadDelay => write!(f, "delay is not a non-negative integer"),
            MalformedReason::BadLatitude => write!(f, "latitude is not a decimal in [-90, 90]"),
            MalformedReason::BadLongitude => {
                write!(f, "longitude is not a decimal in [-180, 180]")
            }
        }
    }
}

/// Classify one raw line from a waypoint source.
pub fn parse(line: &str) -> LineOutcome {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return LineOutcome::Comment;
    }

    let fields: Vec<&str> = line.split('|').collect();
    if fields.len() != RECORD_FIELDS {
        return LineOutcome::Malformed(MalformedReason::WrongFieldCount(fields.len()));
    }

    let Ok(delay_secs) = fields[0].trim().parse::<u64>() else {
        return LineOutcome::Malformed(MalformedReason::BadDelay);
    };

    let Ok(latitude) = fields[1].trim().parse::<f64>() else {
        return LineOutcome::Malformed(MalformedReason::BadLatitude);
    };
    if !(-90.0..=90.0).contains(&latitude) {
        return LineOutcome::Malformed(MalformedReason::BadLatitude);
    }

    let Ok(longitude) = fields[2].trim().parse::<f64>() else {
        return LineOutcome::Malformed(MalformedReason::BadLongitude);
    };
    if !(-180.0..=180.0).contains(&longitude) {
        return LineOutcome::Malformed(MalformedReason::BadLongitude);
    }

    LineOutcome::Valid(WaypointRecord { delay_secs, latitude, longitude })
}
