//! Value types for waypoint playback

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::SystemTime;

/// One scripted position: the delay to wait before publishing it, and where
/// the device should appear to be.
///
/// Records are produced by the parser from one trace line and consumed
/// immediately by the scheduler; they are never mutated.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WaypointRecord {
    /// Whole seconds to wait before publishing this record. Zero is legal
    /// and means "publish immediately".
    pub delay_secs: u64,

    /// Latitude in decimal degrees, within [-90, 90].
    pub latitude: f64,

    /// Longitude in decimal degrees, within [-180, 180].
    pub longitude: f64,
}

impl WaypointRecord {
    /// Create a record without range validation.
    ///
    /// The parser is the validating entry point; this constructor is for
    /// callers that script traces programmatically.
    pub fn new(delay_secs: u64, latitude: f64, longitude: f64) -> Self {
        Self { delay_secs, latitude, longitude }
    }
}

impl fmt::Display for WaypointRecord {
    /// Formats back to the trace wire form, `delay|latitude|longitude`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}|{}|{}", self.delay_secs, self.latitude, self.longitude)
    }
}

/// A position as delivered to a [`LocationSink`](crate::LocationSink):
/// coordinates plus the wall-clock instant the scheduler published them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PositionFix {
    pub latitude: f64,
    pub longitude: f64,

    /// Wall-clock timestamp captured when the record was published.
    pub observed_at: SystemTime,
}

impl PositionFix {
    /// Build a fix from a record, stamping the current wall-clock time.
    pub fn now(record: &WaypointRecord) -> Self {
        Self {
            latitude: record.latitude,
            longitude: record.longitude,
            observed_at: SystemTime::now(),
        }
    }
}
