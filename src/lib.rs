//! Timed waypoint playback engine for simulated device location.
//!
//! Waytrace replays a scripted movement trace (an ordered sequence of
//! timestamped geographic waypoints) into a consumer that represents the
//! current position of a device. It lets a location-aware system run
//! end-to-end tests without GPS hardware, with realistic timing and
//! tolerance of malformed input.
//!
//! # Features
//!
//! - **Realistic pacing**: each waypoint is published after its scripted
//!   delay, on a dedicated background task
//! - **Responsive stop**: delays are cancellable waits, so `stop()` takes
//!   effect mid-suspension, not at the next record boundary
//! - **Fault tolerance**: malformed lines and failed sink writes are logged
//!   and skipped; one bad line never aborts a good trace
//! - **Pluggable edges**: sources and sinks are small traits
//!
//! # Trace Format
//!
//! UTF-8 text, one record per line, three pipe-delimited fields
//! `delay|latitude|longitude` (delay in whole seconds); `#`-prefixed and
//! blank lines are skipped.
//!
//! ## Example (file playback)
//!
//! ```rust,no_run
//! use futures::StreamExt;
//! use waytrace::{Waytrace, WatchSink, position_stream};
//!
//! #[tokio::main]
//! async fn main() -> waytrace::Result<()> {
//!     let (sink, positions) = WatchSink::channel();
//!     let controller = Waytrace::from_file("route.txt", sink);
//!
//!     controller.start()?;
//!
//!     let mut stream = std::pin::pin!(position_stream(positions));
//!     while let Some(fix) = stream.next().await {
//!         println!("now at {}, {}", fix.latitude, fix.longitude);
//!     }
//!     Ok(())
//! }
//! ```

// Core types and error handling
mod error;
mod waypoint;

// Playback engine
pub mod controller;
pub mod parser;
pub mod scheduler;
pub mod sink;
pub mod source;

// Core exports
pub use error::{PlaybackError, Result};
pub use waypoint::{PositionFix, WaypointRecord};

// Engine exports
pub use controller::PlaybackController;
pub use parser::{LineOutcome, MalformedReason, parse};
pub use scheduler::PlaybackState;
pub use sink::{LocationSink, WatchSink, position_stream};
pub use source::{FileSource, MemorySource, WaypointReader, WaypointSource};

/// Unified entry point for waypoint playback.
///
/// # Examples
///
/// ## File-backed trace
/// ```rust,no_run
/// use waytrace::{Waytrace, WatchSink};
///
/// #[tokio::main]
/// async fn main() -> waytrace::Result<()> {
///     let (sink, _positions) = WatchSink::channel();
///     let controller = Waytrace::from_file("route.txt", sink);
///     controller.start()?;
///     controller.wait_until_stopped().await;
///     Ok(())
/// }
/// ```
///
/// ## Inline trace
/// ```rust,no_run
/// use waytrace::{Waytrace, WatchSink};
///
/// # #[tokio::main]
/// # async fn main() -> waytrace::Result<()> {
/// let (sink, _positions) = WatchSink::channel();
/// let controller = Waytrace::from_trace("0|47.6|-122.3\n1|47.7|-122.4", sink);
/// controller.start()?;
/// # Ok(())
/// # }
/// ```
pub struct Waytrace;

impl Waytrace {
    /// Build a controller replaying a trace file.
    ///
    /// The file is not opened until [`PlaybackController::start`]; a missing
    /// or unreadable file surfaces there as
    /// [`PlaybackError::SourceUnavailable`].
    pub fn from_file<P, K>(path: P, sink: K) -> PlaybackController<FileSource, K>
    where
        P: AsRef<std::path::Path>,
        K: LocationSink,
    {
        PlaybackController::new(FileSource::new(path), sink)
    }

    /// Build a controller replaying an in-memory trace.
    pub fn from_trace<K>(trace: impl Into<String>, sink: K) -> PlaybackController<MemorySource, K>
    where
        K: LocationSink,
    {
        PlaybackController::new(MemorySource::new(trace), sink)
    }
}
