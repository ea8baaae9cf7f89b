//! Error types for waypoint playback.
//!
//! All errors implement the `std::error::Error` trait and carry structured
//! context for diagnostics.
//!
//! ## Error Categories
//!
//! - **Source Errors**: the trace resource could not be opened or read
//! - **Delivery Errors**: the location sink rejected a published position
//! - **Usage Errors**: the control surface was called in an invalid state
//!
//! ## Propagation Policy
//!
//! Only [`PlaybackError::SourceUnavailable`] and
//! [`PlaybackError::AlreadyRunning`] surface synchronously from the control
//! surface. Everything else is in-stream: the scheduler logs it, skips the
//! offending line or publish, and keeps replaying. One bad line or one
//! failed sink write never aborts an otherwise-good trace.
//!
//! ```rust
//! use waytrace::PlaybackError;
//!
//! let error = PlaybackError::delivery_failed("bridge not registered");
//! if error.is_recoverable() {
//!     println!("playback continues past this error");
//! }
//! ```

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for playback operations.
pub type Result<T, E = PlaybackError> = std::result::Result<T, E>;

/// Main error type for waypoint playback operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum PlaybackError {
    /// The trace resource could not be located or opened. Fatal to a single
    /// `start()` attempt; reported to the caller, never retried.
    #[error("waypoint source unavailable: {path}")]
    SourceUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A mid-stream read failed. Terminates the current session cleanly, as
    /// if end-of-source had been reached.
    #[error("read failure at line {line}")]
    Read {
        line: u64,
        #[source]
        source: std::io::Error,
    },

    /// The sink rejected a published position. Logged; playback continues
    /// with the next record.
    #[error("position delivery failed: {reason}")]
    Delivery {
        reason: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// `start()` was called while a session was still active.
    #[error("a playback session is already running")]
    AlreadyRunning,
}

impl PlaybackError {
    /// Returns whether playback continues past this error.
    ///
    /// Recoverable errors are handled inside the scheduler (logged and
    /// skipped); non-recoverable ones end or reject a session.
    pub fn is_recoverable(&self) -> bool {
        match self {
            PlaybackError::Delivery { .. } => true,
            PlaybackError::SourceUnavailable { .. } => false,
            PlaybackError::Read { .. } => false,
            PlaybackError::AlreadyRunning => false,
        }
    }

    /// Helper constructor for open failures with path context.
    pub fn source_unavailable(path: PathBuf, source: std::io::Error) -> Self {
        PlaybackError::SourceUnavailable { path, source }
    }

    /// Helper constructor for mid-stream read failures.
    pub fn read_failure(line: u64, source: std::io::Error) -> Self {
        PlaybackError::Read { line, source }
    }

    /// Helper constructor for sink delivery failures.
    pub fn delivery_failed(reason: impl Into<String>) -> Self {
        PlaybackError::Delivery { reason: reason.into(), source: None }
    }

    /// Helper constructor for sink delivery failures with an underlying cause.
    pub fn delivery_failed_with_source(
        reason: impl Into<String>,
        source: Box<dyn std::error::Error + Send + Sync>,
    ) -> Self {
        PlaybackError::Delivery { reason: reason.into(), source: Some(source) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[cfg(test)]
    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn error_messages_format_correctly_with_arbitrary_context(
                reason in ".*",
                line in 1u64..100_000u64,
                path_stem in "[a-z]{1,16}"
            ) {
                // Property: error messages contain their structured context
                let path = PathBuf::from(format!("/traces/{}.txt", path_stem));
                let open_err = PlaybackError::source_unavailable(
                    path.clone(),
                    std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
                );
                prop_assert!(open_err.to_string().contains(&path.display().to_string()));

                let read_err = PlaybackError::read_failure(
                    line,
                    std::io::Error::other("disconnected"),
                );
                prop_assert!(read_err.to_string().contains(&line.to_string()));

                let delivery_err = PlaybackError::delivery_failed(reason.clone());
                prop_assert!(delivery_err.to_string().contains(&reason));
            }

            #[test]
            fn source_chaining_preserves_underlying_cause(base_message in ".*") {
                // Property: the io cause stays reachable through Error::source
                let err = PlaybackError::read_failure(
                    7,
                    std::io::Error::other(base_message.clone()),
                );
                let source = std::error::Error::source(&err).expect("read error has a source");
                prop_assert_eq!(source.to_string(), base_message);
            }
        }
    }

    #[test]
    fn error_traits_validation() {
        // Compile-time check: PlaybackError must be Send + Sync + 'static
        fn assert_send_sync_static<T: Send + Sync + 'static>() {}
        assert_send_sync_static::<PlaybackError>();

        let error = PlaybackError::delivery_failed("test");
        let _: &dyn std::error::Error = &error;
    }

    #[test]
    fn recoverability_classification() {
        assert!(PlaybackError::delivery_failed("sink offline").is_recoverable());
        assert!(!PlaybackError::AlreadyRunning.is_recoverable());
        assert!(
            !PlaybackError::source_unavailable(
                PathBuf::from("/missing"),
                std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
            )
            .is_recoverable()
        );
        assert!(!PlaybackError::read_failure(3, std::io::Error::other("eof")).is_recoverable());
    }
}
