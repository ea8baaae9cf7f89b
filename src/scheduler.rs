//! Playback scheduler: the background task that replays a trace.
//!
//! One task per session. The task exclusively owns the open reader, pulls
//! lines in order, classifies them, waits each valid record's delay, and
//! then publishes it to the sink with a wall-clock timestamp. The wait is a
//! cancellable timed wait (`select!` over the cancellation token), never a
//! plain sleep, so a stop request interrupts an in-flight suspension instead
//! of waiting for the next record boundary; a record whose wait was
//! interrupted is never published.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::parser::{self, LineOutcome};
use crate::sink::LocationSink;
use crate::source::WaypointReader;
use crate::waypoint::PositionFix;

/// Lifecycle of a playback session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlaybackState {
    /// No session has been started yet.
    Idle,

    /// The background task is replaying the trace.
    Running,

    /// A stop request was observed; teardown is in progress.
    Stopping,

    /// The session ended: source exhausted, read failure, or explicit stop.
    /// The source handle has been released.
    Stopped,
}

impl PlaybackState {
    /// True while a session exists and has not finished tearing down.
    pub fn is_active(self) -> bool {
        matches!(self, PlaybackState::Running | PlaybackState::Stopping)
    }
}

/// Replay the trace until exhaustion, read failure, or cancellation.
///
/// Owns the reader for the whole session and releases it exactly once, at
/// the single exit point, before `Stopped` is published.
pub(crate) async fn run<R, K>(
    mut reader: R,
    sink: K,
    state_tx: watch::Sender<PlaybackState>,
    cancel: CancellationToken,
    lines_processed: Arc<AtomicU64>,
) where
    R: WaypointReader,
    K: LocationSink,
{
    info!("playback session started");
    let mut line_number = 0u64;
    let mut published = 0u64;
    let mut stop_requested = false;

    loop {
        // Observe a stop request between lines
        if cancel.is_cancelled() {
            stop_requested = true;
            break;
        }

        match reader.next_line() {
            Ok(Some(line)) => {
                line_number += 1;
                lines_processed.store(line_number, Ordering::Relaxed);

                match parser::parse(&line) {
                    LineOutcome::Comment => continue,
                    LineOutcome::Malformed(reason) => {
                        // Malformed lines consume no playback time
                        warn!(line = line_number, %reason, "skipping malformed waypoint line");
                        continue;
                    }
                    LineOutcome::Valid(record) => {
                        // The record's delay runs before its publish; a zero
                        // delay publishes immediately
                        let delay = Duration::from_secs(record.delay_secs);
                        if !delay.is_zero() {
                            tokio::select! {
                                _ = cancel.cancelled() => {
                                    stop_requested = true;
                                    break;
                                }
                                _ = tokio::time::sleep(delay) => {}
                            }
                        }

                        // No publish may happen once the stop signal is seen
                        if cancel.is_cancelled() {
                            stop_requested = true;
                            break;
                        }

                        debug!(
                            line = line_number,
                            latitude = record.latitude,
                            longitude = record.longitude,
                            delay_secs = record.delay_secs,
                            "publishing position"
                        );

                        match sink.publish(PositionFix::now(&record)).await {
                            Ok(()) => published += 1,
                            Err(e) => {
                                warn!(line = line_number, error = %e, "position delivery failed, continuing");
                            }
                        }
                    }
                }
            }
            Ok(None) => {
                info!(lines = line_number, published, "waypoint source exhausted");
                break;
            }
            Err(e) => {
                // Treated like end-of-source: the session ends cleanly
                error!(error = %e, "read failure, ending playback session");
                break;
            }
        }
    }

    if stop_requested {
        let _ = state_tx.send(PlaybackState::Stopping);
        info!(lines = line_number, published, "stop request observed");
    }

    // Single release point for the source handle on every exit path;
    // the reader's Drop impl is only a backstop.
    reader.close();
    let _ = state_tx.send(PlaybackState::Stopped);
    info!("playback session stopped");
}
