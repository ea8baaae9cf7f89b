//! Control surface for waypoint playback.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::scheduler::{self, PlaybackState};
use crate::sink::LocationSink;
use crate::source::WaypointSource;
use crate::{PlaybackError, Result};

/// Per-session handles retained by the controller.
///
/// The background task owns the open reader; the controller keeps only the
/// stop signal and the read-only diagnostics.
struct Session {
    cancel: CancellationToken,
    state_rx: watch::Receiver<PlaybackState>,
    lines_processed: Arc<AtomicU64>,
}

/// Starts and stops playback sessions over one source/sink pair.
///
/// At most one session is active at a time; `start()` while a session is
/// still active fails fast with [`PlaybackError::AlreadyRunning`]. After a
/// session reaches [`PlaybackState::Stopped`], `start()` may be called again
/// and replays the source from the beginning.
///
/// Both `start()` and `stop()` are non-blocking: `start()` hands the opened
/// reader to a background task and returns; `stop()` signals the task and
/// returns, with teardown completing asynchronously.
///
/// # Example
///
/// ```rust,no_run
/// use waytrace::{MemorySource, PlaybackController, WatchSink};
///
/// #[tokio::main]
/// async fn main() -> waytrace::Result<()> {
///     let (sink, positions) = WatchSink::channel();
///     let source = MemorySource::new("0|47.6|-122.3\n2|47.7|-122.4");
///
///     let controller = PlaybackController::new(source, sink);
///     controller.start()?;
///     controller.wait_until_stopped().await;
///     # let _ = positions;
///     Ok(())
/// }
/// ```
pub struct PlaybackController<S, K>
where
    S: WaypointSource,
    K: LocationSink,
{
    source: S,
    sink: Arc<K>,
    session: Mutex<Option<Session>>,
}

impl<S, K> PlaybackController<S, K>
where
    S: WaypointSource,
    K: LocationSink,
{
    /// Create a controller. Nothing is opened until [`start`](Self::start).
    pub fn new(source: S, sink: K) -> Self {
        Self { source, sink: Arc::new(sink), session: Mutex::new(None) }
    }

    /// Start a playback session.
    ///
    /// Opens the source (surfacing [`PlaybackError::SourceUnavailable`]
    /// synchronously on a missing or unreadable resource), spawns the
    /// scheduler task, and returns without waiting for playback.
    ///
    /// Must be called from within a Tokio runtime.
    ///
    /// # Errors
    ///
    /// [`PlaybackError::AlreadyRunning`] if a session exists and has not yet
    /// reached [`PlaybackState::Stopped`]; no second reader is opened and no
    /// second task is spawned in that case.
    pub fn start(&self) -> Result<()> {
        let mut session = self.session.lock().expect("session lock poisoned");

        if let Some(active) = session.as_ref() {
            if active.state_rx.borrow().is_active() {
                return Err(PlaybackError::AlreadyRunning);
            }
        }

        // Open before spawning so configuration errors reach the caller
        let reader = self.source.open()?;

        let cancel = CancellationToken::new();
        let (state_tx, state_rx) = watch::channel(PlaybackState::Running);
        let lines_processed = Arc::new(AtomicU64::new(0));

        tokio::spawn(scheduler::run(
            reader,
            Arc::clone(&self.sink),
            state_tx,
            cancel.clone(),
            Arc::clone(&lines_processed),
        ));

        info!("playback session spawned");
        *session = Some(Session { cancel, state_rx, lines_processed });
        Ok(())
    }

    /// Request that the current session stop.
    ///
    /// Idempotent: a no-op when idle or already stopped. The background task
    /// observes the signal asynchronously, interrupts any in-flight delay,
    /// releases the source handle, and transitions to
    /// [`PlaybackState::Stopped`]; no further positions are published after
    /// the task observes the signal. Use
    /// [`wait_until_stopped`](Self::wait_until_stopped) to join.
    pub fn stop(&self) {
        let session = self.session.lock().expect("session lock poisoned");
        if let Some(active) = session.as_ref() {
            debug!("stop requested");
            active.cancel.cancel();
        }
    }

    /// Current session state; [`PlaybackState::Idle`] before the first start.
    pub fn state(&self) -> PlaybackState {
        let session = self.session.lock().expect("session lock poisoned");
        session.as_ref().map_or(PlaybackState::Idle, |s| *s.state_rx.borrow())
    }

    /// True while a session is running or tearing down.
    pub fn is_running(&self) -> bool {
        self.state().is_active()
    }

    /// Lines pulled from the source by the current (or last) session,
    /// including comments and malformed lines. Diagnostic only.
    pub fn lines_processed(&self) -> u64 {
        let session = self.session.lock().expect("session lock poisoned");
        session.as_ref().map_or(0, |s| s.lines_processed.load(Ordering::Relaxed))
    }

    /// Wait until the current session reaches [`PlaybackState::Stopped`].
    ///
    /// Completes immediately when no session has been started.
    pub async fn wait_until_stopped(&self) {
        let state_rx = {
            let session = self.session.lock().expect("session lock poisoned");
            session.as_ref().map(|s| s.state_rx.clone())
        };
        if let Some(mut rx) = state_rx {
            // wait_for inspects the current value first, so a session that
            // already stopped (and whose sender is gone) resolves immediately
            let _ = rx.wait_for(|state| *state == PlaybackState::Stopped).await;
        }
    }
}

impl<S, K> Drop for PlaybackController<S, K>
where
    S: WaypointSource,
    K: LocationSink,
{
    fn drop(&mut self) {
        debug!("dropping playback controller");
        // Cancel any live session on drop for clean shutdown
        self.stop();
    }
}
