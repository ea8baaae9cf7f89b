//! Location sinks: where published positions go.
//!
//! [`LocationSink`] is the capability boundary between the playback engine
//! and whatever represents the device's current position (a platform
//! location-provider bridge, a test recorder, a channel). The contract is
//! deliberately small: publish succeeds or reports a delivery failure. The
//! scheduler never retries a failed publish; it logs and proceeds to the
//! next record.

use crate::waypoint::PositionFix;
use crate::{PlaybackError, Result};
use futures::{Stream, StreamExt};
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;

/// Consumer of published positions.
#[async_trait::async_trait]
pub trait LocationSink: Send + Sync + 'static {
    /// Publish the device's current position.
    ///
    /// An `Err` means this one delivery failed; it must not be interpreted
    /// as a request to stop playback.
    async fn publish(&self, fix: PositionFix) -> Result<()>;
}

#[async_trait::async_trait]
impl<K: LocationSink> LocationSink for std::sync::Arc<K> {
    async fn publish(&self, fix: PositionFix) -> Result<()> {
        (**self).publish(fix).await
    }
}

/// Watch-channel-backed sink.
///
/// Holds only the latest position; consumers that fall behind observe the
/// newest fix, not every intermediate one. Suits "current device position"
/// semantics where stale fixes have no value.
pub struct WatchSink {
    tx: watch::Sender<Option<PositionFix>>,
}

impl WatchSink {
    /// Create a sink and the receiver observing it.
    ///
    /// The receiver starts at `None` until the first publish.
    pub fn channel() -> (Self, watch::Receiver<Option<PositionFix>>) {
        let (tx, rx) = watch::channel(None);
        (Self { tx }, rx)
    }
}

#[async_trait::async_trait]
impl LocationSink for WatchSink {
    async fn publish(&self, fix: PositionFix) -> Result<()> {
        self.tx
            .send(Some(fix))
            .map_err(|_| PlaybackError::delivery_failed("all position receivers dropped"))
    }
}

/// Adapt a [`WatchSink`] receiver into a position stream, skipping the
/// initial `None`.
pub fn position_stream(
    rx: watch::Receiver<Option<PositionFix>>,
) -> impl Stream<Item = PositionFix> + 'static {
    WatchStream::new(rx).filter_map(|opt| async move { opt })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::waypoint::WaypointRecord;
    use futures::StreamExt;

    #[tokio::test]
    async fn watch_sink_delivers_latest_fix() {
        let (sink, rx) = WatchSink::channel();
        let mut stream = Box::pin(position_stream(rx));

        let fix = PositionFix::now(&WaypointRecord::new(0, 12.5, -7.25));
        sink.publish(fix).await.expect("publish");

        let received = stream.next().await.expect("stream yields the fix");
        assert_eq!(received.latitude, 12.5);
        assert_eq!(received.longitude, -7.25);
    }

    #[tokio::test]
    async fn publish_fails_once_all_receivers_dropped() {
        let (sink, rx) = WatchSink::channel();
        drop(rx);

        let fix = PositionFix::now(&WaypointRecord::new(0, 1.0, 2.0));
        let err = sink.publish(fix).await.expect_err("no receivers left");
        assert!(err.is_recoverable());
    }
}
