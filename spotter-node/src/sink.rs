//! Destinations for located candidates

use async_trait::async_trait;
use spotter_core::{Error, PointStamped, Result};
use tokio::sync::mpsc;

/// Receives every candidate the spotter publishes
#[async_trait]
pub trait CandidateSink: Send + Sync {
    async fn publish(&self, candidate: PointStamped) -> Result<()>;
}

/// Forwards candidates into a bounded tokio channel
pub struct ChannelSink {
    sender: mpsc::Sender<PointStamped>,
}

impl ChannelSink {
    pub fn new(sender: mpsc::Sender<PointStamped>) -> Self {
        Self { sender }
    }

    /// Sink plus the receiving end of a fresh channel
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<PointStamped>) {
        let (sender, receiver) = mpsc::channel(capacity);
        (Self::new(sender), receiver)
    }
}

#[async_trait]
impl CandidateSink for ChannelSink {
    async fn publish(&self, candidate: PointStamped) -> Result<()> {
        self.sender
            .send(candidate)
            .await
            .map_err(|_| Error::ChannelClosed("candidate receiver dropped".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use spotter_core::{Header, Point3};

    fn candidate() -> PointStamped {
        PointStamped::new(Header::now("/camera_link"), Point3::new(1.0, 2.0, 3.0))
    }

    #[test]
    fn test_channel_sink_delivers() {
        let (sink, mut rx) = ChannelSink::channel(4);
        tokio_test::block_on(sink.publish(candidate())).unwrap();
        let received = rx.try_recv().unwrap();
        assert_eq!(received.point, Point3::new(1.0, 2.0, 3.0));
        assert_eq!(received.header.frame_id, "/camera_link");
    }

    #[test]
    fn test_channel_sink_closed() {
        let (sink, rx) = ChannelSink::channel(1);
        drop(rx);
        let result = tokio_test::block_on(sink.publish(candidate()));
        assert!(matches!(result, Err(Error::ChannelClosed(_))));
    }
}
