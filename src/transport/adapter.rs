use async_trait::async_trait;
use futures::stream::BoxStream;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Connect error: {0}")]
    Connect(String),
    #[error("Publish error: {0}")]
    Publish(String),
    #[error("Subscribe error: {0}")]
    Subscribe(String),
}

/// A raw message as received off the wire, before decoding.
#[derive(Debug, Clone)]
pub struct RawMessage {
    pub channel: String,
    pub payload: Vec<u8>,
}

/// Infinite in receipt order until the underlying connection is lost, at
/// which point the stream ends. Reconnecting is the listener's job.
pub type MessageStream = BoxStream<'static, RawMessage>;

/// Seam over the publish/subscribe bus carrying the mesh.
///
/// Per-channel ordering follows publish order; interleaving across channels
/// is receipt order. Delivery is at-most-once with no replay.
#[async_trait]
pub trait MeshTransport: Send + Sync {
    /// Send a serialized envelope to a named channel.
    ///
    /// Returns the number of live subscribers observed at publish time.
    /// The count is informational, not an acknowledgment: zero subscribers
    /// is success, and a transport that cannot observe fan-out reports 0.
    async fn publish(&self, channel: &str, payload: Vec<u8>) -> Result<u64, TransportError>;

    /// Open a persistent subscription over the given channel set.
    async fn subscribe(&self, channels: &[String]) -> Result<MessageStream, TransportError>;

    /// Transport name for logging (e.g. "nats").
    fn name(&self) -> &str;
}
