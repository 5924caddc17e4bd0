use async_trait::async_trait;
use futures::StreamExt;
use futures::stream::select_all;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::broadcast;

use super::adapter::{MeshTransport, MessageStream, RawMessage, TransportError};

const CHANNEL_CAPACITY: usize = 256;

/// In-process mesh transport over broadcast channels.
///
/// Stands in for the live broker in tests and local runs: unlike the NATS
/// adapter it can observe real subscriber counts, and `sever()` injects a
/// connection-loss fault by ending every open subscription stream.
#[derive(Clone, Default)]
pub struct MemoryTransport {
    channels: Arc<Mutex<HashMap<String, broadcast::Sender<RawMessage>>>>,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop every live subscription stream, simulating a lost connection.
    /// Messages published before the next re-subscribe are not replayed.
    pub fn sever(&self) {
        self.channels.lock().clear();
    }

    fn sender_for(&self, channel: &str) -> broadcast::Sender<RawMessage> {
        self.channels
            .lock()
            .entry(channel.to_string())
            .or_insert_with(|| broadcast::channel(CHANNEL_CAPACITY).0)
            .clone()
    }
}

#[async_trait]
impl MeshTransport for MemoryTransport {
    async fn publish(&self, channel: &str, payload: Vec<u8>) -> Result<u64, TransportError> {
        let sender = self.sender_for(channel);
        let receivers = sender.receiver_count() as u64;
        let message = RawMessage {
            channel: channel.to_string(),
            payload,
        };
        // A send with no live receivers is not an error: subscribers may
        // simply not be connected yet.
        let _ = sender.send(message);
        Ok(receivers)
    }

    async fn subscribe(&self, channels: &[String]) -> Result<MessageStream, TransportError> {
        let mut streams = Vec::with_capacity(channels.len());
        for channel in channels {
            let rx = self.sender_for(channel).subscribe();
            let stream = futures::stream::unfold(rx, |mut rx| async move {
                loop {
                    match rx.recv().await {
                        Ok(msg) => return Some((msg, rx)),
                        Err(broadcast::error::RecvError::Lagged(_)) => continue,
                        Err(broadcast::error::RecvError::Closed) => return None,
                    }
                }
            });
            streams.push(stream.boxed());
        }
        Ok(select_all(streams).boxed())
    }

    fn name(&self) -> &str {
        "memory"
    }
}
