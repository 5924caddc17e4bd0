use async_trait::async_trait;
use futures::StreamExt;
use futures::stream::select_all;
use tracing::info;

use super::adapter::{MeshTransport, MessageStream, RawMessage, TransportError};

/// NATS-backed mesh transport. Channels map 1:1 onto core NATS subjects.
pub struct NatsTransport {
    client: async_nats::Client,
}

impl NatsTransport {
    pub async fn connect(url: &str) -> Result<Self, TransportError> {
        let client = async_nats::connect(url)
            .await
            .map_err(|e| TransportError::Connect(e.to_string()))?;
        info!("Connected to NATS at {}", url);
        Ok(Self { client })
    }

    pub fn from_client(client: async_nats::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl MeshTransport for NatsTransport {
    async fn publish(&self, channel: &str, payload: Vec<u8>) -> Result<u64, TransportError> {
        self.client
            .publish(channel.to_string(), payload.into())
            .await
            .map_err(|e| TransportError::Publish(e.to_string()))?;
        // Core NATS publish is fire-and-forget: fan-out is not observable,
        // so the informational receiver count is always 0 here.
        Ok(0)
    }

    async fn subscribe(&self, channels: &[String]) -> Result<MessageStream, TransportError> {
        let mut streams = Vec::with_capacity(channels.len());
        for channel in channels {
            let sub = self
                .client
                .subscribe(channel.clone())
                .await
                .map_err(|e| TransportError::Subscribe(e.to_string()))?;
            streams.push(
                sub.map(|msg| RawMessage {
                    channel: msg.subject.to_string(),
                    payload: msg.payload.to_vec(),
                })
                .boxed(),
            );
        }
        Ok(select_all(streams).boxed())
    }

    fn name(&self) -> &str {
        "nats"
    }
}
