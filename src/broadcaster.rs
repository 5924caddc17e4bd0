use serde_json::{Map, Value};
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

use crate::channels::{CHANNEL_ALERTS, CHANNEL_NEW_TOKENS};
use crate::codec::{self, CodecError};
use crate::model::{Envelope, MessageKind, TokenDetection};
use crate::transport::adapter::{MeshTransport, TransportError};

#[derive(Error, Debug)]
pub enum BroadcastError {
    #[error(transparent)]
    Codec(#[from] CodecError),
    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// Producer-side publisher: stamps the node's origin and the send time onto
/// every envelope before it hits the wire.
///
/// Failures are reported, never retried here; retry policy belongs to the
/// caller. The returned receiver count is informational only.
pub struct Broadcaster {
    transport: Arc<dyn MeshTransport>,
    origin: String,
}

impl Broadcaster {
    pub fn new(transport: Arc<dyn MeshTransport>, origin: impl Into<String>) -> Self {
        Self {
            transport,
            origin: origin.into(),
        }
    }

    /// Broadcast a new token detection on the detection channel.
    pub async fn broadcast_new_token(
        &self,
        detection: &TokenDetection,
    ) -> Result<u64, BroadcastError> {
        let envelope = Envelope::new(
            MessageKind::NewToken,
            self.origin.clone(),
            detection.to_data(),
        );
        let receivers = self.send(CHANNEL_NEW_TOKENS, &envelope).await?;
        info!(
            "[{}] 🚀 Broadcast new token {} -> {} receivers",
            self.origin, detection.symbol, receivers
        );
        Ok(receivers)
    }

    /// Broadcast a generic alert on the alerts channel.
    pub async fn broadcast_alert(
        &self,
        kind: MessageKind,
        data: Map<String, Value>,
    ) -> Result<u64, BroadcastError> {
        let envelope = Envelope::new(kind.clone(), self.origin.clone(), data);
        let receivers = self.send(CHANNEL_ALERTS, &envelope).await?;
        info!(
            "[{}] 📡 Broadcast {} -> {} receivers",
            self.origin, kind, receivers
        );
        Ok(receivers)
    }

    async fn send(&self, channel: &str, envelope: &Envelope) -> Result<u64, BroadcastError> {
        let payload = codec::encode(envelope)?;
        Ok(self.transport.publish(channel, payload).await?)
    }
}
