use futures::StreamExt;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{info, warn};

use crate::transport::adapter::{MeshTransport, MessageStream, RawMessage};

const DEFAULT_RECONNECT_DELAY_MS: u64 = 2000;

/// Link state of the long-lived subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    Disconnected,
    Connecting,
    Subscribed,
}

/// Long-lived subscriber to the mesh channel set.
///
/// `next()` yields an infinite sequence of raw messages in receipt order.
/// On connection loss the listener re-subscribes to the same channel set
/// after a fixed delay, forever; messages published during the outage are
/// lost (at-most-once). Recovery is a flat state loop, never recursion, so
/// an unstable broker cannot grow the call stack.
pub struct Listener {
    transport: Arc<dyn MeshTransport>,
    channels: Vec<String>,
    reconnect_delay: Duration,
    state: LinkState,
    stream: Option<MessageStream>,
}

impl Listener {
    pub fn new(transport: Arc<dyn MeshTransport>, channels: Vec<String>) -> Self {
        Self {
            transport,
            channels,
            reconnect_delay: Duration::from_millis(DEFAULT_RECONNECT_DELAY_MS),
            state: LinkState::Disconnected,
            stream: None,
        }
    }

    pub fn with_reconnect_delay(mut self, delay: Duration) -> Self {
        self.reconnect_delay = delay;
        self
    }

    pub fn state(&self) -> LinkState {
        self.state
    }

    /// Wait for the next incoming message, reconnecting as needed.
    pub async fn next(&mut self) -> RawMessage {
        loop {
            if self.stream.is_none() {
                self.state = LinkState::Connecting;
                match self.transport.subscribe(&self.channels).await {
                    Ok(stream) => {
                        self.stream = Some(stream);
                        self.state = LinkState::Subscribed;
                        info!(
                            transport = self.transport.name(),
                            channels = ?self.channels,
                            "Subscribed to mesh channels"
                        );
                    }
                    Err(e) => {
                        warn!("Subscribe failed: {}. Retrying...", e);
                        self.state = LinkState::Disconnected;
                        sleep(self.reconnect_delay).await;
                        continue;
                    }
                }
            }

            if let Some(stream) = self.stream.as_mut() {
                match stream.next().await {
                    Some(msg) => return msg,
                    None => {
                        warn!("Connection lost. Reconnecting...");
                        self.stream = None;
                        self.state = LinkState::Disconnected;
                        sleep(self.reconnect_delay).await;
                    }
                }
            }
        }
    }
}
