// Listener recovery: a lost connection triggers automatic resubscription to
// the same channel set, and messages published during the outage are lost
// (at-most-once, no replay).

use std::sync::Arc;
use std::time::Duration;

use mesh_relay_rs::listener::{LinkState, Listener};
use mesh_relay_rs::transport::adapter::MeshTransport;
use mesh_relay_rs::transport::memory::MemoryTransport;

#[tokio::test]
async fn test_reconnect_after_connection_loss() {
    let bus = Arc::new(MemoryTransport::new());
    let channels = vec!["new_tokens".to_string()];
    let mut listener =
        Listener::new(bus.clone(), channels).with_reconnect_delay(Duration::from_millis(30));

    // Deliver one message normally.
    let publisher = tokio::spawn({
        let bus = bus.clone();
        async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            bus.publish("new_tokens", b"m1".to_vec()).await.unwrap();
        }
    });
    let msg = listener.next().await;
    assert_eq!(msg.payload, b"m1".to_vec());
    assert_eq!(listener.state(), LinkState::Subscribed);
    publisher.await.unwrap();

    // Drop the connection, then publish during the outage: that message must
    // never be observed.
    bus.sever();
    bus.publish("new_tokens", b"m2-lost".to_vec()).await.unwrap();

    // Keep publishing m3 until the listener has resubscribed and caught one.
    let publisher = tokio::spawn({
        let bus = bus.clone();
        async move {
            for _ in 0..50 {
                bus.publish("new_tokens", b"m3".to_vec()).await.unwrap();
                tokio::time::sleep(Duration::from_millis(20)).await;
            }
        }
    });

    let msg = listener.next().await;
    assert_eq!(msg.payload, b"m3".to_vec(), "outage message must be lost");
    assert_eq!(listener.state(), LinkState::Subscribed);
    publisher.abort();
}
