// Producer-side demo loop: periodically broadcasts synthetic detection
// events and pump alerts so a receiver can be exercised without live
// detection sources.

use rust_decimal_macros::dec;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tracing::{Level, error, info};
use tracing_subscriber::FmtSubscriber;

use mesh_relay_rs::config::Settings;
use mesh_relay_rs::broadcaster::Broadcaster;
use mesh_relay_rs::model::{MessageKind, TokenDetection};
use mesh_relay_rs::transport::nats::NatsTransport;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .expect("setting default subscriber failed");

    dotenv::dotenv().ok();
    let settings = Settings::new().unwrap_or_default();
    let location = settings.node.location.clone();

    let nats_url = settings.mesh.nats_url();
    info!("[{}] Mock broadcaster connecting to {}", location, nats_url);
    let transport = match NatsTransport::connect(&nats_url).await {
        Ok(t) => Arc::new(t),
        Err(e) => {
            error!("❌ Failed to connect to NATS: {}", e);
            std::process::exit(1);
        }
    };

    let broadcaster = Broadcaster::new(transport, location.clone());
    info!("[{}] Starting mock detection loop...", location);

    let mut tick: u64 = 0;
    loop {
        let detection = TokenDetection {
            address: format!("MockToken{:04}", tick),
            name: "Mock Token".to_string(),
            symbol: format!("MOCK{}", tick),
            platform: "pump_fun".to_string(),
            liquidity: dec!(1500),
            price: dec!(0.0023),
        };
        if let Err(e) = broadcaster.broadcast_new_token(&detection).await {
            error!("[{}] ❌ Broadcast failed: {}", location, e);
        }

        // Every third tick, also raise a pump alert.
        if tick % 3 == 0 {
            let data = json!({
                "token": "SolanaGlobalPubSub",
                "price": 0.0023,
                "reason": "Huge Volume Spike"
            });
            if let serde_json::Value::Object(map) = data {
                if let Err(e) = broadcaster
                    .broadcast_alert(MessageKind::PumpDetected, map)
                    .await
                {
                    error!("[{}] ❌ Broadcast failed: {}", location, e);
                }
            }
        }

        tick += 1;
        tokio::time::sleep(Duration::from_secs(10)).await;
    }
}
