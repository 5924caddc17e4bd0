use std::sync::Arc;
use std::time::Duration;
use tracing::{Level, error, info, warn};
use tracing_subscriber::FmtSubscriber;

use mesh_relay_rs::config::Settings;
use mesh_relay_rs::dispatcher::Dispatcher;
use mesh_relay_rs::listener::Listener;
use mesh_relay_rs::notifier::{LogNotifier, NotifySink, TelegramNotifier};
use mesh_relay_rs::transport::adapter::MeshTransport;
use mesh_relay_rs::transport::nats::NatsTransport;
use mesh_relay_rs::venue::{ExecutionVenue, PaperVenue};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .expect("setting default subscriber failed");

    info!("╔═══════════════════════════════════════════════════════════════╗");
    info!("║               MESH RECEIVER - Signal Relay Node               ║");
    info!("║           Global detection mesh + sniper dispatch             ║");
    info!("╚═══════════════════════════════════════════════════════════════╝");

    // Load environment variables
    dotenv::dotenv().ok();

    let settings = match Settings::new() {
        Ok(s) => s,
        Err(e) => {
            error!("❌ Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };
    if let Err(e) = settings.validate() {
        error!("❌ Invalid configuration: {}", e);
        std::process::exit(1);
    }

    // Connect to NATS
    let nats_url = settings.mesh.nats_url();
    info!("Connecting to NATS at {}", nats_url);
    let transport: Arc<dyn MeshTransport> = match NatsTransport::connect(&nats_url).await {
        Ok(t) => Arc::new(t),
        Err(e) => {
            error!("❌ Failed to connect to NATS: {}", e);
            std::process::exit(1);
        }
    };

    // Notification sink
    let notifier: Arc<dyn NotifySink> = match &settings.telegram {
        Some(telegram) if telegram.enabled => {
            match TelegramNotifier::new(telegram.bot_token.clone(), telegram.chat_id.clone()) {
                Ok(t) => {
                    info!("✅ Telegram notifications enabled");
                    Arc::new(t)
                }
                Err(e) => {
                    error!("❌ Failed to build Telegram client: {}", e);
                    std::process::exit(1);
                }
            }
        }
        _ => {
            info!("Telegram not configured, logging notifications only");
            Arc::new(LogNotifier)
        }
    };

    // Execution venue
    let venue: Option<Arc<dyn ExecutionVenue>> = if settings.sniper.enabled {
        if let Some(execution) = &settings.execution {
            if execution.mode != "paper" {
                warn!(
                    "Execution mode '{}' not supported, falling back to paper",
                    execution.mode
                );
            }
        }
        info!(
            "🎯 Sniper enabled - {} SOL per buy, min liquidity ${}",
            settings.sniper.buy_amount, settings.sniper.min_liquidity
        );
        Some(Arc::new(PaperVenue::new()))
    } else {
        info!("💤 Sniper disabled, running notify-only");
        None
    };

    let channels = settings.mesh.channels();
    let mut listener = Listener::new(transport, channels.clone())
        .with_reconnect_delay(Duration::from_millis(settings.mesh.reconnect_delay_ms()));
    let mut dispatcher = Dispatcher::new(settings.sniper.clone(), notifier.clone(), venue);

    info!("📡 Subscribing to channels: {:?}", channels);
    if let Err(e) = notifier
        .notify_raw(&format!(
            "🌍 Mesh receiver online at {} ({} channels)",
            settings.node.location,
            channels.len()
        ))
        .await
    {
        warn!("Startup notification failed: {}", e);
    }

    info!("🌍 Receiver started, waiting for signals...");

    // One message is processed end-to-end before the next is pulled; the
    // receive await is the only suspension point besides external I/O.
    loop {
        tokio::select! {
            msg = listener.next() => {
                dispatcher.dispatch(&msg).await;
            }
            _ = tokio::time::sleep(Duration::from_secs(60)) => {
                info!("Heartbeat... open positions: {}", dispatcher.ledger().len());
            }
        }
    }
}
