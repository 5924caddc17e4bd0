use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::codec;
use crate::decision::{self, SniperPolicy};
use crate::ledger::PositionLedger;
use crate::model::{Envelope, MessageKind, Position, PumpAlert, TokenDetection};
use crate::notifier::NotifySink;
use crate::transport::adapter::RawMessage;
use crate::venue::ExecutionVenue;

/// Routes decoded envelopes to their handler and owns the receiver's mutable
/// state (the position ledger).
///
/// One envelope is processed end-to-end (decode, notify, decide, execute,
/// ledger update) before the caller pulls the next raw message: a slow trade
/// backpressures consumption by construction, and the serial loop is what
/// keeps the ledger single-writer.
pub struct Dispatcher {
    policy: SniperPolicy,
    ledger: PositionLedger,
    notifier: Arc<dyn NotifySink>,
    venue: Option<Arc<dyn ExecutionVenue>>,
}

impl Dispatcher {
    pub fn new(
        policy: SniperPolicy,
        notifier: Arc<dyn NotifySink>,
        venue: Option<Arc<dyn ExecutionVenue>>,
    ) -> Self {
        Self {
            policy,
            ledger: PositionLedger::new(),
            notifier,
            venue,
        }
    }

    pub fn ledger(&self) -> &PositionLedger {
        &self.ledger
    }

    /// Process one raw message. Never returns an error: a bad message is
    /// logged and dropped so it cannot halt the listen loop.
    pub async fn dispatch(&mut self, raw: &RawMessage) {
        let envelope = match codec::decode(&raw.payload) {
            Ok(envelope) => envelope,
            Err(e) => {
                warn!(channel = %raw.channel, "Dropping malformed message: {}", e);
                return;
            }
        };

        info!(
            "⚡ [{}] {} @ {}",
            envelope.origin, envelope.kind, envelope.emitted_at
        );

        match envelope.kind {
            MessageKind::NewToken => self.handle_new_token(&envelope).await,
            MessageKind::PumpDetected => self.handle_pump_alert(&envelope).await,
            MessageKind::GenericAlert => self.handle_generic_alert(&envelope).await,
            MessageKind::Unknown(ref kind) => {
                debug!("Ignoring unknown message kind: {:?}", kind);
            }
        }
    }

    async fn handle_new_token(&mut self, envelope: &Envelope) {
        let detection = match TokenDetection::from_data(&envelope.data) {
            Ok(detection) => detection,
            Err(e) => {
                warn!(origin = %envelope.origin, "Dropping malformed NEW_TOKEN payload: {}", e);
                return;
            }
        };

        info!(
            "🆕 New token from {}: {} on {} (liquidity ${})",
            envelope.origin, detection.symbol, detection.platform, detection.liquidity
        );

        // Detection notifications always go out, whether or not we act.
        let platform_via = format!("{} (via {})", detection.platform, envelope.origin);
        if let Err(e) = self
            .notifier
            .notify_new_token(
                &detection.symbol,
                &detection.address,
                &platform_via,
                detection.liquidity,
            )
            .await
        {
            warn!("New-token notification failed: {}", e);
        }

        match decision::evaluate(&detection, &self.policy, &self.ledger) {
            Ok(()) => self.execute_snipe(&detection).await,
            Err(veto) => debug!("No action for {}: {}", detection.symbol, veto),
        }
    }

    async fn execute_snipe(&mut self, detection: &TokenDetection) {
        let Some(venue) = self.venue.clone() else {
            warn!("Snipe approved but no execution venue is configured");
            return;
        };

        let amount = self.policy.buy_amount;
        warn!(
            "🎯 Sniping {} ({}) - {} SOL via {}",
            detection.symbol,
            detection.address,
            amount,
            venue.name()
        );

        match venue.execute_buy(&detection.address, amount).await {
            Ok(fill) => {
                // Ledger insert happens before the success notification: a
                // duplicate detection for the same address must see the open
                // position as soon as the buy is confirmed.
                self.ledger.insert(
                    detection.address.clone(),
                    Position {
                        symbol: detection.symbol.clone(),
                        buy_price: fill.price,
                        amount: fill.acquired_amount,
                        sol_spent: amount,
                        opened_at: Utc::now(),
                    },
                );

                info!("✅ Snipe succeeded: TX {}", fill.tx_reference);
                if let Err(e) = self
                    .notifier
                    .notify_buy(
                        &detection.symbol,
                        amount,
                        fill.acquired_amount,
                        &fill.tx_reference,
                    )
                    .await
                {
                    warn!("Buy notification failed: {}", e);
                }
            }
            Err(e) => {
                // No ledger mutation and no retry; the failure is reported.
                error!("❌ Snipe failed: {}", e);
                if let Err(ne) = self
                    .notifier
                    .notify_error(&format!("Snipe {} failed: {}", detection.symbol, e))
                    .await
                {
                    warn!("Error notification failed: {}", ne);
                }
            }
        }
    }

    async fn handle_pump_alert(&self, envelope: &Envelope) {
        let alert = PumpAlert::from_data(&envelope.data).unwrap_or_default();
        warn!(
            "🚨 PUMP alert from {}: {} ({})",
            envelope.origin, alert.token, alert.reason
        );

        let text = format!(
            "🚨 <b>PUMP ALERT</b>\n\nSource: {}\nToken: {}\nReason: {}",
            envelope.origin, alert.token, alert.reason
        );
        if let Err(e) = self.notifier.notify_raw(&text).await {
            warn!("Pump notification failed: {}", e);
        }
    }

    async fn handle_generic_alert(&self, envelope: &Envelope) {
        let body = serde_json::Value::Object(envelope.data.clone()).to_string();
        info!("📣 Alert from {}: {}", envelope.origin, body);

        let text = format!("📣 <b>ALERT</b> from {}\n\n{}", envelope.origin, body);
        if let Err(e) = self.notifier.notify_raw(&text).await {
            warn!("Alert notification failed: {}", e);
        }
    }
}
