#[cfg(test)]
mod tests {
    use crate::codec;
    use crate::decision::SniperPolicy;
    use crate::dispatcher::Dispatcher;
    use crate::model::{Envelope, MessageKind, TokenDetection};
    use crate::notifier::{NotifyError, NotifySink};
    use crate::transport::adapter::RawMessage;
    use crate::venue::{ExecutionError, ExecutionFill, ExecutionVenue};
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use serde_json::json;
    use std::sync::Arc;

    type EventLog = Arc<Mutex<Vec<String>>>;

    struct RecordingSink {
        events: EventLog,
    }

    #[async_trait]
    impl NotifySink for RecordingSink {
        async fn notify_new_token(
            &self,
            symbol: &str,
            _address: &str,
            _platform: &str,
            _liquidity: Decimal,
        ) -> Result<(), NotifyError> {
            self.events.lock().push(format!("notify_new_token:{}", symbol));
            Ok(())
        }

        async fn notify_buy(
            &self,
            symbol: &str,
            _sol_spent: Decimal,
            _token_amount: Decimal,
            _tx_reference: &str,
        ) -> Result<(), NotifyError> {
            self.events.lock().push(format!("notify_buy:{}", symbol));
            Ok(())
        }

        async fn notify_error(&self, text: &str) -> Result<(), NotifyError> {
            self.events.lock().push(format!("notify_error:{}", text));
            Ok(())
        }

        async fn notify_raw(&self, text: &str) -> Result<(), NotifyError> {
            self.events.lock().push(format!("notify_raw:{}", text));
            Ok(())
        }
    }

    struct ScriptedVenue {
        events: EventLog,
        fail: bool,
    }

    #[async_trait]
    impl ExecutionVenue for ScriptedVenue {
        async fn execute_buy(
            &self,
            address: &str,
            amount_sol: Decimal,
        ) -> Result<ExecutionFill, ExecutionError> {
            self.events
                .lock()
                .push(format!("execute_buy:{}:{}", address, amount_sol));
            if self.fail {
                Err(ExecutionError::Rejected("scripted failure".to_string()))
            } else {
                Ok(ExecutionFill {
                    price: dec!(0.000002),
                    acquired_amount: amount_sol / dec!(0.000002),
                    tx_reference: "tx-scripted".to_string(),
                })
            }
        }

        fn name(&self) -> &str {
            "scripted"
        }
    }

    fn policy() -> SniperPolicy {
        SniperPolicy {
            enabled: true,
            buy_amount: dec!(0.01),
            min_liquidity: dec!(1000),
            platforms: vec!["pump_fun".to_string()],
            auto_sell: false,
        }
    }

    fn dispatcher_with(
        policy: SniperPolicy,
        fail_venue: bool,
    ) -> (Dispatcher, EventLog) {
        let events: EventLog = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::new(RecordingSink {
            events: events.clone(),
        });
        let venue = Arc::new(ScriptedVenue {
            events: events.clone(),
            fail: fail_venue,
        });
        (Dispatcher::new(policy, sink, Some(venue)), events)
    }

    fn raw_new_token(address: &str, platform: &str, liquidity: Decimal) -> RawMessage {
        let detection = TokenDetection {
            address: address.to_string(),
            name: "Test".to_string(),
            symbol: "TT".to_string(),
            platform: platform.to_string(),
            liquidity,
            price: dec!(0.0023),
        };
        let envelope = Envelope::new(MessageKind::NewToken, "HK", detection.to_data());
        RawMessage {
            channel: "new_tokens".to_string(),
            payload: codec::encode(&envelope).unwrap(),
        }
    }

    #[tokio::test]
    async fn test_snipe_flow_notifies_then_executes_then_records() {
        let (mut dispatcher, events) = dispatcher_with(policy(), false);

        dispatcher
            .dispatch(&raw_new_token("A1", "pump_fun", dec!(1500)))
            .await;

        assert_eq!(
            *events.lock(),
            vec![
                "notify_new_token:TT".to_string(),
                "execute_buy:A1:0.01".to_string(),
                "notify_buy:TT".to_string(),
            ]
        );
        assert!(dispatcher.ledger().contains("A1"));
        let position = dispatcher.ledger().get_all().get("A1").unwrap().clone();
        assert_eq!(position.sol_spent, dec!(0.01));
        assert_eq!(position.buy_price, dec!(0.000002));
    }

    #[tokio::test]
    async fn test_duplicate_detection_buys_once() {
        let (mut dispatcher, events) = dispatcher_with(policy(), false);

        let msg = raw_new_token("A1", "pump_fun", dec!(1500));
        dispatcher.dispatch(&msg).await;
        dispatcher.dispatch(&msg).await;

        let buys = events
            .lock()
            .iter()
            .filter(|e| e.starts_with("execute_buy"))
            .count();
        assert_eq!(buys, 1);
        // The second detection is still notified, just not acted on.
        let notifies = events
            .lock()
            .iter()
            .filter(|e| e.starts_with("notify_new_token"))
            .count();
        assert_eq!(notifies, 2);
    }

    #[tokio::test]
    async fn test_wrong_platform_is_not_bought_regardless_of_liquidity() {
        let (mut dispatcher, events) = dispatcher_with(policy(), false);

        dispatcher
            .dispatch(&raw_new_token("A2", "raydium", dec!(1_000_000)))
            .await;

        assert!(events.lock().iter().all(|e| !e.starts_with("execute_buy")));
        assert!(dispatcher.ledger().is_empty());
    }

    #[tokio::test]
    async fn test_disabled_sniper_still_notifies() {
        let mut p = policy();
        p.enabled = false;
        let (mut dispatcher, events) = dispatcher_with(p, false);

        dispatcher
            .dispatch(&raw_new_token("A1", "pump_fun", dec!(1500)))
            .await;

        assert_eq!(
            *events.lock(),
            vec!["notify_new_token:TT".to_string()]
        );
    }

    #[tokio::test]
    async fn test_failed_execution_reports_and_leaves_ledger_untouched() {
        let (mut dispatcher, events) = dispatcher_with(policy(), true);

        dispatcher
            .dispatch(&raw_new_token("A1", "pump_fun", dec!(1500)))
            .await;

        assert!(dispatcher.ledger().is_empty());
        let log = events.lock();
        assert!(log.iter().any(|e| e.starts_with("notify_error")));
        assert!(log.iter().all(|e| !e.starts_with("notify_buy")));
    }

    #[tokio::test]
    async fn test_malformed_message_does_not_halt_dispatch() {
        let (mut dispatcher, events) = dispatcher_with(policy(), false);

        dispatcher
            .dispatch(&RawMessage {
                channel: "new_tokens".to_string(),
                payload: b"{{{ definitely not json".to_vec(),
            })
            .await;
        assert!(events.lock().is_empty());

        // The next valid message is still processed.
        dispatcher
            .dispatch(&raw_new_token("A1", "pump_fun", dec!(1500)))
            .await;
        assert!(dispatcher.ledger().contains("A1"));
    }

    #[tokio::test]
    async fn test_pump_alert_notifies_without_trading() {
        let (mut dispatcher, events) = dispatcher_with(policy(), false);

        let data = json!({"token": "XYZ", "reason": "Huge Volume Spike"});
        let envelope = match data {
            serde_json::Value::Object(map) => {
                Envelope::new(MessageKind::PumpDetected, "JP", map)
            }
            _ => unreachable!(),
        };
        dispatcher
            .dispatch(&RawMessage {
                channel: "global_alerts".to_string(),
                payload: codec::encode(&envelope).unwrap(),
            })
            .await;

        let log = events.lock();
        assert_eq!(log.len(), 1);
        assert!(log[0].starts_with("notify_raw"));
        assert!(log[0].contains("XYZ"));
        assert!(dispatcher.ledger().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_kind_is_ignored() {
        let (mut dispatcher, events) = dispatcher_with(policy(), false);

        let envelope = Envelope::new(
            MessageKind::Unknown("FUTURE_SIGNAL".to_string()),
            "DE",
            serde_json::Map::new(),
        );
        dispatcher
            .dispatch(&RawMessage {
                channel: "global_alerts".to_string(),
                payload: codec::encode(&envelope).unwrap(),
            })
            .await;

        assert!(events.lock().is_empty());
    }

    #[tokio::test]
    async fn test_no_venue_means_no_position() {
        // Approved decision with no configured venue: log and carry on.
        let events: EventLog = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::new(RecordingSink {
            events: events.clone(),
        });
        let mut dispatcher = Dispatcher::new(policy(), sink, None);

        dispatcher
            .dispatch(&raw_new_token("A1", "pump_fun", dec!(1500)))
            .await;

        assert!(dispatcher.ledger().is_empty());
        assert_eq!(
            *events.lock(),
            vec!["notify_new_token:TT".to_string()]
        );
    }
}
