use async_trait::async_trait;
use rust_decimal::Decimal;
use serde_json::json;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::info;

#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Notify API error: {0}")]
    Api(String),
}

/// Fire-and-forget notification sink. Callers log failures and move on; a
/// broken sink must never stall the dispatch loop.
#[async_trait]
pub trait NotifySink: Send + Sync {
    async fn notify_new_token(
        &self,
        symbol: &str,
        address: &str,
        platform: &str,
        liquidity: Decimal,
    ) -> Result<(), NotifyError>;

    async fn notify_buy(
        &self,
        symbol: &str,
        sol_spent: Decimal,
        token_amount: Decimal,
        tx_reference: &str,
    ) -> Result<(), NotifyError>;

    async fn notify_error(&self, text: &str) -> Result<(), NotifyError>;

    async fn notify_raw(&self, text: &str) -> Result<(), NotifyError>;
}

const MIN_MESSAGE_DELAY_MS: u64 = 100;

/// Telegram Bot API sink with a minimum inter-message delay so bursts of
/// detections do not trip the API's rate limit.
pub struct TelegramNotifier {
    client: reqwest::Client,
    bot_token: String,
    chat_id: String,
    last_message_time: Mutex<Instant>,
}

impl TelegramNotifier {
    pub fn new(bot_token: String, chat_id: String) -> Result<Self, NotifyError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self {
            client,
            bot_token,
            chat_id,
            last_message_time: Mutex::new(Instant::now()),
        })
    }

    async fn send_message(&self, text: &str) -> Result<(), NotifyError> {
        {
            let mut last_time = self.last_message_time.lock().await;
            let elapsed = last_time.elapsed();
            if elapsed.as_millis() < MIN_MESSAGE_DELAY_MS as u128 {
                tokio::time::sleep(Duration::from_millis(
                    MIN_MESSAGE_DELAY_MS - elapsed.as_millis() as u64,
                ))
                .await;
            }
            *last_time = Instant::now();
        }

        let url = format!("https://api.telegram.org/bot{}/sendMessage", self.bot_token);
        let payload = json!({
            "chat_id": self.chat_id,
            "text": text,
            "parse_mode": "HTML"
        });

        let response = self.client.post(&url).json(&payload).send().await?;
        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(NotifyError::Api(error_text));
        }
        Ok(())
    }
}

#[async_trait]
impl NotifySink for TelegramNotifier {
    async fn notify_new_token(
        &self,
        symbol: &str,
        address: &str,
        platform: &str,
        liquidity: Decimal,
    ) -> Result<(), NotifyError> {
        let message = format!(
            "🆕 <b>NEW TOKEN</b>\n\n\
            Symbol: <b>{}</b>\n\
            Address: <code>{}</code>\n\
            Platform: {}\n\
            Liquidity: ${}",
            symbol, address, platform, liquidity
        );
        self.send_message(&message).await
    }

    async fn notify_buy(
        &self,
        symbol: &str,
        sol_spent: Decimal,
        token_amount: Decimal,
        tx_reference: &str,
    ) -> Result<(), NotifyError> {
        let message = format!(
            "🟢 <b>BUY EXECUTED</b> ✅\n\n\
            Token: <b>{}</b>\n\
            Spent: {} SOL\n\
            Acquired: {}\n\
            TX: <code>{}</code>",
            symbol, sol_spent, token_amount, tx_reference
        );
        self.send_message(&message).await
    }

    async fn notify_error(&self, text: &str) -> Result<(), NotifyError> {
        self.send_message(&format!("❌ <b>ERROR</b>\n\n{}", text))
            .await
    }

    async fn notify_raw(&self, text: &str) -> Result<(), NotifyError> {
        self.send_message(text).await
    }
}

/// Log-only sink used when Telegram is not configured.
pub struct LogNotifier;

#[async_trait]
impl NotifySink for LogNotifier {
    async fn notify_new_token(
        &self,
        symbol: &str,
        address: &str,
        platform: &str,
        liquidity: Decimal,
    ) -> Result<(), NotifyError> {
        info!(
            symbol = %symbol,
            address = %address,
            platform = %platform,
            liquidity = %liquidity,
            "Notify: new token"
        );
        Ok(())
    }

    async fn notify_buy(
        &self,
        symbol: &str,
        sol_spent: Decimal,
        token_amount: Decimal,
        tx_reference: &str,
    ) -> Result<(), NotifyError> {
        info!(
            symbol = %symbol,
            sol_spent = %sol_spent,
            token_amount = %token_amount,
            tx = %tx_reference,
            "Notify: buy executed"
        );
        Ok(())
    }

    async fn notify_error(&self, text: &str) -> Result<(), NotifyError> {
        info!("Notify: error: {}", text);
        Ok(())
    }

    async fn notify_raw(&self, text: &str) -> Result<(), NotifyError> {
        info!("Notify: {}", text);
        Ok(())
    }
}
