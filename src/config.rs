use config::{Config, ConfigError, Environment, File};
use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;

use crate::channels;
use crate::decision::SniperPolicy;

/// Fatal startup misconfiguration. The process must not come up with an
/// inconsistent identity (e.g. sniping enabled with no venue to trade on).
#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Sniper is enabled but no [execution] section is configured")]
    NoExecutionVenue,
    #[error("Sniper is enabled but buy_amount is not positive: {0}")]
    InvalidBuyAmount(Decimal),
    #[error("Telegram is enabled but bot_token/chat_id are incomplete")]
    TelegramIncomplete,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Settings {
    #[serde(default)]
    pub node: NodeConfig,
    #[serde(default)]
    pub mesh: MeshConfig,
    #[serde(default)]
    pub sniper: SniperPolicy,
    pub telegram: Option<TelegramConfig>,
    pub execution: Option<ExecutionConfig>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct NodeConfig {
    /// Free-form origin identifier stamped onto outgoing envelopes,
    /// e.g. a region code like "HK" or "DE".
    #[serde(default = "default_location")]
    pub location: String,
}

fn default_location() -> String {
    "LOCAL".to_string()
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            location: default_location(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct MeshConfig {
    pub nats_url: Option<String>,
    /// Channel set to subscribe to; defaults to the canonical catalog.
    pub channels: Option<Vec<String>>,
    pub reconnect_delay_ms: Option<u64>,
}

impl MeshConfig {
    pub fn nats_url(&self) -> String {
        self.nats_url
            .clone()
            .unwrap_or_else(|| "nats://localhost:4222".to_string())
    }

    pub fn channels(&self) -> Vec<String> {
        self.channels
            .clone()
            .unwrap_or_else(channels::default_channels)
    }

    pub fn reconnect_delay_ms(&self) -> u64 {
        self.reconnect_delay_ms.unwrap_or(2000)
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct TelegramConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub bot_token: String,
    #[serde(default)]
    pub chat_id: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ExecutionConfig {
    /// Execution mode; only "paper" is implemented (live custody is out of
    /// scope), but the section must exist for sniping to be allowed at all.
    #[serde(default = "default_mode")]
    pub mode: String,
}

fn default_mode() -> String {
    "paper".to_string()
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let s = Config::builder()
            // Project config from config/config.{toml,json,ini}
            .add_source(File::with_name("config/config").required(false))
            // Local overrides (not checked in)
            .add_source(File::with_name("config/local").required(false))
            // Environment overrides, e.g. MESH_SNIPER__ENABLED=true
            .add_source(Environment::with_prefix("MESH").separator("__"))
            .build()?;

        s.try_deserialize()
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.sniper.enabled {
            if self.execution.is_none() {
                return Err(SettingsError::NoExecutionVenue);
            }
            if self.sniper.buy_amount <= Decimal::ZERO {
                return Err(SettingsError::InvalidBuyAmount(self.sniper.buy_amount));
            }
        }

        if let Some(telegram) = &self.telegram {
            if telegram.enabled && (telegram.bot_token.is_empty() || telegram.chat_id.is_empty()) {
                return Err(SettingsError::TelegramIncomplete);
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_defaults_validate() {
        // Sniper disabled by default: notify-only mode needs no venue.
        let settings = Settings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.node.location, "LOCAL");
        assert_eq!(settings.mesh.nats_url(), "nats://localhost:4222");
        assert_eq!(
            settings.mesh.channels(),
            vec!["global_alerts".to_string(), "new_tokens".to_string()]
        );
    }

    #[test]
    fn test_sniper_without_venue_is_fatal() {
        let mut settings = Settings::default();
        settings.sniper.enabled = true;
        settings.sniper.buy_amount = dec!(0.01);

        assert!(matches!(
            settings.validate(),
            Err(SettingsError::NoExecutionVenue)
        ));
    }

    #[test]
    fn test_sniper_with_zero_buy_amount_is_fatal() {
        let mut settings = Settings::default();
        settings.sniper.enabled = true;
        settings.execution = Some(ExecutionConfig {
            mode: "paper".to_string(),
        });

        assert!(matches!(
            settings.validate(),
            Err(SettingsError::InvalidBuyAmount(_))
        ));
    }

    #[test]
    fn test_incomplete_telegram_is_fatal() {
        let mut settings = Settings::default();
        settings.telegram = Some(TelegramConfig {
            enabled: true,
            bot_token: "token".to_string(),
            chat_id: String::new(),
        });

        assert!(matches!(
            settings.validate(),
            Err(SettingsError::TelegramIncomplete)
        ));
    }
}
