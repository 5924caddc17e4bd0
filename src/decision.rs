use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::debug;

use crate::ledger::PositionLedger;
use crate::model::TokenDetection;

/// Immutable-per-run sniper configuration, consulted for every detection.
#[derive(Debug, Clone, Deserialize)]
pub struct SniperPolicy {
    #[serde(default)]
    pub enabled: bool,
    /// SOL spent per automated buy.
    #[serde(default)]
    pub buy_amount: Decimal,
    /// Minimum USD liquidity required to act.
    #[serde(default)]
    pub min_liquidity: Decimal,
    /// Whitelisted launch platforms.
    #[serde(default)]
    pub platforms: Vec<String>,
    /// Governs future exit logic; carried but not consulted here.
    #[serde(default)]
    pub auto_sell: bool,
}

impl Default for SniperPolicy {
    fn default() -> Self {
        Self {
            enabled: false,
            buy_amount: Decimal::ZERO,
            min_liquidity: Decimal::ZERO,
            platforms: Vec::new(),
            auto_sell: false,
        }
    }
}

/// Why a detection was not acted on. Each rejection is independently
/// observable in the logs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Veto {
    SniperDisabled,
    PlatformNotAllowed,
    BelowMinLiquidity,
    AlreadyHolding,
}

impl std::fmt::Display for Veto {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let reason = match self {
            Veto::SniperDisabled => "sniper disabled",
            Veto::PlatformNotAllowed => "platform not whitelisted",
            Veto::BelowMinLiquidity => "liquidity below threshold",
            Veto::AlreadyHolding => "position already open",
        };
        f.write_str(reason)
    }
}

/// Decide whether a detection warrants an automated buy.
///
/// Pure function of its inputs; short-circuits on the first failing
/// predicate. The caller owns the side effects (execution, ledger insert).
pub fn evaluate(
    detection: &TokenDetection,
    policy: &SniperPolicy,
    ledger: &PositionLedger,
) -> Result<(), Veto> {
    if !policy.enabled {
        return Err(Veto::SniperDisabled);
    }

    if !policy.platforms.iter().any(|p| p == &detection.platform) {
        debug!(
            platform = %detection.platform,
            "Skip: platform not in whitelist"
        );
        return Err(Veto::PlatformNotAllowed);
    }

    if detection.liquidity < policy.min_liquidity {
        debug!(
            liquidity = %detection.liquidity,
            min = %policy.min_liquidity,
            "Skip: liquidity below threshold"
        );
        return Err(Veto::BelowMinLiquidity);
    }

    if ledger.contains(&detection.address) {
        debug!(address = %detection.address, "Skip: already holding");
        return Err(Veto::AlreadyHolding);
    }

    Ok(())
}
