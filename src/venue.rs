use async_trait::async_trait;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum ExecutionError {
    #[error("Network error: {0}")]
    Network(String),
    #[error("Venue rejected order: {0}")]
    Rejected(String),
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Outcome of a successful buy.
#[derive(Debug, Clone)]
pub struct ExecutionFill {
    pub price: Decimal,
    /// Base-asset units acquired.
    pub acquired_amount: Decimal,
    pub tx_reference: String,
}

/// Seam over the order-placement service.
///
/// No cancellation and no timeout here: once invoked, a buy runs to
/// completion or failure, and any deadline belongs to the implementation.
#[async_trait]
pub trait ExecutionVenue: Send + Sync {
    /// Spend `amount_sol` on the token at `address`.
    async fn execute_buy(
        &self,
        address: &str,
        amount_sol: Decimal,
    ) -> Result<ExecutionFill, ExecutionError>;

    fn name(&self) -> &str;
}

const PAPER_FILL_PRICE: Decimal = dec!(0.000001);

/// Simulated venue used when no wallet is configured. Fills every order
/// deterministically at a fixed price.
pub struct PaperVenue {
    fill_price: Decimal,
}

impl PaperVenue {
    pub fn new() -> Self {
        Self {
            fill_price: PAPER_FILL_PRICE,
        }
    }

    pub fn with_fill_price(fill_price: Decimal) -> Self {
        Self { fill_price }
    }
}

impl Default for PaperVenue {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ExecutionVenue for PaperVenue {
    async fn execute_buy(
        &self,
        address: &str,
        amount_sol: Decimal,
    ) -> Result<ExecutionFill, ExecutionError> {
        let acquired = amount_sol / self.fill_price;
        let tx_reference = format!("paper-{}", uuid::Uuid::new_v4());
        info!(
            address = %address,
            amount_sol = %amount_sol,
            acquired = %acquired,
            "Paper fill"
        );
        Ok(ExecutionFill {
            price: self.fill_price,
            acquired_amount: acquired,
            tx_reference,
        })
    }

    fn name(&self) -> &str {
        "paper"
    }
}
