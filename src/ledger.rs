use std::collections::HashMap;
use tracing::info;

use crate::model::Position;

/// In-memory record of open positions, keyed by token address.
///
/// Process-lifetime state, empty at start. Single-writer discipline: only the
/// dispatcher's successful-buy path inserts, and the serial dispatch loop is
/// what guarantees at most one open position per address.
#[derive(Debug, Default)]
pub struct PositionLedger {
    positions: HashMap<String, Position>,
}

impl PositionLedger {
    pub fn new() -> Self {
        Self {
            positions: HashMap::new(),
        }
    }

    pub fn insert(&mut self, address: String, position: Position) {
        info!(
            address = %address,
            symbol = %position.symbol,
            sol_spent = %position.sol_spent,
            "Position recorded"
        );
        self.positions.insert(address, position);
    }

    pub fn contains(&self, address: &str) -> bool {
        self.positions.contains_key(address)
    }

    pub fn get_all(&self) -> &HashMap<String, Position> {
        &self.positions
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}
