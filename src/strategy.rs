use crate::clock::DateTime;
use crate::position::Position;
use crate::types::{CashValue, DEFAULT_MIN_DATE, CASH_ASSET};

#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
pub struct StrategyId(pub u64);

#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
pub struct EpochId(pub u64);

#[derive(Debug, Clone)]
pub struct Strategy {
    pub id: StrategyId,
    pub name: String,
    pub start_capital: CashValue,
    /// Dates on/after this are held out of training; `None` means "no cutoff"
    /// (the original's `DEFAULT_MAX_DATE` sentinel).
    pub train_until: Option<DateTime>,
}

impl Strategy {
    pub fn new(id: StrategyId, name: impl Into<String>, start_capital: f64) -> Self {
        Self {
            id,
            name: name.into(),
            start_capital: CashValue::from(start_capital),
            train_until: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Epoch {
    pub id: EpochId,
    pub strategy_id: StrategyId,
    /// Zero-based index of this epoch within its strategy (a strategy may
    /// run several epochs, e.g. one per walk-forward window).
    pub epoch: u32,
}

impl Epoch {
    pub fn new(id: EpochId, strategy_id: StrategyId, epoch: u32) -> Self {
        Self { id, strategy_id, epoch }
    }

    /// The cash position an epoch is seeded with on creation, so that every
    /// epoch always has exactly one cash position row.
    pub fn seed_cash_position(&self, start_capital: CashValue) -> Position {
        Position {
            epoch_id: self.id,
            tstamp: DateTime::new(DEFAULT_MIN_DATE),
            asset: CASH_ASSET.to_string(),
            asset_strategy: "cash".to_string(),
            quantity: crate::types::Quantity::from(*start_capital),
            last_price: crate::types::Price::from(1.0),
        }
    }
}
