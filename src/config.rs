use crate::types::{CashValue, DEFAULT_ASSET_STRATEGY, MIN_TRADE_SIZE};

/// Engine-wide tunables, constructed directly by the embedding application
/// rather than loaded from a file.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub min_trade_size: CashValue,
    pub default_asset_strategy: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            min_trade_size: CashValue::from(MIN_TRADE_SIZE),
            default_asset_strategy: DEFAULT_ASSET_STRATEGY.to_string(),
        }
    }
}
