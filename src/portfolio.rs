use std::collections::BTreeMap;

use crate::clock::DateTime;
use crate::position::{Position, PositionLedger};
use crate::strategy::EpochId;
use crate::types::{CashValue, DEFAULT_MIN_DATE};

/// A read-only view over an epoch's ledger, grounded in the original
/// `Portfolio` class (`models.py`): a thin accessor, not a stateful
/// component of its own.
pub struct Portfolio<'a> {
    ledger: &'a PositionLedger,
    epoch_id: EpochId,
}

/// One row of [`Portfolio::position_history`]: a forward-filled snapshot of
/// a single `(asset, asset_strategy)` position as of `tstamp`, plus its
/// share of total portfolio value.
#[derive(Debug, Clone)]
pub struct PositionSnapshot {
    pub tstamp: DateTime,
    pub asset: String,
    pub asset_strategy: String,
    pub quantity: f64,
    pub last_price: f64,
    pub value: f64,
    pub weight: f64,
}

impl<'a> Portfolio<'a> {
    pub fn new(ledger: &'a PositionLedger, epoch_id: EpochId) -> Self {
        Self { ledger, epoch_id }
    }

    /// Total portfolio value (sum of absolute position values, so short and
    /// long legs both contribute positively and weights still sum to 1) and
    /// the latest row per asset.
    pub fn positions(&self) -> (CashValue, Vec<&Position>) {
        let positions = self.ledger.fetch_most_recent_positions(self.epoch_id, None, false);
        let portfolio_value: f64 = positions.iter().map(|p| p.value().0.abs()).sum();
        (CashValue::from(portfolio_value), positions)
    }

    /// A forward-filled, per-timestamp series of every `(asset,
    /// asset_strategy)` position from `from` onward, with portfolio value
    /// and per-row weight computed at each step — the Rust equivalent of
    /// `Portfolio.position_history`'s pandas pivot/ffill.
    pub fn position_history(&self, from: Option<DateTime>) -> Vec<PositionSnapshot> {
        let from = from.unwrap_or(DateTime::new(DEFAULT_MIN_DATE));
        let mut rows: Vec<&Position> = self
            .ledger
            .all_rows(self.epoch_id)
            .iter()
            .filter(|p| p.tstamp >= from)
            .collect();
        rows.sort_by(|a, b| a.tstamp.cmp(&b.tstamp).then_with(|| a.asset.cmp(&b.asset)));

        let mut latest: BTreeMap<(String, String), (f64, f64)> = BTreeMap::new();
        let mut out = Vec::new();

        for tstamp in rows.iter().map(|p| p.tstamp).collect::<std::collections::BTreeSet<_>>() {
            for p in rows.iter().filter(|p| p.tstamp == tstamp) {
                latest.insert((p.asset.clone(), p.asset_strategy.clone()), (*p.quantity, *p.last_price));
            }
            let portfolio_value: f64 = latest.values().map(|(q, px)| (q * px).abs()).sum();
            for ((asset, asset_strategy), (quantity, last_price)) in &latest {
                let value = quantity * last_price;
                out.push(PositionSnapshot {
                    tstamp,
                    asset: asset.clone(),
                    asset_strategy: asset_strategy.clone(),
                    quantity: *quantity,
                    last_price: *last_price,
                    value,
                    weight: if portfolio_value == 0.0 { 0.0 } else { value / portfolio_value },
                });
            }
        }
        out
    }
}
