use std::collections::HashMap;

use itertools::Itertools;

use crate::clock::DateTime;
use crate::error::{EngineError, EngineResult};
use crate::strategy::{Epoch, EpochId};
use crate::types::{CashValue, Price, Quantity, CASH_ASSET};

/// A single append-only ledger row. Rows are never mutated in a way that
/// changes their `(epoch_id, asset, asset_strategy, tstamp)` key; a new
/// observation at a later timestamp is always a new row.
#[derive(Debug, Clone, PartialEq)]
pub struct Position {
    pub epoch_id: EpochId,
    pub tstamp: DateTime,
    pub asset: String,
    pub asset_strategy: String,
    pub quantity: Quantity,
    pub last_price: Price,
}

impl Position {
    pub fn value(&self) -> CashValue {
        CashValue::from(*self.quantity * *self.last_price)
    }

    pub fn weight(&self, portfolio_value: CashValue) -> f64 {
        *self.value() / *portfolio_value
    }

    fn key(&self) -> (&str, &str) {
        (&self.asset, &self.asset_strategy)
    }
}

/// C2: the epoch-scoped position ledger. Append-only; "updating" a row in
/// place is only ever a same-timestamp correction to `last_price`, never a
/// retroactive change to `quantity` (quantity only changes through C7
/// settlement, which always creates a new row).
#[derive(Debug, Clone, Default)]
pub struct PositionLedger {
    rows: HashMap<EpochId, Vec<Position>>,
}

impl PositionLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the epoch's initial cash row. Must be called exactly once per
    /// epoch, before any tick batch touching it is processed.
    pub fn seed_epoch(&mut self, epoch: &Epoch, start_capital: CashValue) {
        let position = epoch.seed_cash_position(start_capital);
        self.rows.entry(epoch.id).or_default().push(position);
    }

    pub fn append(&mut self, position: Position) {
        self.rows.entry(position.epoch_id).or_default().push(position);
    }

    pub fn all_rows(&self, epoch_id: EpochId) -> &[Position] {
        self.rows.get(&epoch_id).map(|v| v.as_slice()).unwrap_or(&[])
    }

    /// The most recent row per `(asset, asset_strategy)` group, mirroring
    /// `Position.fetch_most_recent_positions`. Zero-quantity non-cash rows
    /// are dropped unless `include_zero` is set.
    pub fn fetch_most_recent_positions(
        &self,
        epoch_id: EpochId,
        asset: Option<&str>,
        include_zero: bool,
    ) -> Vec<&Position> {
        let rows = self.all_rows(epoch_id);
        let grouped = rows
            .iter()
            .filter(|p| asset.map(|a| p.asset == a).unwrap_or(true))
            .into_group_map_by(|p| p.key());

        grouped
            .into_values()
            .filter_map(|group| group.into_iter().max_by_key(|p| p.tstamp))
            .filter(|p| include_zero || *p.quantity != 0.0 || p.asset == CASH_ASSET)
            .sorted_by(|a, b| a.asset.cmp(&b.asset))
            .collect()
    }

    pub fn fetch_most_recent_cash(&self, epoch_id: EpochId) -> EngineResult<&Position> {
        let mut cash = self.fetch_most_recent_positions(epoch_id, Some(CASH_ASSET), true);
        match cash.len() {
            1 => Ok(cash.pop().unwrap()),
            n => Err(EngineError::InvariantViolation {
                detail: format!("expected exactly one cash position for epoch {:?}, found {n}", epoch_id),
            }),
        }
    }

    /// C4 roll-forward for a single `(asset, asset_strategy)` key: if the new
    /// timestamp is strictly later than the most recent row, append a new row
    /// carrying the same quantity forward with the refreshed `last_price`;
    /// otherwise correct `last_price` on the existing row in place. No-op if
    /// the epoch holds no position in this asset yet.
    pub fn roll_forward(
        &mut self,
        epoch_id: EpochId,
        asset: &str,
        asset_strategy: &str,
        tstamp: DateTime,
        last_price: Price,
    ) {
        let rows = self.rows.entry(epoch_id).or_default();
        let latest_idx = rows
            .iter()
            .enumerate()
            .filter(|(_, p)| p.asset == asset && p.asset_strategy == asset_strategy)
            .max_by_key(|(_, p)| p.tstamp)
            .map(|(i, _)| i);

        let Some(idx) = latest_idx else { return };
        if tstamp > rows[idx].tstamp {
            let mut next = rows[idx].clone();
            next.tstamp = tstamp;
            next.last_price = last_price;
            rows.push(next);
        } else {
            rows[idx].last_price = last_price;
        }
    }
}
