use log::{debug, info};

use crate::config::EngineConfig;
use crate::error::EngineResult;
use crate::gate::apply_gate;
use crate::matcher::match_orders;
use crate::order::{OrderId, OrderSpec, OrderStore};
use crate::position::PositionLedger;
use crate::quote::QuoteStore;
use crate::roll::roll_forward;
use crate::settle::settle;
use crate::strategy::{Epoch, EpochId, Strategy, StrategyId};
use crate::tick::{canonicalize, TickBatch};
use crate::trade::Trade;

/// The outcome of one `process_tick_batch` call: the trades it produced and
/// any order it could not act on, for soft-failure visibility without
/// aborting the batch.
#[derive(Debug, Default)]
pub struct BatchOutcome {
    pub trades: Vec<Trade>,
}

/// Ties C1–C7 together as direct function calls over one tick batch, rather
/// than an observer/event cascade. Each call stages its mutations on a
/// clone of the engine's stores first; only a successful batch is
/// committed, giving the "one atomic unit per batch" guarantee without a
/// database transaction.
#[derive(Default)]
pub struct Engine {
    quotes: QuoteStore,
    ledger: PositionLedger,
    orders: OrderStore,
    strategies: Vec<Strategy>,
    epochs: Vec<Epoch>,
    next_strategy_id: u64,
    next_epoch_id: u64,
    config: EngineConfig,
}

impl Engine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: EngineConfig) -> Self {
        Self { config, ..Self::default() }
    }

    pub fn create_strategy(&mut self, name: impl Into<String>, start_capital: f64) -> StrategyId {
        let id = StrategyId(self.next_strategy_id);
        self.next_strategy_id += 1;
        self.strategies.push(Strategy::new(id, name, start_capital));
        id
    }

    /// Creates a new epoch for `strategy_id` and seeds its cash position.
    /// The epoch's index is one past the strategy's most recent epoch.
    pub fn create_epoch(&mut self, strategy_id: StrategyId) -> EpochId {
        let strategy = self
            .strategies
            .iter()
            .find(|s| s.id == strategy_id)
            .expect("unknown strategy_id");
        let next_index = self
            .epochs
            .iter()
            .filter(|e| e.strategy_id == strategy_id)
            .map(|e| e.epoch)
            .max()
            .map(|e| e + 1)
            .unwrap_or(0);

        let id = EpochId(self.next_epoch_id);
        self.next_epoch_id += 1;
        let epoch = Epoch::new(id, strategy_id, next_index);
        self.ledger.seed_epoch(&epoch, strategy.start_capital);
        self.epochs.push(epoch);
        id
    }

    pub fn place_order(&mut self, epoch_id: EpochId, spec: OrderSpec) -> OrderId {
        self.orders.place(epoch_id, spec)
    }

    pub fn portfolio(&self, epoch_id: EpochId) -> crate::portfolio::Portfolio<'_> {
        crate::portfolio::Portfolio::new(&self.ledger, epoch_id)
    }

    pub fn ledger(&self) -> &PositionLedger {
        &self.ledger
    }

    pub fn orders(&self) -> &OrderStore {
        &self.orders
    }

    /// The full `C1.update -> C4.roll -> C5.match -> C6.gate -> C7.settle`
    /// pipeline for one tick batch, scoped to whichever epoch(s) the batch's
    /// ticks belong to.
    pub fn process_tick_batch(&mut self, batch: TickBatch) -> EngineResult<BatchOutcome> {
        let batch = canonicalize(batch);
        debug!("processing batch of {} ticks", batch.len());

        let mut staged_quotes = self.quotes.clone();
        let mut staged_ledger = self.ledger.clone();
        let mut staged_orders = self.orders.clone();

        staged_quotes.update(&batch);
        roll_forward(&mut staged_ledger, &batch);

        let mut trades = Vec::new();
        for epoch_id in batch.iter().map(|t| t.epoch_id).collect::<std::collections::HashSet<_>>() {
            let epoch_batch: TickBatch = batch.iter().filter(|t| t.epoch_id == epoch_id).cloned().collect();
            let brackets = staged_orders.eligible_grouped_by_bracket(epoch_id, &epoch_batch);
            let matches = match_orders(&staged_ledger, &staged_quotes, epoch_id, &brackets);
            let fills = apply_gate(&mut staged_orders, &staged_quotes, epoch_id, &epoch_batch, matches);
            let epoch_trades = settle(&mut staged_ledger, &mut staged_orders, epoch_id, fills, *self.config.min_trade_size)?;
            trades.extend(epoch_trades);
        }

        self.quotes = staged_quotes;
        self.ledger = staged_ledger;
        self.orders = staged_orders;
        info!("batch committed, {} trades", trades.len());

        Ok(BatchOutcome { trades })
    }
}
