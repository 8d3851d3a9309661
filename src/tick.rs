use crate::clock::DateTime;
use crate::strategy::EpochId;
use crate::types::Price;

/// One quote observation for a single asset within an epoch. A batch of
/// these delivered together is the engine's unit of work.
///
/// `bid > ask` marks a "limit-probe" tick: a synthetic high/low pair a
/// replay ticker injects mid-bar purely so the gate (C6) can see whether a
/// resting limit/stop order would have triggered during the bar, without
/// ever being treated as a tradeable quote itself (see [`Tick::is_limit_probe`]).
#[derive(Debug, Clone, PartialEq)]
pub struct Tick {
    pub epoch_id: EpochId,
    pub asset: String,
    pub tstamp: DateTime,
    pub bid: Price,
    pub ask: Price,
}

impl Tick {
    pub fn new(epoch_id: EpochId, asset: impl Into<String>, tstamp: DateTime, bid: f64, ask: f64) -> Self {
        Self {
            epoch_id,
            asset: asset.into(),
            tstamp,
            bid: Price::from(bid),
            ask: Price::from(ask),
        }
    }

    /// A limit-probe tick carries `bid > ask` and is used only to test
    /// resting limit/stop orders against the bar's range; it never updates
    /// the quote store and never produces a market execution on its own.
    pub fn is_limit_probe(&self) -> bool {
        *self.bid > *self.ask
    }

    pub fn mid(&self) -> f64 {
        (*self.bid + *self.ask) / 2.0
    }
}

pub type TickBatch = Vec<Tick>;

/// Sorts a batch by timestamp then asset name ascending, the canonical
/// processing order for a tick batch.
pub fn canonicalize(mut batch: TickBatch) -> TickBatch {
    batch.sort_by(|a, b| a.tstamp.cmp(&b.tstamp).then_with(|| a.asset.cmp(b.asset)));
    batch
}
