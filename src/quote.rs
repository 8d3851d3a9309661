use std::collections::HashMap;

use crate::strategy::EpochId;
use crate::tick::{Tick, TickBatch};

/// C1: the process-wide latest-quote map, keyed `(epoch_id, asset)`.
/// Limit-probe ticks (`bid > ask`) never update it — they exist only to be
/// seen by C6, not to become a tradeable quote themselves.
#[derive(Debug, Clone, Default)]
pub struct QuoteStore {
    latest: HashMap<(EpochId, String), Tick>,
}

impl QuoteStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, batch: &TickBatch) {
        for tick in batch {
            if tick.is_limit_probe() {
                continue;
            }
            self.latest.insert((tick.epoch_id, tick.asset.clone()), tick.clone());
        }
    }

    pub fn latest(&self, epoch_id: EpochId, asset: &str) -> Option<&Tick> {
        self.latest.get(&(epoch_id, asset.to_string()))
    }
}
