use std::collections::HashMap;

use crate::clock::DateTime;
use crate::engine::{BatchOutcome, Engine};
use crate::error::EngineResult;
use crate::strategy::EpochId;
use crate::tick::{Tick, TickBatch};

/// One OHLC bar for a single asset at a single timestamp.
#[derive(Debug, Clone, Copy)]
pub struct Bar {
    pub tstamp: DateTime,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

/// Per-asset bar series driving a [`ReplayTicker`], grounded in
/// `PandasReplayTicker`: each bar is replayed as three ticks — open, then a
/// high/low limit-probe pair, then close — giving the gate a chance to see
/// intrabatch range before the bar's own close becomes the new quote.
#[derive(Debug, Clone, Default)]
pub struct BarSeries {
    bars: HashMap<String, Vec<Bar>>,
}

impl BarSeries {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, asset: impl Into<String>, bars: Vec<Bar>) {
        self.bars.insert(asset.into(), bars);
    }
}

/// Replays a [`BarSeries`] through an [`Engine`], one timestamp at a time,
/// invoking `on_bar` after each bar's close tick has been processed.
pub struct ReplayTicker<'a> {
    series: &'a BarSeries,
    epoch_id: EpochId,
}

impl<'a> ReplayTicker<'a> {
    pub fn new(series: &'a BarSeries, epoch_id: EpochId) -> Self {
        Self { series, epoch_id }
    }

    pub fn run(
        &self,
        engine: &mut Engine,
        mut on_bar: impl FnMut(&mut Engine, DateTime, &BatchOutcome),
    ) -> EngineResult<()> {
        let mut tstamps: std::collections::BTreeSet<DateTime> = std::collections::BTreeSet::new();
        for bars in self.series.bars.values() {
            for bar in bars {
                tstamps.insert(bar.tstamp);
            }
        }

        for tstamp in tstamps {
            let bars_at: Vec<(&str, &Bar)> = self
                .series
                .bars
                .iter()
                .filter_map(|(asset, bars)| bars.iter().find(|b| b.tstamp == tstamp).map(|b| (asset.as_str(), b)))
                .collect();

            let open_batch: TickBatch = bars_at
                .iter()
                .map(|(asset, bar)| Tick::new(self.epoch_id, *asset, tstamp, bar.open, bar.open))
                .collect();
            engine.process_tick_batch(open_batch)?;

            let probe_batch: TickBatch = bars_at
                .iter()
                .map(|(asset, bar)| Tick::new(self.epoch_id, *asset, tstamp, bar.high, bar.low))
                .collect();
            engine.process_tick_batch(probe_batch)?;

            let close_batch: TickBatch = bars_at
                .iter()
                .map(|(asset, bar)| Tick::new(self.epoch_id, *asset, tstamp, bar.close, bar.close))
                .collect();
            let outcome = engine.process_tick_batch(close_batch)?;

            on_bar(engine, tstamp, &outcome);
        }
        Ok(())
    }
}

/// Replays a pre-built list of arbitrary tick batches directly, bypassing
/// bar semantics entirely — used by tests that construct batches by hand.
pub struct StaticTicker {
    batches: Vec<TickBatch>,
}

impl StaticTicker {
    pub fn new(batches: Vec<TickBatch>) -> Self {
        Self { batches }
    }

    pub fn run(self, engine: &mut Engine) -> EngineResult<Vec<BatchOutcome>> {
        self.batches.into_iter().map(|b| engine.process_tick_batch(b)).collect()
    }

    /// Same as [`StaticTicker::run`], but for embedding applications that
    /// want to fold engine errors into their own `anyhow` error chain
    /// instead of matching on [`crate::error::EngineError`] directly.
    pub fn run_anyhow(self, engine: &mut Engine) -> anyhow::Result<Vec<BatchOutcome>> {
        Ok(self.run(engine)?)
    }
}
