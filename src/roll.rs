use crate::position::PositionLedger;
use crate::tick::TickBatch;
use crate::types::DEFAULT_ASSET_STRATEGY;

/// C4: advances every existing position touched by this batch's ticks to the
/// batch's timestamps, refreshing `last_price` without changing quantity.
/// Limit-probe ticks (`bid > ask`) are skipped entirely, matching
/// `position_roll_forward`'s guard in the original source. Longs mark to
/// market at bid, shorts at ask (B3) — the conservative side of the spread
/// for whichever side of the book the position sits on.
pub fn roll_forward(ledger: &mut PositionLedger, batch: &TickBatch) {
    for tick in batch {
        if tick.is_limit_probe() {
            continue;
        }
        let rows = ledger.all_rows(tick.epoch_id);
        let held: Vec<(String, f64)> = rows
            .iter()
            .filter(|p| p.asset == tick.asset)
            .map(|p| (p.asset_strategy.clone(), *p.quantity))
            .collect();

        let held = if held.is_empty() {
            vec![(DEFAULT_ASSET_STRATEGY.to_string(), 0.0)]
        } else {
            held
        };

        for (asset_strategy, quantity) in held {
            let last_price = if quantity > 0.0 { tick.bid } else { tick.ask };
            ledger.roll_forward(tick.epoch_id, &tick.asset, &asset_strategy, tick.tstamp, last_price);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::DateTime;
    use crate::position::Position;
    use crate::strategy::{Epoch, EpochId, StrategyId};
    use crate::tick::Tick;
    use crate::types::{CashValue, Price, Quantity};

    #[test]
    fn test_that_roll_forward_skips_limit_probe_ticks() {
        let mut ledger = PositionLedger::new();
        let epoch = Epoch::new(EpochId(1), StrategyId(1), 0);
        ledger.seed_epoch(&epoch, CashValue::from(100_000.0));
        ledger.append(Position {
            epoch_id: epoch.id,
            tstamp: DateTime::new(1),
            asset: "ABC".into(),
            asset_strategy: "-".into(),
            quantity: Quantity::from(10.0),
            last_price: Price::from(100.0),
        });

        let batch = vec![Tick::new(epoch.id, "ABC", DateTime::new(2), 110.0, 90.0)];
        roll_forward(&mut ledger, &batch);

        let rows: Vec<_> = ledger.all_rows(epoch.id).iter().filter(|p| p.asset == "ABC").collect();
        assert_eq!(rows.len(), 1);
        assert_eq!(*rows[0].last_price, 100.0);
    }

    #[test]
    fn test_that_roll_forward_advances_held_position() {
        let mut ledger = PositionLedger::new();
        let epoch = Epoch::new(EpochId(1), StrategyId(1), 0);
        ledger.seed_epoch(&epoch, CashValue::from(100_000.0));
        ledger.append(Position {
            epoch_id: epoch.id,
            tstamp: DateTime::new(1),
            asset: "ABC".into(),
            asset_strategy: "-".into(),
            quantity: Quantity::from(10.0),
            last_price: Price::from(100.0),
        });

        let batch = vec![Tick::new(epoch.id, "ABC", DateTime::new(2), 101.0, 102.0)];
        roll_forward(&mut ledger, &batch);

        let rows: Vec<_> = ledger.all_rows(epoch.id).iter().filter(|p| p.asset == "ABC").collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(*rows[1].quantity, 10.0);
        assert_eq!(*rows[1].last_price, 101.0);
    }
}
