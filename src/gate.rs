use crate::clock::DateTime;
use crate::matcher::OrderMatch;
use crate::order::OrderStore;
use crate::quote::QuoteStore;
use crate::strategy::EpochId;
use crate::tick::{Tick, TickBatch};

/// A fill that cleared the limit/stop gate, still awaiting C7's minimum
/// trade size filter and ledger settlement.
#[derive(Debug, Clone)]
pub struct GatedFill {
    pub order_id: crate::order::OrderId,
    pub asset: String,
    pub asset_strategy: String,
    pub quantity: f64,
    pub price: f64,
    pub tstamp: DateTime,
    pub synthetic: bool,
}

fn intrabatch_range(batch: &TickBatch, asset: &str) -> Option<(f64, f64)> {
    batch
        .iter()
        .filter(|t| t.asset == asset)
        .map(range_of)
        .reduce(|(lo_a, hi_a), (lo_b, hi_b)| (lo_a.min(lo_b), hi_a.max(hi_b)))
}

/// A limit-probe tick's `(bid, ask)` pair carries the bar's `(high, low)`;
/// a regular tick just carries its own `(bid, ask)` as the range.
fn range_of(tick: &Tick) -> (f64, f64) {
    if tick.is_limit_probe() {
        (*tick.ask, *tick.bid)
    } else {
        (tick.bid.min(*tick.ask), tick.bid.max(*tick.ask))
    }
}

/// C6: runs every C5 match through its order's limit/stop conditions.
/// Orders with neither field set fill immediately at market. A `stop_limit`
/// gates activation; once a batch's intrabatch range crosses it the order
/// behaves as triggered from the next batch onward, never executing in the
/// same round it activates. A `limit` gates execution. Either way, the
/// fill price is always the current market quote, never the limit/stop
/// value itself.
pub fn apply_gate(
    orders: &mut OrderStore,
    quotes: &QuoteStore,
    epoch_id: EpochId,
    batch: &TickBatch,
    matches: Vec<OrderMatch>,
) -> Vec<GatedFill> {
    let mut fills = Vec::new();
    let tstamp = batch.iter().map(|t| t.tstamp).max();
    let Some(tstamp) = tstamp else { return fills };

    for m in matches {
        let Some(order) = orders.all_mut(epoch_id).iter_mut().find(|o| o.id == m.order_id) else {
            continue;
        };

        if m.quantity == 0.0 {
            continue;
        }
        let is_buy = m.quantity > 0.0;

        if let Some(stop) = order.stop_limit {
            if !order.stop_limit_activated {
                let Some((lo, hi)) = intrabatch_range(batch, &m.asset) else { continue };
                let activates = if is_buy { hi >= stop } else { lo <= stop };
                if !activates {
                    continue;
                }
                order.stop_limit_activated = true;
                continue;
            }
        }

        if let Some(limit) = order.limit {
            let Some((lo, hi)) = intrabatch_range(batch, &m.asset) else { continue };
            let executes = if is_buy { lo <= limit } else { hi >= limit };
            if !executes {
                continue;
            }
        }

        let Some(quote) = quotes.latest(epoch_id, &m.asset) else { continue };
        let price = if is_buy { *quote.ask } else { *quote.bid };

        fills.push(GatedFill {
            order_id: m.order_id,
            asset: m.asset,
            asset_strategy: m.asset_strategy,
            quantity: m.quantity,
            price,
            tstamp,
            synthetic: m.synthetic,
        });
    }
    fills
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::order::{OrderSpec, OrderType};
    use crate::strategy::StrategyId;

    fn setup() -> (OrderStore, QuoteStore, EpochId) {
        (OrderStore::new(), QuoteStore::new(), EpochId(1))
    }

    #[test]
    fn test_that_plain_market_order_fills_immediately() {
        let (mut orders, mut quotes, epoch_id) = setup();
        let id = orders.place(epoch_id, OrderSpec::market("ABC", OrderType::Quantity, 10.0, DateTime::new(1)));
        let batch = vec![Tick::new(epoch_id, "ABC", DateTime::new(2), 99.0, 101.0)];
        quotes.update(&batch);

        let matches = vec![OrderMatch {
            order_id: id,
            asset: "ABC".into(),
            asset_strategy: "-".into(),
            quantity: 10.0,
            synthetic: false,
        }];
        let fills = apply_gate(&mut orders, &quotes, epoch_id, &batch, matches);
        assert_eq!(fills.len(), 1);
        assert_eq!(fills[0].price, 101.0);
    }

    #[test]
    fn test_that_limit_buy_waits_for_price_to_fall_to_limit() {
        let (mut orders, mut quotes, epoch_id) = setup();
        let mut spec = OrderSpec::market("ABC", OrderType::Quantity, 10.0, DateTime::new(1));
        spec.limit = Some(95.0);
        let id = orders.place(epoch_id, spec);

        let real = Tick::new(epoch_id, "ABC", DateTime::new(2), 99.0, 101.0);
        let probe = Tick::new(epoch_id, "ABC", DateTime::new(2), 102.0, 98.0);
        let batch = vec![real.clone(), probe];
        quotes.update(&batch);

        let matches = vec![OrderMatch {
            order_id: id,
            asset: "ABC".into(),
            asset_strategy: "-".into(),
            quantity: 10.0,
            synthetic: false,
        }];
        let fills = apply_gate(&mut orders, &quotes, epoch_id, &batch, matches.clone());
        assert!(fills.is_empty(), "low of 98 has not reached limit of 95");

        let batch2 = vec![
            Tick::new(epoch_id, "ABC", DateTime::new(3), 93.0, 95.0),
            Tick::new(epoch_id, "ABC", DateTime::new(3), 96.0, 92.0),
        ];
        quotes.update(&batch2);
        let fills2 = apply_gate(&mut orders, &quotes, epoch_id, &batch2, matches);
        assert_eq!(fills2.len(), 1);
        assert_eq!(fills2[0].price, 95.0, "fills at the market ask, not the limit price");
    }

    #[test]
    fn test_that_stop_buy_activates_then_executes_at_market() {
        let (mut orders, mut quotes, epoch_id) = setup();
        let mut spec = OrderSpec::market("ABC", OrderType::Quantity, 10.0, DateTime::new(1));
        spec.stop_limit = Some(105.0);
        let id = orders.place(epoch_id, spec);

        let batch = vec![
            Tick::new(epoch_id, "ABC", DateTime::new(2), 103.0, 106.0),
            Tick::new(epoch_id, "ABC", DateTime::new(2), 108.0, 101.0),
        ];
        quotes.update(&batch);
        let matches = vec![OrderMatch {
            order_id: id,
            asset: "ABC".into(),
            asset_strategy: "-".into(),
            quantity: 10.0,
            synthetic: false,
        }];
        let fills = apply_gate(&mut orders, &quotes, epoch_id, &batch, matches);
        assert!(fills.is_empty(), "activation alone must not execute in the same round");
        let order = orders.all(epoch_id).iter().find(|o| o.id == id).unwrap();
        assert!(order.stop_limit_activated);

        let batch2 = vec![Tick::new(epoch_id, "ABC", DateTime::new(3), 107.0, 109.0)];
        quotes.update(&batch2);
        let matches2 = vec![OrderMatch {
            order_id: id,
            asset: "ABC".into(),
            asset_strategy: "-".into(),
            quantity: 10.0,
            synthetic: false,
        }];
        let fills2 = apply_gate(&mut orders, &quotes, epoch_id, &batch2, matches2);
        assert_eq!(fills2.len(), 1);
        assert_eq!(fills2[0].price, 109.0);
    }
}
