use std::collections::HashMap;

use log::warn;

use crate::order::{Order, OrderId, OrderType};
use crate::position::PositionLedger;
use crate::quote::QuoteStore;
use crate::strategy::EpochId;
use crate::tick::TickBatch;
use crate::types::CASH_ASSET;

/// A candidate fill still awaiting C6's limit/stop gate: an order paired with
/// the quantity C5 derived for it. `quantity == 0.0` means "no-op" (e.g. a
/// TARGET_WEIGHT bracket member already at its target) and is dropped before
/// the minimum-trade-size filter ever sees it.
#[derive(Debug, Clone)]
pub struct OrderMatch {
    pub order_id: OrderId,
    pub asset: String,
    pub asset_strategy: String,
    pub quantity: f64,
    /// True for a zero-weight closing order C5 synthesizes for a held
    /// position that a `TARGET_WEIGHT` bracket didn't mention. Synthetic
    /// matches still settle into a trade but never flip an `Order` row's
    /// `executed`/`cancelled` state — they were never placed by the caller.
    pub synthetic: bool,
}

fn held_quantity(ledger: &PositionLedger, epoch_id: EpochId, asset: &str, asset_strategy: &str) -> f64 {
    ledger
        .fetch_most_recent_positions(epoch_id, Some(asset), true)
        .into_iter()
        .find(|p| p.asset_strategy == asset_strategy)
        .map(|p| *p.quantity)
        .unwrap_or(0.0)
}

fn held_value(ledger: &PositionLedger, epoch_id: EpochId, asset: &str, asset_strategy: &str) -> f64 {
    ledger
        .fetch_most_recent_positions(epoch_id, Some(asset), true)
        .into_iter()
        .find(|p| p.asset_strategy == asset_strategy)
        .map(|p| *p.value())
        .unwrap_or(0.0)
}

/// C5: derives an execution quantity for every order eligible this batch,
/// one bracket group at a time. `TARGET_WEIGHT` is the only type that
/// processes a whole bracket together (it needs the other members' targets
/// to synthesize closing orders for held-but-unlisted positions); every
/// other type is evaluated order-by-order and bracket membership is
/// incidental.
pub fn match_orders(
    ledger: &PositionLedger,
    quotes: &QuoteStore,
    epoch_id: EpochId,
    brackets: &[(String, Vec<&Order>)],
) -> Vec<OrderMatch> {
    let mut out = Vec::new();
    for (_, orders) in brackets {
        if orders.iter().any(|o| o.order_type == OrderType::TargetWeight) {
            out.extend(match_target_weight_bracket(ledger, quotes, epoch_id, orders));
            continue;
        }
        for order in orders {
            if let Some(m) = match_single_order(ledger, quotes, epoch_id, order) {
                out.push(m);
            }
        }
    }
    out
}

fn match_single_order(
    ledger: &PositionLedger,
    quotes: &QuoteStore,
    epoch_id: EpochId,
    order: &Order,
) -> Option<OrderMatch> {
    let asset = order.asset.clone()?;
    let pos_qty = held_quantity(ledger, epoch_id, &asset, &order.asset_strategy);
    let pos_value = held_value(ledger, epoch_id, &asset, &order.asset_strategy);
    let cash_value = *ledger.fetch_most_recent_cash(epoch_id).ok()?.value();
    let quote = quotes.latest(epoch_id, &asset);

    let quantity = match order.order_type {
        OrderType::Close => -pos_qty,
        OrderType::Quantity => order.quantity.unwrap_or(0.0),
        OrderType::TargetQuantity => order.quantity.unwrap_or(0.0) - pos_qty,
        OrderType::Percent => {
            let requested = order.quantity.unwrap_or(0.0);
            let raw = if requested < 0.0 && pos_qty != 0.0 {
                let price = if pos_qty > 0.0 { quote.map(|q| *q.ask) } else { quote.map(|q| *q.bid) };
                price.map(|p| (((1.0 + requested) * pos_value) / p, p))
            } else {
                let price = if requested > 0.0 { quote.map(|q| *q.ask) } else { quote.map(|q| *q.bid) };
                price.map(|p| ((requested * cash_value) / p, p))
            };
            match raw {
                Some((q, p)) if cash_value >= 0.0 && (q * p).abs() >= crate::types::MIN_TRADE_SIZE => q,
                _ => 0.0,
            }
        }
        OrderType::IncreasePercent => {
            let requested = order.quantity.unwrap_or(0.0);
            let price = if requested > 0.0 { quote.map(|q| *q.ask) } else { quote.map(|q| *q.bid) };
            match price {
                Some(p) => ((1.0 + requested) * pos_value) / p,
                None => {
                    warn!("no quote for {asset}, skipping INCREASE_PERCENT order {:?}", order.id);
                    return None;
                }
            }
        }
        OrderType::TargetWeight => unreachable!("handled by match_target_weight_bracket"),
    };

    Some(OrderMatch {
        order_id: order.id,
        asset,
        asset_strategy: order.asset_strategy.clone(),
        quantity,
        synthetic: false,
    })
}

fn match_target_weight_bracket(
    ledger: &PositionLedger,
    quotes: &QuoteStore,
    epoch_id: EpochId,
    orders: &[&Order],
) -> Vec<OrderMatch> {
    let held = ledger.fetch_most_recent_positions(epoch_id, None, false);
    let portfolio_value: f64 = held.iter().map(|p| p.value().0.abs()).sum();

    let target_assets: HashMap<&str, &Order> = orders
        .iter()
        .filter_map(|o| o.asset.as_deref().map(|a| (a, *o)))
        .collect();

    let mut members: Vec<(String, String, f64, OrderId, bool)> = orders
        .iter()
        .filter_map(|o| {
            o.asset
                .clone()
                .map(|a| (a, o.asset_strategy.clone(), o.quantity.unwrap_or(0.0), o.id, false))
        })
        .collect();

    // Synthesize zero-weight closing orders for held positions the bracket
    // doesn't mention, so a full rebalance actually exits them. Scoped to
    // the bracket's own asset_strategy — a held position under a different
    // asset_strategy belongs to an unrelated bucket and must not be touched.
    let bracket_asset_strategy = orders.first().map(|o| o.asset_strategy.as_str());
    for pos in &held {
        if pos.asset == CASH_ASSET {
            continue;
        }
        if Some(pos.asset_strategy.as_str()) != bracket_asset_strategy {
            continue;
        }
        if target_assets.contains_key(pos.asset.as_str()) {
            continue;
        }
        // Carries the first bracket order's id purely as an anchor for the
        // gate/settle stages; it is marked `synthetic` and never itself
        // transitions to executed/cancelled.
        if let Some(anchor) = orders.first() {
            members.push((pos.asset.clone(), pos.asset_strategy.clone(), 0.0, anchor.id, true));
        }
    }

    let mut out = Vec::new();
    for (asset, asset_strategy, target_weight, order_id, synthetic) in members {
        let Some(quote) = quotes.latest(epoch_id, &asset) else {
            warn!("no quote for {asset} in TARGET_WEIGHT bracket, skipping");
            continue;
        };
        let price = quote.mid();
        if price == 0.0 {
            continue;
        }
        let held_qty = held_quantity(ledger, epoch_id, &asset, &asset_strategy);
        let target_qty = (portfolio_value * target_weight) / price;
        out.push(OrderMatch {
            order_id,
            asset,
            asset_strategy,
            quantity: target_qty - held_qty,
            synthetic,
        });
    }
    out
}
