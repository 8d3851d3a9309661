use log::warn;

use crate::error::EngineResult;
use crate::gate::GatedFill;
use crate::order::OrderStore;
use crate::position::{Position, PositionLedger};
use crate::strategy::EpochId;
use crate::trade::Trade;
use crate::types::{CashValue, Price, Quantity, CASH_ASSET};

/// C7: the minimum-trade-size filter plus ledger settlement. A fill whose
/// notional value falls below `min_trade_size` never becomes a trade and
/// cancels its order instead of executing it, rather than marking every
/// fill passed to it as executed regardless of whether it survives this
/// filter. Surviving fills update the position ledger and the epoch's
/// single cash row, and mark their order executed (never both executed
/// and cancelled).
pub fn settle(
    ledger: &mut PositionLedger,
    orders: &mut OrderStore,
    epoch_id: EpochId,
    fills: Vec<GatedFill>,
    min_trade_size: f64,
) -> EngineResult<Vec<Trade>> {
    let mut trades = Vec::new();
    let mut cash_delta = 0.0_f64;
    let mut max_tstamp = None;

    for fill in fills {
        let notional = fill.quantity * fill.price;
        if fill.asset == CASH_ASSET {
            warn!("dropping fill against the cash asset directly, order {:?}", fill.order_id);
            continue;
        }
        if fill.quantity == 0.0 || notional.abs() < min_trade_size {
            if !fill.synthetic {
                if let Some(order) = orders.all_mut(epoch_id).iter_mut().find(|o| o.id == fill.order_id) {
                    order.cancelled = true;
                }
            }
            continue;
        }

        let existing_qty = ledger
            .fetch_most_recent_positions(epoch_id, Some(&fill.asset), true)
            .into_iter()
            .find(|p| p.asset_strategy == fill.asset_strategy)
            .map(|p| *p.quantity)
            .unwrap_or(0.0);

        ledger.append(Position {
            epoch_id,
            tstamp: fill.tstamp,
            asset: fill.asset.clone(),
            asset_strategy: fill.asset_strategy.clone(),
            quantity: Quantity::from(existing_qty + fill.quantity),
            last_price: Price::from(fill.price),
        });

        cash_delta += fill.quantity * fill.price;
        max_tstamp = Some(max_tstamp.map_or(fill.tstamp, |t: crate::clock::DateTime| t.max(fill.tstamp)));

        trades.push(Trade {
            epoch_id,
            tstamp: fill.tstamp,
            asset: fill.asset.clone(),
            asset_strategy: fill.asset_strategy.clone(),
            quantity: Quantity::from(fill.quantity),
            price: Price::from(fill.price),
            order_id: fill.order_id,
        });

        if !fill.synthetic {
            if let Some(order) = orders.all_mut(epoch_id).iter_mut().find(|o| o.id == fill.order_id) {
                order.executed = true;
            }
        }
    }

    if let Some(max_tstamp) = max_tstamp {
        let cash = ledger.fetch_most_recent_cash(epoch_id)?;
        let new_qty = *cash.quantity - cash_delta;
        ledger.append(Position {
            epoch_id,
            tstamp: max_tstamp,
            asset: CASH_ASSET.to_string(),
            asset_strategy: "cash".to_string(),
            quantity: Quantity::from(new_qty),
            last_price: Price::from(1.0),
        });
    }

    Ok(trades)
}
