use crate::clock::DateTime;
use crate::order::OrderId;
use crate::strategy::EpochId;
use crate::types::{Price, Quantity};

/// An immutable record of an executed order. Produced by C5/C6 and
/// consumed exactly once by C7.
#[derive(Debug, Clone)]
pub struct Trade {
    pub epoch_id: EpochId,
    pub tstamp: DateTime,
    pub asset: String,
    pub asset_strategy: String,
    pub quantity: Quantity,
    pub price: Price,
    pub order_id: OrderId,
}
