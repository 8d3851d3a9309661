use std::collections::HashMap;

use itertools::Itertools;

use crate::clock::DateTime;
use crate::strategy::EpochId;
use crate::tick::TickBatch;
use crate::types::{DEFAULT_ASSET_STRATEGY, DEFAULT_MAX_DATE};

#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
pub struct OrderId(pub u64);

/// The six order types a strategy may place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum OrderType {
    Close,
    Quantity,
    TargetQuantity,
    Percent,
    IncreasePercent,
    TargetWeight,
}

/// The caller-facing shape of an order request, before the store assigns it
/// an id and bracket grouping defaults.
#[derive(Debug, Clone)]
pub struct OrderSpec {
    pub asset: Option<String>,
    pub asset_strategy: String,
    pub order_type: OrderType,
    pub valid_from: DateTime,
    pub valid_until: DateTime,
    pub quantity: Option<f64>,
    pub limit: Option<f64>,
    pub stop_limit: Option<f64>,
    pub target_weight_bracket_id: Option<String>,
}

impl OrderSpec {
    pub fn market(asset: impl Into<String>, order_type: OrderType, quantity: f64, valid_from: DateTime) -> Self {
        Self {
            asset: Some(asset.into()),
            asset_strategy: DEFAULT_ASSET_STRATEGY.to_string(),
            order_type,
            valid_from,
            valid_until: DateTime::new(DEFAULT_MAX_DATE),
            quantity: Some(quantity),
            limit: None,
            stop_limit: None,
            target_weight_bracket_id: None,
        }
    }
}

/// A pending, executed or cancelled order. Exactly one of `executed`/
/// `cancelled` is ever true, never both.
#[derive(Debug, Clone)]
pub struct Order {
    pub id: OrderId,
    pub epoch_id: EpochId,
    pub asset: Option<String>,
    pub asset_strategy: String,
    pub order_type: OrderType,
    pub valid_from: DateTime,
    pub valid_until: DateTime,
    pub quantity: Option<f64>,
    pub limit: Option<f64>,
    pub stop_limit: Option<f64>,
    pub stop_limit_activated: bool,
    pub target_weight_bracket_id: String,
    pub executed: bool,
    pub cancelled: bool,
    pub generated: bool,
}

impl Order {
    pub fn is_pending(&self) -> bool {
        !self.executed && !self.cancelled
    }
}

/// C3: the epoch-scoped order store.
#[derive(Debug, Clone, Default)]
pub struct OrderStore {
    rows: HashMap<EpochId, Vec<Order>>,
    next_id: u64,
}

impl OrderStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn place(&mut self, epoch_id: EpochId, spec: OrderSpec) -> OrderId {
        self.place_generated(epoch_id, spec, false)
    }

    pub(crate) fn place_generated(&mut self, epoch_id: EpochId, spec: OrderSpec, generated: bool) -> OrderId {
        let id = OrderId(self.next_id);
        self.next_id += 1;
        let bracket_id = spec
            .target_weight_bracket_id
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

        let order = Order {
            id,
            epoch_id,
            asset: spec.asset,
            asset_strategy: spec.asset_strategy,
            order_type: spec.order_type,
            valid_from: spec.valid_from,
            valid_until: spec.valid_until,
            quantity: spec.quantity,
            limit: spec.limit,
            stop_limit: spec.stop_limit,
            stop_limit_activated: false,
            target_weight_bracket_id: bracket_id,
            executed: false,
            cancelled: false,
            generated,
        };
        self.rows.entry(epoch_id).or_default().push(order);
        id
    }

    pub fn all(&self, epoch_id: EpochId) -> &[Order] {
        self.rows.get(&epoch_id).map(|v| v.as_slice()).unwrap_or(&[])
    }

    pub fn all_mut(&mut self, epoch_id: EpochId) -> &mut [Order] {
        self.rows.entry(epoch_id).or_default().as_mut_slice()
    }

    /// Eligible orders for a tick batch, grouped by `target_weight_bracket_id`,
    /// mirroring `fetch_orders`: pending, within its validity window as of
    /// the latest tstamp in the batch, and touching an asset present in the
    /// batch (directly, or via sharing a bracket with an order that is).
    pub fn eligible_grouped_by_bracket<'a>(
        &'a self,
        epoch_id: EpochId,
        batch: &TickBatch,
    ) -> Vec<(String, Vec<&'a Order>)> {
        let assets_in_batch: std::collections::HashSet<&str> =
            batch.iter().map(|t| t.asset.as_str()).collect();
        let max_tstamp = batch.iter().map(|t| t.tstamp).max();
        let Some(max_tstamp) = max_tstamp else { return Vec::new() };

        let touches_batch = |o: &Order| {
            o.asset.as_deref().map(|a| assets_in_batch.contains(a)).unwrap_or(false)
        };

        let candidate_brackets: std::collections::HashSet<String> = self
            .all(epoch_id)
            .iter()
            .filter(|o| o.is_pending() && touches_batch(o))
            .map(|o| o.target_weight_bracket_id.clone())
            .collect();

        self.all(epoch_id)
            .iter()
            .filter(|o| {
                o.is_pending()
                    && o.valid_until >= max_tstamp
                    && o.valid_from < max_tstamp
                    && (touches_batch(o) || candidate_brackets.contains(&o.target_weight_bracket_id))
            })
            .into_group_map_by(|o| o.target_weight_bracket_id.clone())
            .into_iter()
            .collect_vec()
    }
}
