//! Computes the reward owed for a submitted order and advances it through
//! `REGISTERED -> PROCESSING -> PROCESSED|INVALID`.

use std::sync::Arc;

use gophermart_core::error::StoreError;
use gophermart_core::luhn;
use gophermart_core::money::Unit;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::db::Store;
use crate::models::{Goods, GoodsRequest, MatchRule, OrderRequest, OrderStatus, RewardKind};

/// Errors an order submission can fail with before a task is ever scheduled.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("order number fails the Luhn check")]
    InvalidNumber,

    #[error("order has no goods")]
    EmptyGoods,

    #[error("order already registered")]
    Duplicate,

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Computes rewards for submitted orders against a catalog of reward rules.
///
/// `submit` does the synchronous validation and persistence; the compute
/// step it schedules runs to completion on its own `tokio` task and is not
/// retried on failure, per the single-pass design.
pub struct Engine {
    store: Arc<Store>,
}

impl Engine {
    pub fn new(store: Arc<Store>) -> Self {
        Self { store }
    }

    /// Validates and persists a submission, then spawns the asynchronous
    /// compute task. Returns once the order is durably at `REGISTERED` (or
    /// `INVALID`); the caller can answer 202 immediately after.
    #[instrument(skip(self, req), fields(order = %req.order))]
    pub async fn submit(&self, req: OrderRequest) -> Result<(), EngineError> {
        if !luhn::check(&req.order) {
            return Err(EngineError::InvalidNumber);
        }
        if req.goods.is_empty() {
            return Err(EngineError::EmptyGoods);
        }

        let names: Vec<String> = req.goods.iter().map(|g| g.description.clone()).collect();
        let matches = self.store.get_matches_by_names(&names).await?;

        if matches.is_empty() {
            match self.store.create_invalid_order(&req.order).await {
                Ok(()) => return Ok(()),
                Err(StoreError::Duplicate) => return Err(EngineError::Duplicate),
                Err(e) => return Err(e.into()),
            }
        }

        let resolved: Vec<(Uuid, Unit)> = req
            .goods
            .iter()
            .filter_map(|g: &GoodsRequest| {
                matches.get(&g.description).map(|m| (m.id, Unit::from_f64(g.price)))
            })
            .collect();

        let created = match self.store.create_order_with_goods(&req.order, &resolved).await {
            Ok(created) => created,
            Err(StoreError::Duplicate) => return Err(EngineError::Duplicate),
            Err(e) => return Err(e.into()),
        };

        let store = Arc::clone(&self.store);
        let rules: std::collections::HashMap<Uuid, MatchRule> =
            matches.into_values().map(|m| (m.id, m)).collect();
        let order_id = created.order_id;
        let goods = created.goods;

        tokio::spawn(async move {
            compute(store, order_id, goods, rules).await;
        });

        Ok(())
    }
}

/// Per-good accrual for a single line: whole-percent of its price for
/// `PERCENT` rules, the flat reward amount for `NATURAL` rules.
fn accrual_for(price: Unit, rule: &MatchRule) -> Unit {
    match rule.kind {
        RewardKind::Percent => price.percent_of(rule.percent()),
        RewardKind::Natural => rule.natural_reward(),
    }
}

/// The asynchronous compute step. Runs exactly once per order; any failure
/// leaves the order parked at `PROCESSING` for an operator or restart to
/// pick up.
#[instrument(skip(store, goods, rules), fields(order_id = %order_id))]
async fn compute(
    store: Arc<Store>,
    order_id: Uuid,
    goods: Vec<Goods>,
    rules: std::collections::HashMap<Uuid, MatchRule>,
) {
    if let Err(err) = store
        .update_order(order_id, OrderStatus::Processing, Unit::ZERO)
        .await
    {
        error!(?err, "failed to move order to PROCESSING, leaving for a rescan");
        return;
    }

    let mut per_good = Vec::with_capacity(goods.len());
    let mut total = Unit::ZERO;

    for good in &goods {
        let Some(rule) = rules.get(&good.match_id) else {
            warn!(good_id = %good.id, "goods line has no resolvable rule at compute time");
            continue;
        };
        let accrual = accrual_for(good.price, rule);
        total = match total.checked_add(accrual) {
            Some(sum) => sum,
            None => {
                error!(order_id = %order_id, "accrual total overflowed, leaving order at PROCESSING");
                return;
            }
        };
        per_good.push((good.id, accrual));
    }

    if let Err(err) = store.batch_update_goods(&per_good).await {
        error!(?err, "failed to persist per-good accrual, leaving for a rescan");
        return;
    }

    if let Err(err) = store
        .update_order(order_id, OrderStatus::Processed, total)
        .await
    {
        error!(?err, "failed to finalise order as PROCESSED, leaving for a rescan");
        return;
    }

    info!(total = %total, "order processed");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(kind: RewardKind, reward: i64) -> MatchRule {
        MatchRule { id: Uuid::new_v4(), name: "Tefal".into(), kind, reward }
    }

    #[test]
    fn percent_rule_applies_whole_percent_of_price() {
        let price = Unit::from_f64(2499.99);
        let r = rule(RewardKind::Percent, 30);
        assert_eq!(accrual_for(price, &r), Unit::from_f64(750.00));
    }

    #[test]
    fn natural_rule_ignores_price() {
        let price = Unit::from_f64(9999.99);
        let r = rule(RewardKind::Natural, 500);
        assert_eq!(accrual_for(price, &r), Unit::from_scaled_i64(500));
    }
}
