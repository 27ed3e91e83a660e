//! Concurrency-safe associative map from order identifier to order record.
//!
//! Generalized from the teacher's `AppState` (`Arc<Mutex<OrderBook>>` guarded
//! as a single blob) into a keyed registry with secondary scans, guarded by
//! `tokio::sync::RwLock` so readers never block each other the way the
//! teacher's `api.rs` handlers already take `.read().await` against shared
//! state. Per `spec.md` §4.1, writers (the engine task) are serialized but
//! reads are concurrent.

use crate::error::{EngineError, EngineResult};
use crate::order::{MarketId, Order, OrderId, Trader};
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Registry of all known non-terminal orders (terminal orders are removed
/// on reaching `Filled`/`Cancelled`, see `spec.md` §9).
#[derive(Default)]
pub struct OrderIndex {
    inner: RwLock<HashMap<OrderId, Order>>,
}

impl OrderIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `order`. Fails with `InputError` if its `order_id` is already
    /// present; the index is the only place duplicate ids are rejected.
    pub async fn insert(&self, order: Order) -> EngineResult<()> {
        let mut guard = self.inner.write().await;
        if guard.contains_key(&order.order_id) {
            return Err(EngineError::InputError(format!(
                "duplicate order_id {}",
                order.order_id
            )));
        }
        guard.insert(order.order_id.clone(), order);
        Ok(())
    }

    /// Returns a snapshot copy of the order, if present.
    pub async fn get(&self, order_id: &str) -> Option<Order> {
        self.inner.read().await.get(order_id).cloned()
    }

    /// Removes `order_id`. Idempotent: absent ids are simply a no-op.
    pub async fn remove(&self, order_id: &str) -> Option<Order> {
        self.inner.write().await.remove(order_id)
    }

    /// Mutates the order under a single write-lock critical section,
    /// returning whether it existed. Used by the engine so a fill and its
    /// status transition are applied atomically from a reader's perspective.
    pub async fn update<F>(&self, order_id: &str, f: F) -> bool
    where
        F: FnOnce(&mut Order),
    {
        let mut guard = self.inner.write().await;
        match guard.get_mut(order_id) {
            Some(order) => {
                f(order);
                true
            }
            None => false,
        }
    }

    /// Snapshot of every order in `market_id`. Ordering unspecified.
    pub async fn scan_by_market(&self, market_id: &MarketId) -> Vec<Order> {
        self.inner
            .read()
            .await
            .values()
            .filter(|o| &o.market_id == market_id)
            .cloned()
            .collect()
    }

    /// Snapshot of every order submitted by `trader`. Ordering unspecified.
    pub async fn scan_by_trader(&self, trader: &Trader) -> Vec<Order> {
        self.inner
            .read()
            .await
            .values()
            .filter(|o| &o.trader == trader)
            .cloned()
            .collect()
    }

    /// Snapshot of every non-terminal order. Ordering unspecified.
    pub async fn scan_active(&self) -> Vec<Order> {
        self.inner
            .read()
            .await
            .values()
            .filter(|o| o.is_active())
            .cloned()
            .collect()
    }

    /// Number of orders currently tracked.
    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::order::{OrderType, Side};
    use rust_decimal_macros::dec;

    fn order(id: &str, market: &str) -> Order {
        Order::new(
            id.into(),
            "trader-a".into(),
            market.into(),
            Side::Buy,
            OrderType::Limit,
            dec!(100),
            dec!(1),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn insert_then_get_round_trips() {
        let index = OrderIndex::new();
        index.insert(order("o1", "BTC-USDC")).await.unwrap();
        let fetched = index.get("o1").await.unwrap();
        assert_eq!(fetched.order_id, "o1");
    }

    #[tokio::test]
    async fn duplicate_insert_is_rejected() {
        let index = OrderIndex::new();
        index.insert(order("o1", "BTC-USDC")).await.unwrap();
        let err = index.insert(order("o1", "BTC-USDC")).await;
        assert!(matches!(err, Err(EngineError::InputError(_))));
    }

    #[tokio::test]
    async fn remove_is_idempotent() {
        let index = OrderIndex::new();
        index.insert(order("o1", "BTC-USDC")).await.unwrap();
        assert!(index.remove("o1").await.is_some());
        assert!(index.remove("o1").await.is_none());
    }

    #[tokio::test]
    async fn scans_filter_by_market_and_trader() {
        let index = OrderIndex::new();
        index.insert(order("o1", "BTC-USDC")).await.unwrap();
        index.insert(order("o2", "ETH-USDC")).await.unwrap();

        assert_eq!(index.scan_by_market(&"BTC-USDC".to_string()).await.len(), 1);
        assert_eq!(
            index.scan_by_trader(&"trader-a".to_string()).await.len(),
            2
        );
        assert_eq!(index.scan_active().await.len(), 2);
    }
}
