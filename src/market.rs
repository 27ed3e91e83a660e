//! Market parameter cache: the thin shared-state collaborator the engine
//! reads fee rates and tick/min-size metadata from.
//!
//! Generalized from the teacher's `instrument.rs` (a fixed `Pair`/`Asset`
//! table with a `supported()` constant list) into a live, `MarketUpdate`
//! -writable cache, per `spec.md` §6: the core only reads; an external
//! collaborator writes via `MarketUpdate` events.

use crate::decimal::Price;
use crate::order::MarketId;
use rust_decimal::Decimal;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Per-market trading parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarketParams {
    pub taker_fee_rate: Decimal,
    pub maker_fee_rate: Decimal,
    pub min_order_size: Price,
    pub tick_size: Price,
    pub base: String,
    pub quote: String,
}

/// Read-mostly cache of [`MarketParams`], keyed by market id.
#[derive(Default)]
pub struct MarketCache {
    inner: RwLock<HashMap<MarketId, MarketParams>>,
}

impl MarketCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// `None` on a cache miss — the engine falls back to `EngineConfig`'s
    /// default fee rates in that case (`spec.md` §9's adopted resolution).
    pub async fn get(&self, market_id: &MarketId) -> Option<MarketParams> {
        self.inner.read().await.get(market_id).cloned()
    }

    /// Applies a `MarketUpdate` event, inserting or replacing the cached
    /// parameters for `market_id`.
    pub async fn update(&self, market_id: MarketId, params: MarketParams) {
        self.inner.write().await.insert(market_id, params);
    }

    pub async fn contains(&self, market_id: &MarketId) -> bool {
        self.inner.read().await.contains_key(market_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn params() -> MarketParams {
        MarketParams {
            taker_fee_rate: dec!(0.0005),
            maker_fee_rate: dec!(0.0002),
            min_order_size: dec!(0.001),
            tick_size: dec!(0.01),
            base: "BTC".into(),
            quote: "USDC".into(),
        }
    }

    #[tokio::test]
    async fn miss_then_update_then_hit() {
        let cache = MarketCache::new();
        assert!(cache.get(&"BTC-USDC".to_string()).await.is_none());

        cache.update("BTC-USDC".into(), params()).await;
        let fetched = cache.get(&"BTC-USDC".to_string()).await.unwrap();
        assert_eq!(fetched.taker_fee_rate, dec!(0.0005));
    }
}
