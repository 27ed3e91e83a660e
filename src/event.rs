//! The tagged-union event ingress the engine consumes, per `spec.md` §4.4/§6.
//!
//! Generalized from the teacher's `api.rs::NewOrder` (a single
//! serde-deserialized "create order" request validated before it becomes an
//! `Order`) into the three event kinds the core actually needs: new orders,
//! cancels, and market-parameter updates. Producers obtain events through
//! the constructors below, which perform the same synchronous validation
//! the teacher's `create_order` handler does (`quantity must be > 0`, etc.)
//! before an event is ever handed to the engine.

use crate::decimal::{Price, Quantity};
use crate::error::{EngineError, EngineResult};
use crate::market::MarketParams;
use crate::order::{MarketId, Order, OrderId, OrderType, Side, Trader};

/// One event delivered into the engine's ingress queue.
#[derive(Debug, Clone)]
pub enum Event {
    /// A new order, already validated and admitted upstream (margin,
    /// authentication, etc. are the caller's responsibility). The core only
    /// checks the structural invariants in `spec.md` §3.
    NewOrder(Order),
    /// A best-effort cancel request for a resting or in-flight order.
    CancelOrder { order_id: OrderId },
    /// Updates the cached parameters for `market_id`.
    MarketUpdate {
        market_id: MarketId,
        params: MarketParams,
    },
}

impl Event {
    /// Builds a `NewOrder` event, validating its fields the way
    /// `Order::new` does. Returns `InputError` synchronously on a malformed
    /// request rather than handing a bad order to the engine.
    pub fn new_order(
        order_id: OrderId,
        trader: Trader,
        market_id: MarketId,
        side: Side,
        order_type: OrderType,
        price: Price,
        quantity: Quantity,
    ) -> EngineResult<Self> {
        Ok(Event::NewOrder(Order::new(
            order_id, trader, market_id, side, order_type, price, quantity,
        )?))
    }

    /// Builds a `CancelOrder` event.
    pub fn cancel_order(order_id: OrderId) -> EngineResult<Self> {
        if order_id.is_empty() {
            return Err(EngineError::InputError("order_id must not be empty".into()));
        }
        Ok(Event::CancelOrder { order_id })
    }

    /// Builds a `MarketUpdate` event.
    pub fn market_update(market_id: MarketId, params: MarketParams) -> EngineResult<Self> {
        if market_id.is_empty() {
            return Err(EngineError::InputError("market_id must not be empty".into()));
        }
        Ok(Event::MarketUpdate { market_id, params })
    }
}
