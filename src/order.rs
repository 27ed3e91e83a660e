//! The immutable identity and mutable fill/status of a single order.
//!
//! Generalized from the teacher's `orders.rs` (which only had `id`, `side`,
//! `order_type`, `price`, `quantity`, `timestamp`) to the full lifecycle
//! `spec.md` §3 requires: string identifiers, explicit status, monotonic
//! fill tracking, and an invariant-checked `apply_fill`.

use crate::decimal::{Price, Quantity};
use crate::error::{EngineError, EngineResult};
use serde::Serialize;
use std::time::{SystemTime, UNIX_EPOCH};

/// Opaque order identifier.
pub type OrderId = String;
/// Opaque trader/account identifier.
pub type Trader = String;
/// Opaque market identifier (e.g. `"BTC-USDC-PERP"`).
pub type MarketId = String;

/// Direction of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    /// The side of the book an order on `self` matches against.
    pub fn opposite(self) -> Side {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }
}

/// How an order is executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderType {
    /// Specifies a maximum (buy) or minimum (sell) price; rests on the book
    /// if not fully matched on arrival.
    Limit,
    /// No price; matches immediately against the best available prices and
    /// never rests.
    Market,
}

/// Current lifecycle state of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderStatus {
    Open,
    PartiallyFilled,
    Filled,
    Cancelled,
}

impl OrderStatus {
    /// Once `Filled` or `Cancelled`, an order is terminal and must not be
    /// matched further.
    pub fn is_terminal(self) -> bool {
        matches!(self, OrderStatus::Filled | OrderStatus::Cancelled)
    }
}

/// Why an order was cancelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelReason {
    /// An explicit `CancelOrder` event.
    UserRequest,
    /// A market order's residual could not be matched against any
    /// liquidity; see `spec.md` §9's resolution of the market-order-residual
    /// open question.
    NoLiquidity,
}

/// A single order: immutable identity/parameters plus mutable fill state.
#[derive(Debug, Clone)]
pub struct Order {
    pub order_id: OrderId,
    pub trader: Trader,
    pub market_id: MarketId,
    pub side: Side,
    pub order_type: OrderType,
    /// Meaningful only for `Limit` orders; ignored for `Market`.
    pub price: Price,
    pub quantity: Quantity,
    pub filled_qty: Quantity,
    pub status: OrderStatus,
    pub cancel_reason: Option<CancelReason>,
    pub created_at: u64,
    pub updated_at: u64,
}

impl Order {
    /// Builds a new `Open` order, validating the invariants `spec.md` §3
    /// requires of a freshly-admitted order. Returns `InputError` on a
    /// malformed request so the event can be rejected synchronously.
    pub fn new(
        order_id: OrderId,
        trader: Trader,
        market_id: MarketId,
        side: Side,
        order_type: OrderType,
        price: Price,
        quantity: Quantity,
    ) -> EngineResult<Self> {
        if order_id.is_empty() {
            return Err(EngineError::InputError("order_id must not be empty".into()));
        }
        if quantity <= Quantity::ZERO {
            return Err(EngineError::InputError(
                "quantity must be positive".into(),
            ));
        }
        if order_type == OrderType::Limit && price <= Price::ZERO {
            return Err(EngineError::InputError(
                "limit order price must be positive".into(),
            ));
        }
        let now = now_millis();
        Ok(Self {
            order_id,
            trader,
            market_id,
            side,
            order_type,
            price,
            quantity,
            filled_qty: Quantity::ZERO,
            status: OrderStatus::Open,
            cancel_reason: None,
            created_at: now,
            updated_at: now,
        })
    }

    /// Quantity still available to match: `quantity − filled_qty`.
    pub fn remaining_qty(&self) -> Quantity {
        self.quantity - self.filled_qty
    }

    pub fn is_active(&self) -> bool {
        !self.status.is_terminal()
    }

    /// Applies a fill of `qty`, advancing `filled_qty` and `status`.
    ///
    /// Returns `InvariantViolation` if `qty` would overfill the order
    /// (`filled_qty + qty > quantity`) rather than silently clamping.
    /// `spec.md` §7 treats this as an internal consistency failure the
    /// caller must drop the trade for, not a case to paper over here.
    pub fn apply_fill(&mut self, qty: Quantity) -> EngineResult<()> {
        if qty <= Quantity::ZERO {
            return Err(EngineError::InvariantViolation(
                "fill quantity must be positive".into(),
            ));
        }
        let new_filled = self.filled_qty + qty;
        if new_filled > self.quantity {
            return Err(EngineError::InvariantViolation(format!(
                "fill of {qty} on order {} would exceed remaining quantity",
                self.order_id
            )));
        }
        self.filled_qty = new_filled;
        self.status = if self.filled_qty == self.quantity {
            OrderStatus::Filled
        } else {
            OrderStatus::PartiallyFilled
        };
        self.updated_at = now_millis();
        Ok(())
    }

    /// Marks the order `Cancelled` with the given reason.
    pub fn cancel(&mut self, reason: CancelReason) {
        self.status = OrderStatus::Cancelled;
        self.cancel_reason = Some(reason);
        self.updated_at = now_millis();
    }
}

pub(crate) fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
