//! The atomic, immutable-once-created record of a match between one taker
//! and one maker. Expanded from the teacher's `trade.rs` (which only had
//! `price`/`quantity`/`maker_id`/`taker_id`/`timestamp`) with the fee and
//! trader fields `spec.md` §3 requires.

use crate::decimal::{Price, Quantity};
use crate::order::{MarketId, OrderId, Side, Trader};
use serde::Serialize;

/// A matched trade. `price` is always the maker's price (maker-price
/// priority) and `quantity` is the amount filled on both legs.
#[derive(Debug, Clone, Serialize)]
pub struct Trade {
    pub trade_id: String,
    pub market_id: MarketId,
    pub taker_order_id: OrderId,
    pub maker_order_id: OrderId,
    pub taker_trader: Trader,
    pub maker_trader: Trader,
    pub taker_side: Side,
    pub price: Price,
    pub quantity: Quantity,
    pub taker_fee: Price,
    pub maker_fee: Price,
    pub timestamp: u64,
}
