//! A single price bucket: a FIFO queue of order identifiers plus the
//! aggregate resting quantity at that price. Pulled out of the teacher's
//! inline `VecDeque<Order>` book-side buckets into its own addressable
//! component, per `spec.md` §4.2.

use crate::decimal::{Price, Quantity};
use crate::order::OrderId;
use std::collections::VecDeque;

/// All resting orders at a single price on one side of a book.
#[derive(Debug, Clone)]
pub struct PriceLevel {
    pub price: Price,
    /// Aggregate remaining quantity of every order currently queued here.
    pub quantity: Quantity,
    /// Arrival-ordered order identifiers; never reordered.
    pub order_ids: VecDeque<OrderId>,
}

impl PriceLevel {
    pub fn new(price: Price) -> Self {
        Self {
            price,
            quantity: Quantity::ZERO,
            order_ids: VecDeque::new(),
        }
    }

    /// Appends `order_id` to the FIFO tail and adds `qty` to the aggregate.
    pub fn add_order(&mut self, order_id: OrderId, qty: Quantity) {
        self.order_ids.push_back(order_id);
        self.quantity += qty;
    }

    /// Removes the first occurrence of `order_id` and subtracts `qty` from
    /// the aggregate. No-op if the id isn't present.
    pub fn remove_order(&mut self, order_id: &str, qty: Quantity) {
        if let Some(pos) = self.order_ids.iter().position(|id| id == order_id) {
            self.order_ids.remove(pos);
            self.quantity -= qty;
        }
    }

    pub fn is_empty(&self) -> bool {
        self.order_ids.is_empty()
    }
}
