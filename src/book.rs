//! Per-market container of bid levels (descending) and ask levels
//! (ascending), with best-bid / best-ask / spread lookups.
//!
//! Generalized from the teacher's `orderbook.rs`: the same `BTreeMap` +
//! direction-flag iteration shape (`EitherIter`, `match_incoming_side`) is
//! kept, but price levels are now addressable `PriceLevel`s keyed by
//! `Decimal` rather than inline `VecDeque<Order>`s keyed by `u64`, and the
//! crossing-match algorithm itself now lives in `MatchingEngine` (the book
//! only holds resting state, per `spec.md` §4.3).

use crate::decimal::{Price, Quantity};
use crate::order::Side;
use crate::price_level::PriceLevel;
use serde::Serialize;
use std::collections::BTreeMap;
use std::collections::btree_map;

/// Unifies ascending (`asks`) and descending (`bids`) `BTreeMap` iteration
/// behind one type, so the matching engine can walk "the opposite side in
/// best-price order" without caring which side that is.
pub enum OppositeSideIter<'a> {
    Ascending(btree_map::IterMut<'a, Price, PriceLevel>),
    Descending(std::iter::Rev<btree_map::IterMut<'a, Price, PriceLevel>>),
}

impl<'a> Iterator for OppositeSideIter<'a> {
    type Item = (&'a Price, &'a mut PriceLevel);

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            OppositeSideIter::Ascending(it) => it.next(),
            OppositeSideIter::Descending(it) => it.next(),
        }
    }
}

/// Per-market resting order book: bids sorted descending by price, asks
/// sorted ascending, each side a `BTreeMap` keyed by price for `O(log L)`
/// insert/remove/best-price lookup.
#[derive(Debug, Clone, Default)]
pub struct OrderBook {
    pub bids: BTreeMap<Price, PriceLevel>,
    pub asks: BTreeMap<Price, PriceLevel>,
}

impl OrderBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// The side of the book that a taker on `side` matches against, in
    /// best-price-first iteration order: ascending asks for a `Buy`,
    /// descending bids for a `Sell`.
    pub fn opposite_side_mut(&mut self, side: Side) -> OppositeSideIter<'_> {
        match side.opposite() {
            Side::Sell => OppositeSideIter::Ascending(self.asks.iter_mut()),
            Side::Buy => OppositeSideIter::Descending(self.bids.iter_mut().rev()),
        }
    }

    fn side_mut(&mut self, side: Side) -> &mut BTreeMap<Price, PriceLevel> {
        match side {
            Side::Buy => &mut self.bids,
            Side::Sell => &mut self.asks,
        }
    }

    /// Locates or creates the level at `price` on `side`, appends
    /// `order_id`/`qty` to it.
    pub fn add_resting(&mut self, side: Side, price: Price, order_id: String, qty: Quantity) {
        self.side_mut(side)
            .entry(price)
            .or_insert_with(|| PriceLevel::new(price))
            .add_order(order_id, qty);
    }

    /// Removes `order_id` from the level at `price` on `side`, deleting the
    /// level if it becomes empty. No-op if the order or level is absent.
    pub fn remove_resting(&mut self, side: Side, price: Price, order_id: &str, qty: Quantity) {
        let book_side = self.side_mut(side);
        if let Some(level) = book_side.get_mut(&price) {
            level.remove_order(order_id, qty);
            if level.is_empty() {
                book_side.remove(&price);
            }
        }
    }

    /// Removes any level whose quantity has dropped to zero or whose
    /// `order_ids` is empty, on both sides.
    pub fn sweep_empty_levels(&mut self) {
        self.bids.retain(|_, level| !level.is_empty());
        self.asks.retain(|_, level| !level.is_empty());
    }

    /// Highest bid price and its level, if any.
    pub fn best_bid(&self) -> Option<(&Price, &PriceLevel)> {
        self.bids.iter().next_back()
    }

    /// Lowest ask price and its level, if any.
    pub fn best_ask(&self) -> Option<(&Price, &PriceLevel)> {
        self.asks.iter().next()
    }

    /// `best_ask − best_bid`, if both sides are non-empty.
    pub fn spread(&self) -> Option<Price> {
        match (self.best_bid(), self.best_ask()) {
            (Some((bid, _)), Some((ask, _))) => Some(*ask - *bid),
            _ => None,
        }
    }

    /// An immutable snapshot suitable for handing to an external read-only
    /// API collaborator (`spec.md` §6).
    pub fn snapshot(&self) -> BookSnapshot {
        BookSnapshot {
            bids: self
                .bids
                .iter()
                .rev()
                .map(|(p, l)| (*p, l.quantity, l.order_ids.iter().cloned().collect()))
                .collect(),
            asks: self
                .asks
                .iter()
                .map(|(p, l)| (*p, l.quantity, l.order_ids.iter().cloned().collect()))
                .collect(),
        }
    }
}

/// A single `(price, aggregate_quantity, order_ids)` row in a snapshot.
pub type SnapshotLevel = (Price, Quantity, Vec<String>);

/// Immutable point-in-time view of an [`OrderBook`], for the read-only API
/// collaborator named in `spec.md` §6.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BookSnapshot {
    pub bids: Vec<SnapshotLevel>,
    pub asks: Vec<SnapshotLevel>,
}

impl BookSnapshot {
    /// Encodes the snapshot for an external read-only API collaborator.
    /// No wire-format compatibility is part of this crate's contract
    /// (`spec.md` §6); this is a convenience, not a stability guarantee.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn empty_book_has_no_best_prices_or_spread() {
        let book = OrderBook::new();
        assert!(book.best_bid().is_none());
        assert!(book.best_ask().is_none());
        assert!(book.spread().is_none());
    }

    #[test]
    fn resting_orders_sort_by_price_priority() {
        let mut book = OrderBook::new();
        book.add_resting(Side::Buy, dec!(49000), "b1".into(), dec!(1));
        book.add_resting(Side::Buy, dec!(49500), "b2".into(), dec!(1));
        book.add_resting(Side::Sell, dec!(50000), "a1".into(), dec!(1));
        book.add_resting(Side::Sell, dec!(50200), "a2".into(), dec!(1));

        assert_eq!(book.best_bid().unwrap().0, &dec!(49500));
        assert_eq!(book.best_ask().unwrap().0, &dec!(50000));
        assert_eq!(book.spread(), Some(dec!(500)));
    }

    #[test]
    fn remove_resting_prunes_empty_level() {
        let mut book = OrderBook::new();
        book.add_resting(Side::Buy, dec!(49000), "b1".into(), dec!(1));
        book.remove_resting(Side::Buy, dec!(49000), "b1", dec!(1));
        assert!(book.bids.is_empty());
    }

    #[test]
    fn sweep_empty_levels_removes_zero_quantity_levels() {
        let mut book = OrderBook::new();
        book.asks.insert(dec!(1), PriceLevel::new(dec!(1)));
        book.sweep_empty_levels();
        assert!(book.asks.is_empty());
    }
}
