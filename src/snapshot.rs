//! Read-only egress DTOs consumed by an external API collaborator, per
//! `spec.md` §6. `BookSnapshot` lives alongside `OrderBook` in `book.rs`;
//! this module holds the engine-wide `Stats` counter snapshot.
//!
//! Generalized from the teacher's `api.rs` read models (`TradesPage`,
//! `WsFrame`), which were serde-derived structs assembled on demand from
//! shared state rather than persisted. `Stats` follows the same shape.

use serde::Serialize;

/// Point-in-time counters for a running [`crate::engine::MatchingEngine`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Stats {
    /// Number of currently active (non-terminal) orders.
    pub order_count: usize,
    /// Number of markets with at least one book ever created.
    pub book_count: usize,
    /// Trades sitting in the buffer awaiting submission.
    pub pending_trades: usize,
    /// Total entries currently tracked by the order index.
    pub index_size: usize,
}

impl Stats {
    /// Encodes the counters for an external read-only API collaborator.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
