//! A bounded FIFO of executed trades awaiting submission, with flush-all and
//! flush-batch semantics.
//!
//! Generalized from the teacher's `AppState.trade_log: Arc<Mutex<Vec<Trade>>>`
//! (an append-only log) into a ring the engine *and* the submitter contend
//! for, per `spec.md` §4.5/§5: both sides take a single short critical
//! section, and a failed submission can be pushed back onto the head so
//! nothing is lost.

use crate::trade::Trade;
use std::collections::VecDeque;
use tokio::sync::{Mutex, Notify};
use tracing::warn;

/// Ordered sequence of trades with a soft `max_size` target. Overflow past
/// `max_size` is tolerated until the next flush; the spec calls this out
/// explicitly rather than making it a hard capacity error.
pub struct TradeBuffer {
    max_size: usize,
    inner: Mutex<VecDeque<Trade>>,
    /// Woken on every append so `BatchSubmitter::run`'s size trigger can
    /// react without polling — the timer trigger runs independently.
    notify: Notify,
}

impl TradeBuffer {
    pub fn new(max_size: usize) -> Self {
        Self {
            max_size,
            inner: Mutex::new(VecDeque::new()),
            notify: Notify::new(),
        }
    }

    /// Appends a single trade to the tail.
    pub async fn add(&self, trade: Trade) {
        let mut guard = self.inner.lock().await;
        guard.push_back(trade);
        if guard.len() > self.max_size {
            warn!(
                len = guard.len(),
                max_size = self.max_size,
                "trade buffer past its soft size target"
            );
        }
        drop(guard);
        self.notify.notify_one();
    }

    /// Appends `trades` to the tail, in order.
    pub async fn add_batch(&self, trades: Vec<Trade>) {
        let mut guard = self.inner.lock().await;
        guard.extend(trades);
        drop(guard);
        self.notify.notify_one();
    }

    /// Resolves the next time a trade is appended to the buffer. Used by
    /// the submitter's size trigger to wake without polling.
    pub async fn notified(&self) {
        self.notify.notified().await
    }

    /// Re-enqueues `trades` at the head, in their original order. Used by
    /// the submitter to return a sub-batch that failed to submit after
    /// exhausting retries, preserving overall submission order.
    pub async fn return_to_head(&self, trades: Vec<Trade>) {
        let mut guard = self.inner.lock().await;
        for trade in trades.into_iter().rev() {
            guard.push_front(trade);
        }
    }

    /// Drains and returns every buffered trade.
    pub async fn flush_all(&self) -> Vec<Trade> {
        let mut guard = self.inner.lock().await;
        guard.drain(..).collect()
    }

    /// Drains and returns up to `n` trades from the head, oldest first.
    pub async fn flush_batch(&self, n: usize) -> Vec<Trade> {
        let mut guard = self.inner.lock().await;
        let take = n.min(guard.len());
        guard.drain(..take).collect()
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// A read-only copy of the buffer's current contents, oldest first.
    pub async fn peek(&self) -> Vec<Trade> {
        self.inner.lock().await.iter().cloned().collect()
    }

    pub async fn clear(&self) {
        self.inner.lock().await.clear();
    }
}
