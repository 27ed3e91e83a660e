//! Time- and size-triggered drain of the [`TradeBuffer`] toward an external
//! settlement collaborator, with retry, backoff, and re-enqueue on
//! exhaustion.
//!
//! Generalized from the teacher's `market_maker::run_market_maker` (a
//! `tokio::select!` loop over a ticker and a cancellation token, retrying a
//! connection) into a batch submission loop per `spec.md` §4.6: the ticker
//! becomes the `batch_interval` timer, the retry-connect loop becomes
//! per-sub-batch retry with backoff, and `utils::shutdown_token`'s
//! `CancellationToken` is reused verbatim for graceful shutdown.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::config::{EngineConfig, SubmissionBackoff};
use crate::error::EngineResult;
use crate::order::{Order, now_millis};
use crate::trade::Trade;
use crate::trade_buffer::TradeBuffer;

/// The external collaborator the core consumes to durably persist trades
/// (`spec.md` §6) — the settlement chain in production, a mock in tests.
/// `async-trait` makes this dyn-compatible so the submitter can hold it as
/// `Arc<dyn SettlementClient>` without knowing the concrete transport.
#[async_trait]
pub trait SettlementClient: Send + Sync {
    /// Submits one ordered sub-batch. Must not reorder `trades`.
    async fn submit_trades(&self, trades: &[Trade]) -> EngineResult<()>;

    /// Notifies the collaborator of a terminal order status (cancel/fill),
    /// for settlement paths that require it. Not invoked automatically by
    /// the engine; available to whichever task owns order lifecycle
    /// notifications.
    async fn submit_order_update(&self, order: &Order) -> EngineResult<()>;

    /// Whether the collaborator connection is currently healthy.
    async fn is_connected(&self) -> bool;
}

/// Snapshot of the submitter's health and throughput counters, per
/// `spec.md` §4.6/§6.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitterStatus {
    pub connected: bool,
    pub pending_count: usize,
    pub last_submit_time: Option<u64>,
    pub last_error: Option<String>,
    pub total_submissions: u64,
    pub failed_submissions: u64,
}

/// Drains `buffer` toward `client` on a dual timer/size trigger, splitting
/// oversized flushes into `batch_size`-capped sub-batches and retrying each
/// with backoff before giving up and returning it to the buffer's head.
pub struct BatchSubmitter {
    client: Arc<dyn SettlementClient>,
    buffer: Arc<TradeBuffer>,
    config: EngineConfig,
    total_submissions: AtomicU64,
    failed_submissions: AtomicU64,
    last_submit_time: Mutex<Option<u64>>,
    last_error: Mutex<Option<String>>,
}

impl BatchSubmitter {
    pub fn new(client: Arc<dyn SettlementClient>, buffer: Arc<TradeBuffer>, config: EngineConfig) -> Self {
        Self {
            client,
            buffer,
            config,
            total_submissions: AtomicU64::new(0),
            failed_submissions: AtomicU64::new(0),
            last_submit_time: Mutex::new(None),
            last_error: Mutex::new(None),
        }
    }

    pub async fn status(&self) -> SubmitterStatus {
        SubmitterStatus {
            connected: self.client.is_connected().await,
            pending_count: self.buffer.len().await,
            last_submit_time: *self.last_submit_time.lock().await,
            last_error: self.last_error.lock().await.clone(),
            total_submissions: self.total_submissions.load(Ordering::SeqCst),
            failed_submissions: self.failed_submissions.load(Ordering::SeqCst),
        }
    }

    fn backoff_delay(&self, attempt: u32) -> Duration {
        match self.config.submission_backoff {
            SubmissionBackoff::Constant => self.config.retry_delay,
            SubmissionBackoff::Exponential => self.config.retry_delay * 2u32.saturating_pow(attempt - 1),
        }
    }

    /// Submits one sub-batch with retry/backoff; on exhaustion, returns it
    /// to the head of the buffer and records a failure. `cancel` lets an
    /// in-flight backoff wait abort promptly (`spec.md` §5).
    async fn submit_sub_batch(&self, batch: Vec<Trade>, cancel: &CancellationToken) {
        let mut attempt = 0u32;
        loop {
            attempt += 1;
            match self.client.submit_trades(&batch).await {
                Ok(()) => {
                    self.total_submissions.fetch_add(1, Ordering::SeqCst);
                    *self.last_submit_time.lock().await = Some(now_millis());
                    return;
                }
                Err(err) => {
                    tracing::warn!(attempt, %err, "sub-batch submission failed");
                    *self.last_error.lock().await = Some(err.to_string());

                    if attempt >= self.config.retry_attempts {
                        self.failed_submissions.fetch_add(1, Ordering::SeqCst);
                        self.buffer.return_to_head(batch).await;
                        return;
                    }

                    tokio::select! {
                        _ = tokio::time::sleep(self.backoff_delay(attempt)) => {}
                        _ = cancel.cancelled() => {
                            self.failed_submissions.fetch_add(1, Ordering::SeqCst);
                            self.buffer.return_to_head(batch).await;
                            return;
                        }
                    }
                }
            }
        }
    }

    /// Drains the whole buffer and submits it as consecutive
    /// `batch_size`-capped sub-batches, preserving order.
    async fn drain_and_submit(&self, cancel: &CancellationToken) {
        let trades = self.buffer.flush_all().await;
        if trades.is_empty() {
            return;
        }
        for chunk in trades.chunks(self.config.batch_size) {
            self.submit_sub_batch(chunk.to_vec(), cancel).await;
        }
    }

    /// Runs the dual-trigger drain loop until `cancel` fires, then performs
    /// one final flush attempt before stopping (`spec.md` §5).
    pub async fn run(&self, cancel: CancellationToken) {
        let mut interval = tokio::time::interval(self.config.batch_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        interval.tick().await; // the first tick fires immediately; consume it.

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("submitter cancelled, performing final flush");
                    self.drain_and_submit(&cancel).await;
                    break;
                }
                _ = interval.tick() => {
                    self.drain_and_submit(&cancel).await;
                }
                _ = self.buffer.notified() => {
                    if self.buffer.len().await >= self.config.batch_size {
                        self.drain_and_submit(&cancel).await;
                    }
                }
            }
        }
        tracing::info!("submitter task stopped");
    }
}

/// Settlement client for tests: accumulates received trades, optionally
/// failing a configured number of leading `submit_trades` calls before
/// succeeding from then on.
pub struct MockSettlementClient {
    fail_next: AtomicU32,
    connected: AtomicBool,
    received: Mutex<Vec<Trade>>,
}

impl MockSettlementClient {
    pub fn new() -> Self {
        Self {
            fail_next: AtomicU32::new(0),
            connected: AtomicBool::new(true),
            received: Mutex::new(Vec::new()),
        }
    }

    /// The first `n` calls to `submit_trades` fail with `SubmissionError`;
    /// subsequent calls succeed.
    pub fn with_initial_failures(n: u32) -> Self {
        let client = Self::new();
        client.fail_next.store(n, Ordering::SeqCst);
        client
    }

    pub fn set_connected(&self, connected: bool) {
        self.connected.store(connected, Ordering::SeqCst);
    }

    pub async fn received(&self) -> Vec<Trade> {
        self.received.lock().await.clone()
    }
}

impl Default for MockSettlementClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SettlementClient for MockSettlementClient {
    async fn submit_trades(&self, trades: &[Trade]) -> EngineResult<()> {
        if self.fail_next.load(Ordering::SeqCst) > 0 {
            self.fail_next.fetch_sub(1, Ordering::SeqCst);
            return Err(crate::error::EngineError::SubmissionError(
                "mock induced failure".into(),
            ));
        }
        self.received.lock().await.extend_from_slice(trades);
        Ok(())
    }

    async fn submit_order_update(&self, _order: &Order) -> EngineResult<()> {
        Ok(())
    }

    async fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }
}
