//! Configuration surface for the matching core, enumerated in `spec.md` §6.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::time::Duration;

/// What happens to the unmatched remainder of a market order once the book
/// runs out of liquidity against it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MarketOrderResidualPolicy {
    /// The residual is silently discarded; the order's status reflects
    /// whatever `Fill` left it.
    Drop,
    /// The residual is discarded and the order is explicitly closed with
    /// `Cancelled` / `CancelReason::NoLiquidity`. This is the spec's adopted
    /// resolution of the "what happens to an unmatched market order" open
    /// question, and the default.
    #[default]
    CancelRemainder,
}

/// Backoff shape used between submitter retry attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubmissionBackoff {
    /// Every retry waits the same `retry_delay`.
    #[default]
    Constant,
    /// Retry `n` waits `retry_delay * 2^(n-1)`.
    Exponential,
}

/// What an event producer experiences when the bounded event queue is full.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QueueFullPolicy {
    /// The producer's send awaits until there is room (the default).
    #[default]
    Block,
    /// The producer's send fails immediately with `CapacityError`.
    Drop,
}

/// All tunables named in `spec.md` §6, with the spec's defaults.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Maximum number of trades drained in one submission sub-batch.
    pub batch_size: usize,
    /// How often the submitter's timer trigger fires a flush.
    pub batch_interval: Duration,
    /// Capacity of the bounded event ingress queue.
    pub event_queue_capacity: usize,
    /// How the event queue behaves once full.
    pub queue_full_policy: QueueFullPolicy,
    /// Maximum submit attempts per sub-batch before giving up and
    /// re-enqueuing it at the head of the buffer.
    pub retry_attempts: u32,
    /// Base delay between retry attempts.
    pub retry_delay: Duration,
    /// Backoff shape applied across retries.
    pub submission_backoff: SubmissionBackoff,
    /// Taker fee rate used when a market's parameters are not cached.
    pub default_taker_fee_rate: Decimal,
    /// Maker fee rate used when a market's parameters are not cached.
    pub default_maker_fee_rate: Decimal,
    /// Fractional digits fees are rounded to (half-to-even).
    pub fee_precision: u32,
    /// What to do with the unfilled remainder of a market order.
    pub market_order_residual_policy: MarketOrderResidualPolicy,
    /// Soft capacity of the `TradeBuffer`. Not named in the configuration
    /// surface explicitly, but a natural sibling to `batch_size`, sized
    /// generously above it so the buffer tolerates a few flush cycles'
    /// worth of backlog before its soft-limit warning fires.
    pub trade_buffer_max_size: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            batch_size: 100,
            batch_interval: Duration::from_millis(500),
            event_queue_capacity: 1024,
            queue_full_policy: QueueFullPolicy::Block,
            retry_attempts: 3,
            retry_delay: Duration::from_secs(1),
            submission_backoff: SubmissionBackoff::Constant,
            default_taker_fee_rate: dec!(0.0005),
            default_maker_fee_rate: dec!(0.0002),
            fee_precision: crate::decimal::DEFAULT_FEE_PRECISION,
            market_order_residual_policy: MarketOrderResidualPolicy::default(),
            trade_buffer_max_size: 1000,
        }
    }
}
