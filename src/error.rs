//! Error kinds for the matching core, grouped by the semantic categories in
//! `spec.md` §7.

use thiserror::Error;

/// Errors the core can surface to a caller or log internally.
///
/// `InputError`, `NotFound`, and `NotActive` are reported synchronously to
/// whoever submitted the event; engine state is unchanged by any of them.
/// `CapacityError` is reported to the producer that hit the full queue or
/// buffer. `SubmissionError` is handled internally by the submitter's
/// retry/re-enqueue logic and only surfaced via its status counters.
/// `InvariantViolation` is logged and the offending operation is skipped;
/// the engine prefers continued availability over halting.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// A malformed order or event: missing field, non-positive quantity,
    /// invalid side/type, or an unknown market.
    #[error("input error: {0}")]
    InputError(String),

    /// A cancel (or lookup) referenced an order_id the index has never seen.
    #[error("order not found: {0}")]
    NotFound(String),

    /// A cancel referenced an order that has already reached a terminal
    /// state (`Filled` or `Cancelled`).
    #[error("order not active: {0}")]
    NotActive(String),

    /// The event queue or trade buffer is full under a `strict` capacity
    /// policy.
    #[error("capacity exceeded: {0}")]
    CapacityError(String),

    /// Transient failure submitting a batch to the settlement collaborator.
    #[error("submission failed: {0}")]
    SubmissionError(String),

    /// An internal consistency check failed (e.g. a fill exceeding the
    /// remaining quantity of an order). Never expected in normal operation;
    /// the offending operation is dropped and the engine continues.
    #[error("invariant violation: {0}")]
    InvariantViolation(String),
}

/// Convenience alias for fallible core operations.
pub type EngineResult<T> = Result<T, EngineError>;
