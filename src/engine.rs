//! The single-writer coordinator: owns every market's [`OrderBook`], runs the
//! price-time priority matching algorithm, and appends resulting trades to
//! the [`TradeBuffer`].
//!
//! Generalized from the teacher's `orderbook.rs::match_order`/
//! `match_incoming_side` (which matched directly against inline
//! `VecDeque<Order>` levels) into an index-backed algorithm: makers are
//! fetched from and written back to the [`OrderIndex`] rather than held by
//! value inside the level, per `spec.md` §4.4/§9 ("levels store only
//! identifiers and the aggregate quantity").

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{RwLock, mpsc};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::book::{BookSnapshot, OrderBook};
use crate::config::{EngineConfig, MarketOrderResidualPolicy, QueueFullPolicy};
use crate::decimal::{Quantity, compute_fee};
use crate::error::{EngineError, EngineResult};
use crate::event::Event;
use crate::market::MarketCache;
use crate::order::{CancelReason, MarketId, Order, OrderId, OrderType, Side, now_millis};
use crate::order_index::OrderIndex;
use crate::snapshot::Stats;
use crate::trade::Trade;
use crate::trade_buffer::TradeBuffer;

/// Owns every per-market book plus the shared index/cache/buffer
/// collaborators, and implements the `NewOrder`/`CancelOrder`/`MarketUpdate`
/// algorithms of `spec.md` §4.4. Intended to be wrapped in an `Arc` and
/// driven by a single `run` task (§5's single-writer discipline) while
/// readers call the `get_*`/`stats` accessors concurrently.
pub struct MatchingEngine {
    config: EngineConfig,
    books: RwLock<HashMap<MarketId, OrderBook>>,
    index: Arc<OrderIndex>,
    market_cache: Arc<MarketCache>,
    buffer: Arc<TradeBuffer>,
}

impl MatchingEngine {
    pub fn new(config: EngineConfig) -> Self {
        let buffer = Arc::new(TradeBuffer::new(config.trade_buffer_max_size));
        Self {
            config,
            books: RwLock::new(HashMap::new()),
            index: Arc::new(OrderIndex::new()),
            market_cache: Arc::new(MarketCache::new()),
            buffer,
        }
    }

    /// A clone of the shared order index, for wiring a read-only API
    /// collaborator or the submitter's order-update notifications.
    pub fn index(&self) -> Arc<OrderIndex> {
        self.index.clone()
    }

    /// A clone of the shared market-parameter cache.
    pub fn market_cache(&self) -> Arc<MarketCache> {
        self.market_cache.clone()
    }

    /// A clone of the shared trade buffer, for wiring the `BatchSubmitter`.
    pub fn buffer(&self) -> Arc<TradeBuffer> {
        self.buffer.clone()
    }

    /// Builds the bounded ingress channel `run` consumes, sized by
    /// `config.event_queue_capacity` (`spec.md` §2/§5/§6).
    pub fn event_channel(&self) -> (mpsc::Sender<Event>, mpsc::Receiver<Event>) {
        mpsc::channel(self.config.event_queue_capacity)
    }

    /// Enqueues `event` onto `sender`, honoring `config.queue_full_policy`.
    /// Under `Block` the call awaits until there's room; under `Drop` a full
    /// queue is rejected immediately with `CapacityError` rather than
    /// blocking the producer (`spec.md` §7).
    pub async fn try_enqueue(&self, sender: &mpsc::Sender<Event>, event: Event) -> EngineResult<()> {
        match self.config.queue_full_policy {
            QueueFullPolicy::Block => sender
                .send(event)
                .await
                .map_err(|_| EngineError::InputError("event queue closed".into())),
            QueueFullPolicy::Drop => sender.try_send(event).map_err(|err| match err {
                mpsc::error::TrySendError::Full(_) => {
                    EngineError::CapacityError("event queue full".into())
                }
                mpsc::error::TrySendError::Closed(_) => {
                    EngineError::InputError("event queue closed".into())
                }
            }),
        }
    }

    async fn fee_rates(&self, market_id: &MarketId) -> (Quantity, Quantity) {
        match self.market_cache.get(market_id).await {
            Some(params) => (params.taker_fee_rate, params.maker_fee_rate),
            None => (
                self.config.default_taker_fee_rate,
                self.config.default_maker_fee_rate,
            ),
        }
    }

    /// Runs the `NewOrder(o)` algorithm of `spec.md` §4.4 to completion and
    /// returns the trades it produced (already appended to the buffer).
    pub async fn submit_order(&self, mut order: Order) -> EngineResult<Vec<Trade>> {
        self.index.insert(order.clone()).await?;
        let (taker_fee_rate, maker_fee_rate) = self.fee_rates(&order.market_id).await;
        let mut trades = Vec::new();

        {
            let mut books = self.books.write().await;
            let book = books
                .entry(order.market_id.clone())
                .or_insert_with(OrderBook::new);

            'levels: for (level_price, level) in book.opposite_side_mut(order.side) {
                if order.remaining_qty() <= Quantity::ZERO {
                    break 'levels;
                }
                if order.order_type == OrderType::Limit {
                    let compatible = match order.side {
                        Side::Buy => order.price >= *level_price,
                        Side::Sell => order.price <= *level_price,
                    };
                    if !compatible {
                        break 'levels;
                    }
                }

                let maker_ids: Vec<OrderId> = level.order_ids.iter().cloned().collect();
                let mut remove_ids: Vec<OrderId> = Vec::new();

                for maker_id in maker_ids {
                    if order.remaining_qty() <= Quantity::ZERO {
                        break;
                    }

                    let mut maker = match self.index.get(&maker_id).await {
                        Some(m) if m.is_active() => m,
                        _ => {
                            remove_ids.push(maker_id);
                            continue;
                        }
                    };

                    let match_qty = order.remaining_qty().min(maker.remaining_qty());
                    let match_price = *level_price;

                    if maker.apply_fill(match_qty).is_err() {
                        tracing::error!(
                            maker_id = %maker_id,
                            "invariant violation filling maker, dropping trade"
                        );
                        continue;
                    }
                    if order.apply_fill(match_qty).is_err() {
                        tracing::error!(
                            order_id = %order.order_id,
                            "invariant violation filling taker, dropping trade"
                        );
                        continue;
                    }

                    let taker_fee = compute_fee(
                        match_qty,
                        match_price,
                        taker_fee_rate,
                        self.config.fee_precision,
                    );
                    let maker_fee = compute_fee(
                        match_qty,
                        match_price,
                        maker_fee_rate,
                        self.config.fee_precision,
                    );

                    let trade = Trade {
                        trade_id: Uuid::new_v4().to_string(),
                        market_id: order.market_id.clone(),
                        taker_order_id: order.order_id.clone(),
                        maker_order_id: maker.order_id.clone(),
                        taker_trader: order.trader.clone(),
                        maker_trader: maker.trader.clone(),
                        taker_side: order.side,
                        price: match_price,
                        quantity: match_qty,
                        taker_fee,
                        maker_fee,
                        timestamp: now_millis(),
                    };
                    self.buffer.add(trade.clone()).await;
                    trades.push(trade);

                    level.quantity -= match_qty;

                    if maker.status.is_terminal() {
                        remove_ids.push(maker_id.clone());
                        self.index.remove(&maker_id).await;
                    } else {
                        self.index.update(&maker_id, |m| *m = maker.clone()).await;
                    }
                }

                level.order_ids.retain(|id| !remove_ids.contains(id));
            }

            book.sweep_empty_levels();

            match order.order_type {
                OrderType::Limit if order.remaining_qty() > Quantity::ZERO => {
                    book.add_resting(
                        order.side,
                        order.price,
                        order.order_id.clone(),
                        order.remaining_qty(),
                    );
                }
                OrderType::Market if order.remaining_qty() > Quantity::ZERO => {
                    match self.config.market_order_residual_policy {
                        MarketOrderResidualPolicy::CancelRemainder => {
                            order.cancel(CancelReason::NoLiquidity);
                        }
                        MarketOrderResidualPolicy::Drop => {}
                    }
                }
                _ => {}
            }
        }

        if order.status.is_terminal() {
            self.index.remove(&order.order_id).await;
        } else {
            self.index
                .update(&order.order_id, |idx_order| *idx_order = order.clone())
                .await;
        }

        Ok(trades)
    }

    /// Runs the `CancelOrder(id)` algorithm of `spec.md` §4.4.
    pub async fn cancel_order(&self, order_id: &str) -> EngineResult<()> {
        let order = self
            .index
            .get(order_id)
            .await
            .ok_or_else(|| EngineError::NotFound(order_id.to_string()))?;
        if order.status.is_terminal() {
            return Err(EngineError::NotActive(order_id.to_string()));
        }

        {
            let mut books = self.books.write().await;
            if let Some(book) = books.get_mut(&order.market_id) {
                book.remove_resting(order.side, order.price, order_id, order.remaining_qty());
            }
        }

        self.index.remove(order_id).await;
        Ok(())
    }

    /// Applies a `MarketUpdate(market_id, params)` event.
    pub async fn update_market(&self, market_id: MarketId, params: crate::market::MarketParams) {
        self.market_cache.update(market_id, params).await;
    }

    /// Handles one event, logging and swallowing any rejection. A malformed
    /// or stale event never stops the engine task (`spec.md` §4.4 failure
    /// semantics).
    async fn handle_event(&self, event: Event) {
        match event {
            Event::NewOrder(order) => {
                let order_id = order.order_id.clone();
                if let Err(err) = self.submit_order(order).await {
                    tracing::warn!(order_id, %err, "new order rejected");
                }
            }
            Event::CancelOrder { order_id } => {
                if let Err(err) = self.cancel_order(&order_id).await {
                    tracing::warn!(order_id, %err, "cancel rejected");
                }
            }
            Event::MarketUpdate { market_id, params } => {
                self.update_market(market_id, params).await;
            }
        }
    }

    /// Consumes events until `cancel` fires, then drains whatever has
    /// already arrived up to a grace deadline before returning, per
    /// `spec.md` §5's cancellation contract for the engine task.
    pub async fn run(&self, mut events: mpsc::Receiver<Event>, cancel: CancellationToken) {
        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("engine cancelled, draining pending events");
                    self.drain_with_grace(&mut events, Duration::from_secs(2)).await;
                    break;
                }
                event = events.recv() => {
                    match event {
                        Some(event) => self.handle_event(event).await,
                        None => break,
                    }
                }
            }
        }
        tracing::info!("engine task stopped");
    }

    async fn drain_with_grace(&self, events: &mut mpsc::Receiver<Event>, grace: Duration) {
        let deadline = tokio::time::Instant::now() + grace;
        loop {
            let remaining = deadline.saturating_duration_since(tokio::time::Instant::now());
            if remaining.is_zero() {
                break;
            }
            match tokio::time::timeout(remaining, events.recv()).await {
                Ok(Some(event)) => self.handle_event(event).await,
                _ => break,
            }
        }
    }

    /// Immutable snapshot of `market_id`'s book, for the read-only API
    /// collaborator named in `spec.md` §6.
    pub async fn get_order_book(&self, market_id: &MarketId) -> Option<BookSnapshot> {
        self.books.read().await.get(market_id).map(|b| b.snapshot())
    }

    pub async fn get_order(&self, order_id: &str) -> Option<Order> {
        self.index.get(order_id).await
    }

    pub async fn stats(&self) -> Stats {
        Stats {
            order_count: self.index.scan_active().await.len(),
            book_count: self.books.read().await.len(),
            pending_trades: self.buffer.len().await,
            index_size: self.index.len().await,
        }
    }
}
