//! Black-box scenarios against the public `MatchingEngine` API, in the
//! teacher's `tests/api_tests.rs` style (fixture helpers, `#[tokio::test]`)
//! but driving the engine directly rather than through a gateway.

use order_book_engine::config::EngineConfig;
use order_book_engine::engine::MatchingEngine;
use order_book_engine::event::Event;
use order_book_engine::market::MarketParams;
use order_book_engine::order::{Order, OrderType, Side};
use rust_decimal_macros::dec;
use tokio_util::sync::CancellationToken;

const MARKET: &str = "BTC-USDC";

fn limit_order(id: &str, trader: &str, side: Side, price: rust_decimal::Decimal, qty: rust_decimal::Decimal) -> Order {
    Order::new(id.into(), trader.into(), MARKET.into(), side, OrderType::Limit, price, qty).unwrap()
}

#[tokio::test]
async fn run_loop_processes_queued_events_and_drains_on_cancel() {
    let _ = tracing_subscriber::fmt::try_init();

    let engine = MatchingEngine::new(EngineConfig::default());
    let (tx, rx) = tokio::sync::mpsc::channel(16);
    let cancel = CancellationToken::new();

    let sell = Event::new_order(
        "sell-1".into(),
        "maker".into(),
        MARKET.into(),
        Side::Sell,
        OrderType::Limit,
        dec!(50000),
        dec!(1.0),
    )
    .unwrap();
    let buy = Event::new_order(
        "buy-1".into(),
        "taker".into(),
        MARKET.into(),
        Side::Buy,
        OrderType::Limit,
        dec!(50000),
        dec!(0.4),
    )
    .unwrap();

    tx.send(sell).await.unwrap();
    tx.send(buy).await.unwrap();

    let run_cancel = cancel.clone();
    let run_handle = tokio::spawn(async move { engine.run(rx, run_cancel).await });

    // Give the loop a turn to drain both queued events, then ask it to stop.
    tokio::time::sleep(std::time::Duration::from_millis(20)).await;
    cancel.cancel();
    drop(tx);
    run_handle.await.unwrap();
}

#[tokio::test]
async fn stats_reflect_resting_orders_and_pending_trades() {
    let engine = MatchingEngine::new(EngineConfig::default());
    engine
        .submit_order(limit_order("a", "maker", Side::Sell, dec!(50000), dec!(1.0)))
        .await
        .unwrap();
    engine
        .submit_order(limit_order("b", "taker", Side::Buy, dec!(50000), dec!(0.3)))
        .await
        .unwrap();

    let stats = engine.stats().await;
    assert_eq!(stats.book_count, 1);
    assert_eq!(stats.pending_trades, 1);
    // "a" is still resting (partially filled); "b" was fully filled and removed.
    assert_eq!(stats.order_count, 1);
    assert_eq!(stats.index_size, 1);
}

#[tokio::test]
async fn market_update_changes_fee_rates_applied_to_new_trades() {
    let engine = MatchingEngine::new(EngineConfig::default());
    engine
        .update_market(
            MARKET.into(),
            MarketParams {
                taker_fee_rate: dec!(0.01),
                maker_fee_rate: dec!(0.0),
                min_order_size: dec!(0.001),
                tick_size: dec!(0.01),
                base: "BTC".into(),
                quote: "USDC".into(),
            },
        )
        .await;

    engine
        .submit_order(limit_order("maker", "maker", Side::Sell, dec!(50000), dec!(1.0)))
        .await
        .unwrap();
    let trades = engine
        .submit_order(limit_order("taker", "taker", Side::Buy, dec!(50000), dec!(1.0)))
        .await
        .unwrap();

    assert_eq!(trades.len(), 1);
    assert_eq!(trades[0].maker_fee, dec!(0.00000000));
    assert_eq!(trades[0].taker_fee, dec!(500.00000000));
}

#[tokio::test]
async fn duplicate_order_id_is_rejected_without_mutating_state() {
    let engine = MatchingEngine::new(EngineConfig::default());
    engine
        .submit_order(limit_order("dup", "trader-a", Side::Buy, dec!(100), dec!(1)))
        .await
        .unwrap();

    let err = engine
        .submit_order(limit_order("dup", "trader-b", Side::Buy, dec!(100), dec!(1)))
        .await;
    assert!(err.is_err());

    let stats = engine.stats().await;
    assert_eq!(stats.index_size, 1);
}
