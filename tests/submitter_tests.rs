//! Scenario 6: submitter retry and ordering.

use std::sync::Arc;
use std::time::Duration;

use order_book_engine::config::EngineConfig;
use order_book_engine::order::Side;
use order_book_engine::submitter::{BatchSubmitter, MockSettlementClient, SettlementClient};
use order_book_engine::trade::Trade;
use order_book_engine::trade_buffer::TradeBuffer;
use rust_decimal_macros::dec;
use tokio_util::sync::CancellationToken;

fn trade(id: &str) -> Trade {
    Trade {
        trade_id: id.into(),
        market_id: "BTC-USDC".into(),
        taker_order_id: "taker".into(),
        maker_order_id: "maker".into(),
        taker_trader: "trader-a".into(),
        maker_trader: "trader-b".into(),
        taker_side: Side::Buy,
        price: dec!(50000),
        quantity: dec!(1),
        taker_fee: dec!(0),
        maker_fee: dec!(0),
        timestamp: 0,
    }
}

#[tokio::test]
async fn retries_then_delivers_all_trades_in_order() {
    let mock = Arc::new(MockSettlementClient::with_initial_failures(1));
    let client: Arc<dyn SettlementClient> = mock.clone();
    let buffer = Arc::new(TradeBuffer::new(100));

    buffer.add(trade("t1")).await;
    buffer.add(trade("t2")).await;
    buffer.add(trade("t3")).await;

    let mut config = EngineConfig::default();
    config.batch_interval = Duration::from_millis(20);
    config.retry_attempts = 3;
    config.retry_delay = Duration::from_millis(5);

    let submitter = Arc::new(BatchSubmitter::new(client, buffer.clone(), config));
    let cancel = CancellationToken::new();
    let run_cancel = cancel.clone();
    let run_submitter = submitter.clone();
    let handle = tokio::spawn(async move { run_submitter.run(run_cancel).await });

    tokio::time::sleep(Duration::from_millis(200)).await;
    cancel.cancel();
    handle.await.unwrap();

    let status = submitter.status().await;
    // One induced failure is retried and ultimately succeeds; the batch
    // never exhausts its retry budget.
    assert_eq!(status.failed_submissions, 0);
    assert!(status.total_submissions >= 1);
    assert!(buffer.is_empty().await);

    let trades = mock.received().await;
    assert_eq!(
        trades.iter().map(|t| t.trade_id.as_str()).collect::<Vec<_>>(),
        vec!["t1", "t2", "t3"]
    );
}
