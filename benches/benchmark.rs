use criterion::{BatchSize, Criterion, criterion_group, criterion_main};
use order_book_engine::config::EngineConfig;
use order_book_engine::engine::MatchingEngine;
use order_book_engine::order::{Order, OrderType, Side};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tokio::runtime::Runtime;

const MARKET_ID: &str = "BTC-USDC";

/// Builds an engine with a deep two-sided book: `depth` price levels, each
/// with `orders_per_level` resting orders, on both sides. Asks are offset
/// above the bid range so neither side crosses the other on insertion.
fn seeded_engine(depth: u64, orders_per_level: u64, rt: &Runtime) -> MatchingEngine {
    let engine = MatchingEngine::new(EngineConfig::default());
    rt.block_on(async {
        for price in 1..=depth {
            for i in 0..orders_per_level {
                let ask = Order::new(
                    format!("ask-{price}-{i}"),
                    "maker".into(),
                    MARKET_ID.into(),
                    Side::Sell,
                    OrderType::Limit,
                    Decimal::from(price + depth),
                    dec!(1),
                )
                .unwrap();
                engine.submit_order(ask).await.unwrap();

                let bid = Order::new(
                    format!("bid-{price}-{i}"),
                    "maker".into(),
                    MARKET_ID.into(),
                    Side::Buy,
                    OrderType::Limit,
                    Decimal::from(price),
                    dec!(1),
                )
                .unwrap();
                engine.submit_order(bid).await.unwrap();
            }
        }
    });
    engine
}

fn bench_match_order(c: &mut Criterion) {
    let depth = 100u64;
    let orders_per_level = 10u64;
    let rt = Runtime::new().unwrap();

    c.bench_function("market order walks a deep book", |b| {
        b.iter_batched(
            || seeded_engine(depth, orders_per_level, &rt),
            |engine| {
                let order = Order::new(
                    "market-taker".into(),
                    "taker".into(),
                    MARKET_ID.into(),
                    Side::Buy,
                    OrderType::Market,
                    Decimal::ZERO,
                    Decimal::from(depth * orders_per_level / 2),
                )
                .unwrap();
                rt.block_on(engine.submit_order(order)).unwrap();
            },
            BatchSize::SmallInput,
        )
    });

    c.bench_function("crossing limit order against a deep book", |b| {
        b.iter_batched(
            || seeded_engine(depth, orders_per_level, &rt),
            |engine| {
                let order = Order::new(
                    "limit-taker".into(),
                    "taker".into(),
                    MARKET_ID.into(),
                    Side::Sell,
                    OrderType::Limit,
                    Decimal::from(depth / 2),
                    Decimal::from(depth * orders_per_level),
                )
                .unwrap();
                rt.block_on(engine.submit_order(order)).unwrap();
            },
            BatchSize::SmallInput,
        )
    });
}

criterion_group!(benches, bench_match_order);
criterion_main!(benches);
