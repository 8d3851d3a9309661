use criterion::{criterion_group, criterion_main, Criterion};

use tradeforge::clock::DateTime;
use tradeforge::engine::Engine;
use tradeforge::order::{OrderSpec, OrderType};
use tradeforge::tick::Tick;

fn full_backtest_random_walk() {
    let mut engine = Engine::new();
    let strategy_id = engine.create_strategy("bench", 100_000.0);
    let epoch_id = engine.create_epoch(strategy_id);

    let mut price = 100.0_f64;
    for t in 0..500_i64 {
        price += if t % 2 == 0 { 0.5 } else { -0.3 };
        let tstamp = DateTime::new(t);
        engine
            .process_tick_batch(vec![Tick::new(epoch_id, "ABC", tstamp, price - 0.5, price + 0.5)])
            .unwrap();

        if t % 10 == 0 {
            engine.place_order(epoch_id, OrderSpec::market("ABC", OrderType::Percent, 0.1, tstamp));
        }
    }
}

fn order_matching_throughput() {
    let mut engine = Engine::new();
    let strategy_id = engine.create_strategy("bench", 1_000_000.0);
    let epoch_id = engine.create_epoch(strategy_id);

    engine
        .process_tick_batch(vec![Tick::new(epoch_id, "ABC", DateTime::new(0), 99.0, 101.0)])
        .unwrap();

    for i in 0..100 {
        engine.place_order(
            epoch_id,
            OrderSpec::market("ABC", OrderType::Quantity, if i % 2 == 0 { 1.0 } else { -1.0 }, DateTime::new(0)),
        );
    }

    engine
        .process_tick_batch(vec![Tick::new(epoch_id, "ABC", DateTime::new(1), 99.5, 100.5)])
        .unwrap();
}

fn benchmarks(c: &mut Criterion) {
    c.bench_function("full_backtest_random_walk", |b| b.iter(full_backtest_random_walk));
    c.bench_function("order_matching_throughput", |b| b.iter(order_matching_throughput));
}

criterion_group!(benches, benchmarks);
criterion_main!(benches);
