//! Benchmarks for inbound frame decoding and handshake signing

use ascendex_market_data::auth::{sign, signing_message};
use ascendex_market_data::parser::{build_subscribe, classify};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn create_frame(levels: usize) -> String {
    let side = |base: f64, step: f64| -> Vec<String> {
        (0..levels)
            .flat_map(|i| {
                vec![
                    format!("{:.4}", 1.5 + i as f64 * 0.1),
                    format!("{:.2}", base + i as f64 * step),
                ]
            })
            .collect()
    };

    serde_json::json!({
        "m": "bbo",
        "symbol": "BTC/USDT",
        "data": {
            "ts": 1672531200000i64,
            "ask": side(20000.0, 1.0),
            "bid": side(19999.0, -1.0),
        }
    })
    .to_string()
}

fn benchmark_classify(c: &mut Criterion) {
    let frame = create_frame(1);

    c.bench_function("classify_bbo", |b| {
        b.iter(|| {
            black_box(classify(black_box(frame.as_bytes())).ok());
        })
    });

    let deep = create_frame(50);
    c.bench_function("classify_bbo_50_levels", |b| {
        b.iter(|| {
            black_box(classify(black_box(deep.as_bytes())).ok());
        })
    });
}

fn benchmark_to_best_order_book(c: &mut Criterion) {
    let message = classify(create_frame(1).as_bytes()).unwrap();

    c.bench_function("to_best_order_book", |b| {
        b.iter(|| {
            black_box(black_box(&message).to_best_order_book());
        })
    });
}

fn benchmark_outbound(c: &mut Criterion) {
    let message = signing_message(1672531200000, "/0/api/pro/v1/stream");

    c.bench_function("sign_handshake", |b| {
        b.iter(|| {
            black_box(sign(black_box(&message), "secret"));
        })
    });

    c.bench_function("build_subscribe", |b| {
        b.iter(|| {
            black_box(build_subscribe(black_box("USDT_BTC")).to_json().ok());
        })
    });
}

criterion_group!(
    benches,
    benchmark_classify,
    benchmark_to_best_order_book,
    benchmark_outbound
);
criterion_main!(benches);
