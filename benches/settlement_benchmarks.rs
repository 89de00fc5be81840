//! Performance benchmarks for the settlement engine.
//!
//! Measures the pure engine on receipts of growing size and the preview
//! endpoint end to end.
//!
//! Run with: `cargo bench`
//! HTML reports are generated in `target/criterion/`

use std::sync::Arc;

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};

use receipt_split::allocation::compute_settlement_breakdown;
use receipt_split::api::{AppState, create_router};
use receipt_split::config::ConfigLoader;
use receipt_split::models::{Assignment, LineItem, Strategy};
use receipt_split::store::InMemoryStore;

use axum::{body::Body, http::Request};
use tower::ServiceExt;

const MEMBERS: [&str; 6] = ["ann", "ben", "cat", "dan", "eve", "fay"];

/// Builds a receipt with `item_count` items, each shared by two to six
/// members.
fn create_receipt(item_count: usize) -> (Vec<LineItem>, Vec<Assignment>) {
    let mut items = Vec::with_capacity(item_count);
    let mut assignments = Vec::new();

    for i in 0..item_count {
        let id = format!("item_{}", i + 1);
        let sharers = 2 + i % (MEMBERS.len() - 1);
        items.push(LineItem::new(&id, 499 + (i as i64 * 137) % 5000));
        assignments.extend(Assignment::equal_split(&id, &MEMBERS[..sharers]));
    }
    (items, assignments)
}

fn bench_dinner(c: &mut Criterion) {
    let (items, assignments) = create_receipt(3);

    c.bench_function("dinner_3_items", |b| {
        b.iter(|| {
            black_box(compute_settlement_breakdown(
                black_box(&items),
                black_box(&assignments),
                380,
                600,
                Strategy::Proportional,
                Strategy::Equal,
            ))
        })
    });
}

/// Benchmark: engine scaling with line item count.
fn bench_scaling(c: &mut Criterion) {
    let mut group = c.benchmark_group("scaling");

    for item_count in [1, 10, 50, 200, 1000].iter() {
        let (items, assignments) = create_receipt(*item_count);

        group.throughput(Throughput::Elements(*item_count as u64));
        group.bench_with_input(
            BenchmarkId::new("items", item_count),
            item_count,
            |b, _| {
                b.iter(|| {
                    black_box(compute_settlement_breakdown(
                        &items,
                        &assignments,
                        1_250,
                        2_000,
                        Strategy::Proportional,
                        Strategy::Proportional,
                    ))
                })
            },
        );
    }

    group.finish();
}

/// Benchmark: POST /settlements/preview including JSON handling.
fn bench_preview_endpoint(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let config = ConfigLoader::load("./config/default").expect("Failed to load config");
    let router = create_router(AppState::new(config, Arc::new(InMemoryStore::new())));

    let (items, assignments) = create_receipt(20);
    let body = serde_json::json!({
        "line_items": items,
        "assignments": assignments,
        "tax": 800,
        "tip": 1500,
        "tip_strategy": "EQUAL"
    })
    .to_string();

    c.bench_function("preview_endpoint_20_items", |b| {
        b.to_async(&rt).iter(|| async {
            let router = router.clone();
            let response = router
                .oneshot(
                    Request::builder()
                        .method("POST")
                        .uri("/settlements/preview")
                        .header("Content-Type", "application/json")
                        .body(Body::from(body.clone()))
                        .unwrap(),
                )
                .await
                .unwrap();
            black_box(response)
        })
    });
}

criterion_group!(benches, bench_dinner, bench_scaling, bench_preview_endpoint);
criterion_main!(benches);
