// benches/diff.rs
use criterion::{criterion_group, criterion_main, Criterion, black_box};

use pricewatch::{
    core::normalize,
    diff::diff,
    snapshot::{Item, Snapshot, StateMap},
};

fn listing(n: usize, bump_every: usize) -> StateMap {
    let items = (0..n)
        .map(|i| {
            let price = 10_000 + i * 100 + if i % bump_every == 0 { 50 } else { 0 };
            Item::new(
                i + 1,
                format!("https://zigzag.kr/catalog/products/{}", 100_000 + i),
                format!("Item {i}"),
                format!("{}%", i % 70),
                format!("{},{:03}원", price / 1000, price % 1000),
            )
        })
        .collect();
    Snapshot::new(items).to_state_map()
}

fn bench_normalize(c: &mut Criterion) {
    let samples = ["12,900원", "20%", "품절", "1,234,567원", "", "쿠폰가 9,900원~"];

    c.bench_function("normalize_mixed", |b| {
        b.iter(|| {
            let mut acc = 0u64;
            for s in samples {
                acc = acc.wrapping_add(normalize(black_box(s)).unwrap_or(0));
            }
            black_box(acc)
        })
    });
}

fn bench_diff(c: &mut Criterion) {
    let prev = listing(5_000, usize::MAX);
    let cur = listing(5_000, 7);

    c.bench_function("diff_5000_sparse_changes", |b| {
        b.iter(|| black_box(diff(black_box(&prev), black_box(&cur)).len()))
    });

    c.bench_function("diff_5000_identical", |b| {
        b.iter(|| black_box(diff(black_box(&prev), black_box(&prev)).len()))
    });
}

criterion_group!(benches, bench_normalize, bench_diff);
criterion_main!(benches);
