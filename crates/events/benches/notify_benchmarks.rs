//! Benchmarks for the publish path.
//!
//! Run with: cargo bench -p cyberbus-events

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};

use cyberbus_events::{Bus, BusConfig, Holder, Payload};

fn holder(events: usize, counter: &Arc<AtomicU64>) -> Holder<Bus> {
    let holder = Holder::new();
    holder
        .configure(BusConfig::default().with_queue_capacity(16_384))
        .unwrap_or_else(|e| panic!("configure: {e}"));
    let bus = holder.instance();
    for n in 0..events {
        let counter = Arc::clone(counter);
        bus.subscribe(format!("event-{n}"), move |_p: Payload| {
            counter.fetch_add(1, Ordering::Relaxed);
        })
        .unwrap_or_else(|e| panic!("subscribe: {e}"));
    }
    holder
}

fn bench_notify(c: &mut Criterion) {
    let mut group = c.benchmark_group("notify");

    for events in [1usize, 10, 100] {
        let counter = Arc::new(AtomicU64::new(0));
        let holder = holder(events, &counter);
        let bus = holder.instance();
        let last = format!("event-{}", events - 1);

        group.bench_with_input(BenchmarkId::new("matched", events), &last, |b, event| {
            b.iter(|| bus.notify(black_box(event), black_box(42u64)))
        });
        group.bench_with_input(BenchmarkId::new("unmatched", events), &events, |b, _| {
            b.iter(|| bus.notify(black_box("nobody"), black_box(42u64)))
        });
    }

    group.finish();
}

fn bench_subscribe_cycle(c: &mut Criterion) {
    let counter = Arc::new(AtomicU64::new(0));
    let holder = holder(100, &counter);
    let bus = holder.instance();

    c.bench_function("subscribe_unsubscribe", |b| {
        b.iter(|| {
            let _ = bus.subscribe(black_box("transient"), |_p| {});
            let _ = bus.unsubscribe(black_box("transient"));
        })
    });
}

criterion_group!(benches, bench_notify, bench_subscribe_cycle);
criterion_main!(benches);
