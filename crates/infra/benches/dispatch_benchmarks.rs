use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use std::num::NonZeroU32;
use std::sync::Arc;

use library_events_core::{validate_for_update, Book, LibraryEvent, LibraryEventId, LibraryEventType};
use library_events_events::{InMemoryEventLog, Partitioner};
use library_events_infra::EventDispatcher;

fn update_event(id: i64) -> LibraryEvent {
    LibraryEvent::new(
        Some(LibraryEventId::new(id)),
        LibraryEventType::Update,
        Book {
            book_id: Some(456),
            book_name: Some("Kafka Using Spring Boot".to_string()),
            book_author: Some("Dilip".to_string()),
        },
    )
}

fn bench_validation(c: &mut Criterion) {
    let event = update_event(123);
    c.bench_function("validate_for_update", |b| {
        b.iter(|| validate_for_update(black_box(&event)))
    });
}

fn bench_partitioning(c: &mut Criterion) {
    let partitioner = Partitioner::new(NonZeroU32::new(12).unwrap());
    let mut group = c.benchmark_group("partitioner");
    group.throughput(Throughput::Elements(1));
    group.bench_function("keyed", |b| {
        b.iter(|| partitioner.partition_for(black_box(Some("1234567890"))))
    });
    group.bench_function("round_robin", |b| b.iter(|| partitioner.partition_for(None)));
    group.finish();
}

fn bench_publish_in_memory(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().expect("tokio runtime");
    let mut group = c.benchmark_group("publish_in_memory");

    for batch_size in [1usize, 100] {
        group.throughput(Throughput::Elements(batch_size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(batch_size), &batch_size, |b, &n| {
            let log = Arc::new(InMemoryEventLog::new(NonZeroU32::new(3).unwrap()));
            let dispatcher = EventDispatcher::new(log, "library-events");
            let events: Vec<_> = (0..n as i64).map(update_event).collect();

            b.iter(|| {
                rt.block_on(async {
                    let handles: Vec<_> = events.iter().map(|e| dispatcher.publish(e)).collect();
                    for handle in handles {
                        black_box(handle.await.ok());
                    }
                })
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_validation, bench_partitioning, bench_publish_in_memory);
criterion_main!(benches);
