//! Log engine benchmarks.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use slabq_log::{ReadOutcome, Reader, Writer, DEFAULT_SLAB_SIZE};
use tempfile::TempDir;

fn bench_write(c: &mut Criterion) {
    let mut group = c.benchmark_group("log_write");

    for size in [100usize, 1_000, 10_000] {
        let dir = TempDir::new().unwrap();
        let writer = Writer::open(dir.path().join("bench"), DEFAULT_SLAB_SIZE).unwrap();
        let payload = vec![0x42u8; size];

        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(
            BenchmarkId::new("payload_bytes", size),
            &payload,
            |b, payload| {
                b.iter(|| black_box(writer.write(payload).unwrap()));
            },
        );
    }

    group.finish();
}

fn bench_write_sync(c: &mut Criterion) {
    let mut group = c.benchmark_group("log_write_sync");
    group.sample_size(10);

    let dir = TempDir::new().unwrap();
    let writer = Writer::open(dir.path().join("bench"), DEFAULT_SLAB_SIZE).unwrap();
    let payload = vec![0x42u8; 100];

    group.throughput(Throughput::Elements(1));
    group.bench_function("sync_per_record", |b| {
        b.iter(|| {
            writer.write(&payload).unwrap();
            writer.sync().unwrap();
        });
    });

    group.finish();
}

fn bench_read(c: &mut Criterion) {
    let mut group = c.benchmark_group("log_read");

    let dir = TempDir::new().unwrap();
    let topic = dir.path().join("bench");
    let writer = Writer::open(&topic, DEFAULT_SLAB_SIZE).unwrap();
    let payload = vec![0x42u8; 100];
    for _ in 0..1_000 {
        writer.write(&payload).unwrap();
    }
    writer.flush().unwrap();

    let (mut reader, _) = Reader::open(&topic, 0).unwrap();
    group.throughput(Throughput::Elements(1_000));
    group.bench_function("sequential_1000", |b| {
        b.iter(|| {
            reader.seek(0).unwrap();
            let mut records = 0u64;
            loop {
                match reader.read().unwrap() {
                    ReadOutcome::Record { payload, .. } => {
                        black_box(&payload);
                        records += 1;
                    }
                    ReadOutcome::EndOfLog => break,
                }
            }
            black_box(records)
        });
    });

    group.finish();
}

criterion_group!(benches, bench_write, bench_write_sync, bench_read);
criterion_main!(benches);
