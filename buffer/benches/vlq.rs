use buffer::{read_vlq, write_vlq, zigzag_encode, ByteBuffer};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn sample_values() -> Vec<u64> {
    (0..1024u64)
        .map(|i| match i % 4 {
            0 => i,
            1 => i << 20,
            2 => zigzag_encode(-(i as i64)),
            _ => u64::MAX - i,
        })
        .collect()
}

fn bench_vlq(c: &mut Criterion) {
    let values = sample_values();

    c.bench_function("vlq_write_1024", |b| {
        let mut buf = ByteBuffer::with_capacity(values.len() * 10);
        b.iter(|| {
            buf.clear();
            for value in &values {
                write_vlq(&mut buf, black_box(*value));
            }
            black_box(buf.len())
        });
    });

    let mut encoded = ByteBuffer::new();
    for value in &values {
        write_vlq(&mut encoded, *value);
    }

    c.bench_function("vlq_read_1024", |b| {
        b.iter(|| {
            let mut cursor = encoded.read_cursor();
            let mut sum = 0u64;
            while !cursor.is_exhausted() {
                sum = sum.wrapping_add(read_vlq(&mut cursor).unwrap_or(0));
            }
            black_box(sum)
        });
    });
}

criterion_group!(benches, bench_vlq);
criterion_main!(benches);
