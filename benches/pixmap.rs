use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use libraw_bridge::libraw::{BlockFormat, BlockHeader, RawImageBuffer};

fn generate_block(width: u32, height: u32, bits: u16) -> (BlockHeader, Vec<u8>) {
    let header = BlockHeader {
        format: BlockFormat::Bitmap,
        width,
        height,
        colors: 3,
        bits,
        data_size: width as u64 * height as u64 * 3 * (bits as u64 / 8),
    };
    let data = (0..header.data_size).map(|i| (i % 256) as u8).collect();
    (header, data)
}

fn benchmark_import_sizes(c: &mut Criterion) {
    let mut group = c.benchmark_group("pixmap_by_size");

    let sizes = vec![
        (100, 100, "100x100"),
        (500, 500, "500x500"),
        (1000, 1000, "1000x1000"),
    ];

    for (width, height, label) in sizes {
        let block = generate_block(width, height, 8);

        group.bench_with_input(BenchmarkId::from_parameter(label), &block, |b, (header, data)| {
            b.iter(|| {
                let buffer = RawImageBuffer::from_block(*header, black_box(data)).unwrap();
                buffer.decode().unwrap()
            });
        });
    }

    group.finish();
}

fn benchmark_bit_depths(c: &mut Criterion) {
    let mut group = c.benchmark_group("pixmap_bit_depth");

    for bits in [8u16, 16] {
        let (header, data) = generate_block(500, 500, bits);
        let buffer = RawImageBuffer::from_block(header, &data).unwrap();

        group.bench_function(format!("{bits}bit"), |b| {
            b.iter(|| black_box(&buffer).decode().unwrap());
        });
    }

    group.finish();
}

criterion_group!(benches, benchmark_import_sizes, benchmark_bit_depths);
criterion_main!(benches);
