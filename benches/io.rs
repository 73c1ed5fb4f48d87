use criterion::{
    BenchmarkId,
    criterion_group,
    criterion_main,
    Criterion,
    Throughput,
};
use rand::{
    SeedableRng,
    rngs::StdRng,
};

use splat_indirect::{
    ProceduralVolume,
    decode_binary_ply,
    io::{
        ply::RECORD_BYTES,
        writer::{
            write_binary_ply,
            write_text_ply,
        },
    },
    decode_text_ply,
    random_splats,
};


const SPLAT_COUNTS: [usize; 4] = [
    1000,
    10000,
    84_348,
    1_244_819,
];

fn splat_ply_decode_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode splat ply");
    for count in SPLAT_COUNTS.iter() {
        group.throughput(Throughput::Bytes(*count as u64 * RECORD_BYTES));
        group.bench_with_input(
            BenchmarkId::new("binary", count),
            &count,
            |b, &count| {
                let mut rng = StdRng::seed_from_u64(0);
                let splats = random_splats(&mut rng, *count, 10.0, ProceduralVolume::Sphere);
                let mut bytes = Vec::new();
                write_binary_ply(&mut bytes, &splats).unwrap();

                b.iter(|| decode_binary_ply(bytes.as_slice()));
            },
        );
    }
}

fn splat_ply_text_decode_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode splat ply text");
    for count in SPLAT_COUNTS[..2].iter() {
        group.bench_with_input(
            BenchmarkId::new("ascii", count),
            &count,
            |b, &count| {
                let mut rng = StdRng::seed_from_u64(0);
                let splats = random_splats(&mut rng, *count, 10.0, ProceduralVolume::Cube);
                let mut bytes = Vec::new();
                write_text_ply(&mut bytes, &splats).unwrap();

                b.iter(|| decode_text_ply(bytes.as_slice()));
            },
        );
    }
}

criterion_group!{
    name = io_benches;
    config = Criterion::default().sample_size(10);
    targets = splat_ply_decode_benchmark, splat_ply_text_decode_benchmark
}
criterion_main!(io_benches);
