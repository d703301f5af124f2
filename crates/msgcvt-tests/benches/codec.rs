use avrox_basic::{BasicValue, decode_basic, encode_basic};
use avrox_wire::Compression;
use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use msgcvt_driver::{TranslateConfig, sniff};
use msgcvt_tests::{compressible_text, sample_values};

const CODECS: [Compression; 4] = [
    Compression::None,
    Compression::Snappy,
    Compression::Flate,
    Compression::Gzip,
];

fn bench_encode(c: &mut Criterion) {
    let value = BasicValue::String(compressible_text(200));
    let mut group = c.benchmark_group("encode_string");
    group.throughput(Throughput::Bytes(200 * 44));
    for codec in CODECS {
        group.bench_with_input(BenchmarkId::from_parameter(codec.name()), &codec, |b, &codec| {
            b.iter(|| encode_basic(&value, codec).unwrap());
        });
    }
    group.finish();
}

fn bench_decode(c: &mut Criterion) {
    let value = BasicValue::String(compressible_text(200));
    let mut group = c.benchmark_group("decode_string");
    for codec in CODECS {
        let container = encode_basic(&value, codec).unwrap();
        group.throughput(Throughput::Bytes(container.len() as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(codec.name()),
            &container,
            |b, container| {
                b.iter(|| decode_basic(container).unwrap());
            },
        );
    }
    group.finish();
}

fn bench_decode_kinds(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode_kind");
    for (value, _) in sample_values() {
        let Some(kind) = value.kind() else { continue };
        let container = encode_basic(&value, Compression::None).unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(kind), &container, |b, container| {
            b.iter(|| decode_basic(container).unwrap());
        });
    }
    group.finish();
}

fn bench_sniff(c: &mut Criterion) {
    let container = encode_basic(&BasicValue::Int(42), Compression::None).unwrap();
    let opaque = compressible_text(1);
    c.bench_function("sniff_container", |b| {
        b.iter(|| sniff(&container[..]).unwrap());
    });
    c.bench_function("sniff_opaque", |b| {
        b.iter(|| sniff(opaque.as_bytes()).unwrap());
    });
}

fn bench_translate(c: &mut Criterion) {
    let container = encode_basic(&BasicValue::String(compressible_text(200)), Compression::Gzip)
        .unwrap();
    let config = TranslateConfig::default();
    c.bench_function("translate_gzip_basic", |b| {
        b.iter(|| {
            let mut out = Vec::with_capacity(10_000);
            msgcvt_driver::translate(&container[..], &config, &mut out, &mut std::io::sink())
                .unwrap()
        });
    });
}

criterion_group!(
    benches,
    bench_encode,
    bench_decode,
    bench_decode_kinds,
    bench_sniff,
    bench_translate
);
criterion_main!(benches);
