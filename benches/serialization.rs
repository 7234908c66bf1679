use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use serde::{Deserialize, Serialize};
use serde_bencode::{decode_slice, from_slice, to_bytes, Tokenizer, Value};

#[derive(Serialize, Deserialize, Clone)]
struct Peer {
    #[serde(rename = "peer id")]
    peer_id: String,
    ip: String,
    port: u16,
}

#[derive(Serialize, Deserialize, Clone)]
struct File {
    length: u64,
    path: Vec<String>,
}

#[derive(Serialize, Deserialize, Clone)]
struct Info {
    name: String,
    #[serde(rename = "piece length")]
    piece_length: u32,
    #[serde(with = "serde_bytes")]
    pieces: Vec<u8>,
    files: Vec<File>,
}

fn peer() -> Peer {
    Peer {
        peer_id: "-RS0100-abcdefghijkl".to_string(),
        ip: "192.168.1.10".to_string(),
        port: 6881,
    }
}

fn info(files: u64) -> Info {
    Info {
        name: "dataset".to_string(),
        piece_length: 262_144,
        pieces: (0..20 * files).map(|i| (i % 251) as u8).collect(),
        files: (0..files)
            .map(|i| File {
                length: i * 1024,
                path: vec!["data".to_string(), format!("part-{:05}.bin", i)],
            })
            .collect(),
    }
}

fn benchmark_serialize_simple(c: &mut Criterion) {
    let peer = peer();

    c.bench_function("serialize_simple_struct", |b| {
        b.iter(|| to_bytes(black_box(&peer)))
    });
}

fn benchmark_deserialize_simple(c: &mut Criterion) {
    let bytes = to_bytes(&peer()).unwrap();

    c.bench_function("deserialize_simple_struct", |b| {
        b.iter(|| from_slice::<Peer>(black_box(&bytes)))
    });
}

fn benchmark_serialize_metainfo(c: &mut Criterion) {
    let mut group = c.benchmark_group("serialize_metainfo");

    for files in [10u64, 100, 1000].iter() {
        let info = info(*files);
        group.bench_with_input(BenchmarkId::from_parameter(files), &info, |b, info| {
            b.iter(|| to_bytes(black_box(info)))
        });
    }
    group.finish();
}

fn benchmark_deserialize_metainfo(c: &mut Criterion) {
    let mut group = c.benchmark_group("deserialize_metainfo");

    for files in [10u64, 100, 1000].iter() {
        let bytes = to_bytes(&info(*files)).unwrap();
        group.bench_with_input(BenchmarkId::new("typed", files), &bytes, |b, bytes| {
            b.iter(|| from_slice::<Info>(black_box(bytes)))
        });
        group.bench_with_input(BenchmarkId::new("generic", files), &bytes, |b, bytes| {
            b.iter(|| decode_slice(black_box(bytes)))
        });
    }
    group.finish();
}

fn benchmark_tokenize(c: &mut Criterion) {
    let bytes = to_bytes(&info(1000)).unwrap();

    c.bench_function("tokenize_metainfo", |b| {
        b.iter(|| {
            let mut tokenizer = Tokenizer::new(black_box(bytes.as_slice()));
            let mut count = 0usize;
            while let Ok(Some(_)) = tokenizer.next_token() {
                count += 1;
            }
            count
        })
    });
}

fn benchmark_canonical_sort(c: &mut Criterion) {
    // keys inserted in reverse so every dictionary needs sorting
    let value: Value = Value::Dict(
        (0..500)
            .rev()
            .map(|i| (format!("key{:04}", i), Value::Int(i)))
            .collect(),
    );

    c.bench_function("serialize_unsorted_dict", |b| {
        b.iter(|| to_bytes(black_box(&value)))
    });
}

fn benchmark_roundtrip(c: &mut Criterion) {
    let peers: Vec<Peer> = (0..50).map(|_| peer()).collect();

    c.bench_function("roundtrip_peer_list", |b| {
        b.iter(|| {
            let serialized = to_bytes(black_box(&peers)).unwrap();
            let _deserialized: Vec<Peer> = from_slice(black_box(&serialized)).unwrap();
        })
    });
}

criterion_group!(
    benches,
    benchmark_serialize_simple,
    benchmark_deserialize_simple,
    benchmark_serialize_metainfo,
    benchmark_deserialize_metainfo,
    benchmark_tokenize,
    benchmark_canonical_sort,
    benchmark_roundtrip
);
criterion_main!(benches);
