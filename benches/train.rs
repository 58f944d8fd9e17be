//! Training throughput of the linked and array symbol streams.

use bytemerge::{ArrayStream, BpeTokenizer, ChunkSplitter, LinkedStream, Trainer};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

const WORDS: &[&str] = &[
    "the", "quick", "brown", "fox", "jumps", "over", "lazy", "dog", "merge", "pair", "symbol",
    "stream", "token", "byte", "encoding", "training", "frequency", "vocabulary",
];

/// Deterministic word soup of roughly `len` bytes.
fn corpus(len: usize) -> String {
    let mut out = String::with_capacity(len + 16);
    let mut state: u64 = 42;
    while out.len() < len {
        state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        out.push_str(WORDS[(state >> 33) as usize % WORDS.len()]);
        out.push(' ');
    }
    out
}

fn chunks(text: &str) -> Vec<Vec<u8>> {
    ChunkSplitter::default()
        .split(text)
        .unwrap()
        .into_iter()
        .map(|c| c.as_bytes().to_vec())
        .collect()
}

fn bench_train(c: &mut Criterion) {
    let mut group = c.benchmark_group("train");
    group.sample_size(20);

    for &len in &[4_096usize, 32_768] {
        let chunks = chunks(&corpus(len));
        group.throughput(Throughput::Bytes(len as u64));

        group.bench_with_input(BenchmarkId::new("linked", len), &chunks, |b, chunks| {
            b.iter(|| {
                Trainer::<LinkedStream>::from_chunks(black_box(chunks), 512)
                    .unwrap()
                    .run()
            });
        });

        group.bench_with_input(BenchmarkId::new("array", len), &chunks, |b, chunks| {
            b.iter(|| {
                Trainer::<ArrayStream>::from_chunks(black_box(chunks), 512)
                    .unwrap()
                    .run()
            });
        });
    }

    group.finish();
}

fn bench_encode(c: &mut Criterion) {
    let text = corpus(32_768);
    let mut tokenizer = BpeTokenizer::new(&text, bytemerge::DEFAULT_PATTERN).unwrap();
    tokenizer.train(512).unwrap();

    c.bench_function("encode_greedy_sweep", |b| {
        b.iter(|| tokenizer.encode(black_box(&text)));
    });
}

criterion_group!(benches, bench_train, bench_encode);
criterion_main!(benches);
