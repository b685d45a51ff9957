use std::time::Instant;

use clap::Parser;
use gramdb::engine::{Engine, EngineOptions};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tempfile::tempdir;

/// Benchmark parameters
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Number of documents to register
    #[arg(short = 'n', long = "docs", default_value_t = 500)]
    docs: u32,

    /// Document length in syllables
    #[arg(short = 'l', long = "doc-len", default_value_t = 40)]
    doc_len: usize,

    /// Number of substring queries to run
    #[arg(short = 'q', long = "queries", default_value_t = 200)]
    queries: u32,

    /// RNG seed, for reproducible corpora
    #[arg(long = "seed", default_value_t = 7)]
    seed: u64,
}

const SYLLABLES: &[&str] = &[
    "ka", "ki", "ku", "ke", "ko", "sa", "shi", "su", "se", "so", "ta", "chi", "tsu", "te", "to",
    "na", "ni", "nu", "ne", "no", "ha", "hi", "fu", "he", "ho", "ma", "mi", "mu", "me", "mo",
];

/// Generate a pseudo-random ASCII document of `syllables` syllables.
fn make_doc(rng: &mut StdRng, syllables: usize) -> String {
    let mut doc = String::with_capacity(syllables * 2);
    for _ in 0..syllables {
        doc.push_str(SYLLABLES[rng.gen_range(0..SYLLABLES.len())]);
    }
    doc
}

/// Print per-operation latency
fn report(name: &str, n: u32, elapsed_ms: f64) {
    let per_op = elapsed_ms / n as f64;
    let ops_per_sec = n as f64 * 1000.0 / elapsed_ms;
    println!(
        "{:<12} {:>10.6} ms/op, {:>10.2} ops/s ({} op total, {:>10.2} ms total)",
        name, per_op, ops_per_sec, n, elapsed_ms
    );
}

fn bench_register(engine: &mut Engine, corpus: &[String]) {
    let start = Instant::now();
    for (i, doc) in corpus.iter().enumerate() {
        engine.register_doc(i as u32 + 1, doc).unwrap();
    }
    report("register", corpus.len() as u32, start.elapsed().as_millis() as f64);
}

/// Query random substrings of registered documents and verify the source
/// document turns up at the right position.
fn bench_search(engine: &Engine, corpus: &[String], queries: u32, rng: &mut StdRng) {
    let start = Instant::now();
    for _ in 0..queries {
        let doc_index = rng.gen_range(0..corpus.len());
        let doc = &corpus[doc_index];
        let query_len = rng.gen_range(3..=6);
        let query_start = rng.gen_range(0..doc.len() - query_len);
        let query = &doc[query_start..query_start + query_len];

        let hits = engine.search(query).unwrap();
        let expected_id = doc_index as u32 + 1;
        assert!(
            hits.iter()
                .any(|h| h.doc_id == expected_id && h.position == query_start as u32),
            "query {:?} missed doc {} at {}",
            query,
            expected_id,
            query_start
        );
    }
    report("search", queries, start.elapsed().as_millis() as f64);
}

fn main() {
    let args = Args::parse();
    println!(
        "Using docs={} doc_len={} queries={} seed={}",
        args.docs, args.doc_len, args.queries, args.seed
    );

    let dir = tempdir().unwrap();
    println!("Benchmarking in {}", dir.path().display());

    let mut rng = StdRng::seed_from_u64(args.seed);
    let corpus: Vec<String> = (0..args.docs)
        .map(|_| make_doc(&mut rng, args.doc_len))
        .collect();

    let mut engine = Engine::create(dir.path(), EngineOptions::default()).unwrap();

    bench_register(&mut engine, &corpus);
    bench_search(&engine, &corpus, args.queries, &mut rng);

    let sample = engine.search(&corpus[0][0..4]).unwrap();
    println!(
        "sample query {:?} -> {}",
        &corpus[0][0..4],
        serde_json::to_string(&sample).unwrap()
    );

    engine.close().unwrap();
}
