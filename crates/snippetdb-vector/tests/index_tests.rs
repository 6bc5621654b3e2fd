use std::sync::atomic::{AtomicUsize, Ordering};

use snippetdb_core::error::Error;
use snippetdb_core::traits::Embedder;
use snippetdb_core::types::Chunk;
use snippetdb_embed::HashEmbedder;
use snippetdb_vector::{cmp_score_desc, normalize, top_k_indices, CorpusIndex};

fn chunk(source: &str, index: usize, text: &str) -> Chunk {
    Chunk { source: source.to_string(), index, text: text.to_string() }
}

fn corpus() -> Vec<Chunk> {
    vec![
        chunk("sleep.md", 0, "Title: Sleep hygiene. Keep a regular bedtime"),
        chunk("sleep.md", 1, "dark cool bedroom and no screens before bed"),
        chunk("diet.md", 0, "Title: MIND diet. Leafy greens berries and nuts"),
        chunk("move.md", 0, "Brisk walking thirty minutes most days"),
        chunk("stress.md", 0, "Box breathing and short walks reduce stress"),
    ]
}

/// Returns fixed vectors and counts how often it is called.
struct StubEmbedder {
    dim: usize,
    vector: Vec<f32>,
    calls: AtomicUsize,
}

impl StubEmbedder {
    fn new(vector: Vec<f32>) -> Self {
        Self { dim: vector.len(), vector, calls: AtomicUsize::new(0) }
    }
}

impl Embedder for StubEmbedder {
    fn dim(&self) -> usize { self.dim }
    fn embed_batch(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(texts.iter().map(|_| self.vector.clone()).collect())
    }
}

struct FailingEmbedder;

impl Embedder for FailingEmbedder {
    fn dim(&self) -> usize { 8 }
    fn embed_batch(&self, _texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>> {
        anyhow::bail!("model offline")
    }
}

#[test]
fn build_normalizes_every_row() {
    let embedder = HashEmbedder::new(64);
    let index = CorpusIndex::build(corpus(), &embedder).expect("build");
    assert_eq!(index.len(), 5);
    assert_eq!(index.dim(), 64);
    for row in 0..index.len() {
        let e = index.embedding(row).unwrap();
        let norm = e.iter().map(|&x| f64::from(x) * f64::from(x)).sum::<f64>().sqrt();
        assert!((norm - 1.0).abs() < 1e-6, "row {row} norm {norm}");
    }
}

#[test]
fn zero_vectors_stay_finite() {
    let embedder = StubEmbedder::new(vec![0.0; 4]);
    let index = CorpusIndex::build(vec![chunk("a.md", 0, "")], &embedder).unwrap();
    assert!(index.embedding(0).unwrap().iter().all(|x| *x == 0.0));
    assert_eq!(normalize(&[3.0, 4.0]), vec![0.6, 0.8]);
}

#[test]
fn empty_corpus_is_a_valid_state() {
    let embedder = StubEmbedder::new(vec![1.0, 0.0, 0.0]);
    let index = CorpusIndex::build(Vec::new(), &embedder).expect("empty build").with_generation(3);
    assert!(index.is_empty());
    assert_eq!(index.dim(), 3);
    assert_eq!(index.generation(), 3);
    assert!(index.search(&embedder, "anything", 4).unwrap().is_empty());
    assert_eq!(embedder.calls.load(Ordering::SeqCst), 0, "provider not called for empty corpus");
}

#[test]
fn search_returns_min_k_n_sorted_cosines() {
    let embedder = HashEmbedder::new(64);
    let index = CorpusIndex::build(corpus(), &embedder).unwrap();
    for k in [0, 1, 3, 5, 10] {
        let results = index.search(&embedder, "regular bedtime and dark bedroom", k).unwrap();
        assert_eq!(results.len(), k.min(index.len()));
        for r in &results {
            assert!((-1.0 - 1e-6..=1.0 + 1e-6).contains(&r.score), "score {}", r.score);
        }
        for w in results.windows(2) {
            assert!(w[0].score >= w[1].score);
        }
    }
    let top = &index.search(&embedder, "Keep a regular bedtime", 1).unwrap()[0];
    assert_eq!(top.source, "sleep.md");
    assert_eq!(top.chunk_index, 0);
}

#[test]
fn ties_keep_corpus_order() {
    let embedder = StubEmbedder::new(vec![0.5, 0.5]);
    let index = CorpusIndex::build(corpus(), &embedder).unwrap();
    let results = index.search(&embedder, "q", 5).unwrap();
    let sources: Vec<&str> = results.iter().map(|r| r.source.as_str()).collect();
    assert_eq!(sources, vec!["sleep.md", "sleep.md", "diet.md", "move.md", "stress.md"]);
    assert_eq!(top_k_indices(&[0.1, 0.3, 0.3, f32::NAN, 0.2], 5), vec![1, 2, 4, 0, 3]);
}

#[test]
fn nan_scores_propagate_and_sort_last() {
    let index = CorpusIndex::build(corpus(), &StubEmbedder::new(vec![1.0, 0.0])).unwrap();
    let results = index.search(&StubEmbedder::new(vec![f32::NAN, 0.0]), "q", 2).unwrap();
    assert_eq!(results.len(), 2);
    assert!(results.iter().all(|r| r.score.is_nan()));
    assert_eq!(cmp_score_desc(f32::NAN, 0.5), std::cmp::Ordering::Greater);
}

#[test]
fn signed_zero_scores_tie_in_corpus_order() {
    assert_eq!(cmp_score_desc(-0.0, 0.0), std::cmp::Ordering::Equal);
    assert_eq!(top_k_indices(&[-0.0, 0.0], 2), vec![0, 1]);
    assert_eq!(top_k_indices(&[0.0, -0.0, 0.5], 3), vec![2, 0, 1]);
}

#[test]
fn provider_failures_are_reported() {
    let err = CorpusIndex::build(corpus(), &FailingEmbedder).expect_err("failing provider");
    assert!(matches!(err, Error::Provider(_)));

    let err = CorpusIndex::from_vectors(corpus(), vec![vec![1.0, 0.0]], 2).expect_err("short batch");
    assert!(matches!(err, Error::Provider(_)));

    let err = CorpusIndex::from_vectors(vec![chunk("a.md", 0, "x")], vec![vec![1.0]], 2).expect_err("bad dim");
    assert!(matches!(err, Error::Provider(_)));

    let index = CorpusIndex::build(corpus(), &HashEmbedder::new(8)).unwrap();
    assert!(matches!(index.search(&FailingEmbedder, "q", 2), Err(Error::Provider(_))));
    assert!(matches!(index.search_vec(&[1.0, 0.0], 2), Err(Error::Provider(_))));
}

#[test]
fn stats_describe_the_generation() {
    let embedder = HashEmbedder::new(16);
    let a = CorpusIndex::build(corpus(), &embedder).unwrap().with_generation(7);
    let b = CorpusIndex::build(corpus(), &embedder).unwrap().with_generation(8);
    let stats = a.stats();
    assert_eq!(stats.generation, 7);
    assert_eq!(stats.chunks, 5);
    assert_eq!(stats.documents, 4);
    assert_eq!(stats.dim, 16);
    assert_eq!(stats.fingerprint, b.stats().fingerprint);
    let c = CorpusIndex::build(corpus()[..2].to_vec(), &embedder).unwrap();
    assert_ne!(stats.fingerprint, c.stats().fingerprint);
    assert_eq!(a.rows_for_source("sleep.md").collect::<Vec<_>>(), vec![0, 1]);
    assert!(!a.has_source("missing.md"));
}
