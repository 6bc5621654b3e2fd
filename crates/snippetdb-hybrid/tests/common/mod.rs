#![allow(dead_code)]

use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use snippetdb_core::config::Settings;
use snippetdb_core::traits::Embedder;
use snippetdb_hybrid::Retriever;

/// One axis per vocabulary word; the value is how often the word occurs.
pub struct VocabEmbedder {
    vocab: Vec<&'static str>,
}

impl VocabEmbedder {
    pub fn new(vocab: &[&'static str]) -> Self {
        Self { vocab: vocab.to_vec() }
    }
}

impl Embedder for VocabEmbedder {
    fn dim(&self) -> usize { self.vocab.len() }
    fn embed_batch(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>> {
        Ok(texts
            .iter()
            .map(|t| {
                let lower = t.to_lowercase();
                let tokens: Vec<&str> = lower.split_whitespace().map(|w| w.trim_matches(|c: char| !c.is_alphanumeric())).collect();
                self.vocab.iter().map(|v| tokens.iter().filter(|t| *t == v).count() as f32).collect()
            })
            .collect())
    }
}

/// Delegates to an inner embedder until `fail` is set.
pub struct ToggleEmbedder {
    pub inner: VocabEmbedder,
    pub fail: AtomicBool,
}

impl ToggleEmbedder {
    pub fn new(inner: VocabEmbedder) -> Self {
        Self { inner, fail: AtomicBool::new(false) }
    }

    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }
}

impl Embedder for ToggleEmbedder {
    fn dim(&self) -> usize { self.inner.dim() }
    fn embed_batch(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>> {
        if self.fail.load(Ordering::SeqCst) {
            anyhow::bail!("embedding backend unavailable");
        }
        self.inner.embed_batch(texts)
    }
}

pub const VOCAB: [&str; 12] = [
    "sleep", "advice", "bedtime", "routine", "hours", "diet", "greens", "walk", "stress", "breathe", "alpha", "bravo",
];

pub fn vocab_embedder() -> Arc<dyn Embedder> {
    Arc::new(VocabEmbedder::new(&VOCAB))
}

pub fn write_docs(dir: &Path, docs: &[(&str, &str)]) {
    for (name, text) in docs {
        fs::write(dir.join(name), text).expect("write doc");
    }
}

pub fn retriever_with(embedder: Arc<dyn Embedder>) -> Retriever {
    Retriever::new(embedder, &Settings::default()).expect("retriever")
}

pub fn kw(words: &[&str]) -> Vec<String> {
    words.iter().map(|w| w.to_string()).collect()
}
