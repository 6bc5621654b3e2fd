use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::{debug, info};

use snippetdb_core::error::{Error, Result};
use snippetdb_core::traits::Embedder;
use snippetdb_core::types::Chunk;

use crate::search::normalize;

/// One immutable generation of the corpus: chunks plus a row-major matrix of
/// their unit-normalized embeddings.
#[derive(Debug, Clone)]
pub struct CorpusIndex {
    chunks: Vec<Chunk>,
    embeddings: Vec<f32>,
    dim: usize,
    generation: u64,
    fingerprint: String,
    built_at: DateTime<Utc>,
}

/// Summary of a published index, as reported to operators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexStats {
    pub generation: u64,
    pub chunks: usize,
    pub documents: usize,
    pub dim: usize,
    pub fingerprint: String,
    pub built_at: DateTime<Utc>,
}

impl CorpusIndex {
    /// Zero rows with a fixed dimensionality. Searches on it return nothing.
    pub fn empty(dim: usize) -> Self {
        Self {
            chunks: Vec::new(),
            embeddings: Vec::new(),
            dim,
            generation: 0,
            fingerprint: fingerprint(&[]),
            built_at: Utc::now(),
        }
    }

    /// Embed all chunk texts in one provider call and normalize the rows.
    pub fn build(chunks: Vec<Chunk>, embedder: &dyn Embedder) -> Result<Self> {
        if chunks.is_empty() {
            info!("no chunks to index; corpus is empty");
            return Ok(Self::empty(embedder.dim()));
        }
        let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
        debug!(chunks = texts.len(), "embedding corpus");
        let vectors = embedder.embed_batch(&texts).map_err(Error::Provider)?;
        let index = Self::from_vectors(chunks, vectors, embedder.dim())?;
        info!(chunks = index.len(), documents = index.document_count(), dim = index.dim, "corpus index built");
        Ok(index)
    }

    /// Assemble an index from precomputed vectors, validating their shape.
    pub fn from_vectors(chunks: Vec<Chunk>, vectors: Vec<Vec<f32>>, dim: usize) -> Result<Self> {
        if vectors.len() != chunks.len() {
            return Err(Error::provider(format!(
                "provider returned {} vectors for {} texts",
                vectors.len(),
                chunks.len()
            )));
        }
        let mut embeddings = Vec::with_capacity(chunks.len() * dim);
        for (row, v) in vectors.iter().enumerate() {
            if v.len() != dim {
                return Err(Error::provider(format!("vector {row} has {} dims, expected {dim}", v.len())));
            }
            embeddings.extend(normalize(v));
        }
        let fingerprint = fingerprint(&chunks);
        Ok(Self { chunks, embeddings, dim, generation: 0, fingerprint, built_at: Utc::now() })
    }

    /// Stamp the generation this index is published as.
    pub fn with_generation(mut self, generation: u64) -> Self {
        self.generation = generation;
        self
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    pub fn chunk(&self, row: usize) -> Option<&Chunk> {
        self.chunks.get(row)
    }

    /// Unit-normalized embedding of the chunk at `row`.
    pub fn embedding(&self, row: usize) -> Option<&[f32]> {
        let start = row.checked_mul(self.dim)?;
        self.embeddings.get(start..start + self.dim)
    }

    /// Row numbers of all chunks from `source`, in corpus order.
    pub fn rows_for_source<'a>(&'a self, source: &'a str) -> impl Iterator<Item = usize> + 'a {
        self.chunks.iter().enumerate().filter(move |(_, c)| c.source == source).map(|(i, _)| i)
    }

    pub fn has_source(&self, source: &str) -> bool {
        self.chunks.iter().any(|c| c.source == source)
    }

    pub fn document_count(&self) -> usize {
        self.chunks.iter().map(|c| c.source.as_str()).collect::<BTreeSet<_>>().len()
    }

    pub fn stats(&self) -> IndexStats {
        IndexStats {
            generation: self.generation,
            chunks: self.len(),
            documents: self.document_count(),
            dim: self.dim,
            fingerprint: self.fingerprint.clone(),
            built_at: self.built_at,
        }
    }
}

fn fingerprint(chunks: &[Chunk]) -> String {
    let mut hasher = blake3::Hasher::new();
    for c in chunks {
        hasher.update(c.source.as_bytes());
        hasher.update(&[0]);
        hasher.update(&(c.index as u64).to_le_bytes());
        hasher.update(c.text.as_bytes());
        hasher.update(&[0]);
    }
    hasher.finalize().to_hex().to_string()
}
