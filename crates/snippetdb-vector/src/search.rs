use std::cmp::Ordering;

use snippetdb_core::error::{Error, Result};
use snippetdb_core::traits::Embedder;
use snippetdb_core::types::ScoredResult;

use crate::index_build::CorpusIndex;

/// Added to the norm before dividing so all-zero vectors stay finite.
pub const NORM_EPSILON: f64 = 1e-12;

/// L2-normalize `v`. Accumulates in f64 so long vectors land within 1e-6 of unit norm.
pub fn normalize(v: &[f32]) -> Vec<f32> {
    let norm = v.iter().map(|&x| f64::from(x) * f64::from(x)).sum::<f64>().sqrt() + NORM_EPSILON;
    v.iter().map(|&x| (f64::from(x) / norm) as f32).collect()
}

pub fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

/// Descending by score; NaN sorts after every number so the order stays total.
/// `0.0` and `-0.0` compare equal.
pub fn cmp_score_desc(a: f32, b: f32) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => b.partial_cmp(&a).unwrap_or(Ordering::Equal),
    }
}

/// Indices of the `k` highest scores; ties keep their original order.
pub fn top_k_indices(scores: &[f32], k: usize) -> Vec<usize> {
    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| cmp_score_desc(scores[a], scores[b]));
    order.truncate(k);
    order
}

/// Embed one query with the provider and return it unit-normalized.
pub fn embed_query(embedder: &dyn Embedder, query: &str, dim: usize) -> Result<Vec<f32>> {
    let mut vectors = embedder.embed_batch(&[query.to_string()]).map_err(Error::Provider)?;
    let vector = match (vectors.pop(), vectors.is_empty()) {
        (Some(v), true) => v,
        _ => return Err(Error::provider("expected exactly one query vector")),
    };
    if vector.len() != dim {
        return Err(Error::provider(format!("query vector has {} dims, index has {dim}", vector.len())));
    }
    Ok(normalize(&vector))
}

impl CorpusIndex {
    /// Cosine similarity of a unit query vector against every row, in corpus order.
    pub fn similarities(&self, query_unit: &[f32]) -> Vec<f32> {
        (0..self.len())
            .map(|row| self.embedding(row).map_or(f32::NAN, |e| dot(e, query_unit)))
            .collect()
    }

    /// Rank rows by `scores` (one per chunk) and return the top `k`.
    pub fn rank(&self, scores: &[f32], k: usize) -> Vec<ScoredResult> {
        top_k_indices(scores, k)
            .into_iter()
            .filter_map(|row| self.chunk(row).map(|c| ScoredResult::from_chunk(c, scores[row])))
            .collect()
    }

    /// Exhaustive cosine search with an already-embedded query.
    pub fn search_vec(&self, query_vec: &[f32], k: usize) -> Result<Vec<ScoredResult>> {
        if self.is_empty() || k == 0 {
            return Ok(Vec::new());
        }
        if query_vec.len() != self.dim() {
            return Err(Error::provider(format!("query vector has {} dims, index has {}", query_vec.len(), self.dim())));
        }
        let sims = self.similarities(&normalize(query_vec));
        Ok(self.rank(&sims, k))
    }

    /// Embed `query` and run [`CorpusIndex::search_vec`]. The provider is not
    /// called when the index is empty.
    pub fn search(&self, embedder: &dyn Embedder, query: &str, k: usize) -> Result<Vec<ScoredResult>> {
        if self.is_empty() || k == 0 {
            return Ok(Vec::new());
        }
        let q = embed_query(embedder, query, self.dim())?;
        Ok(self.rank(&self.similarities(&q), k))
    }
}
