use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{debug, info, warn};

use snippetdb_core::config::Settings;
use snippetdb_core::data_processor::{Chunker, DirectorySource};
use snippetdb_core::error::Result;
use snippetdb_core::traits::{DocumentSource, Embedder};
use snippetdb_core::types::{ScoredResult, SourceName};
use snippetdb_vector::{embed_query, CorpusIndex, IndexStats};

use crate::intent::IntentRouter;
use crate::keywords::extract_keywords;
use crate::scorer::HybridScorer;

/// Output of the full pipeline: keywords, ranked passages and the intent
/// override that was applied, if any.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Retrieval {
    pub keywords: Vec<String>,
    pub results: Vec<ScoredResult>,
    pub forced_source: Option<SourceName>,
    pub generation: u64,
}

/// Owns the live corpus index and answers queries against it.
///
/// Every query clones the current `Arc<CorpusIndex>` once and works on that
/// snapshot only. `rebuild` builds a new index without holding the lock and
/// publishes it with a single pointer swap.
pub struct Retriever {
    embedder: Arc<dyn Embedder>,
    chunker: Chunker,
    router: IntentRouter,
    extension: String,
    live: RwLock<Arc<CorpusIndex>>,
}

impl Retriever {
    /// Starts with an empty generation-0 index; call [`Retriever::rebuild`] to load documents.
    pub fn new(embedder: Arc<dyn Embedder>, settings: &Settings) -> Result<Self> {
        let chunker = Chunker::new(settings.chunking)?;
        let live = RwLock::new(Arc::new(CorpusIndex::empty(embedder.dim())));
        Ok(Self {
            embedder,
            chunker,
            router: IntentRouter::from_settings(&settings.intents),
            extension: settings.data.extension.clone(),
            live,
        })
    }

    /// The currently published index.
    pub fn snapshot(&self) -> Arc<CorpusIndex> {
        Arc::clone(&self.live.read().unwrap_or_else(PoisonError::into_inner))
    }

    pub fn stats(&self) -> IndexStats {
        self.snapshot().stats()
    }

    /// Rebuild from every matching document directly under `dir`.
    pub fn rebuild(&self, dir: &Path) -> Result<IndexStats> {
        self.rebuild_from(&DirectorySource::new(dir, self.extension.clone()))
    }

    /// Build a new index from `source` and publish it. On failure the
    /// published index is left untouched.
    pub fn rebuild_from(&self, source: &dyn DocumentSource) -> Result<IndexStats> {
        let built = source
            .documents()
            .map(|docs| self.chunker.chunk_documents(&docs))
            .and_then(|chunks| CorpusIndex::build(chunks, self.embedder.as_ref()));
        let built = match built {
            Ok(index) => index,
            Err(e) => {
                warn!(error = %e, "rebuild failed; keeping current index");
                return Err(e);
            }
        };
        let mut live = self.live.write().unwrap_or_else(PoisonError::into_inner);
        let index = Arc::new(built.with_generation(live.generation() + 1));
        let stats = index.stats();
        *live = index;
        drop(live);
        info!(generation = stats.generation, chunks = stats.chunks, documents = stats.documents, "published corpus index");
        Ok(stats)
    }

    /// Top `k` chunks by cosine similarity.
    pub fn search(&self, query: &str, k: usize) -> Result<Vec<ScoredResult>> {
        self.snapshot().search(self.embedder.as_ref(), query, k)
    }

    /// Top `k` chunks by cosine plus keyword and field bonuses.
    pub fn search_enhanced(&self, query: &str, keywords: &[String], k: usize) -> Result<Vec<ScoredResult>> {
        let index = self.snapshot();
        if index.is_empty() || k == 0 {
            return Ok(Vec::new());
        }
        let q = embed_query(self.embedder.as_ref(), query, index.dim())?;
        let scorer = HybridScorer::new(query, keywords);
        Ok(enhanced_on(&index, &q, &scorer, k))
    }

    /// Best chunk of `source` by cosine plus keyword bonus, or `None` when the
    /// source has no chunks.
    pub fn get_best_from_source(&self, query: &str, keywords: &[String], source: &str) -> Result<Option<ScoredResult>> {
        let index = self.snapshot();
        if !index.has_source(source) {
            return Ok(None);
        }
        let q = embed_query(self.embedder.as_ref(), query, index.dim())?;
        Ok(best_on(&index, &q, &HybridScorer::new(query, keywords), source))
    }

    /// Enhanced search followed by the intent override, all on one index generation.
    pub fn retrieve_with_keywords(&self, query: &str, keywords: &[String], k: usize) -> Result<Retrieval> {
        let index = self.snapshot();
        let mut retrieval = Retrieval {
            keywords: keywords.to_vec(),
            results: Vec::new(),
            forced_source: None,
            generation: index.generation(),
        };
        if index.is_empty() || k == 0 {
            return Ok(retrieval);
        }
        let q = embed_query(self.embedder.as_ref(), query, index.dim())?;
        let scorer = HybridScorer::new(query, keywords);
        retrieval.results = enhanced_on(&index, &q, &scorer, k);
        retrieval.forced_source =
            self.router.apply(keywords, &mut retrieval.results, |source| Ok(best_on(&index, &q, &scorer, source)))?;
        debug!(query, results = retrieval.results.len(), forced = ?retrieval.forced_source, "retrieved");
        Ok(retrieval)
    }

    /// Extract keywords from `query` and run [`Retriever::retrieve_with_keywords`].
    pub fn retrieve(&self, query: &str, k: usize) -> Result<Retrieval> {
        let keywords = extract_keywords(query);
        self.retrieve_with_keywords(query, &keywords, k)
    }
}

fn enhanced_on(index: &CorpusIndex, q: &[f32], scorer: &HybridScorer, k: usize) -> Vec<ScoredResult> {
    let scores: Vec<f32> = index
        .similarities(q)
        .into_iter()
        .zip(index.chunks())
        .map(|(cos, chunk)| scorer.score(cos, &chunk.text))
        .collect();
    index.rank(&scores, k)
}

fn best_on(index: &CorpusIndex, q: &[f32], scorer: &HybridScorer, source: &str) -> Option<ScoredResult> {
    let mut best: Option<ScoredResult> = None;
    for row in index.rows_for_source(source) {
        let (Some(chunk), Some(emb)) = (index.chunk(row), index.embedding(row)) else { continue };
        let score = scorer.override_score(snippetdb_vector::dot(emb, q), &chunk.text);
        if best.as_ref().map_or(true, |b| score > b.score) {
            best = Some(ScoredResult::from_chunk(chunk, score));
        }
    }
    best
}
