//! Async facade for request handlers running on tokio.
//!
//! Retrieval is blocking work (the embedding call dominates), so each call is
//! moved to tokio's blocking pool and awaited.

use anyhow::Result;
use std::path::PathBuf;
use std::sync::Arc;

use snippetdb_core::types::ScoredResult;
use snippetdb_vector::IndexStats;

use crate::retriever::{Retrieval, Retriever};

#[derive(Clone)]
pub struct RetrievalService {
    retriever: Arc<Retriever>,
    top_k: usize,
}

impl RetrievalService {
    pub fn new(retriever: Arc<Retriever>, top_k: usize) -> Self {
        Self { retriever, top_k }
    }

    pub async fn retrieve(&self, query: impl Into<String>) -> Result<Retrieval> {
        let (retriever, query, k) = (Arc::clone(&self.retriever), query.into(), self.top_k);
        Ok(tokio::task::spawn_blocking(move || retriever.retrieve(&query, k)).await??)
    }

    pub async fn search(&self, query: impl Into<String>, k: usize) -> Result<Vec<ScoredResult>> {
        let (retriever, query) = (Arc::clone(&self.retriever), query.into());
        Ok(tokio::task::spawn_blocking(move || retriever.search(&query, k)).await??)
    }

    pub async fn rebuild(&self, dir: impl Into<PathBuf>) -> Result<IndexStats> {
        let (retriever, dir) = (Arc::clone(&self.retriever), dir.into());
        Ok(tokio::task::spawn_blocking(move || retriever.rebuild(&dir)).await??)
    }
}
