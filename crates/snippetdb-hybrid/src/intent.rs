//! Keyword-triggered source overrides that guarantee topical recall.

use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

use snippetdb_core::config::IntentSettings;
use snippetdb_core::error::Result;
use snippetdb_core::types::{ScoredResult, SourceName};

#[derive(Debug, Clone, Default)]
pub struct IntentRouter {
    map: BTreeMap<String, Vec<SourceName>>,
}

impl IntentRouter {
    /// Keys are matched lower-case.
    pub fn new(map: BTreeMap<String, Vec<SourceName>>) -> Self {
        Self { map: map.into_iter().map(|(k, v)| (k.to_lowercase(), v)).collect() }
    }

    pub fn from_settings(settings: &IntentSettings) -> Self {
        Self::new(settings.0.clone())
    }

    /// Union of the sources mapped from `keywords`, in mapping iteration order.
    pub fn preferred_sources(&self, keywords: &[String]) -> Vec<SourceName> {
        let wanted: BTreeSet<String> = keywords.iter().map(|k| k.to_lowercase()).collect();
        let mut out: Vec<SourceName> = Vec::new();
        for (_, sources) in self.map.iter().filter(|(key, _)| wanted.contains(*key)) {
            for s in sources {
                if !out.contains(s) {
                    out.push(s.clone());
                }
            }
        }
        out
    }

    /// Replace the last result with the best chunk of the first preferred
    /// source that has one, unless a preferred source is already present.
    ///
    /// `best_from` looks up the best chunk of one source. Returns the name of
    /// the source that was forced in, if any.
    pub fn apply<F>(&self, keywords: &[String], results: &mut [ScoredResult], mut best_from: F) -> Result<Option<SourceName>>
    where
        F: FnMut(&str) -> Result<Option<ScoredResult>>,
    {
        let preferred = self.preferred_sources(keywords);
        if preferred.is_empty() || results.is_empty() {
            return Ok(None);
        }
        if results.iter().any(|r| preferred.contains(&r.source)) {
            return Ok(None);
        }
        for source in &preferred {
            if let Some(best) = best_from(source)? {
                debug!(source = %source, "intent override replaced lowest-ranked result");
                if let Some(last) = results.last_mut() {
                    *last = best;
                }
                return Ok(Some(source.clone()));
            }
        }
        debug!(?preferred, "no chunks in preferred sources; results unchanged");
        Ok(None)
    }
}
