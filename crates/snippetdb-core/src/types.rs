//! Domain types shared by the chunker, the corpus index and the scorers.

use serde::{Deserialize, Serialize};

/// File name of a source document, e.g. `sleep-hygiene.md`.
pub type SourceName = String;

/// A named text document read from a [`DocumentSource`](crate::traits::DocumentSource).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub name: SourceName,
    pub text: String,
}

/// A window of a document's whitespace-normalized text.
///
/// - `source`: name of the parent document
/// - `index`: position of the window within the parent document
/// - `text`: the window itself
///
/// The embedding row for a chunk lives in the corpus index matrix, at the same
/// position as the chunk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    pub source: SourceName,
    pub index: usize,
    pub text: String,
}

/// One ranked passage returned to callers.
///
/// `score` is cosine similarity plus any additive bonuses applied by the
/// scorer. It is not a probability and has no fixed upper bound; higher is
/// always better.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredResult {
    pub text: String,
    pub source: SourceName,
    pub chunk_index: usize,
    pub score: f32,
}

impl ScoredResult {
    pub fn from_chunk(chunk: &Chunk, score: f32) -> Self {
        Self { text: chunk.text.clone(), source: chunk.source.clone(), chunk_index: chunk.index, score }
    }
}
