use crate::types::Document;

/// Maps text to fixed-dimension vectors.
///
/// Implementations must preserve input order and return vectors of length
/// [`Embedder::dim`] for every call on the same instance.
pub trait Embedder: Send + Sync {
    fn dim(&self) -> usize;
    fn embed_batch(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>>;
}

/// A snapshot of named text documents, sorted by name.
pub trait DocumentSource: Send + Sync {
    fn documents(&self) -> crate::error::Result<Vec<Document>>;
}
