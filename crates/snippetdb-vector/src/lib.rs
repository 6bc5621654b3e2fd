//! In-memory corpus index with exhaustive cosine search.
//!
//! An index is built once from chunked documents and an [`Embedder`], then
//! only read. Rebuilding produces a new [`CorpusIndex`] with a higher
//! generation number; callers swap it in wholesale.
//!
//! [`Embedder`]: snippetdb_core::traits::Embedder

pub mod index_build;
pub mod search;

pub use index_build::{CorpusIndex, IndexStats};
pub use search::{cmp_score_desc, dot, embed_query, normalize, top_k_indices};
