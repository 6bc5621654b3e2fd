//! Hybrid ranking on top of the corpus index: cosine similarity plus keyword
//! and field boosts, with keyword-triggered intent overrides.

pub mod intent;
pub mod keywords;
pub mod retriever;
pub mod scorer;
pub mod service;

pub use intent::IntentRouter;
pub use keywords::extract_keywords;
pub use retriever::{Retrieval, Retriever};
pub use scorer::HybridScorer;
pub use service::RetrievalService;
