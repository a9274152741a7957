// Relevance engine: score, filter, and rank KB articles
pub mod engine;

pub use engine::{RelevanceEngine, SearchParams};
