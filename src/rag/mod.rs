// Relevance engine for knowledge-base retrieval
//
// Scores the KB articles supplied with a triage request against the ticket
// text and returns the best matches. Nothing is indexed or persisted: the
// caller owns the corpus and sends it with every request.
//
// Components:
// - Reranking: per-article relevance scoring (keyword + lexical overlap)
// - Retrieval: threshold, stable sort, and truncation

pub mod retrieval;
pub mod reranking;

// Re-export key types
pub use retrieval::{RelevanceEngine, SearchParams};
pub use reranking::{RelevanceScorer, ScoreBreakdown, ScoringWeights};
