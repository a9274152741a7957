// Relevance scoring for KB articles
pub mod scorer;

pub use scorer::{
    keyword_occurrence_score, tokenize, RelevanceScorer, ScoreBreakdown, ScoringWeights,
};
