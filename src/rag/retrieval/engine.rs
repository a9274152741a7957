// Relevance engine: ranks the request's KB articles against ticket text
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::cli::config::RetrievalConfig;
use crate::rag::reranking::{RelevanceScorer, ScoringWeights};
use crate::types::{KbArticle, ScoredArticle};

/// Search parameters for ranking
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchParams {
    /// Minimum score an article needs to be returned
    pub threshold: f64,
    /// Keyword/semantic blend weights
    pub weights: ScoringWeights,
    /// Enhanced scoring (false = keyword-occurrence count)
    pub enhanced: bool,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            threshold: 1.0,
            weights: ScoringWeights::default(),
            enhanced: true,
        }
    }
}

impl From<&RetrievalConfig> for SearchParams {
    fn from(config: &RetrievalConfig) -> Self {
        Self {
            threshold: config.min_relevance,
            weights: ScoringWeights {
                keyword: config.keyword_weight,
                semantic: config.semantic_weight,
            },
            enhanced: config.enhanced_scoring,
        }
    }
}

/// Ranks candidate articles by relevance
#[derive(Debug, Clone)]
pub struct RelevanceEngine {
    scorer: RelevanceScorer,
    params: SearchParams,
}

impl RelevanceEngine {
    /// Create new engine with default parameters
    pub fn new() -> Self {
        Self::with_params(SearchParams::default())
    }

    /// Create with custom parameters
    pub fn with_params(params: SearchParams) -> Self {
        Self {
            scorer: RelevanceScorer::with_config(params.weights, params.enhanced),
            params,
        }
    }

    pub fn params(&self) -> &SearchParams {
        &self.params
    }

    /// Rank candidates against the query.
    ///
    /// Articles scoring below the threshold are dropped. The rest are sorted
    /// by score descending (stable, so ties keep input order) and truncated
    /// to `limit`.
    pub fn rank(&self, query: &str, candidates: &[KbArticle], limit: usize) -> Vec<ScoredArticle> {
        if query.trim().is_empty() || candidates.is_empty() || limit == 0 {
            return Vec::new();
        }

        let mut ranked: Vec<ScoredArticle> = candidates
            .iter()
            .map(|article| ScoredArticle::new(article.clone(), self.scorer.score(query, article)))
            .filter(|scored| scored.score >= self.params.threshold)
            .collect();

        ranked.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
        ranked.truncate(limit);
        ranked
    }
}

impl Default for RelevanceEngine {
    fn default() -> Self {
        Self::new()
    }
}
