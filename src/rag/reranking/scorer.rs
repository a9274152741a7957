// Relevance scorer for KB articles against ticket text
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::types::KbArticle;

/// Per-occurrence weight for query tokens found in the title
pub const TITLE_TERM_WEIGHT: f64 = 5.0;
/// Per-occurrence weight for query tokens found in the body
pub const BODY_TERM_WEIGHT: f64 = 1.0;
/// Bonus when a query token is a whole word of the title
pub const TITLE_WORD_BONUS: f64 = 3.0;
/// Bonus per query token contained in any tag
pub const TAG_BONUS: f64 = 2.0;
/// Bonus when the whole query appears in the title
pub const PHRASE_TITLE_BONUS: f64 = 10.0;
/// Bonus when the whole query appears in the body
pub const PHRASE_BODY_BONUS: f64 = 5.0;
pub const DENSITY_SCALE: f64 = 10.0;
pub const COVERAGE_SCALE: f64 = 5.0;
/// Lifts the [0, 1] overlap ratio onto the keyword score's scale
pub const SEMANTIC_SCALE: f64 = 10.0;
pub const FRESHNESS_BONUS: f64 = 0.5;
pub const PUBLISHED_BONUS: f64 = 0.5;

/// Blend weights for keyword and semantic signals
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoringWeights {
    pub keyword: f64,
    pub semantic: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            keyword: 0.8,
            semantic: 0.2,
        }
    }
}

/// Individual contributions to an enhanced relevance score
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub title: f64,
    pub body: f64,
    pub tags: f64,
    pub phrase: f64,
    pub density: f64,
    pub coverage: f64,
    /// Sum of the keyword components above
    pub keyword: f64,
    /// Jaccard overlap of query and document tokens, in [0, 1]
    pub semantic: f64,
    /// Freshness and status bonuses
    pub metadata: f64,
    pub total: f64,
}

/// Scores a single article against a query
#[derive(Debug, Clone)]
pub struct RelevanceScorer {
    weights: ScoringWeights,
    enhanced: bool,
}

impl RelevanceScorer {
    /// Create scorer with default weights and enhanced scoring
    pub fn new() -> Self {
        Self::with_config(ScoringWeights::default(), true)
    }

    /// Create with custom weights; `enhanced = false` selects plain keyword counting
    pub fn with_config(weights: ScoringWeights, enhanced: bool) -> Self {
        Self { weights, enhanced }
    }

    pub fn is_enhanced(&self) -> bool {
        self.enhanced
    }

    /// Relevance score for one article, never negative
    pub fn score(&self, query: &str, article: &KbArticle) -> f64 {
        if self.enhanced {
            self.breakdown(query, article).total
        } else {
            keyword_occurrence_score(query, article)
        }
    }

    /// Compute the enhanced score with every component exposed
    pub fn breakdown(&self, query: &str, article: &KbArticle) -> ScoreBreakdown {
        let tokens = tokenize(query);
        if tokens.is_empty() {
            return ScoreBreakdown::default();
        }

        let query_lower = query.trim().to_lowercase();
        let title = article.title.to_lowercase();
        let body = article.body.to_lowercase();
        let title_words = word_set(&title);
        let tags: Vec<String> = article.tags.iter().map(|t| t.to_lowercase()).collect();

        let mut breakdown = ScoreBreakdown::default();
        let mut term_hits = 0usize;
        let mut covered = 0usize;

        for token in &tokens {
            let in_title = title.matches(token.as_str()).count();
            let in_body = body.matches(token.as_str()).count();
            let in_tags = tags.iter().any(|tag| tag.contains(token.as_str()));

            if in_title > 0 {
                breakdown.title += in_title as f64 * TITLE_TERM_WEIGHT;
                if title_words.contains(token) {
                    breakdown.title += TITLE_WORD_BONUS;
                }
            }

            breakdown.body += in_body as f64 * BODY_TERM_WEIGHT;

            if in_tags {
                breakdown.tags += TAG_BONUS;
            }

            term_hits += in_title + in_body;
            if in_title + in_body > 0 || in_tags {
                covered += 1;
            }
        }

        if title.contains(&query_lower) {
            breakdown.phrase += PHRASE_TITLE_BONUS;
        }
        if body.contains(&query_lower) {
            breakdown.phrase += PHRASE_BODY_BONUS;
        }

        let word_count = title.split_whitespace().count() + body.split_whitespace().count();
        if word_count > 0 {
            breakdown.density = term_hits as f64 / word_count as f64 * DENSITY_SCALE;
        }

        breakdown.coverage = covered as f64 / tokens.len() as f64 * COVERAGE_SCALE;

        breakdown.keyword = breakdown.title
            + breakdown.body
            + breakdown.tags
            + breakdown.phrase
            + breakdown.density
            + breakdown.coverage;

        breakdown.semantic = lexical_overlap(&tokens, article);

        let blended = breakdown.keyword * self.weights.keyword
            + breakdown.semantic * SEMANTIC_SCALE * self.weights.semantic;

        // Metadata bonuses only lift documents that already matched
        if blended > 0.0 {
            if article
                .updated_at
                .as_deref()
                .map(|s| !s.trim().is_empty())
                .unwrap_or(false)
            {
                breakdown.metadata += FRESHNESS_BONUS;
            }
            if article.is_published() {
                breakdown.metadata += PUBLISHED_BONUS;
            }
        }

        breakdown.total = blended + breakdown.metadata;
        breakdown
    }
}

impl Default for RelevanceScorer {
    fn default() -> Self {
        Self::new()
    }
}

/// Lower-cased alphanumeric words longer than two characters, de-duplicated
/// in first-seen order
pub fn tokenize(text: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|word| word.chars().count() > 2)
        .filter(|word| seen.insert(word.to_string()))
        .map(str::to_string)
        .collect()
}

fn word_set(text: &str) -> HashSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|word| !word.is_empty())
        .map(str::to_string)
        .collect()
}

/// Intersection over union of query tokens and document tokens
fn lexical_overlap(query_tokens: &[String], article: &KbArticle) -> f64 {
    let document = format!("{} {} {}", article.title, article.body, article.tags.join(" "));
    let doc_tokens: HashSet<String> = tokenize(&document).into_iter().collect();
    let query_set: HashSet<&String> = query_tokens.iter().collect();

    let intersection = query_set.iter().filter(|t| doc_tokens.contains(**t)).count();
    let union = query_set.len() + doc_tokens.len() - intersection;

    if union == 0 {
        0.0
    } else {
        intersection as f64 / union as f64
    }
}

/// Compatibility score: occurrences of each distinct query word in
/// title + body, plus the number of tags containing it
pub fn keyword_occurrence_score(query: &str, article: &KbArticle) -> f64 {
    let text = format!("{} {}", article.title, article.body).to_lowercase();
    let tags: Vec<String> = article.tags.iter().map(|t| t.to_lowercase()).collect();
    let query_lower = query.to_lowercase();
    let words: HashSet<&str> = query_lower.split_whitespace().collect();

    let mut score = 0usize;
    for word in words {
        score += text.matches(word).count();
        score += tags.iter().filter(|tag| tag.contains(word)).count();
    }

    score as f64
}
