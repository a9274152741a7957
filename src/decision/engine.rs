//! Multi-factor confidence engine
//!
//! Final confidence = classifier confidence + boosts − penalties, clamped to
//! [0.1, 0.99]. Every boost and penalty rule is an independent function of
//! the sub-scores, so evaluation order never changes the result.

use serde::{Deserialize, Serialize};

use crate::cli::config::{DecisionConfig, DraftingConfig};
use crate::drafter::formatting::is_greeting;
use crate::drafter::templates::SIGN_OFFS;
use crate::types::{
    round_to, Category, ClassificationResult, ConfidenceFactors, DraftResult, FormattingChecks,
    ScoredArticle,
};

pub const CONFIDENCE_FLOOR: f64 = 0.1;
pub const CONFIDENCE_CEILING: f64 = 0.99;

// Retrieval quality tiers (best relevance score)
pub const ACCEPTABLE_SCORE: f64 = 1.0;
pub const GOOD_SCORE: f64 = 5.0;
pub const EXCELLENT_SCORE: f64 = 15.0;
const CORROBORATION_BONUS: f64 = 0.05;

/// Floor shared by the retrieval and coverage sub-scores
pub const QUALITY_FLOOR: f64 = 0.3;
/// Best score that earns the coverage bonus
const STRONG_MATCH_SCORE: f64 = 10.0;
const STRONG_MATCH_BONUS: f64 = 0.1;

// Draft quality
const DRAFT_BASE: f64 = 0.3;
const IN_RANGE_BONUS: f64 = 0.2;
const MIN_SUBSTANTIVE_WORDS: usize = 20;
const SUBSTANTIVE_BONUS: f64 = 0.1;
const CITED_BONUS: f64 = 0.15;

/// Draft quality and the structural checks behind it
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftAssessment {
    pub score: f64,
    pub word_count: usize,
    pub checks: FormattingChecks,
}

/// Everything the engine needs for one ticket
#[derive(Debug, Clone, Copy)]
pub struct DecisionInputs<'a> {
    pub classification: &'a ClassificationResult,
    /// Ranked articles, best first
    pub ranked: &'a [ScoredArticle],
    pub draft: &'a DraftResult,
    pub kb_size: usize,
    pub ticket_word_count: usize,
}

/// Outcome of [`DecisionEngine::decide`]
#[derive(Debug, Clone, PartialEq)]
pub struct Decision {
    pub original_confidence: f64,
    pub final_confidence: f64,
    pub factors: ConfidenceFactors,
    pub draft_assessment: DraftAssessment,
    pub auto_close_eligible: bool,
}

/// Pure, deterministic confidence calculator
#[derive(Debug, Clone)]
pub struct DecisionEngine {
    min_words: usize,
    max_words: usize,
    auto_close_enabled: bool,
    confidence_threshold: f64,
}

impl Default for DecisionEngine {
    fn default() -> Self {
        Self::from_config(&DraftingConfig::default(), &DecisionConfig::default())
    }
}

impl DecisionEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(drafting: &DraftingConfig, decision: &DecisionConfig) -> Self {
        Self {
            min_words: drafting.min_words,
            max_words: drafting.max_words,
            auto_close_enabled: decision.auto_close_enabled,
            confidence_threshold: decision.confidence_threshold,
        }
    }

    /// Combine all signals into the final confidence
    pub fn decide(&self, inputs: DecisionInputs<'_>) -> Decision {
        let best_score = inputs.ranked.first().map(|a| a.score);

        let retrieval = retrieval_quality(inputs.ranked);
        let assessment = self.assess_draft(inputs.draft);
        let coverage = coverage_quality(inputs.ranked, inputs.kb_size);

        let boost = retrieval_boost(retrieval)
            + draft_boost(assessment.score)
            + coverage_boost(coverage)
            + synergy_boost(assessment.score, retrieval);

        let penalty = short_text_penalty(inputs.ticket_word_count)
            + retrieval_penalty(best_score)
            + category_penalty(inputs.classification.category);

        let original = inputs.classification.confidence;
        let final_confidence = round_to(
            (original + boost - penalty).clamp(CONFIDENCE_FLOOR, CONFIDENCE_CEILING),
            3,
        );

        let factors = ConfidenceFactors {
            classification: original,
            retrieval,
            draft: assessment.score,
            coverage,
            boost_applied: boost,
            penalty_applied: penalty,
        }
        .rounded();

        Decision {
            original_confidence: original,
            final_confidence,
            factors,
            draft_assessment: assessment,
            auto_close_eligible: self.is_auto_close_eligible(final_confidence),
        }
    }

    pub fn is_auto_close_eligible(&self, final_confidence: f64) -> bool {
        self.auto_close_enabled && final_confidence >= self.confidence_threshold
    }

    /// Score a draft's length and structure
    pub fn assess_draft(&self, draft: &DraftResult) -> DraftAssessment {
        let reply = draft.reply.as_str();
        let word_count = reply.split_whitespace().count();
        let checks = formatting_checks(reply);

        let mut score = DRAFT_BASE;

        if (self.min_words..=self.max_words).contains(&word_count) {
            score += IN_RANGE_BONUS;
        } else if word_count >= MIN_SUBSTANTIVE_WORDS {
            score += SUBSTANTIVE_BONUS;
        }

        if checks.has_greeting {
            score += 0.05;
        }
        if checks.has_numbered_list {
            score += 0.1;
        }
        if checks.has_bold_formatting {
            score += 0.05;
        }
        if checks.has_note_section {
            score += 0.05;
        }
        if checks.has_closing {
            score += 0.05;
        }
        if checks.has_citation {
            score += 0.1;
        }
        if !draft.citations.is_empty() {
            score += CITED_BONUS;
        }

        DraftAssessment {
            score: score.min(1.0),
            word_count,
            checks,
        }
    }
}

/// Substring checks for the six structural elements of a reply
pub fn formatting_checks(reply: &str) -> FormattingChecks {
    let first_line = reply.lines().find(|l| !l.trim().is_empty()).unwrap_or("");

    FormattingChecks {
        has_greeting: is_greeting(first_line),
        has_numbered_list: (1..=9).any(|n| reply.contains(&format!("{}.", n))),
        has_bold_formatting: reply.contains("**"),
        has_note_section: reply.contains("Note:"),
        has_closing: SIGN_OFFS.iter().any(|s| reply.contains(s)),
        has_citation: reply.contains("[Article #"),
    }
}

/// Tiered mapping of the best relevance score into [0.3, 1]
pub fn retrieval_quality(ranked: &[ScoredArticle]) -> f64 {
    let Some(best) = ranked.first().map(|a| a.score) else {
        return QUALITY_FLOOR;
    };

    let base = if best >= EXCELLENT_SCORE {
        0.9 + ((best - EXCELLENT_SCORE) / 20.0).min(0.1)
    } else if best >= GOOD_SCORE {
        0.6 + (best - GOOD_SCORE) / 10.0 * 0.3
    } else if best >= ACCEPTABLE_SCORE {
        0.3 + (best - ACCEPTABLE_SCORE) / 4.0 * 0.3
    } else {
        QUALITY_FLOOR
    };

    let good_matches = ranked.iter().filter(|a| a.score >= GOOD_SCORE).count();
    let corroboration = good_matches.saturating_sub(1) as f64 * CORROBORATION_BONUS;

    (base + corroboration).min(1.0)
}

/// Share of the KB corpus that cleared the acceptable bar, from a 0.3 floor
pub fn coverage_quality(ranked: &[ScoredArticle], kb_size: usize) -> f64 {
    if kb_size == 0 {
        return QUALITY_FLOOR;
    }

    let relevant = ranked.iter().filter(|a| a.score >= ACCEPTABLE_SCORE).count();
    let mut coverage = QUALITY_FLOOR + relevant as f64 / kb_size as f64 * 0.7;

    if ranked.first().map(|a| a.score >= STRONG_MATCH_SCORE).unwrap_or(false) {
        coverage += STRONG_MATCH_BONUS;
    }

    coverage.min(1.0)
}

pub fn retrieval_boost(retrieval: f64) -> f64 {
    if retrieval >= 0.85 {
        0.15
    } else if retrieval >= 0.7 {
        0.1
    } else if retrieval >= 0.5 {
        0.05
    } else {
        0.0
    }
}

pub fn draft_boost(draft: f64) -> f64 {
    if draft >= 0.9 {
        0.1
    } else if draft >= 0.7 {
        0.05
    } else {
        0.0
    }
}

pub fn coverage_boost(coverage: f64) -> f64 {
    if coverage >= 0.8 {
        0.05
    } else {
        0.0
    }
}

pub fn synergy_boost(draft: f64, retrieval: f64) -> f64 {
    if draft >= 0.8 && retrieval >= 0.7 {
        0.05
    } else {
        0.0
    }
}

pub fn short_text_penalty(word_count: usize) -> f64 {
    if word_count < 3 {
        0.15
    } else if word_count < 8 {
        0.05
    } else {
        0.0
    }
}

/// Penalty for no articles (0.25) or a weak best match (0.1)
pub fn retrieval_penalty(best_score: Option<f64>) -> f64 {
    match best_score {
        None => 0.25,
        Some(score) if score < ACCEPTABLE_SCORE => 0.1,
        Some(_) => 0.0,
    }
}

pub fn category_penalty(category: Category) -> f64 {
    if category == Category::Other {
        0.1
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{KbArticle, ResultSource};

    fn scored(id: &str, score: f64) -> ScoredArticle {
        ScoredArticle::new(KbArticle::new(id, "Title", "Body"), score)
    }

    fn classification(category: Category, confidence: f64) -> ClassificationResult {
        ClassificationResult {
            category,
            confidence,
            reasoning: None,
            source: ResultSource::Heuristic,
        }
    }

    fn draft(reply: &str, citations: &[&str]) -> DraftResult {
        DraftResult {
            reply: reply.to_string(),
            citations: citations.iter().map(|c| c.to_string()).collect(),
            source: ResultSource::Heuristic,
        }
    }

    #[test]
    fn test_retrieval_quality_tiers() {
        assert_eq!(retrieval_quality(&[]), QUALITY_FLOOR);
        assert_eq!(retrieval_quality(&[scored("a", 0.5)]), QUALITY_FLOOR);
        assert!((retrieval_quality(&[scored("a", 3.0)]) - 0.45).abs() < 1e-9);
        assert!((retrieval_quality(&[scored("a", 10.0)]) - 0.75).abs() < 1e-9);
        assert!((retrieval_quality(&[scored("a", 25.0)]) - 1.0).abs() < 1e-9);
        assert!((retrieval_quality(&[scored("a", 15.0)]) - 0.9).abs() < 1e-9);
    }

    #[test]
    fn test_retrieval_corroboration_bonus() {
        let ranked = vec![scored("a", 10.0), scored("b", 6.0), scored("c", 5.0), scored("d", 2.0)];
        // 0.75 + 2 extra good matches × 0.05
        assert!((retrieval_quality(&ranked) - 0.85).abs() < 1e-9);

        let capped = vec![scored("a", 40.0), scored("b", 30.0)];
        assert_eq!(retrieval_quality(&capped), 1.0);
    }

    #[test]
    fn test_coverage_quality() {
        assert_eq!(coverage_quality(&[], 0), QUALITY_FLOOR);
        assert_eq!(coverage_quality(&[], 5), QUALITY_FLOOR);

        let ranked = vec![scored("a", 4.0), scored("b", 2.0)];
        assert!((coverage_quality(&ranked, 4) - 0.65).abs() < 1e-9);

        let strong = vec![scored("a", 12.0)];
        assert_eq!(coverage_quality(&strong, 1), 1.0);
    }

    #[test]
    fn test_boost_tiers_inclusive() {
        assert_eq!(retrieval_boost(0.85), 0.15);
        assert_eq!(retrieval_boost(0.7), 0.1);
        assert_eq!(retrieval_boost(0.5), 0.05);
        assert_eq!(retrieval_boost(0.49), 0.0);

        assert_eq!(draft_boost(0.9), 0.1);
        assert_eq!(draft_boost(0.7), 0.05);
        assert_eq!(draft_boost(0.69), 0.0);

        assert_eq!(coverage_boost(0.8), 0.05);
        assert_eq!(coverage_boost(0.79), 0.0);

        assert_eq!(synergy_boost(0.8, 0.7), 0.05);
        assert_eq!(synergy_boost(0.79, 0.9), 0.0);
        assert_eq!(synergy_boost(0.9, 0.69), 0.0);
    }

    #[test]
    fn test_penalty_tiers() {
        assert_eq!(short_text_penalty(2), 0.15);
        assert_eq!(short_text_penalty(3), 0.05);
        assert_eq!(short_text_penalty(7), 0.05);
        assert_eq!(short_text_penalty(8), 0.0);

        assert_eq!(retrieval_penalty(None), 0.25);
        assert_eq!(retrieval_penalty(Some(0.4)), 0.1);
        assert_eq!(retrieval_penalty(Some(1.0)), 0.0);

        assert_eq!(category_penalty(Category::Other), 0.1);
        assert_eq!(category_penalty(Category::Tech), 0.0);
    }

    #[test]
    fn test_formatting_checks() {
        let reply = "Hello,\n\n1. **Open** settings\n\nNote: tip\n\nSee [Article #kb1].\n\nBest regards,\nCustomer Support Team";
        let checks = formatting_checks(reply);
        assert!(checks.has_greeting);
        assert!(checks.has_numbered_list);
        assert!(checks.has_bold_formatting);
        assert!(checks.has_note_section);
        assert!(checks.has_closing);
        assert!(checks.has_citation);

        let bare = formatting_checks("ok");
        assert_eq!(bare, FormattingChecks::default());
    }

    #[test]
    fn test_draft_quality() {
        let engine = DecisionEngine::new();

        // Short reply with every structural element and a citation:
        // 0.3 + 0.05 + 0.1 + 0.05 + 0.05 + 0.05 + 0.1 + 0.15
        let reply = "Hello,\n\n1. **Open** settings\n\nNote: tip\n\nSee [Article #kb1].\n\nBest regards,\nCustomer Support Team";
        let assessment = engine.assess_draft(&draft(reply, &["kb1"]));
        assert!((assessment.score - 0.85).abs() < 1e-9);

        let assessment = engine.assess_draft(&draft("thanks", &[]));
        assert!((assessment.score - DRAFT_BASE).abs() < 1e-9);
    }

    #[test]
    fn test_draft_quality_word_ranges() {
        let engine = DecisionEngine::new();
        let twenty = vec!["word"; 25].join(" ");
        assert!((engine.assess_draft(&draft(&twenty, &[])).score - 0.4).abs() < 1e-9);

        let sixty = vec!["word"; 60].join(" ");
        assert!((engine.assess_draft(&draft(&sixty, &[])).score - 0.5).abs() < 1e-9);

        let long = vec!["word"; 500].join(" ");
        assert!((engine.assess_draft(&draft(&long, &[])).score - 0.4).abs() < 1e-9);
    }

    #[test]
    fn test_decide_clamps_to_floor() {
        let engine = DecisionEngine::new();
        let class = classification(Category::Other, 0.3);
        let reply = draft("Hello", &[]);

        let decision = engine.decide(DecisionInputs {
            classification: &class,
            ranked: &[],
            draft: &reply,
            kb_size: 0,
            ticket_word_count: 2,
        });

        // 0.3 − 0.15 − 0.25 − 0.1 < floor
        assert_eq!(decision.final_confidence, CONFIDENCE_FLOOR);
        assert!(!decision.auto_close_eligible);
        assert_eq!(decision.factors.penalty_applied, 0.5);
        assert_eq!(decision.factors.boost_applied, 0.0);
    }

    #[test]
    fn test_decide_clamps_to_ceiling() {
        let engine = DecisionEngine::new();
        let class = classification(Category::Billing, 0.95);
        let reply = vec!["Hello,", "1. **Step**", "Note: x", "[Article #a]", "Best regards,"].join("\n")
            + &" filler".repeat(60);
        let result = draft(&reply, &["a"]);
        let ranked = vec![scored("a", 30.0), scored("b", 12.0)];

        let decision = engine.decide(DecisionInputs {
            classification: &class,
            ranked: &ranked,
            draft: &result,
            kb_size: 2,
            ticket_word_count: 12,
        });

        assert_eq!(decision.final_confidence, CONFIDENCE_CEILING);
        assert_eq!(decision.original_confidence, 0.95);
        assert!(decision.auto_close_eligible);
    }

    #[test]
    fn test_auto_close_respects_config() {
        let disabled = DecisionEngine::from_config(
            &DraftingConfig::default(),
            &DecisionConfig {
                auto_close_enabled: false,
                confidence_threshold: 0.78,
            },
        );
        assert!(!disabled.is_auto_close_eligible(0.99));

        let engine = DecisionEngine::new();
        assert!(engine.is_auto_close_eligible(0.78));
        assert!(!engine.is_auto_close_eligible(0.779));
    }

    #[test]
    fn test_decide_is_deterministic() {
        let engine = DecisionEngine::new();
        let class = classification(Category::Tech, 0.6);
        let reply = draft("Hello,\n1. Restart\n[Article #a]", &["a"]);
        let ranked = vec![scored("a", 7.0)];
        let inputs = DecisionInputs {
            classification: &class,
            ranked: &ranked,
            draft: &reply,
            kb_size: 3,
            ticket_word_count: 10,
        };

        assert_eq!(engine.decide(inputs), engine.decide(inputs));
    }
}
