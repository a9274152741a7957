//! Keyword-based ticket classification
//!
//! Deterministic and model-free. It is the default strategy and the
//! fallback for the model-backed classifier.

use async_trait::async_trait;

use crate::classifier::Classifier;
use crate::types::{round_to, Category, ClassificationResult, ResultSource};

/// Primary billing keywords (weight 3)
pub const BILLING_KEYWORDS: [&str; 6] = ["refund", "invoice", "charge", "card", "payment", "billing"];
/// Primary tech keywords (weight 3)
pub const TECH_KEYWORDS: [&str; 7] = ["error", "bug", "stack", "crash", "login", "auth", "trace"];
/// Primary shipping keywords (weight 3)
pub const SHIPPING_KEYWORDS: [&str; 7] = [
    "delivery", "shipment", "shipping", "package", "track", "courier", "delayed",
];

const BILLING_INDICATORS: [&str; 9] = [
    "money", "cost", "price", "subscription", "account", "plan", "charged", "fee", "transaction",
];
const TECH_INDICATORS: [&str; 9] = [
    "broken", "not working", "cannot", "can't", "issue", "problem", "fix", "support", "help",
];
const SHIPPING_INDICATORS: [&str; 8] = [
    "order", "product", "item", "received", "arrive", "delivery", "package", "sent",
];

const PRIMARY_WEIGHT: usize = 3;
const SECONDARY_WEIGHT: usize = 1;

/// Confidence reported when no keyword matched
pub const NO_MATCH_CONFIDENCE: f64 = 0.3;
pub const MIN_CONFIDENCE: f64 = 0.3;
pub const MAX_CONFIDENCE: f64 = 0.95;

/// Weighted keyword score per category
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CategoryScores {
    pub billing: usize,
    pub tech: usize,
    pub shipping: usize,
}

impl CategoryScores {
    pub fn get(&self, category: Category) -> usize {
        match category {
            Category::Billing => self.billing,
            Category::Tech => self.tech,
            Category::Shipping => self.shipping,
            Category::Other => 0,
        }
    }

    /// Highest-scoring category; ties resolve in billing, tech, shipping order
    pub fn winner(&self) -> (Category, usize) {
        let mut best = (Category::Other, 0);
        for category in Category::ALL {
            let score = self.get(category);
            if score > best.1 {
                best = (category, score);
            }
        }
        best
    }
}

/// Keyword-weighted classifier
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicClassifier;

impl HeuristicClassifier {
    pub fn new() -> Self {
        Self
    }

    /// Per-category score: 3 × primary occurrences + 1 × secondary occurrences
    pub fn scores(&self, text: &str) -> CategoryScores {
        let lowered = text.to_lowercase();
        let weigh = |primary: &[&str], secondary: &[&str]| {
            PRIMARY_WEIGHT * occurrences(&lowered, primary)
                + SECONDARY_WEIGHT * occurrences(&lowered, secondary)
        };

        CategoryScores {
            billing: weigh(&BILLING_KEYWORDS, &BILLING_INDICATORS),
            tech: weigh(&TECH_KEYWORDS, &TECH_INDICATORS),
            shipping: weigh(&SHIPPING_KEYWORDS, &SHIPPING_INDICATORS),
        }
    }

    /// Classify text.
    ///
    /// Confidence combines keyword density, the margin over the runner-up,
    /// and absolute-score bonuses, clamped to [0.3, 0.95].
    pub fn classify_text(&self, text: &str) -> ClassificationResult {
        let scores = self.scores(text);
        let (category, top) = scores.winner();

        if top == 0 {
            return ClassificationResult {
                category: Category::Other,
                confidence: NO_MATCH_CONFIDENCE,
                reasoning: None,
                source: ResultSource::Heuristic,
            };
        }

        let word_count = text.split_whitespace().count().max(1);
        let density = top as f64 / word_count as f64;
        let mut confidence = (density * 2.0).min(0.9);

        let runner_up = Category::ALL
            .iter()
            .filter(|c| **c != category)
            .map(|c| scores.get(*c))
            .max()
            .unwrap_or(0);
        let margin = (top - runner_up) as f64 / top.max(1) as f64;
        confidence += margin * 0.3;

        if top >= 5 {
            confidence += 0.2;
        } else if top >= 3 {
            confidence += 0.1;
        }

        ClassificationResult {
            category,
            confidence: round_to(confidence.clamp(MIN_CONFIDENCE, MAX_CONFIDENCE), 3),
            reasoning: None,
            source: ResultSource::Heuristic,
        }
    }
}

#[async_trait]
impl Classifier for HeuristicClassifier {
    async fn classify(&self, text: &str) -> ClassificationResult {
        self.classify_text(text)
    }

    fn name(&self) -> &'static str {
        "heuristic"
    }
}

/// Total non-overlapping occurrences of every needle
fn occurrences(haystack: &str, needles: &[&str]) -> usize {
    needles.iter().map(|needle| haystack.matches(needle).count()).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_billing_scenario() {
        let classifier = HeuristicClassifier::new();
        let result = classifier.classify_text("I need a refund for the duplicate charge on my invoice");
        assert_eq!(result.category, Category::Billing);
        assert_eq!(result.source, ResultSource::Heuristic);
        assert!(result.confidence >= MIN_CONFIDENCE && result.confidence <= MAX_CONFIDENCE);
    }

    #[test]
    fn test_scores_weighting() {
        let classifier = HeuristicClassifier::new();
        let scores = classifier.scores("refund refund subscription");
        // 2 primary hits × 3 + 1 secondary hit
        assert_eq!(scores.billing, 7);
        assert_eq!(scores.tech, 0);
    }

    #[test]
    fn test_tech_classification() {
        let classifier = HeuristicClassifier::new();
        let result = classifier.classify_text("The app crashes with an error when I try to login");
        assert_eq!(result.category, Category::Tech);
    }

    #[test]
    fn test_shipping_classification() {
        let classifier = HeuristicClassifier::new();
        let result = classifier.classify_text("My package delivery is delayed, the courier has no update");
        assert_eq!(result.category, Category::Shipping);
    }

    #[test]
    fn test_no_keywords_is_other() {
        let classifier = HeuristicClassifier::new();
        let result = classifier.classify_text("Hello there");
        assert_eq!(result.category, Category::Other);
        assert_eq!(result.confidence, NO_MATCH_CONFIDENCE);
    }

    #[test]
    fn test_confidence_calculation() {
        let classifier = HeuristicClassifier::new();
        // billing = 3 (refund), 2 words: density 1.5 → 0.9 cap, margin 1.0 → +0.3,
        // score ≥ 3 → +0.1, total 1.3 clamped to 0.95
        let result = classifier.classify_text("refund please");
        assert_eq!(result.confidence, MAX_CONFIDENCE);

        // billing = 3 in 20 words: density 0.15 → 0.3, margin +0.3, +0.1 → 0.7
        let text = "refund one two three four five six seven eight nine ten eleven twelve thirteen fourteen fifteen sixteen seventeen eighteen nineteen";
        let result = classifier.classify_text(text);
        assert_eq!(result.confidence, 0.7);
    }

    #[test]
    fn test_tie_prefers_billing() {
        let scores = CategoryScores {
            billing: 3,
            tech: 3,
            shipping: 1,
        };
        assert_eq!(scores.winner(), (Category::Billing, 3));
    }

    #[test]
    fn test_deterministic() {
        let classifier = HeuristicClassifier::new();
        let text = "Charged twice, card payment failed with an error";
        assert_eq!(classifier.classify_text(text), classifier.classify_text(text));
    }
}
