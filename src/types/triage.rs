//! Stage outputs and the aggregate triage response

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::planning::ExecutionPlan;
use crate::types::steps::StepLog;
use crate::types::ticket::KbArticle;

/// Ticket category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Billing,
    Tech,
    Shipping,
    Other,
}

impl Category {
    /// Categories in tie-breaking order
    pub const ALL: [Category; 4] = [
        Category::Billing,
        Category::Tech,
        Category::Shipping,
        Category::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Billing => "billing",
            Category::Tech => "tech",
            Category::Shipping => "shipping",
            Category::Other => "other",
        }
    }

    /// Map a free-text label to a category.
    ///
    /// Exact names and a small synonym table are recognised; anything else
    /// maps to `Other`.
    pub fn from_label(label: &str) -> Self {
        let normalized = label
            .trim()
            .trim_matches(|c: char| !c.is_alphanumeric())
            .to_lowercase();

        match normalized.as_str() {
            "billing" => Category::Billing,
            "tech" => Category::Tech,
            "shipping" => Category::Shipping,
            "technical" | "technology" | "bug" => Category::Tech,
            "payment" | "financial" | "invoice" => Category::Billing,
            "delivery" | "logistics" | "transport" => Category::Shipping,
            _ => Category::Other,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which strategy produced a stage result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultSource {
    /// Deterministic keyword/template strategy
    Heuristic,
    /// External text generation
    Model,
    /// Heuristic result substituted after a model failure
    Fallback,
}

/// KB article with its relevance score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredArticle {
    pub article: KbArticle,
    pub score: f64,
}

impl ScoredArticle {
    pub fn new(article: KbArticle, score: f64) -> Self {
        Self { article, score }
    }

    pub fn id(&self) -> &str {
        &self.article.id
    }
}

/// Classifier output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub category: Category,
    /// Confidence in [0, 1]
    pub confidence: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<String>,
    pub source: ResultSource,
}

impl ClassificationResult {
    /// Mark a heuristic result as a substitute for a failed model call
    pub fn into_fallback(mut self) -> Self {
        self.source = ResultSource::Fallback;
        self
    }
}

/// Drafter output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DraftResult {
    pub reply: String,
    /// Verified article ids in first-seen order
    pub citations: Vec<String>,
    pub source: ResultSource,
}

/// Sub-scores and adjustments behind the final confidence
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfidenceFactors {
    pub classification: f64,
    pub retrieval: f64,
    pub draft: f64,
    pub coverage: f64,
    pub boost_applied: f64,
    pub penalty_applied: f64,
}

impl ConfidenceFactors {
    /// Copy with every value rounded to 3 decimals, for audit output
    pub fn rounded(&self) -> Self {
        Self {
            classification: round_to(self.classification, 3),
            retrieval: round_to(self.retrieval, 3),
            draft: round_to(self.draft, 3),
            coverage: round_to(self.coverage, 3),
            boost_applied: round_to(self.boost_applied, 3),
            penalty_applied: round_to(self.penalty_applied, 3),
        }
    }
}

/// Summary quality metrics reported with the response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityMetrics {
    /// Best relevance score
    pub retrieval_quality: f64,
    pub draft_quality: f64,
    pub citation_count: usize,
    /// Reply length in characters
    pub response_length: usize,
    /// Selected articles over KB size
    pub kb_coverage: f64,
}

/// Provider and model metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelInfo {
    pub provider: String,
    pub model: String,
    pub prompt_version: String,
    pub stub_mode: bool,
    pub total_processing_time_ms: f64,
    pub execution_plan: ExecutionPlan,
}

/// Aggregate triage response, built once at the end of a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TriageResponse {
    pub predicted_category: Category,
    pub draft_reply: String,
    pub citations: Vec<String>,
    pub confidence: f64,
    pub original_confidence: f64,
    pub confidence_factors: ConfidenceFactors,
    pub auto_close_eligible: bool,
    pub model_info: ModelInfo,
    pub step_logs: Vec<StepLog>,
    pub quality: QualityMetrics,
}

/// Round to a fixed number of decimal places
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}
