//! Audit-trail step records
//!
//! Each pipeline milestone has its own metadata struct. The action tag is
//! derived from the metadata variant, so an entry can never carry metadata
//! belonging to another milestone.

use serde::{Deserialize, Serialize};

use crate::types::triage::{Category, ConfidenceFactors, ResultSource};

/// Current step-log schema version
pub const STEP_SCHEMA_VERSION: u16 = 1;

/// Pipeline milestone
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StepAction {
    PipelineStarted,
    AgentClassified,
    KbRetrieved,
    DraftGenerated,
    DecisionComputed,
    PipelineCompleted,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineStartedMeta {
    pub trace_id: String,
    pub ticket_id: String,
    pub text_length: usize,
    pub kb_articles_count: usize,
    pub planned_steps: usize,
    pub execution_plan: Vec<String>,
    pub estimated_total_duration_ms: u64,
    pub started_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassifiedMeta {
    pub predicted_category: Category,
    pub confidence: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<String>,
    pub source: ResultSource,
    pub processing_time_ms: f64,
    pub text_analyzed: String,
    pub plan_step: String,
    pub step_completed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetrievedMeta {
    pub article_ids: Vec<String>,
    pub search_query: String,
    pub retrieval_scores: Vec<f64>,
    pub max_score: f64,
    pub min_score: f64,
    pub avg_score: f64,
    pub score_variance: f64,
    pub high_quality_matches: usize,
    pub match_consistency: f64,
    pub search_strategy: String,
    pub processing_time_ms: f64,
    pub plan_step: String,
    pub step_completed: bool,
}

/// Presence of each structural element checked in a draft
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormattingChecks {
    pub has_greeting: bool,
    pub has_numbered_list: bool,
    pub has_bold_formatting: bool,
    pub has_note_section: bool,
    pub has_closing: bool,
    pub has_citation: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftedMeta {
    pub draft_length: usize,
    pub citations_count: usize,
    pub citation_ids: Vec<String>,
    pub source: ResultSource,
    pub word_count: usize,
    pub line_count: usize,
    pub quality_score: f64,
    pub formatting_checks: FormattingChecks,
    pub processing_time_ms: f64,
    pub plan_step: String,
    pub step_completed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecisionMeta {
    pub original_confidence: f64,
    pub final_confidence: f64,
    pub confidence_factors: ConfidenceFactors,
    pub retrieval_quality: f64,
    pub draft_quality: f64,
    pub auto_close_eligible: bool,
    pub total_processing_time_ms: f64,
    pub decision_processing_time_ms: f64,
    pub plan_step: String,
    pub step_completed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletedMeta {
    pub final_confidence: f64,
    pub total_steps: usize,
    pub success: bool,
    pub execution_time_ms: f64,
    pub all_steps_completed: bool,
}

/// Milestone metadata, one variant per action
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StepMeta {
    PipelineStarted(PipelineStartedMeta),
    Classified(ClassifiedMeta),
    Retrieved(RetrievedMeta),
    Drafted(DraftedMeta),
    Decision(DecisionMeta),
    Completed(CompletedMeta),
}

impl StepMeta {
    pub fn action(&self) -> StepAction {
        match self {
            StepMeta::PipelineStarted(_) => StepAction::PipelineStarted,
            StepMeta::Classified(_) => StepAction::AgentClassified,
            StepMeta::Retrieved(_) => StepAction::KbRetrieved,
            StepMeta::Drafted(_) => StepAction::DraftGenerated,
            StepMeta::Decision(_) => StepAction::DecisionComputed,
            StepMeta::Completed(_) => StepAction::PipelineCompleted,
        }
    }
}

/// One audit-trail entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepLog {
    pub version: u16,
    pub action: StepAction,
    pub meta: StepMeta,
}

impl From<StepMeta> for StepLog {
    fn from(meta: StepMeta) -> Self {
        Self {
            version: STEP_SCHEMA_VERSION,
            action: meta.action(),
            meta,
        }
    }
}
