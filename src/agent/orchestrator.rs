//! Triage pipeline orchestrator
//!
//! Runs one ticket through a fixed sequence:
//! - plan
//! - classify
//! - rank KB articles
//! - draft a reply
//! - decide confidence
//!
//! Every milestone is appended to the audit trail and emitted as a tracing
//! event inside a `triage` span.

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use tracing::{debug, info, Instrument};

use crate::classifier::{Classifier, HeuristicClassifier, ModelClassifier};
use crate::cli::config::Config;
use crate::decision::{DecisionEngine, DecisionInputs};
use crate::drafter::{Drafter, HeuristicDrafter, ModelDrafter};
use crate::errors::Result;
use crate::models::{OllamaClient, TextGenerator};
use crate::planning::{StepKind, TriagePlanner};
use crate::rag::{RelevanceEngine, SearchParams};
use crate::telemetry::AuditTrail;
use crate::types::steps::{
    ClassifiedMeta, CompletedMeta, DecisionMeta, DraftedMeta, PipelineStartedMeta, RetrievedMeta,
};
use crate::types::{
    round_to, ModelInfo, QualityMetrics, ScoredArticle, StepMeta, TriageRequest, TriageResponse,
};

/// Characters of ticket text echoed into step logs
const ECHO_CHARS: usize = 100;
/// Score at or above which a match counts as high quality
const HIGH_QUALITY_SCORE: f64 = 5.0;

pub const STUB_PROVIDER: &str = "stub";
pub const STUB_MODEL: &str = "deterministic-heuristic";
pub const OLLAMA_PROVIDER: &str = "ollama";

/// Provider metadata reported in every response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderInfo {
    pub provider: String,
    pub model: String,
}

impl ProviderInfo {
    pub fn new(provider: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            model: model.into(),
        }
    }
}

/// End-to-end triage pipeline
///
/// Immutable after construction and safe to share across requests.
pub struct TriagePipeline {
    config: Arc<Config>,
    classifier: Arc<dyn Classifier>,
    drafter: Arc<dyn Drafter>,
    relevance: RelevanceEngine,
    planner: TriagePlanner,
    decision: DecisionEngine,
    provider: ProviderInfo,
}

impl TriagePipeline {
    /// Build the pipeline with the strategies selected by configuration
    pub fn from_config(config: Arc<Config>) -> Result<Self> {
        if config.stub_mode() {
            return Ok(Self::with_components(
                config,
                Arc::new(HeuristicClassifier::new()),
                Arc::new(HeuristicDrafter::new()),
                ProviderInfo::new(STUB_PROVIDER, STUB_MODEL),
            ));
        }

        let client = OllamaClient::with_config(&config.ollama_url(), &config.provider.model)?;
        let generator: Arc<dyn TextGenerator> = Arc::new(client);
        let provider = ProviderInfo::new(OLLAMA_PROVIDER, generator.model());

        Ok(Self::with_components(
            config,
            Arc::new(ModelClassifier::new(generator.clone())),
            Arc::new(ModelDrafter::new(generator)),
            provider,
        ))
    }

    /// Build the pipeline around explicit strategies
    pub fn with_components(
        config: Arc<Config>,
        classifier: Arc<dyn Classifier>,
        drafter: Arc<dyn Drafter>,
        provider: ProviderInfo,
    ) -> Self {
        let relevance = RelevanceEngine::with_params(SearchParams::from(&config.retrieval));
        let planner = TriagePlanner::new(config.stub_mode(), config.retrieval.max_articles);
        let decision = DecisionEngine::from_config(&config.drafting, &config.decision);

        Self {
            config,
            classifier,
            drafter,
            relevance,
            planner,
            decision,
            provider,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn provider(&self) -> &ProviderInfo {
        &self.provider
    }

    /// Triage one ticket.
    ///
    /// Fails only on an invalid request; model failures degrade to the
    /// heuristic strategies and are reported through the step logs.
    pub async fn run(&self, request: &TriageRequest) -> Result<TriageResponse> {
        request.validate()?;

        let span = tracing::info_span!(
            "triage",
            trace_id = %request.trace_id,
            ticket_id = %request.ticket.id
        );
        self.execute(request).instrument(span).await
    }

    async fn execute(&self, request: &TriageRequest) -> Result<TriageResponse> {
        let mut trail = AuditTrail::new();
        let text = request.ticket.text();
        let kb = &request.kb;

        // Plan
        let plan = self.planner.plan(&request.ticket);
        trail.record(StepMeta::PipelineStarted(PipelineStartedMeta {
            trace_id: request.trace_id.clone(),
            ticket_id: request.ticket.id.clone(),
            text_length: text.chars().count(),
            kb_articles_count: kb.len(),
            planned_steps: plan.len(),
            execution_plan: plan.step_names(),
            estimated_total_duration_ms: plan.estimated_total_duration_ms(),
            started_at: Utc::now().to_rfc3339(),
        }));

        // Classify
        let started = Instant::now();
        let classification = self.classifier.classify(&text).await;
        trail.record(StepMeta::Classified(ClassifiedMeta {
            predicted_category: classification.category,
            confidence: classification.confidence,
            reasoning: classification.reasoning.clone(),
            source: classification.source,
            processing_time_ms: elapsed_ms(started),
            text_analyzed: echo(&text),
            plan_step: StepKind::Classification.as_str().to_string(),
            step_completed: true,
        }));
        debug!(classifier = self.classifier.name(), category = %classification.category, "Classified");

        // Rank
        let started = Instant::now();
        let limit = plan.max_articles().unwrap_or(self.config.retrieval.max_articles);
        let ranked = self.relevance.rank(&text, kb, limit);
        trail.record(StepMeta::Retrieved(retrieved_meta(
            &ranked,
            echo(&text),
            plan.search_strategy().as_str(),
            elapsed_ms(started),
        )));

        // Draft
        let started = Instant::now();
        let draft = self.drafter.draft(&text, &ranked).await;
        let drafting_ms = elapsed_ms(started);
        let assessment = self.decision.assess_draft(&draft);
        trail.record(StepMeta::Drafted(DraftedMeta {
            draft_length: draft.reply.chars().count(),
            citations_count: draft.citations.len(),
            citation_ids: draft.citations.clone(),
            source: draft.source,
            word_count: assessment.word_count,
            line_count: draft.reply.split('\n').count(),
            quality_score: round_to(assessment.score, 3),
            formatting_checks: assessment.checks,
            processing_time_ms: drafting_ms,
            plan_step: StepKind::Drafting.as_str().to_string(),
            step_completed: true,
        }));
        debug!(drafter = self.drafter.name(), citations = draft.citations.len(), "Drafted");

        // Decide
        let started = Instant::now();
        let decision = self.decision.decide(DecisionInputs {
            classification: &classification,
            ranked: &ranked,
            draft: &draft,
            kb_size: kb.len(),
            ticket_word_count: text.split_whitespace().count(),
        });
        let best_score = round_to(ranked.first().map(|a| a.score).unwrap_or(0.0), 3);
        let total_ms = round_to(trail.elapsed_ms(), 2);
        trail.record(StepMeta::Decision(DecisionMeta {
            original_confidence: decision.original_confidence,
            final_confidence: decision.final_confidence,
            confidence_factors: decision.factors,
            retrieval_quality: best_score,
            draft_quality: round_to(decision.draft_assessment.score, 3),
            auto_close_eligible: decision.auto_close_eligible,
            total_processing_time_ms: total_ms,
            decision_processing_time_ms: elapsed_ms(started),
            plan_step: StepKind::Decision.as_str().to_string(),
            step_completed: true,
        }));

        trail.record(StepMeta::Completed(CompletedMeta {
            final_confidence: decision.final_confidence,
            total_steps: trail.len() + 1,
            success: true,
            execution_time_ms: total_ms,
            all_steps_completed: true,
        }));

        info!(
            category = %classification.category,
            confidence = decision.final_confidence,
            auto_close = decision.auto_close_eligible,
            "Triage completed"
        );

        let quality = QualityMetrics {
            retrieval_quality: best_score,
            draft_quality: round_to(decision.draft_assessment.score, 3),
            citation_count: draft.citations.len(),
            response_length: draft.reply.chars().count(),
            kb_coverage: round_to(ranked.len() as f64 / kb.len().max(1) as f64, 3),
        };

        let model_info = ModelInfo {
            provider: self.provider.provider.clone(),
            model: self.provider.model.clone(),
            prompt_version: self.config.provider.prompt_version.clone(),
            stub_mode: self.config.stub_mode(),
            total_processing_time_ms: total_ms,
            execution_plan: plan,
        };

        Ok(TriageResponse {
            predicted_category: classification.category,
            draft_reply: draft.reply,
            citations: draft.citations,
            confidence: decision.final_confidence,
            original_confidence: decision.original_confidence,
            confidence_factors: decision.factors,
            auto_close_eligible: decision.auto_close_eligible,
            model_info,
            step_logs: trail.into_steps(),
            quality,
        })
    }
}

/// Retrieval statistics for the step log
fn retrieved_meta(
    ranked: &[ScoredArticle],
    search_query: String,
    search_strategy: &str,
    processing_time_ms: f64,
) -> RetrievedMeta {
    let scores: Vec<f64> = ranked.iter().map(|a| a.score).collect();
    let count = scores.len();

    let (max, min, avg) = if count == 0 {
        (0.0, 0.0, 0.0)
    } else {
        let max = scores.iter().copied().fold(f64::MIN, f64::max);
        let min = scores.iter().copied().fold(f64::MAX, f64::min);
        (max, min, scores.iter().sum::<f64>() / count as f64)
    };

    // Population variance; zero below two samples
    let variance = if count < 2 {
        0.0
    } else {
        scores.iter().map(|s| (s - avg).powi(2)).sum::<f64>() / count as f64
    };

    RetrievedMeta {
        article_ids: ranked.iter().map(|a| a.id().to_string()).collect(),
        search_query,
        retrieval_scores: scores.iter().map(|s| round_to(*s, 3)).collect(),
        max_score: round_to(max, 3),
        min_score: round_to(min, 3),
        avg_score: round_to(avg, 3),
        score_variance: round_to(variance, 3),
        high_quality_matches: scores.iter().filter(|s| **s >= HIGH_QUALITY_SCORE).count(),
        match_consistency: round_to(1.0 - variance / (avg + 1.0), 3),
        search_strategy: search_strategy.to_string(),
        processing_time_ms,
        plan_step: StepKind::Retrieval.as_str().to_string(),
        step_completed: true,
    }
}

/// First 100 characters, with "..." when truncated
fn echo(text: &str) -> String {
    if text.chars().count() > ECHO_CHARS {
        format!("{}...", text.chars().take(ECHO_CHARS).collect::<String>())
    } else {
        text.to_string()
    }
}

fn elapsed_ms(started: Instant) -> f64 {
    round_to(started.elapsed().as_secs_f64() * 1000.0, 2)
}
