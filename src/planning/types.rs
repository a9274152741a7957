//! Execution plan data structures

use serde::{Deserialize, Serialize};

/// Pipeline stage covered by a plan step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepKind {
    Classification,
    Retrieval,
    Drafting,
    Decision,
}

impl StepKind {
    /// Execution order
    pub const ORDER: [StepKind; 4] = [
        StepKind::Classification,
        StepKind::Retrieval,
        StepKind::Drafting,
        StepKind::Decision,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StepKind::Classification => "classification",
            StepKind::Retrieval => "retrieval",
            StepKind::Drafting => "drafting",
            StepKind::Decision => "decision",
        }
    }

    /// Action label reported in the plan
    pub fn action(&self) -> &'static str {
        match self {
            StepKind::Classification => "classify_ticket",
            StepKind::Retrieval => "search_knowledge_base",
            StepKind::Drafting => "generate_response",
            StepKind::Decision => "compute_confidence_score",
        }
    }

    /// Milestone reported once this step finishes
    pub fn completion_marker(&self) -> &'static str {
        match self {
            StepKind::Classification => "classification_complete",
            StepKind::Retrieval => "retrieval_complete",
            StepKind::Drafting => "drafting_complete",
            StepKind::Decision => "decision_complete",
        }
    }
}

/// Step priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Medium,
    High,
    Critical,
}

/// Retrieval breadth chosen from the ticket size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchStrategy {
    /// Short tickets: configured article limit
    Focused,
    /// Long tickets: widened article limit
    Comprehensive,
}

impl SearchStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchStrategy::Focused => "focused",
            SearchStrategy::Comprehensive => "comprehensive",
        }
    }
}

/// Individual step in a plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanStep {
    pub step: StepKind,

    pub action: String,

    pub priority: Priority,

    /// Advisory only; never enforced
    pub estimated_duration_ms: u64,

    /// Milestones that must be reached before this step runs
    pub requirements: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_articles: Option<usize>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_strategy: Option<SearchStrategy>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_style: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub decision_factors: Vec<String>,
}

impl PlanStep {
    pub fn new(step: StepKind, priority: Priority, estimated_duration_ms: u64) -> Self {
        Self {
            step,
            action: step.action().to_string(),
            priority,
            estimated_duration_ms,
            requirements: Vec::new(),
            max_articles: None,
            search_strategy: None,
            response_style: None,
            decision_factors: Vec::new(),
        }
    }

    pub fn requires<I, S>(mut self, requirements: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.requirements = requirements.into_iter().map(Into::into).collect();
        self
    }

    /// Position label used in step logs, e.g. "retrieval"
    pub fn label(&self) -> &'static str {
        self.step.as_str()
    }
}

/// Ordered plan for one ticket
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionPlan {
    pub steps: Vec<PlanStep>,
}

impl ExecutionPlan {
    pub fn step(&self, kind: StepKind) -> Option<&PlanStep> {
        self.steps.iter().find(|s| s.step == kind)
    }

    /// Step names in execution order
    pub fn step_names(&self) -> Vec<String> {
        self.steps.iter().map(|s| s.label().to_string()).collect()
    }

    pub fn estimated_total_duration_ms(&self) -> u64 {
        self.steps.iter().map(|s| s.estimated_duration_ms).sum()
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Article limit for retrieval, if planned
    pub fn max_articles(&self) -> Option<usize> {
        self.step(StepKind::Retrieval).and_then(|s| s.max_articles)
    }

    pub fn search_strategy(&self) -> SearchStrategy {
        self.step(StepKind::Retrieval)
            .and_then(|s| s.search_strategy)
            .unwrap_or(SearchStrategy::Focused)
    }
}
