//! Ticket execution planner
//!
//! Builds the four-step plan the orchestrator follows. Estimates depend on
//! the operating mode; retrieval breadth depends on the ticket length.

use crate::planning::types::{ExecutionPlan, PlanStep, Priority, SearchStrategy, StepKind};
use crate::types::Ticket;

/// Ticket text length (chars) above which retrieval widens
pub const LONG_TICKET_CHARS: usize = 500;
/// Upper bound on the widened article limit
pub const COMPREHENSIVE_MAX_ARTICLES: usize = 5;
const COMPREHENSIVE_EXTRA_ARTICLES: usize = 2;

pub const RESPONSE_STYLE: &str = "professional_helpful";
pub const DECISION_FACTORS: [&str; 3] = [
    "classification_confidence",
    "retrieval_quality",
    "response_completeness",
];

/// Builds execution plans for one configuration
#[derive(Debug, Clone, Copy)]
pub struct TriagePlanner {
    stub_mode: bool,
    max_articles: usize,
}

impl TriagePlanner {
    pub fn new(stub_mode: bool, max_articles: usize) -> Self {
        Self {
            stub_mode,
            max_articles,
        }
    }

    /// Plan the classification, retrieval, drafting, decision sequence
    pub fn plan(&self, ticket: &Ticket) -> ExecutionPlan {
        let text_length = ticket.text().chars().count();
        let (strategy, max_articles) = self.retrieval_breadth(text_length);

        let (classify_ms, draft_ms) = if self.stub_mode { (500, 1000) } else { (2000, 3000) };

        let classification = PlanStep::new(StepKind::Classification, Priority::High, classify_ms)
            .requires(["text_analysis"]);

        let mut retrieval = PlanStep::new(StepKind::Retrieval, Priority::High, 200)
            .requires([StepKind::Classification.completion_marker()]);
        retrieval.max_articles = Some(max_articles);
        retrieval.search_strategy = Some(strategy);

        let mut drafting = PlanStep::new(StepKind::Drafting, Priority::Medium, draft_ms).requires([
            StepKind::Classification.completion_marker(),
            StepKind::Retrieval.completion_marker(),
        ]);
        drafting.response_style = Some(RESPONSE_STYLE.to_string());

        let mut decision = PlanStep::new(StepKind::Decision, Priority::Critical, 100).requires([
            StepKind::Classification.completion_marker(),
            StepKind::Retrieval.completion_marker(),
            StepKind::Drafting.completion_marker(),
        ]);
        decision.decision_factors = DECISION_FACTORS.iter().map(|f| f.to_string()).collect();

        ExecutionPlan {
            steps: vec![classification, retrieval, drafting, decision],
        }
    }

    fn retrieval_breadth(&self, text_length: usize) -> (SearchStrategy, usize) {
        if text_length > LONG_TICKET_CHARS {
            let widened = (self.max_articles + COMPREHENSIVE_EXTRA_ARTICLES).min(COMPREHENSIVE_MAX_ARTICLES);
            (SearchStrategy::Comprehensive, widened)
        } else {
            (SearchStrategy::Focused, self.max_articles)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ticket(description: &str) -> Ticket {
        Ticket {
            id: "T-1".to_string(),
            title: "Refund".to_string(),
            description: description.to_string(),
        }
    }

    #[test]
    fn test_plan_has_four_ordered_steps() {
        let plan = TriagePlanner::new(true, 3).plan(&ticket("Please refund me"));
        let kinds: Vec<StepKind> = plan.steps.iter().map(|s| s.step).collect();
        assert_eq!(kinds, StepKind::ORDER.to_vec());
        assert_eq!(
            plan.steps[3].requirements,
            vec!["classification_complete", "retrieval_complete", "drafting_complete"]
        );
        assert_eq!(plan.steps[3].decision_factors.len(), 3);
        assert_eq!(plan.steps[2].response_style.as_deref(), Some(RESPONSE_STYLE));
    }

    #[test]
    fn test_estimates_follow_mode() {
        let stub = TriagePlanner::new(true, 3).plan(&ticket("x"));
        assert_eq!(stub.estimated_total_duration_ms(), 500 + 200 + 1000 + 100);

        let model = TriagePlanner::new(false, 3).plan(&ticket("x"));
        assert_eq!(model.estimated_total_duration_ms(), 2000 + 200 + 3000 + 100);
    }

    #[test]
    fn test_short_ticket_is_focused() {
        let plan = TriagePlanner::new(true, 3).plan(&ticket("short text"));
        assert_eq!(plan.search_strategy(), SearchStrategy::Focused);
        assert_eq!(plan.max_articles(), Some(3));
    }

    #[test]
    fn test_long_ticket_widens_retrieval() {
        let long = "a".repeat(600);
        let plan = TriagePlanner::new(true, 2).plan(&ticket(&long));
        assert_eq!(plan.search_strategy(), SearchStrategy::Comprehensive);
        assert_eq!(plan.max_articles(), Some(4));

        let capped = TriagePlanner::new(true, 4).plan(&ticket(&long));
        assert_eq!(capped.max_articles(), Some(COMPREHENSIVE_MAX_ARTICLES));
    }

    #[test]
    fn test_length_boundary() {
        // "Refund " + 493 chars = exactly 500
        let plan = TriagePlanner::new(true, 3).plan(&ticket(&"b".repeat(493)));
        assert_eq!(plan.search_strategy(), SearchStrategy::Focused);

        let plan = TriagePlanner::new(true, 3).plan(&ticket(&"b".repeat(494)));
        assert_eq!(plan.search_strategy(), SearchStrategy::Comprehensive);
    }
}
