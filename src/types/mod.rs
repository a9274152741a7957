//! Type definitions module
//!
//! Request, stage-result, response, and audit-trail types shared by the
//! pipeline components.

pub mod ticket;
pub mod triage;
pub mod steps;

// Re-export commonly used types
pub use ticket::{KbArticle, Ticket, TriageRequest};
pub use triage::{
    round_to, Category, ClassificationResult, ConfidenceFactors, DraftResult, ModelInfo,
    QualityMetrics, ResultSource, ScoredArticle, TriageResponse,
};
pub use steps::{FormattingChecks, StepAction, StepLog, StepMeta, STEP_SCHEMA_VERSION};
