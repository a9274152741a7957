//! Confidence decision engine

pub mod engine;

pub use engine::{
    coverage_quality, formatting_checks, retrieval_quality, Decision, DecisionEngine,
    DecisionInputs, DraftAssessment, CONFIDENCE_CEILING, CONFIDENCE_FLOOR,
};
