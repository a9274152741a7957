//! Execution planning for the triage pipeline
//!
//! A plan is advisory: it fixes the step order and the retrieval limit,
//! and its estimates are reported but never enforced.

pub mod planner;
pub mod types;

pub use planner::TriagePlanner;
pub use types::{ExecutionPlan, PlanStep, Priority, SearchStrategy, StepKind};
