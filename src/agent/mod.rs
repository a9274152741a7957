//! Agent orchestration module
//!
//! The triage pipeline that drives classification, retrieval, drafting,
//! and the confidence decision for one ticket.

pub mod orchestrator;

pub use orchestrator::{ProviderInfo, TriagePipeline};
