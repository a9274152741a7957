//! TriageBuddy v0.5.0 - Support Ticket Triage
//!
//! Classifies a support ticket, ranks the caller's knowledge-base articles,
//! drafts a cited reply, and computes a calibrated confidence that gates
//! auto-close.
//!
//! # Architecture
//!
//! - **Classifier**: heuristic or model-backed category prediction
//! - **Relevance**: hybrid keyword/semantic article ranking
//! - **Drafter**: formatted, citation-verified replies
//! - **Decision**: multi-factor confidence with boosts and penalties
//! - **Agent**: planned pipeline with an append-only audit trail

pub mod errors;
pub mod types;

pub mod cli;
pub mod models;
pub mod telemetry;

pub mod classifier;
pub mod decision;
pub mod drafter;
pub mod planning;
pub mod rag;

pub mod agent;
pub mod server;

// Re-export commonly used types
pub use agent::TriagePipeline;
pub use cli::Config;
pub use errors::{Result, TriageError};
pub use types::{KbArticle, Ticket, TriageRequest, TriageResponse};
