//! Ticket classification
//!
//! Two interchangeable strategies behind the [`Classifier`] trait:
//! - [`HeuristicClassifier`]: weighted keyword scoring
//! - [`ModelClassifier`]: text-generation prompt with heuristic fallback

pub mod heuristic;
pub mod model;

pub use heuristic::{CategoryScores, HeuristicClassifier};
pub use model::ModelClassifier;

use async_trait::async_trait;

use crate::types::ClassificationResult;

/// Maps ticket text to a category and confidence.
///
/// Implementations never fail: confidence is always in [0, 1] and the
/// category is always one of the fixed four.
#[async_trait]
pub trait Classifier: Send + Sync {
    async fn classify(&self, text: &str) -> ClassificationResult;

    /// Strategy name for logs
    fn name(&self) -> &'static str;
}
