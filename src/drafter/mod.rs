//! Reply drafting
//!
//! Both strategies share the templates and the formatting repair in this
//! module, so every reply carries a greeting, a citation of a retrieved
//! article (when one exists), and the standard sign-off.

pub mod formatting;
pub mod heuristic;
pub mod model;
pub mod templates;

pub use formatting::{ensure_proper_formatting, extract_citations};
pub use heuristic::HeuristicDrafter;
pub use model::ModelDrafter;

use async_trait::async_trait;

use crate::types::{DraftResult, ScoredArticle};

/// Produces a customer-facing reply from ticket text and ranked articles.
///
/// `articles` is in rank order; the first entry is the top article.
/// Citations in the result are always a subset of the supplied ids.
#[async_trait]
pub trait Drafter: Send + Sync {
    async fn draft(&self, text: &str, articles: &[ScoredArticle]) -> DraftResult;

    /// Strategy name for logs
    fn name(&self) -> &'static str;
}
