//! Template-based drafting

use async_trait::async_trait;

use crate::drafter::templates::{heuristic_reply, NO_ARTICLE_REPLY};
use crate::drafter::{extract_citations, Drafter};
use crate::types::{DraftResult, ResultSource, ScoredArticle};

/// Deterministic drafter built from fixed templates
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicDrafter;

impl HeuristicDrafter {
    pub fn new() -> Self {
        Self
    }

    pub fn draft_text(&self, text: &str, articles: &[ScoredArticle]) -> DraftResult {
        let Some(top) = articles.first() else {
            return DraftResult {
                reply: NO_ARTICLE_REPLY.to_string(),
                citations: Vec::new(),
                source: ResultSource::Heuristic,
            };
        };

        let reply = heuristic_reply(text, &top.article);
        let citations = extract_citations(&reply, articles);

        DraftResult {
            reply,
            citations,
            source: ResultSource::Heuristic,
        }
    }
}

#[async_trait]
impl Drafter for HeuristicDrafter {
    async fn draft(&self, text: &str, articles: &[ScoredArticle]) -> DraftResult {
        self.draft_text(text, articles)
    }

    fn name(&self) -> &'static str {
        "heuristic"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::KbArticle;

    #[test]
    fn test_no_articles_uses_generic_reply() {
        let draft = HeuristicDrafter::new().draft_text("anything", &[]);
        assert_eq!(draft.reply, NO_ARTICLE_REPLY);
        assert!(draft.citations.is_empty());
    }

    #[test]
    fn test_cites_top_article() {
        let articles = vec![
            ScoredArticle::new(KbArticle::new("kb001", "How to Request a Refund", "Go to billing."), 12.0),
            ScoredArticle::new(KbArticle::new("kb002", "Update Card", "Open settings."), 4.0),
        ];
        let draft = HeuristicDrafter::new().draft_text("I need a refund", &articles);
        assert_eq!(draft.citations, vec!["kb001"]);
        assert!(draft.reply.contains("[Article #kb001]"));
        assert_eq!(draft.source, ResultSource::Heuristic);
    }
}
