//! Model-backed drafting
//!
//! The model writes the reply from the ticket and the full ranked articles.
//! Its output is then repaired by [`ensure_proper_formatting`] and its
//! citations verified against the supplied articles.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::drafter::templates::{citation_token, fallback_reply, NO_ARTICLE_REPLY};
use crate::drafter::{ensure_proper_formatting, extract_citations, Drafter};
use crate::errors::{Result, TriageError};
use crate::models::TextGenerator;
use crate::types::{DraftResult, ResultSource, ScoredArticle};

/// Drafter that asks a text generator, with template fallback
pub struct ModelDrafter {
    generator: Arc<dyn TextGenerator>,
}

impl ModelDrafter {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }

    async fn generate_reply(&self, text: &str, articles: &[ScoredArticle]) -> Result<String> {
        let prompt = build_prompt(text, articles);
        let raw = self.generator.generate(&prompt).await?;

        if raw.trim().is_empty() {
            return Err(TriageError::ModelOutput("empty draft".to_string()));
        }
        Ok(raw)
    }
}

#[async_trait]
impl Drafter for ModelDrafter {
    async fn draft(&self, text: &str, articles: &[ScoredArticle]) -> DraftResult {
        let Some(top) = articles.first() else {
            return DraftResult {
                reply: NO_ARTICLE_REPLY.to_string(),
                citations: Vec::new(),
                source: ResultSource::Heuristic,
            };
        };

        match self.generate_reply(text, articles).await {
            Ok(raw) => {
                let reply = ensure_proper_formatting(&raw, top.id());
                let citations = extract_citations(&reply, articles);
                debug!(citations = citations.len(), "Model draft formatted");
                DraftResult {
                    reply,
                    citations,
                    source: ResultSource::Model,
                }
            }
            Err(e) => {
                warn!(error = %e, "Model drafting failed, using fallback template");
                let reply = fallback_reply(&top.article);
                let citations = extract_citations(&reply, articles);
                DraftResult {
                    reply,
                    citations,
                    source: ResultSource::Fallback,
                }
            }
        }
    }

    fn name(&self) -> &'static str {
        "model"
    }
}

/// Build the drafting prompt. `articles` must not be empty.
pub fn build_prompt(text: &str, articles: &[ScoredArticle]) -> String {
    let knowledge = articles
        .iter()
        .map(|scored| {
            let article = &scored.article;
            let tags = if article.tags.is_empty() {
                "none".to_string()
            } else {
                article.tags.join(", ")
            };
            format!(
                "[Article #{}] {}\nTags: {}\n{}",
                article.id,
                article.title,
                tags,
                article.body.trim()
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n");

    let citation = articles
        .first()
        .map(|a| citation_token(a.id()))
        .unwrap_or_default();

    format!(
        r#"You are a professional customer support agent. Write a helpful reply to the ticket below using only the knowledge base articles provided.

**Ticket:**
{text}

**Knowledge base:**
{knowledge}

**Structure your reply exactly like this:**
1. A greeting line ("Hello,")
2. One sentence acknowledging the customer's issue
3. ONE continuous numbered list of concrete steps (1., 2., 3., ...). Do not repeat headers or restart numbering.
4. A line starting with "Note:" with one useful tip
5. A closing line containing {citation}
6. "Best regards," followed by "Customer Support Team"

Do not invent policies, links, or article numbers that are not listed above."#
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::KbArticle;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Scripted {
        reply: std::result::Result<String, String>,
        calls: AtomicUsize,
    }

    impl Scripted {
        fn new(reply: std::result::Result<&str, &str>) -> Arc<Self> {
            Arc::new(Self {
                reply: reply.map(str::to_string).map_err(str::to_string),
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl TextGenerator for Scripted {
        async fn generate(&self, _prompt: &str) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.reply.clone().map_err(TriageError::Generation)
        }

        fn model(&self) -> &str {
            "scripted"
        }
    }

    fn articles() -> Vec<ScoredArticle> {
        vec![
            ScoredArticle::new(
                KbArticle::new("kb001", "How to Request a Refund", "Open billing and click refund.")
                    .with_tags(["billing", "refund"]),
                14.0,
            ),
            ScoredArticle::new(KbArticle::new("kb002", "Payment Methods", "Cards and PayPal."), 3.0),
        ]
    }

    #[tokio::test]
    async fn test_no_articles_skips_model() {
        let generator = Scripted::new(Ok("should not be used"));
        let drafter = ModelDrafter::new(generator.clone());

        let draft = drafter.draft("help", &[]).await;
        assert_eq!(draft.reply, NO_ARTICLE_REPLY);
        assert!(draft.citations.is_empty());
        assert_eq!(generator.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_model_reply_is_repaired() {
        let generator = Scripted::new(Ok("1. Open billing\n2. Click refund\n\nNote: takes 5 days"));
        let drafter = ModelDrafter::new(generator);

        let draft = drafter.draft("refund", &articles()).await;
        assert!(draft.reply.starts_with("Hello,"));
        assert!(draft.reply.contains("[Article #kb001]"));
        assert!(draft.reply.ends_with("Customer Support Team"));
        assert_eq!(draft.citations, vec!["kb001"]);
        assert_eq!(draft.source, ResultSource::Model);
    }

    #[tokio::test]
    async fn test_model_citations_verified() {
        let raw = "Hello,\n\nSee [Article #kb002] and [Article #kb404].\n\nBased on [Article #kb001].\n\nBest regards,\nCustomer Support Team";
        let drafter = ModelDrafter::new(Scripted::new(Ok(raw)));

        let draft = drafter.draft("refund", &articles()).await;
        assert_eq!(draft.citations, vec!["kb002", "kb001"]);
    }

    #[tokio::test]
    async fn test_failure_uses_fallback_template() {
        let drafter = ModelDrafter::new(Scripted::new(Err("timeout")));

        let draft = drafter.draft("refund", &articles()).await;
        assert_eq!(draft.source, ResultSource::Fallback);
        assert_eq!(draft.citations, vec!["kb001"]);
        assert!(draft.reply.contains("How to Request a Refund"));
    }

    #[tokio::test]
    async fn test_blank_output_uses_fallback_template() {
        let drafter = ModelDrafter::new(Scripted::new(Ok("   \n ")));
        let draft = drafter.draft("refund", &articles()).await;
        assert_eq!(draft.source, ResultSource::Fallback);
    }

    #[test]
    fn test_prompt_contains_full_articles() {
        let prompt = build_prompt("I want my money back", &articles());
        assert!(prompt.contains("I want my money back"));
        assert!(prompt.contains("Open billing and click refund."));
        assert!(prompt.contains("Tags: billing, refund"));
        assert!(prompt.contains("[Article #kb002] Payment Methods"));
        assert!(prompt.contains("A closing line containing [Article #kb001]"));
    }
}
