//! Model-backed ticket classification
//!
//! Prompts the text generator for `Category:` / `Confidence:` / `Reasoning:`
//! lines. A failed call or a response without a category falls back to the
//! heuristic classifier, so classification never fails the pipeline.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::warn;

use crate::classifier::{Classifier, HeuristicClassifier};
use crate::errors::{Result, TriageError};
use crate::models::TextGenerator;
use crate::types::{round_to, Category, ClassificationResult, ResultSource};

/// Confidence used when the model's value is missing or unreadable
pub const DEFAULT_MODEL_CONFIDENCE: f64 = 0.5;
const MAX_REASONING_CHARS: usize = 200;

/// Classifier that asks a text generator, with heuristic fallback
pub struct ModelClassifier {
    generator: Arc<dyn TextGenerator>,
    fallback: HeuristicClassifier,
}

impl ModelClassifier {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self {
            generator,
            fallback: HeuristicClassifier::new(),
        }
    }
}

#[async_trait]
impl Classifier for ModelClassifier {
    async fn classify(&self, text: &str) -> ClassificationResult {
        let prompt = build_prompt(text);

        let outcome = match self.generator.generate(&prompt).await {
            Ok(raw) => parse_response(&raw),
            Err(e) => Err(e),
        };

        match outcome {
            Ok(result) => result,
            Err(e) => {
                warn!(error = %e, "Model classification failed, using heuristic");
                self.fallback.classify_text(text).into_fallback()
            }
        }
    }

    fn name(&self) -> &'static str {
        "model"
    }
}

/// Build the classification prompt
pub fn build_prompt(text: &str) -> String {
    format!(
        r#"You are an expert customer support ticket classifier. Classify the ticket below into exactly one category.

**Categories:**
- billing: payments, refunds, invoices, charges, subscriptions, pricing
- tech: bugs, errors, login or authentication failures, crashes, performance
- shipping: delivery problems, package tracking, shipment delays, couriers, items not received
- other: general questions, feature requests, feedback, anything else

If several categories apply, choose the most prominent one. Rate your confidence by how clear the indicators are.

**Ticket:**
{text}

**Respond with exactly these lines:**
Category: [billing|tech|shipping|other]
Confidence: [0.0-1.0]
Reasoning: [one sentence]"#
    )
}

/// Parse the model's reply.
///
/// A missing `Category:` line is an error; a missing or unreadable
/// `Confidence:` value defaults to 0.5.
pub fn parse_response(raw: &str) -> Result<ClassificationResult> {
    let mut category = None;
    let mut confidence = None;
    let mut reasoning = None;

    for line in raw.lines() {
        if let Some(value) = field_value(line, "category") {
            category.get_or_insert_with(|| Category::from_label(value));
        } else if let Some(value) = field_value(line, "confidence") {
            confidence.get_or_insert(parse_confidence(value));
        } else if let Some(value) = field_value(line, "reasoning") {
            if !value.is_empty() {
                reasoning.get_or_insert_with(|| value.chars().take(MAX_REASONING_CHARS).collect::<String>());
            }
        }
    }

    let category = category
        .ok_or_else(|| TriageError::ModelOutput("response has no Category line".to_string()))?;
    let confidence = confidence.flatten().unwrap_or(DEFAULT_MODEL_CONFIDENCE);

    Ok(ClassificationResult {
        category,
        confidence: round_to(confidence.clamp(0.0, 1.0), 2),
        reasoning,
        source: ResultSource::Model,
    })
}

/// Parse a decimal ("0.8"), percentage ("80%"), or fraction ("8/10")
pub fn parse_confidence(value: &str) -> Option<f64> {
    let token = value
        .split_whitespace()
        .next()?
        .trim_matches(|c: char| c == '[' || c == ']' || c == '(' || c == ')' || c == ',')
        .trim_end_matches('.');

    let parsed = if let Some(percent) = token.strip_suffix('%') {
        percent.trim().parse::<f64>().ok()? / 100.0
    } else if let Some((num, den)) = token.split_once('/') {
        let num: f64 = num.trim().parse().ok()?;
        let den: f64 = den.trim().parse().ok()?;
        if den == 0.0 {
            return None;
        }
        num / den
    } else {
        token.parse::<f64>().ok()?
    };

    parsed.is_finite().then_some(parsed)
}

/// Value of a `Name: value` line, tolerating markdown emphasis and bullets
fn field_value<'a>(line: &'a str, name: &str) -> Option<&'a str> {
    let trimmed = line
        .trim()
        .trim_start_matches(|c: char| c == '-' || c == '#' || c == '*' || c.is_whitespace());
    let (key, value) = trimmed.split_once(':')?;
    let key = key.trim_end_matches('*').trim();

    if key.eq_ignore_ascii_case(name) {
        Some(value.trim().trim_start_matches('*').trim())
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Scripted(std::result::Result<String, String>);

    #[async_trait]
    impl TextGenerator for Scripted {
        async fn generate(&self, _prompt: &str) -> Result<String> {
            self.0.clone().map_err(TriageError::Generation)
        }

        fn model(&self) -> &str {
            "scripted"
        }
    }

    #[test]
    fn test_parse_confidence_formats() {
        assert_eq!(parse_confidence("0.8"), Some(0.8));
        assert_eq!(parse_confidence("80%"), Some(0.8));
        assert_eq!(parse_confidence("8/10"), Some(0.8));
        assert_eq!(parse_confidence("0.9 (high)"), Some(0.9));
        assert_eq!(parse_confidence("high"), None);
        assert_eq!(parse_confidence("3/0"), None);
        assert_eq!(parse_confidence(""), None);
    }

    #[test]
    fn test_parse_response() {
        let raw = "Category: billing\nConfidence: 85%\nReasoning: Mentions a refund.";
        let result = parse_response(raw).unwrap();
        assert_eq!(result.category, Category::Billing);
        assert_eq!(result.confidence, 0.85);
        assert_eq!(result.reasoning.as_deref(), Some("Mentions a refund."));
        assert_eq!(result.source, ResultSource::Model);
    }

    #[test]
    fn test_parse_response_markdown_and_synonym() {
        let raw = "**Category:** Technical\n**Confidence:** 0.7";
        let result = parse_response(raw).unwrap();
        assert_eq!(result.category, Category::Tech);
        assert_eq!(result.confidence, 0.7);
        assert!(result.reasoning.is_none());
    }

    #[test]
    fn test_parse_response_defaults_bad_confidence() {
        let result = parse_response("Category: shipping\nConfidence: very sure").unwrap();
        assert_eq!(result.confidence, DEFAULT_MODEL_CONFIDENCE);
    }

    #[test]
    fn test_parse_response_clamps_confidence() {
        let result = parse_response("Category: tech\nConfidence: 150%").unwrap();
        assert_eq!(result.confidence, 1.0);
    }

    #[test]
    fn test_unknown_label_is_other() {
        let result = parse_response("Category: feature request").unwrap();
        assert_eq!(result.category, Category::Other);
    }

    #[test]
    fn test_missing_category_is_error() {
        assert!(parse_response("I think this is about money.").is_err());
    }

    #[test]
    fn test_reasoning_truncated() {
        let raw = format!("Category: billing\nReasoning: {}", "x".repeat(500));
        let result = parse_response(&raw).unwrap();
        assert_eq!(result.reasoning.unwrap().chars().count(), MAX_REASONING_CHARS);
    }

    #[test]
    fn test_prompt_embeds_ticket() {
        let prompt = build_prompt("My invoice is wrong");
        assert!(prompt.contains("My invoice is wrong"));
        assert!(prompt.contains("Category:"));
    }

    #[tokio::test]
    async fn test_model_result_used() {
        let generator = Arc::new(Scripted(Ok("Category: shipping\nConfidence: 0.9".to_string())));
        let classifier = ModelClassifier::new(generator);
        let result = classifier.classify("Where is my parcel?").await;
        assert_eq!(result.category, Category::Shipping);
        assert_eq!(result.source, ResultSource::Model);
    }

    #[tokio::test]
    async fn test_call_failure_falls_back_to_heuristic() {
        let text = "I need a refund for the duplicate charge on my invoice";
        let generator = Arc::new(Scripted(Err("connection refused".to_string())));
        let classifier = ModelClassifier::new(generator);

        let result = classifier.classify(text).await;
        let expected = HeuristicClassifier::new().classify_text(text);
        assert_eq!(result.category, expected.category);
        assert_eq!(result.confidence, expected.confidence);
        assert_eq!(result.source, ResultSource::Fallback);
    }

    #[tokio::test]
    async fn test_unparsable_output_falls_back() {
        let generator = Arc::new(Scripted(Ok("no idea".to_string())));
        let classifier = ModelClassifier::new(generator);
        let result = classifier.classify("Hello there").await;
        assert_eq!(result.category, Category::Other);
        assert_eq!(result.source, ResultSource::Fallback);
    }
}
