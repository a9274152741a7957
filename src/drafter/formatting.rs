//! Reply structure enforcement and citation extraction
//!
//! Generated replies are repaired rather than rejected: a missing greeting
//! is inserted, and a missing citation or sign-off replaces the trailing
//! closing lines with the canonical closing block.

use std::sync::OnceLock;

use regex::Regex;

use crate::drafter::templates::{citation_token, closing_block, GREETINGS, SIGNATURE, SIGN_OFFS};
use crate::types::ScoredArticle;

/// How many trailing non-blank lines are searched for a sign-off
const CLOSING_WINDOW: usize = 3;

/// Lines treated as partial closings and stripped before the canonical block
const PARTIAL_CLOSINGS: [&str; 7] = [
    "best regards",
    "sincerely",
    "thank you",
    "thanks",
    "regards",
    "kind regards",
    "customer support team",
];

/// Whether a line opens with a recognised greeting word
pub fn is_greeting(line: &str) -> bool {
    let line = line.trim_start();
    GREETINGS.iter().any(|greeting| {
        line.strip_prefix(greeting)
            .map(|rest| !rest.starts_with(|c: char| c.is_alphanumeric()))
            .unwrap_or(false)
    })
}

/// Repair greeting and closing of a generated reply
pub fn ensure_proper_formatting(reply: &str, top_article_id: &str) -> String {
    let mut lines: Vec<String> = reply.trim().lines().map(|l| l.trim_end().to_string()).collect();

    let has_greeting = lines.first().map(|l| is_greeting(l)).unwrap_or(false);
    if !has_greeting {
        lines.insert(0, "Hello,".to_string());
        lines.insert(1, String::new());
    }

    let has_citation = reply.contains(&citation_token(top_article_id));
    let has_closing = lines
        .iter()
        .rev()
        .filter(|l| !l.trim().is_empty())
        .take(CLOSING_WINDOW)
        .any(|l| SIGN_OFFS.iter().any(|s| l.contains(s)));

    if !has_citation || !has_closing {
        // Drop an existing sign-off and anything signed under it
        let window_start = lines
            .iter()
            .enumerate()
            .rev()
            .filter(|(_, l)| !l.trim().is_empty())
            .take(CLOSING_WINDOW)
            .last()
            .map(|(i, _)| i);
        if let Some(start) = window_start {
            let sign_off = (start..lines.len())
                .find(|&i| !lines[i].trim().is_empty() && is_partial_closing(&lines[i]));
            if let Some(pos) = sign_off {
                lines.truncate(pos);
            }
        }
        while lines.last().map(|l| is_partial_closing(l)).unwrap_or(false) {
            lines.pop();
        }
        lines.extend(closing_block(top_article_id));
    }

    lines.join("\n")
}

fn is_partial_closing(line: &str) -> bool {
    let normalized = line
        .trim()
        .trim_end_matches(|c: char| c == ',' || c == '.' || c == '!')
        .to_lowercase();

    normalized.is_empty()
        || normalized == SIGNATURE.to_lowercase()
        || PARTIAL_CLOSINGS.contains(&normalized.as_str())
}

fn citation_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    // Covers "Article #ID", "[Article #ID]" and "[#ID]"
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)(?:article\s*#|\[#)([\w-]+)").expect("citation pattern is valid")
    })
}

/// Article ids referenced in the reply, verified against the supplied
/// articles, de-duplicated in first-seen order.
///
/// Falls back to the top article's id when nothing verifiable is cited.
pub fn extract_citations(reply: &str, articles: &[ScoredArticle]) -> Vec<String> {
    let mut citations: Vec<String> = Vec::new();

    for capture in citation_pattern().captures_iter(reply) {
        let Some(candidate) = capture.get(1).map(|m| m.as_str()) else {
            continue;
        };

        let matched = articles
            .iter()
            .find(|a| a.id() == candidate)
            .or_else(|| articles.iter().find(|a| a.id().eq_ignore_ascii_case(candidate)));

        if let Some(article) = matched {
            if !citations.iter().any(|c| c == article.id()) {
                citations.push(article.id().to_string());
            }
        }
    }

    if citations.is_empty() {
        if let Some(top) = articles.first() {
            citations.push(top.id().to_string());
        }
    }

    citations
}
