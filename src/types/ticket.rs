//! Inbound request types
//!
//! A triage request carries one ticket and the caller-owned KB corpus.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::errors::{Result, TriageError};

/// Customer support ticket
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ticket {
    pub id: String,
    pub title: String,
    pub description: String,
}

impl Ticket {
    /// Text analysed by every pipeline stage: title and description joined by a space
    pub fn text(&self) -> String {
        format!("{} {}", self.title, self.description)
    }
}

/// Knowledge-base article supplied with the request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KbArticle {
    pub id: String,
    pub title: String,
    pub body: String,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Last-updated marker (any format); presence counts as freshness
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    /// Publication status, e.g. "published" or "draft"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

impl KbArticle {
    /// Create an article without freshness or status metadata
    pub fn new(id: impl Into<String>, title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            body: body.into(),
            tags: Vec::new(),
            updated_at: None,
            status: None,
        }
    }

    /// Attach tags
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Attach freshness and status metadata
    pub fn with_metadata(mut self, updated_at: Option<&str>, status: Option<&str>) -> Self {
        self.updated_at = updated_at.map(str::to_string);
        self.status = status.map(str::to_string);
        self
    }

    pub fn is_published(&self) -> bool {
        self.status
            .as_deref()
            .map(|s| s.trim().eq_ignore_ascii_case("published"))
            .unwrap_or(false)
    }
}

/// Inbound triage request
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TriageRequest {
    pub trace_id: String,
    pub ticket: Ticket,
    #[serde(default)]
    pub kb: Vec<KbArticle>,
}

impl TriageRequest {
    /// Check the structural requirements the pipeline relies on
    pub fn validate(&self) -> Result<()> {
        if self.trace_id.trim().is_empty() {
            return Err(TriageError::InvalidRequest(
                "traceId must not be empty".to_string(),
            ));
        }

        if self.ticket.id.trim().is_empty() {
            return Err(TriageError::InvalidRequest(
                "ticket.id must not be empty".to_string(),
            ));
        }

        if self.ticket.title.trim().is_empty() && self.ticket.description.trim().is_empty() {
            return Err(TriageError::InvalidRequest(
                "ticket must have a title or a description".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for (index, article) in self.kb.iter().enumerate() {
            if article.id.trim().is_empty() {
                return Err(TriageError::InvalidRequest(format!(
                    "kb[{}].id must not be empty",
                    index
                )));
            }
            if !seen.insert(article.id.as_str()) {
                return Err(TriageError::InvalidRequest(format!(
                    "duplicate kb article id '{}'",
                    article.id
                )));
            }
        }

        Ok(())
    }
}
