//! Prompt record types shared by ingestion, scoring and the session store.

use serde::{Deserialize, Serialize};

/// Category assigned when a source row carries none.
pub const DEFAULT_CATEGORY: &str = "General";

// ---------------------------------------------------------------------------
// RawPromptRecord
// ---------------------------------------------------------------------------

/// One row exactly as it came out of a prompt source.
#[derive(Debug, Clone, PartialEq)]
pub struct RawPromptRecord {
    /// Free text of the row, untrimmed.
    pub text: String,
    /// Explicit category, when the source provides one.
    pub category: Option<String>,
    /// Position (row index or item number) of the row in its source.
    pub source_index: Option<usize>,
}

impl RawPromptRecord {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            category: None,
            source_index: None,
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_index(mut self, index: usize) -> Self {
        self.source_index = Some(index);
        self
    }
}

// ---------------------------------------------------------------------------
// NormalizedPrompt
// ---------------------------------------------------------------------------

/// A trimmed, non-empty, deduplicated prompt ready for scoring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedPrompt {
    pub text: String,
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_index: Option<usize>,
}

impl NormalizedPrompt {
    pub fn new(text: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            category: category.into(),
            source_index: None,
        }
    }
}

// ---------------------------------------------------------------------------
// ImportPrompt
// ---------------------------------------------------------------------------

/// One element of an importable prompt collection.
///
/// Accepts either a bare string or a record carrying `question` (or `text`)
/// plus an optional `category`.  Any other fields, such as the scoring
/// metadata written by the ranker, are ignored.
///
/// ```
/// use knowledge_capture::ingest::ImportPrompt;
///
/// let items: Vec<ImportPrompt> = serde_json::from_str(
///     r#"["What is joy?", {"text": "Why?", "category": "Ethics", "priority_score": 3}]"#,
/// ).unwrap();
/// assert_eq!(items[0].text(), "What is joy?");
/// assert_eq!(items[1].category(), "Ethics");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ImportPrompt {
    Text(String),
    Record {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        question: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        text: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        category: Option<String>,
    },
}

impl ImportPrompt {
    /// Prompt text; `question` wins over `text` when both are present.
    pub fn text(&self) -> &str {
        match self {
            Self::Text(text) => text,
            Self::Record { question, text, .. } => question
                .as_deref()
                .or(text.as_deref())
                .unwrap_or_default(),
        }
    }

    /// Category, defaulting to [`DEFAULT_CATEGORY`].
    pub fn category(&self) -> &str {
        match self {
            Self::Record {
                category: Some(category),
                ..
            } => category,
            _ => DEFAULT_CATEGORY,
        }
    }

    /// Convert into a raw source row at position `index`.
    pub fn into_raw(self, index: usize) -> RawPromptRecord {
        let record = RawPromptRecord::new(self.text()).with_index(index);
        match self {
            Self::Record {
                category: Some(category),
                ..
            } => record.with_category(category),
            _ => record,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
