//! Turns heterogeneous prompt sources into a uniform, deduplicated list.
//!
//! Two source shapes are understood:
//!
//! * structured rows ([`RawPromptRecord`]), e.g. decoded from JSON;
//! * loosely formatted text where `Category N: <label> (Questions …)`
//!   headings set a running category and `<digits>. <text>` lines are the
//!   prompts themselves.
//!
//! Rows whose text is empty, a configured placeholder, or shorter than the
//! minimum length are skipped and counted.  Duplicates (case-insensitive,
//! trimmed) collapse to their first occurrence.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

use crate::config::IngestConfig;
use crate::ingest::record::{NormalizedPrompt, RawPromptRecord, DEFAULT_CATEGORY};

static CATEGORY_HEADING_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^Category\s+\d+\s*:\s*(.+?)\s*\(Questions[^)]*\)\s*$").expect("valid regex")
});

// An item number needs whitespace (or nothing) after its dot, so "3.14 is pi" is prose.
static NUMBERED_LINE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)\.(?:\s+(.*))?$").expect("valid regex"));

// ---------------------------------------------------------------------------
// NormalizeOptions
// ---------------------------------------------------------------------------

/// Filters applied to every row.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizeOptions {
    /// Minimum trimmed length in characters.  `0` keeps any non-empty text.
    pub min_chars: usize,
    /// Values treated as empty text, compared case-insensitively.
    pub placeholders: Vec<String>,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self {
            min_chars: 0,
            placeholders: vec!["nan".into()],
        }
    }
}

impl From<&IngestConfig> for NormalizeOptions {
    fn from(config: &IngestConfig) -> Self {
        Self {
            min_chars: config.min_chars,
            placeholders: config.placeholders.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// NormalizeOutcome
// ---------------------------------------------------------------------------

/// Result of one normalization pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizeOutcome {
    /// Usable prompts in first-seen order.
    pub prompts: Vec<NormalizedPrompt>,
    /// Rows rejected because they could not yield usable text.
    pub skipped: usize,
    /// Rows dropped as duplicates of an earlier prompt.
    pub duplicates: usize,
}

impl NormalizeOutcome {
    pub fn is_empty(&self) -> bool {
        self.prompts.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Normalizer
// ---------------------------------------------------------------------------

/// Normalizes prompt sources with a fixed set of [`NormalizeOptions`].
///
/// # Example
/// ```rust
/// use knowledge_capture::ingest::Normalizer;
///
/// let normalizer = Normalizer::default();
/// let out = normalizer.normalize_lines(["What is joy?", "what is joy?", "What is joy? "]);
/// assert_eq!(out.prompts.len(), 1);
/// assert_eq!(out.prompts[0].text, "What is joy?");
/// ```
#[derive(Debug, Clone, Default)]
pub struct Normalizer {
    options: NormalizeOptions,
}

impl Normalizer {
    pub fn new(options: NormalizeOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &NormalizeOptions {
        &self.options
    }

    /// Normalize structured rows.
    pub fn normalize_records<I>(&self, records: I) -> NormalizeOutcome
    where
        I: IntoIterator<Item = RawPromptRecord>,
    {
        let mut outcome = NormalizeOutcome::default();
        let mut seen: HashSet<String> = HashSet::new();

        for record in records {
            let text = record.text.trim();
            if !self.is_usable(text) {
                log::debug!("ingest: skipping row {:?}: {:?}", record.source_index, text);
                outcome.skipped += 1;
                continue;
            }

            if !seen.insert(text.to_lowercase()) {
                outcome.duplicates += 1;
                continue;
            }

            let category = record
                .category
                .as_deref()
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .unwrap_or(DEFAULT_CATEGORY);

            outcome.prompts.push(NormalizedPrompt {
                text: text.to_string(),
                category: category.to_string(),
                source_index: record.source_index,
            });
        }

        outcome
    }

    /// Normalize plain lines, one prompt per line, no category.
    pub fn normalize_lines<I, S>(&self, lines: I) -> NormalizeOutcome
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let records = lines
            .into_iter()
            .enumerate()
            .map(|(idx, line)| RawPromptRecord::new(line.as_ref()).with_index(idx));
        self.normalize_records(records)
    }

    /// Normalize numbered text with category headings.
    pub fn normalize_text(&self, text: &str) -> NormalizeOutcome {
        self.normalize_records(parse_numbered_text(text))
    }

    fn is_usable(&self, text: &str) -> bool {
        if text.is_empty() {
            return false;
        }
        if self
            .options
            .placeholders
            .iter()
            .any(|p| p.trim().eq_ignore_ascii_case(text))
        {
            return false;
        }
        text.chars().count() >= self.options.min_chars
    }
}

// ---------------------------------------------------------------------------
// Text parsing
// ---------------------------------------------------------------------------

/// Split numbered text into raw rows.
///
/// Heading lines update the running category, numbered lines become rows
/// tagged with it, and everything else (including blank lines) is ignored.
/// Rows carry their item number as `source_index`.
pub fn parse_numbered_text(text: &str) -> Vec<RawPromptRecord> {
    let mut current_category: Option<String> = None;
    let mut records = Vec::new();

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(caps) = CATEGORY_HEADING_REGEX.captures(line) {
            current_category = Some(caps[1].trim().to_string());
            continue;
        }

        if let Some(caps) = NUMBERED_LINE_REGEX.captures(line) {
            let mut record = RawPromptRecord::new(caps.get(2).map_or("", |m| m.as_str()));
            if let Ok(number) = caps[1].parse::<usize>() {
                record = record.with_index(number);
            }
            if let Some(category) = &current_category {
                record = record.with_category(category.clone());
            }
            records.push(record);
        }
    }

    records
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
