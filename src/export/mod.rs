//! Writing ranked prompt lists as importable JSON collections.
//!
//! Each element carries `question` and `category` (all the session import
//! needs) plus scoring metadata the importer ignores:
//!
//! ```json
//! {
//!   "question": "How can AI support wisdom?",
//!   "category": "Technology & Future",
//!   "priority_score": 6,
//!   "original_index": 12,
//!   "priority_rank": 1
//! }
//! ```
//!
//! Embedding runs write `alignment_score` and `theme_scores` (rounded to
//! three decimals) instead of `priority_score`.

use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;

use crate::pipeline::RunReport;
use crate::scoring::embedding::round_to;
use crate::scoring::{Score, ScoredPrompt, ThemeScores};

// ---------------------------------------------------------------------------
// ExportError
// ---------------------------------------------------------------------------

/// Errors that can occur while writing output artifacts.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to write {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize output: {0}")]
    Json(#[from] serde_json::Error),
}

// ---------------------------------------------------------------------------
// ExportRecord
// ---------------------------------------------------------------------------

/// Serialized form of one ranked prompt.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportRecord<'a> {
    pub question: &'a str,
    pub category: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority_score: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alignment_score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theme_scores: Option<ThemeScores>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_index: Option<usize>,
    pub priority_rank: usize,
}

impl<'a> From<&'a ScoredPrompt> for ExportRecord<'a> {
    fn from(p: &'a ScoredPrompt) -> Self {
        let (priority_score, alignment_score) = match p.score {
            Score::Priority(s) => (Some(s), None),
            Score::Alignment(a) => (None, Some(round_to(a, 3))),
        };
        Self {
            question: &p.prompt.text,
            category: &p.prompt.category,
            priority_score,
            alignment_score,
            theme_scores: p.theme_scores.map(|t| t.rounded(3)),
            original_index: p.prompt.source_index,
            priority_rank: p.rank,
        }
    }
}

// ---------------------------------------------------------------------------
// Writing
// ---------------------------------------------------------------------------

/// Path of the high-tier companion file: `out.json` → `out_high_priority.json`.
pub fn high_priority_path(path: &Path) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "questions".into());
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().into_owned())
        .unwrap_or_else(|| "json".into());
    path.with_file_name(format!("{stem}_high_priority.{ext}"))
}

/// Serialize `prompts` as a pretty-printed JSON array.
pub fn to_json<'a, I>(prompts: I) -> Result<String, ExportError>
where
    I: IntoIterator<Item = &'a ScoredPrompt>,
{
    let records: Vec<ExportRecord<'_>> = prompts.into_iter().map(ExportRecord::from).collect();
    Ok(serde_json::to_string_pretty(&records)?)
}

fn write_file(path: &Path, content: &str) -> Result<(), ExportError> {
    let io_err = |source| ExportError::Io {
        path: path.display().to_string(),
        source,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(io_err)?;
    }
    std::fs::write(path, content).map_err(io_err)
}

/// Paths of the artifacts written for one run.
#[derive(Debug, Clone, PartialEq)]
pub struct WrittenArtifacts {
    pub full: PathBuf,
    pub high_priority: PathBuf,
}

/// Write the full ranking to `path` and the high tier next to it.
pub fn write_report(report: &RunReport, path: &Path) -> Result<WrittenArtifacts, ExportError> {
    write_file(path, &to_json(&report.prompts)?)?;
    log::info!("export: saved {} prompts to {}", report.prompts.len(), path.display());

    let high = report.high_tier();
    let high_count = high.len();
    let high_path = high_priority_path(path);
    write_file(&high_path, &to_json(high)?)?;
    log::info!(
        "export: saved {high_count} high-tier prompts to {}",
        high_path.display()
    );

    Ok(WrittenArtifacts {
        full: path.to_path_buf(),
        high_priority: high_path,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
