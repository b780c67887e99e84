//! Prompt ingestion: source loading, normalization and deduplication.
//!
//! This module provides:
//! * [`RawPromptRecord`] / [`NormalizedPrompt`] / [`ImportPrompt`]: record types.
//! * [`Normalizer`]: trims, filters and deduplicates rows.
//! * [`load_source`]: reads JSON or numbered-text files into raw rows.
//! * [`IngestError`]: error variants for ingestion.

pub mod normalizer;
pub mod record;
pub mod source;

use thiserror::Error;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use normalizer::{parse_numbered_text, NormalizeOptions, NormalizeOutcome, Normalizer};
pub use record::{ImportPrompt, NormalizedPrompt, RawPromptRecord, DEFAULT_CATEGORY};
pub use source::{load_source, parse_json_rows, SourceFormat};

// ---------------------------------------------------------------------------
// IngestError
// ---------------------------------------------------------------------------

/// Errors that can occur while reading a prompt source.
#[derive(Debug, Error)]
pub enum IngestError {
    /// The source file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The source is not valid JSON.
    #[error("invalid JSON source: {0}")]
    Json(#[from] serde_json::Error),

    /// The source parsed but does not have the expected shape.
    #[error("unsupported source layout: {0}")]
    Format(String),

    /// No usable prompts remained after filtering and deduplication.
    #[error("source contains no usable prompts")]
    EmptySource,
}
