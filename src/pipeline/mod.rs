//! Batch ranking pipeline.
//!
//! # Architecture
//!
//! ```text
//! load_source() ──▶ BatchRunner::run_keyword / run_embedding ──▶ RunReport
//!                                                                  │
//!                                   RunReport::log_summary() ◀─────┤
//!                                   export::write_report()   ◀─────┘
//! ```
//!
//! # Quick start
//!
//! ```rust,no_run
//! use std::path::Path;
//! use knowledge_capture::config::AppConfig;
//! use knowledge_capture::export::write_report;
//! use knowledge_capture::ingest::{load_source, SourceFormat};
//! use knowledge_capture::pipeline::BatchRunner;
//!
//! let config = AppConfig::default();
//! let path = Path::new("questions.txt");
//! let rows = load_source(path, SourceFormat::detect(path)).unwrap();
//! let report = BatchRunner::from_config(&config).run_keyword(rows).unwrap();
//! report.log_summary(config.output.preview_count);
//! write_report(&report, Path::new(&config.output.keyword_file)).unwrap();
//! ```

pub mod report;
pub mod runner;

use thiserror::Error;

use crate::embed::EmbedError;
use crate::export::ExportError;
use crate::ingest::IngestError;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use report::RunReport;
pub use runner::BatchRunner;

// ---------------------------------------------------------------------------
// PipelineError
// ---------------------------------------------------------------------------

/// Errors that abort a batch run.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The source could not be read or yielded no usable prompts.
    #[error(transparent)]
    Ingest(#[from] IngestError),

    /// The embedding provider failed.
    #[error("embedding provider failed: {0}")]
    Embedding(#[from] EmbedError),

    /// Output artifacts could not be written.
    #[error(transparent)]
    Export(#[from] ExportError),
}
