//! Prompt ranking and answer capture.
//!
//! * [`ingest`]: source loading and normalization.
//! * [`scoring`]: keyword and embedding scorers, ranking and tiers.
//! * [`embed`]: embedding provider trait and HTTP client.
//! * [`pipeline`]: batch runner and run report.
//! * [`export`]: ranked JSON artifacts.
//! * [`session`]: prompt cursor, transcripts and knowledge export.
//! * [`config`]: settings and application paths.

pub mod config;
pub mod embed;
pub mod export;
pub mod ingest;
pub mod pipeline;
pub mod scoring;
pub mod session;
