//! Settings and on-disk locations.
//!
//! [`AppConfig`] groups the `ingest`, `embedding`, `output` and `session`
//! sections of `settings.toml`; [`AppPaths`] resolves where that file, the
//! session store and saved recordings live.

pub mod paths;
pub mod settings;

pub use paths::AppPaths;
pub use settings::{
    AppConfig, EmbeddingConfig, EmbeddingProvider, IngestConfig, OutputConfig, SessionConfig,
};
