//! Text-embedding providers.
//!
//! This module provides:
//! * [`Embedder`]: async trait implemented by all embedding backends.
//! * [`ApiEmbedder`]: OpenAI-compatible `/v1/embeddings` client.
//! * [`EmbedError`]: error variants for embedding requests.
//!
//! # Quick start
//!
//! ```rust,no_run
//! use knowledge_capture::config::AppConfig;
//! use knowledge_capture::embed::{ApiEmbedder, Embedder};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = AppConfig::default();
//!     let embedder = ApiEmbedder::from_config(&config.embedding);
//!     let vector = embedder.embed("What matters most to you?").await.unwrap();
//!     println!("{} dimensions", vector.len());
//! }
//! ```

pub mod api;
pub mod provider;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use api::ApiEmbedder;
pub use provider::{EmbedError, Embedder};
