//! Core `Embedder` trait and its error type.

use async_trait::async_trait;
use thiserror::Error;

// ---------------------------------------------------------------------------
// EmbedError
// ---------------------------------------------------------------------------

/// Errors that can occur while requesting embeddings.
#[derive(Debug, Error)]
pub enum EmbedError {
    /// HTTP transport or connection error.
    #[error("HTTP request failed: {0}")]
    Request(String),

    /// The request did not complete within the configured timeout.
    #[error("embedding request timed out")]
    Timeout,

    /// The provider answered with a non-success status.
    #[error("embedding provider returned {status}: {body}")]
    Status { status: u16, body: String },

    /// The HTTP response could not be parsed as expected JSON.
    #[error("failed to parse embedding response: {0}")]
    Parse(String),

    /// The provider returned a different number of vectors than inputs.
    #[error("expected {expected} embeddings, provider returned {got}")]
    CountMismatch { expected: usize, got: usize },

    /// A vector's length differs from the theme vectors of the run.
    #[error("embedding has {got} dimensions, expected {expected}")]
    DimensionMismatch { expected: usize, got: usize },

    /// A vector contains NaN or infinite components.
    #[error("embedding contains non-finite values")]
    NonFinite,

    /// The provider returned no vectors at all.
    #[error("embedding provider returned an empty response")]
    EmptyResponse,
}

impl From<reqwest::Error> for EmbedError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            EmbedError::Timeout
        } else {
            EmbedError::Request(e.to_string())
        }
    }
}

// ---------------------------------------------------------------------------
// Embedder trait
// ---------------------------------------------------------------------------

/// Async trait for text-embedding backends.
///
/// Implementors must be `Send + Sync` so they can be shared behind
/// `Arc<dyn Embedder>`.  Vectors for one run must all have the same length;
/// nothing else is assumed about dimensionality.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embed every string in `inputs`, returning vectors in input order.
    async fn embed_batch(&self, inputs: &[&str]) -> Result<Vec<Vec<f32>>, EmbedError>;

    /// Embed a single string.
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbedError> {
        let mut vectors = self.embed_batch(&[text]).await?;
        vectors.pop().ok_or(EmbedError::EmptyResponse)
    }
}

// Compile-time assertion: Box<dyn Embedder> must be constructible.
const _: fn() = || {
    fn _assert_object_safe(_: Box<dyn Embedder>) {}
};
