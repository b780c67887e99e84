//! Answer-capture session: sequential prompt cursor, transcript sink and
//! knowledge export.
//!
//! # Architecture
//!
//! ```text
//! ranked JSON ──▶ SessionStore::import_prompts
//!                       │
//!    current_prompt() ◀─┤
//!                       │      Capturer::capture
//!                       │        ├─ write recording → uploads/response_{id}_{n}.wav
//!                       │        ├─ spawn_blocking(Transcriber::transcribe) under timeout
//!    save_response() ◀──┴────────┘
//!    advance() / reset_progress() / stats() / export()
//! ```
//!
//! The store persists itself as a single JSON document after every
//! mutation.

pub mod capture;
pub mod store;

use thiserror::Error;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use capture::{
    CaptureRequest, CapturedResponse, Capturer, CommandTranscriber, TranscribeError, Transcriber,
};
pub use store::{
    default_export_file_name, CurrentPrompt, KnowledgeExport, Question, Response, ResponseView,
    SessionState, SessionStats, SessionStore,
};

// ---------------------------------------------------------------------------
// SessionError
// ---------------------------------------------------------------------------

/// Errors raised by the session store and the capture step.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("unknown question id {0}")]
    UnknownQuestion(u64),

    /// The recording contained no bytes.
    #[error("recording is empty")]
    EmptyRecording,

    /// The transcriber did not finish in time; the user may retry.
    #[error("transcription timed out after {0} s, please try again")]
    TranscriptionTimeout(u64),

    #[error("transcription failed: {0}")]
    Transcription(String),

    #[error("session file error at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("session data is malformed: {0}")]
    Json(#[from] serde_json::Error),
}
