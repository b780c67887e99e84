//! JSON-backed session store: prompts, responses and the progress cursor.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};

use crate::ingest::ImportPrompt;

use super::SessionError;

// ---------------------------------------------------------------------------
// Persisted records
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub id: u64,
    pub text: String,
    pub category: String,
    /// Position in the session sequence, 0-based.
    pub order_index: usize,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub id: u64,
    pub question_id: u64,
    pub transcription: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_secs: Option<f64>,
    pub created_at: DateTime<Utc>,
}

/// Everything the store persists.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionState {
    /// Prompts in session order.
    pub questions: Vec<Question>,
    /// Responses in the order they were saved.
    pub responses: Vec<Response>,
    pub current_question_index: usize,
    pub total_responses: u64,
    pub last_session_date: Option<DateTime<Utc>>,
    last_question_id: u64,
    last_response_id: u64,
}

// ---------------------------------------------------------------------------
// Views
// ---------------------------------------------------------------------------

/// The prompt under the session cursor.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurrentPrompt {
    pub id: u64,
    pub text: String,
    pub category: String,
    pub current_index: usize,
    pub total: usize,
}

/// A response joined with the prompt it answers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResponseView {
    pub id: u64,
    pub question_id: u64,
    pub question_text: String,
    pub category: String,
    pub transcription: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_secs: Option<f64>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionStats {
    pub total_questions: usize,
    pub total_responses: usize,
    pub current_question_index: usize,
    /// Responses per prompt × 100; `0.0` when there are no prompts.
    pub completion_percentage: f64,
    pub last_session_date: Option<DateTime<Utc>>,
}

/// Document written by [`SessionStore::export_to`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KnowledgeExport {
    pub exported_at: DateTime<Local>,
    pub statistics: SessionStats,
    pub responses: Vec<ResponseView>,
}

/// `knowledge_export_YYYYmmdd_HHMMSS.json` for the given instant.
pub fn default_export_file_name(at: DateTime<Local>) -> String {
    format!("knowledge_export_{}.json", at.format("%Y%m%d_%H%M%S"))
}

// ---------------------------------------------------------------------------
// SessionStore
// ---------------------------------------------------------------------------

/// Sequential session controller over one [`SessionState`].
///
/// Stores opened with [`SessionStore::open`] rewrite their file after every
/// mutation; [`SessionStore::in_memory`] never touches the disk.
#[derive(Debug, Clone, Default)]
pub struct SessionStore {
    path: Option<PathBuf>,
    state: SessionState,
}

impl SessionStore {
    /// Open the store at `path`, starting empty when the file does not exist.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, SessionError> {
        let path = path.into();
        let state = if path.exists() {
            let content = std::fs::read_to_string(&path).map_err(|source| SessionError::Io {
                path: path.display().to_string(),
                source,
            })?;
            serde_json::from_str(&content)?
        } else {
            SessionState::default()
        };

        log::debug!(
            "session: opened {} ({} prompts, {} responses)",
            path.display(),
            state.questions.len(),
            state.responses.len()
        );
        Ok(Self {
            path: Some(path),
            state,
        })
    }

    pub fn in_memory() -> Self {
        Self::default()
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    fn persist(&self) -> Result<(), SessionError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let io_err = |source| SessionError::Io {
            path: path.display().to_string(),
            source,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }
        let content = serde_json::to_string_pretty(&self.state)?;
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, content).map_err(io_err)?;
        std::fs::rename(&tmp, path).map_err(io_err)
    }

    // -----------------------------------------------------------------------
    // Prompts
    // -----------------------------------------------------------------------

    /// Append `prompts` after the existing ones.  Prompts with blank text are
    /// skipped.  Returns the number imported.
    pub fn import_prompts(&mut self, prompts: Vec<ImportPrompt>) -> Result<usize, SessionError> {
        let now = Utc::now();
        let mut imported = 0;

        for prompt in prompts {
            let text = prompt.text().trim();
            if text.is_empty() {
                log::warn!("session: skipping prompt without text");
                continue;
            }
            self.state.last_question_id += 1;
            let question = Question {
                id: self.state.last_question_id,
                text: text.to_string(),
                category: prompt.category().to_string(),
                order_index: self.state.questions.len(),
                created_at: now,
            };
            self.state.questions.push(question);
            imported += 1;
        }

        self.persist()?;
        log::info!(
            "session: imported {imported} prompts ({} total)",
            self.state.questions.len()
        );
        Ok(imported)
    }

    pub fn question(&self, id: u64) -> Option<&Question> {
        self.state.questions.iter().find(|q| q.id == id)
    }

    /// The prompt under the cursor, or `None` once the cursor has passed the
    /// last prompt.
    pub fn current_prompt(&self) -> Option<CurrentPrompt> {
        let index = self.state.current_question_index;
        self.state.questions.get(index).map(|q| CurrentPrompt {
            id: q.id,
            text: q.text.clone(),
            category: q.category.clone(),
            current_index: index,
            total: self.state.questions.len(),
        })
    }

    /// Move the cursor forward by one and return the new current prompt.
    pub fn advance(&mut self) -> Result<Option<CurrentPrompt>, SessionError> {
        self.state.current_question_index += 1;
        self.persist()?;
        Ok(self.current_prompt())
    }

    /// Move the cursor back to the first prompt.  Responses are kept.
    pub fn reset_progress(&mut self) -> Result<(), SessionError> {
        self.state.current_question_index = 0;
        self.persist()
    }

    // -----------------------------------------------------------------------
    // Responses
    // -----------------------------------------------------------------------

    /// Record a transcript for `question_id` and return the response id.
    pub fn save_response(
        &mut self,
        question_id: u64,
        transcription: impl Into<String>,
        audio_path: Option<String>,
        duration_secs: Option<f64>,
    ) -> Result<u64, SessionError> {
        if self.question(question_id).is_none() {
            return Err(SessionError::UnknownQuestion(question_id));
        }

        let now = Utc::now();
        self.state.last_response_id += 1;
        let id = self.state.last_response_id;
        self.state.responses.push(Response {
            id,
            question_id,
            transcription: transcription.into(),
            audio_path,
            duration_secs,
            created_at: now,
        });
        self.state.total_responses += 1;
        self.state.last_session_date = Some(now);

        self.persist()?;
        log::info!("session: saved response {id} for prompt {question_id}");
        Ok(id)
    }

    /// Responses newest first, optionally only those for `question_id`.
    pub fn responses(&self, question_id: Option<u64>) -> Vec<ResponseView> {
        self.state
            .responses
            .iter()
            .rev()
            .filter(|r| question_id.map_or(true, |id| r.question_id == id))
            .map(|r| {
                let (question_text, category) = self
                    .question(r.question_id)
                    .map(|q| (q.text.clone(), q.category.clone()))
                    .unwrap_or_default();
                ResponseView {
                    id: r.id,
                    question_id: r.question_id,
                    question_text,
                    category,
                    transcription: r.transcription.clone(),
                    audio_path: r.audio_path.clone(),
                    duration_secs: r.duration_secs,
                    created_at: r.created_at,
                }
            })
            .collect()
    }

    pub fn stats(&self) -> SessionStats {
        let total_questions = self.state.questions.len();
        let total_responses = self.state.responses.len();
        let completion_percentage = if total_questions == 0 {
            0.0
        } else {
            total_responses as f64 / total_questions as f64 * 100.0
        };

        SessionStats {
            total_questions,
            total_responses,
            current_question_index: self.state.current_question_index,
            completion_percentage,
            last_session_date: self.state.last_session_date,
        }
    }

    // -----------------------------------------------------------------------
    // Export
    // -----------------------------------------------------------------------

    pub fn export(&self) -> KnowledgeExport {
        KnowledgeExport {
            exported_at: Local::now(),
            statistics: self.stats(),
            responses: self.responses(None),
        }
    }

    /// Write [`SessionStore::export`] to `path`; returns the response count.
    pub fn export_to(&self, path: &Path) -> Result<usize, SessionError> {
        let export = self.export();
        let content = serde_json::to_string_pretty(&export)?;
        std::fs::write(path, content).map_err(|source| SessionError::Io {
            path: path.display().to_string(),
            source,
        })?;
        log::info!(
            "session: exported {} responses to {}",
            export.responses.len(),
            path.display()
        );
        Ok(export.responses.len())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
