//! Recording → transcript capture step.
//!
//! [`Transcriber`] is the injected speech-to-text capability.  It is
//! blocking, object-safe and `Send + Sync` so it can sit behind an
//! `Arc<dyn Transcriber>` and run on the blocking thread pool.
//!
//! [`Capturer::capture`] keeps the recording under the uploads directory,
//! runs the transcriber under a bounded timeout and saves the trimmed text
//! through the [`SessionStore`].  A failed or timed-out transcription
//! removes the recording again and saves nothing.

use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

use crate::config::SessionConfig;

use super::{SessionError, SessionStore};

// ---------------------------------------------------------------------------
// Transcriber trait
// ---------------------------------------------------------------------------

/// Failure reported by a [`Transcriber`].
#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct TranscribeError(pub String);

/// Blocking speech-to-text capability.
pub trait Transcriber: Send + Sync {
    /// Transcribe the recording stored at `audio`.
    fn transcribe(&self, audio: &Path) -> Result<String, TranscribeError>;
}

// Compile-time assertion: Box<dyn Transcriber> must be constructible.
const _: fn() = || {
    fn _assert_object_safe(_: Box<dyn Transcriber>) {}
};

// ---------------------------------------------------------------------------
// CommandTranscriber
// ---------------------------------------------------------------------------

/// Runs an external speech-to-text program and reads the transcript from
/// its standard output.
///
/// Every `{audio}` in the arguments is replaced by the recording path; when
/// no argument mentions it, the path is appended.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandTranscriber {
    program: String,
    args: Vec<String>,
}

impl CommandTranscriber {
    /// Build from `[program, args...]`; `None` when `command` is empty.
    pub fn from_command(command: &[String]) -> Option<Self> {
        let (program, args) = command.split_first()?;
        Some(Self {
            program: program.clone(),
            args: args.to_vec(),
        })
    }

    fn args_for(&self, audio: &Path) -> Vec<String> {
        let audio = audio.display().to_string();
        let mut args: Vec<String> = self
            .args
            .iter()
            .map(|a| a.replace("{audio}", &audio))
            .collect();
        if !self.args.iter().any(|a| a.contains("{audio}")) {
            args.push(audio);
        }
        args
    }
}

impl Transcriber for CommandTranscriber {
    fn transcribe(&self, audio: &Path) -> Result<String, TranscribeError> {
        let output = Command::new(&self.program)
            .args(self.args_for(audio))
            .output()
            .map_err(|e| TranscribeError(format!("failed to run {}: {e}", self.program)))?;

        if !output.status.success() {
            return Err(TranscribeError(format!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

// ---------------------------------------------------------------------------
// Capturer
// ---------------------------------------------------------------------------

/// One recorded answer to a prompt.
#[derive(Debug, Clone, PartialEq)]
pub struct CaptureRequest {
    pub question_id: u64,
    /// Encoded recording bytes (e.g. WAV).
    pub audio: Vec<u8>,
    pub duration_secs: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CapturedResponse {
    pub response_id: u64,
    pub transcription: String,
    pub audio_path: PathBuf,
}

/// Runs the capture step with an injected [`Transcriber`].
pub struct Capturer {
    transcriber: Arc<dyn Transcriber>,
    uploads_dir: PathBuf,
    timeout: Duration,
}

impl Capturer {
    pub fn new(
        transcriber: Arc<dyn Transcriber>,
        uploads_dir: impl Into<PathBuf>,
        timeout: Duration,
    ) -> Self {
        Self {
            transcriber,
            uploads_dir: uploads_dir.into(),
            timeout,
        }
    }

    /// Build with the timeout from `config`.
    pub fn from_config(
        transcriber: Arc<dyn Transcriber>,
        uploads_dir: impl Into<PathBuf>,
        config: &SessionConfig,
    ) -> Self {
        Self::new(
            transcriber,
            uploads_dir,
            Duration::from_secs(config.transcription_timeout_secs),
        )
    }

    /// Transcribe `request` and save the transcript for its prompt.
    pub async fn capture(
        &self,
        store: &mut SessionStore,
        request: CaptureRequest,
    ) -> Result<CapturedResponse, SessionError> {
        if request.audio.is_empty() {
            return Err(SessionError::EmptyRecording);
        }
        if store.question(request.question_id).is_none() {
            return Err(SessionError::UnknownQuestion(request.question_id));
        }

        let audio_path = self.store_recording(request.question_id, &request.audio)?;
        log::info!(
            "capture: transcribing {} for prompt {}",
            audio_path.display(),
            request.question_id
        );

        let raw = match self.transcribe(&audio_path).await {
            Ok(text) => text,
            Err(e) => {
                if let Err(rm) = std::fs::remove_file(&audio_path) {
                    log::warn!("capture: could not remove {}: {rm}", audio_path.display());
                }
                return Err(e);
            }
        };

        let transcription = raw.trim().to_string();
        log::debug!("capture: transcript = {:?}", transcription);

        let response_id = store.save_response(
            request.question_id,
            transcription.clone(),
            Some(audio_path.display().to_string()),
            request.duration_secs,
        )?;

        Ok(CapturedResponse {
            response_id,
            transcription,
            audio_path,
        })
    }

    /// Write the recording as `response_{question}_{n}.wav`, `n` being the
    /// number of files already in the uploads directory.
    fn store_recording(&self, question_id: u64, audio: &[u8]) -> Result<PathBuf, SessionError> {
        let io_err = |source| SessionError::Io {
            path: self.uploads_dir.display().to_string(),
            source,
        };

        std::fs::create_dir_all(&self.uploads_dir).map_err(io_err)?;
        let mut n = std::fs::read_dir(&self.uploads_dir).map_err(io_err)?.count();
        let mut path = self.uploads_dir.join(format!("response_{question_id}_{n}.wav"));
        while path.exists() {
            n += 1;
            path = self.uploads_dir.join(format!("response_{question_id}_{n}.wav"));
        }

        std::fs::write(&path, audio).map_err(io_err)?;
        Ok(path)
    }

    async fn transcribe(&self, audio_path: &Path) -> Result<String, SessionError> {
        let transcriber = Arc::clone(&self.transcriber);
        let path = audio_path.to_path_buf();
        let task = tokio::task::spawn_blocking(move || transcriber.transcribe(&path));

        match tokio::time::timeout(self.timeout, task).await {
            Err(_) => {
                log::warn!("capture: transcription exceeded {:?}", self.timeout);
                Err(SessionError::TranscriptionTimeout(self.timeout.as_secs()))
            }
            Ok(Err(join)) => Err(SessionError::Transcription(join.to_string())),
            Ok(Ok(Err(e))) => Err(SessionError::Transcription(e.to_string())),
            Ok(Ok(Ok(text))) => Ok(text),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::ImportPrompt;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::tempdir;

    struct FixedTranscriber {
        text: &'static str,
        calls: AtomicUsize,
    }

    impl FixedTranscriber {
        fn new(text: &'static str) -> Arc<Self> {
            Arc::new(Self {
                text,
                calls: AtomicUsize::new(0),
            })
        }
    }

    impl Transcriber for FixedTranscriber {
        fn transcribe(&self, audio: &Path) -> Result<String, TranscribeError> {
            assert!(audio.exists());
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.text.to_string())
        }
    }

    struct SlowTranscriber;

    impl Transcriber for SlowTranscriber {
        fn transcribe(&self, _audio: &Path) -> Result<String, TranscribeError> {
            std::thread::sleep(Duration::from_millis(300));
            Ok("too late".into())
        }
    }

    struct BrokenTranscriber;

    impl Transcriber for BrokenTranscriber {
        fn transcribe(&self, _audio: &Path) -> Result<String, TranscribeError> {
            Err(TranscribeError("model not loaded".into()))
        }
    }

    fn store() -> SessionStore {
        let mut store = SessionStore::in_memory();
        store
            .import_prompts(vec![ImportPrompt::Text("What did you learn?".into())])
            .unwrap();
        store
    }

    fn request(audio: &[u8]) -> CaptureRequest {
        CaptureRequest {
            question_id: 1,
            audio: audio.to_vec(),
            duration_secs: Some(2.0),
        }
    }

    #[tokio::test]
    async fn successful_capture_saves_trimmed_transcript() {
        let dir = tempdir().expect("temp dir");
        let transcriber = FixedTranscriber::new("  I learned patience.\n");
        let capturer = Capturer::new(transcriber.clone(), dir.path(), Duration::from_secs(5));
        let mut store = store();

        let first = capturer.capture(&mut store, request(b"RIFF")).await.unwrap();
        assert_eq!(first.transcription, "I learned patience.");
        assert_eq!(first.audio_path, dir.path().join("response_1_0.wav"));
        assert!(first.audio_path.exists());

        let second = capturer.capture(&mut store, request(b"RIFF")).await.unwrap();
        assert_eq!(second.audio_path, dir.path().join("response_1_1.wav"));

        let saved = store.responses(Some(1));
        assert_eq!(saved.len(), 2);
        assert_eq!(saved[1].transcription, "I learned patience.");
        assert_eq!(saved[1].duration_secs, Some(2.0));
        assert_eq!(transcriber.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn empty_recording_is_rejected_up_front() {
        let dir = tempdir().expect("temp dir");
        let transcriber = FixedTranscriber::new("unused");
        let capturer = Capturer::new(transcriber.clone(), dir.path(), Duration::from_secs(5));
        let mut store = store();

        let err = capturer.capture(&mut store, request(b"")).await.unwrap_err();
        assert!(matches!(err, SessionError::EmptyRecording));
        assert_eq!(transcriber.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn unknown_question_is_rejected() {
        let dir = tempdir().expect("temp dir");
        let capturer = Capturer::new(FixedTranscriber::new("x"), dir.path(), Duration::from_secs(5));
        let mut store = store();

        let mut req = request(b"RIFF");
        req.question_id = 42;
        let err = capturer.capture(&mut store, req).await.unwrap_err();
        assert!(matches!(err, SessionError::UnknownQuestion(42)));
    }

    #[tokio::test]
    async fn slow_transcription_times_out() {
        let dir = tempdir().expect("temp dir");
        let capturer = Capturer::new(Arc::new(SlowTranscriber), dir.path(), Duration::from_millis(20));
        let mut store = store();

        let err = capturer.capture(&mut store, request(b"RIFF")).await.unwrap_err();
        assert!(matches!(err, SessionError::TranscriptionTimeout(_)));
        assert!(store.responses(None).is_empty());
        assert!(!dir.path().join("response_1_0.wav").exists());
    }

    #[tokio::test]
    async fn transcriber_failure_is_reported() {
        let dir = tempdir().expect("temp dir");
        let capturer = Capturer::new(Arc::new(BrokenTranscriber), dir.path(), Duration::from_secs(5));
        let mut store = store();

        let err = capturer.capture(&mut store, request(b"RIFF")).await.unwrap_err();
        match err {
            SessionError::Transcription(msg) => assert!(msg.contains("model not loaded")),
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(store.state().total_responses, 0);
    }

    #[test]
    fn from_config_uses_configured_timeout() {
        let config = SessionConfig {
            transcription_timeout_secs: 7,
            ..SessionConfig::default()
        };
        let capturer = Capturer::from_config(FixedTranscriber::new("x"), "uploads", &config);
        assert_eq!(capturer.timeout, Duration::from_secs(7));
    }

    #[test]
    fn command_placeholder_is_substituted() {
        let t = CommandTranscriber::from_command(&["stt".into(), "-f".into(), "{audio}".into()])
            .unwrap();
        assert_eq!(t.args_for(Path::new("a.wav")), vec!["-f", "a.wav"]);

        let t = CommandTranscriber::from_command(&["stt".into(), "--quiet".into()]).unwrap();
        assert_eq!(t.args_for(Path::new("a.wav")), vec!["--quiet", "a.wav"]);

        assert!(CommandTranscriber::from_command(&[]).is_none());
    }

    #[cfg(unix)]
    #[test]
    fn command_transcriber_reads_stdout() {
        let dir = tempdir().expect("temp dir");
        let audio = dir.path().join("clip.wav");
        std::fs::write(&audio, "spoken words").unwrap();

        let t = CommandTranscriber::from_command(&["cat".into()]).unwrap();
        assert_eq!(t.transcribe(&audio).unwrap(), "spoken words");

        let missing = CommandTranscriber::from_command(&["cat".into()]).unwrap();
        assert!(missing.transcribe(&dir.path().join("missing.wav")).is_err());
    }
}
