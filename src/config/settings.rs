//! Application settings structs, defaults and TOML persistence.
//!
//! All structs implement `Serialize`, `Deserialize`, `Default` and `Clone`
//! so they can be round-tripped through TOML files.

use std::fmt;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use super::AppPaths;

// ---------------------------------------------------------------------------
// EmbeddingProvider
// ---------------------------------------------------------------------------

/// Selects which backend serves text embeddings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EmbeddingProvider {
    /// Ollama running locally (OpenAI-compatible mode), no authentication.
    Ollama,
    /// Any OpenAI-compatible REST API (OpenAI, LM Studio, vLLM …).
    OpenAiCompatible,
}

impl Default for EmbeddingProvider {
    fn default() -> Self {
        Self::Ollama
    }
}

impl EmbeddingProvider {
    /// Base URL used when `embedding.base_url` is left blank.
    pub fn default_base_url(&self) -> &'static str {
        match self {
            Self::Ollama => "http://localhost:11434",
            Self::OpenAiCompatible => "https://api.openai.com",
        }
    }
}

// ---------------------------------------------------------------------------
// EmbeddingConfig
// ---------------------------------------------------------------------------

/// Settings for the sentence-embedding backend used by the embedding scorer.
#[derive(Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    /// Which backend to use.
    pub provider: EmbeddingProvider,
    /// Base URL of the API endpoint.  Blank means the provider's
    /// [`default_base_url`](EmbeddingProvider::default_base_url).
    pub base_url: String,
    /// API key, `None` for local providers.
    pub api_key: Option<String>,
    /// Embedding model identifier (e.g. `"all-minilm"`,
    /// `"text-embedding-3-small"`).
    pub model: String,
    /// Maximum seconds to wait for one embedding request.
    pub timeout_secs: u64,
    /// Number of prompts sent per embedding request.
    pub batch_size: usize,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: EmbeddingProvider::default(),
            base_url: EmbeddingProvider::default().default_base_url().into(),
            api_key: None,
            model: "all-minilm".into(),
            timeout_secs: 30,
            batch_size: 32,
        }
    }
}

impl EmbeddingConfig {
    /// Configured base URL without trailing slashes, or the provider default.
    pub fn resolved_base_url(&self) -> &str {
        match self.base_url.trim().trim_end_matches('/') {
            "" => self.provider.default_base_url(),
            url => url,
        }
    }
}

// Hand-written so the API key never reaches logs.
impl fmt::Debug for EmbeddingConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EmbeddingConfig")
            .field("provider", &self.provider)
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("timeout_secs", &self.timeout_secs)
            .field("batch_size", &self.batch_size)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// IngestConfig
// ---------------------------------------------------------------------------

/// Filters applied while normalizing a prompt source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestConfig {
    /// Prompts shorter than this many characters are dropped as noise.
    pub min_chars: usize,
    /// Cell values treated as empty text (compared case-insensitively),
    /// e.g. the `"nan"` that spreadsheet exports leave in blank cells.
    pub placeholders: Vec<String>,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            min_chars: 10,
            placeholders: vec!["nan".into()],
        }
    }
}

// ---------------------------------------------------------------------------
// OutputConfig
// ---------------------------------------------------------------------------

/// Where ranked prompt lists are written and how much of them is previewed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Default output file for keyword-mode runs.
    pub keyword_file: String,
    /// Default output file for embedding-mode runs.
    pub embedding_file: String,
    /// Number of top prompts listed in the run summary.
    pub preview_count: usize,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            keyword_file: "questions_prioritized.json".into(),
            embedding_file: "questions_ai_prioritized.json".into(),
            preview_count: 10,
        }
    }
}

// ---------------------------------------------------------------------------
// SessionConfig
// ---------------------------------------------------------------------------

/// Settings for the answer-capture session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// File name of the session store inside the data directory.
    pub store_file: String,
    /// Maximum seconds a single transcription may take before the capture
    /// is abandoned and the user is asked to retry.
    pub transcription_timeout_secs: u64,
    /// External speech-to-text command; `{audio}` in any argument is
    /// replaced by the recording path.  Empty disables `capture`.
    #[serde(default)]
    pub transcriber_command: Vec<String>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            store_file: "knowledge.json".into(),
            transcription_timeout_secs: 120,
            transcriber_command: Vec::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// AppConfig  (top-level)
// ---------------------------------------------------------------------------

/// Top-level application configuration, serialised as `settings.toml`.
///
/// # Persistence
///
/// ```rust,no_run
/// use knowledge_capture::config::AppConfig;
///
/// // Load (returns Default when file is missing)
/// let config = AppConfig::load().unwrap();
///
/// // Modify and save
/// // config.save().unwrap();
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Source normalization filters.
    pub ingest: IngestConfig,
    /// Embedding backend settings.
    pub embedding: EmbeddingConfig,
    /// Output artifact settings.
    pub output: OutputConfig,
    /// Answer-capture session settings.
    pub session: SessionConfig,
}

impl AppConfig {
    /// Load configuration from the platform-appropriate `settings.toml`.
    ///
    /// Returns `Ok(AppConfig::default())` when the file does not exist yet
    /// so callers never need to special-case a missing file.
    pub fn load() -> Result<Self> {
        Self::load_from(&AppPaths::new().settings_file)
    }

    /// Load from an explicit path (useful for tests and `--config`).
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let config: Self = toml::from_str(&content)
            .with_context(|| format!("invalid settings in {}", path.display()))?;
        Ok(config)
    }

    /// Save configuration to the platform-appropriate `settings.toml`,
    /// creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        self.save_to(&AppPaths::new().settings_file)
    }

    /// Save to an explicit path (useful for tests).
    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn round_trip_toml() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("settings.toml");

        let original = AppConfig::default();
        original.save_to(&path).expect("save");

        let loaded = AppConfig::load_from(&path).expect("load");

        assert_eq!(original.ingest.min_chars, loaded.ingest.min_chars);
        assert_eq!(original.ingest.placeholders, loaded.ingest.placeholders);
        assert_eq!(original.embedding.provider, loaded.embedding.provider);
        assert_eq!(original.embedding.base_url, loaded.embedding.base_url);
        assert_eq!(original.embedding.api_key, loaded.embedding.api_key);
        assert_eq!(original.embedding.batch_size, loaded.embedding.batch_size);
        assert_eq!(original.output.keyword_file, loaded.output.keyword_file);
        assert_eq!(original.session.store_file, loaded.session.store_file);
    }

    /// `load_from` on a non-existent path must return `Default` without error.
    #[test]
    fn load_missing_returns_default() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("nonexistent.toml");

        let config = AppConfig::load_from(&path).expect("should not error");
        assert_eq!(config.ingest.min_chars, 10);
        assert_eq!(config.embedding.model, "all-minilm");
    }

    #[test]
    fn default_values() {
        let cfg = AppConfig::default();

        assert_eq!(cfg.ingest.min_chars, 10);
        assert_eq!(cfg.ingest.placeholders, vec!["nan".to_string()]);
        assert_eq!(cfg.embedding.provider, EmbeddingProvider::Ollama);
        assert_eq!(cfg.embedding.base_url, "http://localhost:11434");
        assert!(cfg.embedding.api_key.is_none());
        assert_eq!(cfg.output.keyword_file, "questions_prioritized.json");
        assert_eq!(cfg.output.embedding_file, "questions_ai_prioritized.json");
        assert_eq!(cfg.output.preview_count, 10);
        assert_eq!(cfg.session.transcription_timeout_secs, 120);
    }

    /// A settings file that only names one section keeps defaults elsewhere.
    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("partial.toml");
        std::fs::write(&path, "[ingest]\nmin_chars = 3\nplaceholders = []\n").expect("write");

        let cfg = AppConfig::load_from(&path).expect("load");
        assert_eq!(cfg.ingest.min_chars, 3);
        assert!(cfg.ingest.placeholders.is_empty());
        assert_eq!(cfg.embedding.batch_size, 32);
    }

    #[test]
    fn round_trip_modified_values() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("modified.toml");

        let mut cfg = AppConfig::default();
        cfg.embedding.provider = EmbeddingProvider::OpenAiCompatible;
        cfg.embedding.base_url = "https://api.openai.com".into();
        cfg.embedding.api_key = Some("sk-test".into());
        cfg.embedding.model = "text-embedding-3-small".into();
        cfg.session.transcription_timeout_secs = 30;

        cfg.save_to(&path).expect("save");
        let loaded = AppConfig::load_from(&path).expect("load");

        assert_eq!(loaded.embedding.provider, EmbeddingProvider::OpenAiCompatible);
        assert_eq!(loaded.embedding.api_key, Some("sk-test".into()));
        assert_eq!(loaded.embedding.model, "text-embedding-3-small");
        assert_eq!(loaded.session.transcription_timeout_secs, 30);
    }

    #[test]
    fn blank_base_url_falls_back_to_provider_default() {
        let mut cfg = EmbeddingConfig {
            base_url: "  ".into(),
            ..EmbeddingConfig::default()
        };
        assert_eq!(cfg.resolved_base_url(), "http://localhost:11434");

        cfg.provider = EmbeddingProvider::OpenAiCompatible;
        assert_eq!(cfg.resolved_base_url(), "https://api.openai.com");

        cfg.base_url = "http://gpu-box:8000/".into();
        assert_eq!(cfg.resolved_base_url(), "http://gpu-box:8000");
    }

    #[test]
    fn debug_output_hides_api_key() {
        let mut cfg = AppConfig::default();
        cfg.embedding.api_key = Some("sk-secret-value".into());

        let printed = format!("{cfg:?}");
        assert!(!printed.contains("sk-secret-value"));
        assert!(printed.contains("<redacted>"));
        assert!(printed.contains("all-minilm"));
    }
}
