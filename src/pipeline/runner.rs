//! Batch runner: source rows → normalize → score → rank.
//!
//! # Pipeline flow
//!
//! ```text
//! Vec<RawPromptRecord>
//!   └─▶ Normalizer                      (skip, dedup; empty → EmptySource)
//!         ├─ Keyword   → KeywordScorer per prompt
//!         └─ Embedding → ThemeVectors once, then batched embed + score
//!               └─▶ rank()  →  RunReport
//! ```
//!
//! Embedding failures abort the run: keyword and embedding scores are not
//! comparable, so there is no fallback from one to the other.

use crate::config::AppConfig;
use crate::embed::Embedder;
use crate::ingest::{
    IngestError, NormalizeOptions, NormalizeOutcome, NormalizedPrompt, Normalizer,
    RawPromptRecord,
};
use crate::scoring::embedding::round_to;
use crate::scoring::{rank, EmbeddingScorer, KeywordScorer, Score, ScoredPrompt, ScoringMode};

use super::{PipelineError, RunReport};

// ---------------------------------------------------------------------------
// BatchRunner
// ---------------------------------------------------------------------------

/// Runs one scoring pass over a prompt source.
///
/// ```rust
/// use knowledge_capture::ingest::RawPromptRecord;
/// use knowledge_capture::pipeline::BatchRunner;
///
/// let runner = BatchRunner::default();
/// let report = runner
///     .run_keyword(vec![
///         RawPromptRecord::new("Where were you born?"),
///         RawPromptRecord::new("How can AI support wisdom?"),
///     ])
///     .unwrap();
/// assert_eq!(report.prompts[0].prompt.text, "How can AI support wisdom?");
/// assert_eq!(report.prompts[0].rank, 1);
/// ```
#[derive(Debug, Clone)]
pub struct BatchRunner {
    normalizer: Normalizer,
    batch_size: usize,
}

impl Default for BatchRunner {
    fn default() -> Self {
        Self::new(NormalizeOptions::default(), 32)
    }
}

impl BatchRunner {
    pub fn new(options: NormalizeOptions, batch_size: usize) -> Self {
        Self {
            normalizer: Normalizer::new(options),
            batch_size: batch_size.max(1),
        }
    }

    /// Build a runner from the `ingest` and `embedding` config sections.
    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            NormalizeOptions::from(&config.ingest),
            config.embedding.batch_size,
        )
    }

    /// Normalize `records`, failing when nothing usable remains.
    pub fn normalize(&self, records: Vec<RawPromptRecord>) -> Result<(usize, NormalizeOutcome), PipelineError> {
        let total_rows = records.len();
        let outcome = self.normalizer.normalize_records(records);

        log::info!(
            "pipeline: {} usable prompts from {} rows ({} skipped, {} duplicates)",
            outcome.prompts.len(),
            total_rows,
            outcome.skipped,
            outcome.duplicates
        );

        if outcome.is_empty() {
            return Err(IngestError::EmptySource.into());
        }
        Ok((total_rows, outcome))
    }

    /// Score with the keyword scorer and rank.
    pub fn run_keyword(&self, records: Vec<RawPromptRecord>) -> Result<RunReport, PipelineError> {
        let (total_rows, outcome) = self.normalize(records)?;
        let scorer = KeywordScorer::new();

        let scored = outcome
            .prompts
            .into_iter()
            .map(|prompt| {
                let result = scorer.score(&prompt.text);
                ScoredPrompt::new(
                    with_category(prompt, result.category),
                    Score::Priority(result.score),
                )
            })
            .collect();

        Ok(RunReport {
            mode: ScoringMode::Keyword,
            prompts: rank(scored),
            total_rows,
            skipped: outcome.skipped,
            duplicates: outcome.duplicates,
        })
    }

    /// Score with the embedding scorer and rank.
    ///
    /// Theme descriptions are embedded once; prompts are embedded in batches
    /// of `batch_size`.  Alignment is rounded to three decimals before
    /// ranking, the precision it is exported with.
    pub async fn run_embedding(
        &self,
        records: Vec<RawPromptRecord>,
        embedder: &dyn Embedder,
    ) -> Result<RunReport, PipelineError> {
        let (total_rows, outcome) = self.normalize(records)?;
        let scorer = EmbeddingScorer::new(embedder, self.batch_size).await?;

        let texts: Vec<&str> = outcome.prompts.iter().map(|p| p.text.as_str()).collect();
        let scores = scorer.score_all(&texts).await?;

        let scored = outcome
            .prompts
            .iter()
            .zip(scores)
            .map(|(prompt, result)| {
                let mut scored = ScoredPrompt::new(
                    with_category(prompt.clone(), result.category),
                    Score::Alignment(round_to(result.alignment, 3)),
                );
                scored.theme_scores = Some(result.theme_scores);
                scored
            })
            .collect();

        Ok(RunReport {
            mode: ScoringMode::Embedding,
            prompts: rank(scored),
            total_rows,
            skipped: outcome.skipped,
            duplicates: outcome.duplicates,
        })
    }
}

fn with_category(mut prompt: NormalizedPrompt, category: &str) -> NormalizedPrompt {
    prompt.category = category.to_string();
    prompt
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embed::EmbedError;
    use crate::scoring::{Theme, Tier};
    use async_trait::async_trait;

    /// Maps theme descriptions to axes and prompts to axes by keyword.
    struct KeywordAxisEmbedder;

    #[async_trait]
    impl Embedder for KeywordAxisEmbedder {
        async fn embed_batch(&self, inputs: &[&str]) -> Result<Vec<Vec<f32>>, EmbedError> {
            Ok(inputs
                .iter()
                .map(|text| {
                    let mut v = vec![0.0f32; 5];
                    if let Some(i) = Theme::ALL.iter().position(|t| t.description() == *text) {
                        v[i] = 1.0;
                    } else if text.contains("children") {
                        v = vec![1.0, 1.0, 1.0, 1.0, 1.0];
                    } else if text.contains("body") {
                        v[1] = 1.0;
                    }
                    v
                })
                .collect())
        }
    }

    struct DownEmbedder;

    #[async_trait]
    impl Embedder for DownEmbedder {
        async fn embed_batch(&self, _inputs: &[&str]) -> Result<Vec<Vec<f32>>, EmbedError> {
            Err(EmbedError::Timeout)
        }
    }

    /// Theme vectors have five dimensions, prompt vectors six.
    struct MixedDimensionEmbedder;

    #[async_trait]
    impl Embedder for MixedDimensionEmbedder {
        async fn embed_batch(&self, inputs: &[&str]) -> Result<Vec<Vec<f32>>, EmbedError> {
            Ok(inputs
                .iter()
                .map(|text| match Theme::ALL.iter().position(|t| t.description() == *text) {
                    Some(i) => {
                        let mut v = vec![0.0f32; 5];
                        v[i] = 1.0;
                        v
                    }
                    None => vec![1.0f32; 6],
                })
                .collect())
        }
    }

    fn rows(texts: &[&str]) -> Vec<RawPromptRecord> {
        texts
            .iter()
            .enumerate()
            .map(|(i, t)| RawPromptRecord::new(*t).with_index(i))
            .collect()
    }

    #[test]
    fn keyword_run_ranks_and_overrides_category() {
        let runner = BatchRunner::default();
        let report = runner
            .run_keyword(vec![
                RawPromptRecord::new("Where were you born?").with_category("Childhood"),
                RawPromptRecord::new("Wisdom, ethics and values"),
                RawPromptRecord::new("How can AI support wisdom?"),
            ])
            .unwrap();

        let texts: Vec<_> = report.prompts.iter().map(|p| p.prompt.text.as_str()).collect();
        assert_eq!(
            texts,
            vec!["Wisdom, ethics and values", "How can AI support wisdom?", "Where were you born?"]
        );
        assert_eq!(report.prompts[2].prompt.category, "General Wisdom");
        assert_eq!(report.prompts[0].tier(), Tier::High);
    }

    #[test]
    fn keyword_run_counts_skipped_rows() {
        let runner = BatchRunner::new(
            NormalizeOptions {
                min_chars: 10,
                placeholders: vec!["nan".into()],
            },
            8,
        );
        let report = runner
            .run_keyword(rows(&["nan", "short", "", "What does wisdom look like?", "what does wisdom look like?"]))
            .unwrap();
        assert_eq!(report.total_rows, 5);
        assert_eq!(report.skipped, 3);
        assert_eq!(report.duplicates, 1);
        assert_eq!(report.prompts.len(), 1);
    }

    #[test]
    fn empty_source_is_an_error() {
        let err = BatchRunner::default().run_keyword(rows(&["", "nan"])).unwrap_err();
        assert!(matches!(err, PipelineError::Ingest(IngestError::EmptySource)));

        let err = BatchRunner::default().run_keyword(Vec::new()).unwrap_err();
        assert!(matches!(err, PipelineError::Ingest(IngestError::EmptySource)));
    }

    #[tokio::test]
    async fn embedding_run_ranks_by_alignment() {
        let runner = BatchRunner::new(NormalizeOptions::default(), 2);
        let report = runner
            .run_embedding(
                rows(&["Unrelated words", "How does your body heal?", "What will children need?"]),
                &KeywordAxisEmbedder,
            )
            .await
            .unwrap();

        assert_eq!(report.mode, ScoringMode::Embedding);
        let top = &report.prompts[0];
        assert_eq!(top.prompt.text, "What will children need?");
        assert_eq!(top.prompt.source_index, Some(2));
        // Equal similarity on every axis: technology wins the tie.
        assert_eq!(top.prompt.category, "Technology & Future");
        // 7.2 / sqrt(5) = 3.21993...
        assert_eq!(top.score, Score::Alignment(3.22));
        assert!(top.theme_scores.is_some());

        assert_eq!(report.prompts[1].prompt.category, "Biology & Health");
        assert_eq!(report.prompts[2].score, Score::Alignment(0.0));
    }

    #[tokio::test]
    async fn mismatched_dimensions_abort_the_run() {
        let err = BatchRunner::default()
            .run_embedding(rows(&["What will children need?"]), &MixedDimensionEmbedder)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            PipelineError::Embedding(EmbedError::DimensionMismatch { expected: 5, got: 6 })
        ));
    }

    #[tokio::test]
    async fn embedding_failure_is_fatal() {
        let err = BatchRunner::default()
            .run_embedding(rows(&["What will children need?"]), &DownEmbedder)
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::Embedding(EmbedError::Timeout)));
    }
}
