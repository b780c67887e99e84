//! End-to-end batch runs: source file → ranking → JSON artifacts → session.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use knowledge_capture::config::AppConfig;
use knowledge_capture::embed::{EmbedError, Embedder};
use knowledge_capture::export::write_report;
use knowledge_capture::ingest::{load_source, ImportPrompt, IngestError, SourceFormat};
use knowledge_capture::pipeline::{BatchRunner, PipelineError};
use knowledge_capture::scoring::{Score, Theme};
use knowledge_capture::session::SessionStore;
use tempfile::tempdir;

const SOURCE: &str = "\
Category 1: Early Life (Questions 1-3)
1. Where were you born?
2. nan
3. What did your morning routine look like?

Category 2: Looking Ahead (Questions 4-6)
4. How should technology shape the future of education?
5. How should technology shape the future of education?
6. What wisdom would you pass to future generations?
";

/// Theme descriptions map to their own axis; prompts land on the axis of
/// the first theme-ish word they contain.
struct StubEmbedder {
    calls: AtomicUsize,
}

#[async_trait]
impl Embedder for StubEmbedder {
    async fn embed_batch(&self, inputs: &[&str]) -> Result<Vec<Vec<f32>>, EmbedError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(inputs
            .iter()
            .map(|text| {
                let axis = Theme::ALL
                    .iter()
                    .position(|t| t.description() == *text)
                    .or_else(|| text.contains("generations").then_some(3))
                    .or_else(|| text.contains("technology").then_some(0));
                let mut v = vec![0.0f32; 5];
                if let Some(i) = axis {
                    v[i] = 1.0;
                }
                v
            })
            .collect())
    }
}

#[test]
fn keyword_run_writes_importable_files() {
    let dir = tempdir().expect("temp dir");
    let source = dir.path().join("questions.txt");
    std::fs::write(&source, SOURCE).unwrap();

    let config = AppConfig::default();
    let rows = load_source(&source, SourceFormat::detect(&source)).unwrap();
    assert_eq!(rows.len(), 6);

    let report = BatchRunner::from_config(&config).run_keyword(rows).unwrap();
    assert_eq!(report.skipped, 1);
    assert_eq!(report.duplicates, 1);
    assert_eq!(report.prompts.len(), 4);

    // wisdom + future + generation + "future generations"
    let top = &report.prompts[0];
    assert_eq!(top.prompt.text, "What wisdom would you pass to future generations?");
    assert_eq!(top.prompt.category, "Generation Alpha & Youth");
    assert_eq!(top.prompt.source_index, Some(6));
    assert_eq!(top.score, Score::Priority(12));
    assert_eq!(top.rank, 1);

    let second = &report.prompts[1];
    assert_eq!(second.prompt.category, "Technology & Future");
    assert_eq!(second.score, Score::Priority(9));

    // Equal zero scores keep source order.
    let tail: Vec<_> = report.prompts[2..].iter().map(|p| p.prompt.source_index).collect();
    assert_eq!(tail, vec![Some(1), Some(3)]);
    assert_eq!(report.prompts[3].prompt.category, "General Wisdom");

    let out = dir.path().join("out").join(&config.output.keyword_file);
    let written = write_report(&report, &out).unwrap();
    let high: Vec<ImportPrompt> =
        serde_json::from_str(&std::fs::read_to_string(&written.high_priority).unwrap()).unwrap();
    assert_eq!(high.len(), 2);

    let mut store = SessionStore::open(dir.path().join("knowledge.json")).unwrap();
    let full: Vec<ImportPrompt> =
        serde_json::from_str(&std::fs::read_to_string(&written.full).unwrap()).unwrap();
    assert_eq!(store.import_prompts(full).unwrap(), 4);

    let current = store.current_prompt().unwrap();
    assert_eq!(current.text, top.prompt.text);
    assert_eq!(current.category, "Generation Alpha & Youth");
    assert_eq!(current.total, 4);
}

#[tokio::test]
async fn embedding_run_ranks_by_theme_alignment() {
    let dir = tempdir().expect("temp dir");
    let source = dir.path().join("questions.json");
    std::fs::write(
        &source,
        r#"[
            {"question": "How will technology change work?", "category": "Work"},
            {"question": "What should future generations remember?"},
            {"question": "Where did you grow up as a kid?"}
        ]"#,
    )
    .unwrap();

    let rows = load_source(&source, SourceFormat::detect(&source)).unwrap();
    let embedder = StubEmbedder {
        calls: AtomicUsize::new(0),
    };
    let report = BatchRunner::from_config(&AppConfig::default())
        .run_embedding(rows, &embedder)
        .await
        .unwrap();

    // One call for the themes, one batch for the prompts.
    assert_eq!(embedder.calls.load(Ordering::SeqCst), 2);

    let order: Vec<_> = report.prompts.iter().map(|p| p.prompt.category.as_str()).collect();
    assert_eq!(order, vec!["Generation Alpha", "Technology & Future", "Technology & Future"]);
    assert_eq!(report.prompts[0].score, Score::Alignment(2.0));
    assert_eq!(report.prompts[1].score, Score::Alignment(1.5));
    assert_eq!(report.prompts[2].score, Score::Alignment(0.0));
    assert!(report.high_tier().is_empty());
}

#[test]
fn source_without_usable_rows_is_empty() {
    let dir = tempdir().expect("temp dir");
    let source = dir.path().join("empty.txt");
    std::fs::write(&source, "Category 1: Nothing (Questions 1-1)\n1. nan\n2. short\n").unwrap();

    let rows = load_source(&source, SourceFormat::NumberedText).unwrap();
    let err = BatchRunner::from_config(&AppConfig::default())
        .run_keyword(rows)
        .unwrap_err();
    assert!(matches!(err, PipelineError::Ingest(IngestError::EmptySource)));
}
