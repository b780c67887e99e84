//! Application entry point for the knowledge-capture CLI.
//!
//! # Startup sequence
//!
//! 1. Initialise logging (`RUST_LOG` overrides the `info` default).
//! 2. Load [`AppConfig`] from `--config` or the platform settings file
//!    (returns default on first run).
//! 3. Dispatch the subcommand.  `rank` drives the batch pipeline; every
//!    other command works on the session store in the data directory.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};

use knowledge_capture::{
    config::{AppConfig, AppPaths},
    embed::ApiEmbedder,
    export::write_report,
    ingest::{load_source, ImportPrompt, SourceFormat},
    pipeline::BatchRunner,
    scoring::ScoringMode,
    session::{
        default_export_file_name, CaptureRequest, Capturer, CommandTranscriber, SessionStore,
    },
};

// ---------------------------------------------------------------------------
// CLI
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "knowledge-capture",
    version,
    about = "Rank prompt collections and capture spoken answers to them"
)]
struct Cli {
    /// Settings file (defaults to settings.toml in the platform config dir)
    #[arg(long, global = true, env = "KNOWLEDGE_CAPTURE_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Score, rank and tier a prompt source, writing the prioritized JSON files
    Rank {
        /// JSON array or numbered text file
        input: PathBuf,

        /// Output file (defaults to the configured file for the mode)
        #[arg(long, short)]
        output: Option<PathBuf>,

        /// Scoring strategy
        #[arg(long, value_enum, default_value_t = ScoringMode::Keyword)]
        mode: ScoringMode,

        /// Source layout: json, numbered or lines (detected from the extension)
        #[arg(long)]
        format: Option<SourceFormat>,
    },

    /// Append prompts from a JSON file (e.g. a ranked output) to the session
    Import { file: PathBuf },

    /// Show the current prompt
    Current,

    /// Save a typed answer for the current prompt
    Answer {
        text: String,

        /// Move to the next prompt after saving
        #[arg(long, default_value_t = false)]
        next: bool,
    },

    /// Transcribe a recording with the configured command and save it for
    /// the current prompt
    Capture {
        audio: PathBuf,

        /// Recording length in seconds
        #[arg(long)]
        duration: Option<f64>,
    },

    /// Advance to the next prompt
    Next,

    /// Start over from the first prompt (answers are kept)
    Reset,

    /// Show session statistics
    Stats,

    /// List saved answers, newest first
    Responses {
        #[arg(long)]
        question_id: Option<u64>,
    },

    /// Export all answers with statistics as JSON
    Export {
        /// Output file (defaults to knowledge_export_<timestamp>.json)
        output: Option<PathBuf>,
    },
}

// ---------------------------------------------------------------------------
// main
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<()> {
    // ── 1. Logging ────────────────────────────────────────────────────────
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    // ── 2. Config ─────────────────────────────────────────────────────────
    let config = match &cli.config {
        Some(path) => AppConfig::load_from(path)?,
        None => AppConfig::load().context("Failed to load config")?,
    };
    log::debug!("config loaded: {:?}", config);

    // ── 3. Dispatch ───────────────────────────────────────────────────────
    match cli.command {
        Command::Rank {
            input,
            output,
            mode,
            format,
        } => rank(&config, &input, output, mode, format).await,
        command => run_session_command(&config, command).await,
    }
}

// ---------------------------------------------------------------------------
// Batch ranking
// ---------------------------------------------------------------------------

async fn rank(
    config: &AppConfig,
    input: &Path,
    output: Option<PathBuf>,
    mode: ScoringMode,
    format: Option<SourceFormat>,
) -> Result<()> {
    let format = format.unwrap_or_else(|| SourceFormat::detect(input));
    log::info!("Loading {} as {:?}", input.display(), format);
    let rows = load_source(input, format)?;

    let runner = BatchRunner::from_config(config);
    let report = match mode {
        ScoringMode::Keyword => runner.run_keyword(rows)?,
        ScoringMode::Embedding => {
            let embedder = ApiEmbedder::from_config(&config.embedding);
            log::info!(
                "Embedding with model {} at {}",
                config.embedding.model,
                embedder.endpoint()
            );
            runner.run_embedding(rows, &embedder).await?
        }
    };

    report.log_summary(config.output.preview_count);

    let output = output.unwrap_or_else(|| {
        PathBuf::from(match mode {
            ScoringMode::Keyword => &config.output.keyword_file,
            ScoringMode::Embedding => &config.output.embedding_file,
        })
    });
    let written = write_report(&report, &output)?;

    println!("Saved {} prompts to {}", report.prompts.len(), written.full.display());
    println!(
        "Saved {} high-tier prompts to {}",
        report.high_tier().len(),
        written.high_priority.display()
    );
    Ok(())
}

// ---------------------------------------------------------------------------
// Session commands
// ---------------------------------------------------------------------------

async fn run_session_command(config: &AppConfig, command: Command) -> Result<()> {
    let paths = AppPaths::new();
    let mut store = SessionStore::open(paths.session_file(&config.session.store_file))?;

    match command {
        Command::Import { file } => {
            let content = std::fs::read_to_string(&file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let prompts: Vec<ImportPrompt> = serde_json::from_str(&content)
                .with_context(|| format!("{} is not a JSON list of prompts", file.display()))?;
            let imported = store.import_prompts(prompts)?;
            println!("Imported {imported} prompts ({} total)", store.stats().total_questions);
        }

        Command::Current => print_current(&store),

        Command::Answer { text, next } => {
            let Some(current) = store.current_prompt() else {
                bail!("No current prompt; all prompts have been answered");
            };
            let id = store.save_response(current.id, text.trim(), None, None)?;
            println!("Saved response {id} for prompt {}", current.id);
            if next {
                store.advance()?;
                print_current(&store);
            }
        }

        Command::Capture { audio, duration } => {
            let Some(transcriber) = CommandTranscriber::from_command(&config.session.transcriber_command)
            else {
                bail!("No transcriber configured; set session.transcriber_command in settings.toml");
            };
            let Some(current) = store.current_prompt() else {
                bail!("No current prompt; all prompts have been answered");
            };
            let bytes = std::fs::read(&audio)
                .with_context(|| format!("Failed to read {}", audio.display()))?;

            let capturer = Capturer::from_config(Arc::new(transcriber), &paths.uploads_dir, &config.session);
            let captured = capturer
                .capture(
                    &mut store,
                    CaptureRequest {
                        question_id: current.id,
                        audio: bytes,
                        duration_secs: duration,
                    },
                )
                .await?;
            println!("Saved response {}: {}", captured.response_id, captured.transcription);
        }

        Command::Next => {
            store.advance()?;
            print_current(&store);
        }

        Command::Reset => {
            store.reset_progress()?;
            println!("Progress reset to the first prompt");
        }

        Command::Stats => println!("{}", serde_json::to_string_pretty(&store.stats())?),

        Command::Responses { question_id } => {
            println!("{}", serde_json::to_string_pretty(&store.responses(question_id))?)
        }

        Command::Export { output } => {
            let output = output
                .unwrap_or_else(|| PathBuf::from(default_export_file_name(chrono::Local::now())));
            let count = store.export_to(&output)?;
            let stats = store.stats();
            println!("Exported {count} responses to {}", output.display());
            println!("  Total prompts:   {}", stats.total_questions);
            println!("  Total responses: {}", stats.total_responses);
            println!("  Completion:      {:.1}%", stats.completion_percentage);
        }

        Command::Rank { .. } => unreachable!("rank is dispatched before the session store is opened"),
    }
    Ok(())
}

fn print_current(store: &SessionStore) {
    match store.current_prompt() {
        Some(p) => println!(
            "[{}/{}] ({}) #{}: {}",
            p.current_index + 1,
            p.total,
            p.category,
            p.id,
            p.text
        ),
        None => println!("All prompts have been answered"),
    }
}
