//! Prompt scoring, categorization and ranking.
//!
//! Two independent scorers feed one ranker:
//!
//! ```text
//! NormalizedPrompt ──▶ KeywordScorer   ──▶ Score::Priority  ─┐
//!                  └─▶ EmbeddingScorer ──▶ Score::Alignment ─┴─▶ rank() ──▶ Tier
//! ```
//!
//! * [`KeywordScorer`]: weighted keyword tiers and ordered category rules.
//! * [`EmbeddingScorer`]: cosine similarity to fixed theme vectors.
//! * [`rank`] / [`Tier`]: stable ranking and mode-specific tiering.

pub mod embedding;
pub mod keyword;
pub mod rank;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use embedding::{
    cosine_similarity, score_embedding, EmbeddingScore, EmbeddingScorer, Theme, ThemeScores,
    ThemeVectors,
};
pub use keyword::{category_labels, score_keyword, KeywordScore, KeywordScorer, FALLBACK_CATEGORY};
pub use rank::{in_tier, rank, tier_counts, Score, ScoredPrompt, ScoringMode, Tier};
