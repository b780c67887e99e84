//! Ranking and tiering of scored prompts.
//!
//! [`rank`] stable-sorts by score (highest first) and assigns 1-based ranks;
//! prompts with equal scores keep their input order.  [`Tier`] is derived
//! from a [`Score`] on demand, using thresholds that depend on which scorer
//! produced it:
//!
//! | Scorer    | High     | Medium          | Low     |
//! |-----------|----------|-----------------|---------|
//! | Keyword   | ≥ 6      | 3 ≤ s < 6       | < 3     |
//! | Embedding | ≥ 4.0    | 3.0 ≤ s < 4.0   | < 3.0   |
//!
//! Alignment scores are tiered on their exported three-decimal value.  A
//! NaN score sorts last.

use serde::Serialize;

use crate::ingest::NormalizedPrompt;
use crate::scoring::embedding::{round_to, ThemeScores};

// ---------------------------------------------------------------------------
// ScoringMode
// ---------------------------------------------------------------------------

/// Which scorer a run uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ScoringMode {
    Keyword,
    Embedding,
}

// ---------------------------------------------------------------------------
// Score
// ---------------------------------------------------------------------------

/// A prompt's score, tagged with the scorer that produced it.
///
/// Scores from different scorers are not comparable.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Score {
    /// Keyword priority score (non-negative integer).
    Priority(u32),
    /// Embedding alignment score (weighted similarity sum).
    Alignment(f64),
}

impl Score {
    pub fn value(self) -> f64 {
        match self {
            Score::Priority(p) => f64::from(p),
            Score::Alignment(a) => a,
        }
    }

    pub fn mode(self) -> ScoringMode {
        match self {
            Score::Priority(_) => ScoringMode::Keyword,
            Score::Alignment(_) => ScoringMode::Embedding,
        }
    }

    pub fn tier(self) -> Tier {
        Tier::classify(self)
    }
}

// ---------------------------------------------------------------------------
// Tier
// ---------------------------------------------------------------------------

/// Coarse triage bucket derived from a score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    High,
    Medium,
    Low,
}

impl Tier {
    pub const ALL: [Tier; 3] = [Tier::High, Tier::Medium, Tier::Low];

    /// Classify a score with the thresholds of the scorer that produced it.
    pub fn classify(score: Score) -> Tier {
        match score {
            Score::Priority(p) if p >= 6 => Tier::High,
            Score::Priority(p) if p >= 3 => Tier::Medium,
            Score::Priority(_) => Tier::Low,
            Score::Alignment(a) => match round_to(a, 3) {
                a if a >= 4.0 => Tier::High,
                a if a >= 3.0 => Tier::Medium,
                _ => Tier::Low,
            },
        }
    }

    /// Human-readable range of this tier for `mode`.
    pub fn describe(self, mode: ScoringMode) -> &'static str {
        match (mode, self) {
            (ScoringMode::Keyword, Tier::High) => "High Priority (score >= 6)",
            (ScoringMode::Keyword, Tier::Medium) => "Medium Priority (score 3-5)",
            (ScoringMode::Keyword, Tier::Low) => "Low Priority (score < 3)",
            (ScoringMode::Embedding, Tier::High) => "High Alignment (>= 4.0)",
            (ScoringMode::Embedding, Tier::Medium) => "Medium Alignment (3.0-3.9)",
            (ScoringMode::Embedding, Tier::Low) => "Lower Alignment (< 3.0)",
        }
    }
}

// ---------------------------------------------------------------------------
// ScoredPrompt
// ---------------------------------------------------------------------------

/// A normalized prompt with its score and, after [`rank`], its position.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredPrompt {
    /// The prompt; `category` holds the scorer's category.
    pub prompt: NormalizedPrompt,
    pub score: Score,
    /// Per-theme similarity (embedding scorer only).
    pub theme_scores: Option<ThemeScores>,
    /// 1-based rank, `0` until ranked.
    pub rank: usize,
}

impl ScoredPrompt {
    pub fn new(prompt: NormalizedPrompt, score: Score) -> Self {
        Self {
            prompt,
            score,
            theme_scores: None,
            rank: 0,
        }
    }

    pub fn tier(&self) -> Tier {
        self.score.tier()
    }
}

// ---------------------------------------------------------------------------
// Ranking
// ---------------------------------------------------------------------------

/// Sort by score descending (stable) and assign 1-based ranks.
pub fn rank(mut prompts: Vec<ScoredPrompt>) -> Vec<ScoredPrompt> {
    prompts.sort_by(|a, b| sort_key(b.score).total_cmp(&sort_key(a.score)));
    for (idx, prompt) in prompts.iter_mut().enumerate() {
        prompt.rank = idx + 1;
    }
    prompts
}

/// Total-order key: NaN below every number, `-0.0` equal to `0.0`.
fn sort_key(score: Score) -> f64 {
    match score.value() {
        v if v.is_nan() => f64::NEG_INFINITY,
        v if v == 0.0 => 0.0,
        v => v,
    }
}

/// Prompts in `tier`, keeping their order.
pub fn in_tier(prompts: &[ScoredPrompt], tier: Tier) -> Vec<&ScoredPrompt> {
    prompts.iter().filter(|p| p.tier() == tier).collect()
}

/// Number of prompts per tier, in [`Tier::ALL`] order.
pub fn tier_counts(prompts: &[ScoredPrompt]) -> [(Tier, usize); 3] {
    Tier::ALL.map(|tier| (tier, prompts.iter().filter(|p| p.tier() == tier).count()))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
